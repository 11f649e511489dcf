/// Login name of the local user, used when the remote user is not configured
pub fn get_user_name() -> String {
    whoami::username()
}

/// Splits an editor setting such as `code --wait` into program and arguments
pub fn split_command_line(command_line: &str) -> Option<(String, Vec<String>)> {
    let mut parts = command_line.split_whitespace().map(|s| s.to_string());
    let program = parts.next()?;
    Some((program, parts.collect()))
}
