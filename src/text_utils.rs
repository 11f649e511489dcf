use chrono::NaiveDate;

/// Filename-safe version of a post title.
/// `Rock & Roll: Live!` becomes `rock-and-roll-live`
pub fn slugify(title: &str) -> String {
    let ascii = unidecode::unidecode(title).replace('&', " and ");

    let mut slug = String::new();
    let mut prev_char = None;

    for c in ascii.chars() {
        let c = if c.is_whitespace() || c == '-' || c == '_' {
            '-'
        } else if c.is_ascii_alphanumeric() {
            c.to_ascii_lowercase()
        } else {
            continue;
        };

        if c != '-' || (prev_char.is_some() && prev_char != Some('-')) {
            slug.push(c);
        }
        prev_char = Some(c);
    }

    slug.trim_end_matches('-').to_string()
}

/// `YYYY-MM-DD-<slug>.<ext>`
pub fn post_file_name(title: &str, date: &NaiveDate, ext: &str) -> String {
    let date = date.format("%Y-%m-%d");
    format!("{}-{}.{}", date, slugify(title), ext)
}

/// Keeps the title from breaking the double quoted front matter value
pub fn escape_title(title: &str) -> String {
    title.replace('&', "&amp;")
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
}
