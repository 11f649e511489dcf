use std::io;
use std::io::{BufRead, Write};

pub trait Confirm {
    fn confirm(&self, question: &str) -> io::Result<bool>;
}

/// Asks on the terminal until it gets a yes or a no
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, question: &str) -> io::Result<bool> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        ask(question, &mut stdin.lock(), &mut stdout)
    }
}

fn parse_answer(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

fn ask<R: BufRead, W: Write>(question: &str, input: &mut R, output: &mut W) -> io::Result<bool> {
    loop {
        write!(output, "{} [y/n] ", question)?;
        output.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            // EOF
            return Ok(false);
        }

        if let Some(answer) = parse_answer(&answer) {
            return Ok(answer);
        }
    }
}
