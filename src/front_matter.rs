use std::fmt::Write;
use std::path::Path;
use std::{fs, io};

use chrono::{DateTime, TimeZone};
use lazy_static::lazy_static;
use regex::Regex;

use crate::text_utils::escape_title;

pub const SEPARATOR: &str = "---";

/// Key/value preamble of a post, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    entries: Vec<(String, String)>,
}

impl FrontMatter {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item=&str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// First word of the `permalink` value; `None` when left blank
    pub fn permalink(&self) -> Option<&str> {
        self.get("permalink")
            .and_then(|v| v.split_whitespace().next())
    }
}

fn extract_entry(line: &str) -> Option<(&str, &str)> {
    lazy_static! {
        static ref ENTRY_REGEX: Regex = Regex::new(
            r"^(?P<key>[A-Za-z0-9_-]+):(?P<value>.*)$"
        ).unwrap();
    }

    let caps = ENTRY_REGEX.captures(line)?;
    let key = caps.name("key")?.as_str();
    let value = caps.name("value")?.as_str().trim();
    Some((key, value))
}

/// Parses the block between the two `---` lines at the top of a post.
/// Returns `None` only when a separator is missing. Lines in between that are not
/// `key: value` (list items, comments) are skipped.
pub fn parse_front_matter(content: &str) -> Option<FrontMatter> {
    let mut lines = content.lines()
        .map(|line| line.trim_end())
        .skip_while(|line| line.is_empty());

    if lines.next()? != SEPARATOR {
        return None;
    }

    let mut entries = vec![];
    loop {
        let line = lines.next()?;
        if line == SEPARATOR {
            break;
        }
        if let Some((key, value)) = extract_entry(line) {
            entries.push((key.to_string(), value.to_string()));
        }
    }

    Some(FrontMatter { entries })
}

pub fn read_front_matter(file_name: &Path) -> io::Result<Option<FrontMatter>> {
    let content = fs::read_to_string(file_name)?;
    Ok(parse_front_matter(&content))
}

pub struct PostHeader<'a, Tz: TimeZone> {
    pub layout: &'a str,
    pub title: &'a str,
    pub date: &'a DateTime<Tz>,
}

pub fn render_front_matter<Tz: TimeZone>(header: &PostHeader<Tz>) -> String
    where Tz::Offset: std::fmt::Display
{
    let mut buf = String::new();

    let _ = writeln!(&mut buf, "{}", SEPARATOR);
    let _ = writeln!(&mut buf, "layout: {}", header.layout);
    let _ = writeln!(&mut buf, "permalink: ");
    let _ = writeln!(&mut buf, "title: \"{}\"", escape_title(header.title));
    let _ = writeln!(&mut buf, "date: {}", header.date.format("%Y-%m-%d %H:%M:%S %z"));
    let _ = writeln!(&mut buf, "comments: true");
    let _ = writeln!(&mut buf, "categories: ");
    let _ = writeln!(&mut buf, "{}", SEPARATOR);
    buf
}
