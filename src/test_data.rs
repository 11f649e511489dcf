use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::command::{CommandRunner, ShellCommand};
use crate::config::{parse_config, Config};
use crate::error::{PublishError, Result};
use crate::prompt::Confirm;

pub const NEW_POST: &str = concat!(
    "---\n",
    "layout: post\n",
    "permalink: \n",
    "title: \"Tom Waits - Hold On\"\n",
    "date: 2013-05-04 21:14:02 -0700\n",
    "comments: true\n",
    "categories: \n",
    "---\n",
);

pub const EDITED_POST: &str = "---
layout: post
permalink: https://youtube.com/watch?v=ABC123
title: \"Tom Waits - Hold On\"
date: 2013-05-04 21:14:02 -0700
comments: true
categories: music
---

Lyrics: somewhere in the middle of the album.
";

pub fn test_config(blog_dir: &std::path::Path) -> Config {
    let cfg = format!(r#"
[paths]
blog_dir = "{blog}"
music_dir = "{blog}/music"

[remote]
host = "media.example.org"
user = "rcs"
work_dir = "/scratch/rcs/youtube"

[post]
editor = "vim"
register_command = "youtube_api/add_video.py"
"#, blog = blog_dir.display());
    parse_config(&cfg).unwrap()
}

/// Records every command; the editor invocation fills in the permalink like an operator would
pub struct RecordingRunner {
    pub calls: RefCell<Vec<ShellCommand>>,
    pub permalink: Option<String>,
    pub fail_on: Option<String>,
    pub categories: Vec<String>,
}

impl RecordingRunner {
    pub fn new(permalink: Option<&str>) -> Self {
        RecordingRunner {
            calls: RefCell::new(vec![]),
            permalink: permalink.map(|p| p.to_string()),
            fail_on: None,
            categories: vec![],
        }
    }

    /// The fake editor also writes these as a YAML list under `categories:`
    pub fn with_categories(mut self, categories: &[&str]) -> Self {
        self.categories = categories.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn failing_on(mut self, program: &str) -> Self {
        self.fail_on = Some(program.to_string());
        self
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls.borrow().iter()
            .map(|c| match c.args.first() {
                Some(arg) if c.program == "git" => format!("git {}", arg),
                _ => c.program.clone(),
            })
            .collect()
    }

    fn edit(&self, cmd: &ShellCommand) -> io::Result<()> {
        let Some(ref permalink) = self.permalink else {
            return Ok(());
        };
        let Some(file) = cmd.args.last() else {
            return Ok(());
        };

        let path = PathBuf::from(file);
        let content = fs::read_to_string(&path)?;
        let mut content = content.replacen("permalink: \n", &format!("permalink: {}\n", permalink), 1);
        if !self.categories.is_empty() {
            let list: String = self.categories.iter().map(|c| format!("  - {}\n", c)).collect();
            content = content.replacen("categories: \n", &format!("categories:\n{}", list), 1);
        }
        fs::write(&path, content)
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, cmd: &ShellCommand) -> Result<()> {
        self.calls.borrow_mut().push(cmd.clone());

        if self.fail_on.as_deref() == Some(cmd.program.as_str()) {
            return Err(PublishError::CommandFailed { command: cmd.to_string(), code: Some(1) });
        }

        if cmd.program == "vim" {
            self.edit(cmd)?;
        }

        Ok(())
    }
}

/// Answers every overwrite question the same way
pub struct FixedAnswer {
    pub answer: bool,
    pub asked: RefCell<u32>,
}

impl FixedAnswer {
    pub fn new(answer: bool) -> Self {
        FixedAnswer { answer, asked: RefCell::new(0) }
    }
}

impl Confirm for FixedAnswer {
    fn confirm(&self, _question: &str) -> io::Result<bool> {
        *self.asked.borrow_mut() += 1;
        Ok(self.answer)
    }
}
