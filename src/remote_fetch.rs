use std::fs;
use std::path::Path;

use spdlog::info;

use crate::command::{CommandRunner, ShellCommand};
use crate::config::Remote;
use crate::error::Result;

/// Downloads the audio track of a video on the remote box, and mirrors the
/// remote working directory back to a local one
pub struct RemoteAudioFetcher<'a> {
    remote: &'a Remote,
    runner: &'a dyn CommandRunner,
}

/// Single quotes for the remote shell: `it's` becomes `'it'\''s'`
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Like `shell_quote`, but a leading `~` still points at the remote home
fn quote_remote_path(path: &str) -> String {
    if path == "~" {
        "\"$HOME\"".to_string()
    } else if let Some(rest) = path.strip_prefix("~/") {
        format!("\"$HOME\"/{}", shell_quote(rest))
    } else {
        shell_quote(path)
    }
}

impl<'a> RemoteAudioFetcher<'a> {
    pub fn new(remote: &'a Remote, runner: &'a dyn CommandRunner) -> Self {
        RemoteAudioFetcher { remote, runner }
    }

    fn destination(&self) -> String {
        format!("{}@{}", self.remote.user, self.remote.host)
    }

    /// Commands run on the remote host. Chained with `&&` so the ssh exit
    /// status reflects the first failing step.
    pub fn remote_script(&self, url: &str) -> String {
        let remote = self.remote;
        let mut download = vec![remote.downloader.clone()];
        download.extend(remote.downloader_flags.iter().cloned());
        download.extend([
            "--audio-quality".to_string(), remote.audio_quality.clone(),
            "--audio-format".to_string(), remote.audio_format.clone(),
            "--extract-audio".to_string(), shell_quote(url),
        ]);

        let steps = [
            format!("cd {}", quote_remote_path(&remote.work_dir)),
            format!("sudo apt-get -y install {}", remote.decoder_package),
            format!("{} -U", remote.downloader),
            download.join(" "),
        ];
        steps.join(" && ")
    }

    pub fn fetch_command(&self, url: &str) -> ShellCommand {
        ShellCommand::new("ssh")
            .arg(self.destination())
            .arg(self.remote_script(url))
    }

    pub fn sync_command(&self, music_dir: &Path) -> ShellCommand {
        let source = format!("{}:{}/*", self.destination(), self.remote.work_dir.trim_end_matches('/'));
        ShellCommand::new("rsync")
            .args(["-v".to_string(), source, ".".to_string()])
            .current_dir(music_dir)
    }

    pub fn fetch(&self, url: &str) -> Result<()> {
        info!("Fetching audio of {} on {}", url, self.remote.host);
        self.runner.run(&self.fetch_command(url))?;
        info!("Audio of {} is ready in {}:{}", url, self.remote.host, self.remote.work_dir);
        Ok(())
    }

    /// One way copy; files only present in `music_dir` are left alone
    pub fn sync_to(&self, music_dir: &Path) -> Result<()> {
        fs::create_dir_all(music_dir)?;
        info!("Syncing {}:{} into {}", self.remote.host, self.remote.work_dir, music_dir.display());
        self.runner.run(&self.sync_command(music_dir))
    }
}
