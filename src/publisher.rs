use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use spdlog::{info, warn};

use crate::command::{CommandRunner, ShellCommand};
use crate::config::Config;
use crate::error::{PublishError, Result};
use crate::front_matter::{read_front_matter, render_front_matter, PostHeader};
use crate::prompt::Confirm;
use crate::remote_fetch::RemoteAudioFetcher;
use crate::text_utils::{post_file_name, slugify};
use crate::util::os_helper::split_command_line;
use crate::video_id::VideoLink;

/// Where a `publish` run stopped.
/// `Init -> FileCreated -> Edited -> Committed -> {Done | AudioFetchTriggered -> Synced}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    Init,
    FileCreated,
    Edited,
    Committed,
    Done,
    AudioFetchTriggered,
    Synced,
}

impl Display for PublishState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PublishState::Init => "init",
            PublishState::FileCreated => "file created",
            PublishState::Edited => "edited",
            PublishState::Committed => "committed",
            PublishState::Done => "done",
            PublishState::AudioFetchTriggered => "audio fetch triggered",
            PublishState::Synced => "synced",
        };
        write!(f, "{}", name)
    }
}

pub struct PostPublisher<'a> {
    config: &'a Config,
    runner: &'a dyn CommandRunner,
    confirm: &'a dyn Confirm,
    state: PublishState,
}

impl<'a> PostPublisher<'a> {
    pub fn new(config: &'a Config, runner: &'a dyn CommandRunner, confirm: &'a dyn Confirm) -> Self {
        PostPublisher {
            config,
            runner,
            confirm,
            state: PublishState::Init,
        }
    }

    pub fn state(&self) -> PublishState {
        self.state
    }

    fn advance(&mut self, state: PublishState) {
        info!("Post {} -> {}", self.state, state);
        self.state = state;
    }

    pub fn publish(&mut self, title: &str) -> Result<PublishState> {
        self.publish_at(title, &Local::now())
    }

    pub fn publish_at(&mut self, title: &str, now: &DateTime<Local>) -> Result<PublishState> {
        let title = title.trim();
        if title.is_empty() {
            return Err(PublishError::Usage("a post title is required".to_string()));
        }
        if slugify(title).is_empty() {
            return Err(PublishError::Usage(format!("title '{}' has no characters usable in a file name", title)));
        }

        let file_name = self.create_post(title, now)?;
        self.advance(PublishState::FileCreated);

        self.edit_post(&file_name)?;
        self.advance(PublishState::Edited);

        self.commit_post()?;
        self.advance(PublishState::Committed);

        let permalink = read_front_matter(&file_name)?
            .and_then(|fm| fm.permalink().map(|p| p.to_string()));

        let Some(permalink) = permalink else {
            info!("No permalink in {}, nothing to fetch", file_name.display());
            self.advance(PublishState::Done);
            return Ok(self.state);
        };

        let Some(link) = VideoLink::parse(&permalink) else {
            info!("Permalink {} is not a video link, nothing to fetch", permalink);
            self.advance(PublishState::Done);
            return Ok(self.state);
        };

        if let Some(ref video_id) = link.id {
            self.register_video(video_id);
        } else {
            warn!("Could not find a video id in {}", link.url);
        }

        let config = self.config;
        let fetcher = RemoteAudioFetcher::new(&config.remote, self.runner);
        fetcher.fetch(&link.url)?;
        self.advance(PublishState::AudioFetchTriggered);

        fetcher.sync_to(&config.paths.music_dir)?;
        self.advance(PublishState::Synced);

        Ok(self.state)
    }

    /// Path of the post for `title` on the day of `now`
    pub fn post_path(&self, title: &str, now: &DateTime<Local>) -> PathBuf {
        let file_name = post_file_name(title, &now.date_naive(), &self.config.paths.post_ext);
        self.config.posts_path().join(file_name)
    }

    fn create_post(&self, title: &str, now: &DateTime<Local>) -> Result<PathBuf> {
        fs::create_dir_all(self.config.posts_path())?;

        let file_name = self.post_path(title, now);
        if file_name.exists() {
            let question = format!("{} already exists. Do you want to overwrite?", file_name.display());
            if !self.confirm.confirm(&question)? {
                return Err(PublishError::OverwriteDeclined(file_name));
            }
        }

        println!("Creating new post: {}", file_name.display());
        let header = PostHeader {
            layout: &self.config.post.layout,
            title,
            date: now,
        };
        fs::write(&file_name, render_front_matter(&header))?;

        Ok(file_name)
    }

    fn edit_post(&self, file_name: &Path) -> Result<()> {
        let editor = self.config.editor();
        let Some((program, args)) = split_command_line(&editor) else {
            return Err(PublishError::Config("editor command is empty".to_string()));
        };

        let cmd = ShellCommand::new(&program)
            .args(args)
            .arg(file_name.to_string_lossy());
        self.runner.run(&cmd)
    }

    fn commit_post(&self) -> Result<()> {
        let blog_dir = &self.config.paths.blog_dir;
        let posts_dir = self.config.paths.posts_dir.to_string_lossy();

        let steps = [
            ShellCommand::new("git").args(["add", &*posts_dir]),
            ShellCommand::new("git").args(["commit", "-m", self.config.post.commit_message.as_str()]),
            ShellCommand::new("git").arg("push"),
        ];

        for step in steps {
            self.runner.run(&step.current_dir(blog_dir))?;
        }

        Ok(())
    }

    /// Failures are logged and otherwise ignored
    fn register_video(&self, video_id: &str) {
        let Some(ref register_command) = self.config.post.register_command else {
            return;
        };
        let Some((program, args)) = split_command_line(register_command) else {
            return;
        };

        let cmd = ShellCommand::new(&program)
            .args(args)
            .arg(format!("--video_id={}", video_id))
            .current_dir(&self.config.paths.blog_dir);

        match self.runner.run(&cmd) {
            Ok(()) => info!("Registered video {}", video_id),
            Err(e) => warn!("Could not register video {}: {}", video_id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::test_data::{test_config, FixedAnswer, RecordingRunner};

    use super::*;

    fn sample_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 2, 27, 6, 20, 53).unwrap()
    }

    #[test]
    fn test_long_form_permalink_runs_whole_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        let runner = RecordingRunner::new(Some("https://youtube.com/watch?v=ABC123"));
        let confirm = FixedAnswer::new(true);

        let mut publisher = PostPublisher::new(&cfg, &runner, &confirm);
        let state = publisher.publish_at("Tom Waits & friends", &sample_now()).unwrap();

        assert_eq!(state, PublishState::Synced);
        assert_eq!(runner.programs(), vec![
            "vim", "git add", "git commit", "git push",
            "youtube_api/add_video.py", "ssh", "rsync",
        ]);

        let calls = runner.calls.borrow();
        assert_eq!(calls[2].args, vec!["commit", "-m", "new song"]);
        assert_eq!(calls[4].args, vec!["--video_id=ABC123"]);
        assert!(calls[5].args[1].ends_with("'https://youtube.com/watch?v=ABC123'"));
        assert_eq!(*confirm.asked.borrow(), 0);

        let post = dir.path().join("_posts").join("2024-02-27-tom-waits-and-friends.markdown");
        let content = fs::read_to_string(post).unwrap();
        assert!(content.contains("title: \"Tom Waits &amp; friends\""));
        assert!(content.contains("permalink: https://youtube.com/watch?v=ABC123"));
    }

    #[test]
    fn test_category_list_does_not_hide_permalink() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        let runner = RecordingRunner::new(Some("https://youtu.be/XYZ789"))
            .with_categories(&["music", "live"]);
        let confirm = FixedAnswer::new(true);

        let mut publisher = PostPublisher::new(&cfg, &runner, &confirm);
        let state = publisher.publish_at("Listed categories", &sample_now()).unwrap();

        assert_eq!(state, PublishState::Synced);
        let post = publisher.post_path("Listed categories", &sample_now());
        assert!(fs::read_to_string(post).unwrap().contains("categories:\n  - music\n  - live\n"));
        assert!(runner.programs().iter().any(|p| p == "ssh"));
    }

    #[test]
    fn test_permalink_without_scheme() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        let runner = RecordingRunner::new(Some("www.youtube.com/watch?v=ABC123"));
        let confirm = FixedAnswer::new(true);

        let mut publisher = PostPublisher::new(&cfg, &runner, &confirm);
        let state = publisher.publish_at("No scheme", &sample_now()).unwrap();

        assert_eq!(state, PublishState::Synced);
        let calls = runner.calls.borrow();
        let register = calls.iter().find(|c| c.program == "youtube_api/add_video.py").unwrap();
        assert_eq!(register.args, vec!["--video_id=ABC123"]);
        let ssh = calls.iter().find(|c| c.program == "ssh").unwrap();
        assert!(ssh.args[1].ends_with("'www.youtube.com/watch?v=ABC123'"));
    }

    #[test]
    fn test_short_form_permalink() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        let runner = RecordingRunner::new(Some("https://youtu.be/XYZ789"));
        let confirm = FixedAnswer::new(true);

        let mut publisher = PostPublisher::new(&cfg, &runner, &confirm);
        let state = publisher.publish_at("Short link", &sample_now()).unwrap();

        assert_eq!(state, PublishState::Synced);
        let calls = runner.calls.borrow();
        let register = calls.iter().find(|c| c.program == "youtube_api/add_video.py").unwrap();
        assert_eq!(register.args, vec!["--video_id=XYZ789"]);
    }

    #[test]
    fn test_other_host_skips_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        let runner = RecordingRunner::new(Some("https://example.com/post"));
        let confirm = FixedAnswer::new(true);

        let mut publisher = PostPublisher::new(&cfg, &runner, &confirm);
        let state = publisher.publish_at("Just words", &sample_now()).unwrap();

        assert_eq!(state, PublishState::Done);
        assert_eq!(runner.programs(), vec!["vim", "git add", "git commit", "git push"]);
    }

    #[test]
    fn test_blank_permalink_skips_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        let runner = RecordingRunner::new(None);
        let confirm = FixedAnswer::new(true);

        let mut publisher = PostPublisher::new(&cfg, &runner, &confirm);
        let state = publisher.publish_at("Nothing linked", &sample_now()).unwrap();

        assert_eq!(state, PublishState::Done);
        assert!(!runner.programs().iter().any(|p| p == "ssh" || p == "rsync"));
    }

    #[test]
    fn test_declined_overwrite_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        let runner = RecordingRunner::new(None);
        let confirm = FixedAnswer::new(false);

        let mut publisher = PostPublisher::new(&cfg, &runner, &confirm);
        let path = publisher.post_path("Existing post", &sample_now());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"hand written\n&raw bytes").unwrap();

        let res = publisher.publish_at("Existing post", &sample_now());

        assert!(matches!(res, Err(PublishError::OverwriteDeclined(_))));
        assert_eq!(publisher.state(), PublishState::Init);
        assert_eq!(*confirm.asked.borrow(), 1);
        assert_eq!(fs::read(&path).unwrap(), b"hand written\n&raw bytes");
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_accepted_overwrite_rewrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        let runner = RecordingRunner::new(None);
        let confirm = FixedAnswer::new(true);

        let mut publisher = PostPublisher::new(&cfg, &runner, &confirm);
        let path = publisher.post_path("Existing post", &sample_now());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "old").unwrap();

        publisher.publish_at("Existing post", &sample_now()).unwrap();

        assert_eq!(*confirm.asked.borrow(), 1);
        assert!(fs::read_to_string(&path).unwrap().starts_with("---\nlayout: post\n"));
    }

    #[test]
    fn test_empty_title_is_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        let runner = RecordingRunner::new(None);
        let confirm = FixedAnswer::new(true);

        let mut publisher = PostPublisher::new(&cfg, &runner, &confirm);
        assert!(matches!(publisher.publish_at("  ", &sample_now()), Err(PublishError::Usage(_))));
        assert!(matches!(publisher.publish_at("?!", &sample_now()), Err(PublishError::Usage(_))));
        assert!(!dir.path().join("_posts").exists());
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_push_failure_stops_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        let runner = RecordingRunner::new(Some("https://youtu.be/XYZ789")).failing_on("git");
        let confirm = FixedAnswer::new(true);

        let mut publisher = PostPublisher::new(&cfg, &runner, &confirm);
        let res = publisher.publish_at("Commit breaks", &sample_now());

        assert!(matches!(res, Err(PublishError::CommandFailed { .. })));
        assert_eq!(publisher.state(), PublishState::Edited);
        assert_eq!(runner.programs(), vec!["vim", "git add"]);
    }

    #[test]
    fn test_registration_failure_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        let runner = RecordingRunner::new(Some("https://youtu.be/XYZ789"))
            .failing_on("youtube_api/add_video.py");
        let confirm = FixedAnswer::new(true);

        let mut publisher = PostPublisher::new(&cfg, &runner, &confirm);
        let state = publisher.publish_at("Register breaks", &sample_now()).unwrap();

        assert_eq!(state, PublishState::Synced);
    }

    #[test]
    fn test_fetch_failure_leaves_committed_post() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        let runner = RecordingRunner::new(Some("https://youtu.be/XYZ789")).failing_on("ssh");
        let confirm = FixedAnswer::new(true);

        let mut publisher = PostPublisher::new(&cfg, &runner, &confirm);
        let res = publisher.publish_at("Remote down", &sample_now());

        assert!(res.is_err());
        assert_eq!(publisher.state(), PublishState::Committed);
        assert!(!runner.programs().iter().any(|p| p == "rsync"));
    }
}
