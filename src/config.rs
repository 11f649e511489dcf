use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::Deserialize;

use crate::error::{PublishError, Result};
use crate::util::os_helper::get_user_name;

pub const CFG_FILE_NAME: &str = "postcast.toml";

#[derive(Deserialize, Debug, Clone)]
pub struct Paths {
    #[serde(default = "default_blog_dir")]
    pub blog_dir: PathBuf,
    #[serde(default = "default_posts_dir")]
    pub posts_dir: PathBuf,
    #[serde(default = "default_post_ext")]
    pub post_ext: String,
    pub music_dir: PathBuf,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Remote {
    pub host: String,
    #[serde(default = "get_user_name")]
    pub user: String,
    pub work_dir: String,
    #[serde(default = "default_downloader")]
    pub downloader: String,
    #[serde(default = "default_decoder_package")]
    pub decoder_package: String,
    #[serde(default = "default_audio_format")]
    pub audio_format: String,
    #[serde(default = "default_audio_quality")]
    pub audio_quality: String,
    #[serde(default = "default_downloader_flags")]
    pub downloader_flags: Vec<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Post {
    #[serde(default = "default_layout")]
    pub layout: String,
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
    pub editor: Option<String>,
    pub register_command: Option<String>,
}

impl Default for Post {
    fn default() -> Self {
        Post {
            layout: default_layout(),
            commit_message: default_commit_message(),
            editor: None,
            register_command: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Copy, Clone)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub paths: Paths,
    pub remote: Remote,
    #[serde(default)]
    pub post: Post,
    pub log: Option<Log>,
}

fn default_blog_dir() -> PathBuf { PathBuf::from(".") }

fn default_posts_dir() -> PathBuf { PathBuf::from("_posts") }

fn default_post_ext() -> String { "markdown".to_string() }

fn default_downloader() -> String { "../bin/youtube-dl".to_string() }

fn default_decoder_package() -> String { "libav-tools".to_string() }

fn default_audio_format() -> String { "mp3".to_string() }

fn default_audio_quality() -> String { "0".to_string() }

fn default_downloader_flags() -> Vec<String> { vec!["-t".to_string()] }

fn default_layout() -> String { "post".to_string() }

fn default_commit_message() -> String { "new song".to_string() }

impl Config {
    /// Directory holding the posts, as seen from the process working directory
    pub fn posts_path(&self) -> PathBuf {
        self.paths.blog_dir.join(&self.paths.posts_dir)
    }

    /// Editor from the config file, then $VISUAL, then $EDITOR, then vim
    pub fn editor(&self) -> String {
        if let Some(ref editor) = self.post.editor {
            return editor.clone();
        }

        for var in ["VISUAL", "EDITOR"] {
            if let Ok(editor) = env::var(var) {
                if !editor.trim().is_empty() {
                    return editor;
                }
            }
        }

        "vim".to_string()
    }
}

fn parse_path(path: PathBuf) -> PathBuf {
    let Some(str_path) = path.to_str() else {
        return path;
    };

    if str_path.starts_with("${exe_dir}") {
        let exe_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.to_path_buf()));
        if let Some(exe_dir) = exe_dir {
            return PathBuf::from(str_path.replace("${exe_dir}", &exe_dir.to_string_lossy()));
        }
    } else if str_path == "~" || str_path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(str_path.trim_start_matches('~').trim_start_matches('/'));
        }
    }

    path
}

pub fn parse_config(cfg_content: &str) -> Result<Config> {
    let mut cfg: Config = toml::from_str::<Config>(cfg_content)
        .map_err(|e| PublishError::Config(format!("Error parsing configuration file: {}", e)))?;

    if cfg.remote.host.trim().is_empty() {
        return Err(PublishError::Config("remote.host must not be empty".to_string()));
    }

    cfg.paths.blog_dir = parse_path(cfg.paths.blog_dir);
    cfg.paths.music_dir = parse_path(cfg.paths.music_dir);
    if let Some(mut log) = cfg.log.take() {
        log.location = log.location.map(parse_path);
        cfg.log = Some(log);
    }

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> Result<Config> {
    let cfg_content = fs::read_to_string(cfg_path).map_err(|e| {
        PublishError::Config(format!("Error opening configuration file {}: {}", cfg_path.display(), e))
    })?;

    parse_config(&cfg_content)
}

pub fn find_config_path() -> Option<PathBuf> {
    let exe_dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()));

    let candidates = [
        exe_dir,
        env::current_dir().ok(),
        dirs::config_dir(),
    ];

    candidates.into_iter()
        .flatten()
        .map(|dir| dir.join(CFG_FILE_NAME))
        .find(|path| path.exists())
}

/// Reads the given configuration, or the first one found in the default locations
pub fn open_config(cfg_path: Option<PathBuf>) -> Result<Config> {
    let config_path = match cfg_path.or_else(find_config_path) {
        Some(path) => path,
        None => return Err(PublishError::Config(format!("Could not find {}", CFG_FILE_NAME))),
    };

    let mut config = read_config(&config_path)?;

    if let Some(mut log) = config.log.take() {
        let location = log.location.unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(env::temp_dir)
                .join("postcast").join("log").join("postcast.log")
        });
        log.location = Some(location);
        config.log = Some(log);
    }

    Ok(config)
}
