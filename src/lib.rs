pub mod config;
pub mod logger;
pub mod error;
pub mod command;
pub mod prompt;
pub mod front_matter;
pub mod text_utils;
pub mod video_id;
pub mod remote_fetch;
pub mod publisher;
pub mod util;
mod query_string;
#[cfg(test)]
mod test_data;

pub use error::{PublishError, Result};
