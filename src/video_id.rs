use url::{ParseError, Url};

use crate::query_string::QueryString;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoHost {
    /// `youtube.com/watch?v=<id>`
    LongForm,
    /// `youtu.be/<id>`
    ShortForm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoLink {
    pub url: String,
    pub host: VideoHost,
    pub id: Option<String>,
}

impl VideoLink {
    /// Recognizes YouTube links, with or without a scheme. Any other host gives
    /// `None`, and nothing downstream (registration, remote fetch, sync) runs for it.
    /// `url` keeps the text as written; the downloader understands both forms.
    pub fn parse(url: &str) -> Option<VideoLink> {
        let parsed = parse_lenient(url.trim())?;
        let host = detect_host(parsed.host_str()?)?;

        let id = match host {
            VideoHost::LongForm => long_form_id(&parsed),
            VideoHost::ShortForm => short_form_id(&parsed),
        };

        Some(VideoLink {
            url: url.trim().to_string(),
            host,
            id,
        })
    }
}

fn parse_lenient(url: &str) -> Option<Url> {
    match Url::parse(url) {
        Ok(parsed) => Some(parsed),
        Err(ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{}", url)).ok(),
        Err(_) => None,
    }
}

fn detect_host(host: &str) -> Option<VideoHost> {
    let host = host.to_ascii_lowercase();
    if host == "youtube.com" || host.ends_with(".youtube.com") {
        Some(VideoHost::LongForm)
    } else if host == "youtu.be" || host.ends_with(".youtu.be") {
        Some(VideoHost::ShortForm)
    } else {
        None
    }
}

fn long_form_id(url: &Url) -> Option<String> {
    let query = QueryString::from(url.query()?);
    query.get("v").map(|v| v.to_string())
}

fn short_form_id(url: &Url) -> Option<String> {
    // Links shared with a query keep the id at the end of it
    let residue = match url.query() {
        Some(query) if query.contains('/') => query,
        _ => url.path(),
    };

    residue.split('/')
        .filter(|segment| !segment.is_empty())
        .last()
        .map(|segment| segment.to_string())
}
