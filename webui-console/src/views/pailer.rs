//! Log / file tailing links

use anyhow::{Context, Result};
use reqwest::Url;

/// A request to open the file tailer on `host` for `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PailerRequest {
    pub host: String,
    pub path: String,
    pub url: String,
    pub window_title: String,
}

impl PailerRequest {
    pub fn new(host: &str, path: &str, title: &str) -> Result<Self> {
        let base = format!("http://{}/files/read.json", host);
        let url = Url::parse_with_params(&base, &[("path", path)])
            .with_context(|| format!("invalid pailer host {}", host))?;
        Ok(Self {
            host: host.to_string(),
            path: path.to_string(),
            url: url.to_string(),
            window_title: format!("{} ({})", title, host),
        })
    }
}

/// Result of asking a page for its log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLink {
    /// The process was started without a log directory.
    NoLogDir,
    Pailer(PailerRequest),
}

impl LogLink {
    pub fn for_process(log_dir: Option<&str>, host: &str, path: &str, title: &str) -> Result<Self> {
        match log_dir {
            Some(dir) if !dir.is_empty() => Ok(LogLink::Pailer(PailerRequest::new(host, path, title)?)),
            _ => Ok(LogLink::NoLogDir),
        }
    }
}

/// Last component of `path`, ignoring one trailing `/`.
pub fn basename(path: &str) -> &str {
    if path == "/" {
        return path;
    }
    let path = path.strip_suffix('/').unwrap_or(path);
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}
