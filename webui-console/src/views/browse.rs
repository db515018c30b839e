//! Sandbox file browser of a slave

use super::pailer::{basename, PailerRequest};
use anyhow::Result;
use serde::Deserialize;
use std::fmt::Write;
use tracing::warn;
use webui_core::{JsonFetcher, Pid, Snapshot};

/// One entry of a `files/browse.json` listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileEntry {
    pub path: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub mtime: f64,
    #[serde(default)]
    pub nlink: u64,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub gid: String,
}

impl FileEntry {
    pub fn is_dir(&self) -> bool {
        self.mode.starts_with('d')
    }
}

pub struct BrowseView {
    pub slave_id: String,
    pub path: String,
    pub host: Option<String>,
    pub listing: Vec<FileEntry>,
    pub alert: Option<String>,
}

impl BrowseView {
    pub fn new(slave_id: &str, path: &str) -> Self {
        Self {
            slave_id: slave_id.to_string(),
            path: path.to_string(),
            host: None,
            listing: Vec::new(),
            alert: None,
        }
    }

    pub async fn update<F: JsonFetcher>(&mut self, snapshot: &Snapshot, fetcher: &F) {
        self.alert = None;
        self.listing.clear();

        if self.path.is_empty() {
            self.alert = Some("Missing \"path\" request parameter.".into());
            return;
        }
        let Some(slave) = snapshot.slave(&self.slave_id) else {
            self.alert = Some(format!("No slave found with ID: {}", self.slave_id));
            return;
        };
        let host = match Pid::parse(&slave.pid) {
            Ok(pid) => pid.host,
            Err(e) => {
                self.alert = Some(format!("Invalid pid for slave {}: {}", self.slave_id, e));
                return;
            }
        };

        let url = format!("http://{}/files/browse.json", host);
        self.host = Some(host);
        match fetcher
            .fetch_json::<Vec<FileEntry>>(&url, &[("path", self.path.as_str())])
            .await
        {
            Ok(listing) => self.listing = listing,
            Err(e) => {
                warn!("browse of {} failed: {}", self.path, e);
                self.alert = Some(format!("Error browsing path: {}", self.path));
            }
        }
    }

    /// Opens the tailer on a file of the listing.
    pub fn pail(&self, path: &str) -> Result<Option<PailerRequest>> {
        match &self.host {
            Some(host) => Ok(Some(PailerRequest::new(host, path, path)?)),
            None => Ok(None),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(alert) = &self.alert {
            let _ = writeln!(out, "!! {}", alert);
            return out;
        }
        let _ = writeln!(out, "== {} ({})", self.path, self.listing.len());
        for entry in &self.listing {
            let name = basename(&entry.path);
            let suffix = if entry.is_dir() { "/" } else { "" };
            let _ = writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}\t{}{}",
                entry.mode, entry.nlink, entry.uid, entry.gid, entry.size, name, suffix
            );
        }
        out
    }
}
