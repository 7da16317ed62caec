use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// One eligible document found in the upload directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    pub name: String,
    pub last_modified: DateTime<Utc>,
    pub size_bytes: u64,
}

impl DocumentEntry {
    pub fn human_size(&self) -> String {
        const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

        let mut size = self.size_bytes as f64;
        let mut unit = 0;
        while size >= 1024.0 && unit < UNITS.len() - 1 {
            size /= 1024.0;
            unit += 1;
        }

        if unit == 0 {
            format!("{} {}", self.size_bytes, UNITS[0])
        } else {
            format!("{:.1} {}", size, UNITS[unit])
        }
    }
}

/// A document that passed download validation and can be streamed back.
#[derive(Debug, Clone)]
pub struct ResolvedDocument {
    pub path: PathBuf,
    pub name: String,
    pub size_bytes: u64,
}
