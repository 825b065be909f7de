// src/models/catalogue.rs

//! Volume, Issue, and Article data structures.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The full archive tree: volumes in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalogue {
    /// When the catalogue was assembled (absent for hand-written fixtures)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,

    pub volumes: Vec<Volume>,
}

impl Catalogue {
    pub fn new(volumes: Vec<Volume>) -> Self {
        Self {
            generated_at: None,
            volumes,
        }
    }

    /// Load a catalogue from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save the catalogue as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn issue_count(&self) -> usize {
        self.volumes.iter().map(|v| v.issues.len()).sum()
    }

    pub fn article_count(&self) -> usize {
        self.volumes.iter().map(Volume::article_count).sum()
    }
}

/// A volume grouping, e.g. "Vol. 32".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    pub title: String,
    pub issues: Vec<Issue>,
}

impl Volume {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            issues: Vec::new(),
        }
    }

    pub fn article_count(&self) -> usize {
        self.issues.iter().map(|i| i.articles.len()).sum()
    }
}

/// A single issue within a volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Display title, e.g. "Vol. 32, No. 1"
    pub title: String,

    /// Cover thumbnail URL
    #[serde(default)]
    pub image: String,

    /// Canonical page for the issue
    pub url: String,

    /// Articles in document order
    #[serde(default, alias = "stories")]
    pub articles: Vec<Article>,
}

impl Issue {
    /// Directory name for this issue below its volume directory.
    ///
    /// Only the exact `"<volume>, "` prefix is removed; other whitespace is kept.
    pub fn directory_name(&self, volume_title: &str) -> String {
        let prefix = format!("{volume_title}, ");
        match self.title.strip_prefix(&prefix) {
            Some(rest) => rest.to_string(),
            None => self.title.clone(),
        }
    }
}

/// A single paper with its downloadable PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub name: String,
    pub pdf: String,
}

impl Article {
    pub fn new(name: impl Into<String>, pdf: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pdf: pdf.into(),
        }
    }
}

/// Grouping key for an issue title.
pub fn volume_key(title: &str) -> &str {
    title.split(',').next().unwrap_or(title)
}
