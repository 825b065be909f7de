//! Deterministic mapping from the catalogue tree to relative paths.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::models::{Article, FilenamePolicy, Issue, Volume};

/// Computes where volumes, issues, and articles live on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveLayout {
    policy: FilenamePolicy,
}

impl ArchiveLayout {
    pub fn new(policy: FilenamePolicy) -> Self {
        Self { policy }
    }

    /// `<volume title>`
    pub fn volume_dir(&self, volume: &Volume) -> PathBuf {
        PathBuf::from(self.segment(&volume.title))
    }

    /// `<volume title>/<issue title minus "<volume title>, ">`
    pub fn issue_dir(&self, volume: &Volume, issue: &Issue) -> PathBuf {
        self.volume_dir(volume)
            .join(self.segment(&issue.directory_name(&volume.title)))
    }

    /// File paths for every article of an issue, in article order.
    ///
    /// Names that collide within the issue get ` (2)`, ` (3)`, ... appended in
    /// document order.
    pub fn article_paths(&self, volume: &Volume, issue: &Issue) -> Vec<PathBuf> {
        let dir = self.issue_dir(volume, issue);
        let mut used = HashSet::new();

        issue
            .articles
            .iter()
            .map(|article| {
                let stem = self.file_stem(article);
                let mut candidate = format!("{stem}.pdf");
                let mut n = 2;
                while !used.insert(candidate.clone()) {
                    candidate = format!("{stem} ({n}).pdf");
                    n += 1;
                }
                dir.join(candidate)
            })
            .collect()
    }

    fn file_stem(&self, article: &Article) -> String {
        self.segment(&article.name)
    }

    fn segment(&self, name: &str) -> String {
        let cleaned = sanitize(name, self.policy);
        match cleaned.as_str() {
            "" => "_".to_string(),
            "." | ".." if self.policy != FilenamePolicy::Verbatim => "_".to_string(),
            _ => cleaned,
        }
    }
}

/// Replace characters that cannot appear in a single path segment.
pub fn sanitize(name: &str, policy: FilenamePolicy) -> String {
    match policy {
        FilenamePolicy::Verbatim => name.to_string(),
        FilenamePolicy::Separators => name
            .chars()
            .map(|ch| match ch {
                '/' | '\\' | '\0' => '_',
                _ => ch,
            })
            .collect(),
        FilenamePolicy::Portable => name
            .chars()
            .map(|ch| match ch {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                _ => ch,
            })
            .collect(),
    }
}
