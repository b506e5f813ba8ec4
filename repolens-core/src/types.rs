//! Core data type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File category buckets, determined solely by lowercased file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileCategory {
    /// `.js`, `.jsx`, `.ts`, `.tsx`
    Script,
    /// `.json`
    Data,
    /// `.md`, `.markdown`
    Documentation,
}

impl FileCategory {
    /// Classify a file by its extension (without the leading dot)
    ///
    /// Matching is case-insensitive. Unrecognized extensions return `None`;
    /// such files still contribute to file and line totals, just to no bucket.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "js" | "jsx" | "ts" | "tsx" => Some(Self::Script),
            "json" => Some(Self::Data),
            "md" | "markdown" => Some(Self::Documentation),
            _ => None,
        }
    }
}

/// Per-category file counts for one analyzed snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStats {
    pub script_files: usize,
    pub data_files: usize,
    pub doc_files: usize,
}

impl ProjectStats {
    /// Record one file in its category bucket
    pub fn record(&mut self, category: FileCategory) {
        match category {
            FileCategory::Script => self.script_files += 1,
            FileCategory::Data => self.data_files += 1,
            FileCategory::Documentation => self.doc_files += 1,
        }
    }

    /// Total number of categorized files (always <= the overall file count)
    pub fn categorized(&self) -> usize {
        self.script_files + self.data_files + self.doc_files
    }
}

/// Aggregate statistics for one repository snapshot
///
/// Produced once per `analyze` call and immutable after construction. The
/// counts are content-determined; only `analysis_date` depends on the clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Regular files visited under the snapshot root
    pub file_count: usize,
    /// Sum of `\n`-delimited segment counts over all visited files
    pub total_lines: usize,
    /// Per-category breakdown
    pub stats: ProjectStats,
    /// Wall-clock time at which cleanup completed
    pub analysis_date: DateTime<Utc>,
}
