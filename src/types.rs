/*!
 * Core types and data structures for the flatmd pipeline
 */

use std::path::PathBuf;

use clap::ValueEnum;
use serde::Deserialize;

/// Everything recorded about one processed file, kept for the lifetime of a
/// single flatten run and consumed by the TOC and diagram generators.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Absolute path on disk
    pub absolute_path: PathBuf,
    /// Path relative to the workspace root, forward slashes
    pub relative_path: String,
    /// Size in bytes
    pub size: u64,
    /// Language tag used for the fenced code block
    pub language: String,
    /// Imported identifiers in first-seen order, de-duplicated
    pub imports: Vec<String>,
    /// Heuristic importance score in [0, 1]
    pub importance: f64,
}

/// Marker styles for recently changed files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightStyle {
    #[default]
    /// `🔄 **[RECENTLY MODIFIED]**`
    Emoji,
    /// `[RECENTLY MODIFIED]`
    Text,
    /// `**RECENTLY MODIFIED**`
    Markdown,
}

impl HighlightStyle {
    pub fn marker(self) -> &'static str {
        match self {
            HighlightStyle::Emoji => " 🔄 **[RECENTLY MODIFIED]**",
            HighlightStyle::Text => " [RECENTLY MODIFIED]",
            HighlightStyle::Markdown => " **RECENTLY MODIFIED**",
        }
    }
}

/// Blank-line and comment compaction tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompactLevel {
    /// Collapse only runs of five or more blank lines
    #[default]
    Minimal,
    /// Collapse runs of three or more blank lines
    Moderate,
    /// Collapse every run of two or more blank lines
    Aggressive,
}

/// How much of the diagram section to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationLevel {
    None,
    Basic,
    #[default]
    Medium,
    Detailed,
    Comprehensive,
}
