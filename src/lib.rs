/*!
 * flatmd - Flatten a project tree into one Markdown digest for LLM context
 *
 * This library scans a workspace, filters it through layered ignore rules,
 * and concatenates the surviving files into a single (optionally multi-part)
 * Markdown document with directory structure, dependency metadata, and
 * Mermaid diagrams.
 */

pub mod config;
pub mod content;
pub mod deps;
pub mod diagram;
pub mod error;
pub mod flatten;
pub mod git;
pub mod glob;
pub mod report;
pub mod rules;
pub mod types;
pub mod utils;
pub mod walker;
pub mod writer;


// Re-export main components for easier access
pub use config::{Args, Config, FlattenOptions};
pub use error::{FlattenError, Result};
pub use flatten::{FlattenOutcome, Flattener, ProgressFn, BATCH_SIZE};
pub use report::{FlattenReport, Reporter};
pub use rules::IgnoreRules;
pub use types::{CompactLevel, FileRecord, HighlightStyle, VisualizationLevel};
pub use utils::{estimate_tokens, format_file_size, sanitize_message};
pub use walker::FileWalker;
pub use writer::OutputWriter;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
