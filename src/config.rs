/*!
 * Configuration handling for flatmd
 */

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;
use serde::Deserialize;

use crate::error::Result;
use crate::git;
use crate::types::{CompactLevel, HighlightStyle, VisualizationLevel};
use crate::utils::MB;
use crate::{bail, ensure};

/// Command-line arguments for flatmd
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "flatmd",
    version = env!("CARGO_PKG_VERSION"),
    about = "Flatten a project tree into a single Markdown digest for LLM context",
    long_about = "Scans a workspace and emits one (optionally multi-part) Markdown document \
                  with directory structure, file contents, dependency metadata, and diagrams."
)]
pub struct Args {
    /// Workspace directory to flatten
    #[clap(default_value = ".")]
    pub workspace: String,

    /// Output directory (defaults to the workspace root)
    #[clap(short, long)]
    pub output: Option<String>,

    /// Comma-separated list of glob patterns to include (allow-list mode)
    #[clap(long, value_delimiter = ',')]
    pub include_patterns: Vec<String>,

    /// Comma-separated list of glob patterns to exclude
    #[clap(long, value_delimiter = ',')]
    pub exclude_patterns: Vec<String>,

    /// Maximum size of a single input file, in bytes
    #[clap(long, default_value_t = 10 * MB)]
    pub max_file_size: u64,

    /// Maximum size of one output part before rotation, in bytes
    #[clap(long, default_value_t = 5 * MB)]
    pub max_output_size: u64,

    /// Number of threads to use for processing
    #[clap(long, default_value = "4")]
    pub threads: usize,

    /// Respect .gitignore patterns (default: true)
    #[clap(long, default_value = "true")]
    pub respect_gitignore: bool,

    /// Respect .flattenignore patterns (default: true)
    #[clap(long, default_value = "true")]
    pub respect_flattenignore: bool,

    /// Minify file contents (whitespace and comment compaction)
    #[clap(long)]
    pub minify: bool,

    /// Compaction tier applied when minifying
    #[clap(long, value_enum, default_value_t = CompactLevel::default())]
    pub compact_level: CompactLevel,

    /// Group the table of contents by file category
    #[clap(long)]
    pub enhanced_toc: bool,

    /// Order files by the importance heuristic (default: true)
    #[clap(long, default_value = "true")]
    pub prioritize: bool,

    /// Diagram section detail
    #[clap(long, value_enum, default_value_t = VisualizationLevel::default())]
    pub visualization_level: VisualizationLevel,

    /// Marker style for recently changed files
    #[clap(long, value_enum, default_value_t = HighlightStyle::default())]
    pub highlight_style: HighlightStyle,

    /// Days of Git history considered "recent", clamped to [1, 365]
    #[clap(long, default_value = "7")]
    pub change_depth: u32,

    /// Path to a JSON options file overriding the flags above
    #[clap(long)]
    pub options: Option<String>,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Options-bag overlay read from a JSON file; every field optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlattenOptions {
    pub include_patterns: Option<Vec<String>>,
    pub exclude_patterns: Option<Vec<String>>,
    pub max_file_size: Option<u64>,
    pub max_output_file_size: Option<u64>,
    pub respect_gitignore: Option<bool>,
    pub respect_flattenignore: Option<bool>,
    pub minify_output: Option<bool>,
    pub compact_level: Option<CompactLevel>,
    pub enhanced_table_of_contents: Option<bool>,
    pub prioritize_important_files: Option<bool>,
    pub visualization_level: Option<VisualizationLevel>,
    pub highlight_style: Option<HighlightStyle>,
    pub change_history_days: Option<u32>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Workspace directory to flatten
    pub workspace_dir: PathBuf,

    /// Primary output file (`{project}_flattened.md` in the output directory)
    pub output_file: PathBuf,

    /// Project name derived from the workspace directory
    pub project_name: String,

    /// Patterns to include (if empty, include all)
    pub include_patterns: Vec<String>,

    /// Patterns to exclude
    pub exclude_patterns: Vec<String>,

    /// Maximum size of a single input file in bytes
    pub max_file_size: u64,

    /// Output part rotation threshold in bytes
    pub max_output_file_size: u64,

    /// Number of threads to use for processing
    pub num_threads: usize,

    /// Whether to honor .gitignore
    pub respect_gitignore: bool,

    /// Whether to honor .flattenignore
    pub respect_flattenignore: bool,

    /// Whether to minify file contents
    pub minify: bool,

    /// Compaction tier for minification
    pub compact_level: CompactLevel,

    /// Category-grouped table of contents
    pub enhanced_toc: bool,

    /// Importance-ordered file list
    pub prioritize: bool,

    /// Diagram section detail
    pub visualization_level: VisualizationLevel,

    /// Marker style for recently changed files
    pub highlight_style: HighlightStyle,

    /// Git lookback window in days, clamped
    pub change_depth_days: u32,
}

impl Config {
    /// Create configuration from command-line arguments, applying the JSON
    /// options overlay when one is given
    pub fn from_args(args: Args) -> Result<Self> {
        let overlay = match &args.options {
            Some(path) => {
                let content = fs::read_to_string(path)?;
                serde_json::from_str::<FlattenOptions>(&content)?
            }
            None => FlattenOptions::default(),
        };

        let workspace_dir = PathBuf::from(&args.workspace);
        let project_name = workspace_dir
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "workspace".to_string());

        let output_dir = args
            .output
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| workspace_dir.clone());
        let output_file = output_dir.join(format!("{}_flattened.md", project_name));

        Ok(Self {
            workspace_dir,
            output_file,
            project_name,
            include_patterns: overlay.include_patterns.unwrap_or(args.include_patterns),
            exclude_patterns: overlay.exclude_patterns.unwrap_or(args.exclude_patterns),
            max_file_size: overlay.max_file_size.unwrap_or(args.max_file_size),
            max_output_file_size: overlay
                .max_output_file_size
                .unwrap_or(args.max_output_size),
            num_threads: args.threads,
            respect_gitignore: overlay.respect_gitignore.unwrap_or(args.respect_gitignore),
            respect_flattenignore: overlay
                .respect_flattenignore
                .unwrap_or(args.respect_flattenignore),
            minify: overlay.minify_output.unwrap_or(args.minify),
            compact_level: overlay.compact_level.unwrap_or(args.compact_level),
            enhanced_toc: overlay
                .enhanced_table_of_contents
                .unwrap_or(args.enhanced_toc),
            prioritize: overlay
                .prioritize_important_files
                .unwrap_or(args.prioritize),
            visualization_level: overlay
                .visualization_level
                .unwrap_or(args.visualization_level),
            highlight_style: overlay.highlight_style.unwrap_or(args.highlight_style),
            change_depth_days: git::clamp_lookback(
                overlay.change_history_days.unwrap_or(args.change_depth),
            ),
        })
    }

    /// Validate the configuration; failures here abort the run
    pub fn validate(&self) -> Result<()> {
        if !self.workspace_dir.exists() || !self.workspace_dir.is_dir() {
            bail!(
                PathNotFound,
                "workspace directory not found: {}",
                self.workspace_dir.display()
            );
        }
        ensure!(
            self.max_file_size > 0,
            InvalidArgument,
            "max file size must be positive"
        );
        ensure!(
            self.max_output_file_size > 0,
            InvalidArgument,
            "max output file size must be positive"
        );
        ensure!(self.num_threads > 0, InvalidArgument, "threads must be positive");
        Ok(())
    }
}
