/*!
 * The flatten pipeline: sequences discovery, filtering, per-file rendering,
 * diagram generation and the summary/TOC prepend
 *
 * All run state lives on one `Flattener` value constructed per invocation;
 * nothing is shared between runs. Per-file failures are absorbed into a
 * skipped count and inline error placeholders; only parameter validation and
 * cancellation abort the run.
 */

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::config::Config;
use crate::content::{self, ContentOptions};
use crate::diagram;
use crate::error::{FlattenError, Result};
use crate::git;
use crate::rules::IgnoreRules;
use crate::types::FileRecord;
use crate::utils::{estimate_tokens, format_file_size, sanitize_message};
use crate::walker::{self, FileWalker};
use crate::writer::OutputWriter;

/// Files processed with full concurrency per batch, barrier between batches
pub const BATCH_SIZE: usize = 10;

const BASIC_TOC_LIMIT: usize = 15;
const CATEGORY_TOC_LIMIT: usize = 10;

/// Progress sink: message plus a fraction delta; deltas over one run sum to 1
pub type ProgressFn<'p> = dyn FnMut(&str, f64) + 'p;

/// End-of-run statistics handed to the reporter
#[derive(Debug, Clone)]
pub struct FlattenOutcome {
    pub output_file: PathBuf,
    pub files_processed: usize,
    pub files_skipped: usize,
    pub directories: usize,
    pub total_bytes: u64,
    pub parts_written: usize,
    pub duration: Duration,
}

/// One flatten run over one workspace
pub struct Flattener<'a> {
    config: &'a Config,
    cancel: Arc<AtomicBool>,
}

impl<'a> Flattener<'a> {
    pub fn new(config: &'a Config, cancel: Arc<AtomicBool>) -> Self {
        Self { config, cancel }
    }

    /// Run the full pipeline, reporting progress through `progress`
    pub fn run(&self, progress: &mut ProgressFn<'_>) -> Result<FlattenOutcome> {
        let start = Instant::now();

        progress("Validating parameters", 0.0);
        self.config.validate()?;

        // Setup: ignore layers, change set, output writer
        let mut rules = IgnoreRules::new(
            self.config.include_patterns.clone(),
            self.config.exclude_patterns.clone(),
        );
        if self.config.respect_gitignore {
            rules.load_gitignore(&self.config.workspace_dir);
        }
        if self.config.respect_flattenignore {
            rules.load_flattenignore(&self.config.workspace_dir);
        }

        let changed: HashSet<String> =
            match git::recently_changed(&self.config.workspace_dir, self.config.change_depth_days)
            {
                Ok(paths) => paths.into_iter().collect(),
                Err(e) => {
                    progress(
                        &sanitize_message(&format!("Change detection unavailable: {}", e)),
                        0.0,
                    );
                    HashSet::new()
                }
            };

        let mut writer = OutputWriter::new(
            &self.config.output_file,
            self.config.max_output_file_size,
            &self.config.project_name,
        )?;
        progress("Preparing output", 0.05);

        // Directory structure listing
        let walker = FileWalker::new(&self.config.workspace_dir, &rules);
        writer.write_block(&format!(
            "# Directory Structure\n\n```\n{}```\n",
            walker.render_tree()
        ));
        progress("Directory structure written", 0.05);

        // Discovery and prioritization
        let mut skipped = 0usize;
        let mut files: Vec<PathBuf> = Vec::new();
        for path in walker.discover(&self.config.include_patterns) {
            if writer.is_own_output(&path) || !content::is_processable(&path) {
                continue;
            }
            let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            if size > self.config.max_file_size {
                progress(
                    &sanitize_message(&format!(
                        "Skipping large file {} ({})",
                        walker.relative(&path),
                        format_file_size(size)
                    )),
                    0.0,
                );
                skipped += 1;
                continue;
            }
            files.push(path);
        }
        if self.config.prioritize {
            walker.prioritize(&mut files, &changed);
        }
        progress(&format!("Discovered {} files", files.len()), 0.1);

        // Batched parallel rendering, sequential writes after each batch
        writer.write_block("\n# Files Content\n");

        let opts = ContentOptions {
            minify: self.config.minify,
            compact_level: self.config.compact_level,
            highlight_style: self.config.highlight_style,
        };

        let total = files.len().max(1);
        let mut records: BTreeMap<String, FileRecord> = BTreeMap::new();
        let mut order: Vec<String> = Vec::new();
        let mut done = 0usize;

        for batch in files.chunks(BATCH_SIZE) {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(FlattenError::Cancelled);
            }

            let rendered: Vec<(String, String, Option<FileRecord>)> = batch
                .par_iter()
                .map(|path| {
                    let rel = walker.relative(path);
                    match fs::read_to_string(path) {
                        Ok(text) => {
                            let imports = crate::deps::detect(&text, path);
                            let block =
                                content::render_file_block(path, &rel, &text, &imports, changed.contains(&rel), &opts);
                            let record = FileRecord {
                                absolute_path: path.clone(),
                                relative_path: rel.clone(),
                                size: text.len() as u64,
                                language: content::language_for(path),
                                imports,
                                importance: walker::importance(&rel, text.len() as u64),
                            };
                            (rel, block, Some(record))
                        }
                        Err(e) => {
                            let block = content::render_error_block(
                                &rel,
                                e.kind(),
                                self.config.highlight_style,
                            );
                            (rel, block, None)
                        }
                    }
                })
                .collect();

            for (rel, block, record) in rendered {
                writer.write_block(&block);
                match record {
                    Some(record) => {
                        order.push(rel.clone());
                        records.insert(rel, record);
                    }
                    None => skipped += 1,
                }
            }

            done += batch.len();
            progress(
                &format!("Processing files {}/{}", done, files.len()),
                0.7 * batch.len() as f64 / total as f64,
            );
        }
        if files.is_empty() {
            progress("No files to process", 0.7);
        }

        // Directory count and diagrams
        let directories = walker.count_directories();
        progress(&format!("Scanned {} directories", directories), 0.02);

        let diagrams = diagram::generate(&records, self.config.visualization_level);
        if !diagrams.is_empty() {
            writer.write_block(&diagrams);
        }
        progress("Diagrams generated", 0.05);

        // Summary and TOC prepended to the primary part
        let total_bytes: u64 = records.values().map(|r| r.size).sum();
        let prefix = self.summary_block(&records, &order, directories, total_bytes, start.elapsed());
        writer.finalize(&prefix);
        progress("Flattening complete", 0.03);

        Ok(FlattenOutcome {
            output_file: writer.first_part_path(),
            files_processed: records.len(),
            files_skipped: skipped,
            directories,
            total_bytes,
            parts_written: writer.parts_written(),
            duration: start.elapsed(),
        })
    }

    fn summary_block(
        &self,
        records: &BTreeMap<String, FileRecord>,
        order: &[String],
        directories: usize,
        total_bytes: u64,
        elapsed: Duration,
    ) -> String {
        let mut out = format!(
            "# Project Digest: {}\n\nGenerated on: {}\nSource: `{}`\n\n",
            self.config.project_name,
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            self.config.workspace_dir.display()
        );

        out.push_str(&format!(
            "Repository Summary:\nFiles analyzed: {}\nDirectories scanned: {}\nTotal size: {}\nEstimated tokens: ~{}\nProcessing time: {:.2}s\n\n",
            records.len(),
            directories,
            format_file_size(total_bytes),
            estimate_tokens(total_bytes),
            elapsed.as_secs_f64()
        ));

        if self.config.enhanced_toc {
            out.push_str(&enhanced_toc(records));
        } else {
            out.push_str(&basic_toc(order));
        }
        out.push_str("\n---\n\n");
        out
    }
}

fn toc_entry(relative_path: &str) -> String {
    let file_name = relative_path.rsplit('/').next().unwrap_or(relative_path);
    format!(
        "- [{}](#{})\n",
        relative_path,
        content::anchor_for(file_name)
    )
}

/// Flat listing of the first files in processing order
fn basic_toc(order: &[String]) -> String {
    let mut out = String::from("## Table of Contents\n\n");
    for rel in order.iter().take(BASIC_TOC_LIMIT) {
        out.push_str(&toc_entry(rel));
    }
    out
}

fn category_for(record: &FileRecord) -> String {
    let file_name = record
        .relative_path
        .rsplit('/')
        .next()
        .unwrap_or(&record.relative_path);
    if walker::is_config_file(file_name) {
        return "Configuration".to_string();
    }
    match record.language.as_str() {
        "markdown" | "rst" | "asciidoc" | "text" => "Documentation".to_string(),
        lang => {
            let mut chars = lang.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => "Other".to_string(),
            }
        }
    }
}

/// Category-grouped listing, most important files first within each group
fn enhanced_toc(records: &BTreeMap<String, FileRecord>) -> String {
    let mut groups: BTreeMap<String, Vec<&FileRecord>> = BTreeMap::new();
    for record in records.values() {
        groups.entry(category_for(record)).or_default().push(record);
    }

    let mut out = String::from("## Table of Contents\n\n");
    for (category, mut members) in groups {
        members.sort_by(|a, b| {
            b.importance
                .total_cmp(&a.importance)
                .then_with(|| a.relative_path.cmp(&b.relative_path))
        });

        out.push_str(&format!("### {}\n\n", category));
        for record in members.iter().take(CATEGORY_TOC_LIMIT) {
            let file_name = record
                .relative_path
                .rsplit('/')
                .next()
                .unwrap_or(&record.relative_path);
            out.push_str(&format!(
                "- [{}](#{}) ({}, priority: {:.2})\n",
                record.relative_path,
                content::anchor_for(file_name),
                format_file_size(record.size),
                record.importance
            ));
        }
        if members.len() > CATEGORY_TOC_LIMIT {
            out.push_str(&format!(
                "- ...and {} more\n",
                members.len() - CATEGORY_TOC_LIMIT
            ));
        }
        out.push('\n');
    }
    out
}
