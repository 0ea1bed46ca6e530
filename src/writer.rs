/*!
 * Append-only Markdown writer with size-based rotation
 *
 * One block is always appended whole to exactly one part file; the rotation
 * check runs once per block, before the write. Continuation parts are named
 * `{base}_part{N}{ext}` and open with a continuation header. Rotation is
 * never retroactive: written content stays in its part.
 */

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{FlattenError, Result};

pub struct OutputWriter {
    directory: PathBuf,
    base_name: String,
    extension: String,
    project_name: String,
    max_bytes: u64,
    part: usize,
    current_path: PathBuf,
    /// Bytes appended to the current part, header excluded
    current_size: u64,
    /// Blocks dropped after the single recovery retry failed
    pub write_errors: usize,
}

impl OutputWriter {
    /// `output_path` is the primary part; its name seeds the rotation scheme
    pub fn new(output_path: &Path, max_bytes: u64, project_name: &str) -> Result<Self> {
        if max_bytes == 0 {
            return Err(FlattenError::Config(
                "maximum output file size must be positive".to_string(),
            ));
        }

        let directory = output_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let file_name = output_path
            .file_name()
            .ok_or_else(|| {
                FlattenError::Config(format!(
                    "output path has no file name: {}",
                    output_path.display()
                ))
            })?
            .to_string_lossy()
            .into_owned();

        let (base_name, extension) = match file_name.rfind('.') {
            Some(dot) if dot > 0 => (file_name[..dot].to_string(), file_name[dot..].to_string()),
            _ => (file_name, ".md".to_string()),
        };

        fs::create_dir_all(&directory)?;
        fs::write(output_path, "")?;

        Ok(Self {
            directory,
            base_name,
            extension,
            project_name: project_name.to_string(),
            max_bytes,
            part: 1,
            current_path: output_path.to_path_buf(),
            current_size: 0,
            write_errors: 0,
        })
    }

    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    /// Path of the primary part, the one the summary is prepended to
    pub fn first_part_path(&self) -> PathBuf {
        self.directory
            .join(format!("{}{}", self.base_name, self.extension))
    }

    /// Number of parts written so far
    pub fn parts_written(&self) -> usize {
        self.part
    }

    /// True when `path` is the primary part or any rotated part of this run
    pub fn is_own_output(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            return false;
        };
        if path.parent() != Some(self.directory.as_path()) {
            return false;
        }
        name == format!("{}{}", self.base_name, self.extension)
            || (name.starts_with(&format!("{}_part", self.base_name))
                && name.ends_with(&self.extension))
    }

    /// Append one block atomically, rotating first when it would not fit
    pub fn write_block(&mut self, text: &str) {
        let len = text.len() as u64;
        if self.current_size + len > self.max_bytes && self.current_size > 0 {
            self.rotate();
        }
        if self.append(text).is_err() {
            // one recovery attempt: the output directory may have vanished
            if fs::create_dir_all(&self.directory).is_err() || self.append(text).is_err() {
                self.write_errors += 1;
                return;
            }
        }
        self.current_size += len;
    }

    /// `write_block` with a trailing newline
    pub fn write_line(&mut self, text: &str) {
        self.write_block(&format!("{}\n", text));
    }

    fn rotate(&mut self) {
        self.part += 1;
        self.current_path = self.directory.join(format!(
            "{}_part{}{}",
            self.base_name, self.part, self.extension
        ));
        self.current_size = 0;
        let header = format!("# Project Digest Continued: {}\n\n", self.project_name);
        if fs::write(&self.current_path, header).is_err() {
            self.write_errors += 1;
        }
    }

    fn append(&self, text: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.current_path)?;
        file.write_all(text.as_bytes())
    }

    /// Prepend the generated summary and TOC to the primary part. If the
    /// part cannot be re-read the summary is written alone rather than
    /// failing the run.
    pub fn finalize(&mut self, prefix: &str) {
        let first = self.first_part_path();
        let body = fs::read_to_string(&first).unwrap_or_default();
        if fs::write(&first, format!("{}{}", prefix, body)).is_err() {
            self.write_errors += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_are_appended_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("digest.md");
        let mut writer = OutputWriter::new(&out, 1024, "demo").unwrap();
        writer.write_block("alpha\n");
        writer.write_line("beta");

        let content = fs::read_to_string(&out).unwrap();
        assert_eq!(content, "alpha\nbeta\n");
        assert_eq!(writer.parts_written(), 1);
        assert_eq!(writer.write_errors, 0);
    }

    #[test]
    fn rotation_at_size_budget() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("digest.md");
        let mut writer = OutputWriter::new(&out, 10, "demo").unwrap();

        writer.write_block("aaaaaaaa"); // 8 bytes, fits
        writer.write_block("bbbbbbbb"); // would exceed, rotates
        writer.write_block("cccccccc"); // rotates again

        assert_eq!(writer.parts_written(), 3);
        assert_eq!(fs::read_to_string(&out).unwrap(), "aaaaaaaa");

        let part2 = fs::read_to_string(dir.path().join("digest_part2.md")).unwrap();
        assert!(part2.starts_with("# Project Digest Continued: demo\n\n"));
        assert!(part2.ends_with("bbbbbbbb"));
    }

    #[test]
    fn oversized_single_block_still_lands_somewhere() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("digest.md");
        let mut writer = OutputWriter::new(&out, 4, "demo").unwrap();

        // larger than the whole budget: written to the current empty part
        writer.write_block("0123456789");
        assert_eq!(writer.parts_written(), 1);
        assert_eq!(fs::read_to_string(&out).unwrap(), "0123456789");
    }

    #[test]
    fn finalize_prepends_to_first_part() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("digest.md");
        let mut writer = OutputWriter::new(&out, 1024, "demo").unwrap();
        writer.write_block("body\n");
        writer.finalize("summary\n\n");

        assert_eq!(fs::read_to_string(&out).unwrap(), "summary\n\nbody\n");
    }

    #[test]
    fn own_output_parts_are_recognized() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("digest.md");
        let writer = OutputWriter::new(&out, 1024, "demo").unwrap();

        assert!(writer.is_own_output(&out));
        assert!(writer.is_own_output(&dir.path().join("digest_part2.md")));
        assert!(!writer.is_own_output(&dir.path().join("readme.md")));
    }
}
