/*!
 * Tree discovery: the flat candidate file list, the indented directory
 * listing, and the importance heuristic used to order files
 */

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use walkdir::WalkDir;

use crate::content;
use crate::glob;
use crate::rules::IgnoreRules;
use crate::utils::MB;

/// Manifest and build-configuration names that anchor a project
static CONFIG_FILES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "package.json",
        "cargo.toml",
        "pyproject.toml",
        "setup.py",
        "requirements.txt",
        "go.mod",
        "pom.xml",
        "build.gradle",
        "settings.gradle",
        "composer.json",
        "gemfile",
        "cmakelists.txt",
        "tsconfig.json",
        "webpack.config.js",
        "vite.config.js",
        "vite.config.ts",
        "dockerfile",
        "docker-compose.yml",
        "docker-compose.yaml",
        "makefile",
        ".gitignore",
    ]
});

/// Conventional entry-point names, per ecosystem
static ENTRY_POINTS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "main.rs",
        "lib.rs",
        "mod.rs",
        "main.go",
        "main.py",
        "app.py",
        "__init__.py",
        "index.js",
        "index.ts",
        "main.js",
        "main.ts",
        "app.js",
        "app.ts",
        "server.js",
        "index.html",
        "main.c",
        "main.cpp",
        "program.cs",
        "main.java",
        "application.java",
    ]
});

/// Source extensions that carry the project's logic
static SOURCE_EXTENSIONS: Lazy<Vec<(&'static str, f64)>> = Lazy::new(|| {
    vec![
        ("rs", 0.75),
        ("go", 0.75),
        ("py", 0.75),
        ("ts", 0.75),
        ("tsx", 0.75),
        ("js", 0.72),
        ("jsx", 0.72),
        ("java", 0.72),
        ("cs", 0.72),
        ("cpp", 0.7),
        ("c", 0.7),
        ("h", 0.7),
        ("hpp", 0.7),
        ("rb", 0.7),
        ("php", 0.7),
        ("swift", 0.7),
        ("kt", 0.7),
        ("scala", 0.7),
        ("ex", 0.7),
        ("erl", 0.7),
        ("hs", 0.7),
        ("dart", 0.7),
        ("vue", 0.7),
        ("svelte", 0.7),
        ("sql", 0.7),
    ]
});

/// Documentation extensions, below source but above the rest
static DOC_EXTENSIONS: Lazy<Vec<(&'static str, f64)>> = Lazy::new(|| {
    vec![
        ("md", 0.65),
        ("markdown", 0.65),
        ("rst", 0.6),
        ("adoc", 0.6),
        ("txt", 0.6),
    ]
});

const TEST_PATH_MARKERS: &[&str] = &["/test/", "/tests/", "/__tests__/", ".test.", ".spec."];

/// Whether `file_name` is a known manifest/build-configuration file
pub fn is_config_file(file_name: &str) -> bool {
    CONFIG_FILES.contains(&file_name.to_lowercase().as_str())
}

/// Heuristic score in [0, 1] used to front-load the most relevant files
pub fn importance(relative_path: &str, size: u64) -> f64 {
    let path = relative_path.replace('\\', "/").to_lowercase();
    let file_name = path.rsplit('/').next().unwrap_or(&path);
    let ext = file_name.rsplit('.').next().unwrap_or("");

    let mut score = if CONFIG_FILES.contains(&file_name) {
        0.9
    } else if ENTRY_POINTS.contains(&file_name) {
        0.85
    } else if let Some((_, s)) = SOURCE_EXTENSIONS.iter().find(|(e, _)| *e == ext) {
        *s
    } else if let Some((_, s)) = DOC_EXTENSIONS.iter().find(|(e, _)| *e == ext) {
        *s
    } else {
        0.5
    };

    if TEST_PATH_MARKERS.iter().any(|m| path.contains(m)) || file_name.starts_with("test_") {
        score *= 0.8;
    }
    if size > MB {
        score *= 0.9;
    }
    if size > 5 * MB {
        score *= 0.8;
    }

    score
}

/// Discovers candidate files and renders the directory listing for one
/// workspace root, with every path filtered through the ignore layers.
pub struct FileWalker<'a> {
    root: &'a Path,
    rules: &'a IgnoreRules,
}

impl<'a> FileWalker<'a> {
    pub fn new(root: &'a Path, rules: &'a IgnoreRules) -> Self {
        Self { root, rules }
    }

    /// Relativize against the root, forward slashes
    pub fn relative(&self, path: &Path) -> String {
        path.strip_prefix(self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    /// Collect every file surviving the ignore layers.
    ///
    /// With include patterns the walk is restricted to matches of at least
    /// one pattern (results unioned and de-duplicated); without them every
    /// file is a candidate. Traversal errors are skipped, never fatal.
    pub fn discover(&self, include_patterns: &[String]) -> Vec<PathBuf> {
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut found = Vec::new();

        for entry in WalkDir::new(self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if !e.file_type().is_dir() || e.path() == self.root {
                    return true;
                }
                let rel = format!("{}/", self.relative(e.path()));
                !self.rules.should_ignore_dir(&rel)
            })
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = self.relative(entry.path());
            if !include_patterns.is_empty()
                && !include_patterns.iter().any(|p| glob::matches(&rel, p))
            {
                continue;
            }
            if self.rules.should_ignore(&rel) {
                continue;
            }
            if seen.insert(entry.path().to_path_buf()) {
                found.push(entry.path().to_path_buf());
            }
        }

        found
    }

    /// Order files most-relevant-first: changed files lead, then importance
    /// descending, ties broken by case-insensitive filename for stable output.
    pub fn prioritize(&self, files: &mut [PathBuf], changed: &HashSet<String>) {
        let mut keyed: Vec<(bool, f64, String, usize)> = files
            .iter()
            .enumerate()
            .map(|(i, path)| {
                let rel = self.relative(path);
                let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
                let name = rel.rsplit('/').next().unwrap_or(&rel).to_lowercase();
                (changed.contains(&rel), importance(&rel, size), name, i)
            })
            .collect();

        keyed.sort_by(|a, b| {
            b.0.cmp(&a.0)
                .then(b.1.total_cmp(&a.1))
                .then_with(|| a.2.cmp(&b.2))
        });

        let reordered: Vec<PathBuf> = keyed.iter().map(|(_, _, _, i)| files[*i].clone()).collect();
        files.clone_from_slice(&reordered);
    }

    /// Render the filtered tree as an indented `[DIR]`/`[FILE]` listing
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        self.visit(self.root, 0, &mut out);
        out
    }

    fn visit(&self, dir: &Path, depth: usize, out: &mut String) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };

        let mut entries: Vec<_> = entries.filter_map(|e| e.ok()).collect();
        entries.sort_by_key(|e| e.file_name().to_string_lossy().to_lowercase());

        let indent = "  ".repeat(depth);
        for entry in entries {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if path.is_dir() {
                let rel = format!("{}/", self.relative(&path));
                if self.rules.should_ignore_dir(&rel) {
                    continue;
                }
                out.push_str(&format!("{}[DIR] {}/\n", indent, name));
                self.visit(&path, depth + 1, out);
            } else {
                let rel = self.relative(&path);
                if self.rules.should_ignore(&rel) || !content::is_processable(&path) {
                    continue;
                }
                out.push_str(&format!("{}[FILE] {}\n", indent, name));
            }
        }
    }

    /// Count directories surviving the ignore layers, root excluded
    pub fn count_directories(&self) -> usize {
        WalkDir::new(self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                if !e.file_type().is_dir() || e.path() == self.root {
                    return true;
                }
                let rel = format!("{}/", self.relative(e.path()));
                !self.rules.should_ignore_dir(&rel)
            })
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir() && e.path() != self.root)
            .count()
    }
}
