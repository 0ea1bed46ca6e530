/*!
 * Layered ignore rules deciding which files may reach the output
 *
 * The built-in sensitive layers are always active: content that looks like a
 * credential store must never be flattened into a document that may leave the
 * machine, no matter what patterns the caller supplies.
 */

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::glob;

/// Substring markers that flag a path as carrying secret material
static SENSITIVE_CONTENT_MARKERS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "secret_api_key",
        "database_password",
        "very-secret-key",
        "api_token",
        "password",
    ]
});

/// Exact file names that are never flattened
static SENSITIVE_FILENAMES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        ".env",
        ".env.local",
        ".env.development",
        ".env.test",
        ".env.production",
        "secrets.json",
        "secrets.yaml",
        "secrets.yml",
        "secrets.properties",
        "credential",
        "credentials.json",
        "credentials.yaml",
        "credentials.yml",
        "api-key.txt",
        "apikey.json",
        "token.json",
        "auth.config",
        ".npmrc",
        ".pypirc",
        ".gem/credentials",
    ]
});

/// Regex forms of sensitive names (env files, keys, certs, credential stores)
static SENSITIVE_FILE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\.env(\.|$)",
        r"\bsecrets?\.\w+$",
        r"\bcredentials?\.\w+$",
        r"\bpassword\b",
        r"\bapi[_-]?keys?\b",
        r"\btoken\b",
        r"\.key$",
        r"\.pem$",
        r"\.pfx$",
        r"auth\.config",
    ]
    .iter()
    .filter_map(|p| Regex::new(&format!("(?i){}", p)).ok())
    .collect()
});

/// Build, dependency-cache and VCS directories excluded by default
static STANDARD_EXCLUDE_DIRS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "node_modules/",
        "dist/",
        "build/",
        "out/",
        "target/",
        "bin/",
        "obj/",
        ".git/",
        ".svn/",
        "coverage/",
        ".next/",
        "venv/",
        "env/",
        "__pycache__/",
        ".vscode/",
        ".idea/",
        "test/",
        "tests/",
    ]
});

/// Log and temp extensions excluded by default
static STANDARD_EXCLUDE_EXTENSIONS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![".log", ".tmp", ".temp", ".swp", ".DS_Store", ".bak", ".cache"]
});

/// Decides per relative path whether it survives every ignore layer.
///
/// Layers are evaluated in a fixed order and short-circuit on the first hit;
/// the built-in layers cannot be bypassed by caller configuration.
pub struct IgnoreRules {
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub gitignore_patterns: Vec<String>,
    pub flattenignore_patterns: Vec<String>,
}

impl IgnoreRules {
    pub fn new(include_patterns: Vec<String>, exclude_patterns: Vec<String>) -> Self {
        Self {
            include_patterns,
            exclude_patterns,
            gitignore_patterns: Vec::new(),
            flattenignore_patterns: Vec::new(),
        }
    }

    /// Load `.gitignore` patterns from the workspace root, if present
    pub fn load_gitignore(&mut self, root: &Path) {
        self.gitignore_patterns = read_gitignore_patterns(root);
    }

    /// Load `.flattenignore` patterns from the workspace root, if present
    pub fn load_flattenignore(&mut self, root: &Path) {
        self.flattenignore_patterns = read_flattenignore_patterns(root);
    }

    /// True when the path must not appear in the flattened output
    pub fn should_ignore(&self, relative_path: &str) -> bool {
        self.ignored(relative_path, true)
    }

    /// Directory variant: include patterns target files, so the allow-list
    /// layer is skipped. `relative_path` must carry a trailing slash so
    /// directory-shaped rules line up.
    pub fn should_ignore_dir(&self, relative_path: &str) -> bool {
        self.ignored(relative_path, false)
    }

    fn ignored(&self, relative_path: &str, apply_includes: bool) -> bool {
        let path = relative_path.replace('\\', "/");
        let lower = path.to_lowercase();

        // 1. Sensitive-content markers, highest priority
        if SENSITIVE_CONTENT_MARKERS.iter().any(|m| lower.contains(m)) {
            return true;
        }

        // 2. Sensitive filenames, exact or as a path segment
        for name in SENSITIVE_FILENAMES.iter() {
            if lower == *name
                || lower.ends_with(&format!("/{}", name))
                || lower.contains(&format!("/{}/", name))
            {
                return true;
            }
        }

        // 3. Sensitive filename patterns
        if SENSITIVE_FILE_PATTERNS.iter().any(|re| re.is_match(&path)) {
            return true;
        }

        // 4. Standard build/output directories and log/temp extensions
        for dir in STANDARD_EXCLUDE_DIRS.iter() {
            if path.starts_with(dir) || path.contains(&format!("/{}", dir)) {
                return true;
            }
        }
        for ext in STANDARD_EXCLUDE_EXTENSIONS.iter() {
            if lower.ends_with(&ext.to_lowercase()) {
                return true;
            }
        }

        // 5. Allow-list mode: with include patterns set, a path must match one
        if apply_includes
            && !self.include_patterns.is_empty()
            && !self
                .include_patterns
                .iter()
                .any(|p| glob::matches(&path, p))
        {
            return true;
        }

        // 6. Explicit excludes
        if self.exclude_patterns.iter().any(|p| glob::matches(&path, p)) {
            return true;
        }

        // 7. .gitignore patterns, rewritten so non-rooted entries match at any depth
        for pattern in &self.gitignore_patterns {
            let effective = if !pattern.starts_with('/') && !pattern.starts_with("**/") {
                format!("**/{}", pattern)
            } else {
                pattern.clone()
            };
            if glob::matches(&path, &effective) {
                return true;
            }
        }

        // 8. .flattenignore patterns, applied last
        if self
            .flattenignore_patterns
            .iter()
            .any(|p| glob::matches(&path, p))
        {
            return true;
        }

        false
    }
}

/// Read `.gitignore` line by line and normalize entries into glob patterns.
///
/// Blank lines and comments are skipped. Negated (`!`) lines are parsed but
/// deliberately dropped, preserving the long-standing behavior that negation
/// is not applied.
pub fn read_gitignore_patterns(root: &Path) -> Vec<String> {
    let mut patterns = Vec::new();
    let Ok(content) = fs::read_to_string(root.join(".gitignore")) else {
        return patterns;
    };

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let mut pattern = trimmed.to_string();
        if let Some(rooted) = pattern.strip_prefix('/') {
            pattern = rooted.to_string();
        } else if !pattern.starts_with("**/") {
            pattern = format!("**/{}", pattern);
        }
        if pattern.ends_with('/') {
            pattern.push_str("**");
        }
        patterns.push(pattern);
    }

    patterns
}

/// Read `.flattenignore`: one pattern per line, `#` comments allowed
pub fn read_flattenignore_patterns(root: &Path) -> Vec<String> {
    let Ok(content) = fs::read_to_string(root.join(".flattenignore")) else {
        return Vec::new();
    };

    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn empty_rules() -> IgnoreRules {
        IgnoreRules::new(Vec::new(), Vec::new())
    }

    #[test]
    fn sensitive_names_blocked_with_empty_config() {
        let rules = empty_rules();
        assert!(rules.should_ignore(".env"));
        assert!(rules.should_ignore("config/.env.production"));
        assert!(rules.should_ignore("secrets.json"));
        assert!(rules.should_ignore("deploy/credentials.yaml"));
        assert!(rules.should_ignore("certs/server.pem"));
        assert!(rules.should_ignore("id_rsa.key"));
    }

    #[test]
    fn sensitive_content_markers_blocked() {
        let rules = empty_rules();
        assert!(rules.should_ignore("notes/SECRET_API_KEY.txt"));
        assert!(rules.should_ignore("my-password-list.md"));
    }

    #[test]
    fn standard_directories_blocked() {
        let rules = empty_rules();
        assert!(rules.should_ignore("node_modules/react/index.js"));
        assert!(rules.should_ignore("src/dist/bundle.js"));
        assert!(rules.should_ignore("target/debug/app"));
        assert!(rules.should_ignore("app.log"));
        assert!(rules.should_ignore("scratch.tmp"));
    }

    #[test]
    fn plain_source_survives_all_layers() {
        let rules = empty_rules();
        assert!(!rules.should_ignore("src/main.rs"));
        assert!(!rules.should_ignore("README.md"));
    }

    #[test]
    fn include_patterns_switch_to_allow_list() {
        let rules = IgnoreRules::new(vec!["**/*.js".to_string()], Vec::new());
        assert!(!rules.should_ignore("src/app.js"));
        assert!(rules.should_ignore("src/app.py"));
    }

    #[test]
    fn exclude_patterns_apply_after_includes() {
        let rules = IgnoreRules::new(Vec::new(), vec!["docs/**".to_string()]);
        assert!(rules.should_ignore("docs/guide.md"));
        assert!(!rules.should_ignore("src/guide.md"));
    }

    #[test]
    fn explicit_exclude_cannot_unblock_sensitive() {
        // an empty exclude list still keeps the built-ins active
        let rules = IgnoreRules::new(Vec::new(), Vec::new());
        assert!(rules.should_ignore(".env"));
    }

    #[test]
    fn gitignore_patterns_match_at_any_depth() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = File::create(dir.path().join(".gitignore")).unwrap();
        writeln!(f, "# comment").unwrap();
        writeln!(f, "*.generated").unwrap();
        writeln!(f, "vendor/").unwrap();
        writeln!(f, "!keep.generated").unwrap();
        writeln!(f, "/rooted.txt").unwrap();

        let mut rules = empty_rules();
        rules.load_gitignore(dir.path());

        assert!(rules.should_ignore("deep/nested/file.generated"));
        assert!(rules.should_ignore("vendor/lib.c"));
        assert!(rules.should_ignore("rooted.txt"));
        // negation lines are dropped, so the file stays ignored
        assert!(rules.should_ignore("keep.generated"));
    }

    #[test]
    fn flattenignore_applies_last() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = File::create(dir.path().join(".flattenignore")).unwrap();
        writeln!(f, "**/*.snap").unwrap();

        let mut rules = empty_rules();
        rules.load_flattenignore(dir.path());

        assert!(rules.should_ignore("ui/__snapshots__/button.snap"));
        assert!(!rules.should_ignore("ui/button.jsx"));
    }
}
