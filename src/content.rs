/*!
 * Per-file rendering: headings, secret redaction, minification, and the
 * Markdown-to-plain-text transform
 */

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{CompactLevel, HighlightStyle};
use crate::utils::MB;

/// Maximum length of a navigation anchor
const MAX_ANCHOR_LENGTH: usize = 50;
/// Block comments shorter than this are always kept verbatim
const SHORT_COMMENT_LENGTH: usize = 100;
/// Similarity threshold for treating two line comments as near-duplicates
const SIMILARITY_THRESHOLD: f64 = 0.8;

/// Options the orchestrator hands down per run
#[derive(Debug, Clone, Copy)]
pub struct ContentOptions {
    pub minify: bool,
    pub compact_level: CompactLevel,
    pub highlight_style: HighlightStyle,
}

/// Special names processed despite having no extension
const EXTENSIONLESS_SPECIALS: &[&str] = &[
    "dockerfile",
    "makefile",
    "jenkinsfile",
    "vagrantfile",
    ".gitignore",
    ".dockerignore",
];

/// Generated or machine-managed files that add no value to the digest
const LOW_VALUE_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "composer.lock",
    "gemfile.lock",
    "cargo.lock",
    ".eslintrc",
    ".prettierrc",
    ".editorconfig",
    ".babelrc",
    ".stylelintrc",
    ".browserslistrc",
    ".ds_store",
    "thumbs.db",
    ".gitkeep",
];

/// Binary and media extensions that cannot be flattened as text
const BINARY_EXTENSIONS: &[&str] = &[
    "exe", "dll", "so", "dylib", "bin", "o", "obj", "a", "lib", "pyc", "pyo", "class", "jpg",
    "jpeg", "png", "gif", "bmp", "ico", "webp", "ttf", "woff", "woff2", "eot", "mp3", "mp4",
    "avi", "mov", "mkv", "flv", "wmv", "webm", "wav", "ogg", "flac", "pdf", "doc", "docx",
    "ppt", "pptx", "xls", "xlsx", "zip", "rar", "7z", "tar", "gz", "bz2", "xz", "iso", "db",
    "sqlite", "mdb",
];

/// Extensions the flattener knows how to render
const ALLOWED_EXTENSIONS: &[&str] = &[
    "js", "jsx", "mjs", "cjs", "ts", "tsx", "cts", "mts", "py", "pyi", "pyw", "java", "jav",
    "cs", "csx", "vb", "vbs", "fs", "fsx", "fsi", "c", "h", "cpp", "cxx", "cc", "hpp", "hxx",
    "go", "mod", "sum", "rs", "sql", "mysql", "pgsql", "kt", "kts", "swift", "php", "phtml",
    "rb", "rbw", "rake", "sh", "bash", "zsh", "ps1", "psm1", "psd1", "dart", "r", "rmd", "hs",
    "lhs", "ex", "exs", "scala", "sc", "clj", "cljs", "cljc", "erl", "hrl", "ml", "mli",
    "html", "htm", "xhtml", "css", "scss", "sass", "less", "xml", "xsl", "xsd", "dtd", "json",
    "jsonc", "json5", "vue", "svelte", "yml", "yaml", "toml", "md", "markdown", "mmd",
    "dockerfile", "tf", "tfvars", "hcl", "txt", "rst", "adoc", "ini", "properties", "proto",
    "graphql", "gql", "lua", "pl", "pm",
];

/// Test-file name fragments skipped during content processing
const TEST_NAME_PATTERNS: &[&str] = &[".test.", ".spec.", "test_", "spec_", "__tests__", "__mocks__"];

/// Whether the file is of a type the flattener renders
pub fn is_processable(path: &Path) -> bool {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if EXTENSIONLESS_SPECIALS.contains(&file_name.as_str()) {
        return true;
    }
    if LOW_VALUE_FILES.contains(&file_name.as_str()) {
        return false;
    }
    if BINARY_EXTENSIONS.contains(&ext.as_str()) {
        return false;
    }
    if TEST_NAME_PATTERNS.iter().any(|p| file_name.contains(p)) {
        return false;
    }

    ext.is_empty() || ALLOWED_EXTENSIONS.contains(&ext.as_str())
}

static LANGUAGE_MAP: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("c", "c"),
        ("h", "c"),
        ("cpp", "cpp"),
        ("cxx", "cpp"),
        ("cc", "cpp"),
        ("hpp", "cpp"),
        ("hxx", "cpp"),
        ("cs", "csharp"),
        ("java", "java"),
        ("go", "go"),
        ("rs", "rust"),
        ("swift", "swift"),
        ("kt", "kotlin"),
        ("kts", "kotlin"),
        ("scala", "scala"),
        ("vb", "vb"),
        ("fs", "fsharp"),
        ("fsx", "fsharp"),
        ("ps1", "powershell"),
        ("psm1", "powershell"),
        ("dart", "dart"),
        ("js", "javascript"),
        ("mjs", "javascript"),
        ("cjs", "javascript"),
        ("ts", "typescript"),
        ("tsx", "typescript"),
        ("cts", "typescript"),
        ("mts", "typescript"),
        ("jsx", "jsx"),
        ("py", "python"),
        ("pyi", "python"),
        ("pyw", "python"),
        ("rb", "ruby"),
        ("rbw", "ruby"),
        ("php", "php"),
        ("phtml", "php"),
        ("pl", "perl"),
        ("pm", "perl"),
        ("sh", "bash"),
        ("bash", "bash"),
        ("zsh", "bash"),
        ("r", "r"),
        ("rmd", "r"),
        ("lua", "lua"),
        ("ex", "elixir"),
        ("exs", "elixir"),
        ("erl", "erlang"),
        ("hrl", "erlang"),
        ("hs", "haskell"),
        ("ml", "ocaml"),
        ("mli", "ocaml"),
        ("clj", "clojure"),
        ("cljs", "clojure"),
        ("html", "html"),
        ("htm", "html"),
        ("xhtml", "html"),
        ("css", "css"),
        ("scss", "scss"),
        ("sass", "scss"),
        ("less", "less"),
        ("svg", "svg"),
        ("vue", "vue"),
        ("svelte", "svelte"),
        ("json", "json"),
        ("jsonc", "jsonc"),
        ("json5", "json5"),
        ("xml", "xml"),
        ("xsd", "xml"),
        ("dtd", "xml"),
        ("yaml", "yaml"),
        ("yml", "yaml"),
        ("toml", "toml"),
        ("ini", "ini"),
        ("properties", "properties"),
        ("sql", "sql"),
        ("mysql", "sql"),
        ("pgsql", "sql"),
        ("graphql", "graphql"),
        ("gql", "graphql"),
        ("tf", "terraform"),
        ("tfvars", "terraform"),
        ("hcl", "hcl"),
        ("nix", "nix"),
        ("md", "markdown"),
        ("markdown", "markdown"),
        ("rst", "rst"),
        ("adoc", "asciidoc"),
        ("tex", "latex"),
        ("asm", "asm"),
        ("s", "asm"),
        ("proto", "protobuf"),
    ]
});

/// Map a path to the fence language tag, special-casing extensionless files
pub fn language_for(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if file_name == "dockerfile" || file_name.ends_with(".dockerfile") {
        return "dockerfile".to_string();
    }
    if file_name == "makefile" {
        return "makefile".to_string();
    }
    if file_name == "docker-compose.yml" || file_name == "docker-compose.yaml" {
        return "yaml".to_string();
    }
    if (file_name.contains("kubernetes") || file_name.contains("k8s"))
        && (ext == "yml" || ext == "yaml")
    {
        return "yaml".to_string();
    }

    if let Some((_, lang)) = LANGUAGE_MAP.iter().find(|(e, _)| *e == ext) {
        return lang.to_string();
    }
    if ext.is_empty() {
        "text".to_string()
    } else {
        ext
    }
}

/// Sanitize a file name into a navigation anchor: `[A-Za-z0-9_-]` only,
/// leading non-letters stripped, length bounded.
pub fn anchor_for(file_name: &str) -> String {
    let mut anchor: String = file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    while let Some(first) = anchor.chars().next() {
        if first.is_ascii_alphabetic() {
            break;
        }
        anchor.remove(0);
    }
    anchor.truncate(MAX_ANCHOR_LENGTH);
    anchor
}

static SECRET_ASSIGNMENT: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(password|secret|token|key|auth|credential|apikey|api_key|access_key|client_secret)(s?)(\s*)(:=|=>|:|=|\s+is\s+)(\s*)["'`][^"'`\r\n]*["'`]"#,
    )
    .ok()
});

/// Replace inline secret-looking assignments with a redaction placeholder,
/// preserving the field name and operator.
pub fn redact_secrets(content: &str) -> String {
    match SECRET_ASSIGNMENT.as_ref() {
        Some(re) => re
            .replace_all(content, "${1}${2}${3}${4}${5}\"[REDACTED]\"")
            .into_owned(),
        None => content.to_string(),
    }
}

/// Normalized edit-distance similarity in [0, 1]
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    1.0 - prev[b.len()] as f64 / max_len as f64
}

static TRAILING_WS: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?m)[ \t]+$").ok());
static BLANK_5: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\n{5,}").ok());
static BLANK_3: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\n{3,}").ok());
static BLANK_2: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\n{2,}").ok());
static BLOCK_COMMENT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?s)/\*\*.*?\*/").ok());
static COMMENT_STAR_LINE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\*[ \t]*").ok());
static MULTI_SPACE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[ \t]{2,}").ok());
static COMMENTED_CODE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*//[ \t]*[A-Za-z0-9_$]{1,100}[ \t]*[(=:;{][^\n]{0,1000}$\n?").ok());

/// Structure-preserving whitespace and comment compaction.
///
/// Every stage degrades to the unmodified input rather than failing, and the
/// expensive stages are skipped for oversized inputs.
pub fn minify(content: &str, level: CompactLevel) -> String {
    if content.trim().is_empty() {
        return content.to_string();
    }
    if looks_binary(content) {
        return content.to_string();
    }

    let mut out = content.to_string();

    if let Some(re) = TRAILING_WS.as_ref() {
        out = re.replace_all(&out, "").into_owned();
    }

    let blank = match level {
        CompactLevel::Minimal => (&BLANK_5, "\n\n\n\n"),
        CompactLevel::Moderate => (&BLANK_3, "\n\n"),
        CompactLevel::Aggressive => (&BLANK_2, "\n\n"),
    };
    if let Some(re) = blank.0.as_ref() {
        out = re.replace_all(&out, blank.1).into_owned();
    }

    // Bound input size before the heavier passes
    if out.len() <= 5 * MB as usize {
        out = condense_block_comments(&out, level);
        out = condense_comment_runs(&out, level);
        if level == CompactLevel::Aggressive {
            if let Some(re) = COMMENTED_CODE.as_ref() {
                out = re.replace_all(&out, "").into_owned();
            }
        }
    }

    out
}

fn looks_binary(content: &str) -> bool {
    let sample: String = content.chars().take(1000).collect();
    let control = sample
        .chars()
        .filter(|&c| matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}'))
        .count();
    control > 10
}

fn condense_block_comments(content: &str, level: CompactLevel) -> String {
    let Some(re) = BLOCK_COMMENT.as_ref() else {
        return content.to_string();
    };

    re.replace_all(content, |cap: &regex::Captures| {
        let comment = &cap[0];
        let lower = comment.to_lowercase();
        let is_protected = comment.contains('@')
            || lower.contains("copyright")
            || lower.contains("license");
        let is_marked =
            lower.contains("todo") || lower.contains("fixme") || lower.contains("important");
        let is_short = comment.len() < SHORT_COMMENT_LENGTH;

        if is_protected || is_marked || is_short {
            return comment.to_string();
        }

        match level {
            CompactLevel::Aggressive => {
                let first_line = comment
                    .lines()
                    .next()
                    .unwrap_or("")
                    .trim_start_matches("/**")
                    .trim_end_matches("*/")
                    .replace('*', "");
                let clipped: String = first_line.trim().chars().take(60).collect();
                format!("/** {} ... */", clipped.trim_end())
            }
            CompactLevel::Moderate => {
                let body = comment
                    .trim_start_matches("/**")
                    .trim_end_matches("*/")
                    .replace('*', " ");
                let sentence: String = body
                    .chars()
                    .take_while(|&c| !matches!(c, '.' | '!' | '?'))
                    .collect();
                let sentence = sentence.split_whitespace().collect::<Vec<_>>().join(" ");
                if sentence.is_empty() {
                    normalize_block_comment(comment)
                } else {
                    format!("/** {}. ... */", sentence)
                }
            }
            CompactLevel::Minimal => normalize_block_comment(comment),
        }
    })
    .into_owned()
}

fn normalize_block_comment(comment: &str) -> String {
    let mut out = comment.to_string();
    if let Some(re) = COMMENT_STAR_LINE.as_ref() {
        out = re.replace_all(&out, "\n * ").into_owned();
    }
    if let Some(re) = MULTI_SPACE.as_ref() {
        out = re.replace_all(&out, " ").into_owned();
    }
    out
}

/// Condense long runs of near-duplicate `//` comments with a linear scan
/// rather than a backtracking pattern.
fn condense_comment_runs(content: &str, level: CompactLevel) -> String {
    let ends_with_newline = content.ends_with('\n');
    let lines: Vec<&str> = content.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        if !lines[i].trim_start().starts_with("//") {
            out.push(lines[i].to_string());
            i += 1;
            continue;
        }

        let start = i;
        while i < lines.len() && lines[i].trim_start().starts_with("//") {
            i += 1;
        }
        let run = &lines[start..i];

        if should_condense(run, level) {
            out.push(run[0].to_string());
            out.push(format!("// ... plus {} similar comments", run.len() - 1));
        } else {
            out.extend(run.iter().map(|l| l.to_string()));
        }
    }

    let mut result = out.join("\n");
    if ends_with_newline {
        result.push('\n');
    }
    result
}

fn should_condense(run: &[&str], level: CompactLevel) -> bool {
    if run.len() < 2 {
        return false;
    }
    if level == CompactLevel::Aggressive {
        return run.len() > 3;
    }

    let similar = run[1..]
        .iter()
        .filter(|line| similarity(run[0], line) > SIMILARITY_THRESHOLD)
        .count();
    match level {
        CompactLevel::Moderate => run.len() > 5 && similar as f64 > run.len() as f64 * 0.6,
        CompactLevel::Minimal => run.len() > 7 && similar as f64 > run.len() as f64 * 0.75,
        CompactLevel::Aggressive => unreachable!(),
    }
}

static MD_HR: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?m)^(---|___|\*\*\*)[ \t]*$").ok());
static MD_HEADER: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?m)^(#{1,6})\s+(.+)$").ok());
static MD_IMAGE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"!\[([^\]]+)\]\([^)]*\)").ok());
static MD_LINK: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").ok());
static MD_BOLD_STAR: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").ok());
static MD_BOLD_UNDER: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"__([^_]+)__").ok());
static MD_ITALIC_STAR: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").ok());
static MD_ITALIC_UNDER: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"_([^_]+)_").ok());
static MD_BLOCKQUOTE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?m)^>\s*(.*)$").ok());
static MD_BULLET: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*[*+-][ \t]+(.*)$").ok());
static MD_NUMBERED: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*\d+\.[ \t]+(.*)$").ok());
static MD_FENCE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?s)```\w*\n(.*?)```").ok());
static MD_INLINE_CODE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"`([^`]+)`").ok());
static MD_TABLE_ROW: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\|(.+)\|").ok());
static MD_TABLE_SEP: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*[-:]+[-:\s]*$").ok());

/// Transform Markdown into plain text: underlined headers, bulleted lists,
/// code fences preserved as indented blocks.
pub fn strip_markdown(content: &str) -> String {
    if content.trim().is_empty() {
        return String::new();
    }

    let mut out = content.to_string();

    if let Some(re) = MD_FENCE.as_ref() {
        out = re
            .replace_all(&out, |cap: &regex::Captures| {
                let indented: Vec<String> = cap[1]
                    .trim_end_matches('\n')
                    .lines()
                    .map(|l| format!("    {}", l))
                    .collect();
                format!("\n{}\n", indented.join("\n"))
            })
            .into_owned();
    }
    if let Some(re) = MD_HR.as_ref() {
        out = re.replace_all(&out, "\n---\n").into_owned();
    }
    if let Some(re) = MD_HEADER.as_ref() {
        out = re
            .replace_all(&out, |cap: &regex::Captures| {
                let marks = "=".repeat(cap[1].len());
                format!("\n{} {} {}\n", marks, &cap[2], marks)
            })
            .into_owned();
    }
    if let Some(re) = MD_IMAGE.as_ref() {
        out = re.replace_all(&out, "[Image: ${1}]").into_owned();
    }
    if let Some(re) = MD_LINK.as_ref() {
        out = re.replace_all(&out, "${1}").into_owned();
    }
    if let Some(re) = MD_BOLD_STAR.as_ref() {
        out = re.replace_all(&out, "${1}").into_owned();
    }
    if let Some(re) = MD_BOLD_UNDER.as_ref() {
        out = re.replace_all(&out, "${1}").into_owned();
    }
    if let Some(re) = MD_ITALIC_STAR.as_ref() {
        out = re.replace_all(&out, "${1}").into_owned();
    }
    if let Some(re) = MD_ITALIC_UNDER.as_ref() {
        out = re.replace_all(&out, "${1}").into_owned();
    }
    if let Some(re) = MD_BLOCKQUOTE.as_ref() {
        out = re.replace_all(&out, "   ${1}").into_owned();
    }
    if let Some(re) = MD_BULLET.as_ref() {
        out = re.replace_all(&out, "• ${1}").into_owned();
    }
    if let Some(re) = MD_NUMBERED.as_ref() {
        out = re.replace_all(&out, "• ${1}").into_owned();
    }
    if let Some(re) = MD_INLINE_CODE.as_ref() {
        out = re.replace_all(&out, "${1}").into_owned();
    }
    if let Some(re) = MD_TABLE_ROW.as_ref() {
        out = re.replace_all(&out, "${1}").into_owned();
    }
    if let Some(re) = MD_TABLE_SEP.as_ref() {
        out = re.replace_all(&out, "").into_owned();
    }
    if let Some(re) = BLANK_3.as_ref() {
        out = re.replace_all(&out, "\n\n").into_owned();
    }

    out.trim().to_string()
}

/// Format a non-empty dependency list as a Markdown section
pub fn format_dependencies(dependencies: &[String]) -> String {
    if dependencies.is_empty() {
        return String::new();
    }
    let mut out = String::from("### Dependencies\n\n");
    for dep in dependencies {
        out.push_str(&format!("- `{}`\n", dep));
    }
    out.push('\n');
    out
}

/// Render the heading line for one file section
pub fn heading(relative_path: &str, recently_changed: bool, style: HighlightStyle) -> String {
    let file_name = relative_path.rsplit('/').next().unwrap_or(relative_path);
    let mut out = format!("\n## {} <a id=\"{}\"></a>", relative_path, anchor_for(file_name));
    if recently_changed {
        out.push_str(style.marker());
    }
    out.push_str("\n\n");
    out
}

/// Render one complete file block: heading, optional change marker,
/// dependency list, and the (possibly minified, redacted) content.
pub fn render_file_block(
    path: &Path,
    relative_path: &str,
    content: &str,
    dependencies: &[String],
    recently_changed: bool,
    opts: &ContentOptions,
) -> String {
    let mut block = heading(relative_path, recently_changed, opts.highlight_style);
    block.push_str(&format_dependencies(dependencies));

    let mut body = redact_secrets(content);
    if opts.minify {
        body = minify(&body, opts.compact_level);
    }

    let language = language_for(path);
    if language == "markdown" {
        block.push_str(&strip_markdown(&body));
        block.push('\n');
    } else {
        block.push_str(&format!("```{}\n", language));
        block.push_str(&body);
        if !body.ends_with('\n') {
            block.push('\n');
        }
        block.push_str("```\n");
    }

    block
}

/// Render an inline error placeholder block for an unreadable file
pub fn render_error_block(
    relative_path: &str,
    kind: std::io::ErrorKind,
    style: HighlightStyle,
) -> String {
    let message = match kind {
        std::io::ErrorKind::NotFound => "[Error: File not found]",
        std::io::ErrorKind::PermissionDenied => "[Error: Permission denied]",
        _ => "[Error: Could not read file]",
    };
    let mut block = heading(relative_path, false, style);
    block.push_str(message);
    block.push('\n');
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn opts(minify: bool, level: CompactLevel) -> ContentOptions {
        ContentOptions {
            minify,
            compact_level: level,
            highlight_style: HighlightStyle::Emoji,
        }
    }

    #[test]
    fn anchors_are_sanitized_and_bounded() {
        assert_eq!(anchor_for("main.rs"), "main_rs");
        assert_eq!(anchor_for("123-start.js"), "start_js");
        let long = "a".repeat(200);
        assert_eq!(anchor_for(&long).len(), 50);
    }

    #[test]
    fn processable_gate() {
        assert!(is_processable(Path::new("src/main.rs")));
        assert!(is_processable(Path::new("Dockerfile")));
        assert!(is_processable(Path::new("Makefile")));
        assert!(!is_processable(Path::new("logo.png")));
        assert!(!is_processable(Path::new("package-lock.json")));
        assert!(!is_processable(Path::new("app.test.js")));
    }

    #[test]
    fn language_lookup_with_specials() {
        assert_eq!(language_for(Path::new("main.rs")), "rust");
        assert_eq!(language_for(Path::new("Dockerfile")), "dockerfile");
        assert_eq!(language_for(Path::new("docker-compose.yml")), "yaml");
        assert_eq!(language_for(Path::new("strange.xyz")), "xyz");
        assert_eq!(language_for(Path::new("LICENSE")), "text");
    }

    #[test]
    fn secrets_are_redacted_preserving_field_and_operator() {
        let src = r#"let password = "hunter2"; let port = "8080";"#;
        let out = redact_secrets(src);
        assert!(out.contains("password"));
        assert!(out.contains("[REDACTED]"));
        assert!(!out.contains("hunter2"));
        assert!(out.contains("8080"));
    }

    #[test]
    fn redacts_colon_and_arrow_operators() {
        let out = redact_secrets(r#"api_key: "abc123def""#);
        assert!(!out.contains("abc123def"));
        let out = redact_secrets(r#"secret => 'sh'"#);
        // single-quoted literals are covered too
        assert!(!out.contains("'sh'"));
    }

    #[test]
    fn minify_strips_trailing_whitespace() {
        let out = minify("let x = 1;   \nlet y = 2;\t\n", CompactLevel::Minimal);
        assert_eq!(out, "let x = 1;\nlet y = 2;\n");
    }

    #[test]
    fn minimal_collapse_is_idempotent() {
        let src = format!("a{}b\n", "\n".repeat(9));
        let once = minify(&src, CompactLevel::Minimal);
        let twice = minify(&once, CompactLevel::Minimal);
        assert_eq!(once, twice);
    }

    #[test]
    fn aggressive_collapses_blank_runs_to_one() {
        let out = minify("a\n\n\n\n\nb\n", CompactLevel::Aggressive);
        assert_eq!(out, "a\n\nb\n");
    }

    #[test]
    fn aggressive_condenses_similar_comment_runs() {
        let mut src = String::new();
        for i in 0..12 {
            src.push_str(&format!("// generated row {}\n", i));
        }
        src.push_str("fn main() {}\n");
        let out = minify(&src, CompactLevel::Aggressive);
        assert!(out.contains("// generated row 0"));
        assert!(out.contains("plus 11 similar comments"));
        assert!(!out.contains("// generated row 5"));
    }

    #[test]
    fn short_comment_runs_are_untouched() {
        let src = "// one\n// two\nfn main() {}\n";
        let out = minify(src, CompactLevel::Minimal);
        assert_eq!(out, src);
    }

    #[test]
    fn protected_block_comments_survive_aggressive() {
        let src = format!(
            "/** Copyright 2024 Example Corp. {} */\nfn main() {{}}\n",
            "filler text ".repeat(20)
        );
        let out = minify(&src, CompactLevel::Aggressive);
        assert!(out.contains("Copyright 2024 Example Corp."));
    }

    #[test]
    fn long_plain_block_comment_is_condensed_when_aggressive() {
        let src = format!(
            "/** This helper does things. {} */\nfn main() {{}}\n",
            "more words here ".repeat(20)
        );
        let out = minify(&src, CompactLevel::Aggressive);
        assert!(out.contains("... */"));
        assert!(out.len() < src.len());
    }

    #[test]
    fn similarity_bounds() {
        assert_eq!(similarity("abc", "abc"), 1.0);
        assert!(similarity("// row 1", "// row 2") > 0.8);
        assert!(similarity("abc", "xyz") < 0.4);
    }

    #[test]
    fn markdown_is_stripped_to_plain_text() {
        let src = "# Title\n\nSome **bold** and *italic* text with [a link](http://x).\n\n- item one\n- item two\n\n```rust\nfn main() {}\n```\n";
        let out = strip_markdown(src);
        assert!(out.contains("= Title ="));
        assert!(out.contains("Some bold and italic text with a link."));
        assert!(out.contains("• item one"));
        assert!(out.contains("    fn main() {}"));
        assert!(!out.contains("```"));
    }

    #[test]
    fn render_block_fences_with_language() {
        let out = render_file_block(
            Path::new("src/main.rs"),
            "src/main.rs",
            "fn main() {}\n",
            &[],
            false,
            &opts(false, CompactLevel::Minimal),
        );
        assert!(out.starts_with("\n## src/main.rs <a id=\"main_rs\"></a>\n\n"));
        assert!(out.contains("```rust\nfn main() {}\n```\n"));
    }

    #[test]
    fn render_block_includes_dependencies_and_marker() {
        let out = render_file_block(
            Path::new("src/main.js"),
            "src/main.js",
            "require('./utils.js');\n",
            &["./utils.js".to_string()],
            true,
            &opts(false, CompactLevel::Minimal),
        );
        assert!(out.contains("🔄 **[RECENTLY MODIFIED]**"));
        assert!(out.contains("### Dependencies"));
        assert!(out.contains("- `./utils.js`"));
    }

    #[test]
    fn error_blocks_name_the_failure() {
        let out = render_error_block(
            "gone.rs",
            std::io::ErrorKind::NotFound,
            HighlightStyle::Emoji,
        );
        assert!(out.contains("[Error: File not found]"));
        let out = render_error_block(
            "locked.rs",
            std::io::ErrorKind::PermissionDenied,
            HighlightStyle::Emoji,
        );
        assert!(out.contains("[Error: Permission denied]"));
    }
}
