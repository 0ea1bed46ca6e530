/*!
 * Best-effort import detection across ~20 language families
 *
 * Each rule-set is a handful of regexes keyed by file extension. This is a
 * heuristic, not a parser: false positives and negatives are acceptable, and
 * malformed input must never make it panic.
 */

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

/// One language family: the extensions it claims and the regexes that pull
/// out referenced modules (capture group 1, or the first non-empty group).
struct RuleSet {
    extensions: &'static [&'static str],
    patterns: Vec<Regex>,
}

fn build(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().filter_map(|p| Regex::new(p).ok()).collect()
}

static RULE_SETS: Lazy<Vec<RuleSet>> = Lazy::new(|| {
    vec![
        RuleSet {
            extensions: &["js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts"],
            patterns: build(&[
                r#"import\s+[^'"\n]*?from\s+['"]([^'"]+)['"]"#,
                r#"import\s*\(\s*['"]([^'"]+)['"]\s*\)"#,
                r#"require\s*\(\s*['"]([^'"]+)['"]\s*\)"#,
                r#"import\s+['"]([^'"]+)['"]"#,
            ]),
        },
        RuleSet {
            extensions: &["py", "pyi", "pyw"],
            patterns: build(&[
                r"(?m)^\s*import\s+([\w.]+)",
                r"(?m)^\s*from\s+([\w.]+)\s+import",
            ]),
        },
        RuleSet {
            extensions: &["java", "jav"],
            patterns: build(&[r"import\s+(?:static\s+)?([\w.]+?)(?:\.\*)?\s*;"]),
        },
        RuleSet {
            extensions: &["cs", "csx"],
            patterns: build(&[r"using\s+([\w.]+)\s*;"]),
        },
        RuleSet {
            extensions: &["c", "h", "cpp", "cxx", "cc", "hpp", "hxx"],
            patterns: build(&[r#"#include\s*[<"]([^>"]+)[>"]"#]),
        },
        RuleSet {
            extensions: &["rs"],
            patterns: build(&[r"use\s+([\w:]+)", r"extern\s+crate\s+(\w+)"]),
        },
        RuleSet {
            extensions: &["php", "phtml", "php3", "php4", "php5"],
            patterns: build(&[
                r#"require(?:_once)?\s*\(?\s*['"]([^'"]+)['"]"#,
                r#"include(?:_once)?\s*\(?\s*['"]([^'"]+)['"]"#,
                r"use\s+([\w\\]+)\s*;",
            ]),
        },
        RuleSet {
            extensions: &["swift"],
            patterns: build(&[r"import\s+(\w+)"]),
        },
        RuleSet {
            extensions: &["kt", "kts"],
            patterns: build(&[r"import\s+([\w.]+)"]),
        },
        RuleSet {
            extensions: &["dart"],
            patterns: build(&[
                r#"import\s+['"]([^'"]+)['"]"#,
                r#"part\s+['"]([^'"]+)['"]"#,
            ]),
        },
        RuleSet {
            extensions: &["rb", "rbw", "rake"],
            patterns: build(&[
                r#"require(?:_relative)?\s+['"]([^'"]+)['"]"#,
                r#"load\s+['"]([^'"]+)['"]"#,
            ]),
        },
        RuleSet {
            extensions: &["html", "htm", "xhtml"],
            patterns: build(&[
                r#"<script[^>]*\ssrc=['"]([^'"]+)['"]"#,
                r#"<link[^>]*\shref=['"]([^'"]+)['"]"#,
                r#"<img[^>]*\ssrc=['"]([^'"]+)['"]"#,
            ]),
        },
        RuleSet {
            extensions: &["css", "scss", "less"],
            patterns: build(&[
                r#"@import\s+['"]([^'"]+)['"]"#,
                r#"@use\s+['"]([^'"]+)['"]"#,
                r#"url\(\s*['"]?([^'")]+)['"]?\s*\)"#,
            ]),
        },
        RuleSet {
            extensions: &["ex", "exs"],
            patterns: build(&[
                r"alias\s+([\w.]+)",
                r"import\s+(\w+)",
                r"require\s+(\w+)",
            ]),
        },
        RuleSet {
            extensions: &["erl", "hrl"],
            patterns: build(&[r#"-(?:include|include_lib)\s*\(\s*"([^"]+)"\s*\)"#]),
        },
        RuleSet {
            extensions: &["tf", "tfvars", "hcl"],
            patterns: build(&[r#"(?:module|provider|resource)\s+"([^"]+)""#]),
        },
    ]
});

static GO_IMPORT_BLOCK: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?s)import\s*\((.*?)\)").ok());
static GO_IMPORT_SINGLE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#"import\s+"([^"]+)""#).ok());
static QUOTED: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r#""([^"]+)""#).ok());

static DOCKER_FROM: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?im)^FROM\s+([\w./:@-]+)").ok());
static YAML_IMAGE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#"(?m)^\s*(?:-\s+)?image:\s*['"]?([^\s'"]+)"#).ok());
static SQL_TABLE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:FROM|JOIN)\s+([A-Za-z_]\w*)").ok());

const SQL_KEYWORDS: &[&str] = &["WHERE", "SELECT", "GROUP", "ORDER", "HAVING", "LIMIT"];

/// Extract referenced module/include identifiers from `content`, dispatching
/// on the extension of `path`. Results keep first-seen order, de-duplicated.
pub fn detect(content: &str, path: &Path) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if file_name == "dockerfile" || ext == "dockerfile" {
        apply(&DOCKER_FROM, content, &mut found);
        return found;
    }

    match ext.as_str() {
        "go" => {
            if let Some(re) = GO_IMPORT_BLOCK.as_ref() {
                for block in re.captures_iter(content) {
                    if let Some(inner) = block.get(1) {
                        apply(&QUOTED, inner.as_str(), &mut found);
                    }
                }
            }
            apply(&GO_IMPORT_SINGLE, content, &mut found);
        }
        "yml" | "yaml" => {
            // only compose/kubernetes manifests carry image references
            if file_name.contains("docker-compose")
                || content.contains("apiVersion")
                || content.contains("kind:")
            {
                apply(&YAML_IMAGE, content, &mut found);
            }
        }
        "sql" | "mysql" | "pgsql" | "sqlite" => {
            if let Some(re) = SQL_TABLE.as_ref() {
                for cap in re.captures_iter(content) {
                    if let Some(m) = cap.get(1) {
                        let table = m.as_str();
                        if !SQL_KEYWORDS.contains(&table.to_uppercase().as_str()) {
                            push_unique(&mut found, table);
                        }
                    }
                }
            }
        }
        _ => {
            for rules in RULE_SETS.iter() {
                if rules.extensions.contains(&ext.as_str()) {
                    for re in &rules.patterns {
                        for cap in re.captures_iter(content) {
                            if let Some(m) = first_group(&cap) {
                                push_unique(&mut found, m);
                            }
                        }
                    }
                    break;
                }
            }
        }
    }

    found
}

fn apply(re: &Option<Regex>, content: &str, found: &mut Vec<String>) {
    if let Some(re) = re.as_ref() {
        for cap in re.captures_iter(content) {
            if let Some(m) = first_group(&cap) {
                push_unique(found, m);
            }
        }
    }
}

fn first_group<'t>(cap: &'t regex::Captures) -> Option<&'t str> {
    (1..cap.len())
        .filter_map(|i| cap.get(i))
        .map(|m| m.as_str())
        .find(|s| !s.is_empty())
}

fn push_unique(found: &mut Vec<String>, dep: &str) {
    let dep = dep.trim();
    if !dep.is_empty() && !found.iter().any(|d| d == dep) {
        found.push(dep.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::detect;
    use std::path::Path;

    #[test]
    fn javascript_imports() {
        let src = r#"
import fs from 'fs';
const path = require('./utils.js');
import './side-effect.css';
"#;
        let deps = detect(src, Path::new("src/main.js"));
        assert_eq!(deps, vec!["fs", "./utils.js", "./side-effect.css"]);
    }

    #[test]
    fn python_imports() {
        let src = "import os\nimport os\nfrom collections import OrderedDict\n";
        let deps = detect(src, Path::new("app.py"));
        assert_eq!(deps, vec!["os", "collections"]);
    }

    #[test]
    fn rust_use_and_extern() {
        let src = "use std::collections::HashMap;\nextern crate serde;\n";
        let deps = detect(src, Path::new("lib.rs"));
        assert!(deps.iter().any(|d| d.starts_with("std::collections")));
        assert!(deps.contains(&"serde".to_string()));
    }

    #[test]
    fn go_import_block() {
        let src = "import (\n    \"fmt\"\n    \"net/http\"\n)\n";
        let deps = detect(src, Path::new("main.go"));
        assert_eq!(deps, vec!["fmt", "net/http"]);
    }

    #[test]
    fn c_includes() {
        let src = "#include <stdio.h>\n#include \"local.h\"\n";
        let deps = detect(src, Path::new("main.c"));
        assert_eq!(deps, vec!["stdio.h", "local.h"]);
    }

    #[test]
    fn dockerfile_from() {
        let src = "FROM rust:1.75-slim\nRUN cargo build\n";
        let deps = detect(src, Path::new("Dockerfile"));
        assert_eq!(deps, vec!["rust:1.75-slim"]);
    }

    #[test]
    fn compose_images_gated_on_filename() {
        let src = "services:\n  db:\n    image: postgres:16\n";
        let deps = detect(src, Path::new("docker-compose.yml"));
        assert_eq!(deps, vec!["postgres:16"]);
        // a plain yaml file without compose/k8s markers yields nothing
        let deps = detect(src, Path::new("config.yml"));
        assert!(deps.is_empty());
    }

    #[test]
    fn sql_tables_skip_keywords() {
        let src = "SELECT * FROM users JOIN orders ON users.id = orders.uid;";
        let deps = detect(src, Path::new("query.sql"));
        assert_eq!(deps, vec!["users", "orders"]);
    }

    #[test]
    fn unknown_extension_yields_nothing() {
        assert!(detect("import x from 'y';", Path::new("notes.txt")).is_empty());
    }

    #[test]
    fn malformed_input_does_not_panic() {
        let garbage = "import \u{0000}\u{FFFD} from";
        let _ = detect(garbage, Path::new("broken.js"));
    }
}
