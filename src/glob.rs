/*!
 * Glob pattern matching for include/exclude and ignore-file rules
 *
 * Self-contained matcher so pattern semantics are identical across
 * path-separator conventions and never depend on platform glob libraries.
 */

use regex::Regex;

/// Check whether `path` matches the glob `pattern`.
///
/// Both operands are normalized to forward slashes and compared
/// case-insensitively. A leading `!` negates the result of the rest of the
/// pattern. An empty pattern never matches.
pub fn matches(path: &str, pattern: &str) -> bool {
    let path = normalize(path);
    let pattern = normalize(pattern);

    if pattern.is_empty() {
        return false;
    }

    // Negation unwinds after the rest of the pattern is evaluated
    if let Some(rest) = pattern.strip_prefix('!') {
        if rest.is_empty() {
            return false;
        }
        return !matches_normalized(&path, rest);
    }

    matches_normalized(&path, &pattern)
}

fn normalize(s: &str) -> String {
    s.replace('\\', "/").to_lowercase()
}

fn matches_normalized(path: &str, pattern: &str) -> bool {
    // Trailing slash is directory shorthand for the whole subtree
    let pattern = if let Some(stripped) = pattern.strip_suffix('/') {
        format!("{}/**", stripped)
    } else {
        pattern.to_string()
    };

    if path == pattern {
        return true;
    }

    // `dir/**` keeps everything under dir, at any depth
    if let Some(prefix) = pattern.strip_suffix("**") {
        if prefix.ends_with('/') && path.starts_with(prefix) {
            return true;
        }
    }

    // `dir/*` is a single level: nothing past the next separator
    if pattern.ends_with("/*") && !pattern.ends_with("/**") {
        let prefix = &pattern[..pattern.len() - 1];
        if let Some(rest) = path.strip_prefix(prefix) {
            return !rest.contains('/');
        }
    }

    // Leading `**/` matches the remainder against every segment-aligned
    // suffix of the path, so `**/utils.js` hits `src/utils.js` but not
    // `src/myutils.js`.
    if let Some(sub) = pattern.strip_prefix("**/") {
        let segments: Vec<&str> = path.split('/').collect();
        for start in 0..segments.len() {
            let candidate = segments[start..].join("/");
            if candidate == sub || regex_match(&candidate, sub) {
                return true;
            }
        }
        return false;
    }

    regex_match(path, &pattern)
}

/// Compile the glob into an anchored regex and test the full string.
/// A pattern that fails to compile matches nothing.
fn regex_match(path: &str, pattern: &str) -> bool {
    match Regex::new(&format!("^{}$", glob_to_regex(pattern))) {
        Ok(re) => re.is_match(path),
        Err(_) => false,
    }
}

fn glob_to_regex(pattern: &str) -> String {
    let mut re = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    // `**` crosses path separators
                    re.push_str(".*");
                } else {
                    re.push_str("[^/]*");
                }
            }
            '?' => re.push_str("[^/]"),
            '{' => {
                let mut group = String::new();
                let mut closed = false;
                for g in chars.by_ref() {
                    if g == '}' {
                        closed = true;
                        break;
                    }
                    group.push(g);
                }
                if closed {
                    let options: Vec<String> = group
                        .split(',')
                        .map(|o| glob_to_regex(o.trim()))
                        .collect();
                    re.push('(');
                    re.push_str(&options.join("|"));
                    re.push(')');
                } else {
                    re.push_str(&regex::escape("{"));
                    re.push_str(&regex::escape(&group));
                }
            }
            '[' => {
                let mut class = String::new();
                let mut closed = false;
                for g in chars.by_ref() {
                    if g == ']' {
                        closed = true;
                        break;
                    }
                    class.push(g);
                }
                if closed && !class.is_empty() {
                    re.push('[');
                    if let Some(negated) = class.strip_prefix('!') {
                        re.push('^');
                        re.push_str(negated);
                    } else {
                        re.push_str(&class);
                    }
                    re.push(']');
                } else {
                    re.push_str(&regex::escape("["));
                    re.push_str(&regex::escape(&class));
                }
            }
            other => {
                let mut buf = [0u8; 4];
                re.push_str(&regex::escape(other.encode_utf8(&mut buf)));
            }
        }
    }

    re
}
