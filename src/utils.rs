/*!
 * Utility functions for flatmd
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Kilobyte in bytes
pub const KB: u64 = 1024;
/// Megabyte in bytes
pub const MB: u64 = KB * 1024;
/// Gigabyte in bytes
pub const GB: u64 = MB * 1024;

/// Maximum length of a sanitized message
const MAX_MESSAGE_LENGTH: usize = 200;

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Rough token estimate for LLM budgeting (~4 bytes per token)
pub fn estimate_tokens(bytes: u64) -> u64 {
    bytes / 4
}

static HOME_DIR_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"/home/[^/\s]+").ok());
static USERS_DIR_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"/Users/[^/\s]+").ok());
static WIN_PATH_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[a-zA-Z]:\\[^\s]+").ok());
static UNIX_PATH_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"/[\w./-]+").ok());
static IP_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").ok());
static EMAIL_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").ok());

/// Scrub a message of anything that could disclose local paths, usernames,
/// IP addresses or emails before it reaches a UI or log sink.
pub fn sanitize_message(message: &str) -> String {
    if message.is_empty() {
        return "Unknown error".to_string();
    }

    let mut out = message.to_string();
    // Usernames must be scrubbed before the generic path rule eats the prefix
    if let Some(re) = HOME_DIR_RE.as_ref() {
        out = re.replace_all(&out, "<home>").into_owned();
    }
    if let Some(re) = USERS_DIR_RE.as_ref() {
        out = re.replace_all(&out, "<user>").into_owned();
    }
    if let Some(re) = WIN_PATH_RE.as_ref() {
        out = re.replace_all(&out, "<file>").into_owned();
    }
    if let Some(re) = UNIX_PATH_RE.as_ref() {
        out = re.replace_all(&out, "<file>").into_owned();
    }
    if let Some(re) = IP_RE.as_ref() {
        out = re.replace_all(&out, "<ip-address>").into_owned();
    }
    if let Some(re) = EMAIL_RE.as_ref() {
        out = re.replace_all(&out, "<email>").into_owned();
    }

    if out.len() > MAX_MESSAGE_LENGTH {
        let cut = out
            .char_indices()
            .take_while(|(i, _)| *i < MAX_MESSAGE_LENGTH)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        out.truncate(cut);
        out.push_str("...");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_sizes() {
        assert_eq!(format_file_size(512), "512 bytes");
        assert_eq!(format_file_size(2048), "2.00 KB");
        assert_eq!(format_file_size(3 * MB), "3.00 MB");
    }

    #[test]
    fn sanitizes_paths_and_identities() {
        let msg = "failed for /home/alice/project/main.rs from 10.0.0.1 (alice@example.com)";
        let clean = sanitize_message(msg);
        assert!(!clean.contains("alice"));
        assert!(!clean.contains("10.0.0.1"));
        assert!(!clean.contains("example.com"));
    }

    #[test]
    fn sanitize_truncates_long_messages() {
        let msg = "x".repeat(500);
        let clean = sanitize_message(&msg);
        assert!(clean.len() <= 203);
        assert!(clean.ends_with("..."));
    }

    #[test]
    fn sanitize_empty_message() {
        assert_eq!(sanitize_message(""), "Unknown error");
    }
}
