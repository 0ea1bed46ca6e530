/*!
 * Recently-changed-file detection backed by the local Git repository
 */

use std::collections::HashSet;
use std::path::Path;

use git2::{Repository, Sort, StatusOptions};

use crate::error::Result;

pub const MIN_LOOKBACK_DAYS: u32 = 1;
pub const MAX_LOOKBACK_DAYS: u32 = 365;

/// Clamp a caller-supplied lookback window to the supported range
pub fn clamp_lookback(days: u32) -> u32 {
    days.clamp(MIN_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS)
}

/// Collect workspace-relative paths changed within the lookback window:
/// working-tree status (staged, modified, untracked) plus every path touched
/// by a commit younger than the window.
///
/// Paths use forward slashes. A workspace that is not a Git repository is an
/// error for the caller to absorb, not a fatal condition.
pub fn recently_changed(root: &Path, lookback_days: u32) -> Result<Vec<String>> {
    let repo = Repository::discover(root)?;
    let mut changed: HashSet<String> = HashSet::new();

    let mut status_opts = StatusOptions::new();
    status_opts
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false);
    for entry in repo.statuses(Some(&mut status_opts))?.iter() {
        if let Some(path) = entry.path() {
            changed.insert(path.replace('\\', "/"));
        }
    }

    let cutoff = chrono::Utc::now().timestamp() - i64::from(clamp_lookback(lookback_days)) * 86_400;

    let mut walk = repo.revwalk()?;
    walk.set_sorting(Sort::TIME)?;
    if walk.push_head().is_ok() {
        for oid in walk.flatten() {
            let Ok(commit) = repo.find_commit(oid) else {
                continue;
            };
            if commit.time().seconds() < cutoff {
                break;
            }

            let tree = commit.tree()?;
            let parent_tree = commit.parent(0).and_then(|p| p.tree()).ok();
            let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
            for delta in diff.deltas() {
                if let Some(path) = delta.new_file().path() {
                    changed.insert(path.to_string_lossy().replace('\\', "/"));
                }
            }
        }
    }

    let mut list: Vec<String> = changed.into_iter().collect();
    list.sort();
    Ok(list)
}
