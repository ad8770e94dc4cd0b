//! Issue key extraction from change logs.

use issuesync_core::build::BuildHistory;
use issuesync_core::issue::IssueKeySet;
use regex::Regex;
use tracing::debug;

/// Collect issue keys from the current build and up to `previous_builds`
/// ancestors.
///
/// Only the first match in each change-log message is taken.
pub fn extract_issue_keys(
    history: &BuildHistory,
    pattern: &Regex,
    previous_builds: usize,
) -> IssueKeySet {
    let mut keys = IssueKeySet::new();

    for build in history.window(previous_builds) {
        debug!(build = build.number, changes = build.changes.len(), "Scanning build");
        for entry in &build.changes {
            if let Some(m) = pattern.find(&entry.message) {
                keys.insert(m.as_str());
            }
        }
    }

    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use issuesync_core::build::{Build, ChangeLogEntry};

    fn key_pattern() -> Regex {
        Regex::new(r"[A-Z]+-\d+").unwrap()
    }

    fn build(number: u32, messages: &[&str]) -> Build {
        messages.iter().fold(Build::new(number), |b, m| {
            b.with_change(ChangeLogEntry::new(*m))
        })
    }

    #[test]
    fn test_first_match_per_entry() {
        let history = BuildHistory::new(vec![build(1, &["Fixes PROJ-12 and PROJ-7"])]);

        let keys = extract_issue_keys(&history, &key_pattern(), 0);
        assert_eq!(keys.as_slice(), &["PROJ-12"]);
    }

    #[test]
    fn test_dedup_in_insertion_order() {
        let history = BuildHistory::new(vec![
            build(3, &["OPS-2 tidy", "PROJ-1 start"]),
            build(2, &["PROJ-1 again", "no key here"]),
            build(1, &["ABC-9 first"]),
        ]);

        let keys = extract_issue_keys(&history, &key_pattern(), 2);
        assert_eq!(keys.as_slice(), &["OPS-2", "PROJ-1", "ABC-9"]);
    }

    #[test]
    fn test_window_is_current_plus_previous() {
        let history = BuildHistory::new(vec![
            build(3, &["A-3"]),
            build(2, &["A-2"]),
            build(1, &["A-1"]),
        ]);

        let keys = extract_issue_keys(&history, &key_pattern(), 0);
        assert_eq!(keys.as_slice(), &["A-3"]);

        let keys = extract_issue_keys(&history, &key_pattern(), 1);
        assert_eq!(keys.as_slice(), &["A-3", "A-2"]);

        let keys = extract_issue_keys(&history, &key_pattern(), 5);
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_empty_history() {
        let keys = extract_issue_keys(&BuildHistory::default(), &key_pattern(), 3);
        assert!(keys.is_empty());
    }
}
