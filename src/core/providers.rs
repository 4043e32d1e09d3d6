//! Purpose: Line-oriented filter for service provider discovery resources.
//! Exports: `filter_providers`, `ProviderFilter`.
//! Role: Drops excluded provider lines while keeping everything else verbatim.
//! Invariants: Comment (`#`) and blank lines are opaque and never filtered.
//! Invariants: Surviving lines keep their relative order and raw bytes.
//! Invariants: Serialization is byte-identical to the input when nothing was excluded.

use std::collections::BTreeSet;

use bstr::ByteSlice;
use tracing::debug;

/// Outcome of filtering one provider list resource.
#[derive(Debug)]
pub struct ProviderFilter {
    lines: Vec<Vec<u8>>,
    trailing_newline: bool,
    changed: bool,
}

impl ProviderFilter {
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Surviving provider names, trimmed, without comments or blanks.
    pub fn providers(&self) -> Vec<String> {
        self.lines
            .iter()
            .filter_map(|line| provider_name(line))
            .map(str::to_string)
            .collect()
    }

    /// Re-serializes the surviving lines.
    ///
    /// Lines are joined with `\n` and the input's trailing-newline state is
    /// restored, so an unfiltered `\n`-separated resource round-trips
    /// byte-for-byte. A resource whose every line was dropped serializes to
    /// an empty file.
    pub fn to_bytes(&self) -> Vec<u8> {
        if self.lines.is_empty() {
            return Vec::new();
        }
        let mut out = self.lines.join(&b'\n');
        if self.trailing_newline {
            out.push(b'\n');
        }
        out
    }
}

/// Trimmed provider name of a line, or `None` for blank/comment lines.
fn provider_name(line: &[u8]) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(b"#") {
        return None;
    }
    trimmed.to_str().ok()
}

/// Filters a provider list resource against the provider exclusion set.
///
/// Splitting is newline-insensitive (`\n` and `\r\n`). Each excluded line is
/// logged at debug level with the resource name and dropped; `changed` is
/// true iff the surviving line count differs from the original.
pub fn filter_providers(
    resource: &str,
    bytes: &[u8],
    excludes: &BTreeSet<String>,
) -> ProviderFilter {
    let original = bytes.lines().count();
    let mut lines = Vec::with_capacity(original);
    for line in bytes.lines() {
        if let Some(provider) = provider_name(line) {
            if excludes.contains(provider) {
                debug!(resource, provider, "excluded service provider");
                continue;
            }
        }
        lines.push(line.to_vec());
    }
    let changed = lines.len() != original;
    ProviderFilter {
        lines,
        trailing_newline: bytes.last() == Some(&b'\n'),
        changed,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::filter_providers;

    fn excludes(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn excluded_provider_is_dropped_in_order() {
        let input = b"org.A\norg.B\norg.C\n";
        let result = filter_providers("svc", input, &excludes(&["org.B"]));
        assert!(result.changed());
        assert_eq!(result.providers(), vec!["org.A", "org.C"]);
        assert_eq!(result.to_bytes(), b"org.A\norg.C\n");
    }

    #[test]
    fn empty_excludes_is_identity() {
        let input = b"org.A\n# comment\norg.B\n";
        let result = filter_providers("svc", input, &BTreeSet::new());
        assert!(!result.changed());
        assert_eq!(result.to_bytes(), input.to_vec());
    }

    #[test]
    fn round_trip_preserves_bytes_without_trailing_newline() {
        let input = b"org.A\norg.B";
        let result = filter_providers("svc", input, &BTreeSet::new());
        assert!(!result.changed());
        assert_eq!(result.to_bytes(), input.to_vec());
    }

    #[test]
    fn comments_and_blanks_are_never_filtered() {
        let input = b"# org.A\n\norg.A\n";
        let result = filter_providers("svc", input, &excludes(&["# org.A", "org.A", ""]));
        assert!(result.changed());
        assert_eq!(result.to_bytes(), b"# org.A\n\n".to_vec());
    }

    #[test]
    fn empty_resource_is_unchanged() {
        let result = filter_providers("svc", b"", &excludes(&["org.A"]));
        assert!(!result.changed());
        assert!(result.to_bytes().is_empty());
    }

    #[test]
    fn all_lines_excluded_yields_empty_file() {
        let input = b"org.A\norg.B\n";
        let result = filter_providers("svc", input, &excludes(&["org.A", "org.B"]));
        assert!(result.changed());
        assert!(result.to_bytes().is_empty());
        assert!(result.providers().is_empty());
    }

    #[test]
    fn whitespace_around_names_is_ignored_for_matching() {
        let input = b"  org.A  \norg.B\n";
        let result = filter_providers("svc", input, &excludes(&["org.A"]));
        assert!(result.changed());
        assert_eq!(result.providers(), vec!["org.B"]);
    }

    #[test]
    fn refiltering_a_filtered_result_is_unchanged() {
        let input = b"org.A\norg.B\norg.C\n";
        let set = excludes(&["org.B"]);
        let first = filter_providers("svc", input, &set);
        assert!(first.changed());
        let second = filter_providers("svc", &first.to_bytes(), &set);
        assert!(!second.changed());
        assert_eq!(second.to_bytes(), first.to_bytes());
    }
}
