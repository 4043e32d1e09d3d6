//! Purpose: Parse administrator-supplied exclusion lists into sets.
//! Exports: `ExclusionSet`, `parse_exclusions`.
//! Role: Immutable configuration consumed by the filters and the resolver.
//! Invariants: Membership is exact, case-sensitive string equality.
//! Invariants: An empty or absent list means "exclude nothing".

use std::collections::BTreeSet;

/// Four independent exclusion categories, fixed once constructed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExclusionSet {
    pub providers: BTreeSet<String>,
    pub modlets: BTreeSet<String>,
    pub schemas: BTreeSet<String>,
    pub services: BTreeSet<String>,
}

impl ExclusionSet {
    /// Builds the set from four colon-separated lists.
    pub fn from_specs(providers: &str, modlets: &str, schemas: &str, services: &str) -> Self {
        Self {
            providers: parse_exclusions(providers),
            modlets: parse_exclusions(modlets),
            schemas: parse_exclusions(schemas),
            services: parse_exclusions(services),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
            && self.modlets.is_empty()
            && self.schemas.is_empty()
            && self.services.is_empty()
    }
}

/// Splits a colon-separated exclusion list into a set.
///
/// A trailing or doubled colon yields an empty-string element; an empty
/// string can never match a real name, so it is kept rather than rejected.
pub fn parse_exclusions(spec: &str) -> BTreeSet<String> {
    if spec.is_empty() {
        return BTreeSet::new();
    }
    spec.split(':').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_exclusions, ExclusionSet};

    #[test]
    fn empty_spec_yields_empty_set() {
        assert!(parse_exclusions("").is_empty());
    }

    #[test]
    fn splits_on_colons_in_order_free_set() {
        let set = parse_exclusions("org.example.B:org.example.A");
        assert_eq!(set.len(), 2);
        assert!(set.contains("org.example.A"));
        assert!(set.contains("org.example.B"));
    }

    #[test]
    fn trailing_colon_yields_harmless_empty_element() {
        let set = parse_exclusions("org.example.A:");
        assert_eq!(set.len(), 2);
        assert!(set.contains("org.example.A"));
        assert!(set.contains(""));
    }

    #[test]
    fn duplicate_entries_collapse() {
        let set = parse_exclusions("a:a:a");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let set = parse_exclusions("Org.Example.A");
        assert!(!set.contains("org.example.a"));
    }

    #[test]
    fn from_specs_fills_all_categories() {
        let set = ExclusionSet::from_specs("p1", "m1:m2", "", "s1");
        assert_eq!(set.providers.len(), 1);
        assert_eq!(set.modlets.len(), 2);
        assert!(set.schemas.is_empty());
        assert_eq!(set.services.len(), 1);
        assert!(!set.is_empty());
        assert!(ExclusionSet::default().is_empty());
    }
}
