//! Purpose: Modlet document model plus the structural exclusion filter.
//! Exports: `ModletDocument`, `Modlets`, `Modlet`, `Schema`, `Service`,
//! `parse_document`, `filter_modlets`, `ModletFilter`.
//! Role: Parse/serialize boundary for modlet discovery resources.
//! Invariants: Unknown fields round-trip untouched via flattened maps.
//! Invariants: Surviving modlets keep their schema/service ordering.
//! Invariants: Malformed documents fail closed with `ErrorKind::Corrupt`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::core::error::{Error, ErrorKind};
use crate::core::exclusions::ExclusionSet;

/// One schema contributed by a modlet, keyed by its context id.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Schema {
    #[serde(rename = "context-id")]
    pub context_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One service contributed by a modlet, keyed by its implementation class.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Service {
    pub class: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A named unit of module metadata.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Modlet {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemas: Vec<Schema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<Service>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Collection form of a modlet discovery document.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Modlets {
    pub modlets: Vec<Modlet>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A modlet discovery document: a single modlet or a collection.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModletDocument {
    Collection(Modlets),
    Single(Modlet),
}

impl ModletDocument {
    /// Modlets in document order, regardless of form.
    pub fn modlets(&self) -> &[Modlet] {
        match self {
            ModletDocument::Collection(collection) => &collection.modlets,
            ModletDocument::Single(modlet) => std::slice::from_ref(modlet),
        }
    }
}

/// Outcome of filtering one modlet discovery resource.
#[derive(Debug)]
pub struct ModletFilter {
    document: ModletDocument,
    changed: bool,
}

impl ModletFilter {
    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn document(&self) -> &ModletDocument {
        &self.document
    }

    /// Serializes the surviving document with a trailing newline.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut bytes = serde_json::to_vec_pretty(&self.document).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to serialize filtered modlet document")
                .with_source(err)
        })?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// Parses a modlet discovery resource, failing closed on malformed content.
pub fn parse_document(resource: &str, bytes: &[u8]) -> Result<ModletDocument, Error> {
    serde_json::from_slice(bytes).map_err(|err| {
        Error::new(ErrorKind::Corrupt)
            .with_message("modlet document failed to parse")
            .with_resource(resource)
            .with_source(err)
    })
}

/// Filters a modlet discovery resource against the exclusion configuration.
///
/// Whole modlets are dropped by name, then surviving modlets lose schemas by
/// context id and services by class. Each drop is logged at debug level.
/// The single-modlet form is preserved on output iff the input was a single
/// modlet and that modlet survived; everything else serializes as a
/// collection, possibly empty.
pub fn filter_modlets(
    resource: &str,
    bytes: &[u8],
    exclusions: &ExclusionSet,
) -> Result<ModletFilter, Error> {
    let document = parse_document(resource, bytes)?;
    let (mut modlets, was_single, extra) = match document {
        ModletDocument::Single(modlet) => (vec![modlet], true, Map::new()),
        ModletDocument::Collection(collection) => (collection.modlets, false, collection.extra),
    };

    let mut changed = false;

    modlets.retain(|modlet| {
        if exclusions.modlets.contains(&modlet.name) {
            debug!(resource, modlet = %modlet.name, "excluded modlet");
            changed = true;
            return false;
        }
        true
    });

    for modlet in &mut modlets {
        let name = modlet.name.clone();
        modlet.schemas.retain(|schema| {
            if exclusions.schemas.contains(&schema.context_id) {
                debug!(
                    resource,
                    modlet = %name,
                    schema = %schema.context_id,
                    "excluded schema"
                );
                changed = true;
                return false;
            }
            true
        });
        modlet.services.retain(|service| {
            if exclusions.services.contains(&service.class) {
                debug!(
                    resource,
                    modlet = %name,
                    service = %service.class,
                    "excluded service"
                );
                changed = true;
                return false;
            }
            true
        });
    }

    let document = if was_single && modlets.len() == 1 {
        ModletDocument::Single(modlets.remove(0))
    } else {
        ModletDocument::Collection(Modlets { modlets, extra })
    };

    Ok(ModletFilter { document, changed })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{filter_modlets, parse_document, ModletDocument};
    use crate::core::error::ErrorKind;
    use crate::core::exclusions::ExclusionSet;

    const RESOURCE: &str = "meta/modlets.json";

    fn collection_bytes() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "modlets": [
                {
                    "name": "M1",
                    "schemas": [
                        {"context-id": "s1", "location": "s1.xsd"},
                        {"context-id": "s2"}
                    ],
                    "services": [
                        {"class": "org.example.SvcA"},
                        {"class": "org.example.SvcB"}
                    ]
                },
                {"name": "M2", "vendor": "example"}
            ]
        }))
        .expect("encode")
    }

    fn single_bytes() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "name": "M1",
            "schemas": [{"context-id": "s1"}, {"context-id": "s2"}]
        }))
        .expect("encode")
    }

    #[test]
    fn empty_exclusions_is_identity() {
        let result =
            filter_modlets(RESOURCE, &collection_bytes(), &ExclusionSet::default()).expect("filter");
        assert!(!result.changed());
        let names: Vec<_> = result
            .document()
            .modlets()
            .iter()
            .map(|modlet| modlet.name.as_str())
            .collect();
        assert_eq!(names, vec!["M1", "M2"]);
    }

    #[test]
    fn excluded_modlet_is_dropped() {
        let exclusions = ExclusionSet::from_specs("", "M2", "", "");
        let result = filter_modlets(RESOURCE, &collection_bytes(), &exclusions).expect("filter");
        assert!(result.changed());
        let modlets = result.document().modlets();
        assert_eq!(modlets.len(), 1);
        assert_eq!(modlets[0].name, "M1");
    }

    #[test]
    fn excluded_schema_keeps_modlet_and_order() {
        let exclusions = ExclusionSet::from_specs("", "", "s1", "");
        let result = filter_modlets(RESOURCE, &collection_bytes(), &exclusions).expect("filter");
        assert!(result.changed());
        let modlets = result.document().modlets();
        assert_eq!(modlets[0].schemas.len(), 1);
        assert_eq!(modlets[0].schemas[0].context_id, "s2");
        assert_eq!(modlets[0].services.len(), 2);
    }

    #[test]
    fn excluded_service_is_dropped_symmetrically() {
        let exclusions = ExclusionSet::from_specs("", "", "", "org.example.SvcA");
        let result = filter_modlets(RESOURCE, &collection_bytes(), &exclusions).expect("filter");
        assert!(result.changed());
        let modlets = result.document().modlets();
        assert_eq!(modlets[0].services.len(), 1);
        assert_eq!(modlets[0].services[0].class, "org.example.SvcB");
    }

    #[test]
    fn single_form_survives_schema_filtering() {
        let exclusions = ExclusionSet::from_specs("", "", "s1", "");
        let result = filter_modlets(RESOURCE, &single_bytes(), &exclusions).expect("filter");
        assert!(result.changed());
        assert!(matches!(result.document(), ModletDocument::Single(_)));
        let modlets = result.document().modlets();
        assert_eq!(modlets[0].schemas.len(), 1);
        assert_eq!(modlets[0].schemas[0].context_id, "s2");
    }

    #[test]
    fn excluded_single_modlet_becomes_empty_collection() {
        let exclusions = ExclusionSet::from_specs("", "M1", "", "");
        let result = filter_modlets(RESOURCE, &single_bytes(), &exclusions).expect("filter");
        assert!(result.changed());
        assert!(matches!(result.document(), ModletDocument::Collection(_)));
        assert!(result.document().modlets().is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let exclusions = ExclusionSet::from_specs("", "M2", "s1", "org.example.SvcA");
        let first = filter_modlets(RESOURCE, &collection_bytes(), &exclusions).expect("filter");
        assert!(first.changed());
        let second =
            filter_modlets(RESOURCE, &first.to_bytes().expect("bytes"), &exclusions).expect("refilter");
        assert!(!second.changed());
        assert_eq!(second.document(), first.document());
    }

    #[test]
    fn round_trip_preserves_structure_and_unknown_fields() {
        let bytes = collection_bytes();
        let parsed = parse_document(RESOURCE, &bytes).expect("parse");
        let reserialized = serde_json::to_vec(&parsed).expect("encode");
        let reparsed = parse_document(RESOURCE, &reserialized).expect("reparse");
        assert_eq!(parsed, reparsed);
        let modlets = reparsed.modlets();
        assert_eq!(modlets[1].extra.get("vendor"), Some(&serde_json::json!("example")));
        assert_eq!(
            modlets[0].schemas[0].extra.get("location"),
            Some(&serde_json::json!("s1.xsd"))
        );
    }

    #[test]
    fn malformed_document_fails_closed() {
        let err = filter_modlets(RESOURCE, b"{not json", &ExclusionSet::default())
            .expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::Corrupt);
        assert_eq!(err.resource(), Some(RESOURCE));
    }

    #[test]
    fn modlet_without_schemas_is_untouched_by_schema_excludes() {
        let exclusions = ExclusionSet::from_specs("", "", "s1:s2", "");
        let bytes = serde_json::to_vec(&serde_json::json!({"modlets": [{"name": "M2"}]}))
            .expect("encode");
        let result = filter_modlets(RESOURCE, &bytes, &exclusions).expect("filter");
        assert!(!result.changed());
        assert!(result.document().modlets()[0].schemas.is_empty());
    }
}
