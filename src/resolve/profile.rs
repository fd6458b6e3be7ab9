//! Profile resolution: which fields to extract for one document

use crate::registry::{ExtractionProfiles, Reconciliation, Requirement};
use crate::snapshot::RegistrySnapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One field selected for extraction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedField {
    pub namespace: String,
    pub requirement: Requirement,
    pub hints: Vec<String>,
    pub is_common: bool,
}

/// Field name → extraction instructions, in field-name order.
pub type FieldMap = BTreeMap<String, ResolvedField>;

/// Fields to extract for a `(classification, content_type)` pair.
///
/// An absent or unknown classification yields an empty map, common fields
/// included. Common fields never consult source overrides. A labelled
/// field is skipped when its override for `content_type` is `source_wins`,
/// since its value is authoritative elsewhere.
///
/// The result depends only on the arguments and the snapshot.
pub fn resolve(
    classification: Option<&str>,
    content_type: &str,
    snapshot: &RegistrySnapshot,
) -> FieldMap {
    let Some(label) = classification else {
        return FieldMap::new();
    };
    if !snapshot.taxonomy().contains(label) {
        return FieldMap::new();
    }

    let mut resolved = FieldMap::new();
    for field in snapshot.fields().fields() {
        let (entry, is_common) = match &field.extraction_profiles {
            ExtractionProfiles::Common(entry) => (entry, true),
            ExtractionProfiles::Structured(profiles) => {
                let Some(entry) = profiles.get(label) else {
                    continue;
                };
                let sourced = field
                    .override_for(content_type)
                    .is_some_and(|ov| ov.reconciliation == Reconciliation::SourceWins);
                if sourced {
                    continue;
                }
                (entry, false)
            }
        };

        resolved.insert(
            field.name.clone(),
            ResolvedField {
                namespace: field.namespace.clone(),
                requirement: entry.requirement,
                hints: entry.extraction_hints.clone(),
                is_common,
            },
        );
    }

    resolved
}

/// Resolved field names partitioned by tier.
///
/// Common fields are listed under `common` whatever their requirement.
/// Each list is sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieredFields {
    pub required: Vec<String>,
    pub expected: Vec<String>,
    pub optional: Vec<String>,
    pub common: Vec<String>,
}

impl TieredFields {
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
            && self.expected.is_empty()
            && self.optional.is_empty()
            && self.common.is_empty()
    }
}

/// Partition a resolved map for prompt construction.
pub fn group_by_tier(fields: &FieldMap) -> TieredFields {
    let mut tiers = TieredFields::default();
    for (name, field) in fields {
        let bucket = if field.is_common {
            &mut tiers.common
        } else {
            match field.requirement {
                Requirement::Required => &mut tiers.required,
                Requirement::Expected => &mut tiers.expected,
                Requirement::Optional => &mut tiers.optional,
            }
        };
        bucket.push(name.clone());
    }
    tiers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;
    use crate::document::RegistryDocument;

    fn snapshot() -> RegistrySnapshot {
        let doc = RegistryDocument::from_yaml_str(
            r#"
taxonomy:
  - name: Federal Acquisition
    categories:
      - name: Contract Vehicles
        types: [Task Order, IDIQ Contract]
source_namespaces: [sam, fpds]
fields:
  - namespace: document
    name: title
    extraction_profiles: __common__
  - namespace: document
    name: summary
    extraction_profiles:
      __common__: { requirement: required, extraction_hints: [two sentences] }
    source_overrides:
      sam_notice: { field: sam.description, reconciliation: source_wins }
  - namespace: contract
    name: contract_number
    extraction_profiles:
      Task Order: { requirement: expected }
  - namespace: contract
    name: legacy_piid
    extraction_profiles: [Task Order, IDIQ Contract]
  - namespace: contract
    name: ordering_agency
    extraction_profiles:
      Task Order:
        requirement: required
        extraction_hints: [Agency on the SF-1449 block 9]
    source_overrides:
      sam_notice: { field: sam.agency, reconciliation: source_wins }
      fpds: { field: fpds.agency, reconciliation: extracted_wins }
  - namespace: contract
    name: ceiling_value
    extraction_profiles:
      IDIQ Contract: { requirement: optional }
"#,
        )
        .unwrap();
        RegistrySnapshot::build(&doc, &RegistryConfig::strict()).unwrap()
    }

    #[test]
    fn structured_profile_is_included_with_its_requirement() {
        let fields = resolve(Some("Task Order"), "asset", &snapshot());
        let field = &fields["contract_number"];
        assert_eq!(field.requirement, Requirement::Expected);
        assert_eq!(field.namespace, "contract");
        assert!(!field.is_common);
        assert!(!fields.contains_key("ceiling_value"));
    }

    #[test]
    fn legacy_list_is_expected_for_every_content_type() {
        let snapshot = snapshot();
        for ct in ["asset", "sam_notice", "fpds", "crm"] {
            let fields = resolve(Some("IDIQ Contract"), ct, &snapshot);
            assert_eq!(fields["legacy_piid"].requirement, Requirement::Expected);
        }
    }

    #[test]
    fn source_wins_override_excludes_field() {
        let fields = resolve(Some("Task Order"), "sam_notice", &snapshot());
        assert!(!fields.contains_key("ordering_agency"));
        assert!(fields.contains_key("contract_number"));
    }

    #[test]
    fn other_policies_keep_field_with_hints() {
        let fields = resolve(Some("Task Order"), "fpds", &snapshot());
        let field = &fields["ordering_agency"];
        assert_eq!(field.requirement, Requirement::Required);
        assert_eq!(field.hints, vec!["Agency on the SF-1449 block 9".to_string()]);
    }

    #[test]
    fn common_fields_ignore_overrides() {
        let fields = resolve(Some("Task Order"), "sam_notice", &snapshot());
        assert!(fields["title"].is_common);
        assert_eq!(fields["title"].requirement, Requirement::Expected);
        assert!(fields["summary"].is_common);
        assert_eq!(fields["summary"].requirement, Requirement::Required);
    }

    #[test]
    fn absent_or_unknown_classification_resolves_nothing() {
        let snapshot = snapshot();
        assert!(resolve(None, "asset", &snapshot).is_empty());
        assert!(resolve(Some("Memo"), "asset", &snapshot).is_empty());
    }

    #[test]
    fn repeated_resolution_is_identical() {
        let snapshot = snapshot();
        let a = resolve(Some("Task Order"), "asset", &snapshot);
        let b = resolve(Some("Task Order"), "asset", &snapshot);
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn group_by_tier_partitions_sorted() {
        let tiers = group_by_tier(&resolve(Some("Task Order"), "fpds", &snapshot()));
        assert_eq!(tiers.required, vec!["ordering_agency"]);
        assert_eq!(tiers.expected, vec!["contract_number", "legacy_piid"]);
        assert!(tiers.optional.is_empty());
        assert_eq!(tiers.common, vec!["summary", "title"]);

        assert!(group_by_tier(&FieldMap::new()).is_empty());
    }
}
