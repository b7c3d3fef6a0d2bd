use super::types::{CanonicalRecord, FieldMap, FieldValue};
use crate::domain::DomainSchema;

/// Project the validated map onto the schema's canonical shape.
///
/// Every schema field appears exactly once, in schema order, defaulting to
/// null. Keys the model hallucinated beyond the schema are silently dropped.
pub fn map_to_record(map: &FieldMap, schema: &DomainSchema) -> CanonicalRecord {
    CanonicalRecord::new(
        schema
            .fields
            .iter()
            .map(|spec| {
                let value = map.get(spec.name).cloned().unwrap_or(FieldValue::Null);
                (spec.name.to_string(), value)
            })
            .collect(),
    )
}
