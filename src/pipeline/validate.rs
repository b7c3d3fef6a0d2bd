//! Per-field validation and normalization.
//!
//! Every rule converts or rejects independently, in schema order. Rejection
//! sets the field to null and records a warning — it never fails the
//! pipeline, because a half-read form is still worth handing back for
//! review. Validation is idempotent: running it over its own output changes
//! nothing.

use regex::Regex;

use super::types::{FieldMap, FieldValue, FieldWarning};
use crate::domain::{DomainSchema, FieldKind, FieldSpec};

/// Apply each field's rule to the parsed map. Keys absent from the map stay
/// absent (the mapper nulls them); keys not in the schema pass through
/// untouched (the mapper drops them).
pub fn validate_fields(mut map: FieldMap, schema: &DomainSchema) -> (FieldMap, Vec<FieldWarning>) {
    let mut warnings = Vec::new();
    for spec in schema.fields {
        if let Some(value) = map.get(spec.name) {
            let validated = validate_field(value.clone(), spec, &mut warnings);
            map.insert(spec.name.to_string(), validated);
        }
    }
    (map, warnings)
}

/// Validate a single value against its spec.
pub fn validate_field(
    value: FieldValue,
    spec: &FieldSpec,
    warnings: &mut Vec<FieldWarning>,
) -> FieldValue {
    if value.is_null() {
        // Absence is expected, never a warning
        return FieldValue::Null;
    }

    match spec.kind {
        FieldKind::Text => validate_text(value),
        FieldKind::Number => validate_number(value, spec, warnings),
        FieldKind::Date => validate_date(value, spec, warnings),
        FieldKind::DateTime => validate_date_time(value, spec, warnings),
        FieldKind::Enum(members) => validate_enum(value, members, spec, warnings),
        FieldKind::Identifier { prefix } => validate_identifier(value, prefix, spec, warnings),
    }
}

fn validate_text(value: FieldValue) -> FieldValue {
    match value {
        FieldValue::Text(s) => FieldValue::Text(s.trim().to_string()),
        // A bare number on a text field is readable as-is
        FieldValue::Number(n) => FieldValue::Text(format_number(n)),
        other => other,
    }
}

fn validate_number(
    value: FieldValue,
    spec: &FieldSpec,
    warnings: &mut Vec<FieldWarning>,
) -> FieldValue {
    match value {
        FieldValue::Number(n) => FieldValue::Number(n),
        FieldValue::Text(s) => match s.trim().parse::<f64>() {
            // Parsing drops trailing zeros beyond the written precision
            Ok(n) if n.is_finite() => FieldValue::Number(n),
            _ => reject(spec, &s, "is not numeric", warnings),
        },
        other => reject(spec, &describe(&other), "is not numeric", warnings),
    }
}

fn validate_date(
    value: FieldValue,
    spec: &FieldSpec,
    warnings: &mut Vec<FieldWarning>,
) -> FieldValue {
    match value {
        FieldValue::Date(d) => FieldValue::Date(d),
        FieldValue::Text(s) => {
            match chrono::NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
                Ok(d) => FieldValue::Date(d),
                Err(_) => reject(spec, &s, "does not match YYYY-MM-DD", warnings),
            }
        }
        other => reject(spec, &describe(&other), "does not match YYYY-MM-DD", warnings),
    }
}

fn validate_date_time(
    value: FieldValue,
    spec: &FieldSpec,
    warnings: &mut Vec<FieldWarning>,
) -> FieldValue {
    match value {
        FieldValue::DateTime(dt) => FieldValue::DateTime(dt),
        FieldValue::Text(s) => {
            match chrono::NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%dT%H:%M") {
                Ok(dt) => FieldValue::DateTime(dt),
                Err(_) => reject(spec, &s, "does not match YYYY-MM-DDTHH:mm", warnings),
            }
        }
        other => reject(
            spec,
            &describe(&other),
            "does not match YYYY-MM-DDTHH:mm",
            warnings,
        ),
    }
}

fn validate_enum(
    value: FieldValue,
    members: &'static [&'static str],
    spec: &FieldSpec,
    warnings: &mut Vec<FieldWarning>,
) -> FieldValue {
    let candidate = match &value {
        FieldValue::Enum(s) => s.clone(),
        FieldValue::Text(s) => s.trim().to_string(),
        other => return reject(spec, &describe(other), "is not an allowed value", warnings),
    };
    if members.contains(&candidate.as_str()) {
        FieldValue::Enum(candidate)
    } else {
        reject(spec, &candidate, "is not an allowed value", warnings)
    }
}

/// Identifier validation: canonical form is `{PREFIX}-{digits}` with the
/// prefix uppercased.
///
/// 1. Trim; empty means absent, so null without a warning.
/// 2. Case-insensitive match against `^{P}-\d+$` accepts directly.
/// 3. Otherwise strip everything except the prefix letter, digits, and
///    hyphens, and re-test. Handwriting like "R - 5" normalizes to "R-5".
/// 4. Anything else rejects to null, citing the raw value.
fn validate_identifier(
    value: FieldValue,
    prefix: &'static str,
    spec: &FieldSpec,
    warnings: &mut Vec<FieldWarning>,
) -> FieldValue {
    let raw = match &value {
        FieldValue::Text(s) => s.clone(),
        other => {
            // Numbers etc. necessarily lack the prefix
            return reject(
                spec,
                &describe(other),
                &format!("does not match {prefix}-<number> format"),
                warnings,
            );
        }
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return FieldValue::Null;
    }

    let pattern = Regex::new(&format!(r"(?i)^{}-\d+$", regex::escape(prefix)))
        .expect("static regex");

    if pattern.is_match(trimmed) {
        let canonical = trimmed.to_ascii_uppercase();
        if canonical != trimmed {
            warnings.push(FieldWarning::normalized(
                spec.name,
                format!("\"{trimmed}\" normalized to \"{canonical}\""),
            ));
        }
        return FieldValue::Text(canonical);
    }

    let stripped: String = trimmed
        .chars()
        .filter(|c| {
            c.is_ascii_digit()
                || *c == '-'
                || prefix.chars().any(|p| p.eq_ignore_ascii_case(c))
        })
        .collect();

    if pattern.is_match(&stripped) {
        let canonical = stripped.to_ascii_uppercase();
        warnings.push(FieldWarning::normalized(
            spec.name,
            format!("\"{raw}\" normalized to \"{canonical}\""),
        ));
        return FieldValue::Text(canonical);
    }

    reject(
        spec,
        &raw,
        &format!("does not match {prefix}-<number> format"),
        warnings,
    )
}

fn reject(
    spec: &FieldSpec,
    raw: &str,
    reason: &str,
    warnings: &mut Vec<FieldWarning>,
) -> FieldValue {
    warnings.push(FieldWarning::rejected(
        spec.name,
        format!("value \"{raw}\" {reason}"),
    ));
    FieldValue::Null
}

fn describe(value: &FieldValue) -> String {
    match value {
        FieldValue::Number(n) => format_number(*n),
        FieldValue::Text(s) | FieldValue::Enum(s) => s.clone(),
        FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        FieldValue::DateTime(dt) => dt.format("%Y-%m-%dT%H:%M").to_string(),
        FieldValue::Null => "null".to_string(),
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
