use super::types::ExtractionRequest;
use crate::domain::{DomainSchema, FieldKind, FieldSpec};

/// Fixed system block sent with every domain extraction. The identifier and
/// null rules here are load-bearing: the validator downstream assumes the
/// model was told not to guess.
pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"
You are a form transcription assistant for geosynthetic installation QC
records. You read one photographed handwritten as-built form and transcribe
the requested fields.

RULES — ABSOLUTE, NO EXCEPTIONS:
1. Respond with a single strict JSON object and nothing else. No prose,
   no code fences, no trailing commentary.
2. Use exactly the field names listed in the instructions, and no others.
3. Transcribe only what is written on the form. Never infer or guess.
4. If a field is unclear, illegible, or absent, output null for that field.
5. Identifier fields must keep their required letter prefix exactly as
   specified; if the prefix is not visible on the form, output null.
6. Numbers are JSON numbers, not strings. Dates keep the written format
   requested for the field.
"#;

/// Build the immutable extraction request for one attempt: system block,
/// domain field instructions, and the image payload.
pub fn build_request(schema: &DomainSchema, image: Vec<u8>) -> ExtractionRequest {
    ExtractionRequest {
        domain_id: schema.domain.as_str().to_string(),
        system: EXTRACTION_SYSTEM_PROMPT.to_string(),
        instructions: build_domain_instructions(schema),
        image,
    }
}

/// Enumerate the schema's fields: name, JSON type, and semantics. Identifier
/// fields get positive and negative format examples so the model does not
/// "helpfully" strip or invent prefixes.
pub fn build_domain_instructions(schema: &DomainSchema) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str(&format!(
        "This photo is a {} form. Return a JSON object with exactly these fields:\n\n",
        form_title(schema)
    ));

    for field in schema.fields {
        out.push_str(&format!(
            "- \"{}\" ({}{}): {}\n",
            field.name,
            json_type(field),
            if field.required { ", required" } else { "" },
            field.desc,
        ));
        if let FieldKind::Identifier { prefix } = field.kind {
            out.push_str(&format!(
                "  Format examples: \"{prefix}-2\" and \"{prefix}-15\" are valid; \
                 \"2\" and \"{prefix}2\" are NOT valid and must be output as null.\n"
            ));
        }
    }

    out.push_str("\nEvery field must appear in the object, using null when unreadable.\n");
    out
}

fn form_title(schema: &DomainSchema) -> &'static str {
    use crate::domain::FormDomain::*;
    match schema.domain {
        PanelPlacement => "panel placement",
        PanelSeaming => "panel seaming",
        NonDestructive => "non-destructive seam testing",
        TrialWeld => "trial weld",
        Repairs => "repair log",
        Destructive => "destructive seam testing",
    }
}

fn json_type(field: &FieldSpec) -> String {
    match field.kind {
        FieldKind::Text => "string".to_string(),
        FieldKind::Number => "number".to_string(),
        FieldKind::Date => "string, YYYY-MM-DD".to_string(),
        FieldKind::DateTime => "string, YYYY-MM-DDTHH:mm".to_string(),
        FieldKind::Enum(values) => format!("string, one of: {}", values.join(" | ")),
        FieldKind::Identifier { prefix } => format!("string, {prefix}-<number>"),
    }
}
