//! AsBuilt — structured extraction of photographed geosynthetic QC forms.
//!
//! A field technician photographs a handwritten as-built form; the pipeline
//! asks a local vision-language model to transcribe it against one of six
//! domain schemas, validates and normalizes every field (identifier formats
//! included), and hands back a canonical record the form UI can render —
//! even when extraction fails, in which case the record is all-null and the
//! technician types it in manually.

pub mod api;
pub mod autofill;
pub mod config;
pub mod domain;
pub mod pipeline;
