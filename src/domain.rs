//! Domain schema registry for the six supported as-built form types.
//!
//! One table per domain is the single source of truth: the prompt builder,
//! the field validator, and the canonical record shape are all derived from
//! these `FieldSpec` lists. Schemas are `'static` and never mutated.

use serde::{Deserialize, Serialize};

/// The six recognized as-built form domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormDomain {
    PanelPlacement,
    PanelSeaming,
    NonDestructive,
    TrialWeld,
    Repairs,
    Destructive,
}

impl FormDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PanelPlacement => "panel_placement",
            Self::PanelSeaming => "panel_seaming",
            Self::NonDestructive => "non_destructive",
            Self::TrialWeld => "trial_weld",
            Self::Repairs => "repairs",
            Self::Destructive => "destructive",
        }
    }

    /// Parse a wire domain id. Unknown ids return `None` — the orchestrator
    /// routes those to the legacy extractor instead of failing.
    pub fn parse(id: &str) -> Option<Self> {
        match id.trim() {
            "panel_placement" => Some(Self::PanelPlacement),
            "panel_seaming" => Some(Self::PanelSeaming),
            "non_destructive" => Some(Self::NonDestructive),
            "trial_weld" => Some(Self::TrialWeld),
            "repairs" => Some(Self::Repairs),
            "destructive" => Some(Self::Destructive),
            _ => None,
        }
    }

    pub fn schema(&self) -> &'static DomainSchema {
        match self {
            Self::PanelPlacement => &PANEL_PLACEMENT,
            Self::PanelSeaming => &PANEL_SEAMING,
            Self::NonDestructive => &NON_DESTRUCTIVE,
            Self::TrialWeld => &TRIAL_WELD,
            Self::Repairs => &REPAIRS,
            Self::Destructive => &DESTRUCTIVE,
        }
    }
}

/// Per-field type and validation rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text,
    Number,
    /// Strict `YYYY-MM-DD`.
    Date,
    /// Strict `YYYY-MM-DDTHH:mm`.
    DateTime,
    /// Exact case-sensitive membership.
    Enum(&'static [&'static str]),
    /// `{PREFIX}-{number}` format, e.g. `R-12`. Prefix is the single letter.
    Identifier { prefix: &'static str },
}

/// Declared name, type, and semantics of one form field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Short semantic description, used verbatim in the domain prompt.
    pub desc: &'static str,
}

/// A domain plus its ordered field list.
#[derive(Debug)]
pub struct DomainSchema {
    pub domain: FormDomain,
    pub fields: &'static [FieldSpec],
}

impl DomainSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }
}

/// `lookup("repairs")` → the repairs schema; unknown ids → `None`.
pub fn lookup(domain_id: &str) -> Option<&'static DomainSchema> {
    FormDomain::parse(domain_id).map(|d| d.schema())
}

const PASS_FAIL: &[&str] = &["pass", "fail"];
const WELD_TYPES: &[&str] = &["fusion", "extrusion"];

static PANEL_PLACEMENT: DomainSchema = DomainSchema {
    domain: FormDomain::PanelPlacement,
    fields: &[
        FieldSpec { name: "panelNumber", kind: FieldKind::Text, required: true, desc: "panel number as marked on the layout drawing" },
        FieldSpec { name: "dateTime", kind: FieldKind::DateTime, required: true, desc: "date and time the panel was deployed" },
        FieldSpec { name: "length", kind: FieldKind::Number, required: false, desc: "panel length in meters" },
        FieldSpec { name: "width", kind: FieldKind::Number, required: false, desc: "panel width in meters" },
    ],
};

static PANEL_SEAMING: DomainSchema = DomainSchema {
    domain: FormDomain::PanelSeaming,
    fields: &[
        FieldSpec { name: "seamNumber", kind: FieldKind::Text, required: true, desc: "seam number as marked on the layout drawing" },
        FieldSpec { name: "dateTime", kind: FieldKind::DateTime, required: true, desc: "date and time seaming started" },
        FieldSpec { name: "panelLeft", kind: FieldKind::Text, required: false, desc: "panel number on the left side of the seam" },
        FieldSpec { name: "panelRight", kind: FieldKind::Text, required: false, desc: "panel number on the right side of the seam" },
        FieldSpec { name: "seamerInitials", kind: FieldKind::Text, required: true, desc: "initials of the seaming technician" },
        FieldSpec { name: "machineNumber", kind: FieldKind::Text, required: false, desc: "welding machine identification number" },
        FieldSpec { name: "weldType", kind: FieldKind::Enum(WELD_TYPES), required: false, desc: "weld process used" },
        FieldSpec { name: "barrelTemp", kind: FieldKind::Number, required: false, desc: "barrel temperature in degrees Celsius" },
        FieldSpec { name: "wedgeTemp", kind: FieldKind::Number, required: false, desc: "wedge temperature in degrees Celsius" },
        FieldSpec { name: "machineSpeed", kind: FieldKind::Number, required: false, desc: "machine travel speed in meters per minute" },
        FieldSpec { name: "ambientTemp", kind: FieldKind::Number, required: false, desc: "ambient air temperature in degrees Celsius" },
        FieldSpec { name: "seamLength", kind: FieldKind::Number, required: false, desc: "seam length in meters" },
        FieldSpec { name: "materialThickness", kind: FieldKind::Number, required: false, desc: "geomembrane thickness in mils or mm as written" },
        FieldSpec { name: "trialWeldRef", kind: FieldKind::Text, required: false, desc: "reference to the qualifying trial weld" },
        FieldSpec { name: "comments", kind: FieldKind::Text, required: false, desc: "free-form remarks" },
    ],
};

static NON_DESTRUCTIVE: DomainSchema = DomainSchema {
    domain: FormDomain::NonDestructive,
    fields: &[
        FieldSpec { name: "seamNumber", kind: FieldKind::Text, required: true, desc: "seam number under test" },
        FieldSpec { name: "testDate", kind: FieldKind::Date, required: true, desc: "date the test was performed" },
        FieldSpec { name: "testMethod", kind: FieldKind::Enum(&["air_pressure", "vacuum_box", "spark"]), required: true, desc: "non-destructive test method" },
        FieldSpec { name: "result", kind: FieldKind::Enum(PASS_FAIL), required: true, desc: "test outcome" },
        FieldSpec { name: "operatorInitials", kind: FieldKind::Text, required: false, desc: "initials of the testing operator" },
    ],
};

static TRIAL_WELD: DomainSchema = DomainSchema {
    domain: FormDomain::TrialWeld,
    fields: &[
        FieldSpec { name: "dateTime", kind: FieldKind::DateTime, required: true, desc: "date and time of the trial weld" },
        FieldSpec { name: "seamerInitials", kind: FieldKind::Text, required: true, desc: "initials of the seaming technician" },
        FieldSpec { name: "machineNumber", kind: FieldKind::Text, required: false, desc: "welding machine identification number" },
        FieldSpec { name: "weldType", kind: FieldKind::Enum(WELD_TYPES), required: false, desc: "weld process used" },
        FieldSpec { name: "barrelTemp", kind: FieldKind::Number, required: false, desc: "barrel temperature in degrees Celsius" },
        FieldSpec { name: "wedgeTemp", kind: FieldKind::Number, required: false, desc: "wedge temperature in degrees Celsius" },
        FieldSpec { name: "machineSpeed", kind: FieldKind::Number, required: false, desc: "machine travel speed in meters per minute" },
        FieldSpec { name: "ambientTemp", kind: FieldKind::Number, required: false, desc: "ambient air temperature in degrees Celsius" },
        FieldSpec { name: "materialType", kind: FieldKind::Text, required: false, desc: "geomembrane material, e.g. 60 mil HDPE" },
        FieldSpec { name: "materialThickness", kind: FieldKind::Number, required: false, desc: "material thickness in mils or mm as written" },
        FieldSpec { name: "peelInside", kind: FieldKind::Number, required: false, desc: "inside peel strength in pounds per inch" },
        FieldSpec { name: "peelOutside", kind: FieldKind::Number, required: false, desc: "outside peel strength in pounds per inch" },
        FieldSpec { name: "shearStrength", kind: FieldKind::Number, required: false, desc: "shear strength in pounds per inch" },
        FieldSpec { name: "result", kind: FieldKind::Enum(PASS_FAIL), required: true, desc: "trial weld outcome" },
    ],
};

static REPAIRS: DomainSchema = DomainSchema {
    domain: FormDomain::Repairs,
    fields: &[
        FieldSpec { name: "repairId", kind: FieldKind::Identifier { prefix: "R" }, required: true, desc: "repair identifier in R-<number> format" },
        FieldSpec { name: "repairDate", kind: FieldKind::Date, required: true, desc: "date the repair was completed" },
        FieldSpec { name: "panelNumber", kind: FieldKind::Text, required: false, desc: "panel containing the repair" },
        FieldSpec { name: "seamNumber", kind: FieldKind::Text, required: false, desc: "seam containing the repair, if applicable" },
        FieldSpec { name: "repairType", kind: FieldKind::Enum(&["patch", "cap", "bead", "weld"]), required: false, desc: "kind of repair performed" },
        FieldSpec { name: "location", kind: FieldKind::Text, required: false, desc: "station or offset describing where the repair is" },
        FieldSpec { name: "technicianInitials", kind: FieldKind::Text, required: false, desc: "initials of the repair technician" },
    ],
};

static DESTRUCTIVE: DomainSchema = DomainSchema {
    domain: FormDomain::Destructive,
    fields: &[
        FieldSpec { name: "sampleId", kind: FieldKind::Identifier { prefix: "D" }, required: true, desc: "destructive sample identifier in D-<number> format" },
        FieldSpec { name: "sampleDate", kind: FieldKind::Date, required: true, desc: "date the sample was cut" },
        FieldSpec { name: "seamNumber", kind: FieldKind::Text, required: true, desc: "seam the sample was taken from" },
        FieldSpec { name: "panelLeft", kind: FieldKind::Text, required: false, desc: "panel number on the left side of the seam" },
        FieldSpec { name: "panelRight", kind: FieldKind::Text, required: false, desc: "panel number on the right side of the seam" },
        FieldSpec { name: "seamerInitials", kind: FieldKind::Text, required: false, desc: "initials of the technician who made the seam" },
        FieldSpec { name: "machineNumber", kind: FieldKind::Text, required: false, desc: "welding machine identification number" },
        FieldSpec { name: "peelInside", kind: FieldKind::Number, required: false, desc: "inside peel strength in pounds per inch" },
        FieldSpec { name: "peelOutside", kind: FieldKind::Number, required: false, desc: "outside peel strength in pounds per inch" },
        FieldSpec { name: "shearStrength", kind: FieldKind::Number, required: false, desc: "shear strength in pounds per inch" },
        FieldSpec { name: "result", kind: FieldKind::Enum(PASS_FAIL), required: false, desc: "field or lab test outcome" },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_six_domains_resolve() {
        for id in [
            "panel_placement",
            "panel_seaming",
            "non_destructive",
            "trial_weld",
            "repairs",
            "destructive",
        ] {
            let schema = lookup(id).unwrap_or_else(|| panic!("missing schema for {id}"));
            assert_eq!(schema.domain.as_str(), id);
        }
    }

    #[test]
    fn unknown_domain_is_none() {
        assert!(lookup("unknown_type").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn field_counts_match_form_layouts() {
        assert_eq!(lookup("panel_placement").unwrap().fields.len(), 4);
        assert_eq!(lookup("panel_seaming").unwrap().fields.len(), 15);
        assert_eq!(lookup("non_destructive").unwrap().fields.len(), 5);
        assert_eq!(lookup("trial_weld").unwrap().fields.len(), 14);
        assert_eq!(lookup("repairs").unwrap().fields.len(), 7);
        assert_eq!(lookup("destructive").unwrap().fields.len(), 11);
    }

    #[test]
    fn identifier_fields_carry_their_prefix() {
        let repairs = lookup("repairs").unwrap();
        match repairs.field("repairId").unwrap().kind {
            FieldKind::Identifier { prefix } => assert_eq!(prefix, "R"),
            other => panic!("repairId should be an identifier, got {other:?}"),
        }

        let destructive = lookup("destructive").unwrap();
        match destructive.field("sampleId").unwrap().kind {
            FieldKind::Identifier { prefix } => assert_eq!(prefix, "D"),
            other => panic!("sampleId should be an identifier, got {other:?}"),
        }
    }

    #[test]
    fn field_names_are_unique_within_a_schema() {
        for domain in [
            FormDomain::PanelPlacement,
            FormDomain::PanelSeaming,
            FormDomain::NonDestructive,
            FormDomain::TrialWeld,
            FormDomain::Repairs,
            FormDomain::Destructive,
        ] {
            let schema = domain.schema();
            let mut names: Vec<_> = schema.field_names().collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), schema.fields.len(), "{domain:?}");
        }
    }

    #[test]
    fn domain_id_round_trips() {
        for domain in [FormDomain::Repairs, FormDomain::TrialWeld] {
            assert_eq!(FormDomain::parse(domain.as_str()), Some(domain));
        }
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(FormDomain::parse("  repairs "), Some(FormDomain::Repairs));
    }
}
