//! Entity-type validity of relation tags.
//!
//! A [`RelationObservation`] is populated with the two argument mentions of a
//! candidate relation and then asked whether a tag is allowed for them. The
//! validation string picks the table:
//!
//! ```text
//! NONE           every tag is valid
//! 2005           argument types must fit the tag, in either order
//! 2005_ORDERED   argument types must fit the tag, left then right
//! ```

use layered_resolution::{EntityType, Mention, ResolutionError, ResolutionResult, Symbol};

pub const VALIDATION_NONE: &str = "NONE";
pub const VALIDATION_2005: &str = "2005";
pub const VALIDATION_2005_ORDERED: &str = "2005_ORDERED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationTable {
    AcceptAll,
    Ace2005 { ordered: bool },
}

impl ValidationTable {
    pub fn parse(text: &str) -> ResolutionResult<Self> {
        match text.trim() {
            VALIDATION_NONE => Ok(ValidationTable::AcceptAll),
            VALIDATION_2005 => Ok(ValidationTable::Ace2005 { ordered: false }),
            VALIDATION_2005_ORDERED => Ok(ValidationTable::Ace2005 { ordered: true }),
            other => Err(ResolutionError::unexpected_input(format!(
                "relation_validation_str: unknown validation table '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelationObservation {
    table: ValidationTable,
    left: Option<EntityType>,
    right: Option<EntityType>,
}

impl RelationObservation {
    pub fn new(validation_str: &str) -> ResolutionResult<Self> {
        Ok(RelationObservation {
            table: ValidationTable::parse(validation_str)?,
            left: None,
            right: None,
        })
    }

    pub fn table(&self) -> ValidationTable {
        self.table
    }

    pub fn populate(&mut self, left: &Mention, right: &Mention) {
        self.left = Some(left.entity_type.clone());
        self.right = Some(right.entity_type.clone());
    }

    /// Whether `tag` may hold between the populated mentions. An unpopulated
    /// observation only accepts tags under the `NONE` table.
    pub fn is_valid_tag(&self, tag: &Symbol) -> bool {
        let ordered = match self.table {
            ValidationTable::AcceptAll => return true,
            ValidationTable::Ace2005 { ordered } => ordered,
        };
        let (Some(left), Some(right)) = (&self.left, &self.right) else {
            return false;
        };
        let (left, right) = (left.name().as_str(), right.name().as_str());
        fits_2005(tag.as_str(), left, right) || (!ordered && fits_2005(tag.as_str(), right, left))
    }
}

fn any_of(ty: &str, allowed: &[&str]) -> bool {
    allowed.contains(&ty)
}

/// ACE 2005 argument type constraints.
fn fits_2005(tag: &str, arg1: &str, arg2: &str) -> bool {
    let category = tag.split('.').next().unwrap_or(tag);
    if category == "PER-SOC" {
        return arg1 == "PER" && arg2 == "PER";
    }
    match tag {
        "PHYS.Located" => arg1 == "PER" && any_of(arg2, &["GPE", "LOC", "FAC"]),
        "PHYS.Near" => any_of(arg1, &["PER", "GPE", "LOC", "FAC"]) && any_of(arg2, &["GPE", "LOC", "FAC"]),
        "PART-WHOLE.Geographical" => any_of(arg1, &["GPE", "LOC", "FAC"]) && any_of(arg2, &["GPE", "LOC", "FAC"]),
        "PART-WHOLE.Subsidiary" => arg1 == "ORG" && any_of(arg2, &["GPE", "ORG"]),
        "PART-WHOLE.Artifact" => arg1 == arg2 && any_of(arg1, &["VEH", "WEA"]),
        "ORG-AFF.Employment" => arg1 == "PER" && any_of(arg2, &["GPE", "ORG"]),
        "ORG-AFF.Ownership" => arg1 == "PER" && arg2 == "ORG",
        "ORG-AFF.Founder" => any_of(arg1, &["PER", "ORG"]) && any_of(arg2, &["GPE", "ORG"]),
        "ORG-AFF.Student-Alum" | "ORG-AFF.Sports-Affiliation" => arg1 == "PER" && arg2 == "ORG",
        "ORG-AFF.Investor-Shareholder" => any_of(arg1, &["PER", "ORG", "GPE"]) && any_of(arg2, &["ORG", "GPE"]),
        "ORG-AFF.Membership" => any_of(arg1, &["PER", "ORG", "GPE"]) && arg2 == "ORG",
        "ART.User-Owner-Inventor-Manufacturer" => {
            any_of(arg1, &["PER", "ORG", "GPE"]) && any_of(arg2, &["WEA", "VEH", "FAC"])
        }
        "GEN-AFF.Citizen-Resident-Religion-Ethnicity" => arg1 == "PER" && any_of(arg2, &["PER", "LOC", "GPE", "ORG"]),
        "GEN-AFF.Org-Location" => arg1 == "ORG" && any_of(arg2, &["LOC", "GPE"]),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_table_is_rejected() {
        let err = RelationObservation::new("2004").unwrap_err();
        assert!(matches!(err, ResolutionError::UnexpectedInput { .. }));
    }

    #[test]
    fn ace_2005_constraints() {
        assert!(fits_2005("ORG-AFF.Employment", "PER", "ORG"));
        assert!(!fits_2005("ORG-AFF.Employment", "ORG", "PER"));
        assert!(fits_2005("PER-SOC.Family.Parent", "PER", "PER"));
        assert!(!fits_2005("PART-WHOLE.Artifact", "VEH", "WEA"));
        assert!(!fits_2005("Conflict.AttackOn", "PER", "PER"));
    }

    #[test]
    fn none_table_accepts_everything() {
        let observation = RelationObservation::new(VALIDATION_NONE).expect("table");
        assert!(observation.is_valid_tag(&Symbol::new("AttackOn")));
    }
}
