//! Read-only catalogue of rubrics and per-unit assessment criteria.
//!
//! Loaded once at startup (built-in or from `CATALOGUE_PATH`) and shared
//! behind an `Arc`. Nothing mutates it afterwards.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use super::{CriterionSpec, RubricDefinition};

/// One teaching unit: its title, optional rubric override and the ordered
/// list of assessment-criteria statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub code: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rubric: Option<RubricDefinition>,
    #[serde(default)]
    pub assessment_criteria: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalogue {
    pub default_rubric: RubricDefinition,
    #[serde(default)]
    pub units: Vec<UnitSpec>,
}

impl Catalogue {
    /// Loads a catalogue from a JSON file. Every rubric is validated during
    /// deserialization; duplicate unit codes are rejected here.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalogue file '{}'", path.display()))?;
        let catalogue: Catalogue = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid catalogue file '{}'", path.display()))?;
        catalogue.check_unique_codes()?;
        Ok(catalogue)
    }

    /// The built-in Qualifi Level 4 catalogue.
    pub fn builtin() -> Result<Self> {
        let default_rubric = RubricDefinition::new(
            "qualifi-l4-v1",
            vec![
                CriterionSpec::new("Knowledge & Understanding", 30),
                CriterionSpec::new("Theory & Application", 25),
                CriterionSpec::new("Critical Analysis", 20),
                CriterionSpec::new("Referencing", 15),
                CriterionSpec::new("Presentation & Structure", 10),
            ],
        )?;

        let units = vec![
            unit(
                "L4-AI-01",
                "Artificial Intelligence in Business",
                &[
                    "1.1 Define artificial intelligence and machine learning",
                    "1.2 Describe the history of AI development",
                    "2.1 Explain trending AI technologies",
                    "2.2 Analyse ethical issues of AI adoption",
                    "3.1 Evaluate the impact of AI on organisations",
                ],
            ),
            unit(
                "L4-RM-02",
                "Research Methods",
                &[
                    "1.1 Explain research philosophies",
                    "1.2 Compare qualitative and quantitative methods",
                    "2.1 Design a research proposal",
                    "2.2 Justify sampling techniques",
                ],
            ),
            unit(
                "L4-MGT-03",
                "Management and Leadership",
                &[
                    "1.1 Explain leadership theories",
                    "1.2 Assess management styles",
                    "2.1 Analyse organisational culture",
                    "3.1 Evaluate motivation theories",
                ],
            ),
        ];

        Ok(Self {
            default_rubric,
            units,
        })
    }

    /// Case-insensitive unit lookup.
    pub fn unit(&self, code: &str) -> Option<&UnitSpec> {
        let code = code.trim();
        self.units
            .iter()
            .find(|u| u.code.eq_ignore_ascii_case(code))
    }

    /// The rubric for a unit: its own override, else the catalogue default.
    pub fn rubric_for(&self, code: &str) -> &RubricDefinition {
        self.unit(code)
            .and_then(|u| u.rubric.as_ref())
            .unwrap_or(&self.default_rubric)
    }

    fn check_unique_codes(&self) -> Result<()> {
        for (i, unit) in self.units.iter().enumerate() {
            if self.units[..i]
                .iter()
                .any(|u| u.code.eq_ignore_ascii_case(&unit.code))
            {
                bail!("Duplicate unit code '{}' in catalogue", unit.code);
            }
        }
        Ok(())
    }
}

fn unit(code: &str, title: &str, criteria: &[&str]) -> UnitSpec {
    UnitSpec {
        code: code.to_string(),
        title: title.to_string(),
        rubric: None,
        assessment_criteria: criteria.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalogue_is_valid() {
        let catalogue = Catalogue::builtin().unwrap();
        assert_eq!(catalogue.default_rubric.max_total(), 100);
        assert!(catalogue.units.len() >= 3);
        catalogue.check_unique_codes().unwrap();
    }

    #[test]
    fn test_unit_lookup_is_case_insensitive() {
        let catalogue = Catalogue::builtin().unwrap();
        let unit = catalogue.unit(" l4-ai-01 ").unwrap();
        assert_eq!(unit.title, "Artificial Intelligence in Business");
        assert!(unit
            .assessment_criteria
            .iter()
            .any(|c| c == "2.1 Explain trending AI technologies"));
    }

    #[test]
    fn test_unknown_unit_falls_back_to_default_rubric() {
        let catalogue = Catalogue::builtin().unwrap();
        assert!(catalogue.unit("NOPE").is_none());
        assert_eq!(catalogue.rubric_for("NOPE").id(), "qualifi-l4-v1");
    }

    #[test]
    fn test_unit_rubric_override() {
        let json = r#"{
            "default_rubric": {"id": "base", "criteria": [{"name": "Content", "max_score": 10}]},
            "units": [{
                "code": "U1",
                "title": "Unit One",
                "rubric": {"id": "u1", "criteria": [{"name": "Theory", "max_score": 20}]},
                "assessment_criteria": ["1.1 Explain things"]
            }]
        }"#;
        let catalogue: Catalogue = serde_json::from_str(json).unwrap();
        assert_eq!(catalogue.rubric_for("U1").id(), "u1");
        assert_eq!(catalogue.rubric_for("U2").id(), "base");
    }

    #[test]
    fn test_duplicate_unit_codes_rejected() {
        let mut catalogue = Catalogue::builtin().unwrap();
        let mut dup = catalogue.units[0].clone();
        dup.code = dup.code.to_lowercase();
        catalogue.units.push(dup);
        assert!(catalogue.check_unique_codes().is_err());
    }

    #[test]
    fn test_load_missing_file_errors() {
        let err = Catalogue::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read catalogue file"));
    }
}
