//! Analysis Rubrics
//!
//! Loads named rubrics from `rubrics.json` and renders them into the
//! prompt section the model grades against.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::AnalyzerError;

/// A single analysis criterion within a rubric.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Criterion {
    pub title: String,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub description: String,
}

/// A named set of criteria for one document type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Rubric {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub criteria: Vec<Criterion>,
}

impl Rubric {
    /// Render the rubric for inclusion in the analysis prompt.
    pub fn format_for_prompt(&self) -> String {
        let mut out = format!("Rubric Name: {}\n", self.name);
        out.push_str(&format!("Description: {}\n\n", self.description));

        for criterion in &self.criteria {
            out.push_str(&format!(
                "Criteria: {} ({} points)\n",
                criterion.title, criterion.points
            ));
            out.push_str(&format!("Description: {}\n\n", criterion.description));
        }

        out
    }
}

/// Load one rubric by key from the rubrics file.
pub fn load_rubric(path: &Path, rubric_name: &str) -> Result<Rubric, AnalyzerError> {
    if !path.exists() {
        return Err(AnalyzerError::RubricsMissing(path.display().to_string()));
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| AnalyzerError::RubricsUnreadable(path.display().to_string(), e.to_string()))?;

    let rubrics: HashMap<String, Rubric> = serde_json::from_str(&contents)
        .map_err(|e| AnalyzerError::RubricsUnreadable(path.display().to_string(), e.to_string()))?;

    rubrics
        .get(rubric_name)
        .cloned()
        .ok_or_else(|| AnalyzerError::UnknownRubric(rubric_name.to_string()))
}
