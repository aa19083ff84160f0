//! Raster labels used to name output tables

use serde::{Deserialize, Serialize};

/// A substring match on the raster name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRule {
    /// Any of these substrings selects the rule
    pub patterns: Vec<String>,
    pub label: String,
}

impl LabelRule {
    pub fn new<I, S>(patterns: I, label: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            label: label.into(),
        }
    }

    fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| name.contains(p.as_str()))
    }
}

/// Ordered label rules; the first match wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelRules {
    pub rules: Vec<LabelRule>,
    /// Label when no rule matches
    pub fallback: String,
}

impl Default for LabelRules {
    fn default() -> Self {
        Self {
            rules: vec![
                LabelRule::new(["2020"], "2020_landcover"),
                LabelRule::new(["2015"], "2015_landcover"),
                LabelRule::new(["2030", "Simulation"], "2030_prediction"),
            ],
            fallback: "unknown".into(),
        }
    }
}

impl LabelRules {
    /// Label for a raster name (typically the file stem)
    pub fn label_for(&self, name: &str) -> &str {
        self.rules
            .iter()
            .find(|r| r.matches(name))
            .map(|r| r.label.as_str())
            .unwrap_or(&self.fallback)
    }
}

/// Output file name for a label and extension
pub fn output_file_name(label: &str, extension: &str) -> String {
    format!("fishnet_metrics_{}.{}", label, extension)
}
