use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::enums::ComplianceStatus;

/// Structured analysis payload as the model is asked to produce it.
///
/// The remote payload has no enforced schema, so every field defaults and the
/// renderer treats everything as optional. Wire names are the camelCase keys
/// the prompt describes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisResult {
    pub ai_review_framework: Vec<FrameworkFinding>,
    pub plan_by_plan_review: Vec<PlanFinding>,
    pub policy_compatibility_summary: Vec<PolicyEntry>,
    pub ai_recommendation_summary: String,
}

/// Per-framework finding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameworkFinding {
    pub framework: String,
    pub relevant_policies: Vec<String>,
    pub key_considerations: String,
}

/// Per-drawing finding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanFinding {
    pub plan_type: String,
    pub positives: Vec<String>,
    pub observations: Vec<String>,
    pub compliance_notes: String,
}

/// Per-policy-area compliance entry. `status` stays a raw string on the wire;
/// classification happens at render time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyEntry {
    pub policy_area: String,
    pub status: String,
    pub details: String,
    pub recommendations: Vec<String>,
}

impl PolicyEntry {
    /// Classified status; `None` for anything outside the three-value enum,
    /// which the renderer shows with a neutral treatment.
    pub fn classified_status(&self) -> Option<ComplianceStatus> {
        self.status.parse().ok()
    }
}

impl AnalysisResult {
    /// Lenient conversion from the extracted JSON object.
    ///
    /// Arrays are parsed item by item, skipping entries that fail to
    /// deserialize; missing or mistyped fields collapse to their defaults.
    pub fn from_value(value: &Value) -> Self {
        Self {
            ai_review_framework: parse_array_lenient(value.get("aiReviewFramework")),
            plan_by_plan_review: parse_array_lenient(value.get("planByPlanReview")),
            policy_compatibility_summary: parse_array_lenient(
                value.get("policyCompatibilitySummary"),
            ),
            ai_recommendation_summary: value
                .get("aiRecommendationSummary")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ai_review_framework.is_empty()
            && self.plan_by_plan_review.is_empty()
            && self.policy_compatibility_summary.is_empty()
            && self.ai_recommendation_summary.trim().is_empty()
    }
}

/// Parse an array leniently — skip items that fail to deserialize.
fn parse_array_lenient<T: for<'de> Deserialize<'de>>(value: Option<&Value>) -> Vec<T> {
    match value.and_then(Value::as_array) {
        None => vec![],
        Some(arr) => arr
            .iter()
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect(),
    }
}
