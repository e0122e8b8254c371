//! Strict schema for the model's structured verdict.
//!
//! The model is instructed to reply with a single JSON object matching
//! [`AnalysisOutput`]. Parsing and validation are all-or-nothing: unknown or
//! missing fields, bad enum values and length violations are rejected, never
//! coerced. Validation failures stay values ([`OutputError`]) at this boundary
//! and are converted to the service error taxonomy by the orchestrator.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Errors produced while parsing and validating a model reply
#[derive(Debug, Error)]
pub enum OutputError {
    /// The model returned no text at all
    #[error("model returned an empty response")]
    EmptyResponse,

    /// The reply is not parseable as JSON
    #[error("model response is not valid JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    /// The reply is JSON but does not satisfy the report schema
    #[error("model response violates the report schema: {}", violations.join("; "))]
    SchemaViolation { violations: Vec<String> },
}

/// Campaign validation verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Validated,
    NotValidated,
    CloseToValidation,
}

/// Funnel stage a bottleneck is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStage {
    Traffic,
    Funnel,
    Checkout,
    Offer,
}

/// How far below benchmark a metric sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    Low,
}

/// Implementation effort for a recommended action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A model-identified underperforming funnel stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct Bottleneck {
    pub stage: FunnelStage,
    /// Name of the underperforming metric
    pub metric: String,
    pub current_value: f64,
    pub benchmark_value: f64,
    pub severity: Severity,
    pub explanation: String,
}

/// One prioritized action from the model's plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ActionItem {
    /// 1 is most important
    pub priority: u32,
    pub action: String,
    /// e.g. "+15% CR", "+$500 revenue"
    pub expected_impact: String,
    pub difficulty: Difficulty,
}

/// The model's structured verdict for one campaign analysis.
///
/// Field names and nesting are embedded verbatim in the prompt's output-format
/// contract ([`super::prompt`]); the two must stay in sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AnalysisOutput {
    pub summary: String,
    pub validation_status: ValidationStatus,
    pub validation_explanation: String,
    pub bottlenecks: Vec<Bottleneck>,
    pub action_plan: Vec<ActionItem>,
    pub missing_data: Vec<String>,
    pub next_test_recommendations: String,
}

impl AnalysisOutput {
    /// Checks the constraints serde's type checking can't express, collecting
    /// every violation instead of stopping at the first.
    pub fn validate(&self) -> Result<(), OutputError> {
        let mut violations = Vec::new();

        check_min_len(&mut violations, "summary", &self.summary, 10);
        check_min_len(&mut violations, "validation_explanation", &self.validation_explanation, 10);
        check_min_len(
            &mut violations,
            "next_test_recommendations",
            &self.next_test_recommendations,
            10,
        );

        if self.bottlenecks.len() > 5 {
            violations.push(format!("bottlenecks: at most 5 entries allowed, got {}", self.bottlenecks.len()));
        }
        for (i, bottleneck) in self.bottlenecks.iter().enumerate() {
            check_min_len(&mut violations, &format!("bottlenecks[{i}].explanation"), &bottleneck.explanation, 10);
        }

        for (i, item) in self.action_plan.iter().enumerate() {
            if item.priority < 1 {
                violations.push(format!("action_plan[{i}].priority: must be a positive integer"));
            }
            check_min_len(&mut violations, &format!("action_plan[{i}].action"), &item.action, 10);
            check_min_len(&mut violations, &format!("action_plan[{i}].expected_impact"), &item.expected_impact, 3);
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(OutputError::SchemaViolation { violations })
        }
    }
}

fn check_min_len(violations: &mut Vec<String>, field: &str, value: &str, min: usize) {
    if value.chars().count() < min {
        violations.push(format!("{field}: must be at least {min} characters"));
    }
}

/// Parses a raw model reply into a validated [`AnalysisOutput`].
///
/// The three failure variants mirror the stages: empty reply, JSON parse
/// failure, schema violation. No partial result is ever returned.
pub fn parse_output(raw: &str) -> Result<AnalysisOutput, OutputError> {
    if raw.trim().is_empty() {
        return Err(OutputError::EmptyResponse);
    }

    let value: serde_json::Value = serde_json::from_str(raw).map_err(OutputError::MalformedJson)?;

    let output: AnalysisOutput = serde_json::from_value(value).map_err(|e| OutputError::SchemaViolation {
        violations: vec![e.to_string()],
    })?;

    output.validate()?;
    Ok(output)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn valid_output_json() -> serde_json::Value {
        json!({
            "summary": "Campaign is performing above market benchmarks overall.",
            "validation_status": "validated",
            "validation_explanation": "ROAS of 3.5 with 12 sales clears both validation thresholds.",
            "bottlenecks": [
                {
                    "stage": "traffic",
                    "metric": "ctr",
                    "current_value": 1.2,
                    "benchmark_value": 2.0,
                    "severity": "medium",
                    "explanation": "CTR sits 40% below the ideal benchmark value."
                }
            ],
            "action_plan": [
                {
                    "priority": 1,
                    "action": "Test three new ad creatives against the current control.",
                    "expected_impact": "+0.5% CTR",
                    "difficulty": "easy"
                }
            ],
            "missing_data": ["checkout abandonment rate"],
            "next_test_recommendations": "Run a headline test, a landing page test, and a price anchor test."
        })
    }

    #[test]
    fn test_valid_output_parses() {
        let raw = valid_output_json().to_string();
        let output = parse_output(&raw).expect("valid output should parse");
        assert_eq!(output.validation_status, ValidationStatus::Validated);
        assert_eq!(output.bottlenecks.len(), 1);
        assert_eq!(output.bottlenecks[0].severity, Severity::Medium);
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let raw = valid_output_json().to_string();
        let output = parse_output(&raw).unwrap();
        let reserialized = serde_json::to_value(&output).unwrap();
        assert_eq!(reserialized, valid_output_json());
    }

    #[test]
    fn test_empty_response() {
        assert!(matches!(parse_output(""), Err(OutputError::EmptyResponse)));
        assert!(matches!(parse_output("   \n"), Err(OutputError::EmptyResponse)));
    }

    #[test]
    fn test_not_json() {
        assert!(matches!(parse_output("not json"), Err(OutputError::MalformedJson(_))));
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let mut value = valid_output_json();
        value.as_object_mut().unwrap().remove("validation_status");
        let err = parse_output(&value.to_string()).unwrap_err();
        assert!(matches!(err, OutputError::SchemaViolation { .. }));
    }

    #[test]
    fn test_invalid_enum_value_rejected() {
        let mut value = valid_output_json();
        value["bottlenecks"][0]["severity"] = json!("extreme");
        let err = parse_output(&value.to_string()).unwrap_err();
        assert!(matches!(err, OutputError::SchemaViolation { .. }));
    }

    #[test]
    fn test_unknown_extra_field_rejected() {
        let mut value = valid_output_json();
        value["confidence"] = json!(0.9);
        let err = parse_output(&value.to_string()).unwrap_err();
        assert!(matches!(err, OutputError::SchemaViolation { .. }));
    }

    #[test]
    fn test_short_texts_collected_as_violations() {
        let mut value = valid_output_json();
        value["summary"] = json!("too short");
        value["action_plan"][0]["expected_impact"] = json!("+");
        let err = parse_output(&value.to_string()).unwrap_err();
        match err {
            OutputError::SchemaViolation { violations } => {
                assert_eq!(violations.len(), 2);
                assert!(violations[0].contains("summary"));
                assert!(violations[1].contains("expected_impact"));
            }
            other => panic!("expected SchemaViolation, got {other:?}"),
        }
    }

    #[test]
    fn test_more_than_five_bottlenecks_rejected() {
        let mut value = valid_output_json();
        let bottleneck = value["bottlenecks"][0].clone();
        value["bottlenecks"] = json!(vec![bottleneck; 6]);
        let err = parse_output(&value.to_string()).unwrap_err();
        match err {
            OutputError::SchemaViolation { violations } => {
                assert!(violations[0].contains("at most 5"));
            }
            other => panic!("expected SchemaViolation, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_priority_rejected() {
        let mut value = valid_output_json();
        value["action_plan"][0]["priority"] = json!(0);
        let err = parse_output(&value.to_string()).unwrap_err();
        match err {
            OutputError::SchemaViolation { violations } => {
                assert!(violations[0].contains("priority"));
            }
            other => panic!("expected SchemaViolation, got {other:?}"),
        }
    }
}
