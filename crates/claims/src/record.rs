//! Decoded claim records and their typed views.
//!
//! A [`ClaimRecord`] is the plain mapping produced by
//! [`crate::decoder::decode_document`]. Processing stages add blocks to the
//! record over time. An absent or mistyped key yields `None` or that field's
//! own default, never an error; the other fields of a block are kept.
//! Numbers stored as decimals come back as floats (`3.0`), so integral
//! floats are accepted wherever a count is expected.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::JobId;

/// Record key holding the job identifier.
pub const JOB_ID_KEY: &str = "claim_id";
/// Record key holding the processing status.
pub const STATUS_KEY: &str = "status";
/// Record key holding the explicit completion flag.
pub const PROCESSING_COMPLETE_KEY: &str = "processing_complete";
/// Record key holding the risk-analysis block.
pub const RISK_ANALYSIS_KEY: &str = "risk_analysis";
/// Record key holding the medical-entities block.
pub const MEDICAL_ENTITIES_KEY: &str = "medical_entities";

/// Processing status values written by the backend stages, in order.
pub mod status {
    pub const UPLOADED: &str = "UPLOADED";
    pub const TEXT_EXTRACTED: &str = "TEXT_EXTRACTED";
    pub const MEDICAL_ANALYSIS_COMPLETE: &str = "MEDICAL_ANALYSIS_COMPLETE";
    /// The last stage; no further change is expected once observed.
    pub const SCORING_COMPLETE: &str = "SCORING_COMPLETE";
}

// ---------------------------------------------------------------------------
// ClaimRecord
// ---------------------------------------------------------------------------

/// A plain (untagged) claim record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimRecord(Map<String, Value>);

impl ClaimRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Builds a record from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The job identifier stored in the record, if present.
    pub fn job_id(&self) -> Option<JobId> {
        self.str_field(JOB_ID_KEY).and_then(JobId::new)
    }

    /// The current processing status, if present.
    pub fn status(&self) -> Option<&str> {
        self.str_field(STATUS_KEY)
    }

    /// The explicit completion flag. Absent means `false`.
    pub fn processing_complete(&self) -> bool {
        self.get(PROCESSING_COMPLETE_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.str_field("user_id")
    }

    pub fn file_size(&self) -> Option<u64> {
        self.get("file_size").and_then(integral_u64)
    }

    pub fn created_at(&self) -> Option<&str> {
        self.str_field("created_at")
    }

    pub fn final_score(&self) -> Option<f64> {
        self.get("final_score").and_then(Value::as_f64)
    }

    /// The risk-analysis block; default when absent or not an object.
    pub fn risk_analysis(&self) -> RiskAnalysis {
        self.view(RISK_ANALYSIS_KEY)
    }

    /// The medical-entities block; default when absent or not an object.
    pub fn medical_entities(&self) -> MedicalEntities {
        self.view(MEDICAL_ENTITIES_KEY)
    }

    /// `true` once the risk-analysis block is present.
    pub fn has_risk_analysis(&self) -> bool {
        matches!(self.get(RISK_ANALYSIS_KEY), Some(Value::Object(_)))
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    fn view<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let Some(value) = self.get(key) else {
            return T::default();
        };
        match T::deserialize(value) {
            Ok(view) => view,
            Err(err) => {
                tracing::debug!(key, error = %err, "claim record block has unexpected shape; using default");
                T::default()
            }
        }
    }
}

impl From<Map<String, Value>> for ClaimRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

// ---------------------------------------------------------------------------
// Risk analysis view
// ---------------------------------------------------------------------------

/// Coarse risk band assigned by the scoring stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Follow-up recommended by the scoring stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendedAction {
    AutoApprove,
    ManualReview,
    DetailedInvestigation,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One scoring rule that contributed points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskFactor {
    #[serde(deserialize_with = "lenient_text")]
    pub category: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub points: f64,
    #[serde(deserialize_with = "lenient_text")]
    pub severity: String,
    #[serde(deserialize_with = "lenient_text")]
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskStatistics {
    #[serde(deserialize_with = "lenient_u64")]
    pub total_diagnoses: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub total_procedures: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub total_medications: u64,
    #[serde(deserialize_with = "lenient_f64")]
    pub claim_amount: f64,
}

/// The `risk_analysis` block of a scored claim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskAnalysis {
    #[serde(deserialize_with = "lenient_f64")]
    pub risk_score: f64,
    #[serde(deserialize_with = "lenient")]
    pub risk_level: RiskLevel,
    #[serde(deserialize_with = "lenient")]
    pub recommended_action: RecommendedAction,
    #[serde(deserialize_with = "lenient_f64")]
    pub confidence_score: f64,
    #[serde(deserialize_with = "lenient_text")]
    pub color_indicator: String,
    #[serde(deserialize_with = "lenient_list")]
    pub flags: Vec<String>,
    #[serde(deserialize_with = "lenient_items")]
    pub risk_breakdown: Vec<RiskFactor>,
    #[serde(deserialize_with = "lenient")]
    pub statistics: RiskStatistics,
    #[serde(deserialize_with = "lenient_text")]
    pub processing_method: String,
    #[serde(deserialize_with = "lenient_text")]
    pub timestamp: String,
}

// ---------------------------------------------------------------------------
// Medical entities view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Patient {
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub age: String,
    #[serde(deserialize_with = "lenient_text")]
    pub gender: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Provider {
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub npi: String,
}

/// The `medical_entities` block produced by the extraction stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicalEntities {
    #[serde(deserialize_with = "lenient")]
    pub patient: Patient,
    #[serde(deserialize_with = "lenient")]
    pub provider: Provider,
    #[serde(deserialize_with = "lenient_list")]
    pub diagnosis_codes: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub procedure_codes: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub medications: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub conditions: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub claim_amount: String,
}

// Each field falls back to its own default so one bad value never discards
// the rest of its block. Extraction output is model-generated and scoring
// output passes through decimal storage.

fn integral_u64(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f < u64::MAX as f64)
            .map(|f| f as u64)
    })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_text(&value).unwrap_or_default())
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64().unwrap_or_default())
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(integral_u64(&value).unwrap_or_default())
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Keeps the well-formed entries of a list and drops the rest.
fn lenient_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| T::deserialize(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(&other).into_iter().collect(),
    })
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
