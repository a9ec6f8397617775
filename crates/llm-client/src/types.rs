use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One market-scan request. `focus` narrows the scan to a theme when set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub request_id: Uuid,
    pub niche_count: usize,
    pub focus: Option<String>,
    pub as_of_ts_ms: i64,
}

/// The record shape the generator is asked to produce. Used only to embed
/// a JSON schema in the system prompt; responses are parsed leniently as
/// raw JSON because the generator does not reliably honor the schema.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NicheRecord {
    pub niche: String,
    pub description: String,
    pub average_price: f64,
    pub demand: f64,
    pub competition: f64,
    pub trend: f64,
    pub scalability_index: f64,
    pub ai_disruption_risk: f64,
    pub gig_titles: Vec<String>,
    pub gig_description: String,
    pub keywords: Vec<String>,
    pub faqs: Vec<FaqRecord>,
    pub battle_plan: String,
    pub competitor_weakness: String,
    pub competition_note: String,
    pub target_audience: String,
    pub strategic_forecast: String,
    pub marketing_channels: Vec<String>,
    pub pain_points: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FaqRecord {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("API request failed: {0}")]
    ApiError(String),
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Timeout")]
    Timeout,
    #[error("Scan returned no niches")]
    EmptyBatch,
}
