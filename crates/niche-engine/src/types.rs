use serde::{Deserialize, Serialize};

/// One proposed service niche, fully normalized. Field names serialize in
/// camelCase to match the wire shape produced by the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Niche {
    pub niche: String,
    pub description: String,
    pub average_price: f64,
    pub demand: i64,
    pub competition: i64,
    pub trend: f64,
    pub scalability_index: i64,
    pub ai_disruption_risk: i64,
    pub gig_titles: Vec<String>,
    pub gig_description: String,
    pub keywords: Vec<String>,
    pub faqs: Vec<Faq>,
    pub battle_plan: String,
    pub competitor_weakness: String,
    pub competition_note: String,
    pub target_audience: String,
    pub strategic_forecast: String,
    pub marketing_channels: Vec<String>,
    pub pain_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

/// Per-factor magnitude of influence, for display. Competition carries the
/// absolute value of its (conventionally negative) contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub demand: f64,
    pub competition: f64,
    pub price: f64,
    pub trend: f64,
    pub scalability: f64,
}

/// A niche with its 0-100 batch-relative score. Built fresh on every
/// recomputation, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredNiche {
    #[serde(flatten)]
    pub niche: Niche,
    pub score: i64,
    pub breakdown: ScoreBreakdown,
}

/// Signed integer factor weights, nominal range [-10, 10].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringWeights {
    pub demand: i32,
    pub competition: i32,
    pub average_price: i32,
    pub trend: i32,
    pub scalability: i32,
}

impl Default for ScoringWeights {
    /// The balanced preset.
    fn default() -> Self {
        Self {
            demand: 5,
            competition: -5,
            average_price: 4,
            trend: 6,
            scalability: 7,
        }
    }
}

/// Inclusive numeric range. The selector layer guarantees min <= max.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub price: Range,
    pub demand: Range,
    pub competition: Range,
}

impl FilterState {
    /// The unrestricted filter set.
    pub fn unrestricted() -> Self {
        Self {
            price: Range::new(0.0, 2000.0),
            demand: Range::new(1.0, 10.0),
            competition: Range::new(1.0, 10.0),
        }
    }

    pub fn matches(&self, niche: &Niche) -> bool {
        self.price.contains(niche.average_price)
            && self.demand.contains(niche.demand as f64)
            && self.competition.contains(niche.competition as f64)
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::unrestricted()
    }
}
