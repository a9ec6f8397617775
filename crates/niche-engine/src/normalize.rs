use serde_json::Value;

use crate::types::{Faq, Niche};

pub const DEFAULT_RATING: i64 = 5;
pub const DEFAULT_PRICE: f64 = 50.0;
pub const DEFAULT_TREND: f64 = 0.5;

pub const MAX_GIG_TITLES: usize = 3;
pub const MAX_KEYWORDS: usize = 5;
pub const MAX_FAQS: usize = 3;
pub const MAX_MARKETING_CHANNELS: usize = 3;
pub const MAX_PAIN_POINTS: usize = 3;

/// Coerces an arbitrary JSON value into a valid `Niche`. The generator is
/// untrusted, so every field falls back to a deterministic default instead
/// of erroring. Total over any input, including non-objects.
pub fn normalize(raw: &Value) -> Niche {
    let name = non_empty_string(raw, "niche")
        .unwrap_or_else(|| "Untitled Niche".to_string());
    let description = non_empty_string(raw, "description")
        .unwrap_or_else(|| "No description provided.".to_string());

    let gig_titles = string_list(raw, "gigTitles", MAX_GIG_TITLES)
        .unwrap_or_else(|| vec![format!("Expert {} Services", name)]);
    let keywords = string_list(raw, "keywords", MAX_KEYWORDS)
        .unwrap_or_else(|| name.to_lowercase().split_whitespace().map(String::from).collect());
    let faqs = faq_list(raw, MAX_FAQS).unwrap_or_else(|| {
        vec![Faq {
            question: "Requirement?".to_string(),
            answer: "Project brief.".to_string(),
        }]
    });
    let marketing_channels = string_list(raw, "marketingChannels", MAX_MARKETING_CHANNELS)
        .unwrap_or_else(|| {
            vec!["LinkedIn".to_string(), "Twitter".to_string(), "Cold Outreach".to_string()]
        });
    let pain_points = string_list(raw, "painPoints", MAX_PAIN_POINTS).unwrap_or_else(|| {
        vec![
            "High cost of alternatives".to_string(),
            "Slow delivery".to_string(),
            "Lack of niche expertise".to_string(),
        ]
    });

    let gig_description =
        non_empty_string(raw, "gigDescription").unwrap_or_else(|| description.clone());

    Niche {
        average_price: price(raw),
        demand: rating(raw, "demand"),
        competition: rating(raw, "competition"),
        trend: trend(raw),
        scalability_index: rating(raw, "scalabilityIndex"),
        ai_disruption_risk: rating(raw, "aiDisruptionRisk"),
        gig_titles,
        gig_description,
        keywords,
        faqs,
        battle_plan: non_empty_string(raw, "battlePlan")
            .unwrap_or_else(|| "Leverage first-mover advantage.".to_string()),
        competitor_weakness: non_empty_string(raw, "competitorWeakness")
            .unwrap_or_else(|| "Generic or non-specialized providers.".to_string()),
        competition_note: non_empty_string(raw, "competitionNote")
            .unwrap_or_else(|| "Low-quality generic listings.".to_string()),
        target_audience: non_empty_string(raw, "targetAudience")
            .unwrap_or_else(|| "Tech-savvy entrepreneurs.".to_string()),
        strategic_forecast: non_empty_string(raw, "strategicForecast")
            .unwrap_or_else(|| "Demand expected to hold through the next cycle.".to_string()),
        marketing_channels,
        pain_points,
        niche: name,
        description,
    }
}

fn numeric(raw: &Value, key: &str) -> Option<f64> {
    raw.get(key).and_then(Value::as_f64).filter(|v| v.is_finite())
}

/// Round to nearest integer, clamp to the 1-10 rating scale.
fn rating(raw: &Value, key: &str) -> i64 {
    match numeric(raw, key) {
        Some(v) => (v.round() as i64).clamp(1, 10),
        None => DEFAULT_RATING,
    }
}

fn price(raw: &Value) -> f64 {
    match numeric(raw, "averagePrice") {
        Some(v) if v >= 0.0 => v,
        _ => DEFAULT_PRICE,
    }
}

fn trend(raw: &Value) -> f64 {
    numeric(raw, "trend").unwrap_or(DEFAULT_TREND)
}

fn non_empty_string(raw: &Value, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn string_list(raw: &Value, key: &str, cap: usize) -> Option<Vec<String>> {
    let items: Vec<String> = raw
        .get(key)?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .take(cap)
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn faq_list(raw: &Value, cap: usize) -> Option<Vec<Faq>> {
    let items: Vec<Faq> = raw
        .get("faqs")?
        .as_array()?
        .iter()
        .filter_map(|item| {
            let question = item.get("question")?.as_str()?.trim();
            let answer = item.get("answer")?.as_str()?.trim();
            if question.is_empty() || answer.is_empty() {
                return None;
            }
            Some(Faq {
                question: question.to_string(),
                answer: answer.to_string(),
            })
        })
        .take(cap)
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}
