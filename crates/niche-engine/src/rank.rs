use tracing::debug;

use crate::types::{FilterState, Niche, ScoreBreakdown, ScoredNiche, ScoringWeights};

/// Trend is a small signed float; it is rescaled by this factor before
/// weighting so its magnitude is comparable to the 1-10 rating factors.
pub const TREND_SCALE: f64 = 10.0;

/// Degenerate-range fallback: when every survivor has the same raw score,
/// min-max normalization is undefined and everyone gets the midpoint.
const FLAT_SCORE: i64 = 50;

/// Filters, scores, and ranks a normalized batch. Pure function of its
/// inputs; scores are batch-relative and not comparable across calls.
pub fn rank(
    candidates: &[Niche],
    filters: &FilterState,
    weights: &ScoringWeights,
) -> Vec<ScoredNiche> {
    let filtered: Vec<&Niche> = candidates.iter().filter(|n| filters.matches(n)).collect();
    if filtered.is_empty() {
        debug!(candidates = candidates.len(), "no candidates survived filtering");
        return Vec::new();
    }

    // Price scoring is relative to the current filtered batch. Floor of 1
    // keeps the division defined when every price is zero.
    let max_price = filtered
        .iter()
        .map(|n| n.average_price)
        .fold(1.0_f64, f64::max);

    let mut scored: Vec<(f64, ScoredNiche)> = filtered
        .into_iter()
        .map(|niche| {
            let (raw, breakdown) = raw_score(niche, weights, max_price);
            (
                raw,
                ScoredNiche {
                    niche: niche.clone(),
                    score: 0,
                    breakdown,
                },
            )
        })
        .collect();

    let min_raw = scored.iter().map(|(raw, _)| *raw).fold(f64::INFINITY, f64::min);
    let max_raw = scored.iter().map(|(raw, _)| *raw).fold(f64::NEG_INFINITY, f64::max);

    for (raw, entry) in &mut scored {
        entry.score = if max_raw > min_raw {
            (((*raw - min_raw) / (max_raw - min_raw)) * 100.0).round() as i64
        } else {
            FLAT_SCORE
        };
    }

    // Stable sort: equal scores keep filter order.
    let mut ranked: Vec<ScoredNiche> = scored.into_iter().map(|(_, entry)| entry).collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));

    debug!(
        candidates = candidates.len(),
        ranked = ranked.len(),
        "batch ranked"
    );
    ranked
}

fn raw_score(niche: &Niche, weights: &ScoringWeights, max_price: f64) -> (f64, ScoreBreakdown) {
    let demand_score = niche.demand as f64 * f64::from(weights.demand);
    let competition_score = niche.competition as f64 * f64::from(weights.competition);
    let price_score =
        niche.average_price / max_price * 10.0 * f64::from(weights.average_price);
    let trend_score = niche.trend * TREND_SCALE * f64::from(weights.trend);
    let scalability_score = niche.scalability_index as f64 * f64::from(weights.scalability);

    let raw = demand_score + competition_score + price_score + trend_score + scalability_score;

    let breakdown = ScoreBreakdown {
        demand: demand_score.max(0.0),
        // Magnitude of influence: a saturated market still shows a large
        // competition bar even though its contribution is negative.
        competition: competition_score.abs().max(0.0),
        price: price_score.max(0.0),
        trend: trend_score.max(0.0),
        scalability: scalability_score.max(0.0),
    };

    (raw, breakdown)
}
