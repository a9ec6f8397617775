use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use niche_engine::ScoredNiche;

/// Flattening delimiters are part of the export contract: titles, channels,
/// and pain points join with `" | "`, keywords with `", "`, FAQs with `" || "`.
pub const LIST_DELIM: &str = " | ";
pub const KEYWORD_DELIM: &str = ", ";
pub const FAQ_DELIM: &str = " || ";

const CSV_COLUMNS: &[&str] = &[
    "niche",
    "score",
    "averagePrice",
    "demand",
    "competition",
    "trend",
    "scalabilityIndex",
    "targetAudience",
    "battlePlan",
    "gigTitles",
    "keywords",
    "faqs",
    "marketingChannels",
    "painPoints",
];

#[derive(Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    Written(PathBuf),
    NothingToExport,
}

pub fn export_csv(data: &[ScoredNiche], dir: &Path) -> Result<ExportOutcome> {
    if data.is_empty() {
        return Ok(ExportOutcome::NothingToExport);
    }
    let path = dir.join("niches.csv");
    fs::create_dir_all(dir)?;
    fs::write(&path, csv_string(data))?;
    Ok(ExportOutcome::Written(path))
}

pub fn export_json(data: &[ScoredNiche], dir: &Path) -> Result<ExportOutcome> {
    if data.is_empty() {
        return Ok(ExportOutcome::NothingToExport);
    }
    let path = dir.join("niches.json");
    fs::create_dir_all(dir)?;
    fs::write(&path, serde_json::to_string_pretty(data)?)?;
    Ok(ExportOutcome::Written(path))
}

/// Writes the per-niche markdown dossier, named after the slugified niche.
pub fn export_blueprint(scored: &ScoredNiche, dir: &Path) -> Result<ExportOutcome> {
    let path = dir.join(format!("{}_blueprint.md", slug(&scored.niche.niche)));
    fs::create_dir_all(dir)?;
    fs::write(&path, blueprint_markdown(scored))?;
    Ok(ExportOutcome::Written(path))
}

pub fn csv_string(data: &[ScoredNiche]) -> String {
    let mut out = String::new();
    out.push_str(&CSV_COLUMNS.join(","));
    out.push('\n');
    for scored in data {
        let n = &scored.niche;
        let faqs: Vec<String> = n
            .faqs
            .iter()
            .map(|f| format!("{}: {}", f.question, f.answer))
            .collect();
        let cells = [
            n.niche.clone(),
            scored.score.to_string(),
            n.average_price.to_string(),
            n.demand.to_string(),
            n.competition.to_string(),
            n.trend.to_string(),
            n.scalability_index.to_string(),
            n.target_audience.clone(),
            n.battle_plan.clone(),
            n.gig_titles.join(LIST_DELIM),
            n.keywords.join(KEYWORD_DELIM),
            faqs.join(FAQ_DELIM),
            n.marketing_channels.join(LIST_DELIM),
            n.pain_points.join(LIST_DELIM),
        ];
        let row: Vec<String> = cells.iter().map(|c| csv_escape(c)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

pub fn blueprint_markdown(scored: &ScoredNiche) -> String {
    let n = &scored.niche;
    let titles: Vec<String> = n.gig_titles.iter().map(|t| format!("- {}", t)).collect();
    let faqs: Vec<String> = n
        .faqs
        .iter()
        .map(|f| format!("### Q: {}\n**A:** {}", f.question, f.answer))
        .collect();

    format!(
        r#"# Execution Blueprint: {name}

## 1. Market Opportunity
- **Score:** {score}/100
- **Dynamics:** Demand ({demand}/10) | Competition ({competition}/10) | Trend ({trend:.2})
- **Scalability Index:** {scalability}/10
- **Target Audience:** {audience}
- **Value Proposition:** {description}

## 2. Competitive Battle Plan
- **Competitor Weakness:** {weakness}
- **Tactical Plan:** {plan}
- **Forecast:** {forecast}

## 3. Pricing
- **Entry Price:** ${price}
- Basic: ${basic}
- Standard: ${standard}
- Premium: ${premium}

## 4. Gig Assets
{titles}

Keywords: {keywords}

## 5. FAQs
{faqs}
"#,
        name = n.niche,
        score = scored.score,
        demand = n.demand,
        competition = n.competition,
        trend = n.trend,
        scalability = n.scalability_index,
        audience = n.target_audience,
        description = n.description,
        weakness = n.competitor_weakness,
        plan = n.battle_plan,
        forecast = n.strategic_forecast,
        price = n.average_price,
        basic = (n.average_price * 0.5).round() as i64,
        standard = n.average_price.round() as i64,
        premium = (n.average_price * 1.8).round() as i64,
        titles = titles.join("\n"),
        keywords = n.keywords.join(KEYWORD_DELIM),
        faqs = faqs.join("\n\n"),
    )
}

fn csv_escape(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

fn slug(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use niche_engine::{normalize, rank, FilterState, ScoringWeights};
    use serde_json::json;

    fn sample() -> Vec<ScoredNiche> {
        let raw = vec![
            json!({
                "niche": "AI Résumé, \"Pro\"",
                "description": "Resume rewrites",
                "averagePrice": 120,
                "demand": 8,
                "competition": 3,
                "trend": 0.6,
                "gigTitles": ["Title One", "Title Two"],
                "keywords": ["resume", "career"],
                "faqs": [
                    {"question": "Turnaround?", "answer": "48 hours."},
                    {"question": "Revisions?", "answer": "Two included."}
                ],
                "marketingChannels": ["LinkedIn", "Reddit"],
                "painPoints": ["ATS rejection", "Generic templates"]
            }),
            json!({"niche": "Notion Setup", "averagePrice": 60, "demand": 6, "competition": 5}),
        ];
        let batch: Vec<_> = raw.iter().map(normalize).collect();
        rank(&batch, &FilterState::unrestricted(), &ScoringWeights::default())
    }

    #[test]
    fn csv_has_header_and_one_row_per_niche() {
        let csv = csv_string(&sample());
        let lines: Vec<&str> = csv.trim_end().lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("niche,score,averagePrice"));
    }

    #[test]
    fn csv_flattens_with_contract_delimiters() {
        let csv = csv_string(&sample());
        assert!(csv.contains("Title One | Title Two"));
        assert!(csv.contains("resume, career"));
        assert!(csv.contains("Turnaround?: 48 hours. || Revisions?: Two included."));
        assert!(csv.contains("ATS rejection | Generic templates"));
    }

    #[test]
    fn csv_quotes_and_doubles_embedded_quotes() {
        let csv = csv_string(&sample());
        assert!(csv.contains(r#""AI Résumé, ""Pro""""#));
    }

    #[test]
    fn empty_data_is_nothing_to_export() {
        let dir = std::env::temp_dir().join("niche-scout-export-empty");
        assert_eq!(export_csv(&[], &dir).unwrap(), ExportOutcome::NothingToExport);
        assert_eq!(export_json(&[], &dir).unwrap(), ExportOutcome::NothingToExport);
    }

    #[test]
    fn blueprint_contains_pricing_tiers() {
        let data = sample();
        let top = data.first().unwrap();
        let md = blueprint_markdown(top);
        assert!(md.contains(&format!("# Execution Blueprint: {}", top.niche.niche)));
        let price = top.niche.average_price;
        assert!(md.contains(&format!("- Basic: ${}", (price * 0.5).round() as i64)));
        assert!(md.contains(&format!("- Premium: ${}", (price * 1.8).round() as i64)));
    }

    #[test]
    fn blueprint_file_name_is_slugified() {
        assert_eq!(slug("AI Video Editing"), "ai_video_editing");
    }
}
