use std::path::PathBuf;

use anyhow::{bail, Result};
use llm_client::{LlmClient, ScanError, ScanRequest};
use niche_engine::{
    normalize, rank, Bound, BoundUpdate, Factor, FilterField, FilterPreset, FilterSelector,
    Goal, Niche, ScoredNiche, WeightSelector,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::export::{self, ExportOutcome};
use crate::journal::{ScanEvent, ScanJournal};
use crate::store::WeightStore;

/// Holds the committed (batch, filters, weights) tuple and its ranked view.
/// Every commit bumps the generation; the ranked list is recomputed lazily
/// and only when the generation moved, so the published view always
/// reflects the latest committed inputs and never a stale computation.
#[derive(Default)]
pub struct Session {
    batch: Vec<Niche>,
    weights: WeightSelector,
    filters: FilterSelector,
    ranked: Vec<ScoredNiche>,
    generation: u64,
    computed_generation: u64,
}

impl Session {
    pub fn restore(weights: WeightSelector) -> Self {
        Self {
            weights,
            ..Self::default()
        }
    }

    pub fn weights(&self) -> &WeightSelector {
        &self.weights
    }

    pub fn commit_batch(&mut self, batch: Vec<Niche>) {
        self.batch = batch;
        self.generation += 1;
    }

    pub fn select_goal(&mut self, goal: Goal) {
        self.weights.select(goal);
        self.generation += 1;
    }

    pub fn set_weight(&mut self, factor: Factor, value: i32) {
        self.weights.set(factor, value);
        self.generation += 1;
    }

    pub fn select_filter_preset(&mut self, preset: FilterPreset) {
        self.filters.select(preset);
        self.generation += 1;
    }

    pub fn set_filter_bound(&mut self, field: FilterField, bound: Bound, value: f64) -> BoundUpdate {
        let update = self.filters.set_bound(field, bound, value);
        self.generation += 1;
        update
    }

    /// The ranked view of the current inputs, recomputing only if a commit
    /// happened since the last call.
    pub fn ranked(&mut self) -> &[ScoredNiche] {
        if self.computed_generation != self.generation {
            self.ranked = rank(&self.batch, &self.filters.filters(), &self.weights.weights());
            self.computed_generation = self.generation;
        }
        &self.ranked
    }
}

pub struct App {
    config: AppConfig,
    client: LlmClient,
    session: Session,
    store: WeightStore,
    journal: ScanJournal,
    output_dir: PathBuf,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        if !config.llm.provider.eq_ignore_ascii_case("anthropic") {
            bail!(
                "Configured provider '{}' but this scanner currently supports Anthropic only",
                config.llm.provider
            );
        }
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| anyhow::anyhow!("ANTHROPIC_API_KEY must be set"))?;
        let client = LlmClient::new(
            api_key,
            config.llm.model.clone(),
            config.llm.timeout_ms,
            config.llm.max_retries,
        );

        let output_dir = PathBuf::from(&config.output.dir);
        let store = WeightStore::open(&output_dir)?;
        let session = Session::restore(store.load());
        info!(goal = ?session.weights().goal(), "weights restored");

        let mut journal = ScanJournal::open(output_dir.clone())?;
        journal.write_event(ScanEvent::AppStart {
            model: config.llm.model.clone(),
            niche_count: config.scan.niche_count,
            goal: session.weights().goal(),
        });
        info!("Journal path: {}", journal.dir().display());

        Ok(Self {
            config,
            client,
            session,
            store,
            journal,
            output_dir,
        })
    }

    fn scan_error_code(err: &ScanError) -> &'static str {
        match err {
            ScanError::Timeout => "SCAN_TIMEOUT",
            ScanError::HttpStatus { .. } => "SCAN_HTTP_ERROR",
            ScanError::ApiError(_) => "SCAN_API_ERROR",
            ScanError::JsonError(_) => "SCAN_JSON_ERROR",
            ScanError::EmptyBatch => "SCAN_EMPTY_BATCH",
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        self.apply_config_overrides()?;
        self.run_scan().await?;
        self.export_ranked()?;
        Ok(())
    }

    /// Startup overrides flow through the same operations an interactive
    /// caller would use, so they persist and clamp identically.
    fn apply_config_overrides(&mut self) -> Result<()> {
        if let Some(goal) = self.config.weights.goal {
            self.session.select_goal(goal);
            self.store.save(self.session.weights())?;
            info!(?goal, "goal override applied from config");
        }
        let factor_overrides = [
            (Factor::Demand, self.config.weights.demand),
            (Factor::Competition, self.config.weights.competition),
            (Factor::AveragePrice, self.config.weights.average_price),
            (Factor::Trend, self.config.weights.trend),
            (Factor::Scalability, self.config.weights.scalability),
        ];
        for (factor, value) in factor_overrides {
            if let Some(value) = value {
                self.adjust_weight(factor, value)?;
            }
        }

        if let Some(preset) = self.config.filters.preset {
            self.session.select_filter_preset(preset);
        }
        let bound_overrides = [
            (FilterField::Price, Bound::Min, self.config.filters.price_min),
            (FilterField::Price, Bound::Max, self.config.filters.price_max),
            (FilterField::Demand, Bound::Min, self.config.filters.demand_min),
            (FilterField::Demand, Bound::Max, self.config.filters.demand_max),
            (
                FilterField::Competition,
                Bound::Min,
                self.config.filters.competition_min,
            ),
            (
                FilterField::Competition,
                Bound::Max,
                self.config.filters.competition_max,
            ),
        ];
        for (field, bound, value) in bound_overrides {
            if let Some(value) = value {
                if self.adjust_filter_bound(field, bound, value) == BoundUpdate::Locked {
                    warn!(?field, ?bound, value, "filter override clamped (boundary lock)");
                }
            }
        }
        Ok(())
    }

    /// One scan cycle: fetch a raw batch, normalize, commit. On failure the
    /// previous batch and ranked list stay untouched.
    async fn run_scan(&mut self) -> Result<()> {
        let request = ScanRequest {
            request_id: Uuid::new_v4(),
            niche_count: self.config.scan.niche_count,
            focus: self.config.scan.focus.clone(),
            as_of_ts_ms: chrono::Utc::now().timestamp_millis(),
        };
        self.journal.write_event(ScanEvent::ScanStart {
            request_id: request.request_id,
            niche_count: request.niche_count,
            focus: request.focus.clone(),
        });

        match self.client.scan(request).await {
            Ok(raw_batch) => {
                let batch: Vec<Niche> = raw_batch.iter().map(normalize).collect();
                info!("Scan returned {} niches", batch.len());
                self.journal.write_event(ScanEvent::ScanOk {
                    niches: batch.len(),
                });
                self.session.commit_batch(batch);

                let ranked = self.session.ranked();
                let event = ScanEvent::RankComputed {
                    ranked: ranked.len(),
                    top: ranked.first().map(|n| n.niche.niche.clone()),
                };
                self.journal.write_event(event);
                Ok(())
            }
            Err(e) => {
                let code = Self::scan_error_code(&e);
                warn!("Scan failed: {}", e);
                self.journal.write_event(ScanEvent::ScanError {
                    code,
                    error: e.to_string(),
                });
                bail!("scan failed ({}): {}", code, e)
            }
        }
    }

    fn export_ranked(&mut self) -> Result<()> {
        let ranked = self.session.ranked().to_vec();
        if ranked.is_empty() {
            info!("No niches match the current filters; nothing to export");
            return Ok(());
        }

        for outcome in [
            export::export_csv(&ranked, &self.output_dir)?,
            export::export_json(&ranked, &self.output_dir)?,
        ] {
            if let ExportOutcome::Written(path) = outcome {
                self.journal.write_event(ScanEvent::ExportWritten {
                    path: path.display().to_string(),
                });
                info!("Exported {}", path.display());
            }
        }

        // Dossier only for the top-ranked niche.
        if let Some(top) = ranked.first() {
            if let ExportOutcome::Written(path) = export::export_blueprint(top, &self.output_dir)? {
                self.journal.write_event(ScanEvent::ExportWritten {
                    path: path.display().to_string(),
                });
                info!("Exported {}", path.display());
            }
        }
        Ok(())
    }

    /// Persisting wrapper used by interactive callers: edits a weight,
    /// saves, and journals the custom transition.
    pub fn adjust_weight(&mut self, factor: Factor, value: i32) -> Result<()> {
        self.session.set_weight(factor, value);
        self.store.save(self.session.weights())?;
        Ok(())
    }

    /// Boundary-locked filter edits get a journal notice for the UI layer.
    pub fn adjust_filter_bound(
        &mut self,
        field: FilterField,
        bound: Bound,
        value: f64,
    ) -> BoundUpdate {
        let update = self.session.set_filter_bound(field, bound, value);
        if update == BoundUpdate::Locked {
            self.journal.write_event(ScanEvent::BoundaryLock {
                field: format!("{:?}", field),
                bound: format!("{:?}", bound),
                requested: value,
            });
        }
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn batch() -> Vec<Niche> {
        vec![
            normalize(&json!({"niche": "A", "averagePrice": 100, "demand": 8, "competition": 2, "trend": 0.5})),
            normalize(&json!({"niche": "B", "averagePrice": 100, "demand": 2, "competition": 8, "trend": -0.5})),
        ]
    }

    #[test]
    fn ranked_view_tracks_commits() {
        let mut session = Session::default();
        assert!(session.ranked().is_empty());

        session.commit_batch(batch());
        assert_eq!(session.ranked().len(), 2);
        assert_eq!(session.ranked()[0].niche.niche, "A");
    }

    #[test]
    fn recompute_skipped_when_inputs_unchanged() {
        let mut session = Session::default();
        session.commit_batch(batch());
        session.ranked();
        let generation = session.computed_generation;
        session.ranked();
        assert_eq!(session.computed_generation, generation);
    }

    #[test]
    fn weight_edit_triggers_recompute() {
        let mut session = Session::default();
        session.commit_batch(batch());
        let before = session.ranked().to_vec();

        // Flip the trend weight negative: B (falling trend) overtakes A.
        session.set_weight(Factor::Trend, -10);
        let after = session.ranked().to_vec();
        assert_ne!(before, after);
        assert_eq!(after[0].niche.niche, "B");
    }

    #[test]
    fn filter_edit_can_empty_the_view() {
        let mut session = Session::default();
        session.commit_batch(batch());
        assert_eq!(session.ranked().len(), 2);

        session.set_filter_bound(FilterField::Demand, Bound::Min, 9.0);
        assert!(session.ranked().is_empty());
    }

    #[test]
    fn filter_preset_applies_wholesale() {
        let mut session = Session::default();
        session.commit_batch(batch());
        session.select_filter_preset(FilterPreset::HighGrowth);
        // Only A (demand 8, competition 2) survives demand>=6, comp<=6.
        let ranked = session.ranked();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].niche.niche, "A");
    }
}
