use std::fs::{create_dir_all, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use niche_engine::{Goal, ScoringWeights, WeightSelector};
use serde::{Deserialize, Serialize};

/// Bump when the stored shape changes; mismatched files fall back to the
/// default preset instead of being migrated.
pub const WEIGHTS_VERSION: &str = "niche-scout-weights-v1";

#[derive(Debug, Serialize, Deserialize)]
struct StoredWeights {
    version: String,
    goal: Goal,
    weights: ScoringWeights,
}

/// Persists the active goal and weight vector across runs. Absence or
/// corruption of the file silently yields the balanced default.
pub struct WeightStore {
    path: PathBuf,
}

impl WeightStore {
    pub fn open(dir: &Path) -> anyhow::Result<Self> {
        create_dir_all(dir)?;
        Ok(Self {
            path: dir.join("weights.json"),
        })
    }

    pub fn load(&self) -> WeightSelector {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return WeightSelector::default(),
        };
        match serde_json::from_str::<StoredWeights>(&raw) {
            Ok(stored) if stored.version == WEIGHTS_VERSION => {
                WeightSelector::restore(stored.goal, stored.weights)
            }
            _ => WeightSelector::default(),
        }
    }

    pub fn save(&self, selector: &WeightSelector) -> anyhow::Result<()> {
        let stored = StoredWeights {
            version: WEIGHTS_VERSION.to_string(),
            goal: selector.goal(),
            weights: selector.weights(),
        };
        let data = serde_json::to_string_pretty(&stored)?;
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&self.path)?;
        file.write_all(data.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use niche_engine::Factor;
    use uuid::Uuid;

    fn temp_store() -> (PathBuf, WeightStore) {
        let dir = std::env::temp_dir().join(format!("niche-scout-test-{}", Uuid::new_v4()));
        let store = WeightStore::open(&dir).unwrap();
        (dir, store)
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let (dir, store) = temp_store();
        let selector = store.load();
        assert_eq!(selector.goal(), Goal::Balanced);
        assert_eq!(selector.weights(), ScoringWeights::default());
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn corrupt_file_falls_back_to_default() {
        let (dir, store) = temp_store();
        std::fs::write(dir.join("weights.json"), "{not json").unwrap();
        assert_eq!(store.load().goal(), Goal::Balanced);
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn version_mismatch_falls_back_to_default() {
        let (dir, store) = temp_store();
        std::fs::write(
            dir.join("weights.json"),
            r#"{"version":"niche-scout-weights-v0","goal":"high-ticket","weights":{"demand":1,"competition":-1,"averagePrice":1,"trend":1,"scalability":1}}"#,
        )
        .unwrap();
        assert_eq!(store.load().goal(), Goal::Balanced);
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn round_trip_preserves_custom_weights() {
        let (dir, store) = temp_store();
        let mut selector = WeightSelector::default();
        selector.set(Factor::Trend, 9);
        store.save(&selector).unwrap();

        let restored = store.load();
        assert_eq!(restored.goal(), Goal::Custom);
        assert_eq!(restored.weights().trend, 9);
        assert_eq!(restored.weights().demand, selector.weights().demand);
        std::fs::remove_dir_all(dir).ok();
    }
}
