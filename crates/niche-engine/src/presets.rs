use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{FilterState, Range, ScoringWeights};

pub const WEIGHT_MIN: i32 = -10;
pub const WEIGHT_MAX: i32 = 10;

/// Strategic goal behind a weight vector. `Custom` is the sentinel state
/// entered as soon as any individual weight is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Goal {
    Balanced,
    QuickStart,
    HighTicket,
    TrendHunter,
    AiHybrid,
    Custom,
}

impl Goal {
    /// The preset weight table. `Custom` has no table entry.
    pub fn weights(self) -> Option<ScoringWeights> {
        let w = match self {
            Goal::Balanced => ScoringWeights::default(),
            Goal::QuickStart => ScoringWeights {
                demand: 8,
                competition: -10,
                average_price: 3,
                trend: 5,
                scalability: 5,
            },
            Goal::HighTicket => ScoringWeights {
                demand: 4,
                competition: -4,
                average_price: 10,
                trend: 3,
                scalability: 8,
            },
            Goal::TrendHunter => ScoringWeights {
                demand: 3,
                competition: -3,
                average_price: 4,
                trend: 10,
                scalability: 6,
            },
            Goal::AiHybrid => ScoringWeights {
                demand: 6,
                competition: -4,
                average_price: 5,
                trend: 7,
                scalability: 10,
            },
            Goal::Custom => return None,
        };
        Some(w)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Factor {
    Demand,
    Competition,
    AveragePrice,
    Trend,
    Scalability,
}

/// Tracks the active goal and weight vector. Selecting a preset overwrites
/// the weights wholesale; editing one weight transitions to `Custom` without
/// touching the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightSelector {
    goal: Goal,
    weights: ScoringWeights,
}

impl Default for WeightSelector {
    fn default() -> Self {
        Self {
            goal: Goal::Balanced,
            weights: ScoringWeights::default(),
        }
    }
}

impl WeightSelector {
    /// Restores a previously persisted selection.
    pub fn restore(goal: Goal, weights: ScoringWeights) -> Self {
        Self { goal, weights }
    }

    pub fn goal(&self) -> Goal {
        self.goal
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    pub fn select(&mut self, goal: Goal) {
        if let Some(weights) = goal.weights() {
            self.weights = weights;
        }
        self.goal = goal;
        debug!(?goal, "goal selected");
    }

    pub fn set(&mut self, factor: Factor, value: i32) {
        let value = value.clamp(WEIGHT_MIN, WEIGHT_MAX);
        match factor {
            Factor::Demand => self.weights.demand = value,
            Factor::Competition => self.weights.competition = value,
            Factor::AveragePrice => self.weights.average_price = value,
            Factor::Trend => self.weights.trend = value,
            Factor::Scalability => self.weights.scalability = value,
        }
        self.goal = Goal::Custom;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterPreset {
    All,
    HighGrowth,
    LowEntry,
    Premium,
    Custom,
}

impl FilterPreset {
    pub fn state(self) -> Option<FilterState> {
        let state = match self {
            FilterPreset::All => FilterState::unrestricted(),
            FilterPreset::HighGrowth => FilterState {
                price: Range::new(0.0, 2000.0),
                demand: Range::new(6.0, 10.0),
                competition: Range::new(1.0, 6.0),
            },
            FilterPreset::LowEntry => FilterState {
                price: Range::new(0.0, 2000.0),
                demand: Range::new(1.0, 10.0),
                competition: Range::new(1.0, 4.0),
            },
            FilterPreset::Premium => FilterState {
                price: Range::new(150.0, 2000.0),
                demand: Range::new(1.0, 10.0),
                competition: Range::new(1.0, 10.0),
            },
            FilterPreset::Custom => return None,
        };
        Some(state)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Price,
    Demand,
    Competition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Min,
    Max,
}

/// Outcome of a bound edit. `Locked` means the requested value would have
/// inverted the range and was clamped to the opposite bound instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundUpdate {
    Applied,
    Locked,
}

/// Tracks the active filter preset and ranges, enforcing min <= max on
/// every edit so the ranking engine never sees an inverted range.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSelector {
    preset: FilterPreset,
    filters: FilterState,
}

impl Default for FilterSelector {
    fn default() -> Self {
        Self {
            preset: FilterPreset::All,
            filters: FilterState::unrestricted(),
        }
    }
}

impl FilterSelector {
    pub fn preset(&self) -> FilterPreset {
        self.preset
    }

    pub fn filters(&self) -> FilterState {
        self.filters
    }

    pub fn select(&mut self, preset: FilterPreset) {
        if let Some(state) = preset.state() {
            self.filters = state;
        }
        self.preset = preset;
        debug!(?preset, "filter preset selected");
    }

    pub fn set_bound(&mut self, field: FilterField, bound: Bound, value: f64) -> BoundUpdate {
        self.preset = FilterPreset::Custom;
        let range = match field {
            FilterField::Price => &mut self.filters.price,
            FilterField::Demand => &mut self.filters.demand,
            FilterField::Competition => &mut self.filters.competition,
        };

        let update = match bound {
            Bound::Min if value > range.max => {
                range.min = range.max;
                BoundUpdate::Locked
            }
            Bound::Min => {
                range.min = value;
                BoundUpdate::Applied
            }
            Bound::Max if value < range.min => {
                range.max = range.min;
                BoundUpdate::Locked
            }
            Bound::Max => {
                range.max = value;
                BoundUpdate::Applied
            }
        };
        if update == BoundUpdate::Locked {
            debug!(?field, ?bound, value, "boundary lock");
        }
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selection_is_balanced() {
        let selector = WeightSelector::default();
        assert_eq!(selector.goal(), Goal::Balanced);
        assert_eq!(selector.weights(), Goal::Balanced.weights().unwrap());
    }

    #[test]
    fn preset_select_overwrites_wholesale() {
        let mut selector = WeightSelector::default();
        selector.select(Goal::QuickStart);
        assert_eq!(selector.goal(), Goal::QuickStart);
        assert_eq!(selector.weights().competition, -10);
        selector.select(Goal::TrendHunter);
        assert_eq!(selector.weights().trend, 10);
    }

    #[test]
    fn single_edit_transitions_to_custom() {
        let mut selector = WeightSelector::default();
        let before = selector.weights();
        selector.set(Factor::Trend, 9);
        assert_eq!(selector.goal(), Goal::Custom);
        assert_eq!(selector.weights().trend, 9);
        // Other weights untouched.
        assert_eq!(selector.weights().demand, before.demand);
        assert_eq!(selector.weights().competition, before.competition);
    }

    #[test]
    fn weight_edits_clamp_to_nominal_range() {
        let mut selector = WeightSelector::default();
        selector.set(Factor::Demand, 99);
        assert_eq!(selector.weights().demand, WEIGHT_MAX);
        selector.set(Factor::Competition, -99);
        assert_eq!(selector.weights().competition, WEIGHT_MIN);
    }

    #[test]
    fn selecting_custom_keeps_current_weights() {
        let mut selector = WeightSelector::default();
        selector.set(Factor::Demand, 2);
        let weights = selector.weights();
        selector.select(Goal::Custom);
        assert_eq!(selector.weights(), weights);
    }

    #[test]
    fn filter_preset_tables() {
        let high_growth = FilterPreset::HighGrowth.state().unwrap();
        assert_eq!(high_growth.demand.min, 6.0);
        assert_eq!(high_growth.competition.max, 6.0);
        let premium = FilterPreset::Premium.state().unwrap();
        assert_eq!(premium.price.min, 150.0);
        assert!(FilterPreset::Custom.state().is_none());
    }

    #[test]
    fn bound_edit_transitions_to_custom() {
        let mut selector = FilterSelector::default();
        let update = selector.set_bound(FilterField::Price, Bound::Min, 100.0);
        assert_eq!(update, BoundUpdate::Applied);
        assert_eq!(selector.preset(), FilterPreset::Custom);
        assert_eq!(selector.filters().price.min, 100.0);
    }

    #[test]
    fn min_above_max_locks_to_max() {
        let mut selector = FilterSelector::default();
        selector.set_bound(FilterField::Demand, Bound::Max, 6.0);
        let update = selector.set_bound(FilterField::Demand, Bound::Min, 8.0);
        assert_eq!(update, BoundUpdate::Locked);
        let range = selector.filters().demand;
        assert_eq!(range.min, range.max);
        assert_eq!(range.min, 6.0);
    }

    #[test]
    fn max_below_min_locks_to_min() {
        let mut selector = FilterSelector::default();
        selector.set_bound(FilterField::Competition, Bound::Min, 4.0);
        let update = selector.set_bound(FilterField::Competition, Bound::Max, 2.0);
        assert_eq!(update, BoundUpdate::Locked);
        let range = selector.filters().competition;
        assert_eq!(range.max, 4.0);
        assert!(range.min <= range.max);
    }

    #[test]
    fn ranges_never_invert() {
        let mut selector = FilterSelector::default();
        let edits = [
            (FilterField::Price, Bound::Min, 1800.0),
            (FilterField::Price, Bound::Max, 100.0),
            (FilterField::Demand, Bound::Min, 12.0),
            (FilterField::Demand, Bound::Max, -1.0),
            (FilterField::Competition, Bound::Max, 0.0),
        ];
        for (field, bound, value) in edits {
            selector.set_bound(field, bound, value);
            let f = selector.filters();
            for range in [f.price, f.demand, f.competition] {
                assert!(range.min <= range.max);
            }
        }
    }
}
