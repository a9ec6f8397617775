pub mod normalize;
pub mod presets;
pub mod rank;
pub mod types;

pub use normalize::normalize;
pub use presets::{
    Bound, BoundUpdate, Factor, FilterField, FilterPreset, FilterSelector, Goal, WeightSelector,
};
pub use rank::{rank, TREND_SCALE};
pub use types::*;
