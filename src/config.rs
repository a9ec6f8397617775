use niche_engine::{FilterPreset, Goal};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub llm: LlmConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub weights: WeightsConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_niche_count")]
    pub niche_count: usize,
    #[serde(default)]
    pub focus: Option<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            niche_count: default_niche_count(),
            focus: None,
        }
    }
}

/// Optional startup overrides. `goal` replaces whatever the weight store
/// restored; individual factor overrides apply after it and move the
/// selection to custom, exactly like a manual slider edit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeightsConfig {
    #[serde(default)]
    pub goal: Option<Goal>,
    #[serde(default)]
    pub demand: Option<i32>,
    #[serde(default)]
    pub competition: Option<i32>,
    #[serde(default)]
    pub average_price: Option<i32>,
    #[serde(default)]
    pub trend: Option<i32>,
    #[serde(default)]
    pub scalability: Option<i32>,
}

/// Optional startup filter overrides, applied through the same clamping
/// boundary as interactive edits.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FiltersConfig {
    #[serde(default)]
    pub preset: Option<FilterPreset>,
    #[serde(default)]
    pub price_min: Option<f64>,
    #[serde(default)]
    pub price_max: Option<f64>,
    #[serde(default)]
    pub demand_min: Option<f64>,
    #[serde(default)]
    pub demand_max: Option<f64>,
    #[serde(default)]
    pub competition_min: Option<f64>,
    #[serde(default)]
    pub competition_max: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_niche_count() -> usize {
    8
}

fn default_output_dir() -> String {
    "out".into()
}

impl AppConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
