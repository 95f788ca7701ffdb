use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::app::FrameClockConfig;
use crate::sim::{
    AnimationConfig, BodyConfig, GeometryError, PlatformDesc, PlatformError, PlatformRegistry,
    Rect, RectBounds, Simulation, SimulationSetup, SimulationSetupError, TuningStore,
    TuningValues, DEFAULT_COLOR_STEP_SECONDS, DEFAULT_STEP_FRACTION,
};

pub const CONFIG_ENV_VAR: &str = "HOP_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    pub tuning: TuningValues,
    pub tuning_step_fraction: f32,
    pub spawn: RectBounds,
    pub platforms: Vec<PlatformDesc>,
    pub animation: AnimationConfig,
    pub max_fall_speed: Option<f32>,
    pub color_step_seconds: f32,
    pub clock: FrameClockConfig,
    pub metrics_interval_ms: u64,
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tuning: TuningValues::default(),
            tuning_step_fraction: DEFAULT_STEP_FRACTION,
            spawn: RectBounds {
                min_x: 60.0,
                min_y: 100.0,
                max_x: 560.0,
                max_y: 600.0,
            },
            platforms: vec![PlatformDesc {
                min_x: -2000.0,
                min_y: -200.0,
                max_x: 50000.0,
                max_y: -100.0,
                color: Default::default(),
            }],
            animation: AnimationConfig::default(),
            max_fall_speed: None,
            color_step_seconds: DEFAULT_COLOR_STEP_SECONDS,
            clock: FrameClockConfig::default(),
            metrics_interval_ms: 1000,
            seed: 0,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {json_path}: {source}")]
    Parse {
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid spawn rectangle: {0}")]
    Spawn(#[source] GeometryError),
    #[error(transparent)]
    Platforms(#[from] PlatformError),
    #[error(transparent)]
    Setup(#[from] SimulationSetupError),
}

impl SimConfig {
    pub fn metrics_interval(&self) -> Duration {
        Duration::from_millis(self.metrics_interval_ms.max(1))
    }

    /// Validates geometry and animation settings and builds the simulation.
    /// All configuration mistakes surface here, before the first frame.
    pub fn build_simulation(&self) -> Result<Simulation, ConfigError> {
        let spawn = Rect::from_bounds(self.spawn).map_err(ConfigError::Spawn)?;
        let platforms = PlatformRegistry::from_descs(&self.platforms)?;
        let setup = SimulationSetup {
            platforms,
            spawn,
            body: BodyConfig {
                max_fall_speed: self.max_fall_speed,
            },
            animation: self.animation,
            tuning: TuningStore::new(self.tuning, self.tuning_step_fraction),
            color_step_seconds: self.color_step_seconds,
            seed: self.seed,
        };
        Ok(Simulation::new(setup)?)
    }
}

pub fn parse_config_json(raw: &str) -> Result<SimConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, SimConfig>(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        ConfigError::Parse {
            json_path: if path.is_empty() { ".".to_string() } else { path },
            source: error.into_inner(),
        }
    })
}

pub fn load_config(path: &Path) -> Result<SimConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config_json(&raw)?;
    info!(
        path = %path.display(),
        platform_count = config.platforms.len(),
        "config_loaded"
    );
    Ok(config)
}
