//! Platformer movement core: a kinematic body stepping against static
//! ledges, an animation selector reading the body, live-tunable physics
//! constants and the fixed-step clock that drives them.

pub mod app;
mod config;
pub mod sim;

pub use app::{
    ActionStates, FrameClock, FrameClockConfig, InputAction, LoopMetricsSnapshot,
    MetricsAccumulator, StepPlan,
};
pub use config::{load_config, parse_config_json, ConfigError, SimConfig, CONFIG_ENV_VAR};
pub use sim::{
    key_bindings_help, AnimationConfig, AnimationPose, AnimationState, Control, Facing,
    FrameOutput, FrameSelection, KinematicBody, PlatformRegistry, Rect, ReplayDigest, Simulation,
    TuningError, TuningEvent, TuningKey, TuningParam, TuningReport, TuningStore, Vec2,
};
