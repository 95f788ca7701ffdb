mod animation;
mod body;
mod color_ring;
mod geometry;
mod platforms;
mod simulation;
mod trace;
mod tuning;

pub use animation::{
    AnimationConfig, AnimationConfigError, AnimationPose, AnimationSelector, AnimationState,
    Facing, FrameSelection, JumpPoseRule,
};
pub use body::{BodyConfig, Control, KinematicBody, StepOutcome};
pub use color_ring::{
    random_unit_color, ColorRing, ColorRingError, Rgb, COLOR_RING_LEN, DEFAULT_COLOR_STEP_SECONDS,
};
pub use geometry::{GeometryError, Rect, RectBounds, Vec2};
pub use platforms::{Platform, PlatformColor, PlatformDesc, PlatformError, PlatformRegistry};
pub use simulation::{
    FrameOutput, Simulation, SimulationSetup, SimulationSetupError, TuningEvent,
};
pub use trace::ReplayDigest;
pub use tuning::{
    key_bindings_help, ConstantsReport, TuningError, TuningKey, TuningParam, TuningReport,
    TuningStore, TuningValues, DEFAULT_STEP_FRACTION, RUN_SPEED_FINE_STEP,
};
