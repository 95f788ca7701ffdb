mod frame_clock;
mod input;
mod metrics;

pub use frame_clock::{FrameClock, FrameClockConfig, StepPlan};
pub use input::{ActionStates, InputAction};
pub use metrics::{LoopMetricsSnapshot, MetricsAccumulator};
