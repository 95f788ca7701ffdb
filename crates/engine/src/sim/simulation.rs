use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{debug, info};

use super::animation::{AnimationConfig, AnimationConfigError, AnimationSelector, FrameSelection};
use super::body::{BodyConfig, Control, KinematicBody, StepOutcome};
use super::color_ring::{ColorRing, ColorRingError};
use super::geometry::{Rect, Vec2};
use super::platforms::PlatformRegistry;
use super::tuning::{TuningError, TuningKey, TuningReport, TuningStore};

/// Named tuning nudge from the input side: parameter name plus signed delta.
#[derive(Debug, Clone, PartialEq)]
pub struct TuningEvent {
    pub name: String,
    pub delta: f32,
}

impl TuningEvent {
    pub fn new(name: impl Into<String>, delta: f32) -> Self {
        Self {
            name: name.into(),
            delta,
        }
    }
}

/// Everything a renderer may read after a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutput {
    pub frame: u64,
    pub rect: Rect,
    pub velocity: Vec2,
    pub on_ground: bool,
    pub selection: FrameSelection,
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone)]
pub struct SimulationSetup {
    pub platforms: PlatformRegistry,
    pub spawn: Rect,
    pub body: BodyConfig,
    pub animation: AnimationConfig,
    pub tuning: TuningStore,
    pub color_step_seconds: f32,
    pub seed: u64,
}

#[derive(Debug, Error)]
pub enum SimulationSetupError {
    #[error(transparent)]
    Animation(#[from] AnimationConfigError),
    #[error(transparent)]
    ColorRing(#[from] ColorRingError),
}

/// One actor on a static platform set, stepped by a single owner thread.
///
/// Per frame the body integrates first, the animation selector then reads
/// the new body state, and the color ring advances last.
#[derive(Debug)]
pub struct Simulation {
    platforms: PlatformRegistry,
    body: KinematicBody,
    selector: AnimationSelector,
    tuning: TuningStore,
    ring: ColorRing,
    rng: StdRng,
    frame: u64,
}

impl Simulation {
    pub fn new(setup: SimulationSetup) -> Result<Self, SimulationSetupError> {
        let selector = AnimationSelector::new(setup.animation)?;
        let mut rng = StdRng::seed_from_u64(setup.seed);
        let ring = ColorRing::new(setup.color_step_seconds, &mut rng)?;
        info!(
            platform_count = setup.platforms.len(),
            spawn_x = setup.spawn.min().x,
            spawn_y = setup.spawn.min().y,
            "simulation_ready"
        );
        Ok(Self {
            platforms: setup.platforms,
            body: KinematicBody::new(setup.spawn, setup.body),
            selector,
            tuning: setup.tuning,
            ring,
            rng,
            frame: 0,
        })
    }

    pub fn advance(&mut self, dt: f32, control: Control) -> FrameOutput {
        let tuning = self.tuning.values();
        let outcome = self.body.step(dt, control, &self.platforms, &tuning);

        let previous_state = self.selector.current().state;
        let selection = self.selector.update_from_body(dt, &self.body);
        if selection.state != previous_state {
            debug!(
                frame = self.frame,
                from = previous_state.as_token(),
                to = selection.state.as_token(),
                "animation_state_changed"
            );
        }

        self.ring.update(dt, &mut self.rng);

        let output = FrameOutput {
            frame: self.frame,
            rect: self.body.rect(),
            velocity: self.body.velocity(),
            on_ground: self.body.on_ground(),
            selection,
            outcome,
        };
        self.frame = self.frame.saturating_add(1);
        output
    }

    pub fn apply_tuning_event(&mut self, event: &TuningEvent) -> Result<TuningReport, TuningError> {
        self.tuning.adjust_by_name(&event.name, event.delta)
    }

    pub fn apply_tuning_key(&mut self, key: TuningKey) -> TuningReport {
        let report = self.tuning.apply_key(key);
        info!("{}", self.tuning.report());
        report
    }

    pub fn body(&self) -> &KinematicBody {
        &self.body
    }

    pub fn selection(&self) -> FrameSelection {
        self.selector.current()
    }

    pub fn tuning(&self) -> &TuningStore {
        &self.tuning
    }

    pub fn tuning_mut(&mut self) -> &mut TuningStore {
        &mut self.tuning
    }

    pub fn color_ring(&self) -> &ColorRing {
        &self.ring
    }

    pub fn platforms(&self) -> &PlatformRegistry {
        &self.platforms
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}
