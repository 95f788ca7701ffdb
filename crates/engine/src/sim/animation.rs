use serde::Deserialize;
use thiserror::Error;

use super::body::{sanitize_dt, KinematicBody};
use super::geometry::Vec2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AnimationState {
    #[default]
    Idle,
    Running,
    Jumping,
}

impl AnimationState {
    pub fn as_token(self) -> &'static str {
        match self {
            AnimationState::Idle => "idle",
            AnimationState::Running => "running",
            AnimationState::Jumping => "jumping",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

/// How the jump clip chooses between its two poses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpPoseRule {
    /// Ascending pose for a fixed number of frames after leaving the ground.
    #[default]
    Countdown,
    /// Ascending pose while vertical velocity is positive.
    Velocity,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    pub frame_period: f32,
    pub run_clip_len: usize,
    pub jump_frame_budget: u32,
    pub jump_pose_rule: JumpPoseRule,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frame_period: 0.1,
            run_clip_len: 2,
            jump_frame_budget: 10,
            jump_pose_rule: JumpPoseRule::Countdown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum AnimationConfigError {
    #[error("animation frame_period must be > 0 (got {0})")]
    NonPositiveFramePeriod(f32),
    #[error("animation run_clip_len must be > 0")]
    EmptyRunClip,
}

impl AnimationConfig {
    pub fn validate(&self) -> Result<(), AnimationConfigError> {
        if !(self.frame_period > 0.0 && self.frame_period.is_finite()) {
            return Err(AnimationConfigError::NonPositiveFramePeriod(
                self.frame_period,
            ));
        }
        if self.run_clip_len == 0 {
            return Err(AnimationConfigError::EmptyRunClip);
        }
        Ok(())
    }
}

/// Sprite choice for the renderer, derived from state and frame index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPose {
    Stand,
    Run(usize),
    JumpAscending,
    JumpDescending,
}

const JUMP_ASCENDING_FRAME: usize = 0;
const JUMP_DESCENDING_FRAME: usize = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FrameSelection {
    pub state: AnimationState,
    pub frame_index: usize,
    pub facing: Facing,
}

impl FrameSelection {
    pub fn pose(&self) -> AnimationPose {
        match self.state {
            AnimationState::Idle => AnimationPose::Stand,
            AnimationState::Running => AnimationPose::Run(self.frame_index),
            AnimationState::Jumping if self.frame_index == JUMP_ASCENDING_FRAME => {
                AnimationPose::JumpAscending
            }
            AnimationState::Jumping => AnimationPose::JumpDescending,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnimationSelector {
    config: AnimationConfig,
    state: AnimationState,
    elapsed_in_state: f32,
    jump_frames_remaining: u32,
    facing: Facing,
    current: FrameSelection,
}

impl AnimationSelector {
    pub fn new(config: AnimationConfig) -> Result<Self, AnimationConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: AnimationState::Idle,
            elapsed_in_state: 0.0,
            jump_frames_remaining: config.jump_frame_budget,
            facing: Facing::Right,
            current: FrameSelection::default(),
        })
    }

    pub fn current(&self) -> FrameSelection {
        self.current
    }

    pub fn elapsed_in_state(&self) -> f32 {
        self.elapsed_in_state
    }

    pub fn update_from_body(&mut self, dt: f32, body: &KinematicBody) -> FrameSelection {
        self.update(dt, body.on_ground(), body.velocity())
    }

    /// Picks this frame's animation from the physics snapshot. Call once per
    /// frame, after the body has stepped.
    pub fn update(&mut self, dt: f32, on_ground: bool, velocity: Vec2) -> FrameSelection {
        if velocity.x > 0.0 {
            self.facing = Facing::Right;
        } else if velocity.x < 0.0 {
            self.facing = Facing::Left;
        }

        let target = if !on_ground {
            AnimationState::Jumping
        } else if velocity.x == 0.0 {
            AnimationState::Idle
        } else {
            AnimationState::Running
        };

        if target != self.state {
            if self.state == AnimationState::Running || target == AnimationState::Jumping {
                self.jump_frames_remaining = self.config.jump_frame_budget;
            }
            self.state = target;
            self.elapsed_in_state = 0.0;
        } else {
            self.elapsed_in_state += sanitize_dt(dt);
        }

        let frame_index = match self.state {
            AnimationState::Idle => 0,
            AnimationState::Running => {
                let cycles = (self.elapsed_in_state / self.config.frame_period).floor() as usize;
                cycles % self.config.run_clip_len
            }
            AnimationState::Jumping => {
                let ascending = match self.config.jump_pose_rule {
                    JumpPoseRule::Countdown => self.jump_frames_remaining > 0,
                    JumpPoseRule::Velocity => velocity.y > 0.0,
                };
                self.jump_frames_remaining = self.jump_frames_remaining.saturating_sub(1);
                if ascending {
                    JUMP_ASCENDING_FRAME
                } else {
                    JUMP_DESCENDING_FRAME
                }
            }
        };

        self.current = FrameSelection {
            state: self.state,
            frame_index,
            facing: self.facing,
        };
        self.current
    }
}
