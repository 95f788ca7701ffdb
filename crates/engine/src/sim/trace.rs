use sha2::{Digest, Sha256};

use super::animation::{AnimationState, Facing};
use super::simulation::FrameOutput;

/// Running SHA-256 over every frame's presentation output. Two runs fed the
/// same inputs yield the same hex digest.
#[derive(Debug, Clone, Default)]
pub struct ReplayDigest {
    hasher: Sha256,
    frames: u64,
}

impl ReplayDigest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, output: &FrameOutput) {
        let min = output.rect.min();
        let max = output.rect.max();
        self.hasher.update(output.frame.to_le_bytes());
        for value in [min.x, min.y, max.x, max.y, output.velocity.x, output.velocity.y] {
            self.hasher.update(value.to_bits().to_le_bytes());
        }
        self.hasher.update([
            u8::from(output.on_ground),
            state_tag(output.selection.state),
            facing_tag(output.selection.facing),
        ]);
        self.hasher
            .update((output.selection.frame_index as u64).to_le_bytes());
        self.frames = self.frames.saturating_add(1);
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn hex(&self) -> String {
        to_hex_lower(&self.hasher.clone().finalize())
    }
}

fn state_tag(state: AnimationState) -> u8 {
    match state {
        AnimationState::Idle => 0,
        AnimationState::Running => 1,
        AnimationState::Jumping => 2,
    }
}

fn facing_tag(facing: Facing) -> u8 {
    match facing {
        Facing::Right => 0,
        Facing::Left => 1,
    }
}

fn to_hex_lower(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        use std::fmt::Write as _;
        let _ = write!(&mut output, "{byte:02x}");
    }
    output
}
