use std::fmt;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_STEP_FRACTION: f32 = 0.1;
pub const RUN_SPEED_FINE_STEP: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TuningParam {
    Gravity,
    RunSpeed,
    JumpSpeed,
    StopImpulse,
}

impl TuningParam {
    pub const ALL: [TuningParam; 4] = [
        TuningParam::JumpSpeed,
        TuningParam::RunSpeed,
        TuningParam::StopImpulse,
        TuningParam::Gravity,
    ];

    pub fn as_name(self) -> &'static str {
        match self {
            TuningParam::Gravity => "gravity",
            TuningParam::RunSpeed => "run_speed",
            TuningParam::JumpSpeed => "jump_speed",
            TuningParam::StopImpulse => "stop_impulse",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "gravity" => Some(TuningParam::Gravity),
            "run_speed" | "run" => Some(TuningParam::RunSpeed),
            "jump_speed" | "jump" => Some(TuningParam::JumpSpeed),
            "stop_impulse" | "stop" => Some(TuningParam::StopImpulse),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            TuningParam::Gravity => "Gravity",
            TuningParam::RunSpeed => "Run speed",
            TuningParam::JumpSpeed => "Jump speed",
            TuningParam::StopImpulse => "Stop impulse",
        }
    }
}

impl fmt::Display for TuningParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_name())
    }
}

/// Physics constants read by the body on every step. Gravity is negative (y up).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TuningValues {
    pub gravity: f32,
    pub run_speed: f32,
    pub jump_speed: f32,
    /// Kept adjustable for parity with the debug keys; the snap-to-speed
    /// horizontal model does not read it.
    pub stop_impulse: f32,
}

impl Default for TuningValues {
    fn default() -> Self {
        Self {
            gravity: -8000.0,
            run_speed: 2000.0,
            jump_speed: 2800.0,
            stop_impulse: 16650.0,
        }
    }
}

impl TuningValues {
    pub fn get(&self, param: TuningParam) -> f32 {
        match param {
            TuningParam::Gravity => self.gravity,
            TuningParam::RunSpeed => self.run_speed,
            TuningParam::JumpSpeed => self.jump_speed,
            TuningParam::StopImpulse => self.stop_impulse,
        }
    }

    fn slot_mut(&mut self, param: TuningParam) -> &mut f32 {
        match param {
            TuningParam::Gravity => &mut self.gravity,
            TuningParam::RunSpeed => &mut self.run_speed,
            TuningParam::JumpSpeed => &mut self.jump_speed,
            TuningParam::StopImpulse => &mut self.stop_impulse,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TuningError {
    #[error("unknown tuning parameter '{0}' (expected gravity|run_speed|jump_speed|stop_impulse)")]
    UnknownParam(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TuningReport {
    pub param: TuningParam,
    pub before: f32,
    pub delta: f32,
    pub after: f32,
}

impl fmt::Display for TuningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {} {} = {}",
            self.param.label(),
            self.before,
            if self.delta < 0.0 { '-' } else { '+' },
            self.delta.abs(),
            self.after
        )
    }
}

/// Debug keys bound to tuning nudges. Letters follow the keyboard pairs used
/// on the dev build: the upper key raises, the key below it lowers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TuningKey {
    JumpUp,
    JumpDown,
    RunUp,
    RunDown,
    StopUp,
    StopDown,
    GravityUp,
    GravityDown,
    RunFineUp,
    RunFineDown,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum KeyStep {
    /// Signed multiple of the baseline step.
    Baseline(f32),
    Absolute(f32),
}

impl TuningKey {
    pub const ALL: [TuningKey; 10] = [
        TuningKey::JumpUp,
        TuningKey::JumpDown,
        TuningKey::RunUp,
        TuningKey::RunDown,
        TuningKey::StopUp,
        TuningKey::StopDown,
        TuningKey::GravityUp,
        TuningKey::GravityDown,
        TuningKey::RunFineUp,
        TuningKey::RunFineDown,
    ];

    pub fn from_key_name(name: &str) -> Option<Self> {
        let key = match name.to_ascii_uppercase().as_str() {
            "U" => TuningKey::JumpUp,
            "J" => TuningKey::JumpDown,
            "I" => TuningKey::RunUp,
            "K" => TuningKey::RunDown,
            "O" => TuningKey::StopUp,
            "L" => TuningKey::StopDown,
            "P" => TuningKey::GravityUp,
            ";" | "SEMICOLON" => TuningKey::GravityDown,
            "G" => TuningKey::RunFineUp,
            "F" => TuningKey::RunFineDown,
            _ => return None,
        };
        Some(key)
    }

    pub fn key_name(self) -> &'static str {
        match self {
            TuningKey::JumpUp => "U",
            TuningKey::JumpDown => "J",
            TuningKey::RunUp => "I",
            TuningKey::RunDown => "K",
            TuningKey::StopUp => "O",
            TuningKey::StopDown => "L",
            TuningKey::GravityUp => "P",
            TuningKey::GravityDown => ";",
            TuningKey::RunFineUp => "G",
            TuningKey::RunFineDown => "F",
        }
    }

    pub fn param(self) -> TuningParam {
        match self {
            TuningKey::JumpUp | TuningKey::JumpDown => TuningParam::JumpSpeed,
            TuningKey::RunUp | TuningKey::RunDown => TuningParam::RunSpeed,
            TuningKey::RunFineUp | TuningKey::RunFineDown => TuningParam::RunSpeed,
            TuningKey::StopUp | TuningKey::StopDown => TuningParam::StopImpulse,
            TuningKey::GravityUp | TuningKey::GravityDown => TuningParam::Gravity,
        }
    }

    fn step(self) -> KeyStep {
        match self {
            TuningKey::JumpUp | TuningKey::RunUp | TuningKey::StopUp | TuningKey::GravityUp => {
                KeyStep::Baseline(1.0)
            }
            TuningKey::JumpDown
            | TuningKey::RunDown
            | TuningKey::StopDown
            | TuningKey::GravityDown => KeyStep::Baseline(-1.0),
            TuningKey::RunFineUp => KeyStep::Absolute(RUN_SPEED_FINE_STEP),
            TuningKey::RunFineDown => KeyStep::Absolute(-RUN_SPEED_FINE_STEP),
        }
    }
}

/// Live-tunable physics constants. Steps are a fixed fraction of the values
/// the store was created with, so repeated nudges stay linear.
#[derive(Debug, Clone)]
pub struct TuningStore {
    values: TuningValues,
    baseline: TuningValues,
    step_fraction: f32,
}

impl Default for TuningStore {
    fn default() -> Self {
        Self::new(TuningValues::default(), DEFAULT_STEP_FRACTION)
    }
}

impl TuningStore {
    pub fn new(baseline: TuningValues, step_fraction: f32) -> Self {
        Self {
            values: baseline,
            baseline,
            step_fraction,
        }
    }

    pub fn values(&self) -> TuningValues {
        self.values
    }

    pub fn get(&self, param: TuningParam) -> f32 {
        self.values.get(param)
    }

    pub fn get_by_name(&self, name: &str) -> Result<f32, TuningError> {
        let param =
            TuningParam::from_name(name).ok_or_else(|| TuningError::UnknownParam(name.to_string()))?;
        Ok(self.get(param))
    }

    pub fn baseline_step(&self, param: TuningParam) -> f32 {
        self.baseline.get(param) * self.step_fraction
    }

    /// Unbounded by intent: values may cross zero.
    pub fn adjust(&mut self, param: TuningParam, delta: f32) -> TuningReport {
        let slot = self.values.slot_mut(param);
        let before = *slot;
        *slot += delta;
        let report = TuningReport {
            param,
            before,
            delta,
            after: *slot,
        };
        info!(
            param = param.as_name(),
            before = report.before,
            delta = report.delta,
            after = report.after,
            "tuning_adjusted"
        );
        report
    }

    pub fn adjust_by_name(&mut self, name: &str, delta: f32) -> Result<TuningReport, TuningError> {
        let param =
            TuningParam::from_name(name).ok_or_else(|| TuningError::UnknownParam(name.to_string()))?;
        Ok(self.adjust(param, delta))
    }

    pub fn apply_key(&mut self, key: TuningKey) -> TuningReport {
        let delta = match key.step() {
            KeyStep::Baseline(sign) => sign * self.baseline_step(key.param()),
            KeyStep::Absolute(amount) => amount,
        };
        self.adjust(key.param(), delta)
    }

    pub fn reset(&mut self) {
        self.values = self.baseline;
        info!("tuning_reset");
    }

    pub fn report(&self) -> ConstantsReport {
        ConstantsReport {
            values: self.values,
        }
    }
}

/// Multi-line dump of every constant, printed after each debug-key nudge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantsReport {
    values: TuningValues,
}

impl fmt::Display for ConstantsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=========================")?;
        for param in TuningParam::ALL {
            writeln!(f, "{}: {}", param.label(), self.values.get(param))?;
        }
        write!(f, "=========================")
    }
}

pub fn key_bindings_help() -> String {
    let mut lines = Vec::new();
    for pair in TuningKey::ALL.chunks(2) {
        let [up, down] = pair else {
            continue;
        };
        lines.push(format!(
            "{} up: {}   {} down: {}",
            up.param().label(),
            up.key_name(),
            down.param().label(),
            down.key_name()
        ));
    }
    lines.push(format!(
        "Baseline keys step by +/-{}% of the initial value; G/F step run speed by {}.",
        DEFAULT_STEP_FRACTION * 100.0,
        RUN_SPEED_FINE_STEP
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjust_then_reverse_restores_value() {
        let mut store = TuningStore::default();
        let original = store.get(TuningParam::JumpSpeed);

        store.adjust(TuningParam::JumpSpeed, 280.0);
        store.adjust(TuningParam::JumpSpeed, -280.0);

        assert!((store.get(TuningParam::JumpSpeed) - original).abs() < 1e-3);
    }

    #[test]
    fn report_carries_before_and_after() {
        let mut store = TuningStore::default();
        let report = store.adjust(TuningParam::RunSpeed, 100.0);

        assert_eq!(report.before, 2000.0);
        assert_eq!(report.after, 2100.0);
        assert_eq!(report.to_string(), "Run speed: 2000 + 100 = 2100");

        let down = store.adjust(TuningParam::RunSpeed, -100.0);
        assert_eq!(down.to_string(), "Run speed: 2100 - 100 = 2000");
    }

    #[test]
    fn values_may_cross_zero() {
        let mut store = TuningStore::default();
        store.adjust(TuningParam::JumpSpeed, -5000.0);
        assert_eq!(store.get(TuningParam::JumpSpeed), -2200.0);
    }

    #[test]
    fn baseline_keys_step_by_fraction_of_initial_value() {
        let mut store = TuningStore::default();
        store.apply_key(TuningKey::JumpUp);
        store.apply_key(TuningKey::JumpUp);
        assert!((store.get(TuningParam::JumpSpeed) - 3360.0).abs() < 1e-3);

        store.apply_key(TuningKey::GravityUp);
        assert!((store.get(TuningParam::Gravity) - -8800.0).abs() < 1e-3);
        store.apply_key(TuningKey::GravityDown);
        store.apply_key(TuningKey::GravityDown);
        assert!((store.get(TuningParam::Gravity) - -7200.0).abs() < 1e-3);
    }

    #[test]
    fn fine_run_keys_use_absolute_step() {
        let mut store = TuningStore::default();
        let report = store.apply_key(TuningKey::RunFineDown);
        assert_eq!(report.delta, -RUN_SPEED_FINE_STEP);
        assert_eq!(store.get(TuningParam::RunSpeed), 1900.0);
    }

    #[test]
    fn names_resolve_case_insensitively() {
        let mut store = TuningStore::default();
        assert_eq!(store.get_by_name("Gravity").expect("gravity"), -8000.0);
        let report = store.adjust_by_name("stop", 1.0).expect("stop");
        assert_eq!(report.param, TuningParam::StopImpulse);
        assert_eq!(
            store.adjust_by_name("friction", 1.0),
            Err(TuningError::UnknownParam("friction".to_string()))
        );
    }

    #[test]
    fn key_names_round_trip_for_every_binding() {
        for key in TuningKey::ALL {
            assert_eq!(TuningKey::from_key_name(key.key_name()), Some(key));
        }
        assert_eq!(TuningKey::from_key_name("semicolon"), Some(TuningKey::GravityDown));
        assert_eq!(TuningKey::from_key_name("Z"), None);
    }

    #[test]
    fn constants_report_lists_every_param() {
        let store = TuningStore::default();
        let text = store.report().to_string();
        assert!(text.contains("Jump speed: 2800"));
        assert!(text.contains("Run speed: 2000"));
        assert!(text.contains("Stop impulse: 16650"));
        assert!(text.contains("Gravity: -8000"));
    }

    #[test]
    fn reset_returns_to_baseline() {
        let mut store = TuningStore::default();
        store.apply_key(TuningKey::StopUp);
        store.reset();
        assert_eq!(store.values(), TuningValues::default());
    }

    #[test]
    fn help_mentions_every_key() {
        let help = key_bindings_help();
        for key in TuningKey::ALL {
            assert!(help.contains(key.key_name()), "missing {}", key.key_name());
        }
    }
}
