use std::process::ExitCode;
use std::time::{Duration, Instant};

use hop_engine::{
    ActionStates, FrameClock, FrameOutput, InputAction, MetricsAccumulator, ReplayDigest,
    SimConfig, Simulation,
};
use tracing::{debug, error, info, warn};

use super::bootstrap::{AppWiring, Launch};
use super::console::{ConsoleCommandProcessor, HoldDirection, SimCommand};
use super::script::Script;
use super::AppError;

pub(crate) fn run(launch: Result<Launch, AppError>) -> ExitCode {
    let app = match launch {
        Ok(Launch::Run(app)) => app,
        Ok(Launch::Help) => return ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "startup_failed");
            return ExitCode::FAILURE;
        }
    };

    match run_script(&app) {
        Ok(summary) => {
            info!(
                frames = summary.frames,
                landings = summary.landings,
                jumps = summary.jumps,
                digest = %summary.digest,
                "run_complete"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "run_failed");
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub(crate) frames: u64,
    pub(crate) landings: u32,
    pub(crate) jumps: u32,
    pub(crate) digest: String,
}

pub(crate) fn run_script(app: &AppWiring) -> Result<RunSummary, AppError> {
    let mut runner = HeadlessRunner::new(&app.config)?;
    runner.play(&app.script)?;
    Ok(runner.summary())
}

/// Drives the simulation from console commands instead of a window. Wall time
/// is virtual: `wait` feeds render-rate frames through the frame clock, `step`
/// runs fixed ticks directly.
pub(crate) struct HeadlessRunner {
    sim: Simulation,
    clock: FrameClock,
    actions: ActionStates,
    digest: ReplayDigest,
    metrics: MetricsAccumulator,
    started_at: Instant,
    virtual_elapsed: Duration,
    landings: u32,
    jumps: u32,
    quit_requested: bool,
}

impl HeadlessRunner {
    pub(crate) fn new(config: &SimConfig) -> Result<Self, AppError> {
        let sim = config.build_simulation()?;
        let started_at = Instant::now();
        Ok(Self {
            sim,
            clock: FrameClock::new(config.clock),
            actions: ActionStates::default(),
            digest: ReplayDigest::new(),
            metrics: MetricsAccumulator::new(config.metrics_interval(), started_at),
            started_at,
            virtual_elapsed: Duration::ZERO,
            landings: 0,
            jumps: 0,
            quit_requested: false,
        })
    }

    pub(crate) fn play(&mut self, script: &Script) -> Result<(), AppError> {
        let mut processor = ConsoleCommandProcessor::new();
        let mut pending = Vec::new();

        for (line_number, line) in script.numbered_lines() {
            processor
                .process_line(line)
                .map_err(|source| AppError::ScriptLine {
                    origin: script.origin().to_string(),
                    line: line_number,
                    source,
                })?;
            for output in processor.take_output_lines() {
                info!("{output}");
            }

            processor.drain_pending_commands_into(&mut pending);
            for command in pending.drain(..) {
                self.execute(command);
                if self.quit_requested {
                    info!(line = line_number, "quit_requested");
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    pub(crate) fn execute(&mut self, command: SimCommand) {
        match command {
            SimCommand::Hold(direction) => {
                self.actions
                    .set(InputAction::MoveLeft, direction == HoldDirection::Left);
                self.actions
                    .set(InputAction::MoveRight, direction == HoldDirection::Right);
            }
            SimCommand::Jump => {
                self.actions.set(InputAction::Jump, true);
                self.actions.set(InputAction::Jump, false);
            }
            SimCommand::Step { frames } => {
                let dt = self.clock.fixed_dt();
                for _ in 0..frames {
                    self.tick(dt.as_secs_f32());
                    self.end_frame(dt);
                }
            }
            SimCommand::Wait { seconds } => match Duration::try_from_secs_f32(seconds) {
                Ok(wall) => self.feed_wall_time(wall),
                Err(err) => warn!(seconds, error = %err, "wait_ignored"),
            },
            SimCommand::Tune(event) => match self.sim.apply_tuning_event(&event) {
                Ok(report) => info!("{report}"),
                Err(err) => warn!(error = %err, "tune_ignored"),
            },
            SimCommand::Key(key) => {
                let report = self.sim.apply_tuning_key(key);
                info!(key = key.key_name(), "{report}");
            }
            SimCommand::SlowMotion { factor } => {
                self.clock.set_slow_motion(factor);
                info!(slow_motion = self.clock.slow_motion(), "slow_motion_set");
            }
            SimCommand::Dump => self.dump(),
            SimCommand::ResetTuning => self.sim.tuning_mut().reset(),
            SimCommand::Quit => self.quit_requested = true,
        }
    }

    pub(crate) fn summary(&self) -> RunSummary {
        RunSummary {
            frames: self.digest.frames(),
            landings: self.landings,
            jumps: self.jumps,
            digest: self.digest.hex(),
        }
    }

    #[cfg(test)]
    pub(crate) fn simulation(&self) -> &Simulation {
        &self.sim
    }

    fn feed_wall_time(&mut self, wall: Duration) {
        let frame_dt = self.clock.fixed_dt();
        let mut remaining = wall;
        while !remaining.is_zero() {
            let raw = remaining.min(frame_dt);
            remaining = remaining.saturating_sub(raw);

            let plan = self.clock.plan(raw);
            let dt = self.clock.fixed_dt_seconds();
            for _ in 0..plan.ticks_to_run {
                self.tick(dt);
            }
            self.end_frame(raw);
        }
    }

    fn tick(&mut self, dt: f32) {
        let control = self.actions.take_control();
        let output = self.sim.advance(dt, control);
        self.digest.record(&output);
        self.metrics.record_tick(dt);
        self.note_outcome(&output);
    }

    fn end_frame(&mut self, frame_dt: Duration) {
        self.metrics.record_frame(frame_dt);
        self.virtual_elapsed = self.virtual_elapsed.saturating_add(frame_dt);
        if let Some(snapshot) = self
            .metrics
            .maybe_snapshot(self.started_at + self.virtual_elapsed)
        {
            info!(
                fps = snapshot.fps,
                tps = snapshot.tps,
                frame_time_ms = snapshot.frame_time_ms,
                sim_speed = snapshot.sim_speed,
                "loop_metrics"
            );
        }
    }

    fn note_outcome(&mut self, output: &FrameOutput) {
        if output.outcome.touched_down {
            self.landings = self.landings.saturating_add(1);
            debug!(frame = output.frame, landings = self.landings, "landing_counted");
        }
        if output.outcome.jumped {
            self.jumps = self.jumps.saturating_add(1);
        }
    }

    fn dump(&self) {
        let body = self.sim.body();
        let position = body.position();
        let velocity = body.velocity();
        let selection = self.sim.selection();
        let newest = self.sim.color_ring().newest();
        info!(
            frame = self.sim.frame(),
            x = position.x,
            y = position.y,
            vx = velocity.x,
            vy = velocity.y,
            on_ground = body.on_ground(),
            state = selection.state.as_token(),
            frame_index = selection.frame_index,
            facing = ?selection.facing,
            pose = ?selection.pose(),
            platforms = self.sim.platforms().len(),
            color = ?(newest.r, newest.g, newest.b),
            "body_dump"
        );
        info!("{}", self.sim.tuning().report());
    }
}
