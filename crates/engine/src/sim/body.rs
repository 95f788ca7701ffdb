use tracing::debug;

use super::geometry::{Rect, Vec2};
use super::platforms::PlatformRegistry;
use super::tuning::TuningValues;

/// Direction input for one frame. `x` is -1 (left), 0 or 1 (right); `y > 0`
/// requests a jump this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Control {
    pub x: f32,
    pub y: f32,
}

impl Control {
    pub const NONE: Control = Control { x: 0.0, y: 0.0 };

    pub fn new(x: f32, jump: bool) -> Self {
        Self {
            x: x.clamp(-1.0, 1.0),
            y: if jump { 1.0 } else { 0.0 },
        }
    }

    pub fn left() -> Self {
        Self::new(-1.0, false)
    }

    pub fn right() -> Self {
        Self::new(1.0, false)
    }

    pub fn with_jump(mut self) -> Self {
        self.y = 1.0;
        self
    }

    pub fn wants_jump(&self) -> bool {
        self.y > 0.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyConfig {
    /// Caps downward speed when set. Off by default.
    pub max_fall_speed: Option<f32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Platform index the body rests on after this step.
    pub resting_on: Option<usize>,
    /// True only on the step where ground contact begins.
    pub touched_down: bool,
    pub jumped: bool,
}

#[derive(Debug, Clone)]
pub struct KinematicBody {
    rect: Rect,
    velocity: Vec2,
    on_ground: bool,
    config: BodyConfig,
}

impl KinematicBody {
    pub fn new(rect: Rect, config: BodyConfig) -> Self {
        Self {
            rect,
            velocity: Vec2::ZERO,
            on_ground: false,
            config,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn position(&self) -> Vec2 {
        self.rect.min()
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    /// Advances one frame. Non-finite or negative `dt` is treated as zero so
    /// integration never runs backward.
    pub fn step(
        &mut self,
        dt: f32,
        control: Control,
        platforms: &PlatformRegistry,
        tuning: &TuningValues,
    ) -> StepOutcome {
        let dt = sanitize_dt(dt);
        let was_on_ground = self.on_ground;
        self.on_ground = false;

        self.velocity.x = control.x * tuning.run_speed;
        self.velocity.y += tuning.gravity * dt;
        if let Some(max_fall_speed) = self.config.max_fall_speed {
            self.velocity.y = self.velocity.y.max(-max_fall_speed.abs());
        }

        let previous_bottom = self.rect.bottom();
        self.rect = self.rect.translated(self.velocity.scaled(dt));

        let mut outcome = StepOutcome::default();
        if self.velocity.y <= 0.0 {
            if let Some((index, top)) = find_landing(previous_bottom, &self.rect, platforms) {
                self.velocity.y = 0.0;
                self.rect = self.rect.with_bottom_at(top);
                self.on_ground = true;
                outcome.resting_on = Some(index);
                outcome.touched_down = !was_on_ground;
                if outcome.touched_down {
                    debug!(platform = index, top, x = self.rect.min().x, "body_landed");
                }
            }
        }

        if self.on_ground && control.wants_jump() {
            self.velocity.y = tuning.jump_speed;
            self.on_ground = false;
            outcome.resting_on = None;
            outcome.jumped = true;
            debug!(
                jump_speed = tuning.jump_speed,
                x = self.rect.min().x,
                y = self.rect.min().y,
                "jump_started"
            );
        }

        outcome
    }
}

pub(crate) fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        0.0
    }
}

/// Picks the highest platform top crossed by the bottom edge this frame.
///
/// A top qualifies when the bottom started at or above it and ended at or
/// below it, with the body overlapping the platform horizontally. Ties keep
/// the earliest platform.
fn find_landing(
    previous_bottom: f32,
    moved: &Rect,
    platforms: &PlatformRegistry,
) -> Option<(usize, f32)> {
    let bottom = moved.bottom();
    let mut best: Option<(usize, f32)> = None;
    for (index, platform) in platforms.iter().enumerate() {
        if !moved.overlaps_horizontally(&platform.rect) {
            continue;
        }
        let top = platform.rect.top();
        if previous_bottom < top || bottom > top {
            continue;
        }
        if best.map_or(true, |(_, best_top)| top > best_top) {
            best = Some((index, top));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn rect(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Rect {
        Rect::new(Vec2::new(min_x, min_y), Vec2::new(max_x, max_y)).expect("rect")
    }

    fn ground_at(top: f32) -> PlatformRegistry {
        PlatformRegistry::from_rects([rect(-1000.0, top - 10.0, 1000.0, top)])
    }

    fn body_at(bottom: f32) -> KinematicBody {
        KinematicBody::new(rect(0.0, bottom, 1.0, bottom + 2.0), BodyConfig::default())
    }

    fn no_gravity() -> TuningValues {
        TuningValues {
            gravity: 0.0,
            ..TuningValues::default()
        }
    }

    #[test]
    fn free_fall_matches_closed_form() {
        let tuning = TuningValues::default();
        let platforms = PlatformRegistry::empty();
        let mut body = body_at(0.0);
        let dt = 1.0 / 600.0;
        let steps = 600u32;

        for _ in 0..steps {
            body.step(dt, Control::NONE, &platforms, &tuning);
        }

        let t = dt * steps as f32;
        let expected_velocity = tuning.gravity * t;
        assert!((body.velocity().y - expected_velocity).abs() < 1e-2 * expected_velocity.abs());

        // Semi-implicit Euler: y_n = g * dt^2 * n(n+1)/2.
        let n = steps as f32;
        let expected_y = tuning.gravity * dt * dt * n * (n + 1.0) * 0.5;
        assert!((body.rect().bottom() - expected_y).abs() < 1e-3 * expected_y.abs());
        assert!(!body.on_ground());
    }

    #[test]
    fn landing_snaps_bottom_flush_with_platform_top() {
        let tuning = TuningValues::default();
        let platforms = ground_at(0.0);
        let mut body = body_at(10.0).with_velocity(Vec2::new(0.0, -600.0));

        let outcome = body.step(FRAME, Control::NONE, &platforms, &tuning);

        assert_eq!(body.rect().bottom(), 0.0);
        assert!((body.rect().height() - 2.0).abs() < 1e-4);
        assert_eq!(body.velocity().y, 0.0);
        assert!(body.on_ground());
        assert_eq!(outcome.resting_on, Some(0));
        assert!(outcome.touched_down);
    }

    #[test]
    fn landing_exactly_on_the_top_counts() {
        let platforms = ground_at(0.0);
        let mut body = body_at(30.0).with_velocity(Vec2::new(0.0, -60.0));

        body.step(0.5, Control::NONE, &platforms, &no_gravity());

        assert!(body.on_ground());
        assert_eq!(body.rect().bottom(), 0.0);
    }

    #[test]
    fn stopping_just_above_the_top_does_not_land() {
        let platforms = ground_at(0.0);
        let mut body = body_at(30.5).with_velocity(Vec2::new(0.0, -60.0));

        body.step(0.5, Control::NONE, &platforms, &no_gravity());

        assert!(!body.on_ground());
        assert_eq!(body.rect().bottom(), 0.5);
        assert_eq!(body.velocity().y, -60.0);
    }

    #[test]
    fn body_starting_below_the_top_falls_through() {
        let platforms = ground_at(0.0);
        let mut body = body_at(-0.25);

        body.step(FRAME, Control::NONE, &platforms, &TuningValues::default());

        assert!(!body.on_ground());
        assert!(body.rect().bottom() < -0.25);
    }

    #[test]
    fn resting_body_stays_grounded_across_frames() {
        let tuning = TuningValues::default();
        let platforms = ground_at(0.0);
        let mut body = body_at(0.0);

        let first = body.step(FRAME, Control::NONE, &platforms, &tuning);
        let second = body.step(FRAME, Control::NONE, &platforms, &tuning);

        assert!(first.touched_down);
        assert!(!second.touched_down);
        assert_eq!(second.resting_on, Some(0));
        assert_eq!(body.rect().bottom(), 0.0);
        assert_eq!(body.velocity().y, 0.0);
    }

    #[test]
    fn no_horizontal_overlap_means_no_landing() {
        let platforms = PlatformRegistry::from_rects([rect(5.0, -10.0, 10.0, 0.0)]);
        let mut body = body_at(1.0);

        for _ in 0..30 {
            body.step(FRAME, Control::NONE, &platforms, &TuningValues::default());
        }

        assert!(!body.on_ground());
        assert!(body.rect().bottom() < 0.0);
    }

    #[test]
    fn rising_body_passes_through_platform_from_below() {
        let platforms = ground_at(5.0);
        let mut body = body_at(0.0).with_velocity(Vec2::new(0.0, 24.0));

        body.step(0.5, Control::NONE, &platforms, &no_gravity());

        assert!(!body.on_ground());
        assert_eq!(body.rect().bottom(), 12.0);
    }

    #[test]
    fn highest_crossed_platform_wins_regardless_of_order() {
        let low = rect(-10.0, -5.0, 10.0, 0.0);
        let high = rect(-10.0, 0.0, 10.0, 5.0);
        for platforms in [
            PlatformRegistry::from_rects([low, high]),
            PlatformRegistry::from_rects([high, low]),
        ] {
            let mut body = body_at(10.0).with_velocity(Vec2::new(0.0, -26.0));
            body.step(0.5, Control::NONE, &platforms, &no_gravity());

            assert!(body.on_ground());
            assert_eq!(body.rect().bottom(), 5.0);
        }
    }

    #[test]
    fn equal_tops_resolve_to_earliest_platform() {
        let first = rect(-10.0, -5.0, 10.0, 0.0);
        let second = rect(-20.0, -8.0, 20.0, 0.0);
        let platforms = PlatformRegistry::from_rects([first, second]);
        let mut body = body_at(10.0).with_velocity(Vec2::new(0.0, -26.0));

        let outcome = body.step(0.5, Control::NONE, &platforms, &no_gravity());

        assert_eq!(outcome.resting_on, Some(0));
        assert!(outcome.touched_down);
        assert_eq!(body.rect().bottom(), 0.0);
    }

    #[test]
    fn jump_on_landing_frame_leaves_ground_immediately() {
        let tuning = TuningValues::default();
        let platforms = ground_at(0.0);
        let mut body = body_at(5.0).with_velocity(Vec2::new(0.0, -600.0));

        let outcome = body.step(FRAME, Control::NONE.with_jump(), &platforms, &tuning);

        assert!(outcome.jumped);
        assert_eq!(body.velocity().y, tuning.jump_speed);
        assert_eq!(body.rect().bottom(), 0.0);
        assert!(!body.on_ground());

        body.step(FRAME, Control::NONE, &platforms, &tuning);
        assert!(body.rect().bottom() > 0.0);
    }

    #[test]
    fn jump_request_in_the_air_is_ignored() {
        let tuning = TuningValues::default();
        let mut body = body_at(100.0);

        let outcome = body.step(
            FRAME,
            Control::NONE.with_jump(),
            &PlatformRegistry::empty(),
            &tuning,
        );

        assert!(!outcome.jumped);
        assert!(body.velocity().y < 0.0);
    }

    #[test]
    fn horizontal_velocity_snaps_without_ramp() {
        let tuning = TuningValues::default();
        let platforms = ground_at(0.0);
        let mut body = body_at(0.0);

        body.step(FRAME, Control::right(), &platforms, &tuning);
        assert_eq!(body.velocity().x, tuning.run_speed);

        body.step(FRAME, Control::NONE, &platforms, &tuning);
        assert_eq!(body.velocity().x, 0.0);

        body.step(FRAME, Control::left(), &platforms, &tuning);
        assert_eq!(body.velocity().x, -tuning.run_speed);
    }

    #[test]
    fn tuning_changes_apply_on_next_step() {
        let mut tuning = TuningValues::default();
        let platforms = ground_at(0.0);
        let mut body = body_at(0.0);

        body.step(FRAME, Control::right(), &platforms, &tuning);
        tuning.run_speed = 500.0;
        body.step(FRAME, Control::right(), &platforms, &tuning);

        assert_eq!(body.velocity().x, 500.0);
    }

    #[test]
    fn negative_or_nan_dt_is_a_no_op() {
        let tuning = TuningValues::default();
        let mut body = body_at(50.0).with_velocity(Vec2::new(0.0, -10.0));

        body.step(-0.5, Control::NONE, &PlatformRegistry::empty(), &tuning);
        body.step(f32::NAN, Control::NONE, &PlatformRegistry::empty(), &tuning);

        assert_eq!(body.rect().bottom(), 50.0);
        assert_eq!(body.velocity().y, -10.0);
    }

    #[test]
    fn max_fall_speed_caps_descent() {
        let tuning = TuningValues::default();
        let mut body = KinematicBody::new(
            rect(0.0, 0.0, 1.0, 1.0),
            BodyConfig {
                max_fall_speed: Some(6000.0),
            },
        );

        for _ in 0..120 {
            body.step(FRAME, Control::NONE, &PlatformRegistry::empty(), &tuning);
        }

        assert_eq!(body.velocity().y, -6000.0);
    }

    #[test]
    fn drop_from_height_lands_near_closed_form_time() {
        let tuning = TuningValues {
            gravity: -8000.0,
            ..TuningValues::default()
        };
        let platforms = ground_at(0.0);
        let mut body = KinematicBody::new(rect(0.0, 1000.0, 1.0, 1000.0), BodyConfig::default());

        let mut elapsed = 0.0f32;
        let mut landed_at = None;
        for _ in 0..240 {
            body.step(FRAME, Control::NONE, &platforms, &tuning);
            elapsed += FRAME;
            if body.on_ground() {
                landed_at = Some(elapsed);
                break;
            }
        }

        let landed_at = landed_at.expect("body should land");
        let expected = (2.0f32 * 1000.0 / 8000.0).sqrt();
        assert!((landed_at - expected).abs() <= FRAME + 1e-4);
        assert_eq!(body.rect().bottom(), 0.0);
    }
}
