use rand::Rng;
use thiserror::Error;

pub const COLOR_RING_LEN: usize = 5;
pub const DEFAULT_COLOR_STEP_SECONDS: f32 = 0.1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ColorRingError {
    #[error("color ring step must be > 0 seconds (got {0})")]
    NonPositiveStep(f32),
}

/// Five-slot color history for the pulsing goal marker. Slot 0 is the newest.
#[derive(Debug, Clone)]
pub struct ColorRing {
    slots: [Rgb; COLOR_RING_LEN],
    timer: f64,
    step: f64,
}

impl ColorRing {
    pub fn new<R: Rng + ?Sized>(step: f32, rng: &mut R) -> Result<Self, ColorRingError> {
        if !(step > 0.0 && step.is_finite()) {
            return Err(ColorRingError::NonPositiveStep(step));
        }
        let mut slots = [Rgb::default(); COLOR_RING_LEN];
        for slot in &mut slots {
            *slot = random_unit_color(rng);
        }
        Ok(Self {
            slots,
            timer: 0.0,
            step: f64::from(step),
        })
    }

    pub fn colors(&self) -> &[Rgb; COLOR_RING_LEN] {
        &self.slots
    }

    pub fn newest(&self) -> Rgb {
        self.slots[0]
    }

    /// Accumulates `dt` and shifts once per whole step elapsed, leaving the
    /// timer in `(0, step]`. Leftover time carries into the next call.
    /// Returns the number of shifts; only the last `COLOR_RING_LEN` of them
    /// draw colors since older ones fall off the ring.
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) -> usize {
        if dt.is_finite() && dt > 0.0 {
            self.timer += f64::from(dt);
        }
        if self.timer <= self.step {
            return 0;
        }

        let shifts = (self.timer / self.step).ceil() - 1.0;
        self.timer = (self.timer - shifts * self.step).clamp(0.0, self.step);

        let shifts = shifts as usize;
        for _ in 0..shifts.min(COLOR_RING_LEN) {
            self.slots.rotate_right(1);
            self.slots[0] = random_unit_color(rng);
        }
        shifts
    }
}

/// Uniform RGB sample pushed onto the unit sphere, so the color is never black.
pub fn random_unit_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    loop {
        let r: f32 = rng.gen();
        let g: f32 = rng.gen();
        let b: f32 = rng.gen();
        let length = (r * r + g * g + b * b).sqrt();
        if length <= f32::EPSILON {
            continue;
        }
        let to_channel = |value: f32| ((value / length) * 255.0).round().clamp(0.0, 255.0) as u8;
        return Rgb {
            r: to_channel(r),
            g: to_channel(g),
            b: to_channel(b),
        };
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn ring(step: f32) -> (ColorRing, StdRng) {
        let mut rng = StdRng::seed_from_u64(7);
        let ring = ColorRing::new(step, &mut rng).expect("ring");
        (ring, rng)
    }

    #[test]
    fn shifts_push_new_color_at_front_and_drop_tail() {
        let (mut ring, mut rng) = ring(0.1);
        let before = *ring.colors();

        let shifts = ring.update(0.15, &mut rng);

        assert_eq!(shifts, 1);
        assert_eq!(&ring.colors()[1..], &before[..COLOR_RING_LEN - 1]);
    }

    #[test]
    fn large_dt_shifts_several_times_and_keeps_phase() {
        let (mut ring, mut rng) = ring(0.1);

        assert_eq!(ring.update(0.35, &mut rng), 3);
        // 0.05 carried over, so one more 0.06 crosses the next step.
        assert_eq!(ring.update(0.06, &mut rng), 1);
        assert_eq!(ring.update(0.02, &mut rng), 0);
    }

    #[test]
    fn huge_dt_returns_and_keeps_ring_usable() {
        let (mut ring, mut rng) = ring(0.1);

        let shifts = ring.update(1.0e8, &mut rng);

        assert!(shifts > 900_000_000, "shifts: {shifts}");
        assert_eq!(ring.colors().len(), COLOR_RING_LEN);
        assert_eq!(ring.update(0.0, &mut rng), 0);
        assert_eq!(ring.update(0.2, &mut rng), 2);
    }

    #[test]
    fn length_is_invariant_across_updates() {
        let (mut ring, mut rng) = ring(0.05);
        for dt in [0.0, 0.01, 0.5, 3.0, -1.0, 0.049, 0.2] {
            ring.update(dt, &mut rng);
            assert_eq!(ring.colors().len(), COLOR_RING_LEN);
        }
    }

    #[test]
    fn sampled_colors_are_never_black() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let color = random_unit_color(&mut rng);
            let brightest = color.r.max(color.g).max(color.b);
            // Largest unit-vector component is at least 1/sqrt(3).
            assert!(brightest >= 147, "{color:?}");
        }
    }

    #[test]
    fn non_positive_step_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            ColorRing::new(0.0, &mut rng),
            Err(ColorRingError::NonPositiveStep(_))
        ));
    }
}
