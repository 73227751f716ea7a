use super::{Simulation, Tolerance};

/// Exponential velocity-decay coast: `v(t) = v0·drag^t`, with the position
/// integrated in closed form. `drag` sits in (0, 1) for anything that
/// actually slows down; `ln(drag)` is computed once up front.
#[derive(Debug, Clone, Copy)]
pub struct FrictionSimulation {
    drag: f64,
    log_drag: f64,
    position: f64,
    velocity: f64,
    tolerance: Tolerance,
}

impl FrictionSimulation {
    pub fn new(drag: f64, position: f64, velocity: f64, tolerance: Tolerance) -> Self {
        Self {
            drag,
            log_drag: drag.ln(),
            position,
            velocity,
            tolerance,
        }
    }

    /// Coast that passes through `(start_position, start_velocity)` and
    /// `(end_position, end_velocity)`, back-solving the drag coefficient
    /// from the boundary samples.
    pub fn through(
        start_position: f64,
        end_position: f64,
        start_velocity: f64,
        end_velocity: f64,
        tolerance: Tolerance,
    ) -> Self {
        Self::new(
            Self::drag_for(start_position, end_position, start_velocity, end_velocity),
            start_position,
            start_velocity,
            tolerance,
        )
    }

    /// Drag coefficient reproducing an observed deceleration between two
    /// boundary samples. Coincident positions drive the exponent to ±∞; the
    /// infinite result collapses to zero rather than escaping to callers.
    pub fn drag_for(
        start_position: f64,
        end_position: f64,
        start_velocity: f64,
        end_velocity: f64,
    ) -> f64 {
        let drag =
            ((start_velocity - end_velocity) / (start_position - end_position)).exp();
        if drag.is_infinite() {
            0.0
        } else {
            drag
        }
    }

    /// Where the coast comes to rest as t → ∞.
    pub fn final_position(&self) -> f64 {
        self.position - self.velocity / self.log_drag
    }

    /// Seconds until the coast reaches `x`, or +∞ when the trajectory never
    /// gets there (zero velocity, or `x` behind the motion or beyond the
    /// resting point).
    pub fn time_to_position(&self, x: f64) -> f64 {
        if x == self.position {
            return 0.0;
        }
        if self.velocity == 0.0 {
            return f64::INFINITY;
        }
        let reachable = if self.velocity > 0.0 {
            x >= self.position && x <= self.final_position()
        } else {
            x <= self.position && x >= self.final_position()
        };
        if !reachable {
            return f64::INFINITY;
        }
        (self.log_drag * (x - self.position) / self.velocity + 1.0).ln() / self.log_drag
    }
}

impl Simulation for FrictionSimulation {
    fn position_at(&self, time: f64) -> f64 {
        self.position + self.velocity * self.drag.powf(time) / self.log_drag
            - self.velocity / self.log_drag
    }

    fn velocity_at(&self, time: f64) -> f64 {
        self.velocity * self.drag.powf(time)
    }

    fn is_done(&self, time: f64) -> bool {
        self.velocity_at(time).abs() < self.tolerance.velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coast() -> FrictionSimulation {
        FrictionSimulation::new(0.135, 100.0, 400.0, Tolerance::default())
    }

    // ── decay shape ─────────────────────────────────────────────────────

    #[test]
    fn velocity_decays_monotonically() {
        let sim = coast();
        let mut previous = sim.velocity_at(0.0).abs();
        let mut t = 0.05;
        while t < 8.0 {
            let v = sim.velocity_at(t).abs();
            assert!(v <= previous, "|v| grew at t={}", t);
            previous = v;
            t += 0.05;
        }
    }

    #[test]
    fn position_converges_to_final_position() {
        let sim = coast();
        let resting = sim.final_position();
        assert!((sim.position_at(30.0) - resting).abs() < 1e-9);
        // The coast approaches its resting point from below for v0 > 0.
        assert!(sim.position_at(1.0) < resting);
    }

    #[test]
    fn starts_at_initial_state() {
        let sim = coast();
        assert!((sim.position_at(0.0) - 100.0).abs() < 1e-12);
        assert!((sim.velocity_at(0.0) - 400.0).abs() < 1e-12);
    }

    #[test]
    fn negative_velocity_coasts_backwards() {
        let sim = FrictionSimulation::new(0.135, 100.0, -400.0, Tolerance::default());
        assert!(sim.final_position() < 100.0);
        assert!(sim.position_at(1.0) < 100.0);
        assert!(sim.position_at(1.0) > sim.final_position());
    }

    // ── time_to_position ────────────────────────────────────────────────

    #[test]
    fn time_to_position_round_trips() {
        let sim = coast();
        let resting = sim.final_position();
        for i in 1..20 {
            let x = 100.0 + (resting - 100.0) * f64::from(i) / 20.0;
            let t = sim.time_to_position(x);
            assert!(t.is_finite());
            assert!(
                (sim.position_at(t) - x).abs() < 1e-9,
                "round trip through x={} gave {}",
                x,
                sim.position_at(t)
            );
        }
    }

    #[test]
    fn time_to_own_position_is_zero() {
        assert_eq!(coast().time_to_position(100.0), 0.0);
    }

    #[test]
    fn unreachable_targets_take_forever() {
        let sim = coast();
        // Behind the motion.
        assert_eq!(sim.time_to_position(50.0), f64::INFINITY);
        // Beyond the resting point.
        assert_eq!(sim.time_to_position(sim.final_position() + 1.0), f64::INFINITY);
        // No motion at all.
        let parked = FrictionSimulation::new(0.135, 100.0, 0.0, Tolerance::default());
        assert_eq!(parked.time_to_position(101.0), f64::INFINITY);
    }

    // ── boundary-sample constructor ─────────────────────────────────────

    #[test]
    fn through_matches_observed_samples() {
        let sim = FrictionSimulation::through(0.0, 100.0, 200.0, 100.0, Tolerance::default());
        // drag = e^((200−100)/(0−100)) = e^(−1)
        let t = sim.time_to_position(100.0);
        assert!(t.is_finite());
        assert!((sim.velocity_at(t) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn drag_for_collapses_infinite_results() {
        assert_eq!(FrictionSimulation::drag_for(0.0, 0.0, 10.0, 5.0), 0.0);
    }

    // ── done test ───────────────────────────────────────────────────────

    #[test]
    fn is_done_once_velocity_is_negligible() {
        let sim = coast();
        assert!(!sim.is_done(1.0));
        assert!(sim.is_done(10.0));
    }
}
