use super::friction::FrictionSimulation;
use super::spring::{SpringDescription, SpringSimulation};
use super::{Simulation, Tolerance};

/// Default exponential drag for flung content.
pub const DRAG: f64 = 0.135;
/// Snappier drag used for short programmatic jumps.
pub const LOW_DRAG: f64 = DRAG / 8.0;
/// Velocity handed from the friction phase into the spring phase is capped
/// so a violent fling cannot launch the edge spring arbitrarily far out.
const MAX_SPRING_TRANSFER_VELOCITY: f64 = 5000.0;

/// Coasting deceleration that splices into an edge spring the instant the
/// coast would carry the content past its bounds.
///
/// `spring_start_time` is +∞ when the coast settles in bounds on its own,
/// −∞ when the content starts out of bounds (pure spring from t = 0), and
/// the analytically computed crossing time otherwise. Queries past the
/// start time are re-based to the spring's local clock, so the composite
/// reads as one continuous curve with a single phase transition.
#[derive(Debug, Clone, Copy)]
pub struct RubberBandScrollSimulation {
    leading: f64,
    trailing: f64,
    friction: FrictionSimulation,
    spring: Option<SpringSimulation>,
    spring_start_time: f64,
}

impl RubberBandScrollSimulation {
    pub fn new(
        spring: &SpringDescription,
        leading: f64,
        trailing: f64,
        position: f64,
        velocity: f64,
        tolerance: Tolerance,
        drag: f64,
    ) -> Self {
        let friction = FrictionSimulation::new(drag, position, velocity, tolerance);
        let (spring_sim, spring_start_time) = if position < leading {
            (
                Some(SpringSimulation::new(spring, position, leading, velocity, tolerance)),
                f64::NEG_INFINITY,
            )
        } else if position > trailing {
            (
                Some(SpringSimulation::new(spring, position, trailing, velocity, tolerance)),
                f64::NEG_INFINITY,
            )
        } else {
            let resting = friction.final_position();
            if velocity > 0.0 && resting > trailing {
                let crossing = friction.time_to_position(trailing);
                let handoff = friction
                    .velocity_at(crossing)
                    .min(MAX_SPRING_TRANSFER_VELOCITY);
                (
                    Some(SpringSimulation::new(spring, trailing, trailing, handoff, tolerance)),
                    crossing,
                )
            } else if velocity < 0.0 && resting < leading {
                let crossing = friction.time_to_position(leading);
                let handoff = friction
                    .velocity_at(crossing)
                    .max(-MAX_SPRING_TRANSFER_VELOCITY);
                (
                    Some(SpringSimulation::new(spring, leading, leading, handoff, tolerance)),
                    crossing,
                )
            } else {
                (None, f64::INFINITY)
            }
        };
        Self {
            leading,
            trailing,
            friction,
            spring: spring_sim,
            spring_start_time,
        }
    }

    pub fn leading_extent(&self) -> f64 {
        self.leading
    }

    pub fn trailing_extent(&self) -> f64 {
        self.trailing
    }

    /// When the spring phase takes over: +∞ for never, −∞ for immediately.
    pub fn spring_start_time(&self) -> f64 {
        self.spring_start_time
    }

    /// Initial velocity that makes a low-drag coast travel `offset` before
    /// settling, for turning a requested visual jump into a fling.
    pub fn velocity_for_offset(offset: f64) -> f64 {
        offset * -LOW_DRAG.ln()
    }

    fn local_time(&self, time: f64) -> f64 {
        if self.spring_start_time.is_finite() {
            time - self.spring_start_time
        } else {
            time
        }
    }
}

impl Simulation for RubberBandScrollSimulation {
    fn position_at(&self, time: f64) -> f64 {
        match &self.spring {
            Some(spring) if time > self.spring_start_time => {
                spring.position_at(self.local_time(time))
            }
            _ => self.friction.position_at(time),
        }
    }

    fn velocity_at(&self, time: f64) -> f64 {
        match &self.spring {
            Some(spring) if time > self.spring_start_time => {
                spring.velocity_at(self.local_time(time))
            }
            _ => self.friction.velocity_at(time),
        }
    }

    fn is_done(&self, time: f64) -> bool {
        match &self.spring {
            Some(spring) if time > self.spring_start_time => {
                spring.is_done(self.local_time(time))
            }
            _ => self.friction.is_done(time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ios_spring() -> SpringDescription {
        SpringDescription::with_damping_ratio(0.5, 100.0, 1.1)
    }

    fn simulation(position: f64, velocity: f64) -> RubberBandScrollSimulation {
        RubberBandScrollSimulation::new(
            &ios_spring(),
            0.0,
            1000.0,
            position,
            velocity,
            Tolerance::default(),
            DRAG,
        )
    }

    // ── phase selection ─────────────────────────────────────────────────

    #[test]
    fn slow_fling_inside_bounds_never_springs() {
        let sim = simulation(500.0, 800.0);
        assert_eq!(sim.leading_extent(), 0.0);
        assert_eq!(sim.trailing_extent(), 1000.0);
        assert_eq!(sim.spring_start_time(), f64::INFINITY);
        // Friction alone comes to rest short of the trailing edge.
        assert!(!sim.is_done(1.0));
        assert!(sim.is_done(10.0));
        let resting = sim.position_at(30.0);
        assert!(resting > 500.0 && resting < 1000.0);
    }

    #[test]
    fn fast_fling_hands_off_to_the_edge_spring() {
        let sim = simulation(950.0, 2000.0);
        let crossing = sim.spring_start_time();
        assert!(crossing.is_finite());
        assert!(crossing > 0.0);

        // Overshoots the trailing edge only transiently.
        let mut peak = f64::MIN;
        let mut t = crossing;
        while t < crossing + 2.0 {
            peak = peak.max(sim.position_at(t + 1e-6));
            t += 0.01;
        }
        assert!(peak > 1000.0, "spring should overshoot past the edge");
        assert!(sim.is_done(5.0));
        assert_eq!(sim.position_at(5.0), 1000.0);
    }

    #[test]
    fn already_out_of_bounds_springs_immediately() {
        let sim = simulation(1100.0, 0.0);
        assert_eq!(sim.spring_start_time(), f64::NEG_INFINITY);
        assert!((sim.position_at(0.0) - 1100.0).abs() < 1e-9);
        // Pulled back to the trailing edge, not the leading one.
        assert_eq!(sim.position_at(5.0), 1000.0);
    }

    #[test]
    fn out_of_bounds_below_springs_to_leading_edge() {
        let sim = simulation(-80.0, 0.0);
        assert_eq!(sim.spring_start_time(), f64::NEG_INFINITY);
        assert_eq!(sim.position_at(5.0), 0.0);
    }

    #[test]
    fn backwards_fling_hands_off_at_the_leading_edge() {
        let sim = simulation(50.0, -2000.0);
        let crossing = sim.spring_start_time();
        assert!(crossing.is_finite());
        assert!(sim.position_at(crossing + 0.05) < 0.0);
        assert_eq!(sim.position_at(5.0), 0.0);
    }

    // ── continuity and capping ──────────────────────────────────────────

    #[test]
    fn position_is_continuous_across_the_handoff() {
        let sim = simulation(950.0, 2000.0);
        let crossing = sim.spring_start_time();
        let before = sim.position_at(crossing - 1e-9);
        let after = sim.position_at(crossing + 1e-9);
        assert!(
            (before - after).abs() < 1e-3,
            "handoff jumped from {} to {}",
            before,
            after
        );
    }

    #[test]
    fn handoff_velocity_is_capped() {
        let sim = simulation(950.0, 100_000.0);
        let crossing = sim.spring_start_time();
        assert!(crossing.is_finite());
        let handoff = sim.velocity_at(crossing + 1e-9);
        assert!(handoff <= 5000.0 + 1e-6, "handoff velocity {}", handoff);
    }

    // ── constants and helpers ───────────────────────────────────────────

    #[test]
    fn low_drag_is_an_eighth_of_drag() {
        assert_eq!(LOW_DRAG, DRAG / 8.0);
    }

    #[test]
    fn velocity_for_offset_travels_that_offset() {
        let velocity = RubberBandScrollSimulation::velocity_for_offset(100.0);
        let coast = FrictionSimulation::new(LOW_DRAG, 0.0, velocity, Tolerance::default());
        assert!((coast.final_position() - 100.0).abs() < 1e-9);
    }
}
