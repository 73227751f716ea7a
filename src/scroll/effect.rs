use super::bounds::ScrollBounds;
use crate::simulation::rubber_band::RubberBandScrollSimulation;
use crate::simulation::spring::SpringDescription;
use crate::simulation::Tolerance;

/// iOS-feel overscroll: rubber-banded drag resistance past the edges and
/// spring-backed ballistic release. Stateless; every method is a pure
/// function of the supplied bounds and velocities.
#[derive(Debug, Clone, Copy)]
pub struct BouncingScrollEffect {
    spring: SpringDescription,
    tolerance: Tolerance,
}

impl Default for BouncingScrollEffect {
    fn default() -> Self {
        Self::new(
            SpringDescription::with_damping_ratio(0.5, 100.0, 1.1),
            Tolerance::default(),
        )
    }
}

impl BouncingScrollEffect {
    pub fn new(spring: SpringDescription, tolerance: Tolerance) -> Self {
        Self { spring, tolerance }
    }

    pub fn spring(&self) -> SpringDescription {
        self.spring
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Resistance fades quadratically as the fraction of the viewport
    /// already in overscroll grows.
    fn friction_factor(overscroll_fraction: f64) -> f64 {
        0.52 * (1.0 - overscroll_fraction).powi(2)
    }

    /// Damp a raw drag delta once the content is past its bounds. In-range
    /// movement passes through untouched; pulling back toward the bounds
    /// meets less resistance than digging further out.
    pub fn apply_physics_to_user_offset(&self, bounds: &ScrollBounds, offset: f64) -> f64 {
        if offset == 0.0 || !bounds.out_of_range() {
            return offset;
        }
        let overscroll = bounds.overscroll(offset);
        let friction = if overscroll.easing {
            Self::friction_factor(
                (overscroll.amount - offset.abs()) / bounds.viewport_dimension,
            )
        } else {
            Self::friction_factor(overscroll.amount / bounds.viewport_dimension)
        };
        offset.signum() * Self::apply_friction(overscroll.amount, offset.abs(), friction)
    }

    /// Only the part of the delta that digs deeper than the current
    /// overscroll is damped; anything past that limit passes through whole.
    fn apply_friction(overscroll: f64, mut abs_delta: f64, friction: f64) -> f64 {
        let mut total = 0.0;
        if overscroll > 0.0 {
            let delta_to_limit = overscroll / friction;
            if abs_delta < delta_to_limit {
                return abs_delta * friction;
            }
            total += overscroll;
            abs_delta -= delta_to_limit;
        }
        total + abs_delta
    }

    /// Ballistic deceleration for a release, or None when the content can
    /// simply stay put.
    pub fn ballistic_simulation(
        &self,
        bounds: &ScrollBounds,
        velocity: f64,
        drag: f64,
    ) -> Option<RubberBandScrollSimulation> {
        if velocity.abs() >= self.tolerance.velocity || bounds.out_of_range() {
            Some(RubberBandScrollSimulation::new(
                &self.spring,
                bounds.min,
                bounds.max,
                bounds.position,
                velocity,
                self.tolerance,
                drag,
            ))
        } else {
            None
        }
    }

    /// Share of a previous gesture's residual velocity that a new gesture
    /// inherits. Empirically tuned sub-linear curve, capped at 40 000.
    pub fn carried_momentum(&self, existing_velocity: f64) -> f64 {
        existing_velocity.signum()
            * (0.000816 * existing_velocity.abs().powf(1.967)).min(40_000.0)
    }
}
