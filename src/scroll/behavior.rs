use super::bounds::{ScrollBounds, ScrollBoundsProvider};
use super::effect::BouncingScrollEffect;
use crate::simulation::rubber_band::{RubberBandScrollSimulation, DRAG};
use crate::simulation::Simulation;

/// Retained momentum is dropped once the pointer sits still this long
/// mid-drag.
const MOMENTUM_RETAIN_STATIONARY_SECS: f32 = 0.2;
/// A pause this long re-arms the motion-start threshold.
const MOTION_STOPPED_SECS: f32 = 0.05;
/// Deltas past this are deliberate; the threshold never gates them.
const BIG_THRESHOLD_BREAK_DISTANCE: f32 = 24.0;
/// Bounce mode lets content travel this fraction of the viewport past an
/// edge before hard-clamping.
const OVERSCROLL_PADDING_FRACTION: f64 = 0.9;

/// Per-scroll-view state machine tying drags and releases to the physics.
///
/// One instance lives for the lifetime of its view. An external clock drives
/// it once per frame: `manual_update` while the finger is down,
/// `auto_update` while a ballistic deceleration runs. Timestamps must be
/// monotonically non-decreasing; all time bookkeeping is relative, so the
/// clock's origin does not matter.
pub struct ScrollBehavior {
    provider: Box<dyn ScrollBoundsProvider>,
    effect: BouncingScrollEffect,
    bounds: ScrollBounds,
    simulation: Option<RubberBandScrollSimulation>,
    simulation_start_time: f32,
    simulation_bounded: bool,
    drag: f64,
    retain_momentum: bool,
    carried_velocity: f32,
    last_non_stationary_time: f32,
    in_motion: bool,
    motion_start_threshold: Option<f32>,
    offset_since_last_stop: Option<f32>,
    clamp_to_bounds: bool,
}

impl ScrollBehavior {
    pub fn new(provider: Box<dyn ScrollBoundsProvider>) -> Self {
        Self::with_effect(provider, BouncingScrollEffect::default())
    }

    pub fn with_effect(
        provider: Box<dyn ScrollBoundsProvider>,
        effect: BouncingScrollEffect,
    ) -> Self {
        let bounds = provider.scroll_bounds();
        Self {
            provider,
            effect,
            bounds,
            simulation: None,
            simulation_start_time: 0.0,
            simulation_bounded: bounds.bounded(),
            drag: DRAG,
            retain_momentum: false,
            carried_velocity: 0.0,
            last_non_stationary_time: 0.0,
            in_motion: false,
            motion_start_threshold: None,
            offset_since_last_stop: None,
            clamp_to_bounds: false,
        }
    }

    /// Switch between hard-clamped and bouncing overscroll.
    pub fn set_clamp_to_bounds(&mut self, clamp: bool) {
        self.clamp_to_bounds = clamp;
    }

    pub fn clamp_to_bounds(&self) -> bool {
        self.clamp_to_bounds
    }

    /// Whether a ballistic deceleration is currently running.
    pub fn is_decelerating(&self) -> bool {
        self.simulation.is_some()
    }

    pub fn in_motion(&self) -> bool {
        self.in_motion
    }

    /// Velocity the running deceleration reports at `time`; zero when idle.
    pub fn simulation_velocity(&self, time: f32) -> f32 {
        match &self.simulation {
            Some(sim) => {
                sim.velocity_at(f64::from(time - self.simulation_start_time)) as f32
            }
            None => 0.0,
        }
    }

    /// A drag gesture has begun. Captures whatever momentum the running
    /// deceleration still carries so a follow-up fling can build on it, and
    /// arms the motion-start threshold if one is configured.
    pub fn start(&mut self, time: f32, motion_start_threshold: Option<f32>) {
        let velocity = self.simulation_velocity(time);
        self.carried_velocity =
            self.effect.carried_momentum(f64::from(velocity)) as f32;
        self.retain_momentum = self.carried_velocity != 0.0;
        self.motion_start_threshold = motion_start_threshold;
        self.offset_since_last_stop = motion_start_threshold.map(|_| 0.0);
        self.last_non_stationary_time = time;
        self.in_motion = false;
        log::trace!(
            "drag start at t={}: carrying velocity {}",
            time,
            self.carried_velocity
        );
    }

    /// Per-frame position while the user is dragging. `delta` follows the
    /// finger convention: a positive delta lowers the scroll position.
    /// Supersedes any running deceleration.
    pub fn manual_update(&mut self, delta: f32, time: f32) -> f32 {
        self.maybe_lose_momentum(delta, time);
        if delta != 0.0 {
            self.last_non_stationary_time = time;
        }
        let delta = self.adjust_for_scroll_start_threshold(delta, time);
        if delta != 0.0 {
            self.in_motion = true;
        }
        self.bounds = self.provider.scroll_bounds();
        self.simulation = None;
        let damped = self
            .effect
            .apply_physics_to_user_offset(&self.bounds, f64::from(delta));
        self.clamp_position(self.bounds.position - damped) as f32
    }

    /// The drag has been released with `velocity` (finger convention, so it
    /// is negated here). Starts a ballistic deceleration when there is
    /// anything left to decelerate.
    pub fn end(&mut self, velocity: f32, time: f32, drag: f64) {
        let mut velocity = -velocity;
        if self.retain_momentum
            && velocity.signum() == self.carried_velocity.signum()
            && velocity.abs() > self.carried_velocity.abs() * 0.5
        {
            velocity += self.carried_velocity;
        }
        self.retain_momentum = false;
        self.carried_velocity = 0.0;
        self.offset_since_last_stop = None;
        self.bounds = self.provider.scroll_bounds();
        self.go_ballistic(f64::from(velocity), time, drag);
        log::trace!(
            "drag end at t={}: ballistic velocity {}, simulating={}",
            time,
            velocity,
            self.simulation.is_some()
        );
    }

    /// Abandon the gesture with no release velocity.
    pub fn cancel(&mut self, time: f32) {
        self.end(0.0, time, DRAG);
    }

    /// Per-frame position while a deceleration runs. Returns the resting
    /// bounds position once the simulation settles or when none is active.
    pub fn auto_update(&mut self, time: f32) -> f32 {
        self.bounds = self.provider.scroll_bounds();
        let mut sim = match self.simulation {
            Some(sim) => sim,
            None => return self.bounds.position as f32,
        };
        let mut local = f64::from(time - self.simulation_start_time);
        if sim.is_done(local) {
            self.simulation = None;
            self.in_motion = false;
            log::trace!("deceleration settled at t={}", time);
            return self.bounds.position as f32;
        }
        if self.bounds.bounded() != self.simulation_bounded {
            // Content switched between bounded and unbounded mid-flight:
            // restart the deceleration from the current state, local time
            // re-based to zero.
            let velocity = sim.velocity_at(local);
            log::debug!(
                "bounds finiteness changed at t={}; restarting with velocity {}",
                time,
                velocity
            );
            self.go_ballistic(velocity, time, self.drag);
            local = 0.0;
            match self.simulation {
                Some(restarted) => sim = restarted,
                None => {
                    self.in_motion = false;
                    return self.bounds.position as f32;
                }
            }
        }
        self.clamp_position(sim.position_at(local)) as f32
    }

    /// Hard reset of all mutable state; used when the view is reconfigured.
    pub fn reset(&mut self) {
        self.bounds = self.provider.scroll_bounds();
        self.simulation = None;
        self.simulation_start_time = 0.0;
        self.simulation_bounded = self.bounds.bounded();
        self.drag = DRAG;
        self.retain_momentum = false;
        self.carried_velocity = 0.0;
        self.last_non_stationary_time = 0.0;
        self.in_motion = false;
        self.motion_start_threshold = None;
        self.offset_since_last_stop = None;
    }

    fn go_ballistic(&mut self, velocity: f64, time: f32, drag: f64) {
        self.simulation = self.effect.ballistic_simulation(&self.bounds, velocity, drag);
        self.simulation_start_time = time;
        self.simulation_bounded = self.bounds.bounded();
        self.drag = drag;
        self.in_motion = self.simulation.is_some();
    }

    /// Drops retained momentum when the finger has rested long enough.
    fn maybe_lose_momentum(&mut self, delta: f32, time: f32) {
        if self.retain_momentum
            && delta == 0.0
            && time - self.last_non_stationary_time > MOMENTUM_RETAIN_STATIONARY_SECS
        {
            self.retain_momentum = false;
            log::trace!("momentum dropped after stationary pause");
        }
    }

    /// Swallows tiny opening deltas until the accumulated motion since the
    /// last full stop breaks the configured threshold, then eases the
    /// breakout in (capped at a third of the threshold) unless the breaking
    /// delta was plainly deliberate.
    fn adjust_for_scroll_start_threshold(&mut self, delta: f32, time: f32) -> f32 {
        let Some(threshold) = self.motion_start_threshold else {
            return delta;
        };
        if delta == 0.0 {
            if self.offset_since_last_stop.is_none()
                && time - self.last_non_stationary_time > MOTION_STOPPED_SECS
            {
                // Came to a full stop mid-drag: re-arm the threshold.
                self.offset_since_last_stop = Some(0.0);
            }
            return 0.0;
        }
        match self.offset_since_last_stop {
            None => delta,
            Some(accumulated) => {
                let accumulated = accumulated + delta;
                if accumulated.abs() > threshold {
                    self.offset_since_last_stop = None;
                    if delta.abs() > BIG_THRESHOLD_BREAK_DISTANCE {
                        delta
                    } else {
                        delta.signum() * (threshold / 3.0).min(delta.abs())
                    }
                } else {
                    self.offset_since_last_stop = Some(accumulated);
                    0.0
                }
            }
        }
    }

    /// Edge handling for a freshly computed position: motion pushing across
    /// or beyond an edge is mirrored around the crossed bound (or around the
    /// current position when already outside) rather than stopped dead, then
    /// held inside the allowed overscroll envelope.
    fn clamp_position(&self, new_position: f64) -> f64 {
        let ScrollBounds {
            min,
            max,
            position,
            viewport_dimension,
        } = self.bounds;
        let mut target = new_position;
        if position > max && target > position {
            target = 2.0 * target - position;
        } else if position < min && target < position {
            target = 2.0 * target - position;
        } else if target > max && position <= max {
            target = 2.0 * target - max;
        } else if target < min && position >= min {
            target = 2.0 * target - min;
        }
        let padding = if self.clamp_to_bounds {
            0.0
        } else {
            viewport_dimension * OVERSCROLL_PADDING_FRACTION
        };
        target.clamp(min - padding, max + padding)
    }
}
