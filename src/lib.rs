//! Physically-based scroll motion: friction coasting, rubber-band overscroll
//! resistance and spring snap-back, driven by an external per-frame clock.
//!
//! The simulation layer is pure math over `(state, time)`; the only mutable
//! piece is [`ScrollBehavior`], which one scrollable view owns for its
//! lifetime and ticks once per frame.

pub mod config;
pub mod scroll;
pub mod simulation;

pub use config::PhysicsConfig;
pub use scroll::behavior::ScrollBehavior;
pub use scroll::bounds::{Overscroll, ScrollBounds, ScrollBoundsProvider};
pub use scroll::effect::BouncingScrollEffect;
pub use simulation::friction::FrictionSimulation;
pub use simulation::rubber_band::RubberBandScrollSimulation;
pub use simulation::spring::{SpringDescription, SpringSimulation};
pub use simulation::{Simulation, Tolerance};
