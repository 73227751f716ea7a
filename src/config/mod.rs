use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::scroll::behavior::ScrollBehavior;
use crate::scroll::bounds::ScrollBoundsProvider;
use crate::scroll::effect::BouncingScrollEffect;
use crate::simulation::spring::SpringDescription;
use crate::simulation::Tolerance;

/// Edge-spring tuning. The defaults give the familiar firm snap-back with a
/// hint of give.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpringConfig {
    #[serde(default = "default_mass")]
    pub mass: f64,
    #[serde(default = "default_stiffness")]
    pub stiffness: f64,
    #[serde(default = "default_damping_ratio")]
    pub damping_ratio: f64,
}

fn default_mass() -> f64 { 0.5 }
fn default_stiffness() -> f64 { 100.0 }
fn default_damping_ratio() -> f64 { 1.1 }

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            mass: default_mass(),
            stiffness: default_stiffness(),
            damping_ratio: default_damping_ratio(),
        }
    }
}

impl From<&SpringConfig> for SpringDescription {
    fn from(config: &SpringConfig) -> Self {
        SpringDescription::with_damping_ratio(
            config.mass,
            config.stiffness,
            config.damping_ratio,
        )
    }
}

/// Settling thresholds for every simulation the engine runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToleranceConfig {
    #[serde(default = "default_tolerance")]
    pub distance: f64,
    #[serde(default = "default_tolerance")]
    pub time: f64,
    #[serde(default = "default_tolerance")]
    pub velocity: f64,
}

fn default_tolerance() -> f64 { 1e-3 }

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            distance: default_tolerance(),
            time: default_tolerance(),
            velocity: default_tolerance(),
        }
    }
}

impl From<&ToleranceConfig> for Tolerance {
    fn from(config: &ToleranceConfig) -> Self {
        Tolerance {
            distance: config.distance,
            time: config.time,
            velocity: config.velocity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DragConfig {
    /// Exponential drag coefficient for flung content.
    #[serde(default = "default_drag")]
    pub drag: f64,
}

fn default_drag() -> f64 { 0.135 }

impl Default for DragConfig {
    fn default() -> Self {
        Self { drag: default_drag() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BehaviorConfig {
    /// Hard-clamp at the content edges instead of bouncing.
    #[serde(default)]
    pub clamp_to_bounds: bool,
    /// Minimum accumulated drag distance before motion starts; absent means
    /// every delta moves content immediately.
    #[serde(default)]
    pub motion_start_distance_threshold: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PhysicsConfig {
    #[serde(default)]
    pub spring: SpringConfig,
    #[serde(default)]
    pub tolerance: ToleranceConfig,
    #[serde(default)]
    pub drag: DragConfig,
    #[serde(default)]
    pub behavior: BehaviorConfig,
}

impl PhysicsConfig {
    pub fn config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("~/.config"));
        base.join("scroll_motion").join("physics.toml")
    }

    pub fn load_or_default() -> Self {
        let path = Self::config_path();
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        log::warn!("Failed to parse config at {:?}: {}", path, e);
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read config at {:?}: {}", path, e);
                }
            }
        }
        Self::default()
    }

    /// Write the tuning back out, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    /// Overscroll effect built from this tuning.
    pub fn effect(&self) -> BouncingScrollEffect {
        BouncingScrollEffect::new((&self.spring).into(), (&self.tolerance).into())
    }

    /// Scroll behavior for one view, tuned by this config. `drag` and the
    /// motion-start threshold travel with each gesture instead, so the view
    /// layer passes those into `end`/`start` itself.
    pub fn scroll_behavior(&self, provider: Box<dyn ScrollBoundsProvider>) -> ScrollBehavior {
        let mut behavior = ScrollBehavior::with_effect(provider, self.effect());
        behavior.set_clamp_to_bounds(self.behavior.clamp_to_bounds);
        behavior
    }
}
