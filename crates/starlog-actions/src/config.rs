//! Gameplay tuning knobs.
//!
//! A small flat table of numbers supplied per profile. It is deserialized
//! from the `gameplay` section of the engine config and of each profile's
//! config file.

use serde::Deserialize;

use crate::error::ActionsError;

/// Tuning applied by the tick executor and the level curve.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameplayConfig {
    /// Experience granted by every tick.
    #[serde(default = "default_xp_per_tick")]
    pub xp_per_tick: i64,

    /// Power drained by every tick.
    #[serde(default = "default_power_loss_per_tick")]
    pub power_loss_per_tick: i64,

    /// Probability in `[0, 1]` that a tick damages the hull.
    #[serde(default = "default_anomaly_chance")]
    pub anomaly_chance: f64,

    /// Hull damage when an anomaly fires.
    #[serde(default = "default_anomaly_hull_loss")]
    pub anomaly_hull_loss: i64,

    /// Scale of the triangular level curve. Level `L` needs
    /// `base * L * (L - 1) / 2` experience.
    #[serde(default = "default_xp_level_base")]
    pub xp_level_base: i64,
}

const fn default_xp_per_tick() -> i64 {
    5
}

const fn default_power_loss_per_tick() -> i64 {
    1
}

const fn default_anomaly_chance() -> f64 {
    0.5
}

const fn default_anomaly_hull_loss() -> i64 {
    1
}

const fn default_xp_level_base() -> i64 {
    10
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            xp_per_tick: default_xp_per_tick(),
            power_loss_per_tick: default_power_loss_per_tick(),
            anomaly_chance: default_anomaly_chance(),
            anomaly_hull_loss: default_anomaly_hull_loss(),
            xp_level_base: default_xp_level_base(),
        }
    }
}

impl GameplayConfig {
    /// Check every knob is within its legal range.
    pub fn validate(&self) -> Result<(), ActionsError> {
        if !(0.0..=1.0).contains(&self.anomaly_chance) {
            return Err(ActionsError::InvalidConfig {
                field: "anomaly_chance",
                reason: "must be within [0, 1]",
            });
        }
        if self.xp_per_tick < 0 {
            return Err(ActionsError::InvalidConfig {
                field: "xp_per_tick",
                reason: "must be >= 0",
            });
        }
        if self.power_loss_per_tick < 0 {
            return Err(ActionsError::InvalidConfig {
                field: "power_loss_per_tick",
                reason: "must be >= 0",
            });
        }
        if self.anomaly_hull_loss < 0 {
            return Err(ActionsError::InvalidConfig {
                field: "anomaly_hull_loss",
                reason: "must be >= 0",
            });
        }
        if self.xp_level_base < 1 {
            return Err(ActionsError::InvalidConfig {
                field: "xp_level_base",
                reason: "must be >= 1",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_tuning() {
        let cfg = GameplayConfig::default();
        assert_eq!(cfg.xp_per_tick, 5);
        assert_eq!(cfg.power_loss_per_tick, 1);
        assert!((cfg.anomaly_chance - 0.5).abs() < f64::EPSILON);
        assert_eq!(cfg.anomaly_hull_loss, 1);
        assert_eq!(cfg.xp_level_base, 10);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let cfg: GameplayConfig = serde_yml::from_str("xp_per_tick: 20\nanomaly_chance: 0.0\n").unwrap();
        assert_eq!(cfg.xp_per_tick, 20);
        assert!(cfg.anomaly_chance.abs() < f64::EPSILON);
        assert_eq!(cfg.xp_level_base, 10);
    }

    #[test]
    fn out_of_range_knobs_are_rejected() {
        let chance = GameplayConfig {
            anomaly_chance: 1.5,
            ..GameplayConfig::default()
        };
        assert!(matches!(
            chance.validate(),
            Err(ActionsError::InvalidConfig { field: "anomaly_chance", .. })
        ));

        let base = GameplayConfig {
            xp_level_base: 0,
            ..GameplayConfig::default()
        };
        assert!(matches!(
            base.validate(),
            Err(ActionsError::InvalidConfig { field: "xp_level_base", .. })
        ));
    }
}
