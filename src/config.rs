use serde::Deserialize;

use crate::error::{GameError, Result};

pub const DEFAULT_TURN_TICKS: u32 = 30;
pub const DEFAULT_WARNING_TICKS: u32 = 10;

/// Session tuning. Missing fields take their defaults, so `{}` from JS is a
/// valid config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// One-second ticks a player gets before a forced move.
    pub turn_ticks: u32,
    /// Remaining ticks at or below which the timer reports a warning.
    pub warning_ticks: u32,
    /// Fixed seed for the forced-move RNG. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            turn_ticks: DEFAULT_TURN_TICKS,
            warning_ticks: DEFAULT_WARNING_TICKS,
            rng_seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        if self.turn_ticks == 0 {
            return Err(GameError::InvalidConfig("turn_ticks must be positive".to_string()));
        }
        if self.warning_ticks > self.turn_ticks {
            return Err(GameError::InvalidConfig(format!(
                "warning_ticks ({}) exceeds turn_ticks ({})",
                self.warning_ticks, self.turn_ticks
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_thirty_second_turns() {
        let config = GameConfig::default();

        assert_eq!(config.turn_ticks, 30);
        assert_eq!(config.warning_ticks, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"rng_seed": 7}"#).unwrap();

        assert_eq!(config.turn_ticks, DEFAULT_TURN_TICKS);
        assert_eq!(config.rng_seed, Some(7));
    }

    #[test]
    fn validate_rejects_inconsistent_ticks() {
        let zero = GameConfig { turn_ticks: 0, warning_ticks: 0, rng_seed: None };
        assert!(matches!(zero.validate(), Err(GameError::InvalidConfig(_))));

        let warn = GameConfig { turn_ticks: 5, warning_ticks: 6, rng_seed: None };
        assert!(matches!(warn.validate(), Err(GameError::InvalidConfig(_))));
    }
}
