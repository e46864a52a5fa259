use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::piece::PieceType;

/// Tunable rule parameters. Missing JSON fields fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Half-move clock value that ends the game as a draw (100 = fifty moves).
    pub fifty_move_limit: u32,
    /// Occurrences of one position that end the game as a draw.
    pub repetition_limit: usize,
    /// Piece a pawn becomes when the caller names none.
    pub default_promotion: PieceType,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            fifty_move_limit: 100,
            repetition_limit: 3,
            default_promotion: PieceType::Queen,
        }
    }
}

impl RulesConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RulesConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fifty_move_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "fifty_move_limit",
                reason: "must be positive".to_string(),
            });
        }
        if self.repetition_limit < 2 {
            return Err(ConfigError::Invalid {
                field: "repetition_limit",
                reason: format!("{} is below 2", self.repetition_limit),
            });
        }
        if !self.default_promotion.is_promotion_target() {
            return Err(ConfigError::Invalid {
                field: "default_promotion",
                reason: format!("{:?} is not a promotion piece", self.default_promotion),
            });
        }
        Ok(())
    }
}
