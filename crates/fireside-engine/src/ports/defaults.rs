//! Read-only reference-data port: game-type defaults and presets.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{CoreError, GameDefaults};

/// A named, localized preset data set for one game type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamePreset {
    pub game_type: String,
    pub data_set_name: String,
    pub language: String,
    pub display_name: String,
    /// Opaque JSON payload.
    pub data: String,
}

#[async_trait]
pub trait DefaultsProvider: Send + Sync {
    /// Creation defaults for a game type.
    ///
    /// # Errors
    /// `ValidationError` for an unknown game type.
    async fn game_defaults(&self, game_type: &str) -> Result<GameDefaults, CoreError>;

    /// Presets for a game type in a language (empty when none exist).
    async fn game_presets(
        &self,
        game_type: &str,
        language: &str,
    ) -> Result<Vec<GamePreset>, CoreError>;
}
