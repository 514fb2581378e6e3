//! Static reference-data adapter.
//!
//! Ships the built-in game types so tests and single-process
//! deployments need no external reference store.

use crate::ports::{DefaultsProvider, GamePreset};
use async_trait::async_trait;
use shared_types::{CoreError, GameDefaults, NpcConfig};
use std::collections::BTreeMap;

/// Built-in game-type identifiers.
pub const GAME_TYPE_SKYFARER: &str = "skyfarer";
pub const GAME_TYPE_INVESTIGATOR: &str = "investigator";

/// In-memory defaults keyed by game type.
#[derive(Debug)]
pub struct StaticDefaults {
    defaults: BTreeMap<String, GameDefaults>,
    presets: Vec<GamePreset>,
}

/// Built-in defaults for the skyfarer game type.
pub fn skyfarer_defaults() -> GameDefaults {
    GameDefaults {
        game_type: GAME_TYPE_SKYFARER.into(),
        gm_character_name: "Gamemaster".into(),
        default_character_name: "Unnamed Character".into(),
        default_npcs: vec![NpcConfig {
            character_name: "Unnamed Ship".into(),
        }],
        theme: "skyfarer".into(),
        remaining_characters: 10,
        remaining_sections: 30,
        remaining_assets: 20,
    }
}

/// Built-in defaults for the investigator game type.
pub fn investigator_defaults() -> GameDefaults {
    GameDefaults {
        game_type: GAME_TYPE_INVESTIGATOR.into(),
        gm_character_name: "Handler".into(),
        default_character_name: "Unnamed Agent".into(),
        default_npcs: vec![],
        theme: "investigator".into(),
        remaining_characters: 10,
        remaining_sections: 30,
        remaining_assets: 20,
    }
}

impl Default for StaticDefaults {
    fn default() -> Self {
        let mut defaults = BTreeMap::new();
        defaults.insert(GAME_TYPE_SKYFARER.to_owned(), skyfarer_defaults());
        defaults.insert(GAME_TYPE_INVESTIGATOR.to_owned(), investigator_defaults());
        Self {
            defaults,
            presets: Vec::new(),
        }
    }
}

impl StaticDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the defaults for one game type (test hook).
    pub fn insert(&mut self, defaults: GameDefaults) {
        self.defaults.insert(defaults.game_type.clone(), defaults);
    }

    pub fn with_presets(mut self, presets: Vec<GamePreset>) -> Self {
        self.presets = presets;
        self
    }
}

#[async_trait]
impl DefaultsProvider for StaticDefaults {
    async fn game_defaults(&self, game_type: &str) -> Result<GameDefaults, CoreError> {
        self.defaults
            .get(game_type)
            .cloned()
            .ok_or_else(|| CoreError::validation(format!("unknown game type: {game_type}")))
    }

    async fn game_presets(
        &self,
        game_type: &str,
        language: &str,
    ) -> Result<Vec<GamePreset>, CoreError> {
        Ok(self
            .presets
            .iter()
            .filter(|p| p.game_type == game_type && p.language == language)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_built_in_types_resolve() {
        let provider = StaticDefaults::new();
        let skyfarer = provider.game_defaults(GAME_TYPE_SKYFARER).await.unwrap();
        assert_eq!(skyfarer.default_npcs.len(), 1);
        let investigator = provider
            .game_defaults(GAME_TYPE_INVESTIGATOR)
            .await
            .unwrap();
        assert!(investigator.default_npcs.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_type_is_validation_error() {
        let provider = StaticDefaults::new();
        let err = provider.game_defaults("chess").await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_insert_overrides_quotas() {
        let mut provider = StaticDefaults::new();
        let mut d = provider.game_defaults(GAME_TYPE_SKYFARER).await.unwrap();
        d.remaining_sections = 3;
        provider.insert(d);
        let d = provider.game_defaults(GAME_TYPE_SKYFARER).await.unwrap();
        assert_eq!(d.remaining_sections, 3);
    }
}
