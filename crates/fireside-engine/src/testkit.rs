//! Test utilities: a fully wired service over the in-memory adapters.
//!
//! Used by this crate's unit tests and by the workspace test suite.

use crate::adapters::{FixedClock, StaticDefaults, StubBlobStore};
use crate::config::EngineConfig;
use crate::operations::SessionService;
use fireside_dice::SeededSource;
use fireside_store::{MemoryStore, TransactionalStore};
use shared_types::{
    keys, Game, GameSummary, Identity, Item, ItemKey, PlayerSheet, Section,
};
use std::sync::Arc;

/// A service wired to inspectable in-memory adapters.
pub struct TestHarness {
    pub service: SessionService,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<FixedClock>,
}

/// Default harness: seeded RNG, pinned clock, built-in defaults.
pub fn harness() -> TestHarness {
    harness_custom(EngineConfig::default(), StaticDefaults::new())
}

/// Harness whose games grant `quota` sections per sheet.
pub fn harness_with_section_quota(quota: i64) -> TestHarness {
    let mut defaults = StaticDefaults::new();
    for mut d in [
        crate::adapters::static_defaults::skyfarer_defaults(),
        crate::adapters::static_defaults::investigator_defaults(),
    ] {
        d.remaining_sections = quota;
        defaults.insert(d);
    }
    harness_custom(EngineConfig::default(), defaults)
}

/// Harness whose games start with the given quota counters.
pub fn harness_with_quotas(characters: i64, sections: i64, assets: i64) -> TestHarness {
    let mut defaults = StaticDefaults::new();
    for mut d in [
        crate::adapters::static_defaults::skyfarer_defaults(),
        crate::adapters::static_defaults::investigator_defaults(),
    ] {
        d.remaining_characters = characters;
        d.remaining_sections = sections;
        d.remaining_assets = assets;
        defaults.insert(d);
    }
    harness_custom(EngineConfig::default(), defaults)
}

/// Harness with a custom engine config.
pub fn harness_with_config(config: EngineConfig) -> TestHarness {
    harness_custom(config, StaticDefaults::new())
}

/// Fully custom harness.
pub fn harness_custom(config: EngineConfig, defaults: StaticDefaults) -> TestHarness {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::at(1_700_000_000_000));
    let service = SessionService::new(
        Arc::clone(&store) as Arc<dyn TransactionalStore>,
        Arc::clone(&clock) as Arc<dyn crate::ports::Clock>,
        Arc::new(SeededSource::new(42)),
        Arc::new(defaults),
        Arc::new(StubBlobStore),
    )
    .with_config(config);
    TestHarness {
        service,
        store,
        clock,
    }
}

impl TestHarness {
    /// Creates a skyfarer game named "Test Voyage".
    pub async fn create_default_game(&self, gm: &Identity) -> GameSummary {
        self.service
            .create_game(
                gm,
                crate::operations::game::CreateGameInput {
                    name: "Test Voyage".into(),
                    description: "A test session".into(),
                    game_type: "skyfarer".into(),
                },
            )
            .await
            .expect("create test game")
    }

    /// Reads the raw Game row.
    pub async fn game(&self, game_id: &str) -> Game {
        let item = self
            .store
            .get(&ItemKey::game(game_id))
            .await
            .expect("store read")
            .expect("game row");
        Game::from_item(&item).expect("decode game")
    }

    /// Reads every sheet of a game.
    pub async fn sheets(&self, game_id: &str) -> Vec<PlayerSheet> {
        self.query_decoded(game_id, &keys::player_sk_prefix(), PlayerSheet::from_item)
            .await
    }

    /// Reads every section of a game.
    pub async fn sections(&self, game_id: &str) -> Vec<Section> {
        self.query_decoded(game_id, &keys::section_sk_prefix(), Section::from_item)
            .await
    }

    /// Reads one raw item.
    pub async fn item(&self, key: &ItemKey) -> Option<Item> {
        self.store.get(key).await.expect("store read")
    }

    async fn query_decoded<T>(
        &self,
        game_id: &str,
        sk_prefix: &str,
        decode: impl Fn(&Item) -> Result<T, shared_types::StoreError>,
    ) -> Vec<T> {
        let pk = ItemKey::game(game_id).pk;
        self.store
            .query_prefix(&pk, sk_prefix)
            .await
            .expect("store query")
            .iter()
            .map(|item| decode(item).expect("decode item"))
            .collect()
    }
}
