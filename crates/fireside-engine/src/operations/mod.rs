//! Business operations.
//!
//! Each operation is one pipeline: gate stages, then a single business
//! stage whose only side effect is one atomic store call. Input and
//! result types live beside the operations that use them.

pub mod asset;
pub mod dice;
pub mod game;
pub mod notification;
pub mod player;
pub mod section;

use crate::config::EngineConfig;
use crate::ports::{BlobStore, Clock, DefaultsProvider};
use fireside_dice::RandomSource;
use fireside_store::TransactionalStore;
use shared_types::{CoreError, StoreError};
use std::sync::Arc;

/// The session engine: every caller-facing operation hangs off this.
///
/// Stateless between requests; all coordination happens in the store's
/// atomic conditional writes.
pub struct SessionService {
    pub(crate) store: Arc<dyn TransactionalStore>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) rng: Arc<dyn RandomSource>,
    pub(crate) defaults: Arc<dyn DefaultsProvider>,
    pub(crate) blobs: Arc<dyn BlobStore>,
    pub(crate) config: EngineConfig,
}

impl SessionService {
    pub fn new(
        store: Arc<dyn TransactionalStore>,
        clock: Arc<dyn Clock>,
        rng: Arc<dyn RandomSource>,
        defaults: Arc<dyn DefaultsProvider>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            store,
            clock,
            rng,
            defaults,
            blobs,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Creation defaults for a game type, from the reference store.
    pub async fn get_game_defaults(
        &self,
        game_type: &str,
    ) -> Result<shared_types::GameDefaults, CoreError> {
        self.defaults.game_defaults(game_type).await
    }

    /// Localized presets for a game type, from the reference store.
    pub async fn get_game_presets(
        &self,
        game_type: &str,
        language: &str,
    ) -> Result<Vec<crate::ports::GamePreset>, CoreError> {
        self.defaults.game_presets(game_type, language).await
    }
}

/// Maps a cancelled write set to the business error of the operation
/// whose precondition failed.
///
/// `meanings` parallels the write set: `meanings[i]` is returned when
/// operation `i` is the first failed precondition. Store errors that
/// are not cancellations pass through unchanged.
pub(crate) fn map_canceled(err: StoreError, meanings: &[CoreError]) -> CoreError {
    match err.failed_op_index() {
        Some(index) => meanings
            .get(index)
            .cloned()
            .unwrap_or_else(|| CoreError::Store(err)),
        None => CoreError::Store(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::CancelReason;

    #[test]
    fn test_map_canceled_picks_failed_op() {
        let err = StoreError::TransactionCanceled {
            reasons: vec![CancelReason::ConditionFailed, CancelReason::None],
        };
        let mapped = map_canceled(
            err,
            &[
                CoreError::QuotaExceeded {
                    resource: "sections",
                },
                CoreError::Unauthorized,
            ],
        );
        assert!(matches!(
            mapped,
            CoreError::QuotaExceeded {
                resource: "sections"
            }
        ));
    }

    #[test]
    fn test_map_canceled_passes_through_other_errors() {
        let err = StoreError::Internal("io".into());
        assert!(matches!(
            map_canceled(err, &[CoreError::Unauthorized]),
            CoreError::Store(StoreError::Internal(_))
        ));
    }
}
