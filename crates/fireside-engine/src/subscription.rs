//! Subscription authorization.
//!
//! Realtime delivery is authorized once, at subscribe time, by
//! re-running the game gate against current membership. The returned
//! filter is applied server-side; clients never choose their own scope.

use crate::domain::{game_role, Role};
use crate::operations::SessionService;
use serde::{Deserialize, Serialize};
use shared_types::{CoreError, Game, Identity, ItemKey};

/// Server-side delivery scope for one subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionFilter {
    pub game_id: String,
    /// Entity kinds the subscriber receives (`kind` discriminator
    /// values, e.g. `SECTION`, or the pseudo-kind for dice rolls).
    pub kinds: Vec<String>,
}

/// Pseudo-kind for dice-roll events; rolls have no stored row.
pub const KIND_DICE_ROLL: &str = "DICEROLL";

impl SessionService {
    /// Authorizes a subscription to one game's events.
    ///
    /// # Errors
    /// `Unauthorized` when the caller is not currently the host or a
    /// player of the game (or the game does not exist; absence is not
    /// revealed).
    pub async fn authorize_subscription(
        &self,
        identity: &Identity,
        game_id: &str,
        kinds: &[&str],
    ) -> Result<SubscriptionFilter, CoreError> {
        if game_id.is_empty() {
            return Err(CoreError::validation("game id is required"));
        }
        let item = self
            .store
            .get(&ItemKey::game(game_id))
            .await?
            .ok_or(CoreError::Unauthorized)?;
        let game = Game::from_item(&item)?;
        game_role(identity, &game).require(&[Role::Owner, Role::Member])?;

        Ok(SubscriptionFilter {
            game_id: game_id.to_owned(),
            kinds: kinds.iter().map(|k| (*k).to_owned()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::game::JoinGameInput;
    use crate::testkit::harness;
    use shared_types::entities::KIND_SECTION;

    #[tokio::test]
    async fn test_member_gets_scoped_filter() {
        let h = harness();
        let gm = Identity::user("gm-1");
        let game = h.create_default_game(&gm).await;
        let filter = h
            .service
            .authorize_subscription(&gm, &game.game_id, &[KIND_SECTION, KIND_DICE_ROLL])
            .await
            .unwrap();
        assert_eq!(filter.game_id, game.game_id);
        assert_eq!(filter.kinds, vec!["SECTION", "DICEROLL"]);
    }

    #[tokio::test]
    async fn test_non_member_is_refused() {
        let h = harness();
        let gm = Identity::user("gm-1");
        let game = h.create_default_game(&gm).await;
        let err = h
            .service
            .authorize_subscription(&Identity::user("stranger"), &game.game_id, &[KIND_SECTION])
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized));
    }

    #[tokio::test]
    async fn test_absent_game_reads_as_unauthorized() {
        let h = harness();
        let err = h
            .service
            .authorize_subscription(&Identity::user("u-1"), "ghost", &[KIND_SECTION])
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized));
    }

    #[tokio::test]
    async fn test_membership_is_current_not_cached() {
        let h = harness();
        let gm = Identity::user("gm-1");
        let player = Identity::user("p-1");
        let game = h.create_default_game(&gm).await;

        assert!(h
            .service
            .authorize_subscription(&player, &game.game_id, &[KIND_SECTION])
            .await
            .is_err());

        h.service
            .join_game(
                &player,
                JoinGameInput::ByCode {
                    join_code: game.join_code.clone().unwrap(),
                },
            )
            .await
            .unwrap();

        assert!(h
            .service
            .authorize_subscription(&player, &game.game_id, &[KIND_SECTION])
            .await
            .is_ok());
    }
}
