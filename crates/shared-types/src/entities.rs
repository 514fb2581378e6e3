//! # Core Domain Entities
//!
//! One logical table holds every row of a game; the `kind` attribute
//! discriminates entity types and [`Record`] is the tagged union over
//! them. Conversions to and from the attribute model live here so that
//! no other crate hand-rolls attribute names.
//!
//! ## Clusters
//!
//! - **Session**: [`Game`], [`PlayerSheet`]
//! - **Sheet content**: [`Section`], [`Asset`]
//! - **Reference data**: [`SystemNotification`], [`GameDefaults`]

use crate::attr::{optional_s, require_n, require_s, AttrValue, Item};
use crate::errors::StoreError;
use crate::keys::{self, ItemKey};
use crate::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// `kind` discriminator values.
pub const KIND_GAME: &str = "GAME";
pub const KIND_SHEET: &str = "SHEET";
pub const KIND_SECTION: &str = "SECTION";
pub const KIND_ASSET: &str = "ASSET";
pub const KIND_NOTIFICATION: &str = "NOTIFICATION";

/// Who a player sheet represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SheetKind {
    /// The session host. Exactly one per game.
    Gm,
    /// A human player.
    Player,
    /// A GM-controlled character; the GM may act for it.
    Npc,
}

impl SheetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SheetKind::Gm => "GM",
            SheetKind::Player => "PLAYER",
            SheetKind::Npc => "NPC",
        }
    }

    pub fn parse(s: &str) -> Result<Self, StoreError> {
        match s {
            "GM" => Ok(SheetKind::Gm),
            "PLAYER" => Ok(SheetKind::Player),
            "NPC" => Ok(SheetKind::Npc),
            _ => Err(StoreError::MalformedItem {
                attr: "sheet_kind".into(),
            }),
        }
    }
}

/// Lifecycle status of an uploaded asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetStatus {
    /// Created; upload ticket issued, bytes not yet confirmed.
    Pending,
    /// Variant generation in progress. Not deletable.
    Finalising,
    /// Fully processed and referenced by its section.
    Ready,
    /// The upload never completed before the deadline.
    Expired,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Pending => "PENDING",
            AssetStatus::Finalising => "FINALISING",
            AssetStatus::Ready => "READY",
            AssetStatus::Expired => "EXPIRED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, StoreError> {
        match s {
            "PENDING" => Ok(AssetStatus::Pending),
            "FINALISING" => Ok(AssetStatus::Finalising),
            "READY" => Ok(AssetStatus::Ready),
            "EXPIRED" => Ok(AssetStatus::Expired),
            _ => Err(StoreError::MalformedItem {
                attr: "status".into(),
            }),
        }
    }
}

// =============================================================================
// GAME
// =============================================================================

/// The shared session row. Holds membership and the three quota
/// counters; counters only ever change inside conditional write sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub game_id: String,
    pub name: String,
    pub description: String,
    pub game_type: String,
    pub gm_user_id: String,
    pub join_code: String,
    pub join_token: String,
    pub players: BTreeSet<String>,
    pub remaining_characters: i64,
    /// Per-sheet section allowance granted to new sheets of this game.
    pub remaining_sections: i64,
    pub remaining_assets: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Game {
    pub fn key(&self) -> ItemKey {
        ItemKey::game(&self.game_id)
    }

    pub fn is_member(&self, sub: &str) -> bool {
        self.gm_user_id == sub || self.players.contains(sub)
    }

    pub fn to_item(&self) -> Item {
        let key = self.key();
        let mut item = Item::new();
        item.insert("pk".into(), AttrValue::s(key.pk));
        item.insert("sk".into(), AttrValue::s(key.sk));
        item.insert("kind".into(), AttrValue::s(KIND_GAME));
        item.insert("game_id".into(), AttrValue::s(&self.game_id));
        item.insert("game_name".into(), AttrValue::s(&self.name));
        item.insert("game_description".into(), AttrValue::s(&self.description));
        item.insert("game_type".into(), AttrValue::s(&self.game_type));
        item.insert("gm_user_id".into(), AttrValue::s(&self.gm_user_id));
        item.insert("join_code".into(), AttrValue::s(&self.join_code));
        item.insert(
            keys::INDEX_ATTR.into(),
            AttrValue::s(keys::join_index_value(&self.join_code)),
        );
        item.insert("join_token".into(), AttrValue::s(&self.join_token));
        item.insert(
            "players".into(),
            AttrValue::StringSet(self.players.clone()),
        );
        item.insert(
            "remaining_characters".into(),
            AttrValue::N(self.remaining_characters),
        );
        item.insert(
            "remaining_sections".into(),
            AttrValue::N(self.remaining_sections),
        );
        item.insert(
            "remaining_assets".into(),
            AttrValue::N(self.remaining_assets),
        );
        item.insert("created_at".into(), AttrValue::N(self.created_at as i64));
        item.insert("updated_at".into(), AttrValue::N(self.updated_at as i64));
        item
    }

    pub fn from_item(item: &Item) -> Result<Self, StoreError> {
        Ok(Game {
            game_id: require_s(item, "game_id")?,
            name: require_s(item, "game_name")?,
            description: require_s(item, "game_description")?,
            game_type: require_s(item, "game_type")?,
            gm_user_id: require_s(item, "gm_user_id")?,
            join_code: require_s(item, "join_code")?,
            join_token: require_s(item, "join_token")?,
            players: item
                .get("players")
                .and_then(AttrValue::as_string_set)
                .cloned()
                .unwrap_or_default(),
            remaining_characters: require_n(item, "remaining_characters")?,
            remaining_sections: require_n(item, "remaining_sections")?,
            remaining_assets: require_n(item, "remaining_assets")?,
            created_at: require_n(item, "created_at")? as Timestamp,
            updated_at: require_n(item, "updated_at")? as Timestamp,
        })
    }

    /// Caller-facing view; the join token is a capability and never
    /// leaves the core except through `updateJoinCode`/`createGame`.
    pub fn summary(&self) -> GameSummary {
        GameSummary {
            game_id: self.game_id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            game_type: self.game_type.clone(),
            gm_user_id: self.gm_user_id.clone(),
            join_code: None,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Wire-facing summary of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub game_id: String,
    pub name: String,
    pub description: String,
    pub game_type: String,
    pub gm_user_id: String,
    /// Present only on responses to the GM (create/updateJoinCode).
    pub join_code: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// =============================================================================
// PLAYER SHEET
// =============================================================================

/// A character record scoped to one game: the GM, a human player, or a
/// GM-controlled NPC. Carries a denormalized shadow of the game name so
/// sheet listings render without a second read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSheet {
    pub game_id: String,
    pub user_id: String,
    pub kind: SheetKind,
    pub character_name: String,
    pub game_name: String,
    pub game_description: String,
    pub game_type: String,
    pub gm_user_id: String,
    pub remaining_sections: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PlayerSheet {
    pub fn key(&self) -> ItemKey {
        ItemKey::player_sheet(&self.game_id, &self.user_id)
    }

    pub fn to_item(&self) -> Item {
        let key = self.key();
        let mut item = Item::new();
        item.insert("pk".into(), AttrValue::s(key.pk));
        item.insert("sk".into(), AttrValue::s(key.sk));
        item.insert("kind".into(), AttrValue::s(KIND_SHEET));
        item.insert("game_id".into(), AttrValue::s(&self.game_id));
        item.insert("user_id".into(), AttrValue::s(&self.user_id));
        item.insert("sheet_kind".into(), AttrValue::s(self.kind.as_str()));
        item.insert("character_name".into(), AttrValue::s(&self.character_name));
        item.insert("game_name".into(), AttrValue::s(&self.game_name));
        item.insert(
            "game_description".into(),
            AttrValue::s(&self.game_description),
        );
        item.insert("game_type".into(), AttrValue::s(&self.game_type));
        item.insert("gm_user_id".into(), AttrValue::s(&self.gm_user_id));
        // NPC sheets have synthetic user ids; only real users get an
        // index entry for the "my games" listing.
        if self.kind != SheetKind::Npc {
            item.insert(
                keys::INDEX_ATTR.into(),
                AttrValue::s(keys::user_index_value(&self.user_id)),
            );
        }
        item.insert(
            "remaining_sections".into(),
            AttrValue::N(self.remaining_sections),
        );
        item.insert("created_at".into(), AttrValue::N(self.created_at as i64));
        item.insert("updated_at".into(), AttrValue::N(self.updated_at as i64));
        item
    }

    pub fn from_item(item: &Item) -> Result<Self, StoreError> {
        Ok(PlayerSheet {
            game_id: require_s(item, "game_id")?,
            user_id: require_s(item, "user_id")?,
            kind: SheetKind::parse(&require_s(item, "sheet_kind")?)?,
            character_name: require_s(item, "character_name")?,
            game_name: require_s(item, "game_name")?,
            game_description: require_s(item, "game_description")?,
            game_type: require_s(item, "game_type")?,
            gm_user_id: require_s(item, "gm_user_id")?,
            remaining_sections: require_n(item, "remaining_sections")?,
            created_at: require_n(item, "created_at")? as Timestamp,
            updated_at: require_n(item, "updated_at")? as Timestamp,
        })
    }

    pub fn summary(&self) -> PlayerSheetSummary {
        PlayerSheetSummary {
            game_id: self.game_id.clone(),
            user_id: self.user_id.clone(),
            kind: self.kind,
            character_name: self.character_name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Wire-facing summary of a player sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSheetSummary {
    pub game_id: String,
    pub user_id: String,
    pub kind: SheetKind,
    pub character_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// =============================================================================
// SECTION
// =============================================================================

/// A typed, ordered block of sheet content owned by one player sheet.
///
/// `player_type` denormalizes the owner sheet's kind so the GM-override
/// check on NPC sections needs no extra read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub game_id: String,
    pub section_id: String,
    pub user_id: String,
    pub section_name: String,
    pub section_type: String,
    pub position: i64,
    /// Opaque JSON payload; the core never interprets it.
    pub content: String,
    pub player_type: SheetKind,
    pub assets: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Section {
    pub fn key(&self) -> ItemKey {
        ItemKey::section(&self.game_id, &self.section_id)
    }

    pub fn to_item(&self) -> Item {
        let key = self.key();
        let mut item = Item::new();
        item.insert("pk".into(), AttrValue::s(key.pk));
        item.insert("sk".into(), AttrValue::s(key.sk));
        item.insert("kind".into(), AttrValue::s(KIND_SECTION));
        item.insert("game_id".into(), AttrValue::s(&self.game_id));
        item.insert("section_id".into(), AttrValue::s(&self.section_id));
        item.insert("user_id".into(), AttrValue::s(&self.user_id));
        item.insert("section_name".into(), AttrValue::s(&self.section_name));
        item.insert("section_type".into(), AttrValue::s(&self.section_type));
        item.insert("position".into(), AttrValue::N(self.position));
        item.insert("content".into(), AttrValue::s(&self.content));
        item.insert(
            keys::INDEX_ATTR.into(),
            AttrValue::s(keys::section_user_index_value(&self.user_id)),
        );
        item.insert("player_type".into(), AttrValue::s(self.player_type.as_str()));
        item.insert("assets".into(), AttrValue::string_list(self.assets.clone()));
        item.insert("created_at".into(), AttrValue::N(self.created_at as i64));
        item.insert("updated_at".into(), AttrValue::N(self.updated_at as i64));
        item
    }

    pub fn from_item(item: &Item) -> Result<Self, StoreError> {
        let assets = item
            .get("assets")
            .and_then(AttrValue::as_list)
            .map(|list| {
                list.iter()
                    .filter_map(|v| v.as_s().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default();
        Ok(Section {
            game_id: require_s(item, "game_id")?,
            section_id: require_s(item, "section_id")?,
            user_id: require_s(item, "user_id")?,
            section_name: require_s(item, "section_name")?,
            section_type: require_s(item, "section_type")?,
            position: require_n(item, "position")?,
            content: require_s(item, "content")?,
            player_type: SheetKind::parse(&require_s(item, "player_type")?)?,
            assets,
            created_at: require_n(item, "created_at")? as Timestamp,
            updated_at: require_n(item, "updated_at")? as Timestamp,
        })
    }
}

// =============================================================================
// ASSET
// =============================================================================

/// An uploaded binary attached to one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub game_id: String,
    pub asset_id: String,
    pub section_id: String,
    pub status: AssetStatus,
    pub mime_type: String,
    pub size_bytes: i64,
    pub label: Option<String>,
    pub bucket: String,
    pub original_key: String,
    pub variants_prefix: String,
    /// Deadline after which the external sweeper expires a Pending upload.
    pub cleanup_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Asset {
    pub fn key(&self) -> ItemKey {
        ItemKey::asset(&self.game_id, &self.asset_id)
    }

    pub fn to_item(&self) -> Item {
        let key = self.key();
        let mut item = Item::new();
        item.insert("pk".into(), AttrValue::s(key.pk));
        item.insert("sk".into(), AttrValue::s(key.sk));
        item.insert("kind".into(), AttrValue::s(KIND_ASSET));
        item.insert("game_id".into(), AttrValue::s(&self.game_id));
        item.insert("asset_id".into(), AttrValue::s(&self.asset_id));
        item.insert("section_id".into(), AttrValue::s(&self.section_id));
        item.insert("status".into(), AttrValue::s(self.status.as_str()));
        item.insert("mime_type".into(), AttrValue::s(&self.mime_type));
        item.insert("size_bytes".into(), AttrValue::N(self.size_bytes));
        match &self.label {
            Some(label) => item.insert("label".into(), AttrValue::s(label)),
            None => item.insert("label".into(), AttrValue::Null),
        };
        item.insert("bucket".into(), AttrValue::s(&self.bucket));
        item.insert("original_key".into(), AttrValue::s(&self.original_key));
        item.insert(
            "variants_prefix".into(),
            AttrValue::s(&self.variants_prefix),
        );
        item.insert("cleanup_at".into(), AttrValue::N(self.cleanup_at as i64));
        item.insert("created_at".into(), AttrValue::N(self.created_at as i64));
        item.insert("updated_at".into(), AttrValue::N(self.updated_at as i64));
        item
    }

    pub fn from_item(item: &Item) -> Result<Self, StoreError> {
        Ok(Asset {
            game_id: require_s(item, "game_id")?,
            asset_id: require_s(item, "asset_id")?,
            section_id: require_s(item, "section_id")?,
            status: AssetStatus::parse(&require_s(item, "status")?)?,
            mime_type: require_s(item, "mime_type")?,
            size_bytes: require_n(item, "size_bytes")?,
            label: optional_s(item, "label"),
            bucket: require_s(item, "bucket")?,
            original_key: require_s(item, "original_key")?,
            variants_prefix: require_s(item, "variants_prefix")?,
            cleanup_at: require_n(item, "cleanup_at")? as Timestamp,
            created_at: require_n(item, "created_at")? as Timestamp,
            updated_at: require_n(item, "updated_at")? as Timestamp,
        })
    }
}

// =============================================================================
// REFERENCE DATA
// =============================================================================

/// Singleton banner shown to every user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemNotification {
    pub urgent: bool,
    pub message: String,
    pub updated_at: Timestamp,
}

impl SystemNotification {
    pub fn to_item(&self) -> Item {
        let key = ItemKey::system_notification();
        let mut item = Item::new();
        item.insert("pk".into(), AttrValue::s(key.pk));
        item.insert("sk".into(), AttrValue::s(key.sk));
        item.insert("kind".into(), AttrValue::s(KIND_NOTIFICATION));
        item.insert("urgent".into(), AttrValue::Bool(self.urgent));
        item.insert("message".into(), AttrValue::s(&self.message));
        item.insert("updated_at".into(), AttrValue::N(self.updated_at as i64));
        item
    }

    pub fn from_item(item: &Item) -> Result<Self, StoreError> {
        Ok(SystemNotification {
            urgent: item
                .get("urgent")
                .and_then(AttrValue::as_bool)
                .unwrap_or(false),
            message: require_s(item, "message")?,
            updated_at: require_n(item, "updated_at")? as Timestamp,
        })
    }
}

/// One default NPC stamped into a freshly created game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcConfig {
    pub character_name: String,
}

/// Per-game-type creation defaults from the read-only reference store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDefaults {
    pub game_type: String,
    pub gm_character_name: String,
    pub default_character_name: String,
    pub default_npcs: Vec<NpcConfig>,
    pub theme: String,
    pub remaining_characters: i64,
    pub remaining_sections: i64,
    pub remaining_assets: i64,
}

// =============================================================================
// TAGGED UNION
// =============================================================================

/// A decoded row of the table.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Game(Game),
    PlayerSheet(PlayerSheet),
    Section(Section),
    Asset(Asset),
    SystemNotification(SystemNotification),
}

impl Record {
    /// Decodes an item by its `kind` discriminator.
    pub fn from_item(item: &Item) -> Result<Self, StoreError> {
        match require_s(item, "kind")?.as_str() {
            KIND_GAME => Ok(Record::Game(Game::from_item(item)?)),
            KIND_SHEET => Ok(Record::PlayerSheet(PlayerSheet::from_item(item)?)),
            KIND_SECTION => Ok(Record::Section(Section::from_item(item)?)),
            KIND_ASSET => Ok(Record::Asset(Asset::from_item(item)?)),
            KIND_NOTIFICATION => Ok(Record::SystemNotification(
                SystemNotification::from_item(item)?,
            )),
            _ => Err(StoreError::MalformedItem {
                attr: "kind".into(),
            }),
        }
    }
}
