//! Live player roster: wire types, the render model, and the fetch path.
//!
//! The platform supplies a [`RosterSource`] that performs the HTTP `GET`;
//! [`load_snapshot`] owns status checking and decoding so every platform
//! classifies failures the same way.

use std::collections::HashSet;

use futures::future::LocalBoxFuture;
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::EmbedConfig;
use crate::error::{EmbedError, Result};
use crate::protocol::js_round;

pub const NO_PLAYERS_TEXT: &str = "No players online";
pub const UNAVAILABLE_TEXT: &str = "Unable to load players";

// ---------------------------------------------------------------------------
// Wire types  (players.json)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub players: Vec<Player>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub uuid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub position: PlayerPosition,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerPosition {
    #[serde(default, deserialize_with = "number_or_zero")]
    pub x: f64,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub z: f64,
}

fn number_or_zero<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<f64, D::Error> {
    null_as_default(d)
}

/// `null` decodes like a missing key.
fn null_as_default<'de, D, T>(d: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Players pushed through `playerListUpdate` arrive either as a bare array
/// or wrapped like `players.json`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PushedRoster {
    List(Vec<Player>),
    Snapshot(RosterSnapshot),
}

/// Decode the JSON text carried by an inbound `playerListUpdate`.
pub fn decode_pushed(text: &str) -> Result<Vec<Player>> {
    let pushed: PushedRoster = serde_json::from_str(text)?;
    Ok(match pushed {
        PushedRoster::List(players) => players,
        PushedRoster::Snapshot(snapshot) => snapshot.players,
    })
}

// ---------------------------------------------------------------------------
// Render model
// ---------------------------------------------------------------------------

/// One clickable roster row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    /// Sent back in `teleportToPlayer` when the row is activated.
    pub player_id: String,
    pub display_name: String,
    pub avatar_url: String,
    /// Rounded `(x, z)`.
    pub position_label: String,
}

/// What the roster panel shows. Always replaced wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterView {
    Players(Vec<RosterRow>),
    Empty,
    Unavailable,
}

impl RosterView {
    pub fn from_players(players: &[Player], config: &EmbedConfig) -> Self {
        let mut seen = HashSet::new();
        let rows: Vec<RosterRow> = players
            .iter()
            .filter(|p| {
                let fresh = seen.insert(p.uuid.as_str());
                if !fresh {
                    log::debug!("[roster] duplicate player {} dropped", p.uuid);
                }
                fresh
            })
            .map(|p| RosterRow::new(p, config))
            .collect();

        if rows.is_empty() {
            RosterView::Empty
        } else {
            RosterView::Players(rows)
        }
    }

    /// Placeholder text for the non-list states.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            RosterView::Players(_) => None,
            RosterView::Empty => Some(NO_PLAYERS_TEXT),
            RosterView::Unavailable => Some(UNAVAILABLE_TEXT),
        }
    }

    pub fn rows(&self) -> &[RosterRow] {
        match self {
            RosterView::Players(rows) => rows,
            _ => &[],
        }
    }
}

impl RosterRow {
    fn new(player: &Player, config: &EmbedConfig) -> Self {
        let display_name = if player.name.is_empty() {
            player.uuid.clone()
        } else {
            player.name.clone()
        };
        Self {
            player_id: player.uuid.clone(),
            display_name,
            avatar_url: config.avatar_url_for(&player.uuid),
            position_label: format!(
                "({}, {})",
                js_round(player.position.x),
                js_round(player.position.z)
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

/// Raw outcome of an HTTP request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// Performs the `GET` for [`load_snapshot`].
///
/// A transport failure (no response at all) is `EmbedError::Network`.
pub trait RosterSource {
    fn get<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<HttpResponse>>;
}

/// Fetch and decode one roster snapshot.
pub async fn load_snapshot<S: RosterSource + ?Sized>(
    source: &S,
    url: &str,
) -> Result<RosterSnapshot> {
    let response = source.get(url).await?;
    if !response.is_success() {
        return Err(EmbedError::Status(response.status));
    }
    Ok(serde_json::from_str(&response.body)?)
}
