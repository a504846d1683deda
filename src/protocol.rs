//! `postMessage` wire protocol between the host page and the BlueMap frame.
//!
//! This module owns **every message that crosses the frame boundary**.
//!
//! | Direction     | Type             | Tags                                                                 |
//! |---------------|------------------|----------------------------------------------------------------------|
//! | page → frame  | [`Command`]      | `updatePosition`, `updateTheme`, `viewMode`, `resetView`, `teleportToPlayer` |
//! | frame → page  | [`InboundMessage`] | `position`/`onPosition`, `viewMode`/`onViewMode`, `playerListUpdate` |
//!
//! ## Design rules
//!
//! 1. Outbound messages are always objects with a camelCase `type` tag.
//! 2. Inbound parsing never fails hard: missing numbers fall back to the
//!    defaults of [`Coordinates::default`], unknown tags become
//!    [`InboundMessage::Unrecognized`].
//! 3. Roster payloads inside `playerListUpdate` stay as raw JSON text here;
//!    decoding them is the roster module's job so a bad payload can be
//!    rejected without touching anything else.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// Default height reported when a position event omits `y`.
pub const DEFAULT_Y: f64 = 64.0;

/// Last known camera position reported by the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coordinates {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Display form: each axis rounded to the nearest integer.
    pub fn rounded(&self) -> [i64; 3] {
        [js_round(self.x), js_round(self.y), js_round(self.z)]
    }
}

impl Default for Coordinates {
    fn default() -> Self {
        Self::new(0.0, DEFAULT_Y, 0.0)
    }
}

/// Round half toward positive infinity, the way browsers' `Math.round` does
/// (`-3.5` becomes `-3`, not `-4`). Non-finite input rounds to `0`.
pub fn js_round(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor as i64 + 1
    } else {
        floor as i64
    }
}

// ---------------------------------------------------------------------------
// View modes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Perspective,
    Flat,
    #[serde(alias = "freeFlight")]
    Freeflight,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Perspective, ViewMode::Flat, ViewMode::Freeflight];

    /// Case-insensitive lookup of the mode names BlueMap reports.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "perspective" => Some(ViewMode::Perspective),
            "flat" => Some(ViewMode::Flat),
            "freeflight" => Some(ViewMode::Freeflight),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Perspective => "perspective",
            ViewMode::Flat => "flat",
            ViewMode::Freeflight => "freeflight",
        }
    }

    /// The BlueMap app method that switches into this mode.
    pub fn command(self) -> ViewCommand {
        match self {
            ViewMode::Perspective => ViewCommand::SetPerspectiveView,
            ViewMode::Flat => ViewCommand::SetFlatView,
            ViewMode::Freeflight => ViewCommand::SetFreeFlight,
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewCommand {
    SetPerspectiveView,
    SetFlatView,
    SetFreeFlight,
}

/// Camera animation applied when switching view modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewTransition {
    /// Duration of the camera transition in milliseconds.
    pub transition: u32,
    /// Height the camera travels through while transitioning.
    pub height_transition: u32,
}

impl Default for ViewTransition {
    fn default() -> Self {
        Self {
            transition: 500,
            height_transition: 256,
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound commands  (page → frame)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    UpdatePosition {
        x: f64,
        y: f64,
        z: f64,
    },
    UpdateTheme {
        theme: String,
    },
    ViewMode {
        command: ViewCommand,
        options: ViewTransition,
    },
    ResetView,
    TeleportToPlayer {
        #[serde(rename = "playerId")]
        player_id: String,
    },
}

impl Command {
    pub fn update_position(at: Coordinates) -> Self {
        Command::UpdatePosition {
            x: at.x,
            y: at.y,
            z: at.z,
        }
    }

    pub fn view_mode(mode: ViewMode, options: ViewTransition) -> Self {
        Command::ViewMode {
            command: mode.command(),
            options,
        }
    }

    /// The `type` tag, for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::UpdatePosition { .. } => "updatePosition",
            Command::UpdateTheme { .. } => "updateTheme",
            Command::ViewMode { .. } => "viewMode",
            Command::ResetView => "resetView",
            Command::TeleportToPlayer { .. } => "teleportToPlayer",
        }
    }

    pub fn to_json(&self) -> Value {
        // A tagged enum of plain fields always serialises.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Inbound events  (frame → page)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Camera moved.
    Position(Coordinates),
    /// User switched camera mode inside the frame.
    ViewModeChanged(ViewMode),
    /// Raw JSON text of a player list pushed by the frame.
    RosterUpdate(String),
    /// Anything we do not understand; carries the tag for logging.
    Unrecognized(String),
}

impl InboundMessage {
    /// Parse the JSON text of a `MessageEvent.data` payload.
    ///
    /// Returns `None` for payloads that are not JSON objects at all.
    pub fn parse(text: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(text).ok()?;
        Self::from_value(&value)
    }

    pub fn from_value(v: &Value) -> Option<Self> {
        let obj = v.as_object()?;
        let tag = obj.get("type").and_then(Value::as_str).unwrap_or("");

        let msg = match tag {
            "position" | "onPosition" => InboundMessage::Position(coordinates_field(v)),
            "viewMode" | "onViewMode" => match obj.get("mode").and_then(Value::as_str) {
                Some(name) => match ViewMode::from_name(name) {
                    Some(mode) => InboundMessage::ViewModeChanged(mode),
                    None => InboundMessage::Unrecognized(format!("{tag}:{name}")),
                },
                None => InboundMessage::Unrecognized(tag.to_string()),
            },
            "playerListUpdate" => match obj.get("players") {
                Some(Value::String(text)) => InboundMessage::RosterUpdate(text.clone()),
                Some(other @ (Value::Array(_) | Value::Object(_))) => {
                    InboundMessage::RosterUpdate(other.to_string())
                }
                _ => InboundMessage::Unrecognized(tag.to_string()),
            },
            // Untagged messages carrying an `x` are position reports.
            _ if obj.contains_key("x") => InboundMessage::Position(coordinates_field(v)),
            _ => InboundMessage::Unrecognized(tag.to_string()),
        };
        Some(msg)
    }
}

// ---------------------------------------------------------------------------
// JSON helpers
// ---------------------------------------------------------------------------

fn coordinates_field(v: &Value) -> Coordinates {
    let fallback = Coordinates::default();
    Coordinates {
        x: float_field(v, "x", fallback.x),
        y: float_field(v, "y", fallback.y),
        z: float_field(v, "z", fallback.z),
    }
}

fn float_field(v: &Value, key: &str, default: f64) -> f64 {
    v.get(key)
        .and_then(Value::as_f64)
        .filter(|f| f.is_finite())
        .unwrap_or(default)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ---------------------------------------------------------------
    // Rounding
    // ---------------------------------------------------------------

    #[test]
    fn rounding_matches_math_round() {
        assert_eq!(js_round(12.7), 13);
        assert_eq!(js_round(-3.2), -3);
        assert_eq!(js_round(2.5), 3);
        assert_eq!(js_round(-3.5), -3);
        assert_eq!(js_round(f64::NAN), 0);
        // Adding 0.5 first would round this up to 1.
        assert_eq!(js_round(0.499_999_999_999_999_94), 0);
        assert_eq!(js_round(-0.5), 0);
    }

    #[test]
    fn placeholder_coordinates() {
        assert_eq!(Coordinates::default().rounded(), [0, 64, 0]);
    }

    // ---------------------------------------------------------------
    // Outbound
    // ---------------------------------------------------------------

    #[test]
    fn update_position_shape() {
        let v = Command::update_position(Coordinates::default()).to_json();
        assert_eq!(v, json!({"type": "updatePosition", "x": 0.0, "y": 64.0, "z": 0.0}));
    }

    #[test]
    fn view_mode_shape() {
        let v = Command::view_mode(ViewMode::Freeflight, ViewTransition::default()).to_json();
        assert_eq!(
            v,
            json!({
                "type": "viewMode",
                "command": "setFreeFlight",
                "options": {"transition": 500, "heightTransition": 256}
            })
        );
    }

    #[test]
    fn reset_and_teleport_shapes() {
        assert_eq!(Command::ResetView.to_json(), json!({"type": "resetView"}));
        let v = Command::TeleportToPlayer {
            player_id: "abc".into(),
        }
        .to_json();
        assert_eq!(v, json!({"type": "teleportToPlayer", "playerId": "abc"}));
    }

    #[test]
    fn theme_shape() {
        let v = Command::UpdateTheme {
            theme: "dark".into(),
        }
        .to_json();
        assert_eq!(v, json!({"type": "updateTheme", "theme": "dark"}));
    }

    // ---------------------------------------------------------------
    // Inbound
    // ---------------------------------------------------------------

    #[test]
    fn tagged_position() {
        let msg = InboundMessage::parse(r#"{"type":"position","x":12.7,"y":64.0,"z":-3.2}"#);
        assert_eq!(
            msg,
            Some(InboundMessage::Position(Coordinates::new(12.7, 64.0, -3.2)))
        );
    }

    #[test]
    fn untagged_position_with_missing_fields() {
        let msg = InboundMessage::from_value(&json!({"x": 5})).unwrap();
        assert_eq!(msg, InboundMessage::Position(Coordinates::new(5.0, 64.0, 0.0)));
    }

    #[test]
    fn non_numeric_fields_default() {
        let msg = InboundMessage::from_value(&json!({"type": "onPosition", "x": "far", "y": null}))
            .unwrap();
        assert_eq!(msg, InboundMessage::Position(Coordinates::new(0.0, 64.0, 0.0)));
    }

    #[test]
    fn zero_height_is_kept() {
        let msg = InboundMessage::from_value(&json!({"type": "position", "x": 1, "y": 0, "z": 2}))
            .unwrap();
        assert_eq!(msg, InboundMessage::Position(Coordinates::new(1.0, 0.0, 2.0)));
    }

    #[test]
    fn view_mode_is_case_insensitive() {
        let msg = InboundMessage::from_value(&json!({"type": "onViewMode", "mode": "FLAT"}));
        assert_eq!(msg, Some(InboundMessage::ViewModeChanged(ViewMode::Flat)));
    }

    #[test]
    fn unknown_view_mode_is_unrecognized() {
        let msg = InboundMessage::from_value(&json!({"type": "viewMode", "mode": "orbit"}));
        assert!(matches!(msg, Some(InboundMessage::Unrecognized(_))));
    }

    #[test]
    fn roster_update_keeps_raw_text() {
        let msg = InboundMessage::from_value(&json!({"type": "playerListUpdate", "players": "[]"}));
        assert_eq!(msg, Some(InboundMessage::RosterUpdate("[]".into())));
    }

    #[test]
    fn unknown_tag_is_unrecognized() {
        let msg = InboundMessage::from_value(&json!({"type": "mapLoaded"}));
        assert_eq!(msg, Some(InboundMessage::Unrecognized("mapLoaded".into())));
    }

    #[test]
    fn non_object_payloads_are_ignored() {
        assert_eq!(InboundMessage::parse("42"), None);
        assert_eq!(InboundMessage::parse("\"hello\""), None);
        assert_eq!(InboundMessage::parse("not json"), None);
    }
}
