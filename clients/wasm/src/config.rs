//! Page configuration: the core [`EmbedConfig`] plus the DOM element ids
//! the browser host looks up.
//!
//! Passed from JavaScript as an optional JSON string. Embed keys sit at the
//! top level; element ids go under `elements`:
//!
//! ```json
//! { "worldId": "world", "elements": { "frame": "bluemap-iframe" } }
//! ```

use bluemap_embed::{EmbedConfig, Result, ViewMode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    #[serde(flatten)]
    pub embed: EmbedConfig,
    pub elements: ElementIds,
}

impl PageConfig {
    /// `None` or an empty string yields the defaults.
    pub fn from_json(text: Option<&str>) -> Result<Self> {
        let config = match text.map(str::trim) {
            None | Some("") => Self::default(),
            Some(text) => serde_json::from_str(text)?,
        };
        config.embed.validate()?;
        Ok(config)
    }
}

/// Element ids (and two selectors) of the page chrome. A missing element
/// only disables the feature that uses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementIds {
    pub frame: String,
    pub fallback: String,
    pub player_panel: String,
    pub player_list: String,
    pub coord_x: String,
    pub coord_y: String,
    pub coord_z: String,
    pub btn_perspective: String,
    pub btn_flat: String,
    pub btn_freeflight: String,
    pub btn_reset_view: String,
    pub btn_toggle_players: String,
    pub mobile_warning: String,
    /// CSS selector of the mobile warning's close control.
    pub close_selector: String,
    /// CSS selector of the map control bar.
    pub controls_selector: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            frame: "bluemap-iframe".into(),
            fallback: "map-fallback".into(),
            player_panel: "player-list-panel".into(),
            player_list: "player-list".into(),
            coord_x: "coord-x".into(),
            coord_y: "coord-y".into(),
            coord_z: "coord-z".into(),
            btn_perspective: "btn-perspective".into(),
            btn_flat: "btn-flat".into(),
            btn_freeflight: "btn-freeflight".into(),
            btn_reset_view: "btn-reset-view".into(),
            btn_toggle_players: "btn-toggle-players".into(),
            mobile_warning: "mobile-warning".into(),
            close_selector: ".close-btn".into(),
            controls_selector: ".map-controls".into(),
        }
    }
}

impl ElementIds {
    pub fn view_button(&self, mode: ViewMode) -> &str {
        match mode {
            ViewMode::Perspective => &self.btn_perspective,
            ViewMode::Flat => &self.btn_flat,
            ViewMode::Freeflight => &self.btn_freeflight,
        }
    }

    pub fn coordinates(&self) -> [&str; 3] {
        [&self.coord_x, &self.coord_y, &self.coord_z]
    }
}
