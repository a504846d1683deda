//! Message relay & roster poller.
//!
//! Owns everything the page learns from, or tells, the embedded map:
//! the current view mode, the last reported coordinates, the roster panel
//! contents and its visibility. It is *engaged* exactly once, when the
//! liveness monitor reports `LOADED`; before that every outbound command is
//! dropped.

use crate::config::EmbedConfig;
use crate::error::Result;
use crate::host::EmbedHost;
use crate::protocol::{Command, Coordinates, InboundMessage, ViewMode};
use crate::roster::{self, RosterSnapshot, RosterView};

#[derive(Debug, Default)]
pub struct MessageRelay {
    engaged: bool,
    view_mode: ViewMode,
    coordinates: Coordinates,
    roster: Option<RosterView>,
    panel_visible: bool,
}

impl MessageRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    /// Last rendered roster, `None` before the first render.
    pub fn roster(&self) -> Option<&RosterView> {
        self.roster.as_ref()
    }

    pub fn panel_visible(&self) -> bool {
        self.panel_visible
    }

    // ------------------------------------------------------------------
    // Handoff
    // ------------------------------------------------------------------

    /// Called once when the frame is confirmed loaded: push the initial
    /// camera and theme, fetch the roster and start polling.
    pub fn engage<H: EmbedHost>(&mut self, host: &mut H, config: &EmbedConfig) {
        if self.engaged {
            return;
        }
        self.engaged = true;

        self.send(host, config, &Command::update_position(config.initial_position));
        self.send(
            host,
            config,
            &Command::UpdateTheme {
                theme: config.theme.clone(),
            },
        );
        self.request_roster(host, config);
        host.start_roster_interval(config.roster_interval_ms);
    }

    // ------------------------------------------------------------------
    // Outbound
    // ------------------------------------------------------------------

    /// Post `command` to the frame. Returns `true` if it was handed to the
    /// host successfully.
    pub fn send<H: EmbedHost>(
        &self,
        host: &mut H,
        config: &EmbedConfig,
        command: &Command,
    ) -> bool {
        if !self.engaged {
            log::debug!("[relay] map not loaded, dropping {}", command.kind());
            return false;
        }
        match host.post_to_frame(&command.to_json(), &config.origin) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("[relay] failed to send {} to BlueMap: {e}", command.kind());
                false
            }
        }
    }

    /// User picked a view mode.
    pub fn select_view_mode<H: EmbedHost>(
        &mut self,
        host: &mut H,
        config: &EmbedConfig,
        mode: ViewMode,
    ) {
        self.send(host, config, &Command::view_mode(mode, config.view_transition));
        self.view_mode = mode;
        host.set_active_view(mode);
    }

    // ------------------------------------------------------------------
    // Inbound
    // ------------------------------------------------------------------

    pub fn accepts_origin(config: &EmbedConfig, origin: &str) -> bool {
        origin == config.origin
    }

    /// Apply one already origin-checked message.
    pub fn handle_inbound<H: EmbedHost>(
        &mut self,
        host: &mut H,
        config: &EmbedConfig,
        message: InboundMessage,
    ) {
        match message {
            InboundMessage::Position(at) => {
                self.coordinates = at;
                host.render_coordinates(at.rounded());
            }
            InboundMessage::ViewModeChanged(mode) => {
                self.view_mode = mode;
                host.set_active_view(mode);
            }
            InboundMessage::RosterUpdate(text) => match roster::decode_pushed(&text) {
                Ok(players) => self.show_roster(host, RosterView::from_players(&players, config)),
                Err(e) => log::warn!("[relay] failed to parse player list: {e}"),
            },
            InboundMessage::Unrecognized(tag) => {
                log::debug!("[relay] ignoring message with type '{tag}'");
            }
        }
    }

    // ------------------------------------------------------------------
    // Roster
    // ------------------------------------------------------------------

    /// Flip the roster panel. Opening it also fetches immediately.
    pub fn toggle_panel<H: EmbedHost>(&mut self, host: &mut H, config: &EmbedConfig) {
        self.panel_visible = !self.panel_visible;
        host.set_panel_visible(self.panel_visible);
        if self.panel_visible {
            self.request_roster(host, config);
        }
    }

    pub fn request_roster<H: EmbedHost>(&self, host: &mut H, config: &EmbedConfig) {
        if !self.engaged {
            log::debug!("[roster] map not loaded, skipping fetch");
            return;
        }
        host.request_roster(&config.roster_url());
    }

    pub fn apply_roster<H: EmbedHost>(
        &mut self,
        host: &mut H,
        config: &EmbedConfig,
        result: Result<RosterSnapshot>,
    ) {
        let view = match result {
            Ok(snapshot) => RosterView::from_players(&snapshot.players, config),
            Err(e) => {
                log::warn!("[roster] could not fetch player list: {e}");
                RosterView::Unavailable
            }
        };
        self.show_roster(host, view);
    }

    fn show_roster<H: EmbedHost>(&mut self, host: &mut H, view: RosterView) {
        host.render_roster(&view);
        self.roster = Some(view);
    }
}
