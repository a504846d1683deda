//! `MapEmbed` — ties the liveness monitor and the relay to one host.
//!
//! ```text
//! page load ──▶ arm() ──▶ host.arm_deadline(5000)
//!
//! frame load ──▶ on_frame_load() ──┬─ LOADED ─▶ relay.engage()
//!                                  │              ├─ updatePosition / updateTheme
//!                                  │              ├─ host.request_roster()
//!                                  │              └─ host.start_roster_interval(30000)
//! frame error ─▶ on_frame_error() ─┤
//! deadline ────▶ on_deadline() ────┴─ FAILED ─▶ host.activate_fallback()
//! ```
//!
//! Every entry point takes `&mut self` and runs to completion.

use crate::config::EmbedConfig;
use crate::error::Result;
use crate::host::EmbedHost;
use crate::liveness::{EmbedState, LivenessMonitor, Transition};
use crate::protocol::{Command, Coordinates, InboundMessage, ViewMode};
use crate::relay::MessageRelay;
use crate::roster::{RosterSnapshot, RosterView};

pub struct MapEmbed<H: EmbedHost> {
    config: EmbedConfig,
    monitor: LivenessMonitor,
    relay: MessageRelay,
    host: H,
}

impl<H: EmbedHost> MapEmbed<H> {
    /// Validate `config` and take ownership of `host`.
    pub fn new(config: EmbedConfig, host: H) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            monitor: LivenessMonitor::new(),
            relay: MessageRelay::new(),
            host,
        })
    }

    // -----------------------------------------------------------------------
    // Liveness
    // -----------------------------------------------------------------------

    /// Start the load deadline. Frame load/error listeners are attached by
    /// the host layer and feed [`on_frame_load`](Self::on_frame_load) and
    /// [`on_frame_error`](Self::on_frame_error).
    pub fn arm(&mut self) {
        if self.monitor.arm() {
            log::debug!("[liveness] armed, deadline {} ms", self.config.deadline_ms);
            self.host.arm_deadline(self.config.deadline_ms);
        }
    }

    pub fn on_frame_load(&mut self) {
        let host = &mut self.host;
        let verdict = self.config.liveness_probe.verdict(|| host.frame_location());
        let transition = self.monitor.on_load(verdict);
        self.apply(transition);
    }

    pub fn on_frame_error(&mut self) {
        let transition = self.monitor.on_error();
        self.apply(transition);
    }

    pub fn on_deadline(&mut self) {
        let transition = self.monitor.on_deadline();
        self.apply(transition);
    }

    fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Loaded => self.relay.engage(&mut self.host, &self.config),
            Transition::Failed => {
                log::info!("[liveness] switching to fallback presentation");
                self.host.activate_fallback();
            }
            Transition::Unchanged => {}
        }
    }

    // -----------------------------------------------------------------------
    // Inbound messages
    // -----------------------------------------------------------------------

    /// A `message` event reached the page. `payload` is the JSON text of
    /// `event.data`.
    pub fn on_message(&mut self, origin: &str, payload: &str) {
        if !MessageRelay::accepts_origin(&self.config, origin) {
            return;
        }
        if self.monitor.state() == EmbedState::Failed {
            log::debug!("[relay] map unavailable, ignoring message");
            return;
        }
        match InboundMessage::parse(payload) {
            Some(message) => self.relay.handle_inbound(&mut self.host, &self.config, message),
            None => log::debug!("[relay] ignoring non-object message"),
        }
    }

    // -----------------------------------------------------------------------
    // User actions
    // -----------------------------------------------------------------------

    pub fn select_view_mode(&mut self, mode: ViewMode) {
        self.relay.select_view_mode(&mut self.host, &self.config, mode);
    }

    pub fn reset_view(&mut self) {
        self.relay.send(&mut self.host, &self.config, &Command::ResetView);
    }

    pub fn toggle_roster_panel(&mut self) {
        self.relay.toggle_panel(&mut self.host, &self.config);
    }

    pub fn teleport_to_player(&mut self, player_id: &str) {
        let command = Command::TeleportToPlayer {
            player_id: player_id.to_string(),
        };
        self.relay.send(&mut self.host, &self.config, &command);
    }

    /// Send any command. Dropped unless the map is loaded.
    pub fn send_command(&mut self, command: &Command) -> bool {
        self.relay.send(&mut self.host, &self.config, command)
    }

    // -----------------------------------------------------------------------
    // Roster polling
    // -----------------------------------------------------------------------

    /// Interval tick.
    pub fn poll_roster(&mut self) {
        self.relay.request_roster(&mut self.host, &self.config);
    }

    /// A fetch started by `EmbedHost::request_roster` finished.
    pub fn roster_loaded(&mut self, result: Result<RosterSnapshot>) {
        self.relay.apply_roster(&mut self.host, &self.config, result);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn state(&self) -> EmbedState {
        self.monitor.state()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.relay.view_mode()
    }

    pub fn coordinates(&self) -> Coordinates {
        self.relay.coordinates()
    }

    pub fn roster(&self) -> Option<&RosterView> {
        self.relay.roster()
    }

    pub fn panel_visible(&self) -> bool {
        self.relay.panel_visible()
    }

    pub fn config(&self) -> &EmbedConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}
