//! Capabilities the page provides to [`MapEmbed`](crate::MapEmbed).
//!
//! The browser client implements this over `web-sys`; tests implement it
//! with a recorder. Every method is called from inside a single event
//! handler, so implementations never see interleaved calls.
//!
//! Timers and fetches are *requested* here and *delivered* later by the
//! platform calling back into `MapEmbed::on_deadline`, `poll_roster` and
//! `roster_loaded`.

use serde_json::Value;

use crate::error::Result;
use crate::protocol::ViewMode;
use crate::roster::RosterView;

pub trait EmbedHost {
    // ------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------

    /// `frame.contentWindow.postMessage(message, target_origin)`.
    fn post_to_frame(&mut self, message: &Value, target_origin: &str) -> Result<()>;

    /// Location of the frame's document. Cross-origin frames return
    /// `EmbedError::FrameInaccessible`.
    fn frame_location(&mut self) -> Result<String>;

    // ------------------------------------------------------------------
    // Scheduling
    // ------------------------------------------------------------------

    /// Call `MapEmbed::on_deadline` once, `after_ms` from now.
    fn arm_deadline(&mut self, after_ms: u32);

    /// Call `MapEmbed::poll_roster` every `every_ms` for the page lifetime.
    fn start_roster_interval(&mut self, every_ms: u32);

    /// Fetch `url` in the background and hand the result to
    /// `MapEmbed::roster_loaded`.
    fn request_roster(&mut self, url: &str);

    // ------------------------------------------------------------------
    // Presentation
    // ------------------------------------------------------------------

    /// Hide the frame, show the fallback, disable map controls and hide the
    /// roster panel. Must be idempotent.
    fn activate_fallback(&mut self);

    fn render_coordinates(&mut self, rounded: [i64; 3]);

    /// Mark `mode`'s control active and every other view control inactive.
    fn set_active_view(&mut self, mode: ViewMode);

    /// Replace the roster panel contents.
    fn render_roster(&mut self, view: &RosterView);

    fn set_panel_visible(&mut self, visible: bool);
}
