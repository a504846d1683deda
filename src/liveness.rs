//! Embed liveness monitor.
//!
//! ## State machine
//!
//! ```text
//!            load (probe ok)
//!   PENDING ─────────────────▶ LOADED   (terminal)
//!      │
//!      │ error │ deadline │ load (probe failed)
//!      ▼
//!    FAILED                              (terminal)
//! ```
//!
//! The deadline timer is never cancelled. When it fires after a successful
//! load it finds the monitor in `LOADED` and does nothing.

use serde::{Deserialize, Serialize};

use crate::error::{EmbedError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmbedState {
    #[default]
    Pending,
    Loaded,
    Failed,
}

impl EmbedState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, EmbedState::Pending)
    }
}

/// What a single signal did to the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// `PENDING → LOADED`; the relay should be engaged.
    Loaded,
    /// `PENDING → FAILED`; the fallback should be shown.
    Failed,
    /// Already terminal, signal ignored.
    Unchanged,
}

/// How a frame `load` event is confirmed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LivenessProbe {
    /// The load event alone counts as success.
    #[default]
    LoadEvent,
    /// Additionally read the frame's document location. An unreadable
    /// location (cross-origin) or `about:blank` counts as failure.
    DocumentUrl,
}

impl LivenessProbe {
    /// Judge a load event. `location` is only called for `DocumentUrl`.
    pub fn verdict(self, location: impl FnOnce() -> Result<String>) -> Result<()> {
        match self {
            LivenessProbe::LoadEvent => Ok(()),
            LivenessProbe::DocumentUrl => {
                let href = location()?;
                if href.is_empty() || href == "about:blank" {
                    Err(EmbedError::FrameInaccessible(format!(
                        "frame document is still '{href}'"
                    )))
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Sole owner of [`EmbedState`].
#[derive(Debug, Default)]
pub struct LivenessMonitor {
    state: EmbedState,
    armed: bool,
}

impl LivenessMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> EmbedState {
        self.state
    }

    /// Record that the deadline has been armed. Returns `false` when it
    /// already was, so the caller never schedules two deadlines.
    pub fn arm(&mut self) -> bool {
        !std::mem::replace(&mut self.armed, true)
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Frame `load` event, with the probe verdict already computed.
    pub fn on_load(&mut self, verdict: Result<()>) -> Transition {
        if self.state.is_terminal() {
            log::debug!("[liveness] load after {:?} ignored", self.state);
            return Transition::Unchanged;
        }
        match verdict {
            Ok(()) => {
                log::info!("[liveness] BlueMap loaded successfully");
                self.state = EmbedState::Loaded;
                Transition::Loaded
            }
            Err(e) => {
                log::warn!("[liveness] load event did not confirm the map: {e}");
                self.fail()
            }
        }
    }

    /// Frame `error` event.
    pub fn on_error(&mut self) -> Transition {
        if self.state.is_terminal() {
            log::debug!("[liveness] error after {:?} ignored", self.state);
            return Transition::Unchanged;
        }
        log::warn!("[liveness] frame reported a load error");
        self.fail()
    }

    /// Deadline timer fired.
    pub fn on_deadline(&mut self) -> Transition {
        if self.state.is_terminal() {
            return Transition::Unchanged;
        }
        log::warn!("[liveness] map did not load before the deadline");
        self.fail()
    }

    fn fail(&mut self) -> Transition {
        self.state = EmbedState::Failed;
        Transition::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_pending() {
        let m = LivenessMonitor::new();
        assert_eq!(m.state(), EmbedState::Pending);
        assert!(!m.state().is_terminal());
    }

    #[test]
    fn load_then_deadline_stays_loaded() {
        let mut m = LivenessMonitor::new();
        assert_eq!(m.on_load(Ok(())), Transition::Loaded);
        assert_eq!(m.on_deadline(), Transition::Unchanged);
        assert_eq!(m.state(), EmbedState::Loaded);
    }

    #[test]
    fn deadline_then_load_stays_failed() {
        let mut m = LivenessMonitor::new();
        assert_eq!(m.on_deadline(), Transition::Failed);
        assert_eq!(m.on_load(Ok(())), Transition::Unchanged);
        assert_eq!(m.state(), EmbedState::Failed);
    }

    #[test]
    fn error_after_load_is_ignored() {
        let mut m = LivenessMonitor::new();
        m.on_load(Ok(()));
        assert_eq!(m.on_error(), Transition::Unchanged);
        assert_eq!(m.state(), EmbedState::Loaded);
    }

    #[test]
    fn second_error_reports_unchanged() {
        let mut m = LivenessMonitor::new();
        assert_eq!(m.on_error(), Transition::Failed);
        assert_eq!(m.on_error(), Transition::Unchanged);
    }

    #[test]
    fn arm_only_once() {
        let mut m = LivenessMonitor::new();
        assert!(m.arm());
        assert!(!m.arm());
        assert!(m.is_armed());
    }

    // ---------------------------------------------------------------
    // Probe strategies
    // ---------------------------------------------------------------

    #[test]
    fn load_event_probe_never_reads_location() {
        let verdict = LivenessProbe::LoadEvent.verdict(|| panic!("must not be called"));
        assert!(verdict.is_ok());
    }

    #[test]
    fn document_probe_rejects_about_blank() {
        let verdict = LivenessProbe::DocumentUrl.verdict(|| Ok("about:blank".into()));
        assert!(matches!(verdict, Err(EmbedError::FrameInaccessible(_))));
    }

    #[test]
    fn document_probe_treats_security_error_as_failure() {
        let verdict = LivenessProbe::DocumentUrl
            .verdict(|| Err(EmbedError::FrameInaccessible("SecurityError".into())));
        let mut m = LivenessMonitor::new();
        assert_eq!(m.on_load(verdict), Transition::Failed);
    }

    #[test]
    fn document_probe_accepts_real_location() {
        let verdict =
            LivenessProbe::DocumentUrl.verdict(|| Ok("http://66.59.208.121:8100/#world".into()));
        assert!(verdict.is_ok());
    }
}
