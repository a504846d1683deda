//! BlueMap Embed
//!
//! Embeds the BlueMap web frontend in a host page: decides whether the
//! iframe came up, relays `postMessage` commands to it, and keeps a live
//! player roster current.
//!
//! ## Architecture
//!
//! ```text
//! MapEmbed<H: EmbedHost>  (embed.rs)   ← one entry point per page event
//!   ├── LivenessMonitor   (liveness.rs) ← PENDING / LOADED / FAILED
//!   ├── MessageRelay      (relay.rs)    ← view mode, coordinates, roster panel
//!   │     ├── protocol.rs               ← Command / InboundMessage
//!   │     └── roster.rs                 ← players.json, RosterView, RosterSource
//!   └── H: EmbedHost      (host.rs)     ← DOM, postMessage, timers, fetch
//! ```
//!
//! This crate is platform-independent. The browser implementation of
//! [`EmbedHost`] lives in `clients/wasm`.

pub mod config;
pub mod embed;
pub mod error;
pub mod host;
pub mod liveness;
pub mod protocol;
pub mod relay;
pub mod roster;

pub use config::EmbedConfig;
pub use embed::MapEmbed;
pub use error::{EmbedError, Result};
pub use host::EmbedHost;
pub use liveness::{EmbedState, LivenessProbe};
pub use protocol::{Command, Coordinates, InboundMessage, ViewMode};
pub use roster::{HttpResponse, RosterSnapshot, RosterSource, RosterView};
