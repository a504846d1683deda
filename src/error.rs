//! Error type shared by the core and the browser host.
//!
//! Nothing in this crate lets an `EmbedError` reach the page: `MapEmbed`
//! logs and absorbs every failure. The type exists so host operations can
//! report *what* went wrong in a structured way.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbedError {
    /// The configuration was rejected by `EmbedConfig::validate`.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The embedded frame's document could not be inspected (cross-origin
    /// restriction, missing content window, still on `about:blank`).
    #[error("embedded frame is not accessible: {0}")]
    FrameInaccessible(String),

    /// `postMessage` into the frame threw.
    #[error("failed to post message to embedded frame: {0}")]
    Post(String),

    /// The roster request never produced a response.
    #[error("roster request failed: {0}")]
    Network(String),

    /// The roster endpoint answered with a non-2xx status.
    #[error("roster endpoint returned HTTP {0}")]
    Status(u16),

    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EmbedError>;
