//! Browser host for the BlueMap embed.
//!
//! Wires the page's `#bluemap-iframe`, its view/reset/roster controls and the
//! roster panel to [`bluemap_embed::MapEmbed`]:
//!
//! - [`dom::DomHost`] implements `EmbedHost` on top of `web-sys`
//! - [`fetch::FetchSource`] loads `players.json` through `window.fetch`
//! - [`page::BlueMapPage`] is the object JavaScript constructs and starts
//! - [`chrome`] handles the mobile warning banner
//!
//! Build with `wasm-pack build --target web --release`, then from the page:
//! `new BlueMapPage(JSON.stringify(config)).start()`.

pub use console_error_panic_hook::set_once as set_panic_hook;

pub mod chrome;
pub mod config;
pub mod dom;
pub mod fetch;
pub mod page;

pub use page::BlueMapPage;

use wasm_bindgen::prelude::*;

/// Runs on `init()`: panic messages and `log` records go to the browser
/// console.
#[wasm_bindgen(start)]
pub fn wasm_main() {
    set_panic_hook();
    console_log::init_with_level(log::Level::Debug).ok();
    log::info!("[page] bluemap-embed-wasm ready");
}
