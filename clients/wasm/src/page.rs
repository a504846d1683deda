//! `BlueMapPage` — the primary wasm-bindgen export.
//!
//! ## JavaScript usage
//!
//! ```js
//! import init, { BlueMapPage } from './pkg/bluemap_embed_wasm.js';
//!
//! await init();
//!
//! const page = new BlueMapPage(JSON.stringify({ worldId: 'world' }));
//! page.start();
//! ```
//!
//! `start()` attaches the frame's `load`/`error` listeners *before* pointing
//! the frame at BlueMap (when the markup leaves `src` empty), so a fast load
//! is never missed. Keep the object alive for the page lifetime; dropping it
//! removes every listener and timer.

use std::cell::RefCell;
use std::rc::Rc;

use bluemap_embed::{EmbedState, MapEmbed, ViewMode};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::chrome;
use crate::config::PageConfig;
use crate::dom::{DomHost, EventBinding, SharedEmbed};

#[wasm_bindgen]
pub struct BlueMapPage {
    embed: SharedEmbed,
    window: web_sys::Window,
    document: web_sys::Document,
    bindings: Vec<EventBinding>,
    started: bool,
}

#[wasm_bindgen]
impl BlueMapPage {
    /// Create the page controller.
    ///
    /// @param config - optional JSON string, see `PageConfig`
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<BlueMapPage, JsValue> {
        let config = PageConfig::from_json(config.as_deref())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let host = DomHost::new(window.clone(), document.clone(), config.elements);
        let embed =
            MapEmbed::new(config.embed, host).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let embed: SharedEmbed = Rc::new(RefCell::new(embed));
        embed.borrow_mut().host_mut().bind(&embed);

        Ok(Self {
            embed,
            window,
            document,
            bindings: Vec::new(),
            started: false,
        })
    }

    /// Wire the frame, controls and mobile warning, and arm the deadline.
    ///
    /// Safe to call more than once.
    #[wasm_bindgen]
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        let ids = self.embed.borrow().host().ids().clone();
        self.bindings
            .extend(chrome::init_mobile_warning(&self.window, &self.document, &ids));

        let Some(frame) = self
            .document
            .get_element_by_id(&ids.frame)
            .and_then(|el| el.dyn_into::<web_sys::HtmlIFrameElement>().ok())
        else {
            log::warn!("[page] no #{} iframe, map integration disabled", ids.frame);
            return;
        };

        self.listen(&frame, "load", |embed| embed.on_frame_load());
        self.listen(&frame, "error", |embed| embed.on_frame_error());
        self.embed.borrow_mut().arm();

        // Listeners are in place; now it is safe to start loading.
        let src = frame.get_attribute("src").unwrap_or_default();
        if src.is_empty() || src == "about:blank" {
            let service_url = self.embed.borrow().config().service_url.clone();
            frame.set_src(&service_url);
        }

        let embed = Rc::downgrade(&self.embed);
        self.bindings.extend(EventBinding::new(&self.window, "message", move |ev| {
            let Some(ev) = ev.dyn_ref::<web_sys::MessageEvent>() else {
                return;
            };
            let Some(embed) = embed.upgrade() else {
                return;
            };
            let origin = ev.origin();
            // Cheap reject before touching the payload.
            if origin != embed.borrow().config().origin {
                return;
            }
            if let Some(payload) = message_text(&ev.data()) {
                embed.borrow_mut().on_message(&origin, &payload);
            }
        }));

        for mode in ViewMode::ALL {
            if let Some(button) = self.document.get_element_by_id(ids.view_button(mode)) {
                self.listen(&button, "click", move |embed| embed.select_view_mode(mode));
            }
        }
        if let Some(button) = self.document.get_element_by_id(&ids.btn_reset_view) {
            self.listen(&button, "click", |embed| embed.reset_view());
        }
        if let Some(button) = self.document.get_element_by_id(&ids.btn_toggle_players) {
            self.listen(&button, "click", |embed| embed.toggle_roster_panel());
        }

        log::info!("[page] BlueMap embed started");
    }

    /// Ask the map to centre on a player.
    #[wasm_bindgen(js_name = teleportToPlayer)]
    pub fn teleport_to_player(&self, player_id: &str) {
        self.embed.borrow_mut().teleport_to_player(player_id);
    }

    /// `"perspective"` | `"flat"` | `"freeflight"`. Returns `false` for
    /// unknown names.
    #[wasm_bindgen(js_name = setViewMode)]
    pub fn set_view_mode(&self, mode: &str) -> bool {
        match ViewMode::from_name(mode) {
            Some(mode) => {
                self.embed.borrow_mut().select_view_mode(mode);
                true
            }
            None => false,
        }
    }

    #[wasm_bindgen(js_name = resetView)]
    pub fn reset_view(&self) {
        self.embed.borrow_mut().reset_view();
    }

    #[wasm_bindgen(js_name = togglePlayers)]
    pub fn toggle_players(&self) {
        self.embed.borrow_mut().toggle_roster_panel();
    }

    /// `"pending"` | `"loaded"` | `"failed"`
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        match self.embed.borrow().state() {
            EmbedState::Pending => "pending",
            EmbedState::Loaded => "loaded",
            EmbedState::Failed => "failed",
        }
        .into()
    }

    /// Current camera mode name.
    #[wasm_bindgen(js_name = viewMode)]
    pub fn view_mode(&self) -> String {
        self.embed.borrow().view_mode().to_string()
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

impl BlueMapPage {
    /// Run `action` against the embed whenever `event` fires on `target`.
    fn listen(
        &mut self,
        target: &web_sys::EventTarget,
        event: &'static str,
        action: impl Fn(&mut MapEmbed<DomHost>) + 'static,
    ) {
        let embed = Rc::downgrade(&self.embed);
        self.bindings.extend(EventBinding::new(target, event, move |_| {
            if let Some(embed) = embed.upgrade() {
                action(&mut *embed.borrow_mut());
            }
        }));
    }
}

/// JSON text of a `MessageEvent.data`. Senders that post a JSON string are
/// passed through untouched.
fn message_text(data: &JsValue) -> Option<String> {
    if let Some(text) = data.as_string() {
        return Some(text);
    }
    // `JSON.stringify(undefined)` is `undefined`, not a string.
    js_sys::JSON::stringify(data).ok()?.as_string()
}
