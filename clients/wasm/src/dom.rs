//! `DomHost` — the browser implementation of [`EmbedHost`].
//!
//! ## Threading model
//!
//! WASM is single-threaded. The embed lives in an `Rc<RefCell<…>>`;
//! every timer, listener and fetch continuation holds a `Weak` to it and
//! takes the one `borrow_mut()` for the duration of its handler.
//!
//! ```text
//! setTimeout(deadline)      ──▶ embed.on_deadline()
//! setInterval(roster poll)  ──▶ embed.poll_roster() ──▶ request_roster()
//! spawn_local(fetch)        ──▶ embed.roster_loaded(result)
//! row click                 ──▶ embed.teleport_to_player(id)
//! ```
//!
//! Every element is looked up when needed; a missing element is skipped.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use bluemap_embed::{
    roster::{self, RosterRow},
    EmbedError, EmbedHost, MapEmbed, Result, RosterView, ViewMode,
};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::config::ElementIds;
use crate::fetch::FetchSource;

pub type SharedEmbed = Rc<RefCell<MapEmbed<DomHost>>>;
type WeakEmbed = Weak<RefCell<MapEmbed<DomHost>>>;

// ---------------------------------------------------------------------------
// Event bindings
// ---------------------------------------------------------------------------

/// An event listener that is removed again when dropped.
pub struct EventBinding {
    target: web_sys::EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl EventBinding {
    pub fn new(
        target: &web_sys::EventTarget,
        event: &'static str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Option<Self> {
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
        match target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref()) {
            Ok(()) => Some(Self {
                target: target.clone(),
                event,
                callback,
            }),
            Err(e) => {
                log::warn!("[dom] could not listen for '{}': {:?}", event, e);
                None
            }
        }
    }
}

impl Drop for EventBinding {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback(
            self.event,
            self.callback.as_ref().unchecked_ref(),
        );
    }
}

// ---------------------------------------------------------------------------
// Timers
// ---------------------------------------------------------------------------

struct Timer {
    handle: i32,
    repeating: bool,
    _callback: Closure<dyn FnMut()>,
}

impl Timer {
    fn start(
        window: &web_sys::Window,
        ms: u32,
        repeating: bool,
        f: impl FnMut() + 'static,
    ) -> Option<Self> {
        let callback = Closure::<dyn FnMut()>::new(f);
        let function: &js_sys::Function = callback.as_ref().unchecked_ref();
        let ms = i32::try_from(ms).unwrap_or(i32::MAX);
        let handle = if repeating {
            window.set_interval_with_callback_and_timeout_and_arguments_0(function, ms)
        } else {
            window.set_timeout_with_callback_and_timeout_and_arguments_0(function, ms)
        };
        match handle {
            Ok(handle) => Some(Self {
                handle,
                repeating,
                _callback: callback,
            }),
            Err(e) => {
                log::error!("[dom] failed to schedule timer: {:?}", e);
                None
            }
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            if self.repeating {
                window.clear_interval_with_handle(self.handle);
            } else {
                window.clear_timeout_with_handle(self.handle);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// DomHost
// ---------------------------------------------------------------------------

pub struct DomHost {
    window: web_sys::Window,
    document: web_sys::Document,
    ids: ElementIds,
    embed: WeakEmbed,
    deadline: Option<Timer>,
    poll: Option<Timer>,
    /// Click handlers of the currently rendered roster rows.
    rows: Vec<EventBinding>,
}

impl DomHost {
    pub fn new(window: web_sys::Window, document: web_sys::Document, ids: ElementIds) -> Self {
        Self {
            window,
            document,
            ids,
            embed: Weak::new(),
            deadline: None,
            poll: None,
            rows: Vec::new(),
        }
    }

    /// Give the host a way back to the embed that owns it. Timers and
    /// fetches started before this is called go nowhere.
    pub fn bind(&mut self, embed: &SharedEmbed) {
        self.embed = Rc::downgrade(embed);
    }

    pub fn ids(&self) -> &ElementIds {
        &self.ids
    }

    fn element(&self, id: &str) -> Option<web_sys::Element> {
        self.document.get_element_by_id(id)
    }

    fn html_element(&self, id: &str) -> Option<web_sys::HtmlElement> {
        self.element(id)?.dyn_into::<web_sys::HtmlElement>().ok()
    }

    fn frame(&self) -> Option<web_sys::HtmlIFrameElement> {
        self.element(&self.ids.frame)?
            .dyn_into::<web_sys::HtmlIFrameElement>()
            .ok()
    }

    fn frame_window(&self) -> Option<web_sys::Window> {
        self.frame()?.content_window()
    }

    fn create(&self, tag: &str, class: &str) -> Option<web_sys::Element> {
        match self.document.create_element(tag) {
            Ok(el) => {
                el.set_class_name(class);
                Some(el)
            }
            Err(e) => {
                log::warn!("[dom] create_element({}) failed: {:?}", tag, e);
                None
            }
        }
    }

    fn build_row(&self, row: &RosterRow) -> Option<(web_sys::Element, EventBinding)> {
        let item = self.create("div", "player-item")?;

        let avatar = self.create("img", "player-avatar")?;
        let _ = avatar.set_attribute("src", &row.avatar_url);
        let _ = avatar.set_attribute("alt", &row.display_name);

        let name = self.create("span", "player-name")?;
        name.set_text_content(Some(&row.display_name));

        let coords = self.create("span", "player-coords")?;
        coords.set_text_content(Some(&row.position_label));

        for child in [&avatar, &name, &coords] {
            let _ = item.append_child(child);
        }

        let embed = self.embed.clone();
        let player_id = row.player_id.clone();
        let click = EventBinding::new(&item, "click", move |_| {
            if let Some(embed) = embed.upgrade() {
                embed.borrow_mut().teleport_to_player(&player_id);
            }
        })?;
        Some((item, click))
    }
}

impl EmbedHost for DomHost {
    fn post_to_frame(&mut self, message: &Value, target_origin: &str) -> Result<()> {
        let target = self
            .frame_window()
            .ok_or_else(|| EmbedError::Post("frame has no content window".into()))?;
        let message = js_sys::JSON::parse(&message.to_string())
            .map_err(|e| js_error(EmbedError::Post, e))?;
        target
            .post_message(&message, target_origin)
            .map_err(|e| js_error(EmbedError::Post, e))
    }

    fn frame_location(&mut self) -> Result<String> {
        let target = self
            .frame_window()
            .ok_or_else(|| EmbedError::FrameInaccessible("frame has no content window".into()))?;
        // Cross-origin frames throw a SecurityError here.
        target
            .location()
            .href()
            .map_err(|e| js_error(EmbedError::FrameInaccessible, e))
    }

    fn arm_deadline(&mut self, after_ms: u32) {
        let embed = self.embed.clone();
        self.deadline = Timer::start(&self.window, after_ms, false, move || {
            if let Some(embed) = embed.upgrade() {
                embed.borrow_mut().on_deadline();
            }
        });
    }

    fn start_roster_interval(&mut self, every_ms: u32) {
        let embed = self.embed.clone();
        self.poll = Timer::start(&self.window, every_ms, true, move || {
            if let Some(embed) = embed.upgrade() {
                embed.borrow_mut().poll_roster();
            }
        });
    }

    fn request_roster(&mut self, url: &str) {
        let embed = self.embed.clone();
        let url = url.to_string();
        wasm_bindgen_futures::spawn_local(async move {
            let result = roster::load_snapshot(&FetchSource, &url).await;
            if let Some(embed) = embed.upgrade() {
                embed.borrow_mut().roster_loaded(result);
            }
        });
    }

    fn activate_fallback(&mut self) {
        if let Some(frame) = self.html_element(&self.ids.frame) {
            let _ = frame.style().set_property("display", "none");
        }
        if let Some(fallback) = self.html_element(&self.ids.fallback) {
            let _ = fallback.style().set_property("display", "flex");
        }
        if let Ok(Some(controls)) = self.document.query_selector(&self.ids.controls_selector) {
            let _ = controls.class_list().add_1("disabled");
        }
        if let Some(panel) = self.html_element(&self.ids.player_panel) {
            let _ = panel.style().set_property("display", "none");
        }
    }

    fn render_coordinates(&mut self, rounded: [i64; 3]) {
        for (id, value) in self.ids.coordinates().into_iter().zip(rounded) {
            if let Some(el) = self.element(id) {
                el.set_text_content(Some(&value.to_string()));
            }
        }
    }

    fn set_active_view(&mut self, mode: ViewMode) {
        for candidate in ViewMode::ALL {
            if let Some(button) = self.element(self.ids.view_button(candidate)) {
                let _ = button
                    .class_list()
                    .toggle_with_force("active", candidate == mode);
            }
        }
    }

    fn render_roster(&mut self, view: &RosterView) {
        let Some(container) = self.element(&self.ids.player_list) else {
            return;
        };
        container.set_inner_html("");
        // Old rows are gone from the DOM; their handlers can go too.
        self.rows.clear();

        if let Some(text) = view.placeholder() {
            if let Some(p) = self.create("p", "no-players") {
                p.set_text_content(Some(text));
                let _ = container.append_child(&p);
            }
            return;
        }

        for row in view.rows() {
            if let Some((item, click)) = self.build_row(row) {
                let _ = container.append_child(&item);
                self.rows.push(click);
            }
        }
    }

    fn set_panel_visible(&mut self, visible: bool) {
        if let Some(panel) = self.element(&self.ids.player_panel) {
            let _ = panel.class_list().toggle_with_force("visible", visible);
        }
        if let Some(button) = self.element(&self.ids.btn_toggle_players) {
            let _ = button.class_list().toggle_with_force("active", visible);
        }
    }
}

fn js_error(kind: fn(String) -> EmbedError, e: JsValue) -> EmbedError {
    kind(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}
