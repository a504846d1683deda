//! Page chrome outside the map itself: the mobile warning banner.

use wasm_bindgen::JsCast;

use crate::config::ElementIds;
use crate::dom::EventBinding;

/// Same test the site has always used: `/Mobi|Android/i`.
pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    ua.contains("mobi") || ua.contains("android")
}

/// Show the banner on mobile browsers and wire its close control.
pub fn init_mobile_warning(
    window: &web_sys::Window,
    document: &web_sys::Document,
    ids: &ElementIds,
) -> Option<EventBinding> {
    let banner = document
        .get_element_by_id(&ids.mobile_warning)
        .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok());

    let user_agent = window.navigator().user_agent().unwrap_or_default();
    if is_mobile_user_agent(&user_agent) {
        if let Some(banner) = &banner {
            let _ = banner.style().set_property("display", "block");
        }
    }

    let close = document.query_selector(&ids.close_selector).ok().flatten()?;
    EventBinding::new(&close, "click", move |_| {
        if let Some(banner) = &banner {
            let _ = banner.style().set_property("display", "none");
        }
    })
}
