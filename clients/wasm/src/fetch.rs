//! `fetch()`-backed [`RosterSource`].

use bluemap_embed::{EmbedError, HttpResponse, Result, RosterSource};
use futures::future::{FutureExt, LocalBoxFuture};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Issues plain `GET` requests through `window.fetch`.
pub struct FetchSource;

impl RosterSource for FetchSource {
    fn get<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<HttpResponse>> {
        fetch_text(url).boxed_local()
    }
}

async fn fetch_text(url: &str) -> Result<HttpResponse> {
    let window = web_sys::window().ok_or_else(|| EmbedError::Network("no global window".into()))?;

    let response: web_sys::Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .and_then(|value| value.dyn_into())
        .map_err(network)?;

    let status = response.status();
    let body = JsFuture::from(response.text().map_err(network)?)
        .await
        .map_err(network)?
        .as_string()
        .unwrap_or_default();

    Ok(HttpResponse { status, body })
}

/// `fetch` rejects with a `TypeError` on network failure; keep its text.
fn network(e: JsValue) -> EmbedError {
    EmbedError::Network(format!("{:?}", e))
}
