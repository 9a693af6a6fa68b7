use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response, Window};

use stepviz_core::{Method, VizError, VizResult};

use crate::state::{State, with_state};

fn describe(e: &JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{e:?}"))
}

/// Fetch a response body as text. Transport failures become
/// [`VizError::Network`], non-2xx answers [`VizError::Status`].
pub async fn fetch_text(window: &Window, url: &str, method: Method, body: Option<&str>) -> VizResult<String> {
    let network = |e: JsValue| VizError::Network {
        url: url.to_string(),
        reason: describe(&e),
    };

    let init = RequestInit::new();
    init.set_method(method.as_str());
    if let Some(body) = body {
        init.set_body(&JsValue::from_str(body));
    }
    let request = Request::new_with_str_and_init(url, &init).map_err(network)?;
    if body.is_some() {
        request.headers().set("Content-Type", "application/json").map_err(network)?;
    }

    log::debug!("{} {url}", method.as_str());
    let resp_value = JsFuture::from(window.fetch_with_request(&request)).await.map_err(network)?;
    let resp: Response = resp_value.dyn_into().map_err(network)?;
    if !resp.ok() {
        return Err(VizError::Status {
            url: url.to_string(),
            status: resp.status(),
        });
    }
    let text = JsFuture::from(resp.text().map_err(network)?).await.map_err(network)?;
    text.as_string().ok_or_else(|| VizError::Network {
        url: url.to_string(),
        reason: "response body is not text".into(),
    })
}

/// Hand a response body (or the failure to get one) to the player. An empty
/// sequence keeps whatever is loaded.
pub fn deliver(st: &mut State, body: VizResult<String>, autoplay: bool) {
    match body.and_then(|text| st.player.load_json(&text, autoplay)) {
        Ok(()) => {}
        Err(VizError::EmptySequence) => log::info!("server sent no steps, keeping the current run"),
        Err(e) => st.player.fail(&e),
    }
}

/// Fetch in the background and load the result into the page's player.
pub fn spawn_run(window: Window, url: String, method: Method, body: Option<Value>, autoplay: bool) {
    let body = body.map(|b| b.to_string());
    wasm_bindgen_futures::spawn_local(async move {
        let fetched = fetch_text(&window, &url, method, body.as_deref()).await;
        if with_state(|st| deliver(st, fetched, autoplay)).is_none() {
            log::warn!("response from {url} arrived while the page was busy");
        }
    });
}
