use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlCanvasElement, HtmlElement, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement, MouseEvent};

use stepviz_core::scene::Point;

/// Build an absolute URL for an API path, taking into account the optional
/// `window.__BASE_URL` which is set by the host page.
pub fn asset_url(path: &str) -> String {
    let p = path.trim();
    if p.starts_with("http://") || p.starts_with("https://") {
        return p.to_string();
    }
    let base = web_sys::window()
        .and_then(|w| {
            let v = js_sys::Reflect::get(&w, &JsValue::from_str("__BASE_URL")).ok()?;
            v.as_string()
        })
        .unwrap_or_else(|| "/".to_string());
    let base = if base.ends_with('/') { base } else { format!("{base}/") };
    format!("{}{}", base, p.trim_start_matches('/'))
}

/// Simple query string parser used at start-up.
pub fn get_query_param(search: &str, key: &str) -> Option<String> {
    let s = search.trim_start_matches('?');
    for pair in s.split('&') {
        let mut it = pair.splitn(2, '=');
        let k = it.next()?;
        let v = it.next().unwrap_or("");
        if k == key {
            return Some(url_decode(v));
        }
    }
    None
}

fn url_decode(s: &str) -> String {
    let plus_as_space = s.replace('+', " ");
    let decoded = percent_encoding::percent_decode_str(&plus_as_space)
        .decode_utf8()
        .map(|c| c.into_owned());
    decoded.unwrap_or(plus_as_space)
}

/// Client coordinates to canvas pixels, so hit testing keeps working when
/// CSS scales the element.
pub fn event_canvas_coords(e: &MouseEvent, cv: &HtmlCanvasElement) -> Point {
    let rect = cv.get_bounding_client_rect();
    let x = (e.client_x() as f64 - rect.left()) * (cv.width() as f64) / rect.width().max(1.0);
    let y = (e.client_y() as f64 - rect.top()) * (cv.height() as f64) / rect.height().max(1.0);
    Point::new(x, y)
}

/// Messages may carry `<br>` and inline emphasis; the message region shows
/// plain text with line breaks kept.
pub fn strip_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let Some(close) = rest[open..].find('>') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let tag = rest[open + 1..open + close].trim().trim_end_matches('/').trim().to_ascii_lowercase();
        if tag == "br" {
            out.push('\n');
        }
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}

/// Current value of an input, textarea or select; empty when missing.
pub fn input_value(document: &Document, id: &str) -> String {
    let Some(el) = document.get_element_by_id(id) else {
        return String::new();
    };
    if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
        input.value()
    } else if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
        area.value()
    } else if let Some(sel) = el.dyn_ref::<HtmlSelectElement>() {
        sel.value()
    } else {
        String::new()
    }
}

pub fn set_input_value(document: &Document, id: &str, value: &str) {
    if let Some(input) = document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
    {
        input.set_value(value);
    }
}

pub fn is_checked(document: &Document, id: &str) -> bool {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        .is_some_and(|input| input.checked())
}

pub fn set_text(document: &Document, id: &str, text: &str) {
    if let Some(el) = document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    {
        el.set_inner_text(text);
    }
}

pub fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_are_decoded() {
        assert_eq!(get_query_param("?v=red-black%20tree&lang=en", "v").as_deref(), Some("red-black tree"));
        assert_eq!(get_query_param("?v=lcs&lang=en", "lang").as_deref(), Some("en"));
        assert_eq!(get_query_param("?flag", "flag").as_deref(), Some(""));
        assert_eq!(get_query_param("?v=lcs", "log"), None);
    }

    #[test]
    fn html_is_reduced_to_text() {
        assert_eq!(strip_html("a<br>b<br/>c"), "a\nb\nc");
        assert_eq!(strip_html("<strong>P</strong>(v1) = 0.6"), "P(v1) = 0.6");
        assert_eq!(strip_html("x < y"), "x < y");
    }
}
