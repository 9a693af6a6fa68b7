use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlButtonElement, HtmlElement, HtmlInputElement};

use stepviz_core::{Controls, VisualizerConfig};

use crate::constants::{NEXT_ID, PLAY_ID, PREV_ID, RESET_ID, SPEED_ID, SPEED_LABEL_ID, STATUS_ID};
use crate::inputs;
use crate::state::{State, with_state};
use crate::utils::set_text;

fn set_enabled(document: &Document, id: &str, enabled: bool) {
    if let Some(btn) = document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
    {
        btn.set_disabled(!enabled);
    }
}

/// Mirror the controller's button and status state into the page.
pub fn apply(document: &Document, c: &Controls) {
    set_enabled(document, PREV_ID, c.can_prev);
    set_enabled(document, NEXT_ID, c.can_next);
    set_enabled(document, PLAY_ID, c.can_play);
    set_text(document, PLAY_ID, c.play_label);
    set_text(document, STATUS_ID, &c.status);
    set_text(document, SPEED_LABEL_ID, &c.speed_label);
}

/// Wire `f` to the click of the button with `id`, if the page has one.
pub fn on_click(document: &Document, id: &str, f: impl FnMut() + 'static) -> Result<(), JsValue> {
    let Some(el) = document.get_element_by_id(id) else {
        return Ok(());
    };
    let btn: HtmlElement = el.dyn_into()?;
    let onclick = Closure::<dyn FnMut()>::wrap(Box::new(f));
    btn.set_onclick(Some(onclick.as_ref().unchecked_ref()));
    onclick.forget();
    Ok(())
}

fn reset(st: &mut State) {
    st.player.reset();
    inputs::refresh_preview(st);
}

/// Navigation buttons and the speed slider.
pub fn attach(document: &Document, config: &VisualizerConfig) -> Result<(), JsValue> {
    on_click(document, PREV_ID, || {
        with_state(|st| st.player.prev());
    })?;
    on_click(document, NEXT_ID, || {
        with_state(|st| st.player.next());
    })?;
    on_click(document, PLAY_ID, || {
        with_state(|st| st.player.toggle());
    })?;
    on_click(document, RESET_ID, || {
        with_state(reset);
    })?;

    if let Some(el) = document.get_element_by_id(SPEED_ID) {
        let slider: HtmlInputElement = el.dyn_into()?;
        slider.set_value(&config.initial_speed.to_string());
        slider.set_disabled(!config.speed.adjustable());
        let input = slider.clone();
        let oninput = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            let value = input.value_as_number();
            if value.is_finite() {
                with_state(|st| st.player.set_speed(value));
            }
        }));
        slider.add_event_listener_with_callback("input", oninput.as_ref().unchecked_ref())?;
        oninput.forget();
    }
    set_text(document, SPEED_LABEL_ID, &config.speed.label(config.initial_speed));
    Ok(())
}
