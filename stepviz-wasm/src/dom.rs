use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, Window};

use stepviz_core::scene::{TableCell, TableView};
use stepviz_core::{Controls, Frame, Lang, Presenter, VisualizerConfig, VizError};

use crate::canvas;
use crate::constants::{CAPTION_ID, MESSAGE_ID, TABLE_SLOTS};
use crate::controls;
use crate::utils::{set_text, strip_html};

/// Writes frames to the canvas, the table slots and the message region.
pub struct DomPresenter {
    window: Window,
    document: Document,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    min: (f64, f64),
    lang: Lang,
}

impl DomPresenter {
    pub fn new(
        window: Window,
        document: Document,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        config: &VisualizerConfig,
        lang: Lang,
    ) -> Self {
        DomPresenter {
            window,
            document,
            canvas,
            ctx,
            min: (config.min_width, config.min_height),
            lang,
        }
    }

    fn try_present(&self, frame: &Frame) -> Result<(), JsValue> {
        canvas::draw_scene(&self.canvas, &self.ctx, &frame.scene, self.min)?;
        for view in &frame.scene.tables {
            write_table(&self.document, view)?;
        }
        set_text(&self.document, MESSAGE_ID, &strip_html(&frame.message));
        set_text(&self.document, CAPTION_ID, frame.scene.caption.as_deref().unwrap_or(""));
        Ok(())
    }
}

impl Presenter for DomPresenter {
    fn present(&mut self, frame: &Frame) {
        if let Err(e) = self.try_present(frame) {
            log::error!("failed to draw step {}: {e:?}", frame.index);
        }
    }

    fn update_controls(&mut self, c: &Controls) {
        controls::apply(&self.document, c);
    }

    fn clear(&mut self, notice: &str) {
        canvas::clear(&self.canvas, &self.ctx);
        for slot in TABLE_SLOTS {
            if let Some(el) = self.document.get_element_by_id(slot) {
                el.set_inner_html("");
            }
        }
        set_text(&self.document, CAPTION_ID, "");
        set_text(&self.document, MESSAGE_ID, notice);
    }

    fn show_error(&mut self, err: &VizError) {
        if err.is_input() {
            if let Err(e) = self.window.alert_with_message(&err.to_string()) {
                log::warn!("alert failed: {e:?}");
            }
        } else {
            set_text(&self.document, MESSAGE_ID, self.lang.fetch_failed());
        }
    }
}

fn styled(el: &Element, cell_bg: Option<&str>, bold: bool) -> Result<(), JsValue> {
    let mut style = String::new();
    if let Some(bg) = cell_bg {
        style.push_str(&format!("background-color: {bg};"));
    }
    if bold {
        style.push_str("font-weight: bold;");
    }
    if !style.is_empty() {
        el.set_attribute("style", &style)?;
    }
    Ok(())
}

fn append_cell(document: &Document, row: &Element, tag: &str, cell: &TableCell) -> Result<(), JsValue> {
    let el = document.create_element(tag)?;
    el.set_text_content(Some(&cell.text));
    styled(&el, cell.background.as_deref(), cell.bold)?;
    row.append_child(&el)?;
    Ok(())
}

/// Replace the contents of the slot element with a freshly built table.
/// Pages without the slot simply skip it.
pub fn write_table(document: &Document, view: &TableView) -> Result<(), JsValue> {
    let Some(slot) = document.get_element_by_id(view.slot) else {
        log::debug!("no element for table slot {}", view.slot);
        return Ok(());
    };
    let table = document.create_element("table")?;

    let head = document.create_element("tr")?;
    append_cell(document, &head, "th", &TableCell::text(view.corner.as_str()))?;
    for h in &view.header {
        append_cell(document, &head, "th", &TableCell::text(h.as_str()))?;
    }
    table.append_child(&head)?;

    for row in &view.rows {
        let tr = document.create_element("tr")?;
        styled(&tr, row.background.as_deref(), false)?;
        append_cell(document, &tr, "th", &TableCell::text(row.label.as_str()))?;
        for cell in &row.cells {
            append_cell(document, &tr, "td", cell)?;
        }
        table.append_child(&tr)?;
    }

    slot.set_inner_html("");
    slot.append_child(&table)?;
    Ok(())
}
