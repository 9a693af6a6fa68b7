use std::f64::consts::TAU;

use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use stepviz_core::scene::{DrawCmd, Scene, Stroke};

use crate::constants::CANVAS_ID;

// Non-deprecated helpers to set canvas styles via property assignment.
pub fn set_fill_style(ctx: &CanvasRenderingContext2d, color: &str) {
    let _ = js_sys::Reflect::set(ctx.as_ref(), &JsValue::from_str("fillStyle"), &JsValue::from_str(color));
}

pub fn set_stroke_style(ctx: &CanvasRenderingContext2d, color: &str) {
    let _ = js_sys::Reflect::set(ctx.as_ref(), &JsValue::from_str("strokeStyle"), &JsValue::from_str(color));
}

fn apply_stroke(ctx: &CanvasRenderingContext2d, stroke: &Stroke) -> Result<(), JsValue> {
    set_stroke_style(ctx, &stroke.color);
    ctx.set_line_width(stroke.width);
    let dash = js_sys::Array::new();
    if let Some((on, off)) = stroke.dash {
        dash.push(&JsValue::from_f64(on));
        dash.push(&JsValue::from_f64(off));
    }
    ctx.set_line_dash(&dash)
}

pub fn init_canvas(document: &Document) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
    let cv = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| JsValue::from_str("visualizer canvas not found"))?
        .dyn_into::<HtmlCanvasElement>()?;
    let ctx = cv
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2D context not available"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    Ok((cv, ctx))
}

/// Resize the surface to the scene (never below `min`) and replay it.
pub fn draw_scene(cv: &HtmlCanvasElement, ctx: &CanvasRenderingContext2d, scene: &Scene, min: (f64, f64)) -> Result<(), JsValue> {
    let w = scene.width.max(min.0).ceil().clamp(1.0, 10000.0) as u32;
    let h = scene.height.max(min.1).ceil().clamp(1.0, 10000.0) as u32;
    if cv.width() != w {
        cv.set_width(w);
    }
    if cv.height() != h {
        cv.set_height(h);
    }
    ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
    for cmd in &scene.commands {
        draw_cmd(ctx, cmd)?;
    }
    ctx.set_line_dash(&js_sys::Array::new())
}

pub fn clear(cv: &HtmlCanvasElement, ctx: &CanvasRenderingContext2d) {
    ctx.clear_rect(0.0, 0.0, cv.width() as f64, cv.height() as f64);
}

fn draw_cmd(ctx: &CanvasRenderingContext2d, cmd: &DrawCmd) -> Result<(), JsValue> {
    match cmd {
        DrawCmd::FillRect { rect, color } => {
            set_fill_style(ctx, color);
            ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
        }
        DrawCmd::StrokeRect { rect, stroke } => {
            apply_stroke(ctx, stroke)?;
            ctx.stroke_rect(rect.x, rect.y, rect.w, rect.h);
        }
        DrawCmd::Line { from, to, stroke } => {
            apply_stroke(ctx, stroke)?;
            ctx.begin_path();
            ctx.move_to(from.x, from.y);
            ctx.line_to(to.x, to.y);
            ctx.stroke();
        }
        DrawCmd::Circle {
            center,
            radius,
            fill,
            stroke,
        } => {
            ctx.begin_path();
            ctx.arc(center.x, center.y, *radius, 0.0, TAU)?;
            if let Some(fill) = fill {
                set_fill_style(ctx, fill);
                ctx.fill();
            }
            if let Some(stroke) = stroke {
                apply_stroke(ctx, stroke)?;
                ctx.stroke();
            }
        }
        DrawCmd::Arc {
            center,
            radius,
            start,
            end,
            anticlockwise,
            stroke,
        } => {
            apply_stroke(ctx, stroke)?;
            ctx.begin_path();
            ctx.arc_with_anticlockwise(center.x, center.y, *radius, *start, *end, *anticlockwise)?;
            ctx.stroke();
        }
        DrawCmd::Quadratic { from, ctrl, to, stroke } => {
            apply_stroke(ctx, stroke)?;
            ctx.begin_path();
            ctx.move_to(from.x, from.y);
            ctx.quadratic_curve_to(ctrl.x, ctrl.y, to.x, to.y);
            ctx.stroke();
        }
        DrawCmd::Polygon { points, fill } => {
            let Some((first, rest)) = points.split_first() else {
                return Ok(());
            };
            set_fill_style(ctx, fill);
            ctx.begin_path();
            ctx.move_to(first.x, first.y);
            for p in rest {
                ctx.line_to(p.x, p.y);
            }
            ctx.close_path();
            ctx.fill();
        }
        DrawCmd::Text {
            at,
            text,
            font,
            color,
            align,
            baseline,
        } => {
            ctx.set_font(&font.css());
            set_fill_style(ctx, color);
            ctx.set_text_align(align.as_css());
            ctx.set_text_baseline(baseline.as_css());
            ctx.fill_text(text, at.x, at.y)?;
        }
    }
    Ok(())
}
