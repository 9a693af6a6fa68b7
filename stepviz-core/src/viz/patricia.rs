use std::collections::HashMap;

use serde::Deserialize;

use super::Visualizer;
use super::table::CellValue;
use crate::scene::{DrawCmd, Font, Point, Rect, Scene, Stroke};
use crate::step::Step;

const MARGIN_X: f64 = 60.0;
const GRID_Y: f64 = 70.0;
const MSG_Y: f64 = 140.0;
const TREE_OFFSET: Point = Point::new(30.0, 120.0);
const BOX_W: f64 = 40.0;
const NODE_R: f64 = 23.0;
const MIN_W: f64 = 2000.0;
const MIN_H: f64 = 1500.0;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PatNode {
    pub id: i64,
    pub key: CellValue,
    pub bit: i64,
    pub x: f64,
    pub y: f64,
    pub is_highlight: bool,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub enum Side {
    #[default]
    L,
    R,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PatEdge {
    pub u: i64,
    pub v: i64,
    #[serde(rename = "type")]
    pub type_: Side,
    /// Back pointer to an ancestor (or the node itself) rather than a child.
    pub is_thread: bool,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PatLayout {
    pub root_id: Option<i64>,
    pub nodes: Vec<PatNode>,
    pub edges: Vec<PatEdge>,
    pub highlight_id: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PatriciaStep {
    pub layout: PatLayout,
    pub hl_bit: Option<i64>,
    /// 1-based position in `key` being tested.
    pub check_idx: Option<usize>,
    pub key: Option<String>,
    pub canvas_msg: Option<String>,
    pub msg: String,
}

impl Step for PatriciaStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PatriciaViz;

impl PatriciaViz {
    /// Draws the key being searched as a row of boxes and returns the
    /// bottom-centre of each box, by 1-based index.
    fn key_grid(scene: &mut Scene, key: &str, check_idx: Option<usize>) -> HashMap<usize, Point> {
        let mut centers = HashMap::new();
        scene.text_left(Point::new(MARGIN_X, GRID_Y - 10.0), "Input Key:", Font::bold(14.0), "#555");
        for (i, ch) in key.chars().enumerate() {
            let idx = i + 1;
            let x = MARGIN_X + i as f64 * BOX_W;
            let rect = Rect::new(x, GRID_Y, BOX_W, BOX_W);
            let checking = check_idx == Some(idx);
            scene.fill_rect(rect, if checking { "#ffcccc" } else { "#f0f0f0" });
            if checking {
                scene.stroke_rect(rect, "red", 3.0);
            } else {
                scene.stroke_rect(rect, "#999", 1.0);
            }
            let font = Font {
                bold: true,
                ..Font::mono(20.0)
            };
            scene.text(rect.center(), ch.to_string(), font, "black");
            scene.text(Point::new(x + BOX_W / 2.0, GRID_Y - 8.0), idx.to_string(), Font::plain(10.0), "#666");
            if checking {
                scene.text(Point::new(x + BOX_W / 2.0, GRID_Y - 25.0), "▼", Font::plain(16.0), "red");
            }
            centers.insert(idx, Point::new(x + BOX_W / 2.0, GRID_Y + BOX_W));
        }
        centers
    }

    fn edge(scene: &mut Scene, e: &PatEdge, u: Point, v: Point) {
        if e.is_thread {
            let stroke = Stroke::dashed("#888", 2.0, 5.0, 5.0);
            if e.u == e.v {
                let r = 25.0;
                let cx = if e.type_ == Side::L { u.x - r } else { u.x + r };
                scene.circle(Point::new(cx, u.y), r, None, Some(stroke));
            } else {
                let bend = if e.type_ == Side::L { -40.0 } else { 40.0 };
                let ctrl = Point::new((u.x + v.x) / 2.0 + bend, u.y.min(v.y) - 60.0);
                scene.push(DrawCmd::Quadratic {
                    from: u,
                    ctrl,
                    to: v,
                    stroke,
                });
                Self::head(scene, v, (v.y - ctrl.y).atan2(v.x - ctrl.x), "#888");
            }
        } else {
            scene.line(u, v, Stroke::solid("#000", 2.0));
            let mid = u.midpoint(v);
            // L follows a 1 bit, R a 0 bit
            let label = if e.type_ == Side::L { "1" } else { "0" };
            let font = Font::bold(14.0);
            let w = font.approx_width(label);
            scene.fill_rect(Rect::new(mid.x - w / 2.0 - 2.0, mid.y - 20.0, w + 4.0, 14.0), "rgba(255, 255, 255, 0.8)");
            scene.text(mid.offset(0.0, -10.0), label, font, "#000");
            Self::head(scene, v, (v.y - u.y).atan2(v.x - u.x), "#000");
        }
    }

    /// Arrow head pulled back from the node centre so it meets the rim.
    fn head(scene: &mut Scene, at: Point, angle: f64, color: &str) {
        let tip = at.offset(-15.0 * angle.cos(), -15.0 * angle.sin());
        scene.arrow_head(tip, angle, 10.0, color);
    }
}

impl Visualizer for PatriciaViz {
    type Step = PatriciaStep;
    type Context = ();

    fn capture(&self, _steps: &[PatriciaStep]) {}

    fn render(&self, step: &PatriciaStep, _ctx: &()) -> Scene {
        let layout = &step.layout;
        let pos: HashMap<i64, Point> = match layout.root_id {
            Some(_) => layout
                .nodes
                .iter()
                .map(|n| (n.id, Point::new(n.x + TREE_OFFSET.x, n.y + TREE_OFFSET.y)))
                .collect(),
            None => HashMap::new(),
        };
        let max_x = pos.values().map(|p| p.x).fold(0.0, f64::max);
        let max_y = pos.values().map(|p| p.y).fold(0.0, f64::max);
        let msg_font = Font::bold(20.0);
        let msg = step.canvas_msg.as_deref().filter(|m| !m.is_empty());
        let msg_w = msg.map_or(0.0, |m| msg_font.approx_width(m) + MARGIN_X + 100.0);
        let key = step.key.as_deref().filter(|k| !k.is_empty());
        let grid_w = key.map_or(0.0, |k| MARGIN_X + k.chars().count() as f64 * BOX_W + 100.0);
        let mut scene = Scene::new(MIN_W.max(max_x + 200.0).max(msg_w).max(grid_w), MIN_H.max(max_y + 200.0));

        if let Some(m) = msg {
            scene.text_left(Point::new(MARGIN_X, MSG_Y), m, msg_font, "#0000aa");
        }
        let centers = key.map(|k| Self::key_grid(&mut scene, k, step.check_idx)).unwrap_or_default();

        let Some(root) = layout.root_id.and_then(|id| pos.get(&id).copied()) else {
            return scene;
        };
        for e in &layout.edges {
            if let (Some(&u), Some(&v)) = (pos.get(&e.u), pos.get(&e.v)) {
                Self::edge(&mut scene, e, u, v);
            }
        }

        scene.text(root.offset(0.0, -50.0), "t", Font::bold(14.0), "black");
        scene.line(root.offset(-20.0, -60.0), root.offset(0.0, -35.0), Stroke::solid("#000", 2.0));

        if let Some(start) = step.check_idx.and_then(|i| centers.get(&i))
            && let Some(target) = layout.highlight_id.and_then(|id| pos.get(&id))
        {
            scene.line(*start, target.offset(0.0, -40.0), Stroke::dashed("red", 3.0, 5.0, 3.0));
        }

        let emphasize_bit = step.hl_bit.is_some();
        for node in &layout.nodes {
            let Some(&at) = pos.get(&node.id) else {
                continue;
            };
            let (fill, stroke) = if node.is_highlight {
                ("#ff9999", Stroke::solid("red", 4.0))
            } else {
                ("#ffd966", Stroke::solid("#555", 2.0))
            };
            scene.circle(at, NODE_R, Some(fill), Some(stroke));
            scene.text(at, node.key.to_string(), Font::mono(14.0), "black");
            let (bit_font, bit_color) = if node.is_highlight && emphasize_bit {
                (Font::bold(16.0), "red")
            } else {
                (Font::bold(12.0), "#333")
            };
            scene.text(at.offset(0.0, -25.0), node.bit.to_string(), bit_font, bit_color);
        }
        scene
    }
}
