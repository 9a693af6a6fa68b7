use serde::Deserialize;

use super::Visualizer;
use super::table::{CellValue, MAX_DIM};
use crate::scene::{DrawCmd, Font, Point, Rect, Scene, Stroke};
use crate::step::Step;

const NODE_R: f64 = 20.0;
const MIN_W: f64 = 800.0;
const MIN_H: f64 = 400.0;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExchangeNode {
    /// Either a number or a symbolic name such as `"i"`.
    pub id: CellValue,
    pub x: f64,
    pub y: f64,
    pub label: String,
}

impl ExchangeNode {
    fn at(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExchangeEdge {
    pub from: CellValue,
    pub to: CellValue,
    pub label: String,
    pub style: Option<String>,
    pub color: Option<String>,
    /// Normal offset of the quadratic control point; 0 draws a straight arrow.
    pub curve: f64,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExchangeGraph {
    pub nodes: Vec<ExchangeNode>,
    pub edges: Vec<ExchangeEdge>,
}

/// One slide of the currency-exchange substructure argument.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExchangeStep {
    pub phase: CellValue,
    pub step: CellValue,
    pub title: String,
    pub msg: String,
    pub math: Option<String>,
    pub graph: ExchangeGraph,
    pub highlight_path: Vec<CellValue>,
}

impl Step for ExchangeStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

/// Ids compare by their text so that `1` and `1.0` name the same node.
fn same(a: &CellValue, b: &CellValue) -> bool {
    a.to_string() == b.to_string()
}

impl ExchangeStep {
    fn node(&self, id: &CellValue) -> Option<&ExchangeNode> {
        self.graph.nodes.iter().find(|n| same(&n.id, id))
    }

    fn on_path(&self, edge: &ExchangeEdge) -> bool {
        self.highlight_path
            .windows(2)
            .any(|w| same(&w[0], &edge.from) && same(&w[1], &edge.to))
    }

    fn caption(&self) -> Option<String> {
        let parts: Vec<&str> = [Some(self.title.as_str()), self.math.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join("\n"))
    }
}

/// Unit normal of the segment `a -> b`, `None` when the points coincide.
fn normal(a: Point, b: Point) -> Option<(f64, f64)> {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len = (dx * dx + dy * dy).sqrt();
    (len > f64::EPSILON).then(|| (-dy / len, dx / len))
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CurrencyExchangeViz;

impl CurrencyExchangeViz {
    fn draw_edge(scene: &mut Scene, from: Point, to: Point, edge: &ExchangeEdge, hot: bool) {
        let color = if hot { "red" } else { edge.color.as_deref().unwrap_or("#000") };
        let width = if hot { 4.0 } else { 2.0 };
        let stroke = if edge.style.as_deref() == Some("dashed") {
            Stroke::dashed(color, width, 5.0, 5.0)
        } else {
            Stroke::solid(color, width)
        };
        let Some((nx, ny)) = normal(from, to) else {
            return;
        };
        let mid = from.midpoint(to);
        if edge.curve != 0.0 {
            let ctrl = mid.offset(nx * edge.curve, ny * edge.curve);
            let angle = (to.y - ctrl.y).atan2(to.x - ctrl.x);
            scene.push(DrawCmd::Quadratic { from, ctrl, to, stroke });
            let tip = to.offset(-NODE_R * angle.cos(), -NODE_R * angle.sin());
            scene.arrow_head(tip, angle, 10.0, color);
        } else {
            scene.arrow(from, to, NODE_R, stroke);
        }

        if edge.label.is_empty() {
            return;
        }
        let at = mid.offset(nx * edge.curve / 2.0, ny * edge.curve / 2.0);
        let font = Font::plain(14.0);
        let w = font.approx_width(&edge.label) + 4.0;
        scene.fill_rect(Rect::new(at.x - w / 2.0, at.y - 10.0, w, 20.0), "rgba(255,255,255,0.8)");
        scene.text(at, edge.label.clone(), font, "#000");
    }
}

impl Visualizer for CurrencyExchangeViz {
    type Step = ExchangeStep;
    type Context = ();

    fn capture(&self, _steps: &[ExchangeStep]) {}

    fn render(&self, step: &ExchangeStep, _ctx: &()) -> Scene {
        let nodes = &step.graph.nodes[..step.graph.nodes.len().min(MAX_DIM)];
        let max_x = nodes.iter().map(|n| n.x).fold(0.0, f64::max);
        let max_y = nodes.iter().map(|n| n.y).fold(0.0, f64::max);
        let mut scene = Scene::new(MIN_W.max(max_x + 60.0), MIN_H.max(max_y + 60.0));
        scene.caption = step.caption();

        for edge in step.graph.edges.iter().take(MAX_DIM * 4) {
            let (Some(u), Some(v)) = (step.node(&edge.from), step.node(&edge.to)) else {
                continue;
            };
            Self::draw_edge(&mut scene, u.at(), v.at(), edge, step.on_path(edge));
        }
        for node in nodes {
            let stroke = if step.highlight_path.iter().any(|id| same(id, &node.id)) {
                Stroke::solid("red", 3.0)
            } else {
                Stroke::solid("#333", 2.0)
            };
            scene.circle(node.at(), NODE_R, Some("#fff"), Some(stroke));
            scene.text(node.at(), node.label.clone(), Font::bold(16.0), "#000");
        }
        scene
    }
}
