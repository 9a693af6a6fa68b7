use serde::Deserialize;

use super::Visualizer;
use super::table::{CellValue, MAX_DIM};
use crate::scene::{DrawCmd, Font, Point, Rect, Scene, Stroke};
use crate::step::Step;

const BOX: f64 = 40.0;
const GAP: f64 = 10.0;
const START_X: f64 = 50.0;
const A_Y: f64 = 80.0;
const TAILS_Y: f64 = 250.0;

/// What the step is doing to the two arrays.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LisPhase {
    #[default]
    None,
    Current,
    Search,
    Update,
    Backtrack,
    Final,
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct LisHighlight {
    #[serde(rename = "type")]
    pub phase: LisPhase,
    pub index: Option<i64>,
    pub target_idx: Option<i64>,
    pub tail_idx: Option<i64>,
    pub path: Vec<i64>,
}

/// One step of the patience-sorting LIS proof.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct LisStep {
    pub a: Vec<CellValue>,
    pub tails_values: Vec<CellValue>,
    pub tails_indices: Vec<i64>,
    /// Predecessor index per element of `a`, `-1` for none.
    pub pred: Vec<i64>,
    pub highlight: Option<LisHighlight>,
    pub msg: String,
}

impl Step for LisStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

fn box_x(i: usize) -> f64 {
    START_X + i as f64 * (BOX + GAP)
}

fn is(v: Option<i64>, i: usize) -> bool {
    v == Some(i as i64)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LisViz;

impl LisViz {
    fn a_fill(hl: &LisHighlight, i: usize) -> &'static str {
        match hl.phase {
            LisPhase::Current | LisPhase::Search if is(hl.index, i) => "#ffff99",
            LisPhase::Update if is(hl.index, i) => "#aaffaa",
            LisPhase::Backtrack | LisPhase::Final if hl.path.contains(&(i as i64)) => "#ffcc00",
            _ => "#fff",
        }
    }

    fn tail_fill(hl: &LisHighlight, i: usize) -> &'static str {
        match hl.phase {
            LisPhase::Search if is(hl.target_idx, i) => "#aaddff",
            LisPhase::Update if is(hl.tail_idx, i) => "#aaffaa",
            _ => "#f0f0f0",
        }
    }

    /// Red arcs joining consecutive path elements, drawn from each element
    /// back to its predecessor.
    fn draw_links(scene: &mut Scene, step: &LisStep, hl: &LisHighlight) {
        for pair in hl.path.windows(2) {
            let (Ok(p), Ok(i)) = (usize::try_from(pair[0]), usize::try_from(pair[1])) else {
                continue;
            };
            if step.pred.get(i) != Some(&pair[0]) || i >= MAX_DIM || p >= MAX_DIM {
                continue;
            }
            let cx = box_x(i) + BOX / 2.0;
            let px = box_x(p) + BOX / 2.0;
            scene.push(DrawCmd::Quadratic {
                from: Point::new(cx, A_Y),
                ctrl: Point::new((cx + px) / 2.0, A_Y - 40.0),
                to: Point::new(px, A_Y),
                stroke: Stroke::solid("red", 2.0),
            });
        }
    }
}

impl Visualizer for LisViz {
    type Step = LisStep;
    type Context = ();

    fn capture(&self, _steps: &[LisStep]) {}

    fn render(&self, step: &LisStep, _ctx: &()) -> Scene {
        let hl = step.highlight.clone().unwrap_or_default();
        let n = step.a.len().min(MAX_DIM);
        let mut scene = Scene::new((box_x(n) + START_X).max(600.0), 350.0);

        scene.text(Point::new(START_X, A_Y - 30.0), "Input Array A:", Font::plain(16.0), "#000");
        for (i, v) in step.a.iter().take(MAX_DIM).enumerate() {
            let rect = Rect::new(box_x(i), A_Y, BOX, BOX);
            scene.cell(rect, Self::a_fill(&hl, i));
            scene.text(rect.center(), v.to_string(), Font::plain(16.0), "#000");
            scene.text(Point::new(rect.center().x, A_Y + BOX + 15.0), i.to_string(), Font::plain(12.0), "#666");
        }
        if matches!(hl.phase, LisPhase::Backtrack | LisPhase::Final) {
            Self::draw_links(&mut scene, step, &hl);
        }

        scene.text(Point::new(START_X, TAILS_Y - 30.0), "Tails Array (Values):", Font::plain(16.0), "#000");
        let tails = step.tails_values.len().min(MAX_DIM);
        for (i, v) in step.tails_values.iter().take(tails).enumerate() {
            let rect = Rect::new(box_x(i), TAILS_Y, BOX, BOX);
            scene.cell(rect, Self::tail_fill(&hl, i));
            scene.text(rect.center(), v.to_string(), Font::plain(16.0), "#000");
            scene.text(Point::new(rect.center().x, TAILS_Y + BOX + 15.0), format!("Len {}", i + 1), Font::plain(12.0), "#666");
        }
        if hl.phase == LisPhase::Search && is(hl.target_idx, step.tails_values.len()) && tails < MAX_DIM {
            let rect = Rect::new(box_x(tails), TAILS_Y, BOX, BOX);
            scene.push(DrawCmd::StrokeRect {
                rect,
                stroke: Stroke::dashed("#aaa", 1.0, 5.0, 5.0),
            });
            scene.text(rect.center(), "?", Font::plain(16.0), "#aaa");
        }
        scene
    }
}
