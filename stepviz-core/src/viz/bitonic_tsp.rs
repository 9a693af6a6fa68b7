use serde::Deserialize;

use super::Visualizer;
use super::table::MAX_DIM;
use crate::scene::{DrawCmd, Font, Point, Scene, Stroke};
use crate::step::Step;

const MIN_W: f64 = 800.0;
const MIN_H: f64 = 500.0;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TourPoint {
    pub id: i64,
    pub x: f64,
    pub y: f64,
    pub label: String,
}

/// Edge between two 1-based point numbers.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct TourEdge {
    pub from: i64,
    pub to: i64,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Candidate {
    pub k: i64,
    pub val: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TourPhase {
    #[default]
    Init,
    Simple,
    Complex,
    Final,
}

/// One step of the bitonic-tour DP over `B[i, j]`. Point numbers in
/// `current_i`, `current_j`, edges and candidates are 1-based; `-1` means
/// none.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TourStep {
    pub msg: String,
    pub points: Vec<TourPoint>,
    pub current_i: i64,
    pub current_j: i64,
    pub val: Option<f64>,
    pub highlight_edges: Vec<TourEdge>,
    pub candidates: Vec<Candidate>,
    #[serde(rename = "type")]
    pub phase: TourPhase,
}

impl Step for TourStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

impl TourStep {
    fn point(&self, number: i64) -> Option<Point> {
        let idx = usize::try_from(number.checked_sub(1)?).ok()?;
        self.points.get(idx).map(|p| Point::new(p.x, p.y))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BitonicTspViz;

impl BitonicTspViz {
    fn draw_edges(scene: &mut Scene, step: &TourStep, stroke: &Stroke) {
        for e in step.highlight_edges.iter().take(MAX_DIM) {
            if let (Some(a), Some(b)) = (step.point(e.from), step.point(e.to)) {
                scene.line(a, b, stroke.clone());
            }
        }
    }
}

impl Visualizer for BitonicTspViz {
    type Step = TourStep;
    type Context = ();

    fn capture(&self, _steps: &[TourStep]) {}

    fn render(&self, step: &TourStep, _ctx: &()) -> Scene {
        let points = &step.points[..step.points.len().min(MAX_DIM)];
        let max_x = points.iter().map(|p| p.x).fold(0.0, f64::max);
        let max_y = points.iter().map(|p| p.y).fold(0.0, f64::max);
        let mut scene = Scene::new(MIN_W.max(max_x + 40.0), MIN_H.max(max_y + 40.0));

        for p in points {
            let at = Point::new(p.x, p.y);
            scene.circle(at, 6.0, Some("#333"), None);
            scene.text(at.offset(0.0, -17.0), p.label.clone(), Font::plain(14.0), "#000");
        }

        if step.current_i > 0
            && step.current_j > 0
            && let (Some(pi), Some(pj)) = (step.point(step.current_i), step.point(step.current_j))
        {
            scene.circle(pi, 10.0, None, Some(Stroke::solid("blue", 2.0)));
            scene.circle(pj, 10.0, None, Some(Stroke::solid("red", 2.0)));
        }

        if step.phase == TourPhase::Final {
            Self::draw_edges(&mut scene, step, &Stroke::solid("#28a745", 3.0));
            return scene;
        }
        if let Some(pj) = step.point(step.current_j) {
            for c in step.candidates.iter().take(MAX_DIM) {
                if let Some(pk) = step.point(c.k) {
                    scene.push(DrawCmd::Line {
                        from: pk,
                        to: pj,
                        stroke: Stroke::dashed("#ccc", 1.0, 5.0, 5.0),
                    });
                }
            }
        }
        Self::draw_edges(&mut scene, step, &Stroke::solid("#ff9800", 3.0));
        scene
    }
}
