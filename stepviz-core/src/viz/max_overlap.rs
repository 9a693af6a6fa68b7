use serde::Deserialize;

use super::Visualizer;
use super::table::{CellValue, MAX_DIM};
use crate::scene::{Font, Point, Rect, Scene, Stroke};
use crate::step::Step;

const W: f64 = 800.0;
const H: f64 = 450.0;
const PAD: f64 = 50.0;
const GRAPH_H: f64 = 150.0;
const INTERVAL_TOP: f64 = GRAPH_H + 50.0;
const ROW_GAP: f64 = 30.0;
/// Counts are plotted on a fixed 0..6 scale.
const MAX_COUNT: f64 = 6.0;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Interval {
    pub id: i64,
    pub start: f64,
    pub end: f64,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Endpoint {
    pub val: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
}

/// Piece of the overlap-count step function `f(x)`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub count: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OverlapHighlight {
    MaxRegions {
        #[serde(default)]
        segments: Vec<Segment>,
    },
    MoveDemo {
        segment: Segment,
    },
    Conclusion {
        #[serde(default)]
        points: Vec<f64>,
    },
}

/// One step of the maximum-overlap-point proof. `phase` is a stage number
/// sent as a string; later stages keep everything earlier stages drew.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct OverlapStep {
    pub phase: CellValue,
    pub msg: String,
    pub intervals: Vec<Interval>,
    pub endpoints: Vec<Endpoint>,
    pub fx: Vec<Segment>,
    pub highlight: Option<OverlapHighlight>,
}

impl Step for OverlapStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

impl OverlapStep {
    pub fn stage(&self) -> i64 {
        match &self.phase {
            CellValue::Int(v) => *v,
            CellValue::Float(v) => *v as i64,
            CellValue::Text(t) => t.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    fn max_count(&self) -> f64 {
        self.fx.iter().map(|s| s.count).fold(0.0, f64::max)
    }
}

fn scale_x(v: f64) -> f64 {
    PAD + (v / 100.0) * (W - 2.0 * PAD)
}

fn scale_y(count: f64) -> f64 {
    GRAPH_H - (count / MAX_COUNT) * (GRAPH_H - 20.0)
}

fn label(v: f64) -> String {
    CellValue::Float(v).to_string()
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MaxOverlapViz;

impl MaxOverlapViz {
    fn draw_intervals(scene: &mut Scene, step: &OverlapStep) {
        let blue = "#007bff";
        for iv in step.intervals.iter().take(MAX_DIM) {
            let (x1, x2) = (scale_x(iv.start), scale_x(iv.end));
            let y = INTERVAL_TOP + iv.id.clamp(0, MAX_DIM as i64) as f64 * ROW_GAP;
            scene.line(Point::new(x1, y), Point::new(x2, y), Stroke::solid(blue, 4.0));
            scene.circle(Point::new(x1, y), 4.0, Some(blue), None);
            scene.circle(Point::new(x2, y), 4.0, Some(blue), None);
            scene.text(Point::new(x1 - 10.0, y + 4.0), label(iv.start), Font::plain(10.0), "#666");
            scene.text(Point::new(x2 + 10.0, y + 4.0), label(iv.end), Font::plain(10.0), "#666");
        }
    }

    fn draw_endpoint_guides(scene: &mut Scene, step: &OverlapStep, height: f64) {
        for ep in step.endpoints.iter().take(2 * MAX_DIM) {
            let x = scale_x(ep.val);
            scene.line(Point::new(x, GRAPH_H), Point::new(x, height - 20.0), Stroke::dashed("#ccc", 1.0, 5.0, 5.0));
            scene.text(Point::new(x, height - 8.0), "e", Font::plain(10.0), "#999");
        }
    }

    fn draw_fx(scene: &mut Scene, step: &OverlapStep) {
        let axis = Stroke::solid("#000", 1.0);
        scene.line(Point::new(PAD, GRAPH_H), Point::new(W - PAD, GRAPH_H), axis.clone());
        scene.line(Point::new(PAD, GRAPH_H), Point::new(PAD, 10.0), axis);
        scene.text(Point::new(PAD - 20.0, 20.0), "f(x)", Font::plain(10.0), "#000");
        scene.text(Point::new(PAD, GRAPH_H + 15.0), "Overlap Count", Font::plain(10.0), "#000");
        for seg in step.fx.iter().take(2 * MAX_DIM) {
            let y = scale_y(seg.count);
            scene.line(Point::new(scale_x(seg.start), y), Point::new(scale_x(seg.end), y), Stroke::solid("#dc3545", 3.0));
        }
    }

    fn draw_highlight(scene: &mut Scene, step: &OverlapStep, hl: &OverlapHighlight) {
        match hl {
            OverlapHighlight::MaxRegions { segments } => {
                for seg in segments.iter().take(MAX_DIM) {
                    let (x1, x2, y) = (scale_x(seg.start), scale_x(seg.end), scale_y(seg.count));
                    scene.fill_rect(Rect::new(x1, y, x2 - x1, GRAPH_H - y), "rgba(255, 193, 7, 0.3)");
                    scene.text(Point::new((x1 + x2) / 2.0, y - 10.0), "Max", Font::bold(14.0), "#d63384");
                }
            }
            // Shown as the point at the segment midpoint with an arrow to
            // its left endpoint.
            OverlapHighlight::MoveDemo { segment } => {
                let green = "#28a745";
                let (x1, x2, y) = (scale_x(segment.start), scale_x(segment.end), scale_y(segment.count));
                let mid = (x1 + x2) / 2.0;
                scene.circle(Point::new(mid, y), 6.0, Some(green), None);
                scene.line(Point::new(mid, y + 10.0), Point::new(x1, y + 10.0), Stroke::solid(green, 2.0));
                scene.arrow_head(Point::new(x1, y + 10.0), std::f64::consts::PI, 8.0, green);
                scene.text(Point::new(mid, y + 25.0), "Move to endpoint", Font::plain(10.0), green);
            }
            OverlapHighlight::Conclusion { points } => {
                let y = scale_y(step.max_count());
                for &p in points.iter().take(2 * MAX_DIM) {
                    scene.circle(Point::new(scale_x(p), y), 8.0, Some("#fd7e14"), Some(Stroke::solid("#fff", 2.0)));
                }
                scene.text(Point::new(W / 2.0, scene.height / 2.0), "Solution Found!", Font::plain(20.0), "#000");
            }
        }
    }
}

impl Visualizer for MaxOverlapViz {
    type Step = OverlapStep;
    type Context = ();

    fn capture(&self, _steps: &[OverlapStep]) {}

    fn render(&self, step: &OverlapStep, _ctx: &()) -> Scene {
        let rows = step.intervals.iter().map(|iv| iv.id.clamp(0, MAX_DIM as i64)).max().unwrap_or(0);
        let height = H.max(INTERVAL_TOP + (rows + 1) as f64 * ROW_GAP + 40.0);
        let mut scene = Scene::new(W, height);
        scene.line(
            Point::new(PAD, INTERVAL_TOP - 20.0),
            Point::new(W - PAD, INTERVAL_TOP - 20.0),
            Stroke::solid("#333", 2.0),
        );
        Self::draw_intervals(&mut scene, step);
        let stage = step.stage();
        if stage >= 2 {
            Self::draw_endpoint_guides(&mut scene, step, height);
        }
        if stage >= 3 {
            Self::draw_fx(&mut scene, step);
        }
        if let Some(hl) = &step.highlight {
            Self::draw_highlight(&mut scene, step, hl);
        }
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::DrawCmd;

    const BASE: &str = r#""intervals":[{"id":0,"start":10,"end":40},{"id":1,"start":30,"end":60}],
        "endpoints":[{"val":10,"type":"start","id":0},{"val":30,"type":"start","id":1},
                     {"val":40,"type":"end","id":0},{"val":60,"type":"end","id":1}],
        "fx":[{"start":10,"end":30,"count":1},{"start":30,"end":40,"count":2},{"start":40,"end":60,"count":1}]"#;

    fn step(phase: &str, highlight: &str) -> OverlapStep {
        serde_json::from_str(&format!(r#"{{"phase":"{phase}","msg":"m",{BASE},"highlight":{highlight}}}"#)).unwrap()
    }

    fn lines_of(scene: &Scene, color: &str) -> usize {
        scene
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::Line { stroke, .. } if stroke.color == color))
            .count()
    }

    #[test]
    fn stages_add_layers() {
        let one = MaxOverlapViz.render(&step("1", "null"), &());
        assert_eq!(lines_of(&one, "#007bff"), 2);
        assert_eq!(lines_of(&one, "#ccc"), 0);
        let two = MaxOverlapViz.render(&step("2", "null"), &());
        assert_eq!(lines_of(&two, "#ccc"), 4);
        assert_eq!(lines_of(&two, "#dc3545"), 0);
        let three = MaxOverlapViz.render(&step("3", "null"), &());
        assert_eq!(lines_of(&three, "#dc3545"), 3);
    }

    #[test]
    fn max_regions_are_shaded() {
        let s = step("4", r#"{"type":"max_regions","segments":[{"start":30,"end":40,"count":2}]}"#);
        let scene = MaxOverlapViz.render(&s, &());
        assert!(scene.texts().any(|t| t == "Max"));
        let x1 = scale_x(30.0);
        assert!(scene.commands.iter().any(|c| matches!(c, DrawCmd::FillRect { rect, .. } if rect.x == x1)));
    }

    #[test]
    fn conclusion_marks_points_at_peak() {
        let s = step("6", r#"{"type":"conclusion","points":[30,40]}"#);
        let scene = MaxOverlapViz.render(&s, &());
        let peak = scale_y(2.0);
        let marks = scene
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::Circle { fill: Some(f), center, .. } if f == "#fd7e14" && center.y == peak))
            .count();
        assert_eq!(marks, 2);
        assert!(scene.texts().any(|t| t == "Solution Found!"));
    }

    #[test]
    fn move_demo_points_left() {
        let s = step("5", r#"{"type":"move_demo","segment":{"start":30,"end":40,"count":2}}"#);
        let scene = MaxOverlapViz.render(&s, &());
        assert!(scene.texts().any(|t| t == "Move to endpoint"));
        assert_eq!(lines_of(&scene, "#28a745"), 1);
    }

    #[test]
    fn numeric_phase_is_accepted() {
        let s: OverlapStep = serde_json::from_str(r#"{"phase":3,"msg":""}"#).unwrap();
        assert_eq!(s.stage(), 3);
    }
}
