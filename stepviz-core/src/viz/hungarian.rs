use serde::{Deserialize, Serialize};

use super::Visualizer;
use super::table::Table;
use crate::highlight::{CellMark, CellRef, HighlightMap, Palette};
use crate::scene::{Font, Point, Rect, Scene, Stroke};
use crate::step::Step;

const CELL: f64 = 60.0;
const GAP: f64 = 5.0;
const ASSIGNED: &str = "#cfe2ff";

const PALETTE: Palette = Palette {
    target: "#fff3cd",
    candidate: "#f8d7da",
    chosen: "#d1e7dd",
    path: "#d1e7dd",
    tags: &[("sub", "#f8d7da"), ("sub_augment", "#f8d7da"), ("add_augment", "#d1e7dd")],
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemType {
    #[default]
    Min,
    Max,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoverLines {
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct HungarianStep {
    pub phase: String,
    pub matrix: Table,
    pub lines: Option<CoverLines>,
    pub highlights: Vec<CellMark>,
    pub assignment: Vec<CellRef>,
    pub msg: String,
}

impl Step for HungarianStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HungarianRequest {
    pub matrix: Vec<Vec<i64>>,
    pub problem_type: ProblemType,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct HungarianViz;

fn offset(k: usize) -> f64 {
    k as f64 * (CELL + GAP)
}

impl Visualizer for HungarianViz {
    type Step = HungarianStep;
    type Context = ();

    fn capture(&self, _steps: &[HungarianStep]) {}

    fn render(&self, step: &HungarianStep, _ctx: &()) -> Scene {
        let n = step.matrix.len();
        let side = (n as f64 * CELL + n.saturating_sub(1) as f64 * GAP).max(0.0);
        let mut scene = Scene::new(side, side);

        let hl = HighlightMap::build(PALETTE, &step.highlights, None);
        for (r, row) in step.matrix.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let rect = Rect::new(offset(c), offset(r), CELL, CELL);
                let assigned = step.assignment.iter().any(|a| a.cell() == Some((r, c)));
                let fill = if assigned { ASSIGNED } else { hl.color_at(r, c).unwrap_or("white") };
                scene.fill_rect(rect, fill);
                scene.stroke_rect(rect, "#dee2e6", 1.0);
                let font = if assigned { Font::bold(18.0) } else { Font::plain(18.0) };
                scene.text(rect.center(), value.to_string(), font, "black");
            }
        }

        if let Some(lines) = &step.lines {
            for &r in &lines.rows {
                let y = offset(r) + CELL / 2.0;
                scene.line(Point::new(0.0, y), Point::new(side, y), Stroke::solid("red", 4.0));
            }
            for &c in &lines.cols {
                let x = offset(c) + CELL / 2.0;
                scene.line(Point::new(x, 0.0), Point::new(x, side), Stroke::solid("red", 4.0));
            }
        }
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::DrawCmd;

    #[test]
    fn problem_type_serializes_lowercase() {
        let req = HungarianRequest {
            matrix: vec![vec![1]],
            problem_type: ProblemType::Max,
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"matrix":[[1]],"problem_type":"max"}"#
        );
    }

    #[test]
    fn covering_lines_cross_cell_centres() {
        let step: HungarianStep = serde_json::from_str(
            r#"{"phase":"cover","matrix":[[0,1],[2,0]],"lines":{"rows":[1],"cols":[0]},"msg":"cover"}"#,
        )
        .unwrap();
        let scene = HungarianViz.render(&step, &());
        assert_eq!(scene.width, 125.0);
        let lines: Vec<(Point, Point)> = scene
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Line { from, to, stroke } if stroke.color == "red" => Some((*from, *to)),
                _ => None,
            })
            .collect();
        assert_eq!(lines, vec![
            (Point::new(0.0, 95.0), Point::new(125.0, 95.0)),
            (Point::new(30.0, 0.0), Point::new(30.0, 125.0)),
        ]);
    }

    #[test]
    fn assignment_overrides_highlight() {
        let step: HungarianStep = serde_json::from_str(
            r#"{"phase":"done","matrix":[[0,1],[2,0]],
                "highlights":[{"r":0,"c":0,"type":"sub","val":1},{"r":1,"c":0,"type":"add_augment","val":1}],
                "assignment":[{"r":0,"c":0},{"r":1,"c":1}],"msg":""}"#,
        )
        .unwrap();
        let scene = HungarianViz.render(&step, &());
        let fills: Vec<&str> = scene
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::FillRect { color, .. } => Some(color.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(fills, vec![ASSIGNED, "white", "#d1e7dd", ASSIGNED]);
    }
}
