use serde::Deserialize;

use super::Visualizer;
use super::table::{CellValue, MAX_DIM, Table, cell, clamp_dim};
use crate::scene::{Font, Point, Rect, Scene};
use crate::step::Step;

const SIZE: f64 = 60.0;
const MARGIN: f64 = 10.0;

const CURRENT: &str = "#fff3cd";
const CHOSEN: &str = "#d1e7dd";
const CANDIDATE: &str = "#f8f9fa";
const PATH: &str = "#ffc107";

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeamPhase {
    #[default]
    Init,
    RowInit,
    StartRow,
    CalcCell,
    FindMin,
    Result,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParentCandidate {
    pub val: f64,
    pub col: i64,
}

/// One step of the minimum-disruption seam DP. `C[i][j]` is the cheapest
/// seam ending at `(i, j)`; zero means not yet computed.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SeamStep {
    #[serde(rename = "type")]
    pub phase: SeamPhase,
    pub msg: String,
    pub m: Option<i64>,
    pub n: Option<i64>,
    pub d: Table,
    pub row: i64,
    pub col: i64,
    pub val: CellValue,
    pub prev_col: Option<i64>,
    pub candidates: Vec<ParentCandidate>,
    pub min_val: CellValue,
    pub min_col: Option<i64>,
    /// Seam cells as `[row, col]`, top to bottom.
    pub path: Vec<[i64; 2]>,
    #[serde(rename = "C")]
    pub c: Table,
}

impl Step for SeamStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

/// Disruption grid, sent only by the opening step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Disruption {
    pub rows: usize,
    pub cols: usize,
    pub d: Table,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SeamCarvingViz;

impl SeamCarvingViz {
    /// Background and optional border for cell `(i, j)`.
    fn style(step: &SeamStep, rows: usize, i: i64, j: i64) -> (Option<&'static str>, Option<&'static str>) {
        match step.phase {
            SeamPhase::CalcCell if i == step.row && j == step.col => (Some(CURRENT), Some("orange")),
            SeamPhase::CalcCell if i == step.row - 1 && (j - step.col).abs() <= 1 => {
                if step.prev_col == Some(j) {
                    (Some(CHOSEN), Some("green"))
                } else {
                    (Some(CANDIDATE), None)
                }
            }
            SeamPhase::Result => (step.path.iter().any(|p| *p == [i, j]).then_some(PATH), None),
            SeamPhase::FindMin => ((i + 1 == rows as i64 && step.min_col == Some(j)).then_some(CHOSEN), None),
            _ => (None, None),
        }
    }
}

impl Visualizer for SeamCarvingViz {
    type Step = SeamStep;
    type Context = Disruption;

    fn capture(&self, steps: &[SeamStep]) -> Disruption {
        steps
            .iter()
            .find(|s| s.phase == SeamPhase::Init)
            .map(|s| Disruption {
                rows: clamp_dim(s.m.unwrap_or(s.d.len() as i64)),
                cols: clamp_dim(s.n.unwrap_or_else(|| s.d.first().map_or(0, |r| r.len() as i64))),
                d: s.d.clone(),
            })
            .unwrap_or_default()
    }

    fn render(&self, step: &SeamStep, grid: &Disruption) -> Scene {
        let rows = if grid.rows > 0 { grid.rows } else { step.c.len().min(MAX_DIM) };
        let cols = if grid.cols > 0 {
            grid.cols
        } else {
            step.c.first().map_or(0, |r| r.len().min(MAX_DIM))
        };
        let mut scene = Scene::new(MARGIN * 2.0 + cols as f64 * SIZE, MARGIN * 2.0 + rows as f64 * SIZE);

        for i in 0..rows {
            for j in 0..cols {
                let rect = Rect::new(MARGIN + j as f64 * SIZE, MARGIN + i as f64 * SIZE, SIZE, SIZE);
                let (fill, border) = Self::style(step, rows, i as i64, j as i64);
                scene.fill_rect(rect, fill.unwrap_or("white"));
                match border {
                    Some(color) => scene.stroke_rect(rect, color, 2.0),
                    None => scene.stroke_rect(rect, "#dee2e6", 1.0),
                }
                if let Some(d) = cell(&grid.d, i, j) {
                    scene.text_left(Point::new(rect.x + 2.0, rect.y + 12.0), format!("d:{d}"), Font::plain(10.0), "#888");
                }
                match cell(&step.c, i, j).filter(|v| v.as_f64().is_some_and(|x| x > 0.0)) {
                    Some(v) => scene.text(rect.center(), v.to_string(), Font::bold(16.0), "#000"),
                    None => scene.text(rect.center(), "-", Font::plain(16.0), "#ccc"),
                }
            }
        }
        scene
    }
}
