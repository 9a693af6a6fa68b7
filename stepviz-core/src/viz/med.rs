use serde::{Deserialize, Serialize};

use super::Visualizer;
use super::table::{Table, cell, dom_table};
use crate::highlight::{CellMark, HighlightKind, HighlightMap, Palette};
use crate::scene::Scene;
use crate::step::Step;

pub const TABLE_SLOT: &str = "dpTable";

const BASE_FILL: &str = "#f8f9fa";

const PALETTE: Palette = Palette {
    target: "#fff3cd",
    candidate: "#e2e3e5",
    chosen: "#d1e7dd",
    path: "#d1e7dd",
    tags: &[],
};

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MedPhase {
    #[default]
    Init,
    Step,
    Finish,
    #[serde(other)]
    Other,
}

/// One edit-distance step. Only `init` carries the two strings.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct MedStep {
    #[serde(rename = "type")]
    pub type_: MedPhase,
    pub dp: Table,
    pub s1: Option<String>,
    pub s2: Option<String>,
    pub i: Option<usize>,
    pub j: Option<usize>,
    pub val: Option<i64>,
    pub op: Option<String>,
    pub path: Vec<(usize, usize)>,
    pub msg: String,
}

impl Step for MedStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MedRequest {
    pub s1: String,
    pub s2: String,
}

/// The strings from the `init` step, reused by every later step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MedContext {
    pub s1: String,
    pub s2: String,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MedViz;

impl MedViz {
    fn marks(step: &MedStep) -> (Vec<CellMark>, Option<(usize, usize)>) {
        match (step.type_, step.i, step.j) {
            (MedPhase::Step, Some(i), Some(j)) => {
                let mut deps = Vec::new();
                if i > 0 {
                    deps.push(CellMark::at(i - 1, j));
                }
                if j > 0 {
                    deps.push(CellMark::at(i, j - 1));
                }
                if i > 0 && j > 0 {
                    deps.push(CellMark::at(i - 1, j - 1));
                }
                (deps, Some((i, j)))
            }
            (MedPhase::Finish, _, _) => (
                step.path.iter().map(|&(i, j)| CellMark::at(i, j).tagged("path")).collect(),
                None,
            ),
            _ => (Vec::new(), None),
        }
    }
}

impl Visualizer for MedViz {
    type Step = MedStep;
    type Context = MedContext;

    fn capture(&self, steps: &[MedStep]) -> MedContext {
        steps
            .iter()
            .find(|s| s.type_ == MedPhase::Init)
            .map(|s| MedContext {
                s1: s.s1.clone().unwrap_or_default(),
                s2: s.s2.clone().unwrap_or_default(),
            })
            .unwrap_or_default()
    }

    fn render(&self, step: &MedStep, ctx: &MedContext) -> Scene {
        let s1: Vec<char> = step.s1.as_deref().unwrap_or(&ctx.s1).chars().collect();
        let s2: Vec<char> = step.s2.as_deref().unwrap_or(&ctx.s2).chars().collect();
        let rows = step.dp.len();
        let cols = step.dp.first().map_or(0, Vec::len);

        let (marks, current) = Self::marks(step);
        let hl = HighlightMap::build(PALETTE, &marks, current);

        let mut header = vec!["\"\"".to_string()];
        header.extend((0..cols.saturating_sub(1)).map(|j| s2.get(j).map(char::to_string).unwrap_or_default()));
        let labels: Vec<(String, usize)> = (0..rows)
            .map(|i| {
                let label = match i {
                    0 => "\"\"".to_string(),
                    _ => s1.get(i - 1).map(char::to_string).unwrap_or_default(),
                };
                (label, i)
            })
            .collect();

        let mut view = dom_table(TABLE_SLOT, "", header, &labels, cols, &hl, |r, c| {
            cell(&step.dp, r, c).map(ToString::to_string).unwrap_or_default()
        });
        for (r, row) in view.rows.iter_mut().enumerate() {
            for (c, td) in row.cells.iter_mut().enumerate() {
                if td.background.is_none() && (r == 0 || c == 0) {
                    td.background = Some(BASE_FILL.to_string());
                }
                td.bold = hl.kind_at(r, c) == Some(HighlightKind::Path);
            }
        }

        let mut scene = Scene::new(0.0, 0.0);
        scene.tables.push(view);
        scene
    }
}
