use serde::Deserialize;

use super::Visualizer;
use super::table::{CellValue, MAX_DIM, Table, cell, clamp_dim};
use crate::scene::{Scene, TableCell, TableRow, TableView};
use crate::step::Step;

pub const DP_SLOT: &str = "dpTable";

const CURRENT: &str = "#fff3cd";
const CHOSEN: &str = "#d1e7dd";
const CANDIDATE: &str = "#f8f9fa";
const PATH: &str = "#ffc107";

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlanPhase {
    #[default]
    Init,
    StartMonth,
    CalcCell,
    Result,
}

/// A previous-month inventory `s` considered for the current cell.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct StockCandidate {
    pub s: i64,
    /// Units produced this month.
    pub x: i64,
    pub prev_cost: CellValue,
    pub prod_cost: CellValue,
    pub hold_cost: CellValue,
    pub total_cost: CellValue,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlanMonth {
    pub month: i64,
    pub inventory_start: i64,
    pub production: i64,
    pub demand: i64,
    pub inventory_end: i64,
}

/// One step of the production-planning DP. `f[i][j]` is the cheapest way to
/// end month `i` holding `j` units; `null` reads as unreachable.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlanStep {
    #[serde(rename = "type")]
    pub phase: PlanPhase,
    pub msg: String,
    pub n: Option<i64>,
    pub m: Option<i64>,
    pub c: Option<i64>,
    pub demands: Vec<i64>,
    #[serde(rename = "D")]
    pub d: Option<i64>,
    pub f: Table,
    pub i: i64,
    pub j: i64,
    pub d_i: Option<i64>,
    pub val: CellValue,
    pub candidates: Vec<StockCandidate>,
    pub best_s: Option<i64>,
    pub min_cost: CellValue,
    pub path: Vec<PlanMonth>,
}

impl Step for PlanStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

/// Months and total demand, sent only by the opening step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlanShape {
    pub months: usize,
    pub demand: usize,
}

impl PlanShape {
    /// Falls back to the table's own shape when the opening step is missing.
    fn or_table(self, f: &Table) -> PlanShape {
        if self.months > 0 || self.demand > 0 {
            return self;
        }
        PlanShape {
            months: f.len().saturating_sub(1).min(MAX_DIM),
            demand: f.iter().map(Vec::len).max().unwrap_or(0).saturating_sub(1).min(MAX_DIM),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct InventoryViz;

impl InventoryViz {
    fn background(step: &PlanStep, i: i64, j: i64) -> Option<&'static str> {
        match step.phase {
            PlanPhase::CalcCell if step.i == i && step.j == j => Some(CURRENT),
            PlanPhase::CalcCell if step.i - 1 == i => {
                if step.best_s == Some(j) {
                    Some(CHOSEN)
                } else if step.candidates.iter().any(|c| c.s == j) {
                    Some(CANDIDATE)
                } else {
                    None
                }
            }
            PlanPhase::Result => {
                let start = i == 0 && step.path.first().is_some_and(|p| p.inventory_start == j);
                let on_path = step.path.iter().any(|p| p.month == i && p.inventory_end == j);
                (start || on_path).then_some(PATH)
            }
            _ => None,
        }
    }
}

impl Visualizer for InventoryViz {
    type Step = PlanStep;
    type Context = PlanShape;

    fn capture(&self, steps: &[PlanStep]) -> PlanShape {
        steps
            .iter()
            .find(|s| s.phase == PlanPhase::Init)
            .map(|s| PlanShape {
                months: clamp_dim(s.n.unwrap_or(0)),
                demand: clamp_dim(s.d.unwrap_or(0)),
            })
            .unwrap_or_default()
    }

    fn render(&self, step: &PlanStep, shape: &PlanShape) -> Scene {
        let shape = shape.or_table(&step.f);
        let rows = (0..=shape.months)
            .map(|i| TableRow {
                label: format!("i={i}"),
                cells: (0..=shape.demand)
                    .map(|j| {
                        let text = match cell(&step.f, i, j) {
                            Some(v) if !v.is_blank() => v.to_string(),
                            _ => "∞".to_string(),
                        };
                        TableCell::text(text).with_background(Self::background(step, i as i64, j as i64))
                    })
                    .collect(),
                background: None,
            })
            .collect();
        let mut scene = Scene::new(0.0, 0.0);
        scene.tables.push(TableView {
            slot: DP_SLOT,
            corner: "Month \\ Inv".to_string(),
            header: (0..=shape.demand).map(|j| j.to_string()).collect(),
            rows,
        });
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INIT: &str = r#"{"type":"init","n":2,"m":2,"c":3,"demands":[1,2],"D":3,
        "f":[[0,null,null,null],[null,null,null,null],[null,null,null,null]],"msg":"init"}"#;

    fn shape() -> PlanShape {
        let init: PlanStep = serde_json::from_str(INIT).unwrap();
        InventoryViz.capture(&[init])
    }

    fn backgrounds(scene: &Scene) -> Vec<Vec<Option<String>>> {
        scene.table(DP_SLOT).unwrap().rows.iter().map(|r| r.cells.iter().map(|c| c.background.clone()).collect()).collect()
    }

    #[test]
    fn init_shows_infinity_for_unreached_cells() {
        let init: PlanStep = serde_json::from_str(INIT).unwrap();
        assert_eq!(shape(), PlanShape { months: 2, demand: 3 });
        let scene = InventoryViz.render(&init, &shape());
        let table = scene.table(DP_SLOT).unwrap();
        assert_eq!(table.corner, "Month \\ Inv");
        assert_eq!(table.header, vec!["0", "1", "2", "3"]);
        assert_eq!(table.rows[0].label, "i=0");
        assert_eq!(table.rows[0].cells[0].text, "0");
        assert_eq!(table.rows[2].cells[3].text, "∞");
    }

    #[test]
    fn calc_cell_marks_current_and_parents() {
        let step: PlanStep = serde_json::from_str(
            r#"{"type":"calc_cell","i":1,"j":1,"val":5,"best_s":0,
                "candidates":[{"s":0,"x":2,"prev_cost":0,"prod_cost":4,"hold_cost":1,"total_cost":5}],
                "f":[[0,null,null,null],[3,5,null,null],[null,null,null,null]]}"#,
        )
        .unwrap();
        let bg = backgrounds(&InventoryViz.render(&step, &shape()));
        assert_eq!(bg[1][1].as_deref(), Some(CURRENT));
        assert_eq!(bg[0][0].as_deref(), Some(CHOSEN));
        assert!(bg[0][1].is_none());
        assert!(bg[1][0].is_none());
    }

    #[test]
    fn result_path_includes_starting_stock() {
        let step: PlanStep = serde_json::from_str(
            r#"{"type":"result","min_cost":9,
                "path":[{"month":1,"inventory_start":0,"inventory_end":1},{"month":2,"inventory_start":1,"inventory_end":0}],
                "f":[[0,null,null,null],[3,5,null,null],[9,null,null,null]]}"#,
        )
        .unwrap();
        let bg = backgrounds(&InventoryViz.render(&step, &shape()));
        let gold: Vec<(usize, usize)> = bg
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row.iter().enumerate().filter(|(_, b)| b.as_deref() == Some(PATH)).map(move |(j, _)| (i, j)))
            .collect();
        assert_eq!(gold, vec![(0, 0), (1, 1), (2, 0)]);
    }

    #[test]
    fn shape_falls_back_to_table() {
        let step: PlanStep = serde_json::from_str(r#"{"type":"start_month","i":1,"f":[[0,null],[null,null]]}"#).unwrap();
        let scene = InventoryViz.render(&step, &PlanShape::default());
        assert_eq!(scene.table(DP_SLOT).unwrap().header, vec!["0", "1"]);
    }
}
