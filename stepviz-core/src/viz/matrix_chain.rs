use serde::{Deserialize, Serialize};

use super::Visualizer;
use super::table::{CellValue, Grid, Table, cell, filled};
use crate::error::InputError;
use crate::highlight::{CellMark, HighlightMap, Palette};
use crate::scene::{Font, Point, Scene};
use crate::step::Step;
use crate::validate;

const PADDING: f64 = 20.0;
const CELL_W: f64 = 40.0;
const CELL_H: f64 = 30.0;
const HEADER: f64 = 30.0;

const PALETTE: Palette = Palette {
    target: "#fff3cd",
    candidate: "#d1e7dd",
    chosen: "#d4edda",
    path: "#d4edda",
    tags: &[
        ("dependency_left", "#d1e7dd"),
        ("dependency_right", "#d1e7dd"),
        ("final", "#d4edda"),
        ("split", "#cfe2ff"),
        ("leaf", "#e2e3e5"),
    ],
};

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatrixChainStep {
    /// Cost table, 1-based, `-1` for not yet computed.
    pub s_table: Table,
    /// Split table, 1-based.
    pub c_table: Table,
    pub dims: Vec<i64>,
    pub highlight: Vec<CellMark>,
    pub parens: String,
    pub msg: String,
}

impl Step for MatrixChainStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatrixChainRequest {
    pub dims: Vec<i64>,
}

/// The chain being entered. Each matrix after the first must start with
/// the previous one's column count, so only the tail can be removed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatrixList {
    matrices: Vec<(i64, i64)>,
}

impl MatrixList {
    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    /// `(name, rows, cols)` for the list view.
    pub fn rows(&self) -> impl Iterator<Item = (String, i64, i64)> + '_ {
        self.matrices
            .iter()
            .enumerate()
            .map(|(i, &(r, c))| (format!("A{}", i + 1), r, c))
    }

    /// Row count the next matrix is locked to.
    pub fn expected_rows(&self) -> Option<i64> {
        self.matrices.last().map(|&(_, c)| c)
    }

    pub fn dims(&self) -> Vec<i64> {
        let mut dims = Vec::with_capacity(self.matrices.len() + 1);
        if let Some(&(r, _)) = self.matrices.first() {
            dims.push(r);
        }
        dims.extend(self.matrices.iter().map(|&(_, c)| c));
        dims
    }

    pub fn add(&mut self, rows: &str, cols: &str) -> Result<(), InputError> {
        let rows = validate::positive_int("rows", rows)?;
        let cols = validate::positive_int("cols", cols)?;
        if let Some(expected) = self.expected_rows()
            && expected != rows
        {
            return Err(InputError::DimMismatch { expected, got: rows });
        }
        self.matrices.push((rows, cols));
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<(), InputError> {
        if index + 1 != self.matrices.len() {
            return Err(InputError::NotLast);
        }
        self.matrices.pop();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.matrices.clear();
    }

    pub fn request(&self) -> Result<MatrixChainRequest, InputError> {
        validate::matrix_chain(&self.dims())
    }

    pub fn preview(&self, message: &str) -> MatrixChainStep {
        let n = self.matrices.len();
        MatrixChainStep {
            s_table: filled(n + 1, n + 1, CellValue::Int(0)),
            c_table: filled(n + 1, n + 1, CellValue::Int(0)),
            dims: self.dims(),
            parens: "...".to_string(),
            msg: message.to_string(),
            ..MatrixChainStep::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Which {
    Cost,
    Split,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MatrixChainViz;

impl MatrixChainViz {
    fn draw_table(scene: &mut Scene, origin: Point, n: usize, data: &Table, title: &str, hl: &HighlightMap, which: Which) {
        let grid = Grid {
            origin,
            cell_w: CELL_W,
            cell_h: CELL_H,
            header_w: HEADER,
            header_h: HEADER,
        };
        scene.text(
            Point::new(origin.x + grid.width(n) / 2.0, origin.y - 5.0),
            title,
            Font::bold(16.0),
            "black",
        );
        let font = Font::plain(12.0);
        for k in 1..=n {
            let rect = grid.col_header(k - 1);
            scene.cell(rect, "#e9ecef");
            scene.text(rect.center(), k.to_string(), font, "black");
            let rect = grid.row_header(k - 1);
            scene.cell(rect, "#e9ecef");
            scene.text(rect.center(), k.to_string(), font, "black");
        }
        for i in 1..=n {
            for j in i..=n {
                let rect = grid.cell_rect(i - 1, j - 1);
                scene.cell(rect, hl.color_at(i, j).unwrap_or("white"));
                let text = match cell(data, i, j) {
                    _ if i == j && which == Which::Cost => "0".to_string(),
                    Some(CellValue::Int(0)) if i != j => String::new(),
                    Some(v) => v.with_infinity(),
                    None => String::new(),
                };
                if !text.is_empty() {
                    scene.text(rect.center(), text, font, "black");
                }
            }
        }
    }
}

impl Visualizer for MatrixChainViz {
    type Step = MatrixChainStep;
    type Context = ();

    fn capture(&self, _steps: &[MatrixChainStep]) {}

    fn render(&self, step: &MatrixChainStep, _ctx: &()) -> Scene {
        let n = step.dims.len().saturating_sub(1);
        if n == 0 {
            let mut scene = Scene::new(600.0, 300.0);
            scene.text(Point::new(300.0, 150.0), "請加入矩陣...", Font::plain(20.0), "#888");
            return scene;
        }
        let table_w = HEADER + n as f64 * CELL_W;
        let table_h = HEADER + n as f64 * CELL_H;
        let mut scene = Scene::new(table_w * 2.0 + PADDING * 3.0, table_h + PADDING * 2.0);

        let hl = HighlightMap::build(PALETTE, &step.highlight, None);
        Self::draw_table(
            &mut scene,
            Point::new(PADDING, PADDING),
            n,
            &step.s_table,
            "s (Cost)",
            &hl,
            Which::Cost,
        );
        Self::draw_table(
            &mut scene,
            Point::new(PADDING * 2.0 + table_w, PADDING),
            n,
            &step.c_table,
            "c (Split)",
            &hl,
            Which::Split,
        );
        scene.caption = Some(step.parens.clone());
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::DrawCmd;

    fn fills(scene: &Scene, color: &str) -> usize {
        scene
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::FillRect { color: f, .. } if f == color))
            .count()
    }

    #[test]
    fn chain_dimensions_must_link() {
        let mut list = MatrixList::default();
        list.add("30", "35").unwrap();
        assert_eq!(list.expected_rows(), Some(35));
        assert_eq!(list.add("20", "15"), Err(InputError::DimMismatch { expected: 35, got: 20 }));
        list.add("35", "15").unwrap();
        list.add("15", "5").unwrap();
        assert_eq!(list.dims(), vec![30, 35, 15, 5]);
        assert_eq!(list.rows().next().unwrap(), ("A1".to_string(), 30, 35));
    }

    #[test]
    fn only_the_tail_is_removable() {
        let mut list = MatrixList::default();
        list.add("2", "3").unwrap();
        list.add("3", "4").unwrap();
        assert_eq!(list.remove(0), Err(InputError::NotLast));
        list.remove(1).unwrap();
        assert_eq!(list.dims(), vec![2, 3]);
        assert!(list.request().is_err());
        list.remove(0).unwrap();
        assert!(list.dims().is_empty());
    }

    #[test]
    fn preview_draws_two_upper_triangles() {
        let mut list = MatrixList::default();
        list.add("2", "3").unwrap();
        list.add("3", "4").unwrap();
        list.add("4", "5").unwrap();
        let scene = MatrixChainViz.render(&list.preview(""), &());
        // 6 upper-triangle cells per table
        assert_eq!(fills(&scene, "white"), 12);
        assert_eq!(scene.texts().filter(|t| *t == "0").count(), 6);
        assert_eq!(scene.caption.as_deref(), Some("..."));
        assert_eq!(scene.width, (30.0 + 3.0 * 40.0) * 2.0 + 60.0);
    }

    #[test]
    fn infinity_and_split_colors() {
        let step: MatrixChainStep = serde_json::from_str(
            r#"{"s_table":[[0,0,0],[0,0,-1],[0,0,0]],"c_table":[[0,0,0],[0,0,1],[0,0,0]],
                "dims":[2,3,4],"highlight":[{"r":1,"c":2,"type":"split"}],"parens":"(A1A2)","msg":""}"#,
        )
        .unwrap();
        let scene = MatrixChainViz.render(&step, &());
        assert!(scene.texts().any(|t| t == "∞"));
        assert_eq!(fills(&scene, "#cfe2ff"), 2);
        assert_eq!(scene.caption.as_deref(), Some("(A1A2)"));
    }

    #[test]
    fn empty_chain_shows_placeholder() {
        let scene = MatrixChainViz.render(&MatrixList::default().preview(""), &());
        assert_eq!(scene.texts().count(), 1);
    }
}
