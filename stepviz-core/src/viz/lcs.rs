use serde::{Deserialize, Serialize};

use super::Visualizer;
use super::table::{CellValue, Grid, MAX_DIM, Table, cell, filled};
use crate::highlight::{CellMark, CellRef, HighlightMap, Palette};
use crate::scene::{Font, Point, Scene};
use crate::step::Step;
use crate::validate;

const CELL: f64 = 50.0;
const MARGIN: f64 = 50.0;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct LcsStep {
    pub c_table: Table,
    pub b_table: Table,
    pub text1: String,
    pub text2: String,
    pub current: Option<CellRef>,
    pub highlights: Vec<CellMark>,
    pub msg: String,
}

impl Step for LcsStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

impl LcsStep {
    /// Blank tables sized for the two sequences.
    pub fn preview(text1: &str, text2: &str, message: &str) -> LcsStep {
        let text1: String = text1.chars().take(validate::MAX_TEXT_LEN).collect();
        let text2: String = text2.chars().take(validate::MAX_TEXT_LEN).collect();
        let rows = text1.chars().count() + 1;
        let cols = text2.chars().count() + 1;
        LcsStep {
            c_table: filled(rows, cols, CellValue::from("")),
            b_table: filled(rows, cols, CellValue::from("")),
            text1,
            text2,
            msg: message.to_string(),
            ..LcsStep::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LcsRequest {
    pub text1: String,
    pub text2: String,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LcsViz;

impl Visualizer for LcsViz {
    type Step = LcsStep;
    type Context = ();

    fn capture(&self, _steps: &[LcsStep]) {}

    fn render(&self, step: &LcsStep, _ctx: &()) -> Scene {
        let x: Vec<char> = step.text1.chars().take(MAX_DIM).collect();
        let y: Vec<char> = step.text2.chars().take(MAX_DIM).collect();
        let (m, n) = (x.len(), y.len());
        let grid = Grid {
            origin: Point::new(0.0, 0.0),
            cell_w: CELL,
            cell_h: CELL,
            header_w: CELL,
            header_h: CELL,
        };
        let mut scene = Scene::new(grid.width(n + 1) + MARGIN, grid.height(m + 1) + MARGIN);

        for (j, ch) in y.iter().enumerate() {
            grid.draw_header(&mut scene, grid.col_header(j + 1), &ch.to_string(), Font::bold(18.0));
        }
        for (i, ch) in x.iter().enumerate() {
            grid.draw_header(&mut scene, grid.row_header(i + 1), &ch.to_string(), Font::bold(18.0));
        }
        grid.draw_corner(&mut scene, "X \\ Y", Font::plain(14.0));

        let hl = HighlightMap::build(
            Palette::default(),
            &step.highlights,
            step.current.and_then(|c| c.cell()),
        );
        for i in 0..=m {
            for j in 0..=n {
                grid.draw_cell(&mut scene, &hl, i, j, "", Font::plain(16.0));
                let center = grid.cell_rect(i, j).center();
                if let Some(v) = cell(&step.c_table, i, j).filter(|v| !v.is_blank()) {
                    scene.text(center.offset(5.0, 5.0), v.to_string(), Font::plain(16.0), "black");
                }
                if let Some(arrow) = cell(&step.b_table, i, j).filter(|v| !v.is_blank()) {
                    scene.text(center.offset(-10.0, -10.0), arrow.to_string(), Font::plain(14.0), "#555");
                }
            }
        }
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_follow_both_sequences() {
        let step = LcsStep::preview("AB", "BCA", "");
        let scene = LcsViz.render(&step, &());
        let texts: Vec<&str> = scene.texts().collect();
        assert_eq!(&texts[..5], &["B", "C", "A", "A", "B"]);
        assert_eq!(scene.width, 50.0 + 4.0 * 50.0 + 50.0);
        assert_eq!(scene.height, 50.0 + 3.0 * 50.0 + 50.0);
    }

    #[test]
    fn values_and_arrows_are_drawn() {
        let step: LcsStep = serde_json::from_str(
            r##"{"c_table":[[0,0],[0,1]],"b_table":[["",""],["","↖"]],"text1":"A","text2":"A",
                "current":{"r":1,"c":1},"highlights":[{"r":0,"c":0,"color":"#aaffaa"}],"msg":"hit"}"##,
        )
        .unwrap();
        let scene = LcsViz.render(&step, &());
        assert!(scene.texts().any(|t| t == "↖"));
        assert!(scene.texts().any(|t| t == "1"));
    }

    #[test]
    fn preview_is_bounded_by_text_limit() {
        let long = "x".repeat(10_000);
        let step = LcsStep::preview(&long, "ab", "");
        assert_eq!(step.c_table.len(), validate::MAX_TEXT_LEN + 1);
        assert_eq!(step.c_table[0].len(), 3);
    }

    #[test]
    fn preview_leaves_cells_empty() {
        let scene = LcsViz.render(&LcsStep::preview("ABC", "AB", ""), &());
        assert!(!scene.texts().any(|t| t == "0"));
    }
}
