use serde::{Deserialize, Serialize};

use super::Visualizer;
use super::table::{Grid, Table, cell};
use crate::highlight::{CellMark, CellRef, HighlightMap, Palette};
use crate::scene::{Font, Point, Scene};
use crate::step::Step;

const CELL: f64 = 40.0;
const HEADER: f64 = 30.0;
const PADDING: f64 = 20.0;

const PALETTE: Palette = Palette {
    target: "#ffeb3b",
    candidate: "#aaddff",
    chosen: "#d4edda",
    path: "#ffcc00",
    tags: &[],
};

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct LpsStep {
    #[serde(rename = "L_table")]
    pub l_table: Table,
    pub path_table: Table,
    pub text: String,
    pub current: Option<CellRef>,
    pub highlights: Vec<CellMark>,
    pub msg: String,
}

impl Step for LpsStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LpsRequest {
    pub text: String,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LpsViz;

impl Visualizer for LpsViz {
    type Step = LpsStep;
    type Context = ();

    fn capture(&self, _steps: &[LpsStep]) {}

    fn render(&self, step: &LpsStep, _ctx: &()) -> Scene {
        let text: Vec<char> = step.text.chars().collect();
        let n = text.len();
        let grid = Grid {
            origin: Point::new(PADDING, PADDING),
            cell_w: CELL,
            cell_h: CELL,
            header_w: HEADER,
            header_h: HEADER,
        };
        let side = PADDING * 2.0 + HEADER + n as f64 * CELL;
        let mut scene = Scene::new(side, side);

        let font = Font::plain(16.0);
        for (j, ch) in text.iter().enumerate() {
            let at = Point::new(grid.cell_rect(0, j).center().x, PADDING + HEADER / 2.0);
            scene.text(at, ch.to_string(), font, "#000");
            scene.text(at.offset(0.0, -15.0), j.to_string(), font, "#000");
        }
        for (i, ch) in text.iter().enumerate() {
            let at = Point::new(PADDING + HEADER / 2.0, grid.cell_rect(i, 0).center().y);
            scene.text(at, ch.to_string(), font, "#000");
            scene.text(at.offset(-15.0, 0.0), i.to_string(), font, "#000");
        }

        let hl = HighlightMap::build(PALETTE, &step.highlights, step.current.and_then(|c| c.cell()));
        for i in 0..n {
            for j in 0..n {
                if i <= j {
                    let value = cell(&step.l_table, i, j).map(ToString::to_string).unwrap_or_default();
                    grid.draw_cell(&mut scene, &hl, i, j, &value, font);
                } else {
                    scene.cell(grid.cell_rect(i, j), "#f0f0f0");
                }
            }
        }
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::DrawCmd;
    use crate::step::{Fetched, decode_steps};

    #[test]
    fn envelope_response_decodes() {
        let body = r##"{"steps":[{"L_table":[[1,0],[0,1]],"path_table":[["base",""],["","base"]],
            "text":"ab","current":null,"highlights":[{"r":0,"c":0,"color":"#e0e0e0","label":"1"}],"msg":"init"}]}"##;
        let fetched: Fetched<LpsStep> = decode_steps(body).unwrap();
        assert_eq!(fetched.steps[0].l_table.len(), 2);
        assert_eq!(fetched.steps[0].highlights.len(), 1);
    }

    #[test]
    fn lower_triangle_is_greyed() {
        let step = LpsStep {
            text: "abc".into(),
            current: Some(CellRef { r: 0, c: 2 }),
            ..LpsStep::default()
        };
        let scene = LpsViz.render(&step, &());
        assert_eq!(scene.width, 20.0 * 2.0 + 30.0 + 3.0 * 40.0);
        let greys = scene
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::FillRect { color, .. } if color == "#f0f0f0"))
            .count();
        assert_eq!(greys, 3);
        let yellow = scene
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::FillRect { color, .. } if color == "#ffeb3b"))
            .count();
        assert_eq!(yellow, 1);
    }
}
