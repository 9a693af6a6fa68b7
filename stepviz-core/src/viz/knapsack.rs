use serde::{Deserialize, Serialize};

use super::Visualizer;
use super::table::{CellValue, Grid, MAX_DIM, Table, cell, clamp_dim, filled};
use crate::error::InputError;
use crate::highlight::{CellMark, CellRef, HighlightMap, Palette};
use crate::scene::{Font, Point, Scene};
use crate::step::Step;
use crate::validate;

const CELL_W: f64 = 60.0;
const CELL_H: f64 = 40.0;
const HEADER_W: f64 = 120.0;
const HEADER_H: f64 = 40.0;
const MARGIN: f64 = 50.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub w: i64,
    pub v: i64,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct KnapsackStep {
    pub table: Table,
    pub items: Vec<Item>,
    pub capacity: i64,
    pub current: Option<CellRef>,
    pub highlights: Vec<CellMark>,
    pub msg: String,
}

impl Step for KnapsackStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct KnapsackRequest {
    pub capacity: i64,
    pub items: Vec<Item>,
}

/// Items entered on the page, kept until the next run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemList {
    items: Vec<Item>,
}

impl ItemList {
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn add(&mut self, weight: &str, value: &str) -> Result<Item, InputError> {
        let item = Item {
            w: validate::positive_int("weight", weight)?,
            v: validate::non_negative_int("value", value)?,
        };
        self.items.push(item);
        Ok(item)
    }

    pub fn remove(&mut self, index: usize) -> Option<Item> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn request(&self, capacity: &str) -> Result<KnapsackRequest, InputError> {
        validate::knapsack(capacity, &self.items)
    }

    /// Empty grid sized from the current inputs. An unparsable capacity
    /// previews as zero; a huge one previews at the largest accepted size.
    pub fn preview(&self, capacity: &str, message: &str) -> KnapsackStep {
        let capacity = validate::preview_size(capacity, validate::MAX_CAPACITY);
        KnapsackStep {
            table: filled(self.items.len() + 1, clamp_dim(capacity) + 1, CellValue::from("")),
            items: self.items.clone(),
            capacity,
            current: None,
            highlights: Vec::new(),
            msg: message.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct KnapsackViz;

impl Visualizer for KnapsackViz {
    type Step = KnapsackStep;
    type Context = ();

    fn capture(&self, _steps: &[KnapsackStep]) {}

    fn render(&self, step: &KnapsackStep, _ctx: &()) -> Scene {
        let rows = step.items.len().min(MAX_DIM) + 1;
        let cols = clamp_dim(step.capacity) + 1;
        let grid = Grid {
            origin: Point::new(0.0, 0.0),
            cell_w: CELL_W,
            cell_h: CELL_H,
            header_w: HEADER_W,
            header_h: HEADER_H,
        };
        let mut scene = Scene::new(grid.width(cols) + MARGIN, grid.height(rows) + MARGIN);

        grid.draw_corner(&mut scene, "i \\ k", Font::bold(16.0));
        for c in 0..cols {
            grid.draw_header(&mut scene, grid.col_header(c), &c.to_string(), Font::plain(14.0));
        }
        for r in 0..rows {
            let label = match r.checked_sub(1).and_then(|i| step.items.get(i)) {
                Some(item) => format!("{r} (w:{}, v:{})", item.w, item.v),
                None => r.to_string(),
            };
            grid.draw_header(&mut scene, grid.row_header(r), &label, Font::plain(14.0));
        }

        let hl = HighlightMap::build(
            Palette::default(),
            &step.highlights,
            step.current.and_then(|c| c.cell()),
        );
        for r in 0..rows {
            for c in 0..cols {
                let text = cell(&step.table, r, c).map(ToString::to_string).unwrap_or_default();
                grid.draw_cell(&mut scene, &hl, r, c, &text, Font::plain(14.0));
            }
        }
        scene
    }
}
