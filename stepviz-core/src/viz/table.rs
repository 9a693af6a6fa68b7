//! Grid geometry and cell values shared by the table visualizers.

use std::fmt;

use serde::Deserialize;

use crate::highlight::HighlightMap;
use crate::scene::{Font, Point, Rect, Scene, TableCell, TableRow, TableView};

/// A table cell as it arrives from the server: a number, a string, a
/// boolean or nothing yet.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(v) => Some(*v as f64),
            CellValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Null) || matches!(self, CellValue::Text(t) if t.is_empty())
    }

    /// Render with `-1` shown as infinity, as the cost tables use it for
    /// "not computed".
    pub fn with_infinity(&self) -> String {
        match self {
            CellValue::Int(-1) => "∞".to_string(),
            CellValue::Float(v) if *v == -1.0 => "∞".to_string(),
            other => other.to_string(),
        }
    }

    /// Integers as-is, fractions with `decimals` digits.
    pub fn fixed(&self, decimals: usize) -> String {
        match self {
            CellValue::Float(v) if v.fract() != 0.0 => format!("{v:.decimals$}"),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => f.write_str(if *b { "T" } else { "F" }),
            CellValue::Int(v) => write!(f, "{v}"),
            CellValue::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", *v as i64),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Text(t) => f.write_str(t),
        }
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

pub type Table = Vec<Vec<CellValue>>;

/// Look up a cell without trusting the table's shape.
pub fn cell(table: &Table, r: usize, c: usize) -> Option<&CellValue> {
    table.get(r).and_then(|row| row.get(c))
}

/// Upper bound on any grid dimension taken from a step's scalar fields.
pub const MAX_DIM: usize = 256;

/// A size from untrusted step data, as a loop bound.
pub fn clamp_dim(n: i64) -> usize {
    usize::try_from(n).unwrap_or(0).min(MAX_DIM)
}

/// An integer table filled with `value`.
pub fn filled(rows: usize, cols: usize, value: CellValue) -> Table {
    vec![vec![value; cols]; rows]
}

/// Fixed-size grid anchored at `origin`, with a header row and column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    pub origin: Point,
    pub cell_w: f64,
    pub cell_h: f64,
    pub header_w: f64,
    pub header_h: f64,
}

impl Grid {
    pub fn cell_rect(&self, r: usize, c: usize) -> Rect {
        Rect::new(
            self.origin.x + self.header_w + c as f64 * self.cell_w,
            self.origin.y + self.header_h + r as f64 * self.cell_h,
            self.cell_w,
            self.cell_h,
        )
    }

    pub fn col_header(&self, c: usize) -> Rect {
        Rect::new(
            self.origin.x + self.header_w + c as f64 * self.cell_w,
            self.origin.y,
            self.cell_w,
            self.header_h,
        )
    }

    pub fn row_header(&self, r: usize) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y + self.header_h + r as f64 * self.cell_h,
            self.header_w,
            self.cell_h,
        )
    }

    pub fn corner(&self) -> Rect {
        Rect::new(self.origin.x, self.origin.y, self.header_w, self.header_h)
    }

    pub fn width(&self, cols: usize) -> f64 {
        self.header_w + cols as f64 * self.cell_w
    }

    pub fn height(&self, rows: usize) -> f64 {
        self.header_h + rows as f64 * self.cell_h
    }

    pub fn draw_header(&self, scene: &mut Scene, rect: Rect, text: &str, font: Font) {
        scene.cell(rect, "#f0f0f0");
        scene.text(rect.center(), text, font, "#333");
    }

    pub fn draw_corner(&self, scene: &mut Scene, text: &str, font: Font) {
        let rect = self.corner();
        scene.cell(rect, "#e0e0e0");
        scene.text(rect.center(), text, font, "#000");
    }

    /// Draw one body cell with its highlight color and value.
    pub fn draw_cell(&self, scene: &mut Scene, hl: &HighlightMap, r: usize, c: usize, text: &str, font: Font) {
        let rect = self.cell_rect(r, c);
        scene.cell(rect, hl.color_at(r, c).unwrap_or("white"));
        if !text.is_empty() {
            scene.text(rect.center(), text, font, "black");
        }
    }
}

/// DOM table whose body cells take their background from `hl`.
pub fn dom_table<F>(slot: &'static str, corner: &str, header: Vec<String>, rows: &[(String, usize)], cols: usize, hl: &HighlightMap, text: F) -> TableView
where
    F: Fn(usize, usize) -> String,
{
    let rows = rows
        .iter()
        .map(|(label, r)| TableRow {
            label: label.clone(),
            cells: (0..cols)
                .map(|c| TableCell::text(text(*r, c)).with_background(hl.color_at(*r, c)))
                .collect(),
            background: None,
        })
        .collect();
    TableView {
        slot,
        corner: corner.to_string(),
        header,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_values_decode_loosely() {
        let row: Vec<CellValue> = serde_json::from_str(r#"[0, "", 2.5, null, true, "↖"]"#).unwrap();
        assert_eq!(row[0], CellValue::Int(0));
        assert!(row[1].is_blank());
        assert_eq!(row[2].fixed(2), "2.50");
        assert!(row[3].is_blank());
        assert_eq!(row[4].to_string(), "T");
        assert_eq!(row[5].to_string(), "↖");
    }

    #[test]
    fn infinity_and_whole_floats() {
        assert_eq!(CellValue::Int(-1).with_infinity(), "∞");
        assert_eq!(CellValue::Float(3.0).to_string(), "3");
        assert_eq!(CellValue::Float(0.25).fixed(4), "0.2500");
    }

    #[test]
    fn grid_geometry() {
        let g = Grid {
            origin: Point::new(0.0, 0.0),
            cell_w: 60.0,
            cell_h: 40.0,
            header_w: 120.0,
            header_h: 40.0,
        };
        assert_eq!(g.cell_rect(2, 5), Rect::new(420.0, 120.0, 60.0, 40.0));
        assert_eq!(g.width(6), 480.0);
    }

    #[test]
    fn ragged_tables_are_safe() {
        let t: Table = vec![vec![CellValue::Int(1)], vec![]];
        assert!(cell(&t, 1, 0).is_none());
        assert!(cell(&t, 5, 5).is_none());
    }
}
