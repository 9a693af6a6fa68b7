//! Backend-neutral drawing output.
//!
//! Renderers never touch a canvas directly. They fill a [`Scene`] with
//! [`DrawCmd`]s (and, for pages that show DOM tables, [`TableView`]s) which
//! the browser front-end replays onto a `CanvasRenderingContext2d`. A scene
//! always describes a full frame: the front-end clears the surface before
//! replaying it.

use serde::{Deserialize, Serialize};

/// Basic two dimensional point in canvas pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn offset(self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

impl From<(f64, f64)> for Point {
    fn from(v: (f64, f64)) -> Self {
        Point { x: v.0, y: v.1 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Rect { x, y, w, h }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

impl Align {
    pub fn as_css(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Baseline {
    Alphabetic,
    #[default]
    Middle,
}

impl Baseline {
    pub fn as_css(self) -> &'static str {
        match self {
            Baseline::Alphabetic => "alphabetic",
            Baseline::Middle => "middle",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Font {
    pub size: f64,
    pub bold: bool,
    pub family: &'static str,
}

impl Font {
    pub const fn plain(size: f64) -> Self {
        Font {
            size,
            bold: false,
            family: "Arial",
        }
    }

    pub const fn bold(size: f64) -> Self {
        Font {
            size,
            bold: true,
            family: "Arial",
        }
    }

    pub const fn mono(size: f64) -> Self {
        Font {
            size,
            bold: false,
            family: "Consolas",
        }
    }

    pub fn css(&self) -> String {
        if self.bold {
            format!("bold {}px {}", self.size, self.family)
        } else {
            format!("{}px {}", self.size, self.family)
        }
    }

    /// Rough advance width; good enough for sizing the surface around text.
    pub fn approx_width(&self, text: &str) -> f64 {
        text.chars()
            .map(|c| if c.is_ascii() { 0.6 } else { 1.0 })
            .sum::<f64>()
            * self.size
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
    pub dash: Option<(f64, f64)>,
}

impl Stroke {
    pub fn solid(color: &str, width: f64) -> Self {
        Stroke {
            color: color.to_string(),
            width,
            dash: None,
        }
    }

    pub fn dashed(color: &str, width: f64, on: f64, off: f64) -> Self {
        Stroke {
            color: color.to_string(),
            width,
            dash: Some((on, off)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCmd {
    FillRect {
        rect: Rect,
        color: String,
    },
    StrokeRect {
        rect: Rect,
        stroke: Stroke,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Circle {
        center: Point,
        radius: f64,
        fill: Option<String>,
        stroke: Option<Stroke>,
    },
    Arc {
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        anticlockwise: bool,
        stroke: Stroke,
    },
    Quadratic {
        from: Point,
        ctrl: Point,
        to: Point,
        stroke: Stroke,
    },
    Polygon {
        points: Vec<Point>,
        fill: String,
    },
    Text {
        at: Point,
        text: String,
        font: Font,
        color: String,
        align: Align,
        baseline: Baseline,
    },
}

/// One DOM table cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableCell {
    pub text: String,
    pub background: Option<String>,
    pub bold: bool,
}

impl TableCell {
    pub fn text(text: impl Into<String>) -> Self {
        TableCell {
            text: text.into(),
            ..TableCell::default()
        }
    }

    pub fn with_background(mut self, color: Option<&str>) -> Self {
        if let Some(c) = color {
            self.background = Some(c.to_string());
        }
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableRow {
    pub label: String,
    pub cells: Vec<TableCell>,
    pub background: Option<String>,
}

/// A DOM table written into the container element named by `slot`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableView {
    pub slot: &'static str,
    pub corner: String,
    pub header: Vec<String>,
    pub rows: Vec<TableRow>,
}

/// Full description of one rendered frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub commands: Vec<DrawCmd>,
    pub tables: Vec<TableView>,
    /// Secondary text region (parenthesization, formula line, ...).
    pub caption: Option<String>,
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Scene {
            width,
            height,
            ..Scene::default()
        }
    }

    /// Enlarge the surface so that it covers at least `w` x `h`.
    pub fn grow_to(&mut self, w: f64, h: f64) {
        self.width = self.width.max(w);
        self.height = self.height.max(h);
    }

    pub fn is_blank(&self) -> bool {
        self.commands.is_empty() && self.tables.is_empty()
    }

    pub fn push(&mut self, cmd: DrawCmd) {
        self.commands.push(cmd);
    }

    pub fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.push(DrawCmd::FillRect {
            rect,
            color: color.to_string(),
        });
    }

    pub fn stroke_rect(&mut self, rect: Rect, color: &str, width: f64) {
        self.push(DrawCmd::StrokeRect {
            rect,
            stroke: Stroke::solid(color, width),
        });
    }

    /// Filled cell with a thin outline, the building block of every table page.
    pub fn cell(&mut self, rect: Rect, fill: &str) {
        self.fill_rect(rect, fill);
        self.stroke_rect(rect, "#000", 1.0);
    }

    pub fn line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.push(DrawCmd::Line { from, to, stroke });
    }

    pub fn circle(&mut self, center: Point, radius: f64, fill: Option<&str>, stroke: Option<Stroke>) {
        self.push(DrawCmd::Circle {
            center,
            radius,
            fill: fill.map(str::to_string),
            stroke,
        });
    }

    pub fn text(&mut self, at: Point, text: impl Into<String>, font: Font, color: &str) {
        self.push(DrawCmd::Text {
            at,
            text: text.into(),
            font,
            color: color.to_string(),
            align: Align::Center,
            baseline: Baseline::Middle,
        });
    }

    pub fn text_left(&mut self, at: Point, text: impl Into<String>, font: Font, color: &str) {
        self.push(DrawCmd::Text {
            at,
            text: text.into(),
            font,
            color: color.to_string(),
            align: Align::Left,
            baseline: Baseline::Alphabetic,
        });
    }

    /// Straight arrow from `from` to `to`, both ends pulled in by `inset`
    /// so that it meets node circles at their rim.
    pub fn arrow(&mut self, from: Point, to: Point, inset: f64, stroke: Stroke) {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist <= inset * 2.0 {
            return;
        }
        let (ux, uy) = (dx / dist, dy / dist);
        let start = from.offset(ux * inset, uy * inset);
        let end = to.offset(-ux * inset, -uy * inset);
        let color = stroke.color.clone();
        self.line(start, end, stroke);
        self.arrow_head(end, dy.atan2(dx), 10.0, &color);
    }

    /// Filled triangular head with its tip at `tip`, pointing along `angle`.
    pub fn arrow_head(&mut self, tip: Point, angle: f64, len: f64, color: &str) {
        let spread = std::f64::consts::PI / 6.0;
        let a = tip.offset(-len * (angle - spread).cos(), -len * (angle - spread).sin());
        let b = tip.offset(-len * (angle + spread).cos(), -len * (angle + spread).sin());
        self.push(DrawCmd::Polygon {
            points: vec![tip, a, b],
            fill: color.to_string(),
        });
    }

    /// Texts in draw order; handy for assertions.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCmd::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn table(&self, slot: &str) -> Option<&TableView> {
        self.tables.iter().find(|t| t.slot == slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grow_never_shrinks() {
        let mut s = Scene::new(200.0, 100.0);
        s.grow_to(150.0, 300.0);
        assert_eq!((s.width, s.height), (200.0, 300.0));
    }

    #[test]
    fn arrow_is_inset_and_headed() {
        let mut s = Scene::new(100.0, 100.0);
        s.arrow(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 20.0, Stroke::solid("#999", 2.0));
        match &s.commands[0] {
            DrawCmd::Line { from, to, .. } => {
                assert_eq!(from.x, 20.0);
                assert_eq!(to.x, 80.0);
            }
            other => panic!("expected line, got {other:?}"),
        }
        assert!(matches!(s.commands[1], DrawCmd::Polygon { .. }));
    }

    #[test]
    fn arrow_between_overlapping_nodes_is_skipped() {
        let mut s = Scene::new(100.0, 100.0);
        s.arrow(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 20.0, Stroke::solid("#999", 2.0));
        assert!(s.is_blank());
    }

    #[test]
    fn font_css() {
        assert_eq!(Font::bold(14.0).css(), "bold 14px Arial");
        assert_eq!(Font::mono(14.0).css(), "14px Consolas");
    }
}
