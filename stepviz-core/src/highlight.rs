//! Cell highlight resolution shared by the table renderers.
//!
//! A step marks cells with a free-form `type` tag and sometimes an explicit
//! color. Tags are folded into four [`HighlightKind`]s with a fixed
//! precedence; the cell under computation is always applied last so it wins
//! over every other mark.

use std::collections::HashMap;

use serde::Deserialize;

/// Highlight kinds in increasing precedence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HighlightKind {
    Candidate,
    Path,
    Chosen,
    Target,
}

impl HighlightKind {
    pub fn from_tag(tag: Option<&str>) -> HighlightKind {
        match tag.unwrap_or("") {
            "target" | "current" => HighlightKind::Target,
            "path" => HighlightKind::Path,
            "final" | "root" | "leaf" | "split" | "add_augment" | "chosen" => HighlightKind::Chosen,
            _ => HighlightKind::Candidate,
        }
    }
}

/// A highlighted cell as sent by the server.
///
/// Tables address cells with `r`/`c`; one-dimensional arrays use `index`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct CellMark {
    pub r: Option<i64>,
    pub c: Option<i64>,
    pub index: Option<i64>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub color: Option<String>,
    pub label: Option<String>,
}

impl CellMark {
    pub fn at(r: usize, c: usize) -> Self {
        CellMark {
            r: Some(r as i64),
            c: Some(c as i64),
            ..CellMark::default()
        }
    }

    pub fn tagged(mut self, tag: &str) -> Self {
        self.type_ = Some(tag.to_string());
        self
    }

    pub fn colored(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Cell coordinate, `None` when the mark is malformed.
    pub fn cell(&self) -> Option<(usize, usize)> {
        match (self.r, self.c, self.index) {
            (Some(r), Some(c), _) if r >= 0 && c >= 0 => Some((r as usize, c as usize)),
            (None, None, Some(i)) if i >= 0 => Some((0, i as usize)),
            _ => None,
        }
    }

    pub fn kind(&self) -> HighlightKind {
        HighlightKind::from_tag(self.type_.as_deref())
    }

    pub fn tag(&self) -> Option<&str> {
        self.type_.as_deref()
    }
}

/// Current-cell pointer used by several schemas (`{r, c}`).
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct CellRef {
    pub r: i64,
    pub c: i64,
}

impl CellRef {
    pub fn cell(&self) -> Option<(usize, usize)> {
        (self.r >= 0 && self.c >= 0).then_some((self.r as usize, self.c as usize))
    }
}

/// Fixed colors per kind, with optional per-tag overrides.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub target: &'static str,
    pub candidate: &'static str,
    pub chosen: &'static str,
    pub path: &'static str,
    pub tags: &'static [(&'static str, &'static str)],
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            target: "#ffff99",
            candidate: "#aaddff",
            chosen: "#d4edda",
            path: "#ffcc00",
            tags: &[],
        }
    }
}

impl Palette {
    pub fn color_of(&self, kind: HighlightKind, tag: Option<&str>) -> &'static str {
        if let Some(tag) = tag
            && let Some((_, color)) = self.tags.iter().find(|(t, _)| *t == tag)
        {
            return color;
        }
        match kind {
            HighlightKind::Target => self.target,
            HighlightKind::Candidate => self.candidate,
            HighlightKind::Chosen => self.chosen,
            HighlightKind::Path => self.path,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Applied {
    kind: HighlightKind,
    color: String,
    label: Option<String>,
}

/// Resolved highlights for one rendered frame.
#[derive(Clone, Debug)]
pub struct HighlightMap {
    palette: Palette,
    cells: HashMap<(usize, usize), Applied>,
}

impl HighlightMap {
    pub fn new(palette: Palette) -> Self {
        HighlightMap {
            palette,
            cells: HashMap::new(),
        }
    }

    /// Build from a step's marks followed by its current cell.
    pub fn build(palette: Palette, marks: &[CellMark], current: Option<(usize, usize)>) -> Self {
        let mut map = HighlightMap::new(palette);
        for m in marks {
            map.apply(m);
        }
        if let Some((r, c)) = current {
            map.set_current(r, c);
        }
        map
    }

    /// Apply one mark. A higher kind replaces a lower one; between marks of
    /// the same kind the first one stays. Malformed marks are skipped.
    pub fn apply(&mut self, mark: &CellMark) {
        let Some(cell) = mark.cell() else {
            return;
        };
        let kind = mark.kind();
        let color = mark
            .color
            .clone()
            .unwrap_or_else(|| self.palette.color_of(kind, mark.tag()).to_string());
        self.insert(cell, kind, color, mark.label.clone());
    }

    pub fn set_current(&mut self, r: usize, c: usize) {
        let color = self.palette.target.to_string();
        self.cells.insert(
            (r, c),
            Applied {
                kind: HighlightKind::Target,
                color,
                label: None,
            },
        );
    }

    fn insert(&mut self, cell: (usize, usize), kind: HighlightKind, color: String, label: Option<String>) {
        match self.cells.get(&cell) {
            Some(prev) if prev.kind >= kind => {}
            _ => {
                self.cells.insert(cell, Applied { kind, color, label });
            }
        }
    }

    pub fn color_at(&self, r: usize, c: usize) -> Option<&str> {
        self.cells.get(&(r, c)).map(|a| a.color.as_str())
    }

    pub fn kind_at(&self, r: usize, c: usize) -> Option<HighlightKind> {
        self.cells.get(&(r, c)).map(|a| a.kind)
    }

    pub fn label_at(&self, r: usize, c: usize) -> Option<&str> {
        self.cells.get(&(r, c)).and_then(|a| a.label.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_cell_wins_over_everything() {
        let marks = vec![CellMark::at(1, 1).tagged("final"), CellMark::at(1, 1).tagged("path")];
        let map = HighlightMap::build(Palette::default(), &marks, Some((1, 1)));
        assert_eq!(map.kind_at(1, 1), Some(HighlightKind::Target));
        assert_eq!(map.color_at(1, 1), Some("#ffff99"));
    }

    #[test]
    fn same_kind_keeps_first_mark() {
        let marks = vec![
            CellMark::at(0, 2).colored("#aaddff"),
            CellMark::at(0, 2).colored("#aaffaa"),
        ];
        let map = HighlightMap::build(Palette::default(), &marks, None);
        assert_eq!(map.color_at(0, 2), Some("#aaddff"));
    }

    #[test]
    fn higher_kind_replaces_lower() {
        let marks = vec![CellMark::at(2, 3), CellMark::at(2, 3).tagged("final")];
        let map = HighlightMap::build(Palette::default(), &marks, None);
        assert_eq!(map.kind_at(2, 3), Some(HighlightKind::Chosen));
    }

    #[test]
    fn tag_colors_override_kind_colors() {
        let palette = Palette {
            tags: &[("split", "#cfe2ff")],
            ..Palette::default()
        };
        let map = HighlightMap::build(palette, &[CellMark::at(1, 2).tagged("split")], None);
        assert_eq!(map.color_at(1, 2), Some("#cfe2ff"));
    }

    #[test]
    fn malformed_marks_are_skipped() {
        let bad: CellMark = serde_json::from_str(r#"{"r": -1, "type": "target"}"#).unwrap();
        let map = HighlightMap::build(Palette::default(), &[bad], None);
        assert!(map.is_empty());
    }

    #[test]
    fn index_marks_address_row_zero() {
        let m: CellMark = serde_json::from_str(r#"{"index": 4, "type": "remainder"}"#).unwrap();
        assert_eq!(m.cell(), Some((0, 4)));
        assert_eq!(m.kind(), HighlightKind::Candidate);
    }
}
