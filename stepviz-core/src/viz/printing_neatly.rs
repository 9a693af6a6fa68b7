use serde::{Deserialize, Serialize};

use super::Visualizer;
use super::table::{CellValue, MAX_DIM};
use crate::scene::{DrawCmd, Font, Point, Rect, Scene, Stroke, TableCell, TableRow, TableView};
use crate::step::Step;

pub const DP_SLOT: &str = "dpTable";

const W: f64 = 800.0;
const MIN_H: f64 = 360.0;
const MARGIN: f64 = 20.0;
const LINE_H: f64 = 26.0;
const RULER_UNIT: f64 = 10.0;
const WORD_FONT: Font = Font::plain(16.0);

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PrintingNeatlyRequest {
    pub text: String,
    #[serde(rename = "M")]
    pub m: i64,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NeatPhase {
    #[default]
    Init,
    DpStep,
    Result,
}

/// A way to end the current prefix: the last line holds words
/// `words_indices[0]..=words_indices[1]` (0-based) and starts at word `i`
/// (1-based).
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct LineCandidate {
    pub i: i64,
    pub prev_cost: CellValue,
    pub line_cost: CellValue,
    pub total: CellValue,
    pub words_indices: Vec<i64>,
}

/// One step of the line-breaking DP. `c[j]` is the best cost of the first
/// `j` words, `"∞"` while no break is feasible.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct NeatStep {
    #[serde(rename = "type")]
    pub phase: NeatPhase,
    pub msg: String,
    pub words: Vec<String>,
    #[serde(rename = "M")]
    pub m: Option<i64>,
    pub j: usize,
    pub c: Vec<CellValue>,
    pub candidates: Vec<LineCandidate>,
    pub best_i: i64,
    pub best_val: CellValue,
    pub lines: Vec<String>,
    pub final_cost: CellValue,
}

impl Step for NeatStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

/// The paragraph and width, sent only by the opening step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Paragraph {
    pub words: Vec<String>,
    pub m: i64,
}

impl Paragraph {
    /// Words `best_i-1 ..= j-1` form the chosen last line.
    fn chosen(step: &NeatStep) -> Option<std::ops::Range<usize>> {
        let start = usize::try_from(step.best_i.checked_sub(1)?).ok()?;
        (start < step.j).then_some(start..step.j)
    }

    fn word_text(&self, cand: &LineCandidate) -> String {
        match cand.words_indices.as_slice() {
            [a, b] => {
                let (a, b) = (usize::try_from(*a).unwrap_or(0), usize::try_from(*b).unwrap_or(0));
                self.words.get(a..=b.min(self.words.len().saturating_sub(1))).map(|w| w.join(" ")).unwrap_or_default()
            }
            _ => String::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PrintingNeatlyViz;

impl PrintingNeatlyViz {
    /// Flow the words left to right, wrapping at the surface edge. Returns
    /// the y just below the last row.
    fn draw_words(scene: &mut Scene, words: &[String], marked: Option<std::ops::Range<usize>>) -> f64 {
        let space = WORD_FONT.approx_width(" ");
        let (mut x, mut y) = (MARGIN, MARGIN + LINE_H);
        for (k, word) in words.iter().take(MAX_DIM).enumerate() {
            let w = WORD_FONT.approx_width(word);
            if x + w > W - MARGIN && x > MARGIN {
                x = MARGIN;
                y += LINE_H;
            }
            if marked.as_ref().is_some_and(|r| r.contains(&k)) {
                scene.fill_rect(Rect::new(x - 2.0, y - LINE_H + 6.0, w + 4.0, LINE_H - 2.0), "#d1e7dd");
            }
            scene.text_left(Point::new(x, y), word.clone(), WORD_FONT, "#000");
            x += w + space;
        }
        y + 10.0
    }

    fn draw_ruler(scene: &mut Scene, m: i64, y: f64) -> f64 {
        let len = (m.clamp(0, MAX_DIM as i64) as f64 * RULER_UNIT).min(W - 2.0 * MARGIN);
        scene.push(DrawCmd::Line {
            from: Point::new(MARGIN, y),
            to: Point::new(MARGIN + len, y),
            stroke: Stroke::dashed("red", 2.0, 6.0, 4.0),
        });
        scene.text_left(Point::new(MARGIN, y + 20.0), format!("Width: {m} chars"), Font::plain(14.0), "#000");
        y + 40.0
    }

    fn draw_candidates(scene: &mut Scene, step: &NeatStep, para: &Paragraph, mut y: f64) {
        scene.text_left(Point::new(MARGIN, y), format!("c[{}] candidates:", step.j), Font::bold(14.0), "#000");
        for cand in step.candidates.iter().take(MAX_DIM) {
            y += LINE_H;
            let best = cand.i == step.best_i;
            if best {
                scene.fill_rect(Rect::new(MARGIN - 4.0, y - LINE_H + 6.0, W - 2.0 * MARGIN, LINE_H - 2.0), "#d1e7dd");
            }
            let line = format!(
                "Words[{}..{}] \"{}\": c[{}] + lc[{}, {}] = {} + {} = {}",
                cand.i,
                step.j,
                para.word_text(cand),
                cand.i - 1,
                cand.i,
                step.j,
                cand.prev_cost,
                cand.line_cost,
                cand.total
            );
            scene.text_left(Point::new(MARGIN, y), line, Font::plain(13.0), if best { "#0f5132" } else { "#333" });
        }
        scene.grow_to(W, y + MARGIN);
    }

    fn draw_result(scene: &mut Scene, step: &NeatStep) {
        let font = Font::mono(16.0);
        let lines = &step.lines[..step.lines.len().min(MAX_DIM)];
        let width = lines.iter().map(|l| font.approx_width(l)).fold(0.0, f64::max) + 20.0;
        let height = lines.len() as f64 * LINE_H + 20.0;
        let top = MARGIN + 20.0;
        scene.text_left(Point::new(MARGIN, MARGIN + 4.0), "Result:", Font::bold(16.0), "#000");
        scene.fill_rect(Rect::new(MARGIN, top, width, height), "#fff");
        scene.stroke_rect(Rect::new(MARGIN, top, width, height), "#333", 1.0);
        for (k, line) in lines.iter().enumerate() {
            scene.text_left(Point::new(MARGIN + 10.0, top + 10.0 + (k + 1) as f64 * LINE_H - 8.0), line.clone(), font, "#000");
        }
        scene.text_left(
            Point::new(MARGIN, top + height + 30.0),
            format!("Total cost: {}", step.final_cost),
            Font::bold(14.0),
            "#198754",
        );
        scene.grow_to(MARGIN * 2.0 + width, top + height + 50.0);
    }

    fn dp_table(step: &NeatStep, para: &Paragraph) -> TableView {
        let n = para.words.len().min(MAX_DIM);
        let value = |k: usize| match step.c.get(k) {
            Some(v) => v.to_string(),
            None if k == 0 => "0".to_string(),
            None => "∞".to_string(),
        };
        let current = (step.phase == NeatPhase::DpStep).then_some(step.j);
        TableView {
            slot: DP_SLOT,
            corner: "j".to_string(),
            header: (0..=n).map(|k| k.to_string()).collect(),
            rows: vec![TableRow {
                label: "c[j]".to_string(),
                cells: (0..=n)
                    .map(|k| TableCell::text(value(k)).with_background((current == Some(k)).then_some("#cfe2ff")))
                    .collect(),
                background: None,
            }],
        }
    }
}

impl Visualizer for PrintingNeatlyViz {
    type Step = NeatStep;
    type Context = Paragraph;

    fn capture(&self, steps: &[NeatStep]) -> Paragraph {
        steps
            .iter()
            .find(|s| s.phase == NeatPhase::Init)
            .map(|s| Paragraph {
                words: s.words.clone(),
                m: s.m.unwrap_or(0),
            })
            .unwrap_or_default()
    }

    fn render(&self, step: &NeatStep, para: &Paragraph) -> Scene {
        let mut scene = Scene::new(W, MIN_H);
        if step.phase != NeatPhase::Result {
            scene.tables.push(Self::dp_table(step, para));
        }
        match step.phase {
            NeatPhase::Init => {
                let words = if step.words.is_empty() { &para.words } else { &step.words };
                let y = Self::draw_words(&mut scene, words, None);
                let y = Self::draw_ruler(&mut scene, step.m.unwrap_or(para.m), y + 10.0);
                scene.grow_to(W, y);
            }
            NeatPhase::DpStep => {
                let y = Self::draw_words(&mut scene, &para.words, Paragraph::chosen(step));
                Self::draw_candidates(&mut scene, step, para, y + 30.0);
            }
            NeatPhase::Result => Self::draw_result(&mut scene, step),
        }
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run() -> Vec<NeatStep> {
        serde_json::from_str(
            r#"[
            {"type":"init","msg":"init","words":["aaa","bb","cc"],"M":6},
            {"type":"dp_step","j":1,"c":[0,27,"∞","∞"],"best_i":1,"best_val":27,"msg":"c[1]",
             "candidates":[{"i":1,"prev_cost":0,"line_cost":27,"total":27,"words_indices":[0,0]}]},
            {"type":"dp_step","j":2,"c":[0,27,0,"∞"],"best_i":1,"best_val":0,"msg":"c[2]",
             "candidates":[{"i":1,"prev_cost":0,"line_cost":0,"total":0,"words_indices":[0,1]},
                           {"i":2,"prev_cost":27,"line_cost":64,"total":91,"words_indices":[1,1]}]},
            {"type":"result","lines":["aaa bb","cc"],"final_cost":8,"msg":"done"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn paragraph_is_captured_from_init() {
        let steps = run();
        let para = PrintingNeatlyViz.capture(&steps);
        assert_eq!(para.words, vec!["aaa", "bb", "cc"]);
        assert_eq!(para.m, 6);
    }

    #[test]
    fn dp_step_marks_current_cell_and_best_line() {
        let steps = run();
        let para = PrintingNeatlyViz.capture(&steps);
        let scene = PrintingNeatlyViz.render(&steps[2], &para);
        let table = scene.table(DP_SLOT).unwrap();
        assert_eq!(table.header, vec!["0", "1", "2", "3"]);
        let row = &table.rows[0];
        assert_eq!(row.cells[3].text, "∞");
        assert_eq!(row.cells[2].background.as_deref(), Some("#cfe2ff"));
        assert!(row.cells[1].background.is_none());
        let marked = scene
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::FillRect { color, .. } if color == "#d1e7dd"))
            .count();
        // two chosen words plus the best candidate row
        assert_eq!(marked, 3);
        assert!(scene.texts().any(|t| t.contains("\"aaa bb\"") && t.ends_with("= 0")));
    }

    #[test]
    fn init_shows_ruler_and_empty_table() {
        let steps = run();
        let para = PrintingNeatlyViz.capture(&steps);
        let scene = PrintingNeatlyViz.render(&steps[0], &para);
        assert!(scene.texts().any(|t| t == "Width: 6 chars"));
        let cells: Vec<_> = scene.table(DP_SLOT).unwrap().rows[0].cells.iter().map(|c| c.text.clone()).collect();
        assert_eq!(cells, vec!["0", "∞", "∞", "∞"]);
    }

    #[test]
    fn result_prints_lines_in_mono() {
        let steps = run();
        let para = PrintingNeatlyViz.capture(&steps);
        let scene = PrintingNeatlyViz.render(&steps[3], &para);
        assert!(scene.tables.is_empty());
        let mono: Vec<_> = scene
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Text { text, font, .. } if font.family == "Consolas" => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(mono, vec!["aaa bb", "cc"]);
        assert!(scene.texts().any(|t| t == "Total cost: 8"));
    }
}
