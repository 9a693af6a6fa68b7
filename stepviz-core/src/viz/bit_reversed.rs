use serde::Deserialize;

use super::Visualizer;
use super::table::{CellValue, MAX_DIM};
use crate::scene::{Font, Point, Rect, Scene};
use crate::step::Step;

const BOX: f64 = 40.0;
const ARRAY_X: f64 = 50.0;
const ARRAY_Y: f64 = 50.0;
const BIT: f64 = 30.0;
const LABEL_X: f64 = 100.0;
const BITS_X: f64 = 350.0;
const X_ROW: f64 = 200.0;
const Y_ROW: f64 = 280.0;
const DEFAULT_BITS: usize = 4;
/// Widest counter drawn bit by bit.
const MAX_BITS: usize = 16;

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CounterPhase {
    #[default]
    Init,
    Check,
    Swap,
    Increment,
    Finish,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BitAction {
    #[default]
    FlipTo0,
    FlipTo1,
}

/// One flip made while scanning from the high bit down.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BitFlip {
    pub bit: i64,
    pub action: BitAction,
    pub current_val: i64,
}

/// One step of the bit-reversal permutation driven by a reversed counter.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct CounterStep {
    #[serde(rename = "type")]
    pub phase: CounterPhase,
    pub msg: String,
    pub k: Option<i64>,
    pub n: Option<i64>,
    pub arr: Option<Vec<CellValue>>,
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub prev_y: Option<i64>,
    pub new_y: Option<i64>,
    pub scan_steps: Vec<BitFlip>,
}

impl Step for CounterStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

/// Counter width, sent only by the opening step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Width(pub usize);

impl Default for Width {
    fn default() -> Self {
        Width(DEFAULT_BITS)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BitReversedViz;

impl BitReversedViz {
    fn draw_array(scene: &mut Scene, step: &CounterStep, arr: &[CellValue]) {
        let swap = step.phase == CounterPhase::Swap;
        let is = |v: Option<i64>, i: usize| v == Some(i as i64);
        scene.text_left(Point::new(ARRAY_X, ARRAY_Y - 12.0), "Array A:", Font::plain(14.0), "#000");
        for (i, v) in arr.iter().take(MAX_DIM).enumerate() {
            let rect = Rect::new(ARRAY_X + i as f64 * BOX, ARRAY_Y, BOX, BOX);
            let fill = if swap && (is(step.x, i) || is(step.y, i)) {
                "#ffcccc"
            } else if is(step.x, i) {
                "#ccffcc"
            } else if is(step.y, i) {
                "#ccccff"
            } else {
                "#fff"
            };
            scene.cell(rect, fill);
            scene.text(rect.center(), v.to_string(), Font::plain(14.0), "#000");
            scene.text(Point::new(rect.center().x, ARRAY_Y + BOX + 15.0), i.to_string(), Font::plain(10.0), "#666");
        }
    }

    /// Bits of `val`, high bit first, with flipped bits tinted.
    fn draw_bits(scene: &mut Scene, val: i64, k: usize, x0: f64, top: f64, flips: &[BitFlip]) {
        for i in (0..k).rev() {
            let x = x0 + (k - 1 - i) as f64 * BIT;
            let fill = match flips.iter().find(|f| f.bit == i as i64).map(|f| f.action) {
                Some(BitAction::FlipTo0) => "#ff9999",
                Some(BitAction::FlipTo1) => "#99ff99",
                None => "white",
            };
            let rect = Rect::new(x, top, BIT, BIT);
            scene.cell(rect, fill);
            scene.text(rect.center(), ((val >> i) & 1).to_string(), Font::plain(16.0), "#000");
            scene.text(Point::new(rect.center().x, top - 10.0), i.to_string(), Font::plain(10.0), "#999");
        }
    }
}

impl Visualizer for BitReversedViz {
    type Step = CounterStep;
    type Context = Width;

    fn capture(&self, steps: &[CounterStep]) -> Width {
        steps
            .iter()
            .find_map(|s| s.k)
            .and_then(|k| usize::try_from(k).ok())
            .map(|k| Width(k.clamp(1, MAX_BITS)))
            .unwrap_or_default()
    }

    fn render(&self, step: &CounterStep, width: &Width) -> Scene {
        let k = width.0.clamp(1, MAX_BITS);
        let cells = step.arr.as_ref().map_or(0, |a| a.len().min(MAX_DIM));
        let bits_end = BITS_X + 2.0 * k as f64 * BIT + 120.0;
        let mut scene = Scene::new((ARRAY_X * 2.0 + cells as f64 * BOX).max(bits_end).max(700.0), 340.0);

        if let Some(arr) = &step.arr {
            Self::draw_array(&mut scene, step, arr);
        }

        let x = step.x.unwrap_or(-1);
        if x >= 0 {
            scene.text_left(Point::new(LABEL_X, X_ROW), format!("Normal Counter x: {x}"), Font::plain(16.0), "#000");
            Self::draw_bits(&mut scene, x, k, BITS_X, X_ROW - 10.0, &[]);
        }

        let y = step.y.or(step.prev_y).unwrap_or(0);
        scene.text_left(Point::new(LABEL_X, Y_ROW), format!("Bit-reversed y: {y}"), Font::plain(16.0), "#000");
        match (step.phase, step.new_y) {
            (CounterPhase::Increment, Some(next)) => {
                Self::draw_bits(&mut scene, y, k, BITS_X, Y_ROW - 10.0, &step.scan_steps);
                let after = BITS_X + k as f64 * BIT;
                scene.text_left(Point::new(after + 20.0, Y_ROW), format!("➔  {next}"), Font::plain(16.0), "#000");
                Self::draw_bits(&mut scene, next, k, after + 80.0, Y_ROW - 10.0, &[]);
            }
            _ => Self::draw_bits(&mut scene, y, k, BITS_X, Y_ROW - 10.0, &[]),
        }
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::DrawCmd;

    fn fills(scene: &Scene) -> Vec<&str> {
        scene
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::FillRect { color, .. } => Some(color.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn width_comes_from_init_step() {
        let steps: Vec<CounterStep> = serde_json::from_str(
            r#"[{"type":"init","k":3,"n":8,"arr":[0,1,2,3,4,5,6,7],"msg":"init"},{"type":"finish","arr":[0,4,2,6,1,5,3,7]}]"#,
        )
        .unwrap();
        assert_eq!(BitReversedViz.capture(&steps), Width(3));
        assert_eq!(BitReversedViz.capture(&[]), Width(4));
    }

    #[test]
    fn swap_tints_both_cells_red() {
        let step: CounterStep =
            serde_json::from_str(r#"{"type":"swap","x":1,"y":8,"arr":[0,8,2,3,4,5,6,7,1,9,10,11,12,13,14,15]}"#).unwrap();
        let scene = BitReversedViz.render(&step, &Width(4));
        let f = fills(&scene);
        assert_eq!(f[1], "#ffcccc");
        assert_eq!(f[8], "#ffcccc");
        assert_eq!(f[0], "#fff");
        assert!(scene.texts().any(|t| t == "Normal Counter x: 1"));
        assert!(scene.texts().any(|t| t == "Bit-reversed y: 8"));
    }

    #[test]
    fn increment_tints_flipped_bits_and_shows_next_value() {
        // y = 1100 -> 0010
        let step: CounterStep = serde_json::from_str(
            r#"{"type":"increment","prev_y":12,"new_y":2,"scan_steps":[
                {"bit":3,"action":"flip_to_0","current_val":4},
                {"bit":2,"action":"flip_to_0","current_val":0},
                {"bit":1,"action":"flip_to_1","current_val":2}]}"#,
        )
        .unwrap();
        let scene = BitReversedViz.render(&step, &Width(4));
        let f = fills(&scene);
        assert_eq!(&f[..4], &["#ff9999", "#ff9999", "#99ff99", "white"]);
        assert_eq!(&f[4..], &["white"; 4]);
        assert!(scene.texts().any(|t| t == "➔  2"));
        assert!(!scene.texts().any(|t| t.starts_with("Normal Counter")));
    }
}
