use serde::{Deserialize, Serialize};

use super::Visualizer;
use super::table::clamp_dim;
use crate::error::InputError;
use crate::highlight::{CellMark, HighlightMap, Palette};
use crate::scene::{Font, Point, Rect, Scene};
use crate::step::Step;
use crate::validate;

const START_Y: f64 = 40.0;
const ROW_H: f64 = 40.0;
const COL_W: f64 = 60.0;
const HEADER_W: f64 = 60.0;
const ROD_SCALE: f64 = 40.0;
const BAR_H: f64 = 30.0;
const DEFAULT_LENGTH: i64 = 5;

const PALETTE: Palette = Palette {
    target: "#fff3cd",
    candidate: "#d1e7dd",
    chosen: "#d4edda",
    path: "#d4edda",
    tags: &[],
};

/// One step of the bottom-up rod cutting loop. `-1` means "not set" for
/// `i`, `j` and `q`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RodCuttingStep {
    pub prices: Vec<i64>,
    pub r: Vec<i64>,
    pub s: Vec<i64>,
    pub j: i64,
    pub i: i64,
    pub q: i64,
    pub p_i: Option<i64>,
    pub r_remainder: Option<i64>,
    pub current_val: Option<i64>,
    pub best_cut: Option<i64>,
    pub updated: bool,
    pub highlight: Vec<CellMark>,
    pub msg: String,
}

impl Default for RodCuttingStep {
    fn default() -> Self {
        RodCuttingStep {
            prices: Vec::new(),
            r: Vec::new(),
            s: Vec::new(),
            j: -1,
            i: -1,
            q: -1,
            p_i: None,
            r_remainder: None,
            current_val: None,
            best_cut: None,
            updated: false,
            highlight: Vec::new(),
            msg: String::new(),
        }
    }
}

impl Step for RodCuttingStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

impl RodCuttingStep {
    /// Formula line for the caption; `None` before the loop starts.
    pub fn formula(&self) -> Option<String> {
        if self.i != -1 && self.j != -1 {
            let p_i = self.p_i.unwrap_or(0);
            let rem = self.r_remainder.unwrap_or(0);
            let val = self.current_val.unwrap_or(p_i + rem);
            let q = if self.q == -1 { "-∞".to_string() } else { self.q.to_string() };
            Some(format!(
                "計算 r[{j}]\n嘗試切 i={i}: p[{i}] + r[{rest}]\n= {p_i} + {rem} = {val}\n比較: max({q}, {val}) -> {best}",
                j = self.j,
                i = self.i,
                rest = self.j - self.i,
                best = self.q.max(val),
            ))
        } else if self.j != -1 {
            Some(format!("準備計算 r[{}]...", self.j))
        } else if self.q == -1 {
            None
        } else {
            Some("完成".to_string())
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RodCuttingRequest {
    pub n: i64,
    pub prices: Vec<i64>,
}

/// `(length, price)` pairs kept sorted by length, one per length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PriceList {
    entries: Vec<(i64, i64)>,
}

impl PriceList {
    pub fn entries(&self) -> &[(i64, i64)] {
        &self.entries
    }

    /// Add a price, replacing the existing one for the same length.
    pub fn add(&mut self, length: &str, price: &str) -> Result<(), InputError> {
        let length = validate::bounded_int("length", length, validate::MAX_ROD_LENGTH)?;
        let price = validate::non_negative_int("price", price)?;
        match self.entries.binary_search_by_key(&length, |&(l, _)| l) {
            Ok(i) => self.entries[i].1 = price,
            Err(i) => self.entries.insert(i, (length, price)),
        }
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<(i64, i64)> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Dense price array, `prices[len - 1] = price`, long enough for a rod of
    /// length `n` and for every entered length. Missing lengths cost 0.
    /// Lengths beyond the accepted maximum are dropped.
    pub fn prices(&self, n: i64) -> Vec<i64> {
        let max_len = self.entries.last().map_or(n, |&(l, _)| l.max(n));
        let mut prices = vec![0; clamp_dim(max_len.min(validate::MAX_ROD_LENGTH))];
        for &(l, p) in &self.entries {
            if let Some(slot) = usize::try_from(l - 1).ok().and_then(|i| prices.get_mut(i)) {
                *slot = p;
            }
        }
        prices
    }

    pub fn request(&self, length: &str) -> Result<RodCuttingRequest, InputError> {
        let n = validate::bounded_int("length", length, validate::MAX_ROD_LENGTH)?;
        validate::rod_cutting(length, &self.prices(n))
    }

    pub fn preview(&self, length: &str, message: &str) -> RodCuttingStep {
        let n = match validate::preview_size(length, validate::MAX_ROD_LENGTH) {
            0 => DEFAULT_LENGTH,
            n => n,
        };
        let prices = self.prices(n);
        let cols = prices.len() + 1;
        RodCuttingStep {
            prices,
            r: vec![0; cols],
            s: vec![0; cols],
            msg: message.to_string(),
            ..RodCuttingStep::default()
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RodCuttingViz;

impl RodCuttingViz {
    fn draw_rod(scene: &mut Scene, step: &RodCuttingStep, origin: Point) {
        if step.i < 0 || step.j < 0 {
            return;
        }
        let font = Font::plain(16.0);
        let rod_x = origin.x + 20.0;
        let bar_y = origin.y + 30.0;
        let (i, j) = (step.i as f64, step.j as f64);

        scene.text_left(Point::new(rod_x, origin.y), "當前計算狀態:", font, "black");
        scene.stroke_rect(Rect::new(rod_x, bar_y, j * ROD_SCALE, BAR_H), "#ccc", 1.0);
        scene.text_left(Point::new(rod_x, bar_y - 5.0), format!("Length {}", step.j), font, "#999");

        scene.fill_rect(Rect::new(rod_x, bar_y, i * ROD_SCALE, BAR_H), "#0d6efd");
        scene.text(
            Point::new(rod_x + i * ROD_SCALE / 2.0, bar_y + BAR_H / 2.0),
            step.i.to_string(),
            font,
            "white",
        );
        let rem = step.j - step.i;
        if rem > 0 {
            let w = rem as f64 * ROD_SCALE;
            scene.fill_rect(Rect::new(rod_x + i * ROD_SCALE, bar_y, w, BAR_H), "#198754");
            scene.text(
                Point::new(rod_x + i * ROD_SCALE + w / 2.0, bar_y + BAR_H / 2.0),
                rem.to_string(),
                font,
                "white",
            );
        }

        let p_i = step.p_i.unwrap_or(0);
        let r_rem = step.r_remainder.unwrap_or(0);
        scene.text_left(Point::new(rod_x, bar_y + 50.0), format!("Price p[{}] = {p_i}", step.i), font, "black");
        scene.text_left(Point::new(rod_x, bar_y + 70.0), format!("Max Rev r[{rem}] = {r_rem}"), font, "black");
        scene.text_left(
            Point::new(rod_x, bar_y + 95.0),
            format!("Total = {}", step.current_val.unwrap_or(p_i + r_rem)),
            Font::bold(16.0),
            "black",
        );
    }
}

impl Visualizer for RodCuttingViz {
    type Step = RodCuttingStep;
    type Context = ();

    fn capture(&self, _steps: &[RodCuttingStep]) {}

    fn render(&self, step: &RodCuttingStep, _ctx: &()) -> Scene {
        let len = step.r.len();
        let mut scene = Scene::new(60.0 + COL_W * len as f64 + 50.0, START_Y + ROW_H * 4.0 + 200.0);
        let bold = Font::bold(14.0);

        for (k, label) in ["i", "p[i]", "r[i]", "c[i]"].into_iter().enumerate() {
            let rect = Rect::new(0.0, START_Y + k as f64 * ROW_H, HEADER_W, ROW_H);
            scene.cell(rect, "#e0e0e0");
            scene.text(rect.center(), label, bold, "black");
        }

        let hl = HighlightMap::build(PALETTE, &step.highlight, None);
        for j in 0..len {
            let x = HEADER_W + j as f64 * COL_W;
            let fill = hl
                .color_at(0, j)
                .or((step.j == j as i64).then_some(PALETTE.target))
                .unwrap_or("white");
            scene.fill_rect(Rect::new(x, START_Y, COL_W, ROW_H * 4.0), fill);

            let price = j.checked_sub(1).and_then(|k| step.prices.get(k)).copied().unwrap_or(0);
            let values = [
                j as i64,
                price,
                step.r.get(j).copied().unwrap_or(0),
                step.s.get(j).copied().unwrap_or(0),
            ];
            for (k, value) in values.into_iter().enumerate() {
                let rect = Rect::new(x, START_Y + k as f64 * ROW_H, COL_W, ROW_H);
                scene.stroke_rect(rect, "#dee2e6", 1.0);
                scene.text(rect.center(), value.to_string(), bold, "black");
            }
        }
        scene.stroke_rect(Rect::new(HEADER_W, START_Y, COL_W * len as f64, ROW_H * 4.0), "black", 2.0);
        scene.stroke_rect(Rect::new(0.0, START_Y, HEADER_W, ROW_H * 4.0), "black", 2.0);

        Self::draw_rod(&mut scene, step, Point::new(HEADER_W, START_Y + ROW_H * 4.0 + 40.0));
        scene.caption = step.formula();
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::DrawCmd;

    fn column_fill(scene: &Scene, j: usize) -> Option<String> {
        let x = HEADER_W + j as f64 * COL_W;
        scene.commands.iter().find_map(|c| match c {
            DrawCmd::FillRect { rect, color } if rect.x == x && rect.h == ROW_H * 4.0 => Some(color.clone()),
            _ => None,
        })
    }

    #[test]
    fn price_list_stays_sorted_and_unique() {
        let mut list = PriceList::default();
        list.add("4", "9").unwrap();
        list.add("1", "1").unwrap();
        list.add("4", "10").unwrap();
        assert_eq!(list.entries(), &[(1, 1), (4, 10)]);
        assert_eq!(list.prices(3), vec![1, 0, 0, 10]);
        assert_eq!(list.prices(6), vec![1, 0, 0, 10, 0, 0]);
        assert!(list.add("0", "1").is_err());
        assert!(list.add("2", "-1").is_err());
    }

    #[test]
    fn huge_lengths_are_refused() {
        let mut list = PriceList::default();
        assert_eq!(
            list.add("100000000000", "3"),
            Err(InputError::TooLarge { field: "length", max: validate::MAX_ROD_LENGTH })
        );
        list.add("2", "5").unwrap();
        assert_eq!(list.prices(i64::MAX).len(), validate::MAX_ROD_LENGTH as usize);
        assert!(list.request("100000000000").is_err());
        let preview = list.preview("100000000000", "p");
        assert_eq!(preview.r.len(), validate::MAX_ROD_LENGTH as usize + 1);
    }

    #[test]
    fn request_pads_prices() {
        let mut list = PriceList::default();
        list.add("2", "5").unwrap();
        let req = list.request("4").unwrap();
        assert_eq!(req, RodCuttingRequest { n: 4, prices: vec![0, 5, 0, 0] });
        assert!(list.request("0").is_err());
    }

    #[test]
    fn preview_defaults_to_length_five() {
        let scene = RodCuttingViz.render(&PriceList::default().preview("", ""), &());
        assert_eq!(scene.width, 60.0 + 60.0 * 6.0 + 50.0);
        assert_eq!(scene.caption, None);
    }

    #[test]
    fn inner_step_highlights_and_draws_rod() {
        let step: RodCuttingStep = serde_json::from_str(
            r#"{"prices":[1,5,8],"r":[0,1,5,0],"s":[0,1,2,0],"j":3,"i":1,"p_i":1,"r_remainder":5,
                "current_val":6,"q":6,"best_cut":1,"updated":true,"msg":"",
                "highlight":[{"index":3,"type":"target"},{"index":2,"type":"remainder"}]}"#,
        )
        .unwrap();
        let scene = RodCuttingViz.render(&step, &());
        assert_eq!(column_fill(&scene, 3).as_deref(), Some("#fff3cd"));
        assert_eq!(column_fill(&scene, 2).as_deref(), Some("#d1e7dd"));
        assert_eq!(column_fill(&scene, 0).as_deref(), Some("white"));
        assert!(scene.texts().any(|t| t == "Total = 6"));
        assert!(scene.caption.unwrap().contains("= 1 + 5 = 6"));
    }

    #[test]
    fn final_color_beats_current_column() {
        let step = RodCuttingStep {
            r: vec![0, 1],
            s: vec![0, 1],
            j: 1,
            q: 1,
            highlight: vec![CellMark {
                index: Some(1),
                type_: Some("final".into()),
                ..CellMark::default()
            }],
            ..RodCuttingStep::default()
        };
        let scene = RodCuttingViz.render(&step, &());
        assert_eq!(column_fill(&scene, 1).as_deref(), Some("#d4edda"));
        assert_eq!(step.formula().as_deref(), Some("準備計算 r[1]..."));
    }
}
