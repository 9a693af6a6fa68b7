use serde::{Deserialize, Serialize};

use super::Visualizer;
use super::table::{CellValue, Table, cell, dom_table, filled};
use crate::error::InputError;
use crate::highlight::{CellMark, HighlightMap, Palette};
use crate::layout::Fit;
use crate::scene::{Font, Scene, Stroke};
use crate::step::Step;
use crate::validate;

pub const E_SLOT: &str = "table-e";
pub const W_SLOT: &str = "table-w";
pub const ROOT_SLOT: &str = "table-root";

pub const DEFAULT_Q0: f64 = 0.05;

const TREE_W: f64 = 800.0;
const TREE_H: f64 = 400.0;
const SOURCE_W: f64 = 1000.0;
const PADDING: f64 = 30.0;
const NODE_R: f64 = 20.0;

const PALETTE: Palette = Palette {
    target: "#fff3cd",
    candidate: "#cfe2ff",
    chosen: "#d4edda",
    path: "#d4edda",
    tags: &[],
};

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TreeNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub label: String,
    /// `key` or `dummy`.
    #[serde(rename = "type")]
    pub type_: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TreeEdge {
    pub from: String,
    pub to: String,
}

/// Tables are `(n+2) x (n+2)` and 1-based; `-1` marks infinity.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObstStep {
    pub e: Table,
    pub w: Table,
    pub root: Table,
    pub highlight: Vec<CellMark>,
    pub tree_nodes: Vec<TreeNode>,
    pub tree_edges: Vec<TreeEdge>,
    pub msg: String,
}

impl Step for ObstStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

impl ObstStep {
    fn keys(&self) -> usize {
        self.e.len().max(self.w.len()).max(self.root.len()).saturating_sub(2)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ObstRequest {
    pub p: Vec<f64>,
    /// `q0..qn`, or null to let the server derive them.
    pub q: Option<Vec<f64>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QMode {
    #[default]
    WithQ,
    WithoutQ,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KeyProb {
    pub p: f64,
    pub q: f64,
}

/// Keys `k1..kn` with their success probability and, in with-q mode, the
/// failure probability of the gap after them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyList {
    keys: Vec<KeyProb>,
    mode: QMode,
}

impl KeyList {
    pub fn keys(&self) -> &[KeyProb] {
        &self.keys
    }

    pub fn mode(&self) -> QMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: QMode) {
        self.mode = mode;
    }

    pub fn add(&mut self, p: &str, q: &str) -> Result<KeyProb, InputError> {
        let p = validate::probability("p", p)?;
        let q = match self.mode {
            QMode::WithQ => validate::probability("q", q)?,
            QMode::WithoutQ => 0.0,
        };
        let key = KeyProb { p, q };
        self.keys.push(key);
        Ok(key)
    }

    pub fn remove(&mut self, index: usize) -> Option<KeyProb> {
        (index < self.keys.len()).then(|| self.keys.remove(index))
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn request(&self, q0: &str) -> Result<ObstRequest, InputError> {
        let p: Vec<f64> = self.keys.iter().map(|k| k.p).collect();
        match self.mode {
            QMode::WithoutQ => validate::obst(&p, None),
            QMode::WithQ => {
                let mut q = vec![validate::probability("q0", q0)?];
                q.extend(self.keys.iter().map(|k| k.q));
                validate::obst(&p, Some(&q))
            }
        }
    }

    /// Empty tables for the keys entered so far.
    pub fn preview(&self, message: &str) -> ObstStep {
        let size = self.keys.len() + 2;
        ObstStep {
            e: filled(size, size, CellValue::Null),
            w: filled(size, size, CellValue::Null),
            root: filled(size, size, CellValue::Null),
            msg: message.to_string(),
            ..ObstStep::default()
        }
    }
}

fn display(v: &CellValue) -> String {
    match v.as_f64() {
        Some(f) if f == -1.0 => "∞".to_string(),
        _ => v.fixed(2),
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ObstViz;

impl Visualizer for ObstViz {
    type Step = ObstStep;
    type Context = ();

    fn capture(&self, _steps: &[ObstStep]) {}

    fn render(&self, step: &ObstStep, _ctx: &()) -> Scene {
        let n = step.keys();
        let (root_marks, e_marks): (Vec<CellMark>, Vec<CellMark>) =
            step.highlight.iter().cloned().partition(|m| m.tag() == Some("root"));
        let e_hl = HighlightMap::build(PALETTE, &e_marks, None);
        let root_hl = HighlightMap::build(PALETTE, &root_marks, None);
        let plain = HighlightMap::new(PALETTE);

        let header: Vec<String> = (0..=n).map(|j| j.to_string()).collect();
        let rows: Vec<(String, usize)> = (1..=n + 1).map(|i| (i.to_string(), i)).collect();
        let mut scene = Scene::new(TREE_W, TREE_H);
        for (slot, table, hl) in [
            (E_SLOT, &step.e, &e_hl),
            (W_SLOT, &step.w, &plain),
            (ROOT_SLOT, &step.root, &root_hl),
        ] {
            scene.tables.push(dom_table(slot, "", header.clone(), &rows, n + 1, hl, |r, c| {
                cell(table, r, c).map(display).unwrap_or_default()
            }));
        }

        if step.tree_nodes.is_empty() {
            return scene;
        }
        let max_y = step.tree_nodes.iter().map(|n| n.y).fold(0.0, f64::max);
        let fit = Fit::new(TREE_W, TREE_H, SOURCE_W, PADDING, max_y, 40.0);
        let pos = |id: &str| {
            step.tree_nodes
                .iter()
                .find(|n| n.id == id)
                .map(|n| fit.apply((n.x, n.y).into()))
        };
        for edge in &step.tree_edges {
            if let (Some(a), Some(b)) = (pos(&edge.from), pos(&edge.to)) {
                scene.line(a, b, Stroke::solid("#333", 2.0));
            }
        }
        for node in &step.tree_nodes {
            let at = fit.apply((node.x, node.y).into());
            let fill = if node.type_ == "key" { "#fff9c4" } else { "#e1bee7" };
            scene.circle(at, NODE_R, Some(fill), Some(Stroke::solid("#333", 2.0)));
            scene.text(at, node.label.clone(), Font::plain(14.0), "#000");
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
    fn key_list_builds_q_with_q0() {
        let mut keys = KeyList::default();
        keys.add("0.15", "0.1").unwrap();
        keys.add("0.1", "0.05").unwrap();
        let req = keys.request("0.05").unwrap();
        assert_eq!(req.p, vec![0.15, 0.1]);
        assert_eq!(req.q, Some(vec![0.05, 0.1, 0.05]));
        assert!(keys.request("").is_err());
    }

    #[test]
    fn without_q_sends_null() {
        let mut keys = KeyList::default();
        keys.set_mode(QMode::WithoutQ);
        keys.add("0.5", "").unwrap();
        let req = keys.request("").unwrap();
        assert_eq!(serde_json::to_value(&req).unwrap()["q"], serde_json::Value::Null);
        assert_eq!(KeyList::default().request("0.05"), Err(InputError::TooFew { what: "key", min: 1 }));
    }

    #[test]
    fn tables_span_rows_one_to_n_plus_one() {
        let mut keys = KeyList::default();
        keys.add("0.2", "0.1").unwrap();
        keys.add("0.3", "0.1").unwrap();
        let scene = ObstViz.render(&keys.preview(""), &());
        let e = scene.table(E_SLOT).unwrap();
        assert_eq!(e.header, vec!["0", "1", "2"]);
        assert_eq!(e.rows.first().unwrap().label, "1");
        assert_eq!(e.rows.last().unwrap().label, "3");
        assert!(scene.table(ROOT_SLOT).is_some());
        assert!(scene.commands.is_empty());
    }

    #[test]
    fn values_and_highlights() {
        let body = r#"{"n":1,"steps":[{"msg":"m",
            "e":[[0,0,0],[0,-1,0],[0,0.05,0]],"w":[[0,0,0],[0.05,0.3,0],[0,0,0.1]],"root":[[0,0,0],[0,0,1],[0,0,0]],
            "highlight":[{"r":1,"c":1,"type":"target"},{"r":1,"c":1,"type":"root"}],
            "tree_nodes":[{"id":"k1","x":500,"y":40,"label":"k1","type":"key"},{"id":"d0","x":250,"y":100,"label":"d0","type":"dummy"}],
            "tree_edges":[{"from":"k1","to":"d0"}]}]}"#;
        let fetched: Fetched<ObstStep> = decode_steps(body).unwrap();
        assert_eq!(fetched.meta["n"], 1);
        let scene = ObstViz.render(&fetched.steps[0], &());
        let e = scene.table(E_SLOT).unwrap();
        assert_eq!(e.rows[0].cells[1].text, "∞");
        assert_eq!(e.rows[0].cells[1].background.as_deref(), Some("#fff3cd"));
        assert_eq!(scene.table(W_SLOT).unwrap().rows[0].cells[0].text, "0.05");
        assert_eq!(scene.table(ROOT_SLOT).unwrap().rows[0].cells[1].background.as_deref(), Some("#d4edda"));
        let circles = scene.commands.iter().filter(|c| matches!(c, DrawCmd::Circle { .. })).count();
        assert_eq!(circles, 2);
        assert!(scene.commands.iter().any(|c| matches!(c, DrawCmd::Line { from, .. } if from.x == 400.0)));
    }
}
