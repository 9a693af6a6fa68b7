use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use super::Visualizer;
use super::table::CellValue;
use crate::scene::{Font, Point, Rect, Scene, Stroke, TableCell, TableRow, TableView};
use crate::step::Step;

pub const L_SLOT: &str = "lTable";

const NODE_R: f64 = 25.0;
const MIN_W: f64 = 700.0;
const MIN_H: f64 = 400.0;

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct EdgeRef {
    pub from: usize,
    pub to: usize,
}

/// One step of the longest-path proof. Nodes are referred to by index in
/// `adj`, `node_coords` and the highlights, and by name in `L` and
/// `current_node`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DagStep {
    pub nodes: Vec<String>,
    /// Outgoing `(target, weight)` pairs per node index.
    pub adj: BTreeMap<usize, Vec<(usize, CellValue)>>,
    pub node_coords: BTreeMap<usize, Point>,
    #[serde(rename = "L")]
    pub l: HashMap<String, CellValue>,
    pub topo_order: Vec<String>,
    pub highlight_nodes: Vec<usize>,
    pub highlight_edges: Vec<EdgeRef>,
    pub current_node: Option<String>,
    pub msg: String,
}

impl Step for DagStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

impl DagStep {
    fn l_value(&self, name: &str) -> String {
        self.l.get(name).map(ToString::to_string).unwrap_or_default()
    }

    fn l_table(&self) -> TableView {
        let rows = self
            .nodes
            .iter()
            .map(|name| TableRow {
                label: name.clone(),
                cells: vec![TableCell::text(self.l_value(name))],
                background: (self.current_node.as_deref() == Some(name.as_str())).then(|| "#fff3cd".to_string()),
            })
            .collect();
        TableView {
            slot: L_SLOT,
            corner: "v".to_string(),
            header: vec!["L(v)".to_string()],
            rows,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DagViz;

impl Visualizer for DagViz {
    type Step = DagStep;
    type Context = ();

    fn capture(&self, _steps: &[DagStep]) {}

    fn render(&self, step: &DagStep, _ctx: &()) -> Scene {
        let coords = &step.node_coords;
        let max_x = coords.values().map(|p| p.x).fold(0.0, f64::max);
        let max_y = coords.values().map(|p| p.y).fold(0.0, f64::max);
        let mut scene = Scene::new(MIN_W.max(max_x + 60.0), MIN_H.max(max_y + 60.0));
        scene.tables.push(step.l_table());

        for (&u, out) in &step.adj {
            let Some(&from) = coords.get(&u) else {
                continue;
            };
            for (v, weight) in out {
                let Some(&to) = coords.get(v) else {
                    continue;
                };
                let hot = step.highlight_edges.contains(&EdgeRef { from: u, to: *v });
                let (color, width) = if hot { ("#ff0000", 4.0) } else { ("#999", 2.0) };
                scene.arrow(from, to, NODE_R, Stroke::solid(color, width));
                let mid = from.midpoint(to);
                scene.fill_rect(Rect::new(mid.x - 10.0, mid.y - 10.0, 20.0, 20.0), "#fff");
                scene.text(mid, weight.to_string(), Font::bold(14.0), if hot { "#ff0000" } else { "#000" });
            }
        }

        for (i, name) in step.nodes.iter().enumerate() {
            let Some(&at) = coords.get(&i) else {
                continue;
            };
            let fill = if step.current_node.as_deref() == Some(name.as_str()) {
                "#ffeb3b"
            } else if step.highlight_nodes.contains(&i) {
                "#ffcc80"
            } else {
                "#e0f7fa"
            };
            scene.circle(at, NODE_R, Some(fill), Some(Stroke::solid("#000", 2.0)));
            scene.text(at, name.clone(), Font::bold(16.0), "#000");
            scene.text(at.offset(0.0, -35.0), format!("L={}", step.l_value(name)), Font::plain(14.0), "#333");
        }
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::DrawCmd;

    const STEP: &str = r#"{
        "nodes":["s","a","t"],
        "adj":{"0":[[1,2],[2,4]],"1":[[2,3]],"2":[]},
        "node_coords":{"0":{"x":100,"y":200},"1":{"x":250,"y":100},"2":{"x":600,"y":200}},
        "L":{"s":"-∞","a":"3","t":"0"},
        "topo_order":["s","a","t"],
        "msg":"檢查邊 (s -> a)",
        "highlight_nodes":[0,1],
        "highlight_edges":[{"from":0,"to":1}],
        "current_node":"s"}"#;

    #[test]
    fn highlighted_edge_is_red_and_thick() {
        let step: DagStep = serde_json::from_str(STEP).unwrap();
        let scene = DagViz.render(&step, &());
        let lines: Vec<_> = scene
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Line { stroke, .. } => Some((stroke.color.as_str(), stroke.width)),
                _ => None,
            })
            .collect();
        assert_eq!(lines, vec![("#ff0000", 4.0), ("#999", 2.0), ("#999", 2.0)]);
        assert!(scene.texts().any(|t| t == "L=-∞"));
    }

    #[test]
    fn current_node_wins_over_highlight() {
        let step: DagStep = serde_json::from_str(STEP).unwrap();
        let scene = DagViz.render(&step, &());
        let fills: Vec<_> = scene
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Circle { fill, .. } => fill.clone(),
                _ => None,
            })
            .collect();
        assert_eq!(fills, vec!["#ffeb3b", "#ffcc80", "#e0f7fa"]);
    }

    #[test]
    fn l_table_marks_current_row() {
        let step: DagStep = serde_json::from_str(STEP).unwrap();
        let scene = DagViz.render(&step, &());
        let table = scene.table(L_SLOT).unwrap();
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0].background.as_deref(), Some("#fff3cd"));
        assert_eq!(table.rows[1].cells[0].text, "3");
        assert!(table.rows[2].background.is_none());
    }

    #[test]
    fn missing_coordinates_skip_the_node() {
        let step: DagStep = serde_json::from_str(r#"{"nodes":["s"],"adj":{"0":[[5,1]]},"msg":""}"#).unwrap();
        let scene = DagViz.render(&step, &());
        assert!(scene.commands.is_empty());
        assert_eq!(scene.table(L_SLOT).unwrap().rows[0].cells[0].text, "");
    }
}
