//! Small weighted graphs used by the spanning-tree proof pages.
//!
//! The three pages share one step schema and differ only in how edges and
//! nodes are colored, so one renderer serves all of them.

use serde::Deserialize;

use super::Visualizer;
use super::table::{CellValue, MAX_DIM};
use crate::scene::{Font, Point, Scene, Stroke};
use crate::step::Step;

const NODE_R: f64 = 20.0;
const WEIGHT_OFFSET: f64 = 15.0;
const MIN_W: f64 = 600.0;
const MIN_H: f64 = 400.0;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProofNode {
    pub id: i64,
    pub label: String,
    pub x: f64,
    pub y: f64,
}

impl ProofNode {
    fn at(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Edge between two node indices.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProofEdge {
    pub u: usize,
    pub v: usize,
    pub w: CellValue,
    pub id: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EndPair {
    pub u: usize,
    pub v: usize,
}

impl EndPair {
    fn matches(&self, e: &ProofEdge) -> bool {
        (self.u == e.u && self.v == e.v) || (self.u == e.v && self.v == e.u)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProofGraphStep {
    #[serde(rename = "type")]
    pub kind: String,
    pub msg: String,
    pub nodes: Vec<ProofNode>,
    pub edges: Vec<ProofEdge>,
    /// Edge ids of the tree or subset under discussion.
    pub highlight_edges: Vec<String>,
    pub target_edge: Option<String>,
    /// Edge ids of a second tree compared against the first.
    pub compare_edges: Vec<String>,
    pub mst_edges: Vec<EndPair>,
    pub crossing_edges: Vec<EndPair>,
    pub cut_nodes: Vec<i64>,
    pub other_nodes: Vec<i64>,
}

impl Step for ProofGraphStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

impl ProofGraphStep {
    fn listed(ids: &[String], e: &ProofEdge) -> bool {
        e.id.as_ref().is_some_and(|id| ids.contains(id))
    }

    fn ends(&self, e: &ProofEdge) -> Option<(Point, Point)> {
        Some((self.nodes.get(e.u)?.at(), self.nodes.get(e.v)?.at()))
    }

    /// Mean height of the listed nodes.
    fn mean_y(&self, ids: &[i64]) -> Option<f64> {
        let ys: Vec<f64> = self.nodes.iter().filter(|n| ids.contains(&n.id)).map(|n| n.y).collect();
        (!ys.is_empty()).then(|| ys.iter().sum::<f64>() / ys.len() as f64)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProofStyle {
    /// Minimum-weight connecting subset: chosen edges in blue.
    MinWeightSubset,
    /// MST after lowering one tree edge: tree, target and a compared tree.
    MstReduceWeight,
    /// Unique MST via a cut: tree, cut sides and crossing edges.
    UniqueMst,
}

#[derive(Clone, Copy, Debug)]
pub struct ProofGraphViz {
    pub style: ProofStyle,
}

impl ProofGraphViz {
    pub const fn new(style: ProofStyle) -> Self {
        ProofGraphViz { style }
    }

    /// Strokes for one edge, bottom layer first.
    fn edge_strokes(&self, step: &ProofGraphStep, e: &ProofEdge) -> Vec<Stroke> {
        match self.style {
            ProofStyle::MinWeightSubset => {
                if ProofGraphStep::listed(&step.highlight_edges, e) {
                    vec![Stroke::solid("blue", 4.0)]
                } else {
                    vec![Stroke::solid("#ccc", 2.0)]
                }
            }
            ProofStyle::MstReduceWeight => {
                let in_tree = ProofGraphStep::listed(&step.highlight_edges, e);
                let compared = ProofGraphStep::listed(&step.compare_edges, e);
                let mut main = if in_tree {
                    Stroke::solid("blue", 3.0)
                } else {
                    Stroke::solid("#ddd", 1.0)
                };
                if step.target_edge.is_some() && step.target_edge == e.id {
                    main = Stroke::solid("red", 4.0);
                }
                match (compared, in_tree) {
                    (true, true) => vec![Stroke::solid("rgba(0, 255, 0, 0.3)", 10.0), main],
                    (true, false) => vec![Stroke::dashed("green", 3.0, 10.0, 5.0)],
                    _ => vec![main],
                }
            }
            ProofStyle::UniqueMst => {
                if step.crossing_edges.iter().any(|p| p.matches(e)) {
                    vec![Stroke::solid("red", 4.0)]
                } else if step.mst_edges.iter().any(|p| p.matches(e)) {
                    vec![Stroke::solid("blue", 4.0)]
                } else {
                    vec![Stroke::solid("#999", 2.0)]
                }
            }
        }
    }

    fn node_fill(&self, step: &ProofGraphStep, node: &ProofNode) -> &'static str {
        match self.style {
            ProofStyle::UniqueMst if step.cut_nodes.contains(&node.id) => "#ffcccc",
            ProofStyle::UniqueMst if step.other_nodes.contains(&node.id) => "#ccffcc",
            _ => "white",
        }
    }

    fn weight_radius(&self) -> f64 {
        match self.style {
            ProofStyle::UniqueMst => 10.0,
            _ => 12.0,
        }
    }

    /// Dashed line halfway between the two sides of the cut.
    fn draw_cut(scene: &mut Scene, step: &ProofGraphStep) {
        let (Some(a), Some(b)) = (step.mean_y(&step.cut_nodes), step.mean_y(&step.other_nodes)) else {
            return;
        };
        let y = (a + b) / 2.0;
        let min_x = step.nodes.iter().map(|n| n.x).fold(f64::INFINITY, f64::min);
        let max_x = step.nodes.iter().map(|n| n.x).fold(f64::NEG_INFINITY, f64::max);
        let (x0, x1) = (min_x - 50.0, max_x + 50.0);
        scene.line(Point::new(x0, y), Point::new(x1, y), Stroke::dashed("#888", 2.0, 10.0, 10.0));
        scene.text_left(Point::new(x0 + 50.0, y - 10.0), "Cut (S, V-S)", Font::plain(14.0), "#888");
    }

    fn draw_weight(&self, scene: &mut Scene, from: Point, to: Point, w: &CellValue) {
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let len = (dx * dx + dy * dy).sqrt();
        if len <= f64::EPSILON {
            return;
        }
        let at = from.midpoint(to).offset(-dy / len * WEIGHT_OFFSET, dx / len * WEIGHT_OFFSET);
        scene.circle(at, self.weight_radius(), Some("white"), None);
        scene.text(at, w.to_string(), Font::bold(14.0), "black");
    }
}

impl Visualizer for ProofGraphViz {
    type Step = ProofGraphStep;
    type Context = ();

    fn capture(&self, _steps: &[ProofGraphStep]) {}

    fn render(&self, step: &ProofGraphStep, _ctx: &()) -> Scene {
        let nodes = &step.nodes[..step.nodes.len().min(MAX_DIM)];
        let max_x = nodes.iter().map(|n| n.x).fold(0.0, f64::max);
        let max_y = nodes.iter().map(|n| n.y).fold(0.0, f64::max);
        let mut scene = Scene::new(MIN_W.max(max_x + 60.0), MIN_H.max(max_y + 60.0));

        if self.style == ProofStyle::UniqueMst {
            Self::draw_cut(&mut scene, step);
        }
        for e in step.edges.iter().take(MAX_DIM * 4) {
            let Some((from, to)) = step.ends(e) else {
                continue;
            };
            for stroke in self.edge_strokes(step, e) {
                scene.line(from, to, stroke);
            }
            self.draw_weight(&mut scene, from, to, &e.w);
        }
        for node in nodes {
            scene.circle(node.at(), NODE_R, Some(self.node_fill(step, node)), Some(Stroke::solid("black", 2.0)));
            scene.text(node.at(), node.label.clone(), Font::plain(16.0), "black");
        }
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::DrawCmd;

    const NODES: &str = r#"[{"id":0,"label":"a","x":100,"y":300},{"id":1,"label":"b","x":300,"y":100},
        {"id":2,"label":"c","x":500,"y":300}]"#;
    const EDGES: &str = r#"[{"u":0,"v":1,"w":2,"id":"e1"},{"u":1,"v":2,"w":3,"id":"e2"},{"u":0,"v":2,"w":4,"id":"e3"}]"#;

    fn step(rest: &str) -> ProofGraphStep {
        serde_json::from_str(&format!(r#"{{"msg":"m","nodes":{NODES},"edges":{EDGES}{rest}}}"#)).unwrap()
    }

    fn strokes(scene: &Scene) -> Vec<(String, f64, bool)> {
        scene
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Line { stroke, .. } => Some((stroke.color.clone(), stroke.width, stroke.dash.is_some())),
                _ => None,
            })
            .collect()
    }

    fn s(color: &str, width: f64, dashed: bool) -> (String, f64, bool) {
        (color.to_string(), width, dashed)
    }

    #[test]
    fn subset_edges_are_blue() {
        let viz = ProofGraphViz::new(ProofStyle::MinWeightSubset);
        let scene = viz.render(&step(r#","type":"remove_edge_positive","highlight_edges":["e1","e2"]"#), &());
        assert_eq!(strokes(&scene), vec![s("blue", 4.0, false), s("blue", 4.0, false), s("#ccc", 2.0, false)]);
        assert!(scene.texts().any(|t| t == "4"));
    }

    #[test]
    fn reduced_weight_layers_tree_target_and_comparison() {
        let viz = ProofGraphViz::new(ProofStyle::MstReduceWeight);
        let scene = viz.render(
            &step(r#","type":"case_2","highlight_edges":["e1","e2"],"target_edge":"e1","compare_edges":["e1","e3"]"#),
            &(),
        );
        assert_eq!(
            strokes(&scene),
            vec![
                s("rgba(0, 255, 0, 0.3)", 10.0, false),
                s("red", 4.0, false),
                s("blue", 3.0, false),
                s("green", 3.0, true),
            ]
        );
    }

    #[test]
    fn cut_splits_sides_and_marks_crossing_edges() {
        let viz = ProofGraphViz::new(ProofStyle::UniqueMst);
        let scene = viz.render(
            &step(
                r#","type":"show_crossing","mst_edges":[{"u":0,"v":1},{"u":1,"v":2}],
                   "cut_nodes":[1],"other_nodes":[0,2],"crossing_edges":[{"u":1,"v":0},{"u":2,"v":1}]"#,
            ),
            &(),
        );
        let lines = strokes(&scene);
        assert_eq!(lines[0], s("#888", 2.0, true));
        assert_eq!(&lines[1..], &[s("red", 4.0, false), s("red", 4.0, false), s("#999", 2.0, false)]);
        match &scene.commands[0] {
            DrawCmd::Line { from, to, .. } => {
                assert_eq!((from.x, from.y, to.x), (50.0, 200.0, 550.0));
            }
            other => panic!("expected cut line, got {other:?}"),
        }
        let fills: Vec<_> = scene
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Circle { fill: Some(f), radius, .. } if *radius == NODE_R => Some(f.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(fills, vec!["#ccffcc", "#ffcccc", "#ccffcc"]);
    }

    #[test]
    fn edges_to_missing_nodes_are_skipped() {
        let step: ProofGraphStep =
            serde_json::from_str(&format!(r#"{{"nodes":{NODES},"edges":[{{"u":0,"v":7,"w":1}}]}}"#)).unwrap();
        let scene = ProofGraphViz::new(ProofStyle::UniqueMst).render(&step, &());
        assert!(strokes(&scene).is_empty());
    }
}
