use std::cell::RefCell;
use std::rc::Rc;

use serde::Deserialize;

use super::Visualizer;
use super::table::CellValue;
use crate::editor::{Graph, GraphEditor};
use crate::scene::{Font, Scene, Stroke};
use crate::step::Step;

const NODE_R: f64 = 20.0;
const MIN_W: f64 = 600.0;
const MIN_H: f64 = 500.0;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeightedEdge {
    pub u: String,
    pub v: String,
    pub w: CellValue,
}

impl WeightedEdge {
    fn joins(&self, a: &str, b: &str) -> bool {
        (self.u == a && self.v == b) || (self.u == b && self.v == a)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SteinerStep {
    pub phase: String,
    pub closure_edges: Vec<WeightedEdge>,
    pub mst_edges: Vec<WeightedEdge>,
    pub final_tree_edges: Vec<WeightedEdge>,
    pub msg: String,
}

impl Step for SteinerStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

impl SteinerStep {
    /// Metric closure and its MST are shown from the closure phase through
    /// the MST phase.
    pub fn shows_closure(&self) -> bool {
        self.phase.starts_with("closure") || self.phase.starts_with("mst")
    }

    pub fn shows_final(&self) -> bool {
        self.phase.starts_with("reconstruct") || self.phase == "complete"
    }
}

/// Renders steps over the graph the user edited. The graph is shared with
/// the [`GraphEditor`] and snapshotted whenever a sequence is loaded.
#[derive(Clone, Debug, Default)]
pub struct SteinerViz {
    graph: Rc<RefCell<Graph>>,
}

impl SteinerViz {
    pub fn new(graph: Rc<RefCell<Graph>>) -> Self {
        SteinerViz { graph }
    }

    /// The graph as it stands in the editor, with the edge being drawn.
    pub fn preview(&self, editor: &GraphEditor) -> Scene {
        let graph = self.graph.borrow();
        let mut scene = draw(&graph, None);
        if let Some((from, to)) = editor.rubber_band() {
            scene.line(from, to, Stroke::dashed("#333", 1.0, 5.0, 5.0));
        }
        scene
    }
}

fn draw(graph: &Graph, step: Option<&SteinerStep>) -> Scene {
    let max_x = graph.nodes.iter().map(|n| n.x).fold(0.0, f64::max);
    let max_y = graph.nodes.iter().map(|n| n.y).fold(0.0, f64::max);
    let mut scene = Scene::new(MIN_W.max(max_x + 50.0), MIN_H.max(max_y + 50.0));
    let at = |id: &str| graph.node(id).map(|n| n.at());

    let finals = step.filter(|s| s.shows_final()).map(|s| &s.final_tree_edges);
    for e in &graph.edges {
        let (Some(u), Some(v)) = (at(&e.u), at(&e.v)) else {
            continue;
        };
        let in_tree = finals.is_some_and(|f| f.iter().any(|fe| fe.joins(&e.u, &e.v)));
        let stroke = if in_tree {
            Stroke::solid("#28a745", 4.0)
        } else {
            Stroke::solid("#ccc", 1.0)
        };
        scene.line(u, v, stroke);
        scene.text(u.midpoint(v), e.w.to_string(), Font::plain(12.0), "#666");
    }

    if let Some(step) = step.filter(|s| s.shows_closure()) {
        for ce in &step.closure_edges {
            let (Some(u), Some(v)) = (at(&ce.u), at(&ce.v)) else {
                continue;
            };
            let in_mst = step.mst_edges.iter().any(|me| me.joins(&ce.u, &ce.v));
            if in_mst {
                scene.line(u, v, Stroke::dashed("#007bff", 3.0, 10.0, 5.0));
                scene.text(u.midpoint(v).offset(0.0, -10.0), ce.w.to_string(), Font::bold(12.0), "#007bff");
            } else {
                scene.line(u, v, Stroke::dashed("rgba(0, 123, 255, 0.3)", 1.0, 10.0, 5.0));
            }
        }
    }

    for n in &graph.nodes {
        let terminal = graph.is_terminal(&n.id);
        let (fill, ink) = if terminal { ("#dc3545", "white") } else { ("#fff", "black") };
        scene.circle(n.at(), NODE_R, Some(fill), Some(Stroke::solid("#333", 2.0)));
        scene.text(n.at(), n.id.clone(), Font::bold(14.0), ink);
    }
    scene
}

impl Visualizer for SteinerViz {
    type Step = SteinerStep;
    type Context = Graph;

    fn capture(&self, _steps: &[SteinerStep]) -> Graph {
        self.graph.borrow().clone()
    }

    fn render(&self, step: &SteinerStep, graph: &Graph) -> Scene {
        draw(graph, Some(step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditMode;
    use crate::scene::{DrawCmd, Point};

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

    fn example() -> (SteinerViz, Graph) {
        let viz = SteinerViz::new(Rc::new(RefCell::new(Graph::example())));
        let graph = viz.capture(&[]);
        (viz, graph)
    }

    #[test]
    fn closure_phase_draws_dashed_mst() {
        let (viz, graph) = example();
        let step: SteinerStep = serde_json::from_str(
            r#"{"phase":"mst_build","msg":"",
                "closure_edges":[{"u":"v1","v":"v2","w":4},{"u":"v1","v":"v3","w":8}],
                "mst_edges":[{"u":"v2","v":"v1","w":4}]}"#,
        )
        .unwrap();
        let scene = viz.render(&step, &graph);
        let lines = strokes(&scene);
        assert_eq!(lines.len(), 10);
        assert!(lines.contains(&("#007bff".to_string(), 3.0, true)));
        assert!(lines.contains(&("rgba(0, 123, 255, 0.3)".to_string(), 1.0, true)));
    }

    #[test]
    fn final_tree_is_green_and_closure_hidden() {
        let (viz, graph) = example();
        let step: SteinerStep = serde_json::from_str(
            r#"{"phase":"complete","msg":"done",
                "closure_edges":[{"u":"v1","v":"v2","w":4}],
                "final_tree_edges":[{"u":"u1","v":"v1","w":2}]}"#,
        )
        .unwrap();
        let lines = strokes(&viz.render(&step, &graph));
        assert_eq!(lines.len(), 8);
        assert_eq!(lines.iter().filter(|l| l.0 == "#28a745").count(), 1);
    }

    #[test]
    fn terminals_are_red() {
        let (viz, graph) = example();
        let scene = viz.render(&SteinerStep::default(), &graph);
        let reds = scene
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::Circle { fill: Some(f), .. } if f == "#dc3545"))
            .count();
        assert_eq!(reds, 5);
        assert_eq!((scene.width, scene.height), (600.0, 500.0));
    }

    #[test]
    fn preview_follows_the_editor() {
        let graph = Rc::new(RefCell::new(Graph::example()));
        let viz = SteinerViz::new(Rc::clone(&graph));
        let mut editor = GraphEditor::new(graph);
        editor.set_mode(EditMode::Edge);
        editor.pointer_down(Point::new(100.0, 100.0));
        editor.pointer_move(Point::new(150.0, 150.0));
        let scene = viz.preview(&editor);
        assert!(strokes(&scene).contains(&("#333".to_string(), 1.0, true)));

        editor.set_mode(EditMode::Node);
        editor.pointer_down(Point::new(700.0, 600.0));
        let scene = viz.preview(&editor);
        assert_eq!((scene.width, scene.height), (750.0, 650.0));
        assert!(scene.texts().any(|t| t == "v9"));
    }
}
