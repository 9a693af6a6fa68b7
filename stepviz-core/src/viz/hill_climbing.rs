//! Hill climbing as a depth-first search that pushes the best child last.
//!
//! Two pages share the step shape: a random graph the user generates in the
//! browser, and the 8-puzzle whose search tree grows step by step.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::Deserialize;

use super::Visualizer;
use crate::scene::{Font, Point, Rect, Scene, Stroke, TableCell, TableRow, TableView};
use crate::search::SearchGraph;
use crate::step::Step;

pub const STACK_SLOT: &str = "stackList";

const NODE_R: f64 = 20.0;
const GRAPH_W: f64 = 600.0;
const GRAPH_H: f64 = 400.0;

const TILE: f64 = 60.0;
const LEAF_W: f64 = 80.0;
const LEVEL_GAP: f64 = 80.0;
const TREE_TOP: f64 = 50.0;
const TREE_MIN_W: f64 = 800.0;
/// Largest search tree laid out.
const MAX_TREE_NODES: usize = 512;

/// The search stack, top first.
fn stack_table(stack: &[String]) -> TableView {
    TableView {
        slot: STACK_SLOT,
        corner: "Stack".to_string(),
        header: Vec::new(),
        rows: stack
            .iter()
            .rev()
            .enumerate()
            .map(|(depth, id)| TableRow {
                label: if depth == 0 { "top".to_string() } else { String::new() },
                cells: vec![TableCell::text(id.as_str())],
                background: None,
            })
            .collect(),
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct GraphSearchStep {
    pub msg: String,
    pub stack: Vec<String>,
    pub current_node: Option<String>,
    pub visited: Vec<String>,
    pub phase: String,
}

impl Step for GraphSearchStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

/// Renders runs over the graph generated in the browser. The graph is
/// shared with the page inputs and snapshotted whenever a run is loaded.
#[derive(Clone, Debug, Default)]
pub struct HillGraphViz {
    graph: Rc<RefCell<SearchGraph>>,
}

impl HillGraphViz {
    pub fn new(graph: Rc<RefCell<SearchGraph>>) -> Self {
        HillGraphViz { graph }
    }

    /// The freshly generated graph before any run.
    pub fn preview(&self) -> Scene {
        draw_graph(&self.graph.borrow(), None)
    }
}

fn draw_graph(graph: &SearchGraph, step: Option<&GraphSearchStep>) -> Scene {
    let max_x = graph.nodes.iter().map(|n| n.x).fold(0.0, f64::max);
    let max_y = graph.nodes.iter().map(|n| n.y).fold(0.0, f64::max);
    let mut scene = Scene::new(GRAPH_W.max(max_x + 50.0), GRAPH_H.max(max_y + 50.0));

    for e in &graph.edges {
        if let (Some(u), Some(v)) = (graph.node(&e.u), graph.node(&e.v)) {
            scene.line(Point::new(u.x, u.y), Point::new(v.x, v.y), Stroke::solid("#aaa", 2.0));
        }
    }

    let rim = if step.is_some() { 4.0 } else { 2.0 };
    for n in &graph.nodes {
        let fill = match step {
            Some(s) if s.current_node.as_deref() == Some(n.id.as_str()) => "#ffeb3b",
            Some(s) if s.stack.contains(&n.id) => "#2196f3",
            Some(s) if s.visited.contains(&n.id) => "#bdbdbd",
            _ => "white",
        };
        let stroke = if n.id == graph.goal {
            Stroke::solid("#4caf50", rim)
        } else if n.id == graph.start {
            Stroke::solid("#f44336", rim)
        } else {
            Stroke::solid("#000", 2.0)
        };
        let at = Point::new(n.x, n.y);
        scene.circle(at, NODE_R, Some(fill), Some(stroke));
        scene.text(at.offset(0.0, -5.0), n.id.clone(), Font::plain(12.0), "black");
        scene.text(at.offset(0.0, 8.0), format!("h={}", n.h), Font::plain(10.0), "black");
    }

    if let Some(s) = step {
        scene.tables.push(stack_table(&s.stack));
    }
    scene
}

impl Visualizer for HillGraphViz {
    type Step = GraphSearchStep;
    type Context = SearchGraph;

    fn capture(&self, _steps: &[GraphSearchStep]) -> SearchGraph {
        self.graph.borrow().clone()
    }

    fn render(&self, step: &GraphSearchStep, graph: &SearchGraph) -> Scene {
        draw_graph(graph, Some(step))
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PuzzleNode {
    pub id: String,
    pub board: Vec<Vec<u8>>,
    pub parent_id: Option<String>,
    /// Misplaced tiles, blank excluded.
    pub h: i64,
    pub h_detail: String,
    pub depth: i64,
    pub status: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PuzzleSearchStep {
    pub msg: String,
    pub stack: Vec<String>,
    pub current_node: Option<String>,
    /// Every node generated so far.
    pub tree_nodes: Vec<PuzzleNode>,
    pub phase: String,
}

impl Step for PuzzleSearchStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

/// Positions for the search tree: each leaf gets a fixed slot and a parent
/// sits over the span of its children.
struct TreeLayout {
    pos: Vec<Option<Point>>,
    kids: Vec<Vec<usize>>,
    width: f64,
    bottom: f64,
}

impl TreeLayout {
    fn new(nodes: &[PuzzleNode]) -> Option<TreeLayout> {
        let root = nodes.iter().position(|n| n.parent_id.is_none())?;
        let mut index = HashMap::new();
        for (i, n) in nodes.iter().enumerate() {
            index.entry(n.id.as_str()).or_insert(i);
        }
        let mut children = vec![Vec::new(); nodes.len()];
        for (i, n) in nodes.iter().enumerate() {
            if let Some(&p) = n.parent_id.as_deref().and_then(|p| index.get(p))
                && p != i
            {
                children[p].push(i);
            }
        }

        let mut layout = TreeLayout {
            pos: vec![None; nodes.len()],
            kids: vec![Vec::new(); nodes.len()],
            width: 0.0,
            bottom: TREE_TOP,
        };
        let mut seen = vec![false; nodes.len()];
        let mut widths = vec![0.0; nodes.len()];
        layout.measure(root, &children, &mut seen, &mut widths);
        layout.width = TREE_MIN_W.max(widths[root] + 40.0);
        layout.place(root, layout.width / 2.0, TREE_TOP, &widths);
        Some(layout)
    }

    fn measure(&mut self, i: usize, children: &[Vec<usize>], seen: &mut [bool], widths: &mut [f64]) -> f64 {
        seen[i] = true;
        let mut w = 0.0;
        for &c in &children[i] {
            if !seen[c] {
                self.kids[i].push(c);
                w += self.measure(c, children, seen, widths);
            }
        }
        widths[i] = if w > 0.0 { w } else { LEAF_W };
        widths[i]
    }

    fn place(&mut self, i: usize, x: f64, y: f64, widths: &[f64]) {
        self.pos[i] = Some(Point::new(x, y));
        self.bottom = self.bottom.max(y);
        let mut left = x - widths[i] / 2.0;
        for k in 0..self.kids[i].len() {
            let c = self.kids[i][k];
            self.place(c, left + widths[c] / 2.0, y + LEVEL_GAP, widths);
            left += widths[c];
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct HillPuzzleViz;

impl HillPuzzleViz {
    fn draw_node(scene: &mut Scene, node: &PuzzleNode, at: Point, step: &PuzzleSearchStep) {
        let fill = if step.current_node.as_deref() == Some(node.id.as_str()) {
            "#ffeb3b"
        } else if step.stack.contains(&node.id) {
            "#bbdefb"
        } else if node.status == "visited" {
            "#e0e0e0"
        } else {
            "white"
        };
        let rect = Rect::new(at.x - TILE / 2.0, at.y - TILE / 2.0, TILE, TILE);
        scene.cell(rect, fill);

        let third = TILE / 3.0;
        for (r, row) in node.board.iter().take(3).enumerate() {
            for (c, &v) in row.iter().take(3).enumerate() {
                if v != 0 {
                    let center = Point::new(rect.x + (c as f64 + 0.5) * third, rect.y + (r as f64 + 0.5) * third);
                    scene.text(center, v.to_string(), Font::plain(10.0), "black");
                }
            }
        }
        scene.text(at.offset(0.0, TILE / 2.0 + 10.0), format!("h={}", node.h), Font::plain(10.0), "red");
        scene.text(at.offset(0.0, -TILE / 2.0 - 10.0), node.id.clone(), Font::plain(10.0), "blue");
    }
}

impl Visualizer for HillPuzzleViz {
    type Step = PuzzleSearchStep;
    type Context = ();

    fn capture(&self, _steps: &[PuzzleSearchStep]) {}

    fn render(&self, step: &PuzzleSearchStep, _ctx: &()) -> Scene {
        let nodes = &step.tree_nodes[..step.tree_nodes.len().min(MAX_TREE_NODES)];
        let Some(layout) = TreeLayout::new(nodes) else {
            let mut scene = Scene::new(TREE_MIN_W, GRAPH_H);
            scene.tables.push(stack_table(&step.stack));
            return scene;
        };
        let mut scene = Scene::new(layout.width, GRAPH_H.max(layout.bottom + TILE + 30.0));

        for (i, kids) in layout.kids.iter().enumerate() {
            let Some(p) = layout.pos[i] else {
                continue;
            };
            for &c in kids {
                if let Some(q) = layout.pos[c] {
                    scene.line(p.offset(0.0, TILE / 2.0), q.offset(0.0, -TILE / 2.0), Stroke::solid("#555", 1.0));
                }
            }
        }
        for (node, at) in nodes.iter().zip(&layout.pos) {
            if let Some(at) = at {
                Self::draw_node(&mut scene, node, *at, step);
            }
        }
        scene.tables.push(stack_table(&step.stack));
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::DrawCmd;
    use crate::search::{SearchEdge, SearchNode};

    fn graph() -> Rc<RefCell<SearchGraph>> {
        let node = |id: &str, x: f64, h: i64| SearchNode { id: id.to_string(), x, y: 100.0, h };
        Rc::new(RefCell::new(SearchGraph {
            nodes: vec![node("0", 100.0, 0), node("1", 200.0, 5), node("2", 300.0, 3)],
            edges: vec![
                SearchEdge { u: "0".into(), v: "2".into() },
                SearchEdge { u: "1".into(), v: "2".into() },
                SearchEdge { u: "1".into(), v: "9".into() },
            ],
            start: "1".into(),
            goal: "0".into(),
        }))
    }

    fn circles(scene: &Scene) -> Vec<(String, String, f64)> {
        scene
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Circle { fill: Some(f), stroke: Some(s), .. } => Some((f.clone(), s.color.clone(), s.width)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn preview_marks_start_and_goal() {
        let viz = HillGraphViz::new(graph());
        let scene = viz.preview();
        let c = circles(&scene);
        assert_eq!(c[0], ("white".to_string(), "#4caf50".to_string(), 2.0));
        assert_eq!(c[1], ("white".to_string(), "#f44336".to_string(), 2.0));
        // The edge to the unknown node is dropped.
        assert_eq!(scene.commands.iter().filter(|c| matches!(c, DrawCmd::Line { .. })).count(), 2);
        assert!(scene.texts().any(|t| t == "h=5"));
        assert!(scene.tables.is_empty());
    }

    #[test]
    fn run_colors_current_stack_and_visited() {
        let shared = graph();
        let viz = HillGraphViz::new(shared.clone());
        let step: GraphSearchStep =
            serde_json::from_str(r#"{"msg":"pop","stack":["0"],"current_node":"2","visited":["1","2","0"],"phase":"pop"}"#)
                .unwrap();
        let snapshot = viz.capture(std::slice::from_ref(&step));
        shared.borrow_mut().nodes.clear();
        let scene = viz.render(&step, &snapshot);
        let fills: Vec<_> = circles(&scene).into_iter().map(|(f, _, w)| (f, w)).collect();
        assert_eq!(
            fills,
            vec![("#2196f3".to_string(), 4.0), ("#bdbdbd".to_string(), 4.0), ("#ffeb3b".to_string(), 2.0)]
        );
        let stack = scene.table(STACK_SLOT).unwrap();
        assert_eq!(stack.rows.len(), 1);
        assert_eq!(stack.rows[0].label, "top");
    }

    fn board_json(flat: [u8; 9]) -> String {
        format!("[[{},{},{}],[{},{},{}],[{},{},{}]]", flat[0], flat[1], flat[2], flat[3], flat[4], flat[5], flat[6], flat[7], flat[8])
    }

    fn puzzle_step() -> PuzzleSearchStep {
        let b = board_json([2, 8, 3, 1, 6, 4, 7, 0, 5]);
        serde_json::from_str(&format!(
            r#"{{"msg":"expand","stack":["4","2","3"],"current_node":"1","phase":"expand","tree_nodes":[
                {{"id":"1","board":{b},"parent_id":null,"h":4,"depth":0,"status":"visited"}},
                {{"id":"2","board":{b},"parent_id":"1","h":5,"depth":1,"status":"stack"}},
                {{"id":"3","board":{b},"parent_id":"1","h":3,"depth":1,"status":"stack"}},
                {{"id":"4","board":{b},"parent_id":"1","h":5,"depth":1,"status":"stack"}}]}}"#
        ))
        .unwrap()
    }

    #[test]
    fn children_spread_under_their_parent() {
        let step = puzzle_step();
        let layout = TreeLayout::new(&step.tree_nodes).unwrap();
        assert_eq!(layout.width, 800.0);
        let xs: Vec<f64> = layout.pos.iter().map(|p| p.unwrap().x).collect();
        assert_eq!(xs, vec![400.0, 320.0, 400.0, 480.0]);
        assert_eq!(layout.pos[1].unwrap().y, TREE_TOP + LEVEL_GAP);
    }

    #[test]
    fn puzzle_tree_draws_boards_and_stack() {
        let scene = HillPuzzleViz.render(&puzzle_step(), &());
        let fills: Vec<_> = scene
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::FillRect { color, .. } => Some(color.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(fills, vec!["#ffeb3b", "#bbdefb", "#bbdefb", "#bbdefb"]);
        // Eight tiles per board plus h and id labels.
        assert_eq!(scene.texts().count(), 4 * 10);
        let stack = scene.table(STACK_SLOT).unwrap();
        let ids: Vec<_> = stack.rows.iter().map(|r| r.cells[0].text.as_str()).collect();
        assert_eq!(ids, vec!["3", "2", "4"]);
    }

    #[test]
    fn duplicate_ids_attach_to_first_match_and_orphans_are_skipped() {
        let step: PuzzleSearchStep = serde_json::from_str(
            r#"{"tree_nodes":[{"id":"1","parent_id":null},{"id":"2","parent_id":"1"},{"id":"1","parent_id":"2"},
                {"id":"9","parent_id":"77"}]}"#,
        )
        .unwrap();
        let layout = TreeLayout::new(&step.tree_nodes).unwrap();
        assert_eq!(layout.pos[2].map(|p| p.y), Some(TREE_TOP + 2.0 * LEVEL_GAP));
        assert!(layout.pos[3].is_none());
        assert_eq!(HillPuzzleViz.render(&step, &()).texts().filter(|t| t.starts_with("h=")).count(), 3);
        assert!(HillPuzzleViz.render(&PuzzleSearchStep::default(), &()).table(STACK_SLOT).is_some());
    }
}
