//! Interactive graph editing for the Steiner tree page.
//!
//! The editor owns the graph the user builds with the mouse. Any change to
//! the graph makes a loaded step sequence stale, which callers learn from
//! the `true` returned by the pointer handlers.

use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{InputError, VizError};
use crate::scene::Point;
use crate::validate;

/// Squared hit radius of a node, in canvas pixels.
const HIT_RADIUS_SQ: f64 = 400.0;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

impl GraphNode {
    pub fn at(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub u: String,
    pub v: String,
    pub w: i64,
}

impl GraphEdge {
    pub fn joins(&self, a: &str, b: &str) -> bool {
        (self.u == a && self.v == b) || (self.u == b && self.v == a)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    /// Terminal ids in the order they were marked.
    pub terminals: Vec<String>,
}

impl Graph {
    pub fn example() -> Graph {
        let node = |id: &str, x: f64, y: f64| GraphNode {
            id: id.to_string(),
            x,
            y,
        };
        let edge = |u: &str, v: &str, w: i64| GraphEdge {
            u: u.to_string(),
            v: v.to_string(),
            w,
        };
        Graph {
            nodes: vec![
                node("v1", 100.0, 100.0),
                node("u1", 200.0, 100.0),
                node("v2", 300.0, 100.0),
                node("u3", 400.0, 100.0),
                node("v3", 500.0, 100.0),
                node("u2", 200.0, 250.0),
                node("v4", 100.0, 400.0),
                node("v5", 300.0, 250.0),
            ],
            edges: vec![
                edge("v1", "u1", 2),
                edge("u1", "v2", 2),
                edge("v2", "u3", 2),
                edge("u3", "v3", 2),
                edge("u1", "u2", 1),
                edge("u2", "v4", 3),
                edge("v2", "v5", 4),
                edge("u2", "v5", 5),
            ],
            terminals: ["v1", "v2", "v3", "v4", "v5"].map(String::from).to_vec(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn is_terminal(&self, id: &str) -> bool {
        self.terminals.iter().any(|t| t == id)
    }

    pub fn hit(&self, p: Point) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| {
            let (dx, dy) = (n.x - p.x, n.y - p.y);
            dx * dx + dy * dy < HIT_RADIUS_SQ
        })
    }

    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        self.edges.iter().any(|e| e.joins(a, b))
    }

    pub fn remove_node(&mut self, id: &str) {
        self.nodes.retain(|n| n.id != id);
        self.edges.retain(|e| e.u != id && e.v != id);
        self.terminals.retain(|t| t != id);
    }

    pub fn toggle_terminal(&mut self, id: &str) {
        if self.is_terminal(id) {
            self.terminals.retain(|t| t != id);
        } else {
            self.terminals.push(id.to_string());
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SteinerRequest {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub terminals: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EditMode {
    #[default]
    Move,
    Node,
    Edge,
    Terminal,
    Delete,
}

impl FromStr for EditMode {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "move" => Ok(EditMode::Move),
            "node" => Ok(EditMode::Node),
            "edge" => Ok(EditMode::Edge),
            "terminal" => Ok(EditMode::Terminal),
            "delete" => Ok(EditMode::Delete),
            other => Err(VizError::Config(format!("unknown edit mode '{other}'"))),
        }
    }
}

/// An edge drawn by the user that still needs a weight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingEdge {
    pub u: String,
    pub v: String,
}

#[derive(Debug, Default)]
pub struct GraphEditor {
    graph: Rc<RefCell<Graph>>,
    mode: EditMode,
    drag: Option<String>,
    edge_start: Option<String>,
    pointer: Option<Point>,
    pending: Option<PendingEdge>,
}

impl GraphEditor {
    pub fn new(graph: Rc<RefCell<Graph>>) -> Self {
        GraphEditor {
            graph,
            ..GraphEditor::default()
        }
    }

    pub fn graph(&self) -> Rc<RefCell<Graph>> {
        Rc::clone(&self.graph)
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// Switching modes drops any half-finished gesture.
    pub fn set_mode(&mut self, mode: EditMode) {
        self.mode = mode;
        self.drag = None;
        self.edge_start = None;
        self.pointer = None;
    }

    pub fn pending(&self) -> Option<&PendingEdge> {
        self.pending.as_ref()
    }

    /// Dashed guide from the edge start to the pointer while drawing an edge.
    pub fn rubber_band(&self) -> Option<(Point, Point)> {
        let start = self.edge_start.as_deref()?;
        let from = self.graph.borrow().node(start)?.at();
        Some((from, self.pointer?))
    }

    pub fn pointer_down(&mut self, p: Point) -> bool {
        let hit = self.graph.borrow().hit(p).map(|n| n.id.clone());
        match (self.mode, hit) {
            (EditMode::Move, Some(id)) => {
                self.drag = Some(id);
                false
            }
            (EditMode::Node, None) => {
                let mut g = self.graph.borrow_mut();
                let id = format!("v{}", g.nodes.len() + 1);
                log::debug!("add node {id}");
                g.nodes.push(GraphNode { id, x: p.x, y: p.y });
                true
            }
            (EditMode::Edge, Some(id)) => {
                self.edge_start = Some(id);
                self.pointer = Some(p);
                false
            }
            (EditMode::Terminal, Some(id)) => {
                self.graph.borrow_mut().toggle_terminal(&id);
                true
            }
            (EditMode::Delete, Some(id)) => {
                log::debug!("remove node {id}");
                self.graph.borrow_mut().remove_node(&id);
                true
            }
            _ => false,
        }
    }

    /// Returns whether anything needs redrawing.
    pub fn pointer_move(&mut self, p: Point) -> bool {
        if let Some(id) = &self.drag {
            if let Some(n) = self.graph.borrow_mut().nodes.iter_mut().find(|n| &n.id == id) {
                n.x = p.x;
                n.y = p.y;
            }
            return true;
        }
        if self.edge_start.is_some() {
            self.pointer = Some(p);
            return true;
        }
        false
    }

    /// Ends a drag or an edge gesture. Returns whether the graph changed.
    pub fn pointer_up(&mut self, p: Point) -> bool {
        let moved = self.drag.take().is_some();
        self.pointer = None;
        if let Some(start) = self.edge_start.take() {
            let g = self.graph.borrow();
            if let Some(end) = g.hit(p)
                && end.id != start
            {
                if g.has_edge(&start, &end.id) {
                    log::debug!("edge {start}-{} already exists", end.id);
                } else {
                    self.pending = Some(PendingEdge {
                        u: start,
                        v: end.id.clone(),
                    });
                }
            }
        }
        moved
    }

    /// Adds the pending edge. A blank weight means 1.
    pub fn confirm_weight(&mut self, raw: &str) -> Result<bool, InputError> {
        let Some(edge) = self.pending.take() else {
            return Ok(false);
        };
        let w = if raw.trim().is_empty() {
            1
        } else {
            match validate::int("weight", raw) {
                Ok(w) if w > 0 => w,
                Ok(_) => {
                    return Err(InputError::BadWeight { u: edge.u, v: edge.v });
                }
                Err(e) => {
                    self.pending = Some(edge);
                    return Err(e);
                }
            }
        };
        let mut g = self.graph.borrow_mut();
        if g.has_edge(&edge.u, &edge.v) {
            return Err(InputError::DuplicateEdge { u: edge.u, v: edge.v });
        }
        g.edges.push(GraphEdge { u: edge.u, v: edge.v, w });
        Ok(true)
    }

    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    pub fn load_example(&mut self) {
        *self.graph.borrow_mut() = Graph::example();
        self.set_mode(self.mode);
        self.pending = None;
    }

    pub fn clear(&mut self) {
        *self.graph.borrow_mut() = Graph::default();
        self.set_mode(self.mode);
        self.pending = None;
    }

    pub fn request(&self) -> Result<SteinerRequest, InputError> {
        validate::steiner(&self.graph.borrow())
    }
}
