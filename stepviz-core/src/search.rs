//! Client-side state for the hill-climbing page: a random search graph and
//! the 8-puzzle boards.
//!
//! Both are built in the browser and sent whole with each run; the server
//! only returns the search trace.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

/// Nodes in a generated graph.
pub const NODE_COUNT: usize = 10;
/// Largest heuristic handed to a non-goal node.
pub const MAX_H: i64 = 20;
/// Blank moves made when scrambling a puzzle.
pub const SCRAMBLE_MOVES: usize = 20;

const BORDER: f64 = 50.0;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    /// Estimated distance to the goal; zero only at the goal.
    pub h: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEdge {
    pub u: String,
    pub v: String,
}

/// Undirected graph with a start and a goal. Serializes as the body of a
/// simple-graph run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchGraph {
    pub nodes: Vec<SearchNode>,
    pub edges: Vec<SearchEdge>,
    pub start: String,
    pub goal: String,
}

impl SearchGraph {
    /// Scatters [`NODE_COUNT`] nodes over a `width` by `height` canvas and
    /// gives each one or two random undirected edges. The goal is picked at
    /// random and the start is the node after it.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, width: f64, height: f64) -> SearchGraph {
        let span_x = (width - 2.0 * BORDER).max(1.0);
        let span_y = (height - 2.0 * BORDER).max(1.0);
        let mut nodes: Vec<SearchNode> = (0..NODE_COUNT)
            .map(|i| SearchNode {
                id: i.to_string(),
                x: rng.gen_range(0.0..span_x) + BORDER,
                y: rng.gen_range(0.0..span_y) + BORDER,
                h: rng.gen_range(1..=MAX_H),
            })
            .collect();

        let goal = rng.gen_range(0..NODE_COUNT);
        let start = (goal + 1) % NODE_COUNT;
        nodes[goal].h = 0;
        let mut graph = SearchGraph {
            start: nodes[start].id.clone(),
            goal: nodes[goal].id.clone(),
            nodes,
            edges: Vec::new(),
        };

        for i in 0..NODE_COUNT {
            for _ in 0..rng.gen_range(1..=2) {
                let target = rng.gen_range(0..NODE_COUNT);
                let (u, v) = (i.to_string(), target.to_string());
                if target != i && !graph.has_edge(&u, &v) {
                    graph.edges.push(SearchEdge { u, v });
                }
            }
        }
        log::debug!("generated search graph with {} edges, start {} goal {}", graph.edges.len(), graph.start, graph.goal);
        graph
    }

    /// Reproducible graph for a given seed.
    pub fn seeded(seed: u64, width: f64, height: f64) -> SearchGraph {
        SearchGraph::generate(&mut Pcg64::seed_from_u64(seed), width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&SearchNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        self.edges.iter().any(|e| (e.u == a && e.v == b) || (e.u == b && e.v == a))
    }
}

/// 3x3 sliding puzzle, `0` is the blank.
pub type Board = [[u8; 3]; 3];

/// Spiral goal.
pub const DEFAULT_GOAL: Board = [[1, 2, 3], [8, 0, 4], [7, 6, 5]];
pub const DEFAULT_START: Board = [[2, 8, 3], [1, 6, 4], [7, 0, 5]];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PuzzleRequest {
    pub start: Board,
    pub goal: Board,
}

pub fn flatten(board: &Board) -> [u8; 9] {
    let mut flat = [0; 9];
    for (k, v) in board.iter().flatten().enumerate() {
        flat[k] = *v;
    }
    flat
}

pub fn unflatten(flat: &[u8; 9]) -> Board {
    let mut board = [[0; 3]; 3];
    for (k, v) in flat.iter().enumerate() {
        board[k / 3][k % 3] = *v;
    }
    board
}

/// Slides the blank `moves` times from `goal`, so the result is always
/// solvable.
pub fn scramble<R: Rng + ?Sized>(rng: &mut R, goal: &Board, moves: usize) -> Board {
    let mut flat = flatten(goal);
    for _ in 0..moves {
        let Some(z) = flat.iter().position(|&v| v == 0) else {
            break;
        };
        let (r, c) = (z / 3, z % 3);
        let mut neighbors = Vec::with_capacity(4);
        if r > 0 {
            neighbors.push(z - 3);
        }
        if r < 2 {
            neighbors.push(z + 3);
        }
        if c > 0 {
            neighbors.push(z - 1);
        }
        if c < 2 {
            neighbors.push(z + 1);
        }
        let swap = neighbors[rng.gen_range(0..neighbors.len())];
        flat.swap(z, swap);
    }
    unflatten(&flat)
}

pub fn scramble_seeded(seed: u64, goal: &Board) -> Board {
    scramble(&mut Pcg64::seed_from_u64(seed), goal, SCRAMBLE_MOVES)
}

/// Converts a `Math.random()` style float into a seed.
pub fn seed_from_unit(x: f64) -> u64 {
    (x.clamp(0.0, 1.0) * u64::MAX as f64) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_graph_has_one_goal_and_no_duplicate_edges() {
        let graph = SearchGraph::seeded(7, 600.0, 400.0);
        assert_eq!(graph.nodes.len(), NODE_COUNT);
        assert_eq!(graph.nodes.iter().filter(|n| n.h == 0).count(), 1);
        assert_eq!(graph.node(&graph.goal).map(|n| n.h), Some(0));
        let goal: usize = graph.goal.parse().unwrap();
        assert_eq!(graph.start, ((goal + 1) % NODE_COUNT).to_string());
        for n in &graph.nodes {
            assert!((50.0..=550.0).contains(&n.x) && (50.0..=350.0).contains(&n.y), "{n:?}");
            assert!((0..=MAX_H).contains(&n.h));
        }
        for (k, e) in graph.edges.iter().enumerate() {
            assert_ne!(e.u, e.v);
            assert!(!graph.edges[k + 1..].iter().any(|o| (o.u == e.u && o.v == e.v) || (o.u == e.v && o.v == e.u)));
        }
    }

    #[test]
    fn same_seed_same_graph() {
        assert_eq!(SearchGraph::seeded(42, 600.0, 400.0), SearchGraph::seeded(42, 600.0, 400.0));
        assert_ne!(SearchGraph::seeded(1, 600.0, 400.0), SearchGraph::seeded(2, 600.0, 400.0));
    }

    #[test]
    fn graph_serializes_as_run_body() {
        let graph = SearchGraph::seeded(3, 600.0, 400.0);
        let body = serde_json::to_value(&graph).unwrap();
        assert_eq!(body["start"], graph.start.as_str());
        assert_eq!(body["nodes"].as_array().map(Vec::len), Some(NODE_COUNT));
        assert!(body["edges"][0]["u"].is_string());
    }

    #[test]
    fn scramble_keeps_tiles() {
        let board = scramble_seeded(11, &DEFAULT_GOAL);
        let mut flat = flatten(&board);
        flat.sort_unstable();
        assert_eq!(flat, [0, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(scramble(&mut Pcg64::seed_from_u64(0), &DEFAULT_GOAL, 0), DEFAULT_GOAL);
    }

    #[test]
    fn puzzle_request_uses_nested_rows() {
        let body = serde_json::to_value(PuzzleRequest { start: DEFAULT_START, goal: DEFAULT_GOAL }).unwrap();
        assert_eq!(body["start"][2], serde_json::json!([7, 0, 5]));
        assert_eq!(body["goal"][1][1], 0);
    }

    #[test]
    fn unit_floats_map_to_distinct_seeds() {
        assert_eq!(seed_from_unit(0.0), 0);
        assert_ne!(seed_from_unit(0.25), seed_from_unit(0.5));
        assert_eq!(seed_from_unit(-3.0), 0);
    }
}
