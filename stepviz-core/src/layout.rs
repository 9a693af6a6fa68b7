//! Placement helpers for the tree and graph renderers.

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;
use std::hash::Hash;

use crate::scene::Point;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

pub fn bounds(points: impl IntoIterator<Item = Point>) -> Option<Bounds> {
    points.into_iter().fold(None, |acc, p| {
        Some(match acc {
            None => Bounds { min: p, max: p },
            Some(b) => Bounds {
                min: Point::new(b.min.x.min(p.x), b.min.y.min(p.y)),
                max: Point::new(b.max.x.max(p.x), b.max.y.max(p.y)),
            },
        })
    })
}

/// Maps server coordinates onto a surface of known size. The server lays
/// trees out on a fixed-width strip; `x` is stretched to fill the surface
/// minus `padding` on both sides, `y` is only shrunk when the deepest node
/// would not fit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fit {
    pub padding: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Fit {
    pub fn new(width: f64, height: f64, source_width: f64, padding: f64, max_y: f64, bottom: f64) -> Self {
        let required = max_y + bottom;
        Fit {
            padding,
            scale_x: (width - 2.0 * padding) / source_width,
            scale_y: if required > height { height / required } else { 1.0 },
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(self.padding + p.x * self.scale_x, p.y * self.scale_y)
    }
}

/// `n` points evenly spaced on a circle, starting at twelve o'clock.
pub fn circle_layout(n: usize, center: Point, radius: f64) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let a = -PI / 2.0 + 2.0 * PI * i as f64 / n as f64;
            center.offset(radius * a.cos(), radius * a.sin())
        })
        .collect()
}

/// Layered binary-tree layout: x from the in-order rank, y from the depth.
///
/// `children` returns `(left, right)` for a node. Nodes reachable from
/// `root` more than once are placed the first time only.
pub fn binary_tree_layout<K, F>(root: K, children: F, origin: Point, dx: f64, dy: f64) -> HashMap<K, Point>
where
    K: Copy + Eq + Hash,
    F: Fn(K) -> (Option<K>, Option<K>),
{
    enum Visit<K> {
        Enter(K, usize),
        Place(K, usize),
    }

    let mut placed = HashMap::new();
    let mut seen = HashSet::new();
    let mut rank = 0usize;
    let mut stack = vec![Visit::Enter(root, 0)];
    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Enter(node, depth) => {
                if !seen.insert(node) {
                    continue;
                }
                let (left, right) = children(node);
                if let Some(r) = right {
                    stack.push(Visit::Enter(r, depth + 1));
                }
                stack.push(Visit::Place(node, depth));
                if let Some(l) = left {
                    stack.push(Visit::Enter(l, depth + 1));
                }
            }
            Visit::Place(node, depth) => {
                placed
                    .entry(node)
                    .or_insert_with(|| origin.offset(rank as f64 * dx, depth as f64 * dy));
                rank += 1;
            }
        }
    }
    placed
}
