use serde::Deserialize;

use super::Visualizer;
use super::table::MAX_DIM;
use crate::scene::{Font, Point, Rect, Scene, Stroke};
use crate::step::Step;

const CENTER: Point = Point { x: 300.0, y: 200.0 };
const SPOKE: f64 = 120.0;
const NODE_R: f64 = 15.0;

const T1: &str = "rgba(255, 0, 0, 0.7)";
const T2: &str = "rgba(0, 0, 255, 0.7)";
const CYCLE: &str = "rgba(255, 255, 0, 0.5)";

/// Undirected edge as `[u, v]`.
pub type Pair = [usize; 2];

/// One step of the exchange argument between two spanning trees `T1` and
/// `T2` of a five-node wheel.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExchangeProofStep {
    #[serde(rename = "type")]
    pub kind: String,
    pub msg: String,
    pub nodes: Vec<usize>,
    pub edges: Vec<Pair>,
    pub t1: Vec<Pair>,
    pub t2: Vec<Pair>,
    pub t1_prime: Vec<Pair>,
    pub t2_prime: Vec<Pair>,
    pub cycle_edges: Vec<Pair>,
    pub a: Option<Pair>,
    pub b: Option<Pair>,
    pub candidates: Vec<Pair>,
    pub path: Vec<Pair>,
    pub removed: Option<Pair>,
    pub added: Option<Pair>,
}

impl Step for ExchangeProofStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

/// Hub in the middle, rim nodes on the diagonals.
fn position(id: usize) -> Option<Point> {
    let d = SPOKE;
    let (dx, dy) = match id {
        0 => (-d, -d),
        1 => (-d, d),
        2 => (0.0, 0.0),
        3 => (d, -d),
        4 => (d, d),
        _ => return None,
    };
    Some(CENTER.offset(dx, dy))
}

/// Endpoints, midpoint and unit normal of an edge.
fn geometry(edge: Pair) -> Option<(Point, Point, Point, (f64, f64))> {
    let (p, q) = (position(edge[0])?, position(edge[1])?);
    let (dx, dy) = (q.x - p.x, q.y - p.y);
    let len = (dx * dx + dy * dy).sqrt();
    (len > f64::EPSILON).then(|| (p, q, p.midpoint(q), (-dy / len, dx / len)))
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SpanningTreeViz;

impl SpanningTreeViz {
    fn offset_edges(scene: &mut Scene, edges: &[Pair], color: &str, shift: f64) {
        for &e in edges.iter().take(MAX_DIM) {
            if let Some((p, q, _, (nx, ny))) = geometry(e) {
                scene.line(p.offset(nx * shift, ny * shift), q.offset(nx * shift, ny * shift), Stroke::solid(color, 3.0));
            }
        }
    }

    /// Thick edge with a letter beside it and an arrow pointing in.
    fn named_edge(scene: &mut Scene, edge: Pair, name: &str, color: &str) {
        let Some((p, q, mid, (nx, ny))) = geometry(edge) else {
            return;
        };
        scene.line(p, q, Stroke::solid(color, 5.0));
        let label = mid.offset(nx * 20.0, ny * 20.0);
        scene.circle(label, 10.0, Some("white"), None);
        scene.text(label, name, Font::bold(16.0), color);

        let tail = mid.offset(nx * 30.0, ny * 30.0);
        let tip = mid.offset(nx * 5.0, ny * 5.0);
        scene.line(tail, tip, Stroke::solid(color, 3.0));
        scene.arrow_head(tip, (mid.y - tail.y).atan2(mid.x - tail.x), 10.0, color);
    }

    fn legend(scene: &mut Scene) {
        let entries = [("red", "T1 (Red)"), ("blue", "T2 (Blue)"), ("orange", "Edge a"), ("purple", "Edge b")];
        for (row, (color, text)) in entries.into_iter().enumerate() {
            let y = 10.0 + row as f64 * 20.0;
            scene.fill_rect(Rect::new(10.0, y, 15.0, 10.0), color);
            scene.text_left(Point::new(30.0, y + 10.0), text, Font::plain(12.0), "black");
        }
    }
}

impl Visualizer for SpanningTreeViz {
    type Step = ExchangeProofStep;
    type Context = ();

    fn capture(&self, _steps: &[ExchangeProofStep]) {}

    fn render(&self, step: &ExchangeProofStep, _ctx: &()) -> Scene {
        let mut scene = Scene::new(600.0, 400.0);

        Self::offset_edges(&mut scene, &step.t1, T1, -3.0);
        Self::offset_edges(&mut scene, &step.t2, T2, 3.0);
        Self::offset_edges(&mut scene, &step.t1_prime, T1, -3.0);
        Self::offset_edges(&mut scene, &step.t2_prime, T2, 3.0);
        for &e in step.cycle_edges.iter().take(MAX_DIM) {
            if let (Some(p), Some(q)) = (position(e[0]), position(e[1])) {
                scene.line(p, q, Stroke::solid(CYCLE, 10.0));
            }
        }
        if let Some(a) = step.a {
            Self::named_edge(&mut scene, a, "a", "orange");
        }
        if let Some(b) = step.b {
            Self::named_edge(&mut scene, b, "b", "purple");
        }

        for id in 0..5 {
            if let Some(at) = position(id) {
                scene.circle(at, NODE_R, Some("white"), Some(Stroke::solid("black", 2.0)));
                scene.text(at, id.to_string(), Font::plain(12.0), "black");
            }
        }
        Self::legend(&mut scene);
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::DrawCmd;

    fn lines(scene: &Scene) -> Vec<(Point, String)> {
        scene
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Line { from, stroke, .. } => Some((*from, stroke.color.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn trees_are_drawn_side_by_side() {
        let step: ExchangeProofStep =
            serde_json::from_str(r#"{"type":"init","nodes":[0,1,2,3,4],"t1":[[0,3]],"t2":[[0,3]],"msg":"m"}"#).unwrap();
        let l = lines(&SpanningTreeViz.render(&step, &()));
        assert_eq!(l.len(), 2);
        // 0 -> 3 runs left to right, so the normal points down.
        assert_eq!((l[0].0.x, l[0].0.y, l[0].1.as_str()), (180.0, 77.0, T1));
        assert_eq!((l[1].0.x, l[1].0.y, l[1].1.as_str()), (180.0, 83.0, T2));
    }

    #[test]
    fn chosen_edges_get_labels_and_arrows() {
        let step: ExchangeProofStep = serde_json::from_str(
            r#"{"type":"show_cycle","cycle_edges":[[0,2],[2,3],[3,0]],"a":[0,3],"b":[2,3]}"#,
        )
        .unwrap();
        let scene = SpanningTreeViz.render(&step, &());
        let colors: Vec<_> = lines(&scene).into_iter().map(|(_, c)| c).collect();
        assert_eq!(colors, vec![CYCLE, CYCLE, CYCLE, "orange", "orange", "purple", "purple"]);
        let arrow_heads = scene.commands.iter().filter(|c| matches!(c, DrawCmd::Polygon { .. })).count();
        assert_eq!(arrow_heads, 2);
        assert!(scene.texts().any(|t| t == "a"));
        assert!(scene.texts().any(|t| t == "Edge b"));
    }

    #[test]
    fn unknown_nodes_are_skipped() {
        let step: ExchangeProofStep = serde_json::from_str(r#"{"t1":[[0,9]],"a":[7,8]}"#).unwrap();
        let scene = SpanningTreeViz.render(&step, &());
        assert!(lines(&scene).is_empty());
        assert_eq!(scene.texts().filter(|t| t.len() == 1).count(), 5);
    }
}
