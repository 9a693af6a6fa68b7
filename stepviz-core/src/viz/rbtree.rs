use std::cmp::Ordering;
use std::collections::HashMap;
use std::f64::consts::PI;

use serde::Deserialize;

use super::Visualizer;
use super::table::CellValue;
use crate::layout::binary_tree_layout;
use crate::scene::{DrawCmd, Font, Point, Scene, Stroke};
use crate::step::Step;

const NODE_R: f64 = 20.0;
const ROTATE_R: f64 = 35.0;
const MIN_W: f64 = 2000.0;
const MIN_H: f64 = 1500.0;

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeColor {
    Red,
    #[default]
    Black,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RbNode {
    pub id: String,
    pub key: CellValue,
    pub color: NodeColor,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub is_highlight: bool,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RbEdge {
    pub u: String,
    pub v: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Snapshot {
    pub root_id: Option<String>,
    pub nodes: Vec<RbNode>,
    pub edges: Vec<RbEdge>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationDir {
    Left,
    Right,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Rotation {
    #[serde(rename = "type")]
    pub type_: RotationDir,
    pub id: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RbStep {
    pub snap: Snapshot,
    pub canvas_msg: Option<String>,
    pub rotation: Option<Rotation>,
    pub msg: String,
}

impl Step for RbStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

fn compare_keys(a: &CellValue, b: &CellValue) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

impl Snapshot {
    /// Node positions, using the server's coordinates when every node has
    /// them and a layered in-order layout otherwise. Children are told apart
    /// by comparing their key with the parent's.
    pub fn positions(&self) -> HashMap<&str, Point> {
        let complete = self.nodes.iter().all(|n| n.x.is_some() && n.y.is_some());
        if complete {
            return self
                .nodes
                .iter()
                .filter_map(|n| Some((n.id.as_str(), Point::new(n.x?, n.y?))))
                .collect();
        }
        let Some(root) = self.root_id.as_deref() else {
            return HashMap::new();
        };
        let by_id: HashMap<&str, &RbNode> = self.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        let children = |id: &str| {
            let (mut left, mut right) = (None, None);
            let Some(parent) = by_id.get(id) else {
                return (None, None);
            };
            for e in self.edges.iter().filter(|e| e.u == id) {
                if let Some((&cid, child)) = by_id.get_key_value(e.v.as_str()) {
                    match compare_keys(&child.key, &parent.key) {
                        Ordering::Less => left = left.or(Some(cid)),
                        _ => right = right.or(Some(cid)),
                    }
                }
            }
            (left, right)
        };
        binary_tree_layout(root, children, Point::new(50.0, 150.0), 50.0, 60.0)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RbTreeViz;

impl RbTreeViz {
    fn rotation_arrow(scene: &mut Scene, at: Point, dir: RotationDir) {
        let stroke = Stroke::solid("blue", 3.0);
        let (start, end, anticlockwise, tip_angle, dx) = match dir {
            RotationDir::Left => (PI * 0.2, PI * 1.8, true, PI * 0.2, 1.0),
            RotationDir::Right => (PI * 0.8, PI * 1.2, false, PI * 1.2, -1.0),
        };
        scene.push(DrawCmd::Arc {
            center: at,
            radius: ROTATE_R,
            start,
            end,
            anticlockwise,
            stroke: stroke.clone(),
        });
        let tip = at.offset(ROTATE_R * tip_angle.cos(), ROTATE_R * tip_angle.sin());
        scene.line(tip, tip.offset(10.0 * dx, -5.0), stroke.clone());
        scene.line(tip, tip.offset(5.0 * dx, 10.0), stroke);
        let label = match dir {
            RotationDir::Left => "Left Rotate",
            RotationDir::Right => "Right Rotate",
        };
        scene.text(at.offset(0.0, -45.0), label, Font::bold(16.0), "blue");
    }
}

impl Visualizer for RbTreeViz {
    type Step = RbStep;
    type Context = ();

    fn capture(&self, _steps: &[RbStep]) {}

    fn render(&self, step: &RbStep, _ctx: &()) -> Scene {
        let pos = step.snap.positions();
        let max_x = pos.values().map(|p| p.x).fold(0.0, f64::max);
        let max_y = pos.values().map(|p| p.y).fold(0.0, f64::max);
        let mut scene = Scene::new(MIN_W.max(max_x + 100.0), MIN_H.max(max_y + 100.0));

        for e in &step.snap.edges {
            if let (Some(&a), Some(&b)) = (pos.get(e.u.as_str()), pos.get(e.v.as_str())) {
                scene.line(a, b, Stroke::solid("#555", 2.0));
            }
        }
        for node in &step.snap.nodes {
            let Some(&at) = pos.get(node.id.as_str()) else {
                continue;
            };
            let fill = match node.color {
                NodeColor::Red => "#ff4444",
                NodeColor::Black => "#333333",
            };
            let stroke = if node.is_highlight {
                Stroke::solid("#FFFF00", 4.0)
            } else {
                Stroke::solid("#000", 2.0)
            };
            scene.circle(at, NODE_R, Some(fill), Some(stroke));
            scene.text(at, node.key.to_string(), Font::bold(14.0), "white");
        }
        if let Some(msg) = step.canvas_msg.as_deref().filter(|m| !m.is_empty()) {
            scene.text_left(
                Point::new(50.0, 50.0),
                msg,
                Font {
                    family: "Microsoft JhengHei",
                    ..Font::bold(24.0)
                },
                "blue",
            );
        }
        if let Some(rot) = &step.rotation
            && let Some(&at) = pos.get(rot.id.as_str())
        {
            Self::rotation_arrow(&mut scene, at, rot.type_);
        }
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(json: &str) -> RbStep {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn server_positions_are_used() {
        let s = step(
            r#"{"snap":{"root_id":"1","nodes":[{"id":"1","key":10,"color":"BLACK","x":100,"y":150,"is_highlight":false},
                {"id":"2","key":5,"color":"RED","x":50,"y":210,"is_highlight":true}],"edges":[{"u":"1","v":"2"}]},
                "msg":"insert 5","canvas_msg":"插入 5","rotation":null}"#,
        );
        let scene = RbTreeViz.render(&s, &());
        assert_eq!((scene.width, scene.height), (2000.0, 1500.0));
        let fills: Vec<_> = scene
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Circle { fill, stroke, .. } => Some((fill.clone().unwrap(), stroke.clone().unwrap().color)),
                _ => None,
            })
            .collect();
        assert_eq!(fills, vec![
            ("#333333".to_string(), "#000".to_string()),
            ("#ff4444".to_string(), "#FFFF00".to_string()),
        ]);
        assert!(scene.texts().any(|t| t == "插入 5"));
    }

    #[test]
    fn missing_coordinates_fall_back_to_key_order() {
        let s = step(
            r#"{"snap":{"root_id":"a","nodes":[{"id":"a","key":10},{"id":"b","key":20},{"id":"c","key":5}],
                "edges":[{"u":"a","v":"b"},{"u":"a","v":"c"}]},"msg":""}"#,
        );
        let pos = s.snap.positions();
        assert_eq!(pos["c"], Point::new(50.0, 210.0));
        assert_eq!(pos["a"], Point::new(100.0, 150.0));
        assert_eq!(pos["b"], Point::new(150.0, 210.0));
    }

    #[test]
    fn rotation_draws_arc_and_label() {
        let s = step(
            r#"{"snap":{"root_id":"1","nodes":[{"id":"1","key":1,"x":100,"y":150}],"edges":[]},
                "rotation":{"type":"left","id":"1"},"msg":""}"#,
        );
        let scene = RbTreeViz.render(&s, &());
        assert!(scene.commands.iter().any(|c| matches!(c,
            DrawCmd::Arc { anticlockwise: true, radius, .. } if *radius == 35.0)));
        assert!(scene.texts().any(|t| t == "Left Rotate"));
    }

    #[test]
    fn empty_tree_renders_blank_surface() {
        let s = step(r#"{"snap":{"root_id":null,"nodes":[],"edges":[]},"msg":"init"}"#);
        let scene = RbTreeViz.render(&s, &());
        assert!(scene.is_blank());
        assert_eq!(scene.width, 2000.0);
    }
}
