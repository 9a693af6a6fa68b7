use serde::Deserialize;

use super::Visualizer;
use super::table::CellValue;
use crate::layout::circle_layout;
use crate::scene::{Font, Point, Scene, Stroke, TableCell, TableRow, TableView};
use crate::step::Step;

pub const TABLE_SLOT: &str = "dpTable";

const NODE_R: f64 = 20.0;
const MIN_W: f64 = 500.0;
const MIN_H: f64 = 380.0;
const TARGET: &str = "#fff3cd";

/// Trellis positions for the graph the server ships with.
const FIXED: [(&str, Point); 5] = [
    ("v0", Point::new(50.0, 190.0)),
    ("v1", Point::new(200.0, 100.0)),
    ("v2", Point::new(200.0, 280.0)),
    ("v3", Point::new(400.0, 100.0)),
    ("v4", Point::new(400.0, 280.0)),
];

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Part {
    /// Reachability of each node at each time.
    #[default]
    A,
    /// Highest path probability.
    B,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViterbiEdge {
    pub u: String,
    pub v: String,
    pub label: String,
    pub prob: CellValue,
}

/// Rows may be null until their time step starts.
pub type TimeTable = Vec<Option<Vec<CellValue>>>;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViterbiStep {
    #[serde(rename = "type")]
    pub type_: String,
    pub part: Part,
    /// Only the `init` step carries the graph.
    pub nodes: Vec<String>,
    pub edges: Vec<ViterbiEdge>,
    pub i: Option<usize>,
    pub u: Option<String>,
    pub v: Option<String>,
    pub reachable: Option<TimeTable>,
    #[serde(rename = "P")]
    pub p: Option<TimeTable>,
    pub path: Vec<String>,
    pub msg: String,
}

impl Step for ViterbiStep {
    fn message(&self) -> &str {
        &self.msg
    }
}

impl ViterbiStep {
    fn table(&self) -> Option<&TimeTable> {
        match self.part {
            Part::A => self.reachable.as_ref(),
            Part::B => self.p.as_ref(),
        }
    }

    fn is_init(&self) -> bool {
        self.type_ == "init" || self.type_ == "init_b"
    }

    fn is_result(&self) -> bool {
        self.type_ == "result_a" || self.type_ == "result_b"
    }
}

/// Graph from the `init` step plus the final table of each part, shown
/// again by the result steps which carry no table of their own.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViterbiContext {
    pub nodes: Vec<String>,
    pub edges: Vec<ViterbiEdge>,
    pub last_a: Option<TimeTable>,
    pub last_b: Option<TimeTable>,
}

impl ViterbiContext {
    fn positions(&self) -> Vec<Point> {
        let ring = circle_layout(self.nodes.len(), Point::new(250.0, 190.0), 150.0);
        self.nodes
            .iter()
            .zip(ring)
            .map(|(id, fallback)| {
                FIXED
                    .iter()
                    .find(|(fixed, _)| *fixed == id.as_str())
                    .map_or(fallback, |(_, p)| *p)
            })
            .collect()
    }

    fn at(&self, pos: &[Point], id: &str) -> Option<Point> {
        self.nodes.iter().position(|n| n == id).and_then(|i| pos.get(i).copied())
    }
}

fn display(part: Part, v: Option<&CellValue>) -> (String, Option<&'static str>) {
    let Some(v) = v.filter(|v| **v != CellValue::Null) else {
        return (String::new(), None);
    };
    match part {
        Part::A => {
            let yes = matches!(v, CellValue::Bool(true));
            (if yes { "T" } else { "F" }.to_string(), yes.then_some("#d1e7dd"))
        }
        Part::B => match v.as_f64() {
            Some(f) if f == 0.0 => ("0".to_string(), None),
            Some(f) => (format!("{f:.4}"), (f > 0.0).then_some("#cff4fc")),
            None => (v.to_string(), None),
        },
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ViterbiViz;

impl ViterbiViz {
    fn dp_table(step: &ViterbiStep, nodes: &[String], table: Option<&TimeTable>) -> TableView {
        let target = step.i.zip(step.v.as_deref());
        let rows = table
            .map(|t| {
                t.iter()
                    .enumerate()
                    .map(|(i, row)| TableRow {
                        label: format!("t={i}"),
                        cells: nodes
                            .iter()
                            .enumerate()
                            .map(|(j, node)| {
                                let (text, class) = display(step.part, row.as_ref().and_then(|r| r.get(j)));
                                let bg = if target == Some((i, node.as_str())) { Some(TARGET) } else { class };
                                TableCell::text(text).with_background(bg)
                            })
                            .collect(),
                        background: None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        TableView {
            slot: TABLE_SLOT,
            corner: "Time".to_string(),
            header: nodes.to_vec(),
            rows,
        }
    }
}

impl Visualizer for ViterbiViz {
    type Step = ViterbiStep;
    type Context = ViterbiContext;

    fn capture(&self, steps: &[ViterbiStep]) -> ViterbiContext {
        let mut ctx = steps
            .iter()
            .find(|s| s.type_ == "init")
            .map(|s| ViterbiContext {
                nodes: s.nodes.clone(),
                edges: s.edges.clone(),
                ..ViterbiContext::default()
            })
            .unwrap_or_default();
        for s in steps {
            match (s.part, s.table()) {
                (Part::A, Some(t)) => ctx.last_a = Some(t.clone()),
                (Part::B, Some(t)) => ctx.last_b = Some(t.clone()),
                _ => {}
            }
        }
        ctx
    }

    fn render(&self, step: &ViterbiStep, ctx: &ViterbiContext) -> Scene {
        let mut scene = Scene::new(MIN_W, MIN_H);
        if ctx.nodes.is_empty() {
            return scene;
        }
        let pos = ctx.positions();

        let (hot_nodes, hot_edge): (Vec<&str>, Option<(&str, &str)>) = if step.is_init() {
            (vec!["v0"], None)
        } else if step.is_result() {
            (Vec::new(), None)
        } else {
            match (step.u.as_deref(), step.v.as_deref()) {
                (Some(u), Some(v)) => (vec![u, v], Some((u, v))),
                _ => (Vec::new(), None),
            }
        };
        let on_path = |u: &str, v: &str| step.path.windows(2).any(|w| w[0] == u && w[1] == v);

        for e in &ctx.edges {
            let (Some(from), Some(to)) = (ctx.at(&pos, &e.u), ctx.at(&pos, &e.v)) else {
                continue;
            };
            let stroke = if on_path(&e.u, &e.v) {
                Stroke::solid("#28a745", 3.0)
            } else if hot_edge == Some((e.u.as_str(), e.v.as_str())) {
                Stroke::solid("#ffc107", 2.0)
            } else {
                Stroke::solid("#ccc", 1.0)
            };
            scene.arrow(from, to, NODE_R, stroke);
            scene.text(from.midpoint(to), format!("{} ({})", e.label, e.prob), Font::plain(12.0), "#000");
        }

        for (id, at) in ctx.nodes.iter().zip(&pos) {
            let fill = if step.path.contains(id) {
                "#d1e7dd"
            } else if hot_nodes.contains(&id.as_str()) {
                "#cfe2ff"
            } else {
                "#fff"
            };
            scene.circle(*at, NODE_R, Some(fill), Some(Stroke::solid("#333", 2.0)));
            scene.text(*at, id.clone(), Font::bold(14.0), "#000");
        }

        let table = if step.is_result() {
            match step.part {
                Part::A => ctx.last_a.as_ref(),
                Part::B => ctx.last_b.as_ref(),
            }
        } else {
            step.table()
        };
        scene.tables.push(Self::dp_table(step, &ctx.nodes, table));
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::DrawCmd;
    use crate::step::decode_steps;

    const RUN: &str = r#"[
        {"type":"init","part":"a","nodes":["v0","v1","v2"],
         "edges":[{"u":"v0","v":"v1","label":"a","prob":0.6},{"u":"v1","v":"v2","label":"b","prob":1.0}],
         "reachable":[[true,false,false],null],"msg":"init"},
        {"type":"check_edge","part":"a","i":1,"u":"v0","v":"v1","reachable":[[true,false,false],[false,true,false]],"msg":"check"},
        {"type":"result_a","part":"a","path":["v0","v1"],"msg":"done a"},
        {"type":"init_b","part":"b","P":[[1.0,0.0,0.0],null],"msg":"init b"},
        {"type":"update","part":"b","i":1,"u":"v0","v":"v1","P":[[1.0,0.0,0.0],[0.0,0.6,0.0]],"msg":"upd"}
    ]"#;

    fn load() -> (Vec<ViterbiStep>, ViterbiContext) {
        let steps = decode_steps::<ViterbiStep>(RUN).unwrap().steps;
        let ctx = ViterbiViz.capture(&steps);
        (steps, ctx)
    }

    fn fills(scene: &Scene) -> Vec<String> {
        scene
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Circle { fill, .. } => fill.clone(),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn graph_comes_from_the_init_step() {
        let (steps, ctx) = load();
        assert_eq!(ctx.nodes, vec!["v0", "v1", "v2"]);
        let scene = ViterbiViz.render(&steps[3], &ctx);
        assert_eq!(fills(&scene), vec!["#cfe2ff", "#fff", "#fff"]);
        assert!(scene.texts().any(|t| t == "b (1)"));
    }

    #[test]
    fn checked_edge_and_target_cell() {
        let (steps, ctx) = load();
        let scene = ViterbiViz.render(&steps[1], &ctx);
        assert_eq!(fills(&scene), vec!["#cfe2ff", "#cfe2ff", "#fff"]);
        let table = scene.table(TABLE_SLOT).unwrap();
        assert_eq!(table.corner, "Time");
        assert_eq!(table.rows[1].label, "t=1");
        assert_eq!(table.rows[1].cells[1].text, "T");
        assert_eq!(table.rows[1].cells[1].background.as_deref(), Some(TARGET));
        assert_eq!(table.rows[0].cells[0].background.as_deref(), Some("#d1e7dd"));
    }

    #[test]
    fn result_keeps_the_last_table_and_paints_the_path() {
        let (steps, ctx) = load();
        let scene = ViterbiViz.render(&steps[2], &ctx);
        assert_eq!(fills(&scene), vec!["#d1e7dd", "#d1e7dd", "#fff"]);
        let green = scene
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::Line { stroke, .. } if stroke.color == "#28a745"))
            .count();
        assert_eq!(green, 1);
        let table = scene.table(TABLE_SLOT).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].cells[1].text, "T");
    }

    #[test]
    fn probabilities_use_four_decimals() {
        let (steps, ctx) = load();
        let table = ViterbiViz.render(&steps[4], &ctx).tables.remove(0);
        assert_eq!(table.rows[1].cells[0].text, "0");
        assert_eq!(table.rows[1].cells[1].text, "0.6000");
        assert_eq!(table.rows[0].cells[0].text, "1.0000");
    }

    #[test]
    fn null_rows_render_blank() {
        let (steps, ctx) = load();
        let table = ViterbiViz.render(&steps[0], &ctx).tables.remove(0);
        assert!(table.rows[1].cells.iter().all(|c| c.text.is_empty()));
    }

    #[test]
    fn nothing_to_draw_without_init() {
        let scene = ViterbiViz.render(&ViterbiStep::default(), &ViterbiContext::default());
        assert!(scene.is_blank());
    }
}
