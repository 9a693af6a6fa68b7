use std::cell::RefCell;
use std::rc::Rc;

use stepviz_core::highlight::CellRef;
use stepviz_core::playback::testing::{RecordingPresenter, RecordingScheduler};
use stepviz_core::reference;
use stepviz_core::search::SearchGraph;
use stepviz_core::validate;
use stepviz_core::viz::hill_climbing::HillGraphViz;
use stepviz_core::viz::knapsack::{ItemList, KnapsackViz};
use stepviz_core::viz::lcs::LcsViz;
use stepviz_core::viz::proof_graph::{ProofGraphViz, ProofStyle};
use stepviz_core::viz::seam_carving::SeamCarvingViz;
use stepviz_core::viz::table::CellValue;
use stepviz_core::{Controller, Lang, PlaybackState, Player, Visualizer, VisualizerKind, VizError};

fn controller<V: Visualizer>(viz: V, kind: VisualizerKind) -> Controller<V, RecordingScheduler, RecordingPresenter> {
    Controller::new(
        viz,
        RecordingScheduler::default(),
        RecordingPresenter::default(),
        &kind.default_config(),
        Lang::Zh,
    )
}

fn knapsack_body() -> String {
    let mut items = ItemList::default();
    items.add("2", "3").unwrap();
    items.add("3", "4").unwrap();
    let req = items.request("5").unwrap();
    reference::body(reference::knapsack(&req))
}

#[test]
fn knapsack_summary_points_at_the_answer() {
    let mut c = controller(KnapsackViz, VisualizerKind::Knapsack);
    c.load_json(&knapsack_body(), false).unwrap();
    c.seek(i64::MAX);
    let last = c.current_step().unwrap();
    assert_eq!(last.table[2][5], CellValue::Int(7));
    assert_eq!(last.current, Some(CellRef { r: 2, c: 5 }));
    c.next();
    assert_eq!(c.state(), PlaybackState::Finished);
    assert_eq!(c.cursor(), c.len() - 1);
}

#[test]
fn knapsack_runs_to_the_end_on_autoplay() {
    let mut c = controller(KnapsackViz, VisualizerKind::Knapsack);
    c.load_json(&knapsack_body(), true).unwrap();
    while let Some(id) = c.timer() {
        c.tick(id);
    }
    assert_eq!(c.state(), PlaybackState::Finished);
    let frame = c.presenter().last_frame().unwrap();
    assert_eq!(frame.index, frame.total - 1);
    assert!(frame.scene.texts().any(|t| t == "7"));
}

#[test]
fn lcs_final_length_is_four() {
    let req = validate::lcs("ABCBDAB", "BDCABA").unwrap();
    let mut c = controller(LcsViz, VisualizerKind::Lcs);
    c.load_json(&reference::body(reference::lcs(&req)), false).unwrap();
    c.seek(i64::MAX);
    let last = c.current_step().unwrap();
    assert_eq!(last.c_table[7][6], CellValue::Int(4));
    assert!(last.highlights.iter().all(|h| h.tag() == Some("path")));
    assert!(!last.highlights.is_empty());
}

#[test]
fn reset_and_reload_reproduce_step_zero() {
    let body = knapsack_body();
    let mut c = controller(KnapsackViz, VisualizerKind::Knapsack);
    c.load_json(&body, true).unwrap();
    let first = c.presenter().last_frame().unwrap().clone();
    c.tick(c.timer().unwrap());
    c.reset();
    assert_eq!(c.state(), PlaybackState::Empty);
    c.load_json(&body, false).unwrap();
    assert_eq!(c.presenter().last_frame().unwrap(), &first);
}

#[test]
fn rejected_input_never_reaches_the_controller() {
    let items = ItemList::default();
    let err = VizError::from(items.request("5").unwrap_err());
    let mut c = controller(KnapsackViz, VisualizerKind::Knapsack);
    c.fail(&err);
    assert_eq!(c.state(), PlaybackState::Empty);
    assert_eq!(c.presenter().errors, vec!["add at least 1 item".to_string()]);
}

#[test]
fn seam_run_keeps_disruption_from_the_opening_step() {
    let body = r#"[
        {"type":"init","m":2,"n":2,"d":[[3,1],[2,5]],"msg":"init"},
        {"type":"calc_cell","row":1,"col":0,"prev_col":1,"C":[[3,1],[3,0]],"msg":"calc"},
        {"type":"result","path":[[0,1],[1,0]],"C":[[3,1],[3,6]],"msg":"done"}]"#;
    let mut c = controller(SeamCarvingViz, VisualizerKind::SeamCarving);
    c.load_json(body, false).unwrap();
    c.seek(i64::MAX);
    let frame = c.presenter().last_frame().unwrap();
    assert_eq!(frame.index, 2);
    assert!(frame.scene.texts().any(|t| t == "d:5"));
    assert!(frame.scene.texts().any(|t| t == "6"));
}

#[test]
fn hill_climbing_run_keeps_the_graph_it_started_with() {
    let shared = Rc::new(RefCell::new(SearchGraph::seeded(9, 600.0, 400.0)));
    let start = shared.borrow().start.clone();
    let body = format!(r#"[{{"msg":"init","stack":["{start}"],"current_node":null,"visited":["{start}"],"phase":"init"}}]"#);
    let mut c = controller(HillGraphViz::new(shared.clone()), VisualizerKind::HillClimbing);
    c.load_json(&body, false).unwrap();
    let before = c.presenter().last_frame().unwrap().scene.clone();

    *shared.borrow_mut() = SearchGraph::seeded(10, 600.0, 400.0);
    c.seek(0);
    assert_eq!(c.presenter().last_frame().unwrap().scene, before);
    assert_eq!(before.table("stackList").unwrap().rows[0].cells[0].text, start);
}

#[test]
fn unique_mst_autoplay_uses_the_stepped_slider() {
    let body = r#"[{"type":"init","nodes":[],"edges":[],"msg":"a"},{"type":"show_mst","msg":"b"}]"#;
    let mut c = controller(ProofGraphViz::new(ProofStyle::UniqueMst), VisualizerKind::UniqueMst);
    c.load_json(body, true).unwrap();
    assert_eq!(c.scheduler().last_interval(), Some(1280));
    c.set_speed(10.0);
    assert_eq!(c.scheduler().last_interval(), Some(380));
}
