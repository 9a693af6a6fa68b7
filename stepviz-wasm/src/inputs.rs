//! Per-visualizer input panels: list builders, the Steiner graph editor,
//! the hill-climbing graph and boards, tree edit buttons and the run button.

use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, HtmlCanvasElement, HtmlInputElement, MouseEvent};

use stepviz_core::editor::{EditMode, Graph, GraphEditor};
use stepviz_core::reference;
use stepviz_core::scene::{Point, Scene};
use stepviz_core::search::{self, Board, DEFAULT_GOAL, DEFAULT_START, SearchGraph};
use stepviz_core::validate;
use stepviz_core::viz::hill_climbing::HillGraphViz;
use stepviz_core::viz::hungarian::ProblemType;
use stepviz_core::viz::knapsack::{ItemList, KnapsackViz};
use stepviz_core::viz::lcs::{LcsStep, LcsViz};
use stepviz_core::viz::matrix_chain::{MatrixChainViz, MatrixList};
use stepviz_core::viz::obst::{KeyList, ObstViz, QMode};
use stepviz_core::viz::rod_cutting::{PriceList, RodCuttingViz};
use stepviz_core::viz::steiner::SteinerViz;
use stepviz_core::{TreeOp, Visualizer, VisualizerKind, VizError, VizResult};

use crate::constants::*;
use crate::controls::on_click;
use crate::fetch::{deliver, spawn_run};
use crate::state::{State, with_state};
use crate::utils::{asset_url, event_canvas_coords, input_value, is_checked, set_input_value};

/// Input collected on the page between runs.
pub struct Inputs {
    pub items: ItemList,
    pub keys: KeyList,
    pub matrices: MatrixList,
    pub prices: PriceList,
    pub editor: GraphEditor,
    /// Draws the editor while nothing is loaded; shares the editor's graph.
    pub steiner: SteinerViz,
    /// Graph generated for the hill-climbing page, empty until generated.
    pub search: Rc<RefCell<SearchGraph>>,
    pub hill: HillGraphViz,
}

impl Inputs {
    pub fn new() -> Self {
        let graph = Rc::new(RefCell::new(Graph::example()));
        let search = Rc::new(RefCell::new(SearchGraph::default()));
        Inputs {
            items: ItemList::default(),
            keys: KeyList::default(),
            matrices: MatrixList::default(),
            prices: PriceList::default(),
            editor: GraphEditor::new(graph.clone()),
            steiner: SteinerViz::new(graph),
            hill: HillGraphViz::new(search.clone()),
            search,
        }
    }

    pub fn graph(&self) -> Rc<RefCell<Graph>> {
        self.editor.graph()
    }

    pub fn search_graph(&self) -> Rc<RefCell<SearchGraph>> {
        self.search.clone()
    }
}

impl Default for Inputs {
    fn default() -> Self {
        Inputs::new()
    }
}

/// Split a typed cost matrix into rows of raw cells. Cells are separated by
/// commas or whitespace; blank lines are ignored.
pub fn cost_rows(raw: &str) -> Vec<Vec<String>> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| {
            l.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect()
        })
        .collect()
}

fn problem_type(raw: &str) -> ProblemType {
    if raw.trim().eq_ignore_ascii_case("max") {
        ProblemType::Max
    } else {
        ProblemType::Min
    }
}

enum Run {
    Remote(Option<Value>),
    Local(String),
}

fn json(req: impl Serialize) -> VizResult<Run> {
    Ok(Run::Remote(Some(serde_json::to_value(req)?)))
}

/// Validate the page input and build what the run button sends.
fn prepare(st: &State) -> VizResult<Run> {
    let value = |id: &str| input_value(&st.document, id);
    match st.kind {
        VisualizerKind::Knapsack => {
            let req = st.inputs.items.request(&value(CAPACITY_ID))?;
            if st.offline {
                Ok(Run::Local(reference::body(reference::knapsack(&req))))
            } else {
                json(req)
            }
        }
        VisualizerKind::Lcs => {
            let req = validate::lcs(&value(TEXT1_ID), &value(TEXT2_ID))?;
            if st.offline {
                Ok(Run::Local(reference::body(reference::lcs(&req))))
            } else {
                json(req)
            }
        }
        VisualizerKind::Lps => json(validate::lps(&value(LPS_TEXT_ID))?),
        VisualizerKind::Med => json(validate::med(&value(MED_S1_ID), &value(MED_S2_ID))?),
        VisualizerKind::MatrixChain => json(st.inputs.matrices.request()?),
        VisualizerKind::RodCutting => json(st.inputs.prices.request(&value(ROD_LENGTH_ID))?),
        VisualizerKind::Hungarian => json(validate::hungarian(
            &cost_rows(&value(COST_MATRIX_ID)),
            problem_type(&value(PROBLEM_TYPE_ID)),
        )?),
        VisualizerKind::Obst => json(st.inputs.keys.request(&value(Q0_ID))?),
        VisualizerKind::Steiner => json(st.inputs.editor.request()?),
        VisualizerKind::PrintingNeatly => json(validate::printing_neatly(&value(NEAT_TEXT_ID), &value(NEAT_WIDTH_ID))?),
        VisualizerKind::HillClimbing => json(validate::search_graph(&st.inputs.search.borrow())?),
        VisualizerKind::HillClimbingPuzzle => json(validate::puzzle(
            &board_cells(&st.document, START_GRID_ID),
            &board_cells(&st.document, GOAL_GRID_ID),
        )?),
        VisualizerKind::DagLongestPath
        | VisualizerKind::Viterbi
        | VisualizerKind::LisProof
        | VisualizerKind::MaxOverlap
        | VisualizerKind::CurrencyExchange
        | VisualizerKind::BitonicTsp
        | VisualizerKind::BitReversedCounter
        | VisualizerKind::InventoryPlanning
        | VisualizerKind::MinWeightSubset
        | VisualizerKind::MstReduceWeight
        | VisualizerKind::SeamCarving
        | VisualizerKind::SpanningTreeProof
        | VisualizerKind::UniqueMst => Ok(Run::Remote(None)),
        VisualizerKind::RbTree | VisualizerKind::Patricia => {
            Err(VizError::Config("tree pages run through insert and delete".into()))
        }
    }
}

fn start_run(st: &mut State) {
    match prepare(st) {
        Ok(Run::Local(text)) => {
            let autoplay = st.config.autoplay;
            deliver(st, Ok(text), autoplay);
        }
        Ok(Run::Remote(body)) => spawn_run(
            st.window.clone(),
            asset_url(&st.config.endpoint),
            st.config.method,
            body,
            st.config.autoplay,
        ),
        Err(e) => st.player.fail(&e),
    }
}

/// Send a tree operation; its delta plays as soon as it arrives.
pub fn send_tree_op(st: &State, op: TreeOp) {
    log::info!("tree {}", op.route());
    spawn_run(
        st.window.clone(),
        asset_url(&op.endpoint(&st.config.endpoint)),
        st.config.method,
        op.body(),
        op.autoplay(),
    );
}

fn tree_edit(st: &mut State, insert: bool) {
    let raw = input_value(&st.document, TREE_KEY_ID);
    let key = match st.kind {
        VisualizerKind::Patricia => validate::binary_key(&raw),
        _ => validate::tree_key(&raw),
    };
    match key {
        Ok(key) => {
            let op = if insert { TreeOp::Insert(key) } else { TreeOp::Delete(key) };
            send_tree_op(st, op);
            set_input_value(&st.document, TREE_KEY_ID, "");
        }
        Err(e) => st.player.fail(&e.into()),
    }
}

fn preview_scene(st: &State, msg: &str) -> Option<Scene> {
    let value = |id: &str| input_value(&st.document, id);
    let scene = match st.kind {
        VisualizerKind::Knapsack => KnapsackViz.render(&st.inputs.items.preview(&value(CAPACITY_ID), msg), &()),
        VisualizerKind::Lcs => LcsViz.render(&LcsStep::preview(&value(TEXT1_ID), &value(TEXT2_ID), msg), &()),
        VisualizerKind::MatrixChain => MatrixChainViz.render(&st.inputs.matrices.preview(msg), &()),
        VisualizerKind::RodCutting => RodCuttingViz.render(&st.inputs.prices.preview(&value(ROD_LENGTH_ID), msg), &()),
        VisualizerKind::Obst => ObstViz.render(&st.inputs.keys.preview(msg), &()),
        VisualizerKind::Steiner => st.inputs.steiner.preview(&st.inputs.editor),
        VisualizerKind::HillClimbing => st.inputs.hill.preview(),
        _ => return None,
    };
    Some(scene)
}

fn show_preview(st: &mut State, msg: &str) {
    if let Some(scene) = preview_scene(st, msg) {
        st.player.preview(scene, msg);
    }
}

/// Redraw the input preview. Anything already loaded is now stale.
pub fn refresh_preview(st: &mut State) {
    let msg = if st.player.is_empty() {
        st.lang.preview_message()
    } else {
        st.lang.stale_message()
    };
    show_preview(st, msg);
}

fn list_row(document: &Document, index: usize, text: &str) -> Result<Element, JsValue> {
    let row = document.create_element("div")?;
    let label = document.create_element("span")?;
    label.set_text_content(Some(text));
    row.append_child(&label)?;
    let remove = document.create_element("button")?;
    remove.set_text_content(Some("×"));
    remove.set_attribute(INDEX_ATTR, &index.to_string())?;
    row.append_child(&remove)?;
    Ok(row)
}

/// Rewrite the entry list of the current page.
pub fn render_list(st: &State) -> Result<(), JsValue> {
    let (id, rows): (&str, Vec<String>) = match st.kind {
        VisualizerKind::Knapsack => (
            ITEM_LIST_ID,
            st.inputs
                .items
                .items()
                .iter()
                .enumerate()
                .map(|(i, it)| format!("#{}  w = {}, v = {}", i + 1, it.w, it.v))
                .collect(),
        ),
        VisualizerKind::Obst => (
            KEY_LIST_ID,
            st.inputs
                .keys
                .keys()
                .iter()
                .enumerate()
                .map(|(i, k)| match st.inputs.keys.mode() {
                    QMode::WithQ => format!("k{}  p = {}, q = {}", i + 1, k.p, k.q),
                    QMode::WithoutQ => format!("k{}  p = {}", i + 1, k.p),
                })
                .collect(),
        ),
        VisualizerKind::MatrixChain => (
            MATRIX_LIST_ID,
            st.inputs
                .matrices
                .rows()
                .map(|(name, r, c)| format!("{name}: {r} × {c}"))
                .collect(),
        ),
        VisualizerKind::RodCutting => (
            PRICE_LIST_ID,
            st.inputs
                .prices
                .entries()
                .iter()
                .map(|(len, price)| format!("{len} → {price}"))
                .collect(),
        ),
        _ => return Ok(()),
    };
    let Some(list) = st.document.get_element_by_id(id) else {
        return Ok(());
    };
    list.set_inner_html("");
    for (i, text) in rows.iter().enumerate() {
        let row = list_row(&st.document, i, text)?;
        list.append_child(&row)?;
    }
    Ok(())
}

fn list_changed(st: &mut State) {
    if let Err(e) = render_list(st) {
        log::error!("failed to render input list: {e:?}");
    }
    refresh_preview(st);
}

fn add_entry(st: &mut State) {
    let value = |id: &str| input_value(&st.document, id);
    let added = match st.kind {
        VisualizerKind::Knapsack => {
            let (w, v) = (value(ITEM_WEIGHT_ID), value(ITEM_VALUE_ID));
            st.inputs.items.add(&w, &v).map(|_| ())
        }
        VisualizerKind::Obst => {
            let (p, q) = (value(KEY_P_ID), value(KEY_Q_ID));
            st.inputs.keys.add(&p, &q).map(|_| ())
        }
        VisualizerKind::MatrixChain => {
            let (r, c) = (value(MAT_ROWS_ID), value(MAT_COLS_ID));
            st.inputs.matrices.add(&r, &c)
        }
        VisualizerKind::RodCutting => {
            let (len, price) = (value(PIECE_LENGTH_ID), value(PIECE_PRICE_ID));
            st.inputs.prices.add(&len, &price)
        }
        _ => return,
    };
    match added {
        Ok(()) => {
            // The next matrix has to start where the last one ended.
            if st.kind == VisualizerKind::MatrixChain
                && let Some(rows) = st.inputs.matrices.expected_rows()
            {
                set_input_value(&st.document, MAT_ROWS_ID, &rows.to_string());
                set_input_value(&st.document, MAT_COLS_ID, "");
            }
            list_changed(st);
        }
        Err(e) => st.player.fail(&e.into()),
    }
}

fn remove_entry(st: &mut State, index: usize) {
    let removed = match st.kind {
        VisualizerKind::Knapsack => Ok(st.inputs.items.remove(index).is_some()),
        VisualizerKind::Obst => Ok(st.inputs.keys.remove(index).is_some()),
        VisualizerKind::MatrixChain => st.inputs.matrices.remove(index).map(|()| true),
        VisualizerKind::RodCutting => Ok(st.inputs.prices.remove(index).is_some()),
        _ => Ok(false),
    };
    match removed {
        Ok(true) => list_changed(st),
        Ok(false) => {}
        Err(e) => st.player.fail(&e.into()),
    }
}

fn clear_entries(st: &mut State) {
    match st.kind {
        VisualizerKind::Knapsack => st.inputs.items.clear(),
        VisualizerKind::Obst => st.inputs.keys.clear(),
        VisualizerKind::MatrixChain => st.inputs.matrices.clear(),
        VisualizerKind::RodCutting => st.inputs.prices.clear(),
        _ => return,
    }
    if let Err(e) = render_list(st) {
        log::error!("failed to render input list: {e:?}");
    }
    let msg = st.lang.cleared_message();
    show_preview(st, msg);
}

fn attach_list(document: &Document, list_id: &str, add_id: &str, clear_id: &str) -> Result<(), JsValue> {
    on_click(document, add_id, || {
        with_state(add_entry);
    })?;
    on_click(document, clear_id, || {
        with_state(clear_entries);
    })?;
    if let Some(list) = document.get_element_by_id(list_id) {
        let onclick = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |e: Event| {
            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<Element>()
                && let Some(index) = el.get_attribute(INDEX_ATTR)
                && let Ok(index) = index.parse::<usize>()
            {
                with_state(|st| remove_entry(st, index));
            }
        }));
        list.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }
    Ok(())
}

/// Redraw the preview whenever one of the fields changes.
fn preview_on_input(document: &Document, ids: &[&str]) -> Result<(), JsValue> {
    for id in ids {
        let Some(el) = document.get_element_by_id(id) else {
            continue;
        };
        let oninput = Closure::<dyn FnMut()>::wrap(Box::new(|| {
            with_state(refresh_preview);
        }));
        el.add_event_listener_with_callback("input", oninput.as_ref().unchecked_ref())?;
        oninput.forget();
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum Pointer {
    Down,
    Move,
    Up,
}

fn ask_weight(st: &mut State) {
    while st.inputs.editor.pending().is_some() {
        match st.window.prompt_with_message_and_default(st.lang.weight_prompt(), "1") {
            Ok(Some(raw)) => {
                if let Err(e) = st.inputs.editor.confirm_weight(&raw) {
                    st.player.fail(&e.into());
                }
            }
            _ => st.inputs.editor.cancel_pending(),
        }
    }
}

fn pointer(st: &mut State, phase: Pointer, at: Point) {
    let editor = &mut st.inputs.editor;
    let changed = match phase {
        Pointer::Down => editor.pointer_down(at),
        Pointer::Move => editor.pointer_move(at),
        Pointer::Up => editor.pointer_up(at) | editor.pending().is_some(),
    };
    if matches!(phase, Pointer::Up) {
        ask_weight(st);
    }
    if changed {
        refresh_preview(st);
    }
}

fn attach_editor(document: &Document, canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
    for (event, phase) in [("mousedown", Pointer::Down), ("mousemove", Pointer::Move), ("mouseup", Pointer::Up)] {
        let cv = canvas.clone();
        let cb = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            let at = event_canvas_coords(&e, &cv);
            with_state(|st| pointer(st, phase, at));
        }));
        canvas.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    let radios = document.query_selector_all(MODE_RADIO_SELECTOR)?;
    for i in 0..radios.length() {
        let Some(radio) = radios.item(i).and_then(|n| n.dyn_into::<HtmlInputElement>().ok()) else {
            continue;
        };
        let input = radio.clone();
        let onchange = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            match EditMode::from_str(&input.value()) {
                Ok(mode) => {
                    with_state(|st| st.inputs.editor.set_mode(mode));
                }
                Err(e) => log::warn!("{e}"),
            }
        }));
        radio.add_event_listener_with_callback("change", onchange.as_ref().unchecked_ref())?;
        onchange.forget();
    }

    on_click(document, EXAMPLE_GRAPH_ID, || {
        with_state(|st| {
            st.inputs.editor.load_example();
            refresh_preview(st);
        });
    })?;
    on_click(document, CLEAR_GRAPH_ID, || {
        with_state(|st| {
            st.inputs.editor.clear();
            let msg = st.lang.cleared_message();
            show_preview(st, msg);
        });
    })?;
    Ok(())
}

fn random_seed() -> u64 {
    search::seed_from_unit(js_sys::Math::random())
}

fn generate_graph(st: &mut State) {
    let graph = SearchGraph::seeded(random_seed(), st.config.min_width, st.config.min_height);
    *st.inputs.search.borrow_mut() = graph;
    refresh_preview(st);
}

fn grid_inputs(document: &Document, grid_id: &str) -> Vec<HtmlInputElement> {
    let Ok(list) = document.query_selector_all(&format!("#{grid_id} input")) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i).and_then(|n| n.dyn_into::<HtmlInputElement>().ok()))
        .collect()
}

/// The nine cells of a board grid, row by row.
fn board_cells(document: &Document, grid_id: &str) -> Vec<String> {
    grid_inputs(document, grid_id).iter().map(HtmlInputElement::value).collect()
}

fn write_board(document: &Document, grid_id: &str, board: &Board) {
    for (input, v) in grid_inputs(document, grid_id).iter().zip(board.iter().flatten()) {
        input.set_value(&v.to_string());
    }
}

/// Fill an empty grid container with nine number fields holding `board`.
fn build_board(document: &Document, grid_id: &str, board: &Board) -> Result<(), JsValue> {
    let Some(grid) = document.get_element_by_id(grid_id) else {
        return Ok(());
    };
    if grid_inputs(document, grid_id).is_empty() {
        for _ in 0..9 {
            let input = document.create_element("input")?.dyn_into::<HtmlInputElement>()?;
            input.set_type("number");
            input.set_min("0");
            input.set_max("8");
            grid.append_child(&input)?;
        }
    }
    write_board(document, grid_id, board);
    Ok(())
}

/// Scramble the start board from the goal currently typed in.
fn randomize_puzzle(st: &mut State) {
    match validate::puzzle_board("goal board", &board_cells(&st.document, GOAL_GRID_ID)) {
        Ok(goal) => {
            let start = search::scramble_seeded(random_seed(), &goal);
            write_board(&st.document, START_GRID_ID, &start);
        }
        Err(e) => st.player.fail(&e.into()),
    }
}

/// Wire the input panel of `kind`.
pub fn attach(document: &Document, canvas: &HtmlCanvasElement, kind: VisualizerKind) -> Result<(), JsValue> {
    if kind.is_stateful() {
        on_click(document, INSERT_ID, || {
            with_state(|st| tree_edit(st, true));
        })?;
        on_click(document, DELETE_ID, || {
            with_state(|st| tree_edit(st, false));
        })?;
        return Ok(());
    }

    on_click(document, START_ID, || {
        with_state(start_run);
    })?;
    match kind {
        VisualizerKind::Knapsack => {
            attach_list(document, ITEM_LIST_ID, ADD_ITEM_ID, CLEAR_ITEMS_ID)?;
            preview_on_input(document, &[CAPACITY_ID])?;
        }
        VisualizerKind::Lcs => preview_on_input(document, &[TEXT1_ID, TEXT2_ID])?,
        VisualizerKind::MatrixChain => attach_list(document, MATRIX_LIST_ID, ADD_MATRIX_ID, CLEAR_MATRICES_ID)?,
        VisualizerKind::RodCutting => {
            attach_list(document, PRICE_LIST_ID, ADD_PRICE_ID, CLEAR_PRICES_ID)?;
            preview_on_input(document, &[ROD_LENGTH_ID])?;
        }
        VisualizerKind::Obst => {
            attach_list(document, KEY_LIST_ID, ADD_KEY_ID, CLEAR_KEYS_ID)?;
            if let Some(el) = document.get_element_by_id(Q_MODE_ID) {
                let onchange = Closure::<dyn FnMut()>::wrap(Box::new(|| {
                    with_state(|st| {
                        let mode = if is_checked(&st.document, Q_MODE_ID) {
                            QMode::WithQ
                        } else {
                            QMode::WithoutQ
                        };
                        st.inputs.keys.set_mode(mode);
                        list_changed(st);
                    });
                }));
                el.add_event_listener_with_callback("change", onchange.as_ref().unchecked_ref())?;
                onchange.forget();
            }
        }
        VisualizerKind::Steiner => attach_editor(document, canvas)?,
        VisualizerKind::HillClimbing => on_click(document, GEN_GRAPH_ID, || {
            with_state(generate_graph);
        })?,
        VisualizerKind::HillClimbingPuzzle => {
            build_board(document, START_GRID_ID, &DEFAULT_START)?;
            build_board(document, GOAL_GRID_ID, &DEFAULT_GOAL)?;
            on_click(document, RANDOM_PUZZLE_ID, || {
                with_state(randomize_puzzle);
            })?;
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_rows_accept_commas_and_spaces() {
        let rows = cost_rows("4, 1 3\n\n 2 0,5 \n3 2 2");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["4", "1", "3"]);
        assert_eq!(rows[1], vec!["2", "0", "5"]);
    }

    #[test]
    fn typed_matrix_goes_through_validation() {
        let rows = cost_rows("1 2\n3");
        let err = validate::hungarian(&rows, problem_type("min")).unwrap_err();
        assert!(matches!(err, stepviz_core::InputError::NotSquare { row: 1, .. }));
    }

    #[test]
    fn problem_type_defaults_to_min() {
        assert_eq!(problem_type("MAX"), ProblemType::Max);
        assert_eq!(problem_type(""), ProblemType::Min);
    }
}
