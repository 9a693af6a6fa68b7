//! Browser front-end: replays `stepviz-core` scenes onto the page canvas and
//! wires the page controls to a [`Player`].

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlCanvasElement};

use stepviz_core::editor::Graph;
use stepviz_core::search::SearchGraph;
use stepviz_core::viz::bit_reversed::BitReversedViz;
use stepviz_core::viz::bitonic_tsp::BitonicTspViz;
use stepviz_core::viz::currency_exchange::CurrencyExchangeViz;
use stepviz_core::viz::dag::DagViz;
use stepviz_core::viz::hill_climbing::{HillGraphViz, HillPuzzleViz};
use stepviz_core::viz::hungarian::HungarianViz;
use stepviz_core::viz::inventory::InventoryViz;
use stepviz_core::viz::knapsack::KnapsackViz;
use stepviz_core::viz::lcs::LcsViz;
use stepviz_core::viz::lis::LisViz;
use stepviz_core::viz::lps::LpsViz;
use stepviz_core::viz::matrix_chain::MatrixChainViz;
use stepviz_core::viz::max_overlap::MaxOverlapViz;
use stepviz_core::viz::med::MedViz;
use stepviz_core::viz::obst::ObstViz;
use stepviz_core::viz::patricia::PatriciaViz;
use stepviz_core::viz::printing_neatly::PrintingNeatlyViz;
use stepviz_core::viz::proof_graph::{ProofGraphViz, ProofStyle};
use stepviz_core::viz::rbtree::RbTreeViz;
use stepviz_core::viz::rod_cutting::RodCuttingViz;
use stepviz_core::viz::seam_carving::SeamCarvingViz;
use stepviz_core::viz::spanning_tree::SpanningTreeViz;
use stepviz_core::viz::steiner::SteinerViz;
use stepviz_core::viz::viterbi::ViterbiViz;
use stepviz_core::{Controller, Lang, Player, TreeOp, Visualizer, VisualizerConfig, VisualizerKind};

mod canvas;
mod constants;
mod controls;
mod dom;
mod fetch;
mod inputs;
mod logger;
mod state;
mod timer;
mod utils;

use dom::DomPresenter;
use inputs::Inputs;
use state::{STATE, State, with_state};
use timer::WebScheduler;
use utils::{get_query_param, js_err};

/// Everything a controller needs besides its visualizer.
struct Parts {
    scheduler: WebScheduler,
    presenter: DomPresenter,
    config: VisualizerConfig,
    lang: Lang,
}

impl Parts {
    fn boxed<V: Visualizer + 'static>(self, viz: V) -> Box<dyn Player> {
        Box::new(Controller::new(viz, self.scheduler, self.presenter, &self.config, self.lang))
    }
}

fn make_player(
    kind: VisualizerKind,
    graph: Rc<RefCell<Graph>>,
    search: Rc<RefCell<SearchGraph>>,
    parts: Parts,
) -> Box<dyn Player> {
    match kind {
        VisualizerKind::Knapsack => parts.boxed(KnapsackViz),
        VisualizerKind::Lcs => parts.boxed(LcsViz),
        VisualizerKind::Lps => parts.boxed(LpsViz),
        VisualizerKind::Med => parts.boxed(MedViz),
        VisualizerKind::MatrixChain => parts.boxed(MatrixChainViz),
        VisualizerKind::RodCutting => parts.boxed(RodCuttingViz),
        VisualizerKind::Hungarian => parts.boxed(HungarianViz),
        VisualizerKind::Obst => parts.boxed(ObstViz),
        VisualizerKind::RbTree => parts.boxed(RbTreeViz),
        VisualizerKind::Patricia => parts.boxed(PatriciaViz),
        VisualizerKind::Steiner => parts.boxed(SteinerViz::new(graph)),
        VisualizerKind::DagLongestPath => parts.boxed(DagViz),
        VisualizerKind::Viterbi => parts.boxed(ViterbiViz),
        VisualizerKind::LisProof => parts.boxed(LisViz),
        VisualizerKind::MaxOverlap => parts.boxed(MaxOverlapViz),
        VisualizerKind::CurrencyExchange => parts.boxed(CurrencyExchangeViz),
        VisualizerKind::BitonicTsp => parts.boxed(BitonicTspViz),
        VisualizerKind::PrintingNeatly => parts.boxed(PrintingNeatlyViz),
        VisualizerKind::BitReversedCounter => parts.boxed(BitReversedViz),
        VisualizerKind::InventoryPlanning => parts.boxed(InventoryViz),
        VisualizerKind::MinWeightSubset => parts.boxed(ProofGraphViz::new(ProofStyle::MinWeightSubset)),
        VisualizerKind::MstReduceWeight => parts.boxed(ProofGraphViz::new(ProofStyle::MstReduceWeight)),
        VisualizerKind::SeamCarving => parts.boxed(SeamCarvingViz),
        VisualizerKind::SpanningTreeProof => parts.boxed(SpanningTreeViz),
        VisualizerKind::UniqueMst => parts.boxed(ProofGraphViz::new(ProofStyle::UniqueMst)),
        VisualizerKind::HillClimbing => parts.boxed(HillGraphViz::new(search)),
        VisualizerKind::HillClimbingPuzzle => parts.boxed(HillPuzzleViz),
    }
}

/// `?v=` wins over the canvas `data-visualizer` attribute.
fn resolve_kind(search: &str, canvas: &HtmlCanvasElement) -> Result<VisualizerKind, JsValue> {
    let id = get_query_param(search, "v")
        .or_else(|| canvas.get_attribute("data-visualizer"))
        .ok_or_else(|| JsValue::from_str("no visualizer selected"))?;
    id.parse::<VisualizerKind>().map_err(js_err)
}

fn resolve_lang(search: &str, document: &Document) -> Lang {
    get_query_param(search, "lang")
        .or_else(|| document.document_element().and_then(|el| el.get_attribute("lang")))
        .map(|l| Lang::parse(&l))
        .unwrap_or_default()
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let search = window.location().search().unwrap_or_default();
    logger::init(get_query_param(&search, "log").as_deref());

    let (canvas, ctx) = canvas::init_canvas(&document)?;
    let kind = resolve_kind(&search, &canvas)?;
    let lang = resolve_lang(&search, &document);
    let mut config = kind.default_config();
    if let Some(raw) = canvas.get_attribute("data-config") {
        config = config.merged(&raw).map_err(js_err)?;
    }
    let offline = canvas.get_attribute("data-source").as_deref() == Some("offline");

    let inputs = Inputs::new();
    let parts = Parts {
        scheduler: WebScheduler::new(window.clone()),
        presenter: DomPresenter::new(window.clone(), document.clone(), canvas.clone(), ctx, &config, lang),
        config: config.clone(),
        lang,
    };
    let player = make_player(kind, inputs.graph(), inputs.search_graph(), parts);

    let state = Rc::new(RefCell::new(State {
        window,
        document: document.clone(),
        kind,
        config: config.clone(),
        lang,
        offline,
        player,
        inputs,
    }));
    STATE.with(|s| *s.borrow_mut() = Some(state));

    controls::attach(&document, &config)?;
    inputs::attach(&document, &canvas, kind)?;

    with_state(|st| {
        st.player.reset();
        inputs::refresh_preview(st);
        if kind.is_stateful() {
            inputs::send_tree_op(st, TreeOp::Init);
        }
    });
    log::info!("{kind} visualizer ready (lang {lang:?}, offline {offline})");
    Ok(())
}
