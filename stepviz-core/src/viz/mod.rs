//! The visualizer catalog.
//!
//! Each visualizer pairs a step schema with a pure renderer. Session state
//! that only the first step carries (input strings, a graph) is captured once
//! per load and handed back with every step.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;

use crate::config::{Method, VisualizerConfig};
use crate::error::VizError;
use crate::scene::Scene;
use crate::speed::SpeedMapping;
use crate::step::Step;

pub mod bit_reversed;
pub mod bitonic_tsp;
pub mod currency_exchange;
pub mod dag;
pub mod hill_climbing;
pub mod hungarian;
pub mod inventory;
pub mod knapsack;
pub mod lcs;
pub mod lis;
pub mod lps;
pub mod matrix_chain;
pub mod max_overlap;
pub mod med;
pub mod obst;
pub mod patricia;
pub mod printing_neatly;
pub mod proof_graph;
pub mod rbtree;
pub mod rod_cutting;
pub mod seam_carving;
pub mod spanning_tree;
pub mod steiner;
pub mod table;
pub mod viterbi;

pub trait Visualizer {
    type Step: DeserializeOwned + Step;
    type Context: Default + Clone;

    /// Extract cross-step state from a freshly loaded sequence.
    fn capture(&self, steps: &[Self::Step]) -> Self::Context;

    fn render(&self, step: &Self::Step, ctx: &Self::Context) -> Scene;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VisualizerKind {
    Knapsack,
    Lcs,
    Lps,
    Med,
    MatrixChain,
    RodCutting,
    Hungarian,
    Obst,
    RbTree,
    Patricia,
    Steiner,
    DagLongestPath,
    Viterbi,
    LisProof,
    MaxOverlap,
    CurrencyExchange,
    BitonicTsp,
    PrintingNeatly,
    BitReversedCounter,
    InventoryPlanning,
    MinWeightSubset,
    MstReduceWeight,
    SeamCarving,
    SpanningTreeProof,
    UniqueMst,
    HillClimbing,
    HillClimbingPuzzle,
}

impl VisualizerKind {
    pub const ALL: [VisualizerKind; 27] = [
        VisualizerKind::Knapsack,
        VisualizerKind::Lcs,
        VisualizerKind::Lps,
        VisualizerKind::Med,
        VisualizerKind::MatrixChain,
        VisualizerKind::RodCutting,
        VisualizerKind::Hungarian,
        VisualizerKind::Obst,
        VisualizerKind::RbTree,
        VisualizerKind::Patricia,
        VisualizerKind::Steiner,
        VisualizerKind::DagLongestPath,
        VisualizerKind::Viterbi,
        VisualizerKind::LisProof,
        VisualizerKind::MaxOverlap,
        VisualizerKind::CurrencyExchange,
        VisualizerKind::BitonicTsp,
        VisualizerKind::PrintingNeatly,
        VisualizerKind::BitReversedCounter,
        VisualizerKind::InventoryPlanning,
        VisualizerKind::MinWeightSubset,
        VisualizerKind::MstReduceWeight,
        VisualizerKind::SeamCarving,
        VisualizerKind::SpanningTreeProof,
        VisualizerKind::UniqueMst,
        VisualizerKind::HillClimbing,
        VisualizerKind::HillClimbingPuzzle,
    ];

    pub fn id(self) -> &'static str {
        match self {
            VisualizerKind::Knapsack => "knapsack",
            VisualizerKind::Lcs => "lcs",
            VisualizerKind::Lps => "lps",
            VisualizerKind::Med => "med",
            VisualizerKind::MatrixChain => "matrix_chain",
            VisualizerKind::RodCutting => "rod_cutting",
            VisualizerKind::Hungarian => "hungarian",
            VisualizerKind::Obst => "obst",
            VisualizerKind::RbTree => "rbtree",
            VisualizerKind::Patricia => "patricia",
            VisualizerKind::Steiner => "steiner",
            VisualizerKind::DagLongestPath => "dag_longest_path",
            VisualizerKind::Viterbi => "viterbi",
            VisualizerKind::LisProof => "lis_proof",
            VisualizerKind::MaxOverlap => "max_overlap",
            VisualizerKind::CurrencyExchange => "currency_exchange",
            VisualizerKind::BitonicTsp => "bitonic_tsp",
            VisualizerKind::PrintingNeatly => "printing_neatly",
            VisualizerKind::BitReversedCounter => "bit_reversed_counter",
            VisualizerKind::InventoryPlanning => "inventory_planning",
            VisualizerKind::MinWeightSubset => "min_weight_subset",
            VisualizerKind::MstReduceWeight => "mst_reduce_weight",
            VisualizerKind::SeamCarving => "seam_carving",
            VisualizerKind::SpanningTreeProof => "spanning_tree_proof",
            VisualizerKind::UniqueMst => "unique_mst",
            VisualizerKind::HillClimbing => "hill_climbing",
            VisualizerKind::HillClimbingPuzzle => "hill_climbing_puzzle",
        }
    }

    /// Tree pages keep their structure on the server between requests.
    pub fn is_stateful(self) -> bool {
        matches!(self, VisualizerKind::RbTree | VisualizerKind::Patricia)
    }

    /// Pages that draw an empty grid from the inputs before any run.
    pub fn has_preview(self) -> bool {
        matches!(
            self,
            VisualizerKind::Knapsack
                | VisualizerKind::Lcs
                | VisualizerKind::MatrixChain
                | VisualizerKind::RodCutting
                | VisualizerKind::Steiner
                | VisualizerKind::HillClimbing
        )
    }


    pub fn default_config(self) -> VisualizerConfig {
        let linear = SpeedMapping::default();
        let ratio = SpeedMapping::RatioInverse { base_ms: 3000.0 };
        let fixed = SpeedMapping::Fixed { ms: 1000 };
        let stepped = SpeedMapping::LinearInverse { max_ms: 2180.0, k: 180.0 };
        let (endpoint, method, speed, initial_speed, autoplay, min_width, min_height) = match self {
            VisualizerKind::Knapsack => ("api/knapsack/run", Method::Post, linear, 4500.0, true, 600.0, 300.0),
            VisualizerKind::Lcs => ("api/lcs/run", Method::Post, linear, 4500.0, true, 500.0, 400.0),
            VisualizerKind::Lps => ("api/lps", Method::Post, SpeedMapping::Direct, 500.0, false, 400.0, 400.0),
            VisualizerKind::Med => ("api/med", Method::Post, SpeedMapping::Fixed { ms: 500 }, 500.0, false, 400.0, 300.0),
            VisualizerKind::MatrixChain => {
                ("api/matrix_chain/run", Method::Post, SpeedMapping::Direct, 1000.0, false, 600.0, 300.0)
            }
            VisualizerKind::RodCutting => {
                ("api/rod_cutting/run", Method::Post, SpeedMapping::Direct, 1000.0, false, 600.0, 400.0)
            }
            VisualizerKind::Hungarian => ("api/hungarian", Method::Post, linear, 4100.0, false, 300.0, 300.0),
            VisualizerKind::Obst => ("api/obst", Method::Post, SpeedMapping::Direct, 500.0, false, 800.0, 400.0),
            VisualizerKind::RbTree => ("api/rbtree", Method::Post, linear, 4500.0, true, 2000.0, 1500.0),
            VisualizerKind::Patricia => ("api/patricia", Method::Post, linear, 4500.0, true, 2000.0, 1500.0),
            VisualizerKind::Steiner => ("api/steiner/run", Method::Post, linear, 4500.0, true, 600.0, 500.0),
            VisualizerKind::DagLongestPath => {
                ("api/dag_longest_path", Method::Get, SpeedMapping::Direct, 1000.0, false, 700.0, 400.0)
            }
            VisualizerKind::Viterbi => ("api/viterbi", Method::Post, SpeedMapping::Fixed { ms: 1500 }, 1500.0, false, 500.0, 380.0),
            VisualizerKind::LisProof => ("api/lis_proof", Method::Get, ratio, 1.0, false, 600.0, 350.0),
            VisualizerKind::MaxOverlap => ("api/max_overlap", Method::Get, ratio, 1.0, false, 800.0, 450.0),
            VisualizerKind::CurrencyExchange => ("api/currency_exchange", Method::Get, ratio, 1.0, false, 600.0, 400.0),
            VisualizerKind::BitonicTsp => {
                ("api/bitonic_tsp", Method::Get, SpeedMapping::Direct, 1000.0, false, 800.0, 500.0)
            }
            VisualizerKind::PrintingNeatly => ("printing_neatly/solve", Method::Post, fixed, 1000.0, false, 800.0, 400.0),
            VisualizerKind::BitReversedCounter => {
                ("api/bit_reversed_counter", Method::Post, stepped, 5.0, false, 700.0, 340.0)
            }
            VisualizerKind::InventoryPlanning => ("api/inventory_planning", Method::Post, fixed, 1000.0, false, 300.0, 100.0),
            VisualizerKind::MinWeightSubset => ("api/min_weight_subset", Method::Post, ratio, 1.0, false, 600.0, 400.0),
            VisualizerKind::MstReduceWeight => ("api/mst_reduce_weight", Method::Post, ratio, 1.0, false, 600.0, 400.0),
            VisualizerKind::SeamCarving => ("api/seam_carving", Method::Post, fixed, 1000.0, false, 400.0, 300.0),
            VisualizerKind::SpanningTreeProof => {
                let speed = SpeedMapping::LinearInverse { max_ms: 3250.0, k: 250.0 };
                ("api/spanning_tree_proof", Method::Post, speed, 5.0, false, 600.0, 400.0)
            }
            VisualizerKind::UniqueMst => ("api/unique_mst", Method::Post, stepped, 5.0, false, 600.0, 400.0),
            VisualizerKind::HillClimbing => ("api/hill_climbing/simple", Method::Post, linear, 4100.0, false, 600.0, 400.0),
            VisualizerKind::HillClimbingPuzzle => {
                ("api/hill_climbing/puzzle", Method::Post, linear, 4100.0, false, 800.0, 600.0)
            }
        };
        VisualizerConfig {
            endpoint: endpoint.to_string(),
            method,
            speed,
            initial_speed,
            autoplay,
            min_width,
            min_height,
        }
    }
}

impl FromStr for VisualizerKind {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().to_lowercase().replace('-', "_");
        let id = match id.as_str() {
            "dag" => "dag_longest_path",
            "red_black_tree" => "rbtree",
            "hill_climbing_simple" => "hill_climbing",
            "8_puzzle" => "hill_climbing_puzzle",
            other => other,
        }
        .to_string();
        VisualizerKind::ALL
            .into_iter()
            .find(|k| k.id() == id)
            .ok_or_else(|| VizError::UnknownVisualizer(s.to_string()))
    }
}

impl fmt::Display for VisualizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Requests understood by the stateful tree endpoints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeOp {
    Init,
    Insert(String),
    Delete(String),
}

impl TreeOp {
    pub fn route(&self) -> &'static str {
        match self {
            TreeOp::Init => "init",
            TreeOp::Insert(_) => "insert",
            TreeOp::Delete(_) => "delete",
        }
    }

    /// `None` for `init`, which is sent without a body.
    pub fn body(&self) -> Option<serde_json::Value> {
        match self {
            TreeOp::Init => None,
            TreeOp::Insert(key) | TreeOp::Delete(key) => Some(serde_json::json!({ "key": key })),
        }
    }

    pub fn endpoint(&self, base: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), self.route())
    }

    /// Init renders step 0 and waits; edits play their delta right away.
    pub fn autoplay(&self) -> bool {
        !matches!(self, TreeOp::Init)
    }
}
