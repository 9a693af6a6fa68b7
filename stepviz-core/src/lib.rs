//! Step-sequence playback engine for the algorithm visualizer pages.
//!
//! A page fetches a precomputed run of steps, hands it to a
//! [`playback::Controller`] and lets the matching [`viz::Visualizer`] turn
//! the step under the cursor into a [`scene::Scene`]. Nothing in this crate
//! touches the browser; the `stepviz-wasm` crate replays scenes onto a
//! canvas and drives the timers.

pub mod config;
pub mod editor;
pub mod error;
pub mod highlight;
pub mod i18n;
pub mod layout;
pub mod playback;
pub mod reference;
pub mod scene;
pub mod search;
pub mod speed;
pub mod step;
pub mod validate;
pub mod viz;

pub use config::{Method, VisualizerConfig};
pub use error::{InputError, VizError, VizResult};
pub use i18n::Lang;
pub use playback::{Controller, Controls, Frame, PlaybackState, Player, Presenter, Scheduler, TimerId};
pub use scene::{DrawCmd, Scene};
pub use speed::SpeedMapping;
pub use viz::{TreeOp, Visualizer, VisualizerKind};
