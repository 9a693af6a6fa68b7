use std::cell::RefCell;
use std::rc::Rc;

use web_sys::{Document, Window};

use stepviz_core::{Lang, Player, VisualizerConfig, VisualizerKind};

use crate::inputs::Inputs;

/// Page state shared by every callback.
pub struct State {
    pub window: Window,
    pub document: Document,
    pub kind: VisualizerKind,
    pub config: VisualizerConfig,
    pub lang: Lang,
    /// Generate knapsack and LCS runs locally instead of calling the API.
    pub offline: bool,
    pub player: Box<dyn Player>,
    pub inputs: Inputs,
}

/// Thread local storage for the single runtime state instance.
thread_local! {
    pub static STATE: RefCell<Option<Rc<RefCell<State>>>> = const { RefCell::new(None) };
}

/// Run `f` against the page state. Returns `None` before start-up or when
/// the state is already borrowed further up the stack.
pub fn with_state<R>(f: impl FnOnce(&mut State) -> R) -> Option<R> {
    let rc = STATE.with(|s| s.borrow().clone())?;
    let Ok(mut st) = rc.try_borrow_mut() else {
        log::warn!("page state busy, dropping callback");
        return None;
    };
    Some(f(&mut st))
}
