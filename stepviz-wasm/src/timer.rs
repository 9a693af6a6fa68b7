use std::collections::HashMap;

use wasm_bindgen::prelude::*;
use web_sys::Window;

use stepviz_core::{Scheduler, TimerId};

use crate::state::with_state;

type TickClosure = Closure<dyn FnMut()>;

/// `setInterval` backed scheduler. Each interval forwards its id to the
/// page's player, which drops ticks from timers it no longer owns.
pub struct WebScheduler {
    window: Window,
    next_id: u64,
    live: HashMap<TimerId, (i32, TickClosure)>,
    /// Closures of cleared intervals. A timer is usually disarmed from inside
    /// its own callback, so the closure is only dropped on the next arm.
    retired: Vec<TickClosure>,
}

impl WebScheduler {
    pub fn new(window: Window) -> Self {
        WebScheduler {
            window,
            next_id: 0,
            live: HashMap::new(),
            retired: Vec::new(),
        }
    }
}

impl Scheduler for WebScheduler {
    fn arm(&mut self, interval_ms: u32) -> TimerId {
        self.retired.clear();
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let cb = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            with_state(|st| st.player.tick(id));
        }));
        let timeout = i32::try_from(interval_ms).unwrap_or(i32::MAX);
        match self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), timeout)
        {
            Ok(handle) => {
                self.live.insert(id, (handle, cb));
            }
            Err(e) => log::error!("setInterval failed: {e:?}"),
        }
        id
    }

    fn disarm(&mut self, id: TimerId) {
        if let Some((handle, cb)) = self.live.remove(&id) {
            self.window.clear_interval_with_handle(handle);
            self.retired.push(cb);
        }
    }
}
