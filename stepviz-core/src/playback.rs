//! Cursor, state machine and auto-play timer for one page.
//!
//! The [`Controller`] owns the step sequence and is the only thing that
//! moves the cursor. Timers and output go through the [`Scheduler`] and
//! [`Presenter`] seams so the whole machine runs on the host in tests.

use serde_json::{Map, Value};

use crate::config::VisualizerConfig;
use crate::error::{VizError, VizResult};
use crate::i18n::Lang;
use crate::scene::Scene;
use crate::speed::SpeedMapping;
use crate::step::{Fetched, Step, StepSequence, decode_steps};
use crate::viz::Visualizer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Empty,
    Ready,
    Playing,
    Paused,
    Finished,
}

/// Handle of an armed repeating timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Repeating timer source. Every armed timer calls back into
/// [`Player::tick`] with its id until disarmed.
pub trait Scheduler {
    fn arm(&mut self, interval_ms: u32) -> TimerId;
    fn disarm(&mut self, id: TimerId);
}

/// One rendered step.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub index: usize,
    pub total: usize,
    pub message: String,
    pub scene: Scene,
}

/// Button and status state derived from the controller.
#[derive(Clone, Debug, PartialEq)]
pub struct Controls {
    pub state: PlaybackState,
    pub can_prev: bool,
    pub can_next: bool,
    pub can_play: bool,
    pub playing: bool,
    pub play_label: &'static str,
    pub speed_label: String,
    pub status: String,
}

/// Output side of the page.
pub trait Presenter {
    fn present(&mut self, frame: &Frame);
    fn update_controls(&mut self, controls: &Controls);
    /// Blank the output and show `notice` in the message region.
    fn clear(&mut self, notice: &str);
    fn show_error(&mut self, err: &VizError);
}

/// Object-safe view of a controller, used by the browser front-end which
/// picks the visualizer at run time.
pub trait Player {
    /// Decode and load a response body. An empty sequence leaves the
    /// current one in place and is reported as [`VizError::EmptySequence`].
    fn load_json(&mut self, text: &str, autoplay: bool) -> VizResult<()>;
    fn next(&mut self);
    fn prev(&mut self);
    fn seek(&mut self, index: i64);
    fn play(&mut self);
    fn pause(&mut self);
    fn toggle(&mut self);
    fn tick(&mut self, id: TimerId);
    fn set_speed(&mut self, value: f64);
    fn reset(&mut self);
    fn fail(&mut self, err: &VizError);
    /// Show a frame built from unsubmitted input. Loaded steps are dropped.
    fn preview(&mut self, scene: Scene, message: &str);
    fn state(&self) -> PlaybackState;
    fn cursor(&self) -> usize;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn autoplay(&self) -> bool;
    fn meta(&self) -> &Map<String, Value>;
}

pub struct Controller<V: Visualizer, S: Scheduler, P: Presenter> {
    viz: V,
    scheduler: S,
    presenter: P,
    steps: Option<StepSequence<V::Step>>,
    context: V::Context,
    meta: Map<String, Value>,
    cursor: usize,
    state: PlaybackState,
    speed: SpeedMapping,
    speed_value: f64,
    timer: Option<TimerId>,
    autoplay: bool,
    lang: Lang,
}

impl<V: Visualizer, S: Scheduler, P: Presenter> Controller<V, S, P> {
    pub fn new(viz: V, scheduler: S, presenter: P, config: &VisualizerConfig, lang: Lang) -> Self {
        Controller {
            viz,
            scheduler,
            presenter,
            steps: None,
            context: V::Context::default(),
            meta: Map::new(),
            cursor: 0,
            state: PlaybackState::Empty,
            speed: config.speed,
            speed_value: config.initial_speed,
            timer: None,
            autoplay: config.autoplay,
            lang,
        }
    }

    pub fn visualizer(&self) -> &V {
        &self.viz
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn current_step(&self) -> Option<&V::Step> {
        self.steps.as_ref().and_then(|s| s.get(self.cursor))
    }

    pub fn timer(&self) -> Option<TimerId> {
        self.timer
    }

    /// Replace the sequence with a freshly fetched one and show step 0.
    pub fn load(&mut self, fetched: Fetched<V::Step>, autoplay: bool) -> VizResult<()> {
        let seq = StepSequence::new(fetched.steps)?;
        self.stop_timer();
        self.context = self.viz.capture(seq.as_slice());
        self.meta = fetched.meta;
        self.steps = Some(seq);
        self.cursor = 0;
        self.state = PlaybackState::Ready;
        log::info!("loaded {} steps", self.len_inner());
        self.render();
        if autoplay {
            self.play_inner();
        } else {
            self.sync_controls();
        }
        Ok(())
    }

    fn len_inner(&self) -> usize {
        self.steps.as_ref().map_or(0, StepSequence::len)
    }

    fn last_index(&self) -> usize {
        self.len_inner().saturating_sub(1)
    }

    fn stop_timer(&mut self) {
        if let Some(id) = self.timer.take() {
            self.scheduler.disarm(id);
        }
    }

    fn arm_timer(&mut self) {
        self.stop_timer();
        let delay = self.speed.delay_ms(self.speed_value);
        log::debug!("arming auto-play timer at {delay} ms");
        self.timer = Some(self.scheduler.arm(delay));
    }

    fn render(&mut self) {
        let Some(seq) = self.steps.as_ref() else {
            return;
        };
        let Some(step) = seq.get(self.cursor) else {
            return;
        };
        let frame = Frame {
            index: self.cursor,
            total: seq.len(),
            message: step.message().to_string(),
            scene: self.viz.render(step, &self.context),
        };
        self.presenter.present(&frame);
    }

    fn controls(&self) -> Controls {
        let total = self.len_inner();
        let loaded = self.state != PlaybackState::Empty;
        let playing = self.state == PlaybackState::Playing;
        let status = match self.state {
            PlaybackState::Empty => self.lang.ready().to_string(),
            PlaybackState::Finished => self.lang.finished(total),
            _ => self.lang.status(self.cursor, total),
        };
        Controls {
            state: self.state,
            can_prev: loaded && self.cursor > 0,
            can_next: loaded && self.state != PlaybackState::Finished,
            can_play: matches!(
                self.state,
                PlaybackState::Ready | PlaybackState::Paused | PlaybackState::Playing
            ),
            playing,
            play_label: if playing {
                self.lang.pause_label()
            } else {
                self.lang.play_label()
            },
            speed_label: self.speed.label(self.speed_value),
            status,
        }
    }

    fn sync_controls(&mut self) {
        let controls = self.controls();
        self.presenter.update_controls(&controls);
    }

    /// Manual navigation cancels auto-play and leaves the controller paused,
    /// except for an untouched run still sitting on step 0.
    fn settle_after_manual(&mut self) {
        self.stop_timer();
        self.state = match self.state {
            PlaybackState::Empty => PlaybackState::Empty,
            PlaybackState::Ready if self.cursor == 0 => PlaybackState::Ready,
            _ => PlaybackState::Paused,
        };
    }

    fn play_inner(&mut self) {
        match self.state {
            PlaybackState::Ready | PlaybackState::Paused => {
                self.arm_timer();
                self.state = PlaybackState::Playing;
            }
            PlaybackState::Empty | PlaybackState::Playing | PlaybackState::Finished => {}
        }
        self.sync_controls();
    }

    fn finish(&mut self) {
        self.stop_timer();
        self.state = PlaybackState::Finished;
        log::debug!("playback finished at step {}", self.cursor);
        self.sync_controls();
    }
}

impl<V: Visualizer, S: Scheduler, P: Presenter> Player for Controller<V, S, P> {
    fn load_json(&mut self, text: &str, autoplay: bool) -> VizResult<()> {
        let fetched = decode_steps::<V::Step>(text)?;
        self.load(fetched, autoplay)
    }

    fn next(&mut self) {
        if self.state == PlaybackState::Empty {
            return;
        }
        if self.cursor < self.last_index() {
            self.cursor += 1;
            self.settle_after_manual();
            self.render();
            self.sync_controls();
        } else {
            self.finish();
        }
    }

    fn prev(&mut self) {
        if self.state == PlaybackState::Empty {
            return;
        }
        self.settle_after_manual();
        if self.cursor > 0 {
            self.cursor -= 1;
            self.render();
        }
        self.sync_controls();
    }

    fn seek(&mut self, index: i64) {
        let Some(seq) = self.steps.as_ref() else {
            return;
        };
        self.cursor = seq.clamp(index);
        self.settle_after_manual();
        self.render();
        self.sync_controls();
    }

    fn play(&mut self) {
        self.play_inner();
    }

    fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.stop_timer();
            self.state = PlaybackState::Paused;
            self.sync_controls();
        }
    }

    fn toggle(&mut self) {
        if self.state == PlaybackState::Playing {
            self.pause();
        } else {
            self.play_inner();
        }
    }

    fn tick(&mut self, id: TimerId) {
        if self.state != PlaybackState::Playing || self.timer != Some(id) {
            log::trace!("ignoring stale tick {id:?}");
            return;
        }
        if self.cursor < self.last_index() {
            self.cursor += 1;
            self.render();
            self.sync_controls();
        } else {
            self.finish();
        }
    }

    fn set_speed(&mut self, value: f64) {
        self.speed_value = value;
        if self.state == PlaybackState::Playing {
            self.arm_timer();
        }
        self.sync_controls();
    }

    fn reset(&mut self) {
        self.stop_timer();
        self.steps = None;
        self.context = V::Context::default();
        self.meta = Map::new();
        self.cursor = 0;
        self.state = PlaybackState::Empty;
        self.presenter.clear(self.lang.initial_message());
        self.sync_controls();
    }

    fn fail(&mut self, err: &VizError) {
        if err.is_input() {
            log::warn!("rejected input: {err}");
        } else {
            log::error!("{err}");
        }
        self.presenter.show_error(err);
    }

    fn preview(&mut self, scene: Scene, message: &str) {
        self.stop_timer();
        self.steps = None;
        self.context = V::Context::default();
        self.cursor = 0;
        self.state = PlaybackState::Empty;
        self.presenter.present(&Frame {
            index: 0,
            total: 0,
            message: message.to_string(),
            scene,
        });
        self.sync_controls();
    }

    fn state(&self) -> PlaybackState {
        self.state
    }

    fn cursor(&self) -> usize {
        self.cursor
    }

    fn len(&self) -> usize {
        self.len_inner()
    }

    fn autoplay(&self) -> bool {
        self.autoplay
    }

    fn meta(&self) -> &Map<String, Value> {
        &self.meta
    }
}

/// Scheduler and presenter that only record what they were asked to do.
pub mod testing {
    use std::collections::BTreeSet;

    use super::*;

    #[derive(Debug, Default)]
    pub struct RecordingScheduler {
        next_id: u64,
        pub live: BTreeSet<u64>,
        pub intervals: Vec<u32>,
        pub arms: usize,
    }

    impl RecordingScheduler {
        pub fn live_count(&self) -> usize {
            self.live.len()
        }

        pub fn last_interval(&self) -> Option<u32> {
            self.intervals.last().copied()
        }
    }

    impl Scheduler for RecordingScheduler {
        fn arm(&mut self, interval_ms: u32) -> TimerId {
            self.next_id += 1;
            self.live.insert(self.next_id);
            self.intervals.push(interval_ms);
            self.arms += 1;
            TimerId(self.next_id)
        }

        fn disarm(&mut self, id: TimerId) {
            self.live.remove(&id.0);
        }
    }

    #[derive(Debug, Default)]
    pub struct RecordingPresenter {
        pub frames: Vec<Frame>,
        pub controls: Option<Controls>,
        pub notices: Vec<String>,
        pub errors: Vec<String>,
    }

    impl RecordingPresenter {
        pub fn last_frame(&self) -> Option<&Frame> {
            self.frames.last()
        }
    }

    impl Presenter for RecordingPresenter {
        fn present(&mut self, frame: &Frame) {
            self.frames.push(frame.clone());
        }

        fn update_controls(&mut self, controls: &Controls) {
            self.controls = Some(controls.clone());
        }

        fn clear(&mut self, notice: &str) {
            self.notices.push(notice.to_string());
        }

        fn show_error(&mut self, err: &VizError) {
            self.errors.push(err.to_string());
        }
    }
}
