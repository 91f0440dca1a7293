//! Frame-loop lifecycle around a [`ParticleField`]
//!
//! The animator only draws while its container is visible. Visibility changes
//! flip an explicit [`LoopState`]; the pending frame handle is stored so a pause
//! can cancel it and a resume never schedules a second loop.

use std::fmt::Debug;

use tracing::{debug, trace};

use super::field::{FrameStats, ParticleField};
use super::surface::Surface;
use crate::theme::{Palette, Theme};

/// Frame-loop state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopState {
    /// Not yet sized or not yet seen on screen
    #[default]
    Uninitialized,
    Running,
    Paused,
}

impl LoopState {
    pub fn is_running(&self) -> bool {
        matches!(self, LoopState::Running)
    }
}

/// "Run the frame callback before the next repaint" and its cancellation
pub trait FrameScheduler {
    type Handle: Copy + Eq + Debug;

    /// Schedule one frame callback. `None` if the platform refused.
    fn request_frame(&mut self) -> Option<Self::Handle>;

    fn cancel_frame(&mut self, handle: Self::Handle);
}

pub struct Animator<S: FrameScheduler> {
    field: ParticleField,
    scheduler: S,
    state: LoopState,
    /// Handle of the one outstanding frame callback, if any
    pending: Option<S::Handle>,
    /// Last visibility report; `false` until the observer says otherwise
    visible: bool,
    sized: bool,
    frames_rendered: u64,
}

impl<S: FrameScheduler> Animator<S> {
    pub fn new(field: ParticleField, scheduler: S) -> Self {
        Self {
            field,
            scheduler,
            state: LoopState::Uninitialized,
            pending: None,
            visible: false,
            sized: false,
            frames_rendered: 0,
        }
    }

    /// Resize the surface and regenerate the nodes.
    /// The first resize starts the loop if the container is already visible.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.field.resize(width, height);
        self.sized = true;
        if self.state == LoopState::Uninitialized && self.visible {
            self.resume();
        }
    }

    /// Visibility observer callback: container crossed the threshold
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if visible {
            if self.sized {
                self.resume();
            }
        } else {
            self.pause();
        }
    }

    fn resume(&mut self) {
        if self.state != LoopState::Running {
            debug!(from = ?self.state, "Particle loop running");
            self.state = LoopState::Running;
        }
        self.schedule_if_idle();
    }

    fn pause(&mut self) {
        if self.state != LoopState::Running {
            return;
        }
        debug!(frames = self.frames_rendered, "Particle loop paused");
        self.state = LoopState::Paused;
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    fn schedule_if_idle(&mut self) {
        if self.pending.is_none() {
            self.pending = self.scheduler.request_frame();
        }
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.field.pointer_move(x, y);
    }

    pub fn pointer_leave(&mut self) {
        self.field.pointer_leave();
    }

    /// The scheduled frame callback. `theme` is read by the caller at frame
    /// time so theme toggles show up on the very next draw.
    ///
    /// Returns `None` for a stale callback that fired after a pause.
    pub fn on_frame<D: Surface + ?Sized>(&mut self, surface: &mut D, theme: Theme) -> Option<FrameStats> {
        // This callback has fired; its handle is no longer outstanding
        self.pending = None;

        if !self.state.is_running() {
            trace!(state = ?self.state, "Dropping stale frame");
            return None;
        }

        self.field.step();
        let stats = self.field.draw(surface, &Palette::for_theme(theme));
        self.frames_rendered += 1;

        self.schedule_if_idle();
        Some(stats)
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn pending_frame(&self) -> Option<S::Handle> {
        self.pending
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::FieldConfig;
    use crate::core::surface::{DrawCommand, RecordingSurface};
    use std::collections::HashSet;

    /// Scheduler that tracks outstanding requests like a browser would
    #[derive(Default)]
    struct ManualScheduler {
        next: u32,
        outstanding: HashSet<u32>,
        refuse: bool,
    }

    impl FrameScheduler for ManualScheduler {
        type Handle = u32;

        fn request_frame(&mut self) -> Option<u32> {
            if self.refuse {
                return None;
            }
            self.next += 1;
            self.outstanding.insert(self.next);
            Some(self.next)
        }

        fn cancel_frame(&mut self, handle: u32) {
            self.outstanding.remove(&handle);
        }
    }

    impl ManualScheduler {
        /// Fire the outstanding callback, as the display refresh would
        fn fire(anim: &mut Animator<Self>, surface: &mut RecordingSurface, theme: Theme) -> Option<FrameStats> {
            let handle = anim.pending_frame()?;
            assert!(anim.scheduler_mut().outstanding.remove(&handle));
            anim.on_frame(surface, theme)
        }
    }

    fn animator() -> Animator<ManualScheduler> {
        let field = ParticleField::with_seed(FieldConfig::default(), 42);
        Animator::new(field, ManualScheduler::default())
    }

    fn running(width: f64, height: f64) -> Animator<ManualScheduler> {
        let mut anim = animator();
        anim.resize(width, height);
        anim.set_visible(true);
        anim
    }

    #[test]
    fn test_starts_uninitialized() {
        let anim = animator();
        assert_eq!(anim.state(), LoopState::Uninitialized);
        assert_eq!(anim.pending_frame(), None);
    }

    #[test]
    fn test_needs_size_and_visibility_to_start() {
        let mut anim = animator();
        anim.set_visible(true);
        assert_eq!(anim.state(), LoopState::Uninitialized, "unsized field must not start");
        assert_eq!(anim.pending_frame(), None);

        anim.resize(800.0, 600.0);
        assert_eq!(anim.state(), LoopState::Running);
        assert!(anim.pending_frame().is_some());

        let mut other = animator();
        other.resize(800.0, 600.0);
        assert_eq!(other.state(), LoopState::Uninitialized, "sized but never visible");
        other.set_visible(true);
        assert_eq!(other.state(), LoopState::Running);
    }

    #[test]
    fn test_hidden_then_visible_twice_leaves_one_pending_frame() {
        let mut anim = running(800.0, 600.0);
        for _ in 0..2 {
            anim.set_visible(false);
            assert_eq!(anim.state(), LoopState::Paused);
            assert_eq!(anim.pending_frame(), None);
            assert!(anim.scheduler().outstanding.is_empty(), "pause must cancel the frame");

            anim.set_visible(true);
            assert_eq!(anim.state(), LoopState::Running);
        }
        assert!(anim.pending_frame().is_some());
        assert_eq!(anim.scheduler().outstanding.len(), 1);
    }

    #[test]
    fn test_repeated_visible_signals_do_not_stack_loops() {
        let mut anim = running(400.0, 400.0);
        anim.set_visible(true);
        anim.set_visible(true);
        assert_eq!(anim.scheduler().outstanding.len(), 1);

        let mut s = RecordingSurface::new();
        ManualScheduler::fire(&mut anim, &mut s, Theme::Light).unwrap();
        anim.set_visible(true);
        assert_eq!(anim.scheduler().outstanding.len(), 1);
    }

    #[test]
    fn test_repeated_hidden_signals_are_noops() {
        let mut anim = running(400.0, 400.0);
        anim.set_visible(false);
        anim.set_visible(false);
        assert_eq!(anim.state(), LoopState::Paused);

        let mut fresh = animator();
        fresh.set_visible(false);
        assert_eq!(fresh.state(), LoopState::Uninitialized);
    }

    #[test]
    fn test_stale_frame_after_pause_does_not_draw() {
        let mut anim = running(400.0, 400.0);
        anim.set_visible(false);

        let mut s = RecordingSurface::new();
        assert_eq!(anim.on_frame(&mut s, Theme::Dark), None);
        assert!(s.commands().is_empty());
        assert_eq!(anim.frames_rendered(), 0);
        assert_eq!(anim.pending_frame(), None, "stale frame must not reschedule");
    }

    #[test]
    fn test_frame_reschedules_itself() {
        let mut anim = running(640.0, 480.0);
        let mut s = RecordingSurface::new();
        for _ in 0..10 {
            assert!(ManualScheduler::fire(&mut anim, &mut s, Theme::Light).is_some());
            assert_eq!(anim.scheduler().outstanding.len(), 1);
        }
        assert_eq!(anim.frames_rendered(), 10);
    }

    #[test]
    fn test_refused_request_leaves_no_handle() {
        let mut anim = animator();
        anim.scheduler_mut().refuse = true;
        anim.resize(100.0, 100.0);
        anim.set_visible(true);
        assert_eq!(anim.state(), LoopState::Running);
        assert_eq!(anim.pending_frame(), None);

        anim.scheduler_mut().refuse = false;
        anim.set_visible(true);
        assert!(anim.pending_frame().is_some());
    }

    #[test]
    fn test_theme_toggle_applies_next_frame() {
        let mut anim = running(300.0, 300.0);
        let mut s = RecordingSurface::new();
        let node_colors = |s: &RecordingSurface| -> Vec<_> {
            s.circles()
                .map(|c| match c {
                    DrawCommand::Circle { color, .. } => *color,
                    _ => unreachable!(),
                })
                .collect()
        };

        ManualScheduler::fire(&mut anim, &mut s, Theme::Light).unwrap();
        let light = Palette::for_theme(Theme::Light);
        assert!(node_colors(&s).iter().all(|c| *c == light.node));

        ManualScheduler::fire(&mut anim, &mut s, Theme::Dark).unwrap();
        let dark = Palette::for_theme(Theme::Dark);
        assert!(node_colors(&s).iter().all(|c| *c == dark.node));
        assert_eq!(anim.field().nodes().len(), 60, "theme change must not regenerate");
    }

    #[test]
    fn test_resize_while_running() {
        let mut anim = running(800.0, 600.0);
        let mut s = RecordingSurface::new();
        ManualScheduler::fire(&mut anim, &mut s, Theme::Light).unwrap();

        anim.resize(400.0, 300.0);
        assert_eq!(anim.state(), LoopState::Running);
        assert_eq!(anim.scheduler().outstanding.len(), 1);
        assert_eq!(anim.field().nodes().len(), 60);
        for n in anim.field().nodes() {
            assert!((0.0..=400.0).contains(&n.x) && (0.0..=300.0).contains(&n.y));
        }
    }

    #[test]
    fn test_far_pointer_never_highlights() {
        let mut anim = running(300.0, 300.0);
        anim.pointer_move(-9999.0, -9999.0);
        let mut s = RecordingSurface::new();
        for _ in 0..120 {
            let stats = ManualScheduler::fire(&mut anim, &mut s, Theme::Dark).unwrap();
            assert_eq!(stats.near_nodes, 0);
            assert_eq!(stats.glow_links, 0);
        }
    }
}
