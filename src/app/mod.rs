mod input;
mod render;

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{LeaveAlternateScreen, disable_raw_mode},
};

use crate::actions::ClusterActions;
use crate::api::SparkApi;
use crate::layout::Layout;
use crate::model::UiState;
use crate::poll::{MonitorCache, PollScheduler, SharedCache};
use crate::visibility::VisibilitySignal;

pub use input::InputResult;

/// Destructive action awaiting a y/n confirmation.
pub struct PendingAction {
    pub prompt: String,
    pub kind: PendingActionKind,
    pub expires: Instant,
}

impl PendingAction {
    const TIMEOUT: Duration = Duration::from_secs(8);

    pub fn new(prompt: impl Into<String>, kind: PendingActionKind) -> Self {
        Self {
            prompt: prompt.into(),
            kind,
            expires: Instant::now() + Self::TIMEOUT,
        }
    }

    pub fn expired(&self, now: Instant) -> bool {
        now > self.expires
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PendingActionKind {
    StartCluster,
    StopCluster,
    RestartCluster,
}

/// Restore the terminal to normal mode. Safe to call multiple times.
pub fn restore_terminal() {
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

/// Main application state and event loop.
pub struct App<A> {
    pub cache: SharedCache,
    pub visibility: VisibilitySignal,
    pub actions: Arc<ClusterActions<A>>,
    pub layout: Layout,
    pub ui_state: UiState,
    /// True while only the ambient status line is shown.
    pub hidden: bool,
    pub status_message: Option<String>,
    pub pending_action: Option<PendingAction>,
    rt: Arc<tokio::runtime::Runtime>,
    render_rate: Duration,
}

impl<A: SparkApi + 'static> App<A> {
    pub fn new(rt: Arc<tokio::runtime::Runtime>, api: Arc<A>) -> Self {
        let cache = MonitorCache::shared();
        let visibility = VisibilitySignal::new();
        let invalidator = PollScheduler::spawn(
            Arc::clone(&api),
            Arc::clone(&cache),
            &visibility,
            rt.handle(),
        );
        let actions = Arc::new(ClusterActions::new(api, invalidator));

        // The dashboard starts shown; gated pollers begin immediately.
        visibility.set(true);

        Self {
            cache,
            visibility,
            actions,
            layout: Layout::default_layout(),
            ui_state: UiState::default(),
            hidden: false,
            status_message: None,
            pending_action: None,
            rt,
            render_rate: Duration::from_millis(1000),
        }
    }

    pub fn run(&mut self, exit_flag: &AtomicBool) -> io::Result<()> {
        let mut last_render = Instant::now() - self.render_rate;
        let mut needs_render = true;

        loop {
            if exit_flag.load(Ordering::Relaxed) {
                break;
            }

            let now = Instant::now();
            if now.duration_since(last_render) >= self.render_rate {
                needs_render = true;
            }
            if self.expire_pending_action() {
                needs_render = true;
            }

            if needs_render {
                render::render(self)?;
                last_render = Instant::now();
                needs_render = false;
            }

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    match input::handle_key(self, key) {
                        InputResult::Exit => break,
                        InputResult::Render => needs_render = true,
                        InputResult::Ignored => {}
                    }
                }
            }
        }
        Ok(())
    }

    /// Toggle between the full dashboard and the ambient status line. This
    /// is the single writer of the visibility signal.
    pub fn toggle_hidden(&mut self) {
        self.hidden = !self.hidden;
        self.visibility.set(!self.hidden);
    }

    /// Expire a stale confirmation prompt. Returns true if one was dropped.
    pub fn expire_pending_action(&mut self) -> bool {
        let now = Instant::now();
        if let Some(ref pa) = self.pending_action {
            if pa.expired(now) {
                self.pending_action = None;
                return true;
            }
        }
        false
    }

    pub(crate) fn runtime(&self) -> &tokio::runtime::Runtime {
        &self.rt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_action_expires_after_timeout() {
        let pa = PendingAction::new("Stop the cluster?", PendingActionKind::StopCluster);
        let now = Instant::now();
        assert!(!pa.expired(now));
        assert!(pa.expired(now + Duration::from_secs(9)));
    }
}
