//! Background poll loop
//!
//! Toast windows appear and vanish without any notification we can subscribe
//! to, so a dedicated thread samples the desktop every 10 ms. Each cycle is
//! split in two: a pure planning step over snapshots (testable, idempotent)
//! and a thin application step that issues the Win32 calls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::geometry;
use crate::locator::FoundWindow;
use crate::monitor::Monitor;
use crate::settings::Preferences;
use crate::utils::{Point, Size};

/// Sampling cadence of the poll thread.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// State shared between the poll thread and the UI thread.
#[derive(Debug)]
pub struct SharedState {
    pub prefs: Preferences,
    /// Raw handle of the most recently seen Action Center toast. The UI uses
    /// it for live opacity preview; cleared as soon as the toast goes away.
    pub last_toast: Option<isize>,
}

impl SharedState {
    pub fn new(prefs: Preferences) -> Self {
        Self { prefs, last_toast: None }
    }
}

/// One window move the current cycle decided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCmd {
    pub hwnd: isize,
    pub to: Point,
}

/// Decide which windows need moving this cycle.
///
/// Pure over its inputs and idempotent: once the moves it plans have been
/// applied, a second call with the resulting rectangles plans nothing.
pub fn plan_cycle(
    prefs: &Preferences,
    monitors: &[Monitor],
    toast: Option<&FoundWindow>,
    teams: &[FoundWindow],
) -> Vec<MoveCmd> {
    let mut moves = Vec::new();
    if monitors.is_empty() {
        return moves;
    }

    let idx = geometry::clamp_monitor_index(prefs.monitor_index, monitors.len());
    let bounds = monitors[idx].bounds;

    if let Some(t) = toast {
        let want = geometry::desired_position(
            bounds,
            t.rect.size(),
            prefs.position_x,
            prefs.position_y,
        );
        if want.x != t.rect.x || want.y != t.rect.y {
            moves.push(MoveCmd { hwnd: t.hwnd, to: want });
        }
    }

    let sizes: Vec<Size> = teams.iter().map(|t| t.rect.size()).collect();
    let targets = geometry::stacked_positions(bounds, &sizes, prefs.teams_x, prefs.teams_y);
    for (t, want) in teams.iter().zip(targets) {
        if want.x != t.rect.x || want.y != t.rect.y {
            moves.push(MoveCmd { hwnd: t.hwnd, to: want });
        }
    }

    moves
}

/// Handle to the running poll thread; stopping is cooperative and bounded
/// by one poll interval.
pub struct PollHandle {
    stop: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl PollHandle {
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::warn!("Poll thread panicked");
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(windows)]
mod worker {
    use log::{debug, info};
    use parking_lot::RwLock;

    use super::*;
    use crate::error::{ToastShiftError, ToastShiftResult};
    use crate::locator;
    use crate::monitor;
    use crate::mutator;

    /// What the poll loop is currently doing, for logging only.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum PollState {
        Idle,
        Tracking,
        Repositioning,
    }

    /// Start the poll thread.
    ///
    /// `toast_title` is the localized Action Center toast title resolved at
    /// startup; it cannot change while the process runs.
    pub fn spawn(
        shared: Arc<RwLock<SharedState>>,
        toast_title: String,
    ) -> ToastShiftResult<PollHandle> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();

        let thread = std::thread::Builder::new()
            .name("toast-poll".to_string())
            .spawn(move || run_loop(shared, toast_title, stop_flag))
            .map_err(|e| ToastShiftError::Worker(format!("failed to start poll thread: {}", e)))?;

        Ok(PollHandle { stop, thread: Some(thread) })
    }

    fn run_loop(shared: Arc<RwLock<SharedState>>, toast_title: String, stop: Arc<AtomicBool>) {
        info!("Poll loop started (watching for \"{}\")", toast_title);
        let mut state = PollState::Idle;

        while !stop.load(Ordering::Relaxed) {
            let monitors = monitor::enumerate_monitors();
            let toast = locator::find_action_center_toast(&toast_title);
            let teams = locator::find_teams_toasts();

            let (prefs, prev_toast) = {
                let guard = shared.read();
                (guard.prefs.clone(), guard.last_toast)
            };

            let current_toast = toast.as_ref().map(|t| t.hwnd);
            if prev_toast != current_toast {
                shared.write().last_toast = current_toast;
            }

            match (prev_toast, current_toast) {
                (Some(prev), None) => {
                    // Toast went away; drop any click-through override so a
                    // recycled window does not inherit it.
                    mutator::set_click_through(mutator::hwnd_from_raw(prev), false);
                }
                (_, Some(hwnd)) => {
                    mutator::set_click_through(
                        mutator::hwnd_from_raw(hwnd),
                        prefs.click_through,
                    );
                    if prev_toast != current_toast {
                        mutator::apply_opacity(mutator::hwnd_from_raw(hwnd), prefs.alpha());
                    }
                }
                (None, None) => {}
            }

            let moves = plan_cycle(&prefs, &monitors, toast.as_ref(), &teams);
            for cmd in &moves {
                let hwnd = mutator::hwnd_from_raw(cmd.hwnd);
                mutator::move_window(hwnd, cmd.to);
                mutator::apply_opacity(hwnd, prefs.alpha());
            }

            let next = if current_toast.is_none() && teams.is_empty() {
                PollState::Idle
            } else if moves.is_empty() {
                PollState::Tracking
            } else {
                PollState::Repositioning
            };
            if next != state {
                debug!("Poll state {:?} -> {:?}", state, next);
                state = next;
            }

            std::thread::sleep(POLL_INTERVAL);
        }

        info!("Poll loop stopped");
    }
}

#[cfg(windows)]
pub use worker::spawn;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Rect;

    fn monitors() -> Vec<Monitor> {
        vec![Monitor { index: 0, bounds: Rect::new(0, 0, 1920, 1080), is_primary: true }]
    }

    fn prefs() -> Preferences {
        Preferences {
            position_x: 100,
            position_y: 50,
            monitor_index: 0,
            opacity: 100,
            click_through: false,
            teams_x: 1900,
            teams_y: 300,
        }
    }

    #[test]
    fn misplaced_toast_gets_one_move() {
        // 372x252 toast with offsets (100, 50): both edges overhang, so the
        // target is the monitor origin.
        let toast = FoundWindow { hwnd: 7, rect: Rect::new(1540, 820, 372, 252) };
        let moves = plan_cycle(&prefs(), &monitors(), Some(&toast), &[]);
        assert_eq!(moves, vec![MoveCmd { hwnd: 7, to: Point::new(0, 0) }]);
    }

    #[test]
    fn planning_is_idempotent_after_apply() {
        let mut toast = FoundWindow { hwnd: 7, rect: Rect::new(1540, 820, 372, 252) };
        let moves = plan_cycle(&prefs(), &monitors(), Some(&toast), &[]);
        assert_eq!(moves.len(), 1);

        toast.rect.x = moves[0].to.x;
        toast.rect.y = moves[0].to.y;
        let again = plan_cycle(&prefs(), &monitors(), Some(&toast), &[]);
        assert!(again.is_empty());
    }

    #[test]
    fn settled_toast_plans_nothing() {
        let toast = FoundWindow { hwnd: 7, rect: Rect::new(0, 0, 372, 252) };
        assert!(plan_cycle(&prefs(), &monitors(), Some(&toast), &[]).is_empty());
    }

    #[test]
    fn teams_toasts_are_stacked() {
        let teams = [
            FoundWindow { hwnd: 1, rect: Rect::new(10, 10, 372, 108) },
            FoundWindow { hwnd: 2, rect: Rect::new(10, 10, 372, 76) },
        ];
        let moves = plan_cycle(&prefs(), &monitors(), None, &teams);
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0].to, Point::new(1900 - 372, 300 - 108));
        assert_eq!(moves[1].to, Point::new(1900 - 372, moves[0].to.y + 108));
    }

    #[test]
    fn no_monitors_means_no_moves() {
        let toast = FoundWindow { hwnd: 7, rect: Rect::new(5, 5, 372, 252) };
        assert!(plan_cycle(&prefs(), &[], Some(&toast), &[]).is_empty());
    }

    #[test]
    fn stale_monitor_index_is_clamped_not_ignored() {
        let mut p = prefs();
        p.monitor_index = 9;
        let toast = FoundWindow { hwnd: 7, rect: Rect::new(5, 5, 372, 252) };
        let moves = plan_cycle(&p, &monitors(), Some(&toast), &[]);
        // Still placed on the only monitor we have.
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].to, Point::new(0, 0));
    }
}
