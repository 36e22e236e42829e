//! Process-global handles for window-proc access
//!
//! Window procedures receive no user pointer worth speaking of, so the bits
//! they need live behind a `OnceCell`, set once during startup before any
//! window exists.

use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use windows::Win32::Foundation::HWND;

use crate::poller::SharedState;

static SHARED: OnceCell<Arc<RwLock<SharedState>>> = OnceCell::new();
static DIALOG_HWND: AtomicIsize = AtomicIsize::new(0);
static TRAY_HWND: AtomicIsize = AtomicIsize::new(0);

/// Install the shared state. Called once before window creation.
pub fn set_shared(shared: Arc<RwLock<SharedState>>) {
    if SHARED.set(shared).is_err() {
        log::warn!("Shared state installed twice");
    }
}

/// The shared state, if startup has installed it.
pub fn shared() -> Option<Arc<RwLock<SharedState>>> {
    SHARED.get().cloned()
}

/// Remember the settings dialog handle for the tray to toggle.
pub fn set_dialog_hwnd(hwnd: HWND) {
    DIALOG_HWND.store(hwnd.0 as isize, Ordering::Release);
}

/// The settings dialog handle, once created.
pub fn dialog_hwnd() -> Option<HWND> {
    from_atomic(&DIALOG_HWND)
}

/// Remember the hidden tray host window, owner of the notification icon.
pub fn set_tray_hwnd(hwnd: HWND) {
    TRAY_HWND.store(hwnd.0 as isize, Ordering::Release);
}

/// The tray host window handle, once created.
pub fn tray_hwnd() -> Option<HWND> {
    from_atomic(&TRAY_HWND)
}

fn from_atomic(cell: &AtomicIsize) -> Option<HWND> {
    let raw = cell.load(Ordering::Acquire);
    if raw == 0 {
        None
    } else {
        Some(HWND(raw as *mut std::ffi::c_void))
    }
}
