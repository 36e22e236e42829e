//! Applying position, opacity, and click-through to a toast window
//!
//! All operations here are best-effort: the toast can be destroyed by the
//! shell at any instant, so a failed call is logged at debug level and left
//! for the next poll cycle to sort out.

use log::debug;
use windows::Win32::Foundation::{COLORREF, HWND};
use windows::Win32::UI::WindowsAndMessaging::{
    GetWindowLongPtrW, SetLayeredWindowAttributes, SetWindowLongPtrW, SetWindowPos, ShowWindow,
    GWL_EXSTYLE, LWA_ALPHA, SWP_NOSIZE, SWP_NOZORDER, SW_HIDE, SW_SHOW, WS_EX_LAYERED,
    WS_EX_TRANSPARENT,
};

use crate::utils::Point;

/// Reconstruct an `HWND` from the raw value the locator handed out.
pub fn hwnd_from_raw(raw: isize) -> HWND {
    HWND(raw as *mut std::ffi::c_void)
}

/// Move a window to `to`, keeping its size and z-order.
///
/// The window is hidden for the duration of the move so the system's
/// slide-in animation does not play out at the old location.
pub fn move_window(hwnd: HWND, to: Point) {
    unsafe {
        let _ = ShowWindow(hwnd, SW_HIDE);
        if let Err(e) = SetWindowPos(hwnd, None, to.x, to.y, 0, 0, SWP_NOSIZE | SWP_NOZORDER) {
            debug!("SetWindowPos failed for {:?}: {}", hwnd, e);
        }
        let _ = ShowWindow(hwnd, SW_SHOW);
    }
}

/// Set the layered-window alpha on a toast, making it layered if needed.
pub fn apply_opacity(hwnd: HWND, alpha: u8) {
    unsafe {
        let ex_style = GetWindowLongPtrW(hwnd, GWL_EXSTYLE);
        if ex_style & WS_EX_LAYERED.0 as isize == 0 {
            SetWindowLongPtrW(hwnd, GWL_EXSTYLE, ex_style | WS_EX_LAYERED.0 as isize);
        }
        if let Err(e) = SetLayeredWindowAttributes(hwnd, COLORREF(0), alpha, LWA_ALPHA) {
            debug!("SetLayeredWindowAttributes failed for {:?}: {}", hwnd, e);
        }
    }
}

/// Restore a toast to full opacity.
pub fn restore_opacity(hwnd: HWND) {
    apply_opacity(hwnd, 255);
}

/// Toggle the transparent extended style so clicks fall through the toast.
pub fn set_click_through(hwnd: HWND, enabled: bool) {
    unsafe {
        let ex_style = GetWindowLongPtrW(hwnd, GWL_EXSTYLE);
        let desired = if enabled {
            ex_style | (WS_EX_LAYERED.0 | WS_EX_TRANSPARENT.0) as isize
        } else {
            ex_style & !(WS_EX_TRANSPARENT.0 as isize)
        };
        if desired != ex_style {
            SetWindowLongPtrW(hwnd, GWL_EXSTYLE, desired);
        }
    }
}
