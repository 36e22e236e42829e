//! Finding the toast windows to manage
//!
//! The Action Center toast is a `Windows.UI.Core.CoreWindow` found by its
//! localized title. Teams toasts offer no such handle: they are plain
//! Chromium popups, so we enumerate top-level windows and match on their
//! very specific geometry instead. Finding nothing is the normal idle case.

use crate::utils::Rect;

/// Window class of the Action Center toast popup.
pub const TOAST_CLASS: &str = "Windows.UI.Core.CoreWindow";

/// Window class of Teams (Electron/Chromium) popup windows.
pub const TEAMS_TOAST_CLASS: &str = "Chrome_WidgetWin_1";

/// Teams toasts are always exactly this wide.
pub const TEAMS_TOAST_WIDTH: i32 = 372;

/// Observed Teams toast heights, one per layout variant (plain text, with
/// preview line, with attachment, and so on). Anything else with the Teams
/// class is a regular window we must not touch.
pub const TEAMS_TOAST_HEIGHTS: &[i32] = &[76, 108, 140, 172, 204, 252];

/// A located toast window: its raw handle and current screen rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoundWindow {
    pub hwnd: isize,
    pub rect: Rect,
}

/// Whether a window's size matches the Teams toast signature.
pub fn is_teams_toast_geometry(width: i32, height: i32) -> bool {
    width == TEAMS_TOAST_WIDTH && TEAMS_TOAST_HEIGHTS.contains(&height)
}

#[cfg(windows)]
mod win32 {
    use log::debug;
    use windows::Win32::Foundation::{BOOL, HWND, LPARAM, RECT, TRUE};
    use windows::Win32::UI::WindowsAndMessaging::{
        EnumWindows, FindWindowW, GetClassNameW, GetWindowRect, IsWindowVisible,
    };

    use super::*;
    use crate::utils::{to_pcwstr, to_wide_string, wide_to_string};

    fn window_rect(hwnd: HWND) -> Option<Rect> {
        let mut rc = RECT::default();
        if unsafe { GetWindowRect(hwnd, &mut rc) }.is_err() {
            return None;
        }
        Some(Rect::new(rc.left, rc.top, rc.right - rc.left, rc.bottom - rc.top))
    }

    /// Look up the Action Center toast by class and localized title.
    pub fn find_action_center_toast(title: &str) -> Option<FoundWindow> {
        let class = to_wide_string(TOAST_CLASS);
        let title = to_wide_string(title);

        let hwnd = unsafe { FindWindowW(to_pcwstr(&class), to_pcwstr(&title)) }.ok()?;
        if hwnd.is_invalid() {
            return None;
        }

        let rect = window_rect(hwnd)?;
        Some(FoundWindow { hwnd: hwnd.0 as isize, rect })
    }

    /// Enumerate all visible Teams toast popups, in z-order.
    pub fn find_teams_toasts() -> Vec<FoundWindow> {
        unsafe extern "system" fn enum_cb(hwnd: HWND, lparam: LPARAM) -> BOOL {
            let found = &mut *(lparam.0 as *mut Vec<FoundWindow>);

            if !IsWindowVisible(hwnd).as_bool() {
                return TRUE;
            }

            let mut class_buf = [0u16; 256];
            let len = GetClassNameW(hwnd, &mut class_buf);
            if len <= 0 || wide_to_string(&class_buf) != TEAMS_TOAST_CLASS {
                return TRUE;
            }

            if let Some(rect) = window_rect(hwnd) {
                if is_teams_toast_geometry(rect.width, rect.height) {
                    found.push(FoundWindow { hwnd: hwnd.0 as isize, rect });
                }
            }

            TRUE
        }

        let mut found: Vec<FoundWindow> = Vec::new();
        if let Err(e) = unsafe {
            EnumWindows(Some(enum_cb), LPARAM(&mut found as *mut Vec<FoundWindow> as isize))
        } {
            debug!("EnumWindows failed: {}", e);
        }
        found
    }
}

#[cfg(windows)]
pub use win32::{find_action_center_toast, find_teams_toasts};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teams_signature_accepts_known_layouts() {
        assert!(is_teams_toast_geometry(372, 252));
        assert!(is_teams_toast_geometry(372, 76));
    }

    #[test]
    fn teams_signature_rejects_other_windows() {
        // Right class but full-size app window
        assert!(!is_teams_toast_geometry(372, 999));
        assert!(!is_teams_toast_geometry(1280, 720));
        // One pixel off the fixed width
        assert!(!is_teams_toast_geometry(371, 252));
        assert!(!is_teams_toast_geometry(373, 252));
    }
}
