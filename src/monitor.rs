//! Display enumeration
//!
//! Monitors are re-read on every poll cycle and whenever the system reports a
//! display change, so hotplugging never leaves the app pointing at a stale
//! bounds rectangle.

use crate::utils::Rect;

/// One attached display, in enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Monitor {
    pub index: usize,
    pub bounds: Rect,
    pub is_primary: bool,
}

/// Bounds of the primary display, if any monitor is attached.
pub fn primary_bounds(monitors: &[Monitor]) -> Option<Rect> {
    monitors
        .iter()
        .find(|m| m.is_primary)
        .or_else(|| monitors.first())
        .map(|m| m.bounds)
}

/// Enumerate all attached displays.
#[cfg(windows)]
pub fn enumerate_monitors() -> Vec<Monitor> {
    use windows::Win32::Foundation::{BOOL, LPARAM, RECT, TRUE};
    use windows::Win32::Graphics::Gdi::{
        EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFO, MONITORINFOF_PRIMARY,
    };

    unsafe extern "system" fn enum_monitor_cb(
        monitor: HMONITOR,
        _hdc: HDC,
        _rect: *mut RECT,
        lparam: LPARAM,
    ) -> BOOL {
        let monitors = &mut *(lparam.0 as *mut Vec<Monitor>);

        let mut info = MONITORINFO {
            cbSize: std::mem::size_of::<MONITORINFO>() as u32,
            ..Default::default()
        };

        if GetMonitorInfoW(monitor, &mut info).as_bool() {
            let rc = info.rcMonitor;
            monitors.push(Monitor {
                index: monitors.len(),
                bounds: Rect::new(rc.left, rc.top, rc.right - rc.left, rc.bottom - rc.top),
                is_primary: info.dwFlags & MONITORINFOF_PRIMARY != 0,
            });
        }

        TRUE
    }

    let mut monitors: Vec<Monitor> = Vec::new();
    unsafe {
        let _ = EnumDisplayMonitors(
            None,
            None,
            Some(enum_monitor_cb),
            LPARAM(&mut monitors as *mut Vec<Monitor> as isize),
        );
    }

    if monitors.is_empty() {
        log::warn!("Display enumeration returned no monitors");
    }

    monitors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_bounds_prefers_primary_flag() {
        let monitors = vec![
            Monitor { index: 0, bounds: Rect::new(-1920, 0, 1920, 1080), is_primary: false },
            Monitor { index: 1, bounds: Rect::new(0, 0, 2560, 1440), is_primary: true },
        ];
        assert_eq!(primary_bounds(&monitors), Some(Rect::new(0, 0, 2560, 1440)));
    }

    #[test]
    fn primary_bounds_falls_back_to_first() {
        let monitors = vec![Monitor {
            index: 0,
            bounds: Rect::new(0, 0, 1920, 1080),
            is_primary: false,
        }];
        assert_eq!(primary_bounds(&monitors), Some(Rect::new(0, 0, 1920, 1080)));
        assert_eq!(primary_bounds(&[]), None);
    }
}
