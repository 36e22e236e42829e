//! User preferences, persisted in the per-user registry hive
//!
//! Values live under `HKCU\Software\ToastShift` so settings survive restarts
//! without dragging in a config file the user would have to find. The
//! in-memory [`Preferences`] snapshot is what the poll loop and the settings
//! dialog share; every UI change writes the snapshot back out immediately.

use crate::monitor::Monitor;

/// Registry path holding the preference values.
pub const SETTINGS_KEY: &str = r"Software\ToastShift";

/// Registry path for per-user autostart entries.
pub const RUN_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";

/// Name of our autostart value under [`RUN_KEY`].
pub const RUN_VALUE: &str = "ToastShift";

const VAL_POSITION_X: &str = "PositionX";
const VAL_POSITION_Y: &str = "PositionY";
const VAL_MONITOR_INDEX: &str = "MonitorIndex";
const VAL_OPACITY: &str = "Opacity";
const VAL_CLICK_THROUGH: &str = "ClickThroughEnabled";
const VAL_TEAMS_X: &str = "TeamsHorizontalPosition";
const VAL_TEAMS_Y: &str = "TeamsVerticalPosition";

/// Upper bounds for the position sliders, derived from the selected monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderRanges {
    pub x_max: i32,
    pub y_max: i32,
}

/// All user-tunable settings.
///
/// The X/Y values are offsets from the monitor's left/top edge to the toast's
/// right/bottom edge, matching what the sliders show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub position_x: i32,
    pub position_y: i32,
    pub monitor_index: i32,
    pub opacity: i32,
    pub click_through: bool,
    pub teams_x: i32,
    pub teams_y: i32,
}

impl Preferences {
    /// Defaults for a fresh install: upper-right corner of the primary
    /// monitor, fully opaque, clicks pass to the toast.
    pub fn fallback(primary_width: i32) -> Self {
        Self {
            position_x: primary_width - 300,
            position_y: 100,
            monitor_index: 0,
            opacity: 100,
            click_through: false,
            teams_x: primary_width - 300,
            teams_y: 100,
        }
    }

    /// Alpha byte for the current opacity percentage.
    pub fn alpha(&self) -> u8 {
        crate::geometry::opacity_to_alpha(self.opacity)
    }

    /// Switch to another monitor, clamping the requested index.
    ///
    /// Updates the stored index and returns the new slider maxima in one
    /// step, so callers holding the shared lock can persist both together
    /// and the UI never shows ranges from one monitor with the index of
    /// another.
    pub fn select_monitor(&mut self, index: i32, monitors: &[Monitor]) -> SliderRanges {
        let idx = crate::geometry::clamp_monitor_index(index, monitors.len());
        self.monitor_index = idx as i32;
        match monitors.get(idx) {
            Some(m) => SliderRanges {
                x_max: m.bounds.width,
                y_max: m.bounds.height,
            },
            None => SliderRanges { x_max: 0, y_max: 0 },
        }
    }
}

#[cfg(windows)]
mod registry {
    use log::{debug, warn};
    use windows::core::PCWSTR;
    use windows::Win32::System::Registry::{
        RegCloseKey, RegCreateKeyExW, RegDeleteValueW, RegOpenKeyExW, RegQueryValueExW,
        RegSetValueExW, HKEY, HKEY_CURRENT_USER, KEY_READ, KEY_WRITE, REG_DWORD,
        REG_OPTION_NON_VOLATILE, REG_SZ, REG_VALUE_TYPE,
    };

    use super::*;
    use crate::error::{ToastShiftError, ToastShiftResult};
    use crate::utils::to_wide_string;

    fn open_key(path: &str, write: bool) -> Option<HKEY> {
        let key_path = to_wide_string(path);
        let access = if write { KEY_READ | KEY_WRITE } else { KEY_READ };
        let mut hkey = HKEY::default();

        let result = if write {
            unsafe {
                RegCreateKeyExW(
                    HKEY_CURRENT_USER,
                    PCWSTR(key_path.as_ptr()),
                    0,
                    PCWSTR::null(),
                    REG_OPTION_NON_VOLATILE,
                    access,
                    None,
                    &mut hkey,
                    None,
                )
            }
        } else {
            unsafe {
                RegOpenKeyExW(
                    HKEY_CURRENT_USER,
                    PCWSTR(key_path.as_ptr()),
                    0,
                    access,
                    &mut hkey,
                )
            }
        };

        if result.is_err() {
            debug!("Registry: failed to open {} (rc={:?})", path, result);
            return None;
        }
        Some(hkey)
    }

    fn read_dword(hkey: HKEY, name: &str) -> Option<i32> {
        let value_name = to_wide_string(name);
        let mut data = [0u8; 4];
        let mut data_size = data.len() as u32;
        let mut data_type = REG_VALUE_TYPE::default();

        let rc = unsafe {
            RegQueryValueExW(
                hkey,
                PCWSTR(value_name.as_ptr()),
                None,
                Some(&mut data_type),
                Some(data.as_mut_ptr()),
                Some(&mut data_size),
            )
        };

        if rc.is_err() || data_type != REG_DWORD {
            return None;
        }
        Some(i32::from_le_bytes(data))
    }

    fn write_dword(hkey: HKEY, name: &str, value: i32) -> ToastShiftResult<()> {
        let value_name = to_wide_string(name);
        let rc = unsafe {
            RegSetValueExW(
                hkey,
                PCWSTR(value_name.as_ptr()),
                0,
                REG_DWORD,
                Some(&value.to_le_bytes()),
            )
        };
        if rc.is_err() {
            return Err(ToastShiftError::Registry(format!(
                "failed to write {} (rc={:?})",
                name, rc
            )));
        }
        Ok(())
    }

    /// Load all preferences, applying defaults for absent values.
    pub fn load(primary_width: i32) -> Preferences {
        let defaults = Preferences::fallback(primary_width);
        let Some(hkey) = open_key(SETTINGS_KEY, false) else {
            debug!("Registry: no settings key yet, using defaults");
            return defaults;
        };

        let prefs = Preferences {
            position_x: read_dword(hkey, VAL_POSITION_X).unwrap_or(defaults.position_x),
            position_y: read_dword(hkey, VAL_POSITION_Y).unwrap_or(defaults.position_y),
            monitor_index: read_dword(hkey, VAL_MONITOR_INDEX).unwrap_or(defaults.monitor_index),
            opacity: read_dword(hkey, VAL_OPACITY).unwrap_or(defaults.opacity),
            click_through: read_dword(hkey, VAL_CLICK_THROUGH).unwrap_or(0) != 0,
            teams_x: read_dword(hkey, VAL_TEAMS_X).unwrap_or(defaults.teams_x),
            teams_y: read_dword(hkey, VAL_TEAMS_Y).unwrap_or(defaults.teams_y),
        };

        unsafe {
            let _ = RegCloseKey(hkey);
        }
        prefs
    }

    /// Persist all preferences.
    pub fn save(prefs: &Preferences) -> ToastShiftResult<()> {
        let hkey = open_key(SETTINGS_KEY, true).ok_or_else(|| {
            ToastShiftError::Registry(format!("failed to open {}", SETTINGS_KEY))
        })?;

        let result = (|| {
            write_dword(hkey, VAL_POSITION_X, prefs.position_x)?;
            write_dword(hkey, VAL_POSITION_Y, prefs.position_y)?;
            write_dword(hkey, VAL_MONITOR_INDEX, prefs.monitor_index)?;
            write_dword(hkey, VAL_OPACITY, prefs.opacity)?;
            write_dword(hkey, VAL_CLICK_THROUGH, prefs.click_through as i32)?;
            write_dword(hkey, VAL_TEAMS_X, prefs.teams_x)?;
            write_dword(hkey, VAL_TEAMS_Y, prefs.teams_y)?;
            Ok(())
        })();

        unsafe {
            let _ = RegCloseKey(hkey);
        }
        result
    }

    /// Whether the autostart value points at anything.
    pub fn is_startup_enabled() -> bool {
        let Some(hkey) = open_key(RUN_KEY, false) else {
            return false;
        };

        let value_name = to_wide_string(RUN_VALUE);
        let mut data_size: u32 = 0;
        let mut data_type = REG_VALUE_TYPE::default();
        let rc = unsafe {
            RegQueryValueExW(
                hkey,
                PCWSTR(value_name.as_ptr()),
                None,
                Some(&mut data_type),
                None,
                Some(&mut data_size),
            )
        };

        unsafe {
            let _ = RegCloseKey(hkey);
        }
        rc.is_ok() && data_size > 0
    }

    /// Register or deregister the current executable for launch at logon.
    pub fn set_startup_enabled(enable: bool) -> ToastShiftResult<()> {
        let hkey = open_key(RUN_KEY, true)
            .ok_or_else(|| ToastShiftError::Registry(format!("failed to open {}", RUN_KEY)))?;

        let value_name = to_wide_string(RUN_VALUE);
        let result = if enable {
            let exe = std::env::current_exe()?;
            let path = to_wide_string(&exe.to_string_lossy());
            let bytes: Vec<u8> = path.iter().flat_map(|c| c.to_le_bytes()).collect();
            let rc = unsafe {
                RegSetValueExW(hkey, PCWSTR(value_name.as_ptr()), 0, REG_SZ, Some(&bytes))
            };
            if rc.is_err() {
                Err(ToastShiftError::Registry(format!(
                    "failed to write autostart value (rc={:?})",
                    rc
                )))
            } else {
                Ok(())
            }
        } else {
            let rc = unsafe { RegDeleteValueW(hkey, PCWSTR(value_name.as_ptr())) };
            // Deleting a value that was never written is fine.
            if rc.is_err() {
                warn!("Registry: autostart value not removed (rc={:?})", rc);
            }
            Ok(())
        };

        unsafe {
            let _ = RegCloseKey(hkey);
        }
        result
    }
}

#[cfg(windows)]
pub use registry::{is_startup_enabled, load, save, set_startup_enabled};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Rect;

    fn monitors() -> Vec<Monitor> {
        vec![
            Monitor { index: 0, bounds: Rect::new(0, 0, 1920, 1080), is_primary: true },
            Monitor { index: 1, bounds: Rect::new(1920, 0, 2560, 1440), is_primary: false },
        ]
    }

    #[test]
    fn fallback_anchors_near_upper_right() {
        let prefs = Preferences::fallback(1920);
        assert_eq!(prefs.position_x, 1620);
        assert_eq!(prefs.position_y, 100);
        assert_eq!(prefs.opacity, 100);
        assert!(!prefs.click_through);
    }

    #[test]
    fn select_monitor_updates_index_and_ranges_together() {
        let mut prefs = Preferences::fallback(1920);
        let ranges = prefs.select_monitor(1, &monitors());
        assert_eq!(prefs.monitor_index, 1);
        assert_eq!(ranges, SliderRanges { x_max: 2560, y_max: 1440 });
    }

    #[test]
    fn select_monitor_clamps_stale_index() {
        let mut prefs = Preferences::fallback(1920);
        let ranges = prefs.select_monitor(7, &monitors());
        assert_eq!(prefs.monitor_index, 1);
        assert_eq!(ranges.x_max, 2560);

        let ranges = prefs.select_monitor(-3, &monitors());
        assert_eq!(prefs.monitor_index, 0);
        assert_eq!(ranges, SliderRanges { x_max: 1920, y_max: 1080 });
    }

    #[test]
    fn reselecting_current_monitor_is_a_no_op_on_the_index() {
        // Callers re-apply the stored index after re-enumerating displays
        // and persist only when the value moved; an in-range index must
        // come back unchanged so that check stays quiet.
        let mut prefs = Preferences::fallback(1920);
        prefs.monitor_index = 1;
        let before = prefs.monitor_index;
        prefs.select_monitor(before, &monitors());
        assert_eq!(prefs.monitor_index, before);

        // A stale index is observably rewritten, which is what signals
        // the caller to persist the correction.
        prefs.monitor_index = 7;
        prefs.select_monitor(7, &monitors());
        assert_ne!(prefs.monitor_index, 7);
        assert_eq!(prefs.monitor_index, 1);
    }

    #[test]
    fn full_opacity_maps_to_opaque_alpha() {
        let prefs = Preferences::fallback(1920);
        assert_eq!(prefs.alpha(), 255);
    }
}
