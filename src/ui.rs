//! Native Win32 settings dialog
//!
//! A small fixed-layout window with trackbars for the position offsets and
//! opacity, a monitor picker, and a click-through checkbox. The dialog is
//! created once at startup and only ever hidden, never destroyed, so slider
//! state survives close/reopen. Every control change writes straight through
//! to the registry and the snapshot shared with the poll loop.

use anyhow::Result;
use log::{debug, info, warn};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use windows::core::PCWSTR;
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Controls::{TBM_GETPOS, TBM_SETPOS, TBM_SETRANGEMAX, TBM_SETRANGEMIN};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, GetSystemMetrics, LoadCursorW, RegisterClassExW,
    SendMessageW, ShowWindow, BM_GETCHECK, BM_SETCHECK, BN_CLICKED, BS_AUTOCHECKBOX,
    CBN_SELCHANGE, CBS_DROPDOWNLIST, CB_ADDSTRING, CB_GETCURSEL, CB_RESETCONTENT, CB_SETCURSEL,
    CS_HREDRAW, CS_VREDRAW, HMENU, IDC_ARROW, SM_CXSCREEN, SM_CYSCREEN, SW_HIDE, SW_SHOW,
    WINDOW_EX_STYLE, WM_CLOSE, WM_COMMAND, WM_CREATE, WM_DISPLAYCHANGE, WM_HSCROLL,
    WNDCLASSEXW, WS_CAPTION, WS_CHILD, WS_OVERLAPPED, WS_SYSMENU, WS_TABSTOP, WS_VISIBLE,
};

use crate::monitor::{self, Monitor};
use crate::settings::{self, SliderRanges};
use crate::utils::{to_pcwstr, to_wide_string};
use crate::{mutator, state, tray};

const DIALOG_CLASS: &str = "ToastShiftSettingsClass";
const DIALOG_TITLE: &str = "ToastShift Settings";
const DIALOG_WIDTH: i32 = 356;
const DIALOG_HEIGHT: i32 = 520;

/// Sliders reach this far past the left/top edge so a toast can be tucked
/// mostly off-screen.
const SLIDER_MIN: i32 = -500;

const ID_SLIDER_X: i32 = 1001;
const ID_SLIDER_Y: i32 = 1002;
const ID_SLIDER_OPACITY: i32 = 1003;
const ID_SLIDER_TEAMS_X: i32 = 1004;
const ID_SLIDER_TEAMS_Y: i32 = 1005;
const ID_COMBO_MONITOR: i32 = 1006;
const ID_CHECK_CLICK_THROUGH: i32 = 1007;
const ID_BTN_RESET: i32 = 1008;
const ID_BTN_TEST: i32 = 1009;

/// Raw handles of the child controls, filled in during WM_CREATE.
#[derive(Default, Clone, Copy)]
struct Controls {
    slider_x: isize,
    slider_y: isize,
    slider_opacity: isize,
    slider_teams_x: isize,
    slider_teams_y: isize,
    combo_monitor: isize,
    check_click_through: isize,
}

static CONTROLS: OnceCell<Mutex<Controls>> = OnceCell::new();

fn controls() -> Controls {
    *CONTROLS.get_or_init(|| Mutex::new(Controls::default())).lock()
}

fn hwnd(raw: isize) -> HWND {
    mutator::hwnd_from_raw(raw)
}

/// Create the (initially hidden) settings dialog.
pub fn create_dialog() -> Result<HWND> {
    let class_name = to_wide_string(DIALOG_CLASS);
    let title = to_wide_string(DIALOG_TITLE);

    unsafe {
        let hinstance = GetModuleHandleW(None)?;

        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(dialog_proc),
            hInstance: hinstance.into(),
            hCursor: LoadCursorW(None, IDC_ARROW)?,
            lpszClassName: to_pcwstr(&class_name),
            hbrBackground: windows::Win32::Graphics::Gdi::HBRUSH(
                (windows::Win32::UI::WindowsAndMessaging::COLOR_WINDOW.0 as isize + 1)
                    as *mut std::ffi::c_void,
            ),
            ..Default::default()
        };

        let atom = RegisterClassExW(&wc);
        if atom == 0 {
            return Err(anyhow::anyhow!("Failed to register settings dialog class"));
        }

        let x = (GetSystemMetrics(SM_CXSCREEN) - DIALOG_WIDTH) / 2;
        let y = (GetSystemMetrics(SM_CYSCREEN) - DIALOG_HEIGHT) / 2;

        let dialog = CreateWindowExW(
            WINDOW_EX_STYLE(0),
            to_pcwstr(&class_name),
            to_pcwstr(&title),
            WS_OVERLAPPED | WS_CAPTION | WS_SYSMENU,
            x,
            y,
            DIALOG_WIDTH,
            DIALOG_HEIGHT,
            None,
            None,
            hinstance,
            None,
        )?;

        if dialog.0.is_null() {
            return Err(anyhow::anyhow!("Failed to create settings dialog"));
        }

        info!("Settings dialog created");
        Ok(dialog)
    }
}

/// Show and foreground the dialog.
pub fn show_dialog(dialog: HWND) {
    unsafe {
        let _ = ShowWindow(dialog, SW_SHOW);
        let _ = windows::Win32::UI::WindowsAndMessaging::SetForegroundWindow(dialog);
    }
}

fn control_id(id: i32) -> HMENU {
    HMENU(id as usize as *mut std::ffi::c_void)
}

unsafe fn create_label(parent: HWND, text: &str, x: i32, y: i32) {
    let class = to_wide_string("STATIC");
    let text = to_wide_string(text);
    let _ = CreateWindowExW(
        WINDOW_EX_STYLE(0),
        to_pcwstr(&class),
        to_pcwstr(&text),
        WS_CHILD | WS_VISIBLE,
        x,
        y,
        320,
        18,
        parent,
        None,
        None,
        None,
    );
}

unsafe fn create_slider(parent: HWND, id: i32, y: i32) -> isize {
    let class = to_wide_string("msctls_trackbar32");
    match CreateWindowExW(
        WINDOW_EX_STYLE(0),
        to_pcwstr(&class),
        PCWSTR::null(),
        windows::Win32::UI::WindowsAndMessaging::WINDOW_STYLE(
            (WS_CHILD | WS_VISIBLE | WS_TABSTOP).0,
        ),
        10,
        y,
        320,
        30,
        parent,
        control_id(id),
        None,
        None,
    ) {
        Ok(h) => h.0 as isize,
        Err(e) => {
            warn!("Failed to create trackbar {}: {}", id, e);
            0
        }
    }
}

unsafe fn set_slider_range(slider: isize, min: i32, max: i32) {
    SendMessageW(hwnd(slider), TBM_SETRANGEMIN, WPARAM(1), LPARAM(min as isize));
    SendMessageW(hwnd(slider), TBM_SETRANGEMAX, WPARAM(1), LPARAM(max as isize));
}

unsafe fn set_slider_pos(slider: isize, pos: i32) {
    SendMessageW(hwnd(slider), TBM_SETPOS, WPARAM(1), LPARAM(pos as isize));
}

unsafe fn slider_pos(slider: isize) -> i32 {
    SendMessageW(hwnd(slider), TBM_GETPOS, WPARAM(0), LPARAM(0)).0 as i32
}

unsafe fn create_controls(dialog: HWND) {
    let button_class = to_wide_string("BUTTON");
    let combo_class = to_wide_string("COMBOBOX");

    create_label(dialog, "Horizontal position", 10, 10);
    let slider_x = create_slider(dialog, ID_SLIDER_X, 30);
    create_label(dialog, "Vertical position", 10, 70);
    let slider_y = create_slider(dialog, ID_SLIDER_Y, 90);
    create_label(dialog, "Opacity", 10, 130);
    let slider_opacity = create_slider(dialog, ID_SLIDER_OPACITY, 150);
    create_label(dialog, "Teams: horizontal position", 10, 190);
    let slider_teams_x = create_slider(dialog, ID_SLIDER_TEAMS_X, 210);
    create_label(dialog, "Teams: vertical position", 10, 250);
    let slider_teams_y = create_slider(dialog, ID_SLIDER_TEAMS_Y, 270);

    create_label(dialog, "Monitor", 10, 310);
    let combo_monitor = CreateWindowExW(
        WINDOW_EX_STYLE(0),
        to_pcwstr(&combo_class),
        PCWSTR::null(),
        windows::Win32::UI::WindowsAndMessaging::WINDOW_STYLE(
            (WS_CHILD | WS_VISIBLE | WS_TABSTOP).0 | CBS_DROPDOWNLIST as u32,
        ),
        10,
        330,
        320,
        200,
        dialog,
        control_id(ID_COMBO_MONITOR),
        None,
        None,
    )
    .map(|h| h.0 as isize)
    .unwrap_or_default();

    let check_label = to_wide_string("Click-through (mouse ignores the toast)");
    let check_click_through = CreateWindowExW(
        WINDOW_EX_STYLE(0),
        to_pcwstr(&button_class),
        to_pcwstr(&check_label),
        windows::Win32::UI::WindowsAndMessaging::WINDOW_STYLE(
            (WS_CHILD | WS_VISIBLE | WS_TABSTOP).0 | BS_AUTOCHECKBOX as u32,
        ),
        10,
        365,
        320,
        22,
        dialog,
        control_id(ID_CHECK_CLICK_THROUGH),
        None,
        None,
    )
    .map(|h| h.0 as isize)
    .unwrap_or_default();

    let reset_label = to_wide_string("Reset position");
    let _ = CreateWindowExW(
        WINDOW_EX_STYLE(0),
        to_pcwstr(&button_class),
        to_pcwstr(&reset_label),
        WS_CHILD | WS_VISIBLE | WS_TABSTOP,
        10,
        400,
        155,
        28,
        dialog,
        control_id(ID_BTN_RESET),
        None,
        None,
    );

    let test_label = to_wide_string("Test notification");
    let _ = CreateWindowExW(
        WINDOW_EX_STYLE(0),
        to_pcwstr(&button_class),
        to_pcwstr(&test_label),
        WS_CHILD | WS_VISIBLE | WS_TABSTOP,
        175,
        400,
        155,
        28,
        dialog,
        control_id(ID_BTN_TEST),
        None,
        None,
    );

    let ctrls = Controls {
        slider_x,
        slider_y,
        slider_opacity,
        slider_teams_x,
        slider_teams_y,
        combo_monitor,
        check_click_through,
    };
    *CONTROLS.get_or_init(|| Mutex::new(Controls::default())).lock() = ctrls;
}

/// Refill every control from the shared preferences and current monitors.
unsafe fn populate_controls() {
    let Some(shared) = state::shared() else { return };
    let monitors = monitor::enumerate_monitors();

    let (prefs, ranges) = {
        let mut guard = shared.write();
        let index = guard.prefs.monitor_index;
        let ranges = guard.prefs.select_monitor(index, &monitors);
        // A stale index (monitor unplugged since last run) was just clamped;
        // write the corrected value back so the registry agrees with what
        // the combo shows.
        if guard.prefs.monitor_index != index {
            if let Err(e) = settings::save(&guard.prefs) {
                warn!("Failed to persist clamped monitor index: {}", e);
            }
        }
        (guard.prefs.clone(), ranges)
    };

    let c = controls();

    set_slider_range(c.slider_x, SLIDER_MIN, ranges.x_max);
    set_slider_pos(c.slider_x, prefs.position_x);
    set_slider_range(c.slider_y, SLIDER_MIN, ranges.y_max);
    set_slider_pos(c.slider_y, prefs.position_y);
    set_slider_range(c.slider_opacity, 0, 100);
    set_slider_pos(c.slider_opacity, prefs.opacity);
    set_slider_range(c.slider_teams_x, SLIDER_MIN, ranges.x_max);
    set_slider_pos(c.slider_teams_x, prefs.teams_x);
    set_slider_range(c.slider_teams_y, SLIDER_MIN, ranges.y_max);
    set_slider_pos(c.slider_teams_y, prefs.teams_y);

    SendMessageW(hwnd(c.combo_monitor), CB_RESETCONTENT, WPARAM(0), LPARAM(0));
    for m in &monitors {
        let label = format!(
            "Monitor {} ({}x{}){}",
            m.index + 1,
            m.bounds.width,
            m.bounds.height,
            if m.is_primary { " - primary" } else { "" }
        );
        let label = to_wide_string(&label);
        SendMessageW(
            hwnd(c.combo_monitor),
            CB_ADDSTRING,
            WPARAM(0),
            LPARAM(label.as_ptr() as isize),
        );
    }
    SendMessageW(
        hwnd(c.combo_monitor),
        CB_SETCURSEL,
        WPARAM(prefs.monitor_index as usize),
        LPARAM(0),
    );

    SendMessageW(
        hwnd(c.check_click_through),
        BM_SETCHECK,
        WPARAM(prefs.click_through as usize),
        LPARAM(0),
    );
}

fn persist<F>(update: F)
where
    F: FnOnce(&mut crate::settings::Preferences, &[Monitor]) -> Option<SliderRanges>,
{
    let Some(shared) = state::shared() else { return };
    let monitors = monitor::enumerate_monitors();

    let (prefs, ranges) = {
        let mut guard = shared.write();
        let ranges = update(&mut guard.prefs, &monitors);
        if let Err(e) = settings::save(&guard.prefs) {
            warn!("Failed to persist settings: {}", e);
        }
        (guard.prefs.clone(), ranges)
    };

    if let Some(ranges) = ranges {
        let c = controls();
        unsafe {
            set_slider_range(c.slider_x, SLIDER_MIN, ranges.x_max);
            set_slider_range(c.slider_y, SLIDER_MIN, ranges.y_max);
            set_slider_range(c.slider_teams_x, SLIDER_MIN, ranges.x_max);
            set_slider_range(c.slider_teams_y, SLIDER_MIN, ranges.y_max);
        }
    }

    // Live preview on whichever toast is currently up.
    if let Some(raw) = shared.read().last_toast {
        mutator::apply_opacity(hwnd(raw), prefs.alpha());
        mutator::set_click_through(hwnd(raw), prefs.click_through);
    }
}

unsafe fn on_slider_changed(slider: HWND) {
    let c = controls();
    let raw = slider.0 as isize;

    if raw == c.slider_x {
        let pos = slider_pos(c.slider_x);
        persist(|prefs, _| {
            prefs.position_x = pos;
            None
        });
    } else if raw == c.slider_y {
        let pos = slider_pos(c.slider_y);
        persist(|prefs, _| {
            prefs.position_y = pos;
            None
        });
    } else if raw == c.slider_opacity {
        let pos = slider_pos(c.slider_opacity);
        persist(|prefs, _| {
            prefs.opacity = pos;
            None
        });
    } else if raw == c.slider_teams_x {
        let pos = slider_pos(c.slider_teams_x);
        persist(|prefs, _| {
            prefs.teams_x = pos;
            None
        });
    } else if raw == c.slider_teams_y {
        let pos = slider_pos(c.slider_teams_y);
        persist(|prefs, _| {
            prefs.teams_y = pos;
            None
        });
    }
}

unsafe fn on_command(wparam: WPARAM) {
    let id = (wparam.0 & 0xFFFF) as i32;
    let notification = ((wparam.0 >> 16) & 0xFFFF) as u32;

    match id {
        ID_COMBO_MONITOR if notification == CBN_SELCHANGE => {
            let c = controls();
            let index =
                SendMessageW(hwnd(c.combo_monitor), CB_GETCURSEL, WPARAM(0), LPARAM(0)).0 as i32;
            if index >= 0 {
                debug!("Monitor {} selected", index);
                persist(|prefs, monitors| Some(prefs.select_monitor(index, monitors)));
            }
        }
        ID_CHECK_CLICK_THROUGH if notification == BN_CLICKED => {
            let c = controls();
            let checked = SendMessageW(
                hwnd(c.check_click_through),
                BM_GETCHECK,
                WPARAM(0),
                LPARAM(0),
            )
            .0 != 0;
            persist(|prefs, _| {
                prefs.click_through = checked;
                None
            });
        }
        ID_BTN_RESET if notification == BN_CLICKED => {
            info!("Resetting preferences to defaults");
            let primary_width = monitor::primary_bounds(&monitor::enumerate_monitors())
                .map(|b| b.width)
                .unwrap_or(1920);
            persist(move |prefs, monitors| {
                *prefs = crate::settings::Preferences::fallback(primary_width);
                Some(prefs.select_monitor(0, monitors))
            });
            populate_controls();
        }
        ID_BTN_TEST if notification == BN_CLICKED => {
            if let Some(tray_hwnd) = state::tray_hwnd() {
                if let Err(e) = tray::show_balloon_for(
                    tray_hwnd,
                    "ToastShift",
                    "This is where your notifications will appear.",
                ) {
                    warn!("Test notification failed: {}", e);
                }
            }
        }
        _ => {}
    }
}

/// Window procedure for the settings dialog.
pub unsafe extern "system" fn dialog_proc(
    dialog: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_CREATE => {
            create_controls(dialog);
            populate_controls();
            LRESULT(0)
        }
        WM_HSCROLL => {
            on_slider_changed(HWND(lparam.0 as *mut std::ffi::c_void));
            LRESULT(0)
        }
        WM_COMMAND => {
            on_command(wparam);
            LRESULT(0)
        }
        WM_DISPLAYCHANGE => {
            info!("Display configuration changed, refreshing monitor list");
            populate_controls();
            persist(|prefs, monitors| {
                let index = prefs.monitor_index;
                Some(prefs.select_monitor(index, monitors))
            });
            LRESULT(0)
        }
        WM_CLOSE => {
            // Hide instead of destroy so the dialog can be reopened cheaply.
            let _ = ShowWindow(dialog, SW_HIDE);
            LRESULT(0)
        }
        _ => DefWindowProcW(dialog, msg, wparam, lparam),
    }
}
