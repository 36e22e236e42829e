//! Application shell: single-instance guard, tray host window, lifecycle

use anyhow::Result;
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::sync::Arc;
use windows::Win32::Foundation::{
    CloseHandle, GetLastError, ERROR_ALREADY_EXISTS, HANDLE, HWND, LPARAM, LRESULT, WPARAM,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::CreateMutexW;
use windows::Win32::UI::Controls::{InitCommonControlsEx, ICC_BAR_CLASSES, INITCOMMONCONTROLSEX};
use windows::Win32::UI::HiDpi::{
    SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW, IsWindowVisible,
    LoadCursorW, PostQuitMessage, RegisterClassExW, ShowWindow, TranslateMessage, IDC_ARROW,
    MB_ICONWARNING, MSG, SW_HIDE, WINDOW_EX_STYLE, WM_DESTROY, WM_LBUTTONUP, WM_RBUTTONUP,
    WM_USER, WNDCLASSEXW, WS_OVERLAPPED,
};

use crate::error::{ToastShiftError, ToastShiftResult};
use crate::poller::{self, PollHandle, SharedState};
use crate::settings;
use crate::state;
use crate::tray::{TrayIcon, TrayMenu, CMD_EXIT, CMD_SETTINGS, CMD_STARTUP};
use crate::utils::{to_pcwstr, to_wide_string};
use crate::{monitor, mutator, ui};

/// Tray callback message delivered to the tray host window.
pub const WM_TRAY_CALLBACK: u32 = WM_USER + 3;

const TRAY_WINDOW_CLASS: &str = "ToastShiftTrayClass";
const MUTEX_NAME: &str = "ToastShiftSingleInstance";

/// Named-mutex guard enforcing one ToastShift per session.
pub struct InstanceLock {
    handle: HANDLE,
}

impl InstanceLock {
    /// Try to become the single instance. Returns `None` (after warning the
    /// user) when another instance already holds the mutex.
    pub fn acquire() -> ToastShiftResult<Option<Self>> {
        let name = to_wide_string(MUTEX_NAME);
        let handle = unsafe { CreateMutexW(None, true, to_pcwstr(&name)) }?;

        if unsafe { GetLastError() } == ERROR_ALREADY_EXISTS {
            unsafe {
                let _ = CloseHandle(handle);
            }
            warn!("Another instance is already running");
            crate::utils::alert(
                "ToastShift",
                "An instance of the application is already running.",
                MB_ICONWARNING,
            );
            return Ok(None);
        }

        Ok(Some(Self { handle }))
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.handle);
        }
    }
}

/// Main application state
pub struct Application {
    tray_hwnd: HWND,
    dialog_hwnd: HWND,
    tray_icon: Option<TrayIcon>,
    poller: PollHandle,
    shared: Arc<RwLock<SharedState>>,
}

impl Application {
    /// Create a new application instance
    pub fn new(toast_title: String) -> Result<Self> {
        info!("Initializing ToastShift");

        unsafe {
            let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
            let icc = INITCOMMONCONTROLSEX {
                dwSize: std::mem::size_of::<INITCOMMONCONTROLSEX>() as u32,
                dwICC: ICC_BAR_CLASSES,
            };
            let _ = InitCommonControlsEx(&icc);
        }

        let monitors = monitor::enumerate_monitors();
        let primary_width = monitor::primary_bounds(&monitors)
            .map(|b| b.width)
            .unwrap_or(1920);
        let prefs = settings::load(primary_width);
        info!("Loaded preferences: {:?}", prefs);

        let shared = Arc::new(RwLock::new(SharedState::new(prefs)));
        state::set_shared(shared.clone());

        let tray_hwnd = Self::create_tray_window()?;
        state::set_tray_hwnd(tray_hwnd);

        // Tray icon (optional, might fail)
        let tray_icon = match TrayIcon::new(tray_hwnd) {
            Ok(tray) => Some(tray),
            Err(e) => {
                warn!("Failed to create tray icon: {}", e);
                None
            }
        };

        let dialog_hwnd = ui::create_dialog()?;
        state::set_dialog_hwnd(dialog_hwnd);

        let poller = poller::spawn(shared.clone(), toast_title)?;

        Ok(Self {
            tray_hwnd,
            dialog_hwnd,
            tray_icon,
            poller,
            shared,
        })
    }

    /// Hidden window that owns the tray icon and receives its callbacks.
    fn create_tray_window() -> Result<HWND> {
        let class_name = to_wide_string(TRAY_WINDOW_CLASS);

        unsafe {
            let hinstance = GetModuleHandleW(None)?;

            let wc = WNDCLASSEXW {
                cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                lpfnWndProc: Some(tray_window_proc),
                hInstance: hinstance.into(),
                hCursor: LoadCursorW(None, IDC_ARROW)?,
                lpszClassName: to_pcwstr(&class_name),
                ..Default::default()
            };

            let atom = RegisterClassExW(&wc);
            if atom == 0 {
                return Err(ToastShiftError::WindowCreation(
                    "failed to register tray window class".to_string(),
                )
                .into());
            }

            let title = to_wide_string("ToastShift");
            let hwnd = CreateWindowExW(
                WINDOW_EX_STYLE(0),
                to_pcwstr(&class_name),
                to_pcwstr(&title),
                WS_OVERLAPPED,
                0,
                0,
                0,
                0,
                None,
                None,
                hinstance,
                None,
            )?;

            if hwnd.0.is_null() {
                return Err(ToastShiftError::WindowCreation(
                    "failed to create tray window".to_string(),
                )
                .into());
            }

            Ok(hwnd)
        }
    }

    /// Run the message loop until the user exits from the tray menu.
    pub fn run(&mut self) -> Result<()> {
        info!("Entering main loop");

        unsafe {
            let mut msg = MSG::default();
            while GetMessageW(&mut msg, None, 0, 0).as_bool() {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }

        info!("Main loop ended");
        Ok(())
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        info!("Cleaning up");

        self.poller.stop();

        // Leave whatever toast we last touched as the shell expects it.
        if let Some(raw) = self.shared.read().last_toast {
            let hwnd = mutator::hwnd_from_raw(raw);
            mutator::restore_opacity(hwnd);
            mutator::set_click_through(hwnd, false);
        }

        // Tray icon removed by TrayIcon::drop
        self.tray_icon.take();

        unsafe {
            let _ = DestroyWindow(self.dialog_hwnd);
            if !self.tray_hwnd.0.is_null() {
                let _ = DestroyWindow(self.tray_hwnd);
            }
        }
    }
}

fn toggle_dialog() {
    let Some(dialog) = state::dialog_hwnd() else { return };
    unsafe {
        if IsWindowVisible(dialog).as_bool() {
            let _ = ShowWindow(dialog, SW_HIDE);
        } else {
            ui::show_dialog(dialog);
        }
    }
}

fn on_tray_callback(hwnd: HWND, lparam: LPARAM) {
    let event = (lparam.0 & 0xFFFF) as u32;
    match event {
        WM_LBUTTONUP => {
            debug!("Tray icon clicked");
            toggle_dialog();
        }
        WM_RBUTTONUP => {
            let menu = TrayMenu::new(settings::is_startup_enabled());
            match menu.show(hwnd) {
                Some(CMD_SETTINGS) => {
                    if let Some(dialog) = state::dialog_hwnd() {
                        ui::show_dialog(dialog);
                    }
                }
                Some(CMD_STARTUP) => {
                    let enable = !settings::is_startup_enabled();
                    info!("Launch at startup -> {}", enable);
                    if let Err(e) = settings::set_startup_enabled(enable) {
                        warn!("Failed to update startup registration: {}", e);
                    }
                }
                Some(CMD_EXIT) => {
                    info!("Exit requested from tray menu");
                    unsafe {
                        let _ = DestroyWindow(hwnd);
                    }
                }
                _ => {}
            }
        }
        _ => {}
    }
}

/// Window procedure for the hidden tray host window.
unsafe extern "system" fn tray_window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_TRAY_CALLBACK => {
            on_tray_callback(hwnd, lparam);
            LRESULT(0)
        }
        WM_DESTROY => {
            PostQuitMessage(0);
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
