//! System tray icon and context menu for ToastShift

use anyhow::Result;
use log::info;
use windows::core::PCWSTR;
use windows::Win32::Foundation::HWND;
use windows::Win32::UI::Shell::{
    Shell_NotifyIconW, NIF_ICON, NIF_INFO, NIF_MESSAGE, NIF_TIP, NIIF_INFO, NIM_ADD, NIM_DELETE,
    NIM_MODIFY, NOTIFYICONDATAW,
};
use windows::Win32::UI::WindowsAndMessaging::{
    DestroyIcon, LoadImageW, HICON, IDI_APPLICATION, IMAGE_ICON, LR_DEFAULTSIZE, LR_SHARED,
};

use crate::app::WM_TRAY_CALLBACK;
use crate::utils::to_wide_string;

/// Tray icon identifier
const TRAY_ICON_ID: u32 = 1;

/// Context menu command: open the settings dialog
pub const CMD_SETTINGS: u32 = 1;
/// Context menu command: toggle launch-at-startup
pub const CMD_STARTUP: u32 = 2;
/// Context menu command: quit
pub const CMD_EXIT: u32 = 100;

/// System tray manager
pub struct TrayIcon {
    hwnd: HWND,
    icon: HICON,
    is_added: bool,
}

impl TrayIcon {
    /// Create and show a new tray icon owned by `hwnd`.
    pub fn new(hwnd: HWND) -> Result<Self> {
        let icon = Self::load_default_icon()?;

        let mut tray = Self {
            hwnd,
            icon,
            is_added: false,
        };

        tray.add()?;

        Ok(tray)
    }

    /// Load the default icon
    fn load_default_icon() -> Result<HICON> {
        unsafe {
            let icon = LoadImageW(
                None,
                IDI_APPLICATION,
                IMAGE_ICON,
                0,
                0,
                LR_DEFAULTSIZE | LR_SHARED,
            )?;

            Ok(HICON(icon.0))
        }
    }

    fn base_data(&self) -> NOTIFYICONDATAW {
        NOTIFYICONDATAW {
            cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
            hWnd: self.hwnd,
            uID: TRAY_ICON_ID,
            ..Default::default()
        }
    }

    /// Add the tray icon
    fn add(&mut self) -> Result<()> {
        let tooltip = to_wide_string("ToastShift - notifications, where you want them");

        let mut nid = self.base_data();
        nid.uFlags = NIF_ICON | NIF_MESSAGE | NIF_TIP;
        nid.uCallbackMessage = WM_TRAY_CALLBACK;
        nid.hIcon = self.icon;

        let tooltip_len = tooltip.len().min(nid.szTip.len());
        nid.szTip[..tooltip_len].copy_from_slice(&tooltip[..tooltip_len]);

        unsafe {
            if !Shell_NotifyIconW(NIM_ADD, &nid).as_bool() {
                return Err(anyhow::anyhow!("Failed to add tray icon"));
            }
        }

        self.is_added = true;
        info!("Tray icon added");

        Ok(())
    }

    /// Remove the tray icon
    fn remove(&mut self) -> Result<()> {
        if !self.is_added {
            return Ok(());
        }

        let nid = self.base_data();

        unsafe {
            if !Shell_NotifyIconW(NIM_DELETE, &nid).as_bool() {
                return Err(anyhow::anyhow!("Failed to remove tray icon"));
            }
        }

        self.is_added = false;
        info!("Tray icon removed");

        Ok(())
    }

}

/// Show a balloon from the tray icon owned by `hwnd`.
///
/// The icon is addressed by its owning window and id, so this works from
/// contexts that do not hold the [`TrayIcon`] itself. Used by the settings
/// dialog's "Test notification" button so the user can check their placement
/// without waiting for a real toast.
pub fn show_balloon_for(hwnd: HWND, title: &str, text: &str) -> Result<()> {
    let mut nid = NOTIFYICONDATAW {
        cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
        hWnd: hwnd,
        uID: TRAY_ICON_ID,
        uFlags: NIF_INFO,
        dwInfoFlags: NIIF_INFO,
        ..Default::default()
    };

    let title = to_wide_string(title);
    let text = to_wide_string(text);
    let title_len = title.len().min(nid.szInfoTitle.len());
    let text_len = text.len().min(nid.szInfo.len());
    nid.szInfoTitle[..title_len].copy_from_slice(&title[..title_len]);
    nid.szInfo[..text_len].copy_from_slice(&text[..text_len]);

    unsafe {
        if !Shell_NotifyIconW(NIM_MODIFY, &nid).as_bool() {
            return Err(anyhow::anyhow!("Failed to show balloon notification"));
        }
    }

    Ok(())
}

impl Drop for TrayIcon {
    fn drop(&mut self) {
        let _ = self.remove();
        unsafe {
            if !self.icon.is_invalid() {
                let _ = DestroyIcon(self.icon);
            }
        }
    }
}

/// Tray context menu
pub struct TrayMenu {
    items: Vec<TrayMenuItem>,
}

/// Tray menu item
pub struct TrayMenuItem {
    pub id: u32,
    pub label: String,
    pub is_separator: bool,
    pub is_checked: bool,
}

impl TrayMenu {
    /// Build the standard menu. `startup_enabled` drives the check mark on
    /// the launch-at-startup entry.
    pub fn new(startup_enabled: bool) -> Self {
        Self {
            items: vec![
                TrayMenuItem {
                    id: CMD_SETTINGS,
                    label: "Settings...".to_string(),
                    is_separator: false,
                    is_checked: false,
                },
                TrayMenuItem {
                    id: CMD_STARTUP,
                    label: "Launch at startup".to_string(),
                    is_separator: false,
                    is_checked: startup_enabled,
                },
                TrayMenuItem {
                    id: 0,
                    label: String::new(),
                    is_separator: true,
                    is_checked: false,
                },
                TrayMenuItem {
                    id: CMD_EXIT,
                    label: "Exit".to_string(),
                    is_separator: false,
                    is_checked: false,
                },
            ],
        }
    }

    /// Show the context menu at the cursor and return the chosen command.
    pub fn show(&self, hwnd: HWND) -> Option<u32> {
        use windows::Win32::Foundation::POINT;
        use windows::Win32::UI::WindowsAndMessaging::{
            CreatePopupMenu, DestroyMenu, GetCursorPos, InsertMenuW, SetForegroundWindow,
            TrackPopupMenu, MF_CHECKED, MF_SEPARATOR, MF_STRING, TPM_RETURNCMD, TPM_RIGHTBUTTON,
        };

        unsafe {
            let menu = CreatePopupMenu().ok()?;

            for item in &self.items {
                let mut flags = if item.is_separator {
                    MF_SEPARATOR
                } else {
                    MF_STRING
                };

                if item.is_checked {
                    flags |= MF_CHECKED;
                }

                if item.is_separator {
                    InsertMenuW(menu, u32::MAX, flags, 0, PCWSTR::null()).ok()?;
                } else {
                    let label = to_wide_string(&item.label);
                    InsertMenuW(
                        menu,
                        u32::MAX,
                        flags,
                        item.id as usize,
                        PCWSTR::from_raw(label.as_ptr()),
                    )
                    .ok()?;
                }
            }

            let mut pt = POINT::default();
            GetCursorPos(&mut pt).ok()?;

            let _ = SetForegroundWindow(hwnd);

            let cmd = TrackPopupMenu(
                menu,
                TPM_RIGHTBUTTON | TPM_RETURNCMD,
                pt.x,
                pt.y,
                0,
                hwnd,
                None,
            );

            DestroyMenu(menu).ok()?;

            if cmd.as_bool() {
                Some(cmd.0 as u32)
            } else {
                None
            }
        }
    }
}
