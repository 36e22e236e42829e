//! Localized toast title resolution
//!
//! The Action Center toast window can only be found by its title, and that
//! title is localized by Windows. The built-in table covers the languages we
//! have verified titles for; anything else can be supplied through a small
//! TOML file in the user's config directory without rebuilding.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Deserialize;

use crate::error::{ToastShiftError, ToastShiftResult};

/// Known toast window titles keyed by two-letter language code.
const BUILTIN_TITLES: &[(&str, &str)] = &[
    ("en", "New notification"),
    ("fr", "Nouvelle notification"),
    ("es", "Nueva notificación"),
    ("ja", "新しい通知"),
    ("pt", "Nova notificação"),
    ("de", "Neue Benachrichtigung"),
    ("zh", "新通知"),
    ("it", "Nuova notifica"),
    ("pl", "Nowe powiadomienie"),
    ("sv", "Ny avisering"),
    ("da", "Ny meddelelse"),
    ("no", "Ny melding"),
];

/// User-supplied additions to the locale table.
#[derive(Debug, Default, Deserialize)]
struct LocaleOverrides {
    #[serde(default)]
    locales: HashMap<String, String>,
}

/// Language-code to toast-title lookup table.
#[derive(Debug, Clone)]
pub struct LocaleTable {
    titles: HashMap<String, String>,
}

impl LocaleTable {
    /// The compiled-in table.
    pub fn builtin() -> Self {
        let titles = BUILTIN_TITLES
            .iter()
            .map(|(code, title)| (code.to_string(), title.to_string()))
            .collect();
        Self { titles }
    }

    /// Built-in table merged with the user override file, if present.
    pub fn load() -> Self {
        let mut table = Self::builtin();
        let path = Self::overrides_path();
        if path.exists() {
            match table.merge_overrides(&path) {
                Ok(added) => info!("Loaded {} locale override(s) from {:?}", added, path),
                Err(e) => warn!("Ignoring locale overrides in {:?}: {}", path, e),
            }
        }
        table
    }

    /// Path of the optional override file.
    pub fn overrides_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("toastshift")
            .join("locales.toml")
    }

    /// Merge entries from a TOML override file into the table.
    ///
    /// Returns the number of entries read. Override entries win over the
    /// built-in titles, so a wrong built-in can be corrected in place.
    pub fn merge_overrides(&mut self, path: &Path) -> ToastShiftResult<usize> {
        let contents = std::fs::read_to_string(path)?;
        let overrides: LocaleOverrides = toml::from_str(&contents)
            .map_err(|e| ToastShiftError::Locale(format!("invalid override file: {}", e)))?;

        let count = overrides.locales.len();
        for (code, title) in overrides.locales {
            self.titles.insert(code.to_lowercase(), title);
        }
        Ok(count)
    }

    /// Toast title for a language code, if the language is supported.
    pub fn title_for(&self, code: &str) -> Option<&str> {
        self.titles.get(&code.to_lowercase()).map(String::as_str)
    }
}

/// Two-letter language code of the current user locale, e.g. "en".
#[cfg(windows)]
pub fn system_language_code() -> String {
    use windows::Win32::Globalization::GetUserDefaultLocaleName;

    // LOCALE_NAME_MAX_LENGTH is 85
    let mut buf = [0u16; 85];
    let len = unsafe { GetUserDefaultLocaleName(&mut buf) };
    if len <= 0 {
        warn!("GetUserDefaultLocaleName failed, assuming \"en\"");
        return "en".to_string();
    }

    let name = crate::utils::wide_to_string(&buf);
    name.split('-').next().unwrap_or("en").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_covers_known_languages() {
        let table = LocaleTable::builtin();
        assert_eq!(table.title_for("en"), Some("New notification"));
        assert_eq!(table.title_for("DE"), Some("Neue Benachrichtigung"));
        assert_eq!(table.title_for("ja"), Some("新しい通知"));
    }

    #[test]
    fn unknown_language_is_unsupported() {
        let table = LocaleTable::builtin();
        assert_eq!(table.title_for("xx"), None);
        assert_eq!(table.title_for(""), None);
    }

    #[test]
    fn overrides_add_and_replace_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locales.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[locales]").unwrap();
        writeln!(file, "fi = \"Uusi ilmoitus\"").unwrap();
        writeln!(file, "en = \"New banner\"").unwrap();

        let mut table = LocaleTable::builtin();
        let added = table.merge_overrides(&path).unwrap();
        assert_eq!(added, 2);
        assert_eq!(table.title_for("fi"), Some("Uusi ilmoitus"));
        assert_eq!(table.title_for("en"), Some("New banner"));
    }

    #[test]
    fn malformed_override_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locales.toml");
        std::fs::write(&path, "locales = 3").unwrap();

        let mut table = LocaleTable::builtin();
        assert!(table.merge_overrides(&path).is_err());
        // table untouched on failure
        assert_eq!(table.title_for("en"), Some("New notification"));
    }
}
