//! Persisted UI theme identifier.
//!
//! Shares the key-value storage with the history blob; an absent or
//! unrecognized value falls back to the default rather than erroring.

use crate::storage::KvStorage;

/// Storage key holding the selected theme.
pub const THEME_KEY: &str = "truthlens-theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// Read the persisted theme; garbage or absence yields the default.
pub fn load(storage: &dyn KvStorage) -> Theme {
    storage
        .get(THEME_KEY)
        .and_then(|s| Theme::parse(&s))
        .unwrap_or_default()
}

/// Persist the theme, best-effort.
pub fn save(storage: &dyn KvStorage, theme: Theme) {
    if let Err(e) = storage.set(THEME_KEY, theme.as_str()) {
        tracing::warn!(error = %e, "failed to persist theme");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn round_trips_through_storage() {
        let storage = MemoryStorage::new();
        assert_eq!(load(&storage), Theme::Dark);
        save(&storage, Theme::Light);
        assert_eq!(load(&storage), Theme::Light);
    }

    #[test]
    fn garbage_value_falls_back_to_default() {
        let storage = MemoryStorage::new();
        storage.set(THEME_KEY, "solarized-unicorn").unwrap();
        assert_eq!(load(&storage), Theme::Dark);
    }
}
