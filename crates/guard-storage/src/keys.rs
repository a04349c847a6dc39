//! Storage key catalogue and registry.

use std::collections::BTreeMap;

/// Keys the application is known to use.
pub struct StorageKeys;

impl StorageKeys {
    /// Auth session token (protected)
    pub const TOKEN: &'static str = "token";

    /// Cached user profile JSON (protected)
    pub const USER: &'static str = "user";

    /// UI theme preference (protected)
    pub const THEME: &'static str = "theme";

    /// Cached "word of the day" payload
    pub const DAILY_WORD: &'static str = "daily_word_data_v2";

    /// Date stamp for [`Self::DAILY_WORD`]
    pub const DAILY_WORD_DATE: &'static str = "daily_word_date_v2";

    /// Autosaved dashboard draft
    pub const DASHBOARD_SENTENCE: &'static str = "dashboard_sentence";

    /// Pointer to the in-progress interview session
    pub const ACTIVE_INTERVIEW: &'static str = "activeInterviewSession";

    /// Keys that survive every cleanup and emergency clear.
    pub const PROTECTED: [&'static str; 3] = [Self::TOKEN, Self::USER, Self::THEME];
}

/// A cache entry paired with the date stamp it was written on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedCache {
    pub data_key: String,
    pub date_key: String,
}

/// Which keys the guard knows, which of them are protected, and which
/// entries cleanup may drop.
#[derive(Debug, Clone)]
pub struct KeyRegistry {
    /// key -> protected
    keys: BTreeMap<String, bool>,
    dated_caches: Vec<DatedCache>,
    scratch_keys: Vec<String>,
}

impl Default for KeyRegistry {
    fn default() -> Self {
        let mut keys = BTreeMap::new();
        for key in StorageKeys::PROTECTED {
            keys.insert(key.to_string(), true);
        }
        for key in [
            StorageKeys::DAILY_WORD,
            StorageKeys::DAILY_WORD_DATE,
            StorageKeys::DASHBOARD_SENTENCE,
            StorageKeys::ACTIVE_INTERVIEW,
        ] {
            keys.insert(key.to_string(), false);
        }

        Self {
            keys,
            dated_caches: vec![DatedCache {
                data_key: StorageKeys::DAILY_WORD.to_string(),
                date_key: StorageKeys::DAILY_WORD_DATE.to_string(),
            }],
            scratch_keys: vec![StorageKeys::DASHBOARD_SENTENCE.to_string()],
        }
    }
}

impl KeyRegistry {
    /// Register additional non-protected keys. Keys already present keep
    /// their protection flag.
    pub fn with_extra_keys<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for key in extra {
            self.keys.entry(key.into()).or_insert(false);
        }
        self
    }

    /// Registered or protected.
    pub fn is_known(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    pub fn is_protected(&self, key: &str) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }

    pub fn protected_keys(&self) -> impl Iterator<Item = &str> {
        self.keys
            .iter()
            .filter(|(_, protected)| **protected)
            .map(|(key, _)| key.as_str())
    }

    pub fn dated_caches(&self) -> &[DatedCache] {
        &self.dated_caches
    }

    pub fn scratch_keys(&self) -> &[String] {
        &self.scratch_keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_keys_are_unique() {
        let keys = [
            StorageKeys::TOKEN,
            StorageKeys::USER,
            StorageKeys::THEME,
            StorageKeys::DAILY_WORD,
            StorageKeys::DAILY_WORD_DATE,
            StorageKeys::DASHBOARD_SENTENCE,
            StorageKeys::ACTIVE_INTERVIEW,
        ];
        let unique: std::collections::HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len(), "Storage keys must be unique");
    }

    #[test]
    fn test_default_registry_protection() {
        let registry = KeyRegistry::default();

        let protected: Vec<_> = registry.protected_keys().collect();
        assert_eq!(protected, vec!["theme", "token", "user"]);

        assert!(registry.is_known(StorageKeys::ACTIVE_INTERVIEW));
        assert!(!registry.is_protected(StorageKeys::ACTIVE_INTERVIEW));
        assert!(!registry.is_known("random_extension_key"));
        assert!(!registry.is_protected("random_extension_key"));
    }

    #[test]
    fn test_extra_keys_never_change_protection() {
        let registry = KeyRegistry::default().with_extra_keys(["onboarding_seen", "token"]);

        assert!(registry.is_known("onboarding_seen"));
        assert!(!registry.is_protected("onboarding_seen"));
        assert!(registry.is_protected("token"));
    }

    #[test]
    fn test_default_cleanup_targets() {
        let registry = KeyRegistry::default();
        assert_eq!(registry.dated_caches().len(), 1);
        assert_eq!(registry.dated_caches()[0].date_key, "daily_word_date_v2");
        assert_eq!(registry.scratch_keys(), ["dashboard_sentence".to_string()]);
    }
}
