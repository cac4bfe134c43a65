//! Language rule registration and lookup.
//!
//! Adding a language means registering a new [`LanguageRules`] entry; nothing
//! downstream branches on the language code.

use ahash::AHashMap;
use once_cell::sync::Lazy;
use std::sync::{Arc, RwLock};

use super::cjk::CjkRules;
use super::latin::LatinRules;
use super::{Language, LanguageRules};
use crate::{Result, VocabError};

/// Registry mapping each [`Language`] to its cleanup/validation rules.
///
/// # Thread Safety
///
/// The global instance is wrapped in `Arc<RwLock<..>>`; lookups take a read lock
/// and clone the `Arc`, so rules can be used after the lock is released.
pub struct LanguageRegistry {
    rules: AHashMap<Language, Arc<dyn LanguageRules>>,
}

impl LanguageRegistry {
    /// Create a registry with the built-in rules for every supported language.
    pub fn new() -> Self {
        let mut registry = Self::new_empty();
        registry.register(Arc::new(LatinRules::english()));
        registry.register(Arc::new(LatinRules::spanish()));
        registry.register(Arc::new(LatinRules::french()));
        registry.register(Arc::new(LatinRules::german()));
        registry.register(Arc::new(CjkRules::korean()));
        registry.register(Arc::new(CjkRules::japanese()));
        registry
    }

    pub fn new_empty() -> Self {
        Self { rules: AHashMap::new() }
    }

    /// Register rules for `rules.language()`, replacing any previous entry.
    pub fn register(&mut self, rules: Arc<dyn LanguageRules>) {
        let language = rules.language();
        if self.rules.insert(language, rules).is_some() {
            tracing::debug!(language = %language, "Replaced language rules");
        }
    }

    pub fn get(&self, language: Language) -> Result<Arc<dyn LanguageRules>> {
        self.rules
            .get(&language)
            .cloned()
            .ok_or_else(|| VocabError::validation(format!("No language rules registered for '{}'", language)))
    }

    pub fn languages(&self) -> Vec<Language> {
        let mut languages: Vec<Language> = self.rules.keys().copied().collect();
        languages.sort_by_key(|l| l.code());
        languages
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global language rule registry singleton.
pub static LANGUAGE_REGISTRY: Lazy<Arc<RwLock<LanguageRegistry>>> =
    Lazy::new(|| Arc::new(RwLock::new(LanguageRegistry::new())));

/// Get the global language rule registry.
pub fn get_language_registry() -> Arc<RwLock<LanguageRegistry>> {
    LANGUAGE_REGISTRY.clone()
}
