//! Disease-name keyed registry of forecasting models.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::forecast::SeasonalModel;

/// Normalise a disease or model name for lookup.
///
/// Lower-cases, turns `_`, `-` and `/` into spaces and collapses runs of
/// whitespace, so `"COVID-19"`, `"covid_19"` and `" covid  19 "` all become
/// `"covid 19"`.
pub fn normalize_key(name: &str) -> String {
    name.to_lowercase()
        .replace(['_', '-', '/'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Models keyed by normalised disease name.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, Arc<dyn SeasonalModel>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `model` under the normalised form of `name`, replacing any
    /// previous entry.
    pub fn insert(&mut self, name: &str, model: Arc<dyn SeasonalModel>) {
        let key = normalize_key(name);
        if !key.is_empty() {
            self.models.insert(key, model);
        }
    }

    /// Register the same model under several names.
    pub fn with_shared_model<I, S>(names: I, model: Arc<dyn SeasonalModel>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.insert(name.as_ref(), Arc::clone(&model));
        }
        registry
    }

    /// Find the model for `name`.
    ///
    /// Exact normalised match first. Otherwise any registry key contained in
    /// the normalised name matches; the longest such key wins and equal
    /// lengths are broken by lexicographic order, so the result never
    /// depends on insertion order.
    pub fn lookup(&self, name: &str) -> Option<(&str, Arc<dyn SeasonalModel>)> {
        let query = normalize_key(name);
        if let Some((key, model)) = self.models.get_key_value(&query) {
            return Some((key.as_str(), Arc::clone(model)));
        }
        // BTreeMap iterates keys ascending; keep the first of the longest.
        let mut best: Option<(&String, &Arc<dyn SeasonalModel>)> = None;
        for (key, model) in &self.models {
            if !query.contains(key.as_str()) {
                continue;
            }
            if best.map_or(true, |(current, _)| key.len() > current.len()) {
                best = Some((key, model));
            }
        }
        best.map(|(key, model)| (key.as_str(), Arc::clone(model)))
    }

    pub fn keys(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}
