use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::holding::UNIVERSAL_CATEGORY;

/// Category name → member tickers, in portfolio order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryIndex {
    groups: BTreeMap<String, Vec<String>>,
}

impl CategoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `symbol` to `category`, creating the category on first use.
    pub fn push(&mut self, category: &str, symbol: &str) {
        self.groups
            .entry(category.to_string())
            .or_default()
            .push(symbol.to_string());
    }

    /// Members of a category; empty for unknown names.
    pub fn members(&self, category: &str) -> &[String] {
        self.groups.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every ticker of the portfolio.
    pub fn universal(&self) -> &[String] {
        self.members(UNIVERSAL_CATEGORY)
    }

    /// Category names in sorted order (the universal tag sorts first).
    pub fn names(&self) -> Vec<&str> {
        self.groups.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
