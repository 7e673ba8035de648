use serde::{Deserialize, Serialize};

use super::holding::Holding;

/// The set of holdings being viewed, in file order.
///
/// Symbols are unique: inserting a holding whose symbol already exists
/// replaces the previous entry in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    holdings: Vec<Holding>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a holding. Returns the replaced holding, if any.
    pub fn insert(&mut self, holding: Holding) -> Option<Holding> {
        match self.position(&holding.symbol) {
            Some(idx) => Some(std::mem::replace(&mut self.holdings[idx], holding)),
            None => {
                self.holdings.push(holding);
                None
            }
        }
    }

    pub fn remove(&mut self, symbol: &str) -> Option<Holding> {
        let idx = self.position(symbol)?;
        Some(self.holdings.remove(idx))
    }

    pub fn get(&self, symbol: &str) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.symbol == symbol)
    }

    pub fn get_mut(&mut self, symbol: &str) -> Option<&mut Holding> {
        self.holdings.iter_mut().find(|h| h.symbol == symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.position(symbol).is_some()
    }

    pub fn symbols(&self) -> Vec<String> {
        self.holdings.iter().map(|h| h.symbol.clone()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Holding> {
        self.holdings.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Holding> {
        self.holdings.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    fn position(&self, symbol: &str) -> Option<usize> {
        self.holdings.iter().position(|h| h.symbol == symbol)
    }
}

impl FromIterator<Holding> for Portfolio {
    fn from_iter<T: IntoIterator<Item = Holding>>(iter: T) -> Self {
        let mut portfolio = Portfolio::new();
        for holding in iter {
            portfolio.insert(holding);
        }
        portfolio
    }
}

impl<'a> IntoIterator for &'a Portfolio {
    type Item = &'a Holding;
    type IntoIter = std::slice::Iter<'a, Holding>;

    fn into_iter(self) -> Self::IntoIter {
        self.holdings.iter()
    }
}
