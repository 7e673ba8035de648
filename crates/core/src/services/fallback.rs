use futures::future::BoxFuture;
use log::debug;
use std::future::Future;

use crate::errors::CoreError;

/// Outcome of one strategy: a value, nothing usable, or a failure.
pub type StepResult<T> = Result<Option<T>, CoreError>;

/// Value produced by a chain, with the label of the strategy that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: &'static str,
}

/// Ordered list of strategies for one metric.
///
/// Strategies are lazy futures: they run one at a time, in insertion order,
/// and the first one that yields `Some` wins. Later strategies are never
/// polled, so their network calls never happen. Errors are logged and
/// treated like `None`.
pub struct FallbackChain<'a, T> {
    metric: &'static str,
    symbol: &'a str,
    steps: Vec<(&'static str, BoxFuture<'a, StepResult<T>>)>,
}

impl<'a, T: Send + 'a> FallbackChain<'a, T> {
    pub fn new(metric: &'static str, symbol: &'a str) -> Self {
        Self {
            metric,
            symbol,
            steps: Vec::new(),
        }
    }

    /// Append an async strategy.
    pub fn then<F>(mut self, label: &'static str, step: F) -> Self
    where
        F: Future<Output = StepResult<T>> + Send + 'a,
    {
        self.steps.push((label, Box::pin(step)));
        self
    }

    /// Append a strategy whose value is already known.
    pub fn then_value(self, label: &'static str, value: Option<T>) -> Self {
        self.then(label, futures::future::ready(Ok(value)))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run strategies until one yields a value.
    pub async fn resolve(self) -> Option<Resolved<T>> {
        let Self {
            metric,
            symbol,
            steps,
        } = self;

        for (label, step) in steps {
            match step.await {
                Ok(Some(value)) => {
                    debug!("{metric} for {symbol} resolved by {label}");
                    return Some(Resolved {
                        value,
                        source: label,
                    });
                }
                Ok(None) => debug!("{metric} for {symbol}: {label} had no value"),
                Err(e) => debug!("{metric} for {symbol}: {label} failed: {e}"),
            }
        }
        None
    }

    /// Run strategies, returning `default` when all of them come up empty.
    pub async fn resolve_or(self, default: T) -> T {
        self.resolve().await.map_or(default, |r| r.value)
    }
}
