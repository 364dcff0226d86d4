//! Correlation id allocation
//!
//! A generator is consulted exactly once for every call and never for a
//! notification. Uniqueness among outstanding requests is the generator's
//! job; the client does not check it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use repc_json_rpc::{RequestId, RequestParams};
use serde::{Deserialize, Serialize};

/// Produces the `id` of each outgoing call
pub trait IdGenerator: Send + Sync {
    /// Allocate the id for a call to `method` with `params`
    fn next_id(&self, method: &str, params: &RequestParams) -> RequestId;
}

impl<F> IdGenerator for F
where
    F: Fn(&str, &RequestParams) -> RequestId + Send + Sync,
{
    fn next_id(&self, method: &str, params: &RequestParams) -> RequestId {
        self(method, params)
    }
}

/// Monotonically increasing integer ids, starting at 1
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    last: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue numbering after `last` (the next id is `last + 1`)
    pub fn starting_after(last: u64) -> Self {
        Self {
            last: AtomicU64::new(last),
        }
    }

    /// The most recently allocated id, 0 if none yet
    pub fn last_id(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self, _method: &str, _params: &RequestParams) -> RequestId {
        let id = self.last.fetch_add(1, Ordering::SeqCst) + 1;
        RequestId::Number(id as i64)
    }
}

/// Random UUID v4 string ids
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self, _method: &str, _params: &RequestParams) -> RequestId {
        RequestId::String(uuid::Uuid::new_v4().to_string())
    }
}

/// Serializable choice of built-in id strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    #[default]
    Sequential,
    Uuid,
}

impl IdStrategy {
    pub fn generator(&self) -> std::sync::Arc<dyn IdGenerator> {
        match self {
            IdStrategy::Sequential => std::sync::Arc::new(SequentialIdGenerator::new()),
            IdStrategy::Uuid => std::sync::Arc::new(UuidIdGenerator),
        }
    }
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdStrategy::Sequential => write!(f, "sequential"),
            IdStrategy::Uuid => write!(f, "uuid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_sequential_starts_at_one() {
        let ids = SequentialIdGenerator::new();
        let params = RequestParams::default();

        assert_eq!(ids.next_id("a", &params), RequestId::Number(1));
        assert_eq!(ids.next_id("b", &params), RequestId::Number(2));
        assert_eq!(ids.last_id(), 2);

        let resumed = SequentialIdGenerator::starting_after(41);
        assert_eq!(resumed.next_id("a", &params), RequestId::Number(42));
    }

    #[test]
    fn test_sequential_unique_across_threads() {
        let ids = Arc::new(SequentialIdGenerator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = ids.clone();
                std::thread::spawn(move || {
                    (0..250)
                        .map(|_| ids.next_id("m", &RequestParams::default()))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id allocated");
            }
        }
        assert_eq!(seen.len(), 2000);
    }

    #[test]
    fn test_closure_generator_sees_method() {
        let prefixed = |method: &str, _: &RequestParams| RequestId::String(format!("{}-1", method));
        assert_eq!(
            prefixed.next_id("sum", &RequestParams::default()),
            RequestId::from("sum-1")
        );
    }

    #[test]
    fn test_uuid_ids_are_strings() {
        let id = UuidIdGenerator.next_id("m", &RequestParams::default());
        let text = id.as_str().unwrap();
        assert!(uuid::Uuid::parse_str(text).is_ok());
        assert_ne!(id, UuidIdGenerator.next_id("m", &RequestParams::default()));
    }

    #[test]
    fn test_strategy_serde() {
        let strategy: IdStrategy = serde_json::from_str(r#""uuid""#).unwrap();
        assert_eq!(strategy, IdStrategy::Uuid);
        assert_eq!(IdStrategy::default().to_string(), "sequential");
    }
}
