//! Batched plan queries
//!
//! The code universe is split into fixed-size groups, queried with bounded
//! concurrency and concatenated in batch order. A failing batch is logged and
//! counted; the fetch only fails when no batch succeeds.

use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::config::AirhubSettings;
use crate::domain::plan_records;
use crate::providers::{ProviderError, ProviderResult};

use super::session::PlanSession;

/// Split `codes` into groups of at most `size` (a size of zero is treated as one)
pub fn split_batches(codes: &[String], size: usize) -> Vec<Vec<String>> {
    codes.chunks(size.max(1)).map(<[String]>::to_vec).collect()
}

/// A batch whose query failed
#[derive(Debug)]
pub struct BatchFailure {
    pub index: usize,
    pub codes: Vec<String>,
    pub error: ProviderError,
}

/// Result of a batched fetch
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Raw plan records of every successful batch, in batch order
    pub records: Vec<Value>,
    /// Number of batches issued
    pub batches: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn partial_batches(&self) -> usize {
        self.failures.len()
    }
}

/// Batch size and concurrency for plan queries
#[derive(Debug, Clone, Copy)]
pub struct BatchPlanner {
    batch_size: usize,
    max_concurrency: usize,
}

impl BatchPlanner {
    pub fn new(batch_size: usize, max_concurrency: usize) -> Self {
        BatchPlanner {
            batch_size: batch_size.clamp(1, AirhubSettings::MAX_BATCH_SIZE),
            max_concurrency: max_concurrency.clamp(1, AirhubSettings::MAX_CONCURRENCY),
        }
    }

    pub fn from_settings(settings: &AirhubSettings) -> Self {
        Self::new(settings.effective_batch_size(), settings.effective_concurrency())
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Query every batch of `codes` through `session`
    #[instrument(skip(self, session, codes), fields(codes = codes.len(), batch_size = self.batch_size))]
    pub async fn fetch_all(&self, session: &PlanSession, codes: &[String]) -> ProviderResult<BatchOutcome> {
        let batches = split_batches(codes, self.batch_size);
        if batches.is_empty() {
            return Ok(BatchOutcome::default());
        }

        // Authenticate once up front so batches share one token and a bad
        // login fails the whole fetch
        session.token().await?;

        let results: Vec<(usize, Vec<String>, ProviderResult<Value>)> = stream::iter(
            batches.into_iter().enumerate(),
        )
        .map(|(index, batch)| async move {
            let result = session.query(&batch).await;
            (index, batch, result)
        })
        .buffered(self.max_concurrency)
        .collect()
        .await;

        let mut outcome = BatchOutcome {
            batches: results.len(),
            ..Default::default()
        };

        for (index, codes, result) in results {
            match result {
                Ok(response) => outcome.records.extend(plan_records(&response)),
                Err(error) => {
                    warn!(batch = index, codes = %codes.join(","), error = %error, "Plan batch failed");
                    outcome.failures.push(BatchFailure { index, codes, error });
                }
            }
        }

        if outcome.failures.len() == outcome.batches {
            // Every batch failed; surface the last error
            if let Some(last) = outcome.failures.pop() {
                return Err(last.error);
            }
        }

        if !outcome.failures.is_empty() {
            warn!(
                failed = outcome.failures.len(),
                batches = outcome.batches,
                "Plan data is partial"
            );
        }

        info!(
            batches = outcome.batches,
            records = outcome.records.len(),
            "Plan batches fetched"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::catalog::session::test_support::{configured_settings, FakeProvider};
    use serde_json::json;
    use std::sync::Arc;

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|c| c.to_string()).collect()
    }

    fn session(provider: Arc<FakeProvider>) -> PlanSession {
        PlanSession::new(provider, configured_settings(), Arc::new(ManualClock::new()))
    }

    #[test]
    fn test_split_batches_sizes() {
        let universe: Vec<String> = (0..53).map(|i| format!("C{i}")).collect();

        for size in [1, 7, 25, 50, 53, 100] {
            let batches = split_batches(&universe, size);
            assert_eq!(batches.len(), universe.len().div_ceil(size));
            assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= size));
            assert_eq!(batches.concat(), universe);
        }

        assert!(split_batches(&[], 25).is_empty());
        assert_eq!(split_batches(&codes(&["JP", "TH"]), 0).len(), 2);
    }

    #[test]
    fn test_planner_clamps() {
        let planner = BatchPlanner::new(0, 99);
        assert_eq!(planner.batch_size(), 1);
        assert_eq!(planner.max_concurrency(), 10);
    }

    #[tokio::test]
    async fn test_concatenates_in_batch_order() {
        let provider = Arc::new(FakeProvider::with_plans(&[
            ("JP", json!({"countryCode": "JP", "price": 10})),
            ("TH", json!({"countryCode": "TH", "price": 3})),
            ("US", json!({"countryCode": "US", "price": 5})),
        ]));
        let session = session(provider.clone());

        let outcome = BatchPlanner::new(1, 3)
            .fetch_all(&session, &codes(&["JP", "TH", "US"]))
            .await
            .unwrap();

        let order: Vec<&str> = outcome
            .records
            .iter()
            .filter_map(|r| r["countryCode"].as_str())
            .collect();
        assert_eq!(order, vec!["JP", "TH", "US"]);
        assert_eq!(outcome.batches, 3);
        assert_eq!(outcome.partial_batches(), 0);
        assert_eq!(provider.logins(), 1);
    }

    #[tokio::test]
    async fn test_failing_batch_does_not_abort_others() {
        let mut provider = FakeProvider::with_plans(&[
            ("JP", json!({"countryCode": "JP", "price": 10})),
            ("US", json!({"countryCode": "US", "price": 5})),
        ]);
        provider.failing_codes = codes(&["TH"]);
        let provider = Arc::new(provider);
        let session = session(provider.clone());

        let outcome = BatchPlanner::new(1, 2)
            .fetch_all(&session, &codes(&["JP", "TH", "US"]))
            .await
            .unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.partial_batches(), 1);
        assert_eq!(outcome.failures[0].index, 1);
        assert_eq!(outcome.failures[0].codes, codes(&["TH"]));
        assert_eq!(provider.queries(), 3);
    }

    #[tokio::test]
    async fn test_all_batches_failing_is_an_error() {
        let mut provider = FakeProvider::default();
        provider.failing_codes = codes(&["JP", "TH"]);
        let session = session(Arc::new(provider));

        let err = BatchPlanner::new(1, 2)
            .fetch_all(&session, &codes(&["JP", "TH"]))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::ApiError { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_login_failure_fails_fetch() {
        let provider = Arc::new(FakeProvider {
            reject_login: true,
            ..Default::default()
        });
        let session = session(provider.clone());

        let err = BatchPlanner::new(25, 4)
            .fetch_all(&session, &codes(&["JP"]))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::AuthFailed(_)));
        assert_eq!(provider.queries(), 0);
    }

    #[tokio::test]
    async fn test_batches_respect_size() {
        let provider = Arc::new(FakeProvider::default());
        let session = session(provider.clone());
        let universe: Vec<String> = (0..60).map(|i| format!("C{i}")).collect();

        let outcome = BatchPlanner::new(25, 4).fetch_all(&session, &universe).await.unwrap();

        assert_eq!(outcome.batches, 3);
        let sizes: Vec<usize> = provider.seen_batches.lock().iter().map(Vec::len).collect();
        assert_eq!(sizes.iter().sum::<usize>(), 60);
        assert!(sizes.iter().all(|s| *s <= 25));
    }
}
