//! Page sequence numbering
//!
//! Image names downstream are derived from sequence numbers, so a missing
//! or duplicated number corrupts the naming contract. The remote mode
//! calls the sequencing collaborator with bounded exponential-backoff
//! retries and fails the request outright when they are exhausted; the
//! derived mode seeds a deterministic range from the transaction id and
//! needs no network at all.

use courier_common::{config::TxConfig, Error, Result};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Derived sequence numbers stay within nine digits to fit the image
/// name format.
const DERIVED_MODULUS: u64 = 1_000_000_000;

#[derive(Debug, Deserialize)]
struct SequenceResponse {
    sequence_list: Vec<u64>,
}

/// Source of per-image sequence numbers.
pub enum Sequencer {
    Remote(RemoteSequencer),
    Derived,
}

impl Sequencer {
    pub fn from_config(config: &TxConfig) -> Result<Self> {
        match &config.sequencer_url {
            Some(url) => Ok(Sequencer::Remote(RemoteSequencer::new(
                url.clone(),
                config.sequencer_retries,
                config.sequencer_backoff(),
            )?)),
            None => Ok(Sequencer::Derived),
        }
    }

    /// Fetch `count` sequence numbers for one request.
    pub async fn next(&self, tx_id: Uuid, count: usize) -> Result<Vec<u64>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        match self {
            Sequencer::Remote(remote) => remote.fetch(count).await,
            Sequencer::Derived => Ok(derived_range(tx_id, count)),
        }
    }
}

/// Client for the sequencing collaborator.
pub struct RemoteSequencer {
    client: reqwest::Client,
    base_url: String,
    max_attempts: u32,
    backoff: Duration,
}

impl RemoteSequencer {
    pub fn new(base_url: String, max_attempts: u32, backoff: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Sequencing(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            max_attempts: max_attempts.max(1),
            backoff,
        })
    }

    pub async fn fetch(&self, count: usize) -> Result<Vec<u64>> {
        with_retries("sequence lookup", self.max_attempts, self.backoff, || {
            self.fetch_once(count)
        })
        .await
    }

    async fn fetch_once(&self, count: usize) -> Result<Vec<u64>> {
        let url = format!(
            "{}/sequence?count={}",
            self.base_url.trim_end_matches('/'),
            count
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Sequencing(format!("unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Sequencing(format!(
                "status {} from {}",
                response.status(),
                url
            )));
        }

        let body: SequenceResponse = response
            .json()
            .await
            .map_err(|e| Error::Sequencing(format!("bad response body: {}", e)))?;

        if body.sequence_list.len() != count {
            return Err(Error::Sequencing(format!(
                "requested {} sequence numbers, received {}",
                count,
                body.sequence_list.len()
            )));
        }
        Ok(body.sequence_list)
    }
}

/// Retry an operation with exponential backoff, up to `max_attempts`
/// attempts in total. The final error is returned unchanged.
pub async fn with_retries<F, Fut, T>(
    operation_name: &str,
    max_attempts: u32,
    initial_backoff: Duration,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut backoff = initial_backoff;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(operation = operation_name, attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if attempt >= max_attempts => {
                tracing::error!(
                    operation = operation_name,
                    attempt,
                    error = %err,
                    "retries exhausted"
                );
                return Err(err);
            }
            Err(err) => {
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %err,
                    "will retry after backoff"
                );
                tokio::time::sleep(backoff).await;
                backoff = backoff.saturating_mul(2);
            }
        }
    }
}

fn derived_range(tx_id: Uuid, count: usize) -> Vec<u64> {
    let bytes = tx_id.as_bytes();
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&bytes[8..16]);
    let seed = u64::from_be_bytes(tail) % DERIVED_MODULUS;

    (0..count as u64)
        .map(|i| (seed + i) % DERIVED_MODULUS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn with_retries_returns_first_success() {
        let mut calls = 0;
        let result = with_retries("op", 3, Duration::from_millis(1), || {
            calls += 1;
            async { Ok::<_, Error>(7) }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn with_retries_recovers_after_failures() {
        let mut calls = 0;
        let result = with_retries("op", 5, Duration::from_millis(1), || {
            calls += 1;
            let this_call = calls;
            async move {
                if this_call < 3 {
                    Err(Error::Sequencing("down".to_string()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn with_retries_is_bounded() {
        let mut calls = 0;
        let result: Result<()> = with_retries("op", 4, Duration::from_millis(1), || {
            calls += 1;
            async { Err(Error::Sequencing("still down".to_string())) }
        })
        .await;
        assert!(matches!(result, Err(Error::Sequencing(_))));
        assert_eq!(calls, 4);
    }

    #[tokio::test]
    async fn derived_mode_is_deterministic_per_transaction() {
        let tx = Uuid::parse_str("0f534ffc-9442-414c-b39f-a756b4adc6cb").unwrap();
        let first = Sequencer::Derived.next(tx, 3).await.unwrap();
        let second = Sequencer::Derived.next(tx, 3).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        // Monotonic run of distinct values
        assert!(first.windows(2).all(|w| w[1] == (w[0] + 1) % DERIVED_MODULUS));

        let other = Uuid::parse_str("1f534ffc-9442-414c-b39f-a756b4adc6cc").unwrap();
        assert_ne!(Sequencer::Derived.next(other, 3).await.unwrap(), first);
    }

    #[tokio::test]
    async fn zero_count_needs_no_lookup() {
        let tx = Uuid::nil();
        assert!(Sequencer::Derived.next(tx, 0).await.unwrap().is_empty());
    }
}
