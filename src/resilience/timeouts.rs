//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap each attempt (send + body read) with a deadline
//! - Cancel the attempt cleanly on timeout
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other transport errors

use std::future::Future;
use std::time::Duration;

use crate::error::{ApiError, ApiResult};

/// Run `fut` under `deadline`, mapping expiry to [`ApiError::Timeout`].
pub async fn with_deadline<F, T>(deadline: Duration, fut: F) -> ApiResult<T>
where
    F: Future<Output = ApiResult<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(ApiError::Timeout(deadline)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deadline_expires() {
        let result: ApiResult<()> = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(ApiError::Timeout(d)) if d == Duration::from_millis(10)));
    }

    #[tokio::test]
    async fn test_inner_result_passes_through() {
        let ok = with_deadline(Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err: ApiResult<()> = with_deadline(Duration::from_secs(1), async {
            Err(ApiError::Network("refused".into()))
        })
        .await;
        assert!(matches!(err, Err(ApiError::Network(_))));
    }
}
