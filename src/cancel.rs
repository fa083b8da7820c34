//! Cancellation support for fan-out tasks (§5).
//!
//! The top-level request holds a single [`CancellationToken`] that every
//! fan-out task observes. [`run_cancellable`] races a task's remote-call
//! future against the token; when the token fires first, the in-flight
//! future is dropped at its next yield point and the task reports
//! [`Error::Cancelled`] into the aggregation channel so the aggregator can
//! drain deterministically instead of hanging on a task that will never
//! finish.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

pub async fn run_cancellable<T>(
    token: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        _ = token.cancelled() => Err(Error::Cancelled),
        result = fut => result,
    }
}
