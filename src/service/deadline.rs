use crate::error::ProbeError;
use std::future::Future;
use std::time::Duration;

/// Await `fut`, failing with [`ProbeError::Timeout`] once `after` elapses.
/// A zero duration disables the deadline.
pub async fn within<T, E, F>(after: Duration, op: &'static str, fut: F) -> Result<T, ProbeError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<ProbeError>,
{
    if after.is_zero() {
        return fut.await.map_err(Into::into);
    }
    match tokio::time::timeout(after, fut).await {
        Ok(res) => res.map_err(Into::into),
        Err(_) => Err(ProbeError::Timeout { op, after }),
    }
}
