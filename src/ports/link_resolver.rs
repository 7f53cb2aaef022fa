use crate::links::Resolution;

/// Port wrapping the link-aggregation API.
///
/// Implementations live in `services::odesli` (production) or test mocks.
/// Every failure is reported as [`Resolution::Unavailable`]; nothing retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait LinkResolver: Send + Sync {
    async fn resolve(&self, url: &str, country: &str) -> Resolution;
}
