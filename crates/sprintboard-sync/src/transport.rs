use crate::request::ApiRequest;
use async_trait::async_trait;
use serde_json::Value;
use sprintboard_core::BoardResult;

/// Sends one request to the remote API and returns the decoded JSON body.
///
/// Implementations convert every failure into a `BoardError`: non-2xx
/// responses become `RemoteRejection`, network problems become `Connection`.
/// An empty body decodes to `Value::Null`.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> BoardResult<Value>;
}
