pub mod adapter;
pub mod http;
pub mod request;
pub mod retry;
pub mod transport;
pub mod wire;

pub use adapter::RemoteSync;
pub use http::{CredentialProvider, HttpTransport, StaticCredential};
pub use request::{ApiRequest, Method, NewSprint, NewTask};
pub use retry::RetryPolicy;
pub use transport::Transport;

#[cfg(any(test, feature = "mock"))]
pub use transport::MockTransport;

pub use tokio_util::sync::CancellationToken;
