pub mod connection;
pub mod endpoints;
#[cfg(any(test, feature = "test-util"))]
pub mod fake;

pub use connection::{ApiConnectionError, CompletionClient};
pub use endpoints::{ChatCompletionRequest, ChatMessage, Provider};
#[cfg(any(test, feature = "test-util"))]
pub use fake::FakeClient;
