//! Provider descriptors and retry policy.

pub mod provider;
pub mod retry;

pub use provider::{ProviderConfig, ProviderKind};
pub use retry::RetryPolicy;
