//! Transport implementations
//!
//! Production implementations of the submission traits. The remote
//! strategies talk HTTP through reqwest; the local fallback writes to disk.

pub mod direct_api;
pub mod dispatch_event;
mod http;
pub mod issue_record;
pub mod local_fallback;
pub mod local_store;
pub mod server_proxy;

#[cfg(test)]
mod tests;

pub use direct_api::DirectApiStrategy;
pub use dispatch_event::DispatchEventStrategy;
pub use issue_record::IssueRecordStrategy;
pub use local_fallback::LocalFallback;
pub use local_store::FileLocalStore;
pub use server_proxy::ServerProxyStrategy;
