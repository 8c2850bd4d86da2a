mod errors;
pub mod operations;
mod store;
mod types;

pub use errors::StoreError;
pub use store::{ReadPolicy, StoreSession, WhitelistStore};
pub use types::{timestamp, UserRecord, UserSummary, WhitelistDocument, WhitelistStats};
