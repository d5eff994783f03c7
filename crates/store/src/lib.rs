pub mod catalog;
pub mod error;
pub mod flags;
pub mod memory;
pub mod ports;
pub mod types;

pub use catalog::FileProviderStore;
pub use error::{StoreError, StoreResult};
pub use flags::FileFlagStore;
pub use memory::{MemoryCredentialStore, MemoryFlagStore};
pub use ports::{ClipboardReader, CredentialStore, FlagStore, ModelResolver};
pub use types::*;
