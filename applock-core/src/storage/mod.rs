//! Persistence of the lock state through a host-provided key-value store.

pub mod error;
pub mod keys;
pub mod memory;
pub mod records;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use keys::StorageKey;
pub use memory::MemoryKeyValueStore;
pub use records::PinRecords;
pub use traits::KeyValueStore;
