//! Entity gateway contract and bundled gateways
//!
//! The admin controllers never talk to storage directly. They resolve an
//! entity token through the [`EntityRegistry`] and drive the resulting
//! [`EntityGateway`]: load by id, add, partial update, delete and list.
//!
//! Two gateways ship with the crate:
//!
//! - [`MemoryGateway`]: integer ids, rows held in memory
//! - [`FileGateway`]: one YAML file per record, ULID ids, atomic writes
//!
//! ```text
//! records/
//!   01J0Z5...yaml   ← one row per file
//! ```

mod error;
mod file;
mod gateway;
mod memory;
mod registry;

pub use error::{Result, StoreError};
pub use file::FileGateway;
pub use gateway::{
    id_of, EntityGateway, EntityHandle, ListQuery, ListResult, PersistResult, Row, SortBy,
    SortOrder,
};
pub use memory::MemoryGateway;
pub use registry::EntityRegistry;

pub use async_trait::async_trait;
