//! Entity module - SeaORM entity definitions backing the durable key/value storage.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod storage_entry;

pub use storage_entry::{
    Column as StorageEntryColumn, Entity as StorageEntry, Model as StorageEntryModel,
};
