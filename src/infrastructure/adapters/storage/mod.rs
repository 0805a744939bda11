//! 存储适配器

mod sharded_blob_storage;

pub use sharded_blob_storage::ShardedBlobStorage;
