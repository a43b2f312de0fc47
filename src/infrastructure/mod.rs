// Storage infrastructure
pub mod database;          // Storage traits and backend selection
pub mod cache;             // LRU cache used by the SQLite backend
pub mod id_generator;      // Per-store identifier sequence
pub mod memory_database;   // In-memory backend
pub mod sqlite_database;   // SQLite backend

pub use database::{open_storage, EntityStore, FriendshipStore, LikesStore, Storage};
pub use id_generator::IdSequence;
pub use memory_database::MemoryDatabase;
pub use sqlite_database::SqliteDatabase;
