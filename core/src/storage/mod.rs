pub mod codec;
mod database;
mod kv;
mod kv_repository;
mod mood_store;

pub use database::{Connection, Database};
pub use kv::{KeyValueStore, MemoryStore, SqliteStore};
pub use kv_repository::KvRepository;
pub use mood_store::{LoadReport, MoodStore, CORRUPT_KEY, MOODS_KEY};
