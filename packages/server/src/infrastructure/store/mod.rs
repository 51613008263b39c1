//! DurableStore の実装
//!
//! - `inmemory`: HashMap を使ったインメモリ実装（スタンドアロン起動とテスト用）
//! - 将来的に: PostgreSQL など

pub mod inmemory;

pub use inmemory::InMemoryDurableStore;
