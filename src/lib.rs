pub mod app;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod history;
pub mod models;
pub mod repository;
pub mod state;
pub mod stats;
pub mod storage;
pub mod tracker;

pub use app::router;
pub use config::Config;
pub use errors::{AppError, CoreError, CoreResult};
pub use history::{HistoryCache, SeedMode};
pub use repository::HabitRepository;
pub use state::AppState;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use tracker::Tracker;
