//! Lesson progress engine for Matura Master.
//!
//! A `ProgressEngine` walks a learner through the ordered lessons of a
//! `LessonCatalog`, scores answers, grants XP once per lesson, keeps the daily
//! streak and persists everything through a `ProgressStore`.

pub mod catalog;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;
pub mod utils;

pub use catalog::LessonCatalog;
pub use engine::{Clock, ProgressEngine};
pub use error::{CatalogError, EngineError, StoreError};
pub use store::{MemoryProgressStore, ProgressStore};
