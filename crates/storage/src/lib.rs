//! Persistence adapters for course progress.

pub mod repository;
pub mod sqlite;
