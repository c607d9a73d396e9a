//! Tanbih — Islamic lifestyle companion backend.

pub mod config;
pub mod error;
pub mod store;
pub mod tasks;
