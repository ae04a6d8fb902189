// src/clients/mod.rs

//! External collaborators of the comment engine.
//! Each is a trait so handlers and tests can swap the implementation.

pub mod catalog;
pub mod storage;

pub use catalog::{CatalogClient, HttpCatalogClient};
pub use storage::{LocalMediaStorage, MediaStorage};
