// src/models/mod.rs

pub mod comment;
pub mod media;
pub mod movie;
pub mod pagination;
pub mod user;
