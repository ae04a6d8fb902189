// src/services/mod.rs

//! The comment engine. Every operation takes the acting user's id as an
//! explicit argument and talks to Postgres through the pool it is given.

pub mod deletion;
pub mod movies;
pub mod reactions;
pub mod thread;
pub mod users;
pub mod write;
