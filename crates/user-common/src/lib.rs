//! # user-common
//!
//! Configuration, validation helpers and health types shared by the user service crates.
//! No I/O beyond reading configuration sources.

pub mod config;
pub mod health;
pub mod validation;
