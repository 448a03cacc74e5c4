//! MindFlow API Library Crate
//!
//! This library contains all the logic for the MindFlow web service: the
//! application state, API handlers, and routing. The binaries are thin
//! wrappers around this library.

pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
