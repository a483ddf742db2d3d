//! Backend payload schema
//!
//! This module defines the JSON shapes served by the activity and book
//! endpoints and the adapter that turns them into a [`crate::types::ReadingSnapshot`].

mod adapter;
mod wire;

pub use adapter::*;
pub use wire::*;
