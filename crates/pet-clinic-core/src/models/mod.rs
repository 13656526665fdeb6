//! Domain models for the pet clinic.

mod client;

pub use client::*;
