//! Core types and definitions for the BROADSIDE combat simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! damage events, result reports, notification events, configuration,
//! and constants. It has no dependency on any runtime framework and
//! contains no game logic.

pub mod config;
pub mod constants;
pub mod enums;
pub mod events;
pub mod types;
