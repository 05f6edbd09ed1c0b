//! Combat simulation for BROADSIDE.
//!
//! Owns the layered damage pipeline (shields, armor, hull, subsystems),
//! the energy transfer system, and the per-ship aggregate that ties them
//! together. Completely headless and tick-driven, enabling deterministic
//! testing.

pub mod armor;
pub mod bus;
pub mod ets;
pub mod hull;
pub mod processor;
pub mod shields;
pub mod ship;
pub mod subsystems;

pub use broadside_core as core;
pub use ship::Ship;

#[cfg(test)]
mod tests;
