//! Reverie engine crate.
//!
//! Platform-agnostic foundations shared by the interaction core: geometry,
//! normalized input, time sources, render trees, and the drawing-backend
//! contract.

pub mod coords;
pub mod device;
pub mod input;
pub mod render;
pub mod time;

pub mod logging;
