//! This module contains custom data structures used in the implementation of
//! the monitor.

pub mod linear_map;

pub use linear_map::LinearMap;
