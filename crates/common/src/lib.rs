//! Shared ambient helpers for the HBnB workspace.

pub mod utils;
