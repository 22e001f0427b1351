//! UI module root: exposes drawing functions for individual panels.

pub mod disk;
pub mod header;
pub mod spark;
pub mod util;
