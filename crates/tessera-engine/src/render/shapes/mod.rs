//! Shape renderers.

mod common;

pub mod rect;

pub use common::DEPTH_FORMAT;
