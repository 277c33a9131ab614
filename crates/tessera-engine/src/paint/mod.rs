//! Paint model shared between the scene and the renderers.
//!
//! Scope:
//! - color representation (8-bit RGB and normalized straight-alpha RGBA)
//! - resolution of color specifications (CSS color strings) into RGB
//!
//! Geometry types remain in `coords`.

pub mod color;
pub mod resolve;

pub use color::{Color, Rgb8};
pub use resolve::{ColorResolver, CssColorResolver};
