//! Scene records consumed by the renderers.
//!
//! Responsibilities:
//! - hold per-item mark attributes exactly as the scene declares them
//! - group items by mark type (one group = one instanced draw)
//!
//! The scene owns its item lists; renderers only read them each frame.

mod mark;
mod rect;

pub use mark::{GroupId, MarkGroup, MarkType};
pub use rect::{RectGroup, SceneRect};
