use super::RectGroup;

/// Mark-type tag used to route a group to its renderer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MarkType {
    Rect,
}

impl MarkType {
    pub const fn as_str(self) -> &'static str {
        match self {
            MarkType::Rect => "rect",
        }
    }
}

impl std::fmt::Display for MarkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identity of a render group; keys the per-group GPU state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub u64);

/// A group of items sharing one mark type.
///
/// Extend by adding variants; renderer dispatch matches exhaustively on this enum.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkGroup {
    Rect(RectGroup),
}

impl MarkGroup {
    #[inline]
    pub fn mark_type(&self) -> MarkType {
        match self {
            MarkGroup::Rect(_) => MarkType::Rect,
        }
    }
}

impl From<RectGroup> for MarkGroup {
    fn from(group: RectGroup) -> Self {
        MarkGroup::Rect(group)
    }
}
