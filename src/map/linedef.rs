// src/map/linedef.rs
use serde::{Deserialize, Serialize};

/// Which side of a linedef something belongs to. The front side is the
/// right-hand side when walking from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Front,
    Back,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineDef {
    pub start: usize,
    pub end: usize,
    pub flags: i32,
    pub line_type: i32,
    pub tag: i32,
    /// Sidedef index of the front (right) side.
    pub right: Option<usize>,
    /// Sidedef index of the back (left) side.
    pub left: Option<usize>,
    /// Set by the loader for lines that belong to a moving polyobject.
    pub polyobj: bool,
}

impl LineDef {
    pub fn new(start: usize, end: usize, right: Option<usize>, left: Option<usize>) -> Self {
        LineDef {
            start,
            end,
            flags: 0,
            line_type: 0,
            tag: 0,
            right,
            left,
            polyobj: false,
        }
    }

    pub fn sidedef(&self, side: Side) -> Option<usize> {
        match side {
            Side::Front => self.right,
            Side::Back => self.left,
        }
    }

    pub fn is_two_sided(&self) -> bool {
        self.right.is_some() && self.left.is_some()
    }
}
