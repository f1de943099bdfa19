use std::ops::{BitAnd, BitOr, Not};

/// Bit mask filtering which interactors and interactables may interact with each other.
///
/// An interactor and an interactable are compatible when their masks share at least one layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InteractionLayerMask(pub u32);

impl InteractionLayerMask {
    pub const NOTHING: Self = Self(0);
    pub const EVERYTHING: Self = Self(u32::MAX);

    /// A mask containing only `layer`. Layers past 31 yield an empty mask.
    pub const fn from_layer(layer: u32) -> Self {
        match 1u32.checked_shl(layer) {
            Some(bits) => Self(bits),
            None => Self::NOTHING,
        }
    }

    pub const fn overlaps(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn contains_layer(self, layer: u32) -> bool {
        self.overlaps(Self::from_layer(layer))
    }
}

impl Default for InteractionLayerMask {
    fn default() -> Self {
        Self::EVERYTHING
    }
}

impl BitOr for InteractionLayerMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for InteractionLayerMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for InteractionLayerMask {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0)
    }
}
