//! Typed identifiers for passengers, seats and doorways.
//!
//! Each id wraps the slot index of the collection that owns the thing it
//! names.  Passenger ids are handed out in spawn order and never reused, so
//! an id kept after its passenger is recycled simply stops resolving.

use std::fmt;

/// Typed wrapper around a slot index.  `$tag` prefixes the `Display` form.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty) = $tag:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// The id for slot `index`, or `None` if it does not fit.
            #[inline]
            pub fn from_index(index: usize) -> Option<$name> {
                <$inner>::try_from(index).ok().map($name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "#{}"), self.0)
            }
        }
    };
}

typed_id! {
    /// A passenger.  Slot in `AgentStore` and in the world's body table.
    pub struct AgentId(u32) = "pax";
}

typed_id! {
    /// A seat in a `SeatPool`.
    pub struct SeatId(u32) = "seat";
}

typed_id! {
    /// A doorway.  A vehicle has very few.
    pub struct GateId(u8) = "gate";
}
