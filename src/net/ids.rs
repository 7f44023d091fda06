//! 强类型标识符：原始网的库所/迁移，以及展开结构中的条件/事件。
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::net::index_vec::Idx;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl Idx for $name {
            fn index(self) -> usize {
                self.0 as usize
            }

            fn from_usize(idx: usize) -> Self {
                Self(idx as u32)
            }
        }
    };
}

define_id!(
    /// Row of the input incidence matrix.
    PlaceId
);
define_id!(
    /// Column of the input incidence matrix.
    TransitionId
);
define_id!(
    /// Row of the unfolded matrix: an original place or one of its duplicates.
    ConditionId
);
define_id!(
    /// Column of the unfolded matrix: an original transition or one of its duplicates.
    EventId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_index() {
        let place = PlaceId::from_usize(3);
        assert_eq!(place.index(), 3);
        assert_eq!(place.raw(), 3);
        assert_eq!(format!("{:?}", EventId::new(7)), "EventId(7)");
    }
}
