use std::sync::atomic::{AtomicU64, Ordering};

macro_rules! define_id_type {
    ($name:ident, $inner:ty) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(transparent)]
        pub struct $name($inner);

        impl $name {
            /// Get the inner value.
            pub fn inner(self) -> $inner {
                self.0
            }

            pub(crate) fn new(value: $inner) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id_type!(ProblemId, u64);
define_id_type!(VariableId, u32);
define_id_type!(ConstraintId, u32);

impl ProblemId {
    /// A process-wide unique id.
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self::new(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}
