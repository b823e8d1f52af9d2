// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;

macro_rules! sequence_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }
    };
}

sequence_id!(FrameId, "frame");
sequence_id!(RequestId, "req");

#[cfg(test)]
mod tests {
    use super::{FrameId, RequestId};

    #[test]
    fn display_uses_prefix() {
        assert_eq!(RequestId::new(3).to_string(), "req-3");
        assert_eq!(FrameId::from(7).to_string(), "frame-7");
        assert_eq!(FrameId::new(7).get(), 7);
    }
}
