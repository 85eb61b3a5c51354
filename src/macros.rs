// SPDX-License-Identifier: MIT OR Apache-2.0

/// Create an integer newtype with a set of named constants.
///
/// Event logs are produced by firmware, and firmware vendors add event
/// types and algorithm identifiers faster than any registry tracks them.
/// Modeling these fields as Rust enums would make the mere presence of an
/// unlisted value unrepresentable, so they are newtypes of integers with
/// associated constants instead. The generated `Debug` impl prints the
/// constant's name when the value is a known one.
macro_rules! newtype_enum {
    (
        $(#[$type_attrs:meta])*
        $visibility:vis enum $type:ident : $base_integer:ty => $(#[$impl_attrs:meta])* {
            $(
                $(#[$variant_attrs:meta])*
                $variant:ident = $value:expr,
            )*
        }
    ) => {
        $(#[$type_attrs])*
        #[repr(transparent)]
        #[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
        $visibility struct $type(pub $base_integer);

        $(#[$impl_attrs])*
        #[allow(unused)]
        impl $type {
            $(
                $(#[$variant_attrs])*
                pub const $variant: $type = $type($value);
            )*
        }

        impl core::fmt::Debug for $type {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match *self {
                    $(
                        $type::$variant => write!(f,
                            concat!(stringify!($type), "::", stringify!($variant))),
                    )*
                    $type(unknown) => write!(f,
                        concat!(stringify!($type), "({:#x})"), unknown),
                }
            }
        }
    }
}
