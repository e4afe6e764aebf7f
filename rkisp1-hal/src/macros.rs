#![macro_use]

/// Declares the typed accessors of a register block.
///
/// Each entry expands to a method returning a [`Reg`](crate::io::Reg) at
/// `base + offset`, and to an arm of the block's `name` lookup used by dumps.
macro_rules! register_block {
    (
        $(#[$block_meta:meta])*
        $block:ident {
            $(
                $(#[$meta:meta])*
                $name:ident: $ty:ty = $offset:literal;
            )*
        }
    ) => {
        $(#[$block_meta])*
        #[derive(Clone, Copy)]
        pub struct $block<'a> {
            io: &'a dyn crate::io::RegisterIo,
            base: u32,
        }

        impl<'a> $block<'a> {
            #[inline]
            pub(crate) const fn from_io(io: &'a dyn crate::io::RegisterIo, base: u32) -> Self {
                Self { io, base }
            }

            /// Base offset of this block inside the ISP register window.
            #[inline]
            pub const fn base(&self) -> u32 {
                self.base
            }

            /// Name of the register at `offset`, relative to the block base.
            pub fn name(offset: u32) -> Option<&'static str> {
                match offset {
                    $( $offset => Some(stringify!($name)), )*
                    _ => None,
                }
            }

            $(
                $(#[$meta])*
                #[inline(always)]
                pub fn $name(&self) -> crate::io::Reg<'a, $ty> {
                    crate::io::Reg::new(self.io, self.base + $offset)
                }
            )*
        }
    };
}

/// Declares an enum stored in a register field.
///
/// Generates the `into_bits`/`from_bits` pair `bitfield-struct` expects.
/// Unlisted raw values decode to the `$fallback` variant.
macro_rules! field_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal, )*
        }
        fallback $fallback:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[repr(u8)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $value, )*
        }

        impl $name {
            pub const fn into_bits(self) -> u8 {
                self as u8
            }

            pub const fn from_bits(value: u8) -> Self {
                match value {
                    $( $value => Self::$variant, )*
                    _ => Self::$fallback,
                }
            }
        }
    };
}
