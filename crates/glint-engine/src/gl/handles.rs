use std::num::NonZeroU32;

use super::types::UniformSlot;

macro_rules! object_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl $name {
            #[inline]
            pub(crate) const fn from_raw(id: NonZeroU32) -> Self {
                Self(id)
            }

            /// Context-local object id. Never zero.
            #[inline]
            pub const fn id(self) -> u32 {
                self.0.get()
            }
        }
    };
}

object_handle!(
    /// Opaque handle to a GPU buffer owned by a [`Context`](super::Context).
    BufferHandle
);
object_handle!(
    /// Opaque handle to a shader stage object.
    ShaderHandle
);
object_handle!(
    /// Opaque handle to a program object.
    ProgramHandle
);

/// Vertex attribute slot resolved from a linked program.
///
/// `INVALID` plays the role of GL's `-1`: every call taking it is a no-op.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AttribLocation(Option<u32>);

impl AttribLocation {
    pub const INVALID: Self = Self(None);

    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(Some(index))
    }

    #[inline]
    pub const fn index(self) -> Option<u32> {
        self.0
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0.is_some()
    }
}

/// Uniform slot resolved from a linked program.
///
/// A location is only meaningful for the program it was resolved from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct UniformLocation(Option<(ProgramHandle, UniformSlot)>);

impl UniformLocation {
    pub const INVALID: Self = Self(None);

    #[inline]
    pub(crate) const fn new(program: ProgramHandle, slot: UniformSlot) -> Self {
        Self(Some((program, slot)))
    }

    #[inline]
    pub const fn program(self) -> Option<ProgramHandle> {
        match self.0 {
            Some((program, _)) => Some(program),
            None => None,
        }
    }

    #[inline]
    pub const fn slot(self) -> Option<UniformSlot> {
        match self.0 {
            Some((_, slot)) => Some(slot),
            None => None,
        }
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0.is_some()
    }
}
