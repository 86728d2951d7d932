//! Command codec for the display list format.
//!
//! Every command is 64 bits wide, stored as two big-endian 32-bit words.
//! The upper byte of the first word is the opcode; the rest of `w0` and
//! all of `w1` hold operands whose layout depends on the opcode.

pub mod opcodes;
pub mod words;
pub mod decode;
pub mod encode;

use core::fmt::{Debug, Formatter};

pub use decode::{Gfx, Image, MoveMem, TextureCoords, Tile, TileSpan};
pub use encode::DisplayListBuilder;
pub use opcodes::*;

/// Size in bytes of a single command.
pub const COMMAND_SIZE: u32 = 8;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Command {
    pub w0: u32,
    pub w1: u32,
}

impl Command {
    #[inline(always)]
    pub const fn new(w0: u32, w1: u32) -> Self {
        Self { w0, w1 }
    }

    #[inline(always)]
    pub const fn opcode(&self) -> u8 {
        (self.w0 >> 24) as u8
    }

    pub fn from_be_bytes(bytes: [u8; 8]) -> Self {
        Self {
            w0: u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            w1: u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }

    pub fn to_be_bytes(&self) -> [u8; 8] {
        let w0 = self.w0.to_be_bytes();
        let w1 = self.w1.to_be_bytes();
        [w0[0], w0[1], w0[2], w0[3], w1[0], w1[1], w1[2], w1[3]]
    }

    /// Number of commands this record occupies, including itself.
    #[inline(always)]
    pub fn width(&self) -> usize {
        command_width(self.opcode())
    }
}

impl Debug for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:08X} {:08X} ({})", self.w0, self.w1, opcode_name(self.opcode()))
    }
}
