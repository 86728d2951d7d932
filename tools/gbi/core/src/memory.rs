use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use crate::error::OutOfRange;
use crate::gbi::{Command, COMMAND_SIZE};

/// Read-only view of the address space display lists live in. All
/// multi-byte values are big-endian.
pub trait Memory {
    /// `len` bytes starting at physical `address`, or `None` if any of
    /// them fall outside of memory.
    fn bytes(&self, address: u32, len: usize) -> Option<&[u8]>;

    fn read_u8(&self, address: u32) -> Option<u8> {
        self.bytes(address, 1).map(|b| b[0])
    }

    fn read_u16(&self, address: u32) -> Option<u16> {
        let b = self.bytes(address, 2)?;
        Some(u16::from_be_bytes([b[0], b[1]]))
    }

    fn read_i16(&self, address: u32) -> Option<i16> {
        self.read_u16(address).map(|v| v as i16)
    }

    fn read_u32(&self, address: u32) -> Option<u32> {
        let b = self.bytes(address, 4)?;
        Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_command(&self, address: u32) -> Option<Command> {
        let b = self.bytes(address, COMMAND_SIZE as usize)?;
        Some(Command::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
    }
}

impl Memory for [u8] {
    fn bytes(&self, address: u32, len: usize) -> Option<&[u8]> {
        let start = address as usize;
        self.get(start..start.checked_add(len)?)
    }
}

impl Memory for Vec<u8> {
    #[inline(always)]
    fn bytes(&self, address: u32, len: usize) -> Option<&[u8]> {
        self.as_slice().bytes(address, len)
    }
}

/// An owned memory image, zeroed on creation.
#[derive(Clone)]
pub struct Rdram {
    // heap allocated, images are megabytes
    data: Box<[u8]>,
}

impl core::fmt::Debug for Rdram {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Rdram({:#X} bytes)", self.data.len())
    }
}

impl Rdram {
    pub const DEFAULT_SIZE: usize = 0x80_0000;

    pub fn new(size: usize) -> Self {
        Self { data: vec![0; size].into_boxed_slice() }
    }

    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data: data.into_boxed_slice() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn write_bytes(&mut self, address: u32, bytes: &[u8]) -> Result<(), OutOfRange> {
        let err = OutOfRange { address, len: bytes.len() };
        let start = address as usize;
        let end = start.checked_add(bytes.len()).ok_or(err)?;
        self.data.get_mut(start..end).ok_or(err)?.copy_from_slice(bytes);
        Ok(())
    }

    pub fn write_u16(&mut self, address: u32, value: u16) -> Result<(), OutOfRange> {
        self.write_bytes(address, &value.to_be_bytes())
    }

    pub fn write_u32(&mut self, address: u32, value: u32) -> Result<(), OutOfRange> {
        self.write_bytes(address, &value.to_be_bytes())
    }

    pub fn write_command(&mut self, address: u32, command: Command) -> Result<(), OutOfRange> {
        self.write_bytes(address, &command.to_be_bytes())
    }

    pub fn write_display_list(&mut self, address: u32, commands: &[Command]) -> Result<(), OutOfRange> {
        let bytes: Vec<u8> = commands.iter().flat_map(|c| c.to_be_bytes()).collect();
        self.write_bytes(address, &bytes)
    }
}

impl Default for Rdram {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE)
    }
}

impl Memory for Rdram {
    #[inline(always)]
    fn bytes(&self, address: u32, len: usize) -> Option<&[u8]> {
        self.data.bytes(address, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_are_big_endian() {
        let mem: &[u8] = &[0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0];
        assert_eq!(mem.read_u16(0), Some(0x1234));
        assert_eq!(mem.read_u32(4), Some(0x9ABC_DEF0));
        assert_eq!(mem.read_i16(6), Some(0xDEF0_u16 as i16));
        assert_eq!(mem.read_command(0), Some(Command::new(0x1234_5678, 0x9ABC_DEF0)));
    }

    #[test]
    fn reads_past_the_end_are_none() {
        let mem: &[u8] = &[0; 8];
        assert_eq!(mem.read_u32(6), None);
        assert_eq!(mem.read_command(1), None);
        assert_eq!(mem.bytes(u32::MAX, 2), None);
    }

    #[test]
    fn rdram_writes_display_lists() {
        let mut ram = Rdram::new(0x100);
        let list = [Command::new(0xE700_0000, 0), Command::new(0xDF00_0000, 0)];
        ram.write_display_list(0x40, &list).unwrap();
        assert_eq!(ram.read_command(0x40), Some(list[0]));
        assert_eq!(ram.read_command(0x48), Some(list[1]));
    }

    #[test]
    fn rdram_rejects_writes_out_of_range() {
        let mut ram = Rdram::new(0x10);
        assert_eq!(ram.write_u32(0x0E, 1), Err(OutOfRange { address: 0x0E, len: 4 }));
        assert_eq!(ram.read_u32(0x0C), Some(0));
    }
}
