use anyhow::{ensure, Result};
use serde::Serialize;

use crate::isa::p2::MEM_SIZE;

pub trait Bus {
    fn read_u8(&self, addr: u32) -> Result<u8>;
    fn read_u16(&self, addr: u32) -> Result<u16>;
    fn read_u32(&self, addr: u32) -> Result<u32>;
    fn write_u8(&mut self, addr: u32, val: u8) -> Result<()>;
    fn write_u16(&mut self, addr: u32, val: u16) -> Result<()>;
    fn write_u32(&mut self, addr: u32, val: u32) -> Result<()>;
}

/// The 1 MiB hub RAM image an assembly run loads into.
#[derive(Clone, Serialize)]
pub struct HubImage {
    #[serde(skip)]
    mem: Vec<u8>,
    high: u32,
}

impl Default for HubImage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HubImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubImage").field("high", &self.high).finish()
    }
}

impl HubImage {
    pub fn new() -> Self {
        Self { mem: vec![0; MEM_SIZE as usize], high: 0 }
    }

    /// Bytes up to the highest address written so far.
    pub fn bytes(&self) -> &[u8] {
        &self.mem[..self.high as usize]
    }

    pub fn len(&self) -> usize {
        self.high as usize
    }

    pub fn is_empty(&self) -> bool {
        self.high == 0
    }

    /// Stores as much of `data` as fits below the end of hub RAM and
    /// returns the number of bytes stored.
    pub fn store(&mut self, addr: u32, data: &[u8]) -> usize {
        if addr >= MEM_SIZE {
            return 0;
        }
        let start = addr as usize;
        let n = data.len().min(self.mem.len() - start);
        self.mem[start..start + n].copy_from_slice(&data[..n]);
        if n > 0 {
            self.high = self.high.max(addr + n as u32);
        }
        n
    }

    /// Clears the image for another run.
    pub fn clear(&mut self) {
        self.mem.fill(0);
        self.high = 0;
    }

    fn span(&self, addr: u32, width: u32) -> Result<std::ops::Range<usize>> {
        ensure!(
            addr.checked_add(width).is_some_and(|end| end <= MEM_SIZE),
            "hub address {addr:#07x} (+{width}) outside of hub RAM"
        );
        Ok(addr as usize..(addr + width) as usize)
    }
}

impl Bus for HubImage {
    fn read_u8(&self, addr: u32) -> Result<u8> {
        Ok(self.mem[self.span(addr, 1)?.start])
    }
    fn read_u16(&self, addr: u32) -> Result<u16> {
        let r = self.span(addr, 2)?;
        Ok(u16::from_le_bytes([self.mem[r.start], self.mem[r.start + 1]]))
    }
    fn read_u32(&self, addr: u32) -> Result<u32> {
        let r = self.span(addr, 4)?;
        let mut b = [0u8; 4];
        b.copy_from_slice(&self.mem[r]);
        Ok(u32::from_le_bytes(b))
    }
    fn write_u8(&mut self, addr: u32, val: u8) -> Result<()> {
        self.span(addr, 1)?;
        self.store(addr, &[val]);
        Ok(())
    }
    fn write_u16(&mut self, addr: u32, val: u16) -> Result<()> {
        self.span(addr, 2)?;
        self.store(addr, &val.to_le_bytes());
        Ok(())
    }
    fn write_u32(&mut self, addr: u32, val: u32) -> Result<()> {
        self.span(addr, 4)?;
        self.store(addr, &val.to_le_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn little_endian_longs_and_high_water_mark() {
        let mut hub = HubImage::new();
        hub.write_u32(0x400, 0xF600_0201).unwrap();
        assert_eq!(hub.read_u8(0x400).unwrap(), 0x01);
        assert_eq!(hub.read_u16(0x402).unwrap(), 0xF600);
        assert_eq!(hub.len(), 0x404);
        assert_eq!(&hub.bytes()[0x400..], &[0x01, 0x02, 0x00, 0xF6]);
    }

    #[test]
    fn stores_are_clipped_at_the_end_of_ram() {
        let mut hub = HubImage::new();
        assert_eq!(hub.store(MEM_SIZE - 2, &[1, 2, 3, 4]), 2);
        assert!(hub.write_u32(MEM_SIZE - 2, 0).is_err());
        assert_eq!(hub.len(), MEM_SIZE as usize);
    }
}
