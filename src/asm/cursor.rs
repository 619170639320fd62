use crate::error::BoundaryError;
use crate::isa::p2::{Region, COG_SIZE, FIT_DEFAULT_COG, HUB_ADDR0, LUT_END, MEM_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Cog,
    Hub,
}

/// Emission position. Code is always stored at `hub`; in cog mode the
/// execution address is the cog/LUT long address derived from `cog`.
#[derive(Debug, Clone)]
pub struct Cursor {
    mode: Mode,
    region: Region,
    cog: u32, // bytes
    hub: u32,
}

impl Default for Cursor {
    fn default() -> Self {
        Self { mode: Mode::Cog, region: Region::Cog, cog: 0, hub: 0 }
    }
}

impl Cursor {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn region(&self) -> Region {
        match self.mode {
            Mode::Hub => Region::Hub,
            Mode::Cog => self.region,
        }
    }

    pub fn pc(&self) -> u32 {
        match self.mode {
            Mode::Cog => self.cog / 4,
            Mode::Hub => self.hub,
        }
    }

    pub fn pc_bytes(&self) -> u32 {
        match self.mode {
            Mode::Cog => self.cog,
            Mode::Hub => self.hub,
        }
    }

    pub fn hub(&self) -> u32 {
        self.hub
    }

    fn cog_limit(&self) -> u32 {
        match self.region {
            Region::Lut => LUT_END,
            _ => COG_SIZE,
        }
    }

    pub fn org(&mut self, addr: u32) -> Result<(), BoundaryError> {
        if addr >= LUT_END {
            return Err(BoundaryError::Origin { region: Region::Lut, addr, limit: LUT_END });
        }
        self.mode = Mode::Cog;
        self.region = Region::of_pc(addr);
        self.cog = addr * 4;
        Ok(())
    }

    /// Switches to hub mode. Without an address the hub position is kept,
    /// but never below $400.
    pub fn orgh(&mut self, addr: Option<u32>) -> Result<(), BoundaryError> {
        let target = addr.unwrap_or(self.hub.max(HUB_ADDR0));
        if target < HUB_ADDR0 {
            return Err(BoundaryError::HubOriginLow { addr: target, min: HUB_ADDR0 });
        }
        if target >= MEM_SIZE {
            return Err(BoundaryError::AddressLimit { region: Region::Hub, addr: target, limit: MEM_SIZE });
        }
        self.mode = Mode::Hub;
        self.hub = target;
        Ok(())
    }

    pub fn orgf_fill(&self, target: u32) -> Result<u32, BoundaryError> {
        let here = self.pc_bytes().div_ceil(4);
        if target < here {
            return Err(BoundaryError::OrgfBackwards { target, addr: here });
        }
        Ok(target - here)
    }

    pub fn fit(&self, limit: Option<u32>) -> Result<(), BoundaryError> {
        let (limit, addr) = match self.mode {
            Mode::Cog => {
                let default = if self.region == Region::Lut { LUT_END } else { FIT_DEFAULT_COG };
                (limit.unwrap_or(default), self.cog.div_ceil(4))
            }
            Mode::Hub => (limit.unwrap_or(MEM_SIZE), self.hub),
        };
        if addr > limit {
            return Err(BoundaryError::Fit { limit, addr });
        }
        Ok(())
    }

    pub fn padding(&self, multiple: u32) -> u32 {
        let at = self.pc_bytes();
        (multiple - at % multiple) % multiple
    }

    /// Moves past `bytes` emitted bytes. The move always happens so later
    /// lines keep their addresses; crossing a limit is reported.
    pub fn advance(&mut self, bytes: u32) -> Result<(), BoundaryError> {
        let check = self.room(bytes as u64);
        if self.mode == Mode::Cog {
            self.cog = self.cog.saturating_add(bytes);
        }
        self.hub = self.hub.saturating_add(bytes);
        check
    }

    /// `RES`: cog mode reserves cog longs only. A count that does not fit
    /// leaves the cursor where it was.
    pub fn reserve(&mut self, longs: u32) -> Result<(), BoundaryError> {
        let bytes = longs as u64 * 4;
        match self.mode {
            Mode::Cog => {
                self.check_cog(bytes)?;
                self.cog += bytes as u32;
                Ok(())
            }
            Mode::Hub => {
                self.room(bytes)?;
                self.advance(bytes as u32)
            }
        }
    }

    pub fn room(&self, bytes: u64) -> Result<(), BoundaryError> {
        if self.mode == Mode::Cog {
            self.check_cog(bytes)?;
        }
        if bytes > 0 && self.hub as u64 + bytes > MEM_SIZE as u64 {
            return Err(BoundaryError::AddressLimit { region: Region::Hub, addr: self.hub, limit: MEM_SIZE });
        }
        Ok(())
    }

    fn check_cog(&self, bytes: u64) -> Result<(), BoundaryError> {
        let limit = self.cog_limit();
        let end = (self.cog as u64 + bytes).div_ceil(4);
        if bytes > 0 && end > limit as u64 {
            return Err(BoundaryError::AddressLimit { region: self.region, addr: self.cog / 4, limit });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cog_code_counts_longs_and_loads_bytes() {
        let mut c = Cursor::default();
        c.advance(8).unwrap();
        assert_eq!((c.pc(), c.hub()), (2, 8));
        c.reserve(4).unwrap();
        assert_eq!((c.pc(), c.hub()), (6, 8));
    }

    #[test]
    fn oversized_res_leaves_the_cursor_alone() {
        let mut c = Cursor::default();
        c.advance(4).unwrap();
        assert_eq!(
            c.reserve(0x4000_0000),
            Err(BoundaryError::AddressLimit { region: Region::Cog, addr: 1, limit: 0x200 })
        );
        assert_eq!((c.pc(), c.hub()), (1, 4));
        c.advance(4).unwrap();
        assert_eq!(c.pc(), 2);

        c.orgh(Some(0xF_FFF0)).unwrap();
        assert!(c.reserve(u32::MAX).is_err());
        assert_eq!(c.hub(), 0xF_FFF0);
        c.reserve(4).unwrap();
        assert_eq!(c.hub(), 0x10_0000);
    }

    #[test]
    fn room_counts_past_u32() {
        let c = Cursor::default();
        assert!(c.room(0x800).is_ok());
        assert!(c.room(0x804).is_err());
        assert!(c.room(u32::MAX as u64 * 4).is_err());
    }

    #[test]
    fn lut_origin_and_limit() {
        let mut c = Cursor::default();
        c.org(0x3FF).unwrap();
        assert_eq!(c.region(), Region::Lut);
        c.advance(4).unwrap();
        assert_eq!(
            c.advance(4),
            Err(BoundaryError::AddressLimit { region: Region::Lut, addr: 0x400, limit: 0x400 })
        );
        assert!(c.org(0x400).is_err());
    }

    #[test]
    fn hub_mode_needs_400() {
        let mut c = Cursor::default();
        assert_eq!(c.orgh(Some(0x100)), Err(BoundaryError::HubOriginLow { addr: 0x100, min: 0x400 }));
        c.orgh(None).unwrap();
        assert_eq!((c.region(), c.pc()), (Region::Hub, 0x400));
    }

    #[test]
    fn fit_defaults_to_1f0() {
        let mut c = Cursor::default();
        c.org(0x1F0).unwrap();
        assert!(c.fit(None).is_ok());
        c.advance(4).unwrap();
        assert_eq!(c.fit(None), Err(BoundaryError::Fit { limit: 0x1F0, addr: 0x1F1 }));
    }
}
