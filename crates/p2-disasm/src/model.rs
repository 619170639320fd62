use anyhow::Result;
use std::path::Path;

/// A run of hub bytes loaded from disk.
#[derive(Debug, Clone)]
pub struct Segment {
    pub name: String,
    pub base: u32,
    pub bytes: Vec<u8>,
    pub perms: &'static str,
    pub kind: &'static str, // "hub" for raw images
}

#[derive(Debug, Clone)]
pub struct Image {
    pub segments: Vec<Segment>,
}

impl Image {
    /// Little-endian longs covering `[start, end)`; stops at the first
    /// unmapped long.
    pub fn words(&self, start: u32, end: u32) -> Vec<u32> {
        (start..end).step_by(4).map_while(|addr| read_u32(self, addr)).collect()
    }
}

/// Loads a raw hub image. P2 binaries load at hub $00000, so `base` is
/// normally 0.
pub fn load_raw_bin(path: &Path, base: u32, skip: usize, len: Option<usize>) -> Result<Image> {
    let file = std::fs::read(path)?;
    anyhow::ensure!(skip <= file.len(), "--skip exceeds file size");
    let mut payload = &file[skip..];
    if let Some(lim) = len {
        anyhow::ensure!(lim <= payload.len(), "--len exceeds remaining file size after skip");
        payload = &payload[..lim];
    }
    anyhow::ensure!(
        base as u64 + payload.len() as u64 <= propeller2_asm::isa::p2::MEM_SIZE as u64,
        "image does not fit into 1 MiB of hub RAM"
    );
    let seg = Segment { name: "hub".into(), base, bytes: payload.to_vec(), perms: "rwx", kind: "hub" };
    Ok(Image { segments: vec![seg] })
}

pub fn read_u8(img: &Image, addr: u32) -> Option<u8> {
    img.segments.iter().find_map(|s| {
        let off = addr.checked_sub(s.base)? as usize;
        s.bytes.get(off).copied()
    })
}

pub fn read_u32(img: &Image, addr: u32) -> Option<u32> {
    let b0 = read_u8(img, addr)?;
    let b1 = read_u8(img, addr.wrapping_add(1))?;
    let b2 = read_u8(img, addr.wrapping_add(2))?;
    let b3 = read_u8(img, addr.wrapping_add(3))?;
    Some(u32::from_le_bytes([b0, b1, b2, b3]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_maps_skip_and_len() {
        let path = std::env::temp_dir().join("_p2_disasm_test.bin");
        std::fs::write(&path, [0u8, 1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let img = load_raw_bin(&path, 0x400, 2, Some(6)).unwrap();
        assert_eq!(img.segments.len(), 1);
        let s = &img.segments[0];
        assert_eq!(s.base, 0x400);
        assert_eq!(s.bytes, vec![2, 3, 4, 5, 6, 7]);
        assert_eq!(read_u32(&img, 0x400).unwrap(), 0x05040302);
        assert!(read_u32(&img, 0x404).is_none());
        assert_eq!(img.words(0x400, 0x408), vec![0x05040302]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn loader_rejects_oversized_skip() {
        let path = std::env::temp_dir().join("_p2_disasm_skip.bin");
        std::fs::write(&path, [0u8; 4]).unwrap();
        assert!(load_raw_bin(&path, 0, 5, None).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
