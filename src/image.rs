use anyhow::Result;
use std::path::Path;

/// A run of code bytes mapped at a base address.
#[derive(Debug, Clone)]
pub struct Segment {
    pub name: String,
    pub base: u64,
    pub bytes: Vec<u8>,
}

/// The "read code at address" collaborator: a loaded binary as a list of
/// segments, windowed into byte slices for the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct Image {
    pub segments: Vec<Segment>,
}

pub fn load_raw_bin(path: &Path, base: u64, skip: usize, len: Option<usize>) -> Result<Image> {
    let file = std::fs::read(path)?;
    anyhow::ensure!(skip <= file.len(), "--skip exceeds file size");
    let mut payload = &file[skip..];
    if let Some(lim) = len {
        anyhow::ensure!(lim <= payload.len(), "--len exceeds remaining file size after skip");
        payload = &payload[..lim];
    }
    let seg = Segment { name: "segment0".into(), base, bytes: payload.to_vec() };
    Ok(Image { segments: vec![seg] })
}

impl Image {
    /// The bytes from `addr` to the end of its segment, if mapped.
    pub fn window(&self, addr: u64) -> Option<&[u8]> {
        for s in &self.segments {
            let end = s.base.wrapping_add(s.bytes.len() as u64);
            if addr >= s.base && addr < end {
                let off = (addr - s.base) as usize;
                return Some(&s.bytes[off..]);
            }
        }
        None
    }

    pub fn is_mapped(&self, addr: u64) -> bool {
        self.window(addr).is_some()
    }
}
