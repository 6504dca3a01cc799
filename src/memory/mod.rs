use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::bus::Device;
use crate::error::MemoryError;

/// Zero-initialised read/write memory.
#[derive(Debug)]
pub struct Ram {
    data: Vec<u8>,
}

impl Ram {
    pub fn new(size: usize) -> Self {
        Ram { data: vec![0; size] }
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn load(&mut self, offset: usize, image: &[u8]) -> Result<(), MemoryError> {
        copy_image(&mut self.data, offset, image)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl Device for Ram {
    fn size(&self) -> usize {
        self.data.len()
    }

    fn read(&mut self, offset: u16) -> u8 {
        self.data[offset as usize]
    }

    fn write(&mut self, offset: u16, value: u8) {
        self.data[offset as usize] = value;
    }
}

/// Read-only memory. Bus writes are ignored; contents are set with `load`
/// before the device is registered.
#[derive(Debug)]
pub struct Rom {
    data: Vec<u8>,
    ignored_writes: u64,
}

impl Rom {
    pub fn new(size: usize) -> Self {
        Rom {
            data: vec![0; size],
            ignored_writes: 0,
        }
    }

    /// Number of bus writes dropped since the ROM was created.
    pub fn ignored_writes(&self) -> u64 {
        self.ignored_writes
    }

    /// Build a ROM of `size` bytes with `image` placed at `offset`.
    pub fn from_image(size: usize, offset: usize, image: &[u8]) -> Result<Self, MemoryError> {
        let mut rom = Self::new(size);
        rom.load(offset, image)?;
        Ok(rom)
    }

    pub fn load_from_file<P: AsRef<Path>>(
        path: P,
        size: usize,
        offset: usize,
    ) -> Result<Self, MemoryError> {
        let mut file = File::open(path)?;
        let mut image = Vec::new();
        file.read_to_end(&mut image)?;

        Self::from_image(size, offset, &image)
    }

    pub fn load(&mut self, offset: usize, image: &[u8]) -> Result<(), MemoryError> {
        copy_image(&mut self.data, offset, image)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl Device for Rom {
    fn size(&self) -> usize {
        self.data.len()
    }

    fn read(&mut self, offset: u16) -> u8 {
        self.data[offset as usize]
    }

    fn write(&mut self, offset: u16, value: u8) {
        self.ignored_writes += 1;
        log::debug!("Write to ROM offset 0x{:04X} ignored: value={:02X}", offset, value);
    }
}

fn copy_image(data: &mut [u8], offset: usize, image: &[u8]) -> Result<(), MemoryError> {
    let size = data.len();
    let end = offset
        .checked_add(image.len())
        .filter(|&end| end <= size)
        .ok_or(MemoryError::ImageTooLarge {
            offset,
            len: image.len(),
            size,
        })?;
    data[offset..end].copy_from_slice(image);
    Ok(())
}
