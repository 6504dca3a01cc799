//! Address-range mapped device registry.
//!
//! Devices are searched in registration order. Ranges may overlap: a write
//! lands in every device whose window contains the address, and a read
//! returns the value of the last such device.

use crate::error::RegistrationError;

/// A byte-addressable window the CPU can see on its bus.
///
/// The device owns its storage. Offsets passed in are relative to the start
/// address the device was registered at and always below `size()`.
pub trait Device {
    /// Length of the window in bytes.
    fn size(&self) -> usize;

    fn read(&mut self, offset: u16) -> u8;

    fn write(&mut self, offset: u16, value: u8);
}

/// Handle returned by registration, usable with [`Bus::device_mut`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(usize);

struct Mapping {
    start: u16,
    len: usize,
    device: Box<dyn Device>,
}

impl Mapping {
    fn offset_of(&self, addr: u16) -> Option<u16> {
        let offset = addr.checked_sub(self.start)?;
        ((offset as usize) < self.len).then_some(offset)
    }
}

#[derive(Default)]
pub struct Bus {
    devices: Vec<Mapping>,
    unmapped_accesses: u64,
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a device mapped at `start`. The window must be non-empty and
    /// end at or before `0xFFFF`.
    pub fn register<D: Device + 'static>(
        &mut self,
        start: u16,
        device: D,
    ) -> Result<DeviceId, RegistrationError> {
        let len = device.size();
        if len == 0 || start as usize + len > 0x1_0000 {
            return Err(RegistrationError::InvalidRange { start, len });
        }

        self.devices.try_reserve(1)?;
        self.devices.push(Mapping {
            start,
            len,
            device: Box::new(device),
        });
        log::debug!(
            "Registered device #{} at 0x{:04X}-0x{:04X}",
            self.devices.len() - 1,
            start,
            start as usize + len - 1
        );
        Ok(DeviceId(self.devices.len() - 1))
    }

    pub fn device_mut(&mut self, id: DeviceId) -> Option<&mut dyn Device> {
        let mapping = self.devices.get_mut(id.0)?;
        Some(mapping.device.as_mut())
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Number of reads and writes that matched no device.
    pub fn unmapped_accesses(&self) -> u64 {
        self.unmapped_accesses
    }

    pub fn read(&mut self, addr: u16) -> u8 {
        let mut value = None;
        for mapping in self.devices.iter_mut() {
            if let Some(offset) = mapping.offset_of(addr) {
                value = Some(mapping.device.read(offset));
            }
        }

        value.unwrap_or_else(|| {
            self.unmapped_accesses += 1;
            log::debug!("Unmapped read at 0x{:04X}", addr);
            0
        })
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        let mut hit = false;
        for mapping in self.devices.iter_mut() {
            if let Some(offset) = mapping.offset_of(addr) {
                mapping.device.write(offset, value);
                hit = true;
            }
        }

        if !hit {
            self.unmapped_accesses += 1;
            log::debug!("Unmapped write at 0x{:04X}: value={:02X}", addr, value);
        }
    }

    /// Little-endian word read; the high byte comes from `addr + 1`,
    /// wrapping at the top of memory.
    pub fn read_word(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }
}
