use crate::buffer::{BufferCore, BufferError, BufferKind, PixelBuffer};
use crate::color::Color;
use tracing::{debug, error};

/// One `u16` per pixel, stored in the device's 565 form.
#[derive(Debug, Default)]
pub struct Rgb565Buffer {
    core: BufferCore,
    storage: Vec<u16>,
}

impl Rgb565Buffer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PixelBuffer for Rgb565Buffer {
    fn core(&self) -> &BufferCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BufferCore {
        &mut self.core
    }

    fn init(&mut self, width: u16, height: u16) -> Result<(), BufferError> {
        self.core.allocate(width, height)?;
        let length = self.buffer_length();
        self.storage.try_reserve_exact(length).map_err(|err| {
            error!("could not allocate 565 buffer ({} pixels)", length);
            BufferError::from(err)
        })?;
        self.storage.resize(length, 0);
        debug!("565 buffer: {} pixels, {} bytes", length, length * 2);
        Ok(())
    }

    fn store_color(&mut self, x: u16, y: u16, color: Color) {
        let value = color.to_565(self.core.right_bit_aligned);
        let pos = self.position(x, y);
        self.storage[pos] = value;
    }

    fn fill_storage(&mut self, color: Color) {
        let value = color.to_565(self.core.right_bit_aligned);
        debug!("fill 565 buffer with {:#06x}", value);
        self.storage.fill(value);
    }

    fn pixel_to_565_at(&self, pos: usize) -> u16 {
        self.storage[pos]
    }

    fn pixel_to_666_at(&self, pos: usize) -> u32 {
        Color::from_565(self.storage[pos]).to_666(self.core.right_bit_aligned)
    }

    fn buffer_size(&self) -> usize {
        self.storage.len() * std::mem::size_of::<u16>()
    }

    fn pixel_bit_width(&self) -> u8 {
        16
    }

    fn kind(&self) -> BufferKind {
        BufferKind::Rgb565
    }
}
