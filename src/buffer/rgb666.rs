use crate::buffer::{BufferCore, BufferError, BufferKind, PixelBuffer};
use crate::color::Color;
use tracing::{debug, error};

/// One `u32` per pixel holding the 18-bit 666 form, for higher-fidelity
/// panels. Reads back as 565 by re-expanding through [`Color`].
#[derive(Debug, Default)]
pub struct Rgb666Buffer {
    core: BufferCore,
    storage: Vec<u32>,
}

impl Rgb666Buffer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PixelBuffer for Rgb666Buffer {
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
            error!("could not allocate 666 buffer ({} pixels)", length);
            BufferError::from(err)
        })?;
        self.storage.resize(length, 0);
        debug!("666 buffer: {} pixels, {} bytes", length, length * 4);
        Ok(())
    }

    fn store_color(&mut self, x: u16, y: u16, color: Color) {
        let value = color.to_666(self.core.right_bit_aligned);
        let pos = self.position(x, y);
        self.storage[pos] = value;
    }

    fn fill_storage(&mut self, color: Color) {
        let value = color.to_666(self.core.right_bit_aligned);
        debug!("fill 666 buffer with {:#08x}", value);
        self.storage.fill(value);
    }

    fn pixel_to_565_at(&self, pos: usize) -> u16 {
        Color::from_666(self.storage[pos], self.core.right_bit_aligned)
            .to_565(self.core.right_bit_aligned)
    }

    fn pixel_to_666_at(&self, pos: usize) -> u32 {
        self.storage[pos]
    }

    fn buffer_size(&self) -> usize {
        self.storage.len() * std::mem::size_of::<u32>()
    }

    fn pixel_bit_width(&self) -> u8 {
        32
    }

    fn kind(&self) -> BufferKind {
        BufferKind::Rgb666
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_after_init() {
        let mut buffer = Rgb666Buffer::new();
        buffer.init(4, 4).unwrap();
        assert_eq!(buffer.buffer_length(), 16);
        assert_eq!(buffer.buffer_size(), 64);
        assert_eq!(buffer.pixel_bit_width(), 32);
        assert_eq!(buffer.kind(), BufferKind::Rgb666);
    }

    #[test]
    fn stores_in_the_configured_alignment() {
        let mut right = Rgb666Buffer::new();
        right.set_right_bit_aligned(true);
        right.init(2, 1).unwrap();
        right.set_pixel(0, 0, Color::rgb(255, 0, 0));
        assert_eq!(right.pixel_to_666(0, 0), 0x3F << 12);

        let mut bus = Rgb666Buffer::new();
        bus.init(2, 1).unwrap();
        bus.set_pixel(0, 0, Color::rgb(255, 0, 0));
        assert_eq!(bus.pixel_to_666(0, 0), 0xFC_00_00);
    }

    #[test]
    fn down_converts_to_565() {
        let mut buffer = Rgb666Buffer::new();
        buffer.set_right_bit_aligned(true);
        buffer.init(2, 2).unwrap();
        buffer.set_pixel(0, 1, Color::WHITE);
        assert_eq!(buffer.pixel_to_565(0, 1), 0xFFFF);
        buffer.set_pixel(1, 1, Color::rgb(0, 0, 255));
        assert_eq!(buffer.pixel_to_565(1, 1), 0x001F);
    }

    #[test]
    fn fill_reaches_every_pixel() {
        let mut buffer = Rgb666Buffer::new();
        buffer.set_right_bit_aligned(true);
        buffer.init(3, 3).unwrap();
        let blue = Color::rgb(0, 0, 255);
        buffer.fill(blue);
        for pos in 0..buffer.buffer_length() {
            assert_eq!(buffer.pixel_to_666_at(pos), 0x3F);
        }
        assert!(!buffer.dirty_window().is_empty());
    }
}
