//! Framebuffer variants for small SPI TFT panels: 16-bit 565, 32-bit 666
//! and a bit-packed palette-indexed format down to 1 bit per pixel, behind
//! one pixel read/write contract with dirty-window tracking.

pub mod buffer;
pub mod color;
pub mod palette_map;

pub use buffer::{
    BufferError, BufferKind, DirtyWindow, IndexedBuffer, PixelBuffer, Rgb565Buffer, Rgb666Buffer,
};
pub use color::Color;
pub use palette_map::PaletteMap;
