//! Framebuffer variants behind one pixel read/write contract.

mod indexed;
mod rgb565;
mod rgb666;

pub use indexed::IndexedBuffer;
pub use rgb565::Rgb565Buffer;
pub use rgb666::Rgb666Buffer;

use crate::color::Color;
use std::collections::TryReserveError;
use std::fmt;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum BufferError {
    #[error(transparent)]
    Alloc(#[from] TryReserveError),
    #[error("buffer storage is already allocated; resizing is not supported")]
    AlreadyAllocated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    Rgb565,
    Rgb666,
    Indexed,
}

impl BufferKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BufferKind::Rgb565 => "565",
            BufferKind::Rgb666 => "666",
            BufferKind::Indexed => "indexed",
        }
    }
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounding box of every pixel written since the last reset.
///
/// Starts empty, widens monotonically on each write and only shrinks when
/// the owning driver resets it after flushing the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyWindow {
    x_low: u16,
    y_low: u16,
    x_high: u16,
    y_high: u16,
}

impl Default for DirtyWindow {
    fn default() -> Self {
        Self {
            x_low: u16::MAX,
            y_low: u16::MAX,
            x_high: 0,
            y_high: 0,
        }
    }
}

impl DirtyWindow {
    pub fn is_empty(&self) -> bool {
        self.x_low > self.x_high || self.y_low > self.y_high
    }

    pub fn x_low(&self) -> u16 {
        self.x_low
    }

    pub fn y_low(&self) -> u16 {
        self.y_low
    }

    pub fn x_high(&self) -> u16 {
        self.x_high
    }

    pub fn y_high(&self) -> u16 {
        self.y_high
    }

    /// Columns covered by the window, zero when empty.
    pub fn width(&self) -> u16 {
        if self.is_empty() {
            0
        } else {
            self.x_high - self.x_low + 1
        }
    }

    /// Rows covered by the window, zero when empty.
    pub fn height(&self) -> u16 {
        if self.is_empty() {
            0
        } else {
            self.y_high - self.y_low + 1
        }
    }

    pub(crate) fn expand(&mut self, x: u16, y: u16) {
        self.x_low = self.x_low.min(x);
        self.y_low = self.y_low.min(y);
        self.x_high = self.x_high.max(x);
        self.y_high = self.y_high.max(y);
    }

    pub(crate) fn cover(&mut self, width: u16, height: u16) {
        if width == 0 || height == 0 {
            return;
        }
        self.expand(0, 0);
        self.expand(width - 1, height - 1);
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Geometry and bookkeeping shared by every buffer variant.
#[derive(Debug, Default)]
pub struct BufferCore {
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) right_bit_aligned: bool,
    pub(crate) dirty: DirtyWindow,
    allocated: bool,
}

impl BufferCore {
    /// Fix the dimensions for the lifetime of the buffer. Storage is
    /// allocated exactly once; a second call fails fast.
    pub(crate) fn allocate(&mut self, width: u16, height: u16) -> Result<(), BufferError> {
        if self.allocated {
            return Err(BufferError::AlreadyAllocated);
        }
        self.width = width;
        self.height = height;
        self.allocated = true;
        Ok(())
    }
}

/// The contract a display driver consumes.
///
/// One concrete variant is chosen per display at construction time; the
/// driver then streams pixels without knowing the underlying bit width.
/// Bounds are the caller's responsibility, as is only touching a buffer
/// whose `init` succeeded.
pub trait PixelBuffer {
    fn core(&self) -> &BufferCore;
    fn core_mut(&mut self) -> &mut BufferCore;

    /// Allocate storage for `width * height` pixels at the variant's bit
    /// width. On failure the buffer is left unusable; there is no retry.
    fn init(&mut self, width: u16, height: u16) -> Result<(), BufferError>;

    /// Encode `color` and store it, without touching the dirty window.
    fn store_color(&mut self, x: u16, y: u16, color: Color);

    /// Store a pre-palettized index. Only meaningful on the indexed
    /// variant; direct-color buffers log and ignore it.
    fn store_index(&mut self, x: u16, y: u16, index: u8) {
        let _ = (x, y, index);
        debug!("palette index write ignored by {} buffer", self.kind());
    }

    /// Set every pixel to `color` without dirty bookkeeping; use
    /// [`fill`](PixelBuffer::fill).
    fn fill_storage(&mut self, color: Color);

    fn pixel_to_565_at(&self, pos: usize) -> u16;
    fn pixel_to_666_at(&self, pos: usize) -> u32;

    /// Total bytes occupied by storage.
    fn buffer_size(&self) -> usize;

    /// Bits used to store one pixel.
    fn pixel_bit_width(&self) -> u8;

    fn kind(&self) -> BufferKind;

    // Shared logic; the variants get dirty tracking and the coordinate
    // form of every accessor from here.

    fn width(&self) -> u16 {
        self.core().width
    }

    fn height(&self) -> u16 {
        self.core().height
    }

    /// Linear position of `(x, y)` in storage order.
    fn position(&self, x: u16, y: u16) -> usize {
        usize::from(x) + usize::from(y) * usize::from(self.core().width)
    }

    /// Addressable pixel slots in the frame.
    fn buffer_length(&self) -> usize {
        usize::from(self.core().width) * usize::from(self.core().height)
    }

    fn set_pixel(&mut self, x: u16, y: u16, color: Color) {
        self.store_color(x, y, color);
        self.core_mut().dirty.expand(x, y);
    }

    fn set_pixel_index(&mut self, x: u16, y: u16, index: u8) {
        self.store_index(x, y, index);
        self.core_mut().dirty.expand(x, y);
    }

    fn fill(&mut self, color: Color) {
        self.fill_storage(color);
        let (width, height) = (self.core().width, self.core().height);
        self.core_mut().dirty.cover(width, height);
    }

    fn pixel_to_565(&self, x: u16, y: u16) -> u16 {
        self.pixel_to_565_at(self.position(x, y))
    }

    fn pixel_to_666(&self, x: u16, y: u16) -> u32 {
        self.pixel_to_666_at(self.position(x, y))
    }

    fn dirty_window(&self) -> &DirtyWindow {
        &self.core().dirty
    }

    fn reset_dirty(&mut self) {
        self.core_mut().dirty.reset();
    }

    /// Configure how 565/666 values are bit-shifted for the target bus.
    /// Set once at configuration time, before any pixel is written.
    fn set_right_bit_aligned(&mut self, right_bit_aligned: bool) {
        self.core_mut().right_bit_aligned = right_bit_aligned;
    }

    fn right_bit_aligned(&self) -> bool {
        self.core().right_bit_aligned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_starts_empty() {
        let window = DirtyWindow::default();
        assert!(window.is_empty());
        assert_eq!(window.width(), 0);
        assert_eq!(window.height(), 0);
    }

    #[test]
    fn window_widens_to_bounding_box() {
        let mut window = DirtyWindow::default();
        window.expand(3, 5);
        window.expand(1, 7);
        assert_eq!(
            (window.x_low(), window.y_low(), window.x_high(), window.y_high()),
            (1, 5, 3, 7)
        );
        assert_eq!(window.width(), 3);
        assert_eq!(window.height(), 3);
    }

    #[test]
    fn window_reset_empties() {
        let mut window = DirtyWindow::default();
        window.expand(4, 4);
        assert!(!window.is_empty());
        window.reset();
        assert!(window.is_empty());
    }

    #[test]
    fn window_covers_whole_frame() {
        let mut window = DirtyWindow::default();
        window.cover(8, 6);
        assert_eq!(
            (window.x_low(), window.y_low(), window.x_high(), window.y_high()),
            (0, 0, 7, 5)
        );
        window.reset();
        window.cover(0, 6);
        assert!(window.is_empty());
    }

    #[test]
    fn core_allocates_once() {
        let mut core = BufferCore::default();
        core.allocate(4, 4).unwrap();
        assert!(matches!(
            core.allocate(8, 8),
            Err(BufferError::AlreadyAllocated)
        ));
    }
}
