// Bit-packed 1bpp framebuffer.
//
// Bit set = background (white), bit clear = foreground (black).
// Reduced (doubled) panels store rows mirrored and, in the normal
// orientation, rotated 180°; native panels map pixels directly.

use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::BinaryColor,
};

use crate::config::{Orientation, PanelConfig, Scaling};
use crate::error::Error;

/// `set_pixel` colour value that draws foreground; anything else erases.
pub const FOREGROUND: u8 = 1;
pub const BACKGROUND: u8 = 0;

pub struct FrameBuffer {
    buf: Vec<u8>,
    width: u16,
    height: u16,
    offset: u16,
    stride: usize,
    scaling: Scaling,
    orientation: Orientation,
}

impl FrameBuffer {
    /// Allocates a buffer filled with background.
    pub fn new(config: &PanelConfig) -> Result<Self, Error> {
        let len = config.buffer_len();
        let mut buf = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|_| Error::OutOfMemory { bytes: len })?;
        buf.resize(len, 0xFF);

        Ok(Self {
            buf,
            width: config.width,
            height: config.height,
            offset: config.offset,
            stride: config.stride(),
            scaling: config.scaling,
            orientation: Orientation::Normal,
        })
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Whole-byte fill; 0xFF = all background, 0x00 = all foreground.
    pub fn clear(&mut self, fill: u8) {
        self.buf.fill(fill);
    }

    /// `color == FOREGROUND` draws, any other value erases to background.
    /// Coordinates outside the panel, or rotated outside the buffer, are
    /// ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: u8) {
        let Some((idx, mask)) = self.locate(x, y) else {
            return;
        };

        let mut byte = self.buf[idx] | mask;
        if color == FOREGROUND {
            byte &= !mask;
        }
        self.buf[idx] = byte;
    }

    /// `Some(true)` for foreground, `None` where `set_pixel` would be a no-op.
    pub fn pixel(&self, x: u32, y: u32) -> Option<bool> {
        self.locate(x, y).map(|(idx, mask)| self.buf[idx] & mask == 0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Stored rows, top to bottom as the controller receives them.
    pub fn rows(&self) -> core::slice::Chunks<'_, u8> {
        // a zero-width panel has an empty buffer and no rows
        self.buf.chunks(self.stride.max(1))
    }

    // logical (x, y) -> (byte index, bit mask)
    fn locate(&self, x: u32, y: u32) -> Option<(usize, u8)> {
        if x >= self.width as u32 || y >= self.height as u32 {
            return None;
        }

        let (x, y) = (x as usize, y as usize);
        let (idx, mask) = match self.scaling {
            Scaling::Native => (y * self.stride + x / 8, 1u8 << (x % 8)),
            Scaling::Double => {
                // the normal rotation is W - x / H - y, so row 0 and column 0
                // land just past the stored image and are dropped
                let (col, row) = match self.orientation {
                    Orientation::UpsideDown => (x, y),
                    Orientation::Normal => (self.width as usize - x, self.height as usize - y),
                };
                if row >= self.height as usize {
                    return None;
                }
                // source columns run right to left within the stored row
                let col = (self.stride * 8 - 1).checked_sub(col + self.offset as usize)?;
                (row * self.stride + col / 8, 1u8 << (7 - col % 8))
            }
        };

        debug_assert!(idx < self.buf.len());
        Some((idx, mask))
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if coord.x < 0 || coord.y < 0 {
                continue;
            }
            let value = if color.is_on() { FOREGROUND } else { BACKGROUND };
            self.set_pixel(coord.x as u32, coord.y as u32, value);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        FrameBuffer::clear(self, if color.is_on() { 0x00 } else { 0xFF });
        Ok(())
    }
}
