// Panel geometry and timing configuration.
//
// A panel is described once, at construction, and never changes. The
// half-resolution preset is the shipping hardware: a 400x300 SSD16xx
// glass fed from a 200x150 buffer that is doubled on the way out.

use embedded_hal::spi::{MODE_0, Mode};

/// SPI clock the controller is driven at. Boards configure their bus with
/// this before handing it to the driver.
pub const SPI_FREQ_HZ: u32 = 1_000_000;

/// SPI mode (CPOL=0, CPHA=0), 8-bit words.
pub const SPI_MODE: Mode = MODE_0;

/// Default BUSY poll interval.
pub const BUSY_POLL_MS: u32 = 10;

/// How the stored framebuffer maps onto the panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scaling {
    /// One stored bit per panel pixel.
    Native,
    /// One stored bit per 2x2 panel block, expanded during transmission.
    Double,
}

impl Scaling {
    pub const fn factor(self) -> u16 {
        match self {
            Scaling::Native => 1,
            Scaling::Double => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    /// Reduced panels rotate the image 180° in this orientation.
    #[default]
    Normal,
    UpsideDown,
}

impl Orientation {
    pub const fn from_upside_down(upside_down: bool) -> Self {
        if upside_down {
            Orientation::UpsideDown
        } else {
            Orientation::Normal
        }
    }
}

/// BUSY polling policy. `timeout_ms: None` waits forever.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusyPolicy {
    pub poll_interval_ms: u32,
    pub timeout_ms: Option<u32>,
}

impl BusyPolicy {
    pub const fn new() -> Self {
        Self {
            poll_interval_ms: BUSY_POLL_MS,
            timeout_ms: None,
        }
    }

    pub const fn with_poll_interval_ms(mut self, ms: u32) -> Self {
        // zero would spin without ever advancing the timeout clock
        self.poll_interval_ms = if ms == 0 { 1 } else { ms };
        self
    }

    pub const fn with_timeout_ms(mut self, ms: u32) -> Self {
        self.timeout_ms = Some(ms);
        self
    }
}

impl Default for BusyPolicy {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelConfig {
    /// Logical width in pixels.
    pub width: u16,
    /// Logical height in pixels.
    pub height: u16,
    /// Column offset applied before mirroring (reduced panels only).
    pub offset: u16,
    pub scaling: Scaling,
    /// Native frames are written this many times per RAM plane.
    pub native_repeats: u8,
    pub busy: BusyPolicy,
}

impl PanelConfig {
    /// 400x300 panel driven from a 200x150 buffer.
    pub const HALF_RES_400X300: Self = Self::new(200, 150, Scaling::Double);

    /// 400x300 panel driven from a full-size buffer.
    pub const NATIVE_400X300: Self = Self::new(400, 300, Scaling::Native);

    pub const fn new(width: u16, height: u16, scaling: Scaling) -> Self {
        Self {
            width,
            height,
            offset: 0,
            scaling,
            native_repeats: 4,
            busy: BusyPolicy::new(),
        }
    }

    pub const fn with_offset(mut self, offset: u16) -> Self {
        self.offset = offset;
        self
    }

    pub const fn with_busy(mut self, busy: BusyPolicy) -> Self {
        self.busy = busy;
        self
    }

    pub const fn with_native_repeats(mut self, repeats: u8) -> Self {
        self.native_repeats = repeats;
        self
    }

    /// Bits stored per row, including the column offset.
    pub const fn stored_width(&self) -> u16 {
        match self.scaling {
            Scaling::Double => self.width + self.offset,
            Scaling::Native => self.width,
        }
    }

    /// Bytes per stored row.
    pub const fn stride(&self) -> usize {
        (self.stored_width() as usize).div_ceil(8)
    }

    pub const fn rows(&self) -> usize {
        self.height as usize
    }

    pub const fn buffer_len(&self) -> usize {
        self.stride() * self.rows()
    }

    /// Panel width in pixels as seen by the controller RAM.
    pub const fn panel_width(&self) -> u16 {
        (self.stride() as u16) * 8 * self.scaling.factor()
    }

    /// Panel height in gate lines as seen by the controller RAM.
    pub const fn panel_height(&self) -> u16 {
        self.height * self.scaling.factor()
    }

    /// Bytes in one full RAM plane.
    pub const fn ram_len(&self) -> usize {
        (self.panel_width() as usize / 8) * self.panel_height() as usize
    }
}
