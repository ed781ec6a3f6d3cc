// Framebuffer -> controller RAM streaming.
//
// Doubled panels never hold the full-resolution image: each stored row is
// widened through the expansion table into a small scratch buffer and
// sent twice, which doubles it vertically. Native panels send the buffer
// as stored.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;

use super::expand::EXPANSION;
use super::framebuffer::FrameBuffer;
use super::interface::DisplayInterface;
use crate::config::Scaling;
use crate::error::Error;

// expanded bytes staged per bus write
const SCRATCH_LEN: usize = 64;

pub struct Transmitter {
    scaling: Scaling,
    native_repeats: u8,
}

impl Transmitter {
    pub const fn new(scaling: Scaling, native_repeats: u8) -> Self {
        Self {
            scaling,
            native_repeats,
        }
    }

    /// Bytes one plane write puts on the bus.
    pub fn frame_len(&self, fb: &FrameBuffer) -> usize {
        let raw = fb.as_bytes().len();
        match self.scaling {
            Scaling::Double => raw * 4,
            Scaling::Native => raw * self.native_repeats as usize,
        }
    }

    /// Sends one stored row, widened on doubled panels.
    pub fn transmit_row<SPI, DC, CS, RST, BUSY, DELAY>(
        &self,
        iface: &mut DisplayInterface<SPI, DC, CS, RST, BUSY, DELAY>,
        row: &[u8],
    ) -> Result<(), Error>
    where
        SPI: SpiBus,
        DC: OutputPin,
        CS: OutputPin,
        RST: OutputPin,
        BUSY: InputPin,
        DELAY: DelayNs,
    {
        // once per row, not per byte: the controller only raises BUSY
        // between commands, and a row is one uninterrupted data burst
        iface.wait_busy()?;

        match self.scaling {
            Scaling::Native => iface.write(row),
            Scaling::Double => {
                let mut scratch = [0u8; SCRATCH_LEN];
                for chunk in row.chunks(SCRATCH_LEN / 2) {
                    for (i, &v) in chunk.iter().enumerate() {
                        let [hi, lo] = EXPANSION.expand(v);
                        scratch[2 * i] = hi;
                        scratch[2 * i + 1] = lo;
                    }
                    iface.write(&scratch[..chunk.len() * 2])?;
                }
                Ok(())
            }
        }
    }

    /// Streams the whole buffer as the data phase of a RAM write.
    /// The caller has already sent the RAM write opcode.
    pub fn stream<SPI, DC, CS, RST, BUSY, DELAY>(
        &self,
        iface: &mut DisplayInterface<SPI, DC, CS, RST, BUSY, DELAY>,
        fb: &FrameBuffer,
    ) -> Result<(), Error>
    where
        SPI: SpiBus,
        DC: OutputPin,
        CS: OutputPin,
        RST: OutputPin,
        BUSY: InputPin,
        DELAY: DelayNs,
    {
        iface.begin_data()?;

        match self.scaling {
            Scaling::Double => {
                for row in fb.rows() {
                    self.transmit_row(iface, row)?;
                    self.transmit_row(iface, row)?;
                }
            }
            Scaling::Native => {
                // controller-specific framing: the native frame goes out
                // `native_repeats` times per plane
                for _ in 0..self.native_repeats {
                    for row in fb.rows() {
                        self.transmit_row(iface, row)?;
                    }
                }
            }
        }

        iface.end_data()
    }
}
