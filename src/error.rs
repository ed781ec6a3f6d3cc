// Driver error type.
//
// Bus and pin failures keep only the embedded-hal error kind so the
// driver stays generic over the board's concrete error types.

use core::fmt;

use embedded_hal::{digital, spi};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// SPI write or flush failed.
    Spi(spi::ErrorKind),
    /// DC, CS or RESET could not be driven, or BUSY could not be read.
    Pin(digital::ErrorKind),
    /// BUSY stayed asserted past the configured timeout.
    PanelNotResponding { waited_ms: u32 },
    /// The framebuffer could not be allocated.
    OutOfMemory { bytes: usize },
}

impl Error {
    pub(crate) fn spi<E: spi::Error>(e: E) -> Self {
        Error::Spi(e.kind())
    }

    pub(crate) fn pin<E: digital::Error>(e: E) -> Self {
        Error::Pin(e.kind())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Spi(kind) => write!(f, "spi bus error: {:?}", kind),
            Error::Pin(kind) => write!(f, "control line error: {:?}", kind),
            Error::PanelNotResponding { waited_ms } => {
                write!(f, "panel still busy after {}ms", waited_ms)
            }
            Error::OutOfMemory { bytes } => {
                write!(f, "cannot allocate {}B framebuffer", bytes)
            }
        }
    }
}

impl core::error::Error for Error {}
