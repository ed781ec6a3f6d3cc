// Driver for SSD16xx bistable (e-paper) panels over SPI plus DC/CS/RESET/BUSY.
//
// Owns a 1bpp framebuffer and either streams it as stored or doubles it
// to twice the stored resolution on the way out.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod config;
pub mod drivers;
pub mod error;

pub use config::{BusyPolicy, Orientation, PanelConfig, SPI_FREQ_HZ, SPI_MODE, Scaling};
pub use drivers::command::RefreshMode;
pub use drivers::epd::{DisplayDriver, State};
pub use drivers::framebuffer::{BACKGROUND, FOREGROUND, FrameBuffer};
pub use drivers::interface::DisplayInterface;
pub use error::Error;
