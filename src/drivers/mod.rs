// SSD16xx e-paper driver, board-independent.
//
// Leaves first: the command set and expansion table have no hardware
// dependencies; the interface owns the pins; the session in `epd` ties
// framebuffer, transmitter and interface together.

pub mod command;
pub mod epd;
pub mod expand;
pub mod framebuffer;
pub mod interface;
pub mod transmit;

#[cfg(test)]
mod mock;
