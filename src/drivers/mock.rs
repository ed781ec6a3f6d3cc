// Recording embedded-hal doubles shared by the driver tests.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::spi::{self, SpiBus};

use super::interface::DisplayInterface;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Cs(bool),
    Dc(bool),
    Rst(bool),
    Byte(u8),
    DelayMs(u32),
}

pub type Log = Rc<RefCell<Vec<Event>>>;

pub struct MockSpi(pub Log);

impl spi::ErrorType for MockSpi {
    type Error = Infallible;
}

impl SpiBus for MockSpi {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        words.fill(0);
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        let mut log = self.0.borrow_mut();
        log.extend(words.iter().map(|&b| Event::Byte(b)));
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        read.fill(0);
        self.write(write)
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        let copy: Vec<u8> = words.to_vec();
        words.fill(0);
        self.write(&copy)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[derive(Clone, Copy)]
pub enum Line {
    Cs,
    Dc,
    Rst,
}

pub struct MockPin {
    log: Log,
    line: Line,
}

impl MockPin {
    fn record(&mut self, high: bool) {
        let ev = match self.line {
            Line::Cs => Event::Cs(high),
            Line::Dc => Event::Dc(high),
            Line::Rst => Event::Rst(high),
        };
        self.log.borrow_mut().push(ev);
    }
}

impl digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.record(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.record(true);
        Ok(())
    }
}

/// BUSY that reads high for `busy_polls` reads, or forever if `None`.
pub struct MockBusy {
    pub busy_polls: Option<u32>,
    pub reads: Rc<RefCell<u32>>,
}

impl digital::ErrorType for MockBusy {
    type Error = Infallible;
}

impl InputPin for MockBusy {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let mut reads = self.reads.borrow_mut();
        *reads += 1;
        Ok(match self.busy_polls {
            None => true,
            Some(n) if n > 0 => {
                self.busy_polls = Some(n - 1);
                true
            }
            Some(_) => false,
        })
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|h| !h)
    }
}

pub struct MockDelay(pub Log);

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().push(Event::DelayMs(ns / 1_000_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.borrow_mut().push(Event::DelayMs(ms));
    }
}

pub type MockInterface = DisplayInterface<MockSpi, MockPin, MockPin, MockPin, MockBusy, MockDelay>;

pub struct Rig {
    pub log: Log,
    pub busy_reads: Rc<RefCell<u32>>,
}

impl Rig {
    pub fn events(&self) -> Vec<Event> {
        self.log.borrow().clone()
    }

    pub fn take(&self) -> Vec<Event> {
        core::mem::take(&mut *self.log.borrow_mut())
    }

    /// Bytes written on the bus, in order.
    pub fn bytes(&self) -> Vec<u8> {
        self.log
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Byte(b) => Some(*b),
                _ => None,
            })
            .collect()
    }
}

pub fn interface(busy_polls: Option<u32>) -> (MockInterface, Rig) {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let reads = Rc::new(RefCell::new(0));
    let pin = |line| MockPin {
        log: log.clone(),
        line,
    };
    let iface = DisplayInterface::new(
        MockSpi(log.clone()),
        pin(Line::Dc),
        pin(Line::Cs),
        pin(Line::Rst),
        MockBusy {
            busy_polls,
            reads: reads.clone(),
        },
        MockDelay(log.clone()),
    );
    (
        iface,
        Rig {
            log,
            busy_reads: reads,
        },
    )
}

/// Splits a recorded log into framed transfers: (dc level, bytes) per CS
/// assertion.
pub fn frames(events: &[Event]) -> Vec<(bool, Vec<u8>)> {
    let mut out = Vec::new();
    let mut dc = true;
    let mut current: Option<(bool, Vec<u8>)> = None;
    for ev in events {
        match *ev {
            Event::Cs(false) => current = Some((dc, Vec::new())),
            Event::Cs(true) => {
                if let Some(f) = current.take() {
                    out.push(f);
                }
            }
            Event::Dc(level) => {
                dc = level;
                if let Some(f) = current.as_mut() {
                    f.0 = level;
                }
            }
            Event::Byte(b) => {
                if let Some(f) = current.as_mut() {
                    f.1.push(b);
                }
            }
            _ => {}
        }
    }
    out
}

/// Command transfers as (opcode, payload). The data frame following a
/// command (parameters, or the pixel stream of a RAM write) becomes its
/// payload.
pub fn commands(events: &[Event]) -> Vec<(u8, Vec<u8>)> {
    let mut out: Vec<(u8, Vec<u8>)> = Vec::new();
    let mut last_was_cmd = false;
    for (dc, bytes) in frames(events) {
        if !dc {
            out.push((bytes[0], Vec::new()));
            last_was_cmd = true;
        } else if last_was_cmd {
            if let Some(last) = out.last_mut() {
                last.1 = bytes;
            }
            last_was_cmd = false;
        }
    }
    out
}
