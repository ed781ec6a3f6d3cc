// Hardware capability handle: SPI bus plus DC, CS, RESET and BUSY.
//
// Framing follows the controller's expectations exactly. Every transfer
// starts with a fresh CS assertion (high then low), and a command's
// parameters are sent in a second assertion with DC high. CS is driven
// manually, so the bus must be a raw `SpiBus`, not a `SpiDevice`.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;

use super::command::Command;
use crate::config::BusyPolicy;
use crate::error::Error;

const RESET_DELAY_MS: u32 = 10;

pub struct DisplayInterface<SPI, DC, CS, RST, BUSY, DELAY> {
    spi: SPI,
    /// Low for command, high for data.
    dc: DC,
    /// Active low.
    cs: CS,
    rst: RST,
    /// High while the controller is working.
    busy: BUSY,
    delay: DELAY,
    policy: BusyPolicy,
}

impl<SPI, DC, CS, RST, BUSY, DELAY> DisplayInterface<SPI, DC, CS, RST, BUSY, DELAY>
where
    SPI: SpiBus,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    DELAY: DelayNs,
{
    pub fn new(spi: SPI, dc: DC, cs: CS, rst: RST, busy: BUSY, delay: DELAY) -> Self {
        Self {
            spi,
            dc,
            cs,
            rst,
            busy,
            delay,
            policy: BusyPolicy::new(),
        }
    }

    pub fn set_busy_policy(&mut self, policy: BusyPolicy) {
        self.policy = policy;
    }

    pub fn busy_policy(&self) -> BusyPolicy {
        self.policy
    }

    /// Hands the peripherals back.
    pub fn release(self) -> (SPI, DC, CS, RST, BUSY, DELAY) {
        (self.spi, self.dc, self.cs, self.rst, self.busy, self.delay)
    }

    // ── Reset / busy ────────────────────────────────────────

    pub fn reset(&mut self) -> Result<(), Error> {
        self.delay.delay_ms(RESET_DELAY_MS);
        self.rst.set_low().map_err(Error::pin)?;
        self.delay.delay_ms(RESET_DELAY_MS);
        self.rst.set_high().map_err(Error::pin)?;
        self.delay.delay_ms(RESET_DELAY_MS);
        Ok(())
    }

    pub fn is_busy(&mut self) -> Result<bool, Error> {
        self.busy.is_high().map_err(Error::pin)
    }

    /// Blocks until BUSY drops, sleeping `poll_interval_ms` between reads.
    pub fn wait_busy(&mut self) -> Result<(), Error> {
        let BusyPolicy {
            poll_interval_ms,
            timeout_ms,
        } = self.policy;
        let mut waited_ms: u32 = 0;

        while self.is_busy()? {
            if let Some(limit) = timeout_ms {
                if waited_ms >= limit {
                    log::error!("[EPD] busy timeout after {}ms", waited_ms);
                    return Err(Error::PanelNotResponding { waited_ms });
                }
            }
            self.delay.delay_ms(poll_interval_ms);
            waited_ms = waited_ms.saturating_add(poll_interval_ms);
        }

        if waited_ms > 0 {
            log::debug!("[EPD] busy cleared after {}ms", waited_ms);
        }
        Ok(())
    }

    pub fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    // ── Framing ─────────────────────────────────────────────

    pub fn send_command(&mut self, cmd: Command) -> Result<(), Error> {
        self.select()?;
        self.dc.set_low().map_err(Error::pin)?;
        self.write(&[cmd.opcode()])?;

        let params = cmd.params();
        if !params.is_empty() {
            self.select()?;
            self.dc.set_high().map_err(Error::pin)?;
            self.write(params.as_slice())?;
        }

        self.deselect()
    }

    /// Opens a data phase; follow with `write` calls and `end_data`.
    pub fn begin_data(&mut self) -> Result<(), Error> {
        self.select()?;
        self.dc.set_high().map_err(Error::pin)
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.spi.write(bytes).map_err(Error::spi)
    }

    pub fn end_data(&mut self) -> Result<(), Error> {
        self.deselect()
    }

    // high then low: a fresh assertion even if CS was already low
    fn select(&mut self) -> Result<(), Error> {
        self.cs.set_high().map_err(Error::pin)?;
        self.cs.set_low().map_err(Error::pin)
    }

    fn deselect(&mut self) -> Result<(), Error> {
        self.spi.flush().map_err(Error::spi)?;
        self.cs.set_high().map_err(Error::pin)
    }
}
