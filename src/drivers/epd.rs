// SSD16xx e-paper session: bring-up, RAM writes, refresh, deep sleep.
//
// One DisplayDriver owns the bus, the four control lines, the delay
// source and the framebuffer; nothing here is global. The bring-up byte
// sequence is fixed controller protocol and must stay in this order.
//
//   Uninitialized -> init/slow_init -> Ready -> show*/update* -> Ready
//                                      Ready -> sleep -> Sleeping
//                                   Sleeping -> fast_init -> Ready

use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::BinaryColor,
};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;
use log::{debug, info, warn};

use super::command::{Command, RefreshMode, SEQ_LOAD_TEMPERATURE};
use super::framebuffer::FrameBuffer;
use super::interface::DisplayInterface;
use super::transmit::Transmitter;
use crate::config::{Orientation, PanelConfig, SPI_FREQ_HZ, Scaling};
use crate::error::Error;

const SLEEP_SETTLE_MS: u32 = 100;

// Bring-up parameters
const UPDATE_CTRL1: (u8, u8) = (0x40, 0x00); // bypass previous plane as 0
const BORDER_WAVEFORM: u8 = 0x05;
const FAST_TEMPERATURE: u8 = 0x6E;
const DATA_ENTRY_X_INC_Y_DEC: u8 = 0x01;
const DEEP_SLEEP_MODE_1: u8 = 0x01;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Uninitialized,
    Ready,
    Sleeping,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BringUp {
    Standard,
    /// Preloads a high temperature so the fast waveform is selected.
    Fast,
}

pub struct DisplayDriver<SPI, DC, CS, RST, BUSY, DELAY> {
    iface: DisplayInterface<SPI, DC, CS, RST, BUSY, DELAY>,
    fb: FrameBuffer,
    tx: Transmitter,
    config: PanelConfig,
    state: State,
    initialized: bool,
}

impl<SPI, DC, CS, RST, BUSY, DELAY> DisplayDriver<SPI, DC, CS, RST, BUSY, DELAY>
where
    SPI: SpiBus,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    DELAY: DelayNs,
{
    /// Allocates the framebuffer; no bus traffic until `init`.
    pub fn new(
        mut iface: DisplayInterface<SPI, DC, CS, RST, BUSY, DELAY>,
        config: PanelConfig,
    ) -> Result<Self, Error> {
        let fb = FrameBuffer::new(&config)?;
        iface.set_busy_policy(config.busy);

        Ok(Self {
            iface,
            fb,
            tx: Transmitter::new(config.scaling, config.native_repeats),
            config,
            state: State::Uninitialized,
            initialized: false,
        })
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.fb
    }

    pub fn framebuffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.fb
    }

    pub fn is_busy(&mut self) -> Result<bool, Error> {
        self.iface.is_busy()
    }

    /// Blocks until BUSY drops, bounded by the panel's `BusyPolicy`.
    pub fn wait_busy(&mut self) -> Result<(), Error> {
        self.iface.wait_busy()
    }

    /// Gives back the hardware; the framebuffer is dropped.
    pub fn release(self) -> DisplayInterface<SPI, DC, CS, RST, BUSY, DELAY> {
        self.iface
    }

    // ── Bring-up ────────────────────────────────────────────

    /// First call runs the full bring-up; later calls do nothing.
    pub fn init(&mut self, upside_down: bool) -> Result<(), Error> {
        if self.initialized {
            return Ok(());
        }

        let orientation = Orientation::from_upside_down(upside_down);
        if upside_down && self.config.scaling == Scaling::Native {
            warn!("[EPD] native panels ignore orientation");
        }
        self.fb.set_orientation(orientation);

        info!(
            "[EPD] init {}x{} ({:?}), bus {}Hz mode 0",
            self.config.width, self.config.height, self.config.scaling, SPI_FREQ_HZ
        );

        self.slow_init()?;
        self.initialized = true;
        Ok(())
    }

    /// Standard bring-up followed by the panel stabilization cycle.
    /// The cycle starts from a blank buffer, so any drawing is discarded.
    pub fn slow_init(&mut self) -> Result<(), Error> {
        self.bring_up(BringUp::Standard)?;
        self.fb.clear(0xFF);

        match self.config.scaling {
            Scaling::Double => {
                self.show()?;
                self.update()?;
                self.sleep()?;
                self.fast_init()?;
            }
            Scaling::Native => {
                self.write_test_pattern()?;
                self.update()?;
            }
        }

        info!("[EPD] ready");
        Ok(())
    }

    /// Bring-up with the fast waveform selected; also wakes from sleep.
    pub fn fast_init(&mut self) -> Result<(), Error> {
        self.bring_up(BringUp::Fast)
    }

    pub fn reset(&mut self) -> Result<(), Error> {
        self.iface.reset()
    }

    fn bring_up(&mut self, mode: BringUp) -> Result<(), Error> {
        debug!("[EPD] bring-up {:?}", mode);

        self.iface.reset()?;
        self.iface.wait_busy()?;
        self.iface.send_command(Command::SwReset)?;
        self.iface.wait_busy()?;

        self.iface.send_command(Command::DisplayUpdateControl1(
            UPDATE_CTRL1.0,
            UPDATE_CTRL1.1,
        ))?;
        self.iface
            .send_command(Command::BorderWaveform(BORDER_WAVEFORM))?;

        if mode == BringUp::Fast {
            self.iface
                .send_command(Command::WriteTemperature(FAST_TEMPERATURE))?;
            self.iface
                .send_command(Command::DisplayUpdateControl2(SEQ_LOAD_TEMPERATURE))?;
            self.iface.send_command(Command::MasterActivation)?;
            self.iface.wait_busy()?;
        }

        self.set_ram_window()?;
        self.state = State::Ready;
        Ok(())
    }

    // X increments, Y decrements from the last gate line
    fn set_ram_window(&mut self) -> Result<(), Error> {
        let x_end = (self.config.panel_width() / 8).saturating_sub(1) as u8;
        let y_start = self.config.panel_height().saturating_sub(1);

        self.iface
            .send_command(Command::DataEntryMode(DATA_ENTRY_X_INC_Y_DEC))?;
        self.iface
            .send_command(Command::RamXRange { start: 0, end: x_end })?;
        self.iface.send_command(Command::RamYRange {
            start: y_start,
            end: 0,
        })?;
        self.iface.send_command(Command::RamXCounter(0))?;
        self.iface.send_command(Command::RamYCounter(y_start))
    }

    // alternating white/black bytes across the whole RAM plane
    fn write_test_pattern(&mut self) -> Result<(), Error> {
        const PAIR: [u8; 2] = [0xFF, 0x00];

        self.iface.send_command(Command::WriteRam)?;
        self.iface.begin_data()?;
        let len = self.config.ram_len();
        for _ in 0..len / 2 {
            self.iface.write(&PAIR)?;
        }
        if len % 2 == 1 {
            self.iface.write(&PAIR[..1])?;
        }
        self.iface.end_data()
    }

    // ── Drawing ─────────────────────────────────────────────

    pub fn clear(&mut self, fill: u8) {
        self.fb.clear(fill);
    }

    /// `color == 1` draws foreground, anything else background.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: u8) {
        self.fb.set_pixel(x, y, color);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<bool> {
        self.fb.pixel(x, y)
    }

    // ── RAM writes / refresh ────────────────────────────────

    /// Writes the buffer to both RAM planes.
    pub fn show(&mut self) -> Result<(), Error> {
        self.write_plane(Command::WriteRam)?;
        self.write_plane(Command::WriteAltRam)
    }

    /// Writes the buffer to the current plane only.
    pub fn show_half(&mut self) -> Result<(), Error> {
        self.write_plane(Command::WriteRam)
    }

    fn write_plane(&mut self, cmd: Command) -> Result<(), Error> {
        self.check_awake("write");
        debug!(
            "[EPD] plane {:#04x}: {}B",
            cmd.opcode(),
            self.tx.frame_len(&self.fb)
        );
        self.iface.send_command(cmd)?;
        self.tx.stream(&mut self.iface, &self.fb)
    }

    pub fn update(&mut self) -> Result<(), Error> {
        self.refresh(RefreshMode::Full)
    }

    pub fn update_fast(&mut self) -> Result<(), Error> {
        self.refresh(RefreshMode::Fast)
    }

    pub fn update_partial(&mut self) -> Result<(), Error> {
        self.refresh(RefreshMode::Partial)
    }

    /// Runs one refresh waveform and blocks until BUSY drops.
    pub fn refresh(&mut self, mode: RefreshMode) -> Result<(), Error> {
        self.check_awake("refresh");
        debug!("[EPD] refresh {:?}", mode);
        self.iface
            .send_command(Command::DisplayUpdateControl2(mode.sequence()))?;
        self.iface.send_command(Command::MasterActivation)?;
        self.iface.wait_busy()
    }

    /// Deep sleep; `fast_init` is required before the next frame.
    pub fn sleep(&mut self) -> Result<(), Error> {
        self.iface
            .send_command(Command::DeepSleep(DEEP_SLEEP_MODE_1))?;
        self.iface.delay_ms(SLEEP_SETTLE_MS);
        self.state = State::Sleeping;
        Ok(())
    }

    fn check_awake(&self, op: &str) {
        match self.state {
            State::Ready => {}
            State::Sleeping => warn!("[EPD] {} while asleep; call fast_init first", op),
            State::Uninitialized => warn!("[EPD] {} before init", op),
        }
    }
}

impl<SPI, DC, CS, RST, BUSY, DELAY> OriginDimensions for DisplayDriver<SPI, DC, CS, RST, BUSY, DELAY> {
    fn size(&self) -> Size {
        self.fb.size()
    }
}

impl<SPI, DC, CS, RST, BUSY, DELAY> DrawTarget for DisplayDriver<SPI, DC, CS, RST, BUSY, DELAY> {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.fb.draw_iter(pixels)
    }
}
