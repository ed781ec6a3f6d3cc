// SSD16xx command set.
//
// Each variant carries its own parameters, so a command can only be built
// with the byte count the controller expects for it. RAM writes take no
// parameters; their pixel data follows as a separate data phase.

/// Refresh waveform selected through Display Update Control 2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshMode {
    Full,
    Fast,
    Partial,
}

impl RefreshMode {
    pub const fn sequence(self) -> u8 {
        match self {
            RefreshMode::Full => 0xF7,
            RefreshMode::Fast => 0xC7,
            RefreshMode::Partial => 0xFF,
        }
    }
}

/// Update sequence that loads the temperature register without refreshing.
pub const SEQ_LOAD_TEMPERATURE: u8 = 0x91;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    DeepSleep(u8),
    DataEntryMode(u8),
    SwReset,
    WriteTemperature(u8),
    MasterActivation,
    DisplayUpdateControl1(u8, u8),
    DisplayUpdateControl2(u8),
    WriteRam,    // current/new plane
    WriteAltRam, // previous plane
    BorderWaveform(u8),
    RamXRange { start: u8, end: u8 },
    RamYRange { start: u16, end: u16 },
    RamXCounter(u8),
    RamYCounter(u16),
}

pub const MAX_PARAMS: usize = 4;

/// Encoded parameter bytes of one command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Params {
    buf: [u8; MAX_PARAMS],
    len: usize,
}

impl Params {
    const fn from_slice(bytes: &[u8]) -> Self {
        let mut buf = [0u8; MAX_PARAMS];
        let mut i = 0;
        while i < bytes.len() {
            buf[i] = bytes[i];
            i += 1;
        }
        Self {
            buf,
            len: bytes.len(),
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

const fn lo(v: u16) -> u8 {
    (v & 0xFF) as u8
}

const fn hi(v: u16) -> u8 {
    (v >> 8) as u8
}

impl Command {
    pub const fn opcode(&self) -> u8 {
        match self {
            Command::DeepSleep(_) => 0x10,
            Command::DataEntryMode(_) => 0x11,
            Command::SwReset => 0x12,
            Command::WriteTemperature(_) => 0x1A,
            Command::MasterActivation => 0x20,
            Command::DisplayUpdateControl1(..) => 0x21,
            Command::DisplayUpdateControl2(_) => 0x22,
            Command::WriteRam => 0x24,
            Command::WriteAltRam => 0x26,
            Command::BorderWaveform(_) => 0x3C,
            Command::RamXRange { .. } => 0x44,
            Command::RamYRange { .. } => 0x45,
            Command::RamXCounter(_) => 0x4E,
            Command::RamYCounter(_) => 0x4F,
        }
    }

    pub const fn params(&self) -> Params {
        match *self {
            Command::SwReset
            | Command::MasterActivation
            | Command::WriteRam
            | Command::WriteAltRam => Params::from_slice(&[]),
            Command::DeepSleep(v)
            | Command::DataEntryMode(v)
            | Command::WriteTemperature(v)
            | Command::DisplayUpdateControl2(v)
            | Command::BorderWaveform(v)
            | Command::RamXCounter(v) => Params::from_slice(&[v]),
            Command::DisplayUpdateControl1(a, b) => Params::from_slice(&[a, b]),
            Command::RamXRange { start, end } => Params::from_slice(&[start, end]),
            // y addresses are 9-bit, sent low byte first
            Command::RamYRange { start, end } => {
                Params::from_slice(&[lo(start), hi(start), lo(end), hi(end)])
            }
            Command::RamYCounter(v) => Params::from_slice(&[lo(v), hi(v)]),
        }
    }

    /// Parameter bytes this command carries.
    pub const fn arity(&self) -> usize {
        self.params().len()
    }
}
