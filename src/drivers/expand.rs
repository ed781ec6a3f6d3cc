// Horizontal 2x bit expansion lookup.
//
// Every stored byte turns into two panel bytes with each bit duplicated,
// MSB first: 0b1010_0000 -> 0b1100_1100, 0b0000_0000. Built at compile
// time; the streaming path does two loads per source byte.

pub struct ExpansionTable {
    pub hi: [u8; 256],
    pub lo: [u8; 256],
}

impl ExpansionTable {
    pub const fn new() -> Self {
        let mut hi = [0u8; 256];
        let mut lo = [0u8; 256];
        let mut v = 0;
        while v < 256 {
            let wide = Self::widen(v as u8);
            hi[v] = (wide >> 8) as u8;
            lo[v] = (wide & 0xFF) as u8;
            v += 1;
        }
        Self { hi, lo }
    }

    const fn widen(v: u8) -> u16 {
        let mut out: u16 = 0;
        let mut i = 0;
        while i < 8 {
            out <<= 2;
            if (v >> (7 - i)) & 1 != 0 {
                out |= 0b11;
            }
            i += 1;
        }
        out
    }

    #[inline]
    pub fn expand(&self, v: u8) -> [u8; 2] {
        [self.hi[v as usize], self.lo[v as usize]]
    }
}

impl Default for ExpansionTable {
    fn default() -> Self {
        Self::new()
    }
}

pub static EXPANSION: ExpansionTable = ExpansionTable::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_bit_is_doubled_msb_first() {
        for v in 0..=255u8 {
            let [h, l] = EXPANSION.expand(v);
            let wide = u16::from_be_bytes([h, l]);
            for i in 0..8 {
                let src = (v >> (7 - i)) & 1;
                let pair = (wide >> (14 - 2 * i)) & 0b11;
                let expect = if src == 1 { 0b11 } else { 0b00 };
                assert_eq!(pair, expect, "v={:#04x} bit {}", v, i);
            }
        }
    }

    #[test]
    fn known_values() {
        assert_eq!(EXPANSION.expand(0x00), [0x00, 0x00]);
        assert_eq!(EXPANSION.expand(0xFF), [0xFF, 0xFF]);
        assert_eq!(EXPANSION.expand(0xA0), [0xCC, 0x00]);
        assert_eq!(EXPANSION.expand(0x01), [0x00, 0x03]);
        assert_eq!(EXPANSION.expand(0xDF), [0xF3, 0xFF]);
    }

    #[test]
    fn runtime_table_matches_static() {
        let t = ExpansionTable::default();
        assert_eq!(t.hi, EXPANSION.hi);
        assert_eq!(t.lo, EXPANSION.lo);
    }
}
