//! DS3231 real-time clock over I²C.
//!
//! Time lives in BCD registers 0x00–0x06.  The chip may have been left in
//! 12-hour mode by other firmware, so hours are decoded in either mode;
//! writes always use 24-hour mode.  Only years 2000–2099 are representable
//! (the century bit is ignored).

use embedded_hal::i2c::I2c;

use crate::app::ports::RtcPort;
use crate::datetime::{DateTime, MAX_YEAR, MIN_YEAR};
use crate::error::RtcError;

pub const ADDRESS: u8 = 0x68;

const REG_SECONDS: u8 = 0x00;
const REG_CONTROL: u8 = 0x0E;
const REG_STATUS: u8 = 0x0F;

const HOUR_12H: u8 = 1 << 6;
const HOUR_PM: u8 = 1 << 5;

const CTRL_EOSC_N: u8 = 1 << 7;
const CTRL_RS2: u8 = 1 << 4;
const CTRL_RS1: u8 = 1 << 3;
const CTRL_INTCN: u8 = 1 << 2;

const STATUS_OSF: u8 = 1 << 7;

pub struct Ds3231<I> {
    i2c: I,
}

impl<I: I2c> Ds3231<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    pub fn release(self) -> I {
        self.i2c
    }

    fn read_regs(&mut self, start: u8, buf: &mut [u8]) -> Result<(), RtcError> {
        self.i2c
            .write_read(ADDRESS, &[start], buf)
            .map_err(|_| RtcError::Bus)
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, RtcError> {
        let mut buf = [0u8];
        self.read_regs(reg, &mut buf)?;
        Ok(buf[0])
    }

    fn write_regs(&mut self, bytes: &[u8]) -> Result<(), RtcError> {
        self.i2c.write(ADDRESS, bytes).map_err(|_| RtcError::Bus)
    }
}

impl<I: I2c> RtcPort for Ds3231<I> {
    fn read_now(&mut self) -> Result<DateTime, RtcError> {
        let mut r = [0u8; 7];
        self.read_regs(REG_SECONDS, &mut r)?;

        let hour = if r[2] & HOUR_12H != 0 {
            let h12 = from_bcd(r[2] & 0x1F)?;
            if !(1..=12).contains(&h12) {
                return Err(RtcError::InvalidData);
            }
            (h12 % 12) + if r[2] & HOUR_PM != 0 { 12 } else { 0 }
        } else {
            from_bcd(r[2] & 0x3F)?
        };

        DateTime::new(
            MIN_YEAR + u16::from(from_bcd(r[6])?),
            from_bcd(r[5] & 0x1F)?,
            from_bcd(r[4] & 0x3F)?,
            hour,
            from_bcd(r[1] & 0x7F)?,
            from_bcd(r[0] & 0x7F)?,
        )
        .map_err(|_| RtcError::InvalidData)
    }

    fn set_now(&mut self, now: &DateTime) -> Result<(), RtcError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&now.year) || now.validate().is_err() {
            return Err(RtcError::OutOfRange);
        }
        let frame = [
            REG_SECONDS,
            to_bcd(now.second),
            to_bcd(now.minute),
            to_bcd(now.hour),
            now.weekday(),
            to_bcd(now.day),
            to_bcd(now.month),
            to_bcd((now.year - MIN_YEAR) as u8),
        ];
        self.write_regs(&frame)?;

        let status = self.read_reg(REG_STATUS)?;
        if status & STATUS_OSF != 0 {
            self.write_regs(&[REG_STATUS, status & !STATUS_OSF])?;
        }
        Ok(())
    }

    fn configure_square_wave(&mut self) -> Result<(), RtcError> {
        let ctrl = self.read_reg(REG_CONTROL)?;
        let ctrl = ctrl & !(CTRL_EOSC_N | CTRL_RS2 | CTRL_RS1 | CTRL_INTCN);
        self.write_regs(&[REG_CONTROL, ctrl])
    }

    fn is_time_valid(&mut self) -> Result<bool, RtcError> {
        Ok(self.read_reg(REG_STATUS)? & STATUS_OSF == 0)
    }
}

fn from_bcd(v: u8) -> Result<u8, RtcError> {
    let (hi, lo) = (v >> 4, v & 0x0F);
    if hi > 9 || lo > 9 {
        return Err(RtcError::InvalidData);
    }
    Ok(hi * 10 + lo)
}

fn to_bcd(v: u8) -> u8 {
    ((v / 10) << 4) | (v % 10)
}
