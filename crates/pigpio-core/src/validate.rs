//! Local preconditions checked before a request is encoded
//!
//! Every check returns a [`ValidationError`] naming the parameter, the
//! offending value and the violated constraint. Nothing here performs I/O.

use std::fmt;
use thiserror::Error;

use crate::packet::MAX_EXTENSION_LEN;
use crate::types::HandleKind;

pub const MIN_PIN: u32 = 0;
pub const MAX_PIN: u32 = 53;
pub const MAX_USER_PIN: u32 = 31;

pub const MAX_DUTY_CYCLE: u32 = 40_000;
pub const MIN_PWM_RANGE: u32 = 25;
pub const MAX_PWM_RANGE: u32 = 40_000;

pub const MIN_SERVO_PULSE_WIDTH: u32 = 500;
pub const MAX_SERVO_PULSE_WIDTH: u32 = 2_500;

pub const MAX_HW_PWM_FREQUENCY: u32 = 187_500_000;
pub const MAX_HW_PWM_DUTY: u32 = 1_000_000;

pub const MAX_GLITCH_STEADY: u32 = 300_000;
pub const MAX_NOISE_STEADY: u32 = 300_000;
pub const MAX_NOISE_ACTIVE: u32 = 1_000_000;

pub const MIN_DELAY_MILLIS: u32 = 1;
pub const MAX_DELAY_MILLIS: u32 = 60_000;

pub const MAX_I2C_ADDRESS: u32 = 0x7f;
pub const MAX_I2C_REGISTER: u32 = 0xff;
pub const MAX_I2C_BLOCK_LEN: usize = 32;

pub const MAX_SPI_CHANNEL: u32 = 2;
pub const MIN_SPI_BAUD: u32 = 32_000;
pub const MAX_SPI_BAUD: u32 = 125_000_000;

/// The rule a parameter failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Inclusive range
    Range { min: i64, max: i64 },
    /// Zero, or an inclusive range
    ZeroOrRange { min: i64, max: i64 },
    AtLeast(i64),
    /// `offset + length` must fit in a buffer of `capacity` bytes
    WithinBuffer { offset: usize, capacity: usize },
    NotEmpty,
    /// Handle is not open in this session
    NotOpen(HandleKind),
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Range { min, max } => write!(f, "must be in {}..={}", min, max),
            Constraint::ZeroOrRange { min, max } => {
                write!(f, "must be 0 or in {}..={}", min, max)
            }
            Constraint::AtLeast(min) => write!(f, "must be at least {}", min),
            Constraint::WithinBuffer { offset, capacity } => write!(
                f,
                "offset {} + length must not exceed buffer size {}",
                offset, capacity
            ),
            Constraint::NotEmpty => write!(f, "must not be empty"),
            Constraint::NotOpen(kind) => write!(f, "is not an open {} handle", kind),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {parameter} {value}: {constraint}")]
pub struct ValidationError {
    pub parameter: &'static str,
    pub value: i64,
    pub constraint: Constraint,
}

impl ValidationError {
    pub fn new(parameter: &'static str, value: impl Into<i64>, constraint: Constraint) -> Self {
        Self {
            parameter,
            value: value.into(),
            constraint,
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;

fn range(parameter: &'static str, value: u32, min: u32, max: u32) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new(
            parameter,
            value,
            Constraint::Range {
                min: min.into(),
                max: max.into(),
            },
        ))
    }
}

fn zero_or_range(parameter: &'static str, value: u32, min: u32, max: u32) -> Result<()> {
    if value == 0 || (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new(
            parameter,
            value,
            Constraint::ZeroOrRange {
                min: min.into(),
                max: max.into(),
            },
        ))
    }
}

/// Any addressable pin, 0-53
pub fn pin(pin: u32) -> Result<()> {
    range("pin", pin, MIN_PIN, MAX_PIN)
}

/// User pins 0-31, used by PWM, servo and filter commands
pub fn user_pin(pin: u32) -> Result<()> {
    range("pin", pin, MIN_PIN, MAX_USER_PIN)
}

pub fn duty_cycle(duty: u32) -> Result<()> {
    range("duty cycle", duty, 0, MAX_DUTY_CYCLE)
}

pub fn pwm_range(value: u32) -> Result<()> {
    range("PWM range", value, MIN_PWM_RANGE, MAX_PWM_RANGE)
}

pub fn pwm_frequency(frequency: u32) -> Result<()> {
    if frequency >= 1 {
        Ok(())
    } else {
        Err(ValidationError::new(
            "PWM frequency",
            frequency,
            Constraint::AtLeast(1),
        ))
    }
}

pub fn pulse_width(width: u32) -> Result<()> {
    zero_or_range(
        "pulse width",
        width,
        MIN_SERVO_PULSE_WIDTH,
        MAX_SERVO_PULSE_WIDTH,
    )
}

pub fn hardware_pwm(frequency: u32, duty: u32) -> Result<()> {
    range("hardware PWM frequency", frequency, 0, MAX_HW_PWM_FREQUENCY)?;
    range("hardware PWM duty cycle", duty, 0, MAX_HW_PWM_DUTY)
}

pub fn glitch_filter(steady: u32) -> Result<()> {
    range("glitch filter steady", steady, 0, MAX_GLITCH_STEADY)
}

pub fn noise_filter(steady: u32, active: u32) -> Result<()> {
    range("noise filter steady", steady, 0, MAX_NOISE_STEADY)?;
    range("noise filter active", active, 0, MAX_NOISE_ACTIVE)
}

pub fn delay_millis(millis: u32) -> Result<()> {
    range("delay millis", millis, MIN_DELAY_MILLIS, MAX_DELAY_MILLIS)
}

pub fn i2c_address(address: u32) -> Result<()> {
    range("I2C address", address, 0, MAX_I2C_ADDRESS)
}

pub fn i2c_register(register: u32) -> Result<()> {
    range("I2C register", register, 0, MAX_I2C_REGISTER)
}

pub fn i2c_block_length(length: usize) -> Result<()> {
    if (1..=MAX_I2C_BLOCK_LEN).contains(&length) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "I2C block length",
            length as i64,
            Constraint::Range {
                min: 1,
                max: MAX_I2C_BLOCK_LEN as i64,
            },
        ))
    }
}

pub fn spi_channel(channel: u32) -> Result<()> {
    range("SPI channel", channel, 0, MAX_SPI_CHANNEL)
}

pub fn spi_baud(baud: u32) -> Result<()> {
    range("SPI baud", baud, MIN_SPI_BAUD, MAX_SPI_BAUD)
}

pub fn serial_baud(baud: u32) -> Result<()> {
    if baud >= 1 {
        Ok(())
    } else {
        Err(ValidationError::new("serial baud", baud, Constraint::AtLeast(1)))
    }
}

pub fn serial_device(device: &str) -> Result<()> {
    if device.is_empty() {
        Err(ValidationError::new("serial device", 0, Constraint::NotEmpty))
    } else {
        Ok(())
    }
}

/// Byte count for a read request
pub fn count(parameter: &'static str, count: usize) -> Result<()> {
    if count >= 1 {
        Ok(())
    } else {
        Err(ValidationError::new(parameter, 0, Constraint::AtLeast(1)))
    }
}

/// Length of data carried in a request extension
pub fn payload(parameter: &'static str, length: usize) -> Result<()> {
    if (1..=MAX_EXTENSION_LEN).contains(&length) {
        Ok(())
    } else {
        Err(ValidationError::new(
            parameter,
            length as i64,
            Constraint::Range {
                min: 1,
                max: MAX_EXTENSION_LEN as i64,
            },
        ))
    }
}

/// `offset + length` must fit within a buffer of `capacity` bytes
pub fn buffer(parameter: &'static str, capacity: usize, offset: usize, length: usize) -> Result<()> {
    match offset.checked_add(length) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(ValidationError::new(
            parameter,
            length as i64,
            Constraint::WithinBuffer { offset, capacity },
        )),
    }
}
