//! Value types carried in command parameters and results

use serde::{Deserialize, Serialize};
use std::fmt;

/// GPIO function as understood by the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinMode {
    Input,
    Output,
    Alt0,
    Alt1,
    Alt2,
    Alt3,
    Alt4,
    Alt5,
}

impl PinMode {
    pub fn value(self) -> u32 {
        match self {
            PinMode::Input => 0,
            PinMode::Output => 1,
            PinMode::Alt5 => 2,
            PinMode::Alt4 => 3,
            PinMode::Alt0 => 4,
            PinMode::Alt1 => 5,
            PinMode::Alt2 => 6,
            PinMode::Alt3 => 7,
        }
    }

    pub fn from_value(value: u32) -> Option<Self> {
        Some(match value {
            0 => PinMode::Input,
            1 => PinMode::Output,
            2 => PinMode::Alt5,
            3 => PinMode::Alt4,
            4 => PinMode::Alt0,
            5 => PinMode::Alt1,
            6 => PinMode::Alt2,
            7 => PinMode::Alt3,
            _ => return None,
        })
    }
}

/// Internal pull resistor setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pull {
    Off,
    Down,
    Up,
}

impl Pull {
    pub fn value(self) -> u32 {
        match self {
            Pull::Off => 0,
            Pull::Down => 1,
            Pull::Up => 2,
        }
    }
}

/// Digital level of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn value(self) -> u32 {
        match self {
            Level::Low => 0,
            Level::High => 1,
        }
    }

    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            0 => Some(Level::Low),
            1 => Some(Level::High),
            _ => None,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Kind of daemon-side resource a handle refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleKind {
    I2c,
    Spi,
    Serial,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleKind::I2c => write!(f, "I2C"),
            HandleKind::Spi => write!(f, "SPI"),
            HandleKind::Serial => write!(f, "serial"),
        }
    }
}

/// A handle bound to one resource kind
pub trait ResourceHandle: Copy {
    const KIND: HandleKind;

    fn id(self) -> u32;
}

macro_rules! handle_type {
    ($(#[$meta:meta])* $name:ident, $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl ResourceHandle for $name {
            const KIND: HandleKind = HandleKind::$kind;

            fn id(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", HandleKind::$kind, self.0)
            }
        }
    };
}

handle_type!(
    /// Handle returned by `I2CO`
    I2cHandle,
    I2c
);
handle_type!(
    /// Handle returned by `SPIO`
    SpiHandle,
    Spi
);
handle_type!(
    /// Handle returned by `SERO`
    SerialHandle,
    Serial
);
