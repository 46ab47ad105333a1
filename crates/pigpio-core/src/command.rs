//! Command codes understood by the pigpio socket interface
//!
//! Only the subset of commands this client issues is listed. Each command
//! knows whether its response carries an extension payload, which the
//! transport needs in order to read the right number of bytes.

use serde::Serialize;
use std::fmt;

/// Shape of the response the daemon sends for a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyShape {
    /// Header only; the result field is a plain value or status
    Plain,
    /// Header followed by `result` bytes when the result is positive
    Extended,
}

macro_rules! commands {
    ($($variant:ident = $code:literal, $mnemonic:literal, $shape:ident;)+) => {
        /// A pigpio socket command
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        #[repr(u32)]
        pub enum Command {
            $($variant = $code,)+
        }

        impl Command {
            /// Every command known to this client
            pub const ALL: &'static [Command] = &[$(Command::$variant,)+];

            /// Look up a command by its wire code
            pub fn from_code(code: u32) -> Option<Self> {
                match code {
                    $($code => Some(Command::$variant),)+
                    _ => None,
                }
            }

            /// The daemon's mnemonic for this command (as used by `pigs`)
            pub fn mnemonic(self) -> &'static str {
                match self {
                    $(Command::$variant => $mnemonic,)+
                }
            }

            /// Whether the response carries an extension payload
            pub fn reply_shape(self) -> ReplyShape {
                match self {
                    $(Command::$variant => ReplyShape::$shape,)+
                }
            }
        }
    };
}

commands! {
    SetMode = 0, "MODES", Plain;
    GetMode = 1, "MODEG", Plain;
    SetPull = 2, "PUD", Plain;
    Read = 3, "READ", Plain;
    Write = 4, "WRITE", Plain;
    SetPwmDutyCycle = 5, "PWM", Plain;
    SetPwmRange = 6, "PRS", Plain;
    SetPwmFrequency = 7, "PFS", Plain;
    SetServoPulseWidth = 8, "SERVO", Plain;
    Tick = 16, "TICK", Plain;
    HardwareRevision = 17, "HWVER", Plain;
    GetPwmRange = 22, "PRG", Plain;
    GetPwmFrequency = 23, "PFG", Plain;
    GetPwmRealRange = 24, "PRRG", Plain;
    Version = 26, "PIGPV", Plain;
    DelayMicros = 46, "MICS", Plain;
    DelayMillis = 47, "MILS", Plain;
    I2cOpen = 54, "I2CO", Plain;
    I2cClose = 55, "I2CC", Plain;
    I2cReadDevice = 56, "I2CRD", Extended;
    I2cWriteDevice = 57, "I2CWD", Plain;
    I2cWriteQuick = 58, "I2CWQ", Plain;
    I2cReadByte = 59, "I2CRS", Plain;
    I2cWriteByte = 60, "I2CWS", Plain;
    I2cReadByteData = 61, "I2CRB", Plain;
    I2cWriteByteData = 62, "I2CWB", Plain;
    I2cReadWordData = 63, "I2CRW", Plain;
    I2cWriteWordData = 64, "I2CWW", Plain;
    I2cReadBlockData = 65, "I2CRK", Extended;
    I2cWriteBlockData = 66, "I2CWK", Plain;
    I2cReadI2cBlockData = 67, "I2CRI", Extended;
    I2cWriteI2cBlockData = 68, "I2CWI", Plain;
    I2cProcessCall = 69, "I2CPC", Plain;
    I2cBlockProcessCall = 70, "I2CPK", Extended;
    SpiOpen = 71, "SPIO", Plain;
    SpiClose = 72, "SPIC", Plain;
    SpiRead = 73, "SPIR", Extended;
    SpiWrite = 74, "SPIW", Plain;
    SpiTransfer = 75, "SPIX", Extended;
    SerialOpen = 76, "SERO", Plain;
    SerialClose = 77, "SERC", Plain;
    SerialReadByte = 78, "SERRB", Plain;
    SerialWriteByte = 79, "SERWB", Plain;
    SerialRead = 80, "SERR", Extended;
    SerialWrite = 81, "SERW", Plain;
    SerialDataAvailable = 82, "SERDA", Plain;
    GetPwmDutyCycle = 83, "GDC", Plain;
    GetServoPulseWidth = 84, "GPW", Plain;
    HardwarePwm = 86, "HP", Plain;
    GlitchFilter = 97, "FG", Plain;
    NoiseFilter = 98, "FN", Plain;
}

impl Command {
    /// The 32-bit wire code
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.mnemonic(), self.code())
    }
}
