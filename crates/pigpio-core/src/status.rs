//! Daemon status codes
//!
//! pigpio reports failures as negative results. The code table is fixed by
//! the daemon; each code is grouped into a [`StatusKind`] so callers can
//! branch on the category without matching dozens of raw numbers.

use serde::Serialize;
use std::fmt;

/// Category of a daemon-reported failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    InitFailed,
    BadUserPin,
    BadPin,
    BadMode,
    BadLevel,
    BadPull,
    BadPulseWidth,
    BadDutyCycle,
    BadDutyRange,
    BadFilter,
    BadDelay,
    BadHandle,
    NoHandle,
    BadParameter,
    BadFlags,
    BadI2cBus,
    BadI2cAddress,
    BadSpiChannel,
    BadSpeed,
    BadSerialDevice,
    BadCount,
    OpenFailed,
    WriteFailed,
    ReadFailed,
    TransferFailed,
    NoData,
    NotPermitted,
    PinInUse,
    NotPwmPin,
    NotServoPin,
    NotHardwarePwmPin,
    BadHardwarePwm,
    UnknownCommand,
    NoResources,
    SocketFailed,
    Unsupported,
    Other,
}

/// A recognized daemon status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DaemonStatus {
    /// Raw (negative) code as sent by the daemon
    pub code: i32,
    /// Daemon's symbolic name, e.g. `PI_BAD_GPIO`
    pub name: &'static str,
    pub kind: StatusKind,
    pub message: &'static str,
}

impl fmt::Display for DaemonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name, self.code, self.message)
    }
}

macro_rules! status_table {
    ($($code:literal => $name:literal, $kind:ident, $message:literal;)+) => {
        /// Look up a daemon status code. Returns `None` for non-negative
        /// values and for codes outside the daemon's published table.
        pub fn lookup(code: i32) -> Option<DaemonStatus> {
            let (name, kind, message) = match code {
                $($code => ($name, StatusKind::$kind, $message),)+
                _ => return None,
            };
            Some(DaemonStatus { code, name, kind, message })
        }
    };
}

status_table! {
    -1 => "PI_INIT_FAILED", InitFailed, "gpioInitialise failed";
    -2 => "PI_BAD_USER_GPIO", BadUserPin, "GPIO not 0-31";
    -3 => "PI_BAD_GPIO", BadPin, "GPIO not 0-53";
    -4 => "PI_BAD_MODE", BadMode, "mode not 0-7";
    -5 => "PI_BAD_LEVEL", BadLevel, "level not 0-1";
    -6 => "PI_BAD_PUD", BadPull, "pud not 0-2";
    -7 => "PI_BAD_PULSEWIDTH", BadPulseWidth, "pulsewidth not 0 or 500-2500";
    -8 => "PI_BAD_DUTYCYCLE", BadDutyCycle, "dutycycle outside set range";
    -9 => "PI_BAD_TIMER", BadParameter, "timer not 0-9";
    -10 => "PI_BAD_MS", BadParameter, "ms not 10-60000";
    -11 => "PI_BAD_TIMETYPE", BadParameter, "timetype not 0-1";
    -12 => "PI_BAD_SECONDS", BadParameter, "seconds < 0";
    -13 => "PI_BAD_MICROS", BadParameter, "micros not 0-999999";
    -14 => "PI_TIMER_FAILED", Other, "gpioSetTimerFunc failed";
    -15 => "PI_BAD_WDOG_TIMEOUT", BadParameter, "timeout not 0-60000";
    -16 => "PI_NO_ALERT_FUNC", Other, "DEPRECATED";
    -17 => "PI_BAD_CLK_PERIPH", BadParameter, "clock peripheral not 0-1";
    -18 => "PI_BAD_CLK_SOURCE", BadParameter, "DEPRECATED";
    -19 => "PI_BAD_CLK_MICROS", BadParameter, "clock micros not 1, 2, 4, 5, 8, or 10";
    -20 => "PI_BAD_BUF_MILLIS", BadParameter, "buf millis not 100-10000";
    -21 => "PI_BAD_DUTYRANGE", BadDutyRange, "dutycycle range not 25-40000";
    -22 => "PI_BAD_SIGNUM", BadParameter, "signum not 0-63";
    -23 => "PI_BAD_PATHNAME", BadParameter, "can't open pathname";
    -24 => "PI_NO_HANDLE", NoHandle, "no handle available";
    -25 => "PI_BAD_HANDLE", BadHandle, "unknown handle";
    -26 => "PI_BAD_IF_FLAGS", BadFlags, "ifFlags > 4";
    -27 => "PI_BAD_CHANNEL", BadParameter, "DMA channel not 0-15";
    -28 => "PI_BAD_SOCKET_PORT", BadParameter, "socket port not 1024-32000";
    -29 => "PI_BAD_FIFO_COMMAND", UnknownCommand, "unrecognized fifo command";
    -30 => "PI_BAD_SECO_CHANNEL", BadParameter, "DMA secondary channel not 0-15";
    -31 => "PI_NOT_INITIALISED", InitFailed, "function called before gpioInitialise";
    -32 => "PI_INITIALISED", InitFailed, "function called after gpioInitialise";
    -33 => "PI_BAD_WAVE_MODE", BadMode, "waveform mode not 0-3";
    -34 => "PI_BAD_CFG_INTERNAL", BadParameter, "bad parameter in gpioCfgInternals call";
    -35 => "PI_BAD_WAVE_BAUD", BadSpeed, "baud rate not 50-250K(RX)/50-1M(TX)";
    -36 => "PI_TOO_MANY_PULSES", NoResources, "waveform has too many pulses";
    -37 => "PI_TOO_MANY_CHARS", NoResources, "waveform has too many chars";
    -38 => "PI_NOT_SERIAL_GPIO", BadPin, "no bit bang serial read on GPIO";
    -39 => "PI_BAD_SERIAL_STRUC", BadParameter, "bad (null) serial structure parameter";
    -40 => "PI_BAD_SERIAL_BUF", BadParameter, "bad (null) serial buf parameter";
    -41 => "PI_NOT_PERMITTED", NotPermitted, "GPIO operation not permitted";
    -42 => "PI_SOME_PERMITTED", NotPermitted, "one or more GPIO not permitted";
    -43 => "PI_BAD_WVSC_COMMND", UnknownCommand, "bad WVSC subcommand";
    -44 => "PI_BAD_WVSM_COMMND", UnknownCommand, "bad WVSM subcommand";
    -45 => "PI_BAD_WVSP_COMMND", UnknownCommand, "bad WVSP subcommand";
    -46 => "PI_BAD_PULSELEN", BadParameter, "trigger pulse length not 1-100";
    -47 => "PI_BAD_SCRIPT", BadParameter, "invalid script";
    -48 => "PI_BAD_SCRIPT_ID", BadHandle, "unknown script id";
    -49 => "PI_BAD_SER_OFFSET", BadParameter, "add serial data offset > 30 minutes";
    -50 => "PI_GPIO_IN_USE", PinInUse, "GPIO already in use";
    -51 => "PI_BAD_SERIAL_COUNT", BadCount, "must read at least a byte at a time";
    -52 => "PI_BAD_PARAM_NUM", BadParameter, "script parameter id not 0-9";
    -53 => "PI_DUP_TAG", BadParameter, "script has duplicate tag";
    -54 => "PI_TOO_MANY_TAGS", NoResources, "script has too many tags";
    -55 => "PI_BAD_SCRIPT_CMD", UnknownCommand, "illegal script command";
    -56 => "PI_BAD_VAR_NUM", BadParameter, "script variable id not 0-149";
    -57 => "PI_NO_SCRIPT_ROOM", NoResources, "no more room for scripts";
    -58 => "PI_NO_MEMORY", NoResources, "can't allocate temporary memory";
    -59 => "PI_SOCK_READ_FAILED", SocketFailed, "socket read failed";
    -60 => "PI_SOCK_WRIT_FAILED", SocketFailed, "socket write failed";
    -61 => "PI_TOO_MANY_PARAM", BadParameter, "too many script parameters (> 10)";
    -62 => "PI_SCRIPT_NOT_READY", Other, "script initialising";
    -63 => "PI_BAD_TAG", BadParameter, "script has unresolved tag";
    -64 => "PI_BAD_MICS_DELAY", BadDelay, "bad MICS delay (too large)";
    -65 => "PI_BAD_MILS_DELAY", BadDelay, "bad MILS delay (too large)";
    -66 => "PI_BAD_WAVE_ID", BadHandle, "non existent wave id";
    -67 => "PI_TOO_MANY_CBS", NoResources, "no more CBs for waveform";
    -68 => "PI_TOO_MANY_OOL", NoResources, "no more OOL for waveform";
    -69 => "PI_EMPTY_WAVEFORM", BadParameter, "attempt to create an empty waveform";
    -70 => "PI_NO_WAVEFORM_ID", NoResources, "no more waveforms";
    -71 => "PI_I2C_OPEN_FAILED", OpenFailed, "can't open I2C device";
    -72 => "PI_SER_OPEN_FAILED", OpenFailed, "can't open serial device";
    -73 => "PI_SPI_OPEN_FAILED", OpenFailed, "can't open SPI device";
    -74 => "PI_BAD_I2C_BUS", BadI2cBus, "bad I2C bus";
    -75 => "PI_BAD_I2C_ADDR", BadI2cAddress, "bad I2C address";
    -76 => "PI_BAD_SPI_CHANNEL", BadSpiChannel, "bad SPI channel";
    -77 => "PI_BAD_FLAGS", BadFlags, "bad i2c/spi/ser open flags";
    -78 => "PI_BAD_SPI_SPEED", BadSpeed, "bad SPI speed";
    -79 => "PI_BAD_SER_DEVICE", BadSerialDevice, "bad serial device name";
    -80 => "PI_BAD_SER_SPEED", BadSpeed, "bad serial baud rate";
    -81 => "PI_BAD_PARAM", BadParameter, "bad i2c/spi/ser parameter";
    -82 => "PI_I2C_WRITE_FAILED", WriteFailed, "i2c write failed";
    -83 => "PI_I2C_READ_FAILED", ReadFailed, "i2c read failed";
    -84 => "PI_BAD_SPI_COUNT", BadCount, "bad SPI count";
    -85 => "PI_SER_WRITE_FAILED", WriteFailed, "ser write failed";
    -86 => "PI_SER_READ_FAILED", ReadFailed, "ser read failed";
    -87 => "PI_SER_READ_NO_DATA", NoData, "ser read no data available";
    -88 => "PI_UNKNOWN_COMMAND", UnknownCommand, "unknown command";
    -89 => "PI_SPI_XFER_FAILED", TransferFailed, "spi xfer/read/write failed";
    -90 => "PI_BAD_POINTER", BadParameter, "bad (NULL) pointer";
    -91 => "PI_NO_AUX_SPI", Unsupported, "no auxiliary SPI on Pi A or B";
    -92 => "PI_NOT_PWM_GPIO", NotPwmPin, "GPIO is not in use for PWM";
    -93 => "PI_NOT_SERVO_GPIO", NotServoPin, "GPIO is not in use for servo pulses";
    -94 => "PI_NOT_HCLK_GPIO", BadPin, "GPIO has no hardware clock";
    -95 => "PI_NOT_HPWM_GPIO", NotHardwarePwmPin, "GPIO has no hardware PWM";
    -96 => "PI_BAD_HPWM_FREQ", BadHardwarePwm, "invalid hardware PWM frequency";
    -97 => "PI_BAD_HPWM_DUTY", BadHardwarePwm, "hardware PWM dutycycle not 0-1M";
    -98 => "PI_BAD_HCLK_FREQ", BadParameter, "invalid hardware clock frequency";
    -99 => "PI_BAD_HCLK_PASS", NotPermitted, "need password to use hardware clock 1";
    -100 => "PI_HPWM_ILLEGAL", BadHardwarePwm, "illegal, PWM in use for main clock";
    -101 => "PI_BAD_DATABITS", BadParameter, "serial data bits not 1-32";
    -102 => "PI_BAD_STOPBITS", BadParameter, "serial (half) stop bits not 2-8";
    -103 => "PI_MSG_TOOBIG", BadCount, "socket/pipe message too big";
    -104 => "PI_BAD_MALLOC_MODE", BadMode, "bad memory allocation mode";
    -105 => "PI_TOO_MANY_SEGS", NoResources, "too many I2C transaction segments";
    -106 => "PI_BAD_I2C_SEG", BadParameter, "an I2C transaction segment failed";
    -107 => "PI_BAD_SMBUS_CMD", UnknownCommand, "SMBus command not supported by driver";
    -108 => "PI_NOT_I2C_GPIO", BadPin, "no bit bang I2C in progress on GPIO";
    -109 => "PI_BAD_I2C_WLEN", BadCount, "bad I2C write length";
    -110 => "PI_BAD_I2C_RLEN", BadCount, "bad I2C read length";
    -111 => "PI_BAD_I2C_CMD", UnknownCommand, "bad I2C command";
    -112 => "PI_BAD_I2C_BAUD", BadSpeed, "bad I2C baud rate, not 50-500k";
    -113 => "PI_CHAIN_LOOP_CNT", BadParameter, "bad chain loop count";
    -114 => "PI_BAD_CHAIN_LOOP", BadParameter, "empty chain loop";
    -115 => "PI_CHAIN_COUNTER", NoResources, "too many chain counters";
    -116 => "PI_BAD_CHAIN_CMD", UnknownCommand, "bad chain command";
    -117 => "PI_BAD_CHAIN_DELAY", BadDelay, "bad chain delay micros";
    -118 => "PI_CHAIN_NESTING", NoResources, "chain counters nested too deeply";
    -119 => "PI_CHAIN_TOO_BIG", NoResources, "chain is too long";
    -120 => "PI_DEPRECATED", Unsupported, "deprecated function removed";
    -121 => "PI_BAD_SER_INVERT", BadParameter, "bit bang serial invert not 0 or 1";
    -122 => "PI_BAD_EDGE", BadParameter, "bad ISR edge value, not 0-2";
    -123 => "PI_BAD_ISR_INIT", Other, "bad ISR initialisation";
    -124 => "PI_BAD_FOREVER", BadParameter, "loop forever must be last command";
    -125 => "PI_BAD_FILTER", BadFilter, "bad filter parameter";
    -126 => "PI_BAD_PAD", BadParameter, "bad pad number";
    -127 => "PI_BAD_STRENGTH", BadParameter, "bad pad drive strength";
    -128 => "PI_FIL_OPEN_FAILED", OpenFailed, "file open failed";
    -129 => "PI_BAD_FILE_MODE", BadMode, "bad file mode";
    -130 => "PI_BAD_FILE_FLAG", BadFlags, "bad file flag";
    -131 => "PI_BAD_FILE_READ", ReadFailed, "bad file read";
    -132 => "PI_BAD_FILE_WRITE", WriteFailed, "bad file write";
    -133 => "PI_FILE_NOT_ROPEN", NotPermitted, "file not open for read";
    -134 => "PI_FILE_NOT_WOPEN", NotPermitted, "file not open for write";
    -135 => "PI_BAD_FILE_SEEK", BadParameter, "bad file seek";
    -136 => "PI_NO_FILE_MATCH", NoData, "no files match pattern";
    -137 => "PI_NO_FILE_ACCESS", NotPermitted, "no permission to access file";
    -138 => "PI_FILE_IS_A_DIR", BadParameter, "file is a directory";
    -139 => "PI_BAD_SHELL_STATUS", Other, "bad shell return status";
    -140 => "PI_BAD_SCRIPT_NAME", BadParameter, "bad script name";
    -141 => "PI_BAD_SPI_BAUD", BadSpeed, "bad SPI baud rate, not 50-500k";
    -142 => "PI_NOT_SPI_GPIO", BadPin, "no bit bang SPI in progress on GPIO";
    -143 => "PI_BAD_EVENT_ID", BadParameter, "bad event id";
    -144 => "PI_CMD_INTERRUPTED", Other, "command interrupted, Python";
    -145 => "PI_NOT_ON_BCM2711", Unsupported, "not available on BCM2711";
    -146 => "PI_ONLY_ON_BCM2711", Unsupported, "only available on BCM2711";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_codes() {
        let status = lookup(-3).unwrap();
        assert_eq!(status.name, "PI_BAD_GPIO");
        assert_eq!(status.kind, StatusKind::BadPin);

        assert_eq!(lookup(-25).unwrap().kind, StatusKind::BadHandle);
        assert_eq!(lookup(-71).unwrap().kind, StatusKind::OpenFailed);
        assert_eq!(lookup(-87).unwrap().kind, StatusKind::NoData);
        assert_eq!(lookup(-89).unwrap().kind, StatusKind::TransferFailed);
    }

    #[test]
    fn test_lookup_outside_table() {
        assert!(lookup(0).is_none());
        assert!(lookup(5).is_none());
        assert!(lookup(-147).is_none());
        assert!(lookup(i32::MIN).is_none());
    }

    #[test]
    fn test_table_is_dense() {
        for code in -146..=-1 {
            let status = lookup(code).unwrap();
            assert_eq!(status.code, code);
            assert!(status.name.starts_with("PI_"));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            lookup(-2).unwrap().to_string(),
            "PI_BAD_USER_GPIO (-2): GPIO not 0-31"
        );
    }
}
