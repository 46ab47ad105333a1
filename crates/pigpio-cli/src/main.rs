//! pigctl - issue single commands to a pigpio daemon
//!
//! Each invocation connects, performs the handshake, runs one command and
//! closes the session again.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pigpio_client::{Level, PinMode, Pull, Session};
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "pigctl")]
#[command(about = "Send commands to a remote pigpio daemon")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "pigctl.toml")]
    config: PathBuf,

    /// Daemon host
    #[arg(long, env = "PIGPIO_ADDR")]
    host: Option<String>,

    /// Daemon port
    #[arg(short, long, env = "PIGPIO_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Daemon software version
    Version,
    /// Board hardware revision
    Hwver,
    /// Daemon microsecond tick
    Tick,
    /// Get or set a pin's mode
    Mode {
        #[command(subcommand)]
        action: ModeAction,
    },
    /// Set a pin's pull resistor
    Pull { pin: u32, pull: PullArg },
    /// Read a pin's level
    Read { pin: u32 },
    /// Write a pin's level
    Write {
        pin: u32,
        #[arg(value_parser = clap::value_parser!(u8).range(0..=1))]
        level: u8,
    },
    /// Get or set the PWM duty cycle
    Pwm { pin: u32, duty: Option<u32> },
    /// Get or set the servo pulse width in microseconds
    Servo { pin: u32, width: Option<u32> },
    /// Get or set the PWM range
    Range { pin: u32, range: Option<u32> },
    /// Get or set the PWM frequency
    Freq { pin: u32, frequency: Option<u32> },
    /// Start hardware PWM (duty in millionths)
    Hwpwm { pin: u32, frequency: u32, duty: u32 },
    /// Set the glitch filter
    Glitch { pin: u32, steady: u32 },
    /// Set the noise filter
    Noise { pin: u32, steady: u32, active: u32 },
    /// Delay on the daemon in microseconds
    DelayUs { micros: u32 },
    /// Delay on the daemon in milliseconds
    DelayMs { millis: u32 },
    /// Read from an I2C device
    I2cRead {
        bus: u32,
        #[arg(value_parser = parse_u32)]
        address: u32,
        /// Register for an I2C block read; raw device read when omitted
        #[arg(short, long, value_parser = parse_u32)]
        register: Option<u32>,
        /// Number of bytes to read
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// Write hex bytes to an I2C device
    I2cWrite {
        bus: u32,
        #[arg(value_parser = parse_u32)]
        address: u32,
        data: HexBytes,
        /// Register for an I2C block write; raw device write when omitted
        #[arg(short, long, value_parser = parse_u32)]
        register: Option<u32>,
    },
    /// Full-duplex SPI transfer of hex bytes
    SpiXfer {
        channel: u32,
        data: HexBytes,
        #[arg(short, long, default_value_t = 1_000_000)]
        baud: u32,
        #[arg(short, long, default_value_t = 0)]
        flags: u32,
    },
    /// Read waiting bytes from a serial device
    SerialRead {
        device: String,
        #[arg(short, long, default_value_t = 9600)]
        baud: u32,
        /// Maximum number of bytes to read
        #[arg(short = 'n', long, default_value_t = 64)]
        count: usize,
    },
    /// Write hex bytes to a serial device
    SerialWrite {
        device: String,
        data: HexBytes,
        #[arg(short, long, default_value_t = 9600)]
        baud: u32,
    },
}

#[derive(Subcommand, Debug)]
enum ModeAction {
    Get { pin: u32 },
    Set { pin: u32, mode: ModeArg },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Input,
    Output,
    Alt0,
    Alt1,
    Alt2,
    Alt3,
    Alt4,
    Alt5,
}

impl From<ModeArg> for PinMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Input => PinMode::Input,
            ModeArg::Output => PinMode::Output,
            ModeArg::Alt0 => PinMode::Alt0,
            ModeArg::Alt1 => PinMode::Alt1,
            ModeArg::Alt2 => PinMode::Alt2,
            ModeArg::Alt3 => PinMode::Alt3,
            ModeArg::Alt4 => PinMode::Alt4,
            ModeArg::Alt5 => PinMode::Alt5,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PullArg {
    Off,
    Down,
    Up,
}

impl From<PullArg> for Pull {
    fn from(pull: PullArg) -> Self {
        match pull {
            PullArg::Off => Pull::Off,
            PullArg::Down => Pull::Down,
            PullArg::Up => Pull::Up,
        }
    }
}

/// Bytes given on the command line as hex, e.g. `de:ad:be:ef` or `0xdeadbeef`
#[derive(Debug, Clone, PartialEq, Eq)]
struct HexBytes(Vec<u8>);

fn parse_hex(input: &str) -> Result<HexBytes, hex::FromHexError> {
    let digits: String = input
        .trim_start_matches("0x")
        .chars()
        .filter(|c| !matches!(c, ':' | ' ' | '_'))
        .collect();
    hex::decode(digits).map(HexBytes)
}

impl std::str::FromStr for HexBytes {
    type Err = hex::FromHexError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        parse_hex(input)
    }
}

/// Decimal or `0x`-prefixed hex integer
fn parse_u32(input: &str) -> Result<u32, std::num::ParseIntError> {
    match input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        Some(digits) => u32::from_str_radix(digits, 16),
        None => input.parse(),
    }
}

/// Result of one command
enum Output {
    Done,
    Value(Value),
    Bytes { declared: usize, data: Vec<u8> },
}

impl Output {
    fn print(&self, command: &str, json: bool) {
        if json {
            let object = match self {
                Output::Done => json!({ "command": command, "ok": true }),
                Output::Value(value) => json!({ "command": command, "result": value }),
                Output::Bytes { declared, data } => json!({
                    "command": command,
                    "count": declared,
                    "data": hex::encode(data),
                }),
            };
            println!("{}", object);
            return;
        }

        match self {
            Output::Done => {}
            Output::Value(Value::String(text)) => println!("{}", text),
            Output::Value(value) => println!("{}", value),
            Output::Bytes { data, .. } => println!("{}", hex::encode(data)),
        }
    }
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Version => "version",
            Commands::Hwver => "hwver",
            Commands::Tick => "tick",
            Commands::Mode { .. } => "mode",
            Commands::Pull { .. } => "pull",
            Commands::Read { .. } => "read",
            Commands::Write { .. } => "write",
            Commands::Pwm { .. } => "pwm",
            Commands::Servo { .. } => "servo",
            Commands::Range { .. } => "range",
            Commands::Freq { .. } => "freq",
            Commands::Hwpwm { .. } => "hwpwm",
            Commands::Glitch { .. } => "glitch",
            Commands::Noise { .. } => "noise",
            Commands::DelayUs { .. } => "delay-us",
            Commands::DelayMs { .. } => "delay-ms",
            Commands::I2cRead { .. } => "i2c-read",
            Commands::I2cWrite { .. } => "i2c-write",
            Commands::SpiXfer { .. } => "spi-xfer",
            Commands::SerialRead { .. } => "serial-read",
            Commands::SerialWrite { .. } => "serial-write",
        }
    }
}

async fn run(pi: &Session, command: Commands) -> Result<Output> {
    let output = match command {
        Commands::Version => Output::Value(json!(pi.version().await?)),
        Commands::Hwver => Output::Value(json!(pi.hardware_revision_string().await?)),
        Commands::Tick => Output::Value(json!(pi.tick().await?)),
        Commands::Mode { action } => match action {
            ModeAction::Get { pin } => Output::Value(json!(pi.get_mode(pin).await?)),
            ModeAction::Set { pin, mode } => {
                pi.set_mode(pin, mode.into()).await?;
                Output::Done
            }
        },
        Commands::Pull { pin, pull } => {
            pi.set_pull(pin, pull.into()).await?;
            Output::Done
        }
        Commands::Read { pin } => Output::Value(json!(pi.read(pin).await?.value())),
        Commands::Write { pin, level } => {
            pi.write(pin, Level::from(level == 1)).await?;
            Output::Done
        }
        Commands::Pwm { pin, duty } => match duty {
            Some(duty) => {
                pi.set_pwm_duty_cycle(pin, duty).await?;
                Output::Done
            }
            None => Output::Value(json!(pi.get_pwm_duty_cycle(pin).await?)),
        },
        Commands::Servo { pin, width } => match width {
            Some(width) => {
                pi.set_servo_pulse_width(pin, width).await?;
                Output::Done
            }
            None => Output::Value(json!(pi.get_servo_pulse_width(pin).await?)),
        },
        Commands::Range { pin, range } => match range {
            Some(range) => Output::Value(json!(pi.set_pwm_range(pin, range).await?)),
            None => Output::Value(json!(pi.get_pwm_range(pin).await?)),
        },
        Commands::Freq { pin, frequency } => match frequency {
            Some(frequency) => Output::Value(json!(pi.set_pwm_frequency(pin, frequency).await?)),
            None => Output::Value(json!(pi.get_pwm_frequency(pin).await?)),
        },
        Commands::Hwpwm { pin, frequency, duty } => {
            pi.hardware_pwm(pin, frequency, duty).await?;
            Output::Done
        }
        Commands::Glitch { pin, steady } => {
            pi.glitch_filter(pin, steady).await?;
            Output::Done
        }
        Commands::Noise { pin, steady, active } => {
            pi.noise_filter(pin, steady, active).await?;
            Output::Done
        }
        Commands::DelayUs { micros } => Output::Value(json!(pi.delay_micros(micros).await?)),
        Commands::DelayMs { millis } => Output::Value(json!(pi.delay_millis(millis).await?)),
        Commands::I2cRead {
            bus,
            address,
            register,
            count,
        } => {
            let handle = pi.i2c_open(bus, address, 0).await?;
            let mut buffer = vec![0u8; count];
            let read = match register {
                Some(register) => {
                    pi.i2c_read_i2c_block_data(handle, register, &mut buffer, 0, count)
                        .await
                }
                None => pi.i2c_read_device(handle, &mut buffer, 0, count).await,
            };
            pi.i2c_close(handle).await?;
            bytes_output(buffer, read?)
        }
        Commands::I2cWrite {
            bus,
            address,
            data,
            register,
        } => {
            let handle = pi.i2c_open(bus, address, 0).await?;
            let written = match register {
                Some(register) => {
                    pi.i2c_write_i2c_block_data(handle, register, &data.0, 0, data.0.len())
                        .await
                }
                None => pi.i2c_write_device(handle, &data.0, 0, data.0.len()).await,
            };
            pi.i2c_close(handle).await?;
            written?;
            Output::Done
        }
        Commands::SpiXfer {
            channel,
            data,
            baud,
            flags,
        } => {
            let handle = pi.spi_open(channel, baud, flags).await?;
            let mut buffer = vec![0u8; data.0.len()];
            let transferred = pi
                .spi_transfer(handle, &data.0, 0, &mut buffer, 0, data.0.len())
                .await;
            pi.spi_close(handle).await?;
            bytes_output(buffer, transferred?)
        }
        Commands::SerialRead {
            device,
            baud,
            count,
        } => {
            let handle = pi.serial_open(&device, baud, 0).await?;
            let mut buffer = vec![0u8; count];
            let read = pi.serial_read(handle, &mut buffer, 0, count).await;
            pi.serial_close(handle).await?;
            bytes_output(buffer, read?)
        }
        Commands::SerialWrite { device, data, baud } => {
            let handle = pi.serial_open(&device, baud, 0).await?;
            let written = pi.serial_write(handle, &data.0, 0, data.0.len()).await;
            pi.serial_close(handle).await?;
            written?;
            Output::Done
        }
    };
    Ok(output)
}

/// Keep the bytes the daemon actually delivered
fn bytes_output(mut buffer: Vec<u8>, declared: usize) -> Output {
    buffer.truncate(declared);
    Output::Bytes {
        declared,
        data: buffer,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" => "warn",
        "error" => "error",
        _ => "warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("pigctl v{}", env!("CARGO_PKG_VERSION"));

    let config = config::load_config(&args.config)?.with_overrides(args.host, args.port, args.json);
    debug!(addr = %config.client.address(), "Configuration loaded");

    let pi = Session::connect(config.client.clone())
        .await
        .with_context(|| format!("Failed to connect to {}", config.client.address()))?;

    let name = args.command.name();
    let outcome = run(&pi, args.command).await;
    pi.close().await.context("Failed to close session")?;

    let output = outcome.with_context(|| format!("{} failed", name))?;
    output.print(name, config.output.json);
    Ok(())
}
