//! pigpio client - async session to a remote pigpio daemon
//!
//! A [`Session`] owns one TCP connection, performs the version handshake and
//! exposes one async method per daemon command. Parameters are validated
//! locally before anything is written, daemon status codes become typed
//! errors, and handles returned by open commands are tracked per session.
//!
//! ```no_run
//! # async fn demo() -> Result<(), pigpio_client::ClientError> {
//! use pigpio_client::{Level, PinMode};
//!
//! let pi = pigpio_client::connect("raspberrypi.local", 8888).await?;
//! pi.set_mode(17, PinMode::Output).await?;
//! pi.write(17, Level::High).await?;
//! pi.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
mod gpio;
mod i2c;
mod pwm;
pub mod registry;
mod serial;
pub mod session;
mod spi;
pub mod timing;
pub mod transport;

pub use config::{ClientConfig, ConfigError};
pub use error::{check_result, ClientError, ConnectionError, ErrorKind, Phase};
pub use registry::HandleRegistry;
pub use session::{connect, Session, SessionState};
pub use timing::tick_diff;
pub use transport::{StreamTransport, TcpTransport, Transport};

pub use pigpio_core::{
    Command, DaemonStatus, HandleKind, I2cHandle, Level, PinMode, ProtocolError, Pull,
    SerialHandle, SpiHandle, StatusKind, ValidationError,
};
