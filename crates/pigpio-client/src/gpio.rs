//! Daemon information and basic GPIO commands

use pigpio_core::{validate, Command, Level, Packet, PinMode, ProtocolError, Pull};

use crate::error::ClientError;
use crate::session::Session;
use crate::transport::Transport;

impl<T: Transport> Session<T> {
    /// Daemon software version. The result is returned as-is.
    pub async fn version(&self) -> Result<u32, ClientError> {
        let response = self
            .exchange(Command::Version, Packet::request(Command::Version, 0, 0))
            .await?;
        Ok(response.p3())
    }

    /// Board hardware revision
    pub async fn hardware_revision(&self) -> Result<u32, ClientError> {
        let command = Command::HardwareRevision;
        let revision = self.value(command, Packet::request(command, 0, 0)).await?;
        if revision == 0 {
            return Err(ProtocolError::UnexpectedValue { command, value: 0 }.into());
        }
        Ok(revision)
    }

    /// Board hardware revision as lower-case hex, e.g. `a02082`
    pub async fn hardware_revision_string(&self) -> Result<String, ClientError> {
        Ok(format!("{:x}", self.hardware_revision().await?))
    }

    pub async fn set_pull(&self, pin: u32, pull: Pull) -> Result<(), ClientError> {
        self.ensure_ready()?;
        validate::pin(pin)?;
        self.value(Command::SetPull, Packet::request(Command::SetPull, pin, pull.value()))
            .await?;
        Ok(())
    }

    pub async fn get_mode(&self, pin: u32) -> Result<PinMode, ClientError> {
        self.ensure_ready()?;
        validate::pin(pin)?;
        let command = Command::GetMode;
        let value = self.value(command, Packet::request(command, pin, 0)).await?;
        PinMode::from_value(value).ok_or_else(|| {
            ProtocolError::UnexpectedValue {
                command,
                value: value.into(),
            }
            .into()
        })
    }

    pub async fn set_mode(&self, pin: u32, mode: PinMode) -> Result<(), ClientError> {
        self.ensure_ready()?;
        validate::pin(pin)?;
        self.value(Command::SetMode, Packet::request(Command::SetMode, pin, mode.value()))
            .await?;
        Ok(())
    }

    pub async fn read(&self, pin: u32) -> Result<Level, ClientError> {
        self.ensure_ready()?;
        validate::pin(pin)?;
        let command = Command::Read;
        let value = self.value(command, Packet::request(command, pin, 0)).await?;
        Level::from_value(value).ok_or_else(|| {
            ProtocolError::UnexpectedValue {
                command,
                value: value.into(),
            }
            .into()
        })
    }

    pub async fn write(&self, pin: u32, level: Level) -> Result<(), ClientError> {
        self.ensure_ready()?;
        validate::pin(pin)?;
        self.value(Command::Write, Packet::request(Command::Write, pin, level.value()))
            .await?;
        Ok(())
    }

    /// Ignore level changes shorter than `steady` microseconds
    pub async fn glitch_filter(&self, pin: u32, steady: u32) -> Result<(), ClientError> {
        self.ensure_ready()?;
        validate::user_pin(pin)?;
        validate::glitch_filter(steady)?;
        let command = Command::GlitchFilter;
        self.value(command, Packet::request(command, pin, steady)).await?;
        Ok(())
    }

    /// Report changes only after the level has been stable for `steady`
    /// microseconds, then for `active` microseconds
    pub async fn noise_filter(&self, pin: u32, steady: u32, active: u32) -> Result<(), ClientError> {
        self.ensure_ready()?;
        validate::user_pin(pin)?;
        validate::noise_filter(steady, active)?;
        let command = Command::NoiseFilter;
        self.value(command, Packet::request(command, pin, steady).with_u32(active))
            .await?;
        Ok(())
    }
}
