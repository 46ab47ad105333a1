//! Daemon-side delays and the microsecond tick

use pigpio_core::{validate, Command, Packet};

use crate::error::ClientError;
use crate::session::Session;
use crate::transport::Transport;

impl<T: Transport> Session<T> {
    /// Busy-wait on the daemon for `micros` microseconds
    pub async fn delay_micros(&self, micros: u32) -> Result<u32, ClientError> {
        let command = Command::DelayMicros;
        self.value(command, Packet::request(command, micros, 0)).await
    }

    /// Sleep on the daemon for `millis` milliseconds
    pub async fn delay_millis(&self, millis: u32) -> Result<u32, ClientError> {
        self.ensure_ready()?;
        validate::delay_millis(millis)?;
        let command = Command::DelayMillis;
        self.value(command, Packet::request(command, millis, 0)).await
    }

    /// Microseconds since the daemon started. Wraps roughly every 72 minutes.
    pub async fn tick(&self) -> Result<u32, ClientError> {
        let response = self
            .exchange(Command::Tick, Packet::request(Command::Tick, 0, 0))
            .await?;
        Ok(response.p3())
    }
}

/// Microseconds from `start` to `end`, correct across one tick wrap
pub fn tick_diff(start: u32, end: u32) -> u32 {
    end.wrapping_sub(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_diff() {
        assert_eq!(tick_diff(100, 350), 250);
        assert_eq!(tick_diff(u32::MAX - 9, 10), 20);
        assert_eq!(tick_diff(5, 5), 0);
    }
}
