//! Serial ports opened by the daemon

use pigpio_core::{validate, Command, HandleKind, Packet, SerialHandle, MAX_EXTENSION_LEN};
use tracing::{debug, trace};

use crate::error::ClientError;
use crate::session::{check_buffer, copy_payload, narrow, Session};
use crate::transport::Transport;

impl<T: Transport> Session<T> {
    /// Open a serial device such as `/dev/ttyAMA0`
    pub async fn serial_open(&self, device: &str, baud: u32, flags: u32) -> Result<SerialHandle, ClientError> {
        self.ensure_ready()?;
        validate::serial_device(device)?;
        validate::serial_baud(baud)?;
        let command = Command::SerialOpen;
        let handle = self
            .value(command, Packet::request(command, baud, flags).with_str(device))
            .await?;
        self.opened(HandleKind::Serial, handle);
        debug!(device, baud, handle, "Opened serial device");
        Ok(SerialHandle(handle))
    }

    pub async fn serial_close(&self, handle: SerialHandle) -> Result<(), ClientError> {
        self.close_handle(Command::SerialClose, handle).await
    }

    pub async fn serial_write_byte(&self, handle: SerialHandle, byte: u8) -> Result<(), ClientError> {
        self.ensure_ready()?;
        self.check_handle(handle)?;
        let command = Command::SerialWriteByte;
        self.value(command, Packet::request(command, handle.0, byte.into()))
            .await?;
        Ok(())
    }

    pub async fn serial_read_byte(&self, handle: SerialHandle) -> Result<u8, ClientError> {
        self.ensure_ready()?;
        self.check_handle(handle)?;
        let command = Command::SerialReadByte;
        let value = self.value(command, Packet::request(command, handle.0, 0)).await?;
        narrow(command, value)
    }

    pub async fn serial_write(
        &self,
        handle: SerialHandle,
        data: &[u8],
        offset: usize,
        length: usize,
    ) -> Result<(), ClientError> {
        self.ensure_ready()?;
        self.check_handle(handle)?;
        validate::payload("length", length)?;
        check_buffer("data", data, offset, length)?;
        let command = Command::SerialWrite;
        self.value(
            command,
            Packet::request(command, handle.0, 0).with_bytes(&data[offset..offset + length]),
        )
        .await?;
        Ok(())
    }

    /// Read up to `length` buffered bytes. Returns 0 when nothing is waiting.
    pub async fn serial_read(
        &self,
        handle: SerialHandle,
        buffer: &mut [u8],
        offset: usize,
        length: usize,
    ) -> Result<usize, ClientError> {
        self.ensure_ready()?;
        self.check_handle(handle)?;
        validate::payload("length", length)?;
        check_buffer("buffer", buffer, offset, length)?;
        let command = Command::SerialRead;
        let response = self
            .dispatch(command, Packet::request(command, handle.0, length as u32))
            .await?;
        Ok(copy_payload(command, &response, buffer, offset, length))
    }

    /// Bytes waiting in the daemon's receive buffer
    pub async fn serial_available(&self, handle: SerialHandle) -> Result<u32, ClientError> {
        self.ensure_ready()?;
        self.check_handle(handle)?;
        let command = Command::SerialDataAvailable;
        self.value(command, Packet::request(command, handle.0, 0)).await
    }

    /// Discard whatever is waiting in the receive buffer with one read of
    /// at most 65536 bytes. Returns the number of bytes discarded.
    pub async fn serial_drain(&self, handle: SerialHandle) -> Result<u32, ClientError> {
        let available = self.serial_available(handle).await?;
        if available == 0 {
            return Ok(0);
        }

        let command = Command::SerialRead;
        let count = available.min(MAX_EXTENSION_LEN as u32);
        let response = self
            .dispatch(command, Packet::request(command, handle.0, count))
            .await?;
        let drained = response.result().max(0) as u32;
        trace!(handle = handle.0, available, drained, "Drained serial buffer");
        Ok(drained)
    }
}
