//! SPI channels opened by the daemon

use pigpio_core::{validate, Command, HandleKind, Packet, SpiHandle};
use tracing::debug;

use crate::error::ClientError;
use crate::session::{check_buffer, copy_payload, Session};
use crate::transport::Transport;

impl<T: Transport> Session<T> {
    /// Open SPI `channel` at `baud` bits per second. `flags` select the SPI
    /// mode, chip-select polarity and the auxiliary peripheral.
    pub async fn spi_open(&self, channel: u32, baud: u32, flags: u32) -> Result<SpiHandle, ClientError> {
        self.ensure_ready()?;
        validate::spi_channel(channel)?;
        validate::spi_baud(baud)?;
        let command = Command::SpiOpen;
        let handle = self
            .value(command, Packet::request(command, channel, baud).with_u32(flags))
            .await?;
        self.opened(HandleKind::Spi, handle);
        debug!(channel, baud, handle, "Opened SPI channel");
        Ok(SpiHandle(handle))
    }

    pub async fn spi_close(&self, handle: SpiHandle) -> Result<(), ClientError> {
        self.close_handle(Command::SpiClose, handle).await
    }

    /// Write `data[offset..offset + length]`. Returns the bytes written.
    pub async fn spi_write(
        &self,
        handle: SpiHandle,
        data: &[u8],
        offset: usize,
        length: usize,
    ) -> Result<u32, ClientError> {
        self.ensure_ready()?;
        self.check_handle(handle)?;
        validate::payload("length", length)?;
        check_buffer("data", data, offset, length)?;
        let command = Command::SpiWrite;
        self.value(
            command,
            Packet::request(command, handle.0, 0).with_bytes(&data[offset..offset + length]),
        )
        .await
    }

    pub async fn spi_read(
        &self,
        handle: SpiHandle,
        buffer: &mut [u8],
        offset: usize,
        length: usize,
    ) -> Result<usize, ClientError> {
        self.ensure_ready()?;
        self.check_handle(handle)?;
        validate::payload("length", length)?;
        check_buffer("buffer", buffer, offset, length)?;
        let command = Command::SpiRead;
        let response = self
            .dispatch(command, Packet::request(command, handle.0, length as u32))
            .await?;
        Ok(copy_payload(command, &response, buffer, offset, length))
    }

    /// Full-duplex transfer: clock out `write[write_offset..]` while reading
    /// the same number of bytes into `read[read_offset..]`
    pub async fn spi_transfer(
        &self,
        handle: SpiHandle,
        write: &[u8],
        write_offset: usize,
        read: &mut [u8],
        read_offset: usize,
        length: usize,
    ) -> Result<usize, ClientError> {
        self.ensure_ready()?;
        self.check_handle(handle)?;
        validate::payload("length", length)?;
        check_buffer("write", write, write_offset, length)?;
        check_buffer("read", read, read_offset, length)?;
        let command = Command::SpiTransfer;
        let request = Packet::request(command, handle.0, 0)
            .with_bytes(&write[write_offset..write_offset + length]);
        let response = self.dispatch(command, request).await?;
        Ok(copy_payload(command, &response, read, read_offset, length))
    }
}
