//! I2C device access through daemon handles
//!
//! Every operation except [`Session::i2c_open`] takes a handle previously
//! returned by `i2c_open` on the same session. Block reads copy the reply into
//! `buffer[offset..offset + length]` and return the number of bytes the
//! daemon reported, which can exceed `length`.

use pigpio_core::{validate, Command, HandleKind, I2cHandle, Packet};
use tracing::debug;

use crate::error::ClientError;
use crate::session::{check_buffer, copy_payload, narrow, Session};
use crate::transport::Transport;

impl<T: Transport> Session<T> {
    /// Open the device at `address` on `bus`
    pub async fn i2c_open(&self, bus: u32, address: u32, flags: u32) -> Result<I2cHandle, ClientError> {
        self.ensure_ready()?;
        validate::i2c_address(address)?;
        let command = Command::I2cOpen;
        let handle = self
            .value(command, Packet::request(command, bus, address).with_u32(flags))
            .await?;
        self.opened(HandleKind::I2c, handle);
        debug!(bus, address, handle, "Opened I2C device");
        Ok(I2cHandle(handle))
    }

    pub async fn i2c_close(&self, handle: I2cHandle) -> Result<(), ClientError> {
        self.close_handle(Command::I2cClose, handle).await
    }

    /// SMBus quick command carrying a single bit
    pub async fn i2c_write_quick(&self, handle: I2cHandle, bit: bool) -> Result<(), ClientError> {
        self.ensure_ready()?;
        self.check_handle(handle)?;
        let command = Command::I2cWriteQuick;
        self.value(command, Packet::request(command, handle.0, bit as u32))
            .await?;
        Ok(())
    }

    pub async fn i2c_write_byte(&self, handle: I2cHandle, byte: u8) -> Result<(), ClientError> {
        self.ensure_ready()?;
        self.check_handle(handle)?;
        let command = Command::I2cWriteByte;
        self.value(command, Packet::request(command, handle.0, byte.into()))
            .await?;
        Ok(())
    }

    pub async fn i2c_read_byte(&self, handle: I2cHandle) -> Result<u8, ClientError> {
        self.ensure_ready()?;
        self.check_handle(handle)?;
        let command = Command::I2cReadByte;
        let value = self.value(command, Packet::request(command, handle.0, 0)).await?;
        narrow(command, value)
    }

    pub async fn i2c_write_byte_data(&self, handle: I2cHandle, register: u32, byte: u8) -> Result<(), ClientError> {
        self.ensure_ready()?;
        self.check_handle(handle)?;
        validate::i2c_register(register)?;
        let command = Command::I2cWriteByteData;
        self.value(
            command,
            Packet::request(command, handle.0, register).with_u32(byte.into()),
        )
        .await?;
        Ok(())
    }

    pub async fn i2c_read_byte_data(&self, handle: I2cHandle, register: u32) -> Result<u8, ClientError> {
        self.ensure_ready()?;
        self.check_handle(handle)?;
        validate::i2c_register(register)?;
        let command = Command::I2cReadByteData;
        let value = self
            .value(command, Packet::request(command, handle.0, register))
            .await?;
        narrow(command, value)
    }

    pub async fn i2c_write_word_data(&self, handle: I2cHandle, register: u32, word: u16) -> Result<(), ClientError> {
        self.ensure_ready()?;
        self.check_handle(handle)?;
        validate::i2c_register(register)?;
        let command = Command::I2cWriteWordData;
        self.value(
            command,
            Packet::request(command, handle.0, register).with_u32(word.into()),
        )
        .await?;
        Ok(())
    }

    pub async fn i2c_read_word_data(&self, handle: I2cHandle, register: u32) -> Result<u16, ClientError> {
        self.ensure_ready()?;
        self.check_handle(handle)?;
        validate::i2c_register(register)?;
        let command = Command::I2cReadWordData;
        let value = self
            .value(command, Packet::request(command, handle.0, register))
            .await?;
        narrow(command, value)
    }

    /// Write a word to `register` and read a word back
    pub async fn i2c_process_call(&self, handle: I2cHandle, register: u32, word: u16) -> Result<u16, ClientError> {
        self.ensure_ready()?;
        self.check_handle(handle)?;
        validate::i2c_register(register)?;
        let command = Command::I2cProcessCall;
        let value = self
            .value(
                command,
                Packet::request(command, handle.0, register).with_u32(word.into()),
            )
            .await?;
        narrow(command, value)
    }

    /// SMBus block write of `data[offset..offset + length]` (1 to 32 bytes)
    pub async fn i2c_write_block_data(
        &self,
        handle: I2cHandle,
        register: u32,
        data: &[u8],
        offset: usize,
        length: usize,
    ) -> Result<(), ClientError> {
        self.ensure_ready()?;
        self.check_handle(handle)?;
        validate::i2c_register(register)?;
        validate::i2c_block_length(length)?;
        check_buffer("data", data, offset, length)?;
        let command = Command::I2cWriteBlockData;
        self.value(
            command,
            Packet::request(command, handle.0, register).with_bytes(&data[offset..offset + length]),
        )
        .await?;
        Ok(())
    }

    /// SMBus block read. The device decides how many bytes it returns.
    pub async fn i2c_read_block_data(
        &self,
        handle: I2cHandle,
        register: u32,
        buffer: &mut [u8],
        offset: usize,
        length: usize,
    ) -> Result<usize, ClientError> {
        self.ensure_ready()?;
        self.check_handle(handle)?;
        validate::i2c_register(register)?;
        validate::count("length", length)?;
        check_buffer("buffer", buffer, offset, length)?;
        let command = Command::I2cReadBlockData;
        let response = self
            .dispatch(command, Packet::request(command, handle.0, register))
            .await?;
        Ok(copy_payload(command, &response, buffer, offset, length))
    }

    /// Write `write[write_offset..write_offset + write_length]` to `register`
    /// and read the device's reply into `read[read_offset..]`. The device
    /// decides the reply length; at most `read_length` bytes are copied.
    #[allow(clippy::too_many_arguments)]
    pub async fn i2c_block_process_call(
        &self,
        handle: I2cHandle,
        register: u32,
        write: &[u8],
        write_offset: usize,
        write_length: usize,
        read: &mut [u8],
        read_offset: usize,
        read_length: usize,
    ) -> Result<usize, ClientError> {
        self.ensure_ready()?;
        self.check_handle(handle)?;
        validate::i2c_register(register)?;
        validate::i2c_block_length(write_length)?;
        check_buffer("write", write, write_offset, write_length)?;
        validate::count("read length", read_length)?;
        check_buffer("read", read, read_offset, read_length)?;
        let command = Command::I2cBlockProcessCall;
        let request = Packet::request(command, handle.0, register)
            .with_bytes(&write[write_offset..write_offset + write_length]);
        let response = self.dispatch(command, request).await?;
        Ok(copy_payload(command, &response, read, read_offset, read_length))
    }

    /// I2C block write of `data[offset..offset + length]` (1 to 32 bytes)
    pub async fn i2c_write_i2c_block_data(
        &self,
        handle: I2cHandle,
        register: u32,
        data: &[u8],
        offset: usize,
        length: usize,
    ) -> Result<(), ClientError> {
        self.ensure_ready()?;
        self.check_handle(handle)?;
        validate::i2c_register(register)?;
        validate::i2c_block_length(length)?;
        check_buffer("data", data, offset, length)?;
        let command = Command::I2cWriteI2cBlockData;
        self.value(
            command,
            Packet::request(command, handle.0, register).with_bytes(&data[offset..offset + length]),
        )
        .await?;
        Ok(())
    }

    /// I2C block read of `length` bytes (1 to 32) starting at `register`
    pub async fn i2c_read_i2c_block_data(
        &self,
        handle: I2cHandle,
        register: u32,
        buffer: &mut [u8],
        offset: usize,
        length: usize,
    ) -> Result<usize, ClientError> {
        self.ensure_ready()?;
        self.check_handle(handle)?;
        validate::i2c_register(register)?;
        validate::i2c_block_length(length)?;
        check_buffer("buffer", buffer, offset, length)?;
        let command = Command::I2cReadI2cBlockData;
        let request = Packet::request(command, handle.0, register).with_u32(length as u32);
        let response = self.dispatch(command, request).await?;
        Ok(copy_payload(command, &response, buffer, offset, length))
    }

    /// Raw write of `data[offset..offset + length]` to the device
    pub async fn i2c_write_device(
        &self,
        handle: I2cHandle,
        data: &[u8],
        offset: usize,
        length: usize,
    ) -> Result<(), ClientError> {
        self.ensure_ready()?;
        self.check_handle(handle)?;
        validate::payload("length", length)?;
        check_buffer("data", data, offset, length)?;
        let command = Command::I2cWriteDevice;
        self.value(
            command,
            Packet::request(command, handle.0, 0).with_bytes(&data[offset..offset + length]),
        )
        .await?;
        Ok(())
    }

    /// Raw read of up to `length` bytes from the device
    pub async fn i2c_read_device(
        &self,
        handle: I2cHandle,
        buffer: &mut [u8],
        offset: usize,
        length: usize,
    ) -> Result<usize, ClientError> {
        self.ensure_ready()?;
        self.check_handle(handle)?;
        validate::payload("length", length)?;
        check_buffer("buffer", buffer, offset, length)?;
        let command = Command::I2cReadDevice;
        let response = self
            .dispatch(command, Packet::request(command, handle.0, length as u32))
            .await?;
        Ok(copy_payload(command, &response, buffer, offset, length))
    }
}
