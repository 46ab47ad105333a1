//! Software PWM, hardware PWM and servo pulses

use pigpio_core::{validate, Command, Packet};

use crate::error::ClientError;
use crate::session::Session;
use crate::transport::Transport;

impl<T: Transport> Session<T> {
    /// Query a per-pin value (`command pin 0`)
    async fn pin_value(&self, command: Command, pin: u32) -> Result<u32, ClientError> {
        self.ensure_ready()?;
        validate::user_pin(pin)?;
        self.value(command, Packet::request(command, pin, 0)).await
    }

    /// Start PWM on a pin. `duty` is relative to the pin's PWM range.
    pub async fn set_pwm_duty_cycle(&self, pin: u32, duty: u32) -> Result<(), ClientError> {
        self.ensure_ready()?;
        validate::user_pin(pin)?;
        validate::duty_cycle(duty)?;
        let command = Command::SetPwmDutyCycle;
        self.value(command, Packet::request(command, pin, duty)).await?;
        Ok(())
    }

    pub async fn get_pwm_duty_cycle(&self, pin: u32) -> Result<u32, ClientError> {
        self.pin_value(Command::GetPwmDutyCycle, pin).await
    }

    /// Set the PWM range of a pin. Returns the real range the daemon uses.
    pub async fn set_pwm_range(&self, pin: u32, range: u32) -> Result<u32, ClientError> {
        self.ensure_ready()?;
        validate::user_pin(pin)?;
        validate::pwm_range(range)?;
        let command = Command::SetPwmRange;
        self.value(command, Packet::request(command, pin, range)).await
    }

    pub async fn get_pwm_range(&self, pin: u32) -> Result<u32, ClientError> {
        self.pin_value(Command::GetPwmRange, pin).await
    }

    pub async fn get_pwm_real_range(&self, pin: u32) -> Result<u32, ClientError> {
        self.pin_value(Command::GetPwmRealRange, pin).await
    }

    /// Set the PWM frequency of a pin. Returns the closest frequency the
    /// daemon could select.
    pub async fn set_pwm_frequency(&self, pin: u32, frequency: u32) -> Result<u32, ClientError> {
        self.ensure_ready()?;
        validate::user_pin(pin)?;
        validate::pwm_frequency(frequency)?;
        let command = Command::SetPwmFrequency;
        self.value(command, Packet::request(command, pin, frequency)).await
    }

    pub async fn get_pwm_frequency(&self, pin: u32) -> Result<u32, ClientError> {
        self.pin_value(Command::GetPwmFrequency, pin).await
    }

    /// Hardware PWM. `duty` is in millionths, 0 to 1_000_000.
    pub async fn hardware_pwm(&self, pin: u32, frequency: u32, duty: u32) -> Result<(), ClientError> {
        self.ensure_ready()?;
        validate::user_pin(pin)?;
        validate::hardware_pwm(frequency, duty)?;
        let command = Command::HardwarePwm;
        self.value(command, Packet::request(command, pin, frequency).with_u32(duty))
            .await?;
        Ok(())
    }

    /// Servo pulse width in microseconds. 0 switches pulses off.
    pub async fn set_servo_pulse_width(&self, pin: u32, width: u32) -> Result<(), ClientError> {
        self.ensure_ready()?;
        validate::user_pin(pin)?;
        validate::pulse_width(width)?;
        let command = Command::SetServoPulseWidth;
        self.value(command, Packet::request(command, pin, width)).await?;
        Ok(())
    }

    pub async fn get_servo_pulse_width(&self, pin: u32) -> Result<u32, ClientError> {
        self.pin_value(Command::GetServoPulseWidth, pin).await
    }
}
