mod common;

use common::*;
use pigpio_client::{
    ClientConfig, ClientError, ConnectionError, ErrorKind, I2cHandle, Level, PinMode, ProtocolError,
    Phase, Session, SessionState, SpiHandle, StatusKind, TcpTransport,
};
use pigpio_core::{encode, Command, Constraint, HandleKind};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_unconnected_session_fails_fast() {
    let session: Session<TcpTransport> = Session::new(ClientConfig::new("192.0.2.1", 8888));
    let err = session.read(4).await.unwrap_err();
    assert!(matches!(err, ClientError::NotReady(SessionState::Unconnected)));

    let err = session.tick().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotReady);
    assert_eq!(session.state(), SessionState::Unconnected);
}

#[tokio::test]
async fn test_handshake() {
    let (session, wire) = ready_session(vec![]).await;
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.daemon_version(), Some(DAEMON_VERSION));
    assert_eq!(wire.requests(), vec![encode(26, 0, 0, 0, &[])]);
}

#[tokio::test]
async fn test_failed_handshake_faults() {
    let (transport, _wire) = ScriptedTransport::new(vec![Reply::Closed]);
    let session = Session::new(ClientConfig::default());
    let err = session.attach(transport).await.unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(session.state(), SessionState::Faulted);
    assert_eq!(session.daemon_version(), None);
}

#[tokio::test]
async fn test_i2c_open_request() {
    let (session, wire) = ready_session(vec![reply(Command::I2cOpen, 1, 0x48, 4)]).await;

    let handle = session.i2c_open(1, 0x48, 0).await.unwrap();
    assert_eq!(handle, I2cHandle(4));
    assert_eq!(wire.commands(), vec![encode(54, 1, 0x48, 4, &[0, 0, 0, 0])]);
    assert!(session.handles().is_valid(HandleKind::I2c, 4));
}

#[tokio::test]
async fn test_noise_filter_request() {
    let (session, wire) = ready_session(vec![reply(Command::NoiseFilter, 4, 1000, 0)]).await;

    session.noise_filter(4, 1000, 5000).await.unwrap();
    assert_eq!(
        wire.commands(),
        vec![encode(98, 4, 1000, 4, &5000u32.to_le_bytes())]
    );
}

#[tokio::test]
async fn test_block_read_truncated_to_buffer() {
    let payload: Vec<u8> = (0..16).collect();
    let (session, wire) = ready_session(vec![
        reply(Command::I2cOpen, 1, 0x48, 4),
        reply_ext(Command::I2cReadBlockData, 4, 0x10, &payload),
    ])
    .await;
    let handle = session.i2c_open(1, 0x48, 0).await.unwrap();

    let mut buffer = [0u8; 10];
    let declared = session
        .i2c_read_block_data(handle, 0x10, &mut buffer, 0, 10)
        .await
        .unwrap();
    assert_eq!(declared, 16);
    assert_eq!(&buffer[..], &payload[..10]);
    assert_eq!(wire.commands()[1], encode(65, 4, 0x10, 0, &[]));
}

#[tokio::test]
async fn test_read_into_offset() {
    let (session, _wire) = ready_session(vec![
        reply(Command::SpiOpen, 0, 1_000_000, 0),
        reply_ext(Command::SpiTransfer, 0, 0, &[0xaa, 0xbb, 0xcc]),
    ])
    .await;
    let handle = session.spi_open(0, 1_000_000, 0).await.unwrap();

    let mut read = [0u8; 5];
    let count = session
        .spi_transfer(handle, &[1, 2, 3], 0, &mut read, 2, 3)
        .await
        .unwrap();
    assert_eq!(count, 3);
    assert_eq!(read, [0, 0, 0xaa, 0xbb, 0xcc]);
}

#[tokio::test]
async fn test_block_process_call_reply_longer_than_write() {
    let (session, wire) = ready_session(vec![
        reply(Command::I2cOpen, 1, 0x48, 4),
        reply_ext(Command::I2cBlockProcessCall, 4, 0x20, &[0xa1, 0xa2, 0xa3, 0xa4]),
    ])
    .await;
    let handle = session.i2c_open(1, 0x48, 0).await.unwrap();

    let mut read = [0u8; 8];
    let declared = session
        .i2c_block_process_call(handle, 0x20, &[0x55], 0, 1, &mut read, 2, 6)
        .await
        .unwrap();
    assert_eq!(declared, 4);
    assert_eq!(read, [0, 0, 0xa1, 0xa2, 0xa3, 0xa4, 0, 0]);
    assert_eq!(wire.commands()[1], encode(70, 4, 0x20, 1, &[0x55]));
}

#[tokio::test]
async fn test_block_process_call_checks_read_buffer() {
    let (session, wire) = ready_session(vec![reply(Command::I2cOpen, 1, 0x48, 4)]).await;
    let handle = session.i2c_open(1, 0x48, 0).await.unwrap();

    let mut read = [0u8; 4];
    let err = session
        .i2c_block_process_call(handle, 0x20, &[0x55], 0, 1, &mut read, 2, 4)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(wire.commands().len(), 1);
}

#[tokio::test]
async fn test_invalid_parameters_never_reach_the_wire() {
    let (session, wire) = ready_session(vec![]).await;

    let err = session.read(54).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(session.set_servo_pulse_width(4, 499).await.is_err());
    assert!(session.set_pwm_duty_cycle(32, 10).await.is_err());
    assert!(session.delay_millis(0).await.is_err());
    assert!(session.i2c_open(1, 0x80, 0).await.is_err());
    assert!(session.spi_open(3, 1_000_000, 0).await.is_err());
    assert!(session.serial_open("", 9600, 0).await.is_err());

    assert_eq!(wire.len(), 1);
    assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn test_buffer_out_of_range() {
    let (session, wire) = ready_session(vec![reply(Command::SpiOpen, 1, 32_000, 2)]).await;
    let handle = session.spi_open(1, 32_000, 0).await.unwrap();

    let mut buffer = [0u8; 4];
    let err = session.spi_read(handle, &mut buffer, 2, 3).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(wire.commands().len(), 1);
}

#[tokio::test]
async fn test_handle_lifecycle() {
    let (session, wire) = ready_session(vec![
        reply(Command::I2cOpen, 1, 0x48, 4),
        reply(Command::I2cClose, 4, 0, 0),
    ])
    .await;

    let handle = session.i2c_open(1, 0x48, 0).await.unwrap();
    session.i2c_close(handle).await.unwrap();
    assert!(!session.handles().is_valid(HandleKind::I2c, 4));
    assert_eq!(wire.commands()[1], encode(55, 4, 0, 0, &[]));

    // Second close is a local no-op
    session.i2c_close(handle).await.unwrap();
    assert_eq!(wire.commands().len(), 2);
}

#[tokio::test]
async fn test_close_of_stale_handle_releases_it() {
    let (session, wire) = ready_session(vec![
        reply(Command::SpiOpen, 0, 500_000, 1),
        reply(Command::SpiClose, 1, 0, -25),
    ])
    .await;
    let handle = session.spi_open(0, 500_000, 0).await.unwrap();

    let err = session.spi_close(handle).await.unwrap_err();
    assert_eq!(err.status().unwrap().kind, StatusKind::BadHandle);
    assert!(!session.handles().is_valid(HandleKind::Spi, 1));
    assert_eq!(session.state(), SessionState::Ready);

    session.close().await.unwrap();
    assert_eq!(wire.commands().len(), 2);
}

#[tokio::test]
async fn test_failed_close_keeps_handle() {
    let (session, _wire) = ready_session(vec![
        reply(Command::SerialOpen, 9600, 0, 2),
        reply(Command::SerialClose, 2, 0, -1),
    ])
    .await;
    let handle = session.serial_open("/dev/ttyS0", 9600, 0).await.unwrap();

    assert!(session.serial_close(handle).await.is_err());
    assert!(session.handles().is_valid(HandleKind::Serial, 2));
}

#[tokio::test]
async fn test_unknown_handle_rejected() {
    let (session, wire) = ready_session(vec![]).await;

    let err = session.i2c_read_byte(I2cHandle(9)).await.unwrap_err();
    match err {
        ClientError::Validation(e) => {
            assert_eq!(e.constraint, Constraint::NotOpen(HandleKind::I2c))
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(wire.len(), 1);
}

#[tokio::test]
async fn test_lenient_handles_pass_through() {
    let config = ClientConfig {
        strict_handles: false,
        ..Default::default()
    };
    let (session, wire) =
        ready_session_with(config, vec![reply(Command::I2cReadByte, 9, 0, 0x5a)]).await;

    assert_eq!(session.i2c_read_byte(I2cHandle(9)).await.unwrap(), 0x5a);
    assert_eq!(wire.commands(), vec![encode(59, 9, 0, 0, &[])]);
}

#[tokio::test]
async fn test_daemon_error_keeps_session_ready() {
    let (session, _wire) = ready_session(vec![
        reply(Command::SetMode, 4, 1, -3),
        reply(Command::Read, 4, 0, 1),
    ])
    .await;

    let err = session.set_mode(4, PinMode::Output).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Command);
    assert_eq!(err.status().unwrap().kind, StatusKind::BadPin);
    assert_eq!(session.state(), SessionState::Ready);

    assert_eq!(session.read(4).await.unwrap(), Level::High);
}

#[tokio::test]
async fn test_unknown_status_code() {
    let (session, _wire) = ready_session(vec![reply(Command::Write, 4, 1, -999)]).await;

    let err = session.write(4, Level::High).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::UnknownCommand {
            command: Command::Write,
            code: -999
        }
    ));
    assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn test_connection_loss_faults_session() {
    let (session, wire) = ready_session(vec![
        reply(Command::SerialOpen, 9600, 0, 1),
        Reply::Closed,
    ])
    .await;
    session.serial_open("/dev/ttyAMA0", 9600, 0).await.unwrap();

    let err = session.tick().await.unwrap_err();
    assert!(matches!(err, ClientError::Connection(ConnectionError::Closed)));
    assert_eq!(session.state(), SessionState::Faulted);
    assert!(session.handles().is_empty());

    let err = session.tick().await.unwrap_err();
    assert!(matches!(err, ClientError::NotReady(SessionState::Faulted)));
    assert_eq!(wire.len(), 3);
}

#[tokio::test]
async fn test_echo_mismatch_faults_session() {
    let (session, _wire) = ready_session(vec![reply(Command::Write, 4, 0, 0)]).await;

    let err = session.read(4).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Protocol(ProtocolError::CommandMismatch {
            expected: 3,
            received: 4
        })
    ));
    assert_eq!(session.state(), SessionState::Faulted);
}

#[tokio::test]
async fn test_reattach_after_fault() {
    let (session, _wire) = ready_session(vec![Reply::Closed]).await;
    assert!(session.tick().await.is_err());
    assert_eq!(session.state(), SessionState::Faulted);

    let (transport, wire) =
        ScriptedTransport::new(vec![version_reply(), reply(Command::Tick, 0, 0, 1234)]);
    assert_eq!(session.attach(transport).await.unwrap(), DAEMON_VERSION);
    assert_eq!(session.tick().await.unwrap(), 1234);
    assert_eq!(wire.len(), 2);
}

#[tokio::test]
async fn test_close_releases_outstanding_handles() {
    let (session, wire) = ready_session(vec![
        reply(Command::I2cOpen, 1, 0x48, 4),
        reply(Command::SpiOpen, 0, 500_000, 0),
        reply(Command::I2cClose, 4, 0, 0),
        reply(Command::SpiClose, 0, 0, 0),
    ])
    .await;
    session.i2c_open(1, 0x48, 0).await.unwrap();
    session.spi_open(0, 500_000, 0).await.unwrap();

    session.close().await.unwrap();
    assert_eq!(session.state(), SessionState::Closed);
    assert!(session.handles().is_empty());
    assert_eq!(wire.shutdowns(), 1);

    let commands = wire.commands();
    assert_eq!(commands[2], encode(55, 4, 0, 0, &[]));
    assert_eq!(commands[3], encode(72, 0, 0, 0, &[]));

    let err = session.spi_close(SpiHandle(0)).await.unwrap_err();
    assert!(matches!(err, ClientError::NotReady(SessionState::Closed)));
}

#[tokio::test]
async fn test_close_ignores_handle_errors() {
    let (session, wire) = ready_session(vec![
        reply(Command::SerialOpen, 115_200, 0, 2),
        reply(Command::SerialClose, 2, 0, -25),
    ])
    .await;
    session.serial_open("/dev/serial0", 115_200, 0).await.unwrap();

    session.close().await.unwrap();
    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(wire.shutdowns(), 1);
}

#[tokio::test]
async fn test_serial_drain() {
    let (session, wire) = ready_session(vec![
        reply(Command::SerialOpen, 9600, 0, 3),
        reply(Command::SerialDataAvailable, 3, 0, 5),
        reply_ext(Command::SerialRead, 3, 5, b"hello"),
    ])
    .await;
    let handle = session.serial_open("/dev/ttyUSB0", 9600, 0).await.unwrap();

    assert_eq!(session.serial_drain(handle).await.unwrap(), 5);
    let commands = wire.commands();
    assert_eq!(commands[0], encode(76, 9600, 0, 12, b"/dev/ttyUSB0"));
    assert_eq!(commands[1], encode(82, 3, 0, 0, &[]));
    assert_eq!(commands[2], encode(80, 3, 5, 0, &[]));
}

#[tokio::test]
async fn test_serial_drain_reports_bytes_read() {
    let (session, _wire) = ready_session(vec![
        reply(Command::SerialOpen, 9600, 0, 3),
        reply(Command::SerialDataAvailable, 3, 0, 8),
        reply_ext(Command::SerialRead, 3, 8, b"abc"),
    ])
    .await;
    let handle = session.serial_open("/dev/ttyUSB0", 9600, 0).await.unwrap();

    assert_eq!(session.serial_drain(handle).await.unwrap(), 3);
}

#[tokio::test]
async fn test_serial_drain_empty() {
    let (session, wire) = ready_session(vec![
        reply(Command::SerialOpen, 9600, 0, 0),
        reply(Command::SerialDataAvailable, 0, 0, 0),
    ])
    .await;
    let handle = session.serial_open("/dev/ttyUSB0", 9600, 0).await.unwrap();

    assert_eq!(session.serial_drain(handle).await.unwrap(), 0);
    assert_eq!(wire.commands().len(), 2);
}

#[tokio::test]
async fn test_hardware_revision() {
    let (session, _wire) = ready_session(vec![
        reply(Command::HardwareRevision, 0, 0, 0xa02082),
        reply(Command::HardwareRevision, 0, 0, 0),
    ])
    .await;

    assert_eq!(session.hardware_revision_string().await.unwrap(), "a02082");
    let err = session.hardware_revision().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Protocol(ProtocolError::UnexpectedValue { value: 0, .. })
    ));
}

#[tokio::test]
async fn test_hardware_pwm_request() {
    let (session, wire) = ready_session(vec![reply(Command::HardwarePwm, 18, 800, 0)]).await;

    session.hardware_pwm(18, 800, 250_000).await.unwrap();
    assert_eq!(
        wire.commands(),
        vec![encode(86, 18, 800, 4, &250_000u32.to_le_bytes())]
    );
}

#[tokio::test]
async fn test_concurrent_callers_are_serialized() {
    let (session, _daemon) = duplex_session(|header| {
        let result = if header.command == Command::Version.code() {
            DAEMON_VERSION
        } else {
            header.p1 * 10
        };
        Some(encode(header.command, header.p1, header.p2, result, &[]))
    })
    .await;
    let session = Arc::new(session);

    let mut tasks = Vec::new();
    for pin in 0..16u32 {
        let session = session.clone();
        tasks.push(tokio::spawn(async move {
            for _ in 0..8 {
                assert_eq!(session.get_pwm_duty_cycle(pin).await.unwrap(), pin * 10);
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    assert_eq!(session.state(), SessionState::Ready);
}

#[tokio::test]
async fn test_cancelled_exchange_faults_session() {
    let (session, _daemon) = duplex_session(|header| {
        if header.command == Command::Version.code() {
            Some(encode(header.command, 0, 0, DAEMON_VERSION, &[]))
        } else if header.command == Command::I2cOpen.code() {
            Some(encode(header.command, header.p1, header.p2, 4, &[]))
        } else {
            None
        }
    })
    .await;
    let handle = session.i2c_open(1, 0x48, 0).await.unwrap();
    assert!(session.handles().is_valid(HandleKind::I2c, handle.0));

    let cancelled = tokio::time::timeout(Duration::from_millis(20), session.read(4)).await;
    assert!(cancelled.is_err());
    assert_eq!(session.state(), SessionState::Faulted);
    assert!(session.handles().is_empty());

    let err = session.read(4).await.unwrap_err();
    assert!(matches!(err, ClientError::NotReady(SessionState::Faulted)));
}

#[tokio::test]
async fn test_read_timeout_faults_session() {
    let (session, _daemon) = duplex_session_with(Duration::from_millis(30), |header| {
        if header.command == Command::Version.code() {
            Some(encode(header.command, 0, 0, DAEMON_VERSION, &[]))
        } else {
            None
        }
    })
    .await;

    let err = session.tick().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Connection(ConnectionError::TimedOut(Phase::Read))
    ));
    assert!(err.is_fatal());
    assert_eq!(session.state(), SessionState::Faulted);

    let err = session.tick().await.unwrap_err();
    assert!(matches!(err, ClientError::NotReady(SessionState::Faulted)));
}
