use std::io::{self, Cursor, Read, Write};
use std::sync::{Arc, Mutex};
use tungstenite::protocol::Role;
use tungstenite::WebSocket;
use s9_channel_listener::{
    DriverAdapter, DriverDefaults, DriverHandlerConfig, DriverOptions, Payload, S9ChannelError,
    S9WebSocketDriver, SegmentPool,
};

/// In-memory stream: reads scripted server frames, collects everything written.
struct MockStream {
    input: Cursor<Vec<u8>>,
    output: Vec<u8>,
}

impl MockStream {
    fn new(frames: &[&[u8]]) -> Self {
        MockStream {
            input: Cursor::new(frames.concat()),
            output: Vec::new(),
        }
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.input.read(buf)
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// Unmasked frames as a server would send them
const TEXT_A: &[u8] = &[0x81, 0x01, b'a'];
const TEXT_B: &[u8] = &[0x81, 0x01, b'b'];
const BINARY_HELLO: &[u8] = &[0x82, 0x05, 0x48, 0x65, 0x6C, 0x6C, 0x6F];
const CLOSE_DONE: &[u8] = &[0x88, 0x06, 0x03, 0xE8, b'd', b'o', b'n', b'e'];

type Log = Arc<Mutex<Vec<String>>>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn driver(frames: &[&[u8]], options: DriverOptions) -> S9WebSocketDriver<MockStream> {
    let socket = WebSocket::from_raw_socket(MockStream::new(frames), Role::Client, None);
    S9WebSocketDriver::from_socket(socket, options)
}

fn recording_config(log: &Log) -> DriverHandlerConfig<&'static str> {
    let (open_log, message_log, close_log) = (log.clone(), log.clone(), log.clone());
    DriverHandlerConfig::new()
        .on_open(move |event| {
            open_log.lock().unwrap().push(format!("open {:?}", event.context));
            Ok(())
        })
        .on_message(move |event| {
            let entry = match event.message {
                Payload::Text(text) => format!("text {}", text),
                Payload::Binary(data) => format!("binary {:?}", data),
            };
            message_log.lock().unwrap().push(entry);
            Ok(())
        })
        .on_close(move |event| {
            close_log.lock().unwrap().push(format!("close {} {:?}", event.code, event.reason));
            Ok(())
        })
}

#[test]
fn delivers_open_messages_and_close_in_order() {
    init_tracing();
    let log: Log = Arc::default();
    let adapter = DriverAdapter::new(recording_config(&log), DriverDefaults).unwrap();
    let mut driver = driver(&[TEXT_A, TEXT_B, CLOSE_DONE], DriverOptions::new());

    driver.run(&adapter).unwrap();

    assert_eq!(*log.lock().unwrap(), vec![
        "open None",
        "text a",
        "text b",
        "close 1000 Some(\"done\")",
    ]);
}

#[test]
fn binary_payload_is_copied_out_of_pooled_segments() {
    init_tracing();
    let log: Log = Arc::default();
    let adapter = DriverAdapter::new(recording_config(&log), DriverDefaults).unwrap();
    let pool = SegmentPool::new(2, 8).unwrap();
    let mut driver = driver(&[BINARY_HELLO, CLOSE_DONE], DriverOptions::new()).with_pool(pool.clone());

    driver.run(&adapter).unwrap();

    assert_eq!(log.lock().unwrap()[1], "binary [72, 101, 108, 108, 111]");
    assert_eq!(pool.available(), 3);
}

#[test]
fn attached_context_reaches_open_handler() {
    let log: Log = Arc::default();
    let config = recording_config(&log).context("configured");
    let adapter = DriverAdapter::new(config, DriverDefaults).unwrap();
    let mut driver = driver(&[CLOSE_DONE], DriverOptions::new());

    driver.run_with_context(&adapter, &"attached").unwrap();

    assert_eq!(log.lock().unwrap()[0], "open Some(\"attached\")");
}

#[test]
fn default_handling_frees_binary_payloads() {
    init_tracing();
    let adapter = DriverAdapter::<()>::new(DriverHandlerConfig::new(), DriverDefaults).unwrap();
    let pool = SegmentPool::new(4, 8).unwrap();
    let mut driver = driver(&[BINARY_HELLO, TEXT_A, CLOSE_DONE], DriverOptions::new()).with_pool(pool.clone());

    driver.run(&adapter).unwrap();

    assert_eq!(pool.available(), 2);
}

#[test]
fn handler_replies_are_written_to_the_socket() {
    let config = DriverHandlerConfig::<()>::new().on_message(|event| {
        if let Payload::Text(text) = event.message {
            event.channel.send_text(text.to_uppercase())?;
        }
        Ok(())
    });
    let adapter = DriverAdapter::new(config, DriverDefaults).unwrap();
    let mut driver = driver(&[TEXT_A, CLOSE_DONE], DriverOptions::new());

    driver.run(&adapter).unwrap();

    // Masked text frame header for a one byte payload
    let output = &driver.get_ref().output;
    assert_eq!(&output[..2], &[0x81, 0x81]);
}

#[test]
fn transport_failure_reaches_error_handler() {
    init_tracing();
    let errors: Log = Arc::default();
    let sink = errors.clone();
    let config = DriverHandlerConfig::<()>::new().on_error(move |event| {
        sink.lock().unwrap().push(event.error.to_string());
        Ok(())
    });
    let adapter = DriverAdapter::new(config, DriverDefaults).unwrap();
    // Stream ends without a close handshake
    let mut driver = driver(&[TEXT_A], DriverOptions::new());

    driver.run(&adapter).unwrap();

    let errors = errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("closing handshake"), "unexpected error: {}", errors[0]);
}

#[test]
fn escaping_handler_failure_stops_the_driver() {
    let log: Log = Arc::default();
    let seen = log.clone();
    let config = DriverHandlerConfig::<()>::new().on_message(move |event| {
        seen.lock().unwrap().push(format!("{:?}", event.message));
        Err("rejected".into())
    });
    let adapter = DriverAdapter::new(config, DriverDefaults).unwrap();
    let mut driver = driver(&[TEXT_A, TEXT_B, CLOSE_DONE], DriverOptions::new());

    let result = driver.run(&adapter);

    assert!(matches!(result, Err(S9ChannelError::Handler(_))));
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[test]
fn close_reply_is_written_when_close_handler_is_registered() {
    init_tracing();
    let config = DriverHandlerConfig::<()>::new().on_close(|_| Ok(()));
    let adapter = DriverAdapter::new(config, DriverDefaults).unwrap();
    let mut driver = driver(&[CLOSE_DONE], DriverOptions::new());

    driver.run(&adapter).unwrap();

    // Masked close frame echoing the peer's status
    let output = &driver.get_ref().output;
    assert_eq!(output.first(), Some(&0x88), "no close reply written: {:?}", output);
}

#[test]
fn close_reply_is_written_when_close_handler_fails() {
    let config = DriverHandlerConfig::<()>::new().on_close(|_| Err("close rejected".into()));
    let adapter = DriverAdapter::new(config, DriverDefaults).unwrap();
    let mut driver = driver(&[CLOSE_DONE], DriverOptions::new());

    let result = driver.run(&adapter);

    assert!(matches!(result, Err(S9ChannelError::Handler(_))));
    let output = &driver.get_ref().output;
    assert_eq!(output.first(), Some(&0x88), "no close reply written: {:?}", output);
}
