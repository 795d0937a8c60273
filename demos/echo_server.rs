//! Echo server example driving the channel listener from a blocking tungstenite transport.
//!
//! Every connection runs on its own thread and shares one adapter and one segment pool.
//! Text messages are echoed back, binary messages are answered with their length.
//! Close and error events are left to the driver's default handling.
//!
//! Try it with any WebSocket client, e.g. `websocat ws://127.0.0.1:9001`.

use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use s9_channel_listener::{
    DriverAdapter, DriverDefaults, DriverHandlerConfig, DriverOptions, Payload, S9WebSocketDriver,
    SegmentPool,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = DriverHandlerConfig::<&'static str>::new()
        .on_open(|event| {
            println!("[{}] channel {} opened from {:?}", event.context.unwrap_or(&"?"), event.channel.id(), event.channel.peer_addr());
            Ok(())
        })
        .on_message(|event| {
            match event.message {
                Payload::Text(text) => event.channel.send_text(format!("Echoed: {}", text))?,
                Payload::Binary(data) => event.channel.send_text(format!("Received {} bytes", data.len()))?,
            }
            Ok(())
        })
        .context("echo-server");
    let adapter = Arc::new(DriverAdapter::new(config, DriverDefaults)?);

    let options = DriverOptions::new().segment_size(1024)?.pool_capacity(256)?.nodelay(true);
    let pool = SegmentPool::new(1024, 256)?;

    let server = TcpListener::bind("127.0.0.1:9001")?;
    println!("Listening on ws://127.0.0.1:9001");

    for stream in server.incoming() {
        let stream = stream?;
        let adapter = adapter.clone();
        let options = options.clone();
        let pool = pool.clone();

        thread::spawn(move || {
            let mut driver = match S9WebSocketDriver::accept(stream, options) {
                Ok(driver) => driver.with_pool(pool),
                Err(e) => {
                    eprintln!("Handshake failed: {}", e);
                    return;
                }
            };
            if let Err(e) = driver.run(adapter.as_ref()) {
                eprintln!("Channel {} failed: {}", driver.channel().id(), e);
            }
        });
    }

    Ok(())
}
