use std::{
    io::{BufRead, BufReader, Write},
    net::{TcpListener, TcpStream},
};

use hover::server::{handle_command, Command};
use hover::LogObserver;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let listener = TcpListener::bind("127.0.0.1:0")?;
    println!("PORT={}", listener.local_addr()?.port());

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                if let Err(e) = serve_connection(stream) {
                    log::error!("Connection error: {}", e);
                }
            }
            Err(e) => log::error!("Failed to accept connection: {}", e),
        }
    }

    Ok(())
}

/// Serve line-delimited JSON commands until the client closes or sends
/// `Close`. A malformed line gets an error line back; it never takes the
/// process down.
fn serve_connection(stream: TcpStream) -> std::io::Result<()> {
    let peer = stream.peer_addr()?;
    log::info!("Client connected: {}", peer);

    let observer = LogObserver;
    let mut writer = stream.try_clone()?;
    let reader = BufReader::new(stream);

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<Command>(&line) {
            Ok(command) => {
                let response = handle_command(&command, &observer);
                let reply = serde_json::to_string(&response)?;
                if matches!(command, Command::Close) {
                    writer.write_all(reply.as_bytes())?;
                    writer.write_all(b"\n")?;
                    writer.flush()?;
                    break;
                }
                reply
            }
            Err(e) => serde_json::to_string(&serde_json::json!({
                "success": false,
                "error": { "kind": "bad_request", "message": e.to_string() },
            }))?,
        };

        writer.write_all(reply.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }

    log::info!("Client disconnected: {}", peer);
    Ok(())
}
