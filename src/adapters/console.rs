//! Serial console transport for the configuration boundary.
//!
//! A reader thread turns `METHOD PATH [BODY]` lines into [`Request`]s and
//! queues them in the [`Inbox`]; the main loop dispatches them and prints
//! one `STATUS [BODY]` line per request.

use std::io::{BufRead, ErrorKind};
use std::time::Duration;

use embassy_sync::channel::TrySendError;
use log::{info, warn};

use crate::app::boundary::{Inbox, Request, Response};

/// Sleep between reads while a non-blocking reader has nothing to give.
const IDLE_POLL: Duration = Duration::from_millis(5);

/// Queue every parseable line from `reader` until end of input.  Returns
/// how many requests were queued.  Blocks while the inbox is full.
///
/// `WouldBlock` means "no byte yet" on the ESP-IDF UART stdin; the reader
/// waits and keeps any partial line.
pub fn pump_lines<R: BufRead>(mut reader: R, inbox: &Inbox) -> usize {
    let mut queued = 0;
    let mut buf = Vec::new();
    loop {
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) if buf.is_empty() => break,
            Ok(_) => {}
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                std::thread::sleep(IDLE_POLL);
                continue;
            }
            Err(e) => {
                warn!("console: read failed: {}", e);
                break;
            }
        }
        let line = String::from_utf8_lossy(&buf).into_owned();
        buf.clear();
        if line.trim().is_empty() {
            continue;
        }
        match Request::parse_line(&line) {
            Ok(mut req) => {
                // The main loop drains the inbox every iteration.
                while let Err(TrySendError::Full(back)) = inbox.try_send(req) {
                    req = back;
                    std::thread::sleep(IDLE_POLL);
                }
                queued += 1;
            }
            Err(e) => {
                warn!("console: ignoring line: {}", e);
                println!("400 {}", e);
            }
        }
    }
    queued
}

/// Start the console reader on its own thread.
pub fn spawn(inbox: &'static Inbox) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("console".into())
        .stack_size(6 * 1024)
        .spawn(move || {
            let stdin = std::io::stdin();
            let n = pump_lines(stdin.lock(), inbox);
            info!("console: input closed after {} requests", n);
        })?;
    info!("console: listening for requests on stdin");
    Ok(())
}

/// One response line.
pub fn render(resp: &Response) -> String {
    if resp.body.is_empty() {
        resp.status.to_string()
    } else {
        format!("{} {}", resp.status, resp.body)
    }
}
