//! Configuration boundary: request routing and validation.
//!
//! Requests are `{method, path, body}` triples, whatever transport carried
//! them.  They queue in a bounded [`Inbox`] and the main loop dispatches
//! them one at a time with [`handle_request`], so the core never sees
//! concurrent access.  Validation happens here; only in-range values are
//! turned into [`ClockCommand`]s.
//!
//! | Route         | Result                                                      |
//! |---------------|-------------------------------------------------------------|
//! | `GET /`       | 200 welcome text                                            |
//! | `GET /led`    | 200 `LedInfo` JSON                                          |
//! | `POST /led`   | 400 bad JSON · 409 channel outside 0–255 or state > 2 · 200 |
//! | `GET /time`   | 200 `{"time":…}` · 500 RTC failure                          |
//! | `POST /time`  | 400 bad JSON · 409 missing/unparseable/out-of-range · 200   |
//! | `GET /sleep`  | 200 `SleepInfo` JSON                                        |
//! | `POST /sleep` | 400 bad JSON · 409 hour ≥ 24 · 200                          |

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{info, warn};
use serde::Deserialize;

use crate::config::{LedInfo, LedMode, SleepInfo};
use crate::datetime::DateTime;
use crate::error::Error;

use super::commands::ClockCommand;
use super::ports::{ConfigStorePort, EventSink, LedPort, RtcPort};
use super::service::ClockService;

pub const MAX_PATH: usize = 32;
pub const MAX_BODY: usize = 256;
pub const INBOX_DEPTH: usize = 4;

pub const WELCOME: &str = "Welcome to the nixie clock configuration endpoint";

/// Requests waiting for the main loop.  Safe to fill from any thread.
pub type Inbox = Channel<CriticalSectionRawMutex, Request, INBOX_DEPTH>;

// ───────────────────────────────────────────────────────────────
// Requests and responses
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other,
}

impl Method {
    fn parse(token: &str) -> Self {
        if token.eq_ignore_ascii_case("GET") {
            Self::Get
        } else if token.eq_ignore_ascii_case("POST") {
            Self::Post
        } else {
            Self::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub path: heapless::String<MAX_PATH>,
    pub body: heapless::String<MAX_BODY>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    Empty,
    MissingPath,
    PathTooLong,
    BodyTooLong,
}

impl core::fmt::Display for RequestError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty request"),
            Self::MissingPath => write!(f, "missing path"),
            Self::PathTooLong => write!(f, "path longer than {} bytes", MAX_PATH),
            Self::BodyTooLong => write!(f, "body longer than {} bytes", MAX_BODY),
        }
    }
}

impl Request {
    pub fn new(method: Method, path: &str, body: &str) -> Result<Self, RequestError> {
        let mut req = Self {
            method,
            path: heapless::String::new(),
            body: heapless::String::new(),
        };
        req.path.push_str(path).map_err(|()| RequestError::PathTooLong)?;
        req.body.push_str(body).map_err(|()| RequestError::BodyTooLong)?;
        Ok(req)
    }

    /// Parse a console line: `METHOD PATH [BODY]`.  The body is the rest of
    /// the line and may contain spaces.
    pub fn parse_line(line: &str) -> Result<Self, RequestError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(RequestError::Empty);
        }
        let (method, rest) = split_token(line);
        let (path, body) = split_token(rest);
        if path.is_empty() {
            return Err(RequestError::MissingPath);
        }
        Self::new(Method::parse(method), path, body)
    }
}

fn split_token(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim_start()),
        None => (s, ""),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ───────────────────────────────────────────────────────────────
// Request bodies
// ───────────────────────────────────────────────────────────────

/// Wide integers so out-of-range values are seen and refused, not wrapped.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LedBody {
    #[serde(rename = "R")]
    r: i64,
    #[serde(rename = "G")]
    g: i64,
    #[serde(rename = "B")]
    b: i64,
    #[serde(rename = "A")]
    a: i64,
    state: i64,
}

impl LedBody {
    fn validate(&self) -> Option<LedInfo> {
        let channel = |v: i64| u8::try_from(v).ok();
        let mode = u8::try_from(self.state).ok().and_then(LedMode::from_code)?;
        Some(LedInfo::new(
            channel(self.r)?,
            channel(self.g)?,
            channel(self.b)?,
            channel(self.a)?,
            mode,
        ))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SleepBody {
    sleep_before: i64,
    sleep_after: i64,
}

impl SleepBody {
    fn validate(&self) -> Option<SleepInfo> {
        let hour = |v: i64| u8::try_from(v).ok().filter(|h| *h < 24);
        Some(SleepInfo::new(hour(self.sleep_before)?, hour(self.sleep_after)?))
    }
}

#[derive(Debug, Deserialize)]
struct TimeBody {
    #[serde(default)]
    time: Option<serde_json::Value>,
}

#[derive(serde::Serialize)]
struct TimeReply {
    time: String,
}

// ───────────────────────────────────────────────────────────────
// Dispatch
// ───────────────────────────────────────────────────────────────

/// Route one request and apply it to `service`.
pub fn handle_request(
    req: &Request,
    service: &mut ClockService,
    rtc: &mut impl RtcPort,
    store: &mut impl ConfigStorePort,
    hw: &mut impl LedPort,
    sink: &mut impl EventSink,
) -> Response {
    let resp = match (req.path.as_str(), req.method) {
        ("/", Method::Get) => Response::ok(WELCOME),
        ("/led", Method::Get) => json_reply(&service.led_configuration()),
        ("/led", Method::Post) => match serde_json::from_str::<LedBody>(&req.body) {
            Err(_) => Response::status(400),
            Ok(body) => match body.validate() {
                None => Response::status(409),
                Some(info) => {
                    let cmd = ClockCommand::ApplyLedConfiguration(info);
                    apply(cmd, service, rtc, store, hw, sink)
                }
            },
        },
        ("/time", Method::Get) => match rtc.read_now() {
            Ok(now) => json_reply(&TimeReply { time: now.to_string() }),
            Err(e) => {
                warn!("GET /time: RTC read failed: {}", e);
                Response::status(500)
            }
        },
        ("/time", Method::Post) => match serde_json::from_str::<TimeBody>(&req.body) {
            Err(_) => Response::status(400),
            Ok(body) => match body.time.as_ref().and_then(|v| v.as_str()).map(DateTime::parse) {
                Some(Ok(now)) => {
                    let cmd = ClockCommand::ApplyTimeOverride(now);
                    apply(cmd, service, rtc, store, hw, sink)
                }
                Some(Err(e)) => {
                    info!("POST /time rejected: {}", e);
                    Response::status(409)
                }
                None => Response::status(409),
            },
        },
        ("/sleep", Method::Get) => json_reply(&service.sleep_schedule()),
        ("/sleep", Method::Post) => match serde_json::from_str::<SleepBody>(&req.body) {
            Err(_) => Response::status(400),
            Ok(body) => match body.validate() {
                None => Response::status(409),
                Some(s) => {
                    let cmd = ClockCommand::ApplySleepSchedule(s);
                    apply(cmd, service, rtc, store, hw, sink)
                }
            },
        },
        ("/" | "/led" | "/time" | "/sleep", _) => Response::status(405),
        _ => Response::status(404),
    };

    if resp.is_success() {
        info!("{:?} {} -> {}", req.method, req.path, resp.status);
    } else {
        warn!("{:?} {} -> {}", req.method, req.path, resp.status);
    }
    resp
}

fn apply(
    cmd: ClockCommand,
    service: &mut ClockService,
    rtc: &mut impl RtcPort,
    store: &mut impl ConfigStorePort,
    hw: &mut impl LedPort,
    sink: &mut impl EventSink,
) -> Response {
    match service.handle_command(cmd, rtc, store, hw, sink) {
        Ok(()) => Response::status(200),
        // Validation already passed; anything left is hardware.
        Err(Error::Rtc(_) | Error::Display(_)) => Response::status(500),
        Err(Error::Config(_)) => Response::status(409),
    }
}

fn json_reply<T: serde::Serialize>(value: &T) -> Response {
    match serde_json::to_string(value) {
        Ok(body) => Response::ok(body),
        Err(_) => Response::status(500),
    }
}
