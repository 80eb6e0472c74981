//! Integration tests for request routing, validation and the inbox.

use crate::mock_hw::{LogSink, MockHardware, MockRtc, MockStore, leak_timebase};

use nixieclock::app::boundary::{self, Inbox, Method, Request, Response, WELCOME};
use nixieclock::app::service::ClockService;
use nixieclock::config::{ClockConfig, LedInfo, LedMode, SleepInfo};
use nixieclock::datetime::DateTime;

struct Endpoint {
    service: ClockService,
    rtc: MockRtc,
    hw: MockHardware,
    store: MockStore,
    sink: LogSink,
}

impl Endpoint {
    fn new() -> Self {
        let now = DateTime::new(2024, 3, 5, 13, 7, 9).unwrap();
        Self {
            service: ClockService::new(
                ClockConfig::default(),
                leak_timebase(),
                LedInfo::default(),
                SleepInfo::default(),
            ),
            rtc: MockRtc::at(now),
            hw: MockHardware::new(),
            store: MockStore::new(),
            sink: LogSink::new(),
        }
    }

    fn send(&mut self, line: &str) -> Response {
        let req = Request::parse_line(line).unwrap();
        boundary::handle_request(
            &req,
            &mut self.service,
            &mut self.rtc,
            &mut self.store,
            &mut self.hw,
            &mut self.sink,
        )
    }
}

fn json(resp: &Response) -> serde_json::Value {
    serde_json::from_str(&resp.body).unwrap()
}

// ── Root and routing ──────────────────────────────────────────

#[test]
fn root_returns_welcome() {
    let mut ep = Endpoint::new();
    let resp = ep.send("GET /");
    assert_eq!(resp, Response::ok(WELCOME));
}

#[test]
fn unknown_path_is_404_and_wrong_method_is_405() {
    let mut ep = Endpoint::new();
    assert_eq!(ep.send("GET /nope").status, 404);
    assert_eq!(ep.send("POST /").status, 405);
    assert_eq!(ep.send("DELETE /led").status, 405);
    assert_eq!(ep.send("put /time {}").status, 405);
}

// ── /led ──────────────────────────────────────────────────────

#[test]
fn led_get_reports_defaults() {
    let mut ep = Endpoint::new();
    let resp = ep.send("GET /led");
    assert_eq!(resp.status, 200);
    assert_eq!(json(&resp), serde_json::json!({"R":0,"G":0,"B":0,"A":0,"state":0}));
}

#[test]
fn led_post_applies_persists_and_reads_back() {
    let mut ep = Endpoint::new();
    let resp = ep.send(r#"POST /led {"R": 10, "G": 20, "B": 30, "A": 128, "state": 1}"#);
    assert_eq!(resp.status, 200);

    let expected = LedInfo::new(10, 20, 30, 128, LedMode::On);
    assert_eq!(ep.service.led_configuration(), expected);
    assert_eq!(ep.store.led, Some(expected));
    assert_eq!(ep.hw.last_led().map(|c| c.a), Some(128));

    let resp = ep.send("GET /led");
    assert_eq!(json(&resp), serde_json::json!({"R":10,"G":20,"B":30,"A":128,"state":1}));
}

#[test]
fn led_post_rejects_bad_input_without_change() {
    let mut ep = Endpoint::new();
    assert_eq!(ep.send("POST /led {not json").status, 400);
    assert_eq!(ep.send(r#"POST /led {"R":"red"}"#).status, 400);
    assert_eq!(ep.send(r#"POST /led {"R":256,"G":0,"B":0,"A":0,"state":0}"#).status, 409);
    assert_eq!(ep.send(r#"POST /led {"R":-1,"G":0,"B":0,"A":0,"state":0}"#).status, 409);
    assert_eq!(ep.send(r#"POST /led {"R":0,"G":0,"B":0,"A":0,"state":3}"#).status, 409);

    assert_eq!(ep.service.led_configuration(), LedInfo::default());
    assert_eq!(ep.store.led, None);
    assert!(ep.hw.leds.is_empty());
}

#[test]
fn led_post_with_failed_save_still_succeeds() {
    let mut ep = Endpoint::new();
    ep.store.fail_saves = true;
    let resp = ep.send(r#"POST /led {"R":1,"G":1,"B":1,"A":1,"state":2}"#);
    assert_eq!(resp.status, 200);
    assert_eq!(ep.service.led_configuration().mode, LedMode::Breathe);
}

// ── /time ─────────────────────────────────────────────────────

#[test]
fn time_get_formats_rtc_reading() {
    let mut ep = Endpoint::new();
    let resp = ep.send("GET /time");
    assert_eq!(resp.status, 200);
    assert_eq!(json(&resp), serde_json::json!({"time": "2024/3/5 13:07:09"}));
}

#[test]
fn time_get_reports_rtc_failure() {
    let mut ep = Endpoint::new();
    ep.rtc.fail_reads = true;
    assert_eq!(ep.send("GET /time").status, 500);
}

#[test]
fn time_post_sets_rtc() {
    let mut ep = Endpoint::new();
    let resp = ep.send(r#"POST /time {"time": "2025/12/31 23:59:30"}"#);
    assert_eq!(resp.status, 200);

    let target = DateTime::new(2025, 12, 31, 23, 59, 30).unwrap();
    assert_eq!(ep.rtc.set_calls, [target]);
    assert_eq!(ep.service.timebase().seconds().peek(), 30);
}

#[test]
fn time_post_rejections() {
    let mut ep = Endpoint::new();
    assert_eq!(ep.send("POST /time nonsense").status, 400);
    assert_eq!(ep.send("POST /time {}").status, 409);
    assert_eq!(ep.send(r#"POST /time {"time": 12}"#).status, 409);
    assert_eq!(ep.send(r#"POST /time {"time": "yesterday"}"#).status, 409);
    assert_eq!(ep.send(r#"POST /time {"time": "1999/12/31 23:59:59"}"#).status, 409);
    assert_eq!(ep.send(r#"POST /time {"time": "2024/2/30 00:00:00"}"#).status, 409);
    assert!(ep.rtc.set_calls.is_empty());
}

#[test]
fn time_post_reports_rtc_write_failure() {
    let mut ep = Endpoint::new();
    ep.rtc.fail_sets = true;
    let resp = ep.send(r#"POST /time {"time": "2025/1/1 00:00:00"}"#);
    assert_eq!(resp.status, 500);
}

// ── /sleep ────────────────────────────────────────────────────

#[test]
fn sleep_round_trip() {
    let mut ep = Endpoint::new();
    let resp = ep.send(r#"POST /sleep {"sleep_before": 7, "sleep_after": 23}"#);
    assert_eq!(resp.status, 200);
    assert_eq!(ep.store.sleep, Some(SleepInfo::new(7, 23)));

    let resp = ep.send("GET /sleep");
    assert_eq!(json(&resp), serde_json::json!({"sleep_before": 7, "sleep_after": 23}));
}

#[test]
fn sleep_post_refuses_out_of_range_hours() {
    let mut ep = Endpoint::new();
    assert_eq!(ep.send(r#"POST /sleep {"sleep_before": 24, "sleep_after": 1}"#).status, 409);
    assert_eq!(ep.send(r#"POST /sleep {"sleep_before": 1, "sleep_after": -3}"#).status, 409);
    assert_eq!(ep.send("POST /sleep [").status, 400);
    assert_eq!(ep.service.sleep_schedule(), SleepInfo::default());
}

// ── Inbox ─────────────────────────────────────────────────────

#[test]
fn inbox_is_bounded_and_fifo() {
    let inbox = Inbox::new();
    for path in ["/", "/led", "/time", "/sleep"] {
        let req = Request::new(Method::Get, path, "").unwrap();
        assert!(inbox.try_send(req).is_ok());
    }
    let extra = Request::new(Method::Get, "/", "").unwrap();
    assert!(inbox.try_send(extra).is_err());

    let order: Vec<String> = std::iter::from_fn(|| inbox.try_receive().ok())
        .map(|r| r.path.as_str().to_owned())
        .collect();
    assert_eq!(order, ["/", "/led", "/time", "/sleep"]);
}

#[test]
fn queued_requests_dispatch_in_order() {
    let mut ep = Endpoint::new();
    let inbox = Inbox::new();
    for line in [
        r#"POST /led {"R":1,"G":2,"B":3,"A":4,"state":1}"#,
        r#"POST /led {"R":5,"G":6,"B":7,"A":8,"state":0}"#,
    ] {
        assert!(inbox.try_send(Request::parse_line(line).unwrap()).is_ok());
    }

    while let Ok(req) = inbox.try_receive() {
        let resp = boundary::handle_request(
            &req,
            &mut ep.service,
            &mut ep.rtc,
            &mut ep.store,
            &mut ep.hw,
            &mut ep.sink,
        );
        assert!(resp.is_success());
    }
    assert_eq!(ep.service.led_configuration(), LedInfo::new(5, 6, 7, 8, LedMode::Off));
}
