//! Application core: clock logic behind port traits.
//!
//! The clock face sequencer, the configuration boundary and the
//! [`service::ClockService`] orchestrating them.  All interaction with
//! hardware happens through the traits in [`ports`].

pub mod boundary;
pub mod clock_face;
pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
