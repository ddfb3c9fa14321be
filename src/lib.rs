/*
 * Hardware-agnostic core of the beacon.
 *
 * The beacon plays a fixed Morse signal through a toggled speaker line and a
 * bank of four LEDs, then waits for four buttons to be pressed in order to
 * switch the LEDs off again. Everything in this library runs inside event
 * handlers and talks to the hardware only through the `EventSource` and
 * `IndicatorDriver` traits, so it can be driven by the firmware in `main.rs`
 * or by the simulated timer in the tests.
 */

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod beacon;
pub mod disarm;
pub mod event_source;
pub mod indicator;
pub mod playback;
pub mod signal;

#[cfg(test)]
mod sim;

pub use beacon::Beacon;
pub use disarm::{DisarmState, Source};
pub use event_source::{EventId, EventSource, Ticks};
pub use indicator::{IndicatorDriver, IndicatorState};
pub use playback::{PlaybackCursor, PlaybackState};
pub use signal::{SOS, SignalDefinition, SignalError, Symbol, SymbolKind};
