/*
 * The beacon's whole mutable state in one place.
 *
 * There is exactly one playback and one disarm session per power-up. Rather
 * than keeping the cursor, the LED byte and the disarm progress in globals,
 * they live in this struct together with the event source and the LED driver,
 * and every event handler is a `&mut self` method on it. The firmware keeps
 * the one instance behind a critical-section mutex; the tests own it
 * directly.
 *
 * Handlers never run concurrently: each one masks its own event before it
 * unmasks the next, so at most one handler is ever eligible to run. The
 * handlers themselves are implemented in `playback.rs` and `disarm.rs`.
 */

use crate::disarm::DisarmState;
use crate::event_source::{EventId, EventSource};
use crate::indicator::{IndicatorDriver, IndicatorState};
use crate::playback::PlaybackCursor;

pub struct Beacon<'a, E, D> {
    pub(crate) events: E,
    pub(crate) driver: D,
    pub(crate) cursor: PlaybackCursor<'a>,
    pub(crate) indicators: IndicatorState,
    pub(crate) disarm: DisarmState,
}

impl<'a, E: EventSource, D: IndicatorDriver> Beacon<'a, E, D> {
    /// Nothing is armed until `start` is called.
    pub fn new(events: E, driver: D) -> Self {
        Beacon {
            events,
            driver,
            cursor: PlaybackCursor::new(),
            indicators: IndicatorState::new(),
            disarm: DisarmState::Inactive,
        }
    }

    /// Route a hardware event to its handler. Call it only for events that
    /// are armed and pending; anything else means the masking went wrong and
    /// the handlers will panic.
    pub fn dispatch(&mut self, event: EventId) {
        trace!("dispatch {}", event);
        match event {
            EventId::Duration => self.on_duration_expiry(),
            EventId::Tone => self.on_tone_half_period_expiry(),
            EventId::Input(source) => self.on_input_event(source),
        }
    }

    /// Let the hardware latch `event` and run its handler if it did.
    /// `latch` returns whether the event is now pending, which it must not
    /// be for a masked event.
    pub fn raise(&mut self, event: EventId, latch: impl FnOnce(&mut E) -> bool) {
        if latch(&mut self.events) {
            self.dispatch(event);
        }
    }

    pub fn cursor(&self) -> &PlaybackCursor<'a> {
        &self.cursor
    }

    pub fn indicators(&self) -> IndicatorState {
        self.indicators
    }

    pub fn disarm_state(&self) -> DisarmState {
        self.disarm
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    /// Raw access for the test harness that drives the hardware model.
    /// Arming or disarming through it bypasses the handlers' masking order;
    /// dispatchers go through `raise`.
    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub(crate) fn set_indicators(&mut self, pattern: u8) {
        self.indicators.set(&mut self.driver, pattern);
    }

    /// Mask and acknowledge every event and silence the speaker.
    pub(crate) fn quiesce(&mut self) {
        for event in EventId::PRIORITY {
            self.events.disarm(event);
            self.events.acknowledge(event);
        }
        self.events.disable_toggle();
    }
}
