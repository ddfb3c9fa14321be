/*
 * The only concurrency primitive of the beacon: hardware events that can be
 * armed (allowed to fire) and disarmed.
 *
 * Two kinds exist. The duration and tone events are output-compare matches
 * of a free-running 16-bit counter; arming one programs the compare register
 * `period` ticks ahead of the counter's current value. The four input events
 * are falling-edge captures on the buttons; for those the period is ignored.
 *
 * The core never touches registers directly. It calls the operations below
 * and the firmware or the simulated timer decides what they mean.
 */

use crate::disarm::Source;

/// Timer ticks, 16us each. Compare channels wrap with the 16-bit counter.
pub type Ticks = u16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventId {
    Duration,
    Tone,
    Input(Source),
}

impl EventId {
    /// Dispatch order when several events are pending. Duration comes before
    /// tone because it may end playback.
    pub const PRIORITY: [EventId; 6] = [
        EventId::Duration,
        EventId::Tone,
        EventId::Input(Source::Sw1),
        EventId::Input(Source::Sw2),
        EventId::Input(Source::Sw3),
        EventId::Input(Source::Sw4),
    ];

    /// Bit of this event in the interrupt-enable and flag registers. Duration
    /// sits on channel 0, the speaker on channel 3 and the buttons on
    /// channels 4 to 7.
    pub const fn mask(self) -> u8 {
        match self {
            EventId::Duration => 0b0000_0001,
            EventId::Tone => 0b0000_1000,
            EventId::Input(source) => 0b0001_0000 << (source as u8),
        }
    }

    pub const fn is_compare(self) -> bool {
        matches!(self, EventId::Duration | EventId::Tone)
    }
}

pub trait EventSource {
    /// Allow `event` to fire. For compare events the match is programmed
    /// `period` ticks after the current counter value.
    fn arm(&mut self, event: EventId, period: Ticks);

    fn disarm(&mut self, event: EventId);

    fn is_pending(&self, event: EventId) -> bool;

    /// Clear the pending flag of `event`.
    fn acknowledge(&mut self, event: EventId);

    /// Let the tone channel toggle the speaker line on every match.
    fn enable_toggle(&mut self);

    fn disable_toggle(&mut self);
}
