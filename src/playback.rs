/*
 * Playback of the signal.
 *
 * Two compare channels run side by side while a signal plays. The duration
 * channel fires once per symbol and moves the cursor along; the tone channel
 * fires every half-period of the current tone and keeps the speaker line
 * toggling. Both are always reprogrammed relative to the counter's value at
 * the time the handler runs, so a late handler delays the rest of the signal
 * instead of piling up drift.
 *
 * Once the duration of the sentinel symbol has passed, or as soon as the
 * cursor reaches a sentinel without one, both channels are masked for good
 * and the disarm state machine takes over.
 */

use crate::beacon::Beacon;
use crate::event_source::{EventId, EventSource};
use crate::indicator::{IndicatorDriver, LEDS_OFF};
use crate::signal::{SignalDefinition, SignalError, Symbol, SymbolKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaybackState {
    Idle,
    Playing,
    // `start` was handed a bad signal.
    Stopped,
}

#[derive(Debug, Clone, Copy)]
pub struct PlaybackCursor<'a> {
    signal: Option<SignalDefinition<'a>>,
    index: usize,
    state: PlaybackState,
}

impl<'a> PlaybackCursor<'a> {
    pub const fn new() -> Self {
        PlaybackCursor {
            signal: None,
            index: 0,
            state: PlaybackState::Idle,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The symbol being played, if any.
    pub fn current(&self) -> Option<&'a Symbol> {
        match self.state {
            PlaybackState::Playing => self.signal.and_then(|signal| signal.get(self.index)),
            PlaybackState::Idle | PlaybackState::Stopped => None,
        }
    }

    fn install(&mut self, signal: SignalDefinition<'a>) {
        self.signal = Some(signal);
        self.index = 0;
        self.state = PlaybackState::Playing;
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn reset(&mut self) {
        *self = PlaybackCursor::new();
    }

    fn stop(&mut self) {
        *self = PlaybackCursor {
            state: PlaybackState::Stopped,
            ..PlaybackCursor::new()
        };
    }
}

impl Default for PlaybackCursor<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, E: EventSource, D: IndicatorDriver> Beacon<'a, E, D> {
    /// Install `symbols` and start playing the first one.
    ///
    /// All events are masked and acknowledged first, so this also serves to
    /// re-initialize a beacon that has already run. A signal that fails
    /// validation leaves everything masked, the speaker quiet and the LEDs
    /// off.
    pub fn start(&mut self, symbols: &'a [Symbol]) -> Result<(), SignalError> {
        self.quiesce();
        self.reset_disarm();

        let signal = match SignalDefinition::new(symbols) {
            Ok(signal) => signal,
            Err(e) => {
                error!("not playing signal: {}", e);
                self.cursor.stop();
                self.set_indicators(LEDS_OFF);
                return Err(e);
            }
        };

        info!("playing signal of {} symbols", signal.len());
        self.cursor.install(signal);
        self.load_current_symbol();
        Ok(())
    }

    pub fn on_duration_expiry(&mut self) {
        self.events.acknowledge(EventId::Duration);

        if self.current_symbol(EventId::Duration).is_sentinel() {
            self.finish_playback();
            return;
        }

        self.cursor.advance();
        self.load_current_symbol();
    }

    pub fn on_tone_half_period_expiry(&mut self) {
        self.events.acknowledge(EventId::Tone);

        let symbol = self.current_symbol(EventId::Tone);
        match symbol.kind() {
            SymbolKind::Tone => {
                self.events.enable_toggle();
                self.events.arm(EventId::Tone, symbol.tone_period);
            }
            SymbolKind::Blank | SymbolKind::Sentinel => self.events.disable_toggle(),
        }
    }

    fn current_symbol(&self, event: EventId) -> Symbol {
        match self.cursor.current() {
            Some(symbol) => *symbol,
            None => panic!(
                "{:?} event while playback is {:?}",
                event,
                self.cursor.state()
            ),
        }
    }

    /*
     * Program both channels and the LEDs for the symbol under the cursor.
     *
     * A blank switches the toggle off straight away, so not a single edge
     * reaches the speaker during the rest; its tone event still fires once
     * and confirms the silence. The sentinel does not use the tone channel
     * at all, and one without a duration hands off right here: a compare
     * programmed zero ticks ahead would only match after the counter wraps.
     */
    fn load_current_symbol(&mut self) {
        let symbol = self.current_symbol(EventId::Duration);
        if symbol.is_sentinel() && symbol.duration == 0 {
            self.finish_playback();
            return;
        }

        debug!(
            "symbol {}: tone {} for {} ticks",
            self.cursor.index(),
            symbol.tone_period,
            symbol.duration
        );

        match symbol.kind() {
            SymbolKind::Tone => {
                self.events.arm(EventId::Tone, symbol.tone_period);
                self.events.enable_toggle();
            }
            SymbolKind::Blank => {
                self.events.disable_toggle();
                self.events.arm(EventId::Tone, symbol.tone_period);
            }
            SymbolKind::Sentinel => {
                self.events.disable_toggle();
                self.events.disarm(EventId::Tone);
                self.events.acknowledge(EventId::Tone);
            }
        }
        self.events.arm(EventId::Duration, symbol.duration);
        self.set_indicators(symbol.indicator_pattern);
    }

    /*
     * Both playback events are masked and their flags cleared before the
     * disarm state machine arms anything, so neither can fire into it.
     */
    fn finish_playback(&mut self) {
        self.events.disarm(EventId::Duration);
        self.events.disarm(EventId::Tone);
        self.events.acknowledge(EventId::Duration);
        self.events.acknowledge(EventId::Tone);
        self.events.disable_toggle();
        self.cursor.reset();

        info!("signal sent");
        self.start_disarm();
    }
}
