/*
 * The signal to transmit: an ordered list of symbols, each a tone half-period,
 * a duration and an LED pattern, closed by a single sentinel symbol.
 *
 * All periods and durations are in timer ticks. The timer runs at the bus
 * clock of 4MHz divided by 64, so one tick is 16us.
 */

use thiserror::Error;

use crate::event_source::Ticks;
use crate::indicator::{LED3, LED4, LEDS_OFF};

pub const TICKS_PER_SECOND: u32 = 62_500;

// Tone half-periods.
pub const DOT: Ticks = 32; // ~500Hz
pub const DASH: Ticks = 64; // ~250Hz
pub const BLANK: Ticks = 1; // silence, must be non-zero
pub const BRK: Ticks = 0; // end of signal

pub const DOT_DURATION: Ticks = 9000;
pub const DASH_DURATION: Ticks = 4 * DOT_DURATION;
pub const BLANK_DURATION: Ticks = DOT_DURATION;
pub const BRK_DURATION: Ticks = DOT_DURATION;

pub const DOT_LEDS: u8 = LED4;
pub const DASH_LEDS: u8 = LED3 | LED4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SymbolKind {
    Tone,
    Blank,
    Sentinel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Symbol {
    pub tone_period: Ticks,
    pub duration: Ticks,
    pub indicator_pattern: u8,
}

impl Symbol {
    pub const fn new(tone_period: Ticks, duration: Ticks, indicator_pattern: u8) -> Self {
        Symbol {
            tone_period,
            duration,
            indicator_pattern,
        }
    }

    pub const fn dot() -> Self {
        Symbol::new(DOT, DOT_DURATION, DOT_LEDS)
    }

    pub const fn dash() -> Self {
        Symbol::new(DASH, DASH_DURATION, DASH_LEDS)
    }

    pub const fn blank() -> Self {
        Symbol::new(BLANK, BLANK_DURATION, LEDS_OFF)
    }

    pub const fn brk() -> Self {
        Symbol::new(BRK, BRK_DURATION, LEDS_OFF)
    }

    pub fn kind(&self) -> SymbolKind {
        match self.tone_period {
            BRK => SymbolKind::Sentinel,
            BLANK => SymbolKind::Blank,
            _ => SymbolKind::Tone,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.kind() == SymbolKind::Sentinel
    }
}

/// `... --- ...`, each element followed by a blank of one dot length.
pub static SOS: [Symbol; 19] = [
    Symbol::dot(),
    Symbol::blank(),
    Symbol::dot(),
    Symbol::blank(),
    Symbol::dot(),
    Symbol::blank(),
    Symbol::dash(),
    Symbol::blank(),
    Symbol::dash(),
    Symbol::blank(),
    Symbol::dash(),
    Symbol::blank(),
    Symbol::dot(),
    Symbol::blank(),
    Symbol::dot(),
    Symbol::blank(),
    Symbol::dot(),
    Symbol::blank(),
    Symbol::brk(),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SignalError {
    #[error("signal has no symbols")]
    Empty,
    #[error("signal does not end with a sentinel")]
    MissingSentinel,
    #[error("sentinel at index {index} is not the last symbol")]
    EarlySentinel { index: usize },
    #[error("symbol at index {index} has zero duration")]
    ZeroDuration { index: usize },
}

/// A checked signal: non-empty, exactly one sentinel and it comes last, and
/// every other symbol lasts at least one tick.
#[derive(Debug, Clone, Copy)]
pub struct SignalDefinition<'a> {
    symbols: &'a [Symbol],
}

impl<'a> SignalDefinition<'a> {
    pub fn new(symbols: &'a [Symbol]) -> Result<Self, SignalError> {
        let (last, body) = symbols.split_last().ok_or(SignalError::Empty)?;
        if !last.is_sentinel() {
            return Err(SignalError::MissingSentinel);
        }
        for (index, symbol) in body.iter().enumerate() {
            if symbol.is_sentinel() {
                return Err(SignalError::EarlySentinel { index });
            }
            if symbol.duration == 0 {
                return Err(SignalError::ZeroDuration { index });
            }
        }
        Ok(SignalDefinition { symbols })
    }

    pub fn get(&self, index: usize) -> Option<&'a Symbol> {
        self.symbols.get(index)
    }

    /// Number of symbols, the sentinel included.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn symbols(&self) -> &'a [Symbol] {
        self.symbols
    }
}
