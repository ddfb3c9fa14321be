/*
 * The I/O module for the beacon.
 *
 * This module is the only part of the program that is device-specific. It
 * provides the LED bank, the timer bank that plays the role of the timer's
 * compare channels and button inputs, and the Embassy tasks that turn
 * deadlines and button edges into beacon events.
 *
 * The beacon itself lives in a single critical-section mutex. Every task
 * takes the lock, lets the timer bank decide whether the event is armed, and
 * runs the handler to completion before releasing the lock again, so
 * handlers never overlap.
 */

use core::cell::RefCell;

use despi_m02_beacon::indicator::{Led, pin_levels};
use despi_m02_beacon::signal::TICKS_PER_SECOND;
use despi_m02_beacon::{Beacon, EventId, EventSource, IndicatorDriver, Source, Ticks};
use embassy_futures::select::{Either, select};
use embassy_stm32::{
    exti::ExtiInput,
    gpio::{Level, Output},
};
use embassy_sync::{
    blocking_mutex::{Mutex, raw::CriticalSectionRawMutex},
    signal::Signal,
};
use embassy_time::{Duration, Instant, Timer};
use enum_ordinalize::Ordinalize;

// Board map. The LEDs on PB6..PB9 are wired active-high.
pub const ACTIVE_LOWS: [bool; Led::VARIANT_COUNT] = [false, false, false, false];
pub const DEBOUNCE: Duration = Duration::from_millis(20);

const MICROS_PER_TICK: u64 = 1_000_000 / TICKS_PER_SECOND as u64;

pub type Board = Beacon<'static, TimerBank, LedBank>;

static BEACON: Mutex<CriticalSectionRawMutex, RefCell<Option<Board>>> =
    Mutex::new(RefCell::new(None));

// Wakes the compare task whenever a compare channel is reprogrammed.
static RESCHEDULE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

pub fn install(beacon: Board) {
    BEACON.lock(|cell| *cell.borrow_mut() = Some(beacon));
}

fn with_beacon<R>(f: impl FnOnce(&mut Board) -> R) -> Option<R> {
    BEACON.lock(|cell| cell.borrow_mut().as_mut().map(f))
}

fn ticks(period: Ticks) -> Duration {
    Duration::from_micros(u64::from(period) * MICROS_PER_TICK)
}

pub struct LedBank {
    outputs: [Output<'static>; Led::VARIANT_COUNT],
}

impl LedBank {
    pub fn new(outputs: [Output<'static>; Led::VARIANT_COUNT]) -> Self {
        LedBank { outputs }
    }
}

impl IndicatorDriver for LedBank {
    fn write(&mut self, pattern: u8) {
        let levels = pin_levels(pattern, &ACTIVE_LOWS);
        for (output, high) in self.outputs.iter_mut().zip(levels) {
            output.set_level(if high { Level::High } else { Level::Low });
        }
    }
}

/*
 * Stand-in for the timer block: an interrupt-enable mask, a flag register
 * and one deadline per compare channel. When the tone channel's deadline
 * passes with toggling enabled, the speaker pin flips, just like an
 * output-compare pin would.
 */
pub struct TimerBank {
    speaker: Output<'static>,
    duration_deadline: Option<Instant>,
    tone_deadline: Option<Instant>,
    enabled: u8,
    flags: u8,
    toggle: bool,
}

impl TimerBank {
    pub fn new(speaker: Output<'static>) -> Self {
        TimerBank {
            speaker,
            duration_deadline: None,
            tone_deadline: None,
            enabled: 0,
            flags: 0,
            toggle: false,
        }
    }

    fn deadline_mut(&mut self, event: EventId) -> Option<&mut Option<Instant>> {
        match event {
            EventId::Duration => Some(&mut self.duration_deadline),
            EventId::Tone => Some(&mut self.tone_deadline),
            EventId::Input(_) => None,
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        match (self.duration_deadline, self.tone_deadline) {
            (Some(duration), Some(tone)) => Some(duration.min(tone)),
            (duration, tone) => duration.or(tone),
        }
    }

    fn is_armed(&self, event: EventId) -> bool {
        self.enabled & event.mask() != 0
    }

    fn raise(&mut self, event: EventId) -> bool {
        if self.is_armed(event) {
            self.flags |= event.mask();
            true
        } else {
            false
        }
    }

    /*
     * Returns whether the channel matched and its event should be
     * dispatched. A channel fires once per programming; the handlers
     * reprogram it when they want another match.
     */
    fn compare_match(&mut self, event: EventId, now: Instant) -> bool {
        let Some(deadline) = self.deadline_mut(event) else {
            return false;
        };
        match *deadline {
            Some(at) if at <= now => *deadline = None,
            _ => return false,
        }

        if event == EventId::Tone && self.toggle {
            self.speaker.toggle();
        }
        self.raise(event)
    }

    // A falling edge on a button. Edges on masked buttons are lost.
    fn capture(&mut self, source: Source) -> bool {
        self.raise(EventId::Input(source))
    }
}

impl EventSource for TimerBank {
    fn arm(&mut self, event: EventId, period: Ticks) {
        self.enabled |= event.mask();
        if let Some(deadline) = self.deadline_mut(event) {
            *deadline = Some(Instant::now() + ticks(period));
            RESCHEDULE.signal(());
        }
    }

    fn disarm(&mut self, event: EventId) {
        self.enabled &= !event.mask();
        if let Some(deadline) = self.deadline_mut(event) {
            *deadline = None;
            RESCHEDULE.signal(());
        }
    }

    fn is_pending(&self, event: EventId) -> bool {
        self.flags & event.mask() != 0
    }

    fn acknowledge(&mut self, event: EventId) {
        self.flags &= !event.mask();
    }

    fn enable_toggle(&mut self) {
        self.toggle = true;
    }

    fn disable_toggle(&mut self) {
        self.toggle = false;
        self.speaker.set_low();
    }
}

// Services both compare channels, duration first.
#[embassy_executor::task]
pub async fn compare_task() -> ! {
    loop {
        RESCHEDULE.reset();
        let next = with_beacon(|beacon| beacon.events().next_deadline()).flatten();

        match next {
            None => RESCHEDULE.wait().await,
            Some(at) => {
                if let Either::First(_) = select(Timer::at(at), RESCHEDULE.wait()).await {
                    let now = Instant::now();
                    with_beacon(|beacon| {
                        for event in [EventId::Duration, EventId::Tone] {
                            beacon.raise(event, |bank| bank.compare_match(event, now));
                        }
                    });
                }
            }
        }
    }
}

/*
 * Buttons bounce. Only the armed button can raise an event, so a bounce on a
 * button that has just been handled is masked anyway, but waiting a little
 * before listening again keeps one press from reaching the handler twice.
 */
#[embassy_executor::task(pool_size = 4)]
pub async fn button_task(source: Source, mut button: ExtiInput<'static>) -> ! {
    loop {
        button.wait_for_falling_edge().await;

        with_beacon(|beacon| {
            beacon.raise(EventId::Input(source), |bank| bank.capture(source));
        });

        Timer::after(DEBOUNCE).await;
    }
}
