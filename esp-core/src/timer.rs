//! Timer State Machine
//!
//! Idle → Running → Paused → Running → Idle. Die Restzeit wird als Farbverlauf
//! von Grün (volle Zeit) nach Rot (abgelaufen) auf dem Strip dargestellt.

use rgb::RGB8;

use crate::traits::{LedError, RenderSurface};
use crate::types::{COLOR_OFF, SESSION_START_COLOR, SESSION_STOP_COLOR, TimerState};

/// Belegung des Strips durch eine Timer-Operation
///
/// Ersetzt Busy-Waits: der Aufrufer entscheidet, wie er die Zeit überbrückt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pacing {
    /// Abspieldauer aller angestoßenen Animationen in ms
    pub busy_ms: u32,
    /// Anzahl fehlgeschlagener Render-Aufrufe
    pub render_failures: u8,
}

impl Pacing {
    /// Verbucht das Ergebnis eines Render-Aufrufs, `true` bei Erfolg
    pub fn track(&mut self, result: Result<u32, LedError>) -> bool {
        match result {
            Ok(ms) => {
                self.busy_ms = self.busy_ms.saturating_add(ms);
                true
            }
            Err(_) => {
                self.render_failures = self.render_failures.saturating_add(1);
                false
            }
        }
    }

    pub fn merge(&mut self, other: Pacing) {
        self.busy_ms = self.busy_ms.saturating_add(other.busy_ms);
        self.render_failures = self.render_failures.saturating_add(other.render_failures);
    }
}

/// Ergebnis eines `tick()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// Timer läuft nicht (Idle oder Paused)
    Inactive,
    /// Timer läuft, Restzeit in ms
    Running { left_ms: u64 },
    /// Restzeit ist 0, Session muss beendet werden
    Expired,
}

/// Berechnet die Feedback-Farbe aus der Restzeit
///
/// `ratio = clamp(left / max, 0, 1)`, Rot = 255 × (1 − ratio), Grün = 255 × ratio.
/// Bei `max_duration_ms == 0` ist die Ratio 0 (Rot).
///
/// ```
/// # use esp_core::calc_color;
/// # use rgb::RGB8;
/// assert_eq!(calc_color(60_000, 60_000), RGB8 { r: 0, g: 255, b: 0 });
/// assert_eq!(calc_color(0, 60_000), RGB8 { r: 255, g: 0, b: 0 });
/// ```
pub fn calc_color(left_ms: u64, max_duration_ms: u32) -> RGB8 {
    let max = max_duration_ms as u64;
    if max == 0 {
        return RGB8 { r: 255, g: 0, b: 0 };
    }
    let left = left_ms.min(max);
    RGB8 {
        r: (255 * (max - left) / max) as u8,
        g: (255 * left / max) as u8,
        b: 0,
    }
}

/// Countdown-Timer mit einer globalen Session
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    state: TimerState,
    max_duration_ms: u32,
    end_time_ms: u64,
    remaining_ms: u64,
    last_color: RGB8,
}

impl Timer {
    pub const fn new(max_duration_ms: u32) -> Self {
        Self {
            state: TimerState::Idle,
            max_duration_ms,
            end_time_ms: 0,
            remaining_ms: 0,
            last_color: COLOR_OFF,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Absolute Deadline, nur gültig in `Running`
    pub fn end_time_ms(&self) -> u64 {
        self.end_time_ms
    }

    /// Restzeit-Snapshot, nur gültig in `Paused`
    pub fn paused_remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    /// Zuletzt auf den Strip geschriebene Farbe
    pub fn last_color(&self) -> RGB8 {
        self.last_color
    }

    /// Startet eine Session mit voller Dauer (nur aus `Idle`)
    pub fn start<R: RenderSurface>(&mut self, now_ms: u64, surface: &mut R) -> Pacing {
        let mut pacing = Pacing::default();
        if self.state != TimerState::Idle {
            return pacing;
        }

        self.state = TimerState::Running;
        self.end_time_ms = now_ms + self.max_duration_ms as u64;
        self.remaining_ms = 0;

        pacing.track(surface.show_wave(SESSION_START_COLOR));
        let color = calc_color(self.max_duration_ms as u64, self.max_duration_ms);
        if pacing.track(surface.show_solid(color)) {
            self.last_color = color;
        }
        pacing
    }

    /// Pausiert einen laufenden Timer, sonst No-op
    pub fn pause<R: RenderSurface>(&mut self, color: RGB8, now_ms: u64, surface: &mut R) -> Pacing {
        let mut pacing = Pacing::default();
        if self.state != TimerState::Running {
            return pacing;
        }

        self.remaining_ms = self.end_time_ms.saturating_sub(now_ms);
        self.state = TimerState::Paused;
        pacing.track(surface.show_identifier_pattern(self.last_color, color));
        pacing
    }

    /// Setzt einen pausierten Timer fort, sonst No-op
    pub fn resume<R: RenderSurface>(
        &mut self,
        color: RGB8,
        now_ms: u64,
        surface: &mut R,
    ) -> Pacing {
        let mut pacing = Pacing::default();
        if self.state != TimerState::Paused {
            return pacing;
        }

        self.end_time_ms = now_ms + self.remaining_ms;
        self.state = TimerState::Running;
        pacing.track(surface.show_identifier_pattern(self.last_color, color));
        pacing
    }

    /// Verlängert die Restzeit (Running oder Paused), in `Idle` No-op
    pub fn add<R: RenderSurface>(&mut self, extra_ms: u32, color: RGB8, surface: &mut R) -> Pacing {
        let mut pacing = Pacing::default();
        match self.state {
            TimerState::Idle => return pacing,
            TimerState::Running => {
                self.end_time_ms = self.end_time_ms.saturating_add(extra_ms as u64);
            }
            TimerState::Paused => {
                self.remaining_ms = self.remaining_ms.saturating_add(extra_ms as u64);
            }
        }
        pacing.track(surface.show_identifier_pattern(self.last_color, color));
        pacing
    }

    /// Stoppt den Timer aus jedem Zustand
    ///
    /// Setzt alle Felder zurück und spielt die "Gestoppt"-Animation,
    /// danach wird der Strip gelöscht.
    pub fn stop<R: RenderSurface>(&mut self, surface: &mut R) -> Pacing {
        let mut pacing = Pacing::default();
        self.state = TimerState::Idle;
        self.end_time_ms = 0;
        self.remaining_ms = 0;

        pacing.track(surface.show_bi_directional_wave(SESSION_STOP_COLOR));
        self.last_color = COLOR_OFF;
        pacing.track(surface.clear());
        pacing
    }

    /// Periodisches Update - in jeder Loop-Iteration aufrufen
    ///
    /// Schreibt nur dann eine neue Farbe, wenn sie sich von der letzten
    /// unterscheidet.
    pub fn tick<R: RenderSurface>(&mut self, now_ms: u64, surface: &mut R) -> (TickOutcome, Pacing) {
        let mut pacing = Pacing::default();
        if self.state != TimerState::Running {
            return (TickOutcome::Inactive, pacing);
        }

        let left_ms = self.end_time_ms.saturating_sub(now_ms);
        let color = calc_color(left_ms, self.max_duration_ms);
        if color != self.last_color && pacing.track(surface.show_solid(color)) {
            self.last_color = color;
        }

        if left_ms == 0 {
            (TickOutcome::Expired, pacing)
        } else {
            (TickOutcome::Running { left_ms }, pacing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Solid(RGB8),
        Wave(RGB8),
        BiWave(RGB8),
        Identifier(RGB8, RGB8),
        Clear,
    }

    #[derive(Default)]
    struct RecordingSurface {
        calls: Vec<Call, 16>,
        fail_solid: bool,
    }

    impl RecordingSurface {
        fn record(&mut self, call: Call) -> Result<u32, LedError> {
            self.calls.push(call).map_err(|_| LedError::QueueFull)?;
            Ok(100)
        }
    }

    impl RenderSurface for RecordingSurface {
        fn show_solid(&mut self, color: RGB8) -> Result<u32, LedError> {
            if self.fail_solid {
                return Err(LedError::WriteFailed);
            }
            self.record(Call::Solid(color)).map(|_| 0)
        }

        fn show_wave(&mut self, color: RGB8) -> Result<u32, LedError> {
            self.record(Call::Wave(color))
        }

        fn show_bi_directional_wave(&mut self, color: RGB8) -> Result<u32, LedError> {
            self.record(Call::BiWave(color))
        }

        fn show_identifier_pattern(
            &mut self,
            base: RGB8,
            identifier: RGB8,
        ) -> Result<u32, LedError> {
            self.record(Call::Identifier(base, identifier))
        }

        fn clear(&mut self) -> Result<u32, LedError> {
            self.record(Call::Clear).map(|_| 0)
        }
    }

    const MAX: u32 = 60_000;
    const BLUE: RGB8 = RGB8 { r: 0, g: 0, b: 255 };

    #[test]
    fn test_calc_color_bounds() {
        assert_eq!(calc_color(MAX as u64, MAX), RGB8 { r: 0, g: 255, b: 0 });
        assert_eq!(calc_color(0, MAX), RGB8 { r: 255, g: 0, b: 0 });
        assert_eq!(calc_color(MAX as u64 * 3, MAX), calc_color(MAX as u64, MAX));
        assert_eq!(calc_color(100, 0), RGB8 { r: 255, g: 0, b: 0 });
    }

    #[test]
    fn test_calc_color_half() {
        let color = calc_color(30_000, MAX);
        assert_eq!(color.g, 127);
        assert_eq!(color.r, 127);
        assert_eq!(color.b, 0);
    }

    #[test]
    fn test_start_renders_wave_then_full_color() {
        let mut timer = Timer::new(MAX);
        let mut surface = RecordingSurface::default();

        let pacing = timer.start(1_000, &mut surface);

        assert_eq!(timer.state(), TimerState::Running);
        assert_eq!(timer.end_time_ms(), 61_000);
        assert_eq!(pacing.busy_ms, 100);
        assert_eq!(
            surface.calls.as_slice(),
            &[
                Call::Wave(SESSION_START_COLOR),
                Call::Solid(RGB8 { r: 0, g: 255, b: 0 })
            ]
        );
        assert_eq!(timer.last_color(), RGB8 { r: 0, g: 255, b: 0 });
    }

    #[test]
    fn test_start_while_running_is_noop() {
        let mut timer = Timer::new(MAX);
        let mut surface = RecordingSurface::default();
        timer.start(0, &mut surface);
        surface.calls.clear();

        timer.start(5_000, &mut surface);
        assert_eq!(timer.end_time_ms(), 60_000);
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn test_pause_twice_is_idempotent() {
        let mut timer = Timer::new(MAX);
        let mut surface = RecordingSurface::default();
        timer.start(0, &mut surface);

        timer.pause(BLUE, 20_000, &mut surface);
        assert_eq!(timer.state(), TimerState::Paused);
        assert_eq!(timer.paused_remaining_ms(), 40_000);
        let calls = surface.calls.len();

        let pacing = timer.pause(BLUE, 30_000, &mut surface);
        assert_eq!(timer.paused_remaining_ms(), 40_000);
        assert_eq!(surface.calls.len(), calls);
        assert_eq!(pacing, Pacing::default());
    }

    #[test]
    fn test_resume_only_from_paused() {
        let mut timer = Timer::new(MAX);
        let mut surface = RecordingSurface::default();

        timer.resume(BLUE, 0, &mut surface);
        assert_eq!(timer.state(), TimerState::Idle);
        assert!(surface.calls.is_empty());

        timer.start(0, &mut surface);
        timer.pause(BLUE, 10_000, &mut surface);
        timer.resume(BLUE, 100_000, &mut surface);
        assert_eq!(timer.state(), TimerState::Running);
        assert_eq!(timer.end_time_ms(), 150_000);
        assert_eq!(
            surface.calls.last(),
            Some(&Call::Identifier(RGB8 { r: 0, g: 255, b: 0 }, BLUE))
        );
    }

    #[test]
    fn test_add_running_and_paused() {
        let mut timer = Timer::new(MAX);
        let mut surface = RecordingSurface::default();
        timer.start(0, &mut surface);

        timer.add(5_000, BLUE, &mut surface);
        assert_eq!(timer.end_time_ms(), 65_000);

        timer.pause(BLUE, 5_000, &mut surface);
        timer.add(1_000, BLUE, &mut surface);
        assert_eq!(timer.paused_remaining_ms(), 61_000);
    }

    #[test]
    fn test_add_while_idle_is_noop() {
        let mut timer = Timer::new(MAX);
        let mut surface = RecordingSurface::default();

        let pacing = timer.add(5_000, BLUE, &mut surface);
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.end_time_ms(), 0);
        assert_eq!(timer.paused_remaining_ms(), 0);
        assert_eq!(timer.last_color(), COLOR_OFF);
        assert!(surface.calls.is_empty());
        assert_eq!(pacing, Pacing::default());
    }

    #[test]
    fn test_tick_suppresses_redundant_redraws() {
        let mut timer = Timer::new(MAX);
        let mut surface = RecordingSurface::default();
        timer.start(0, &mut surface);
        surface.calls.clear();

        // Gleiche Farbe wie beim Start → kein Redraw
        let (outcome, _) = timer.tick(0, &mut surface);
        assert_eq!(outcome, TickOutcome::Running { left_ms: 60_000 });
        assert!(surface.calls.is_empty());

        timer.tick(30_000, &mut surface);
        timer.tick(30_001, &mut surface);
        assert_eq!(surface.calls.len(), 1);
        assert_eq!(timer.last_color().g, 127);
    }

    #[test]
    fn test_tick_inactive_when_paused() {
        let mut timer = Timer::new(MAX);
        let mut surface = RecordingSurface::default();
        timer.start(0, &mut surface);
        timer.pause(BLUE, 1_000, &mut surface);
        surface.calls.clear();

        let (outcome, _) = timer.tick(120_000, &mut surface);
        assert_eq!(outcome, TickOutcome::Inactive);
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn test_tick_expired_renders_red() {
        let mut timer = Timer::new(MAX);
        let mut surface = RecordingSurface::default();
        timer.start(0, &mut surface);

        let (outcome, _) = timer.tick(70_000, &mut surface);
        assert_eq!(outcome, TickOutcome::Expired);
        assert_eq!(timer.last_color(), RGB8 { r: 255, g: 0, b: 0 });
    }

    #[test]
    fn test_failed_redraw_is_retried() {
        let mut timer = Timer::new(MAX);
        let mut surface = RecordingSurface::default();
        timer.start(0, &mut surface);

        surface.fail_solid = true;
        let (_, pacing) = timer.tick(30_000, &mut surface);
        assert_eq!(pacing.render_failures, 1);
        assert_eq!(timer.last_color(), RGB8 { r: 0, g: 255, b: 0 });

        surface.fail_solid = false;
        timer.tick(30_000, &mut surface);
        assert_eq!(timer.last_color().g, 127);
    }

    #[test]
    fn test_stop_resets_fields() {
        let mut timer = Timer::new(MAX);
        let mut surface = RecordingSurface::default();
        timer.start(0, &mut surface);
        timer.pause(BLUE, 1_000, &mut surface);
        surface.calls.clear();

        timer.stop(&mut surface);
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.end_time_ms(), 0);
        assert_eq!(timer.paused_remaining_ms(), 0);
        assert_eq!(timer.last_color(), COLOR_OFF);
        assert_eq!(
            surface.calls.as_slice(),
            &[Call::BiWave(SESSION_STOP_COLOR), Call::Clear]
        );
    }
}
