//! Control-Loop Logik
//!
//! Hält den kompletten Zustand (Session Guard, Timer, Poll-Zeitpunkt) als
//! eigenes Struct statt globaler Variablen. Eine Loop-Iteration:
//!
//! 1. Tag Scanner abfragen (höchstens alle `cycle_time_ms`)
//! 2. Session Guard prüft auf Wildcard
//! 3. Sonst: Datenblock lesen, Command dekodieren und ausführen
//! 4. `Timer::tick()` - in JEDER Iteration, auch ohne Tag
//!
//! Läuft der Timer ab während eine Wildcard gemerkt ist, wird auf die
//! Bestätigung durch genau diese Wildcard gewartet, bevor gestoppt wird.

use crate::command::COMMAND_BYTE_ORDER;
use crate::scanner::{DEFAULT_KEY_A, ReadError, RetryPolicy, TagScanner};
use crate::session::SessionGuard;
use crate::timer::{Pacing, TickOutcome, Timer};
use crate::traits::{RenderSurface, TagReader};
use crate::types::{ByteOrder, CONFIRM_COLOR, Command, SessionEvent, TagId};

/// Konfiguration des Control-Loops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerConfig {
    /// Dauer einer Session in ms
    pub session_duration_ms: u32,
    /// Minimaler Abstand zwischen zwei Reader-Abfragen (ms)
    pub cycle_time_ms: u32,
    /// Timeout für die Tag-Erkennung (ms)
    pub tag_timeout_ms: u16,
    /// Sektor mit Wildcard-Key und Command-Block
    pub sector: u8,
    pub key: [u8; 6],
    pub retry: RetryPolicy,
    /// Beim Ablauf auf die Wildcard warten statt sofort zu stoppen
    pub require_confirmation: bool,
    /// Abfrage-Intervall während auf Bestätigung gewartet wird (ms)
    pub confirm_cycle_ms: u32,
    pub byte_order: ByteOrder,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            session_duration_ms: 60_000,
            cycle_time_ms: 350,
            tag_timeout_ms: 80,
            sector: 2,
            key: DEFAULT_KEY_A,
            retry: RetryPolicy::default(),
            require_confirmation: true,
            confirm_cycle_ms: 500,
            byte_order: COMMAND_BYTE_ORDER,
        }
    }
}

/// Was in einer Loop-Iteration passiert ist (für Logging in der Firmware)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    /// Erkannter Tag (nur wenn der Reader abgefragt wurde)
    pub tag: Option<TagId>,
    pub session: Option<SessionEvent>,
    /// Dekodierter und ausgeführter Befehl
    pub command: Option<Command>,
    pub read_error: Option<ReadError>,
    pub tick: TickOutcome,
    /// Warten auf Bestätigung durch die Wildcard
    pub awaiting_confirmation: bool,
    /// Session wurde in dieser Iteration beendet
    pub stopped: bool,
    pub pacing: Pacing,
}

impl Default for StepReport {
    fn default() -> Self {
        Self {
            tag: None,
            session: None,
            command: None,
            read_error: None,
            tick: TickOutcome::Inactive,
            awaiting_confirmation: false,
            stopped: false,
            pacing: Pacing::default(),
        }
    }
}

/// Besitzt Session Guard, Timer und Scanner und treibt die State-Machine
pub struct Controller {
    config: ControllerConfig,
    scanner: TagScanner,
    guard: SessionGuard,
    timer: Timer,
    last_poll_ms: Option<u64>,
    awaiting_confirmation: bool,
}

impl Controller {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            scanner: TagScanner::new(config.sector, config.key, config.tag_timeout_ms, config.retry),
            guard: SessionGuard::new(),
            timer: Timer::new(config.session_duration_ms),
            last_poll_ms: None,
            awaiting_confirmation: false,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn session(&self) -> &SessionGuard {
        &self.guard
    }

    pub fn is_awaiting_confirmation(&self) -> bool {
        self.awaiting_confirmation
    }

    /// Eine Iteration des Control-Loops
    pub fn step<T: TagReader, R: RenderSurface>(
        &mut self,
        now_ms: u64,
        reader: &mut T,
        surface: &mut R,
    ) -> StepReport {
        let mut report = StepReport::default();

        if self.awaiting_confirmation {
            self.confirm_cycle(now_ms, reader, surface, &mut report);
        } else if self.poll_due(now_ms, self.config.cycle_time_ms) {
            self.last_poll_ms = Some(now_ms);
            self.poll_cycle(now_ms, reader, surface, &mut report);
        }

        let (tick, pacing) = self.timer.tick(now_ms, surface);
        report.tick = tick;
        report.pacing.merge(pacing);

        if tick == TickOutcome::Expired && !self.awaiting_confirmation {
            if self.config.require_confirmation && self.guard.is_active() {
                self.awaiting_confirmation = true;
            } else {
                self.finish(surface, &mut report);
            }
        }

        report.awaiting_confirmation = self.awaiting_confirmation;
        report
    }

    /// Beendet die Session sofort (Timer + Session Guard)
    pub fn stop<R: RenderSurface>(&mut self, surface: &mut R) -> Pacing {
        let mut report = StepReport::default();
        self.finish(surface, &mut report);
        report.pacing
    }

    fn poll_due(&self, now_ms: u64, interval_ms: u32) -> bool {
        match self.last_poll_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= interval_ms as u64,
        }
    }

    fn poll_cycle<T: TagReader, R: RenderSurface>(
        &mut self,
        now_ms: u64,
        reader: &mut T,
        surface: &mut R,
        report: &mut StepReport,
    ) {
        let Some(tag) = self.scanner.poll(reader) else {
            return;
        };
        report.tag = Some(tag);

        let is_wildcard = self.scanner.is_wildcard(reader, &tag);
        let event = self.guard.observe(&tag, is_wildcard);
        report.session = Some(event);

        match event {
            SessionEvent::Started => report.pacing.merge(self.timer.start(now_ms, surface)),
            SessionEvent::Stopped => {
                report.pacing.merge(self.timer.stop(surface));
                report.stopped = true;
            }
            SessionEvent::Rejected => {}
            SessionEvent::None => match self.scanner.read_block(reader) {
                Ok(block) => {
                    let command = Command::decode_with(&block, self.config.byte_order);
                    report.command = Some(command);
                    report
                        .pacing
                        .merge(command.dispatch(&mut self.timer, now_ms, surface));
                }
                Err(err) => report.read_error = Some(err),
            },
        }
    }

    /// Wartet nicht-blockierend auf die Wildcard der laufenden Session
    ///
    /// Command-Tags werden in dieser Phase ignoriert.
    fn confirm_cycle<T: TagReader, R: RenderSurface>(
        &mut self,
        now_ms: u64,
        reader: &mut T,
        surface: &mut R,
        report: &mut StepReport,
    ) {
        if !self.poll_due(now_ms, self.config.confirm_cycle_ms) {
            return;
        }
        self.last_poll_ms = Some(now_ms);

        let last_color = self.timer.last_color();
        report
            .pacing
            .track(surface.show_identifier_pattern(last_color, CONFIRM_COLOR));

        let Some(tag) = self.scanner.poll(reader) else {
            return;
        };
        report.tag = Some(tag);

        // Nur die gemerkte Wildcard braucht die Authentifizierung
        if self.guard.owner() != Some(&tag) {
            return;
        }
        let is_wildcard = self.scanner.is_wildcard(reader, &tag);
        let event = self.guard.observe(&tag, is_wildcard);
        report.session = Some(event);
        if event == SessionEvent::Stopped {
            self.finish(surface, report);
        }
    }

    fn finish<R: RenderSurface>(&mut self, surface: &mut R, report: &mut StepReport) {
        self.guard.clear();
        self.awaiting_confirmation = false;
        report.pacing.merge(self.timer.stop(surface));
        report.stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{LedError, NfcError};
    use crate::types::{BLOCK_SIZE, TimerState};
    use rgb::RGB8;

    /// Reader mit genau einem Tag im Feld, der immer Wildcard ist
    struct WildcardReader {
        present: Option<TagId>,
        polls: u32,
    }

    impl TagReader for WildcardReader {
        fn try_read_tag(&mut self, _timeout_ms: u16) -> Option<TagId> {
            self.polls += 1;
            self.present
        }

        fn authenticate_sector(&mut self, _tag: &TagId, _sector: u8, _key: &[u8; 6]) -> bool {
            true
        }

        fn read_block(&mut self, _block: u8) -> Result<[u8; BLOCK_SIZE], NfcError> {
            Err(NfcError::NoTarget)
        }
    }

    struct NullSurface;

    impl RenderSurface for NullSurface {
        fn show_solid(&mut self, _color: RGB8) -> Result<u32, LedError> {
            Ok(0)
        }

        fn show_wave(&mut self, _color: RGB8) -> Result<u32, LedError> {
            Ok(400)
        }

        fn show_bi_directional_wave(&mut self, _color: RGB8) -> Result<u32, LedError> {
            Ok(400)
        }

        fn show_identifier_pattern(
            &mut self,
            _base: RGB8,
            _identifier: RGB8,
        ) -> Result<u32, LedError> {
            Ok(400)
        }

        fn clear(&mut self) -> Result<u32, LedError> {
            Ok(0)
        }
    }

    #[test]
    fn test_default_config() {
        let config = ControllerConfig::default();
        assert_eq!(config.session_duration_ms, 60_000);
        assert_eq!(config.cycle_time_ms, 350);
        assert_eq!(config.sector, 2);
        assert_eq!(config.retry.max_attempts, 5);
        assert!(config.require_confirmation);
        // Decoder nutzt dieselbe Byte-Reihenfolge wie Command::encode()
        assert_eq!(config.byte_order, COMMAND_BYTE_ORDER);
    }

    #[test]
    fn test_held_wildcard_does_not_toggle_within_cycle() {
        let mut controller = Controller::new(ControllerConfig::default());
        let mut reader = WildcardReader {
            present: TagId::new(&[1, 2, 3, 4]),
            polls: 0,
        };

        let report = controller.step(0, &mut reader, &mut NullSurface);
        assert_eq!(report.session, Some(SessionEvent::Started));
        assert_eq!(report.pacing.busy_ms, 400);

        // Innerhalb des Zyklus kein zweiter Poll
        let report = controller.step(349, &mut reader, &mut NullSurface);
        assert_eq!(report.session, None);
        assert_eq!(reader.polls, 1);
        assert_eq!(controller.timer().state(), TimerState::Running);
    }

    #[test]
    fn test_stop_without_session_is_harmless() {
        let mut controller = Controller::new(ControllerConfig::default());

        controller.stop(&mut NullSurface);
        assert_eq!(controller.timer().state(), TimerState::Idle);
        assert!(!controller.is_awaiting_confirmation());
    }
}
