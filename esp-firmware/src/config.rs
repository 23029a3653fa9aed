// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen

use esp_core::{COMMAND_BYTE_ORDER, ControllerConfig, DEFAULT_KEY_A, RetryPolicy, StripLayout};

// ============================================================================
// LED Konfiguration
// ============================================================================

/// GPIO-Pin für die Datenleitung des LED-Strips (WS2812B)
pub const LED_GPIO_PIN: u8 = 4;

/// Helligkeits-Level für den Strip (0-255)
/// Wert ist gedimmt für Augenschonung
pub const LED_BRIGHTNESS: u8 = 10;

/// RMT Taktfrequenz in MHz
/// 80 MHz ist optimal für WS2812 LED-Timing
pub const RMT_CLOCK_MHZ: u32 = 80;

/// Anzahl der LEDs (8x8 Matrix)
pub const LED_COUNT: usize = 64;

/// LEDs pro Reihe
pub const LED_ROW_LEN: usize = 8;

/// Geometrie für die Animationen
pub const STRIP_LAYOUT: StripLayout = StripLayout::new(LED_COUNT, LED_ROW_LEN);

/// RMT Buffer-Größe: 24 Pulse pro LED + 1 Reset
pub const LED_BUFFER_SIZE: usize = LED_COUNT * 24 + 1;

/// Maximale Anzahl wartender Animationen
/// Start (Wave + Solid) und Stop (Wave + Clear) brauchen je 2
pub const ANIMATION_QUEUE_DEPTH: usize = 8;

// ============================================================================
// NFC Konfiguration (PN532 via I2C)
// ============================================================================

/// I2C Datenleitung
pub const NFC_SDA_PIN: u8 = 6;

/// I2C Taktleitung
pub const NFC_SCL_PIN: u8 = 7;

/// I2C Taktfrequenz in kHz
pub const I2C_FREQUENCY_KHZ: u32 = 100;

/// Timeout für normale PN532-Kommandos (ACK und Antwort) in ms
pub const NFC_COMMAND_TIMEOUT_MS: u64 = 100;

/// Timeout für die Tag-Erkennung in ms
pub const TAG_TIMEOUT_MS: u16 = 80;

/// Sektor mit Wildcard-Key und Command-Block (erster Block = Sektor × 4)
pub const NFC_SECTOR: u8 = 2;

/// Maximale Leseversuche für den Command-Block
pub const BLOCK_READ_ATTEMPTS: u8 = 5;

// ============================================================================
// Timer Konfiguration
// ============================================================================

/// Dauer einer Session in ms
/// Kann über TIMER_DURATION_MS in .env überschrieben werden
pub const SESSION_DURATION_MS: u32 = parse_ms(option_env!("TIMER_DURATION_MS"), 60_000);

/// Abstand zwischen zwei NFC-Abfragen in ms (Duty-Cycle des Readers)
/// Kann über NFC_CYCLE_MS in .env überschrieben werden
pub const NFC_CYCLE_MS: u32 = parse_ms(option_env!("NFC_CYCLE_MS"), 350);

/// Abfrage-Intervall beim Warten auf die Wildcard nach Ablauf (ms)
pub const CONFIRM_CYCLE_MS: u32 = parse_ms(option_env!("CONFIRM_CYCLE_MS"), 500);

/// Beim Ablauf auf die Wildcard warten statt sofort zu stoppen
pub const REQUIRE_CONFIRMATION: bool = true;

/// Pause zwischen zwei Loop-Iterationen in ms
/// Yield-Punkt für den Executor
pub const LOOP_INTERVAL_MS: u64 = 10;

/// Baut die Controller-Konfiguration aus den Konstanten
pub fn controller_config() -> ControllerConfig {
    ControllerConfig {
        session_duration_ms: SESSION_DURATION_MS,
        cycle_time_ms: NFC_CYCLE_MS,
        tag_timeout_ms: TAG_TIMEOUT_MS,
        sector: NFC_SECTOR,
        key: DEFAULT_KEY_A,
        retry: RetryPolicy {
            max_attempts: BLOCK_READ_ATTEMPTS,
            delay_ms: 0,
        },
        require_confirmation: REQUIRE_CONFIRMATION,
        confirm_cycle_ms: CONFIRM_CYCLE_MS,
        byte_order: COMMAND_BYTE_ORDER,
    }
}

/// Parst eine Dezimalzahl zur Compile-Zeit, `_` als Trenner erlaubt
///
/// Ungültige oder leere Werte ergeben `default`.
const fn parse_ms(value: Option<&str>, default: u32) -> u32 {
    let bytes = match value {
        Some(s) => s.as_bytes(),
        None => return default,
    };
    if bytes.is_empty() {
        return default;
    }

    let mut result: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        i += 1;
        if b == b'_' {
            continue;
        }
        if !b.is_ascii_digit() {
            return default;
        }
        result = match result.checked_mul(10) {
            Some(v) => match v.checked_add((b - b'0') as u32) {
                Some(v) => v,
                None => return default,
            },
            None => return default,
        };
    }
    result
}
