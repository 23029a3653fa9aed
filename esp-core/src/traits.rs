//! Hardware Abstraction Traits
//!
//! Diese Traits definieren Schnittstellen für Hardware-Zugriff
//! ohne konkrete Implementierung.

use rgb::RGB8;

use crate::types::{BLOCK_SIZE, TagId};

/// Fehler-Typ für LED-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedError {
    WriteFailed,
    /// Animations-Queue ist voll, Animation wurde verworfen
    QueueFull,
}

/// Fehler-Typ für den NFC-Reader (Treiber-Ebene)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NfcError {
    /// Reader hat innerhalb des Timeouts nicht geantwortet
    Timeout,
    /// I2C/SPI Bus-Fehler
    Bus,
    /// Ungültiger Frame oder Fehlerstatus vom Reader
    Protocol,
    /// Kein Tag im Feld
    NoTarget,
}

/// Trait für den NFC-Reader (z.B. PN532)
///
/// # Implementierungen
/// - **Production:** Pn532 (I2C)
/// - **Testing:** MockTagReader (in-memory Mock)
pub trait TagReader {
    /// Sucht einen Tag im Feld
    ///
    /// Gibt die UID zurück wenn innerhalb von `timeout_ms` ein Tag erkannt wurde.
    fn try_read_tag(&mut self, timeout_ms: u16) -> Option<TagId>;

    /// Authentifiziert einen Sektor mit Key A
    ///
    /// `false` bei falschem Key, falschem Tag-Typ oder Übertragungsfehler.
    fn authenticate_sector(&mut self, tag: &TagId, sector: u8, key: &[u8; 6]) -> bool;

    /// Liest einen 16-Byte Datenblock vom zuletzt erkannten Tag
    fn read_block(&mut self, block: u8) -> Result<[u8; BLOCK_SIZE], NfcError>;

    /// Wartet zwischen zwei Leseversuchen
    ///
    /// Standard: kein Warten. Hardware-Implementierungen können hier blockierend warten.
    fn backoff(&mut self, _ms: u32) {}
}

/// Trait für die Ausgabe auf dem LED-Strip
///
/// Jede Methode gibt bei Erfolg die Abspieldauer in Millisekunden zurück,
/// also die Zeit bis der Strip für die nächste Ausgabe frei ist.
pub trait RenderSurface {
    fn show_solid(&mut self, color: RGB8) -> Result<u32, LedError>;

    fn show_wave(&mut self, color: RGB8) -> Result<u32, LedError>;

    fn show_bi_directional_wave(&mut self, color: RGB8) -> Result<u32, LedError>;

    /// Basisfarbe mit wanderndem Identifier-Muster
    fn show_identifier_pattern(&mut self, base: RGB8, identifier: RGB8)
    -> Result<u32, LedError>;

    fn clear(&mut self) -> Result<u32, LedError>;
}

/// Trait für SmartLED Hardware-Zugriff
///
/// Abstrahiert den Zugriff auf einen RGB LED-Strip (WS2812/Neopixel).
///
/// # Implementierungen
/// - **Production:** RmtLedWriter (ESP32 RMT Peripheral)
/// - **Testing:** MockLedWriter (in-memory Mock)
pub trait SmartLedWriter {
    /// Schreibt einen kompletten Frame auf den Strip
    ///
    /// # Fehlerbehandlung
    /// Gibt `LedError::WriteFailed` zurück wenn Hardware-Zugriff fehlschlägt
    fn write(&mut self, pixels: &[RGB8]) -> Result<(), LedError>;
}
