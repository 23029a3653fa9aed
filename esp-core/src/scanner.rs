//! Tag Scanner
//!
//! Wrapper um den NFC-Reader mit Retry-Policy für Blockzugriffe.

use crate::mifare::first_block;
use crate::traits::TagReader;
use crate::types::{BLOCK_SIZE, TagId};

/// Standard-Key A (Transport-Key) für die Wildcard-Prüfung
pub const DEFAULT_KEY_A: [u8; 6] = [0xFF; 6];

/// Fehler beim Lesen eines Datenblocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadError {
    /// Alle Leseversuche fehlgeschlagen
    Exhausted { attempts: u8 },
    /// Sektor liegt außerhalb des adressierbaren Blockbereichs
    InvalidSector { sector: u8 },
}

/// Begrenzte Wiederholung ohne Backoff-Wachstum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryPolicy {
    pub max_attempts: u8,
    /// Wartezeit zwischen zwei Versuchen (0 = sofort wiederholen)
    pub delay_ms: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay_ms: 0,
        }
    }
}

/// Tag Scanner - fragt den Reader ab und liest Command-Blöcke
#[derive(Debug, Clone, Copy)]
pub struct TagScanner {
    sector: u8,
    key: [u8; 6],
    timeout_ms: u16,
    retry: RetryPolicy,
}

impl TagScanner {
    pub fn new(sector: u8, key: [u8; 6], timeout_ms: u16, retry: RetryPolicy) -> Self {
        Self {
            sector,
            key,
            timeout_ms,
            retry,
        }
    }

    /// Erster Datenblock des konfigurierten Sektors
    pub fn block_index(&self) -> Option<u8> {
        first_block(self.sector)
    }

    /// Gibt die UID des Tags im Feld zurück (falls vorhanden)
    pub fn poll<T: TagReader>(&self, reader: &mut T) -> Option<TagId> {
        reader.try_read_tag(self.timeout_ms)
    }

    /// Prüft ob der Tag sich mit dem festen Key authentifiziert (= Wildcard)
    ///
    /// Fehler der Authentifizierung werden als `false` gewertet.
    pub fn is_wildcard<T: TagReader>(&self, reader: &mut T, tag: &TagId) -> bool {
        self.block_index().is_some() && reader.authenticate_sector(tag, self.sector, &self.key)
    }

    /// Liest den Command-Block mit begrenzter Anzahl an Versuchen
    ///
    /// Es gibt keine Teilergebnisse: entweder ein kompletter Block oder `Exhausted`.
    pub fn read_block<T: TagReader>(&self, reader: &mut T) -> Result<[u8; BLOCK_SIZE], ReadError> {
        let block = self
            .block_index()
            .ok_or(ReadError::InvalidSector { sector: self.sector })?;
        for attempt in 1..=self.retry.max_attempts {
            if let Ok(data) = reader.read_block(block) {
                return Ok(data);
            }
            if attempt < self.retry.max_attempts && self.retry.delay_ms > 0 {
                reader.backoff(self.retry.delay_ms);
            }
        }
        Err(ReadError::Exhausted {
            attempts: self.retry.max_attempts,
        })
    }
}
