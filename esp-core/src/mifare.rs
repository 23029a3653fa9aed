//! MIFARE Classic Hilfsfunktionen
//!
//! Block-Adressierung und Auswertung der Reader-Antworten, unabhängig vom
//! Treiber. Die Antworten beginnen nach dem Kommando-Code des PN532.

use crate::traits::NfcError;
use crate::types::{BLOCK_SIZE, TagId};

/// Blöcke pro Sektor (MIFARE Classic 1K)
pub const BLOCKS_PER_SECTOR: u8 = 4;

/// MIFARE Authentifizierung mit Key A
pub const MIFARE_AUTH_A: u8 = 0x60;

/// MIFARE 16-Byte Read
pub const MIFARE_READ: u8 = 0x30;

/// Status-Byte einer erfolgreichen InDataExchange-Antwort
const STATUS_OK: u8 = 0x00;

/// Erster Block eines Sektors, `None` wenn außerhalb des adressierbaren Bereichs
///
/// ```
/// # use esp_core::mifare::first_block;
/// assert_eq!(first_block(2), Some(8));
/// assert_eq!(first_block(64), None);
/// ```
pub fn first_block(sector: u8) -> Option<u8> {
    sector.checked_mul(BLOCKS_PER_SECTOR)
}

/// Wertet eine InListPassiveTarget-Antwort aus (ISO14443A)
///
/// Layout: NbTg, Tg, SENS_RES (2), SEL_RES, NFCIDLength, NFCID...
pub fn parse_target(response: &[u8]) -> Option<TagId> {
    if response.first() != Some(&1) {
        return None;
    }
    let uid_len = *response.get(5)? as usize;
    TagId::new(response.get(6..6 + uid_len)?)
}

/// Prüft das Status-Byte einer InDataExchange-Antwort
pub fn exchange_ok(response: &[u8]) -> bool {
    response.first() == Some(&STATUS_OK)
}

/// Wertet die Antwort eines MIFARE Read aus: Status + 16 Datenbytes
pub fn parse_read(response: &[u8]) -> Result<[u8; BLOCK_SIZE], NfcError> {
    if !exchange_ok(response) {
        return Err(NfcError::Protocol);
    }
    let data = response
        .get(1..1 + BLOCK_SIZE)
        .ok_or(NfcError::Protocol)?;
    let mut block = [0u8; BLOCK_SIZE];
    block.copy_from_slice(data);
    Ok(block)
}
