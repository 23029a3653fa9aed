//! Core Types für den NFC-Timer
//!
//! Datenstrukturen ohne Hardware-Dependencies

use rgb::RGB8;

/// Größe eines Datenblocks auf dem Tag (Bytes)
pub const BLOCK_SIZE: usize = 16;

/// Minimale UID-Länge (ISO14443A Single Size)
pub const TAG_ID_MIN_LEN: usize = 4;

/// Maximale UID-Länge (ISO14443A Double Size)
pub const TAG_ID_MAX_LEN: usize = 7;

/// Identifier-Farbe beim Session-Start (Wave-Animation)
pub const SESSION_START_COLOR: RGB8 = RGB8 { r: 0, g: 255, b: 0 };

/// Farbe der "Gestoppt"-Animation
pub const SESSION_STOP_COLOR: RGB8 = RGB8 { r: 255, g: 0, b: 0 };

/// Identifier-Farbe während auf die Bestätigung durch die Wildcard gewartet wird
pub const CONFIRM_COLOR: RGB8 = RGB8 {
    r: 255,
    g: 160,
    b: 0,
};

/// Schwarz / LEDs aus
pub const COLOR_OFF: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

/// UID eines erkannten Tags
///
/// Hardware-bedingt 4 bis 7 Bytes lang. Zwei UIDs sind nur gleich, wenn
/// Länge und alle gültigen Bytes übereinstimmen.
#[derive(Clone, Copy, Debug, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagId {
    bytes: [u8; TAG_ID_MAX_LEN],
    len: u8,
}

impl TagId {
    /// Erstellt eine TagId aus den gelesenen UID-Bytes
    ///
    /// Gibt `None` zurück wenn die Länge nicht zwischen 4 und 7 Bytes liegt.
    pub fn new(uid: &[u8]) -> Option<Self> {
        if !(TAG_ID_MIN_LEN..=TAG_ID_MAX_LEN).contains(&uid.len()) {
            return None;
        }
        let mut bytes = [0u8; TAG_ID_MAX_LEN];
        bytes[..uid.len()].copy_from_slice(uid);
        Some(Self {
            bytes,
            len: uid.len() as u8,
        })
    }

    /// Die gültigen UID-Bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
}

impl PartialEq for TagId {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

/// Funktionscode eines Command-Tags (Byte 0 des Datenblocks)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Function {
    /// 0x01 - Zeit hinzufügen
    AddTime,
    /// 0x02 - Timer pausieren
    Pause,
    /// 0x03 - Timer fortsetzen
    Resume,
    /// Unbekannter Code, wird als No-op behandelt
    Unknown(u8),
}

impl From<u8> for Function {
    fn from(code: u8) -> Self {
        match code {
            0x01 => Self::AddTime,
            0x02 => Self::Pause,
            0x03 => Self::Resume,
            other => Self::Unknown(other),
        }
    }
}

impl Function {
    /// Der Funktionscode wie er auf dem Tag steht
    pub fn code(self) -> u8 {
        match self {
            Self::AddTime => 0x01,
            Self::Pause => 0x02,
            Self::Resume => 0x03,
            Self::Unknown(code) => code,
        }
    }
}

/// Byte-Reihenfolge der Dauer im Command-Block
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ByteOrder {
    Little,
    Big,
}

/// Befehl eines Command-Tags
///
/// Layout (16 Bytes): `[0]` Funktion, `[1..5)` Dauer (u32), `[5..8)` R, G, B,
/// `[8..16)` reserviert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Command {
    pub function: Function,
    pub duration_ms: u32,
    pub color: RGB8,
}

/// Zustand des Timers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimerState {
    #[default]
    Idle,
    Running,
    Paused,
}

/// Ergebnis der Wildcard-Prüfung im Session Guard
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionEvent {
    /// Kein Wildcard-Tag, weiter zum Command Decoder
    None,
    /// Wildcard gemerkt, Session gestartet
    Started,
    /// Gleiche Wildcard erneut aufgelegt, Session beendet
    Stopped,
    /// Andere Wildcard während laufender Session, ignoriert
    Rejected,
}

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for TagId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "TagId({=[u8]:x})", self.as_bytes())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Command {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "Command {{ function: {}, duration_ms: {}, rgb: ({}, {}, {}) }}",
            self.function,
            self.duration_ms,
            self.color.r,
            self.color.g,
            self.color.b
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_id_rejects_invalid_length() {
        assert!(TagId::new(&[1, 2, 3]).is_none());
        assert!(TagId::new(&[0; 8]).is_none());
        assert!(TagId::new(&[]).is_none());
    }

    #[test]
    fn test_tag_id_equal_bytes() {
        let a = TagId::new(&[0xDE, 0xAD, 0xBE, 0xEF]).unwrap();
        let b = TagId::new(&[0xDE, 0xAD, 0xBE, 0xEF]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_bytes().len(), 4);
    }

    #[test]
    fn test_tag_id_different_length_never_equal() {
        // Gleicher Präfix, aber 4 vs. 7 Bytes
        let short = TagId::new(&[1, 2, 3, 4]).unwrap();
        let long = TagId::new(&[1, 2, 3, 4, 0, 0, 0]).unwrap();
        assert_ne!(short, long);
    }

    #[test]
    fn test_function_codes() {
        assert_eq!(Function::from(0x01), Function::AddTime);
        assert_eq!(Function::from(0x02), Function::Pause);
        assert_eq!(Function::from(0x03), Function::Resume);
        assert_eq!(Function::from(0x7F), Function::Unknown(0x7F));
        assert_eq!(Function::Unknown(0x7F).code(), 0x7F);
        assert_eq!(Function::Resume.code(), 0x03);
    }
}
