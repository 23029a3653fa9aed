//! Session Guard
//!
//! Merkt sich die Wildcard, die eine Session gestartet hat. Nur dieselbe
//! Wildcard kann die Session wieder beenden (Tap-to-Start / Tap-to-Stop).

use crate::types::{SessionEvent, TagId};

/// Höchstens eine gemerkte Wildcard-UID
#[derive(Debug, Default, Clone, Copy)]
pub struct SessionGuard {
    owner: Option<TagId>,
}

impl SessionGuard {
    pub const fn new() -> Self {
        Self { owner: None }
    }

    /// Wertet einen erkannten Tag aus
    ///
    /// - kein Wildcard → `None` (Command-Tag)
    /// - Wildcard, keine Session → UID merken, `Started`
    /// - Wildcard, gleiche UID → Session löschen, `Stopped`
    /// - Wildcard, andere UID → `Rejected`
    pub fn observe(&mut self, tag: &TagId, is_wildcard: bool) -> SessionEvent {
        if !is_wildcard {
            return SessionEvent::None;
        }

        match self.owner {
            None => {
                self.owner = Some(*tag);
                SessionEvent::Started
            }
            Some(owner) if owner == *tag => {
                self.owner = None;
                SessionEvent::Stopped
            }
            Some(_) => SessionEvent::Rejected,
        }
    }

    /// Vergisst die gemerkte Wildcard (Timer gestoppt)
    pub fn clear(&mut self) {
        self.owner = None;
    }

    pub fn owner(&self) -> Option<&TagId> {
        self.owner.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.owner.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(bytes: &[u8]) -> TagId {
        TagId::new(bytes).unwrap()
    }

    #[test]
    fn test_non_wildcard_passes_through() {
        let mut guard = SessionGuard::new();
        assert_eq!(guard.observe(&tag(&[1, 2, 3, 4]), false), SessionEvent::None);
        assert!(!guard.is_active());
    }

    #[test]
    fn test_wildcard_toggles_session() {
        let mut guard = SessionGuard::new();
        let a = tag(&[1, 2, 3, 4]);

        assert_eq!(guard.observe(&a, true), SessionEvent::Started);
        assert_eq!(guard.owner(), Some(&a));

        assert_eq!(guard.observe(&a, true), SessionEvent::Stopped);
        assert_eq!(guard.owner(), None);
    }

    #[test]
    fn test_other_wildcard_is_rejected() {
        let mut guard = SessionGuard::new();
        let a = tag(&[1, 2, 3, 4]);
        let b = tag(&[1, 2, 3, 4, 5, 6, 7]);

        guard.observe(&a, true);
        assert_eq!(guard.observe(&b, true), SessionEvent::Rejected);
        assert_eq!(guard.owner(), Some(&a));
    }

    #[test]
    fn test_command_tag_does_not_touch_session() {
        let mut guard = SessionGuard::new();
        let a = tag(&[1, 2, 3, 4]);
        guard.observe(&a, true);

        // Gleiche UID, aber Authentifizierung fehlgeschlagen → Command-Pfad
        assert_eq!(guard.observe(&a, false), SessionEvent::None);
        assert_eq!(guard.owner(), Some(&a));
    }

    #[test]
    fn test_clear() {
        let mut guard = SessionGuard::new();
        guard.observe(&tag(&[9, 9, 9, 9]), true);
        guard.clear();
        assert!(!guard.is_active());
    }
}
