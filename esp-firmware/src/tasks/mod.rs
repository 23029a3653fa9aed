// Task-Module: Alle Embassy-Tasks des Projekts
//
// Es gibt genau einen Control-Loop (NFC + Timer + LED-Strip),
// damit braucht der Zustand keine Synchronisation.

pub mod nfc_timer;

pub use nfc_timer::{nfc_timer_logic, nfc_timer_task};
