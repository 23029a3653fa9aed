// Library-Root: Wiederverwendbare Logik und Module
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Module
pub mod config;
pub mod hal;
pub mod tasks;

// Re-exports von esp-core
pub use esp_core::{
    AnimationQueue, COLOR_OFF, Controller, ControllerConfig, Function, LedError, NfcError,
    RenderSurface, SessionEvent, SmartLedWriter, StepReport, TagReader,
};

use crate::config::ANIMATION_QUEUE_DEPTH;

// ============================================================================
// Type-Aliase
// ============================================================================

/// Animations-Queue zwischen Timer-Logik und LED-Strip
/// - ANIMATION_QUEUE_DEPTH: maximale Anzahl wartender Animationen pro Iteration
pub type StripQueue = AnimationQueue<ANIMATION_QUEUE_DEPTH>;

// ============================================================================
// Testing-Strategie
// ============================================================================
//
// Dieses Crate kompiliert nur für riscv32imac-unknown-none-elf (esp-hal,
// esp-rtos). Die komplette State-Machine liegt daher in esp-core und wird
// dort bzw. in esp-tests auf dem Host getestet, mit Mock-Implementierungen
// für TagReader, RenderSurface und SmartLedWriter.
//
// Hier bleiben nur Hardware-Treiber (PN532, RMT) und der Embassy-Task.
