//! ESP Core - Platform-agnostic Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie enthält die Session-/Timer-State-Machine des NFC-Timers,
//! den Command Decoder, die Animations-Frames und die Hardware-Traits.

#![no_std]

pub mod animation;
pub mod command;
pub mod controller;
pub mod logic;
pub mod mifare;
pub mod scanner;
pub mod session;
pub mod timer;
pub mod traits;
pub mod types;

// Re-exports für einfachen Zugriff
pub use animation::{Animation, AnimationQueue, StripLayout};
pub use command::COMMAND_BYTE_ORDER;
pub use controller::{Controller, ControllerConfig, StepReport};
pub use logic::{dim, scale_brightness};
pub use mifare::{BLOCKS_PER_SECTOR, MIFARE_AUTH_A, MIFARE_READ};
pub use scanner::{DEFAULT_KEY_A, ReadError, RetryPolicy, TagScanner};
pub use session::SessionGuard;
pub use timer::{Pacing, TickOutcome, Timer, calc_color};
pub use traits::{LedError, NfcError, RenderSurface, SmartLedWriter, TagReader};
pub use types::{
    BLOCK_SIZE, ByteOrder, COLOR_OFF, CONFIRM_COLOR, Command, Function, SESSION_START_COLOR,
    SESSION_STOP_COLOR, SessionEvent, TagId, TimerState,
};
