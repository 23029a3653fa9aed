//! Command Decoder
//!
//! Dekodiert den 16-Byte Datenblock eines Command-Tags und leitet den
//! Befehl an den Timer weiter.

use rgb::RGB8;

use crate::timer::{Pacing, Timer};
use crate::traits::RenderSurface;
use crate::types::{BLOCK_SIZE, ByteOrder, Command, Function};

/// Byte-Reihenfolge der Dauer auf den Tags (ESP32 ist Little Endian)
pub const COMMAND_BYTE_ORDER: ByteOrder = ByteOrder::Little;

const FUNCTION_OFFSET: usize = 0;
const DURATION_OFFSET: usize = 1;
const COLOR_OFFSET: usize = 5;

impl Command {
    /// Dekodiert einen Datenblock mit der Standard-Byte-Reihenfolge
    ///
    /// Schlägt nie fehl: unbekannte Funktionscodes werden zu `Function::Unknown`.
    ///
    /// ```
    /// # use esp_core::{Command, Function};
    /// let mut block = [0u8; 16];
    /// block[0] = 0x02;
    /// block[5..8].copy_from_slice(&[0, 0, 255]);
    /// let cmd = Command::decode(&block);
    /// assert_eq!(cmd.function, Function::Pause);
    /// assert_eq!(cmd.color.b, 255);
    /// ```
    pub fn decode(block: &[u8; BLOCK_SIZE]) -> Self {
        Self::decode_with(block, COMMAND_BYTE_ORDER)
    }

    pub fn decode_with(block: &[u8; BLOCK_SIZE], order: ByteOrder) -> Self {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&block[DURATION_OFFSET..COLOR_OFFSET]);
        let duration_ms = match order {
            ByteOrder::Little => u32::from_le_bytes(raw),
            ByteOrder::Big => u32::from_be_bytes(raw),
        };

        Self {
            function: Function::from(block[FUNCTION_OFFSET]),
            duration_ms,
            color: RGB8 {
                r: block[COLOR_OFFSET],
                g: block[COLOR_OFFSET + 1],
                b: block[COLOR_OFFSET + 2],
            },
        }
    }

    /// Kodiert den Befehl für das Beschreiben eines Tags
    ///
    /// Reservierte Bytes werden mit 0 gefüllt.
    pub fn encode(&self) -> [u8; BLOCK_SIZE] {
        self.encode_with(COMMAND_BYTE_ORDER)
    }

    pub fn encode_with(&self, order: ByteOrder) -> [u8; BLOCK_SIZE] {
        let mut block = [0u8; BLOCK_SIZE];
        block[FUNCTION_OFFSET] = self.function.code();
        let duration = match order {
            ByteOrder::Little => self.duration_ms.to_le_bytes(),
            ByteOrder::Big => self.duration_ms.to_be_bytes(),
        };
        block[DURATION_OFFSET..COLOR_OFFSET].copy_from_slice(&duration);
        block[COLOR_OFFSET] = self.color.r;
        block[COLOR_OFFSET + 1] = self.color.g;
        block[COLOR_OFFSET + 2] = self.color.b;
        block
    }

    /// Führt den Befehl auf dem Timer aus
    ///
    /// `Unknown` ist ein No-op und rendert nichts.
    pub fn dispatch<R: RenderSurface>(
        &self,
        timer: &mut Timer,
        now_ms: u64,
        surface: &mut R,
    ) -> Pacing {
        match self.function {
            Function::AddTime => timer.add(self.duration_ms, self.color, surface),
            Function::Pause => timer.pause(self.color, now_ms, surface),
            Function::Resume => timer.resume(self.color, now_ms, surface),
            Function::Unknown(_) => Pacing::default(),
        }
    }
}
