// Hardware Abstraction Layer (HAL) Module
//
// Implementiert die Traits aus esp-core für die echte Hardware:
// PN532 NFC-Reader (I2C) und WS2812B LED-Strip (RMT).

pub mod led_writer;
pub mod nfc_reader;

pub use led_writer::RmtLedWriter;
pub use nfc_reader::{EmbassyCountDown, FirmwareVersion, Pn532};
