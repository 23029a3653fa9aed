// SmartLED Writer für den WS2812B-Strip
//
// Implementiert den SmartLedWriter-Trait aus esp-core über das RMT Peripheral.
// Die globale Helligkeit wird hier pro Frame angewendet.

use esp_hal::Blocking;
use esp_hal::rmt::Rmt;
use esp_hal::time::Rate;
use esp_hal_smartled::SmartLedsAdapter;
use rgb::RGB8;
use smart_leds_trait::SmartLedsWrite;

use esp_core::{LedError, SmartLedWriter, scale_brightness};

use crate::config::LED_BUFFER_SIZE;

/// Real Hardware LED Writer
///
/// Nutzt ESP32 RMT Peripheral um WS2812 LEDs anzusteuern.
///
/// Hinweis: Der Buffer muss den ganzen Task überleben, daher wird er im Task
/// erstellt und als Parameter übergeben statt im Constructor allokiert.
pub struct RmtLedWriter<'a> {
    led: SmartLedsAdapter<'a, LED_BUFFER_SIZE>,
    brightness: u8,
}

impl<'a> RmtLedWriter<'a> {
    /// Erstellt einen neuen RmtLedWriter
    ///
    /// # Parameter
    /// - `pin`: GPIO für die LED-Datenleitung
    /// - `rmt_peripheral`: RMT Peripheral
    /// - `rmt_clock_mhz`: RMT Clock Frequenz in MHz (z.B. 80)
    /// - `buffer`: Buffer für LED-Daten (erstellt mit smart_led_buffer!(LED_COUNT) Macro)
    /// - `brightness`: globale Helligkeit (0-255)
    pub fn new(
        pin: esp_hal::peripherals::GPIO4<'a>,
        rmt_peripheral: esp_hal::peripherals::RMT<'a>,
        rmt_clock_mhz: u32,
        buffer: &'a mut [esp_hal::rmt::PulseCode; LED_BUFFER_SIZE],
        brightness: u8,
    ) -> Result<Self, LedError> {
        // RMT initialisieren
        let rmt: Rmt<'a, Blocking> = Rmt::new(rmt_peripheral, Rate::from_mhz(rmt_clock_mhz))
            .map_err(|_| LedError::WriteFailed)?;

        // SmartLED Adapter erstellen
        let led = SmartLedsAdapter::new(rmt.channel0, pin, buffer);

        Ok(Self { led, brightness })
    }
}

impl<'a> SmartLedWriter for RmtLedWriter<'a> {
    fn write(&mut self, pixels: &[RGB8]) -> Result<(), LedError> {
        let brightness = self.brightness;
        self.led
            .write(pixels.iter().map(|&c| scale_brightness(c, brightness)))
            .map_err(|_| LedError::WriteFailed)
    }
}
