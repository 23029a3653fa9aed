// NFC Timer Task - Control-Loop für Reader, Timer und LED-Strip
use defmt::{Debug2Format, debug, error, info, warn};
use embassy_time::{Duration, Instant, Timer};
use esp_hal::delay::Delay;
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::time::Rate;
use esp_hal_smartled::smart_led_buffer;
use rgb::RGB8;

use crate::config::*;
use crate::hal::{Pn532, RmtLedWriter};
use crate::{
    COLOR_OFF, Controller, Function, RenderSurface, SessionEvent, SmartLedWriter, StepReport,
    StripQueue, TagReader,
};

/// NFC Timer Logic - Testbare Business Logic ohne Hardware-Abhängigkeit
///
/// Ein einziger kooperativer Loop:
/// - fragt den Reader im NFC-Zyklus ab (Wildcard oder Command-Tag)
/// - ruft in jeder Iteration `tick()` auf (Farbverlauf + Ablauf)
/// - spielt die angestoßenen Animationen Frame für Frame ab
///
/// # Trait-basierte Abstraktion
/// Die generischen Parameter ermöglichen:
/// - Real Hardware (Pn532, RmtLedWriter) im Production-Code
/// - Mock Implementierungen in Tests
///
/// # Parameter
/// - `reader`: NFC-Reader (Hardware oder Mock)
/// - `led`: LED-Strip Writer (Hardware oder Mock)
pub async fn nfc_timer_logic<T: TagReader, L: SmartLedWriter>(mut reader: T, mut led: L) -> ! {
    let mut controller = Controller::new(controller_config());
    info!("Timer: {}", controller.config());
    let mut queue = StripQueue::new(STRIP_LAYOUT);
    let mut pixels = [COLOR_OFF; LED_COUNT];
    let mut was_awaiting = false;

    // Strip beim Start löschen
    if queue.clear().is_err() {
        error!("Failed to queue initial clear");
    }

    loop {
        let now = Instant::now().as_millis();
        let report = controller.step(now, &mut reader, &mut queue);

        log_report(&report, was_awaiting);
        was_awaiting = report.awaiting_confirmation;

        // Animationen abspielen, zwischen den Frames gibt der Loop die CPU ab
        play_queue(&mut queue, &mut led, &mut pixels).await;

        // Async Delay: gibt CPU an andere Tasks zurück
        Timer::after(Duration::from_millis(LOOP_INTERVAL_MS)).await;
    }
}

/// Spielt alle wartenden Animationen ab
async fn play_queue<L: SmartLedWriter>(queue: &mut StripQueue, led: &mut L, pixels: &mut [RGB8]) {
    let layout = *queue.layout();
    while let Some(animation) = queue.pop() {
        let interval = animation.frame_interval_ms();
        for frame in 0..animation.frame_count(&layout) {
            animation.render_frame(frame, &layout, pixels);
            if led.write(pixels).is_err() {
                error!("Failed to write to LED strip");
            }
            if interval > 0 {
                Timer::after(Duration::from_millis(interval as u64)).await;
            }
        }
    }
}

/// Loggt was in einer Loop-Iteration passiert ist
fn log_report(report: &StepReport, was_awaiting: bool) {
    if let Some(tag) = report.tag {
        debug!("NFC: Tag detected {}", tag);
    }

    match report.session {
        Some(SessionEvent::Started) => info!("Session: started"),
        Some(SessionEvent::Stopped) => info!("Session: stopped by wildcard"),
        Some(SessionEvent::Rejected) => warn!("Session: other wildcard ignored"),
        Some(SessionEvent::None) | None => {}
    }

    if let Some(command) = report.command {
        match command.function {
            // Kein Fehler, nur No-op
            Function::Unknown(code) => debug!("Command: unknown function code {=u8:#x}", code),
            _ => info!("Command received: {}", command),
        }
    }

    if let Some(err) = report.read_error {
        warn!("NFC: Command block not readable: {}", err);
    }

    if report.awaiting_confirmation && !was_awaiting {
        info!("Timer: expired, waiting for wildcard confirmation");
    }

    if report.stopped {
        info!("Timer: stopped");
    }

    if report.pacing.render_failures > 0 {
        error!(
            "LED: {} animation(s) dropped",
            report.pacing.render_failures
        );
    } else if report.pacing.busy_ms > 0 {
        debug!("LED: busy for {} ms", report.pacing.busy_ms);
    }
}

/// NFC Timer Task - Embassy Task
///
/// Dieser Task übernimmt die Hardware-Initialisierung und ruft dann
/// die testbare `nfc_timer_logic()` Funktion auf.
///
/// # Parameter
/// - `i2c0`, `sda`, `scl`: I2C Peripheral und Pins für den PN532
/// - `led_pin`: GPIO für die LED-Datenleitung
/// - `rmt_peripheral`: RMT Peripheral für präzises Timing
#[embassy_executor::task]
pub async fn nfc_timer_task(
    i2c0: esp_hal::peripherals::I2C0<'static>,
    sda: esp_hal::peripherals::GPIO6<'static>,
    scl: esp_hal::peripherals::GPIO7<'static>,
    led_pin: esp_hal::peripherals::GPIO4<'static>,
    rmt_peripheral: esp_hal::peripherals::RMT<'static>,
) {
    info!(
        "NFC: PN532 on SDA=GPIO{} SCL=GPIO{}, LED strip on GPIO{}",
        NFC_SDA_PIN, NFC_SCL_PIN, LED_GPIO_PIN
    );

    let i2c_config = I2cConfig::default().with_frequency(Rate::from_khz(I2C_FREQUENCY_KHZ));
    let i2c = match I2c::new(i2c0, i2c_config) {
        Ok(i2c) => i2c.with_sda(sda).with_scl(scl),
        Err(e) => {
            error!("I2C: Invalid configuration: {}", Debug2Format(&e));
            return;
        }
    };

    let mut reader = Pn532::new(i2c, Delay::new());
    match reader.init() {
        Ok(firmware) => info!("NFC: {}", firmware),
        Err(e) => {
            error!("NFC: Connection error: {}", e);
            return;
        }
    }

    // Buffer für SmartLED Daten erstellen (ganzer Strip)
    // Macro allokiert Speicher im richtigen Format für RMT
    let mut rmt_buffer = smart_led_buffer!(LED_COUNT);

    // Hardware initialisieren: RmtLedWriter kapselt RMT + SmartLED
    let led = match RmtLedWriter::new(
        led_pin,
        rmt_peripheral,
        RMT_CLOCK_MHZ,
        &mut rmt_buffer,
        LED_BRIGHTNESS,
    ) {
        Ok(led) => led,
        Err(e) => {
            error!("LED: Failed to initialize RMT: {}", e);
            return;
        }
    };

    info!("NFC: Waiting for cards");
    nfc_timer_logic(reader, led).await
}
