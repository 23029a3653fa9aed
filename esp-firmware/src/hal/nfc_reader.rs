// PN532 NFC-Reader über I2C
//
// Dünner Adapter um das pn532 Crate: Framing, ACK und Status-Polling liegen
// dort, hier nur die MIFARE-Requests und das Mapping auf den TagReader-Trait.
// Retry-Logik für Blockzugriffe liegt im Tag Scanner.

use core::convert::Infallible;
use core::time::Duration;

use embassy_time::Instant;
use esp_hal::Blocking;
use esp_hal::delay::Delay;
use esp_hal::i2c::master::I2c;
use pn532::i2c::I2CInterface;
use pn532::requests::{Command, SAMMode};
use pn532::{CountDown, Error as Pn532Error, Request};

use esp_core::mifare::{exchange_ok, first_block, parse_read, parse_target};
use esp_core::{BLOCK_SIZE, MIFARE_AUTH_A, MIFARE_READ, NfcError, TagId, TagReader};

use crate::config::NFC_COMMAND_TIMEOUT_MS;

/// Erster (und einziger) selektierter Tag
const TARGET_NUMBER: u8 = 0x01;

/// Timeout beim erneuten Selektieren eines Tags in ms
const RESELECT_TIMEOUT_MS: u64 = 30;

/// Antwort-Längen (ohne TFI und Kommando-Code)
const FIRMWARE_RESPONSE_LEN: usize = 4;
const TARGET_RESPONSE_LEN: usize = 6 + 7;
const STATUS_RESPONSE_LEN: usize = 1;
const READ_RESPONSE_LEN: usize = 1 + BLOCK_SIZE;

/// Firmware-Version des Readers
#[derive(Debug, Clone, Copy, defmt::Format)]
pub struct FirmwareVersion {
    pub ic: u8,
    pub version: u8,
    pub revision: u8,
}

/// Countdown für das pn532 Crate auf Basis der Embassy-Zeitbasis
pub struct EmbassyCountDown {
    deadline: Instant,
}

impl EmbassyCountDown {
    pub fn new() -> Self {
        Self {
            deadline: Instant::now(),
        }
    }
}

impl Default for EmbassyCountDown {
    fn default() -> Self {
        Self::new()
    }
}

impl CountDown for EmbassyCountDown {
    type Time = Duration;

    fn start<T>(&mut self, count: T)
    where
        T: Into<Self::Time>,
    {
        let ms = count.into().as_millis() as u64;
        self.deadline = Instant::now() + embassy_time::Duration::from_millis(ms);
    }

    fn wait(&mut self) -> nb::Result<(), Infallible> {
        if Instant::now() >= self.deadline {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

type Driver<'d> = pn532::Pn532<I2CInterface<I2c<'d, Blocking>>, EmbassyCountDown>;

/// PN532 Reader (blockierend)
pub struct Pn532<'d> {
    driver: Driver<'d>,
    delay: Delay,
    /// Tag muss vor dem nächsten Datenzugriff neu selektiert werden
    /// (z.B. nach fehlgeschlagener Authentifizierung)
    needs_reselect: bool,
}

impl<'d> Pn532<'d> {
    pub fn new(i2c: I2c<'d, Blocking>, delay: Delay) -> Self {
        Self {
            driver: pn532::Pn532::new(I2CInterface { i2c }, EmbassyCountDown::new()),
            delay,
            needs_reselect: false,
        }
    }

    /// Prüft die Verbindung und konfiguriert das SAM (Normal Mode)
    pub fn init(&mut self) -> Result<FirmwareVersion, NfcError> {
        let firmware = self
            .driver
            .process(
                &Request::GET_FIRMWARE_VERSION,
                FIRMWARE_RESPONSE_LEN,
                command_timeout(),
            )
            .map_err(nfc_error)
            .and_then(|response| match *response {
                [ic, version, revision, ..] => Ok(FirmwareVersion {
                    ic,
                    version,
                    revision,
                }),
                _ => Err(NfcError::Protocol),
            })?;

        self.driver
            .process(
                &Request::sam_configuration(SAMMode::Normal, false),
                0,
                command_timeout(),
            )
            .map_err(nfc_error)?;
        Ok(firmware)
    }

    fn list_target(&mut self, timeout_ms: u64) -> Option<TagId> {
        let tag = self
            .driver
            .process(
                &Request::INLIST_ONE_ISO_A_TARGET,
                TARGET_RESPONSE_LEN,
                Duration::from_millis(timeout_ms),
            )
            .ok()
            .and_then(parse_target)?;
        self.needs_reselect = false;
        Some(tag)
    }

    /// InDataExchange, nur das Status-Byte der Antwort zählt
    fn exchange_status<const N: usize>(&mut self, request: &Request<N>) -> bool {
        self.driver
            .process(request, STATUS_RESPONSE_LEN, command_timeout())
            .is_ok_and(exchange_ok)
    }
}

impl TagReader for Pn532<'_> {
    fn try_read_tag(&mut self, timeout_ms: u16) -> Option<TagId> {
        self.list_target(timeout_ms as u64)
    }

    fn authenticate_sector(&mut self, tag: &TagId, sector: u8, key: &[u8; 6]) -> bool {
        let Some(block) = first_block(sector) else {
            return false;
        };

        let uid = tag.as_bytes();
        let ok = match uid.len() {
            4 => self.exchange_status(&auth_request::<13>(block, key, uid)),
            5 => self.exchange_status(&auth_request::<14>(block, key, uid)),
            6 => self.exchange_status(&auth_request::<15>(block, key, uid)),
            7 => self.exchange_status(&auth_request::<16>(block, key, uid)),
            _ => false,
        };
        // Fehlgeschlagene Auth setzt den Tag in HALT
        self.needs_reselect = !ok;
        ok
    }

    fn read_block(&mut self, block: u8) -> Result<[u8; BLOCK_SIZE], NfcError> {
        if self.needs_reselect && self.list_target(RESELECT_TIMEOUT_MS).is_none() {
            return Err(NfcError::NoTarget);
        }

        let request = Request::new(Command::InDataExchange, [TARGET_NUMBER, MIFARE_READ, block]);
        let result = self
            .driver
            .process(&request, READ_RESPONSE_LEN, command_timeout())
            .map_err(nfc_error)
            .and_then(parse_read);
        if result.is_err() {
            self.needs_reselect = true;
        }
        result
    }

    fn backoff(&mut self, ms: u32) {
        self.delay.delay_millis(ms);
    }
}

/// MIFARE Auth A: Tg, 0x60, Block, Key (6), UID (N - 9 Bytes)
fn auth_request<const N: usize>(block: u8, key: &[u8; 6], uid: &[u8]) -> Request<N> {
    let mut data = [0u8; N];
    data[0] = TARGET_NUMBER;
    data[1] = MIFARE_AUTH_A;
    data[2] = block;
    data[3..9].copy_from_slice(key);
    data[9..].copy_from_slice(uid);
    Request::new(Command::InDataExchange, data)
}

fn command_timeout() -> Duration {
    Duration::from_millis(NFC_COMMAND_TIMEOUT_MS)
}

fn nfc_error<E>(err: Pn532Error<E>) -> NfcError {
    match err {
        Pn532Error::TimeoutAck | Pn532Error::TimeoutResponse => NfcError::Timeout,
        Pn532Error::InterfaceError(_) => NfcError::Bus,
        _ => NfcError::Protocol,
    }
}
