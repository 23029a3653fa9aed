//! Pure Business Logic Functions
//!
//! Farb-Hilfsfunktionen ohne Hardware-Dependencies (testbar!)

use rgb::RGB8;

/// Dimmt eine Farbe linear: Kanal × level / 255
///
/// # Beispiele
///
/// ```
/// # use rgb::RGB8;
/// # use esp_core::dim;
/// let color = RGB8 { r: 255, g: 100, b: 0 };
/// assert_eq!(dim(color, 255), color);
/// assert_eq!(dim(color, 0), RGB8 { r: 0, g: 0, b: 0 });
/// ```
pub fn dim(color: RGB8, level: u8) -> RGB8 {
    let scale = |c: u8| ((c as u16 * level as u16) / 255) as u8;
    RGB8 {
        r: scale(color.r),
        g: scale(color.g),
        b: scale(color.b),
    }
}

/// Globale Helligkeit wie beim WS2812-Treiber: Kanal × (1 + brightness) >> 8
///
/// Brightness 255 lässt die Farbe unverändert.
pub fn scale_brightness(color: RGB8, brightness: u8) -> RGB8 {
    let scale = |c: u8| ((c as u16 * (1 + brightness as u16)) >> 8) as u8;
    RGB8 {
        r: scale(color.r),
        g: scale(color.g),
        b: scale(color.b),
    }
}

/// Helligkeit der Unschärfe neben einer Welle
///
/// Lineare Abbildung von Abstand 1..=width auf 180..=10 (ganzzahlig).
pub fn blur_level(distance: usize, width: usize) -> u8 {
    const NEAR: i32 = 180;
    const FAR: i32 = 10;
    if width <= 1 {
        return NEAR as u8;
    }
    let d = distance.clamp(1, width) as i32;
    ((d - 1) * (FAR - NEAR) / (width as i32 - 1) + NEAR) as u8
}

/// Kanalweises Maximum zweier Farben (für überlappende Animationen)
pub fn brightest(a: RGB8, b: RGB8) -> RGB8 {
    RGB8 {
        r: a.r.max(b.r),
        g: a.g.max(b.g),
        b: a.b.max(b.b),
    }
}
