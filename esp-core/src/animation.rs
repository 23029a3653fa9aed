//! Animationen für den LED-Strip
//!
//! Reine Frame-Berechnung ohne Timing. Das Abspielen (Frame schreiben,
//! Intervall abwarten) übernimmt der Control-Loop der Firmware.

use heapless::Deque;
use rgb::RGB8;

use crate::logic::{blur_level, brightest, dim};
use crate::traits::{LedError, RenderSurface};
use crate::types::COLOR_OFF;

/// Frame-Intervall der Wellen-Animationen (ms)
pub const WAVE_FRAME_MS: u32 = 50;

/// Frame-Intervall des Identifier-Musters (ms)
pub const IDENTIFIER_FRAME_MS: u32 = 25;

/// Geometrie des Strips: `led_count` LEDs in Reihen zu `row_len` LEDs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StripLayout {
    pub led_count: usize,
    pub row_len: usize,
}

impl StripLayout {
    pub const fn new(led_count: usize, row_len: usize) -> Self {
        Self { led_count, row_len }
    }

    /// Anzahl kompletter Reihen (= Wellen-Segmente)
    pub fn rows(&self) -> usize {
        if self.row_len == 0 {
            0
        } else {
            self.led_count / self.row_len
        }
    }
}

/// Eine Ausgabe auf dem Strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Animation {
    Solid(RGB8),
    /// Ein Segment wandert mit weicher Kante über den Strip
    Wave(RGB8),
    /// Zwei gespiegelte Wellen laufen zur Mitte und wieder zurück
    BiDirectionalWave(RGB8),
    /// Basisfarbe, eine Reihe in Identifier-Farbe läuft hin und zurück
    IdentifierPattern { base: RGB8, identifier: RGB8 },
    Clear,
}

impl Animation {
    pub fn frame_count(&self, layout: &StripLayout) -> usize {
        let rows = layout.rows();
        match self {
            Self::Solid(_) | Self::Clear => 1,
            Self::Wave(_) => rows.max(1),
            Self::BiDirectionalWave(_) => 2 * (rows / 2).max(1),
            Self::IdentifierPattern { .. } => 2 * rows.max(1),
        }
    }

    pub fn frame_interval_ms(&self) -> u32 {
        match self {
            Self::Solid(_) | Self::Clear => 0,
            Self::Wave(_) | Self::BiDirectionalWave(_) => WAVE_FRAME_MS,
            Self::IdentifierPattern { .. } => IDENTIFIER_FRAME_MS,
        }
    }

    /// Gesamte Abspieldauer in ms
    pub fn duration_ms(&self, layout: &StripLayout) -> u32 {
        self.frame_count(layout) as u32 * self.frame_interval_ms()
    }

    /// Berechnet Frame `frame` in `pixels`
    ///
    /// `pixels` sollte `layout.led_count` lang sein; überzählige LEDs werden
    /// ignoriert, fehlende nicht beschrieben.
    pub fn render_frame(&self, frame: usize, layout: &StripLayout, pixels: &mut [RGB8]) {
        let len = pixels.len().min(layout.led_count);
        let pixels = &mut pixels[..len];

        match *self {
            Self::Solid(color) => pixels.fill(color),
            Self::Clear => pixels.fill(COLOR_OFF),
            Self::Wave(color) => {
                pixels.fill(COLOR_OFF);
                paint_wave(pixels, frame, layout.row_len, color);
            }
            Self::BiDirectionalWave(color) => {
                pixels.fill(COLOR_OFF);
                let half = (layout.rows() / 2).max(1);
                // Hin bis zur Mitte, dann zurück
                let step = if frame < half { frame } else { 2 * half - 1 - frame.min(2 * half - 1) };
                let mirrored = layout.rows().saturating_sub(1).saturating_sub(step);
                paint_wave(pixels, step, layout.row_len, color);
                paint_wave(pixels, mirrored, layout.row_len, color);
            }
            Self::IdentifierPattern { base, identifier } => {
                pixels.fill(base);
                let rows = layout.rows();
                if rows == 0 {
                    return;
                }
                let row = if frame < rows { frame } else { (2 * rows - 1).saturating_sub(frame) };
                let start = row * layout.row_len;
                let end = (start + layout.row_len).min(len);
                if start < end {
                    pixels[start..end].fill(identifier);
                }
            }
        }
    }
}

/// Zeichnet ein Wellen-Segment mit Unschärfe davor und dahinter
fn paint_wave(pixels: &mut [RGB8], segment: usize, width: usize, color: RGB8) {
    if width == 0 {
        return;
    }
    let start = segment * width;
    let mut put = |idx: usize, value: RGB8| {
        if let Some(px) = pixels.get_mut(idx) {
            *px = brightest(*px, value);
        }
    };

    for i in 0..width {
        put(start + i, color);
    }
    for distance in 1..=width {
        let faded = dim(color, blur_level(distance, width));
        if let Some(before) = start.checked_sub(distance) {
            put(before, faded);
        }
        put(start + width - 1 + distance, faded);
    }
}

/// Bounded Queue von Animationen - implementiert `RenderSurface`
///
/// Die Timer-Logik reiht Animationen ein, der Control-Loop spielt sie ab.
pub struct AnimationQueue<const N: usize> {
    layout: StripLayout,
    queue: Deque<Animation, N>,
}

impl<const N: usize> AnimationQueue<N> {
    pub const fn new(layout: StripLayout) -> Self {
        Self {
            layout,
            queue: Deque::new(),
        }
    }

    pub fn layout(&self) -> &StripLayout {
        &self.layout
    }

    /// Nächste abzuspielende Animation
    pub fn pop(&mut self) -> Option<Animation> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Summe der Abspieldauer aller wartenden Animationen
    pub fn pending_ms(&self) -> u32 {
        self.queue
            .iter()
            .map(|animation| animation.duration_ms(&self.layout))
            .sum()
    }

    fn enqueue(&mut self, animation: Animation) -> Result<u32, LedError> {
        let duration = animation.duration_ms(&self.layout);
        self.queue
            .push_back(animation)
            .map_err(|_| LedError::QueueFull)?;
        Ok(duration)
    }
}

impl<const N: usize> RenderSurface for AnimationQueue<N> {
    fn show_solid(&mut self, color: RGB8) -> Result<u32, LedError> {
        self.enqueue(Animation::Solid(color))
    }

    fn show_wave(&mut self, color: RGB8) -> Result<u32, LedError> {
        self.enqueue(Animation::Wave(color))
    }

    fn show_bi_directional_wave(&mut self, color: RGB8) -> Result<u32, LedError> {
        self.enqueue(Animation::BiDirectionalWave(color))
    }

    fn show_identifier_pattern(&mut self, base: RGB8, identifier: RGB8) -> Result<u32, LedError> {
        self.enqueue(Animation::IdentifierPattern { base, identifier })
    }

    fn clear(&mut self) -> Result<u32, LedError> {
        self.enqueue(Animation::Clear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: StripLayout = StripLayout::new(64, 8);
    const RED: RGB8 = RGB8 { r: 255, g: 0, b: 0 };
    const BLUE: RGB8 = RGB8 { r: 0, g: 0, b: 255 };

    #[test]
    fn test_frame_counts_and_durations() {
        assert_eq!(Animation::Solid(RED).duration_ms(&LAYOUT), 0);
        assert_eq!(Animation::Wave(RED).frame_count(&LAYOUT), 8);
        assert_eq!(Animation::Wave(RED).duration_ms(&LAYOUT), 400);
        assert_eq!(Animation::BiDirectionalWave(RED).frame_count(&LAYOUT), 8);
        let pattern = Animation::IdentifierPattern {
            base: RED,
            identifier: BLUE,
        };
        assert_eq!(pattern.frame_count(&LAYOUT), 16);
        assert_eq!(pattern.duration_ms(&LAYOUT), 400);
    }

    #[test]
    fn test_wave_first_frame() {
        let mut pixels = [COLOR_OFF; 64];
        Animation::Wave(RED).render_frame(0, &LAYOUT, &mut pixels);

        assert!(pixels[..8].iter().all(|&p| p == RED));
        // Unschärfe danach: 180 → 10
        assert_eq!(pixels[8], RGB8 { r: 180, g: 0, b: 0 });
        assert_eq!(pixels[15], RGB8 { r: 10, g: 0, b: 0 });
        assert!(pixels[16..].iter().all(|&p| p == COLOR_OFF));
    }

    #[test]
    fn test_wave_middle_frame_blurs_both_sides() {
        let mut pixels = [COLOR_OFF; 64];
        Animation::Wave(RED).render_frame(3, &LAYOUT, &mut pixels);

        assert!(pixels[24..32].iter().all(|&p| p == RED));
        assert_eq!(pixels[23], RGB8 { r: 180, g: 0, b: 0 });
        assert_eq!(pixels[16], RGB8 { r: 10, g: 0, b: 0 });
        assert_eq!(pixels[32], RGB8 { r: 180, g: 0, b: 0 });
        assert_eq!(pixels[15], COLOR_OFF);
    }

    #[test]
    fn test_bi_directional_wave_is_mirrored() {
        let mut pixels = [COLOR_OFF; 64];
        Animation::BiDirectionalWave(RED).render_frame(0, &LAYOUT, &mut pixels);

        assert!(pixels[..8].iter().all(|&p| p == RED));
        assert!(pixels[56..].iter().all(|&p| p == RED));
        for i in 0..64 {
            assert_eq!(pixels[i], pixels[63 - i]);
        }
    }

    #[test]
    fn test_bi_directional_wave_returns() {
        let mut first = [COLOR_OFF; 64];
        let mut last = [COLOR_OFF; 64];
        let anim = Animation::BiDirectionalWave(RED);
        anim.render_frame(0, &LAYOUT, &mut first);
        anim.render_frame(anim.frame_count(&LAYOUT) - 1, &LAYOUT, &mut last);
        assert_eq!(first, last);
    }

    #[test]
    fn test_identifier_pattern_sweeps_rows() {
        let anim = Animation::IdentifierPattern {
            base: RED,
            identifier: BLUE,
        };
        let mut pixels = [COLOR_OFF; 64];

        anim.render_frame(2, &LAYOUT, &mut pixels);
        assert!(pixels[16..24].iter().all(|&p| p == BLUE));
        assert!(pixels[..16].iter().all(|&p| p == RED));

        // Rückweg: Frame 8 ist wieder die letzte Reihe
        anim.render_frame(8, &LAYOUT, &mut pixels);
        assert!(pixels[56..].iter().all(|&p| p == BLUE));

        anim.render_frame(15, &LAYOUT, &mut pixels);
        assert!(pixels[..8].iter().all(|&p| p == BLUE));
    }

    #[test]
    fn test_queue_reports_duration_and_order() {
        let mut queue: AnimationQueue<4> = AnimationQueue::new(LAYOUT);
        assert_eq!(queue.show_wave(RED), Ok(400));
        assert_eq!(queue.show_solid(BLUE), Ok(0));
        assert_eq!(queue.pending_ms(), 400);

        assert_eq!(queue.pop(), Some(Animation::Wave(RED)));
        assert_eq!(queue.pop(), Some(Animation::Solid(BLUE)));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_full() {
        let mut queue: AnimationQueue<2> = AnimationQueue::new(LAYOUT);
        queue.clear().unwrap();
        queue.clear().unwrap();
        assert_eq!(queue.show_solid(RED), Err(LedError::QueueFull));
        assert_eq!(queue.len(), 2);
    }
}
