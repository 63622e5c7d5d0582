use super::surface::{Bitmap, SurfaceSource, DARK, LIGHT};
use crate::core::config::RenderConfig;
use log::{trace, warn};
use png::{BitDepth, ColorType, Encoder};
use qrcode::{Color, QrCode};
use serde::Serialize;

/// Light modules kept around the code so scanners can find its edges.
const QUIET_ZONE: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenderOutcome {
    Rendered {
        modules: usize,
        scale: usize,
        dark_pixels: usize,
        light_pixels: usize,
    },
    /// The code was drawn but the surface came out (nearly) empty; a
    /// bordered fallback panel was drawn instead.
    Blank { dark_pixels: usize, message: String },
    /// The payload could not be encoded; a crossed-out error panel was drawn.
    EncodeFailed { message: String },
    /// The surface never became drawable. Nothing was drawn.
    SurfaceUnavailable { attempts: u32 },
}

impl RenderOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }

    pub fn status(&self) -> &'static str {
        match self {
            Self::Rendered { .. } => "rendered",
            Self::Blank { .. } => "blank",
            Self::EncodeFailed { .. } => "encode_failed",
            Self::SurfaceUnavailable { .. } => "surface_unavailable",
        }
    }

    pub fn diagnostic(&self) -> Option<String> {
        match self {
            Self::Rendered { .. } => None,
            Self::Blank { message, .. } | Self::EncodeFailed { message } => Some(message.clone()),
            Self::SurfaceUnavailable { attempts } => {
                Some(format!("Surface not ready after {attempts} attempts"))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct QrRenderer {
    config: RenderConfig,
}

impl QrRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Draws `payload` as a QR code onto `surface` and checks the result.
    ///
    /// Failures never escape as errors: they are drawn in place as a
    /// diagnostic panel and reported through the outcome.
    pub fn render(&self, surface: &mut Bitmap, payload: &str) -> RenderOutcome {
        surface.clear(LIGHT);

        let code = match QrCode::with_error_correction_level(
            payload.as_bytes(),
            self.config.error_correction,
        ) {
            Ok(code) => code,
            Err(e) => {
                let message = format!("QR encoding failed: {e}");
                warn!("{message} ({} bytes)", payload.len());
                draw_error_panel(surface);
                return RenderOutcome::EncodeFailed { message };
            }
        };

        let modules = code.width();
        let span = modules + 2 * QUIET_ZONE;
        let width = surface.width() as usize;
        let height = surface.height() as usize;
        let scale = width.min(height) / span;

        if scale > 0 {
            let origin_x = (width - span * scale) / 2 + QUIET_ZONE * scale;
            let origin_y = (height - span * scale) / 2 + QUIET_ZONE * scale;
            for (i, color) in code.to_colors().iter().enumerate() {
                if *color != Color::Dark {
                    continue;
                }
                let x = origin_x + (i % modules) * scale;
                let y = origin_y + (i / modules) * scale;
                surface.fill_rect(x as u32, y as u32, scale as u32, scale as u32, DARK);
            }
        }

        let (dark_pixels, light_pixels) = surface.tally();
        if dark_pixels < self.config.blank_threshold {
            let message = format!(
                "QR code did not render: {dark_pixels} dark pixels for {modules}x{modules} modules on a {width}x{height} surface"
            );
            warn!("{message}");
            draw_blank_panel(surface);
            return RenderOutcome::Blank {
                dark_pixels,
                message,
            };
        }

        trace!("QR code rendered: {modules} modules at {scale}px, {dark_pixels} dark pixels");
        RenderOutcome::Rendered {
            modules,
            scale,
            dark_pixels,
            light_pixels,
        }
    }

    /// Polls `source` until it hands out a drawable surface, then renders.
    /// Gives up after the configured number of attempts.
    pub async fn render_when_ready<S>(&self, source: &mut S, payload: &str) -> RenderOutcome
    where
        S: SurfaceSource + ?Sized,
    {
        let attempts = self.config.surface_attempts.max(1);
        for attempt in 1..=attempts {
            if let Some(surface) = source.acquire() {
                trace!("Surface ready on attempt {attempt}");
                return self.render(surface, payload);
            }
            if attempt < attempts {
                tokio::time::sleep(self.config.surface_poll).await;
            }
        }
        warn!("Surface not ready after {attempts} attempts, QR code not drawn");
        RenderOutcome::SurfaceUnavailable { attempts }
    }

    /// Renders onto a fresh `size` x `size` surface.
    pub fn render_to_bitmap(&self, payload: &str, size: u32) -> (Bitmap, RenderOutcome) {
        let mut bitmap = Bitmap::new(size, size);
        let outcome = self.render(&mut bitmap, payload);
        (bitmap, outcome)
    }
}

/// Single border with a bar across the middle.
fn draw_blank_panel(surface: &mut Bitmap) {
    let (w, h) = (surface.width(), surface.height());
    surface.clear(LIGHT);
    let border = (w.min(h) / 32).max(2);
    surface.stroke_rect(0, 0, w, h, border, DARK);
    surface.fill_rect(w / 4, h / 2 - border.min(h / 2), w / 2, border * 2, DARK);
}

/// Double border with both diagonals crossed out.
fn draw_error_panel(surface: &mut Bitmap) {
    let (w, h) = (surface.width(), surface.height());
    surface.clear(LIGHT);
    let border = (w.min(h) / 32).max(2);
    surface.stroke_rect(0, 0, w, h, border, DARK);
    let inset = border * 3;
    if w > inset * 2 && h > inset * 2 {
        surface.stroke_rect(inset, inset, w - inset * 2, h - inset * 2, border / 2 + 1, DARK);
        let pad = inset * 2;
        if w > pad * 2 && h > pad * 2 {
            surface.cross(pad, pad, w - pad * 2, h - pad * 2, border, DARK);
        }
    }
}

/// Encodes the surface as an 8-bit grayscale PNG. The outcome status and any
/// diagnostic text travel in `tEXt` chunks.
pub fn encode_png(bitmap: &Bitmap, outcome: &RenderOutcome) -> Result<Vec<u8>, png::EncodingError> {
    let mut buf = Vec::new();
    {
        let mut encoder = Encoder::new(&mut buf, bitmap.width(), bitmap.height());
        encoder.set_color(ColorType::Grayscale);
        encoder.set_depth(BitDepth::Eight);
        encoder.add_text_chunk("Status".to_string(), outcome.status().to_string())?;
        if let Some(diagnostic) = outcome.diagnostic() {
            encoder.add_text_chunk("Comment".to_string(), diagnostic)?;
        }

        let mut writer = encoder.write_header()?;
        writer.write_image_data(bitmap.pixels())?;
        writer.finish()?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn renderer() -> QrRenderer {
        QrRenderer::new(RenderConfig {
            surface_poll: Duration::from_millis(1),
            surface_attempts: 5,
            ..RenderConfig::default()
        })
    }

    /// Canvas that only becomes drawable after a few polls.
    struct LateSurface {
        polls_until_ready: u32,
        polls: u32,
        bitmap: Bitmap,
    }

    impl SurfaceSource for LateSurface {
        fn acquire(&mut self) -> Option<&mut Bitmap> {
            self.polls += 1;
            if self.polls > self.polls_until_ready {
                Some(&mut self.bitmap)
            } else {
                None
            }
        }
    }

    #[test]
    fn test_render_draws_code_with_quiet_zone() {
        let (bitmap, outcome) = renderer().render_to_bitmap("https://example.com/capture", 256);
        let RenderOutcome::Rendered { modules, scale, dark_pixels, .. } = outcome.clone() else {
            panic!("expected a rendered code, got {outcome:?}");
        };
        assert!(modules >= 21);
        assert!(scale >= 1);
        assert!(dark_pixels > 100);

        // top-left corner is quiet zone, top-left finder pattern is dark
        assert_eq!(bitmap.get(0, 0), Some(LIGHT));
        let span = modules + 2 * QUIET_ZONE;
        let origin = (256 - span * scale) / 2 + QUIET_ZONE * scale;
        assert_eq!(bitmap.get(origin as u32, origin as u32), Some(DARK));
    }

    #[test]
    fn test_render_is_deterministic() {
        let r = renderer();
        let payload = "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:Jane Doe\r\nEND:VCARD";
        let first = r.render_to_bitmap(payload, 300);
        let second = r.render_to_bitmap(payload, 300);
        assert_eq!(first, second);

        let tiny_a = r.render_to_bitmap(payload, 12);
        let tiny_b = r.render_to_bitmap(payload, 12);
        assert_eq!(tiny_a, tiny_b);
    }

    #[test]
    fn test_surface_too_small_draws_fallback_panel() {
        let (bitmap, outcome) = renderer().render_to_bitmap("https://example.com", 20);
        assert!(matches!(outcome, RenderOutcome::Blank { dark_pixels: 0, .. }));
        assert!(outcome.diagnostic().unwrap().contains("did not render"));
        assert_eq!(bitmap.get(0, 0), Some(DARK));
        assert_eq!(bitmap.get(19, 19), Some(DARK));
    }

    #[test]
    fn test_threshold_controls_blank_detection() {
        let strict = QrRenderer::new(RenderConfig {
            blank_threshold: usize::MAX,
            ..RenderConfig::default()
        });
        let (_, outcome) = strict.render_to_bitmap("hello", 128);
        assert_eq!(outcome.status(), "blank");
    }

    #[test]
    fn test_encoding_error_draws_distinct_panel() {
        let payload = "é".repeat(3000);
        let r = renderer();
        let (error_bitmap, outcome) = r.render_to_bitmap(&payload, 128);
        assert!(matches!(outcome, RenderOutcome::EncodeFailed { .. }));
        assert!(outcome.diagnostic().unwrap().starts_with("QR encoding failed"));
        assert_eq!(error_bitmap.get(0, 0), Some(DARK));

        let mut blank_bitmap = Bitmap::new(128, 128);
        draw_blank_panel(&mut blank_bitmap);
        assert_ne!(error_bitmap, blank_bitmap);
    }

    #[tokio::test]
    async fn test_waits_for_surface_to_attach() {
        let r = renderer();
        let mut late = LateSurface {
            polls_until_ready: 3,
            polls: 0,
            bitmap: Bitmap::new(200, 200),
        };
        let outcome = r.render_when_ready(&mut late, "https://example.com").await;
        assert!(outcome.is_rendered());
        assert_eq!(late.polls, 4);
    }

    #[tokio::test]
    async fn test_gives_up_when_surface_never_attaches() {
        let r = renderer();
        let mut detached = Bitmap::new(0, 0);
        let outcome = r.render_when_ready(&mut detached, "https://example.com").await;
        assert_eq!(outcome, RenderOutcome::SurfaceUnavailable { attempts: 5 });
    }

    #[test]
    fn test_png_export() {
        let r = renderer();
        let (bitmap, outcome) = r.render_to_bitmap("https://example.com", 128);
        let png_bytes = encode_png(&bitmap, &outcome).unwrap();
        assert_eq!(&png_bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

        let decoder = png::Decoder::new(std::io::Cursor::new(png_bytes));
        let reader = decoder.read_info().unwrap();
        let info = reader.info();
        assert_eq!((info.width, info.height), (128, 128));
        assert!(info
            .uncompressed_latin1_text
            .iter()
            .any(|chunk| chunk.keyword == "Status" && chunk.text == "rendered"));
    }
}
