//! Grayscale pixel surface the QR renderer draws onto.

pub const LIGHT: u8 = 255;
pub const DARK: u8 = 0;

/// Pixels darker than this count as dark when sampling a render.
const DARK_CUTOFF: u8 = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![LIGHT; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// A zero-sized surface has not been laid out yet and cannot be drawn on.
    pub fn is_attached(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn clear(&mut self, value: u8) {
        self.pixels.fill(value);
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Fills a rectangle, clipped to the surface.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, value: u8) {
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);
        if x >= x_end {
            return;
        }
        let stride = self.width as usize;
        for row in y..y_end {
            let start = row as usize * stride;
            self.pixels[start + x as usize..start + x_end as usize].fill(value);
        }
    }

    pub fn stroke_rect(&mut self, x: u32, y: u32, w: u32, h: u32, thickness: u32, value: u8) {
        if w == 0 || h == 0 {
            return;
        }
        let t = thickness.min(w).min(h);
        self.fill_rect(x, y, w, t, value);
        self.fill_rect(x, (y + h).saturating_sub(t), w, t, value);
        self.fill_rect(x, y, t, h, value);
        self.fill_rect((x + w).saturating_sub(t), y, t, h, value);
    }

    /// Draws both diagonals of the rectangle with square pens of `thickness`.
    pub fn cross(&mut self, x: u32, y: u32, w: u32, h: u32, thickness: u32, value: u8) {
        let steps = w.max(h);
        if steps == 0 {
            return;
        }
        for i in 0..steps {
            let dx = (u64::from(i) * u64::from(w) / u64::from(steps)) as u32;
            let dy = (u64::from(i) * u64::from(h) / u64::from(steps)) as u32;
            self.fill_rect(x + dx, y + dy, thickness, thickness, value);
            self.fill_rect(
                (x + w).saturating_sub(dx + thickness),
                y + dy,
                thickness,
                thickness,
                value,
            );
        }
    }

    /// Returns `(dark, light)` pixel counts.
    pub fn tally(&self) -> (usize, usize) {
        let dark = self.pixels.iter().filter(|p| **p < DARK_CUTOFF).count();
        (dark, self.pixels.len() - dark)
    }
}

/// Something that may or may not have a drawable surface right now, such as
/// a canvas that is still being laid out.
pub trait SurfaceSource {
    fn acquire(&mut self) -> Option<&mut Bitmap>;
}

impl SurfaceSource for Bitmap {
    fn acquire(&mut self) -> Option<&mut Bitmap> {
        if self.is_attached() {
            Some(self)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_clips() {
        let mut bmp = Bitmap::new(10, 10);
        bmp.fill_rect(8, 8, 5, 5, DARK);
        assert_eq!(bmp.tally(), (4, 96));
        assert_eq!(bmp.get(9, 9), Some(DARK));
        assert_eq!(bmp.get(10, 9), None);
    }

    #[test]
    fn test_stroke_rect_draws_border_only() {
        let mut bmp = Bitmap::new(20, 20);
        bmp.stroke_rect(0, 0, 20, 20, 2, DARK);
        assert_eq!(bmp.get(0, 0), Some(DARK));
        assert_eq!(bmp.get(19, 10), Some(DARK));
        assert_eq!(bmp.get(10, 10), Some(LIGHT));
        assert_eq!(bmp.tally().0, 400 - 16 * 16);
    }

    #[test]
    fn test_zero_sized_surface_is_not_attached() {
        let mut bmp = Bitmap::new(0, 0);
        assert!(bmp.acquire().is_none());
        let mut ready = Bitmap::new(4, 4);
        assert!(ready.acquire().is_some());
    }
}
