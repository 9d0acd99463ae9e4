//! Drawing surfaces the simulation renders into.

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }

    pub const fn halve(self) -> Rgb {
        Rgb(self.0 / 2, self.1 / 2, self.2 / 2)
    }
}

// ── Surface ─────────────────────────────────────────────────────────────────

/// A pixel grid addressed from the top-left corner.
///
/// Writes outside the grid are ignored so callers can draw shapes that are
/// partially off screen.
pub trait Surface {
    fn size(&self) -> (usize, usize);

    fn set(&mut self, x: i32, y: i32, c: Rgb);

    fn get(&self, x: i32, y: i32) -> Option<Rgb>;

    /// A surface with no pixels is not attached yet; nothing should be drawn.
    fn is_ready(&self) -> bool {
        let (w, h) = self.size();
        w > 0 && h > 0
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, c: Rgb) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set(cx + dx, cy + dy, c);
                }
            }
        }
    }
}

// ── Pixel buffer ────────────────────────────────────────────────────────────

/// In-memory surface; the terminal host presents it with half blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuf {
    w: usize,
    h: usize,
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub const CLEAR: Rgb = Rgb(0, 0, 0);

    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![Self::CLEAR; w * h],
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.clear();
        self.px.resize(w * h, Self::CLEAR);
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.px
    }

    /// Number of pixels equal to `c`.
    pub fn count(&self, c: Rgb) -> usize {
        self.px.iter().filter(|&&p| p == c).count()
    }
}

impl Surface for PixelBuf {
    fn size(&self) -> (usize, usize) {
        (self.w, self.h)
    }

    fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    fn get(&self, x: i32, y: i32) -> Option<Rgb> {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            Some(self.px[y as usize * self.w + x as usize])
        } else {
            None
        }
    }
}

// ── 3x5 bitmap glyphs ───────────────────────────────────────────────────────

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

#[rustfmt::skip]
fn letter(ch: char) -> Option<[u8; 15]> {
    Some(match ch {
        'A' => [0,1,0, 1,0,1, 1,1,1, 1,0,1, 1,0,1],
        'B' => [1,1,0, 1,0,1, 1,1,0, 1,0,1, 1,1,0],
        'E' => [1,1,1, 1,0,0, 1,1,0, 1,0,0, 1,1,1],
        'F' => [1,1,1, 1,0,0, 1,1,0, 1,0,0, 1,0,0],
        'G' => [0,1,1, 1,0,0, 1,0,1, 1,0,1, 0,1,1],
        'L' => [1,0,0, 1,0,0, 1,0,0, 1,0,0, 1,1,1],
        'M' => [1,0,1, 1,1,1, 1,1,1, 1,0,1, 1,0,1],
        'O' => [0,1,0, 1,0,1, 1,0,1, 1,0,1, 0,1,0],
        'P' => [1,1,0, 1,0,1, 1,1,0, 1,0,0, 1,0,0],
        'R' => [1,1,0, 1,0,1, 1,1,0, 1,0,1, 1,0,1],
        'S' => [0,1,1, 1,0,0, 0,1,0, 0,0,1, 1,1,0],
        'T' => [1,1,1, 0,1,0, 0,1,0, 0,1,0, 0,1,0],
        'V' => [1,0,1, 1,0,1, 1,0,1, 1,0,1, 0,1,0],
        'Y' => [1,0,1, 1,0,1, 0,1,0, 0,1,0, 0,1,0],
        _ => return None,
    })
}

fn glyph(ch: char) -> Option<[u8; 15]> {
    match ch.to_digit(10) {
        Some(d) => Some(DIGITS[d as usize]),
        None => letter(ch.to_ascii_uppercase()),
    }
}

/// Width in pixels of `text` at `scale`: 3 columns per glyph plus 1 spacing.
pub fn text_width(text: &str, scale: i32) -> i32 {
    let n = text.chars().count() as i32;
    (n * 4 - 1).max(0) * scale
}

/// Draws `text` centered on `cx`, each glyph cell `scale` pixels square,
/// with a one-cell drop shadow. Unknown characters render as blanks.
pub fn draw_text<S: Surface + ?Sized>(
    buf: &mut S,
    cx: i32,
    y: i32,
    text: &str,
    scale: i32,
    fg: Rgb,
    shadow: Rgb,
) {
    let scale = scale.max(1);
    let start_x = cx - text_width(text, scale) / 2;
    for (i, ch) in text.chars().enumerate() {
        let Some(g) = glyph(ch) else { continue };
        let gx = start_x + i as i32 * 4 * scale;
        for (pass, off) in [(shadow, scale), (fg, 0)] {
            for row in 0..5 {
                for col in 0..3 {
                    if g[row * 3 + col] == 1 {
                        buf.fill_rect(
                            gx + col as i32 * scale + off,
                            y + row as i32 * scale + off,
                            scale,
                            scale,
                            pass,
                        );
                    }
                }
            }
        }
    }
}
