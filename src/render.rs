//! Paints a simulation snapshot onto a [`Surface`].
//!
//! Everything is laid out in field coordinates and scaled to whatever pixel
//! size the surface has, so the same scene renders into a full 360x600
//! canvas or a small terminal buffer.

use crate::config::SimConfig;
use crate::sim::{Bird, Obstacle, Phase};
use crate::surface::{Rgb, Surface, draw_text};

const SKY_TOP: Rgb = Rgb(219, 234, 254);
const SKY_BOT: Rgb = Rgb(96, 165, 250);
const CLOUD: Rgb = Rgb(255, 255, 255);
const PIPE: Rgb = Rgb(37, 99, 235);
const PIPE_LIP: Rgb = Rgb(59, 130, 246);
const BIRD: Rgb = Rgb(37, 99, 235);
const BIRD_RIM: Rgb = Rgb(255, 255, 255);
const BIRD_EYE: Rgb = Rgb(255, 255, 255);
const BIRD_PUPIL: Rgb = Rgb(37, 99, 235);
const BIRD_BEAK: Rgb = Rgb(251, 191, 36);
const WHITE: Rgb = Rgb(255, 255, 255);
const INK: Rgb = Rgb(30, 64, 175);
const PANEL: Rgb = Rgb(254, 243, 199);
const PANEL_EDGE: Rgb = Rgb(30, 58, 138);

/// Height of the lighter lip drawn at each gap edge.
const LIP_H: f64 = 16.0;

/// Radians of tilt per pixel/tick of vertical velocity.
const TILT_PER_VELOCITY: f64 = 0.08;
/// Nose-up limit (about 25 degrees).
pub const MAX_UP_TILT: f64 = -0.44;
/// Nose-down limit (about 70 degrees).
pub const MAX_DOWN_TILT: f64 = 1.22;

/// Borrowed view of everything a frame shows.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub config: &'a SimConfig,
    pub bird: Bird,
    pub obstacles: &'a [Obstacle],
    pub score: u32,
    pub best: u32,
    pub phase: Phase,
    pub frame: u64,
}

/// Bird rotation in radians for a given velocity; positive is nose down.
pub fn bird_tilt(velocity: f64) -> f64 {
    (velocity * TILT_PER_VELOCITY).clamp(MAX_UP_TILT, MAX_DOWN_TILT)
}

/// Field-to-pixel mapping.
struct Painter {
    sx: f64,
    sy: f64,
}

impl Painter {
    fn x(&self, fx: f64) -> i32 {
        (fx * self.sx).round() as i32
    }

    fn y(&self, fy: f64) -> i32 {
        (fy * self.sy).round() as i32
    }

    fn len(&self, f: f64) -> i32 {
        (f * self.sx.min(self.sy)).round().max(1.0) as i32
    }

    fn rect<S: Surface + ?Sized>(&self, buf: &mut S, x: f64, y: f64, w: f64, h: f64, c: Rgb) {
        let (x0, y0) = (self.x(x), self.y(y));
        let (x1, y1) = (self.x(x + w), self.y(y + h));
        buf.fill_rect(x0, y0, x1 - x0, y1 - y0, c);
    }

    /// Glyph cell size for text roughly `cell` field pixels per cell.
    fn text_scale(&self, cell: f64) -> i32 {
        (cell * self.sy).round().max(1.0) as i32
    }
}

pub fn draw<S: Surface + ?Sized>(scene: &Scene<'_>, buf: &mut S) {
    let (w, h) = buf.size();
    if w == 0 || h == 0 {
        return;
    }
    let p = Painter {
        sx: w as f64 / scene.config.field_width,
        sy: h as f64 / scene.config.field_height,
    };

    draw_background(buf, w, h);
    draw_clouds(&p, buf);
    draw_obstacles(scene, &p, buf);
    draw_bird(scene, &p, buf);
    draw_score(scene, &p, buf);

    // Overlays go on top of the score.
    match scene.phase {
        Phase::Idle => draw_title(scene, &p, buf),
        Phase::Running => {}
        Phase::Ended => draw_game_over(scene, &p, buf, w, h),
    }
}

fn draw_background<S: Surface + ?Sized>(buf: &mut S, w: usize, h: usize) {
    for y in 0..h {
        let t = ((y * 256) / h.max(1)) as u16;
        let c = Rgb::lerp(SKY_TOP, SKY_BOT, t);
        for x in 0..w {
            buf.set(x as i32, y as i32, c);
        }
    }
}

/// Four faint puffs near the top, blended into whatever is underneath.
fn draw_clouds<S: Surface + ?Sized>(p: &Painter, buf: &mut S) {
    for i in 0..4 {
        let cx = p.x(60.0 + i as f64 * 80.0);
        let cy = p.y(80.0 + (i % 2) as f64 * 30.0);
        let r = p.len(30.0);
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy > r * r {
                    continue;
                }
                if let Some(under) = buf.get(cx + dx, cy + dy) {
                    buf.set(cx + dx, cy + dy, Rgb::lerp(under, CLOUD, 38));
                }
            }
        }
    }
}

fn draw_obstacles<S: Surface + ?Sized>(scene: &Scene<'_>, p: &Painter, buf: &mut S) {
    let cfg = scene.config;
    let pw = cfg.obstacle_width;
    for o in scene.obstacles {
        let gap_bot = o.gap_top + cfg.gap_height;
        p.rect(buf, o.x, 0.0, pw, o.gap_top, PIPE);
        p.rect(buf, o.x, o.gap_top - LIP_H, pw, LIP_H, PIPE_LIP);
        p.rect(buf, o.x, gap_bot, pw, cfg.field_height - gap_bot, PIPE);
        p.rect(buf, o.x, gap_bot, pw, LIP_H, PIPE_LIP);
    }
}

fn draw_bird<S: Surface + ?Sized>(scene: &Scene<'_>, p: &Painter, buf: &mut S) {
    let cfg = scene.config;
    let bx = cfg.bird_x();
    let by = scene.bird.y;
    let (sin, cos) = bird_tilt(scene.bird.velocity).sin_cos();
    // Offset from the bird's center, rotated by the tilt.
    let at = |dx: f64, dy: f64| (bx + dx * cos - dy * sin, by + dx * sin + dy * cos);

    let r = p.len(cfg.bird_radius);
    let (cx, cy) = (p.x(bx), p.y(by));
    buf.fill_circle(cx, cy, r, BIRD_RIM);
    buf.fill_circle(cx, cy, (r - p.len(3.0)).max(1), BIRD);

    // Wing beats every few frames while flying.
    let wing_dy = if scene.phase == Phase::Running && scene.frame % 8 < 4 { -3.0 } else { 3.0 };
    let (wx, wy) = at(-8.0, wing_dy);
    buf.fill_circle(p.x(wx), p.y(wy), p.len(6.0), PIPE_LIP);

    let (ex, ey) = at(8.0, -6.0);
    buf.fill_circle(p.x(ex), p.y(ey), p.len(4.0), BIRD_EYE);
    let (px, py) = at(9.0, -6.0);
    buf.fill_circle(p.x(px), p.y(py), p.len(2.0), BIRD_PUPIL);

    let beak = [at(18.0, 0.0), at(28.0, 3.0), at(18.0, 6.0)].map(|(x, y)| (p.x(x), p.y(y)));
    fill_triangle(buf, beak, BIRD_BEAK);
}

fn fill_triangle<S: Surface + ?Sized>(buf: &mut S, v: [(i32, i32); 3], c: Rgb) {
    let edge = |a: (i32, i32), b: (i32, i32), x: i32, y: i32| {
        (b.0 - a.0) * (y - a.1) - (b.1 - a.1) * (x - a.0)
    };
    let min_x = v.iter().map(|p| p.0).min().unwrap_or(0);
    let max_x = v.iter().map(|p| p.0).max().unwrap_or(0);
    let min_y = v.iter().map(|p| p.1).min().unwrap_or(0);
    let max_y = v.iter().map(|p| p.1).max().unwrap_or(0);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let e0 = edge(v[0], v[1], x, y);
            let e1 = edge(v[1], v[2], x, y);
            let e2 = edge(v[2], v[0], x, y);
            let inside = (e0 >= 0 && e1 >= 0 && e2 >= 0) || (e0 <= 0 && e1 <= 0 && e2 <= 0);
            if inside {
                buf.set(x, y, c);
            }
        }
    }
}

fn draw_score<S: Surface + ?Sized>(scene: &Scene<'_>, p: &Painter, buf: &mut S) {
    let cx = p.x(scene.config.field_width / 2.0);
    let text = scene.score.to_string();
    draw_text(buf, cx, p.y(50.0), &text, p.text_scale(6.0), WHITE, INK);
}

fn draw_title<S: Surface + ?Sized>(scene: &Scene<'_>, p: &Painter, buf: &mut S) {
    let cx = p.x(scene.config.field_width / 2.0);
    let y = p.y(scene.config.field_height / 4.0);
    draw_text(buf, cx, y, "FLAPPYSTER", p.text_scale(4.0), WHITE, INK);
}

fn draw_game_over<S: Surface + ?Sized>(
    scene: &Scene<'_>,
    p: &Painter,
    buf: &mut S,
    w: usize,
    h: usize,
) {
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            if let Some(c) = buf.get(x, y) {
                buf.set(x, y, c.halve());
            }
        }
    }

    let cfg = scene.config;
    let (pw, ph) = (cfg.field_width * 0.75, cfg.field_height * 0.3);
    let (px, py) = ((cfg.field_width - pw) / 2.0, (cfg.field_height - ph) / 2.0);
    p.rect(buf, px - 3.0, py - 3.0, pw + 6.0, ph + 6.0, PANEL_EDGE);
    p.rect(buf, px, py, pw, ph, PANEL);

    let cx = p.x(cfg.field_width / 2.0);
    let scale = p.text_scale(4.0);
    draw_text(buf, cx, p.y(py + 20.0), "GAME OVER", scale, WHITE, INK);
    let score = scene.score.to_string();
    draw_text(buf, cx, p.y(py + 70.0), &score, p.text_scale(6.0), WHITE, INK);
    let best = format!("BEST {}", scene.best);
    draw_text(buf, cx, p.y(py + 130.0), &best, p.text_scale(3.0), BIRD_BEAK, INK);
}
