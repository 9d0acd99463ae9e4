//! Terminal host: owns the screen while the game runs and presents a
//! [`PixelBuf`] with half-block characters (two pixels per cell).

use crate::surface::{PixelBuf, Rgb, Surface};
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        MouseButton, MouseEventKind,
    },
    execute, queue,
    style::{self, Color as CColor},
    terminal,
};
use std::io::{self, Write};
use std::time::Duration;

/// What the host does with a terminal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Flap,
    Quit,
    Resize(u16, u16),
}

/// Maps a crossterm event to game input. Key repeats are passed through.
pub fn map_event(ev: &Event) -> Option<Input> {
    match ev {
        Event::Key(key) if key.kind != KeyEventKind::Release => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Input::Quit),
            KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => Some(Input::Flap),
            _ => None,
        },
        Event::Mouse(m) if m.kind == MouseEventKind::Down(MouseButton::Left) => Some(Input::Flap),
        Event::Resize(c, r) => Some(Input::Resize(*c, *r)),
        _ => None,
    }
}

/// Drains every pending event without blocking.
pub fn poll_inputs() -> io::Result<Vec<Input>> {
    let mut inputs = Vec::new();
    while event::poll(Duration::ZERO)? {
        if let Some(input) = map_event(&event::read()?) {
            inputs.push(input);
        }
    }
    Ok(inputs)
}

/// Largest pixel size with the field's aspect ratio that fits the terminal.
///
/// Each cell is one pixel wide and two tall. Returns `(0, 0)` when the
/// terminal is too small to show anything.
pub fn fit_field(cols: u16, rows: u16, field_w: f64, field_h: f64) -> (usize, usize) {
    let max_w = cols as f64;
    let max_h = rows as f64 * 2.0;
    let (w, h) = if max_w * field_h <= max_h * field_w {
        (max_w, max_w * field_h / field_w)
    } else {
        (max_h * field_w / field_h, max_h)
    };
    let w = w.floor() as usize;
    // Even height so every cell row has a top and bottom pixel.
    let h = (h.floor() as usize) & !1;
    if w < 4 || h < 4 { (0, 0) } else { (w, h) }
}

/// Raw mode plus alternate screen; restored on drop.
pub struct TerminalGuard<W: Write = io::Stdout> {
    out: W,
    raw_mode: bool,
}

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Self::take_over(io::stdout(), true)
    }
}

impl<W: Write> TerminalGuard<W> {
    /// Sets up the screen on `out`. The guard exists before the first write,
    /// so a failed setup is still undone when it drops.
    fn take_over(out: W, raw_mode: bool) -> io::Result<Self> {
        let mut guard = Self { out, raw_mode };
        execute!(
            guard.out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::DisableLineWrap,
            EnableMouseCapture,
        )?;
        Ok(guard)
    }

    pub fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    pub fn clear(&mut self) -> io::Result<()> {
        execute!(self.out, terminal::Clear(terminal::ClearType::All))
    }

    pub fn present(&mut self, buf: &PixelBuf) -> io::Result<()> {
        present(buf, &mut self.out)
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        let mut restored = execute!(
            self.out,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        );
        if self.raw_mode {
            restored = restored.and(terminal::disable_raw_mode());
        }
        if let Err(e) = restored {
            log::error!("failed to restore terminal: {e}");
        }
    }
}

fn fg(c: Rgb) -> style::SetForegroundColor {
    style::SetForegroundColor(CColor::Rgb {
        r: c.0,
        g: c.1,
        b: c.2,
    })
}

fn bg(c: Rgb) -> style::SetBackgroundColor {
    style::SetBackgroundColor(CColor::Rgb {
        r: c.0,
        g: c.1,
        b: c.2,
    })
}

/// Writes `buf` at the top-left corner, skipping redundant color changes.
pub fn present(buf: &PixelBuf, out: &mut impl Write) -> io::Result<()> {
    let (w, h) = buf.size();
    queue!(out, cursor::MoveTo(0, 0))?;
    let rows = h / 2;
    let mut prev_fg: Option<Rgb> = None;
    let mut prev_bg: Option<Rgb> = None;

    for row in 0..rows {
        for col in 0..w {
            let top = buf.get(col as i32, (row * 2) as i32).unwrap_or(PixelBuf::CLEAR);
            let bot = buf
                .get(col as i32, (row * 2 + 1) as i32)
                .unwrap_or(PixelBuf::CLEAR);

            if top == bot {
                if prev_bg != Some(top) {
                    queue!(out, bg(top))?;
                    prev_bg = Some(top);
                }
                queue!(out, style::Print(' '))?;
            } else {
                if prev_fg != Some(top) {
                    queue!(out, fg(top))?;
                    prev_fg = Some(top);
                }
                if prev_bg != Some(bot) {
                    queue!(out, bg(bot))?;
                    prev_bg = Some(bot);
                }
                queue!(out, style::Print('\u{2580}'))?; // ▀
            }
        }
        if row + 1 < rows {
            queue!(out, style::ResetColor, style::Print("\r\n"))?;
            prev_fg = None;
            prev_bg = None;
        }
    }
    queue!(out, style::ResetColor)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers, MouseEvent};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_flap_keys() {
        for code in [KeyCode::Char(' '), KeyCode::Up, KeyCode::Enter] {
            assert_eq!(map_event(&key(code)), Some(Input::Flap));
        }
        assert_eq!(map_event(&key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(map_event(&key(KeyCode::Char('q'))), Some(Input::Quit));
        assert_eq!(map_event(&key(KeyCode::Esc)), Some(Input::Quit));
    }

    #[test]
    fn test_key_release_ignored() {
        let mut ev = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        ev.kind = KeyEventKind::Release;
        assert_eq!(map_event(&Event::Key(ev)), None);
        ev.kind = KeyEventKind::Repeat;
        assert_eq!(map_event(&Event::Key(ev)), Some(Input::Flap));
    }

    #[test]
    fn test_left_click_flaps() {
        let click = |kind| {
            Event::Mouse(MouseEvent {
                kind,
                column: 3,
                row: 4,
                modifiers: KeyModifiers::NONE,
            })
        };
        assert_eq!(
            map_event(&click(MouseEventKind::Down(MouseButton::Left))),
            Some(Input::Flap)
        );
        assert_eq!(map_event(&click(MouseEventKind::Moved)), None);
    }

    #[test]
    fn test_resize_passed_through() {
        assert_eq!(
            map_event(&Event::Resize(80, 24)),
            Some(Input::Resize(80, 24))
        );
    }

    #[test]
    fn test_fit_field_keeps_aspect() {
        // 50 rows -> 100 pixels tall, width 60 fits in 200 columns.
        assert_eq!(fit_field(200, 50, 360.0, 600.0), (60, 100));
        // Narrow terminal: width-limited.
        assert_eq!(fit_field(30, 50, 360.0, 600.0), (30, 50));
        assert_eq!(fit_field(2, 1, 360.0, 600.0), (0, 0));
    }

    /// Records writes and refuses the first `fail_writes` of them.
    struct FlakyOut {
        written: Rc<RefCell<Vec<u8>>>,
        fail_writes: usize,
    }

    impl Write for FlakyOut {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            if self.fail_writes > 0 {
                self.fail_writes -= 1;
                return Err(io::Error::other("terminal gone"));
            }
            self.written.borrow_mut().extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_setup_still_restores() {
        let written = Rc::new(RefCell::new(Vec::new()));
        let out = FlakyOut {
            written: Rc::clone(&written),
            fail_writes: 1,
        };
        assert!(TerminalGuard::take_over(out, false).is_err());
        let text = String::from_utf8(written.borrow().clone()).unwrap();
        assert!(text.contains("\x1b[?1049l"), "alternate screen left on: {text:?}");
        assert!(text.contains("\x1b[?25h"), "cursor left hidden: {text:?}");
    }

    #[test]
    fn test_guard_restores_on_drop() {
        let written = Rc::new(RefCell::new(Vec::new()));
        let out = FlakyOut {
            written: Rc::clone(&written),
            fail_writes: 0,
        };
        let guard = TerminalGuard::take_over(out, false).unwrap();
        assert!(String::from_utf8_lossy(&written.borrow()).contains("\x1b[?1049h"));
        drop(guard);
        assert!(String::from_utf8_lossy(&written.borrow()).ends_with("\x1b[?7h"));
    }

    #[test]
    fn test_present_breaks_between_cell_rows() {
        let mut buf = PixelBuf::new(3, 4);
        buf.set(1, 0, Rgb(255, 0, 0));
        let mut out = Vec::new();
        present(&buf, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("\r\n").count(), 1);
        assert_eq!(text.matches('\u{2580}').count(), 1);
    }
}
