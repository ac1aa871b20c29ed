/// Terminal surface for the effect engines.
///
/// The engines never touch crossterm directly; they draw through the
/// `Screen` trait so the whole choreography also runs headless against
/// `CaptureScreen` in tests. `TermScreen` is the real thing: raw mode,
/// alternate screen, hidden cursor, buffered writes flushed per frame.

use std::collections::VecDeque;
use std::io::{self, BufWriter, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor::{self, MoveTo},
    event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Attribute, Color, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

const KEYS_ABORT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

/// One keypress, reduced to what the effect tools care about.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeyPress {
    /// Ctrl+C, Esc or q: stop the effect and restore the terminal.
    Interrupt,
    /// Anything else: acknowledge and move on.
    Key,
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && (key.code == KeyCode::Char('c') || key.code == KeyCode::Char('C'))
}

fn classify(key: &KeyEvent) -> KeyPress {
    if is_ctrl_c(key) || KEYS_ABORT.contains(&key.code) {
        KeyPress::Interrupt
    } else {
        KeyPress::Key
    }
}

/// For the typing effect, where printable keys ARE the input: only
/// Ctrl+C and Esc abort, everything else advances.
fn classify_typing(key: &KeyEvent) -> KeyPress {
    if is_ctrl_c(key) || key.code == KeyCode::Esc {
        KeyPress::Interrupt
    } else {
        KeyPress::Key
    }
}

fn next_press(classify: fn(&KeyEvent) -> KeyPress) -> io::Result<KeyPress> {
    loop {
        if let Event::Key(key) = event::read()? {
            // skip Release so enhanced terminals don't double-fire
            if key.kind == KeyEventKind::Release {
                continue;
            }
            return Ok(classify(&key));
        }
    }
}

/// Block until a key arrives, with the fullscreen abort set (Ctrl+C,
/// Esc or q).
pub fn read_key() -> io::Result<KeyPress> {
    next_press(classify)
}

/// Block until a key arrives, with the typing abort set (Ctrl+C, Esc).
pub fn read_typing_key() -> io::Result<KeyPress> {
    next_press(classify_typing)
}

/// Write one glyph in raw mode. Raw mode disables output processing, so
/// a bare `\n` keeps the column; the carriage return has to be explicit.
pub fn put_raw(out: &mut impl Write, ch: char) -> io::Result<()> {
    if ch == '\n' {
        out.write_all(b"\r\n")
    } else {
        let mut buf = [0u8; 4];
        out.write_all(ch.encode_utf8(&mut buf).as_bytes())
    }
}

// ── Screen trait ──

pub trait Screen {
    /// Wipe the surface and home the cursor. Starts a new frame.
    fn clear(&mut self) -> io::Result<()>;

    /// One glyph at the cursor, default style.
    fn put(&mut self, ch: char) -> io::Result<()>;

    /// One decoded glyph: bold, highlighted.
    fn put_decoded(&mut self, ch: char) -> io::Result<()>;

    /// Push everything queued so far to the surface.
    fn flush(&mut self) -> io::Result<()>;

    /// Block until the user presses a key.
    fn wait_key(&mut self) -> io::Result<KeyPress>;

    /// Non-blocking: did an interrupt key arrive since the last check?
    /// Other pending keys are drained and dropped.
    fn pending_interrupt(&mut self) -> io::Result<bool>;
}

// ── TermScreen: the real terminal ──

fn switch_to_fullscreen(out: &mut impl Write) -> io::Result<()> {
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        Clear(ClearType::All),
        MoveTo(0, 0)
    )
}

/// Full-screen crossterm surface. `new` switches the terminal over,
/// `restore` switches it back; Drop re-runs restore so a panicking
/// phase cannot strand the user in raw mode.
pub struct TermScreen {
    writer: BufWriter<Stdout>,
    restored: bool,
}

impl TermScreen {
    pub fn new() -> io::Result<Self> {
        let mut writer = BufWriter::with_capacity(16 * 1024, io::stdout());
        terminal::enable_raw_mode()?;
        // Raw mode is on by now; undo it if the screen switch fails.
        if let Err(e) = switch_to_fullscreen(&mut writer) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }
        Ok(TermScreen { writer, restored: false })
    }

    /// Leave the alternate screen and hand the terminal back. Safe to
    /// call twice; the second call is a no-op.
    pub fn restore(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }
}

impl Screen for TermScreen {
    fn clear(&mut self) -> io::Result<()> {
        queue!(self.writer, MoveTo(0, 0), Clear(ClearType::FromCursorDown))
    }

    fn put(&mut self, ch: char) -> io::Result<()> {
        put_raw(&mut self.writer, ch)
    }

    fn put_decoded(&mut self, ch: char) -> io::Result<()> {
        queue!(
            self.writer,
            SetAttribute(Attribute::Bold),
            SetForegroundColor(Color::Blue)
        )?;
        put_raw(&mut self.writer, ch)?;
        // Attribute::Reset clears color and weight in one go.
        queue!(self.writer, SetAttribute(Attribute::Reset))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn wait_key(&mut self) -> io::Result<KeyPress> {
        self.flush()?;
        read_key()
    }

    fn pending_interrupt(&mut self) -> io::Result<bool> {
        let mut hit = false;
        while poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Release && classify(&key) == KeyPress::Interrupt {
                    hit = true;
                }
            }
        }
        Ok(hit)
    }
}

impl Drop for TermScreen {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

// ── RawMode: raw terminal without the alternate screen ──

/// Raw-mode guard for the typing effect, which wants its output to stay
/// in the normal scrollback after exit.
pub struct RawMode {
    active: bool,
}

impl RawMode {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawMode { active: true })
    }

    pub fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        terminal::disable_raw_mode()
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

// ── CaptureScreen: in-memory surface for tests ──

/// Records frames instead of drawing. Each `clear` starts a new string
/// in `frames`; glyphs append to the current one. Decoded glyphs are
/// recorded as their plain character (styling is a terminal concern) and
/// counted in `decoded`. Keypress gates pop scripted answers from `keys`
/// (empty queue means a plain key); `pending_interrupt` pops `interrupts`
/// (empty queue means none pending).
#[derive(Default, Debug)]
pub struct CaptureScreen {
    pub frames: Vec<String>,
    pub keys: VecDeque<KeyPress>,
    pub interrupts: VecDeque<bool>,
    pub decoded: usize,
    pub wait_count: usize,
}

impl CaptureScreen {
    pub fn new() -> Self {
        CaptureScreen::default()
    }

    fn current(&mut self) -> &mut String {
        if self.frames.is_empty() {
            self.frames.push(String::new());
        }
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }
}

impl Screen for CaptureScreen {
    fn clear(&mut self) -> io::Result<()> {
        self.frames.push(String::new());
        Ok(())
    }

    fn put(&mut self, ch: char) -> io::Result<()> {
        self.current().push(ch);
        Ok(())
    }

    fn put_decoded(&mut self, ch: char) -> io::Result<()> {
        self.decoded += 1;
        self.current().push(ch);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn wait_key(&mut self) -> io::Result<KeyPress> {
        self.wait_count += 1;
        Ok(self.keys.pop_front().unwrap_or(KeyPress::Key))
    }

    fn pending_interrupt(&mut self) -> io::Result<bool> {
        Ok(self.interrupts.pop_front().unwrap_or(false))
    }
}
