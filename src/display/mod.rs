//! Presentation of the timer. The tracking module only talks to [TimerDisplay]; the terminal
//! rendition lives in [terminal].

pub mod terminal;

use anyhow::Result;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

/// Something that can show the timer to the user.
#[cfg_attr(test, mockall::automock)]
pub trait TimerDisplay {
    fn show(&mut self) -> Result<()>;

    fn hide(&mut self) -> Result<()>;

    fn is_visible(&self) -> bool;

    fn render(&mut self, label: &str) -> Result<()>;

    fn move_to(&mut self, position: Position) -> Result<()>;

    fn window_size(&self) -> Size;

    fn screen_size(&self) -> Size;
}

/// Formats usage as `<title>` followed by `HH:MM:SS` on the next line. Hours aren't wrapped, so a
/// resumed total over a day still reads correctly.
pub fn format_usage_label(title: &str, seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let seconds = seconds % 60;
    format!("{title}\n{hours:02}:{minutes:02}:{seconds:02}")
}

/// Picks a position that keeps the whole window on the screen. A window larger than the screen is
/// pinned to the corresponding edge.
pub fn random_position(screen: Size, window: Size, rng: &mut impl Rng) -> Position {
    let max_x = screen.width.saturating_sub(window.width);
    let max_y = screen.height.saturating_sub(window.height);
    Position {
        x: rng.gen_range(0..=max_x),
        y: rng.gen_range(0..=max_y),
    }
}
