use std::io::{self, Stdout, Write};

use ansi_term::Style;
use anyhow::Result;
use tracing::debug;

use super::{Position, Size, TimerDisplay};

/// Renders the timer into a terminal. Only changes are written, so a label that stays the same
/// while the target is suspended doesn't flood the output.
pub struct TerminalDisplay<W: Write = Stdout> {
    out: W,
    visible: bool,
    last_label: Option<String>,
    position: Position,
    window: Size,
    screen: Size,
}

impl TerminalDisplay<Stdout> {
    pub fn stdout(window: Size, screen: Size) -> Self {
        Self::new(io::stdout(), window, screen)
    }
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W, window: Size, screen: Size) -> Self {
        Self {
            out,
            visible: false,
            last_label: None,
            position: Position::default(),
            window,
            screen,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TimerDisplay for TerminalDisplay<W> {
    fn show(&mut self) -> Result<()> {
        debug!("Showing timer at {:?}", self.position);
        self.visible = true;
        self.last_label = None;
        Ok(())
    }

    fn hide(&mut self) -> Result<()> {
        debug!("Hiding timer");
        self.visible = false;
        Ok(())
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn render(&mut self, label: &str) -> Result<()> {
        if !self.visible || self.last_label.as_deref() == Some(label) {
            return Ok(());
        }

        writeln!(self.out, "{}", Style::new().bold().paint(label))?;
        self.out.flush()?;
        self.last_label = Some(label.to_owned());
        Ok(())
    }

    fn move_to(&mut self, position: Position) -> Result<()> {
        debug!("Moving timer from {:?} to {:?}", self.position, position);
        self.position = position;
        Ok(())
    }

    fn window_size(&self) -> Size {
        self.window
    }

    fn screen_size(&self) -> Size {
        self.screen
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use crate::display::{Position, Size, TimerDisplay};

    use super::TerminalDisplay;

    fn test_display() -> TerminalDisplay<Vec<u8>> {
        TerminalDisplay::new(
            vec![],
            Size {
                width: 200,
                height: 80,
            },
            Size {
                width: 1920,
                height: 1080,
            },
        )
    }

    #[test]
    fn test_hidden_display_renders_nothing() -> Result<()> {
        let mut display = test_display();

        display.render("Usage\n00:00:01")?;

        assert!(!display.is_visible());
        assert!(display.into_inner().is_empty());
        Ok(())
    }

    #[test]
    fn test_only_changes_are_rendered() -> Result<()> {
        let mut display = test_display();

        display.show()?;
        display.render("Usage\n00:00:01")?;
        display.render("Usage\n00:00:01")?;
        display.render("Usage\n00:00:02")?;

        let output = String::from_utf8(display.into_inner())?;
        assert_eq!(output.matches("00:00:01").count(), 1);
        assert_eq!(output.matches("00:00:02").count(), 1);
        Ok(())
    }

    #[test]
    fn test_showing_again_rerenders() -> Result<()> {
        let mut display = test_display();

        display.show()?;
        display.render("Usage\n00:00:01")?;
        display.hide()?;
        display.show()?;
        display.render("Usage\n00:00:01")?;

        let output = String::from_utf8(display.into_inner())?;
        assert_eq!(output.matches("00:00:01").count(), 2);
        Ok(())
    }

    #[test]
    fn test_move_to() -> Result<()> {
        let mut display = test_display();

        display.move_to(Position { x: 10, y: 20 })?;

        assert_eq!(display.position(), Position { x: 10, y: 20 });
        Ok(())
    }
}
