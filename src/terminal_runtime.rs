use std::io;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::{Frame, Terminal};
use tracing::{debug, warn};

use crate::error::Result;

type Backend = CrosstermBackend<io::Stdout>;

/// Raw-mode alternate screen held for the lifetime of a play or spectate run.
///
/// Dropping the session hands the terminal back to the shell.
pub struct TerminalSession {
    terminal: Terminal<Backend>,
}

impl TerminalSession {
    pub fn enter() -> Result<Self> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        if let Err(error) = execute!(stdout, EnterAlternateScreen, Clear(ClearType::All), Hide) {
            let _ = disable_raw_mode();
            return Err(error.into());
        }

        let terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => terminal,
            Err(error) => {
                let _ = restore_terminal();
                return Err(error.into());
            }
        };

        debug!("terminal switched to alternate screen");
        Ok(Self { terminal })
    }

    /// Draws one frame.
    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(error) = restore_terminal() {
            warn!(%error, "terminal restore failed");
        }
    }
}

/// Leaves raw mode and the alternate screen. Safe to call more than once,
/// including from the panic hook.
pub fn restore_terminal() -> io::Result<()> {
    let _ = disable_raw_mode();
    execute!(io::stdout(), Show, LeaveAlternateScreen)
}
