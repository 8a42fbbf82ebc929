//! Line-oriented presentation host.
//!
//! Reads one navigation location per input line and reports what the
//! surface should do on the output:
//!
//! ```text
//! display <uri>                 show a rendered page
//! confirm <title>: <question>   answer with y/yes on the next line
//! cancelled                     close was declined; keep going
//! closed                        the wizard is gone
//! exit <code>                   the process is stopping
//! ```
//!
//! The line `:close` stands for the user closing the window.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use lantern_core::{CloseIntent, HostAction, Teardown, UpdatePrompt, Wizard};

pub const CLOSE_COMMAND: &str = ":close";

/// Something the host can drive.
pub trait Surface {
    fn navigate(&mut self, location: &str) -> HostAction;
    fn close_requested(&mut self, confirm: &mut dyn FnMut(&str, &str) -> bool) -> CloseIntent;
    fn teardown(&self) -> Arc<Teardown>;
}

impl Surface for Wizard {
    fn navigate(&mut self, location: &str) -> HostAction {
        Wizard::navigate(self, location)
    }

    fn close_requested(&mut self, confirm: &mut dyn FnMut(&str, &str) -> bool) -> CloseIntent {
        Wizard::close_requested(self, confirm)
    }

    fn teardown(&self) -> Arc<Teardown> {
        Wizard::teardown(self)
    }
}

impl Surface for UpdatePrompt {
    fn navigate(&mut self, location: &str) -> HostAction {
        UpdatePrompt::navigate(self, location)
    }

    fn close_requested(&mut self, confirm: &mut dyn FnMut(&str, &str) -> bool) -> CloseIntent {
        UpdatePrompt::close_requested(self, confirm)
    }

    fn teardown(&self) -> Arc<Teardown> {
        self.session().teardown()
    }
}

/// Drive `surface` until it closes, exits, or input ends. Returns the process
/// exit code.
pub fn run<S, R, W>(surface: &mut S, first: HostAction, input: R, out: &mut W) -> io::Result<i32>
where
    S: Surface + ?Sized,
    R: BufRead,
    W: Write,
{
    if let Some(code) = emit(first, out)? {
        return Ok(code);
    }

    let mut lines = input.lines();
    while let Some(line) = lines.next() {
        let line = line?;
        let location = line.trim();
        if location.is_empty() {
            continue;
        }

        if location != CLOSE_COMMAND {
            if let Some(code) = emit(surface.navigate(location), out)? {
                return Ok(code);
            }
            continue;
        }

        let mut prompt_error = None;
        let intent = surface.close_requested(&mut |title, question| {
            if let Err(e) = writeln!(out, "confirm {title}: {question} [y/N]").and_then(|()| out.flush()) {
                prompt_error = Some(e);
                return false;
            }
            match lines.next() {
                Some(Ok(answer)) => is_yes(&answer),
                Some(Err(e)) => {
                    prompt_error = Some(e);
                    false
                }
                None => false,
            }
        });
        if let Some(e) = prompt_error {
            return Err(e);
        }

        match intent {
            CloseIntent::Allow => {
                writeln!(out, "closed")?;
                return Ok(0);
            }
            CloseIntent::Cancelled => writeln!(out, "cancelled")?,
            // The window is gone either way.
            CloseIntent::Confirmed(action) => return Ok(emit(action, out)?.unwrap_or(0)),
        }
    }

    tracing::info!("Input closed; shutting down");
    surface.teardown().run();
    Ok(0)
}

fn emit<W: Write>(action: HostAction, out: &mut W) -> io::Result<Option<i32>> {
    let stop = match action {
        HostAction::Display(handle) => {
            writeln!(out, "display {handle}")?;
            None
        }
        HostAction::Nothing => None,
        HostAction::ClosePresentation => {
            writeln!(out, "closed")?;
            Some(0)
        }
        HostAction::Exit { code } => {
            writeln!(out, "exit {code}")?;
            Some(code)
        }
    };
    out.flush()?;
    Ok(stop)
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
