use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use fleetcheck_common::device::Credentials;

/// Asks for whatever login material was not given on the command line.
/// Prompts go to stderr; password and secret are not echoed.
pub fn credentials(username: Option<String>) -> io::Result<Credentials> {
    let username = match username {
        Some(username) => username,
        None => read_line("Username: ")?,
    };
    let password = read_hidden("Password: ")?;
    let secret = read_hidden("Secret: ")?;
    Ok(Credentials::new(username, password, secret))
}

fn read_line(prompt: &str) -> io::Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn read_hidden(prompt: &str) -> io::Result<String> {
    if !io::stdin().is_terminal() {
        return read_line(prompt);
    }

    let mut stderr = io::stderr();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;

    let input = {
        let _raw = RawMode::enable()?;
        read_keys()?
    };

    writeln!(stderr)?;
    Ok(input)
}

fn read_keys() -> io::Result<String> {
    let mut input = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(input),
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "input cancelled"));
            }
            KeyCode::Char(c) => input.push(c),
            _ => {}
        }
    }
}

/// Leaves raw mode when dropped, including on early return.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}
