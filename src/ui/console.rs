use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::{Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Normal,
    Header,
    Input,
    Warning,
}

/// Line-oriented operator I/O. Every screen and prompt goes through this.
pub trait Console {
    /// Show `prompt` and read one line, without the trailing newline.
    /// Returns `UnexpectedEof` once input is exhausted.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;

    fn say(&mut self, tone: Tone, text: &str);

    fn clear(&mut self);

    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        Ok(self.read_line(prompt)?.trim().to_string())
    }

    fn ask_upper(&mut self, prompt: &str) -> io::Result<String> {
        Ok(self.ask(prompt)?.to_uppercase())
    }

    fn ask_lower(&mut self, prompt: &str) -> io::Result<String> {
        Ok(self.ask(prompt)?.to_lowercase())
    }

    /// `true` only for an explicit "y".
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        Ok(self.ask_lower(prompt)? == "y")
    }

    /// Show a message and wait for Enter.
    fn pause(&mut self, message: &str) -> io::Result<()> {
        self.read_line(message).map(|_| ())
    }

    fn warn(&mut self, text: &str) {
        self.say(Tone::Warning, text);
    }
}

pub struct TerminalConsole {
    theme: Theme,
}

impl TerminalConsole {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    fn print_styled(&self, tone: Tone, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        match self.theme.color(tone) {
            Some(color) => execute!(
                stdout,
                SetForegroundColor(color),
                Print(text),
                ResetColor
            ),
            None => execute!(stdout, Print(text)),
        }
    }
}

impl Console for TerminalConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self.print_styled(Tone::Input, prompt)?;
        print!(" ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn say(&mut self, tone: Tone, text: &str) {
        let _ = self.print_styled(tone, text);
        println!();
    }

    fn clear(&mut self) {
        let _ = execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0));
    }
}

/// Replays canned operator input and records everything shown.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    transcript: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    pub fn push(&mut self, input: impl Into<String>) {
        self.inputs.push_back(input.into());
    }

    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }

    pub fn transcript(&self) -> String {
        self.transcript.join("\n")
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.transcript.iter().any(|line| line.contains(needle))
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self.transcript.push(prompt.to_string());
        self.inputs
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }

    fn say(&mut self, _tone: Tone, text: &str) {
        self.transcript.push(text.to_string());
    }

    fn clear(&mut self) {}
}
