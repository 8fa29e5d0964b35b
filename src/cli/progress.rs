//! Строка прогресса для длинных файловых операций

use std::io::{self, IsTerminal, Write};

use crossterm::cursor::MoveToColumn;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};

use crate::crypto::FileProgress;

/// Перерисовывает одну строку stderr после каждого блока
pub struct ProgressLine {
    label: String,
    enabled: bool,
    drawn: bool,
}

impl ProgressLine {
    /// Рисует только если включено и stderr является терминалом
    pub fn new(label: impl Into<String>, enabled: bool) -> Self {
        Self {
            label: label.into(),
            enabled: enabled && io::stderr().is_terminal(),
            drawn: false,
        }
    }

    pub fn update(&mut self, progress: FileProgress) {
        if !self.enabled {
            return;
        }

        let mut err = io::stderr();
        let _ = execute!(err, MoveToColumn(0), Clear(ClearType::CurrentLine));
        let _ = write!(
            err,
            "{} {:>6.2}% ({}/{} байт)",
            self.label,
            progress.percent(),
            progress.bytes_processed,
            progress.total_bytes
        );
        let _ = err.flush();
        self.drawn = true;
    }

    pub fn finish(&mut self) {
        if self.drawn {
            eprintln!();
            self.drawn = false;
        }
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        self.finish();
    }
}
