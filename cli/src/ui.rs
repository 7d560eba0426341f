//! Terminal implementation of the export prompts.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use stylesplit::{FileFilter, Interaction};

/// Prompts on stderr, answers from stdin, progress as a bar.
pub struct TerminalInteraction {
    output: Option<PathBuf>,
    assume_yes: bool,
    bar: Option<ProgressBar>,
}

impl TerminalInteraction {
    /// `output` overrides the folder the user would be asked for;
    /// `assume_yes` answers every question with yes.
    pub fn new(output: Option<PathBuf>, assume_yes: bool) -> Self {
        Self {
            output,
            assume_yes,
            bar: None,
        }
    }

    /// Clear the progress bar, if one was shown.
    pub fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    fn print(&self, line: &str) {
        match self.bar {
            Some(ref bar) => bar.suspend(|| eprintln!("{}", line)),
            None => eprintln!("{}", line),
        }
    }

    fn ask(&self, question: &str) -> Option<String> {
        let read = || {
            eprint!("{}", question);
            io::stderr().flush().ok()?;
            let mut answer = String::new();
            match io::stdin().lock().read_line(&mut answer) {
                Ok(0) | Err(_) => None,
                Ok(_) => Some(answer.trim().to_string()),
            }
        };
        match self.bar {
            Some(ref bar) => bar.suspend(read),
            None => read(),
        }
    }
}

impl Interaction for TerminalInteraction {
    fn choose_save_location(&mut self, suggested: &Path, filter: &FileFilter) -> Option<PathBuf> {
        let name = suggested.file_name()?;
        if let Some(ref dir) = self.output {
            return Some(dir.join(name));
        }
        if self.assume_yes {
            return Some(suggested.to_path_buf());
        }

        let answer = self.ask(&format!(
            "Save as [{}] ({}; enter to accept, q to cancel): ",
            suggested.display(),
            filter
        ))?;
        match answer.as_str() {
            "" => Some(suggested.to_path_buf()),
            "q" | "Q" => None,
            typed => {
                let typed = PathBuf::from(typed);
                if typed.is_dir() {
                    Some(typed.join(name))
                } else {
                    Some(typed)
                }
            }
        }
    }

    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            log::info!("{} -> yes", message.replace('\n', " "));
            return true;
        }
        let question = format!("{} {} ", message, "[y/N]".dimmed());
        matches!(
            self.ask(&question).as_deref(),
            Some("y") | Some("Y") | Some("yes") | Some("Yes")
        )
    }

    fn warn(&mut self, message: &str) {
        self.print(&format!("{} {}", "!".yellow().bold(), message));
    }

    fn progress(&mut self, done: usize, total: usize) {
        let bar = self.bar.get_or_insert_with(|| {
            let bar = ProgressBar::new(total as u64);
            let style = ProgressStyle::default_bar()
                .template("{spinner:.blue} [{bar:30.cyan/blue}] {pos}/{len} pages")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> ");
            bar.set_style(style);
            bar
        });
        bar.set_length(total as u64);
        bar.set_position(done as u64);
    }
}
