// Console layer: turns upload events into coloured status lines and a
// progress bar, prompts for a missing password and prints the result.

use std::io::IsTerminal;

use crossterm::style::Stylize;
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};

use crate::upload::{Event, Published};

/// Renders [`Event`]s. In quiet mode nothing but the final result shows.
pub struct Console {
    quiet: bool,
    bar: Option<ProgressBar>,
}

impl Console {
    pub fn new(quiet: bool) -> Self {
        Console { quiet, bar: None }
    }

    /// Handle one event from the upload run.
    pub fn event(&mut self, event: Event<'_>) {
        if self.quiet {
            return;
        }
        match event {
            Event::Scanned { dirs, files } => {
                let bar = ProgressBar::new((dirs + files) as u64);
                if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}") {
                    bar.set_style(style.progress_chars("=> "));
                }
                self.bar = Some(bar);
            }
            Event::LoggingIn => self.line(format!("{} {}", "Logging in".green(), "...".yellow())),
            Event::CreatingStaging(path) => self.line(format!(
                "{} ({}) {}",
                "Creating temporary folder".green(),
                path.magenta(),
                "...".yellow()
            )),
            Event::CreatingFolder(path) => {
                self.line(format!("{} ({}) {}", "Creating folder".green(), path.magenta(), "...".yellow()));
                self.tick();
            }
            Event::Uploading(path) => {
                self.line(format!("{} ({}) {}", "Uploading".green(), path.magenta(), "...".yellow()));
                self.tick();
            }
            Event::Publishing => {
                if let Some(bar) = self.bar.take() {
                    bar.finish_and_clear();
                }
                self.line(format!("{} {}", "Uploading package to lStore".green(), "...".yellow()));
            }
            Event::CleaningUp(_) => self.line(format!("{} {}", "Clean up".green(), "...".yellow())),
        }
    }

    fn line(&self, text: String) {
        match &self.bar {
            Some(bar) => bar.println(text),
            None => println!("{}", text),
        }
    }

    fn tick(&self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    /// Print the identifier and the two ways to fetch the project.
    pub fn report(&self, published: &Published) {
        if self.quiet {
            println!("{}", published.id);
            return;
        }
        let [by_title, by_id] = published.retrieval_commands();
        println!("{} {}", "Uploaded as".green(), published.id.as_str().blue());
        println!(
            "{} \"{}\" {} \"{}\" {}",
            "Run".green(),
            by_title.as_str().white(),
            "or".green(),
            by_id.as_str().white(),
            "to download anywhere".green()
        );
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.abandon();
        }
    }
}

/// Ask for the password on the terminal. Returns `None` when stdin is not
/// interactive or the prompt fails.
pub fn prompt_password() -> Option<String> {
    if !std::io::stdin().is_terminal() {
        return None;
    }
    Password::new().with_prompt("LevelOS password").interact().ok()
}
