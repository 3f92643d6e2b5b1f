//! Terminal implementation of the controller listener.

use std::io::{self, Write};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use scoop_core::{Flavor, LoadError, Listener, render};

use crate::output::{self, ColorMode};

/// Shows a spinner while loading. With `echo` on, list and selection
/// changes are printed as they happen (interactive picker).
pub struct TerminalPresenter {
    color: ColorMode,
    echo: bool,
    spinner: Option<ProgressBar>,
}

impl TerminalPresenter {
    pub fn new(color: ColorMode, echo: bool) -> Self {
        Self {
            color,
            echo,
            spinner: None,
        }
    }

    /// Write to stdout with the spinner (if any) hidden.
    fn write_stdout(&self, f: impl FnOnce(&mut dyn Write) -> io::Result<()>) {
        let run = || {
            let mut out = io::stdout().lock();
            if let Err(e) = f(&mut out) {
                tracing::warn!(error = %e, "failed to write to stdout");
            }
        };
        match &self.spinner {
            Some(spinner) => spinner.suspend(run),
            None => run(),
        }
    }
}

impl Listener for TerminalPresenter {
    fn on_loading_started(&mut self) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message("Loading flavors...");
        spinner.enable_steady_tick(Duration::from_millis(120));
        self.spinner = Some(spinner);
    }

    fn on_loading_ended(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn on_items_changed(&mut self, items: &[Flavor]) {
        tracing::debug!(count = items.len(), "items changed");
        if self.echo {
            let color = self.color;
            self.write_stdout(|w| output::print_list(w, items, None, color));
        }
    }

    fn on_selection_changed(&mut self, index: usize, item: &Flavor) {
        if self.echo {
            let color = self.color;
            let view = render(item);
            self.write_stdout(|w| output::print_detail(w, index, &view, color));
        }
    }

    fn on_selection_cleared(&mut self) {
        if self.echo {
            self.write_stdout(|w| writeln!(w, "Nothing selected."));
        }
    }

    fn on_load_failed(&mut self, error: &LoadError) {
        if !self.echo {
            return;
        }
        if let Some(spinner) = &self.spinner {
            spinner.suspend(|| print_failure(error, self.color));
        } else {
            print_failure(error, self.color);
        }
    }
}

fn print_failure(error: &LoadError, color: ColorMode) {
    let msg = format!("Could not load flavors: {error}");
    if color.enabled() {
        eprintln!("{}", msg.red());
    } else {
        eprintln!("{msg}");
    }
}
