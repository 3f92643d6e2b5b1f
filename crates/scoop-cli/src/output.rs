use std::io::Write;

use owo_colors::OwoColorize;
use scoop_core::{Flavor, Rgb, ScoopView, render};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn swatch(rgb: Rgb, width: usize, color: ColorMode) -> String {
    let block = "█".repeat(width);
    if color.enabled() {
        block.truecolor(rgb.r, rgb.g, rgb.b).to_string()
    } else {
        String::new()
    }
}

/// Print the flavor list, marking the selected row.
pub fn print_list(
    w: &mut dyn Write,
    items: &[Flavor],
    selection: Option<usize>,
    color: ColorMode,
) -> std::io::Result<()> {
    if items.is_empty() {
        writeln!(w, "No flavors available.")?;
        return Ok(());
    }

    let width = items.iter().map(|f| f.name().chars().count()).max().unwrap_or(0);
    for (index, flavor) in items.iter().enumerate() {
        let view = render(flavor);
        let marker = if selection == Some(index) { ">" } else { " " };
        let label = format!("{:<width$}", view.label);
        if color.enabled() {
            let label = if selection == Some(index) {
                label.bold().to_string()
            } else {
                label
            };
            writeln!(
                w,
                "{} {:>2}. {} {}{}",
                marker.cyan(),
                index,
                label,
                swatch(view.top, 2, color),
                swatch(view.bottom, 2, color)
            )?;
        } else {
            writeln!(w, "{} {:>2}. {}  {} / {}", marker, index, label, view.top, view.bottom)?;
        }
    }
    Ok(())
}

/// Print the detail view for one scoop.
pub fn print_detail(
    w: &mut dyn Write,
    index: usize,
    view: &ScoopView,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w)?;
        writeln!(w, "    {}", swatch(view.top, 8, color))?;
        writeln!(w, "    {}", swatch(view.bottom, 8, color))?;
        writeln!(w, "    {} {}", view.label.bold(), format!("[{index}]").dimmed())?;
        writeln!(w)?;
    } else {
        writeln!(
            w,
            "[{index}] {} (top {}, bottom {})",
            view.label, view.top, view.bottom
        )?;
    }
    Ok(())
}

pub fn print_pick_help(w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "Commands: <index> select, l list, r reload, h help, q quit")
}
