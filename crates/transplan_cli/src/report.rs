use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;
use transplan_model::SolutionResponse;

/// Writes a dated plan report: header lines, a blank line, then the
/// rendered table.
pub fn write_plan_report(
    path: &Path,
    title: &str,
    response: &SolutionResponse,
    table: &str,
) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);
    write_header(&mut w, title, response)?;
    writeln!(w)?;
    w.write_all(table.as_bytes())?;
    w.flush()
}

fn write_header(
    mut w: impl Write,
    title: &str,
    response: &SolutionResponse,
) -> std::io::Result<()> {
    writeln!(w, "Title: {}", title.trim())?;
    let now = Local::now();
    writeln!(w, "Date: {}", now.format("%a %b %d %H:%M:%S %Y"))?;
    writeln!(w, "Total price: {}", response.price)?;
    writeln!(
        w,
        "Optimal: {}",
        if response.is_optimal { "yes" } else { "no" }
    )?;
    writeln!(w, "Routes: {}", response.roots.len())?;
    Ok(())
}
