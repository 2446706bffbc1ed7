use std::fs::File;

use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Result;
use bletchley::MultiResult;
use log::info;

/// Saves Bombe results to a file as JSON lines, after a first line with the
/// description. Results are written in the order given, which for the
/// drivers is the deterministic configuration order.
pub fn save_results(description: &str, results: &[MultiResult], filename: &Path) -> Result<()> {
    // from description, strip all new lines
    let description = description.replace('\n', " ");

    let lines = results
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<String>, _>>()?;

    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{description}")?;
    for line in lines {
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;

    info!(
        "saved {} results with {} stops to {}",
        results.len(),
        results.iter().map(|r| r.stops.len()).sum::<usize>(),
        filename.display()
    );
    Ok(())
}
