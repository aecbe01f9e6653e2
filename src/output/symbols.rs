//! Symbol list output
//!
//! The harvested set is written as UTF-8 text, one symbol per line in
//! ascending order, with a trailing newline. An existing file is replaced.

use crate::crawler::SymbolSet;
use crate::output::{OutputError, OutputResult};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Writes `symbols` to `output_path`, one per line
pub fn write_symbols(symbols: &SymbolSet, output_path: &Path) -> OutputResult<()> {
    let file = File::create(output_path)
        .map_err(|e| OutputError::Write(format!("{}: {}", output_path.display(), e)))?;
    let mut writer = BufWriter::new(file);

    for symbol in symbols.iter() {
        writeln!(writer, "{}", symbol)?;
    }

    writer.flush()?;
    Ok(())
}

/// Reads a symbol list written by [`write_symbols`]
///
/// Blank lines are ignored.
pub fn read_symbols(input_path: &Path) -> OutputResult<SymbolSet> {
    let file = File::open(input_path)?;
    let mut symbols = SymbolSet::new();

    for line in BufReader::new(file).lines() {
        symbols.insert(&line?);
    }

    Ok(symbols)
}
