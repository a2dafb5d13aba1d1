use std::{
    fs,
    io::{Read, Write},
    path::Path,
};

use crate::errors::LedgerError;
use crate::ledger::Transaction;

/// Pretty-printed JSON array of the raw records.
pub fn export_json<W: Write>(writer: W, records: &[Transaction]) -> Result<(), LedgerError> {
    serde_json::to_writer_pretty(writer, records)?;
    Ok(())
}

/// Reads a JSON array of records, clamping negative amounts to zero. Unlike stored
/// state, a malformed file is an error the caller reports.
pub fn import_json<R: Read>(reader: R) -> Result<Vec<Transaction>, LedgerError> {
    let records: Vec<Transaction> = serde_json::from_reader(reader)?;
    Ok(records.into_iter().map(Transaction::clamp_amounts).collect())
}

/// Writes the records to disk atomically by staging to a temporary file.
pub fn save_to_file(records: &[Transaction], path: &Path) -> Result<(), LedgerError> {
    let tmp = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(records)?;
    fs::write(&tmp, json)?;
    fs::rename(tmp, path)?;
    Ok(())
}

pub fn load_from_file(path: &Path) -> Result<Vec<Transaction>, LedgerError> {
    let file = fs::File::open(path)?;
    import_json(std::io::BufReader::new(file))
}
