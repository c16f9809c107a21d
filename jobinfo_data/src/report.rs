use std::io::{self, Write};

use crate::record::MergedRecord;

/// `(label, formatted value)` for every visible field, in table order.
pub fn lines(record: &MergedRecord) -> Vec<(&'static str, String)> {
    record
        .iter()
        .filter(|(field, _)| field.visible)
        .map(|(field, value)| (field.label, (field.format)(value, record)))
        .collect()
}

/// One `label : value` line per visible field, labels padded to a common width.
pub fn write(record: &MergedRecord, out: &mut impl Write) -> io::Result<()> {
    let lines = lines(record);
    let width = lines.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in lines {
        writeln!(out, "{label:<width$} : {value}")?;
    }
    out.flush()
}
