use std::io::{self, Write};

use crate::model::ReconciledSummary;

/// The summary in its canonical line format, roster customers first.
pub fn report_lines(summary: &ReconciledSummary) -> Vec<String> {
    let mut lines: Vec<String> = summary
        .customers
        .iter()
        .map(|c| format!("Deposited for {}: count={} sum={}", c.name, c.count, c.amount))
        .collect();

    lines.push(format!(
        "Deposited without reference: count={} sum={}",
        summary.unreferenced.count, summary.unreferenced.amount
    ));
    lines.push(format!("Smallest valid deposit: {}", summary.extremes.min));
    lines.push(format!("Largest valid deposit: {}", summary.extremes.max));
    lines
}

pub fn write_report<W: Write>(out: &mut W, summary: &ReconciledSummary) -> io::Result<()> {
    for line in report_lines(summary) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
