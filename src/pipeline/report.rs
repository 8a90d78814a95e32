use chrono::Month;

use crate::pipeline::aggregate::GearLedger;
use crate::types::gear::Gear;

const GEAR_RULE: &str =
    "------------------------------------------------------------------------";
const SECTION_RULE: &str = "-------------------------------------------------";

/// Gear usage report: for every gear a yearly table, then a year x month table.
pub fn render(ledger: &GearLedger, gears: &[Gear]) -> String {
    let mut text = String::new();

    for gear_id in ledger.gear_ids() {
        let label = gears
            .iter()
            .find(|gear| gear.id == gear_id)
            .map(Gear::label)
            .unwrap_or(gear_id);

        let yearly: Vec<Vec<String>> = ledger
            .yearly(gear_id)
            .into_iter()
            .map(|(year, totals)| {
                vec![
                    year.to_string(),
                    format!("{:.2}", totals.distance_km),
                    format!("{:.2}", totals.elevation_m),
                ]
            })
            .collect();

        let monthly: Vec<Vec<String>> = ledger
            .monthly(gear_id)
            .into_iter()
            .map(|(year, month, totals)| {
                vec![
                    year.to_string(),
                    month_name(month),
                    format!("{:.2}", totals.distance_km),
                    format!("{:.2}", totals.elevation_m),
                ]
            })
            .collect();

        text.push_str(GEAR_RULE);
        text.push('\n');
        text.push_str(&format!("For {label}:\n"));
        text.push_str(&table(&["Year", "Distance", "Elevation"], &yearly));
        text.push_str(SECTION_RULE);
        text.push('\n');
        text.push_str(&table(&["Year", "Month", "Distance", "Elevation"], &monthly));
    }

    text
}

fn month_name(month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name().to_string())
        .unwrap_or_else(|| month.to_string())
}

/// GitHub-flavoured pipe table, columns padded to their widest cell.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(cell.len());
            }
        }
    }

    let line = |cells: Vec<&str>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!(" {:<width$} ", cell, width = width))
            .collect();
        format!("|{}|\n", padded.join("|"))
    };

    let mut out = line(headers.to_vec());
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
    out.push_str(&format!("|{}|\n", separator.join("|")));
    for row in rows {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
    out
}
