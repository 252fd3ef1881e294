// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::Transaction;
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub const APP_TITLE: &str = "SmallBiz BookKeeping Pro";

pub fn handle(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(ledger, sub),
        Some(("pdf", sub)) => export_pdf(sub),
        _ => Ok(()),
    }
}

/// All transactions, or only the ones named by `--ids` when that flag is given.
pub fn select<'a>(ledger: &'a Ledger, ids: Option<&[String]>) -> Result<Vec<&'a Transaction>> {
    let Some(ids) = ids else {
        return Ok(ledger.all().iter().collect());
    };
    let picked: Vec<&Transaction> = ids.iter().filter_map(|id| ledger.get(id)).collect();
    if picked.is_empty() {
        bail!("Please select transactions to export");
    }
    Ok(picked)
}

fn export_transactions(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let ids: Option<Vec<String>> = sub
        .get_many::<String>("ids")
        .map(|v| v.map(|s| s.trim().to_string()).collect());
    let rows = select(ledger, ids.as_deref())?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Create spreadsheet {}", out))?;
            write_rows(&mut wtr, &rows)?;
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)
                .with_context(|| format!("Write {}", out))?;
        }
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    info!(count = rows.len(), out = %out, "transactions exported");
    println!("Exported {} transaction(s) to {}", rows.len(), out);
    Ok(())
}

pub fn write_rows<W: Write>(wtr: &mut csv::Writer<W>, rows: &[&Transaction]) -> Result<()> {
    wtr.write_record([
        "id",
        "date",
        "type",
        "category",
        "description",
        "amount",
        "notes",
    ])?;
    for t in rows {
        wtr.write_record([
            t.id.clone(),
            t.date.to_string(),
            t.r#type.to_string(),
            t.category.clone(),
            t.description.clone(),
            t.amount.to_string(),
            t.notes.clone().unwrap_or_default(),
        ])?;
    }
    Ok(())
}

fn export_pdf(sub: &clap::ArgMatches) -> Result<()> {
    let report = sub.get_one::<String>("report").unwrap();
    let out = sub.get_one::<String>("out").unwrap();
    write_placeholder_pdf(Path::new(out), report, chrono::Local::now().date_naive())?;
    info!(report = %report, out = %out, "placeholder document written");
    println!("Wrote {}", out);
    println!("PDF export writes the report title only; report content is not rendered yet");
    Ok(())
}

pub fn write_placeholder_pdf(path: &Path, report: &str, generated: NaiveDate) -> Result<()> {
    let bytes = placeholder_pdf(report, generated);
    std::fs::write(path, bytes).with_context(|| format!("Write {}", path.display()))
}

fn pdf_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// A single A4 page holding the title, the report label and the date.
pub fn placeholder_pdf(report: &str, generated: NaiveDate) -> Vec<u8> {
    let lines = [
        (16, 785, APP_TITLE.to_string()),
        (12, 757, format!("Report: {}", report)),
        (12, 729, format!("Generated: {}", generated)),
    ];
    let mut content = String::new();
    for (size, y, text) in &lines {
        content.push_str(&format!(
            "BT /F1 {} Tf 57 {} Td ({}) Tj ET\n",
            size,
            y,
            pdf_escape(text)
        ));
    }

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 595 842] /Contents 4 0 R \
         /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut buf: Vec<u8> = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(buf.len());
        buf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }
    let xref_at = buf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for off in offsets {
        xref.push_str(&format!("{:010} 00000 n \n", off));
    }
    buf.extend_from_slice(xref.as_bytes());
    buf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        )
        .as_bytes(),
    );
    buf
}
