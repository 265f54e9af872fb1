//! `meterbill reconcile` — one invoice against one inventory.

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use meterbill_cli::pipeline::reconcile_bytes;
use meterbill_cli::session::{Event, Submission};
use meterbill_recon::summary::{compute_summary, Summary};
use meterbill_recon::ReconciledDevice;
use meterbill_store::RecordId;

use crate::{print_json, print_with, read_input, render, CliError, Context};

#[derive(Serialize)]
struct ReconcileOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<RecordId>,
    summary: Summary,
    devices: &'a [ReconciledDevice],
}

pub fn cmd_reconcile(
    ctx: &Context,
    document: PathBuf,
    inventory: PathBuf,
    label: Option<String>,
    json: bool,
    csv_out: Option<PathBuf>,
    xlsx_out: Option<PathBuf>,
) -> Result<(), CliError> {
    let (doc_bytes, doc_name) = read_input(&document)?;
    let (inv_bytes, inv_name) = read_input(&inventory)?;

    let (record, rows) = match label {
        Some(label) => {
            let mut state = ctx.open_state();
            state.apply(Event::Submit(Submission {
                label,
                document: doc_bytes,
                document_name: doc_name,
                inventory: inv_bytes,
                inventory_name: inv_name,
            }))?;
            let id = state
                .selected
                .ok_or_else(|| CliError::store("run was not recorded"))?;
            let rows = state
                .store
                .get(id)
                .and_then(|r| r.devices.clone())
                .unwrap_or_default();
            eprintln!("saved as record {}", id);
            (Some(id), rows)
        }
        None => (None, reconcile_bytes(&doc_bytes, &inv_bytes, &ctx.pricing)?),
    };

    if let Some(path) = &csv_out {
        let file = File::create(path)
            .map_err(|e| CliError::io(format!("cannot create {}: {}", path.display(), e)))?;
        let tsv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
        let written = if tsv {
            meterbill_io::csv::export_result_tsv(&rows, file)
        } else {
            meterbill_io::csv::export_result(&rows, file)
        };
        written.map_err(CliError::from_io)?;
    }
    if let Some(path) = &xlsx_out {
        let bytes = meterbill_io::xlsx::export_result(&rows).map_err(CliError::from_io)?;
        fs::write(path, bytes)
            .map_err(|e| CliError::io(format!("cannot write {}: {}", path.display(), e)))?;
    }

    let summary = compute_summary(&rows);
    if json {
        return print_json(&ReconcileOutput {
            record,
            summary,
            devices: &rows,
        });
    }

    print_with(|out| {
        render::devices(out, &rows)?;
        writeln!(out)?;
        render::summary(out, &summary)
    })
}
