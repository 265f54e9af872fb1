//! `meterbill history` and `meterbill duplicates` — saved runs.

use std::collections::BTreeMap;
use std::io::Write;

use clap::Subcommand;
use serde::Serialize;

use meterbill_cli::session::{AppState, Event, ViewMode};
use meterbill_recon::aggregate::{
    group_by_document, group_by_org_unit, DetailFilter, GroupTotals, TaggedDevice,
};
use meterbill_recon::compare::{compare, Comparison};
use meterbill_recon::summary::{compute_summary, Summary};
use meterbill_recon::ReconciledDevice;
use meterbill_store::{find_duplicates, Record, RecordId, RecordMeta};

use crate::{print_json, print_with, render, CliError, Context};

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List saved runs, oldest first
    List {
        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Show one saved run
    #[command(after_help = "\
Examples:
  meterbill history show 1710000000000
  meterbill history show 1710000000000 --org")]
    Show {
        id: RecordId,

        /// Totals per organizational unit instead of per device
        #[arg(long)]
        org: bool,

        #[arg(long)]
        json: bool,
    },

    /// Change the label of a saved run
    Rename { id: RecordId, label: String },

    /// Delete a saved run and its stored files
    Delete { id: RecordId },

    /// Delete every saved run
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },

    /// Aggregate saved runs
    #[command(after_help = "\
Examples:
  meterbill history summary
  meterbill history summary --ids 1710000000000,1712000000000
  meterbill history summary --org 'Dept A' --document March")]
    Summary {
        /// Only these runs (comma-separated ids); default all
        #[arg(long, value_delimiter = ',')]
        ids: Vec<RecordId>,

        /// List devices of this organizational unit
        #[arg(long)]
        org: Option<String>,

        /// List devices of the run with this label
        #[arg(long)]
        document: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Compare two saved runs (second minus first)
    Compare {
        before: RecordId,
        after: RecordId,

        #[arg(long)]
        json: bool,
    },
}

pub fn cmd_history(ctx: &Context, cmd: HistoryCommands) -> Result<(), CliError> {
    let mut state = ctx.open_state();
    match cmd {
        HistoryCommands::List { json } => cmd_list(&state, json),
        HistoryCommands::Show { id, org, json } => cmd_show(&mut state, id, org, json),
        HistoryCommands::Rename { id, label } => {
            state.apply(Event::Rename { id, label })?;
            eprintln!("renamed record {}", id);
            Ok(())
        }
        HistoryCommands::Delete { id } => {
            state.apply(Event::Delete(id))?;
            eprintln!("deleted record {}", id);
            Ok(())
        }
        HistoryCommands::Clear { yes } => {
            if !yes {
                return Err(CliError::args("refusing to delete all history")
                    .with_hint("pass --yes to confirm"));
            }
            let n = state.store.len();
            state.apply(Event::ClearHistory)?;
            eprintln!("deleted {} record(s)", n);
            Ok(())
        }
        HistoryCommands::Summary {
            ids,
            org,
            document,
            json,
        } => cmd_summary(&mut state, ids, DetailFilter { org_unit: org, document }, json),
        HistoryCommands::Compare {
            before,
            after,
            json,
        } => cmd_compare(&mut state, before, after, json),
    }
}

// ============================================================================
// list / show
// ============================================================================

fn cmd_list(state: &AppState, json: bool) -> Result<(), CliError> {
    if json {
        let metas: Vec<&RecordMeta> = state.store.records().iter().map(|r| &r.meta).collect();
        return print_json(&metas);
    }
    if state.store.is_empty() {
        eprintln!("no saved runs");
        return Ok(());
    }
    print_with(|out| render::records(out, state.store.records()))
}

#[derive(Serialize)]
struct ShowOutput<'a> {
    #[serde(flatten)]
    meta: &'a RecordMeta,
    summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    devices: Option<&'a [ReconciledDevice]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    by_org_unit: Option<Vec<GroupTotals>>,
}

fn devices_of(record: &Record) -> Result<&[ReconciledDevice], CliError> {
    record.devices.as_deref().ok_or_else(|| {
        CliError::store(format!("result table for record {} is missing", record.id()))
    })
}

fn cmd_show(state: &mut AppState, id: RecordId, org: bool, json: bool) -> Result<(), CliError> {
    state.apply(Event::ShowRecord(id))?;
    let record = state
        .store
        .get(id)
        .ok_or_else(|| CliError::args(format!("no record with id {}", id)))?;
    let rows = devices_of(record)?;
    let summary = compute_summary(rows);
    let groups = org.then(|| group_by_org_unit(rows));

    if json {
        return print_json(&ShowOutput {
            meta: &record.meta,
            summary,
            devices: if org { None } else { Some(rows) },
            by_org_unit: groups,
        });
    }

    let m = &record.meta;
    print_with(|out| {
        writeln!(out, "{} ({})", m.label, m.created_at)?;
        writeln!(out, "document:  {}", m.document_name)?;
        writeln!(out, "inventory: {}", m.inventory_name)?;
        writeln!(out)?;
        match &groups {
            Some(g) => render::groups(out, "ORG UNIT", g)?,
            None => render::devices(out, rows)?,
        }
        writeln!(out)?;
        render::summary(out, &summary)
    })
}

// ============================================================================
// summary
// ============================================================================

#[derive(Serialize)]
struct SummaryOutput<'a> {
    summary: Summary,
    by_document: Vec<GroupTotals>,
    by_org_unit: Vec<GroupTotals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    devices: Option<Vec<&'a TaggedDevice>>,
}

fn cmd_summary(
    state: &mut AppState,
    ids: Vec<RecordId>,
    filter: DetailFilter,
    json: bool,
) -> Result<(), CliError> {
    state.apply(Event::ShowAccumulated)?;
    if state.view != ViewMode::Accumulated {
        return Err(CliError::args("no saved runs to aggregate"));
    }

    let selection = (!ids.is_empty()).then_some(ids.as_slice());
    let rows = state
        .store
        .accumulate(selection)
        .ok_or_else(|| CliError::args("none of the given ids are saved runs"))?;

    let summary = compute_summary(rows.iter().map(|r| &r.device));
    let by_document = group_by_document(&rows);
    let by_org_unit = group_by_org_unit(rows.iter().map(|r| &r.device));
    let detail = (filter != DetailFilter::default()).then(|| filter.apply(&rows));

    if json {
        return print_json(&SummaryOutput {
            summary,
            by_document,
            by_org_unit,
            devices: detail,
        });
    }

    print_with(|out| {
        render::summary(out, &summary)?;
        writeln!(out)?;
        render::groups(out, "RUN", &by_document)?;
        writeln!(out)?;
        render::groups(out, "ORG UNIT", &by_org_unit)?;
        if let Some(detail) = &detail {
            writeln!(out)?;
            let devices: Vec<ReconciledDevice> =
                detail.iter().map(|r| r.device.clone()).collect();
            render::devices(out, &devices)?;
        }
        Ok(())
    })
}

// ============================================================================
// compare
// ============================================================================

#[derive(Serialize)]
struct CompareOutput<'a> {
    before_label: &'a str,
    after_label: &'a str,
    #[serde(flatten)]
    comparison: Comparison,
}

fn cmd_compare(
    state: &mut AppState,
    before: RecordId,
    after: RecordId,
    json: bool,
) -> Result<(), CliError> {
    state.apply(Event::ShowCompare)?;
    if state.view != ViewMode::Compare {
        return Err(CliError::args("comparison needs at least two saved runs"));
    }

    let store = &state.store;
    let lookup = move |id: RecordId| {
        store
            .get(id)
            .ok_or_else(|| CliError::args(format!("no record with id {}", id)))
    };
    let a = lookup(before)?;
    let b = lookup(after)?;
    let comparison = compare(devices_of(a)?, devices_of(b)?);

    if json {
        return print_json(&CompareOutput {
            before_label: a.label(),
            after_label: b.label(),
            comparison,
        });
    }
    print_with(|out| render::comparison(out, a.label(), b.label(), &comparison))
}

// ============================================================================
// duplicates
// ============================================================================

pub fn cmd_duplicates(ctx: &Context, json: bool) -> Result<(), CliError> {
    let state = ctx.open_state();
    let dir = state.store.layout().documents_dir();
    let groups: BTreeMap<String, Vec<String>> = if dir.is_dir() {
        find_duplicates(&dir).map_err(|e| CliError::store(e.to_string()))?
    } else {
        BTreeMap::new()
    };

    if json {
        return print_json(&groups);
    }
    if groups.is_empty() {
        eprintln!("no duplicate files");
        return Ok(());
    }
    print_with(|out| {
        for (fingerprint, names) in &groups {
            writeln!(out, "{}", fingerprint)?;
            for name in names {
                writeln!(out, "  {}", name)?;
            }
        }
        Ok(())
    })
}
