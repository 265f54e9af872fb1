// Session lifecycle tests: events drive the store and the view.

mod common;

use meterbill_cli::session::{AppState, Event, SessionError, Submission, ViewMode};
use meterbill_recon::{DeviceStatus, Pricing};
use meterbill_store::RecordId;

use common::{broken_inventory_xlsx, inventory_xlsx, INVOICE_APRIL_JSON, INVOICE_JSON};

fn submission(label: &str, invoice: &str) -> Submission {
    Submission {
        label: label.into(),
        document: invoice.as_bytes().to_vec(),
        document_name: format!("{label}.json"),
        inventory: inventory_xlsx(),
        inventory_name: "equipos.xlsx".into(),
    }
}

fn submit(state: &mut AppState, label: &str, invoice: &str) -> RecordId {
    state
        .apply(Event::Submit(submission(label, invoice)))
        .unwrap();
    state.selected.unwrap()
}

#[test]
fn submit_saves_and_selects() {
    let dir = tempfile::tempdir().unwrap();
    let (mut state, warnings) = AppState::open(dir.path(), Pricing::STANDARD);
    assert!(warnings.is_empty());
    assert_eq!(state.view, ViewMode::New);

    let id = submit(&mut state, "March", INVOICE_JSON);
    assert_eq!(state.view, ViewMode::Record);

    let record = state.store.get(id).unwrap();
    assert_eq!(record.label(), "March");
    assert_eq!(record.meta.document_name, "March.json");
    assert_eq!(record.meta.device_count, 3);
    assert!((record.meta.total_pre_tax - 59.29).abs() < 1e-9);

    let rows = record.devices.as_ref().unwrap();
    let serials: Vec<&str> = rows.iter().map(|d| d.serial.as_str()).collect();
    assert_eq!(serials, vec!["ABC12345", "LMN45678", "XYZ99999"]);
    assert_eq!(rows[2].status, DeviceStatus::UnmatchedInInventory);

    // A fresh session sees the same history.
    let (reopened, _) = AppState::open(dir.path(), Pricing::STANDARD);
    assert_eq!(reopened.store.records(), state.store.records());
    assert_eq!(reopened.view, ViewMode::New);
    assert_eq!(reopened.selected, None);
}

#[test]
fn failed_reconciliation_is_not_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let (mut state, _) = AppState::open(dir.path(), Pricing::STANDARD);

    let mut sub = submission("March", INVOICE_JSON);
    sub.inventory = broken_inventory_xlsx();
    let err = state.apply(Event::Submit(sub)).unwrap_err();
    assert!(matches!(err, SessionError::Recon(_)));
    assert!(state.store.is_empty());
    assert_eq!(state.view, ViewMode::New);
}

#[test]
fn aggregate_views_need_history() {
    let dir = tempfile::tempdir().unwrap();
    let (mut state, _) = AppState::open(dir.path(), Pricing::STANDARD);

    state.apply(Event::ShowAccumulated).unwrap();
    assert_eq!(state.view, ViewMode::New);

    submit(&mut state, "March", INVOICE_JSON);
    state.apply(Event::ShowCompare).unwrap();
    assert_eq!(state.view, ViewMode::Record);
    state.apply(Event::ShowAccumulated).unwrap();
    assert_eq!(state.view, ViewMode::Accumulated);

    submit(&mut state, "April", INVOICE_APRIL_JSON);
    state.apply(Event::ShowCompare).unwrap();
    assert_eq!(state.view, ViewMode::Compare);
}

#[test]
fn rename_delete_clear() {
    let dir = tempfile::tempdir().unwrap();
    let (mut state, _) = AppState::open(dir.path(), Pricing::STANDARD);
    let march = submit(&mut state, "March", INVOICE_JSON);
    let april = submit(&mut state, "April", INVOICE_APRIL_JSON);
    assert!(april > march);

    state
        .apply(Event::Rename { id: march, label: "  March 2024 ".into() })
        .unwrap();
    assert_eq!(state.store.get(march).unwrap().label(), "March 2024");
    assert!(matches!(
        state.apply(Event::Rename { id: march, label: " ".into() }),
        Err(SessionError::Input(_))
    ));

    // Deleting the selected record clears the selection.
    state.apply(Event::ShowRecord(april)).unwrap();
    state.apply(Event::Delete(april)).unwrap();
    assert_eq!(state.selected, None);
    assert_eq!(state.view, ViewMode::New);
    assert_eq!(state.store.len(), 1);

    // Deleting something else keeps it.
    state.apply(Event::ShowRecord(march)).unwrap();
    assert!(state.apply(Event::Delete(RecordId(1))).is_err());
    assert_eq!(state.selected, Some(march));

    state.apply(Event::ShowAccumulated).unwrap();
    state.apply(Event::ClearHistory).unwrap();
    assert_eq!(state.view, ViewMode::New);
    assert!(state.store.is_empty());
    assert!(!state.store.layout().index_path().exists());
}

#[test]
fn accumulated_rows_are_tagged_by_label() {
    let dir = tempfile::tempdir().unwrap();
    let (mut state, _) = AppState::open(dir.path(), Pricing::STANDARD);
    submit(&mut state, "March", INVOICE_JSON);
    submit(&mut state, "April", INVOICE_APRIL_JSON);

    let rows = state.store.accumulate(None).unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].document, "March");
    assert_eq!(rows[3].document, "April");
    assert_eq!(rows[3].device.serial, "ABC12345");
}
