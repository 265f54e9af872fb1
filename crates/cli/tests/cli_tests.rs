// End-to-end tests of the `meterbill` binary.
//
// Every test runs with its own data directory and HOME so no user
// settings or history leak in.

mod common;

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use common::{broken_inventory_xlsx, inventory_xlsx, INVOICE_APRIL_JSON, INVOICE_JSON};

struct Env {
    dir: tempfile::TempDir,
}

impl Env {
    fn new() -> Self {
        let env = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        std::fs::write(env.path("march.json"), INVOICE_JSON).unwrap();
        std::fs::write(env.path("april.json"), INVOICE_APRIL_JSON).unwrap();
        std::fs::write(env.path("equipos.xlsx"), inventory_xlsx()).unwrap();
        std::fs::write(env.path("broken.xlsx"), broken_inventory_xlsx()).unwrap();
        env
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_meterbill"))
            .args(args)
            .env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.path("config"))
            .env("METERBILL_DATA_DIR", self.path("data"))
            .env_remove("RUST_LOG")
            .output()
            .expect("run meterbill")
    }

    fn reconcile(&self, invoice: &str, extra: &[&str]) -> Output {
        let doc = self.path(invoice);
        let inv = self.path("equipos.xlsx");
        let mut args = vec![
            "reconcile",
            "--document",
            doc.to_str().unwrap(),
            "--inventory",
            inv.to_str().unwrap(),
        ];
        args.extend_from_slice(extra);
        self.run(&args)
    }
}

fn json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "exit {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout must be a single JSON value: {}\n{}",
            e,
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn code(output: &Output) -> i32 {
    output.status.code().unwrap_or(-1)
}

fn saved_ids(env: &Env) -> Vec<i64> {
    let list = json(&env.run(&["history", "list", "--json"]));
    list.as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_i64().unwrap())
        .collect()
}

#[test]
fn reconcile_json_without_label_saves_nothing() {
    let env = Env::new();
    let val = json(&env.reconcile("march.json", &["--json"]));

    assert!(val.get("record").is_none());
    assert_eq!(val["summary"]["devices"], 3);
    assert_eq!(val["summary"]["unmatched"], 1);
    let devices = val["devices"].as_array().unwrap();
    assert_eq!(devices[0]["serial"], "ABC12345");
    assert_eq!(devices[0]["org_unit"], "Dept A");
    assert_eq!(devices[2]["status"], "unmatched-in-inventory");

    assert!(saved_ids(&env).is_empty());
}

#[test]
fn reconcile_human_table() {
    let env = Env::new();
    let out = env.reconcile("march.json", &[]);
    assert_eq!(code(&out), 0);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("ABC12345"));
    assert!(stdout.contains("3 device(s): 2 matched, 1 not in inventory"));
    assert!(stdout.contains("pre-tax 59.29"));
}

#[test]
fn reconcile_writes_exports() {
    let env = Env::new();
    let csv = env.path("out.csv");
    let xlsx = env.path("out.xlsx");
    let out = env.reconcile(
        "march.json",
        &["--csv", csv.to_str().unwrap(), "--xlsx", xlsx.to_str().unwrap()],
    );
    assert_eq!(code(&out), 0, "{}", String::from_utf8_lossy(&out.stderr));

    let text = std::fs::read_to_string(&csv).unwrap();
    assert_eq!(text.lines().count(), 4);
    assert!(text.starts_with("Serial,"));

    use calamine::{open_workbook_auto, Reader};
    let mut wb = open_workbook_auto(&xlsx).unwrap();
    let range = wb.worksheet_range("Reconciliation").unwrap();
    // header + 3 devices + totals
    assert_eq!(range.height(), 5);
}

#[test]
fn tsv_extension_selects_tabs() {
    let env = Env::new();
    let tsv = env.path("out.tsv");
    let out = env.reconcile("march.json", &["--csv", tsv.to_str().unwrap()]);
    assert_eq!(code(&out), 0, "{}", String::from_utf8_lossy(&out.stderr));

    let text = std::fs::read_to_string(&tsv).unwrap();
    assert_eq!(text.lines().count(), 4);
    assert!(text.starts_with("Serial\tOrg unit\t"));
}

#[test]
fn labelled_runs_are_saved_and_summarized() {
    let env = Env::new();
    let first = json(&env.reconcile("march.json", &["--label", "March", "--json"]));
    let second = json(&env.reconcile("april.json", &["--label", "April", "--json"]));
    let march = first["record"].as_i64().unwrap();
    let april = second["record"].as_i64().unwrap();
    assert!(april > march);
    assert_eq!(saved_ids(&env), vec![march, april]);

    let summary = json(&env.run(&["history", "summary", "--json"]));
    assert_eq!(summary["summary"]["devices"], 4);
    let docs: Vec<&str> = summary["by_document"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["key"].as_str().unwrap())
        .collect();
    assert_eq!(docs, vec!["March", "April"]);
    assert!(summary.get("devices").is_none());

    let detail = json(&env.run(&["history", "summary", "--org", "Dept A", "--json"]));
    assert_eq!(detail["devices"].as_array().unwrap().len(), 2);

    let cmp = json(&env.run(&[
        "history",
        "compare",
        &march.to_string(),
        &april.to_string(),
        "--json",
    ]));
    assert_eq!(cmp["before_label"], "March");
    assert_eq!(cmp["delta_devices"], -2);
}

#[test]
fn show_rename_delete() {
    let env = Env::new();
    let rec = json(&env.reconcile("march.json", &["--label", "March", "--json"]));
    let id = rec["record"].as_i64().unwrap().to_string();

    let shown = json(&env.run(&["history", "show", &id, "--org", "--json"]));
    assert_eq!(shown["label"], "March");
    assert!(shown.get("devices").is_none());
    assert_eq!(shown["by_org_unit"].as_array().unwrap().len(), 3);

    assert_eq!(code(&env.run(&["history", "rename", &id, "Marzo"])), 0);
    let shown = json(&env.run(&["history", "show", &id, "--json"]));
    assert_eq!(shown["label"], "Marzo");
    assert_eq!(shown["devices"].as_array().unwrap().len(), 3);

    assert_eq!(code(&env.run(&["history", "delete", &id])), 0);
    assert!(saved_ids(&env).is_empty());
    assert_eq!(code(&env.run(&["history", "show", &id])), 2);
}

#[test]
fn clear_requires_confirmation() {
    let env = Env::new();
    json(&env.reconcile("march.json", &["--label", "March", "--json"]));

    assert_eq!(code(&env.run(&["history", "clear"])), 2);
    assert_eq!(saved_ids(&env).len(), 1);

    assert_eq!(code(&env.run(&["history", "clear", "--yes"])), 0);
    assert!(saved_ids(&env).is_empty());
}

#[test]
fn duplicate_artifacts_are_reported() {
    let env = Env::new();
    let empty = json(&env.run(&["duplicates", "--json"]));
    assert_eq!(empty, serde_json::json!({}));

    json(&env.reconcile("march.json", &["--label", "one", "--json"]));
    json(&env.reconcile("march.json", &["--label", "two", "--json"]));

    let dups = json(&env.run(&["duplicates", "--json"]));
    let groups = dups.as_object().unwrap();
    // invoice, inventory and result table are each stored twice
    assert_eq!(groups.len(), 3);
    for (fingerprint, names) in groups {
        assert!(fingerprint.starts_with("sha256:"));
        assert_eq!(names.as_array().unwrap().len(), 2);
    }
}

#[test]
fn compare_needs_two_runs() {
    let env = Env::new();
    let rec = json(&env.reconcile("march.json", &["--label", "March", "--json"]));
    let id = rec["record"].as_i64().unwrap().to_string();
    assert_eq!(code(&env.run(&["history", "compare", &id, &id])), 2);
    assert_eq!(code(&env.run(&["history", "summary", "--ids", "1"])), 2);
}

#[test]
fn input_errors_map_to_exit_codes() {
    let env = Env::new();

    // blank label
    assert_eq!(code(&env.reconcile("march.json", &["--label", "  "])), 2);

    // missing file
    assert_eq!(code(&env.reconcile("absent.json", &[])), 3);

    // malformed table document
    std::fs::write(env.path("bad.json"), "{\"pages\": 3}").unwrap();
    assert_eq!(code(&env.reconcile("bad.json", &[])), 4);

    // serial sheet without location column
    let doc = env.path("march.json");
    let inv = env.path("broken.xlsx");
    let out = env.run(&[
        "reconcile",
        "--document",
        doc.to_str().unwrap(),
        "--inventory",
        inv.to_str().unwrap(),
    ]);
    assert_eq!(code(&out), 4);
    assert!(String::from_utf8_lossy(&out.stderr).contains("Ubicación exacta"));
    assert!(saved_ids(&env).is_empty());
}

#[test]
fn data_dir_flag_overrides_env() {
    let env = Env::new();
    let other = env.path("other");
    let doc = env.path("march.json");
    let inv = env.path("equipos.xlsx");
    let out = env.run(&[
        "--data-dir",
        other.to_str().unwrap(),
        "reconcile",
        "--document",
        doc.to_str().unwrap(),
        "--inventory",
        inv.to_str().unwrap(),
        "--label",
        "March",
    ]);
    assert_eq!(code(&out), 0);
    assert!(Path::new(&other).join("history.json").exists());
    assert!(saved_ids(&env).is_empty());
}
