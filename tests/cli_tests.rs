//! Black-box tests for the `invoice-forge` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use invoice_forge::model::InvoiceDocument;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.toml"), "[export]\nsettle_delay_ms = 0\n").unwrap();
        let mut doc = InvoiceDocument {
            invoice_number: "INV/001".to_string(),
            date: "2024-05-01".to_string(),
            ..InvoiceDocument::default()
        };
        doc.recipient.name = "A & B Co.".to_string();
        doc.tax_rate = 10.0;
        fs::write(dir.path().join("doc.json"), doc.to_json().unwrap()).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("invoice-forge").unwrap();
        cmd.current_dir(self.path())
            .arg("--config")
            .arg(self.path().join("config.toml"))
            .arg("--store")
            .arg(self.path().join("store.json"))
            .env_remove("API_KEY");
        cmd
    }
}

#[test]
fn templates_lists_every_design() {
    let ws = Workspace::new();
    let out = ws.cmd().arg("templates").assert().success().get_output().stdout.clone();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 35);
    assert!(text.contains("GRID_TECH"));
}

#[test]
fn presets_lists_kinds_and_currencies() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("presets")
        .assert()
        .success()
        .stdout(predicate::str::contains("CREDIT NOTE"))
        .stdout(predicate::str::contains("MYR (RM)"))
        .stdout(predicate::str::contains("Warm Ivory"));
}

#[test]
fn totals_prints_derived_amounts() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["totals", "--input", "doc.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Subtotal  $1,000.00"))
        .stdout(predicate::str::contains("Total     $1,100.00"));
}

#[test]
fn render_writes_preview_html() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["render", "--input", "doc.json", "--template", "minimal-clean", "--output", "preview.html"])
        .assert()
        .success();
    let html = fs::read_to_string(ws.path().join("preview.html")).unwrap();
    assert!(html.contains(r#"id="invoice-preview""#));
}

#[test]
fn export_prints_the_derived_filename() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["export", "--input", "doc.json", "--format", "pdf", "--out-dir", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Invoice-INV001_A_B_Co.pdf"));
    let bytes = fs::read(ws.path().join("out").join("Invoice-INV001_A_B_Co.pdf")).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn unknown_format_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["export", "--input", "doc.json", "--format", "docx"])
        .assert()
        .failure();
}

#[test]
fn sign_in_round_trip() {
    let ws = Workspace::new();
    ws.cmd().arg("whoami").assert().success().stdout(predicate::str::contains("Not signed in"));
    ws.cmd().arg("login").assert().success().stdout(predicate::str::contains("Signed in as User"));
    ws.cmd().arg("whoami").assert().success().stdout("User\n");
    ws.cmd().arg("logout").assert().success();
    ws.cmd().arg("whoami").assert().success().stdout(predicate::str::contains("Not signed in"));
}

#[test]
fn profiles_replace_by_name() {
    let ws = Workspace::new();
    for address in ["1 Road", "2 Road"] {
        ws.cmd()
            .args(["profile", "save", "--kind", "client", "--name", "Globex", "--address", address])
            .assert()
            .success();
    }
    let out = ws.cmd().args(["profile", "list", "--kind", "client"]).assert().success().get_output().stdout.clone();
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);

    ws.cmd()
        .args(["profile", "save", "--kind", "sender", "--name", "  "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs a name"));
}

#[test]
fn draft_save_then_show() {
    let ws = Workspace::new();
    ws.cmd().args(["draft", "show"]).assert().success().stdout("No draft\n");
    ws.cmd().args(["draft", "save", "--input", "doc.json"]).assert().success();
    ws.cmd()
        .args(["draft", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("INV/001"));
}

#[test]
fn assist_without_credential_is_unavailable() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["assist", "--context", "terms", "net 30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not available"));
}
