use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// A command isolated from the caller's config file and DAYLINKS_* variables.
fn daylinks(config_home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("daylinks"));
    cmd.env("XDG_CONFIG_HOME", config_home);
    for key in [
        "DAYLINKS_VAULT",
        "DAYLINKS_DAYS",
        "DAYLINKS_EXPORT_DIR",
        "DAYLINKS_MAX_DEPTH",
        "DAYLINKS_TIMESTAMP",
        "DAYLINKS_NO_TREE",
        "RUST_LOG",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

#[test]
fn export_prints_json_report() {
    let tmp = tempdir().unwrap();
    let vault = tmp.path().join("vault");
    let out = tmp.path().join("out");
    write(&vault, "2026-01-21.md", "Met about [[Linked Page]]");
    write(&vault, "Linked Page.md", "the page");

    let assert = daylinks(tmp.path())
        .arg("export")
        .arg("--vault")
        .arg(&vault)
        .arg("--out")
        .arg(&out)
        .args(["--days", "1", "--timestamp", "2026-01-21T08:00:00", "--no-tree", "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(report["files_copied"], 2);
    assert_eq!(report["daily_notes"], 1);
    assert_eq!(report["used_listing_tool"], false);
    assert_eq!(report["notes_packaged"], 2);

    let dest = out.join("export-20260121-080000");
    assert!(dest.join("Linked Page.md").is_file());
    assert!(dest.join("export-manifest.md").is_file());
    assert!(dest.join("export.xml").is_file());
}

#[test]
fn export_reads_vault_from_environment() {
    let tmp = tempdir().unwrap();
    let vault = tmp.path().join("vault");
    write(&vault, "2026-01-21.md", "no links");

    daylinks(tmp.path())
        .env("DAYLINKS_VAULT", &vault)
        .env("DAYLINKS_EXPORT_DIR", tmp.path().join("out"))
        .env("DAYLINKS_TIMESTAMP", "2026-01-21")
        .env("DAYLINKS_NO_TREE", "1")
        .arg("export")
        .assert()
        .success()
        .stdout(predicate::str::contains("Export complete:"))
        .stdout(predicate::str::contains("Files copied:   1"))
        .stdout(predicate::str::contains("- 2026-01-21.md"));
}

#[test]
fn export_without_vault_fails_fast() {
    let tmp = tempdir().unwrap();

    daylinks(tmp.path())
        .arg("export")
        .assert()
        .failure()
        .stderr(predicate::str::contains("vault root is not configured"));
}

#[test]
fn export_rejects_bad_timestamp() {
    let tmp = tempdir().unwrap();

    daylinks(tmp.path())
        .args(["export", "--vault", "/tmp", "--timestamp", "someday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("someday"));
}

#[test]
fn export_uses_profile_from_config() {
    let tmp = tempdir().unwrap();
    let vault = tmp.path().join("vault");
    write(&vault, "Journal/Jan 21, 2026.md", "[[Topic]]");
    write(&vault, "Topic.md", "topic");

    let config = tmp.path().join("config.toml");
    fs::write(
        &config,
        format!(
            r#"
version = 1
profile = "test"

[profiles.test]
vault_root = "{}"
export_dir = "{}"
days_back = 1
use_listing_tool = false
"#,
            vault.display(),
            tmp.path().join("exports").display()
        ),
    )
    .unwrap();

    daylinks(tmp.path())
        .arg("--config")
        .arg(&config)
        .args(["export", "--timestamp", "2026-01-21T10:00:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Files copied:   2"))
        .stdout(predicate::str::contains("- Journal/Jan 21, 2026.md"));
}
