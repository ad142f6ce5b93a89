use chrono::{NaiveDate, NaiveDateTime};
use daylinks_core::config::ExportConfig;
use daylinks_core::export::MANIFEST_FILE_NAME;
use daylinks_core::index::TreeCommand;
use daylinks_core::package::{AGGREGATE_FILE_NAME, Packager};
use daylinks_core::vault::RealFs;
use daylinks_core::Exporter;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn frozen(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(12, 0, 0).unwrap()
}

fn config(vault: &Path, exports: &Path, days: u32) -> ExportConfig {
    let mut config = ExportConfig::new(vault).unwrap();
    config.days_back = days;
    config.export_base = exports.to_path_buf();
    config.timestamp = Some(frozen(2026, 1, 21));
    config.use_listing_tool = false;
    config
}

#[test]
fn exports_daily_note_and_linked_page() {
    let tmp = tempdir().unwrap();
    let vault = tmp.path().join("vault");
    let daily = "# Wednesday\n\nWorked on [[Linked Page]].\n";
    let linked = "Details with <html> & \"quotes\" ]]> kept verbatim.\n";
    write(&vault, "2026-01-21.md", daily);
    write(&vault, "Linked Page.md", linked);
    write(&vault, "Unlinked.md", "not part of the export");

    let report = Exporter::new(config(&vault, &tmp.path().join("out"), 1)).run().unwrap();

    assert_eq!(report.files_copied, 2);
    assert_eq!(report.daily_notes, 1);
    assert!(report.destination.ends_with("export-20260121-120000"));
    assert_eq!(fs::read_to_string(report.destination.join("2026-01-21.md")).unwrap(), daily);
    assert_eq!(fs::read_to_string(report.destination.join("Linked Page.md")).unwrap(), linked);
    assert!(!report.destination.join("Unlinked.md").exists());

    let manifest = fs::read_to_string(report.destination.join(MANIFEST_FILE_NAME)).unwrap();
    assert!(manifest.contains("- Days back: 1"));
    assert!(manifest.contains("- Files copied: 2"));
    assert!(manifest.contains("- 2026-01-21.md ("));
    assert!(manifest.contains("- Linked Page.md ("));

    let doc = fs::read_to_string(report.destination.join(AGGREGATE_FILE_NAME)).unwrap();
    assert_eq!(report.aggregate_path, report.destination.join(AGGREGATE_FILE_NAME));
    assert_eq!(doc.matches("<note>").count(), 2);
    assert!(doc.contains(&format!("<content><![CDATA[{daily}]]></content>")));
    assert!(doc.contains(
        "<content><![CDATA[Details with <html> & \"quotes\" ]]]]><![CDATA[> kept verbatim.\n]]></content>"
    ));
    assert!(!doc.contains(MANIFEST_FILE_NAME));
}

#[test]
fn escapes_markup_unsafe_file_names() {
    let tmp = tempdir().unwrap();
    let vault = tmp.path().join("vault");
    write(&vault, "2026-01-21.md", "[[R&D 'Ideas']]");
    write(&vault, "Lab/R&D 'Ideas'.md", "raw & body");

    let report = Exporter::new(config(&vault, &tmp.path().join("out"), 1)).run().unwrap();
    let doc = fs::read_to_string(&report.aggregate_path).unwrap();

    assert!(doc.contains("<filename>R&amp;D &apos;Ideas&apos;.md</filename>"));
    assert!(doc.contains("<path>Lab/R&amp;D &apos;Ideas&apos;.md</path>"));
    assert!(doc.contains("<content><![CDATA[raw & body]]></content>"));
}

#[test]
fn shared_and_cyclic_links_across_several_days() {
    let tmp = tempdir().unwrap();
    let vault = tmp.path().join("vault");
    write(&vault, "2026-01-21.md", "[[Project X]]");
    write(&vault, "Journal/January 20, 2026.md", "[[Project X]] and [[Missing]]");
    write(&vault, "Projects/Project X.md", "[[Project X Notes]]");
    write(&vault, "Projects/Project X Notes.md", "back to [[Project X]]");
    write(&vault, "2026-01-10.md", "outside the window");

    let report = Exporter::new(config(&vault, &tmp.path().join("out"), 3)).run().unwrap();

    assert_eq!(report.daily_note_paths, vec!["2026-01-21.md", "Journal/January 20, 2026.md"]);
    assert_eq!(report.files_copied, 4);
    assert_eq!(report.unresolved_links.len(), 1);
    assert_eq!(report.unresolved_links[0].target, "Missing");
    assert!(report.destination.join("Projects/Project X Notes.md").is_file());
    assert!(!report.destination.join("2026-01-10.md").exists());
}

#[test]
fn depth_limit_is_configurable() {
    let tmp = tempdir().unwrap();
    let vault = tmp.path().join("vault");
    write(&vault, "2026-01-21.md", "[[One]]");
    write(&vault, "One.md", "[[Two]]");
    write(&vault, "Two.md", "[[Three]]");
    write(&vault, "Three.md", "");

    let mut cfg = config(&vault, &tmp.path().join("out"), 1);
    cfg.max_depth = 1;
    let report = Exporter::new(cfg).run().unwrap();

    assert_eq!(report.files_copied, 2);
    assert!(!report.destination.join("Two.md").exists());
}

#[test]
fn listing_tool_and_traversal_agree() {
    let tmp = tempdir().unwrap();
    let vault = tmp.path().join("vault");
    write(&vault, "2026-01-21.md", "[[Topic]]");
    write(&vault, "a/Topic.md", "lower");
    write(&vault, "B/Topic.md", "upper");

    let mut with_tool = config(&vault, &tmp.path().join("tool"), 1);
    with_tool.use_listing_tool = true;
    let tool_report = Exporter::new(with_tool).run().unwrap();
    let walk_report = Exporter::new(config(&vault, &tmp.path().join("walk"), 1)).run().unwrap();

    assert_eq!(tool_report.used_listing_tool, TreeCommand::probe().is_some());
    assert!(!walk_report.used_listing_tool);
    for report in [&tool_report, &walk_report] {
        assert_eq!(report.files_copied, 2);
        assert!(report.destination.join("B/Topic.md").is_file());
        assert!(!report.destination.join("a/Topic.md").exists());
    }
}

#[test]
fn exports_inside_the_vault_are_ignored_on_later_runs() {
    let tmp = tempdir().unwrap();
    let vault = tmp.path().join("vault");
    write(&vault, "2026-01-21.md", "[[Topic]]");
    write(&vault, "zz/Topic.md", "current");
    write(&vault, ".exports/old/Topic.md", "hidden copy");
    write(&vault, "exports/export-20250101-000000/Topic.md", "stale copy");

    let report = Exporter::new(config(&vault, &vault.join("exports"), 1)).run().unwrap();

    assert_eq!(fs::read_to_string(report.destination.join("zz/Topic.md")).unwrap(), "current");
}

#[test]
fn export_base_can_be_the_vault_itself() {
    let tmp = tempdir().unwrap();
    let vault = tmp.path().join("vault");
    write(&vault, "2026-01-21.md", "[[Linked Page]]");
    write(&vault, "Linked Page.md", "linked");
    write(&vault, "export-20260120-120000/Linked Page.md", "stale copy");

    let report = Exporter::new(config(&vault, &vault, 1)).run().unwrap();

    assert_eq!(report.files_copied, 2);
    assert!(report.unresolved_links.is_empty());
    assert_eq!(
        fs::read_to_string(report.destination.join("Linked Page.md")).unwrap(),
        "linked"
    );
}

#[test]
fn packager_runs_standalone_and_is_idempotent() {
    let tmp = tempdir().unwrap();
    write(tmp.path(), "b.md", "B");
    write(tmp.path(), "a/nested.md", "N");
    write(tmp.path(), "image.png", "binary");

    let fs_impl = RealFs;
    let packager = Packager::new(&fs_impl);
    let first = packager.package(tmp.path()).unwrap();
    let first_doc = fs::read(&first.path).unwrap();
    let second = packager.package(tmp.path()).unwrap();

    assert_eq!(first.notes, 2);
    assert_eq!(fs::read(&second.path).unwrap(), first_doc);
    let doc = String::from_utf8(first_doc).unwrap();
    assert!(doc.find("<path>a/nested.md</path>").unwrap() < doc.find("<path>b.md</path>").unwrap());
}
