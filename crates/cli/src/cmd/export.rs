//! Export command implementation.

use std::path::Path;

use daylinks_core::Exporter;
use daylinks_core::config::loader::parse_timestamp;
use daylinks_core::config::{ConfigLoader, ExportSettings};
use tracing::error;

use super::fail;
use crate::ExportArgs;
use crate::logging::Verbosity;

/// Run the export command.
pub fn run(
    config: Option<&Path>,
    profile: Option<&str>,
    args: ExportArgs,
    verbosity: Verbosity,
) {
    let mut settings =
        match ConfigLoader::load_settings(config, profile, |key| std::env::var(key).ok()) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        };

    if let Err(e) = crate::logging::init(&settings.logging, verbosity) {
        eprintln!("Failed to open log file {e}");
        std::process::exit(1);
    }

    let timestamp = match args.timestamp.as_deref().map(parse_timestamp).transpose() {
        Ok(ts) => ts,
        Err(e) => {
            error!("{e}");
            fail();
        }
    };

    settings.merge(ExportSettings {
        vault_root: args.vault,
        days_back: args.days,
        export_base: args.out,
        max_depth: args.max_depth,
        timestamp,
        use_listing_tool: args.no_tree.then_some(false),
        ..ExportSettings::default()
    });

    let cfg = match settings.resolve() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load config: {e}");
            fail();
        }
    };

    let report = match Exporter::new(cfg).run() {
        Ok(report) => report,
        Err(e) => {
            error!("Export failed: {e}");
            fail();
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("Failed to serialize report: {e}");
                fail();
            }
        }
    } else {
        println!("Export complete:");
        println!("  Destination:    {}", report.destination.display());
        println!("  Daily notes:    {}", report.daily_notes);
        for path in &report.daily_note_paths {
            println!("    - {path}");
        }
        println!("  Files copied:   {}", report.files_copied);
        println!("  Unresolved:     {}", report.unresolved_links.len());
        println!(
            "  Listing tool:   {}",
            if report.used_listing_tool { "tree" } else { "traversal" }
        );
        println!("  Manifest:       {}", report.manifest_path.display());
        println!("  Aggregate:      {} ({} notes)", report.aggregate_path.display(), report.notes_packaged);
    }

    crate::logging::flush();
}
