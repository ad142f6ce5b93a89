use daylinks_core::config::{ConfigLoader, default_config_path};
use daylinks_core::index::TreeCommand;
use std::path::Path;

pub fn run(config: Option<&Path>, profile: Option<&str>) {
    match ConfigLoader::load(config, profile) {
        Ok(rc) => {
            println!("OK   daylinks doctor");
            println!("version: {}", daylinks_core::version());
            println!(
                "path: {}",
                config.map_or_else(
                    || default_config_path().display().to_string(),
                    |p| p.display().to_string()
                )
            );
            println!("vault_root: {}", rc.vault_root.display());
            println!("days_back: {}", rc.days_back);
            println!("export_base: {}", rc.export_base.display());
            println!("max_depth: {}", rc.max_depth);
            println!("use_listing_tool: {}", rc.use_listing_tool);
            match TreeCommand::probe() {
                Some(tree) => println!("tree: {}", tree.program().display()),
                None => println!("tree: not found (indexing by traversal)"),
            }
            println!("logging.level: {}", rc.logging.level);
        }
        Err(e) => {
            println!("FAIL daylinks doctor");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    }
}
