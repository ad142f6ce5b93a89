//! Package command: the aggregate document for any directory of notes.

use daylinks_core::config::LoggingConfig;
use daylinks_core::package::Packager;
use daylinks_core::vault::RealFs;
use tracing::error;

use super::fail;
use crate::PackageArgs;
use crate::logging::Verbosity;

pub fn run(args: PackageArgs, verbosity: Verbosity) {
    // The file log is configured per profile; packaging needs no profile.
    if let Err(e) = crate::logging::init(&LoggingConfig::default(), verbosity) {
        eprintln!("Failed to open log file {e}");
        std::process::exit(1);
    }

    let fs = RealFs;
    match Packager::new(&fs).with_output_name(&args.output).package(&args.dir) {
        Ok(summary) => {
            println!("Packaged {} notes into {}", summary.notes, summary.path.display());
        }
        Err(e) => {
            error!("Packaging {} failed: {e}", args.dir.display());
            fail();
        }
    }

    crate::logging::flush();
}
