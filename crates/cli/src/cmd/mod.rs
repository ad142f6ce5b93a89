pub mod doctor;
pub mod export;
pub mod package;

/// Flush logs and exit with a failure status.
pub fn fail() -> ! {
    crate::logging::flush();
    std::process::exit(1);
}
