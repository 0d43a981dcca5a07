//! Line predicates for noisy third-party tools.

/// Log prefixes OpenSCAD uses for messages worth showing.
const OPENSCAD_LOG_PREFIXES: &[&str] = &[
    "ERROR:",
    "WARNING:",
    "TRACE:",
    "FONT-WARNING:",
    "EXPORT-WARNING:",
    "EXPORT-ERROR:",
    "PARSER-ERROR:",
    // Multi-line echos only show their first line.
    "ECHO:",
];

/// True if an OpenSCAD log line is an error, warning, trace or echo.
///
/// OpenSCAD has no command-line switch for this, so its stderr is filtered
/// line by line.
pub fn should_print_openscad_log(line: &str) -> bool {
    OPENSCAD_LOG_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

/// True if a slicer stderr line reports an error.
///
/// The slicer sometimes exits with status 0 after printing one of these.
pub fn is_slicer_error(line: &str) -> bool {
    let lower = line.trim_start().to_ascii_lowercase();
    lower.starts_with("error:") || lower.contains("[error]")
}
