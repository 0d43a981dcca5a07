//! Sliced G-code analysis.

pub mod report;
pub mod slicer_keys;
pub mod stats;

pub use report::{feature_rows, render_feature_report, FeatureRow};
pub use slicer_keys::{
    extract_slicer_keys, format_mm_length, parse_slicer_keys, reformat_gcode_time, FILAMENT_USED_MM,
    NORMAL_MODE_TIME, SILENT_MODE_TIME,
};
pub use stats::{parse_gcode_stats, parse_gcode_str, FeatureMap, FeatureStats, FeatureStatsParser};
