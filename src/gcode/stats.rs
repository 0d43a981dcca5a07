//! Per-feature filament and time statistics from sliced G-code.
//!
//! The slicer labels each section of the toolpath with a `;TYPE:<feature>`
//! comment (perimeter, infill, support material, ...). A single forward pass
//! attributes extruded filament and estimated move time to the feature that
//! is active when each move happens.
//!
//! Retractions pull filament back into the nozzle; the matching
//! unretraction pushes the same length out again without depositing
//! anything. That withdrawn length is tracked as *retraction debt* and later
//! extrusion pays it back before any of it counts as productive.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::Result;

/// Extrusion deltas smaller than this are noise.
pub const EXTRUSION_EPSILON: f64 = 0.0001;

/// Feedrate assumed until the file sets one, in mm/min.
pub const DEFAULT_FEEDRATE: f64 = 1800.0;

/// Feature name used before the first `;TYPE:` marker.
pub const UNKNOWN_FEATURE: &str = "Unknown";

const TYPE_MARKER: &str = ";TYPE:";

static X_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"X(-?\d*\.?\d+)").unwrap());
static Y_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Y(-?\d*\.?\d+)").unwrap());
static Z_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Z(-?\d*\.?\d+)").unwrap());
static E_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"E(-?\d*\.?\d+)").unwrap());
static F_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"F(\d+)").unwrap());

/// Accumulated totals for one feature.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeatureStats {
    /// Productive filament length, in mm.
    pub length_mm: f64,
    /// Estimated time spent extruding, in seconds.
    pub time_seconds: f64,
    /// Number of moves that deposited filament.
    pub moves: usize,
}

/// Feature name to totals, sorted by name.
pub type FeatureMap = BTreeMap<String, FeatureStats>;

fn capture(pattern: &Regex, code: &str) -> Option<f64> {
    pattern
        .captures(code)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Incremental parser state for one G-code file.
#[derive(Debug, Clone)]
pub struct FeatureStatsParser {
    stats: FeatureMap,
    feature: String,
    position: [f64; 3],
    extruder: f64,
    feedrate: f64,
    absolute_extrusion: bool,
    retraction_debt: f64,
}

impl Default for FeatureStatsParser {
    fn default() -> Self {
        Self {
            stats: FeatureMap::new(),
            feature: UNKNOWN_FEATURE.to_string(),
            position: [0.0; 3],
            extruder: 0.0,
            feedrate: DEFAULT_FEEDRATE,
            absolute_extrusion: true,
            retraction_debt: 0.0,
        }
    }
}

impl FeatureStatsParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outstanding retracted length not yet paid back.
    pub fn retraction_debt(&self) -> f64 {
        self.retraction_debt
    }

    /// Feed one line of G-code.
    pub fn feed_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        if let Some(feature) = line.strip_prefix(TYPE_MARKER) {
            self.feature = feature.to_string();
            self.stats.entry(self.feature.clone()).or_default();
            return;
        }

        let code = line.split(';').next().unwrap_or("").trim_end();

        if code.starts_with("M82") {
            self.absolute_extrusion = true;
        } else if code.starts_with("M83") {
            self.absolute_extrusion = false;
        } else if code.starts_with("G92 E") {
            // Prior retractions still owe repayment after a reset.
            if let Some(e) = capture(&E_PATTERN, code) {
                self.extruder = e;
            }
        } else if code.starts_with("G1 ") && code.contains('E') {
            self.feed_extrusion(code);
        }
    }

    /// An extruding `G1`. Travel and feedrate-only lines never get here, so
    /// position and feedrate only change on extruding moves.
    fn feed_extrusion(&mut self, code: &str) {
        let [x, y, z] = self.position;
        let target = [
            capture(&X_PATTERN, code).unwrap_or(x),
            capture(&Y_PATTERN, code).unwrap_or(y),
            capture(&Z_PATTERN, code).unwrap_or(z),
        ];

        if let Some(feedrate) = capture(&F_PATTERN, code) {
            if feedrate > 0.0 {
                self.feedrate = feedrate;
            }
        }

        if let Some(e) = capture(&E_PATTERN, code) {
            let distance = ((target[0] - x).powi(2) + (target[1] - y).powi(2) + (target[2] - z).powi(2)).sqrt();
            let delta = if self.absolute_extrusion {
                let delta = e - self.extruder;
                self.extruder = e;
                delta
            } else {
                e
            };
            self.account(delta, distance);
        }

        self.position = target;
    }

    fn account(&mut self, delta: f64, distance: f64) {
        if delta < -EXTRUSION_EPSILON {
            self.retraction_debt += delta.abs();
            return;
        }
        if delta <= EXTRUSION_EPSILON {
            return;
        }

        let repayment = delta.min(self.retraction_debt);
        self.retraction_debt -= repayment;
        let productive = delta - repayment;
        if productive <= EXTRUSION_EPSILON {
            return;
        }

        let stats = self.stats.entry(self.feature.clone()).or_default();
        stats.length_mm += productive;
        stats.moves += 1;
        if distance > 0.0 {
            stats.time_seconds += distance / self.feedrate * 60.0;
        }
    }

    /// Consume the parser and return the totals.
    pub fn finish(self) -> FeatureMap {
        self.stats
    }
}

/// Compute feature statistics for G-code text.
pub fn parse_gcode_str(text: &str) -> FeatureMap {
    let mut parser = FeatureStatsParser::new();
    for line in text.lines() {
        parser.feed_line(line);
    }
    parser.finish()
}

/// Compute feature statistics for a G-code file.
pub fn parse_gcode_stats(path: &Path) -> Result<FeatureMap> {
    debug!("Parsing G-code stats from {}", path.display());

    let reader = BufReader::new(File::open(path)?);
    let mut parser = FeatureStatsParser::new();
    for line in reader.lines() {
        parser.feed_line(&line?);
    }
    Ok(parser.finish())
}
