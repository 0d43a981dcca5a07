//! Summary values the slicer appends to its G-code.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;

/// First line of the slicer's trailing configuration block.
const CONFIG_START: &str = "; objects_info =";

pub const NORMAL_MODE_TIME: &str = "estimated printing time (normal mode)";
pub const SILENT_MODE_TIME: &str = "estimated printing time (silent mode)";
pub const FILAMENT_USED_MM: &str = "filament used [mm]";

static SINGULAR_UNITS: LazyLock<[(Regex, &'static str); 4]> = LazyLock::new(|| {
    [
        (Regex::new(r"\b1 days").unwrap(), "1 day"),
        (Regex::new(r"\b1 hours").unwrap(), "1 hour"),
        (Regex::new(r"\b1 minutes").unwrap(), "1 minute"),
        (Regex::new(r"\b1 seconds").unwrap(), "1 second"),
    ]
});

/// Collects `key = value` pairs once the configuration block starts.
#[derive(Debug, Default)]
struct KeyCollector {
    keys: HashMap<String, String>,
    in_config: bool,
}

impl KeyCollector {
    fn feed_line(&mut self, line: &str) {
        if !self.in_config && !line.starts_with(CONFIG_START) {
            return;
        }
        self.in_config = true;

        if let Some((key, value)) = line.split_once(" = ") {
            self.keys.insert(
                key.trim_start_matches([' ', ';']).to_string(),
                value.trim_end_matches(['\r', '\n']).to_string(),
            );
        }
    }
}

/// `key = value` pairs from the configuration block, with leading `; ` removed.
pub fn parse_slicer_keys<'a>(lines: impl IntoIterator<Item = &'a str>) -> HashMap<String, String> {
    let mut collector = KeyCollector::default();
    for line in lines {
        collector.feed_line(line);
    }
    collector.keys
}

/// Read the configuration block of a G-code file, one line at a time.
pub fn extract_slicer_keys(path: &Path) -> Result<HashMap<String, String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut collector = KeyCollector::default();
    for line in reader.lines() {
        collector.feed_line(&line?);
    }
    Ok(collector.keys)
}

/// Spell out a `10d 9h 8m 7s` duration so it reads well aloud.
pub fn reformat_gcode_time(time: &str) -> String {
    // Uppercase first so the `s` in "days" is not taken for seconds.
    let spelled = time
        .to_uppercase()
        .replace('D', " days")
        .replace('H', " hours")
        .replace('M', " minutes")
        .replace('S', " seconds");

    SINGULAR_UNITS
        .iter()
        .fold(spelled, |acc, (pattern, singular)| {
            pattern.replace_all(&acc, *singular).into_owned()
        })
}

/// Human wording for a filament length given in millimeters.
///
/// Unparseable input is returned as is.
pub fn format_mm_length(length: &str) -> String {
    let Ok(value) = length.trim().parse::<f64>() else {
        return length.to_string();
    };
    let mm = value.trunc() as i64;

    if mm > 1000 {
        format!("about {:.2} meters", mm as f64 / 1000.0)
    } else if mm > 10 {
        format!("about {:.1} centimeters", mm as f64 / 10.0)
    } else {
        format!("{} millimeters", mm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAIL: &str = "G1 X1 E1\n\
        ; filament used [mm] = ignored before config\n\
        ; objects_info = {\"objects\":[]}\n\
        ; filament used [mm] = 1234.56\n\
        ; estimated printing time (normal mode) = 1h 2m 1s\n\
        ; bed_shape = 0x0,250x0,250x210,0x210\n";

    #[test]
    fn keys_start_at_objects_info() {
        let keys = parse_slicer_keys(TAIL.lines());

        assert_eq!(keys[FILAMENT_USED_MM], "1234.56");
        assert_eq!(keys[NORMAL_MODE_TIME], "1h 2m 1s");
        assert_eq!(keys["bed_shape"], "0x0,250x0,250x210,0x210");
        assert!(keys.contains_key("objects_info"));
    }

    #[test]
    fn keys_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("out.gcode");
        std::fs::write(&path, TAIL).unwrap();

        let keys = extract_slicer_keys(&path).unwrap();
        assert_eq!(keys[FILAMENT_USED_MM], "1234.56");
    }

    #[test]
    fn file_lines_before_the_block_are_skipped() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("long.gcode");
        let mut text = String::new();
        for i in 0..5000 {
            text.push_str(&format!("G1 X{} E{} ; a = b\n", i, i));
        }
        text.push_str(TAIL);
        std::fs::write(&path, text).unwrap();

        let keys = extract_slicer_keys(&path).unwrap();
        assert!(!keys.contains_key("G1 X0 E0 ; a"));
        assert_eq!(keys[NORMAL_MODE_TIME], "1h 2m 1s");
    }

    #[test]
    fn time_words() {
        assert_eq!(reformat_gcode_time("1h 2m 1s"), "1 hour 2 minutes 1 second");
        assert_eq!(reformat_gcode_time("10d 9h 8m 7s"), "10 days 9 hours 8 minutes 7 seconds");
        assert_eq!(reformat_gcode_time("1d 11h 21m 31s"), "1 day 11 hours 21 minutes 31 seconds");
    }

    #[test]
    fn length_wording() {
        assert_eq!(format_mm_length("1234.56"), "about 1.23 meters");
        assert_eq!(format_mm_length("55.9"), "about 5.5 centimeters");
        assert_eq!(format_mm_length("7.2"), "7 millimeters");
        assert_eq!(format_mm_length("n/a"), "n/a");
    }
}
