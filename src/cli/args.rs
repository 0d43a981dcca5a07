//! CLI argument definitions.
//!
//! Actions and the optional input file are free-form positional words; see
//! [`super::invocation`] for how they are split apart.

use clap::Parser;

use crate::config::CommandOptions;
use crate::error::{MakeError, Result};

/// threedmake - Build, slice and print 3-D models from the command line.
#[derive(Debug, Default, Parser)]
#[command(name = "threedmake")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Scale by a decimal factor
    #[arg(short, long, value_name = "FACTOR")]
    pub scale: Option<String>,

    /// Choose a model in a multi-model project
    #[arg(short, long, value_name = "NAME")]
    pub model: Option<String>,

    /// Select a printer profile
    #[arg(short, long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Apply an overlay to slicer settings; can be used multiple times
    #[arg(short, long = "overlay", value_name = "NAME")]
    pub overlays: Vec<String>,

    /// The type of preview to produce
    #[arg(short, long, value_name = "NAME")]
    pub view: Option<String>,

    /// Viewpoint for image export; can be used multiple times
    #[arg(short, long = "angle", value_name = "NAME")]
    pub angles: Vec<String>,

    /// Color scheme for image export
    #[arg(long, value_name = "NAME")]
    pub colorscheme: Option<String>,

    /// Image dimensions in pixels, e.g. 1080x720
    #[arg(long, value_name = "WxH")]
    pub image_size: Option<String>,

    /// Show full tool output and error details
    #[arg(long)]
    pub debug: bool,

    /// Actions to run, optionally followed by an input file
    #[arg(value_name = "ACTIONS")]
    pub extra: Vec<String>,
}

/// Parse `--scale`; `auto` is recognised but not implemented.
pub fn parse_scale(value: &str) -> Result<f64> {
    if value.eq_ignore_ascii_case("auto") {
        return Err(MakeError::usage("Auto-scaling is not supported yet"));
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|scale| scale.is_finite() && *scale > 0.0)
        .ok_or_else(|| {
            MakeError::usage("Invalid value for --scale, must be a decimal number or auto")
        })
}

impl Cli {
    /// Apply command-line overrides on top of the merged configuration.
    pub fn apply_to(&self, options: &mut CommandOptions) -> Result<()> {
        if let Some(scale) = &self.scale {
            options.scale = parse_scale(scale)?;
        }
        if let Some(model) = &self.model {
            options.model_name = model.clone();
        }
        if let Some(profile) = &self.profile {
            options.printer_profile = Some(profile.clone());
        }
        if !self.overlays.is_empty() {
            options.overlays = self.overlays.clone();
        }
        if let Some(view) = &self.view {
            options.view = view.clone();
        }
        if !self.angles.is_empty() {
            options.image_angles = self.angles.clone();
        }
        if let Some(scheme) = &self.colorscheme {
            options.colorscheme = scheme.clone();
        }
        if let Some(size) = &self.image_size {
            options.image_size = size.clone();
        }
        if self.debug {
            options.debug = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_and_words_parse() {
        let cli = Cli::try_parse_from([
            "threedmake", "slice", "-o", "supports", "--overlay", "brim", "-s", "1.5", "part.stl",
        ])
        .unwrap();

        assert_eq!(cli.extra, vec!["slice", "part.stl"]);
        assert_eq!(cli.overlays, vec!["supports", "brim"]);
        assert_eq!(cli.scale.as_deref(), Some("1.5"));
    }

    #[test]
    fn scale_values() {
        assert_eq!(parse_scale("2").unwrap(), 2.0);
        assert_eq!(parse_scale("0.5").unwrap(), 0.5);
        assert!(parse_scale("AUTO").unwrap_err().to_string().contains("not supported"));
        assert!(parse_scale("big").is_err());
        assert!(parse_scale("-1").is_err());
    }

    #[test]
    fn overrides_replace_config_values() {
        let cli = Cli::try_parse_from([
            "threedmake", "-p", "mk4", "-a", "top", "-a", "left", "--debug", "image",
        ])
        .unwrap();
        let mut options = CommandOptions {
            printer_profile: Some("mini".into()),
            overlays: vec!["fast".into()],
            ..Default::default()
        };

        cli.apply_to(&mut options).unwrap();

        assert_eq!(options.printer_profile.as_deref(), Some("mk4"));
        assert_eq!(options.image_angles, vec!["top", "left"]);
        assert_eq!(options.overlays, vec!["fast"]);
        assert!(options.debug);
    }
}
