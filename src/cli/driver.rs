//! From parsed arguments to a finished run.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use super::args::{parse_scale, Cli};
use super::invocation::Invocation;
use crate::actions::{ActionCatalog, Context};
use crate::config::{self, FileSet, InputKind};
use crate::error::{MakeError, Result};
use crate::runner::{Executor, RunOutcome};
use crate::stream::Sink;
use crate::ui;

/// Where a run happens and where its output goes.
pub struct Driver {
    pub config_dir: PathBuf,
    pub working_dir: PathBuf,
    pub sink: Sink,
    pub interactive: bool,
    pub color: bool,
}

impl Driver {
    /// Driver for the real process: stdout, the current directory and the
    /// configured config directory.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            config_dir: config::config_dir()?,
            working_dir: std::env::current_dir()?,
            sink: crate::stream::stdout_sink(),
            interactive: ui::is_interactive(),
            color: ui::should_use_colors(),
        })
    }

    /// Validate the request, prepare the context and run every step.
    pub fn run(&self, cli: &Cli) -> Result<RunOutcome> {
        self.run_with_debug(cli).0
    }

    /// Like [`Driver::run`], also telling whether debug output was on.
    ///
    /// `debug = true` in a config file counts as much as `--debug`, so a
    /// failed run can be reported in the same detail as its step output.
    pub fn run_with_debug(&self, cli: &Cli) -> (Result<RunOutcome>, bool) {
        let mut debug = cli.debug;
        let result = self.execute(cli, &mut debug);
        (result, debug)
    }

    fn execute(&self, cli: &Cli, debug: &mut bool) -> Result<RunOutcome> {
        let invocation = Invocation::from_words(&cli.extra)?;
        if let Some(scale) = &cli.scale {
            parse_scale(scale)?;
        }
        if cli.model.is_some() && invocation.input_file.is_some() {
            return Err(MakeError::usage(
                "Cannot select a model name when using an input file",
            ));
        }

        let catalog = ActionCatalog::builtin();
        let mut requested = invocation.actions.clone();
        let mut plan = catalog.resolve(&mut requested)?;

        let input = match &invocation.input_file {
            Some(path) => {
                if !plan.takes_input_file() {
                    return Err(MakeError::usage("These actions do not take an input file"));
                }
                let kind = InputKind::from_path(path)?;
                if kind == InputKind::Scad && !plan.contains("build") {
                    requested.insert("build".to_string());
                    plan = catalog.resolve(&mut requested)?;
                }
                Some((self.working_dir.join(path), kind))
            }
            None => None,
        };
        debug!("Plan: {}", plan.names().join(", "));

        let mut ctx = Context::new(self.config_dir.clone(), self.working_dir.clone());
        ctx.interactive = self.interactive;

        // Holds the scratch build directory for input-file runs until the end.
        let mut scratch: Option<TempDir> = None;

        if plan.needs_options() {
            let loaded = config::load_options(&self.config_dir, &self.working_dir)?;
            let mut options = loaded.options;
            cli.apply_to(&mut options)?;
            *debug = options.debug;

            ctx.files = match &input {
                Some((path, kind)) => {
                    if let Some(stem) = path.file_stem() {
                        options.model_name = stem.to_string_lossy().into_owned();
                    }
                    let dir = tempfile::Builder::new().prefix("threedmake-").tempdir()?;
                    debug!("Build dir: {}", dir.path().display());
                    let files = FileSet::for_input_file(path, *kind, dir.path().to_path_buf());
                    scratch = Some(dir);
                    Some(files)
                }
                None => loaded
                    .project_root
                    .as_deref()
                    .map(|root| FileSet::for_project(root, &options.model_name)),
            };

            config::validate(&options)?;
            ctx.explicit_overlay_arg = cli.overlays.clone();
            ctx.options = Some(options);
        }

        let outcome = Executor::new(self.sink.clone())
            .with_color(self.color)
            .run(&plan, &mut ctx)?;

        if outcome == RunOutcome::Completed && input.is_some() {
            if let Some(output) = ctx.files.as_ref().and_then(FileSet::final_output) {
                let name = self.export_result(output)?;
                let direct = crate::stream::Output::Direct(self.sink.clone());
                writeln!(direct, "Result is {}", name)?;
            }
        }

        drop(scratch);
        Ok(outcome)
    }

    /// Copy the last artifact of an input-file run into the working directory.
    fn export_result(&self, output: &Path) -> Result<String> {
        let name = output
            .file_name()
            .ok_or_else(|| MakeError::missing("The run produced no output file"))?;
        let destination = self.working_dir.join(name);

        let same_file = match (output.canonicalize(), destination.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        if !same_file {
            fs::copy(output, &destination)?;
        }
        Ok(name.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::tests::box_stl;
    use crate::test_support::contents;
    use clap::Parser;
    use std::sync::{Arc, Mutex};

    struct Fixture {
        _temp: tempfile::TempDir,
        driver: Driver,
        buf: Arc<Mutex<Vec<u8>>>,
    }

    fn fixture() -> Fixture {
        let temp = tempfile::TempDir::new().unwrap();
        let work = temp.path().join("work");
        fs::create_dir_all(&work).unwrap();
        let buf = Arc::new(Mutex::new(Vec::new()));
        let driver = Driver {
            config_dir: temp.path().join("config"),
            working_dir: work,
            sink: buf.clone(),
            interactive: false,
            color: false,
        };
        Fixture {
            _temp: temp,
            driver,
            buf,
        }
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("threedmake").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn info_on_an_input_file() {
        let f = fixture();
        fs::write(
            f.driver.working_dir.join("cube.stl"),
            box_stl([0.0, 0.0, 0.0], [10.0, 10.0, 10.0]),
        )
        .unwrap();

        let outcome = f.driver.run(&cli(&["info", "cube.stl"])).unwrap();

        assert_eq!(outcome, RunOutcome::Completed);
        let text = contents(&f.buf);
        assert!(text.contains("\nExamining...\n    Mesh size: x=10.00, y=10.00, z=10.00\n"));
        assert!(text.ends_with("\nDone.\nResult is cube.stl\n"));
    }

    #[test]
    fn debug_from_config_is_reported() {
        let f = fixture();
        fs::create_dir_all(&f.driver.config_dir).unwrap();
        fs::write(f.driver.config_dir.join(config::GLOBAL_CONFIG_FILE), "debug = true\n").unwrap();
        fs::write(
            f.driver.working_dir.join("cube.stl"),
            box_stl([0.0, 0.0, 0.0], [10.0, 10.0, 10.0]),
        )
        .unwrap();

        let (result, debug) = f.driver.run_with_debug(&cli(&["slice", "cube.stl"]));

        assert!(result.is_err());
        assert!(debug);
    }

    #[test]
    fn debug_stays_off_without_options() {
        let f = fixture();
        let (result, debug) = f.driver.run_with_debug(&cli(&["version"]));
        assert!(result.is_ok());
        assert!(!debug);
    }

    #[test]
    fn input_file_needs_a_file_action() {
        let f = fixture();
        let err = f.driver.run(&cli(&["version", "cube.stl"])).unwrap_err();
        assert!(matches!(err, MakeError::Usage { .. }));
    }

    #[test]
    fn model_flag_conflicts_with_input_file() {
        let f = fixture();
        let err = f.driver.run(&cli(&["info", "-m", "lid", "cube.stl"])).unwrap_err();
        assert!(err.to_string().contains("model name"));
    }

    #[test]
    fn auto_scale_is_rejected_before_running() {
        let f = fixture();
        let err = f.driver.run(&cli(&["new", "--scale", "auto"])).unwrap_err();
        assert!(err.to_string().contains("Auto-scaling"));
        assert!(!f.driver.working_dir.join("src").exists());
    }

    #[test]
    fn pipeline_outside_a_project_fails() {
        let f = fixture();
        let err = f.driver.run(&cli(&["build"])).unwrap_err();
        assert!(err.to_string().contains("3dmake project directory"));
        assert!(!contents(&f.buf).contains("Done."));
    }

    #[test]
    fn unsupported_input_extension() {
        let f = fixture();
        let err = f.driver.run(&cli(&["info", "model.obj"])).unwrap_err();
        assert!(err.to_string().contains("Supported formats"));
    }

    #[test]
    fn new_creates_a_project_in_the_working_dir() {
        let f = fixture();
        let outcome = f.driver.run(&cli(&["new"])).unwrap();

        assert_eq!(outcome, RunOutcome::Isolated);
        assert!(f.driver.working_dir.join("3dmake.toml").is_file());
        assert!(!contents(&f.buf).contains("Done."));
    }
}
