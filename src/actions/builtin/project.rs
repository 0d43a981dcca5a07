use std::fs::{self, OpenOptions};
use std::path::Path;

use console::Term;
use tracing::debug;

use crate::actions::Context;
use crate::config::PROJECT_CONFIG_FILE;
use crate::error::Result;
use crate::stream::Output;
use crate::ui::prompts;

const NEW_PROJECT_CONFIG: &str = "strict_warnings = true\n";

/// Lay out a project in `root`; existing files are left alone.
pub fn create_project(root: &Path) -> Result<()> {
    fs::create_dir_all(root.join("src"))?;
    fs::create_dir_all(root.join("build"))?;

    let config = root.join(PROJECT_CONFIG_FILE);
    if !config.exists() {
        fs::write(&config, NEW_PROJECT_CONFIG)?;
    }

    let main = root.join("src").join("main.scad");
    OpenOptions::new().create(true).append(true).open(&main)?;

    debug!("Created project skeleton in {}", root.display());
    Ok(())
}

pub(super) fn new_project(ctx: &mut Context, out: &Output, _debug: &Output) -> Result<()> {
    let answer = if ctx.interactive {
        prompts::prompt_line(
            "Choose a project directory name (press ENTER for current dir)",
            &Term::stderr(),
        )?
    } else {
        String::new()
    };

    let root = if answer.is_empty() {
        ctx.working_dir.clone()
    } else {
        ctx.working_dir.join(answer)
    };

    create_project(&root)?;
    writeln!(out, "Created project in {}", root.display())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_skeleton() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("widget");

        create_project(&root).unwrap();

        assert!(root.join("src").is_dir());
        assert!(root.join("build").is_dir());
        assert_eq!(
            fs::read_to_string(root.join(PROJECT_CONFIG_FILE)).unwrap(),
            NEW_PROJECT_CONFIG
        );
        assert!(root.join("src/main.scad").is_file());
    }

    #[test]
    fn keeps_existing_files() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        fs::write(temp.path().join(PROJECT_CONFIG_FILE), "scale = 2.0\n").unwrap();
        fs::write(temp.path().join("src/main.scad"), "cube(10);\n").unwrap();

        create_project(temp.path()).unwrap();

        assert_eq!(
            fs::read_to_string(temp.path().join(PROJECT_CONFIG_FILE)).unwrap(),
            "scale = 2.0\n"
        );
        assert_eq!(
            fs::read_to_string(temp.path().join("src/main.scad")).unwrap(),
            "cube(10);\n"
        );
    }
}
