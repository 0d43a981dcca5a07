use crate::actions::Context;
use crate::error::{MakeError, Result};
use crate::octoprint::OctoPrintClient;
use crate::stream::Output;

pub(super) fn print(ctx: &mut Context, out: &Output, _debug: &Output) -> Result<()> {
    let options = ctx.options()?;
    let (Some(host), Some(key)) = (
        options.octoprint_host.as_deref().filter(|h| !h.is_empty()),
        options.octoprint_key.as_deref().filter(|k| !k.is_empty()),
    ) else {
        return Err(MakeError::missing(
            "Either octoprint_host or octoprint_key is not configured.",
        ));
    };

    let gcode = ctx
        .files()?
        .sliced_gcode
        .as_deref()
        .ok_or_else(|| MakeError::missing("The model has not been sliced"))?;

    let client = OctoPrintClient::new(host, key)?;
    let name = client.upload(gcode, options.auto_start_prints)?;
    writeln!(out, "File uploaded successfully as {}", name)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CommandOptions, FileSet};
    use crate::test_support::*;
    use httpmock::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn context(temp: &TempDir, options: CommandOptions) -> Context {
        let gcode = temp.path().join("widget-main.gcode");
        fs::write(&gcode, "G28\n").unwrap();
        let mut ctx = Context::new(temp.path().join("config"), temp.path().to_path_buf());
        ctx.options = Some(options);
        ctx.files = Some(FileSet {
            sliced_gcode: Some(gcode),
            ..FileSet::for_project(temp.path(), "main")
        });
        ctx
    }

    #[test]
    fn requires_server_settings() {
        let temp = TempDir::new().unwrap();
        let mut ctx = context(
            &temp,
            CommandOptions {
                octoprint_host: Some("http://octopi.local".into()),
                ..Default::default()
            },
        );

        let err = print(&mut ctx, &Output::Discard, &Output::Discard).unwrap_err();
        assert!(err.to_string().contains("octoprint_key"));
    }

    #[test]
    fn uploads_and_reports_name() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/files/local")
                .header("X-Api-Key", "abc");
            then.status(201)
                .body(r#"{"files":{"local":{"name":"widget-main.gcode"}}}"#);
        });

        let temp = TempDir::new().unwrap();
        let mut ctx = context(
            &temp,
            CommandOptions {
                octoprint_host: Some(server.base_url()),
                octoprint_key: Some("abc".into()),
                ..Default::default()
            },
        );
        let (buf, out) = buffer_output();

        print(&mut ctx, &out, &Output::Discard).unwrap();

        mock.assert();
        assert_eq!(contents(&buf), "File uploaded successfully as widget-main.gcode\n");
    }
}
