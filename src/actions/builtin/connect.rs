use crate::actions::Context;
use crate::error::Result;
use crate::octoprint::{Connection, OctoPrintClient};
use crate::stream::Output;

/// Check the configured OctoPrint server. Problems are reported, not raised.
pub(super) fn test_connect(ctx: &mut Context, out: &Output, _debug: &Output) -> Result<()> {
    let options = ctx.options()?;
    writeln!(out, "Testing connection to OctoPrint...\n")?;

    let Some(host) = options.octoprint_host.as_deref().filter(|h| !h.is_empty()) else {
        writeln!(out, "ERROR: octoprint_host is not configured")?;
        return Ok(());
    };
    let Some(key) = options.octoprint_key.as_deref().filter(|k| !k.is_empty()) else {
        writeln!(out, "ERROR: octoprint_key is not configured")?;
        return Ok(());
    };

    let client = OctoPrintClient::new(host, key)?;
    writeln!(out, "Host: {}", client.host())?;
    writeln!(out, "Testing API connection...")?;
    report(&client.check_connection(), out)
}

fn report(connection: &Connection, out: &Output) -> Result<()> {
    match connection {
        Connection::Connected { server, api } => {
            writeln!(out, "SUCCESS: Connected to OctoPrint")?;
            writeln!(out, "  Server version: {}", server)?;
            writeln!(out, "  API version: {}", api)?;
        }
        Connection::Unauthorized => {
            writeln!(out, "ERROR: Authentication failed (401)")?;
            writeln!(out, "  Check that your API key is correct")?;
        }
        Connection::Forbidden => {
            writeln!(out, "ERROR: Access forbidden (403)")?;
            writeln!(out, "  Check that your API key has sufficient permissions")?;
        }
        Connection::Unexpected { status, body } => {
            writeln!(out, "ERROR: Unexpected status code {}", status)?;
            writeln!(out, "  Response: {}", body)?;
        }
        Connection::Unreachable { detail } => {
            writeln!(out, "ERROR: Could not connect to server")?;
            writeln!(out, "  Check that the host URL is correct and the server is running")?;
            writeln!(out, "  Details: {}", detail)?;
        }
        Connection::TimedOut => {
            writeln!(out, "ERROR: Connection timed out")?;
            writeln!(out, "  The server took too long to respond")?;
        }
    }
    Ok(())
}
