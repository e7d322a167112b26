//! The interactive session run by the `tplview` binary.

use std::io;

use crate::preview::Preview;

/// Prompt shown while watching.
pub const EXIT_PROMPT: &str = "Press any key to exit file watch...";

/// Renders once and, if configured, watches until `wait_for_exit` returns.
///
/// When both inputs are named but one is missing, nothing is rendered and a
/// warning is logged instead. With no inputs named at all, nothing happens.
///
/// # Errors
///
/// Returns whatever `wait_for_exit` returns. Watching is stopped first.
pub fn run_session<W>(preview: &Preview, wait_for_exit: W) -> io::Result<()>
where
    W: FnOnce() -> io::Result<()>,
{
    let config = preview.config();
    let log = preview.diagnostics();

    if !preview.can_render() {
        if config.template.is_some() && config.content.is_some() {
            log.warning("Unable to render as input files are not found");
            log.info("");
        }
        return Ok(());
    }

    let output = preview.render();
    tracing::debug!(bytes = output.len(), watch = config.watch, "initial render done");
    if !config.watch {
        return Ok(());
    }

    preview.start_watch();
    log.info(EXIT_PROMPT);
    let waited = wait_for_exit();
    preview.stop_watch();
    log.info("");
    waited
}
