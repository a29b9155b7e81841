//! Application service — stream apply logs to the user once.

use cloud_apply_types::Run;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::debug;

use crate::application::ports::{ApplyLogSource, LogRenderer, OutputSink};
use crate::application::services::apply::ApplyContext;
use crate::application::services::guarded_call;
use crate::application::signals::Signals;
use crate::domain::error::ApplyError;
use crate::domain::log_line::{ApplyLogFilter, LogLine, trim_line_ending};

const LOG_BUFFER_SIZE: usize = 64 * 1024;

/// Stream the apply logs of a finished run to the interactive output.
///
/// Does nothing without an output sink or when the run never reached apply.
///
/// # Errors
///
/// Returns a wrapped error when the stream cannot be opened or read, a
/// render failure, or the interrupt.
pub async fn render_apply_logs(
    logs: &impl ApplyLogSource,
    ctx: &ApplyContext<'_>,
    run: &Run,
    signals: &Signals,
) -> Result<(), ApplyError> {
    let Some(out) = ctx.output else {
        return Ok(());
    };
    let Some(apply) = run.apply.as_ref() else {
        debug!(run_id = %run.id, "run has no apply; no logs to show");
        return Ok(());
    };
    let stream = guarded_call(signals, "Failed to retrieve apply logs", logs.apply_logs(&apply.id))
        .await?;
    let shown = stream_logs(stream, out, ctx.renderer, signals).await?;
    debug!(run_id = %run.id, lines = shown, "apply logs streamed");
    Ok(())
}

/// Read `stream` line by line and display everything after the banner.
///
/// Lines that are not JSON records are printed verbatim. Records go to
/// `renderer`; without one they are dropped, never printed raw.
/// Returns the number of lines handed to the output or the renderer.
///
/// # Errors
///
/// Returns a wrapped error on read failure (end of stream is not one), a
/// render failure, or the interrupt.
pub async fn stream_logs(
    stream: impl AsyncRead + Unpin,
    out: &dyn OutputSink,
    renderer: Option<&dyn LogRenderer>,
    signals: &Signals,
) -> Result<usize, ApplyError> {
    let mut reader = BufReader::with_capacity(LOG_BUFFER_SIZE, stream);
    let mut filter = ApplyLogFilter::new();
    let mut buf = Vec::new();
    let mut shown = 0;

    loop {
        buf.clear();
        let read = signals
            .guard(reader.read_until(b'\n', &mut buf))
            .await?
            .map_err(|e| ApplyError::remote("Failed to read logs", e.into()))?;
        if read == 0 {
            break;
        }

        let line = String::from_utf8_lossy(trim_line_ending(&buf));
        match filter.accept(&line) {
            None => {}
            Some(LogLine::Raw(text)) => {
                out.line(&text);
                shown += 1;
            }
            Some(LogLine::Structured(log)) => {
                if let Some(renderer) = renderer {
                    renderer.render_log(&log).map_err(ApplyError::Render)?;
                    shown += 1;
                }
            }
        }
    }
    Ok(shown)
}
