//! Terminal implementation of the `Confirmer` port.

use std::time::Duration;

use anyhow::{Context, Result};
use cloud_apply_types::Run;
use console::Term;
use dialoguer::Input;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::application::ports::{Confirmer, RunService};
use crate::application::signals::Signals;
use crate::domain::confirmation::{
    ConfirmPrompt, Confirmation, approved_elsewhere, ended_elsewhere,
};

/// Prompts on the controlling terminal while watching the run.
///
/// A run approved out of band (for example from the web UI) while the
/// prompt is open ends the wait with [`Confirmation::AlreadyApproved`]; a run
/// discarded or canceled out of band ends it with [`Confirmation::Ended`].
pub struct TerminalConfirmer<'a, R> {
    runs: &'a R,
    poll_interval: Duration,
}

impl<'a, R: RunService> TerminalConfirmer<'a, R> {
    #[must_use]
    pub fn new(runs: &'a R, poll_interval: Duration) -> Self {
        Self {
            runs,
            poll_interval,
        }
    }

    /// Read the run once and report if it was decided elsewhere.
    async fn decided_elsewhere(&self, run_id: &str) -> Option<Confirmation> {
        let current = match self.runs.read_run(run_id, false).await {
            Ok(current) => current,
            Err(e) => {
                debug!(run_id, error = %e, "cannot refresh run during prompt");
                return None;
            }
        };
        if approved_elsewhere(&current) {
            info!(run_id, status = %current.status, "run approved elsewhere");
            return Some(Confirmation::AlreadyApproved);
        }
        let status = ended_elsewhere(&current)?;
        info!(run_id, %status, "run ended elsewhere while awaiting confirmation");
        Some(Confirmation::Ended(status))
    }
}

fn read_answer(query: &str, description: &str) -> dialoguer::Result<String> {
    let term = Term::stderr();
    term.write_line(query)?;
    term.write_line(description)?;
    term.write_line("")?;
    Input::<String>::new()
        .with_prompt("Enter a value")
        .allow_empty(true)
        .interact_text_on(&term)
}

impl<R: RunService> Confirmer for TerminalConfirmer<'_, R> {
    async fn confirm(
        &self,
        prompt: &ConfirmPrompt,
        run: &Run,
        _signals: &Signals,
    ) -> Result<Confirmation> {
        let query = prompt.query.clone();
        let description = prompt.description.clone();
        let (tx, mut answer) = oneshot::channel();
        // Detached: the blocking read cannot be aborted and must not hold up
        // runtime shutdown once the prompt is abandoned.
        std::thread::Builder::new()
            .name("confirm-prompt".to_string())
            .spawn(move || {
                let _ = tx.send(read_answer(&query, &description));
            })
            .context("cannot start confirmation prompt")?;

        loop {
            tokio::select! {
                received = &mut answer => {
                    let text = received
                        .context("confirmation prompt ended without an answer")?
                        .context("cannot read confirmation from the terminal")?;
                    return Ok(Confirmation::from_answer(&text, prompt.required));
                }
                () = tokio::time::sleep(self.poll_interval) => {
                    if let Some(decided) = self.decided_elsewhere(&run.id).await {
                        return Ok(decided);
                    }
                }
            }
        }
    }
}
