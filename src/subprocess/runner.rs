//! Runs the wrapped build tool to completion, relaying its merged output.

use super::builder::ProcessCommand;
use super::error::ProcessError;
use super::relay::OutputRelay;
use crate::term::TermProbe;
use std::io::{BufRead, BufReader, PipeReader, PipeWriter, Write};
use std::process::Stdio;

/// Spawns the external tool with stderr redirected into the same pipe as
/// stdout, so line interleaving matches real execution order, and drives
/// the [`OutputRelay`] over that single stream.
pub struct ToolRunner;

impl ToolRunner {
    /// Run `command` to completion.
    ///
    /// The relay loop drains the merged pipe to EOF on the blocking pool
    /// before the child is waited on; waiting first could deadlock once the
    /// pipe buffer fills. Backpressure is the pipe itself: a slow relay
    /// throttles the tool, nothing is buffered unboundedly.
    pub async fn run<P, O, S>(
        &self,
        command: ProcessCommand,
        relay: OutputRelay<P, O, S>,
    ) -> Result<(), ProcessError>
    where
        P: TermProbe + Send + 'static,
        O: Write + Send + 'static,
        S: Write + Send + 'static,
    {
        let command_line = command.command_line();

        let (reader, writer) = std::io::pipe().map_err(|e| ProcessError::Spawn {
            command: command_line.clone(),
            source: e,
        })?;
        let writer_err = writer.try_clone().map_err(|e| ProcessError::Spawn {
            command: command_line.clone(),
            source: e,
        })?;

        let mut cmd = Self::configure_command(&command, writer, writer_err);

        tracing::debug!("running {command_line}");
        let mut child = cmd.spawn().map_err(|e| ProcessError::Spawn {
            command: command_line.clone(),
            source: e,
        })?;
        // The Command still holds the write ends; drop them or the reader
        // never sees EOF.
        drop(cmd);

        let relay_result = Self::relay_to_eof(reader, relay).await;
        if relay_result.is_err() {
            // The pipe is no longer being drained, so the tool may be
            // blocked on a write; take it down before waiting.
            let _ = child.kill().await;
        }

        let status = child.wait().await.map_err(|e| ProcessError::Wait {
            command: command_line.clone(),
            source: e,
        })?;
        relay_result?;

        if !status.success() {
            return Err(ProcessError::Exited {
                command: command_line,
                status,
            });
        }

        tracing::debug!("{command_line} completed successfully");
        Ok(())
    }

    fn configure_command(
        command: &ProcessCommand,
        stdout: PipeWriter,
        stderr: PipeWriter,
    ) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args);

        // An empty map means inherit the parent environment.
        if !command.env.is_empty() {
            cmd.env_clear();
            cmd.envs(&command.env);
        }

        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(stdout);
        cmd.stderr(stderr);
        cmd
    }

    /// Drain the merged pipe line by line through the relay. Runs on the
    /// blocking pool; the reads themselves are the backpressure mechanism.
    async fn relay_to_eof<P, O, S>(
        reader: PipeReader,
        relay: OutputRelay<P, O, S>,
    ) -> Result<(), ProcessError>
    where
        P: TermProbe + Send + 'static,
        O: Write + Send + 'static,
        S: Write + Send + 'static,
    {
        let handle = tokio::task::spawn_blocking(move || {
            let mut relay = relay;
            for line in BufReader::new(reader).lines() {
                relay.relay_line(&line?)?;
            }
            relay.finish()
        });

        handle
            .await
            .map_err(|e| ProcessError::Io(std::io::Error::other(e)))?
            .map_err(ProcessError::Io)
    }
}
