//! Interaction automaton: drives one session from connect to complete capture.
//!
//! Terminal output carries no end-of-message framing, so completion is
//! inferred from the profile's prompt pattern, with pagination markers
//! taking precedence so a page boundary is never mistaken for the end.
//!
//! ```text
//! Idle ─► AwaitingLoginPrompt* ─► SendingCommand ─► Reading ─┬─► Complete
//!                                       ▲                    │
//!                                       │      PaginationPrompt ◄─┤
//!                                       └── next command ─────────┤
//!                                                                  └─► Failed
//! ```
//!
//! The automaton is cooperative: every transition happens inside the
//! calling task, interleaving sends with bounded polls.

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, trace};
use secrecy::ExposeSecret;

use super::response::Capture;
use crate::channel::{CaptureBuffer, Poll, poll_chunk};
use crate::config::BackupConfig;
use crate::error::{InteractionError, ProfileError, Result};
use crate::inventory::Credentials;
use crate::platform::{CommandProfile, Delivery, InteractiveScript, LoginResponse};
use crate::transport::SessionTransport;

/// Automaton states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    AwaitingLoginPrompt,
    SendingCommand,
    Reading,
    PaginationPrompt,
    Complete,
    Failed,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Idle => "idle",
            State::AwaitingLoginPrompt => "awaiting login prompt",
            State::SendingCommand => "sending command",
            State::Reading => "reading",
            State::PaginationPrompt => "handling pagination",
            State::Complete => "complete",
            State::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Single-use interpreter of one [`CommandProfile`] over one transport.
pub struct Automaton<'a> {
    profile: &'a CommandProfile,
    credentials: &'a Credentials,
    config: &'a BackupConfig,
    buffer: CaptureBuffer,
    state: State,
    pages: usize,
}

impl<'a> Automaton<'a> {
    /// Create an automaton for one session.
    pub fn new(
        profile: &'a CommandProfile,
        credentials: &'a Credentials,
        config: &'a BackupConfig,
    ) -> Self {
        Self {
            profile,
            credentials,
            config,
            buffer: CaptureBuffer::default(),
            state: State::Idle,
            pages: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Drive the session to completion.
    ///
    /// On failure nothing captured so far is returned.
    pub async fn run(&mut self, transport: &mut dyn SessionTransport) -> Result<Capture> {
        let start = Instant::now();

        let profile = self.profile;
        let outcome = match profile {
            CommandProfile::Simple { commands, delivery } => {
                self.run_simple(transport, commands, *delivery).await
            }
            CommandProfile::Interactive(script) => self.run_interactive(transport, script).await,
            CommandProfile::ApiExport(_) => Err(ProfileError::NoTerminalCommands.into()),
        };

        if let Err(e) = outcome {
            self.transition(State::Failed);
            self.buffer.take();
            return Err(e);
        }

        let raw = String::from_utf8_lossy(&self.buffer.take()).into_owned();
        if raw.trim().is_empty() {
            self.transition(State::Failed);
            return Err(InteractionError::EmptyCapture.into());
        }

        self.transition(State::Complete);
        Ok(Capture {
            commands: self.profile.commands().to_vec(),
            raw,
            pages: self.pages,
            elapsed: start.elapsed(),
        })
    }

    fn transition(&mut self, to: State) {
        if self.state != to {
            trace!("automaton: {} -> {}", self.state, to);
            self.state = to;
        }
    }

    fn timeout(&self, budget: Duration) -> crate::Error {
        InteractionError::Timeout {
            budget,
            state: self.state.to_string(),
        }
        .into()
    }

    /// The budget bounds the session whether or not the device is talking.
    fn check_deadline(&self, deadline: Instant, budget: Duration) -> Result<()> {
        if Instant::now() >= deadline {
            return Err(self.timeout(budget));
        }
        Ok(())
    }

    fn closed(&self) -> crate::Error {
        InteractionError::ChannelClosed {
            state: self.state.to_string(),
        }
        .into()
    }

    async fn run_simple(
        &mut self,
        transport: &mut dyn SessionTransport,
        commands: &[String],
        delivery: Delivery,
    ) -> Result<()> {
        let budget = self.config.exec_budget;
        let deadline = Instant::now() + budget;

        if delivery == Delivery::Shell {
            transport.open_shell().await?;
        }

        for (i, command) in commands.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.command_delay).await;
            }

            self.transition(State::SendingCommand);
            debug!("sending command: {}", command);

            match delivery {
                Delivery::Exec => {
                    transport.exec(command).await?;
                    self.transition(State::Reading);
                    self.read_to_eof(transport, deadline, budget).await?;
                }
                Delivery::Shell => {
                    transport.send(&format!("{command}\n")).await?;
                    self.transition(State::Reading);
                    self.read_until_quiet(transport, deadline, budget).await?;
                }
            }
        }

        Ok(())
    }

    /// Read an exec stream until the device closes it.
    async fn read_to_eof(
        &mut self,
        transport: &mut dyn SessionTransport,
        deadline: Instant,
        budget: Duration,
    ) -> Result<()> {
        loop {
            self.check_deadline(deadline, budget)?;
            match poll_chunk(transport, self.config.poll_interval, self.config.read_chunk).await? {
                Poll::Data(chunk) => self.buffer.extend(&chunk),
                Poll::Closed => return Ok(()),
                Poll::Idle => {}
            }
        }
    }

    /// Read a shell until it stays quiet for the settle period.
    async fn read_until_quiet(
        &mut self,
        transport: &mut dyn SessionTransport,
        deadline: Instant,
        budget: Duration,
    ) -> Result<()> {
        let mut last_data: Option<Instant> = None;
        loop {
            self.check_deadline(deadline, budget)?;
            match poll_chunk(transport, self.config.poll_interval, self.config.read_chunk).await? {
                Poll::Data(chunk) => {
                    self.buffer.extend(&chunk);
                    last_data = Some(Instant::now());
                }
                Poll::Closed => return Ok(()),
                Poll::Idle => {
                    if last_data.is_some_and(|at| at.elapsed() >= self.config.settle) {
                        return Ok(());
                    }
                }
            }
        }
    }

    async fn run_interactive(
        &mut self,
        transport: &mut dyn SessionTransport,
        script: &InteractiveScript,
    ) -> Result<()> {
        let deadline = Instant::now() + script.wait_budget;
        let mut scan_from = 0;

        transport.open_shell().await?;

        if !script.login.is_empty() {
            self.transition(State::AwaitingLoginPrompt);
            self.login(transport, script, &mut scan_from, deadline).await?;
        }

        // Device must be at its prompt before the first command.
        self.transition(State::Reading);
        self.read_until_prompt(transport, script, &mut scan_from, deadline)
            .await?;

        for command in &script.commands {
            self.transition(State::SendingCommand);
            debug!("sending command: {}", command);
            scan_from = self.buffer.len();
            transport.send(&format!("{command}\n")).await?;

            self.transition(State::Reading);
            self.read_until_prompt(transport, script, &mut scan_from, deadline)
                .await?;
        }

        Ok(())
    }

    /// Answer every login prompt of the script once.
    async fn login(
        &mut self,
        transport: &mut dyn SessionTransport,
        script: &InteractiveScript,
        scan_from: &mut usize,
        deadline: Instant,
    ) -> Result<()> {
        let mut answered = vec![false; script.login.len()];

        while answered.contains(&false) {
            self.check_deadline(deadline, script.wait_budget)?;
            match poll_chunk(transport, self.config.poll_interval, self.config.read_chunk).await? {
                Poll::Data(chunk) => self.buffer.extend(&chunk),
                Poll::Closed => return Err(self.closed()),
                Poll::Idle => continue,
            }

            for (step, done) in script.login.iter().zip(answered.iter_mut()) {
                if *done {
                    continue;
                }
                let Some(range) = self.buffer.search_from(&step.pattern, *scan_from) else {
                    continue;
                };

                let response = match &step.response {
                    LoginResponse::Username => {
                        debug!("login: sending username");
                        self.credentials.username.as_str()
                    }
                    LoginResponse::Password => {
                        debug!("login: sending password");
                        self.credentials.password.expose_secret()
                    }
                    LoginResponse::Text(text) => {
                        debug!("login: sending {:?}", text);
                        text.as_str()
                    }
                };
                transport.send(&format!("{response}\n")).await?;

                *scan_from = range.start;
                self.buffer.consume(range);
                *done = true;
            }
        }

        Ok(())
    }

    /// Read until the completion pattern appears in a chunk without a
    /// pagination marker, answering pagination along the way.
    async fn read_until_prompt(
        &mut self,
        transport: &mut dyn SessionTransport,
        script: &InteractiveScript,
        scan_from: &mut usize,
        deadline: Instant,
    ) -> Result<()> {
        loop {
            self.check_deadline(deadline, script.wait_budget)?;
            match poll_chunk(transport, self.config.poll_interval, self.config.read_chunk).await? {
                Poll::Data(chunk) => self.buffer.extend(&chunk),
                Poll::Closed => return Err(self.closed()),
                Poll::Idle => continue,
            }

            if let Some(pagination) = &script.pagination {
                let mut paged = false;
                while let Some(range) = self.buffer.search_from(&pagination.pattern, *scan_from) {
                    *scan_from = range.start;
                    self.buffer.consume(range);
                    paged = true;
                }

                if paged {
                    self.transition(State::PaginationPrompt);
                    transport.send(&pagination.response).await?;
                    self.pages += 1;
                    self.transition(State::Reading);
                    continue;
                }
            }

            if self
                .buffer
                .search_from(&script.completion, *scan_from)
                .is_some()
            {
                return Ok(());
            }
        }
    }
}
