//! Command profiles: declarative recipes for capturing one platform's config.
//!
//! A profile is pure data. The interaction automaton interprets it, so a new
//! vendor needs a new profile entry and nothing else.

use std::time::Duration;

use regex::bytes::Regex;

use crate::channel::patterns::compile_prompt_pattern;
use crate::error::{ProfileError, Result};

/// How the commands of a simple profile reach the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Each command runs on its own exec stream, read until EOF.
    Exec,

    /// Commands are typed into one PTY shell; a command is done when the
    /// shell goes quiet.
    Shell,
}

/// What to answer when a login prompt appears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginResponse {
    /// The shared username.
    Username,

    /// The shared password (never logged).
    Password,

    /// Fixed text.
    Text(String),
}

/// One in-band login prompt and its answer.
#[derive(Debug, Clone)]
pub struct LoginStep {
    pub pattern: Regex,
    pub response: LoginResponse,
}

impl LoginStep {
    /// Create a login step from a regex pattern.
    pub fn new(pattern: &str, response: LoginResponse) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern).map_err(ProfileError::InvalidPattern)?,
            response,
        })
    }
}

/// Pagination marker and the keystroke that requests the next page.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub pattern: Regex,
    pub response: String,
}

/// Recipe for platforms that need login handling, paging or prompt-based
/// completion.
#[derive(Debug, Clone)]
pub struct InteractiveScript {
    /// Commands sent in order, each awaited to completion.
    pub commands: Vec<String>,

    /// In-band login prompts, answered before any command is sent.
    pub login: Vec<LoginStep>,

    /// Optional pagination handling.
    pub pagination: Option<Pagination>,

    /// Pattern signalling the device is back at its idle prompt.
    pub completion: Regex,

    /// Overall time allowed for the whole session.
    pub wait_budget: Duration,
}

impl InteractiveScript {
    /// Create a script with the given completion (prompt) pattern.
    ///
    /// The pattern is anchored to the end of the output unless it already
    /// ends with `$`.
    pub fn new(completion: &str) -> Result<Self> {
        Ok(Self {
            commands: vec![],
            login: vec![],
            pagination: None,
            completion: compile_prompt_pattern(completion).map_err(ProfileError::InvalidPattern)?,
            wait_budget: Duration::from_secs(120),
        })
    }

    /// Add a command.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }

    /// Add an in-band login step.
    pub fn with_login(mut self, pattern: &str, response: LoginResponse) -> Result<Self> {
        self.login.push(LoginStep::new(pattern, response)?);
        Ok(self)
    }

    /// Set the pagination marker and continuation keystroke.
    pub fn with_pagination(
        mut self,
        pattern: &str,
        response: impl Into<String>,
    ) -> Result<Self> {
        self.pagination = Some(Pagination {
            pattern: Regex::new(pattern).map_err(ProfileError::InvalidPattern)?,
            response: response.into(),
        });
        Ok(self)
    }

    /// Set the overall wait budget.
    pub fn with_wait_budget(mut self, budget: Duration) -> Self {
        self.wait_budget = budget;
        self
    }
}

/// HTTPS configuration export endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiExport {
    /// Request path including query, e.g. `/api/v2/monitor/system/config/backup?scope=global`.
    pub path: String,

    /// Port used when the device has no override.
    pub default_port: u16,
}

/// How a platform's configuration is captured.
#[derive(Debug, Clone)]
pub enum CommandProfile {
    /// One or more commands with no login, paging or prompt handling.
    Simple {
        commands: Vec<String>,
        delivery: Delivery,
    },

    /// Prompt-driven session.
    Interactive(InteractiveScript),

    /// HTTPS export, bypassing SSH entirely.
    ApiExport(ApiExport),
}

impl CommandProfile {
    /// Simple profile run over exec streams.
    pub fn exec<S: Into<String>>(commands: impl IntoIterator<Item = S>) -> Self {
        Self::Simple {
            commands: commands.into_iter().map(Into::into).collect(),
            delivery: Delivery::Exec,
        }
    }

    /// Simple profile typed into a shell.
    pub fn shell<S: Into<String>>(commands: impl IntoIterator<Item = S>) -> Self {
        Self::Simple {
            commands: commands.into_iter().map(Into::into).collect(),
            delivery: Delivery::Shell,
        }
    }

    /// Commands this profile sends (empty for API exports).
    pub fn commands(&self) -> &[String] {
        match self {
            Self::Simple { commands, .. } => commands,
            Self::Interactive(script) => &script.commands,
            Self::ApiExport(_) => &[],
        }
    }
}
