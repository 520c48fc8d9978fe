//! H3C Comware profiles.
//!
//! Comware paginates unless `screen-length disable` is issued in the same
//! shell, so both commands run interactively and each one completes when the
//! `<sysname>` prompt returns.
//!
//! # Prompt Examples
//!
//! ```text
//! <core-sw>screen-length disable
//! <core-sw>display current-configuration
//!  ...
//!   ---- More ----
//! <core-sw>
//! ```

use std::time::Duration;

use crate::platform::{CommandProfile, InteractiveScript};

pub const PLATFORM_NAME: &str = "h3c";
pub const CORE: &str = "h3c_core";

/// `<sysname>` at the start of a line with nothing after it.
pub const PROMPT: &str = r"(?:^|\n)<[^<>\r\n]+>[ \t]*$";

pub fn profiles() -> Vec<(&'static str, CommandProfile)> {
    vec![
        (PLATFORM_NAME, CommandProfile::Interactive(script())),
        (CORE, CommandProfile::Interactive(script())),
    ]
}

fn script() -> InteractiveScript {
    InteractiveScript::new(PROMPT)
        .unwrap()
        .with_pagination(r"[ \t]*-{2,}\s*More\s*-{2,}", " ")
        .unwrap()
        .with_command("screen-length disable")
        .with_command("display current-configuration")
        .with_wait_budget(Duration::from_secs(300))
}
