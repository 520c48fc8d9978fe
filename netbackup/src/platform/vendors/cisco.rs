//! Cisco IOS, ASA and WLC profiles.
//!
//! - IOS runs `show running-config` on an exec stream.
//! - ASA needs the pager disabled in the same session, so both commands are
//!   typed into one shell.
//! - AireOS wireless controllers ignore SSH-level authentication and ask for
//!   credentials again inside the shell, then page output behind
//!   `Press Enter to continue`.
//!
//! # Prompt Examples
//!
//! ```text
//! (Cisco Controller)
//! User: backup
//! Password:********
//! (Cisco Controller) >config paging disable
//! (Cisco Controller) >show run-config
//! ...
//! --More-- or (q)uit
//! Press Enter to continue...
//! (Cisco Controller) >
//! ```

use std::time::Duration;

use crate::platform::{CommandProfile, InteractiveScript, LoginResponse};

pub const IOS: &str = "cisco_ios";
pub const ASA: &str = "cisco_asa";
pub const WLC: &str = "cisco_wlc";

/// Idle prompt of an AireOS controller.
pub const WLC_PROMPT: &str = r"\(Cisco Controller\) >[ \t]*$";

pub fn profiles() -> Vec<(&'static str, CommandProfile)> {
    vec![
        (IOS, CommandProfile::exec(["show running-config"])),
        (
            ASA,
            CommandProfile::shell(["terminal pager 0", "show running-config"]),
        ),
        (WLC, CommandProfile::Interactive(wlc_script())),
    ]
}

fn wlc_script() -> InteractiveScript {
    InteractiveScript::new(WLC_PROMPT)
        .unwrap()
        .with_login(r"User:\s*$", LoginResponse::Username)
        .unwrap()
        .with_login(r"Password:\s*$", LoginResponse::Password)
        .unwrap()
        .with_pagination(r"Press Enter to continue\.*", "\n")
        .unwrap()
        .with_command("config paging disable")
        .with_command("show run-config")
        .with_wait_budget(Duration::from_secs(300))
}
