//! Juniper QFX / SRX profiles.
//!
//! `| display set` renders the configuration as flat `set` statements and
//! `| no-more` disables the pager, so a single exec stream is enough.

use crate::platform::CommandProfile;

pub const QFX: &str = "juniper_qfx";
pub const SRX: &str = "juniper_srx";

const SHOW_CONFIGURATION: &str = "show configuration | display set | no-more";

pub fn profiles() -> Vec<(&'static str, CommandProfile)> {
    vec![
        (QFX, CommandProfile::exec([SHOW_CONFIGURATION])),
        (SRX, CommandProfile::exec([SHOW_CONFIGURATION])),
    ]
}
