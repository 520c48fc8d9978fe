//! Hillstone StoneOS profile.

use crate::platform::CommandProfile;

pub const PLATFORM_NAME: &str = "hillstone";

pub fn profiles() -> Vec<(&'static str, CommandProfile)> {
    vec![(PLATFORM_NAME, CommandProfile::exec(["show running-config"]))]
}
