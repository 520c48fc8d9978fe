//! Huawei VRP profile.

use crate::platform::CommandProfile;

pub const PLATFORM_NAME: &str = "huawei";

pub fn profiles() -> Vec<(&'static str, CommandProfile)> {
    vec![(
        PLATFORM_NAME,
        CommandProfile::exec(["display current-configuration"]),
    )]
}
