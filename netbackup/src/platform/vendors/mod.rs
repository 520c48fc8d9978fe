//! Built-in command profiles, one module per vendor family.

pub mod cisco;
pub mod fortinet;
pub mod h3c;
pub mod hillstone;
pub mod huawei;
pub mod juniper;

use super::profile::CommandProfile;

/// Every built-in `(platform identifier, profile)` pair.
pub fn builtin_profiles() -> Vec<(&'static str, CommandProfile)> {
    let mut profiles = Vec::new();
    profiles.extend(juniper::profiles());
    profiles.extend(cisco::profiles());
    profiles.extend(huawei::profiles());
    profiles.extend(h3c::profiles());
    profiles.extend(fortinet::profiles());
    profiles.extend(hillstone::profiles());
    profiles
}
