//! Registry mapping platform identifiers to command profiles.

use indexmap::IndexMap;

use super::profile::CommandProfile;
use super::vendors;
use crate::error::{ProfileError, Result};

/// Result of a platform lookup.
///
/// Unknown platforms are an expected outcome, not an error path: callers
/// must decide what to do with them.
#[derive(Debug)]
pub enum ProfileLookup<'a> {
    Found(&'a CommandProfile),
    Unsupported,
}

impl<'a> ProfileLookup<'a> {
    /// Convert to a `Result`, naming the platform on failure.
    pub fn require(self, platform: &str) -> Result<&'a CommandProfile> {
        match self {
            Self::Found(profile) => Ok(profile),
            Self::Unsupported => Err(ProfileError::UnsupportedPlatform {
                name: platform.to_string(),
            }
            .into()),
        }
    }
}

/// Immutable-after-construction set of command profiles.
#[derive(Debug, Default)]
pub struct ProfileRegistry {
    profiles: IndexMap<String, CommandProfile>,
}

impl ProfileRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            profiles: IndexMap::new(),
        }
    }

    /// Registry with every built-in platform.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (name, profile) in vendors::builtin_profiles() {
            registry.profiles.insert(name.to_string(), profile);
        }
        registry
    }

    /// Register a profile under a new platform identifier.
    pub fn register(&mut self, name: impl Into<String>, profile: CommandProfile) -> Result<()> {
        let name = name.into();
        if self.profiles.contains_key(&name) {
            return Err(ProfileError::AlreadyRegistered { name }.into());
        }
        self.profiles.insert(name, profile);
        Ok(())
    }

    /// Look up a platform's profile.
    pub fn lookup(&self, name: &str) -> ProfileLookup<'_> {
        match self.profiles.get(name) {
            Some(profile) => ProfileLookup::Found(profile),
            None => ProfileLookup::Unsupported,
        }
    }

    /// Check if a platform is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::profile::Delivery;

    #[test]
    fn test_builtin_covers_fleet() {
        let registry = ProfileRegistry::builtin();
        for name in [
            "juniper_qfx",
            "juniper_srx",
            "cisco_ios",
            "cisco_asa",
            "cisco_wlc",
            "huawei",
            "h3c",
            "h3c_core",
            "fortinet",
            "hillstone",
        ] {
            assert!(registry.contains(name), "missing {name}");
        }
    }

    #[test]
    fn test_lookup_unknown_is_unsupported() {
        let registry = ProfileRegistry::builtin();
        assert!(matches!(
            registry.lookup("nokia_sros"),
            ProfileLookup::Unsupported
        ));

        let err = registry.lookup("nokia_sros").require("nokia_sros").unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Profile(ProfileError::UnsupportedPlatform { ref name }) if name == "nokia_sros"
        ));
    }

    #[test]
    fn test_register_custom_platform() {
        let mut registry = ProfileRegistry::new();
        registry
            .register("arista_eos", CommandProfile::exec(["show running-config"]))
            .unwrap();

        match registry.lookup("arista_eos") {
            ProfileLookup::Found(CommandProfile::Simple { delivery, .. }) => {
                assert_eq!(*delivery, Delivery::Exec)
            }
            other => panic!("unexpected lookup: {other:?}"),
        }
    }

    #[test]
    fn test_register_duplicate_rejected() {
        let mut registry = ProfileRegistry::builtin();
        let err = registry
            .register("cisco_ios", CommandProfile::exec(["show run"]))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Profile(ProfileError::AlreadyRegistered { .. })
        ));
    }
}
