//! Display-session environment defaults.
//!
//! Child processes need a graphical session to talk to. When the plugin runs
//! inside a host that was started without one (a service, a cron job), these
//! defaults make the scripts usable anyway. Values already present in the
//! ambient environment always win.

use std::collections::{BTreeMap, HashMap};

/// Fixed defaults, in the order they are applied.
pub const DISPLAY_DEFAULTS: &[(&str, &str)] = &[
    ("DISPLAY", ":0"),
    ("XDG_SESSION_TYPE", "wayland"),
    ("XDG_CURRENT_DESKTOP", "GNOME"),
    ("WAYLAND_DISPLAY", "wayland-0"),
];

/// Where ambient values are read from.
#[derive(Debug, Clone, Default)]
pub enum AmbientEnv {
    /// The current process environment, read fresh on every call.
    #[default]
    Process,
    /// A fixed map. The child gets exactly this map plus the defaults.
    Fixed(HashMap<String, String>),
}

impl AmbientEnv {
    /// Look up an ambient value. Empty values count as absent.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match self {
            Self::Process => std::env::var(key).ok(),
            Self::Fixed(map) => map.get(key).cloned(),
        };
        value.filter(|v| !v.is_empty())
    }

    /// Whether the child should start from an empty environment.
    pub fn is_isolated(&self) -> bool {
        matches!(self, Self::Fixed(_))
    }
}

/// Compute the variables that must be set on the child.
///
/// For the process environment this is only the missing defaults, since the
/// child inherits everything else. For a fixed ambient map it is the whole map
/// layered under the defaults.
pub fn materialize(ambient: &AmbientEnv) -> BTreeMap<String, String> {
    let mut env = BTreeMap::new();

    if let AmbientEnv::Fixed(map) = ambient {
        for (key, value) in map {
            env.insert(key.clone(), value.clone());
        }
    }

    for (key, default) in DISPLAY_DEFAULTS {
        if ambient.get(key).is_none() {
            env.insert((*key).to_string(), (*default).to_string());
        }
    }

    env
}
