//! Path normalization and expansion

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::env;
use std::path::{Path, PathBuf};

static ENV_VAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")
        .expect("valid env var regex")
});

/// Substitute `$NAME` and `${NAME}` with the value of the environment variable.
///
/// References to unset variables are left untouched.
pub fn expand_vars(input: &str) -> String {
    expand_vars_with(input, |name| env::var(name).ok())
}

pub(crate) fn expand_vars_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ENV_VAR
        .replace_all(input, |caps: &Captures<'_>| {
            let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            lookup(name).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Replace a leading `~` with the user's home directory.
pub fn expand_user(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

pub(crate) fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME").or_else(|| env::var_os("USERPROFILE")).map(PathBuf::from)
}

/// Expand environment variables and `~` in a user-supplied path string.
pub fn expand_path(input: &str) -> PathBuf {
    expand_user(Path::new(&expand_vars(input)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "DATA" => Some("/srv/data".to_string()),
            "USER" => Some("ops".to_string()),
            _ => None,
        }
    }

    #[test]
    fn expands_braced_and_bare_references() {
        assert_eq!(expand_vars_with("${DATA}/cfg.json", lookup), "/srv/data/cfg.json");
        assert_eq!(expand_vars_with("$DATA/$USER.json", lookup), "/srv/data/ops.json");
    }

    #[test]
    fn leaves_unknown_references_alone() {
        assert_eq!(expand_vars_with("$MISSING/${ALSO_MISSING}", lookup), "$MISSING/${ALSO_MISSING}");
    }

    #[test]
    fn expand_user_ignores_paths_without_tilde() {
        assert_eq!(expand_user(Path::new("/etc/app")), PathBuf::from("/etc/app"));
        assert_eq!(expand_user(Path::new("rel/~x")), PathBuf::from("rel/~x"));
    }
}
