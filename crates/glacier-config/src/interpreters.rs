use crate::store::Config;

/// Candidate commands probed per language when nothing configured is on
/// `PATH`, in preference order.
pub const LANGUAGES: &[(&str, &[&str])] = &[
    ("python", &["python", "python3", "py"]),
    ("javascript", &["node", "nodejs"]),
    ("java", &["javac", "java"]),
    ("cpp", &["g++", "clang++", "c++"]),
    ("c", &["gcc", "clang", "cc"]),
    ("rust", &["rustc", "cargo"]),
    ("go", &["go"]),
    ("ruby", &["ruby"]),
    ("php", &["php"]),
    ("lua", &["lua", "luac"]),
];

/// Fill in interpreters whose configured command isn't actually available.
///
/// For each known language, if the configured entry is missing or not on
/// `PATH`, probe the conventional candidates and take the first hit. Entries
/// that resolve are left alone, so a user's explicit choice survives.
/// Returns `true` if anything changed (the caller decides whether to persist).
pub fn auto_detect(config: &mut Config) -> bool {
    let mut changed = false;
    for (language, candidates) in LANGUAGES {
        let configured = config.interpreters.get(*language);
        let usable = configured.is_some_and(|cmd| which::which(cmd).is_ok());
        if usable {
            continue;
        }
        for candidate in *candidates {
            if which::which(candidate).is_ok() {
                config.set_interpreter(language, *candidate);
                changed = true;
                break;
            }
        }
    }
    changed
}

/// Resolve a language's interpreter to an absolute path when possible.
///
/// Falls back to the configured command verbatim when `PATH` lookup fails;
/// the shell gets the final say on whether that runs.
pub fn resolve(config: &Config, language: &str) -> String {
    let command = config.interpreter(language);
    match which::which(&command) {
        Ok(path) => path.to_string_lossy().into_owned(),
        Err(_) => command,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_detect_leaves_resolvable_entries_alone() {
        let mut config = Config::default();
        // `sh` exists on any POSIX box; pin python to it and make sure
        // detection doesn't clobber a working explicit choice.
        if which::which("sh").is_err() {
            return;
        }
        config.set_interpreter("python", "sh");
        auto_detect(&mut config);
        assert_eq!(config.interpreter("python"), "sh");
    }

    #[test]
    fn test_auto_detect_replaces_missing_command() {
        let mut config = Config::default();
        config.set_interpreter("python", "/definitely/not/python");
        auto_detect(&mut config);
        // Either a candidate was found on PATH, or none exists and the bogus
        // entry stays; both are acceptable, but if python3 is present the
        // entry must have been repaired.
        if which::which("python3").is_ok() || which::which("python").is_ok() {
            assert_ne!(config.interpreter("python"), "/definitely/not/python");
        }
    }

    #[test]
    fn test_resolve_produces_absolute_path_for_real_command() {
        if which::which("sh").is_err() {
            return;
        }
        let mut config = Config::default();
        config.set_interpreter("python", "sh");
        let resolved = resolve(&config, "python");
        assert!(std::path::Path::new(&resolved).is_absolute());
    }

    #[test]
    fn test_resolve_passes_unknown_command_through() {
        let mut config = Config::default();
        config.set_interpreter("python", "/definitely/not/python");
        assert_eq!(resolve(&config, "python"), "/definitely/not/python");
    }
}
