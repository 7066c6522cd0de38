//! Launching regrtest under the candidate runtime.

use crate::args::build_arguments;
use crate::config::RunConfiguration;
use crate::engine::{locate_entry_point, render_bootstrap, resolve_library_path};
use crate::error::ConformanceError;
use crate::Result;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tracing::{debug, info};

/// Default candidate runtime, relative to the working directory.
pub const DEFAULT_INTERPRETER: &str = "target/debug/oxython";

/// Environment defaults applied only when the caller has not set them.
pub const ENV_DEFAULTS: [(&str, &str); 2] =
    [("PYTHONWARNINGS", "default"), ("PYTHONNOUSERSITE", "1")];

/// A fully resolved engine invocation, ready to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub lib: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(OsString, OsString)>,
}

impl Invocation {
    /// Bootstrap script source for this invocation.
    pub fn bootstrap(&self) -> Result<String> {
        render_bootstrap(&self.lib, &self.args)
    }
}

/// Child environment: `lib` first on `PYTHONPATH`, plus any of
/// [`ENV_DEFAULTS`] that `lookup` does not already provide.
pub fn engine_environment<F>(lib: &Path, lookup: F) -> Result<Vec<(OsString, OsString)>>
where
    F: Fn(&str) -> Option<OsString>,
{
    let mut paths = vec![lib.to_path_buf()];
    if let Some(existing) = lookup("PYTHONPATH") {
        paths.extend(std::env::split_paths(&existing));
    }
    let pythonpath = std::env::join_paths(paths).map_err(|e| {
        ConformanceError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
    })?;

    let mut env = vec![(OsString::from("PYTHONPATH"), pythonpath)];
    for (key, value) in ENV_DEFAULTS {
        if lookup(key).is_none() {
            env.push((key.into(), value.into()));
        }
    }
    Ok(env)
}

/// Exit code of the engine; a signal death on Unix becomes `128 + signal`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// Runs CPython's regression suite with a candidate runtime.
#[derive(Debug, Clone)]
pub struct ConformanceRunner {
    interpreter: PathBuf,
}

impl Default for ConformanceRunner {
    fn default() -> Self {
        ConformanceRunner::new(DEFAULT_INTERPRETER)
    }
}

impl ConformanceRunner {
    pub fn new(interpreter: impl Into<PathBuf>) -> Self {
        ConformanceRunner {
            interpreter: interpreter.into(),
        }
    }

    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    /// Resolve everything that can fail before the engine starts.
    pub fn prepare(&self, tree: &Path, config: &RunConfiguration) -> Result<Invocation> {
        let lib = resolve_library_path(tree)?;
        let entry = locate_entry_point(&lib)?;
        debug!("regrtest entry point: {}", entry.display());

        let args = build_arguments(config);
        let env = engine_environment(&lib, |key| std::env::var_os(key))?;

        Ok(Invocation { lib, args, env })
    }

    /// Run regrtest and return its exit code unchanged.
    ///
    /// The child inherits stdio. Interrupts reach it directly; nothing is
    /// intercepted here.
    pub fn run(&self, tree: &Path, config: &RunConfiguration) -> Result<i32> {
        let invocation = self.prepare(tree, config)?;
        let source = invocation.bootstrap()?;

        let mut script = tempfile::Builder::new()
            .prefix("regrtest-bootstrap-")
            .suffix(".py")
            .tempfile()?;
        script.write_all(source.as_bytes())?;
        script.flush()?;

        info!(
            "Running regrtest from {} with {}: {}",
            invocation.lib.display(),
            self.interpreter.display(),
            invocation.args.join(" ")
        );

        let status = Command::new(&self.interpreter)
            .arg(script.path())
            .envs(invocation.env.iter().map(|(k, v)| (k, v)))
            .status()
            .map_err(|source| ConformanceError::RuntimeLaunch {
                program: self.interpreter.clone(),
                source,
            })?;

        let code = exit_code(status);
        debug!("regrtest exited with {}", code);
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let map: HashMap<String, OsString> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), OsString::from(v)))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn as_map(env: Vec<(OsString, OsString)>) -> HashMap<String, String> {
        env.into_iter()
            .map(|(k, v)| (k.into_string().unwrap(), v.into_string().unwrap()))
            .collect()
    }

    #[test]
    fn test_defaults_applied_when_unset() {
        let env = engine_environment(Path::new("/v/Lib"), lookup_from(&[])).unwrap();
        let env = as_map(env);
        assert_eq!(env["PYTHONPATH"], "/v/Lib");
        assert_eq!(env["PYTHONWARNINGS"], "default");
        assert_eq!(env["PYTHONNOUSERSITE"], "1");
    }

    #[test]
    fn test_caller_overrides_are_kept() {
        let lookup = lookup_from(&[("PYTHONWARNINGS", "error"), ("PYTHONNOUSERSITE", "")]);
        let env = as_map(engine_environment(Path::new("/v/Lib"), lookup).unwrap());
        assert!(!env.contains_key("PYTHONWARNINGS"));
        assert!(!env.contains_key("PYTHONNOUSERSITE"));
    }

    #[cfg(unix)]
    #[test]
    fn test_library_is_prepended_to_pythonpath() {
        let lookup = lookup_from(&[("PYTHONPATH", "/a:/b")]);
        let env = as_map(engine_environment(Path::new("/v/Lib"), lookup).unwrap());
        assert_eq!(env["PYTHONPATH"], "/v/Lib:/a:/b");
    }

    #[test]
    fn test_prepare_fails_without_tree() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConformanceRunner::default()
            .prepare(&dir.path().join("cpython"), &RunConfiguration::default())
            .unwrap_err();
        assert!(matches!(err, ConformanceError::VendorTreeMissing(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_code_passthrough() {
        use std::os::unix::process::ExitStatusExt;
        assert_eq!(exit_code(ExitStatus::from_raw(0)), 0);
        assert_eq!(exit_code(ExitStatus::from_raw(2 << 8)), 2);
        assert_eq!(exit_code(ExitStatus::from_raw(9)), 137);
    }
}
