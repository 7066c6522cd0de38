//! Runs the conformance runner against a fake runtime that records how it
//! was invoked.

#![cfg(unix)]

use cpython_conformance::{
    load_exclusions, ConformanceError, ConformanceRunner, FilterSet, RunConfiguration,
    WorkerCount,
};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Harness {
    dir: TempDir,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let lib_test = dir.path().join("cpython/Lib/test");
        std::fs::create_dir_all(&lib_test).unwrap();
        std::fs::write(lib_test.join("regrtest.py"), "def main(args): pass\n").unwrap();
        std::fs::create_dir_all(dir.path().join("record")).unwrap();
        Harness { dir }
    }

    fn tree(&self) -> PathBuf {
        self.dir.path().join("cpython")
    }

    fn record(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join("record").join(name)).unwrap()
    }

    /// A stand-in runtime that copies its script, dumps its environment and
    /// exits with `code`.
    fn fake_runtime(&self, code: i32) -> PathBuf {
        let record = self.dir.path().join("record");
        let path = self.dir.path().join("oxython");
        let body = format!(
            "#!/bin/sh\ncp \"$1\" '{rec}/script.py'\nenv > '{rec}/env'\nexit {code}\n",
            rec = record.display(),
        );
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}

fn config(skip_file: &Path) -> RunConfiguration {
    RunConfiguration {
        workers: "3".parse::<WorkerCount>().unwrap(),
        verbose: true,
        filters: FilterSet {
            exclusions: load_exclusions(skip_file).unwrap(),
            pattern: Some("test_dumps".to_string()),
            tests: vec!["test_json".to_string()],
            passthrough: vec!["--timeout".to_string(), "60".to_string()],
        },
    }
}

#[test]
fn engine_exit_code_and_arguments_are_forwarded() {
    let h = Harness::new();
    let skip_file = h.dir.path().join("skips.txt");
    std::fs::write(&skip_file, "# flaky\n\ntest_ssl.py\ntest_os\n").unwrap();

    let runner = ConformanceRunner::new(h.fake_runtime(7));
    let code = runner.run(&h.tree(), &config(&skip_file)).unwrap();
    assert_eq!(code, 7);

    let lib = h.tree().join("Lib");
    let script = h.record("script.py");
    assert!(script.contains(&format!("sys.path.insert(0, \"{}\")", lib.display())));
    assert!(script.contains("import test.regrtest"));
    assert!(script.contains(
        "test.regrtest.main([\"-j\", \"3\", \"-v\", \"-x\", \"test_ssl\", \"-x\", \"test_os\", \
         \"-k\", \"test_dumps\", \"--timeout\", \"60\", \"test_json\"])"
    ));

    let env = h.record("env");
    let pythonpath = env
        .lines()
        .find_map(|line| line.strip_prefix("PYTHONPATH="))
        .expect("PYTHONPATH set for the engine");
    assert!(pythonpath.starts_with(&lib.display().to_string()));
    assert!(env.lines().any(|l| l.starts_with("PYTHONWARNINGS=")));
    assert!(env.lines().any(|l| l.starts_with("PYTHONNOUSERSITE=")));
}

#[test]
fn successful_engine_returns_zero() {
    let h = Harness::new();
    let runner = ConformanceRunner::new(h.fake_runtime(0));
    let code = runner
        .run(&h.tree(), &config(&h.dir.path().join("missing.txt")))
        .unwrap();
    assert_eq!(code, 0);
    assert!(h
        .record("script.py")
        .contains("[\"-j\", \"3\", \"-v\", \"-k\", \"test_dumps\""));
}

#[test]
fn missing_runtime_fails_before_running() {
    let h = Harness::new();
    let runner = ConformanceRunner::new(h.dir.path().join("no-such-runtime"));
    let err = runner
        .run(&h.tree(), &RunConfiguration::default())
        .unwrap_err();
    assert!(matches!(err, ConformanceError::RuntimeLaunch { .. }), "{err:?}");
}

#[test]
fn missing_entry_point_fails_before_running() {
    let h = Harness::new();
    std::fs::remove_file(h.tree().join("Lib/test/regrtest.py")).unwrap();

    let runner = ConformanceRunner::new(h.fake_runtime(0));
    let err = runner
        .run(&h.tree(), &RunConfiguration::default())
        .unwrap_err();
    assert!(matches!(err, ConformanceError::EntryPointMissing(_)));
    assert!(!h.dir.path().join("record/script.py").exists());
}
