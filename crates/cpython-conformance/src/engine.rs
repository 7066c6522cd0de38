//! Locating regrtest inside the vendored tree and bootstrapping it.
//!
//! The candidate runtime takes a single script path and no further argv, so
//! regrtest is started through a generated script that puts `Lib` on
//! `sys.path`, imports `test.regrtest`, and calls `main` with the argument
//! list embedded as Python string literals.

use crate::error::ConformanceError;
use crate::Result;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Library directory inside a CPython checkout.
pub const LIB_DIR: &str = "Lib";

/// regrtest entry module, relative to [`LIB_DIR`].
pub const ENTRY_POINT: &str = "test/regrtest.py";

/// `<tree>/Lib`, which must already exist. The runner never syncs the tree.
pub fn resolve_library_path(tree: &Path) -> Result<PathBuf> {
    let lib = tree.join(LIB_DIR);
    if !lib.is_dir() {
        return Err(ConformanceError::VendorTreeMissing(lib));
    }
    Ok(lib)
}

/// Path of `test/regrtest.py` under `lib`.
pub fn locate_entry_point(lib: &Path) -> Result<PathBuf> {
    let entry = lib.join(ENTRY_POINT);
    if !entry.is_file() {
        return Err(ConformanceError::EntryPointMissing(lib.to_path_buf()));
    }
    Ok(entry)
}

/// Quote `s` as a double-quoted Python string literal.
pub fn python_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Source of the bootstrap script that hands `args` to regrtest.
///
/// `lib` is embedded verbatim, so it must be valid UTF-8.
pub fn render_bootstrap(lib: &Path, args: &[String]) -> Result<String> {
    let lib = lib
        .to_str()
        .map(python_literal)
        .ok_or_else(|| ConformanceError::NonUtf8Path(lib.to_path_buf()))?;
    let args = args
        .iter()
        .map(|a| python_literal(a))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        "import sys\n\
         sys.path.insert(0, {lib})\n\
         import test.regrtest\n\
         test.regrtest.main([{args}])\n"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tree(with_entry: bool) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Lib/test")).unwrap();
        if with_entry {
            std::fs::write(dir.path().join("Lib/test/regrtest.py"), "").unwrap();
        }
        dir
    }

    #[test]
    fn test_library_path_resolves() {
        let tree = make_tree(true);
        let lib = resolve_library_path(tree.path()).unwrap();
        assert_eq!(lib, tree.path().join("Lib"));
    }

    #[test]
    fn test_missing_tree_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_library_path(&dir.path().join("cpython")).unwrap_err();
        match err {
            ConformanceError::VendorTreeMissing(path) => {
                assert_eq!(path, dir.path().join("cpython").join("Lib"));
            }
            other => panic!("expected VendorTreeMissing, got {other:?}"),
        }
    }

    #[test]
    fn test_entry_point_required() {
        let tree = make_tree(false);
        let lib = resolve_library_path(tree.path()).unwrap();
        assert!(matches!(
            locate_entry_point(&lib),
            Err(ConformanceError::EntryPointMissing(_))
        ));

        let tree = make_tree(true);
        let lib = resolve_library_path(tree.path()).unwrap();
        assert_eq!(
            locate_entry_point(&lib).unwrap(),
            lib.join("test").join("regrtest.py")
        );
    }

    #[test]
    fn test_python_literal_escapes() {
        assert_eq!(python_literal("test_os"), r#""test_os""#);
        assert_eq!(python_literal(r"C:\py"), r#""C:\\py""#);
        assert_eq!(python_literal(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(python_literal("a\nb\tc"), r#""a\nb\tc""#);
        assert_eq!(python_literal("\u{1b}[0m"), r#""\x1b[0m""#);
        assert_eq!(python_literal("naïve'"), "\"naïve'\"");
    }

    #[test]
    fn test_bootstrap_embeds_library_and_arguments() {
        let script = render_bootstrap(
            Path::new("/src/cpython/Lib"),
            &["-j".to_string(), "2".to_string(), "test_os".to_string()],
        )
        .unwrap();
        assert_eq!(
            script,
            "import sys\n\
             sys.path.insert(0, \"/src/cpython/Lib\")\n\
             import test.regrtest\n\
             test.regrtest.main([\"-j\", \"2\", \"test_os\"])\n"
        );
    }

    #[test]
    fn test_bootstrap_with_no_arguments() {
        let script = render_bootstrap(Path::new("Lib"), &[]).unwrap();
        assert!(script.ends_with("test.regrtest.main([])\n"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_library_path_is_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let lib = Path::new(OsStr::from_bytes(b"/src/cpy\xffthon/Lib"));
        match render_bootstrap(lib, &[]) {
            Err(ConformanceError::NonUtf8Path(path)) => assert_eq!(path, lib),
            other => panic!("expected NonUtf8Path, got {other:?}"),
        }
    }
}
