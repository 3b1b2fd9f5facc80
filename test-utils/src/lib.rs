use std::{
    error::Error,
    io,
    path::Path,
    process::{Command, Output},
    str,
};

const SINI_PATH: &str = "./target/debug/sini";

pub struct Expected<'a> {
    pub stdout: &'a str,
    pub stderr: &'a str,
}

impl<'a> Expected<'a> {
    fn assert_matches(self, output: &Output) -> Result<(), Box<dyn Error>> {
        assert_eq!(str::from_utf8(&output.stdout)?, self.stdout);
        assert_eq!(str::from_utf8(&output.stderr)?, self.stderr);
        Ok(())
    }
}

fn run_compiler(args: &[&str]) -> Result<Output, io::Error> {
    Command::new(SINI_PATH).args(args).output()
}

/// Compile `src_path` with `--dump` and match the produced INI and
/// diagnostics exactly.
pub fn check_dump(src_path: &Path, expected: Expected) -> Result<(), Box<dyn Error>> {
    let output = run_compiler(&[&src_path.to_string_lossy(), "--dump"])?;

    assert!(
        output.status.success(),
        "sini exited with status {:?}: {}",
        output.status.code(),
        str::from_utf8(&output.stderr)?
    );

    expected.assert_matches(&output)?;

    Ok(())
}

/// Compile `src_path` with `--dump` and assert a failing exit with no INI on
/// stdout. Returns the diagnostics for further inspection.
pub fn check_failing_compilation(src_path: &Path) -> Result<String, Box<dyn Error>> {
    let output = run_compiler(&[&src_path.to_string_lossy(), "--dump"])?;

    assert!(
        !output.status.success(),
        "sini should exit with a failing status"
    );
    assert!(output.stdout.is_empty(), "a failing compile emits no INI");

    Ok(str::from_utf8(&output.stderr)?.to_owned())
}
