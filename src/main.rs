//! anybin2wheel CLI entrypoint.
//!
//! Packages an executable as a Python wheel and prints the path of the
//! created wheel. All input is validated before the output directory is
//! touched.

mod cli;
mod error;
mod logging;

use anybin2wheel_core::wheel::packaging::{PackageParams, check_executable, package_executable};
use anybin2wheel_core::wheel::verification::verify_wheel;
use clap::Parser;
use cli::Cli;
use error::CliError;
use log::info;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let result = run(&cli, &mut std::io::stdout().lock());
    std::process::exit(exit_code(&result, &mut std::io::stderr().lock()));
}

/// Validate the arguments, build the wheel, and print its path.
fn run(cli: &Cli, stdout: &mut dyn Write) -> Result<PathBuf, CliError> {
    let record = cli.distribution_record()?;
    let tags = cli.tags()?;
    check_executable(cli.binary.as_std_path())?;

    fs::create_dir_all(&cli.dist_dir).map_err(|source| CliError::DistDir {
        path: cli.dist_dir.clone(),
        source,
    })?;

    let output = package_executable(&PackageParams {
        executable: cli.binary.clone().into_std_path_buf(),
        record,
        tags,
        output_dir: cli.dist_dir.clone().into_std_path_buf(),
    })?;

    if cli.verify {
        let verified = verify_wheel(&output.archive_path)?;
        info!(
            "verified {} members of {}",
            verified.members.len(),
            output.wheel_name
        );
    }

    writeln!(stdout, "{}", output.archive_path.display())
        .map_err(|source| CliError::WriteFailed { source })?;
    Ok(output.archive_path)
}

/// Report a failed run on `stderr` and return the process exit status.
fn exit_code(result: &Result<PathBuf, CliError>, stderr: &mut dyn Write) -> i32 {
    let Err(err) = result else {
        return 0;
    };
    if writeln!(stderr, "error: {err}").is_err() {
        // Nowhere left to report to; the exit status still signals failure.
    }
    err.exit_code()
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use crate::error::{EXIT_BUILD_FAILED, EXIT_INVALID_INPUT};
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("temp dir creation succeeds")
    }

    fn utf8(path: std::path::PathBuf) -> String {
        Utf8PathBuf::from_path_buf(path)
            .expect("utf8 temp path")
            .into_string()
    }

    fn cli_for(temp_dir: &TempDir, extra: &[&str]) -> Cli {
        let binary_path = temp_dir.path().join("mytool");
        fs::write(&binary_path, b"#!/bin/sh\n").expect("write binary");
        let binary = utf8(binary_path);
        let dist = utf8(temp_dir.path().join("out/dist"));
        let mut args = vec![
            "anybin2wheel",
            binary.as_str(),
            "my-tool",
            "0.3.0",
            "-d",
            dist.as_str(),
            "-p",
            "linux_x86_64",
        ];
        args.extend_from_slice(extra);
        Cli::try_parse_from(args).expect("arguments parse")
    }

    #[rstest]
    fn builds_wheel_into_new_dist_dir(temp_dir: TempDir) {
        let cli = cli_for(&temp_dir, &["--verify"]);
        let path = run(&cli, &mut Vec::new()).expect("build succeeds");
        assert_eq!(
            path,
            temp_dir
                .path()
                .join("out/dist/my_tool-0.3.0-py2.py3-none-linux_x86_64.whl")
        );
        assert!(path.is_file());
    }

    #[rstest]
    fn prints_wheel_path_on_stdout(temp_dir: TempDir) {
        let cli = cli_for(&temp_dir, &[]);
        let mut stdout = Vec::new();
        let path = run(&cli, &mut stdout).expect("build succeeds");
        assert_eq!(
            String::from_utf8(stdout).expect("utf8 output"),
            format!("{}\n", path.display())
        );
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[rstest]
    fn unwritable_stdout_fails_the_run(temp_dir: TempDir) {
        let cli = cli_for(&temp_dir, &[]);
        let err = run(&cli, &mut ClosedPipe).expect_err("stdout closed");
        assert!(matches!(err, CliError::WriteFailed { .. }));
        assert_eq!(err.exit_code(), EXIT_BUILD_FAILED);
    }

    #[test]
    fn failures_are_reported_on_stderr() {
        let mut stderr = Vec::new();
        let err = CliError::DistDir {
            path: Utf8PathBuf::from("dist"),
            source: std::io::Error::other("read-only"),
        };
        assert_eq!(exit_code(&Err(err), &mut stderr), EXIT_BUILD_FAILED);
        assert_eq!(
            String::from_utf8(stderr).expect("utf8 output"),
            "error: cannot create output directory dist: read-only\n"
        );
    }

    #[test]
    fn success_exits_zero_without_stderr_output() {
        let mut stderr = Vec::new();
        assert_eq!(exit_code(&Ok(PathBuf::from("x.whl")), &mut stderr), 0);
        assert!(stderr.is_empty());
    }

    #[rstest]
    fn written_wheel_carries_metadata_options(temp_dir: TempDir) {
        let cli = cli_for(&temp_dir, &["--author", "Ada", "--summary", "Tool"]);
        let path = run(&cli, &mut Vec::new()).expect("build succeeds");

        let file = fs::File::open(path).expect("open wheel");
        let mut archive = zip::ZipArchive::new(file).expect("read zip");
        let mut metadata = String::new();
        std::io::Read::read_to_string(
            &mut archive
                .by_name("my_tool-0.3.0.dist-info/METADATA")
                .expect("metadata member"),
            &mut metadata,
        )
        .expect("read metadata");
        assert!(metadata.contains("\nSummary: Tool\n"), "{metadata}");
        assert!(metadata.contains("\nAuthor: Ada\n"), "{metadata}");
    }

    #[rstest]
    #[case(&["--python-tag", "py-3"])]
    #[case(&["--description-file", "/no/such/README.md"])]
    fn invalid_input_exits_two_without_creating_dist(
        temp_dir: TempDir,
        #[case] extra: &[&str],
    ) {
        let cli = cli_for(&temp_dir, extra);
        let err = run(&cli, &mut Vec::new()).expect_err("invalid input");
        assert_eq!(err.exit_code(), EXIT_INVALID_INPUT);
        assert!(!temp_dir.path().join("out").exists());
    }

    #[rstest]
    fn missing_binary_exits_two_without_creating_dist(temp_dir: TempDir) {
        let mut cli = cli_for(&temp_dir, &[]);
        cli.binary = Utf8PathBuf::from(utf8(temp_dir.path().join("absent")));
        let err = run(&cli, &mut Vec::new()).expect_err("missing binary");
        assert_eq!(err.exit_code(), EXIT_INVALID_INPUT);
        assert!(!temp_dir.path().join("out").exists());
    }

    #[cfg(unix)]
    #[rstest]
    fn unwritable_dist_dir_exits_one(temp_dir: TempDir) {
        let mut cli = cli_for(&temp_dir, &[]);
        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, b"").expect("write blocker");
        cli.dist_dir = Utf8PathBuf::from(utf8(blocker.join("dist")));
        let err = run(&cli, &mut Vec::new()).expect_err("dist dir under a file");
        assert!(matches!(err, CliError::DistDir { .. }));
        assert_eq!(err.exit_code(), EXIT_BUILD_FAILED);
    }
}
