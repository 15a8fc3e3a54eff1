//! Integration tests driving the `wtf` binary in an isolated environment.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use mockito::Server;
use tempfile::TempDir;
use wtf_schema::{Platform, Sha256Digest};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// A scratch home with a config file, a store and a project directory.
struct Sandbox {
    root: TempDir,
}

impl Sandbox {
    fn new(extra_config: &str) -> Self {
        let root = TempDir::new().unwrap();
        let sandbox = Self { root };
        fs::create_dir_all(sandbox.store()).unwrap();
        fs::create_dir_all(sandbox.project()).unwrap();
        fs::write(
            sandbox.config_file(),
            format!(
                "binary_store_path = \"{}\"\n{extra_config}",
                sandbox.store().display()
            ),
        )
        .unwrap();
        sandbox
    }

    fn home(&self) -> &Path {
        self.root.path()
    }

    fn store(&self) -> PathBuf {
        self.home().join("store")
    }

    fn project(&self) -> PathBuf {
        self.home().join("project")
    }

    fn config_file(&self) -> PathBuf {
        self.home().join("config.toml")
    }

    fn command(&self, program: &Path) -> Command {
        let mut cmd = Command::new(program);
        cmd.current_dir(self.project())
            .env("HOME", self.home())
            .env("WTF_CONFIG", self.config_file())
            .env("NO_COLOR", "1")
            .env_remove("XDG_CONFIG_HOME")
            .env_remove("XDG_DATA_HOME")
            .env_remove("WTF_RELEASE_URL")
            .env_remove("WTF_LOG");
        cmd
    }

    fn wtf(&self, args: &[&str]) -> Output {
        self.command(Path::new(env!("CARGO_BIN_EXE_wtf")))
            .args(args)
            .output()
            .unwrap()
    }

    fn wtf_with_releases(&self, server: &Server, args: &[&str]) -> Output {
        self.command(Path::new(env!("CARGO_BIN_EXE_wtf")))
            .env("WTF_RELEASE_URL", server.url())
            .args(args)
            .output()
            .unwrap()
    }

    #[cfg(unix)]
    fn install_script(&self, version: &str, body: &str) {
        use std::os::unix::fs::PermissionsExt;
        let path = self.store().join(version);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn index_for(versions: &[&str]) -> String {
    let platform = Platform::current();
    let entries: Vec<String> = versions
        .iter()
        .map(|v| {
            format!(
                r#""{v}":{{"builds":[{{"os":"{}","arch":"{}"}}]}}"#,
                platform.os(),
                platform.arch()
            )
        })
        .collect();
    format!(r#"{{"versions":{{{}}}}}"#, entries.join(","))
}

fn zip_with(name: &str, data: &[u8]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    writer.start_file(name, options).unwrap();
    writer.write_all(data).unwrap();
    writer.finish().unwrap().into_inner()
}

#[test]
fn version_prints_build_info() {
    let sandbox = Sandbox::new("");
    let output = sandbox.wtf(&["version"]);

    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).starts_with("wtf "));
    assert!(stdout(&output).contains("Commit:"));
}

#[test]
fn config_prints_effective_settings() {
    let sandbox = Sandbox::new("auto_install = false\n");
    let output = sandbox.wtf(&["config"]);

    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains(&format!("binary_store_path = \"{}\"", sandbox.store().display())));
    assert!(text.contains("auto_install = false"));
    assert!(text.contains("version_constraint_file_name = \".terraform-version\""));
}

#[test]
fn invalid_config_fails() {
    let sandbox = Sandbox::new("auto_install = [");
    let output = sandbox.wtf(&["config"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("invalid config file"));
}

#[test]
fn list_installed_reads_store_only() {
    let sandbox = Sandbox::new("");
    for name in ["1.6.2", "0.12.31", ".DS_Store"] {
        fs::write(sandbox.store().join(name), b"").unwrap();
    }

    let output = sandbox.wtf(&["list-versions", "--installed"]);

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "0.12.31\n1.6.2\n");
}

#[test]
fn list_available_marks_installed() {
    let sandbox = Sandbox::new("");
    fs::write(sandbox.store().join("1.5.7"), b"").unwrap();

    let mut server = Server::new();
    let _index = server
        .mock("GET", "/index.json")
        .with_status(200)
        .with_body(index_for(&["1.6.2", "1.5.7", "1.4.0"]))
        .create();

    let output = sandbox.wtf_with_releases(&server, &["list-versions"]);

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "1.4.0\n1.5.7 [installed]\n1.6.2\n");
}

#[test]
fn install_reports_failures_and_keeps_going() {
    let sandbox = Sandbox::new("");
    let platform = Platform::current();
    let archive_name = format!("terraform_1.6.2_{platform}.zip");
    let archive = zip_with(&platform.executable_name("terraform"), b"binary");
    let digest = Sha256Digest::compute(&archive);

    let mut server = Server::new();
    let _sums = server
        .mock("GET", "/1.6.2/terraform_1.6.2_SHA256SUMS")
        .with_status(200)
        .with_body(format!("{digest}  {archive_name}\n"))
        .create();
    let _archive = server
        .mock("GET", format!("/1.6.2/{archive_name}").as_str())
        .with_status(200)
        .with_body(&archive)
        .create();

    let output = sandbox.wtf_with_releases(&server, &["install", "nope", "1.6.2"]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("1 error(s) occurred"), "{err}");
    assert!(err.contains("nope"), "{err}");
    assert_eq!(fs::read(sandbox.store().join("1.6.2")).unwrap(), b"binary");
}

#[test]
fn exec_without_match_and_without_auto_install_fails() {
    let sandbox = Sandbox::new("auto_install = false\n");
    fs::write(sandbox.store().join("1.0.0"), b"").unwrap();
    fs::write(sandbox.project().join(".terraform-version"), "~> 2.0\n").unwrap();

    let output = sandbox.wtf(&["exec", "plan"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("no installed version matches constraint '~> 2.0'"));
}

#[cfg(unix)]
#[test]
fn exec_runs_selected_version_with_exit_code() {
    let sandbox = Sandbox::new("");
    let record = sandbox.home().join("args.txt");
    sandbox.install_script("1.4.0", "exit 99");
    sandbox.install_script(
        "1.5.7",
        &format!("echo \"$@\" > '{}'\nexit 3", record.display()),
    );
    sandbox.install_script("2.0.0", "exit 98");
    fs::write(
        sandbox.project().join("versions.tf"),
        "terraform {\n  required_version = \">= 1.5.0, < 2.0.0\"\n}\n",
    )
    .unwrap();

    let output = sandbox.wtf(&["exec", "plan", "-out=tfplan"]);

    assert_eq!(output.status.code(), Some(3), "{}", stderr(&output));
    assert_eq!(fs::read_to_string(&record).unwrap(), "plan -out=tfplan\n");
    let err = stderr(&output);
    assert!(err.contains("Version constraint") && err.contains(">= 1.5.0, < 2.0.0"), "{err}");
    assert!(err.contains("Version used") && err.contains("1.5.7"), "{err}");
}

#[cfg(unix)]
#[test]
fn exec_auto_installs_missing_version() {
    let sandbox = Sandbox::new("");
    let platform = Platform::current();
    let archive_name = format!("terraform_1.5.7_{platform}.zip");
    let archive = zip_with("terraform", b"#!/bin/sh\nexit 5\n");
    let digest = Sha256Digest::compute(&archive);
    fs::write(sandbox.project().join(".terraform-version"), "~> 1.5.0\n").unwrap();

    let mut server = Server::new();
    let _index = server
        .mock("GET", "/index.json")
        .with_status(200)
        .with_body(index_for(&["1.5.7", "1.6.2"]))
        .create();
    let _sums = server
        .mock("GET", "/1.5.7/terraform_1.5.7_SHA256SUMS")
        .with_status(200)
        .with_body(format!("{digest}  {archive_name}\n"))
        .create();
    let download = server
        .mock("GET", format!("/1.5.7/{archive_name}").as_str())
        .with_status(200)
        .with_body(&archive)
        .create();

    let output = sandbox.wtf_with_releases(&server, &["exec", "version"]);

    assert_eq!(output.status.code(), Some(5), "{}", stderr(&output));
    assert!(sandbox.store().join("1.5.7").exists());
    download.assert();
}

#[cfg(unix)]
#[test]
fn wrapper_template_is_applied() {
    let sandbox = Sandbox::new(
        "[wrapper]\nscript_template = \"#!/bin/sh\\necho wrapped {{.Command}}\\n\"\n",
    );
    sandbox.install_script("1.6.2", "exit 0");

    let output = sandbox.wtf(&["exec", "fmt"]);

    assert!(output.status.success(), "{}", stderr(&output));
    let expected = format!("wrapped {} fmt\n", sandbox.store().join("1.6.2").display());
    assert_eq!(stdout(&output), expected);
}

#[cfg(unix)]
#[test]
fn runs_as_terraform_through_symlink() {
    let sandbox = Sandbox::new("");
    let record = sandbox.home().join("argv.txt");
    sandbox.install_script(
        "1.6.2",
        &format!("echo \"$@\" > '{}'\nexit 4", record.display()),
    );

    let link = sandbox.home().join("terraform");
    std::os::unix::fs::symlink(env!("CARGO_BIN_EXE_wtf"), &link).unwrap();

    let output = sandbox.command(&link).args(["init", "-upgrade"]).output().unwrap();

    assert_eq!(output.status.code(), Some(4), "{}", stderr(&output));
    assert_eq!(fs::read_to_string(&record).unwrap(), "init -upgrade\n");
    // Not verbose when running as terraform.
    assert!(!stderr(&output).contains("Version used"));
}
