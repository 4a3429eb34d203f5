use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the SAR publish pipeline action workspace",
    long_about = "A unified CLI for CI checks, Lambda packaging and local pipeline\n\
                  artifact fixtures in the SAR publish workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks (fmt, clippy, tests)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Build and package the publish Lambda as a deployable zip
    ServerlessPackage {
        /// Compilation target triple for the Lambda binary
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for the binary
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
        /// Directory receiving the packaged zip
        #[arg(long, default_value = "dist")]
        dist_dir: String,
    },
    /// Wrap a packaged template in a single-entry zip, the way CodePipeline
    /// stores build output artifacts
    ArtifactZip {
        /// Packaged SAM template to wrap
        #[arg(long, default_value = "packaged.yaml")]
        template: String,
        /// Output zip path
        #[arg(long, default_value = "artifact.zip")]
        output: String,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting and clippy
    Lint,
    /// Unit tests for every workspace crate
    Test,
    /// Lint + test
    Check,
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

const LAMBDA_PACKAGE: &str = "sar_publish_lambda";
const LAMBDA_BINARY: &str = "publish_lambda";

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn package_serverless_lambda(target: &str, profile: BuildProfile, dist_dir: &Path) {
    ensure_rust_target_installed(target);

    step("Build publish lambda binary");

    let mut cargo_args = vec![
        "build",
        "-p",
        LAMBDA_PACKAGE,
        "--target",
        target,
        "--bin",
        LAMBDA_BINARY,
    ];
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step("Package lambda zip artifact");
    let target_dir = Path::new("target").join(target).join(profile.dir_name());
    fs::create_dir_all(dist_dir).expect("failed to create lambda dist directory");

    let binary_path = target_dir.join(LAMBDA_BINARY);
    if !binary_path.exists() {
        panic!("expected lambda binary at '{}'", binary_path.display());
    }
    let binary = fs::read(&binary_path).expect("failed to read lambda binary");
    let zip_path = dist_dir.join("publish_lambda.zip");
    write_single_entry_zip(&zip_path, "bootstrap", &binary, Some(0o755));

    eprintln!("\nPackaged artifact:\n- {}", zip_path.display());
}

fn ensure_rust_target_installed(target: &str) {
    let output = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output();

    let output = match output {
        Ok(value) => value,
        Err(error) => {
            eprintln!(
                "warning: failed to run `rustup target list --installed` ({error}); continuing without target preflight"
            );
            return;
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "failed to list installed rust targets; run `rustup target list --installed` manually. details: {}",
            stderr.trim()
        );
    }

    let installed = String::from_utf8_lossy(&output.stdout);
    if !installed.lines().any(|line| line.trim() == target) {
        panic!(
            "required rust target `{target}` is not installed. install it with `rustup target add {target}` and re-run `cargo run -p xtask -- serverless-package`"
        );
    }
}

fn package_artifact_zip(template_path: &Path, zip_path: &Path) {
    let template = fs::read(template_path).unwrap_or_else(|error| {
        panic!(
            "failed to read template '{}': {error}",
            template_path.display()
        )
    });
    let entry_name = template_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("packaged.yaml");
    write_single_entry_zip(zip_path, entry_name, &template, None);

    eprintln!(
        "Wrote pipeline artifact '{}' with entry '{entry_name}'",
        zip_path.display()
    );
}

fn write_single_entry_zip(zip_path: &Path, entry_name: &str, body: &[u8], mode: Option<u32>) {
    let file = fs::File::create(zip_path).expect("failed to create zip");
    let mut zip = ZipWriter::new(file);
    let mut options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    if let Some(mode) = mode {
        options = options.unix_permissions(mode);
    }
    zip.start_file(entry_name, options)
        .expect("failed to start zip entry");
    zip.write_all(body).expect("failed to write zip entry");
    zip.finish().expect("failed to finish zip");
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_lint() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);
}

fn ci_test() {
    step("Test sar_publish_core");
    run_cargo(&["test", "-p", "sar_publish_core"]);

    step("Test sar_publish_lambda");
    run_cargo(&["test", "-p", LAMBDA_PACKAGE]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { job } => {
            match job {
                CiJob::Lint => ci_lint(),
                CiJob::Test => ci_test(),
                CiJob::Check => {
                    ci_lint();
                    ci_test();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::ServerlessPackage {
            target,
            profile,
            dist_dir,
        } => {
            package_serverless_lambda(&target, profile, Path::new(&dist_dir));
        }
        Commands::ArtifactZip { template, output } => {
            package_artifact_zip(Path::new(&template), Path::new(&output));
        }
    }
}
