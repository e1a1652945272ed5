use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for strider")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, tests, doc
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Run physics tests without the rapier backend
    TestNoRapier,
    /// Run the movement integrator bench
    Bench,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
    /// Run every CLI scenario on both backends
    Scenarios,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            run_fmt()?;
            run_clippy()?;
            run_tests()?;
            run_doc()?;
        }
        Commands::Fmt => run_fmt()?,
        Commands::Clippy => run_clippy()?,
        Commands::Test => run_tests()?,
        Commands::TestNoRapier => cargo(
            "cargo test (no rapier)",
            &["test", "-p", "strider-physics", "--no-default-features"],
        )?,
        Commands::Bench => cargo(
            "cargo bench",
            &["bench", "-p", "strider-movement", "--bench", "bench_integrator"],
        )?,
        Commands::Doc => run_doc()?,
        Commands::Build => cargo("cargo build", &["build", "--workspace"])?,
        Commands::Scenarios => run_scenarios()?,
    }

    Ok(())
}

/// Run `cargo <args>` and fail if it exits unsuccessfully.
fn cargo(label: &str, args: &[&str]) -> Result<()> {
    println!("==> Running {label}");
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("{label} failed");
    }
    Ok(())
}

fn run_fmt() -> Result<()> {
    cargo("cargo fmt --check", &["fmt", "--all", "--", "--check"])
}

fn run_clippy() -> Result<()> {
    cargo(
        "cargo clippy",
        &[
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ],
    )
}

fn run_tests() -> Result<()> {
    cargo("cargo test", &["test", "--workspace"])
}

fn run_doc() -> Result<()> {
    cargo("cargo doc", &["doc", "--workspace", "--no-deps"])
}

fn run_scenarios() -> Result<()> {
    for backend in ["simple", "rapier"] {
        for scenario in ["walk", "jump", "ledge", "ai"] {
            cargo(
                &format!("scenario {scenario} on {backend}"),
                &[
                    "run",
                    "-q",
                    "-p",
                    "strider-cli",
                    "--",
                    "simulate",
                    "--scenario",
                    scenario,
                    "--backend",
                    backend,
                    "--ticks",
                    "180",
                    "--every",
                    "30",
                ],
            )?;
        }
    }
    Ok(())
}
