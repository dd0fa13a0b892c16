// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use neosec_bus::LoggingHook;
use neosec_config::NeoSecConfig;
use neosec_core::{Target, ToolCategory, WorkflowSpec};
use neosec_demo_adapters::{HostSweepAdapter, PortProbeAdapter, StaticFindingAdapter};
use neosec_orchestrator::{CancelToken, Orchestrator};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Exit code for partial failure or a severity threshold being exceeded.
const EXIT_PARTIAL_FAILURE: i32 = 1;
/// Exit code for configuration/validation errors (clap itself also exits 2
/// for usage errors).
const EXIT_CONFIG_ERROR: i32 = 2;
/// Exit code when a run is cancelled by a user signal.
const EXIT_CANCELLED: i32 = 130;

#[derive(Parser, Debug)]
#[command(name = "neosec", version, about = "NeoSec security automation orchestrator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose (debug-level) logging.
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Path to a NeoSec config TOML file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a workflow against a target.
    Scan {
        /// Target address (IP, CIDR, hostname, or URL).
        #[arg(short = 't', long)]
        target: String,

        /// Path to the workflow YAML file.
        #[arg(short = 'w', long)]
        workflow: PathBuf,

        /// Directory to write raw outputs and the report under, overriding
        /// the configured data directory.
        #[arg(short = 'o', long)]
        out_dir: Option<PathBuf>,
    },

    /// List registered tools, optionally filtered by category.
    ListTools {
        /// Category to filter by (recon, scanner, fuzzer, exploit, other).
        #[arg(long)]
        category: Option<String>,
    },

    /// Verify every registered adapter's binaries are present.
    Validate,

    /// Write a default configuration file and an example workflow.
    InitConfig {
        /// Directory to write `neosec.toml` and `example-workflow.yaml` into.
        #[arg(short = 'o', long, default_value = ".")]
        out: PathBuf,
    },
}

fn build_orchestrator(config: NeoSecConfig) -> Orchestrator {
    let mut orch = Orchestrator::new(config);
    orch.register(Arc::new(HostSweepAdapter::default()));
    orch.register(Arc::new(PortProbeAdapter::default()));
    orch.register(Arc::new(StaticFindingAdapter));
    orch.register_hook(Box::new(LoggingHook));
    orch
}

fn parse_category(s: &str) -> Result<ToolCategory> {
    match s.to_ascii_lowercase().as_str() {
        "recon" => Ok(ToolCategory::Recon),
        "scanner" => Ok(ToolCategory::Scanner),
        "fuzzer" => Ok(ToolCategory::Fuzzer),
        "exploit" => Ok(ToolCategory::Exploit),
        "other" => Ok(ToolCategory::Other),
        other => anyhow::bail!("unknown category `{other}`"),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("neosec=debug")
    } else {
        EnvFilter::new("neosec=info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match neosec_config::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    };
    if let Err(e) = neosec_config::validate_config(&config) {
        eprintln!("error: {e}");
        std::process::exit(EXIT_CONFIG_ERROR);
    }

    let exit_code = match cli.command {
        Commands::Scan { target, workflow, out_dir } => cmd_scan(config, target, workflow, out_dir).await,
        Commands::ListTools { category } => cmd_list_tools(config, category),
        Commands::Validate => cmd_validate(config),
        Commands::InitConfig { out } => cmd_init_config(out),
    };

    match exit_code {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    }
}

async fn cmd_scan(
    mut config: NeoSecConfig,
    target: String,
    workflow_path: PathBuf,
    out_dir: Option<PathBuf>,
) -> Result<i32> {
    if let Some(dir) = out_dir {
        config.data_dir = dir.to_string_lossy().into_owned();
    }

    let yaml = std::fs::read_to_string(&workflow_path)
        .with_context(|| format!("read workflow file '{}'", workflow_path.display()))?;
    let workflow = WorkflowSpec::from_yaml_str(&yaml).context("parse workflow YAML")?;
    workflow.validate().context("validate workflow")?;

    let target = Target::parse(target).context("parse target")?;
    let orch = build_orchestrator(config);

    let run_id = uuid::Uuid::new_v4().to_string();
    let cancel = CancelToken::new();

    let scan_future = orch.scan(&workflow, &target, &run_id, &cancel);
    tokio::pin!(scan_future);

    let result = tokio::select! {
        result = &mut scan_future => result.context("run workflow")?,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("interrupted, waiting for running tasks to be killed");
            cancel.cancel();
            // Await the same future rather than dropping it: dropping here
            // would abort the executor's own kill-group cleanup mid-flight
            // and leak the subprocess group it just signalled.
            scan_future.await.context("run workflow")?;
            return Ok(EXIT_CANCELLED);
        }
    };

    println!("run_id:  {run_id}");
    println!("status:  {:?}", result.status);
    println!("hosts:   {}", result.assets.hosts.len());
    println!("webapps: {}", result.assets.webapps.len());
    println!("vulns:   {}", result.vulnerabilities.len());
    if let Some(max) = result.max_severity() {
        println!("max severity: {max}");
    }

    Ok(orch.exit_code(&result))
}

fn cmd_list_tools(config: NeoSecConfig, category: Option<String>) -> Result<i32> {
    let orch = build_orchestrator(config);
    let category = category.as_deref().map(parse_category).transpose()?;
    for tool in orch.list_tools(category) {
        println!(
            "{:<16} {:<10} requires: {}",
            tool.name,
            format!("{:?}", tool.category).to_lowercase(),
            tool.required_binaries.join(", ")
        );
    }
    Ok(0)
}

fn cmd_validate(config: NeoSecConfig) -> Result<i32> {
    let orch = build_orchestrator(config);
    let checks = orch.validate().context("validate adapter dependencies")?;
    let mut all_available = true;
    for check in &checks {
        let status = if check.resolution.available { "OK" } else { "MISSING" };
        if !check.resolution.available {
            all_available = false;
        }
        println!(
            "{:<16} {status} {}",
            check.binary,
            check.resolution.resolved_path.as_deref().unwrap_or("<not found>")
        );
    }
    Ok(if all_available { 0 } else { EXIT_PARTIAL_FAILURE })
}

fn cmd_init_config(out: PathBuf) -> Result<i32> {
    std::fs::create_dir_all(&out).with_context(|| format!("create directory {}", out.display()))?;

    let config = NeoSecConfig::default();
    let config_path = out.join("neosec.toml");
    std::fs::write(&config_path, toml::to_string_pretty(&config)?)
        .with_context(|| format!("write config to {}", config_path.display()))?;

    let example_workflow = r#"name: example-two-node-chain
description: A reconnaissance task followed by a static finding, demonstrating a dependency chain.
global_timeout: 300
tasks:
  - id: recon
    tool: staticfinding
    depends_on: []
  - id: report
    tool: staticfinding
    depends_on: [recon]
"#;
    let workflow_path = out.join("example-workflow.yaml");
    std::fs::write(&workflow_path, example_workflow)
        .with_context(|| format!("write example workflow to {}", workflow_path.display()))?;

    println!("wrote {}", config_path.display());
    println!("wrote {}", workflow_path.display());
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_category_accepts_known_names() {
        assert_eq!(parse_category("scanner").unwrap(), ToolCategory::Scanner);
        assert_eq!(parse_category("RECON").unwrap(), ToolCategory::Recon);
    }

    #[test]
    fn parse_category_rejects_unknown_names() {
        assert!(parse_category("bogus").is_err());
    }

    #[test]
    fn cli_parses_scan_subcommand() {
        let cli = Cli::parse_from([
            "neosec", "scan", "-t", "10.0.0.1", "-w", "workflow.yaml",
        ]);
        match cli.command {
            Commands::Scan { target, workflow, .. } => {
                assert_eq!(target, "10.0.0.1");
                assert_eq!(workflow, PathBuf::from("workflow.yaml"));
            }
            _ => panic!("expected Scan"),
        }
    }
}
