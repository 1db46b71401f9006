mod render;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use z_toolchain_core::{CheckConfig, Checker, load_config_from_str, targets};
use z_toolchain_diagnostics::{self as diag, Diagnostic};
use z_toolchain_registry::{Registry, RegistryLoader, WILDCARD};

use crate::render::{Format, print_summary, render_diagnostics_json, render_diagnostics_pretty};

/// Config file picked up from the current directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "z.config.json";

/// Environment variable holding the log filter.
const LOG_ENV: &str = "Z_LOG";

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "z",
    version,
    about = "Z markup toolchain: check documents against the element registry"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Registry file (JSON or JSONC). When omitted, looks for
    /// `registry.json`, `shared/registry.json`, and `../shared/registry.json`
    /// relative to the current directory, then uses the built-in registry.
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    /// Checker config file. Defaults to `z.config.json` in the current
    /// directory when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug details to stderr (overrides `Z_LOG`).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Check a Z document: structure against the registry, plus marker scan.
    #[command(visible_aliases = ["lint", "validate"])]
    Check {
        /// Document path, or `-` for stdin.
        file: String,
    },

    /// List the targets a Z document declares.
    Targets {
        /// Document path, or `-` for stdin.
        file: String,
    },

    /// Show the registry in use and report dangling references.
    Registry,

    /// Explain a diagnostic ID (e.g. Z1102).
    Explain { id: String },
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let format = Format::resolve_or_detect(cli.output.as_deref());
    let loader = registry_loader(cli.registry.as_deref());

    match cli.cmd {
        Cmd::Check { file } => {
            let config = load_config(cli.config.as_deref())?;
            cmd_check(&file, &loader, cli.registry.is_some(), config, format)?;
        }
        Cmd::Targets { file } => cmd_targets(&file, &loader, format)?,
        Cmd::Registry => cmd_registry(&loader, format)?,
        Cmd::Explain { id } => cmd_explain(&id, format)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_check(
    file: &str,
    loader: &RegistryLoader,
    explicit_registry: bool,
    config: CheckConfig,
    format: Format,
) -> Result<()> {
    let input = read_input(file)?;
    if explicit_registry {
        // A registry the user named must load; only discovery degrades.
        loader.load().context("failed to load --registry")?;
    }
    let result = Checker::from_loader(loader, config).check(&input);

    match format {
        Format::Json => render_diagnostics_json(file, result.ok, &result.diagnostics)?,
        Format::Pretty => {
            render_diagnostics_pretty(&input, file, &result.diagnostics);
            print_summary(&result.diagnostics);
            if result.ok {
                eprintln!("check ok");
            }
        }
    }

    exit_on_errors(&result.diagnostics);
    Ok(())
}

/// One row of `z targets` output.
#[derive(Debug, Serialize)]
struct TargetRow<'a> {
    keyword: &'a str,
    name: &'a str,
    /// One-based line number.
    line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    compiler: Option<&'a str>,
}

fn cmd_targets(file: &str, loader: &RegistryLoader, format: Format) -> Result<()> {
    let input = read_input(file)?;
    let registry = loader.load().context("a registry is required to list targets")?;
    let decls = targets(&input, &registry);

    let rows: Vec<TargetRow<'_>> = decls
        .iter()
        .map(|d| {
            let entry = registry.target(&d.keyword);
            TargetRow {
                keyword: &d.keyword,
                name: &d.name,
                line: d.line + 1,
                description: entry.and_then(|t| t.description.as_deref()),
                compiler: entry.and_then(|t| t.compiler.as_deref()),
            }
        })
        .collect();

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        Format::Pretty => {
            if rows.is_empty() {
                eprintln!("no targets declared in {file}");
            }
            for row in &rows {
                let mut line = format!("{}: {} {}", row.line, row.keyword, row.name);
                if let Some(description) = row.description {
                    line.push_str(&format!("  {description}"));
                }
                if let Some(compiler) = row.compiler {
                    line.push_str(&format!(" [{compiler}]"));
                }
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn cmd_registry(loader: &RegistryLoader, format: Format) -> Result<()> {
    let registry = loader.load().context("no registry available")?;
    let source = loader
        .loaded_from()
        .map_or_else(|| "unknown".to_string(), ToString::to_string);
    let dangling = registry.dangling_references();

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "source": source,
                "validRoots": registry.valid_roots(),
                "registry": &*registry,
                "danglingReferences": dangling,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            println!("registry: {source}");
            print_registry(&registry);
            if dangling.is_empty() {
                println!("dangling references: none");
            } else {
                println!("dangling references ({}):", dangling.len());
                for d in &dangling {
                    println!("  {} -> {}", d.owner, d.child);
                }
            }
        }
    }
    Ok(())
}

fn print_registry(registry: &Registry) {
    let list = |children: Option<&[String]>| match children {
        None => WILDCARD.to_string(),
        Some([]) => "(none)".to_string(),
        Some(c) => c.join(", "),
    };

    match registry.root_keyword() {
        Some(keyword) => println!("root marker: {keyword}"),
        None => println!("root marker: (none)"),
    }
    println!("targets ({}):", registry.targets.len());
    for (name, t) in &registry.targets {
        println!(
            "  {name} [{}] -> {}",
            t.mode,
            list(Some(t.allowed_children.as_slice()))
        );
    }
    println!("namespaces ({}):", registry.namespaces.len());
    for (name, ns) in &registry.namespaces {
        println!("  {name} -> {}", list(ns.allowed_children.as_deref()));
    }
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "id": id,
                "explanation": diag::explain(id),
                "severity": diag::default_severity(id),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            // Explanation is the expected output: stdout, not stderr.
            if let Some(text) = diag::explain(id) {
                use ariadne::Fmt;
                println!("{}: {}", id.fg(ariadne::Color::Cyan), text);
            } else {
                println!("{id}: (no explanation available)");
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Exit with code 1 if any diagnostic is an error.
/// Warnings do not cause a non-zero exit.
fn exit_on_errors(diagnostics: &[Diagnostic]) {
    if diagnostics.iter().any(Diagnostic::is_error) {
        process::exit(1);
    }
}

/// Read a document from `file`, or from stdin when `file` is `-`.
fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(file).with_context(|| format!("failed to read {file}"))
}

/// Explicit `--registry` path, or the default candidates relative to the
/// current directory.
fn registry_loader(explicit: Option<&Path>) -> RegistryLoader {
    match explicit {
        Some(path) => RegistryLoader::from_path(path),
        None => RegistryLoader::for_workspace("."),
    }
}

/// Resolve the checker config from (in priority order):
///   1. Explicit `--config` path
///   2. `z.config.json` in the current directory
///   3. Defaults
fn load_config(explicit: Option<&Path>) -> Result<CheckConfig> {
    let path = match explicit {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Path::new(DEFAULT_CONFIG_FILE),
        None => return Ok(CheckConfig::default()),
    };
    tracing::debug!(path = %path.display(), "loading config");
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    load_config_from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}
