use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{presets::ASCII_FULL, Table};
use secreport_core::{ReportConfig, ReportGenerator, RunSummary};
use serde_json::json;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "secreport",
    author,
    version,
    about = "Consolidate security scan artifacts into a markdown report"
)]
struct SecreportCli {
    /// Repository root that relative pointer/output paths resolve against
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,
    /// Pointer file naming the latest run directory
    #[arg(long, global = true)]
    pointer: Option<PathBuf>,
    /// Where the markdown report is written
    #[arg(long, global = true)]
    output: Option<PathBuf>,
    /// Target URL shown in the report (defaults to $TARGET_URL)
    #[arg(long, global = true)]
    target: Option<String>,
    /// Report title
    #[arg(long, global = true)]
    title: Option<String>,
    /// Output JSON instead of a human-readable summary
    #[arg(long, global = true)]
    json: bool,
    /// Log pipeline progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the report from the latest run and write it (default)
    Generate,
    /// Print the parsed header checklist and ZAP alerts without writing a report
    Summary {
        /// Output format
        #[arg(long, default_value_t = SummaryFormat::Table)]
        format: SummaryFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SummaryFormat {
    Table,
    Json,
    Yaml,
}

impl std::fmt::Display for SummaryFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            SummaryFormat::Table => "table",
            SummaryFormat::Json => "json",
            SummaryFormat::Yaml => "yaml",
        };
        write!(f, "{value}")
    }
}

fn main() -> anyhow::Result<()> {
    let cli = SecreportCli::parse();
    init_tracing(cli.verbose);

    let config = build_config(&cli);
    debug!(
        pointer = %config.resolved_pointer_path().display(),
        output = %config.resolved_output_path().display(),
        "resolved configuration"
    );
    let generator = ReportGenerator::new(config);

    match cli.command.unwrap_or(Command::Generate) {
        Command::Generate => {
            let report = generator
                .generate()
                .context("report generation failed")?;
            if cli.json {
                let payload = json!({
                    "output": report.output_path,
                    "summary": report.summary,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("✅ Wrote {}", report.output_path.display());
            }
        }
        Command::Summary { format } => {
            let collected = generator.collect().context("could not read the latest run")?;
            let format = if cli.json { SummaryFormat::Json } else { format };
            output_summary(&collected.summary(), format)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &SecreportCli) -> ReportConfig {
    let mut config = ReportConfig::from_env().with_root(&cli.root);
    if let Some(pointer) = &cli.pointer {
        config.pointer_path = pointer.clone();
    }
    if let Some(output) = &cli.output {
        config.output_path = output.clone();
    }
    if let Some(target) = &cli.target {
        config.target_url = target.clone();
    }
    if let Some(title) = &cli.title {
        config.title = title.clone();
    }
    config
}

fn output_summary(summary: &RunSummary, format: SummaryFormat) -> anyhow::Result<()> {
    match format {
        SummaryFormat::Json => {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
        SummaryFormat::Yaml => {
            let yaml = serde_yaml::to_string(summary)?;
            print!("{yaml}");
        }
        SummaryFormat::Table => {
            println!("Target: {}", summary.target);
            println!("Run:    {}\n", summary.run);
            println!("{}", render_header_table(summary));
            if summary.alerts.is_empty() {
                println!("\nNo ZAP alerts parsed.");
            } else {
                println!("\n{}", render_alert_table(summary));
            }
        }
    }
    Ok(())
}

fn render_header_table(summary: &RunSummary) -> String {
    let mut display = Table::new();
    display.load_preset(ASCII_FULL);
    display.set_header(vec!["Header", "Status"]);
    for check in &summary.headers {
        display.add_row(vec![check.header.clone(), check.status.to_string()]);
    }
    display.to_string()
}

fn render_alert_table(summary: &RunSummary) -> String {
    let mut display = Table::new();
    display.load_preset(ASCII_FULL);
    display.set_header(vec!["Risk", "Alert", "Instances"]);
    for alert in &summary.alerts {
        display.add_row(vec![
            alert.risk.clone(),
            alert.name.clone(),
            alert.instance_count.to_string(),
        ]);
    }
    display.to_string()
}
