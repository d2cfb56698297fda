use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use reslink::api::ResolweHttpClient;
use reslink::config::{ConfigLoader, ResolvedConfig, load_rules};
use reslink::domain::{GenomeName, Resource};
use reslink::error::ReslinkError;
use reslink::linker::{LinkEntry, Linker, LinkMode};
use reslink::output::JsonOutput;
use reslink::ssh::SshConnector;
use reslink::store::LinkTree;

#[derive(Parser)]
#[command(name = "reslink")]
#[command(about = "Link result files from a Resolwe-style data store into a structured directory tree")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<String>,

    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Link files selected by a rules file")]
    Link(LinkArgs),
    #[command(about = "Link a project with the fixed rule set and write the data table")]
    Project(ProjectArgs),
}

#[derive(Args)]
struct LinkArgs {
    #[arg(required = true, help = "Resources to link, e.g. sample:123 collection:7")]
    resources: Vec<String>,

    #[arg(long)]
    genome: String,

    #[arg(long, help = "JSON file with {type, field, subfolder} rule objects")]
    rules: String,

    #[arg(long, help = "Destination root (default from config)")]
    path: Option<String>,
}

#[derive(Args)]
struct ProjectArgs {
    #[arg(help = "Resource to link, e.g. collection:7")]
    resource: String,

    #[arg(long)]
    genome: String,

    #[arg(long, help = "Destination root (default from config)")]
    path: Option<String>,

    #[arg(long, help = "Data table path (default data_table.txt)")]
    output_table: Option<String>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<ReslinkError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &ReslinkError) -> u8 {
    match error {
        ReslinkError::MissingConfig
        | ReslinkError::ConfigRead(_)
        | ReslinkError::ConfigParse(_)
        | ReslinkError::RulesRead(_)
        | ReslinkError::RulesParse(_) => 2,
        ReslinkError::ApiHttp(_)
        | ReslinkError::ApiStatus { .. }
        | ReslinkError::SshConnect { .. }
        | ReslinkError::SshAuth { .. }
        | ReslinkError::SshCommand(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::resolve(cli.config.as_deref()).into_diagnostic()?;

    match cli.command {
        Commands::Link(args) => run_link(args, &config, cli.json),
        Commands::Project(args) => run_project(args, &config, cli.json),
    }
}

fn build_linker(
    config: &ResolvedConfig,
) -> miette::Result<Linker<ResolweHttpClient, SshConnector>> {
    let api = ResolweHttpClient::new(&config.api_url).into_diagnostic()?;
    let connector = SshConnector::new(&config.hostname);
    let tree = LinkTree::new(&config.data_root);
    Ok(Linker::new(api, connector, tree))
}

fn run_link(args: LinkArgs, config: &ResolvedConfig, json: bool) -> miette::Result<()> {
    let resources = args
        .resources
        .iter()
        .map(|value| value.parse::<Resource>())
        .collect::<Result<Vec<_>, _>>()
        .into_diagnostic()?;
    let genome: GenomeName = args.genome.parse().into_diagnostic()?;
    let rules = load_rules(&args.rules).into_diagnostic()?;
    let dest = Utf8PathBuf::from(args.path.as_deref().unwrap_or(&config.path));

    let linker = build_linker(config)?;
    let report = linker
        .create_links(&resources, &genome, &rules, &dest)
        .into_diagnostic()?;

    if json {
        JsonOutput::print_link(&report).into_diagnostic()?;
    } else {
        print_link_summary(&report.links);
    }
    Ok(())
}

fn run_project(args: ProjectArgs, config: &ResolvedConfig, json: bool) -> miette::Result<()> {
    let resource: Resource = args.resource.parse().into_diagnostic()?;
    let genome: GenomeName = args.genome.parse().into_diagnostic()?;
    let dest = Utf8PathBuf::from(args.path.as_deref().unwrap_or(&config.path));
    let output_table = args.output_table.map(Utf8PathBuf::from);

    let linker = build_linker(config)?;
    let report = linker
        .link_project(&resource, &genome, &dest, output_table.as_deref())
        .into_diagnostic()?;

    if json {
        JsonOutput::print_project(&report).into_diagnostic()?;
    } else {
        print_link_summary(&report.links);
        println!(
            "table: {} ({} row{})",
            report.table_path,
            report.table_rows,
            if report.table_rows == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

fn print_link_summary(links: &[LinkEntry]) {
    let green = "\x1b[32m";
    let cyan = "\x1b[36m";
    let reset = "\x1b[0m";

    println!("{green}linked {} file(s){reset}", links.len());
    for entry in links {
        let color = match entry.mode {
            LinkMode::Local => green,
            LinkMode::Remote => cyan,
        };
        let mode = match entry.mode {
            LinkMode::Local => "local",
            LinkMode::Remote => "remote",
        };
        println!("{color}  [{mode}] {} -> {}{reset}", entry.dest, entry.source);
    }
}
