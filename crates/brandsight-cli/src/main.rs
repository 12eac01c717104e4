use std::path::PathBuf;

use anyhow::Context;
use brandsight_cli::{
    browse::HELP, build_document, history_lines, open_entry, parse_command, render_report,
    save_document, screen, AnalyzeResult, BrandsightClient, BrowseCommand, ClientError,
    ClientSession, CurrentView, ExpandFilter,
};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "brandsight")]
#[command(about = "Analyse brand reviews and browse stored reports")]
struct Cli {
    /// Server base URL
    #[arg(
        long,
        global = true,
        env = "BRANDSIGHT_SERVER_URL",
        default_value = "http://localhost:5000"
    )]
    server: String,

    /// Bearer token for the server API
    #[arg(long, global = true, env = "BRANDSIGHT_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Owner id reports are stored under
    #[arg(long, global = true, env = "BRANDSIGHT_OWNER_ID")]
    owner: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 120)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyse a brand URL and print the report
    Analyze {
        /// App store listing or map place URL
        url: String,

        /// Number of most recent reviews to analyse
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=100))]
        count: u32,

        /// Sentiment group of reviews to list
        #[arg(long, value_enum, default_value_t = ExpandFilter::None)]
        filter: ExpandFilter,

        /// Also export the report into this directory
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },
    /// List stored reports for the owner, newest first
    History,
    /// Print one stored report
    Show {
        id: Uuid,

        /// Sentiment group of reviews to list
        #[arg(long, value_enum, default_value_t = ExpandFilter::None)]
        filter: ExpandFilter,
    },
    /// Export one stored report as a paginated text document
    Export {
        id: Uuid,

        /// Directory to write `<title>_Report.txt` into
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Register the owner id with the server
    Register {
        /// Display name for the owner
        #[arg(long)]
        name: Option<String>,
    },
    /// Show the registered owner and display name
    Whoami,
    /// Browse history and reports interactively
    Browse,
}

fn require_owner(owner: Option<&str>) -> anyhow::Result<&str> {
    owner
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .context("an owner id is required; pass --owner or set BRANDSIGHT_OWNER_ID")
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = BrandsightClient::new(&cli.server, cli.token.clone(), cli.timeout_secs)?;
    let mut session = ClientSession::new();

    match cli.command {
        Commands::Analyze {
            url,
            count,
            filter,
            export_dir,
        } => {
            let owner = require_owner(cli.owner.as_deref())?;
            match client.analyze(owner, &url, count).await? {
                AnalyzeResult::Completed(report) => {
                    session.show_analysis(report);
                    session.select_filter(filter);
                    if let Some(report) = session.visible_report() {
                        print_lines(&render_report(report, session.filter()));
                    }
                    if let (Some(dir), Some(report)) = (export_dir, session.displayed()) {
                        let path = save_document(&build_document(report), &dir)?;
                        println!("\nexported to {}", path.display());
                    }
                }
                AnalyzeResult::NotImplemented {
                    message,
                    source_type,
                } => {
                    println!("{message} (source type: {source_type})");
                }
            }
        }
        Commands::History => {
            let owner = require_owner(cli.owner.as_deref())?;
            session.load_history(client.history(owner).await?);
            print_lines(&history_lines(session.history()));
        }
        Commands::Show { id, filter } => {
            session.open_report(client.report(id).await?);
            session.select_filter(filter);
            if let Some(report) = session.visible_report() {
                print_lines(&render_report(report, session.filter()));
            }
        }
        Commands::Export { id, dir } => {
            session.open_report(client.report(id).await?);
            let report = session
                .displayed()
                .context("no report is open to export")?;
            let document = build_document(report);
            let path = save_document(&document, &dir)?;
            println!(
                "exported {} page(s) to {}",
                document.pages.len(),
                path.display()
            );
        }
        Commands::Register { name } => {
            let owner = require_owner(cli.owner.as_deref())?;
            if client.register_owner(owner, name.as_deref()).await? {
                println!("registered owner {owner}");
            } else {
                println!("owner {owner} was already registered");
            }
        }
        Commands::Whoami => {
            let owner = require_owner(cli.owner.as_deref())?;
            let record = client.owner(owner).await?;
            match record.first_name() {
                Some(first) => println!("Hello, {first} ({owner})"),
                None => println!("{owner} (no display name registered)"),
            }
            println!("registered {}", record.created_at.format("%Y-%m-%d"));
        }
        Commands::Browse => {
            let owner = require_owner(cli.owner.as_deref())?;
            browse(&client, owner, &mut session).await?;
        }
    }

    Ok(())
}

async fn browse(
    client: &BrandsightClient,
    owner: &str,
    session: &mut ClientSession,
) -> anyhow::Result<()> {
    match client.owner(owner).await {
        Ok(record) => println!("Welcome, {}", record.first_name().unwrap_or(owner)),
        Err(ClientError::Api { code, .. }) if code == "not_found" => {
            println!("{owner} is not registered yet; run `brandsight register` first");
        }
        Err(e) => return Err(e.into()),
    }
    session.load_history(client.history(owner).await?);
    print_lines(&screen(session));
    println!("\ntype 'help' for commands");

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = input.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        match command {
            BrowseCommand::Quit => break,
            BrowseCommand::Help => {
                print_lines(&HELP.iter().map(|l| (*l).to_string()).collect::<Vec<_>>());
                continue;
            }
            BrowseCommand::Dashboard => session.switch_view(CurrentView::Dashboard),
            BrowseCommand::About => session.switch_view(CurrentView::About),
            BrowseCommand::History => match client.history(owner).await {
                Ok(reports) => session.load_history(reports),
                Err(e) => {
                    println!("could not load history: {e}");
                    continue;
                }
            },
            BrowseCommand::Open(n) => {
                if !open_entry(session, n) {
                    println!("no entry {n}; run 'history' to list reports");
                    continue;
                }
            }
            BrowseCommand::Toggle(filter) => session.toggle_filter(filter),
            BrowseCommand::Export(dir) => {
                match session.displayed() {
                    Some(report) => match save_document(&build_document(report), &dir) {
                        Ok(path) => println!("exported to {}", path.display()),
                        Err(e) => println!("{e}"),
                    },
                    None => println!("no report on display to export"),
                }
                continue;
            }
        }
        print_lines(&screen(session));
    }
    Ok(())
}
