use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use conteo_assign::assignment::{
    resolve_summary, AssignmentSession, Direction, Notice, SessionOptions, Severity,
};
use conteo_assign::config::{load_token_file, ClientConfig, ServerConfig};
use conteo_assign::gateway::HttpGateway;
use conteo_assign::model::{
    CompanyId, GroupId, Location, LocationId, WarehouseId, WorkerId, WorkloadSummaryEntry,
};
use conteo_assign::server::{run_server, Inventory};
use conteo_assign::shutdown::install_shutdown_handler;

#[derive(Parser, Debug)]
#[command(name = "conteo-assign")]
#[command(version)]
#[command(about = "Assign counting locations to workers for inventory count campaigns")]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the in-memory reference API server
    Serve(ServeArgs),

    /// List workers, active count groups and warehouses
    Refs {
        #[command(flatten)]
        client: ClientArgs,
    },

    /// Show available and assigned locations for a worker, group and warehouse
    Locations {
        #[command(flatten)]
        client: ClientArgs,

        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Show assigned-location counts per warehouse for a worker and group
    Summary {
        #[command(flatten)]
        client: ClientArgs,

        /// Worker (user) id
        #[arg(long)]
        worker: u64,

        /// Count group id
        #[arg(long)]
        group: u64,
    },

    /// Move locations between panes and save the assigned set
    Assign {
        #[command(flatten)]
        client: ClientArgs,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Location ids to assign (comma-separated)
        #[arg(long, value_delimiter = ',')]
        add: Vec<u64>,

        /// Location ids to release (comma-separated)
        #[arg(long, value_delimiter = ',')]
        remove: Vec<u64>,

        /// Show the resulting panes without saving
        #[arg(long)]
        dry_run: bool,
    },
}

// =============================================================================
// Server Arguments
// =============================================================================

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value = "3411")]
    port: u16,

    /// JSON seed file with users, groups, warehouses, locations and assignments
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Bearer token clients must present (no check when omitted)
    #[arg(long)]
    token: Option<String>,
}

// =============================================================================
// Client Arguments (shared by all API commands)
// =============================================================================

#[derive(Parser, Debug)]
struct ClientArgs {
    /// API base URL (defaults to $CONTEO_API_URL)
    #[arg(long, short = 'a')]
    api_url: Option<String>,

    /// Bearer token (defaults to $CONTEO_TOKEN)
    #[arg(long, conflicts_with = "token_file")]
    token: Option<String>,

    /// File holding the bearer token
    #[arg(long)]
    token_file: Option<PathBuf>,

    /// Company id sent as x-empresa-id (defaults to $CONTEO_EMPRESA_ID)
    #[arg(long)]
    empresa_id: Option<u64>,

    /// Re-fetch locations and summary after saving
    #[arg(long)]
    refresh_after_save: bool,

    /// Output format
    #[arg(long, short = 'o', default_value = "table")]
    output: OutputFormat,
}

#[derive(Parser, Debug)]
struct SelectionArgs {
    /// Worker (user) id
    #[arg(long)]
    worker: u64,

    /// Count group id
    #[arg(long)]
    group: u64,

    /// Warehouse id
    #[arg(long)]
    warehouse: u64,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

// =============================================================================
// JSON Output Types
// =============================================================================

#[derive(Serialize)]
struct WorkerOutput {
    id: WorkerId,
    name: String,
    role: String,
}

#[derive(Serialize)]
struct NamedOutput {
    id: u64,
    name: String,
}

#[derive(Serialize)]
struct RefsOutput {
    workers: Vec<WorkerOutput>,
    groups: Vec<NamedOutput>,
    warehouses: Vec<NamedOutput>,
}

#[derive(Serialize)]
struct PanesOutput {
    worker_id: WorkerId,
    group_id: GroupId,
    warehouse_id: WarehouseId,
    available: Vec<Location>,
    assigned: Vec<Location>,
    saved: bool,
}

#[derive(Serialize)]
struct SummaryOutput {
    worker_id: WorkerId,
    group_id: GroupId,
    warehouses: Vec<WorkloadSummaryEntry>,
    total_locations: u64,
}

// =============================================================================
// Helper Functions
// =============================================================================

fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn client_config(args: &ClientArgs) -> Result<ClientConfig, Box<dyn std::error::Error>> {
    let mut config = ClientConfig::from_env()?;

    if let Some(url) = &args.api_url {
        config.base_url = url.clone();
    }
    if let Some(path) = &args.token_file {
        config.token = Some(load_token_file(path).await?);
    }
    if let Some(token) = &args.token {
        config.token = Some(token.clone());
    }
    if let Some(id) = args.empresa_id {
        config.company_id = Some(CompanyId(id));
    }
    if args.refresh_after_save {
        config.refresh_after_save = true;
    }

    if config.token.is_none() {
        tracing::warn!("No bearer token configured, requests will be sent unauthenticated");
    }
    Ok(config)
}

fn print_notices(notices: &[Notice]) {
    for notice in notices {
        let tag = match notice.severity {
            Severity::Success => "[+]",
            Severity::Error => "[-]",
        };
        eprintln!("{} {}: {}", tag, notice.summary, notice.detail);
    }
}

fn print_pane(title: &str, locations: &[Location]) {
    println!("{} ({})", title, locations.len());
    println!("{}", "-".repeat(40));
    if locations.is_empty() {
        println!("  (none)");
    }
    for loc in locations {
        println!("  {:<10} {}", loc.id, loc.name);
    }
    println!();
}

// =============================================================================
// Server Implementation
// =============================================================================

async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let listen_addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    let inventory = match &args.seed {
        Some(path) => Inventory::load(path).await?,
        None => {
            tracing::warn!("No seed file given, starting with an empty inventory");
            Inventory::new()
        }
    };

    let mut config = ServerConfig::new(listen_addr);
    if let Some(token) = args.token {
        config = config.with_token(token);
    }

    let shutdown = install_shutdown_handler();
    run_server(&config, inventory, shutdown).await?;
    Ok(())
}

// =============================================================================
// Client Command Handlers
// =============================================================================

async fn handle_refs(args: &ClientArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = client_config(args).await?;
    let gateway = HttpGateway::new(&config)?;
    let session = AssignmentSession::start(&gateway, SessionOptions::from_config(&config)).await;
    let data = session.reference();

    match args.output {
        OutputFormat::Json => {
            let output = RefsOutput {
                workers: data
                    .workers
                    .iter()
                    .map(|w| WorkerOutput {
                        id: w.id,
                        name: w.display_name.clone(),
                        role: w.role.clone(),
                    })
                    .collect(),
                groups: data
                    .groups
                    .iter()
                    .map(|g| NamedOutput {
                        id: g.id.0,
                        name: g.description.clone(),
                    })
                    .collect(),
                warehouses: data
                    .warehouses
                    .iter()
                    .map(|w| NamedOutput {
                        id: w.id.0,
                        name: w.name.clone(),
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            println!("Workers");
            println!("{:<8} {:<24} ROLE", "ID", "NAME");
            println!("{}", "-".repeat(45));
            for w in &data.workers {
                println!("{:<8} {:<24} {}", w.id, w.display_name, w.role);
            }
            println!();
            println!("Active count groups");
            println!("{:<8} DESCRIPTION", "ID");
            println!("{}", "-".repeat(45));
            for g in &data.groups {
                println!("{:<8} {}", g.id, g.description);
            }
            println!();
            println!("Warehouses");
            println!("{:<8} NAME", "ID");
            println!("{}", "-".repeat(45));
            for w in &data.warehouses {
                println!("{:<8} {}", w.id, w.name);
            }
        }
    }
    Ok(())
}

async fn handle_summary(
    args: &ClientArgs,
    worker: WorkerId,
    group: GroupId,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = client_config(args).await?;
    let gateway = HttpGateway::new(&config)?;
    let entries = resolve_summary(&gateway, Some(worker), Some(group)).await?;
    let total = conteo_assign::assignment::summary::total_locations(&entries);

    match args.output {
        OutputFormat::Json => {
            let output = SummaryOutput {
                worker_id: worker,
                group_id: group,
                warehouses: entries,
                total_locations: total,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            if entries.is_empty() {
                println!("No locations assigned to worker {} in group {}.", worker, group);
            } else {
                println!("{:<30} LOCATIONS", "WAREHOUSE");
                println!("{}", "-".repeat(42));
                for entry in &entries {
                    println!("{:<30} {}", entry.warehouse_name, entry.total_locations);
                }
                println!("{}", "-".repeat(42));
                println!("{:<30} {}", "TOTAL", total);
            }
        }
    }
    Ok(())
}

async fn handle_assign(
    args: &ClientArgs,
    selection: &SelectionArgs,
    add: Vec<u64>,
    remove: Vec<u64>,
    save: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = client_config(args).await?;
    let gateway = HttpGateway::new(&config)?;
    let mut session =
        AssignmentSession::start(&gateway, SessionOptions::from_config(&config)).await;

    session.select_group(Some(GroupId(selection.group)));
    session.select_worker(Some(WorkerId(selection.worker)));
    session.select_warehouse(Some(WarehouseId(selection.warehouse)));
    session.refresh_locations(&gateway).await;

    if session.partition().is_none() {
        print_notices(&session.take_notices());
        return Err("locations could not be resolved for this selection".into());
    }

    let moved = !add.is_empty() || !remove.is_empty();
    if !add.is_empty() {
        let ids: Vec<LocationId> = add.into_iter().map(LocationId).collect();
        session.transfer(&ids, Direction::ToAssigned)?;
    }
    if !remove.is_empty() {
        let ids: Vec<LocationId> = remove.into_iter().map(LocationId).collect();
        session.transfer(&ids, Direction::ToAvailable)?;
    }

    let saved = if save {
        let result = session.save(&gateway).await;
        print_notices(&session.take_notices());
        result?;
        true
    } else {
        false
    };

    match args.output {
        OutputFormat::Json => {
            let output = PanesOutput {
                worker_id: WorkerId(selection.worker),
                group_id: GroupId(selection.group),
                warehouse_id: WarehouseId(selection.warehouse),
                available: session.available().to_vec(),
                assigned: session.assigned().to_vec(),
                saved,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            let data = session.reference();
            println!(
                "Worker: {}   Group: {}   Warehouse: {}",
                data.worker_label(WorkerId(selection.worker)),
                data.group(GroupId(selection.group))
                    .map(|g| g.description.clone())
                    .unwrap_or_else(|| format!("#{}", selection.group)),
                data.warehouse_label(WarehouseId(selection.warehouse)),
            );
            println!();
            print_pane("Available", session.available());
            print_pane("Assigned", session.assigned());
            if moved && !save {
                println!("(dry run, nothing saved)");
            }
        }
    }
    Ok(())
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match args.command {
        Commands::Serve(serve_args) => {
            init_logging("info");
            run_serve(serve_args).await?;
        }
        Commands::Refs { client } => {
            init_logging("warn");
            handle_refs(&client).await?;
        }
        Commands::Locations { client, selection } => {
            init_logging("warn");
            handle_assign(&client, &selection, Vec::new(), Vec::new(), false).await?;
        }
        Commands::Summary {
            client,
            worker,
            group,
        } => {
            init_logging("warn");
            handle_summary(&client, WorkerId(worker), GroupId(group)).await?;
        }
        Commands::Assign {
            client,
            selection,
            add,
            remove,
            dry_run,
        } => {
            init_logging("warn");
            handle_assign(&client, &selection, add, remove, !dry_run).await?;
        }
    }

    Ok(())
}
