/* 📖 # Why does the CLI only take three flags?

Everything else lives in `hellodesk.toml`. The flags cover what changes between runs on
one machine: which config file, and where to listen. A flag always wins over the file.

Workflow:
1. Optionally write `hellodesk.toml` in the working directory
2. Run `hellodesk` (or `hellodesk --port 9000`)
3. The server runs until the process is killed

Exit codes:
- 0: never reached while serving
- 1: tracing setup, config loading or binding failed
*/

use std::env;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::info;

use hellodesk_base::pal::http::HttpServerConfig;
use hellodesk_base::tracing::init_tracing;
use hellodesk_base::{DeskResult, PalHandle, RealPal, ResultExt};
use hellodesk_engine::{ApiService, Config, InMemoryRegistry, RegistryHandle, load_config};

#[derive(Debug, Parser)]
#[command(name = "hellodesk", version, about = "User registry and demo HTTP endpoints")]
struct Cli {
    /// Path to the config file, relative to the working directory
    #[arg(long, default_value = "hellodesk.toml")]
    config: PathBuf,

    /// Address to bind, overrides `server.host`
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on, overrides `server.port`
    #[arg(long)]
    port: Option<u16>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:?}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> DeskResult<()> {
    let current_dir = env::current_dir()
        .map_err(|e| hellodesk_base::err!("Failed to get current directory: {}", e))?;
    let pal = PalHandle::new(RealPal::new(current_dir));

    let mut config = load_config(&pal, &cli.config)?;
    cli.apply_overrides(&mut config);

    let registry = RegistryHandle::new(InMemoryRegistry::new());
    let service = ApiService::new(registry).with_default_age(config.users.default_age);

    let server_config = HttpServerConfig::new(config.server.host.clone())
        .with_port(config.server.port)
        .with_server_name(config.title.clone());
    let server = pal
        .start_http_server(Box::new(service), server_config)
        .context("Failed to start HTTP server")?;

    info!(title = %config.title, address = %server.address(&config.server.host), "serving");

    // The handle stops the server when dropped, so it has to outlive the loop.
    loop {
        std::thread::park();
    }
}
