//! Launcher for the API dev server.
//!
//! Frees port 3001 (or `$PORT`) and runs `npm run server` pinned to it.

use clap::Parser;
use devport_core::config::LaunchRequest;

#[derive(Parser, Debug)]
#[command(name = "start-api", about = "Free the API port and launch the API dev server")]
struct Args {
    /// Target port; the API instance honors the conventional PORT variable.
    #[arg(
        long,
        env = "PORT",
        default_value_t = 3001,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    port: u16,
}

#[tokio::main]
async fn main() {
    devport_cli::init();
    let args = Args::parse();

    let request = LaunchRequest::new("api", args.port, "npm").with_args(["run", "server"]);
    std::process::exit(devport_cli::run(request).await);
}
