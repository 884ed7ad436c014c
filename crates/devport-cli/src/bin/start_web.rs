//! Launcher for the web (Vite) dev server.
//!
//! Frees port 5173 and runs `npm run dev` pinned to it.

use clap::Parser;
use devport_core::config::LaunchRequest;

#[derive(Parser, Debug)]
#[command(name = "start-web", about = "Free the web port and launch the Vite dev server")]
struct Args {
    /// Target port for the Vite dev server.
    #[arg(long, default_value_t = 5173, value_parser = clap::value_parser!(u16).range(1..))]
    port: u16,
}

#[tokio::main]
async fn main() {
    devport_cli::init();
    let args = Args::parse();

    let request = LaunchRequest::new("web", args.port, "npm").with_args(["run", "dev"]);
    std::process::exit(devport_cli::run(request).await);
}
