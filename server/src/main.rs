use clap::Parser;
use log::error;
use server::network::Server;

/// Main-method of the application.
/// Parses command-line arguments, then runs the game server until the game
/// is over (exit 0) or the listener fails (exit 1).
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Server IP address to bind to
        #[clap(short = 'H', long, default_value = "0.0.0.0")]
        host: String,
        /// Server port to listen on
        #[clap(short, long, default_value = "3000")]
        port: u16,
    }

    env_logger::init();

    // Parse command line arguments
    let args = Args::parse();

    let address = format!("{}:{}", args.host, args.port);
    let mut server = Server::new(&address).await?;

    if let Err(e) = server.run().await {
        error!("Fatal server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
