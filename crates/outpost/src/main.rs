//! Binary entry point for the Outpost game server.

#[tokio::main]
async fn main() {
    if let Err(e) = lib_outpost::init().await {
        eprintln!("❌ Fatal error: {e}");
        std::process::exit(1);
    }
}
