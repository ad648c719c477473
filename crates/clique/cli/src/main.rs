//! Clique CLI binary

#[tokio::main]
async fn main() {
    if let Err(e) = clique_cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
