#[tokio::main]
async fn main() {
    if let Err(e) = dynq_cli::run(std::env::args().collect()).await {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
