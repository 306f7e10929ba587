use civic_portal_cli::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("application error: {}", err.alert());
        std::process::exit(1);
    }
}
