use clap::Parser;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = compound::api::Cli::parse();
    if let Err(e) = compound::api::run(cli).await {
        eprintln!("{e}");
        std::process::exit(2);
    }
}
