use snackaroo_server::{Config, Server, init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let config = Config::from_env();
    Server::new(config).run().await
}
