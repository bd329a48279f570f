use floe_server::FloeServer;

#[derive(clap::Parser)]
struct Args {
    #[arg(long, default_value = "config/floe.yaml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = <Args as clap::Parser>::parse();

    FloeServer::new().with_config(&args.config).run().await
}
