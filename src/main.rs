#[tokio::main]
async fn main() -> anyhow::Result<()> {
    formpilot_cli::cli::run().await
}
