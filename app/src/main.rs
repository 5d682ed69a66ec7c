#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sor_server::init_tracing()?;
    sor_server::run().await
}
