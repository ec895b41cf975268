#[tokio::main]
async fn main() -> anyhow::Result<()> {
    curio::bootstrapper::run().await
}
