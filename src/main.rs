#[tokio::main]
async fn main() -> anyhow::Result<()> {
    courier::run().await
}
