use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    soulspell_cli::cli::run().await
}
