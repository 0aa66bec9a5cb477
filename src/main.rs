#[tokio::main]
async fn main() -> yunobot::error::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("yunobot=info,serenity=warn"),
    )
    .init();
    log::info!("Starting yunobot Discord bot");

    match yunobot::run().await {
        Ok(()) => {
            log::info!("Bot shut down successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Bot encountered an error: {e}");
            Err(e)
        }
    }
}
