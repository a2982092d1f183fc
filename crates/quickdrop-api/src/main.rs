use quickdrop_core::Config;

// Use mimalloc as the global allocator for better performance and lower fragmentation,
// especially when running on musl-based systems inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (storage, sweeper, routes)
    let app = quickdrop_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    let result = quickdrop_api::setup::server::start_server(&config, app.router).await;

    if let Some(sweeper) = app.sweeper {
        sweeper.stop().await;
    }

    result
}
