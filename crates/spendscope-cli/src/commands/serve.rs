//! Server command implementation

use anyhow::Result;
use spendscope_core::AnalysisConfig;
use spendscope_server::{ServerConfig, ALLOWED_ORIGINS_ENV};

pub async fn cmd_serve(config: AnalysisConfig, host: &str, port: u16) -> Result<()> {
    let server_config = ServerConfig::from_env();

    println!("🚀 Starting Spendscope web server...");
    println!("   Listening: http://{}:{}", host, port);
    println!(
        "   Rolling window: {} days │ Outlier threshold: z ≥ {:.1}",
        config.rolling_window, config.outlier_threshold
    );
    if server_config.allowed_origins.is_empty() {
        println!("   🔒 CORS: same-origin only");
    } else {
        println!(
            "   🌐 CORS origins: {} ({})",
            server_config.allowed_origins.join(", "),
            ALLOWED_ORIGINS_ENV
        );
    }
    println!();
    println!("   Press Ctrl+C to stop");

    spendscope_server::serve_with_config(config, host, port, server_config).await?;

    Ok(())
}
