use tabula::prelude::*;

/// Address used when `TABULA_BIND` is unset.
const DEFAULT_BIND: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> Result<(), TabulaError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tabula=info".into()),
        )
        .init();

    let bind = std::env::var("TABULA_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let report_errors = std::env::var("TABULA_REPORT_ERRORS")
        .map(|v| !matches!(v.trim(), "0" | "false"))
        .unwrap_or(true);

    let server = TabulaServer::builder()
        .bind(&bind)
        .report_errors(report_errors)
        .build()
        .await?;

    match server.local_addr() {
        Ok(addr) => tracing::info!(%addr, report_errors, "listening"),
        Err(e) => tracing::warn!(error = %e, "could not read local address"),
    }
    server.run().await
}
