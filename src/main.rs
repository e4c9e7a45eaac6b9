use std::fs;
use std::sync::Arc;
use token_service::api;
use token_service::logger::*;
use token_service::server::*;
use token_service::settings::*;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let mut project_settings = parse_settings(cli.settings.as_deref())?;
    if let Some(address) = cli.address {
        project_settings.http.address = address;
    }
    info!(?project_settings);
    logger.reload_from_config(&LogConfig::from(&project_settings.log))?;

    let address: std::net::SocketAddr = project_settings.http.address.parse()?;

    let server = Arc::new(Server::try_new(&project_settings).await?);
    let routes = api::routes(server.clone());

    match &project_settings.http.tls {
        Some(tls) => {
            if !fs::metadata(&tls.cert_path)?.is_file() {
                return Err(anyhow::anyhow!(
                    "TLS cert is not a regular file: {:?}",
                    tls.cert_path
                ));
            }
            if !fs::metadata(&tls.key_path)?.is_file() {
                return Err(anyhow::anyhow!(
                    "TLS key is not a regular file: {:?}",
                    tls.key_path
                ));
            }

            let (bound, serving) = warp::serve(routes)
                .tls()
                .cert_path(&tls.cert_path)
                .key_path(&tls.key_path)
                .bind_with_graceful_shutdown(address, shutdown_signal());
            info!(%bound, "listening with TLS");
            serving.await;
        }
        None => {
            let (bound, serving) =
                warp::serve(routes).try_bind_with_graceful_shutdown(address, shutdown_signal())?;
            info!(%bound, "listening");
            serving.await;
        }
    }

    let shutdown_timeout = std::time::Duration::from_secs(5);
    match tokio::time::timeout(shutdown_timeout, server.shutdown()).await {
        Ok(_) => tracing::info!("server shutdown successfully"),
        Err(_) => tracing::error!("server shutdown timed out"),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Could not register SIGINT");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Could not register SIGTERM")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
