// src/main.rs

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crm_frontend::{create_router, AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger (RUST_LOG, padrão "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::from_env()?;
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    if let Some(pool) = &app_state.db_pool {
        sqlx::migrate!()
            .run(pool)
            .await
            .context("Falha ao rodar as migrações do banco de dados.")?;
        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
    }

    app_state.session.start().await;

    let shutdown = app_state.shutdown.clone();
    let app = create_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {bind_addr}"))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("🛑 Encerrando...");
            // Desmonta as views: o que estiver em voo não escreve mais estado
            shutdown.cancel();
        })
        .await
        .context("Erro no servidor Axum")?;

    Ok(())
}
