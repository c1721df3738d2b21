// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::{bail, Context};
use serde_json::json;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{
    common::notify::Notifier,
    db::{DataClient, MemoryDataClient, PgDataClient},
    services::{AuthClient, MemoryAuthClient, PgAuthClient, SessionStore},
    views::{ActivityList, CustomerList, DataList, DealList},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBackend {
    Postgres,
    Memory,
}

impl FromStr for DataBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" => Ok(DataBackend::Postgres),
            "memory" => Ok(DataBackend::Memory),
            other => bail!("DATA_BACKEND inválido: '{other}' (use 'postgres' ou 'memory')"),
        }
    }
}

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: DataBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: Option<String>,
    pub session_ttl: chrono::Duration,
    pub bind_addr: String,
    pub demo_email: String,
    pub demo_password: String,
}

fn var_or<T: FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{key} inválido ('{raw}'): {e}")),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend = match env::var("DATA_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => DataBackend::Postgres,
        };

        let config = Self {
            backend,
            database_url: env::var("DATABASE_URL").ok(),
            db_max_connections: var_or("DB_MAX_CONNECTIONS", 5)?,
            jwt_secret: env::var("JWT_SECRET").ok(),
            session_ttl: chrono::Duration::hours(var_or("SESSION_TTL_HOURS", 168)?),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            demo_email: env::var("DEMO_EMAIL").unwrap_or_else(|_| "demo@example.com".to_string()),
            demo_password: env::var("DEMO_PASSWORD").unwrap_or_else(|_| "demo1234".to_string()),
        };

        if config.backend == DataBackend::Postgres {
            config.database_url.as_ref().context("DATABASE_URL deve ser definida")?;
            config.jwt_secret.as_ref().context("JWT_SECRET deve ser definido")?;
        }

        Ok(config)
    }

    /// Backend em memória, sem nada do ambiente (testes).
    pub fn memory() -> Self {
        Self {
            backend: DataBackend::Memory,
            database_url: None,
            db_max_connections: 1,
            jwt_secret: None,
            session_ttl: chrono::Duration::hours(1),
            bind_addr: "127.0.0.1:0".to_string(),
            demo_email: "demo@example.com".to_string(),
            demo_password: "demo1234".to_string(),
        }
    }
}

/// O estado das listagens vive entre requisições (busca, modal, valores do form).
pub struct Views {
    pub customers: Mutex<DataList<CustomerList>>,
    pub deals: Mutex<DataList<DealList>>,
    pub activities: Mutex<DataList<ActivityList>>,
}

impl Views {
    fn new(data: &Arc<dyn DataClient>, notifier: &Notifier, shutdown: &CancellationToken) -> Self {
        Self {
            customers: Mutex::new(DataList::new(data.clone(), notifier.clone(), shutdown.child_token())),
            deals: Mutex::new(DataList::new(data.clone(), notifier.clone(), shutdown.child_token())),
            activities: Mutex::new(DataList::new(data.clone(), notifier.clone(), shutdown.child_token())),
        }
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db_pool: Option<PgPool>,
    pub data: Arc<dyn DataClient>,
    pub session: Arc<SessionStore>,
    pub notifier: Notifier,
    pub views: Arc<Views>,
    pub shutdown: CancellationToken,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        match config.backend {
            DataBackend::Postgres => {
                let database_url = config.database_url.clone().context("DATABASE_URL deve ser definida")?;
                let jwt_secret = config.jwt_secret.clone().context("JWT_SECRET deve ser definido")?;

                // Conecta ao banco de dados, usando '?' para propagar erros
                let db_pool = PgPoolOptions::new()
                    .max_connections(config.db_max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(&database_url)
                    .await
                    .context("Falha ao conectar ao banco de dados")?;

                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                let data: Arc<dyn DataClient> = Arc::new(PgDataClient::new(db_pool.clone()));
                let auth: Arc<dyn AuthClient> =
                    Arc::new(PgAuthClient::new(db_pool.clone(), jwt_secret, config.session_ttl));

                Ok(Self::from_parts(config, Some(db_pool), data, auth))
            }
            DataBackend::Memory => {
                let (data, auth) = seed_demo(&config)?;
                tracing::info!("🧪 Backend em memória; conta de demonstração: {}", config.demo_email);
                Ok(Self::from_parts(config, None, data, auth))
            }
        }
    }

    /// Monta o gráfico de dependências em cima de colaboradores prontos.
    pub fn from_parts(
        config: AppConfig,
        db_pool: Option<PgPool>,
        data: Arc<dyn DataClient>,
        auth: Arc<dyn AuthClient>,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let notifier = Notifier::new();
        let session = SessionStore::new(auth, Arc::clone(&data), shutdown.child_token());
        let views = Arc::new(Views::new(&data, &notifier, &shutdown));

        Self {
            config: Arc::new(config),
            db_pool,
            data,
            session,
            notifier,
            views,
            shutdown,
        }
    }
}

// A conta de demonstração do backend em memória, com o perfil correspondente
fn seed_demo(config: &AppConfig) -> anyhow::Result<(Arc<dyn DataClient>, Arc<dyn AuthClient>)> {
    let auth = MemoryAuthClient::new(config.session_ttl);
    let user_id = auth
        .with_account(&config.demo_email, &config.demo_password)
        .map_err(|e| anyhow::anyhow!("Falha ao criar conta de demonstração: {e}"))?;

    let data = MemoryDataClient::new();
    data.seed("users", [json!({
        "id": user_id,
        "role": "admin",
        "full_name": "Demo User",
        "avatar_url": null
    })]);

    Ok((Arc::new(data), Arc::new(auth)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_parse_case_insensitively() {
        assert_eq!("Memory".parse::<DataBackend>().unwrap(), DataBackend::Memory);
        assert_eq!("postgres".parse::<DataBackend>().unwrap(), DataBackend::Postgres);
        assert!("sqlite".parse::<DataBackend>().is_err());
    }

    #[tokio::test]
    async fn memory_backend_starts_with_demo_account() {
        let state = AppState::new(AppConfig::memory()).await.unwrap();
        assert!(state.db_pool.is_none());
        assert_eq!(
            state.data.select(&crate::db::Query::from("users")).await.unwrap().len(),
            1
        );
    }
}
