use crate::config::AppConfig;
use crate::errors::ServiceError;
use metrics::{counter, gauge, histogram};
use sea_orm::{
    ConnectOptions, Database, DatabaseConnection, DatabaseTransaction, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Configuration for database connection
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Minimum number of connections
    pub min_connections: u32,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Idle timeout duration
    pub idle_timeout: Duration,
    /// Acquire connection timeout
    pub acquire_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(8),
        }
    }
}

impl TryFrom<&AppConfig> for DbConfig {
    type Error = ServiceError;

    fn try_from(cfg: &AppConfig) -> Result<Self, Self::Error> {
        let url = cfg
            .database_url()
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;

        Ok(Self {
            url,
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections.min(cfg.db_max_connections),
            connect_timeout: Duration::from_secs(cfg.db_connect_timeout_secs),
            idle_timeout: Duration::from_secs(cfg.db_idle_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.db_acquire_timeout_secs),
        })
    }
}

/// Establishes a connection pool with default tuning
pub async fn establish_connection(database_url: &str) -> Result<DbPool, ServiceError> {
    let config = DbConfig {
        url: database_url.to_string(),
        ..Default::default()
    };

    establish_connection_with_config(&config).await
}

/// Establishes a connection pool to the database with custom configuration
///
/// # Errors
/// Returns a `ServiceError::DatabaseError` if the connection cannot be established
pub async fn establish_connection_with_config(config: &DbConfig) -> Result<DbPool, ServiceError> {
    debug!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Configuring database connection"
    );

    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .sqlx_logging(false);

    gauge!("clinic_db.max_connections", config.max_connections as f64);

    let db_pool = Database::connect(opt).await.map_err(|e| {
        error!("Database connection establishment failed: {}", e);
        ServiceError::db_error(e)
    })?;

    info!("Database connection pool established successfully");
    Ok(db_pool)
}

/// Establish DB pool using AppConfig tuning
pub async fn establish_connection_from_app_config(cfg: &AppConfig) -> Result<DbPool, ServiceError> {
    let db_cfg = DbConfig::try_from(cfg)?;
    establish_connection_with_config(&db_cfg).await
}

/// Runs the embedded migrations
pub async fn run_migrations(pool: &DbPool) -> Result<(), ServiceError> {
    info!("Running database migrations");
    let start = Instant::now();

    let result = crate::migrator::Migrator::up(pool, None)
        .await
        .map_err(ServiceError::db_error);

    let elapsed = start.elapsed();
    match &result {
        Ok(_) => info!("Database migrations completed successfully in {:?}", elapsed),
        Err(e) => error!("Database migrations failed after {:?}: {}", elapsed, e),
    }

    result
}

/// Checks if the database connection is active
pub async fn check_connection(pool: &DbPool) -> Result<(), ServiceError> {
    let start = Instant::now();
    let result = pool.ping().await.map_err(ServiceError::db_error);

    let elapsed = start.elapsed();
    match &result {
        Ok(_) => {
            debug!("Database connection check successful in {:?}", elapsed);
            gauge!("clinic_db.connection_latency", elapsed.as_millis() as f64);
        }
        Err(e) => {
            error!("Database connection check failed after {:?}: {}", elapsed, e);
            counter!("clinic_db.connection_failures", 1);
        }
    }

    result
}

/// A database transaction tagged with the logical operation it belongs to.
///
/// Callers run their statements against [`Transaction::conn`] and hand the
/// outcome to [`Transaction::finish`], which commits on `Ok` and rolls back on
/// `Err`. Dropping it without finishing rolls back as well.
pub struct Transaction {
    inner: DatabaseTransaction,
    operation: &'static str,
    id: Uuid,
    started: Instant,
}

impl Transaction {
    pub async fn begin(db: &DbPool, operation: &'static str) -> Result<Self, ServiceError> {
        let inner = db.begin().await.map_err(ServiceError::db_error)?;
        let id = Uuid::new_v4();
        debug!(transaction_id = %id, operation, "Starting database transaction");
        counter!("clinic_db.transaction.started", 1, "operation" => operation);

        Ok(Self {
            inner,
            operation,
            id,
            started: Instant::now(),
        })
    }

    pub fn conn(&self) -> &DatabaseTransaction {
        &self.inner
    }

    pub async fn finish<T>(self, result: Result<T, ServiceError>) -> Result<T, ServiceError> {
        let Transaction {
            inner,
            operation,
            id,
            started,
        } = self;

        match result {
            Ok(value) => {
                inner.commit().await.map_err(ServiceError::db_error)?;
                let elapsed = started.elapsed();
                histogram!("clinic_db.transaction.duration", elapsed, "operation" => operation);
                counter!("clinic_db.transaction.committed", 1, "operation" => operation);
                debug!(transaction_id = %id, operation, "Transaction committed in {:?}", elapsed);
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = inner.rollback().await {
                    error!(transaction_id = %id, operation, error = %rollback_err, "Rollback failed");
                }
                counter!("clinic_db.transaction.rolled_back", 1, "operation" => operation);
                warn!(
                    transaction_id = %id,
                    operation,
                    error = %err,
                    "Transaction rolled back after {:?}",
                    started.elapsed()
                );
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::warehouse_unit;
    use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};

    async fn memory_pool() -> DbPool {
        let config = DbConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
            ..Default::default()
        };
        let pool = establish_connection_with_config(&config).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn unit(id: i32) -> warehouse_unit::ActiveModel {
        warehouse_unit::ActiveModel {
            id: Set(id),
            name: Set(format!("unit {}", id)),
            amount: Set(1),
            status: Set(crate::models::StockStatus::InStock),
            updated_at: Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn finish_commits_on_ok() {
        let pool = memory_pool().await;
        check_connection(&pool).await.unwrap();

        let tx = Transaction::begin(&pool, "test_commit").await.unwrap();
        let result = unit(1).insert(tx.conn()).await.map(|_| ()).map_err(ServiceError::db_error);
        tx.finish(result).await.unwrap();

        assert_eq!(warehouse_unit::Entity::find().count(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn finish_rolls_back_on_err() {
        let pool = memory_pool().await;

        let tx = Transaction::begin(&pool, "test_rollback").await.unwrap();
        unit(1).insert(tx.conn()).await.unwrap();
        let outcome = tx
            .finish::<()>(Err(ServiceError::BadRequest("abort".into())))
            .await;

        assert!(outcome.is_err());
        assert_eq!(warehouse_unit::Entity::find().count(&pool).await.unwrap(), 0);
    }
}
