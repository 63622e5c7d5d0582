#[cfg(feature = "postgres")]
use diesel::r2d2::{ConnectionManager, Pool};
#[cfg(feature = "postgres")]
use diesel::PgConnection;

#[cfg(feature = "postgres")]
use crate::core::shared::StoreError;
#[cfg(feature = "postgres")]
use log::error;

#[cfg(feature = "postgres")]
pub type DbPool = Pool<ConnectionManager<PgConnection>>;

#[cfg(feature = "postgres")]
pub fn create_pool(database_url: &str) -> Result<DbPool, diesel::r2d2::PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .max_size(8)
        .connection_timeout(std::time::Duration::from_secs(5))
        .build(manager)
}

/// Runs a blocking diesel closure on the blocking thread pool with a pooled
/// connection.
#[cfg(feature = "postgres")]
pub async fn with_connection<T, F>(pool: &DbPool, f: F) -> Result<T, StoreError>
where
    F: FnOnce(&mut PgConnection) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| {
            error!("Failed to get database connection: {e}");
            StoreError::Connection(e.to_string())
        })?;
        f(&mut conn)
    })
    .await
    .map_err(|e| StoreError::Connection(format!("Database task failed: {e}")))?
}

/// Run database migrations
#[cfg(feature = "postgres")]
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS).map_err(
        |e| -> Box<dyn std::error::Error + Send + Sync> {
            Box::new(std::io::Error::other(format!("Migration error: {e}")))
        },
    )?;
    Ok(())
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Trims the value and maps blank input to `None`.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  x ")), Some("x".to_string()));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
