//! Shared `PostgreSQL` plumbing for Diesel-backed adapters.
//!
//! Diesel connections are synchronous, so every adapter funnels its work
//! through [`run_blocking`] to keep the async executor's worker threads free.

use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use tokio::task::JoinError;

/// `PostgreSQL` connection pool shared by the user and task adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Checks out a connection and runs `f` on a dedicated blocking thread.
///
/// Pool checkout failures and join failures are mapped into the caller's
/// error type so each adapter keeps its own error taxonomy.
pub(crate) async fn run_blocking<F, T, E>(
    pool: &PgPool,
    f: F,
    map_pool_err: fn(PoolError) -> E,
    map_join_err: fn(JoinError) -> E,
) -> Result<T, E>
where
    F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = pool.get().map_err(map_pool_err)?;
        f(&mut connection)
    })
    .await
    .map_err(map_join_err)?
}
