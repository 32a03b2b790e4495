//! `PostgreSQL` repository implementation for users.

use super::{
    models::{NewUserRow, UserRow},
    schema::users,
};
use crate::postgres::{PgPool, run_blocking};
use crate::user::{
    domain::{PersistedUserData, Role, User, UserId, Username},
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult, UserSummary},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed user repository.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run<F, T>(&self, f: F) -> UserRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> UserRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        run_blocking(
            &self.pool,
            f,
            UserRepositoryError::persistence,
            UserRepositoryError::persistence,
        )
        .await
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn store(&self, user: &User) -> UserRepositoryResult<()> {
        let user_id = user.id();
        let username = user.username().clone();
        let new_row = NewUserRow {
            id: user_id.into_inner(),
            username: username.as_str().to_owned(),
            role: user.role().as_str().to_owned(),
            is_active: user.is_active(),
            created_at: user.created_at(),
        };

        self.run(move |connection| {
            diesel::insert_into(users::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if info
                            .constraint_name()
                            .is_some_and(|name| name == "users_username_key") =>
                    {
                        UserRepositoryError::DuplicateUsername(username.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        UserRepositoryError::DuplicateUser(user_id)
                    }
                    _ => UserRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        self.run(move |connection| {
            let row = users::table
                .filter(users::id.eq(id.into_inner()))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(UserRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn find_by_username(&self, username: &Username) -> UserRepositoryResult<Option<User>> {
        let lookup = username.as_str().to_owned();
        self.run(move |connection| {
            let row = users::table
                .filter(users::username.eq(lookup))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(UserRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn list(&self) -> UserRepositoryResult<Vec<User>> {
        self.run(move |connection| {
            let rows = users::table
                .order_by(users::username.asc())
                .select(UserRow::as_select())
                .load::<UserRow>(connection)
                .map_err(UserRepositoryError::persistence)?;
            rows.into_iter().map(row_to_user).collect()
        })
        .await
    }

    async fn summary(&self) -> UserRepositoryResult<UserSummary> {
        self.run(move |connection| {
            let total: i64 = users::table
                .count()
                .get_result(connection)
                .map_err(UserRepositoryError::persistence)?;
            let admins: i64 = users::table
                .filter(users::role.eq(Role::Admin.as_str()))
                .count()
                .get_result(connection)
                .map_err(UserRepositoryError::persistence)?;
            let active: i64 = users::table
                .filter(users::is_active.eq(true))
                .count()
                .get_result(connection)
                .map_err(UserRepositoryError::persistence)?;

            Ok(UserSummary {
                total: to_count(total)?,
                admins: to_count(admins)?,
                active: to_count(active)?,
            })
        })
        .await
    }
}

fn to_count(value: i64) -> UserRepositoryResult<u64> {
    u64::try_from(value).map_err(UserRepositoryError::persistence)
}

fn row_to_user(row: UserRow) -> UserRepositoryResult<User> {
    let UserRow {
        id,
        username: persisted_username,
        role: persisted_role,
        is_active,
        created_at,
    } = row;

    let username =
        Username::new(persisted_username).map_err(UserRepositoryError::persistence)?;
    let role =
        Role::try_from(persisted_role.as_str()).map_err(UserRepositoryError::persistence)?;

    Ok(User::from_persisted(PersistedUserData {
        id: UserId::from_uuid(id),
        username,
        role,
        is_active,
        created_at,
    }))
}
