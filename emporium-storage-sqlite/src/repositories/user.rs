use async_trait::async_trait;
use chrono::{DateTime, Utc};
use emporium_core::{
    Error, User, UserId,
    error::{StorageError, utilities::DatabaseResultExt},
    query::{SearchSpec, SortSpec},
    repositories::UserRepository,
    storage::{NewUser, UserCredentials},
};
use sqlx::SqlitePool;

#[derive(Debug, sqlx::FromRow)]
struct SqliteUser {
    id: String,
    name: String,
    email: String,
    created_at: i64,
    updated_at: i64,
}

impl From<SqliteUser> for User {
    fn from(row: SqliteUser) -> Self {
        User {
            id: UserId::new(&row.id),
            name: row.name,
            email: row.email,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::from_timestamp(row.updated_at, 0).unwrap_or_default(),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SqliteUserCredentials {
    #[sqlx(flatten)]
    user: SqliteUser,
    password_hash: String,
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_all(&self, search: &SearchSpec, sort: &SortSpec) -> Result<Vec<User>, Error> {
        // Column and direction come from closed enums, never from client text
        let sql = format!(
            "SELECT id, name, email, created_at, updated_at FROM users ORDER BY {} {}, id",
            sort.field.as_str(),
            sort.direction.as_sql()
        );

        let rows = sqlx::query_as::<_, SqliteUser>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_db_err_with_context("Failed to list users")?;

        // Patterns are regular expressions, which SQLite cannot evaluate natively
        Ok(rows
            .into_iter()
            .map(User::from)
            .filter(|user| search.matches(user))
            .collect())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        let sqlite_user = sqlx::query_as::<_, SqliteUser>(
            "SELECT id, name, email, created_at, updated_at FROM users WHERE id = ?1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_db_err()?;

        Ok(sqlite_user.map(|u| u.into()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let sqlite_user = sqlx::query_as::<_, SqliteUser>(
            "SELECT id, name, email, created_at, updated_at FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_db_err()?;

        Ok(sqlite_user.map(|u| u.into()))
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, Error> {
        let row = sqlx::query_as::<_, SqliteUserCredentials>(
            r#"
            SELECT id, name, email, created_at, updated_at, password_hash
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_db_err()?;

        Ok(row.map(|row| UserCredentials {
            user: row.user.into(),
            password_hash: row.password_hash,
        }))
    }

    async fn create(&self, user: NewUser) -> Result<User, Error> {
        let now = Utc::now().timestamp();

        let sqlite_user = sqlx::query_as::<_, SqliteUser>(
            r#"
            INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id, name, email, created_at, updated_at
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_db_err_with_context("Failed to create user")?;

        Ok(sqlite_user.into())
    }

    async fn update(&self, user: &User) -> Result<User, Error> {
        let now = Utc::now().timestamp();

        let sqlite_user = sqlx::query_as::<_, SqliteUser>(
            r#"
            UPDATE users
            SET name = ?2, email = ?3, updated_at = ?4
            WHERE id = ?1
            RETURNING id, name, email, created_at, updated_at
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.name)
        .bind(&user.email)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_db_err_with_context("Failed to update user")?
        .ok_or(StorageError::NotFound)?;

        Ok(sqlite_user.into())
    }

    async fn delete(&self, id: &UserId) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_db_err_with_context("Failed to delete user")?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound.into());
        }
        Ok(())
    }

    async fn set_password_hash(&self, id: &UserId, hash: &str) -> Result<(), Error> {
        let now = Utc::now().timestamp();

        let result =
            sqlx::query("UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3")
                .bind(hash)
                .bind(now)
                .bind(id.as_str())
                .execute(&self.pool)
                .await
                .map_db_err_with_context("Failed to set password hash")?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound.into());
        }
        Ok(())
    }
}
