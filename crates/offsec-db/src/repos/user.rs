//! User repository. Stores the SHA-256 hash of each user's API token; the
//! token itself is never persisted.

use offsec_core::entities::User;
use offsec_core::enums::UserRole;
use offsec_core::ids::PREFIX_USER;
use offsec_core::validation::require_text;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{collect_rows, fmt_ts, get_opt_string, now, parse_datetime, parse_enum};
use crate::inputs::NewUser;
use crate::service::OffsecService;

const SELECT: &str = "SELECT id, name, full_name, email, role, created_at FROM users";

fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        full_name: get_opt_string(row, 2)?,
        email: get_opt_string(row, 3)?,
        role: parse_enum(&row.get::<String>(4)?)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

async fn get(conn: &libsql::Connection, id: &str) -> Result<User, DatabaseError> {
    let mut rows = conn.query(&format!("{SELECT} WHERE id = ?1"), [id]).await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("user", id))?;
    row_to_user(&row)
}

async fn find_one(
    conn: &libsql::Connection,
    clause: &str,
    value: &str,
) -> Result<Option<User>, DatabaseError> {
    let mut rows = conn
        .query(&format!("{SELECT} WHERE {clause} = ?1"), [value])
        .await?;
    rows.next().await?.map(|row| row_to_user(&row)).transpose()
}

async fn insert(
    conn: &libsql::Connection,
    new: &NewUser,
    token_hash: &str,
) -> Result<User, DatabaseError> {
    require_text("name", &new.name)?;
    let id = generate_id(conn, PREFIX_USER).await?;
    conn.execute(
        "INSERT INTO users (id, name, full_name, email, role, token_hash, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        libsql::params![
            id.as_str(),
            new.name.trim(),
            new.full_name.as_deref(),
            new.email.as_deref(),
            new.role.as_str(),
            token_hash,
            fmt_ts(now())
        ],
    )
    .await?;
    tracing::info!(user_id = %id, name = %new.name, role = %new.role, "user created");
    get(conn, &id).await
}

async fn count(conn: &libsql::Connection) -> Result<i64, DatabaseError> {
    let mut rows = conn.query("SELECT COUNT(*) FROM users", ()).await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<i64>(0)?)
}

impl OffsecService {
    /// Create a user holding the given token hash.
    ///
    /// # Errors
    ///
    /// `Conflict` when the name, email or token hash is already taken.
    pub async fn create_user(&self, new: NewUser, token_hash: &str) -> Result<User, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = insert(&uow, &new, token_hash).await;
        uow.finish(result).await
    }

    /// Create the first user as an admin. Fails with `Conflict` once any
    /// user exists.
    pub async fn bootstrap_admin(
        &self,
        new: NewUser,
        token_hash: &str,
    ) -> Result<User, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            if count(&uow).await? > 0 {
                return Err(DatabaseError::Conflict(
                    "users already exist; bootstrap is only allowed on an empty database".into(),
                ));
            }
            let new = NewUser {
                role: UserRole::Admin,
                ..new
            };
            insert(&uow, &new, token_hash).await
        }
        .await;
        uow.finish(result).await
    }

    pub async fn get_user(&self, id: &str) -> Result<User, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = get(&uow, id).await;
        uow.finish(result).await
    }

    /// All users in creation order.
    pub async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            let rows = uow.query(&format!("{SELECT} ORDER BY rowid"), ()).await?;
            collect_rows(rows, row_to_user).await
        }
        .await;
        uow.finish(result).await
    }

    pub async fn find_user_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<User>, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = find_one(&uow, "token_hash", token_hash).await;
        uow.finish(result).await
    }

    pub async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = find_one(&uow, "name", name).await;
        uow.finish(result).await
    }

    /// The earliest created user, if any.
    pub async fn first_user(&self) -> Result<Option<User>, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            let mut rows = uow
                .query(&format!("{SELECT} ORDER BY rowid LIMIT 1"), ())
                .await?;
            rows.next().await?.map(|row| row_to_user(&row)).transpose()
        }
        .await;
        uow.finish(result).await
    }

    /// Replace a user's token hash, invalidating the previous token.
    pub async fn set_user_token_hash(
        &self,
        id: &str,
        token_hash: &str,
    ) -> Result<User, DatabaseError> {
        let uow = self.db().begin().await?;
        let result = async {
            let changed = uow
                .execute(
                    "UPDATE users SET token_hash = ?1 WHERE id = ?2",
                    libsql::params![token_hash, id],
                )
                .await?;
            if changed == 0 {
                return Err(DatabaseError::not_found("user", id));
            }
            tracing::info!(user_id = %id, "user token rotated");
            get(&uow, id).await
        }
        .await;
        uow.finish(result).await
    }
}
