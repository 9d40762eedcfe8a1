//! Repository for the `shopify_sessions` table.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use shop_bridge_core::ShopDomain;
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::session::{ShopSession, parse_scopes};

/// Internal row type for `PostgreSQL` queries.
#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: String,
    shop: String,
    state: String,
    is_online: bool,
    scope: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    access_token: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for ShopSession {
    type Error = RepositoryError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let shop = ShopDomain::parse(&row.shop).map_err(|e| {
            RepositoryError::DataCorruption(format!("session {} has shop {:?}: {e}", row.id, row.shop))
        })?;

        Ok(Self {
            id: row.id,
            shop,
            state: row.state,
            is_online: row.is_online,
            scopes: parse_scopes(row.scope.as_deref()),
            expires_at: row.expires_at,
            access_token: SecretString::from(row.access_token),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Values for inserting or replacing a session.
#[derive(Clone)]
pub struct NewSession {
    /// Session id.
    pub id: String,
    /// Shop the session belongs to.
    pub shop: ShopDomain,
    /// OAuth state.
    pub state: String,
    /// Whether this is an online session.
    pub is_online: bool,
    /// Granted scopes.
    pub scopes: Vec<String>,
    /// Expiry of an online session.
    pub expires_at: Option<DateTime<Utc>>,
    /// Admin API access token.
    pub access_token: SecretString,
}

impl NewSession {
    /// An offline session for `shop`, keyed the way Shopify's session storage keys it.
    #[must_use]
    pub fn offline(shop: ShopDomain, access_token: SecretString, scopes: Vec<String>) -> Self {
        Self {
            id: shop.offline_session_id(),
            shop,
            state: String::new(),
            is_online: false,
            scopes,
            expires_at: None,
            access_token,
        }
    }
}

/// Repository for session database operations.
pub struct ShopSessionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShopSessionRepository<'a> {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the most recently written offline session of a shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_offline_by_shop(
        &self,
        shop: &ShopDomain,
    ) -> Result<Option<ShopSession>, RepositoryError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r"
            SELECT id, shop, state, is_online, scope, expires_at, access_token,
                   created_at, updated_at
            FROM shopify_sessions
            WHERE shop = $1 AND is_online = FALSE
            ORDER BY updated_at DESC
            LIMIT 1
            ",
        )
        .bind(shop.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(ShopSession::try_from).transpose()
    }

    /// Insert a session, or replace the one with the same id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(&self, session: &NewSession) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO shopify_sessions
                (id, shop, state, is_online, scope, expires_at, access_token)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                shop = EXCLUDED.shop,
                state = EXCLUDED.state,
                is_online = EXCLUDED.is_online,
                scope = EXCLUDED.scope,
                expires_at = EXCLUDED.expires_at,
                access_token = EXCLUDED.access_token,
                updated_at = NOW()
            ",
        )
        .bind(&session.id)
        .bind(session.shop.as_str())
        .bind(&session.state)
        .bind(session.is_online)
        .bind(session.scopes.join(","))
        .bind(session.expires_at)
        .bind(session.access_token.expose_secret())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Replace the granted scopes on every session of a shop.
    ///
    /// Returns the number of sessions updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_scopes(
        &self,
        shop: &ShopDomain,
        scopes: &[String],
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shopify_sessions
            SET scope = $2, updated_at = NOW()
            WHERE shop = $1
            ",
        )
        .bind(shop.as_str())
        .bind(scopes.join(","))
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete every session of a shop.
    ///
    /// Returns the number of sessions deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_by_shop(&self, shop: &ShopDomain) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM shopify_sessions WHERE shop = $1")
            .bind(shop.as_str())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
