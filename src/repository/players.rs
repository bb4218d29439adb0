//! Player lookups: existence, canonical names, search and listing.
//!
//! Names match case-insensitively everywhere; the stored casing is whatever
//! was seen first at ingestion.

use diesel::sql_types::{BigInt, Nullable, Text};
use diesel::QueryableByName;
use diesel_async::RunQueryDsl;

use super::pool::{DbPool, StoreError};
use super::util::escape_like;
use crate::models::PlayerMatches;
use crate::with_conn;

#[derive(QueryableByName)]
struct NameRow {
    #[diesel(sql_type = Text)]
    player_name: String,
}

#[derive(QueryableByName)]
struct SearchRow {
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = BigInt)]
    matches: i64,
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    total: i64,
}

/// A page of player names plus the unpaginated total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerPage {
    pub players: Vec<String>,
    pub total: i64,
}

#[derive(Clone)]
pub struct PlayerRepository {
    pool: DbPool,
}

impl PlayerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Stored spelling of `name`, if the player is known.
    pub async fn resolve(&self, name: &str) -> Result<Option<String>, StoreError> {
        let rows: Vec<NameRow> = with_conn!(self.pool, conn => {
            diesel::sql_query(
                "SELECT player_name FROM players WHERE LOWER(player_name) = LOWER($1) LIMIT 1",
            )
            .bind::<Text, _>(name)
            .load(conn)
            .await?
        });
        Ok(rows.into_iter().next().map(|row| row.player_name))
    }

    pub async fn exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.resolve(name).await?.is_some())
    }

    /// Partial-name search ranked by distinct matches batted, then name.
    pub async fn search(&self, query: &str, limit: i64) -> Result<Vec<PlayerMatches>, StoreError> {
        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
        let rows: Vec<SearchRow> = with_conn!(self.pool, conn => {
            diesel::sql_query(
                r#"
                SELECT p.player_name AS name,
                       COUNT(DISTINCT d.match_id) AS matches
                FROM players p
                LEFT JOIN deliveries d ON LOWER(d.batter) = LOWER(p.player_name)
                WHERE LOWER(p.player_name) LIKE $1 ESCAPE '\'
                GROUP BY p.player_name
                ORDER BY matches DESC, name ASC
                LIMIT $2
                "#,
            )
            .bind::<Text, _>(&pattern)
            .bind::<BigInt, _>(limit)
            .load(conn)
            .await?
        });
        Ok(rows
            .into_iter()
            .map(|row| PlayerMatches {
                name: row.name,
                matches: row.matches,
            })
            .collect())
    }

    /// Alphabetical page of player names, optionally filtered by a substring.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<PlayerPage, StoreError> {
        let pattern = search.map(|s| format!("%{}%", escape_like(&s.to_lowercase())));

        with_conn!(self.pool, conn => {
            let names: Vec<NameRow> = diesel::sql_query(
                r#"
                SELECT player_name FROM players
                WHERE ($1 IS NULL OR LOWER(player_name) LIKE $1 ESCAPE '\')
                ORDER BY player_name
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind::<Nullable<Text>, _>(pattern.as_deref())
            .bind::<BigInt, _>(limit)
            .bind::<BigInt, _>(offset)
            .load(conn)
            .await?;

            let counts: Vec<CountRow> = diesel::sql_query(
                r#"
                SELECT COUNT(*) AS total FROM players
                WHERE ($1 IS NULL OR LOWER(player_name) LIKE $1 ESCAPE '\')
                "#,
            )
            .bind::<Nullable<Text>, _>(pattern.as_deref())
            .load(conn)
            .await?;

            Ok(PlayerPage {
                players: names.into_iter().map(|row| row.player_name).collect(),
                total: counts.iter().next().map_or(0, |row| row.total),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::testing::{seeded_store, DHONI, KOHLI, PARTNER};

    #[tokio::test]
    async fn test_resolve_returns_stored_casing() {
        let store = seeded_store().await;
        let players = store.ctx.players();
        assert_eq!(players.resolve("v kohli").await.unwrap().as_deref(), Some(KOHLI));
        assert_eq!(players.resolve("MS DHONI").await.unwrap().as_deref(), Some(DHONI));
        assert!(players.resolve("Kohli").await.unwrap().is_none());
        assert!(players.exists(KOHLI).await.unwrap());
        assert!(!players.exists("SR Tendulkar").await.unwrap());
    }

    #[tokio::test]
    async fn test_search_ranks_by_matches_batted() {
        let store = seeded_store().await;
        let results = store.ctx.players().search("LI", 10).await.unwrap();
        let ranked: Vec<(&str, i64)> = results
            .iter()
            .map(|p| (p.name.as_str(), p.matches))
            .collect();
        assert_eq!(ranked, vec![(KOHLI, 3), (PARTNER, 0)]);

        let limited = store.ctx.players().search("li", 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_search_escapes_wildcards() {
        let store = seeded_store().await;
        assert!(store.ctx.players().search("%%", 10).await.unwrap().is_empty());
        assert!(store.ctx.players().search("__", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_paginates_alphabetically() {
        let store = seeded_store().await;
        let players = store.ctx.players();

        let first = players.list(None, 2, 0).await.unwrap();
        assert_eq!(first.total, 5);
        assert_eq!(first.players, vec!["A Mishra", PARTNER]);

        let rest = players.list(None, 10, 2).await.unwrap();
        assert_eq!(rest.players, vec!["DW Steyn", DHONI, KOHLI]);

        let filtered = players.list(Some("ST"), 10, 0).await.unwrap();
        assert_eq!(filtered.total, 1);
        assert_eq!(filtered.players, vec!["DW Steyn"]);
    }
}
