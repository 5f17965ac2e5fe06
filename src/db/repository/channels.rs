//! Channels repository
//!
//! Rows are always returned in insertion order (`row_id`); callers apply the
//! name ordering themselves so every backend sorts the same way.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::db::models::{ChannelRow, NewChannel};

/// Rows per multi-row INSERT; 10 bound columns keeps us under SQLite's 999 variable limit
const INSERT_BATCH_ROWS: usize = 99;

/// GLOB pattern matching any text with a character outside ASCII
const NON_ASCII_GLOB: &str = "*[^\u{1}-\u{7f}]*";

const SELECT_COLUMNS: &str = "SELECT row_id, tvg_id, tvg_logo, group_title, name, country_code, quality, \
     url, http_referrer, http_user_agent, categories FROM channels";

/// Replace the table contents in one transaction
///
/// Rows whose `tvg_id` already exists in the batch are ignored; the first
/// occurrence wins. Returns the number of rows inserted.
pub async fn replace_all(pool: &SqlitePool, channels: &[NewChannel]) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM channels").execute(&mut *tx).await?;

    let mut inserted = 0;
    for batch in channels.chunks(INSERT_BATCH_ROWS) {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "INSERT OR IGNORE INTO channels (tvg_id, tvg_logo, group_title, name, country_code, \
             quality, url, http_referrer, http_user_agent, categories) ",
        );
        builder.push_values(batch, |mut row, channel| {
            row.push_bind(&channel.tvg_id)
                .push_bind(&channel.tvg_logo)
                .push_bind(&channel.group_title)
                .push_bind(&channel.name)
                .push_bind(&channel.country_code)
                .push_bind(&channel.quality)
                .push_bind(&channel.url)
                .push_bind(&channel.http_referrer)
                .push_bind(&channel.http_user_agent)
                .push_bind(&channel.categories);
        });

        let result = builder.build().execute(&mut *tx).await?;
        inserted += result.rows_affected();
    }

    tx.commit().await?;

    Ok(inserted)
}

/// Delete every channel
pub async fn delete_all(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM channels").execute(pool).await?;
    Ok(result.rows_affected())
}

/// Count all channels
pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM channels")
        .fetch_one(pool)
        .await?;

    Ok(count.0)
}

/// All channels in insertion order
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<ChannelRow>, sqlx::Error> {
    let sql = format!("{} ORDER BY row_id", SELECT_COLUMNS);
    sqlx::query_as::<_, ChannelRow>(&sql).fetch_all(pool).await
}

/// Get a single channel by tvg-id
pub async fn get_by_tvg_id(pool: &SqlitePool, tvg_id: &str) -> Result<Option<ChannelRow>, sqlx::Error> {
    let sql = format!("{} WHERE tvg_id = ?", SELECT_COLUMNS);
    sqlx::query_as::<_, ChannelRow>(&sql)
        .bind(tvg_id)
        .fetch_optional(pool)
        .await
}

/// Channels of a country, ASCII case-insensitive
///
/// Codes holding non-ASCII characters are returned as well; NOCASE cannot
/// fold them, so the caller decides.
pub async fn find_by_country(pool: &SqlitePool, country_code: &str) -> Result<Vec<ChannelRow>, sqlx::Error> {
    let sql = format!(
        "{} WHERE country_code = ? COLLATE NOCASE OR country_code GLOB ? ORDER BY row_id",
        SELECT_COLUMNS
    );
    sqlx::query_as::<_, ChannelRow>(&sql)
        .bind(country_code)
        .bind(NON_ASCII_GLOB)
        .fetch_all(pool)
        .await
}

/// Channels whose name or group title contains `query` (ASCII case-insensitive LIKE)
///
/// Rows with non-ASCII text in either column are returned as well.
pub async fn search(pool: &SqlitePool, query: &str) -> Result<Vec<ChannelRow>, sqlx::Error> {
    let pattern = format!("%{}%", escape_like(query));
    let sql = format!(
        "{} WHERE name LIKE ? ESCAPE '\\' OR group_title LIKE ? ESCAPE '\\' \
         OR name GLOB ? OR group_title GLOB ? ORDER BY row_id",
        SELECT_COLUMNS
    );
    sqlx::query_as::<_, ChannelRow>(&sql)
        .bind(&pattern)
        .bind(&pattern)
        .bind(NON_ASCII_GLOB)
        .bind(NON_ASCII_GLOB)
        .fetch_all(pool)
        .await
}

/// Distinct non-empty country codes, sorted
pub async fn distinct_countries(pool: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT DISTINCT country_code FROM channels WHERE country_code != '' ORDER BY country_code",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.0).collect())
}

/// Distinct raw category columns (JSON arrays)
pub async fn distinct_category_columns(pool: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT DISTINCT categories FROM channels")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|r| r.0).collect())
}

/// Escape LIKE wildcards so the query matches literally
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
