//! SQL statements for the counter table.
//!
//! Table and column names come from a validated [`LeaderboardSchema`] and are
//! always quoted. Values are always bound as parameters.

use bumpboard_core::config::LeaderboardSchema;

/// Placeholder and type flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(all(feature = "postgres", feature = "sqlite")), allow(dead_code))]
pub(crate) enum Dialect {
    Postgres,
    Sqlite,
}

impl Dialect {
    fn param(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", index),
            Dialect::Sqlite => format!("?{}", index),
        }
    }
}

/// Quote an identifier for use in SQL.
pub(crate) fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[derive(Debug, Clone)]
pub(crate) struct LeaderboardSql {
    pub create_table: String,
    pub upsert: String,
    pub top_n: String,
    pub get: String,
}

impl LeaderboardSql {
    pub fn new(schema: &LeaderboardSchema, dialect: Dialect) -> Self {
        let table = quote(&schema.table);
        let user_id = quote(&schema.user_id_column);
        let name = quote(&schema.name_column);
        let count = quote(&schema.count_column);

        let create_table = format!(
            "CREATE TABLE IF NOT EXISTS {table} (\
             {user_id} TEXT PRIMARY KEY, \
             {name} TEXT NOT NULL, \
             {count} BIGINT NOT NULL DEFAULT 0)"
        );

        // One statement: the database serializes concurrent bumps of a user.
        let upsert = format!(
            "INSERT INTO {table} ({user_id}, {name}, {count}) VALUES ({p1}, {p2}, 1) \
             ON CONFLICT ({user_id}) DO UPDATE SET \
             {count} = {table}.{count} + 1, {name} = excluded.{name}",
            p1 = dialect.param(1),
            p2 = dialect.param(2),
        );

        let top_n = format!(
            "SELECT {name}, CAST({count} AS BIGINT) FROM {table} \
             ORDER BY {count} DESC, {user_id} ASC LIMIT {p1}",
            p1 = dialect.param(1),
        );

        let get = format!(
            "SELECT {user_id}, {name}, CAST({count} AS BIGINT) FROM {table} WHERE {user_id} = {p1}",
            p1 = dialect.param(1),
        );

        Self {
            create_table,
            upsert,
            top_n,
            get,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpboard_core::config::TableVariant;

    #[test]
    fn test_quote_escapes_quotes() {
        assert_eq!(quote("bumps"), "\"bumps\"");
        assert_eq!(quote("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_postgres_upsert_is_single_statement() {
        let sql = LeaderboardSql::new(&LeaderboardSchema::default(), Dialect::Postgres);
        assert_eq!(
            sql.upsert,
            "INSERT INTO \"bump_leaderboard\" (\"user_id\", \"username\", \"bump_count\") \
             VALUES ($1, $2, 1) ON CONFLICT (\"user_id\") DO UPDATE SET \
             \"bump_count\" = \"bump_leaderboard\".\"bump_count\" + 1, \
             \"username\" = excluded.\"username\""
        );
        assert!(!sql.upsert.contains(';'));
    }

    #[test]
    fn test_top_n_orders_by_count_then_user_id() {
        let sql = LeaderboardSql::new(
            &LeaderboardSchema::for_variant(TableVariant::Bumps),
            Dialect::Sqlite,
        );
        assert!(sql
            .top_n
            .ends_with("ORDER BY \"count\" DESC, \"userid\" ASC LIMIT ?1"));
    }
}
