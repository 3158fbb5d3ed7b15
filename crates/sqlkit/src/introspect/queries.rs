//! Catalog statements per dialect.
//!
//! PostgreSQL statements alias their columns to the names MySQL's `SHOW` and
//! `information_schema` views use (`Field`, `Key`, `Key_name`, ...), so the shaping
//! code is shared between dialects.

use crate::dialect::Dialect;
use crate::ident::{escape_identifier, is_bare_identifier};

const MYSQL_TABLE_COLUMNS: &str = "SELECT TABLE_NAME, TABLE_TYPE, ENGINE, VERSION, ROW_FORMAT, \
     TABLE_ROWS, AVG_ROW_LENGTH, DATA_LENGTH, MAX_DATA_LENGTH, INDEX_LENGTH, DATA_FREE, \
     AUTO_INCREMENT, CREATE_TIME, UPDATE_TIME, CHECK_TIME, TABLE_COLLATION, CHECKSUM, \
     CREATE_OPTIONS, TABLE_COMMENT FROM information_schema.TABLES";

const PG_TABLE_COLUMNS: &str = "SELECT t.table_name AS \"TABLE_NAME\", \
     t.table_type AS \"TABLE_TYPE\", c.reltuples::bigint AS \"TABLE_ROWS\", \
     pg_catalog.pg_relation_size(c.oid) AS \"DATA_LENGTH\", \
     pg_catalog.pg_indexes_size(c.oid) AS \"INDEX_LENGTH\", \
     pg_catalog.obj_description(c.oid, 'pg_class') AS \"TABLE_COMMENT\" \
     FROM information_schema.tables t \
     LEFT JOIN pg_catalog.pg_namespace n ON n.nspname = t.table_schema \
     LEFT JOIN pg_catalog.pg_class c ON c.relnamespace = n.oid AND c.relname = t.table_name";

/// Builds catalog statements for one dialect.
///
/// `literal` renders a string as an escaped SQL literal (normally the executor's
/// value escaper); `quote` is the identifier quote character.
pub(crate) struct Catalog<F> {
    dialect: Dialect,
    quote: char,
    literal: F,
}

impl<F: Fn(&str) -> String> Catalog<F> {
    pub(crate) fn new(dialect: Dialect, quote: char, literal: F) -> Self {
        Self {
            dialect,
            quote,
            literal,
        }
    }

    fn ident(&self, name: &str) -> String {
        escape_identifier(name, self.quote)
    }

    fn lit(&self, value: &str) -> String {
        (self.literal)(value)
    }

    /// `(schema expression, table literal)` for a possibly schema-qualified name.
    ///
    /// Names the escaper emits bare are folded to lower case, as the server folds
    /// them in generated DML. Quoted names are matched exactly and never split.
    fn pg_scope(&self, table: &str) -> (String, String) {
        if !is_bare_identifier(table) {
            return ("current_schema()".to_string(), self.lit(table));
        }
        let folded = table.to_ascii_lowercase();
        match folded.split_once('.') {
            Some((schema, name)) => (self.lit(schema), self.lit(name)),
            None => ("current_schema()".to_string(), self.lit(&folded)),
        }
    }

    fn pg_name(&self, name: &str) -> String {
        if is_bare_identifier(name) {
            self.lit(&name.to_ascii_lowercase())
        } else {
            self.lit(name)
        }
    }

    pub(crate) fn fields(&self, table: &str) -> String {
        match self.dialect {
            Dialect::MySql => format!("SHOW FULL COLUMNS FROM {}", self.ident(table)),
            Dialect::Postgres => {
                let (schema, name) = self.pg_scope(table);
                format!(
                    "SELECT c.column_name AS \"Field\", c.data_type AS \"Type\", \
                     c.is_nullable AS \"Null\", \
                     COALESCE((SELECT CASE WHEN bool_or(tc.constraint_type = 'PRIMARY KEY') THEN 'PRI' \
                     WHEN count(*) > 0 THEN 'UNI' END \
                     FROM information_schema.key_column_usage k \
                     JOIN information_schema.table_constraints tc \
                     ON tc.constraint_schema = k.constraint_schema AND tc.constraint_name = k.constraint_name \
                     WHERE k.table_schema = c.table_schema AND k.table_name = c.table_name \
                     AND k.column_name = c.column_name \
                     AND (tc.constraint_type = 'PRIMARY KEY' OR (tc.constraint_type = 'UNIQUE' \
                     AND (SELECT count(*) FROM information_schema.key_column_usage k2 \
                     WHERE k2.constraint_schema = k.constraint_schema \
                     AND k2.constraint_name = k.constraint_name) = 1))), '') AS \"Key\", \
                     c.column_default AS \"Default\", \
                     CASE WHEN c.is_identity = 'YES' OR c.column_default LIKE 'nextval(%' \
                     THEN 'auto_increment' ELSE '' END AS \"Extra\" \
                     FROM information_schema.columns c \
                     WHERE c.table_schema = {schema} AND c.table_name = {name} \
                     ORDER BY c.ordinal_position"
                )
            }
        }
    }

    pub(crate) fn primary(&self, table: &str) -> String {
        match self.dialect {
            Dialect::MySql => format!(
                "SHOW KEYS FROM {} WHERE Key_name = {}",
                self.ident(table),
                self.lit("PRIMARY")
            ),
            Dialect::Postgres => {
                let (schema, name) = self.pg_scope(table);
                format!(
                    "SELECT tc.table_name AS \"Table\", tc.constraint_name AS \"Key_name\", \
                     k.column_name AS \"Column_name\", k.ordinal_position AS \"Seq_in_index\" \
                     FROM information_schema.table_constraints tc \
                     JOIN information_schema.key_column_usage k \
                     ON k.constraint_schema = tc.constraint_schema AND k.constraint_name = tc.constraint_name \
                     WHERE tc.constraint_type = 'PRIMARY KEY' \
                     AND tc.table_schema = {schema} AND tc.table_name = {name} \
                     ORDER BY k.ordinal_position"
                )
            }
        }
    }

    pub(crate) fn foreign(&self, table: &str) -> String {
        match self.dialect {
            Dialect::MySql => format!(
                "SELECT CONSTRAINT_NAME, COLUMN_NAME, ORDINAL_POSITION, \
                 POSITION_IN_UNIQUE_CONSTRAINT, REFERENCED_TABLE_NAME, REFERENCED_COLUMN_NAME \
                 FROM information_schema.KEY_COLUMN_USAGE \
                 WHERE REFERENCED_TABLE_NAME IS NOT NULL AND CONSTRAINT_SCHEMA = DATABASE() \
                 AND TABLE_NAME = {} ORDER BY REFERENCED_TABLE_NAME",
                self.lit(table)
            ),
            Dialect::Postgres => {
                let (schema, name) = self.pg_scope(table);
                format!(
                    "SELECT k.constraint_name AS \"CONSTRAINT_NAME\", k.column_name AS \"COLUMN_NAME\", \
                     k.ordinal_position AS \"ORDINAL_POSITION\", \
                     k.position_in_unique_constraint AS \"POSITION_IN_UNIQUE_CONSTRAINT\", \
                     r.table_name AS \"REFERENCED_TABLE_NAME\", r.column_name AS \"REFERENCED_COLUMN_NAME\" \
                     FROM information_schema.key_column_usage k \
                     JOIN information_schema.referential_constraints rc \
                     ON rc.constraint_schema = k.constraint_schema AND rc.constraint_name = k.constraint_name \
                     JOIN information_schema.key_column_usage r \
                     ON r.constraint_schema = rc.unique_constraint_schema \
                     AND r.constraint_name = rc.unique_constraint_name \
                     AND r.ordinal_position = k.position_in_unique_constraint \
                     WHERE k.table_schema = {schema} AND k.table_name = {name} \
                     ORDER BY r.table_name"
                )
            }
        }
    }

    pub(crate) fn constraints(&self, table: &str) -> String {
        match self.dialect {
            Dialect::MySql => format!(
                "SELECT CONSTRAINT_NAME, UNIQUE_CONSTRAINT_NAME, REFERENCED_TABLE_NAME, \
                 MATCH_OPTION, UPDATE_RULE, DELETE_RULE \
                 FROM information_schema.REFERENTIAL_CONSTRAINTS \
                 WHERE TABLE_NAME = {} ORDER BY CONSTRAINT_NAME",
                self.lit(table)
            ),
            Dialect::Postgres => {
                let (schema, name) = self.pg_scope(table);
                format!(
                    "SELECT rc.constraint_name AS \"CONSTRAINT_NAME\", \
                     rc.unique_constraint_name AS \"UNIQUE_CONSTRAINT_NAME\", \
                     u.table_name AS \"REFERENCED_TABLE_NAME\", rc.match_option AS \"MATCH_OPTION\", \
                     rc.update_rule AS \"UPDATE_RULE\", rc.delete_rule AS \"DELETE_RULE\" \
                     FROM information_schema.referential_constraints rc \
                     JOIN information_schema.table_constraints tc \
                     ON tc.constraint_schema = rc.constraint_schema AND tc.constraint_name = rc.constraint_name \
                     JOIN information_schema.table_constraints u \
                     ON u.constraint_schema = rc.unique_constraint_schema \
                     AND u.constraint_name = rc.unique_constraint_name \
                     WHERE tc.table_schema = {schema} AND tc.table_name = {name} \
                     ORDER BY rc.constraint_name"
                )
            }
        }
    }

    pub(crate) fn tables(&self) -> String {
        match self.dialect {
            Dialect::MySql => format!("{MYSQL_TABLE_COLUMNS} WHERE TABLE_SCHEMA = DATABASE()"),
            Dialect::Postgres => format!(
                "{PG_TABLE_COLUMNS} WHERE t.table_schema = current_schema() ORDER BY t.table_name"
            ),
        }
    }

    pub(crate) fn database_tables(&self, database: &str) -> String {
        match self.dialect {
            Dialect::MySql => format!(
                "{MYSQL_TABLE_COLUMNS} WHERE TABLE_SCHEMA = {}",
                self.lit(database)
            ),
            Dialect::Postgres => format!(
                "{PG_TABLE_COLUMNS} WHERE t.table_catalog = {} \
                 AND t.table_schema NOT IN ('pg_catalog', 'information_schema') \
                 ORDER BY t.table_name",
                self.pg_name(database)
            ),
        }
    }

    pub(crate) fn table_info(&self, table: &str) -> String {
        match self.dialect {
            Dialect::MySql => format!("SHOW TABLE STATUS LIKE {}", self.lit(table)),
            Dialect::Postgres => {
                let (schema, name) = self.pg_scope(table);
                format!(
                    "SELECT c.relname AS \"Name\", am.amname AS \"Engine\", \
                     c.reltuples::bigint AS \"Rows\", \
                     pg_catalog.pg_relation_size(c.oid) AS \"Data_length\", \
                     pg_catalog.pg_indexes_size(c.oid) AS \"Index_length\", \
                     pg_catalog.obj_description(c.oid, 'pg_class') AS \"Comment\" \
                     FROM pg_catalog.pg_class c \
                     JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
                     LEFT JOIN pg_catalog.pg_am am ON am.oid = c.relam \
                     WHERE c.relkind IN ('r', 'p', 'v', 'm', 'f') \
                     AND n.nspname = {schema} AND c.relname = {name}"
                )
            }
        }
    }

    pub(crate) fn indexes(&self, table: &str) -> String {
        match self.dialect {
            Dialect::MySql => format!("SHOW INDEX FROM {}", self.ident(table)),
            Dialect::Postgres => {
                let (schema, name) = self.pg_scope(table);
                format!(
                    "SELECT tablename AS \"Table\", indexname AS \"Key_name\", \
                     indexdef AS \"Index_definition\" FROM pg_catalog.pg_indexes \
                     WHERE schemaname = {schema} AND tablename = {name} ORDER BY indexname"
                )
            }
        }
    }

    pub(crate) fn databases(&self) -> &'static str {
        match self.dialect {
            Dialect::MySql => "SHOW DATABASES",
            Dialect::Postgres => {
                "SELECT datname FROM pg_catalog.pg_database WHERE NOT datistemplate ORDER BY datname"
            }
        }
    }

    pub(crate) fn processes(&self) -> &'static str {
        match self.dialect {
            Dialect::MySql => "SELECT * FROM information_schema.PROCESSLIST",
            Dialect::Postgres => "SELECT * FROM pg_catalog.pg_stat_activity",
        }
    }

    pub(crate) fn global_variables(&self) -> &'static str {
        match self.dialect {
            Dialect::MySql => "SELECT * FROM information_schema.GLOBAL_VARIABLES",
            Dialect::Postgres => "SELECT name, setting FROM pg_catalog.pg_settings ORDER BY name",
        }
    }

    pub(crate) fn global_status(&self) -> &'static str {
        match self.dialect {
            Dialect::MySql => "SELECT * FROM information_schema.GLOBAL_STATUS",
            Dialect::Postgres => {
                "SELECT s.key, s.value FROM pg_catalog.pg_stat_database d, \
                 LATERAL jsonb_each_text(to_jsonb(d)) AS s(key, value) \
                 WHERE d.datname = current_database()"
            }
        }
    }

    pub(crate) fn users(&self) -> &'static str {
        match self.dialect {
            Dialect::MySql => "SELECT * FROM mysql.user",
            Dialect::Postgres => "SELECT * FROM pg_catalog.pg_user",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mysql() -> Catalog<impl Fn(&str) -> String> {
        Catalog::new(Dialect::MySql, '`', |s: &str| Dialect::MySql.escape_str(s))
    }

    fn postgres() -> Catalog<impl Fn(&str) -> String> {
        Catalog::new(Dialect::Postgres, '"', |s: &str| Dialect::Postgres.escape_str(s))
    }

    #[test]
    fn mysql_show_statements_escape_identifiers() {
        let c = mysql();
        assert_eq!(c.fields("_Language"), "SHOW FULL COLUMNS FROM _Language");
        assert_eq!(c.fields("bad name"), "SHOW FULL COLUMNS FROM `bad name`");
        assert_eq!(c.indexes("users"), "SHOW INDEX FROM users");
        assert_eq!(
            c.primary("users"),
            "SHOW KEYS FROM users WHERE Key_name = 'PRIMARY'"
        );
        assert_eq!(c.table_info("users"), "SHOW TABLE STATUS LIKE 'users'");
    }

    #[test]
    fn mysql_literals_are_escaped() {
        let sql = mysql().foreign("x' OR '1'='1");
        assert!(sql.contains(r"TABLE_NAME = 'x\' OR \'1\'=\'1'"));
        assert!(mysql().database_tables("db").ends_with("WHERE TABLE_SCHEMA = 'db'"));
    }

    #[test]
    fn postgres_scope_defaults_to_current_schema() {
        let sql = postgres().fields("users");
        assert!(sql.contains("c.table_schema = current_schema() AND c.table_name = 'users'"));
        assert!(sql.ends_with("ORDER BY c.ordinal_position"));
    }

    #[test]
    fn postgres_scope_splits_schema() {
        let sql = postgres().indexes("audit.events");
        assert!(sql.contains("schemaname = 'audit' AND tablename = 'events'"));
    }

    #[test]
    fn postgres_folds_bare_names_like_the_server() {
        let c = postgres();
        assert!(
            c.fields("Users")
                .contains("c.table_schema = current_schema() AND c.table_name = 'users'")
        );
        assert!(c.table_info("Audit.Events").contains("n.nspname = 'audit' AND c.relname = 'events'"));
        assert!(c.database_tables("App").contains("t.table_catalog = 'app'"));
    }

    #[test]
    fn postgres_quoted_names_match_exactly() {
        let c = postgres();
        assert!(c.fields("Order Items").contains("c.table_name = 'Order Items'"));
        assert!(
            c.primary("my.Table x")
                .contains("tc.table_schema = current_schema() AND tc.table_name = 'my.Table x'")
        );
    }

    #[test]
    fn postgres_aliases_match_mysql_names() {
        let sql = postgres().fields("users");
        for alias in ["\"Field\"", "\"Type\"", "\"Null\"", "\"Key\"", "\"Default\"", "\"Extra\""] {
            assert!(sql.contains(alias), "missing {alias}");
        }
        assert!(postgres().indexes("users").contains("\"Key_name\""));
    }
}
