//! Re-points ownership of every user object in a restored PostgreSQL database.
//!
//! `pg_restore --no-owner` leaves everything owned by the role that ran the
//! restore. Each pass asks a catalog to generate one `ALTER ... OWNER TO`
//! per object and replays the generated statements one by one. The passes
//! are not wrapped in a transaction: a failure midway leaves earlier
//! objects already migrated.
//!
//! The new owner is the restored user, and the session connects to the
//! database under its final name (after a swap rename). Older versions of
//! the operator scripts handed objects to a role named after the database
//! and connected under the pre-rename name; neither is reproduced here.

use crate::database::{CatalogSession, PostgresAdmin};
use crate::error::Result;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy)]
pub struct OwnershipPass {
    pub kind: &'static str,
    /// Catalog query yielding one statement per row; `$1` is the new owner.
    pub query: &'static str,
}

pub const OWNERSHIP_PASSES: [OwnershipPass; 4] = [
    OwnershipPass {
        kind: "table",
        query: "SELECT 'ALTER TABLE ' || quote_ident(schemaname) || '.' || quote_ident(tablename) \
                || ' OWNER TO ' || quote_ident($1) || ';' \
                FROM pg_tables \
                WHERE NOT schemaname IN ('pg_catalog', 'information_schema') \
                ORDER BY schemaname, tablename",
    },
    OwnershipPass {
        kind: "sequence",
        query: "SELECT 'ALTER SEQUENCE ' || quote_ident(sequence_schema::text) || '.' \
                || quote_ident(sequence_name::text) || ' OWNER TO ' || quote_ident($1) || ';' \
                FROM information_schema.sequences \
                WHERE NOT sequence_schema IN ('pg_catalog', 'information_schema') \
                ORDER BY sequence_schema, sequence_name",
    },
    OwnershipPass {
        kind: "view",
        query: "SELECT 'ALTER VIEW ' || quote_ident(table_schema::text) || '.' \
                || quote_ident(table_name::text) || ' OWNER TO ' || quote_ident($1) || ';' \
                FROM information_schema.views \
                WHERE NOT table_schema IN ('pg_catalog', 'information_schema') \
                ORDER BY table_schema, table_name",
    },
    OwnershipPass {
        kind: "materialized view",
        query: "SELECT 'ALTER TABLE ' || oid::regclass::text \
                || ' OWNER TO ' || quote_ident($1) || ';' \
                FROM pg_class \
                WHERE relkind = 'm' \
                ORDER BY oid",
    },
];

/// Returns the number of `ALTER` statements executed.
pub async fn fix_ownership(
    admin: &dyn PostgresAdmin,
    database: &str,
    owner: &str,
) -> Result<usize> {
    info!("Fixing database objects owner in \"{}\" to \"{}\"...", database, owner);
    let mut session: Box<dyn CatalogSession> = admin.open_catalog(database).await?;
    let mut total = 0;

    for pass in &OWNERSHIP_PASSES {
        let statements = session.generate_statements(pass.query, owner).await?;
        debug!("Reassigning {} {} object(s)", statements.len(), pass.kind);
        for statement in &statements {
            debug!("Executing: {}", statement);
            session.execute(statement).await?;
        }
        total += statements.len();
    }

    session.close().await?;
    info!("Ownership fix-up complete: {} object(s) reassigned", total);
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbSwapError;
    use crate::workflow::fakes::{calls, CallLog, RecordingAdmin};

    #[tokio::test]
    async fn test_one_statement_per_row_in_catalog_order() {
        let log = CallLog::default();
        let admin = RecordingAdmin::new(&log).with_catalog(vec![
            vec![
                "ALTER TABLE public.a OWNER TO alice;".to_string(),
                "ALTER TABLE public.b OWNER TO alice;".to_string(),
            ],
            vec!["ALTER SEQUENCE public.a_id_seq OWNER TO alice;".to_string()],
            vec!["ALTER VIEW reporting.totals OWNER TO alice;".to_string()],
            vec!["ALTER TABLE reporting.daily OWNER TO alice;".to_string()],
        ]);
        let queries = admin.queries();

        let count = fix_ownership(&admin, "shop_new", "alice").await.unwrap();

        assert_eq!(count, 5);
        assert_eq!(
            calls(&log),
            vec![
                "open_catalog(shop_new)",
                "execute(ALTER TABLE public.a OWNER TO alice;)",
                "execute(ALTER TABLE public.b OWNER TO alice;)",
                "execute(ALTER SEQUENCE public.a_id_seq OWNER TO alice;)",
                "execute(ALTER VIEW reporting.totals OWNER TO alice;)",
                "execute(ALTER TABLE reporting.daily OWNER TO alice;)",
                "close_catalog",
            ]
        );

        let queries = queries.lock().unwrap();
        assert_eq!(queries.len(), 4);
        assert!(queries.iter().all(|(_, owner)| owner == "alice"));
        assert!(queries[0].0.contains("FROM pg_tables"));
        assert!(queries[1].0.contains("FROM information_schema.sequences"));
        assert!(queries[2].0.contains("FROM information_schema.views"));
        assert!(queries[3].0.contains("relkind = 'm'"));
    }

    #[tokio::test]
    async fn test_empty_catalogs_issue_nothing() {
        let log = CallLog::default();
        let admin = RecordingAdmin::new(&log);

        let count = fix_ownership(&admin, "shop_new", "alice").await.unwrap();

        assert_eq!(count, 0);
        assert_eq!(calls(&log), vec!["open_catalog(shop_new)", "close_catalog"]);
        assert_eq!(admin.queries().lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_statements() {
        let log = CallLog::default();
        let admin = RecordingAdmin::new(&log)
            .failing_on("execute")
            .with_catalog(vec![vec![
                "ALTER TABLE public.a OWNER TO alice;".to_string(),
                "ALTER TABLE public.b OWNER TO alice;".to_string(),
            ]]);

        let result = fix_ownership(&admin, "shop_new", "alice").await;

        assert!(matches!(result, Err(DbSwapError::Database(_))));
        assert_eq!(
            calls(&log),
            vec![
                "open_catalog(shop_new)",
                "execute(ALTER TABLE public.a OWNER TO alice;)",
            ]
        );
    }

    #[test]
    fn test_passes_exclude_system_schemas() {
        for pass in OWNERSHIP_PASSES.iter().take(3) {
            assert!(pass.query.contains("('pg_catalog', 'information_schema')"));
            assert!(pass.query.contains("quote_ident($1)"));
        }
        assert!(OWNERSHIP_PASSES[3].query.ends_with("ORDER BY oid"));
    }
}
