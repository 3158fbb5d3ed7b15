use serde_json::json;
use sqlkit::{Db, FilterSpec, KeyRole, OrderSpec, OrmError, OrmResult, Row, Upserted};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio_postgres::NoTls;

async fn connect(test: &str) -> OrmResult<Option<Db<tokio_postgres::Client>>> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping {test}");
            return Ok(None);
        }
    };

    let (client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await
        .map_err(OrmError::from_db_error)?;
    tokio::spawn(async move {
        let _ = connection.await;
    });
    Ok(Some(Db::new(client)))
}

fn unique_table(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before UNIX_EPOCH")
        .as_nanos();
    format!("sqlkit_{}_{}_{}", prefix, std::process::id(), nanos)
}

#[tokio::test]
async fn crud_roundtrip() -> OrmResult<()> {
    let Some(db) = connect("crud_roundtrip").await? else {
        return Ok(());
    };
    let table = unique_table("lang");

    db.execute(
        &format!(
            "CREATE TABLE {table} (
                id BIGSERIAL PRIMARY KEY,
                code TEXT UNIQUE NOT NULL,
                name TEXT
            )"
        ),
        &[],
    )
    .await?;

    let columns = db.fields(&table).await?;
    assert_eq!(columns.names().collect::<Vec<_>>(), ["id", "code", "name"]);
    assert_eq!(columns.get("id").map(|c| c.key_role), Some(KeyRole::Primary));
    assert_eq!(columns.get("code").map(|c| c.key_role), Some(KeyRole::Unique));
    assert!(columns.get("id").is_some_and(|c| c.is_auto_increment()));

    let inserted = db
        .insert(
            &table,
            &Row::new()
                .with("name", "Uygurian")
                .with("code", "UY")
                .with("ignored", true),
        )
        .await?;
    assert!(inserted.value.is_some());
    assert!(inserted.statement.sql.contains("(code, name)"));

    let upserted = db
        .upsert(&table, &Row::new().with("code", "UY").with("name", "Uighur"))
        .await?;
    assert_eq!(upserted.value, Upserted::Updated(Some(1)));

    let upserted = db
        .upsert(&table, &Row::new().with("code", "QW").with("name", "Qwertian"))
        .await?;
    assert!(matches!(upserted.value, Upserted::Inserted(Some(_))));

    assert_eq!(db.count(&table, &FilterSpec::new()).await?, 2);
    assert_eq!(
        db.count(&table, &FilterSpec::new().with("code", "(UY,QW,XX)"))
            .await?,
        2
    );

    let rows = db
        .select(
            &table,
            &["code", "name"],
            &FilterSpec::new().with("name", "*an"),
            &OrderSpec::new().asc("code"),
        )
        .await?
        .into_value();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("code"), Some(&json!("QW")));

    let names = db
        .query_key_value(&format!("SELECT code, name FROM {table}"), &[])
        .await?;
    assert_eq!(names["UY"], json!("Uighur"));

    let changed = db
        .update_where(
            &table,
            &Row::new().with("name", "renamed"),
            &FilterSpec::new().with("code", "QW"),
        )
        .await?;
    assert_eq!(changed.value, Some(1));

    let err = db.delete(&table, &FilterSpec::new()).await.unwrap_err();
    assert!(err.is_empty_predicate());

    let deleted = db
        .delete(&table, &FilterSpec::new().with("code", "<>nothing"))
        .await?;
    assert_eq!(deleted.value, Some(2));

    db.execute(&format!("DROP TABLE {table}"), &[]).await?;
    Ok(())
}

#[tokio::test]
async fn introspection_roundtrip() -> OrmResult<()> {
    let Some(db) = connect("introspection_roundtrip").await? else {
        return Ok(());
    };
    let parent = unique_table("parent");
    let child = unique_table("child");

    db.execute(
        &format!("CREATE TABLE {parent} (id BIGSERIAL PRIMARY KEY, label TEXT)"),
        &[],
    )
    .await?;
    db.execute(
        &format!(
            "CREATE TABLE {child} (
                id BIGSERIAL PRIMARY KEY,
                parent_id BIGINT REFERENCES {parent}(id)
            )"
        ),
        &[],
    )
    .await?;

    let primary = db.primary(&parent).await?.expect("primary key row");
    assert_eq!(primary.get_str("Column_name").as_deref(), Some("id"));

    let foreign = db.foreign(&child).await?;
    assert_eq!(foreign.len(), 1);
    let fk = foreign.values().next().expect("foreign key row");
    assert_eq!(fk.get_str("REFERENCED_TABLE_NAME"), Some(parent.clone()));

    assert_eq!(db.constraints(&child).await?.len(), 1);
    assert!(db.tables().await?.contains_key(&parent));
    assert!(db.table_info(&parent).await?.is_some());
    assert!(!db.indexes(&parent).await?.is_empty());
    assert!(!db.databases().await?.is_empty());
    assert!(db.global_variables().await?.contains_key("max_connections"));

    let err = db
        .insert("sqlkit_missing_table", &Row::new().with("id", 1))
        .await
        .unwrap_err();
    assert!(err.is_table_not_found());

    db.execute(&format!("DROP TABLE {child}, {parent}"), &[]).await?;
    Ok(())
}
