use anyhow::{bail, Context, Result};
use sqlx::{PgPool, Row};

use crate::table::Table;

/// Insertion-order column added to every table we write.
pub const ORD_COLUMN: &str = "ord";

/// Lowercase SQL identifier: `[a-z_][a-z0-9_]*`, at most 63 bytes.
pub fn validate_ident(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let ok_first = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_');
    let ok_rest = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if !ok_first || !ok_rest || name.len() > 63 {
        bail!("invalid table or column name {:?} (expected [a-z_][a-z0-9_]*)", name);
    }
    Ok(())
}

fn quote(ident: &str) -> String { format!("\"{}\"", ident.replace('"', "\"\"")) }

fn drop_sql(table: &str) -> String { format!("DROP TABLE IF EXISTS {}", quote(table)) }

fn create_sql(table: &str, columns: &[String]) -> String {
    let mut cols = vec![format!("{} BIGINT NOT NULL", quote(ORD_COLUMN))];
    cols.extend(columns.iter().map(|c| format!("{} TEXT", quote(c))));
    format!("CREATE TABLE {} ({})", quote(table), cols.join(", "))
}

fn insert_sql(table: &str, columns: &[String]) -> String {
    let names: Vec<String> = std::iter::once(ORD_COLUMN.to_string()).chain(columns.iter().cloned()).map(|c| quote(&c)).collect();
    let params: Vec<String> = (1..=names.len()).map(|i| format!("${i}")).collect();
    format!("INSERT INTO {} ({}) VALUES ({})", quote(table), names.join(", "), params.join(", "))
}

fn select_sql(table: &str, columns: &[String], ordered: bool) -> String {
    let cols: Vec<String> = columns.iter().map(|c| format!("{}::TEXT", quote(c))).collect();
    let order = if ordered { format!(" ORDER BY {}", quote(ORD_COLUMN)) } else { String::new() };
    format!("SELECT {} FROM {}{}", cols.join(", "), quote(table), order)
}

/// Drop and recreate `table`, then insert every row, in one transaction.
pub async fn replace_table(pool: &PgPool, table: &str, data: &Table) -> Result<u64> {
    validate_ident(table)?;
    for c in &data.header { validate_ident(c)?; }

    let mut tx = pool.begin().await?;
    sqlx::query(&drop_sql(table)).execute(&mut *tx).await?;
    sqlx::query(&create_sql(table, &data.header)).execute(&mut *tx).await
        .with_context(|| format!("creating table {table}"))?;

    let insert = insert_sql(table, &data.header);
    let mut written = 0u64;
    for (i, row) in data.rows.iter().enumerate() {
        let mut q = sqlx::query(&insert).bind(i as i64);
        for cell in row { q = q.bind(cell.as_deref()); }
        written += q.execute(&mut *tx).await?.rows_affected();
    }
    tx.commit().await?;
    Ok(written)
}

/// Read a whole table back as text, in insertion order when it has an `ord` column.
pub async fn read_table(pool: &PgPool, table: &str) -> Result<Table> {
    validate_ident(table)?;

    let columns: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT column_name::TEXT
        FROM information_schema.columns
        WHERE table_schema = current_schema() AND table_name = $1
        ORDER BY ordinal_position
        "#,
    )
    .bind(table)
    .fetch_all(pool)
    .await?;
    if columns.is_empty() { bail!("table {} does not exist or has no columns", table); }

    let ordered = columns.iter().any(|c| c == ORD_COLUMN);
    let header: Vec<String> = columns.into_iter().filter(|c| c != ORD_COLUMN).collect();

    let rows = sqlx::query(&select_sql(table, &header, ordered))
        .fetch_all(pool)
        .await
        .with_context(|| format!("reading table {table}"))?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let mut cells = Vec::with_capacity(header.len());
        for i in 0..header.len() { cells.push(row.try_get::<Option<String>, _>(i)?); }
        out.push(cells);
    }
    Ok(Table { header, rows: out })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols() -> Vec<String> { vec!["firm".into(), "company".into()] }

    #[test]
    fn identifiers() {
        assert!(validate_ident("space_capital").is_ok());
        assert!(validate_ident("_t1").is_ok());
        assert!(validate_ident("Space").is_err());
        assert!(validate_ident("1abc").is_err());
        assert!(validate_ident("a-b").is_err());
        assert!(validate_ident("x\"; DROP TABLE y; --").is_err());
        assert!(validate_ident("").is_err());
        assert!(validate_ident(&"a".repeat(64)).is_err());
    }

    #[test]
    fn create_statement() {
        assert_eq!(
            create_sql("space_capital", &cols()),
            r#"CREATE TABLE "space_capital" ("ord" BIGINT NOT NULL, "firm" TEXT, "company" TEXT)"#
        );
        assert_eq!(drop_sql("t"), r#"DROP TABLE IF EXISTS "t""#);
    }

    #[test]
    fn insert_statement_binds_ord_first() {
        assert_eq!(
            insert_sql("t", &cols()),
            r#"INSERT INTO "t" ("ord", "firm", "company") VALUES ($1, $2, $3)"#
        );
    }

    #[test]
    fn select_statement() {
        assert_eq!(select_sql("t", &cols(), true), r#"SELECT "firm"::TEXT, "company"::TEXT FROM "t" ORDER BY "ord""#);
        assert_eq!(select_sql("t", &cols(), false), r#"SELECT "firm"::TEXT, "company"::TEXT FROM "t""#);
    }
}
