use openledger_core::ServiceError;
use openledger_sql::SQLStore;

/// SQL DDL to initialize the analytic module schema.
///
/// Each table stores the full JSON document in a `data` TEXT column,
/// with indexed columns extracted for filtering and uniqueness.
///
/// Databases written by the previous schema generation differ in two
/// places: `templates` still carries an `analytic_accounts` column and
/// `analytic_entries` a `selection` column but no origin columns. The
/// migration (see `migration.rs`) reshapes them; `CREATE TABLE IF NOT
/// EXISTS` leaves them alone here.
const TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS companies (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS analytic_accounts (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT,
        kind TEXT,
        root TEXT,
        company TEXT,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS templates (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS products (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        code TEXT,
        template TEXT,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS template_companies (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        template TEXT,
        company TEXT,
        created_by TEXT,
        create_at TEXT,
        update_at TEXT,
        UNIQUE(template, company)
    )",
    "CREATE TABLE IF NOT EXISTS analytic_entries (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        root TEXT,
        account TEXT,
        origin_kind TEXT,
        origin_id TEXT,
        created_by TEXT,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS invoices (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        company TEXT,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS invoice_lines (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        invoice TEXT,
        product TEXT,
        company TEXT,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS sales (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        company TEXT,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS sale_lines (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        sale TEXT,
        product TEXT,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS purchases (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        company TEXT,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS purchase_lines (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        purchase TEXT,
        product TEXT,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS purchase_requests (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        company TEXT,
        product TEXT,
        state TEXT,
        create_at TEXT,
        update_at TEXT
    )",
];

/// Indexes are installed after the migration: on legacy databases the
/// entry origin columns only exist once it has run.
const INDEXES: &[&str] = &[
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_entry_origin_root
        ON analytic_entries(origin_kind, origin_id, root)",
    "CREATE INDEX IF NOT EXISTS idx_entry_origin ON analytic_entries(origin_kind, origin_id)",
    "CREATE INDEX IF NOT EXISTS idx_acct_kind ON analytic_accounts(kind)",
    "CREATE INDEX IF NOT EXISTS idx_acct_root ON analytic_accounts(root)",
    "CREATE INDEX IF NOT EXISTS idx_acct_company ON analytic_accounts(company)",
    "CREATE INDEX IF NOT EXISTS idx_product_template ON products(template)",
    "CREATE INDEX IF NOT EXISTS idx_tc_template ON template_companies(template)",
    "CREATE INDEX IF NOT EXISTS idx_tc_company ON template_companies(company)",
    "CREATE INDEX IF NOT EXISTS idx_invline_invoice ON invoice_lines(invoice)",
    "CREATE INDEX IF NOT EXISTS idx_saleline_sale ON sale_lines(sale)",
    "CREATE INDEX IF NOT EXISTS idx_purchline_purchase ON purchase_lines(purchase)",
    "CREATE INDEX IF NOT EXISTS idx_req_state ON purchase_requests(state)",
];

pub fn init_tables(sql: &dyn SQLStore) -> Result<(), ServiceError> {
    for stmt in TABLES {
        sql.exec(stmt, &[])
            .map_err(|e| ServiceError::Storage(format!("schema init failed: {}", e)))?;
    }
    Ok(())
}

pub fn init_indexes(sql: &dyn SQLStore) -> Result<(), ServiceError> {
    for stmt in INDEXES {
        sql.exec(stmt, &[])
            .map_err(|e| ServiceError::Storage(format!("schema init failed: {}", e)))?;
    }
    Ok(())
}
