use openledger_core::{ServiceError, new_id, now_rfc3339};
use openledger_sql::{SQLStore, Value};
use tracing::info;

use crate::model::TemplateCompany;

/// One-time migration from the schema generation that stored a single
/// analytic selection per template.
///
/// Old databases carry an `analytic_accounts` column on `templates`
/// pointing at a selection, and entries that reference that selection
/// through a `selection` column instead of an origin. The migration
/// creates one template_companies row per distinct (template, effective
/// account company) with the earliest contributing entry as provenance,
/// re-points the migrated entries, and drops the legacy column.
///
/// The column-existence check is the sole idempotence guard: once the
/// column is gone the migration never runs again.
pub fn run(sql: &dyn SQLStore) -> Result<(), ServiceError> {
    if !column_exists(sql, "templates", "analytic_accounts")? {
        return Ok(());
    }
    info!("migrating legacy analytic configuration to per-company rows");

    // Old databases predate the entry origin columns.
    for col in ["origin_kind", "origin_id"] {
        if !column_exists(sql, "analytic_entries", col)? {
            sql.exec(
                &format!("ALTER TABLE analytic_entries ADD COLUMN {} TEXT", col),
                &[],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        }
    }

    // Accounts without a company of their own fall to the deterministic
    // default: the company with the lowest id.
    let rows = sql
        .query("SELECT id FROM companies ORDER BY id LIMIT 1", &[])
        .map_err(|e| ServiceError::Storage(e.to_string()))?;
    let default_company = match rows.first().and_then(|r| r.get_str("id")) {
        Some(id) => Value::Text(id.to_string()),
        None => Value::Null,
    };

    let groups = sql
        .query(
            "SELECT t.id AS template,
                    COALESCE(a.company, ?1) AS company,
                    MIN(e.created_by) AS created_by,
                    MIN(e.create_at) AS create_at
             FROM templates t
             JOIN analytic_entries e ON e.selection = t.analytic_accounts
             JOIN analytic_accounts a ON a.id = e.account
             WHERE t.analytic_accounts IS NOT NULL
             GROUP BY t.id, COALESCE(a.company, ?1)",
            &[default_company.clone()],
        )
        .map_err(|e| ServiceError::Storage(e.to_string()))?;

    for group in &groups {
        let template = group.get_str("template")
            .ok_or_else(|| ServiceError::Internal("migration group without template".into()))?
            .to_string();
        let company = group.get_str("company")
            .ok_or_else(|| {
                ServiceError::Internal(
                    "legacy analytic migration requires at least one company".into(),
                )
            })?
            .to_string();
        let created_by = group.get_str("created_by").map(String::from);
        let now = now_rfc3339();
        let create_at = group.get_str("create_at").map(String::from)
            .unwrap_or_else(|| now.clone());

        let record = TemplateCompany {
            id: new_id(),
            template: template.clone(),
            company: company.clone(),
            created_by: created_by.clone(),
            create_at: Some(create_at.clone()),
            update_at: Some(now.clone()),
        };
        let data = serde_json::to_string(&record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        sql.exec(
            "INSERT INTO template_companies
                (id, data, template, company, created_by, create_at, update_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            &[
                Value::Text(record.id.clone()),
                Value::Text(data),
                Value::Text(template.clone()),
                Value::Text(company.clone()),
                match created_by {
                    Some(u) => Value::Text(u),
                    None => Value::Null,
                },
                Value::Text(create_at),
                Value::Text(now),
            ],
        )
        .map_err(|e| ServiceError::Storage(e.to_string()))?;

        repoint_entries(sql, &template, &company, &default_company, &record.id)?;
    }

    sql.exec("ALTER TABLE templates DROP COLUMN analytic_accounts", &[])
        .map_err(|e| ServiceError::Storage(e.to_string()))?;

    info!(groups = groups.len(), "legacy analytic configuration migrated");
    Ok(())
}

/// Point every entry contributing to (template, company) at the new
/// configuration row. The entry documents predate the origin field, so
/// each JSON doc is rewritten alongside the indexed columns.
fn repoint_entries(
    sql: &dyn SQLStore,
    template: &str,
    company: &str,
    default_company: &Value,
    config_id: &str,
) -> Result<(), ServiceError> {
    let entries = sql
        .query(
            "SELECT e.id AS id, e.data AS data
             FROM analytic_entries e
             JOIN templates t ON e.selection = t.analytic_accounts
             JOIN analytic_accounts a ON a.id = e.account
             WHERE t.id = ?1 AND COALESCE(a.company, ?2) = ?3",
            &[
                Value::Text(template.to_string()),
                default_company.clone(),
                Value::Text(company.to_string()),
            ],
        )
        .map_err(|e| ServiceError::Storage(e.to_string()))?;

    for entry in &entries {
        let id = entry.get_str("id")
            .ok_or_else(|| ServiceError::Internal("entry row without id".into()))?;
        let data = entry.get_str("data")
            .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
        let mut doc: serde_json::Value =
            serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))?;

        if let Some(obj) = doc.as_object_mut() {
            obj.insert(
                "origin".into(),
                serde_json::json!({"kind": "template_company", "id": config_id}),
            );
            obj.remove("selection");
        }
        let data = serde_json::to_string(&doc)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        sql.exec(
            "UPDATE analytic_entries
             SET data = ?1, origin_kind = 'template_company', origin_id = ?2
             WHERE id = ?3",
            &[
                Value::Text(data),
                Value::Text(config_id.to_string()),
                Value::Text(id.to_string()),
            ],
        )
        .map_err(|e| ServiceError::Storage(e.to_string()))?;
    }
    Ok(())
}

fn column_exists(sql: &dyn SQLStore, table: &str, column: &str) -> Result<bool, ServiceError> {
    let rows = sql
        .query(&format!("PRAGMA table_info({})", table), &[])
        .map_err(|e| ServiceError::Storage(e.to_string()))?;
    Ok(rows.iter().any(|r| r.get_str("name") == Some(column)))
}
