use openledger_core::{ListParams, ListResult, ServiceError, new_id, now_rfc3339};
use openledger_sql::Value;

use crate::model::{Product, Template};
use super::AnalyticService;

impl AnalyticService {
    // ── Template ──

    pub fn create_template(&self, name: String) -> Result<Template, ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::Validation("template name is required".into()));
        }

        let now = now_rfc3339();
        let record = Template {
            id: new_id(),
            name: name.clone(),
            create_at: Some(now.clone()),
            update_at: Some(now.clone()),
        };

        self.insert_record("templates", &record.id, &record, &[
            ("name", Value::Text(name)),
            ("create_at", Value::Text(now.clone())),
            ("update_at", Value::Text(now)),
        ])?;

        Ok(record)
    }

    pub fn get_template(&self, id: &str) -> Result<Template, ServiceError> {
        self.get_record("templates", id)
    }

    pub fn list_templates(&self, params: &ListParams) -> Result<ListResult<Template>, ServiceError> {
        let limit = params.limit.min(500);
        self.list_records("templates", &[], limit, params.offset)
    }

    pub fn update_template(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<Template, ServiceError> {
        let current: Template = self.get_record("templates", id)?;
        let updated: Template = Self::apply_patch(&current, patch)?;

        self.update_record("templates", id, &updated, &[
            ("name", Value::Text(updated.name.clone())),
            ("update_at", Value::Text(updated.update_at.clone().unwrap_or_default())),
        ])?;

        Ok(updated)
    }

    /// Delete a template and cascade its analytic configuration rows
    /// and their entries.
    pub fn delete_template(&self, id: &str) -> Result<(), ServiceError> {
        self.sql
            .exec(
                "DELETE FROM analytic_entries
                 WHERE origin_kind = 'template_company'
                   AND origin_id IN (SELECT id FROM template_companies WHERE template = ?1)",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        self.sql
            .exec(
                "DELETE FROM template_companies WHERE template = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        self.delete_record("templates", id)
    }

    // ── Product ──

    pub fn create_product(
        &self,
        template: String,
        code: Option<String>,
    ) -> Result<Product, ServiceError> {
        self.get_template(&template)?;

        let now = now_rfc3339();
        let record = Product {
            id: new_id(),
            template: template.clone(),
            code,
            create_at: Some(now.clone()),
            update_at: Some(now.clone()),
        };

        let mut indexes: Vec<(&str, Value)> = vec![
            ("template", Value::Text(template)),
            ("create_at", Value::Text(now.clone())),
            ("update_at", Value::Text(now)),
        ];
        if let Some(ref code) = record.code {
            indexes.push(("code", Value::Text(code.clone())));
        }

        self.insert_record("products", &record.id, &record, &indexes)?;
        Ok(record)
    }

    pub fn get_product(&self, id: &str) -> Result<Product, ServiceError> {
        self.get_record("products", id)
    }

    pub fn list_products(
        &self,
        params: &ListParams,
        template: Option<&str>,
    ) -> Result<ListResult<Product>, ServiceError> {
        let limit = params.limit.min(500);
        let mut f: Vec<(&str, Value)> = Vec::new();
        if let Some(template) = template {
            f.push(("template", Value::Text(template.to_string())));
        }
        self.list_records("products", &f, limit, params.offset)
    }

    pub fn delete_product(&self, id: &str) -> Result<(), ServiceError> {
        self.delete_record("products", id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use openledger_core::ListParams;
    use openledger_sql::SqliteStore;

    use super::AnalyticService;

    fn test_service() -> AnalyticService {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        AnalyticService::new(sql).unwrap()
    }

    #[test]
    fn test_template_and_product() {
        let svc = test_service();

        let t = svc.create_template("Widget".into()).unwrap();
        let p = svc.create_product(t.id.clone(), Some("WID-1".into())).unwrap();
        assert_eq!(p.template, t.id);

        let by_template = svc
            .list_products(&ListParams::default(), Some(&t.id))
            .unwrap();
        assert_eq!(by_template.total, 1);

        // Product creation requires an existing template.
        assert!(svc.create_product("missing".into(), None).is_err());
    }
}
