use openledger_core::{ListParams, ListResult, ServiceError, new_id, now_rfc3339};
use openledger_sql::Value;

use crate::model::Company;
use super::AnalyticService;

impl AnalyticService {
    pub fn create_company(
        &self,
        name: String,
        currency: Option<String>,
    ) -> Result<Company, ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::Validation("company name is required".into()));
        }

        let now = now_rfc3339();
        let record = Company {
            id: new_id(),
            name: name.clone(),
            currency,
            create_at: Some(now.clone()),
            update_at: Some(now.clone()),
        };

        self.insert_record("companies", &record.id, &record, &[
            ("name", Value::Text(name)),
            ("create_at", Value::Text(now.clone())),
            ("update_at", Value::Text(now)),
        ])?;

        Ok(record)
    }

    pub fn get_company(&self, id: &str) -> Result<Company, ServiceError> {
        self.get_record("companies", id)
    }

    pub fn list_companies(&self, params: &ListParams) -> Result<ListResult<Company>, ServiceError> {
        let limit = params.limit.min(500);
        self.list_records("companies", &[], limit, params.offset)
    }

    pub fn update_company(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<Company, ServiceError> {
        let current: Company = self.get_record("companies", id)?;
        let updated: Company = Self::apply_patch(&current, patch)?;

        self.update_record("companies", id, &updated, &[
            ("name", Value::Text(updated.name.clone())),
            ("update_at", Value::Text(updated.update_at.clone().unwrap_or_default())),
        ])?;

        Ok(updated)
    }

    /// Delete a company and cascade its analytic configuration: every
    /// template_companies row for it goes, along with the rows' entries.
    pub fn delete_company(&self, id: &str) -> Result<(), ServiceError> {
        self.sql
            .exec(
                "DELETE FROM analytic_entries
                 WHERE origin_kind = 'template_company'
                   AND origin_id IN (SELECT id FROM template_companies WHERE company = ?1)",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        self.sql
            .exec(
                "DELETE FROM template_companies WHERE company = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        self.delete_record("companies", id)
    }

    /// The deterministic process-wide default company: lowest id.
    pub fn default_company(&self) -> Result<Option<Company>, ServiceError> {
        let rows = self.sql
            .query("SELECT data FROM companies ORDER BY id LIMIT 1", &[])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let Some(row) = rows.first() else {
            return Ok(None);
        };
        let data = row.get_str("data")
            .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
        let company =
            serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(Some(company))
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
    fn test_company_crud() {
        let svc = test_service();

        let c = svc.create_company("Acme".into(), Some("USD".into())).unwrap();
        assert_eq!(c.name, "Acme");

        let fetched = svc.get_company(&c.id).unwrap();
        assert_eq!(fetched.currency, Some("USD".into()));

        let updated = svc
            .update_company(&c.id, serde_json::json!({"name": "Acme Corp"}))
            .unwrap();
        assert_eq!(updated.name, "Acme Corp");
        assert_eq!(updated.id, c.id);

        let list = svc.list_companies(&ListParams::default()).unwrap();
        assert_eq!(list.total, 1);

        svc.delete_company(&c.id).unwrap();
        assert!(svc.get_company(&c.id).is_err());
    }

    #[test]
    fn test_default_company_is_lowest_id() {
        let svc = test_service();
        assert!(svc.default_company().unwrap().is_none());

        let a = svc.create_company("A".into(), None).unwrap();
        let b = svc.create_company("B".into(), None).unwrap();

        let expect = if a.id < b.id { &a } else { &b };
        let def = svc.default_company().unwrap().unwrap();
        assert_eq!(def.id, expect.id);
    }
}
