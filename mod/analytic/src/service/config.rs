use std::collections::BTreeMap;

use openledger_core::{ListParams, ListResult, ServiceError, new_id, now_rfc3339};
use openledger_sql::Value;

use crate::model::{AnalyticEntry, EntryOrigin, TemplateCompany};
use super::{AnalyticService, OperatingContext};

impl AnalyticService {
    /// Create the analytic configuration row for (template, company).
    /// The company defaults to the operating context's. A second row
    /// for the same pair fails with a Conflict.
    pub fn create_template_company(
        &self,
        template: String,
        company: Option<String>,
        ctx: &OperatingContext,
    ) -> Result<TemplateCompany, ServiceError> {
        let company = company.or_else(|| ctx.company.clone()).ok_or_else(|| {
            ServiceError::Validation("company is required (explicitly or via context)".into())
        })?;
        self.get_template(&template)?;
        self.get_company(&company)?;

        let now = now_rfc3339();
        let record = TemplateCompany {
            id: new_id(),
            template: template.clone(),
            company: company.clone(),
            created_by: None,
            create_at: Some(now.clone()),
            update_at: Some(now.clone()),
        };

        self.insert_record("template_companies", &record.id, &record, &[
            ("template", Value::Text(template)),
            ("company", Value::Text(company)),
            ("create_at", Value::Text(now.clone())),
            ("update_at", Value::Text(now)),
        ])?;

        Ok(record)
    }

    pub fn get_template_company(&self, id: &str) -> Result<TemplateCompany, ServiceError> {
        self.get_record("template_companies", id)
    }

    pub fn list_template_companies(
        &self,
        params: &ListParams,
        template: Option<&str>,
        company: Option<&str>,
    ) -> Result<ListResult<TemplateCompany>, ServiceError> {
        let limit = params.limit.min(500);
        let mut f: Vec<(&str, Value)> = Vec::new();
        if let Some(template) = template {
            f.push(("template", Value::Text(template.to_string())));
        }
        if let Some(company) = company {
            f.push(("company", Value::Text(company.to_string())));
        }
        self.list_records("template_companies", &f, limit, params.offset)
    }

    /// Delete a configuration row and its entries.
    pub fn delete_template_company(&self, id: &str) -> Result<(), ServiceError> {
        self.delete_entries_for_origin(&EntryOrigin::TemplateCompany(id.to_string()))?;
        self.delete_record("template_companies", id)
    }

    /// The root→account map configured for (template, company),
    /// restricted to entries whose account is set. Empty when no
    /// configuration row exists.
    pub fn config_accounts(
        &self,
        template: &str,
        company: &str,
    ) -> Result<BTreeMap<String, String>, ServiceError> {
        let rows = self.sql
            .query(
                "SELECT e.root AS root, e.account AS account
                 FROM analytic_entries e
                 JOIN template_companies tc
                   ON e.origin_kind = 'template_company' AND e.origin_id = tc.id
                 WHERE tc.template = ?1 AND tc.company = ?2 AND e.account IS NOT NULL",
                &[
                    Value::Text(template.to_string()),
                    Value::Text(company.to_string()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut map = BTreeMap::new();
        for row in &rows {
            if let (Some(root), Some(account)) = (row.get_str("root"), row.get_str("account")) {
                map.insert(root.to_string(), account.to_string());
            }
        }
        Ok(map)
    }

    /// Read a configuration row's accounts map.
    pub fn template_company_accounts(
        &self,
        id: &str,
    ) -> Result<BTreeMap<String, String>, ServiceError> {
        let _config: TemplateCompany = self.get_record("template_companies", id)?;
        self.accounts_by_root(&EntryOrigin::TemplateCompany(id.to_string()))
    }

    /// Write a configuration row's accounts as a keyed map (null
    /// removes the root's entry).
    pub fn set_template_company_accounts(
        &self,
        id: &str,
        accounts: &BTreeMap<String, Option<String>>,
    ) -> Result<Vec<AnalyticEntry>, ServiceError> {
        let _config: TemplateCompany = self.get_record("template_companies", id)?;
        self.set_origin_accounts(&EntryOrigin::TemplateCompany(id.to_string()), accounts)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use openledger_core::{ListParams, ServiceError};
    use openledger_sql::SqliteStore;

    use crate::model::AccountKind;
    use crate::service::account::CreateAccountInput;
    use super::{AnalyticService, OperatingContext};

    fn test_service() -> AnalyticService {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        AnalyticService::new(sql).unwrap()
    }

    fn root_with_leaf(svc: &AnalyticService, root_name: &str, leaf_name: &str) -> (String, String) {
        let root = svc
            .create_account(CreateAccountInput {
                name: root_name.into(),
                kind: AccountKind::Root,
                root: None,
                parent: None,
                company: None,
            })
            .unwrap();
        let leaf = svc
            .create_account(CreateAccountInput {
                name: leaf_name.into(),
                kind: AccountKind::Normal,
                root: Some(root.id.clone()),
                parent: Some(root.id.clone()),
                company: None,
            })
            .unwrap();
        (root.id, leaf.id)
    }

    #[test]
    fn test_unique_per_template_company() {
        let svc = test_service();
        let company = svc.create_company("Acme".into(), None).unwrap();
        let template = svc.create_template("Widget".into()).unwrap();

        svc.create_template_company(
            template.id.clone(),
            Some(company.id.clone()),
            &OperatingContext::default(),
        )
        .unwrap();

        let err = svc
            .create_template_company(
                template.id.clone(),
                Some(company.id.clone()),
                &OperatingContext::default(),
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn test_company_defaults_from_context() {
        let svc = test_service();
        let company = svc.create_company("Acme".into(), None).unwrap();
        let template = svc.create_template("Widget".into()).unwrap();

        // No explicit company, no context: validation error.
        let err = svc
            .create_template_company(template.id.clone(), None, &OperatingContext::default())
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let ctx = OperatingContext {
            company: Some(company.id.clone()),
        };
        let config = svc
            .create_template_company(template.id.clone(), None, &ctx)
            .unwrap();
        assert_eq!(config.company, company.id);
    }

    #[test]
    fn test_accounts_map_write_and_null_removal() {
        let svc = test_service();
        let company = svc.create_company("Acme".into(), None).unwrap();
        let template = svc.create_template("Widget".into()).unwrap();
        let (root_a, leaf_a) = root_with_leaf(&svc, "Projects", "Project X");
        let (root_b, leaf_b) = root_with_leaf(&svc, "Regions", "EMEA");

        let config = svc
            .create_template_company(
                template.id.clone(),
                Some(company.id.clone()),
                &OperatingContext::default(),
            )
            .unwrap();

        let mut map = BTreeMap::new();
        map.insert(root_a.clone(), Some(leaf_a.clone()));
        map.insert(root_b.clone(), Some(leaf_b.clone()));
        let entries = svc.set_template_company_accounts(&config.id, &map).unwrap();
        assert_eq!(entries.len(), 2);

        let accounts = svc.template_company_accounts(&config.id).unwrap();
        assert_eq!(accounts.get(&root_a), Some(&leaf_a));
        assert_eq!(accounts.get(&root_b), Some(&leaf_b));
        assert_eq!(
            svc.config_accounts(&template.id, &company.id).unwrap(),
            accounts
        );

        // Null removes one root's entry, the other survives.
        let mut removal = BTreeMap::new();
        removal.insert(root_a.clone(), None);
        let entries = svc
            .set_template_company_accounts(&config.id, &removal)
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].root, root_b);

        // An account from the wrong root is rejected.
        let mut wrong = BTreeMap::new();
        wrong.insert(root_a.clone(), Some(leaf_b.clone()));
        let err = svc
            .set_template_company_accounts(&config.id, &wrong)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn test_delete_leaves_other_companies_alone() {
        let svc = test_service();
        let c1 = svc.create_company("One".into(), None).unwrap();
        let c2 = svc.create_company("Two".into(), None).unwrap();
        let template = svc.create_template("Widget".into()).unwrap();
        let (root, leaf) = root_with_leaf(&svc, "Projects", "Project X");

        let cfg1 = svc
            .create_template_company(
                template.id.clone(),
                Some(c1.id.clone()),
                &OperatingContext::default(),
            )
            .unwrap();
        let cfg2 = svc
            .create_template_company(
                template.id.clone(),
                Some(c2.id.clone()),
                &OperatingContext::default(),
            )
            .unwrap();

        let map = BTreeMap::from([(root.clone(), Some(leaf.clone()))]);
        svc.set_template_company_accounts(&cfg1.id, &map).unwrap();
        svc.set_template_company_accounts(&cfg2.id, &map).unwrap();

        svc.delete_template_company(&cfg1.id).unwrap();

        assert!(svc.get_template_company(&cfg1.id).is_err());
        assert!(svc.config_accounts(&template.id, &c1.id).unwrap().is_empty());

        // Company 2's configuration is untouched.
        let second = svc.config_accounts(&template.id, &c2.id).unwrap();
        assert_eq!(second.get(&root), Some(&leaf));

        let list = svc
            .list_template_companies(&ListParams::default(), Some(&template.id), None)
            .unwrap();
        assert_eq!(list.total, 1);
        assert_eq!(list.items[0].id, cfg2.id);
    }
}
