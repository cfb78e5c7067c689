use openledger_core::{ListParams, ListResult, ServiceError, new_id, now_rfc3339};
use openledger_sql::Value;

use crate::model::{EntryOrigin, Sale, SaleLine};
use super::AnalyticService;
use super::entry::LineDetail;

impl AnalyticService {
    // ── Sale ──

    pub fn create_sale(
        &self,
        company: String,
        party: Option<String>,
    ) -> Result<Sale, ServiceError> {
        self.get_company(&company)?;

        let now = now_rfc3339();
        let record = Sale {
            id: new_id(),
            company: company.clone(),
            party,
            create_at: Some(now.clone()),
            update_at: Some(now.clone()),
        };

        self.insert_record("sales", &record.id, &record, &[
            ("company", Value::Text(company)),
            ("create_at", Value::Text(now.clone())),
            ("update_at", Value::Text(now)),
        ])?;

        Ok(record)
    }

    pub fn get_sale(&self, id: &str) -> Result<Sale, ServiceError> {
        self.get_record("sales", id)
    }

    pub fn list_sales(
        &self,
        params: &ListParams,
        company: Option<&str>,
    ) -> Result<ListResult<Sale>, ServiceError> {
        let limit = params.limit.min(500);
        let mut f: Vec<(&str, Value)> = Vec::new();
        if let Some(company) = company {
            f.push(("company", Value::Text(company.to_string())));
        }
        self.list_records("sales", &f, limit, params.offset)
    }

    pub fn update_sale(&self, id: &str, patch: serde_json::Value) -> Result<Sale, ServiceError> {
        let current: Sale = self.get_record("sales", id)?;
        let updated: Sale = Self::apply_patch(&current, patch)?;
        self.get_company(&updated.company)?;

        self.update_record("sales", id, &updated, &[
            ("company", Value::Text(updated.company.clone())),
            ("update_at", Value::Text(updated.update_at.clone().unwrap_or_default())),
        ])?;

        Ok(updated)
    }

    // ── Sale line ──

    pub fn create_sale_line(
        &self,
        sale: String,
        product: Option<String>,
        quantity: f64,
    ) -> Result<LineDetail<SaleLine>, ServiceError> {
        self.get_sale(&sale)?;
        if let Some(ref product) = product {
            self.get_product(product)?;
        }

        let now = now_rfc3339();
        let record = SaleLine {
            id: new_id(),
            sale: sale.clone(),
            product,
            quantity,
            create_at: Some(now.clone()),
            update_at: Some(now.clone()),
        };

        let mut indexes: Vec<(&str, Value)> = vec![
            ("sale", Value::Text(sale)),
            ("create_at", Value::Text(now.clone())),
            ("update_at", Value::Text(now)),
        ];
        if let Some(ref product) = record.product {
            indexes.push(("product", Value::Text(product.clone())));
        }

        self.insert_record("sale_lines", &record.id, &record, &indexes)?;

        self.propagate_sale_line(&record)?;
        self.get_sale_line(&record.id)
    }

    pub fn get_sale_line(&self, id: &str) -> Result<LineDetail<SaleLine>, ServiceError> {
        let line: SaleLine = self.get_record("sale_lines", id)?;
        let origin = EntryOrigin::SaleLine(id.to_string());
        let entries = self.entries_for_origin(&origin)?;
        let accounts_by_root = entries
            .iter()
            .filter_map(|e| e.account.clone().map(|a| (e.root.clone(), a)))
            .collect();
        Ok(LineDetail {
            line,
            entries,
            accounts_by_root,
        })
    }

    pub fn list_sale_lines(
        &self,
        params: &ListParams,
        sale: Option<&str>,
    ) -> Result<ListResult<SaleLine>, ServiceError> {
        let limit = params.limit.min(500);
        let mut f: Vec<(&str, Value)> = Vec::new();
        if let Some(sale) = sale {
            f.push(("sale", Value::Text(sale.to_string())));
        }
        self.list_records("sale_lines", &f, limit, params.offset)
    }

    /// Select (or clear) the line's product and propagate the product's
    /// configured analytic accounts onto the line.
    pub fn select_sale_line_product(
        &self,
        id: &str,
        product: Option<String>,
    ) -> Result<LineDetail<SaleLine>, ServiceError> {
        let mut line: SaleLine = self.get_record("sale_lines", id)?;
        if let Some(ref product) = product {
            self.get_product(product)?;
        }

        let now = now_rfc3339();
        line.product = product;
        line.update_at = Some(now.clone());

        let product_col = match line.product {
            Some(ref product) => Value::Text(product.clone()),
            None => Value::Null,
        };
        self.update_record("sale_lines", id, &line, &[
            ("product", product_col),
            ("update_at", Value::Text(now)),
        ])?;

        self.propagate_sale_line(&line)?;
        self.get_sale_line(id)
    }

    /// Propagation for sale lines: the parent sale's company resolves
    /// the configuration.
    fn propagate_sale_line(&self, line: &SaleLine) -> Result<(), ServiceError> {
        let Some(ref product_id) = line.product else {
            return Ok(());
        };
        let product = self.get_product(product_id)?;
        let sale: Sale = self.get_record("sales", &line.sale)?;

        let root2account = self.config_accounts(&product.template, &sale.company)?;
        self.apply_product_accounts(&EntryOrigin::SaleLine(line.id.clone()), &root2account)
    }

    pub fn set_sale_line_accounts(
        &self,
        id: &str,
        accounts: &std::collections::BTreeMap<String, Option<String>>,
    ) -> Result<LineDetail<SaleLine>, ServiceError> {
        let _line: SaleLine = self.get_record("sale_lines", id)?;
        self.set_origin_accounts(&EntryOrigin::SaleLine(id.to_string()), accounts)?;
        self.get_sale_line(id)
    }

    pub fn delete_sale_line(&self, id: &str) -> Result<(), ServiceError> {
        self.delete_entries_for_origin(&EntryOrigin::SaleLine(id.to_string()))?;
        self.delete_record("sale_lines", id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use openledger_sql::SqliteStore;

    use crate::model::AccountKind;
    use crate::service::account::CreateAccountInput;
    use crate::service::{AnalyticService, OperatingContext};

    fn test_service() -> AnalyticService {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        AnalyticService::new(sql).unwrap()
    }

    struct Fixture {
        company1: String,
        company2: String,
        product: String,
        root_a: String,
        account_a1: String,
    }

    /// Product P configured {root A → account A1} for company 1 only.
    fn fixture(svc: &AnalyticService) -> Fixture {
        let c1 = svc.create_company("One".into(), None).unwrap();
        let c2 = svc.create_company("Two".into(), None).unwrap();
        let template = svc.create_template("Widget".into()).unwrap();
        let product = svc.create_product(template.id.clone(), None).unwrap();

        let root = svc
            .create_account(CreateAccountInput {
                name: "A".into(),
                kind: AccountKind::Root,
                root: None,
                parent: None,
                company: None,
            })
            .unwrap();
        let a1 = svc
            .create_account(CreateAccountInput {
                name: "A1".into(),
                kind: AccountKind::Normal,
                root: Some(root.id.clone()),
                parent: Some(root.id.clone()),
                company: None,
            })
            .unwrap();

        let cfg = svc
            .create_template_company(
                template.id.clone(),
                Some(c1.id.clone()),
                &OperatingContext::default(),
            )
            .unwrap();
        let map = BTreeMap::from([(root.id.clone(), Some(a1.id.clone()))]);
        svc.set_template_company_accounts(&cfg.id, &map).unwrap();

        Fixture {
            company1: c1.id,
            company2: c2.id,
            product: product.id,
            root_a: root.id,
            account_a1: a1.id,
        }
    }

    #[test]
    fn test_selection_populates_configured_accounts() {
        let svc = test_service();
        let fx = fixture(&svc);

        let sale = svc.create_sale(fx.company1.clone(), None).unwrap();
        let line = svc
            .create_sale_line(sale.id, Some(fx.product.clone()), 2.0)
            .unwrap();

        assert_eq!(line.entries.len(), 1);
        assert_eq!(line.accounts_by_root.get(&fx.root_a), Some(&fx.account_a1));
    }

    #[test]
    fn test_reselect_is_idempotent() {
        let svc = test_service();
        let fx = fixture(&svc);

        let sale = svc.create_sale(fx.company1.clone(), None).unwrap();
        let line = svc
            .create_sale_line(sale.id, Some(fx.product.clone()), 2.0)
            .unwrap();
        let first = line.entries.clone();

        let again = svc
            .select_sale_line_product(&line.line.id, Some(fx.product.clone()))
            .unwrap();
        assert_eq!(again.entries.len(), first.len());
        assert_eq!(again.entries[0].id, first[0].id);
        assert_eq!(again.entries[0].account, first[0].account);
    }

    #[test]
    fn test_preserves_entries_for_other_roots() {
        let svc = test_service();
        let fx = fixture(&svc);

        // A second root, manually set on the line, not in P's config.
        let root_b = svc
            .create_account(CreateAccountInput {
                name: "B".into(),
                kind: AccountKind::Root,
                root: None,
                parent: None,
                company: None,
            })
            .unwrap();
        let b1 = svc
            .create_account(CreateAccountInput {
                name: "B1".into(),
                kind: AccountKind::Normal,
                root: Some(root_b.id.clone()),
                parent: Some(root_b.id.clone()),
                company: None,
            })
            .unwrap();

        let sale = svc.create_sale(fx.company1.clone(), None).unwrap();
        let line = svc.create_sale_line(sale.id, None, 1.0).unwrap();
        let manual = BTreeMap::from([(root_b.id.clone(), Some(b1.id.clone()))]);
        svc.set_sale_line_accounts(&line.line.id, &manual).unwrap();

        let line = svc
            .select_sale_line_product(&line.line.id, Some(fx.product.clone()))
            .unwrap();

        // Both the manual root B entry and the propagated root A entry.
        assert_eq!(line.entries.len(), 2);
        assert_eq!(line.accounts_by_root.get(&fx.root_a), Some(&fx.account_a1));
        assert_eq!(line.accounts_by_root.get(&root_b.id), Some(&b1.id));
    }

    #[test]
    fn test_reselect_under_unconfigured_company_is_noop() {
        let svc = test_service();
        let fx = fixture(&svc);

        let sale = svc.create_sale(fx.company1.clone(), None).unwrap();
        let line = svc
            .create_sale_line(sale.id.clone(), Some(fx.product.clone()), 1.0)
            .unwrap();
        assert_eq!(line.accounts_by_root.get(&fx.root_a), Some(&fx.account_a1));

        // Move the sale to company 2, which has no configuration, and
        // re-select: the line's entries stay as they were.
        svc.update_sale(&sale.id, serde_json::json!({"company": fx.company2}))
            .unwrap();
        let line = svc
            .select_sale_line_product(&line.line.id, Some(fx.product.clone()))
            .unwrap();

        assert_eq!(line.entries.len(), 1);
        assert_eq!(line.accounts_by_root.get(&fx.root_a), Some(&fx.account_a1));
    }
}
