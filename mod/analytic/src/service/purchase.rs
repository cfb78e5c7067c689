use openledger_core::{ListParams, ListResult, ServiceError, new_id, now_rfc3339};
use openledger_sql::Value;

use crate::model::{EntryOrigin, Purchase, PurchaseLine, PurchaseRequest, RequestState};
use super::AnalyticService;
use super::entry::LineDetail;

impl AnalyticService {
    // ── Purchase ──

    pub fn create_purchase(
        &self,
        company: String,
        party: Option<String>,
    ) -> Result<Purchase, ServiceError> {
        self.get_company(&company)?;
        self.insert_purchase(company, party)
    }

    fn insert_purchase(
        &self,
        company: String,
        party: Option<String>,
    ) -> Result<Purchase, ServiceError> {
        let now = now_rfc3339();
        let record = Purchase {
            id: new_id(),
            company: company.clone(),
            party,
            create_at: Some(now.clone()),
            update_at: Some(now.clone()),
        };

        self.insert_record("purchases", &record.id, &record, &[
            ("company", Value::Text(company)),
            ("create_at", Value::Text(now.clone())),
            ("update_at", Value::Text(now)),
        ])?;

        Ok(record)
    }

    pub fn get_purchase(&self, id: &str) -> Result<Purchase, ServiceError> {
        self.get_record("purchases", id)
    }

    pub fn list_purchases(
        &self,
        params: &ListParams,
        company: Option<&str>,
    ) -> Result<ListResult<Purchase>, ServiceError> {
        let limit = params.limit.min(500);
        let mut f: Vec<(&str, Value)> = Vec::new();
        if let Some(company) = company {
            f.push(("company", Value::Text(company.to_string())));
        }
        self.list_records("purchases", &f, limit, params.offset)
    }

    pub fn update_purchase(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<Purchase, ServiceError> {
        let current: Purchase = self.get_record("purchases", id)?;
        let updated: Purchase = Self::apply_patch(&current, patch)?;
        self.get_company(&updated.company)?;

        self.update_record("purchases", id, &updated, &[
            ("company", Value::Text(updated.company.clone())),
            ("update_at", Value::Text(updated.update_at.clone().unwrap_or_default())),
        ])?;

        Ok(updated)
    }

    // ── Purchase line ──

    pub fn create_purchase_line(
        &self,
        purchase: String,
        product: Option<String>,
        quantity: f64,
    ) -> Result<LineDetail<PurchaseLine>, ServiceError> {
        self.get_purchase(&purchase)?;
        if let Some(ref product) = product {
            self.get_product(product)?;
        }

        let record = self.insert_purchase_line(purchase, product, quantity)?;
        self.propagate_purchase_line(&record)?;
        self.get_purchase_line(&record.id)
    }

    fn insert_purchase_line(
        &self,
        purchase: String,
        product: Option<String>,
        quantity: f64,
    ) -> Result<PurchaseLine, ServiceError> {
        let now = now_rfc3339();
        let record = PurchaseLine {
            id: new_id(),
            purchase: purchase.clone(),
            product,
            quantity,
            create_at: Some(now.clone()),
            update_at: Some(now.clone()),
        };

        let mut indexes: Vec<(&str, Value)> = vec![
            ("purchase", Value::Text(purchase)),
            ("create_at", Value::Text(now.clone())),
            ("update_at", Value::Text(now)),
        ];
        if let Some(ref product) = record.product {
            indexes.push(("product", Value::Text(product.clone())));
        }

        self.insert_record("purchase_lines", &record.id, &record, &indexes)?;
        Ok(record)
    }

    pub fn get_purchase_line(&self, id: &str) -> Result<LineDetail<PurchaseLine>, ServiceError> {
        let line: PurchaseLine = self.get_record("purchase_lines", id)?;
        let origin = EntryOrigin::PurchaseLine(id.to_string());
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

    pub fn list_purchase_lines(
        &self,
        params: &ListParams,
        purchase: Option<&str>,
    ) -> Result<ListResult<PurchaseLine>, ServiceError> {
        let limit = params.limit.min(500);
        let mut f: Vec<(&str, Value)> = Vec::new();
        if let Some(purchase) = purchase {
            f.push(("purchase", Value::Text(purchase.to_string())));
        }
        self.list_records("purchase_lines", &f, limit, params.offset)
    }

    /// Select (or clear) the line's product and propagate the product's
    /// configured analytic accounts onto the line.
    pub fn select_purchase_line_product(
        &self,
        id: &str,
        product: Option<String>,
    ) -> Result<LineDetail<PurchaseLine>, ServiceError> {
        let mut line: PurchaseLine = self.get_record("purchase_lines", id)?;
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
        self.update_record("purchase_lines", id, &line, &[
            ("product", product_col),
            ("update_at", Value::Text(now)),
        ])?;

        self.propagate_purchase_line(&line)?;
        self.get_purchase_line(id)
    }

    /// Propagation for purchase lines: the parent purchase's company
    /// resolves the configuration.
    fn propagate_purchase_line(&self, line: &PurchaseLine) -> Result<(), ServiceError> {
        let Some(ref product_id) = line.product else {
            return Ok(());
        };
        let product = self.get_product(product_id)?;
        let purchase: Purchase = self.get_record("purchases", &line.purchase)?;

        let root2account = self.config_accounts(&product.template, &purchase.company)?;
        self.apply_product_accounts(&EntryOrigin::PurchaseLine(line.id.clone()), &root2account)
    }

    pub fn set_purchase_line_accounts(
        &self,
        id: &str,
        accounts: &std::collections::BTreeMap<String, Option<String>>,
    ) -> Result<LineDetail<PurchaseLine>, ServiceError> {
        let _line: PurchaseLine = self.get_record("purchase_lines", id)?;
        self.set_origin_accounts(&EntryOrigin::PurchaseLine(id.to_string()), accounts)?;
        self.get_purchase_line(id)
    }

    pub fn delete_purchase_line(&self, id: &str) -> Result<(), ServiceError> {
        self.delete_entries_for_origin(&EntryOrigin::PurchaseLine(id.to_string()))?;
        self.delete_record("purchase_lines", id)
    }

    // ── Purchase request ──

    pub fn create_purchase_request(
        &self,
        company: String,
        product: String,
        quantity: f64,
    ) -> Result<PurchaseRequest, ServiceError> {
        self.get_company(&company)?;
        self.get_product(&product)?;

        let now = now_rfc3339();
        let record = PurchaseRequest {
            id: new_id(),
            company: company.clone(),
            product: product.clone(),
            quantity,
            state: RequestState::Draft,
            purchase: None,
            create_at: Some(now.clone()),
            update_at: Some(now.clone()),
        };

        self.insert_record("purchase_requests", &record.id, &record, &[
            ("company", Value::Text(company)),
            ("product", Value::Text(product)),
            ("state", Value::Text(record.state.as_str().into())),
            ("create_at", Value::Text(now.clone())),
            ("update_at", Value::Text(now)),
        ])?;

        Ok(record)
    }

    pub fn get_purchase_request(&self, id: &str) -> Result<PurchaseRequest, ServiceError> {
        self.get_record("purchase_requests", id)
    }

    pub fn list_purchase_requests(
        &self,
        params: &ListParams,
        company: Option<&str>,
        state: Option<&str>,
    ) -> Result<ListResult<PurchaseRequest>, ServiceError> {
        let limit = params.limit.min(500);
        let mut f: Vec<(&str, Value)> = Vec::new();
        if let Some(company) = company {
            f.push(("company", Value::Text(company.to_string())));
        }
        if let Some(state) = state {
            f.push(("state", Value::Text(state.to_string())));
        }
        self.list_records("purchase_requests", &f, limit, params.offset)
    }

    /// Turn a draft purchase request into a purchase with one line.
    /// The line's entries are fresh copies of the configuration for the
    /// request's company; the line had no prior entries, so this is a
    /// creation path, not a merge.
    pub fn create_purchase_from_request(&self, id: &str) -> Result<Purchase, ServiceError> {
        let request: PurchaseRequest = self.get_record("purchase_requests", id)?;
        if request.state != RequestState::Draft {
            return Err(ServiceError::Validation(format!(
                "purchase request {} is already purchased",
                id
            )));
        }
        let product = self.get_product(&request.product)?;

        let purchase = self.insert_purchase(request.company.clone(), None)?;
        let line = self.insert_purchase_line(
            purchase.id.clone(),
            Some(request.product.clone()),
            request.quantity,
        )?;

        let root2account = self.config_accounts(&product.template, &request.company)?;
        let origin = EntryOrigin::PurchaseLine(line.id.clone());
        for (root, account) in &root2account {
            self.insert_entry(&origin, root, account, None)?;
        }

        let now = now_rfc3339();
        let mut updated = request;
        updated.state = RequestState::Purchased;
        updated.purchase = Some(purchase.id.clone());
        updated.update_at = Some(now.clone());
        self.update_record("purchase_requests", id, &updated, &[
            ("state", Value::Text(updated.state.as_str().into())),
            ("update_at", Value::Text(now)),
        ])?;

        Ok(purchase)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use openledger_core::{ListParams, ServiceError};
    use openledger_sql::SqliteStore;

    use crate::model::{AccountKind, RequestState};
    use crate::service::account::CreateAccountInput;
    use crate::service::{AnalyticService, OperatingContext};

    fn test_service() -> AnalyticService {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        AnalyticService::new(sql).unwrap()
    }

    struct Fixture {
        company: String,
        product: String,
        root: String,
        leaf: String,
    }

    fn fixture(svc: &AnalyticService) -> Fixture {
        let company = svc.create_company("Acme".into(), None).unwrap();
        let template = svc.create_template("Widget".into()).unwrap();
        let product = svc.create_product(template.id.clone(), None).unwrap();

        let root = svc
            .create_account(CreateAccountInput {
                name: "Projects".into(),
                kind: AccountKind::Root,
                root: None,
                parent: None,
                company: None,
            })
            .unwrap();
        let leaf = svc
            .create_account(CreateAccountInput {
                name: "Project X".into(),
                kind: AccountKind::Normal,
                root: Some(root.id.clone()),
                parent: Some(root.id.clone()),
                company: None,
            })
            .unwrap();

        let cfg = svc
            .create_template_company(
                template.id.clone(),
                Some(company.id.clone()),
                &OperatingContext::default(),
            )
            .unwrap();
        let map = BTreeMap::from([(root.id.clone(), Some(leaf.id.clone()))]);
        svc.set_template_company_accounts(&cfg.id, &map).unwrap();

        Fixture {
            company: company.id,
            product: product.id,
            root: root.id,
            leaf: leaf.id,
        }
    }

    #[test]
    fn test_create_purchase_from_request() {
        let svc = test_service();
        let fx = fixture(&svc);

        let request = svc
            .create_purchase_request(fx.company.clone(), fx.product.clone(), 10.0)
            .unwrap();
        let purchase = svc.create_purchase_from_request(&request.id).unwrap();
        assert_eq!(purchase.company, fx.company);

        let lines = svc
            .list_purchase_lines(&ListParams::default(), Some(&purchase.id))
            .unwrap();
        assert_eq!(lines.total, 1);
        let line = svc.get_purchase_line(&lines.items[0].id).unwrap();
        assert_eq!(line.line.quantity, 10.0);
        assert_eq!(line.accounts_by_root.get(&fx.root), Some(&fx.leaf));

        let request = svc.get_purchase_request(&request.id).unwrap();
        assert_eq!(request.state, RequestState::Purchased);
        assert_eq!(request.purchase, Some(purchase.id));
    }

    #[test]
    fn test_request_twice_is_rejected() {
        let svc = test_service();
        let fx = fixture(&svc);

        let request = svc
            .create_purchase_request(fx.company.clone(), fx.product.clone(), 1.0)
            .unwrap();
        svc.create_purchase_from_request(&request.id).unwrap();

        let err = svc.create_purchase_from_request(&request.id).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn test_request_without_config_yields_bare_line() {
        let svc = test_service();
        let fx = fixture(&svc);

        // A second company with no configuration for the template.
        let other = svc.create_company("Other".into(), None).unwrap();
        let request = svc
            .create_purchase_request(other.id.clone(), fx.product.clone(), 3.0)
            .unwrap();
        let purchase = svc.create_purchase_from_request(&request.id).unwrap();

        let lines = svc
            .list_purchase_lines(&ListParams::default(), Some(&purchase.id))
            .unwrap();
        let line = svc.get_purchase_line(&lines.items[0].id).unwrap();
        assert!(line.entries.is_empty());
    }
}
