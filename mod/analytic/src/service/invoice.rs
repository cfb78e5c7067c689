use openledger_core::{ListParams, ListResult, ServiceError, new_id, now_rfc3339};
use openledger_sql::Value;

use crate::model::{EntryOrigin, Invoice, InvoiceLine};
use super::AnalyticService;
use super::entry::LineDetail;

pub struct CreateInvoiceLineInput {
    pub invoice: String,
    pub product: Option<String>,
    pub quantity: f64,
    /// Line-level company override.
    pub company: Option<String>,
}

impl AnalyticService {
    // ── Invoice ──

    pub fn create_invoice(
        &self,
        company: String,
        party: Option<String>,
    ) -> Result<Invoice, ServiceError> {
        self.get_company(&company)?;

        let now = now_rfc3339();
        let record = Invoice {
            id: new_id(),
            company: company.clone(),
            party,
            create_at: Some(now.clone()),
            update_at: Some(now.clone()),
        };

        self.insert_record("invoices", &record.id, &record, &[
            ("company", Value::Text(company)),
            ("create_at", Value::Text(now.clone())),
            ("update_at", Value::Text(now)),
        ])?;

        Ok(record)
    }

    pub fn get_invoice(&self, id: &str) -> Result<Invoice, ServiceError> {
        self.get_record("invoices", id)
    }

    pub fn list_invoices(
        &self,
        params: &ListParams,
        company: Option<&str>,
    ) -> Result<ListResult<Invoice>, ServiceError> {
        let limit = params.limit.min(500);
        let mut f: Vec<(&str, Value)> = Vec::new();
        if let Some(company) = company {
            f.push(("company", Value::Text(company.to_string())));
        }
        self.list_records("invoices", &f, limit, params.offset)
    }

    pub fn update_invoice(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<Invoice, ServiceError> {
        let current: Invoice = self.get_record("invoices", id)?;
        let updated: Invoice = Self::apply_patch(&current, patch)?;
        self.get_company(&updated.company)?;

        self.update_record("invoices", id, &updated, &[
            ("company", Value::Text(updated.company.clone())),
            ("update_at", Value::Text(updated.update_at.clone().unwrap_or_default())),
        ])?;

        Ok(updated)
    }

    // ── Invoice line ──

    pub fn create_invoice_line(
        &self,
        input: CreateInvoiceLineInput,
    ) -> Result<LineDetail<InvoiceLine>, ServiceError> {
        self.get_invoice(&input.invoice)?;
        if let Some(ref company) = input.company {
            self.get_company(company)?;
        }
        if let Some(ref product) = input.product {
            self.get_product(product)?;
        }

        let now = now_rfc3339();
        let record = InvoiceLine {
            id: new_id(),
            invoice: input.invoice.clone(),
            product: input.product,
            quantity: input.quantity,
            company: input.company,
            create_at: Some(now.clone()),
            update_at: Some(now.clone()),
        };

        let mut indexes: Vec<(&str, Value)> = vec![
            ("invoice", Value::Text(input.invoice)),
            ("create_at", Value::Text(now.clone())),
            ("update_at", Value::Text(now)),
        ];
        if let Some(ref product) = record.product {
            indexes.push(("product", Value::Text(product.clone())));
        }
        if let Some(ref company) = record.company {
            indexes.push(("company", Value::Text(company.clone())));
        }

        self.insert_record("invoice_lines", &record.id, &record, &indexes)?;

        // Creating a line with a product counts as selecting it.
        self.propagate_invoice_line(&record)?;
        self.get_invoice_line(&record.id)
    }

    pub fn get_invoice_line(&self, id: &str) -> Result<LineDetail<InvoiceLine>, ServiceError> {
        let line: InvoiceLine = self.get_record("invoice_lines", id)?;
        let origin = EntryOrigin::InvoiceLine(id.to_string());
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

    pub fn list_invoice_lines(
        &self,
        params: &ListParams,
        invoice: Option<&str>,
    ) -> Result<ListResult<InvoiceLine>, ServiceError> {
        let limit = params.limit.min(500);
        let mut f: Vec<(&str, Value)> = Vec::new();
        if let Some(invoice) = invoice {
            f.push(("invoice", Value::Text(invoice.to_string())));
        }
        self.list_records("invoice_lines", &f, limit, params.offset)
    }

    /// Select (or clear) the line's product and propagate the product's
    /// configured analytic accounts onto the line.
    pub fn select_invoice_line_product(
        &self,
        id: &str,
        product: Option<String>,
    ) -> Result<LineDetail<InvoiceLine>, ServiceError> {
        let mut line: InvoiceLine = self.get_record("invoice_lines", id)?;
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
        self.update_record("invoice_lines", id, &line, &[
            ("product", product_col),
            ("update_at", Value::Text(now)),
        ])?;

        self.propagate_invoice_line(&line)?;
        self.get_invoice_line(id)
    }

    /// Propagation for invoice lines. The line's own company wins over
    /// the invoice's when resolving configuration.
    fn propagate_invoice_line(&self, line: &InvoiceLine) -> Result<(), ServiceError> {
        let Some(ref product_id) = line.product else {
            return Ok(());
        };
        let product = self.get_product(product_id)?;
        let invoice: Invoice = self.get_record("invoices", &line.invoice)?;
        let company = line.company.clone().unwrap_or(invoice.company);

        let root2account = self.config_accounts(&product.template, &company)?;
        self.apply_product_accounts(&EntryOrigin::InvoiceLine(line.id.clone()), &root2account)
    }

    pub fn set_invoice_line_accounts(
        &self,
        id: &str,
        accounts: &std::collections::BTreeMap<String, Option<String>>,
    ) -> Result<LineDetail<InvoiceLine>, ServiceError> {
        let _line: InvoiceLine = self.get_record("invoice_lines", id)?;
        self.set_origin_accounts(&EntryOrigin::InvoiceLine(id.to_string()), accounts)?;
        self.get_invoice_line(id)
    }

    pub fn delete_invoice_line(&self, id: &str) -> Result<(), ServiceError> {
        self.delete_entries_for_origin(&EntryOrigin::InvoiceLine(id.to_string()))?;
        self.delete_record("invoice_lines", id)
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
    use super::CreateInvoiceLineInput;

    fn test_service() -> AnalyticService {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        AnalyticService::new(sql).unwrap()
    }

    struct Fixture {
        company1: String,
        company2: String,
        product: String,
        root: String,
        leaf1: String,
        leaf2: String,
    }

    /// Company 1 configured {root → leaf1}, company 2 {root → leaf2}.
    fn fixture(svc: &AnalyticService) -> Fixture {
        let c1 = svc.create_company("One".into(), None).unwrap();
        let c2 = svc.create_company("Two".into(), None).unwrap();
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
        let mut leaves = Vec::new();
        for name in ["Project X", "Project Y"] {
            let leaf = svc
                .create_account(CreateAccountInput {
                    name: name.into(),
                    kind: AccountKind::Normal,
                    root: Some(root.id.clone()),
                    parent: Some(root.id.clone()),
                    company: None,
                })
                .unwrap();
            leaves.push(leaf.id);
        }

        for (company, leaf) in [(&c1.id, &leaves[0]), (&c2.id, &leaves[1])] {
            let cfg = svc
                .create_template_company(
                    template.id.clone(),
                    Some(company.clone()),
                    &OperatingContext::default(),
                )
                .unwrap();
            let map = BTreeMap::from([(root.id.clone(), Some(leaf.clone()))]);
            svc.set_template_company_accounts(&cfg.id, &map).unwrap();
        }

        Fixture {
            company1: c1.id,
            company2: c2.id,
            product: product.id,
            root: root.id,
            leaf1: leaves[0].clone(),
            leaf2: leaves[1].clone(),
        }
    }

    #[test]
    fn test_line_company_overrides_invoice_company() {
        let svc = test_service();
        let fx = fixture(&svc);
        let invoice = svc.create_invoice(fx.company1.clone(), None).unwrap();

        // No line company: the invoice's company resolves.
        let line = svc
            .create_invoice_line(CreateInvoiceLineInput {
                invoice: invoice.id.clone(),
                product: Some(fx.product.clone()),
                quantity: 1.0,
                company: None,
            })
            .unwrap();
        assert_eq!(line.accounts_by_root.get(&fx.root), Some(&fx.leaf1));

        // Line company set: it wins over the invoice's.
        let line = svc
            .create_invoice_line(CreateInvoiceLineInput {
                invoice: invoice.id.clone(),
                product: Some(fx.product.clone()),
                quantity: 1.0,
                company: Some(fx.company2.clone()),
            })
            .unwrap();
        assert_eq!(line.accounts_by_root.get(&fx.root), Some(&fx.leaf2));
    }

    #[test]
    fn test_line_without_product_gets_no_entries() {
        let svc = test_service();
        let fx = fixture(&svc);
        let invoice = svc.create_invoice(fx.company1.clone(), None).unwrap();

        let line = svc
            .create_invoice_line(CreateInvoiceLineInput {
                invoice: invoice.id,
                product: None,
                quantity: 1.0,
                company: None,
            })
            .unwrap();
        assert!(line.entries.is_empty());
        assert!(line.accounts_by_root.is_empty());
    }

    #[test]
    fn test_clearing_product_keeps_entries() {
        let svc = test_service();
        let fx = fixture(&svc);
        let invoice = svc.create_invoice(fx.company1.clone(), None).unwrap();

        let line = svc
            .create_invoice_line(CreateInvoiceLineInput {
                invoice: invoice.id,
                product: Some(fx.product.clone()),
                quantity: 1.0,
                company: None,
            })
            .unwrap();
        assert_eq!(line.entries.len(), 1);

        // Deselecting the product leaves the entries alone.
        let line = svc.select_invoice_line_product(&line.line.id, None).unwrap();
        assert!(line.line.product.is_none());
        assert_eq!(line.entries.len(), 1);
        assert_eq!(line.accounts_by_root.get(&fx.root), Some(&fx.leaf1));
    }

    #[test]
    fn test_delete_line_removes_entries() {
        let svc = test_service();
        let fx = fixture(&svc);
        let invoice = svc.create_invoice(fx.company1.clone(), None).unwrap();

        let line = svc
            .create_invoice_line(CreateInvoiceLineInput {
                invoice: invoice.id,
                product: Some(fx.product),
                quantity: 1.0,
                company: None,
            })
            .unwrap();
        let line_id = line.line.id.clone();
        svc.delete_invoice_line(&line_id).unwrap();
        assert!(svc.get_invoice_line(&line_id).is_err());

        let origin = crate::model::EntryOrigin::InvoiceLine(line_id);
        assert!(svc.entries_for_origin(&origin).unwrap().is_empty());
    }
}
