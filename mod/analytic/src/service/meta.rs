use serde::{Deserialize, Serialize};

use openledger_core::ServiceError;

use super::AnalyticService;

/// One selector field on a document-line form, derived from a ROOT
/// account. Clients render one of these per root and submit the chosen
/// account ids through the accounts-by-root map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineFormField {
    /// Stable field name, `analytic_account_<root-id>`.
    pub name: String,

    /// Display label, the root account's name.
    pub label: String,

    /// The ROOT account this field selects under.
    pub root: String,

    /// Restricts the selectable accounts to this company when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

/// The line-form descriptor document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineFormMeta {
    pub fields: Vec<LineFormField>,
}

impl AnalyticService {
    /// The per-root line form fields, rebuilt from the current ROOT
    /// accounts on first use and cached until an account mutation
    /// invalidates it.
    pub fn line_form_meta(&self) -> Result<LineFormMeta, ServiceError> {
        {
            let cache = self.line_form_cache
                .read()
                .map_err(|e| ServiceError::Internal(e.to_string()))?;
            if let Some(ref meta) = *cache {
                return Ok(meta.clone());
            }
        }

        let mut fields = Vec::new();
        for root in self.root_accounts()? {
            fields.push(LineFormField {
                name: format!("analytic_account_{}", root.id),
                label: root.name.clone(),
                root: root.id.clone(),
                company: root.company.clone(),
            });
        }
        let meta = LineFormMeta { fields };

        let mut cache = self.line_form_cache
            .write()
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        *cache = Some(meta.clone());
        Ok(meta)
    }

    /// Drop the cached descriptor. Called on every account mutation,
    /// since the field set mirrors the ROOT account list. A poisoned
    /// lock still gets cleared so a later rebuild sees fresh state.
    pub(crate) fn invalidate_line_form_cache(&self) {
        match self.line_form_cache.write() {
            Ok(mut cache) => *cache = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use openledger_sql::SqliteStore;

    use crate::model::AccountKind;
    use crate::service::AnalyticService;
    use crate::service::account::CreateAccountInput;

    fn test_service() -> AnalyticService {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        AnalyticService::new(sql).unwrap()
    }

    fn root_input(name: &str) -> CreateAccountInput {
        CreateAccountInput {
            name: name.into(),
            kind: AccountKind::Root,
            root: None,
            parent: None,
            company: None,
        }
    }

    #[test]
    fn test_one_field_per_root() {
        let svc = test_service();
        let projects = svc.create_account(root_input("Projects")).unwrap();
        let regions = svc.create_account(root_input("Regions")).unwrap();

        let meta = svc.line_form_meta().unwrap();
        assert_eq!(meta.fields.len(), 2);
        // Roots come back ordered by name.
        assert_eq!(meta.fields[0].label, "Projects");
        assert_eq!(meta.fields[0].name, format!("analytic_account_{}", projects.id));
        assert_eq!(meta.fields[0].root, projects.id);
        assert_eq!(meta.fields[1].root, regions.id);
    }

    #[test]
    fn test_account_mutations_invalidate_cache() {
        let svc = test_service();
        let root = svc.create_account(root_input("Projects")).unwrap();
        assert_eq!(svc.line_form_meta().unwrap().fields.len(), 1);

        // Create.
        svc.create_account(root_input("Regions")).unwrap();
        assert_eq!(svc.line_form_meta().unwrap().fields.len(), 2);

        // Update.
        svc.update_account(&root.id, serde_json::json!({"name": "Portfolios"}))
            .unwrap();
        let meta = svc.line_form_meta().unwrap();
        assert!(meta.fields.iter().any(|f| f.label == "Portfolios"));

        // Delete.
        svc.delete_account(&root.id).unwrap();
        assert_eq!(svc.line_form_meta().unwrap().fields.len(), 1);
    }

    #[test]
    fn test_non_root_accounts_add_no_fields() {
        let svc = test_service();
        let root = svc.create_account(root_input("Projects")).unwrap();
        svc.create_account(CreateAccountInput {
            name: "Project X".into(),
            kind: AccountKind::Normal,
            root: Some(root.id.clone()),
            parent: None,
            company: None,
        })
        .unwrap();

        let meta = svc.line_form_meta().unwrap();
        assert_eq!(meta.fields.len(), 1);
        assert_eq!(meta.fields[0].root, root.id);
    }
}
