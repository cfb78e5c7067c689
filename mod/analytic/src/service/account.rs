use openledger_core::{ListParams, ListResult, ServiceError, new_id, now_rfc3339};
use openledger_sql::Value;

use crate::model::{AccountKind, AnalyticAccount};
use super::AnalyticService;

pub struct CreateAccountInput {
    pub name: String,
    pub kind: AccountKind,
    pub root: Option<String>,
    pub parent: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Default)]
pub struct AccountFilters {
    pub kind: Option<String>,
    pub root: Option<String>,
    pub company: Option<String>,
}

impl AnalyticService {
    pub fn create_account(
        &self,
        input: CreateAccountInput,
    ) -> Result<AnalyticAccount, ServiceError> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::Validation("account name is required".into()));
        }
        match input.kind {
            AccountKind::Root => {
                if input.root.is_some() || input.parent.is_some() {
                    return Err(ServiceError::Validation(
                        "a root account cannot have a root or parent".into(),
                    ));
                }
            }
            AccountKind::View | AccountKind::Normal => {
                let root_id = input.root.as_deref().ok_or_else(|| {
                    ServiceError::Validation("a non-root account requires a root".into())
                })?;
                let root: AnalyticAccount = self.get_record("analytic_accounts", root_id)?;
                if root.kind != AccountKind::Root {
                    return Err(ServiceError::Validation(format!(
                        "account {} is not a root",
                        root_id
                    )));
                }
            }
        }
        if let Some(ref company) = input.company {
            self.get_company(company)?;
        }

        let now = now_rfc3339();
        let record = AnalyticAccount {
            id: new_id(),
            name: input.name,
            kind: input.kind,
            root: input.root,
            parent: input.parent,
            company: input.company,
            create_at: Some(now.clone()),
            update_at: Some(now.clone()),
        };

        let mut indexes: Vec<(&str, Value)> = vec![
            ("name", Value::Text(record.name.clone())),
            ("kind", Value::Text(record.kind.as_str().into())),
            ("create_at", Value::Text(now.clone())),
            ("update_at", Value::Text(now)),
        ];
        if let Some(ref root) = record.root {
            indexes.push(("root", Value::Text(root.clone())));
        }
        if let Some(ref company) = record.company {
            indexes.push(("company", Value::Text(company.clone())));
        }

        self.insert_record("analytic_accounts", &record.id, &record, &indexes)?;
        self.invalidate_line_form_cache();
        Ok(record)
    }

    pub fn get_account(&self, id: &str) -> Result<AnalyticAccount, ServiceError> {
        self.get_record("analytic_accounts", id)
    }

    pub fn list_accounts(
        &self,
        params: &ListParams,
        filters: &AccountFilters,
    ) -> Result<ListResult<AnalyticAccount>, ServiceError> {
        let limit = params.limit.min(500);
        let mut f: Vec<(&str, Value)> = Vec::new();
        if let Some(ref kind) = filters.kind {
            f.push(("kind", Value::Text(kind.clone())));
        }
        if let Some(ref root) = filters.root {
            f.push(("root", Value::Text(root.clone())));
        }
        if let Some(ref company) = filters.company {
            f.push(("company", Value::Text(company.clone())));
        }
        self.list_records("analytic_accounts", &f, limit, params.offset)
    }

    /// All ROOT accounts, by name. These drive the per-root line form
    /// fields and the keys of accounts-by-root maps.
    pub fn root_accounts(&self) -> Result<Vec<AnalyticAccount>, ServiceError> {
        let rows = self.sql
            .query(
                "SELECT data FROM analytic_accounts WHERE kind = 'ROOT' ORDER BY name",
                &[],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut roots = Vec::new();
        for row in &rows {
            let data = row.get_str("data")
                .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
            let account: AnalyticAccount =
                serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))?;
            roots.push(account);
        }
        Ok(roots)
    }

    pub fn update_account(
        &self,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<AnalyticAccount, ServiceError> {
        let current: AnalyticAccount = self.get_record("analytic_accounts", id)?;
        let updated: AnalyticAccount = Self::apply_patch(&current, patch)?;

        let mut indexes: Vec<(&str, Value)> = vec![
            ("name", Value::Text(updated.name.clone())),
            ("kind", Value::Text(updated.kind.as_str().into())),
            ("update_at", Value::Text(updated.update_at.clone().unwrap_or_default())),
        ];
        indexes.push(match updated.root {
            Some(ref root) => ("root", Value::Text(root.clone())),
            None => ("root", Value::Null),
        });
        indexes.push(match updated.company {
            Some(ref company) => ("company", Value::Text(company.clone())),
            None => ("company", Value::Null),
        });

        self.update_record("analytic_accounts", id, &updated, &indexes)?;
        self.invalidate_line_form_cache();
        Ok(updated)
    }

    pub fn delete_account(&self, id: &str) -> Result<(), ServiceError> {
        self.delete_record("analytic_accounts", id)?;
        self.invalidate_line_form_cache();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use openledger_core::ListParams;
    use openledger_sql::SqliteStore;

    use crate::model::AccountKind;
    use super::{AccountFilters, AnalyticService, CreateAccountInput};

    fn test_service() -> AnalyticService {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        AnalyticService::new(sql).unwrap()
    }

    #[test]
    fn test_account_tree() {
        let svc = test_service();

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
        assert_eq!(leaf.root, Some(root.id.clone()));

        let roots = svc.root_accounts().unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id, root.id);

        let under_root = svc
            .list_accounts(
                &ListParams::default(),
                &AccountFilters {
                    root: Some(root.id.clone()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(under_root.total, 1);
        assert_eq!(under_root.items[0].id, leaf.id);
    }

    #[test]
    fn test_account_validation() {
        let svc = test_service();

        // A root cannot point at another root.
        let root = svc
            .create_account(CreateAccountInput {
                name: "Projects".into(),
                kind: AccountKind::Root,
                root: None,
                parent: None,
                company: None,
            })
            .unwrap();
        let err = svc.create_account(CreateAccountInput {
            name: "Bad".into(),
            kind: AccountKind::Root,
            root: Some(root.id.clone()),
            parent: None,
            company: None,
        });
        assert!(err.is_err());

        // A normal account requires a root.
        let err = svc.create_account(CreateAccountInput {
            name: "Orphan".into(),
            kind: AccountKind::Normal,
            root: None,
            parent: None,
            company: None,
        });
        assert!(err.is_err());

        // The root must actually be ROOT-kind.
        let leaf = svc
            .create_account(CreateAccountInput {
                name: "Leaf".into(),
                kind: AccountKind::Normal,
                root: Some(root.id.clone()),
                parent: None,
                company: None,
            })
            .unwrap();
        let err = svc.create_account(CreateAccountInput {
            name: "Bad".into(),
            kind: AccountKind::Normal,
            root: Some(leaf.id),
            parent: None,
            company: None,
        });
        assert!(err.is_err());
    }
}
