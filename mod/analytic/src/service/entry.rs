use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use openledger_core::{ServiceError, new_id, now_rfc3339};
use openledger_sql::Value;

use crate::model::{AccountKind, AnalyticAccount, AnalyticEntry, EntryOrigin, TemplateCompany};
use super::AnalyticService;

/// A document line together with its analytic state.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDetail<T: Serialize> {
    #[serde(flatten)]
    pub line: T,
    pub entries: Vec<AnalyticEntry>,
    pub accounts_by_root: BTreeMap<String, String>,
}

/// An entry together with its effective company.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDetail {
    #[serde(flatten)]
    pub entry: AnalyticEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

/// The changes needed to bring an owning set in line with a product's
/// configured accounts.
#[derive(Debug)]
pub(crate) struct MergeOutcome {
    /// Existing entries whose account gets overwritten (root matched).
    pub updated: Vec<AnalyticEntry>,
    /// (root, account) pairs to append as fresh entries.
    pub appended: Vec<(String, String)>,
}

/// The propagation merge rule: overwrite the account of current entries
/// whose root is in the map, append entries for map roots not present,
/// and leave entries with other roots untouched. Entries are never
/// deleted by propagation.
pub(crate) fn merge_product_accounts(
    current: &[AnalyticEntry],
    root2account: &BTreeMap<String, String>,
) -> MergeOutcome {
    let mut updated = Vec::new();
    for entry in current {
        if let Some(account) = root2account.get(&entry.root) {
            let mut e = entry.clone();
            e.account = Some(account.clone());
            updated.push(e);
        }
    }

    let present: BTreeSet<&str> = current.iter().map(|e| e.root.as_str()).collect();
    let appended = root2account
        .iter()
        .filter(|(root, _)| !present.contains(root.as_str()))
        .map(|(root, account)| (root.clone(), account.clone()))
        .collect();

    MergeOutcome { updated, appended }
}

impl AnalyticService {
    /// All entries belonging to an owning set.
    pub fn entries_for_origin(
        &self,
        origin: &EntryOrigin,
    ) -> Result<Vec<AnalyticEntry>, ServiceError> {
        let rows = self.sql
            .query(
                "SELECT data FROM analytic_entries
                 WHERE origin_kind = ?1 AND origin_id = ?2 ORDER BY root",
                &[
                    Value::Text(origin.kind_str().to_string()),
                    Value::Text(origin.id().to_string()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut entries = Vec::new();
        for row in &rows {
            let data = row.get_str("data")
                .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
            let entry: AnalyticEntry =
                serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// The root→account map over an owning set, restricted to entries
    /// whose account is set.
    pub fn accounts_by_root(
        &self,
        origin: &EntryOrigin,
    ) -> Result<BTreeMap<String, String>, ServiceError> {
        let entries = self.entries_for_origin(origin)?;
        Ok(entries
            .into_iter()
            .filter_map(|e| e.account.map(|a| (e.root, a)))
            .collect())
    }

    /// Write an owning set's accounts as a keyed map: a set value
    /// creates or overwrites the root's entry, null removes it. Roots
    /// absent from the map are left alone.
    pub fn set_origin_accounts(
        &self,
        origin: &EntryOrigin,
        accounts: &BTreeMap<String, Option<String>>,
    ) -> Result<Vec<AnalyticEntry>, ServiceError> {
        // Validate the whole map before touching anything.
        for (root_id, account) in accounts {
            let root: AnalyticAccount = self.get_record("analytic_accounts", root_id)?;
            if root.kind != AccountKind::Root {
                return Err(ServiceError::Validation(format!(
                    "account {} is not a root",
                    root_id
                )));
            }
            if let Some(account_id) = account {
                let chosen: AnalyticAccount = self.get_record("analytic_accounts", account_id)?;
                if chosen.root.as_deref() != Some(root_id.as_str()) {
                    return Err(ServiceError::Validation(format!(
                        "account {} does not belong to root {}",
                        account_id, root_id
                    )));
                }
            }
        }

        let current = self.entries_for_origin(origin)?;
        for (root_id, account) in accounts {
            match account {
                Some(account_id) => {
                    match current.iter().find(|e| &e.root == root_id) {
                        Some(entry) => {
                            self.set_entry_account(entry, account_id)?;
                        }
                        None => {
                            self.insert_entry(origin, root_id, account_id, None)?;
                        }
                    }
                }
                None => {
                    self.sql
                        .exec(
                            "DELETE FROM analytic_entries
                             WHERE origin_kind = ?1 AND origin_id = ?2 AND root = ?3",
                            &[
                                Value::Text(origin.kind_str().to_string()),
                                Value::Text(origin.id().to_string()),
                                Value::Text(root_id.clone()),
                            ],
                        )
                        .map_err(|e| ServiceError::Storage(e.to_string()))?;
                }
            }
        }

        self.entries_for_origin(origin)
    }

    /// Apply a product's configured accounts onto an owning set and
    /// persist the outcome. No-op when the map is empty.
    pub(crate) fn apply_product_accounts(
        &self,
        origin: &EntryOrigin,
        root2account: &BTreeMap<String, String>,
    ) -> Result<(), ServiceError> {
        if root2account.is_empty() {
            return Ok(());
        }

        let current = self.entries_for_origin(origin)?;
        let outcome = merge_product_accounts(&current, root2account);

        for entry in &outcome.updated {
            let account = entry.account.as_deref()
                .ok_or_else(|| ServiceError::Internal("merge produced an empty account".into()))?;
            self.set_entry_account(entry, account)?;
        }
        for (root, account) in &outcome.appended {
            self.insert_entry(origin, root, account, None)?;
        }
        Ok(())
    }

    /// Insert a fresh entry for (origin, root).
    pub(crate) fn insert_entry(
        &self,
        origin: &EntryOrigin,
        root: &str,
        account: &str,
        created_by: Option<String>,
    ) -> Result<AnalyticEntry, ServiceError> {
        let now = now_rfc3339();
        let record = AnalyticEntry {
            id: new_id(),
            root: root.to_string(),
            account: Some(account.to_string()),
            origin: origin.clone(),
            created_by: created_by.clone(),
            create_at: Some(now.clone()),
            update_at: Some(now.clone()),
        };

        let mut indexes: Vec<(&str, Value)> = vec![
            ("root", Value::Text(record.root.clone())),
            ("account", Value::Text(account.to_string())),
            ("origin_kind", Value::Text(origin.kind_str().to_string())),
            ("origin_id", Value::Text(origin.id().to_string())),
            ("create_at", Value::Text(now.clone())),
            ("update_at", Value::Text(now)),
        ];
        if let Some(created_by) = created_by {
            indexes.push(("created_by", Value::Text(created_by)));
        }

        self.insert_record("analytic_entries", &record.id, &record, &indexes)?;
        Ok(record)
    }

    /// Overwrite an existing entry's account.
    fn set_entry_account(
        &self,
        entry: &AnalyticEntry,
        account: &str,
    ) -> Result<AnalyticEntry, ServiceError> {
        let now = now_rfc3339();
        let mut updated = entry.clone();
        updated.account = Some(account.to_string());
        updated.update_at = Some(now.clone());

        self.update_record("analytic_entries", &updated.id, &updated, &[
            ("account", Value::Text(account.to_string())),
            ("update_at", Value::Text(now)),
        ])?;
        Ok(updated)
    }

    /// Delete every entry owned by an origin. Used when the owning line
    /// or configuration row is deleted.
    pub(crate) fn delete_entries_for_origin(
        &self,
        origin: &EntryOrigin,
    ) -> Result<(), ServiceError> {
        self.sql
            .exec(
                "DELETE FROM analytic_entries WHERE origin_kind = ?1 AND origin_id = ?2",
                &[
                    Value::Text(origin.kind_str().to_string()),
                    Value::Text(origin.id().to_string()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Resolve the company an entry reports: configuration entries
    /// carry their configuration's company, line entries fall back to
    /// the chosen account's company.
    pub fn entry_company(&self, entry: &AnalyticEntry) -> Result<Option<String>, ServiceError> {
        if let EntryOrigin::TemplateCompany(ref id) = entry.origin {
            let config: TemplateCompany = self.get_record("template_companies", id)?;
            return Ok(Some(config.company));
        }
        match entry.account {
            Some(ref account_id) => {
                let account: AnalyticAccount = self.get_record("analytic_accounts", account_id)?;
                Ok(account.company)
            }
            None => Ok(None),
        }
    }

    pub fn get_entry(&self, id: &str) -> Result<EntryDetail, ServiceError> {
        let entry: AnalyticEntry = self.get_record("analytic_entries", id)?;
        let company = self.entry_company(&entry)?;
        Ok(EntryDetail { entry, company })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::model::{AnalyticEntry, EntryOrigin};
    use super::merge_product_accounts;

    fn entry(id: &str, root: &str, account: Option<&str>) -> AnalyticEntry {
        AnalyticEntry {
            id: id.into(),
            root: root.into(),
            account: account.map(String::from),
            origin: EntryOrigin::SaleLine("sl1".into()),
            created_by: None,
            create_at: None,
            update_at: None,
        }
    }

    #[test]
    fn merge_overwrites_matching_roots() {
        let current = vec![entry("e1", "r1", Some("old"))];
        let map = BTreeMap::from([("r1".to_string(), "new".to_string())]);
        let outcome = merge_product_accounts(&current, &map);
        assert_eq!(outcome.updated.len(), 1);
        assert_eq!(outcome.updated[0].id, "e1");
        assert_eq!(outcome.updated[0].account.as_deref(), Some("new"));
        assert!(outcome.appended.is_empty());
    }

    #[test]
    fn merge_appends_missing_roots() {
        let current = vec![entry("e1", "r1", Some("a1"))];
        let map = BTreeMap::from([
            ("r1".to_string(), "a1".to_string()),
            ("r2".to_string(), "a2".to_string()),
        ]);
        let outcome = merge_product_accounts(&current, &map);
        assert_eq!(outcome.updated.len(), 1);
        assert_eq!(outcome.appended, vec![("r2".to_string(), "a2".to_string())]);
    }

    #[test]
    fn merge_preserves_unrelated_roots() {
        // r9 is not in the map; it is neither updated nor removed.
        let current = vec![entry("e1", "r9", Some("manual"))];
        let map = BTreeMap::from([("r1".to_string(), "a1".to_string())]);
        let outcome = merge_product_accounts(&current, &map);
        assert!(outcome.updated.is_empty());
        assert_eq!(outcome.appended, vec![("r1".to_string(), "a1".to_string())]);
    }

    #[test]
    fn merge_twice_is_idempotent() {
        let current = vec![entry("e1", "r1", Some("old"))];
        let map = BTreeMap::from([
            ("r1".to_string(), "a1".to_string()),
            ("r2".to_string(), "a2".to_string()),
        ]);

        let first = merge_product_accounts(&current, &map);
        let mut after: Vec<AnalyticEntry> = first.updated.clone();
        for (root, account) in &first.appended {
            after.push(entry("fresh", root, Some(account)));
        }

        let second = merge_product_accounts(&after, &map);
        assert!(second.appended.is_empty());
        let state: BTreeMap<_, _> = second
            .updated
            .iter()
            .map(|e| (e.root.clone(), e.account.clone()))
            .collect();
        assert_eq!(state.len(), 2);
        assert_eq!(state["r1"], Some("a1".to_string()));
        assert_eq!(state["r2"], Some("a2".to_string()));
    }
}
