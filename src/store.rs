use crate::error::{PortfolioAnalyticsError, Result};
use crate::schema::{
    Client, ContactEvent, Credit, DueInstallment, InstallmentRecord, Manager, PortfolioSnapshot,
};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Read access to persisted portfolio data.
///
/// Each call is one consistent read; implementations report failures as
/// [`PortfolioAnalyticsError::DataAccess`] and never retry.
pub trait PortfolioStore {
    fn installments(&self) -> Result<Vec<InstallmentRecord>>;

    /// Contact events joined to their manager and, through installment and credit, to
    /// the client. Events whose joins fail are not returned.
    fn contact_events(&self) -> Result<Vec<ContactEvent>>;

    /// Installments joined to the owing client.
    fn due_installments(&self) -> Result<Vec<DueInstallment>>;
}

impl<S: PortfolioStore + ?Sized> PortfolioStore for &S {
    fn installments(&self) -> Result<Vec<InstallmentRecord>> {
        (**self).installments()
    }

    fn contact_events(&self) -> Result<Vec<ContactEvent>> {
        (**self).contact_events()
    }

    fn due_installments(&self) -> Result<Vec<DueInstallment>> {
        (**self).due_installments()
    }
}

/// In-process store over a [`PortfolioSnapshot`], resolving joins the way the
/// relational store's inner joins do.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    snapshot: PortfolioSnapshot,
    clients: HashMap<i64, usize>,
    credits: HashMap<i64, usize>,
    installments: HashMap<i64, usize>,
    managers: HashMap<i64, usize>,
}

impl SnapshotStore {
    pub fn new(snapshot: PortfolioSnapshot) -> Result<Self> {
        validate_snapshot(&snapshot)?;

        let clients = index_by(&snapshot.clients, |c: &Client| c.id);
        let credits = index_by(&snapshot.credits, |c: &Credit| c.id);
        let installments = index_by(&snapshot.installments, |i: &InstallmentRecord| i.id);
        let managers = index_by(&snapshot.managers, |m: &Manager| m.id);

        debug!(
            "Loaded snapshot: {} clients, {} credits, {} installments, {} managers, {} activities",
            snapshot.clients.len(),
            snapshot.credits.len(),
            snapshot.installments.len(),
            snapshot.managers.len(),
            snapshot.activities.len()
        );

        Ok(Self {
            snapshot,
            clients,
            credits,
            installments,
            managers,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let snapshot: PortfolioSnapshot = serde_json::from_str(json).map_err(|e| {
            PortfolioAnalyticsError::DataAccess(format!("Malformed portfolio snapshot: {}", e))
        })?;
        Self::new(snapshot)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PortfolioAnalyticsError::DataAccess(format!(
                "Cannot read portfolio snapshot {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn snapshot(&self) -> &PortfolioSnapshot {
        &self.snapshot
    }

    fn client_of_installment(&self, installment_id: i64) -> Option<&Client> {
        let installment = &self.snapshot.installments[*self.installments.get(&installment_id)?];
        let credit = &self.snapshot.credits[*self.credits.get(&installment.credit_id)?];
        self.clients
            .get(&credit.client_id)
            .map(|idx| &self.snapshot.clients[*idx])
    }
}

impl PortfolioStore for SnapshotStore {
    fn installments(&self) -> Result<Vec<InstallmentRecord>> {
        Ok(self.snapshot.installments.clone())
    }

    fn contact_events(&self) -> Result<Vec<ContactEvent>> {
        let mut events = Vec::with_capacity(self.snapshot.activities.len());
        let mut unmatched = 0;

        for activity in &self.snapshot.activities {
            let manager = self
                .managers
                .get(&activity.manager_id)
                .map(|idx| &self.snapshot.managers[*idx]);
            let client = self.client_of_installment(activity.installment_id);

            match (manager, client) {
                (Some(manager), Some(client)) => events.push(ContactEvent {
                    id: activity.id,
                    installment_id: activity.installment_id,
                    manager_id: manager.id,
                    manager_name: manager.name.clone(),
                    client_id: client.id,
                    client_name: client.name.clone(),
                }),
                _ => unmatched += 1,
            }
        }

        if unmatched > 0 {
            warn!(
                "{} portfolio activit(ies) reference a missing manager, installment, credit or client and were skipped",
                unmatched
            );
        }

        Ok(events)
    }

    fn due_installments(&self) -> Result<Vec<DueInstallment>> {
        Ok(self
            .snapshot
            .installments
            .iter()
            .filter_map(|installment| {
                let client = self.client_of_installment(installment.id)?;
                Some(DueInstallment {
                    installment_id: installment.id,
                    client_name: client.name.clone(),
                    client_phone: client.phone.clone(),
                    value: installment.value,
                    due_date: installment.due_date,
                })
            })
            .collect())
    }
}

fn index_by<T, F>(rows: &[T], key: F) -> HashMap<i64, usize>
where
    F: Fn(&T) -> i64,
{
    rows.iter()
        .enumerate()
        .map(|(idx, row)| (key(row), idx))
        .collect()
}

fn ensure_unique<T, F>(table: &str, rows: &[T], key: F) -> Result<()>
where
    F: Fn(&T) -> i64,
{
    let mut seen = HashSet::with_capacity(rows.len());
    for row in rows {
        let id = key(row);
        if !seen.insert(id) {
            return Err(PortfolioAnalyticsError::DataAccess(format!(
                "Duplicate id {} in table '{}'",
                id, table
            )));
        }
    }
    Ok(())
}

fn validate_snapshot(snapshot: &PortfolioSnapshot) -> Result<()> {
    ensure_unique("client", &snapshot.clients, |c| c.id)?;
    ensure_unique("credit", &snapshot.credits, |c| c.id)?;
    ensure_unique("installment", &snapshot.installments, |i| i.id)?;
    ensure_unique("manager", &snapshot.managers, |m| m.id)?;
    ensure_unique("portfolio", &snapshot.activities, |a| a.id)?;

    for installment in &snapshot.installments {
        if !installment.value.is_finite() {
            return Err(PortfolioAnalyticsError::DataAccess(format!(
                "Installment {} has a non-finite value",
                installment.id
            )));
        }
        if installment.value <= 0.0 {
            return Err(PortfolioAnalyticsError::DataAccess(format!(
                "Installment {} has a non-positive value",
                installment.id
            )));
        }
    }

    Ok(())
}
