use crate::schema::ContactEvent;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactedClient {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManagerContactSummary {
    pub manager_id: i64,
    pub manager_name: String,
    /// Every contact event, repeat contacts of the same client included.
    pub contacts_count: usize,
    /// Distinct clients, in the order they were first contacted.
    pub clients: Vec<ContactedClient>,
    pub unique_clients_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManagerContactReport {
    pub items: Vec<ManagerContactSummary>,
    pub count: usize,
}

impl ManagerContactReport {
    pub fn manager(&self, manager_id: i64) -> Option<&ManagerContactSummary> {
        self.items.iter().find(|m| m.manager_id == manager_id)
    }
}

struct ManagerTally {
    manager_id: i64,
    manager_name: String,
    contacts_count: usize,
    clients: Vec<ContactedClient>,
    seen_clients: HashSet<i64>,
}

/// Groups contact events by manager. Managers appear only if they have at least one
/// event; the result is ordered by contact count, highest first, and managers with
/// equal counts keep the order in which their first event was read.
pub fn aggregate_contacts(events: &[ContactEvent]) -> ManagerContactReport {
    let mut tallies: Vec<ManagerTally> = Vec::new();
    let mut position: HashMap<i64, usize> = HashMap::new();

    for event in events {
        let idx = *position.entry(event.manager_id).or_insert_with(|| {
            tallies.push(ManagerTally {
                manager_id: event.manager_id,
                manager_name: event.manager_name.clone(),
                contacts_count: 0,
                clients: Vec::new(),
                seen_clients: HashSet::new(),
            });
            tallies.len() - 1
        });

        let tally = &mut tallies[idx];
        tally.contacts_count += 1;
        if tally.seen_clients.insert(event.client_id) {
            tally.clients.push(ContactedClient {
                id: event.client_id,
                name: event.client_name.clone(),
            });
        }
    }

    let mut items: Vec<ManagerContactSummary> = tallies
        .into_iter()
        .map(|t| ManagerContactSummary {
            manager_id: t.manager_id,
            manager_name: t.manager_name,
            contacts_count: t.contacts_count,
            unique_clients_count: t.clients.len(),
            clients: t.clients,
        })
        .collect();

    // sort_by is stable
    items.sort_by(|a, b| b.contacts_count.cmp(&a.contacts_count));

    let count = items.len();
    ManagerContactReport { items, count }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: i64, manager_id: i64, client_id: i64) -> ContactEvent {
        ContactEvent {
            id,
            installment_id: id * 10,
            manager_id,
            manager_name: format!("Manager {}", manager_id),
            client_id,
            client_name: format!("Client {}", client_id),
        }
    }

    #[test]
    fn test_repeat_contacts_and_unique_clients() {
        let events = vec![event(1, 1, 1), event(2, 1, 1), event(3, 1, 2), event(4, 2, 3)];
        let report = aggregate_contacts(&events);

        assert_eq!(report.count, 2);
        let ids: Vec<i64> = report.items.iter().map(|m| m.manager_id).collect();
        assert_eq!(ids, vec![1, 2]);

        let a = report.manager(1).unwrap();
        assert_eq!(a.contacts_count, 3);
        assert_eq!(a.unique_clients_count, 2);
        assert_eq!(
            a.clients,
            vec![
                ContactedClient { id: 1, name: "Client 1".to_string() },
                ContactedClient { id: 2, name: "Client 2".to_string() },
            ]
        );

        let b = report.manager(2).unwrap();
        assert_eq!(b.contacts_count, 1);
        assert_eq!(b.unique_clients_count, 1);
    }

    #[test]
    fn test_sorted_descending_with_stable_ties() {
        let events = vec![
            event(1, 7, 1),
            event(2, 3, 2),
            event(3, 9, 3),
            event(4, 9, 4),
            event(5, 3, 5),
            event(6, 9, 3),
        ];
        let report = aggregate_contacts(&events);

        let order: Vec<(i64, usize)> = report
            .items
            .iter()
            .map(|m| (m.manager_id, m.contacts_count))
            .collect();
        assert_eq!(order, vec![(9, 3), (3, 2), (7, 1)]);

        let tie_events = vec![event(1, 5, 1), event(2, 4, 2), event(3, 6, 3)];
        let ties: Vec<i64> = aggregate_contacts(&tie_events)
            .items
            .iter()
            .map(|m| m.manager_id)
            .collect();
        assert_eq!(ties, vec![5, 4, 6]);
    }

    #[test]
    fn test_counts_are_consistent() {
        let events: Vec<ContactEvent> = (0..40)
            .map(|i| event(i, i % 4, (i * 7) % 5))
            .collect();
        let report = aggregate_contacts(&events);

        let total: usize = report.items.iter().map(|m| m.contacts_count).sum();
        assert_eq!(total, events.len());
        for manager in &report.items {
            assert!(manager.unique_clients_count <= manager.contacts_count);
            assert_eq!(manager.unique_clients_count, manager.clients.len());
        }
    }

    #[test]
    fn test_no_events_no_managers() {
        let report = aggregate_contacts(&[]);
        assert!(report.items.is_empty());
        assert_eq!(report.count, 0);
    }
}
