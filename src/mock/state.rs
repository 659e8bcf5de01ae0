//! In-memory data behind the mock backend. Seeded with one account per role so every
//! permission branch can be exercised.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::client::{Department, LeaveRequest, LeaveStatus, Mission};
use crate::identity::{Role, User};

pub const SEED_PASSWORD: &str = "password";

#[derive(Debug, Clone)]
pub struct Account {
    pub user: User,
    pub password: String,
}

#[derive(Debug, Default)]
pub struct MockDb {
    pub accounts: Vec<Account>,
    pub departments: Vec<Department>,
    pub leave_requests: Vec<LeaveRequest>,
    pub missions: Vec<Mission>,
    /// Bearer token -> user id
    pub tokens: HashMap<String, i64>,
    next_id: i64,
}

impl MockDb {
    pub fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn user(&self, id: i64) -> Option<&User> { self.accounts.iter().find(|a| a.user.id == id).map(|a| &a.user) }

    pub fn user_by_token(&self, token: &str) -> Option<&User> { self.tokens.get(token).and_then(|id| self.user(*id)) }

    fn employee_count(&self, department_id: i64) -> u32 {
        self.accounts.iter().filter(|a| a.user.department_id == Some(department_id)).count() as u32
    }

    /// Departments with their employee counts refreshed.
    pub fn departments_view(&self) -> Vec<Department> {
        self.departments
            .iter()
            .cloned()
            .map(|mut d| {
                d.employee_count = Some(self.employee_count(d.id));
                d
            })
            .collect()
    }

    pub fn seeded() -> Self {
        let mut db = MockDb::default();
        let now = Utc::now();

        let eng = db.next_id();
        let hr = db.next_id();
        db.departments.push(Department {
            id: eng,
            name: "Engineering".into(),
            name_ar: Some("الهندسة".into()),
            description: Some("Product and platform engineering".into()),
            description_ar: None,
            manager_id: None,
            employee_count: None,
            created_at: Some(now),
        });
        db.departments.push(Department {
            id: hr,
            name: "Human Resources".into(),
            name_ar: Some("الموارد البشرية".into()),
            description: None,
            description_ar: None,
            manager_id: None,
            employee_count: None,
            created_at: Some(now),
        });

        let seed = [
            ("General Manager", "gm@kmt.io", Role::GeneralManager, eng),
            ("HR Manager", "hr@kmt.io", Role::HrManager, hr),
            ("Team Lead", "lead@kmt.io", Role::TeamLeader, eng),
            ("Developer", "dev@kmt.io", Role::Default, eng),
        ];
        for (name, email, role, dept) in seed {
            let id = db.next_id();
            db.accounts.push(Account {
                user: User {
                    id,
                    name: name.into(),
                    email: email.into(),
                    role,
                    department_id: Some(dept),
                    is_active: true,
                    created_at: now,
                },
                password: SEED_PASSWORD.into(),
            });
        }
        if let Some(lead) = db.accounts.iter().find(|a| a.user.role == Role::TeamLeader).map(|a| a.user.id) {
            if let Some(d) = db.departments.iter_mut().find(|d| d.id == eng) {
                d.manager_id = Some(lead);
            }
        }

        let dev = db.accounts.iter().find(|a| a.user.role == Role::Default).map(|a| (a.user.id, a.user.name.clone()));
        if let Some((dev_id, dev_name)) = dev {
            let id = db.next_id();
            db.leave_requests.push(LeaveRequest {
                id,
                user_id: dev_id,
                user_name: Some(dev_name.clone()),
                leave_type_id: 1,
                leave_type_name: Some("Annual".into()),
                start_date: "2024-08-12".into(),
                end_date: "2024-08-16".into(),
                days: Some(5.0),
                reason: Some("Family trip".into()),
                status: LeaveStatus::Pending,
                reviewer_comment: None,
            });
            let id = db.next_id();
            db.leave_requests.push(LeaveRequest {
                id,
                user_id: dev_id,
                user_name: Some(dev_name),
                leave_type_id: 2,
                leave_type_name: Some("Sick".into()),
                start_date: "2024-03-04".into(),
                end_date: "2024-03-04".into(),
                days: Some(1.0),
                reason: None,
                status: LeaveStatus::Approved,
                reviewer_comment: Some("Get well soon".into()),
            });
        }

        let id = db.next_id();
        db.missions.push(Mission {
            id,
            title: "Client onboarding".into(),
            description: Some("On-site rollout support".into()),
            location: Some("Jeddah".into()),
            start_date: Some("2024-10-01".into()),
            end_date: Some("2024-10-03".into()),
            status: Some("planned".into()),
        });
        db
    }
}

/// Shared handle injected into every handler.
#[derive(Clone, Debug)]
pub struct MockState {
    pub db: Arc<RwLock<MockDb>>,
}

impl MockState {
    pub fn new(db: MockDb) -> Self { Self { db: Arc::new(RwLock::new(db)) } }

    pub fn seeded() -> Self { Self::new(MockDb::seeded()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_has_one_account_per_role() {
        let db = MockDb::seeded();
        for role in Role::ALL {
            assert_eq!(db.accounts.iter().filter(|a| a.user.role == role).count(), 1, "role {}", role);
        }
        let ids: std::collections::HashSet<i64> = db
            .accounts
            .iter()
            .map(|a| a.user.id)
            .chain(db.departments.iter().map(|d| d.id))
            .collect();
        assert_eq!(ids.len(), db.accounts.len() + db.departments.len());
    }

    #[test]
    fn employee_counts() {
        let db = MockDb::seeded();
        let view = db.departments_view();
        let eng = view.iter().find(|d| d.name == "Engineering").unwrap();
        assert_eq!(eng.employee_count, Some(3));
    }
}
