//! Shared fixtures

use chrono::{DateTime, Utc};
use circulation_server::{
    config::AppConfig,
    models::{
        copy::CreateCopy, member::CreateMember, Copy, CopyStatus, Loan, Member, MemberTier,
    },
    repository::Repository,
    services::Services,
    AppState,
};
use uuid::Uuid;

pub const OPERATOR: &str = "operator";

/// Configuration with a 30 day premium loan and 14 day standard loan
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.backend = circulation_server::config::StorageBackend::Memory;
    config.lending.loan_days.insert("premium".to_string(), 30);
    config.lending.loan_days.insert("standard".to_string(), 14);
    config
}

pub struct Fixture {
    pub repository: Repository,
    pub services: Services,
}

pub fn fixture() -> Fixture {
    let repository = Repository::in_memory();
    let services = Services::new(repository.clone(), &test_config()).unwrap();
    Fixture { repository, services }
}

pub fn app_state() -> (AppState, Repository) {
    let repository = Repository::in_memory();
    let state = AppState::new(test_config(), repository.clone()).unwrap();
    (state, repository)
}

impl Fixture {
    pub async fn member(&self, tier: MemberTier) -> Member {
        self.services
            .members
            .register(
                CreateMember {
                    name: "Test Member".to_string(),
                    email: "member@example.org".to_string(),
                    phone: String::new(),
                    tier,
                },
                OPERATOR,
            )
            .await
            .unwrap()
    }

    pub async fn copy(&self, barcode: &str, status: CopyStatus) -> Copy {
        self.services
            .catalog
            .create_copy(
                CreateCopy {
                    isbn: "9780140449136".to_string(),
                    barcode: barcode.to_string(),
                    status: Some(status),
                },
                OPERATOR,
            )
            .await
            .unwrap()
    }

    pub async fn copy_status(&self, barcode: &str) -> CopyStatus {
        self.services.catalog.get_copy(barcode).await.unwrap().status
    }

    /// Insert an open loan directly, bypassing checkout
    pub async fn open_loan(&self, member_id: Uuid, barcode: &str, due_date: DateTime<Utc>) -> Loan {
        let loan = Loan {
            id: Uuid::new_v4(),
            member_id,
            copy_barcode: barcode.to_string(),
            loan_date: due_date - chrono::Duration::days(14),
            due_date,
            returned: false,
        };
        self.repository.loans.insert(&loan).await.unwrap();
        loan
    }
}
