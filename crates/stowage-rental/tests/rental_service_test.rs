//! Integration tests for the rental lifecycle and review services.

use chrono::NaiveDate;
use stowage_core::error::StowageError;
use stowage_core::models::rental_agreement::CreateRentalAgreement;
use stowage_core::models::rental_request::RequestStatus;
use stowage_core::models::session::SessionContext;
use stowage_core::models::tenant::NewTenant;
use stowage_core::models::user::{CreateUser, UserRole};
use stowage_core::models::warehouse::{
    Address, ClimateCondition, CreateWarehouse, StorageType, WarehouseStatus,
};
use stowage_core::repository::{
    RentalAgreementRepository, RentalRequestRepository, UserRepository, WarehouseRepository,
};
use stowage_db::repository::{
    SurrealRentalAgreementRepository, SurrealRentalRequestRepository, SurrealReviewRepository,
    SurrealUserRepository, SurrealWarehouseRepository,
};
use stowage_rental::{RentalConfig, RentalRequestInput, RentalService, ReviewService};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Service = RentalService<
    SurrealUserRepository<Db>,
    SurrealWarehouseRepository<Db>,
    SurrealRentalRequestRepository<Db>,
    SurrealRentalAgreementRepository<Db>,
>;

struct Fixture {
    db: Surreal<Db>,
    service: Service,
    owner: SessionContext,
    agents: Vec<SessionContext>,
    warehouse_id: Uuid,
}

async fn create_user(db: &Surreal<Db>, name: &str, role: UserRole) -> SessionContext {
    let user = SurrealUserRepository::new(db.clone())
        .create(CreateUser {
            username: name.into(),
            first_name: name.into(),
            last_name: "Test".into(),
            email: format!("{name}@example.com"),
            role,
        })
        .await
        .unwrap();
    SessionContext::for_user(&user)
}

/// Helper: in-memory DB with one owner, three agents and one `Available`
/// warehouse, plus the service wired to Surreal repositories.
async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    stowage_db::run_migrations(&db).await.unwrap();

    let owner = create_user(&db, "owner", UserRole::Owner).await;
    let mut agents = Vec::new();
    for name in ["agent1", "agent2", "agent3"] {
        agents.push(create_user(&db, name, UserRole::Agent).await);
    }

    let warehouse = SurrealWarehouseRepository::new(db.clone())
        .create(CreateWarehouse {
            owner_id: owner.user_id,
            size_sq_m: 1200,
            address: Address {
                street: "1 Dock Road".into(),
                city: "Hamburg".into(),
                postal_code: "20457".into(),
                country: "DE".into(),
            },
            storage_type: StorageType::ColdStorage,
            climate: ClimateCondition::Refrigerated,
        })
        .await
        .unwrap();

    let service = RentalService::new(
        SurrealUserRepository::new(db.clone()),
        SurrealWarehouseRepository::new(db.clone()),
        SurrealRentalRequestRepository::new(db.clone()),
        SurrealRentalAgreementRepository::new(db.clone()),
        RentalConfig::default(),
    );

    Fixture {
        db,
        service,
        owner,
        agents,
        warehouse_id: warehouse.id,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn input(warehouse_id: Uuid, agents: &[&SessionContext]) -> RentalRequestInput {
    RentalRequestInput {
        warehouse_id,
        agent_ids: agents.iter().map(|a| a.user_id).collect(),
        monthly_price_cents: 450_000,
        start_date: date(2026, 1, 1),
        end_date: date(2026, 12, 31),
    }
}

fn jane_doe() -> NewTenant {
    NewTenant {
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        company: "Doe Logistics".into(),
    }
}

async fn warehouse_status(f: &Fixture) -> WarehouseStatus {
    SurrealWarehouseRepository::new(f.db.clone())
        .get_by_id(f.warehouse_id)
        .await
        .unwrap()
        .status
}

// -----------------------------------------------------------------------
// Request rounds
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_requests_moves_warehouse_to_pending() {
    let f = setup().await;

    let round = f
        .service
        .create_rental_requests(&f.owner, input(f.warehouse_id, &[&f.agents[0], &f.agents[1]]))
        .await
        .unwrap();

    assert_eq!(round.requests.len(), 2);
    assert_eq!(round.details.monthly_price_cents, 450_000);
    for request in &round.requests {
        assert_eq!(request.status, RequestStatus::Pending);
        assert!(!request.invalid);
        assert_eq!(request.details_id, round.details.id);
        assert_eq!(request.warehouse_id, f.warehouse_id);
    }
    assert_eq!(warehouse_status(&f).await, WarehouseStatus::PendingRental);

    let pending = f.service.pending_requests_for_agent(&f.agents[0]).await.unwrap();
    assert_eq!(pending.len(), 1);
    let pending = f.service.pending_requests_for_agent(&f.agents[2]).await.unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn create_requests_rejects_pending_warehouse() {
    let f = setup().await;
    f.service
        .create_rental_requests(&f.owner, input(f.warehouse_id, &[&f.agents[0]]))
        .await
        .unwrap();

    let err = f
        .service
        .create_rental_requests(&f.owner, input(f.warehouse_id, &[&f.agents[1]]))
        .await
        .unwrap_err();
    assert!(matches!(err, StowageError::RequestCreation(_)));

    let requests = f
        .service
        .requests_for_warehouse(&f.owner, f.warehouse_id, true)
        .await
        .unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn create_requests_for_unknown_warehouse_fails() {
    let f = setup().await;
    let err = f
        .service
        .create_rental_requests(&f.owner, input(Uuid::new_v4(), &[&f.agents[0]]))
        .await
        .unwrap_err();
    assert!(matches!(err, StowageError::RequestCreation(_)));
}

#[tokio::test]
async fn create_requests_validates_agents() {
    let f = setup().await;

    let empty = input(f.warehouse_id, &[]);
    let err = f.service.create_rental_requests(&f.owner, empty).await.unwrap_err();
    assert!(matches!(err, StowageError::Validation { .. }));

    let duplicate = input(f.warehouse_id, &[&f.agents[0], &f.agents[0]]);
    let err = f
        .service
        .create_rental_requests(&f.owner, duplicate)
        .await
        .unwrap_err();
    assert!(matches!(err, StowageError::Validation { .. }));

    let not_agent = input(f.warehouse_id, &[&f.owner]);
    let err = f
        .service
        .create_rental_requests(&f.owner, not_agent)
        .await
        .unwrap_err();
    assert!(matches!(err, StowageError::Validation { .. }));

    let mut unknown = input(f.warehouse_id, &[]);
    unknown.agent_ids.push(Uuid::new_v4());
    let err = f.service.create_rental_requests(&f.owner, unknown).await.unwrap_err();
    assert!(matches!(err, StowageError::Validation { .. }));

    // Nothing was persisted and the warehouse is untouched.
    assert_eq!(warehouse_status(&f).await, WarehouseStatus::Available);
}

#[tokio::test]
async fn create_requests_validates_terms() {
    let f = setup().await;

    let mut free = input(f.warehouse_id, &[&f.agents[0]]);
    free.monthly_price_cents = 0;
    let err = f.service.create_rental_requests(&f.owner, free).await.unwrap_err();
    assert!(matches!(err, StowageError::Validation { .. }));

    let mut backwards = input(f.warehouse_id, &[&f.agents[0]]);
    backwards.end_date = date(2025, 6, 1);
    let err = f
        .service
        .create_rental_requests(&f.owner, backwards)
        .await
        .unwrap_err();
    assert!(matches!(err, StowageError::Validation { .. }));

    assert_eq!(warehouse_status(&f).await, WarehouseStatus::Available);
}

#[tokio::test]
async fn create_requests_respects_agent_limit() {
    let mut f = setup().await;
    f.service = RentalService::new(
        SurrealUserRepository::new(f.db.clone()),
        SurrealWarehouseRepository::new(f.db.clone()),
        SurrealRentalRequestRepository::new(f.db.clone()),
        SurrealRentalAgreementRepository::new(f.db.clone()),
        RentalConfig {
            max_agents_per_request: 2,
            ..RentalConfig::default()
        },
    );

    let err = f
        .service
        .create_rental_requests(
            &f.owner,
            input(f.warehouse_id, &[&f.agents[0], &f.agents[1], &f.agents[2]]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StowageError::Validation { .. }));
}

#[tokio::test]
async fn only_the_owner_can_solicit_agents() {
    let f = setup().await;
    let err = f
        .service
        .create_rental_requests(&f.agents[0], input(f.warehouse_id, &[&f.agents[1]]))
        .await
        .unwrap_err();
    assert!(matches!(err, StowageError::AuthorizationDenied { .. }));

    let admin = create_user(&f.db, "admin", UserRole::Administrator).await;
    f.service
        .create_rental_requests(&admin, input(f.warehouse_id, &[&f.agents[1]]))
        .await
        .unwrap();
}

// -----------------------------------------------------------------------
// Accept / decline
// -----------------------------------------------------------------------

#[tokio::test]
async fn accept_invalidates_competing_requests() {
    let f = setup().await;
    let round = f
        .service
        .create_rental_requests(&f.owner, input(f.warehouse_id, &[&f.agents[0], &f.agents[1]]))
        .await
        .unwrap();

    let accepted = f
        .service
        .accept_rental_request(&f.agents[0], round.requests[0].id)
        .await
        .unwrap();
    assert_eq!(accepted.status, RequestStatus::Accepted);
    assert!(!accepted.invalid);

    let repo = SurrealRentalRequestRepository::new(f.db.clone());
    let other = repo.get_by_id(round.requests[1].id).await.unwrap();
    assert!(other.invalid);
    assert_eq!(other.status, RequestStatus::Pending);

    let open = f.service.pending_requests_for_agent(&f.agents[1]).await.unwrap();
    assert!(open.is_empty());
    let mine = f.service.accepted_requests_for_agent(&f.agents[0]).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(warehouse_status(&f).await, WarehouseStatus::PendingRental);
}

#[tokio::test]
async fn second_acceptance_loses_the_race() {
    let f = setup().await;
    let round = f
        .service
        .create_rental_requests(&f.owner, input(f.warehouse_id, &[&f.agents[0], &f.agents[1]]))
        .await
        .unwrap();

    f.service
        .accept_rental_request(&f.agents[0], round.requests[0].id)
        .await
        .unwrap();

    let err = f
        .service
        .accept_rental_request(&f.agents[1], round.requests[1].id)
        .await
        .unwrap_err();
    match err {
        StowageError::RequestCreation(msg) => assert!(msg.contains("taken by another agent")),
        other => panic!("unexpected error: {other:?}"),
    }

    let valid = f
        .service
        .requests_for_warehouse(&f.owner, f.warehouse_id, false)
        .await
        .unwrap();
    assert_eq!(valid.len(), 1);
    assert_eq!(valid[0].agent_id, f.agents[0].user_id);
}

#[tokio::test]
async fn accepting_someone_elses_request_is_denied() {
    let f = setup().await;
    let round = f
        .service
        .create_rental_requests(&f.owner, input(f.warehouse_id, &[&f.agents[0]]))
        .await
        .unwrap();

    let err = f
        .service
        .accept_rental_request(&f.agents[1], round.requests[0].id)
        .await
        .unwrap_err();
    assert!(matches!(err, StowageError::AuthorizationDenied { .. }));
}

#[tokio::test]
async fn accepting_unknown_request_fails() {
    let f = setup().await;
    let err = f
        .service
        .accept_rental_request(&f.agents[0], Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, StowageError::RequestCreation(_)));
}

#[tokio::test]
async fn declining_the_last_request_releases_the_warehouse() {
    let f = setup().await;
    let round = f
        .service
        .create_rental_requests(&f.owner, input(f.warehouse_id, &[&f.agents[0], &f.agents[1]]))
        .await
        .unwrap();

    let declined = f
        .service
        .decline_rental_request(&f.agents[0], round.requests[0].id)
        .await
        .unwrap();
    assert_eq!(declined.status, RequestStatus::Declined);
    assert!(declined.invalid);
    assert_eq!(warehouse_status(&f).await, WarehouseStatus::PendingRental);

    f.service
        .decline_rental_request(&f.agents[1], round.requests[1].id)
        .await
        .unwrap();
    assert_eq!(warehouse_status(&f).await, WarehouseStatus::Available);

    // A released warehouse can be offered again.
    f.service
        .create_rental_requests(&f.owner, input(f.warehouse_id, &[&f.agents[2]]))
        .await
        .unwrap();
}

#[tokio::test]
async fn listing_requests_requires_agent_role() {
    let f = setup().await;
    let err = f.service.pending_requests_for_agent(&f.owner).await.unwrap_err();
    assert!(matches!(err, StowageError::AuthorizationDenied { .. }));

    let err = f
        .service
        .requests_for_warehouse(&f.agents[0], f.warehouse_id, true)
        .await
        .unwrap_err();
    assert!(matches!(err, StowageError::AuthorizationDenied { .. }));
}

#[tokio::test]
async fn available_warehouses_excludes_pending() {
    let f = setup().await;
    let available = f.service.available_warehouses(&f.owner).await.unwrap();
    assert_eq!(available.len(), 1);

    f.service
        .create_rental_requests(&f.owner, input(f.warehouse_id, &[&f.agents[0]]))
        .await
        .unwrap();
    let available = f.service.available_warehouses(&f.owner).await.unwrap();
    assert!(available.is_empty());
}

// -----------------------------------------------------------------------
// Agreements
// -----------------------------------------------------------------------

#[tokio::test]
async fn full_rental_lifecycle() {
    let f = setup().await;
    let round = f
        .service
        .create_rental_requests(&f.owner, input(f.warehouse_id, &[&f.agents[0], &f.agents[1]]))
        .await
        .unwrap();
    let winner = round.requests[0].id;

    f.service
        .accept_rental_request(&f.agents[0], winner)
        .await
        .unwrap();

    let agreement = f
        .service
        .create_rental_agreement(
            &f.agents[0],
            CreateRentalAgreement {
                request_id: winner,
                warehouse_id: f.warehouse_id,
                agent_id: f.agents[0].user_id,
                tenant: jane_doe(),
            },
        )
        .await
        .unwrap();

    assert_eq!(agreement.warehouse_id, f.warehouse_id);
    assert_eq!(agreement.agent_id, f.agents[0].user_id);
    assert_eq!(agreement.request_id, winner);
    assert_eq!(agreement.start_date, date(2026, 1, 1));
    assert_eq!(agreement.end_date, date(2026, 12, 31));
    assert_eq!(agreement.monthly_price_cents, 450_000);

    let requests = SurrealRentalRequestRepository::new(f.db.clone());
    assert!(requests.get_by_id(winner).await.unwrap().invalid);
    assert!(requests.get_by_id(round.requests[1].id).await.unwrap().invalid);
    assert_eq!(warehouse_status(&f).await, WarehouseStatus::Rented);

    let agreements = SurrealRentalAgreementRepository::new(f.db.clone());
    let all = agreements.list_by_warehouse(f.warehouse_id).await.unwrap();
    assert_eq!(all.len(), 1);

    let accepted = f.service.accepted_requests_for_agent(&f.agents[0]).await.unwrap();
    assert!(accepted.is_empty());
}

#[tokio::test]
async fn agreement_needs_an_accepted_request() {
    let f = setup().await;
    let round = f
        .service
        .create_rental_requests(&f.owner, input(f.warehouse_id, &[&f.agents[0]]))
        .await
        .unwrap();

    let err = f
        .service
        .create_rental_agreement(
            &f.agents[0],
            CreateRentalAgreement {
                request_id: round.requests[0].id,
                warehouse_id: f.warehouse_id,
                agent_id: f.agents[0].user_id,
                tenant: jane_doe(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StowageError::RentalAgreementCreation(_)));
    assert_eq!(warehouse_status(&f).await, WarehouseStatus::PendingRental);
}

#[tokio::test]
async fn agreement_cannot_be_recorded_twice() {
    let f = setup().await;
    let round = f
        .service
        .create_rental_requests(&f.owner, input(f.warehouse_id, &[&f.agents[0]]))
        .await
        .unwrap();
    let request_id = round.requests[0].id;
    f.service
        .accept_rental_request(&f.agents[0], request_id)
        .await
        .unwrap();

    let create = || CreateRentalAgreement {
        request_id,
        warehouse_id: f.warehouse_id,
        agent_id: f.agents[0].user_id,
        tenant: jane_doe(),
    };
    f.service
        .create_rental_agreement(&f.agents[0], create())
        .await
        .unwrap();

    let err = f
        .service
        .create_rental_agreement(&f.agents[0], create())
        .await
        .unwrap_err();
    assert!(matches!(err, StowageError::RentalAgreementCreation(_)));
}

#[tokio::test]
async fn agreement_for_mismatched_warehouse_is_rejected() {
    let f = setup().await;
    let round = f
        .service
        .create_rental_requests(&f.owner, input(f.warehouse_id, &[&f.agents[0]]))
        .await
        .unwrap();
    f.service
        .accept_rental_request(&f.agents[0], round.requests[0].id)
        .await
        .unwrap();

    let err = f
        .service
        .create_rental_agreement(
            &f.agents[0],
            CreateRentalAgreement {
                request_id: round.requests[0].id,
                warehouse_id: Uuid::new_v4(),
                agent_id: f.agents[0].user_id,
                tenant: jane_doe(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StowageError::RentalAgreementCreation(_)));
}

#[tokio::test]
async fn agreement_requires_tenant_details() {
    let f = setup().await;
    let err = f
        .service
        .create_rental_agreement(
            &f.agents[0],
            CreateRentalAgreement {
                request_id: Uuid::new_v4(),
                warehouse_id: f.warehouse_id,
                agent_id: f.agents[0].user_id,
                tenant: NewTenant {
                    first_name: "Jane".into(),
                    last_name: "".into(),
                    company: "Doe Logistics".into(),
                },
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StowageError::Validation { .. }));
}

#[tokio::test]
async fn agreement_for_another_agent_is_denied() {
    let f = setup().await;
    let err = f
        .service
        .create_rental_agreement(
            &f.agents[1],
            CreateRentalAgreement {
                request_id: Uuid::new_v4(),
                warehouse_id: f.warehouse_id,
                agent_id: f.agents[0].user_id,
                tenant: jane_doe(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StowageError::AuthorizationDenied { .. }));
}

// -----------------------------------------------------------------------
// Reviews
// -----------------------------------------------------------------------

#[tokio::test]
async fn review_is_recorded_on_the_agent() {
    let f = setup().await;
    let reviews = ReviewService::new(SurrealReviewRepository::new(f.db.clone()));

    let review = reviews
        .create_and_persist_review(&f.owner, f.agents[0].user_id, 4, "Quick and reliable")
        .await
        .unwrap();
    assert_eq!(review.assessment, 4);
    assert_eq!(review.reviewer_id, f.owner.user_id);

    let agent = SurrealUserRepository::new(f.db.clone())
        .get_by_id(f.agents[0].user_id)
        .await
        .unwrap();
    assert_eq!(agent.received_reviews, vec![review.id]);

    let listed = reviews.reviews_for_agent(f.agents[0].user_id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].description, "Quick and reliable");
}

#[tokio::test]
async fn out_of_range_assessment_is_illegal() {
    let f = setup().await;
    let reviews = ReviewService::new(SurrealReviewRepository::new(f.db.clone()));

    for assessment in [0, 6] {
        let err = reviews
            .create_and_persist_review(&f.owner, f.agents[0].user_id, assessment, "n/a")
            .await
            .unwrap_err();
        assert!(matches!(err, StowageError::IllegalArgument(_)));
    }
    assert!(reviews.reviews_for_agent(f.agents[0].user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn reviewing_a_non_agent_fails_to_persist() {
    let f = setup().await;
    let reviews = ReviewService::new(SurrealReviewRepository::new(f.db.clone()));

    let err = reviews
        .create_and_persist_review(&f.agents[0], f.owner.user_id, 5, "Great owner")
        .await
        .unwrap_err();
    assert!(matches!(err, StowageError::ReviewPersistence(_)));
    assert!(reviews.reviews_for_agent(f.owner.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn agents_cannot_review_themselves() {
    let f = setup().await;
    let reviews = ReviewService::new(SurrealReviewRepository::new(f.db.clone()));

    let err = reviews
        .create_and_persist_review(&f.agents[0], f.agents[0].user_id, 5, "Excellent")
        .await
        .unwrap_err();
    assert!(matches!(err, StowageError::AuthorizationDenied { .. }));
}
