use std::sync::Arc;

use crate::auth::{OrgScope, Principal};
use crate::db::{
    Database, DbError, NewTicket, OrganizationRepository, SqliteDatabase, TicketPatch,
    TicketSearch, TicketStatus,
};
use crate::service::{DEFAULT_ORGANIZATION_NAME, TicketService};

fn scope(org: &str) -> OrgScope {
    Principal::new("member-1", Some(org.to_string()))
        .org_scope()
        .unwrap()
}

async fn setup() -> (Arc<SqliteDatabase>, TicketService<SqliteDatabase>) {
    let db = SqliteDatabase::in_memory().await.unwrap();
    db.migrate().await.unwrap();
    let db = Arc::new(db);

    let service = TicketService::new(Arc::clone(&db));
    for org in ["org-a", "org-b"] {
        service
            .get_or_create_organization(&scope(org), DEFAULT_ORGANIZATION_NAME)
            .await
            .unwrap();
    }
    (db, service)
}

fn new_ticket(title: &str, assignee: &str) -> NewTicket {
    NewTicket {
        title: title.to_string(),
        assignee: assignee.to_string(),
        description: None,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_then_get_returns_backlog_ticket() {
    let (_db, service) = setup().await;
    let a = scope("org-a");

    let created = service
        .create(
            &a,
            NewTicket {
                title: "Fix bug".to_string(),
                assignee: "bob".to_string(),
                description: Some("crash on save".to_string()),
            },
        )
        .await
        .unwrap();

    let fetched = service.get(&a, &created.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, TicketStatus::Backlog);
    assert_eq!(fetched.title, "Fix bug");
    assert_eq!(fetched.assignee, "bob");
    assert_eq!(fetched.description.as_deref(), Some("crash on save"));
    assert_eq!(fetched.organization_id, "org-a");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_rejects_blank_title_and_assignee() {
    let (_db, service) = setup().await;
    let a = scope("org-a");

    let err = service.create(&a, new_ticket("  ", "bob")).await.unwrap_err();
    assert!(matches!(err, DbError::Validation { .. }));

    let err = service.create(&a, new_ticket("Fix", "")).await.unwrap_err();
    assert!(matches!(err, DbError::Validation { .. }));

    assert!(service.list(&a).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_other_tenant_cannot_see_or_touch_ticket() {
    let (_db, service) = setup().await;
    let a = scope("org-a");
    let b = scope("org-b");

    let ticket = service.create(&a, new_ticket("Fix bug", "bob")).await.unwrap();

    assert!(service.get(&b, &ticket.id).await.unwrap().is_none());
    assert!(service.list(&b).await.unwrap().is_empty());
    assert!(
        service
            .search(&b, &TicketSearch::default())
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        service
            .update_status(&b, &ticket.id, TicketStatus::Done)
            .await
            .unwrap()
            .is_none()
    );
    assert!(!service.delete(&b, &ticket.id).await.unwrap());

    let untouched = service.get(&a, &ticket.id).await.unwrap().unwrap();
    assert_eq!(untouched, ticket);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_update_status_changes_only_status_and_timestamp() {
    let (_db, service) = setup().await;
    let a = scope("org-a");
    let ticket = service
        .create(
            &a,
            NewTicket {
                title: "Fix bug".to_string(),
                assignee: "bob".to_string(),
                description: Some("details".to_string()),
            },
        )
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let updated = service
        .update_status(&a, &ticket.id, TicketStatus::Done)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.status, TicketStatus::Done);
    assert_ne!(updated.updated_at, ticket.updated_at);
    assert_eq!(updated.title, ticket.title);
    assert_eq!(updated.assignee, ticket.assignee);
    assert_eq!(updated.description, ticket.description);
    assert_eq!(updated.created_at, ticket.created_at);
    assert_eq!(updated.organization_id, ticket.organization_id);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_partial_update_applies_present_fields_only() {
    let (_db, service) = setup().await;
    let a = scope("org-a");
    let ticket = service
        .create(
            &a,
            NewTicket {
                title: "Fix bug".to_string(),
                assignee: "bob".to_string(),
                description: Some("details".to_string()),
            },
        )
        .await
        .unwrap();

    let updated = service
        .update(
            &a,
            &ticket.id,
            TicketPatch {
                assignee: Some("carol".to_string()),
                description: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.title, "Fix bug");
    assert_eq!(updated.assignee, "carol");
    assert_eq!(updated.status, TicketStatus::Backlog);
    assert_eq!(updated.description, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_partial_update_rejects_blank_title() {
    let (_db, service) = setup().await;
    let a = scope("org-a");
    let ticket = service.create(&a, new_ticket("Fix bug", "bob")).await.unwrap();

    let err = service
        .update(
            &a,
            &ticket.id,
            TicketPatch {
                title: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::Validation { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_twice_reports_not_found() {
    let (_db, service) = setup().await;
    let a = scope("org-a");
    let ticket = service.create(&a, new_ticket("Fix bug", "bob")).await.unwrap();

    assert!(service.delete(&a, &ticket.id).await.unwrap());
    assert!(!service.delete(&a, &ticket.id).await.unwrap());
    assert!(service.get(&a, &ticket.id).await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_assignee_search_ignores_case() {
    let (_db, service) = setup().await;
    let a = scope("org-a");
    service.create(&a, new_ticket("One", "Alice")).await.unwrap();
    service.create(&a, new_ticket("Two", "alice")).await.unwrap();
    service.create(&a, new_ticket("Three", "bob")).await.unwrap();

    let lower = service
        .search(
            &a,
            &TicketSearch {
                assignee: Some("Alice".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let upper = service
        .search(
            &a,
            &TicketSearch {
                assignee: Some("ALICE".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(lower.len(), 2);
    assert_eq!(lower, upper);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_statistics_cover_only_own_organization() {
    let (_db, service) = setup().await;
    let a = scope("org-a");
    let b = scope("org-b");

    let first = service.create(&a, new_ticket("One", "alice")).await.unwrap();
    service.create(&a, new_ticket("Two", "alice")).await.unwrap();
    service.create(&a, new_ticket("Three", "bob")).await.unwrap();
    service
        .update_status(&a, &first.id, TicketStatus::InProgress)
        .await
        .unwrap();
    service.create(&b, new_ticket("Elsewhere", "zed")).await.unwrap();

    let stats = service.statistics(&a).await.unwrap();

    assert_eq!(stats.total_tickets, 3);
    assert_eq!(stats.organization_id, "org-a");
    assert_eq!(stats.status_distribution.get("backlog"), Some(&2));
    assert_eq!(stats.status_distribution.get("in-progress"), Some(&1));
    assert_eq!(stats.status_distribution.get("done"), None);
    assert_eq!(stats.assignee_distribution.get("alice"), Some(&2));
    assert_eq!(stats.assignee_distribution.get("bob"), Some(&1));
    assert!(!stats.assignee_distribution.contains_key("zed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_or_create_organization_is_idempotent() {
    let (db, service) = setup().await;
    let c = scope("org-c");

    assert!(service.organization(&c).await.unwrap().is_none());

    let first = service
        .get_or_create_organization(&c, DEFAULT_ORGANIZATION_NAME)
        .await
        .unwrap();
    let second = service
        .get_or_create_organization(&c, "Another Name")
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(second.name, DEFAULT_ORGANIZATION_NAME);
    assert!(db.organizations().get("org-c").await.unwrap().is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_full_scenario_across_two_organizations() {
    let (_db, service) = setup().await;
    let a = scope("org-a");
    let b = scope("org-b");

    let ticket = service.create(&a, new_ticket("Fix bug", "bob")).await.unwrap();
    assert_eq!(service.list(&a).await.unwrap().len(), 1);
    assert_eq!(ticket.status, TicketStatus::Backlog);

    assert!(service.get(&b, &ticket.id).await.unwrap().is_none());

    let moved = service
        .update_status(&a, &ticket.id, TicketStatus::InProgress)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.status, TicketStatus::InProgress);

    assert!(service.delete(&a, &ticket.id).await.unwrap());
    assert!(service.get(&a, &ticket.id).await.unwrap().is_none());
}
