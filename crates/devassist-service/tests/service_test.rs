//! Service-level tests over in-memory SurrealDB repositories.

use devassist_core::error::DevAssistError;
use devassist_core::models::kb_article::CreateKbArticle;
use devassist_core::models::ticket::{
    TicketComponent, TicketFilter, TicketSeverity, TicketStatus, UpdateTicket,
};
use devassist_core::models::user::{Caller, Role};
use devassist_db::repository::{
    SurrealCommentRepository, SurrealKbArticleRepository, SurrealTicketRepository,
};
use devassist_service::{CommentService, KbService, NewTicket, SuggestionService, TicketService};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Tickets = SurrealTicketRepository<Db>;
type Comments = SurrealCommentRepository<Db>;

struct Fixture {
    db: Surreal<Db>,
    tickets: TicketService<Tickets, Comments>,
    comments: CommentService<Tickets, Comments>,
}

async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    devassist_db::run_migrations(&db).await.unwrap();

    Fixture {
        tickets: TicketService::new(
            SurrealTicketRepository::new(db.clone()),
            SurrealCommentRepository::new(db.clone()),
        ),
        comments: CommentService::new(
            SurrealTicketRepository::new(db.clone()),
            SurrealCommentRepository::new(db.clone()),
        ),
        db,
    }
}

fn caller(role: Role) -> Caller {
    Caller {
        id: Uuid::new_v4(),
        email: format!("{}@example.com", role.as_str().to_lowercase()),
        role,
    }
}

fn new_ticket(title: &str) -> NewTicket {
    NewTicket {
        title: title.into(),
        description: "Something is broken again".into(),
        severity: TicketSeverity::P1,
        component: TicketComponent::Cline,
    }
}

#[tokio::test]
async fn requester_is_creator_and_survives_updates() {
    let f = setup().await;
    let engineer = caller(Role::Engineer);
    let support = caller(Role::Support);

    let ticket = f.tickets.create(&engineer, new_ticket("Cline stalls")).await.unwrap();
    assert_eq!(ticket.requester_id, engineer.id);
    assert_eq!(ticket.status, TicketStatus::Open);

    let updated = f
        .tickets
        .update(
            &support,
            ticket.id,
            UpdateTicket {
                status: Some(TicketStatus::Resolved),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.requester_id, engineer.id);
    assert_eq!(updated.status, TicketStatus::Resolved);
}

#[tokio::test]
async fn engineer_may_update_only_own_ticket() {
    let f = setup().await;
    let owner = caller(Role::Engineer);
    let stranger = caller(Role::Engineer);

    let ticket = f.tickets.create(&owner, new_ticket("Own ticket")).await.unwrap();
    let patch = UpdateTicket {
        title: Some("Renamed ticket".into()),
        ..Default::default()
    };

    let err = f
        .tickets
        .update(&stranger, ticket.id, patch.clone())
        .await
        .unwrap_err();
    match err {
        DevAssistError::Forbidden { reason } => {
            assert_eq!(reason, "Not authorized to update this ticket")
        }
        other => panic!("unexpected: {other:?}"),
    }

    let ok = f.tickets.update(&owner, ticket.id, patch).await.unwrap();
    assert_eq!(ok.title, "Renamed ticket");
}

#[tokio::test]
async fn engineer_cannot_assign_even_own_ticket() {
    let f = setup().await;
    let owner = caller(Role::Engineer);
    let ticket = f.tickets.create(&owner, new_ticket("Assign me")).await.unwrap();

    let err = f
        .tickets
        .assign(&owner, ticket.id, Some("anyone".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, DevAssistError::Forbidden { .. }));

    // Denied before the lookup, so a missing ticket is still Forbidden.
    let err = f
        .tickets
        .assign(&owner, Uuid::new_v4(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DevAssistError::Forbidden { .. }));
}

#[tokio::test]
async fn staff_assign_sets_and_clears_assignee() {
    let f = setup().await;
    let owner = caller(Role::Engineer);
    let admin = caller(Role::Admin);
    let ticket = f.tickets.create(&owner, new_ticket("Assign me")).await.unwrap();

    let assigned = f
        .tickets
        .assign(&admin, ticket.id, Some("not-a-real-user".into()))
        .await
        .unwrap();
    assert_eq!(assigned.assignee_id.as_deref(), Some("not-a-real-user"));

    let cleared = f.tickets.assign(&admin, ticket.id, None).await.unwrap();
    assert!(cleared.assignee_id.is_none());

    let err = f
        .tickets
        .assign(&admin, Uuid::new_v4(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DevAssistError::NotFound { .. }));
}

#[tokio::test]
async fn staff_cannot_touch_unknown_ticket() {
    let f = setup().await;
    let support = caller(Role::Support);
    let missing = Uuid::new_v4();

    let err = f
        .tickets
        .assign(&support, missing, Some("support-queue".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, DevAssistError::NotFound { .. }));

    let err = f
        .tickets
        .update(
            &support,
            missing,
            UpdateTicket {
                status: Some(TicketStatus::Blocked),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DevAssistError::NotFound { .. }));

    // Neither call may have created the record.
    let page = f.tickets.list(TicketFilter::default()).await.unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn empty_update_returns_ticket_unchanged() {
    let f = setup().await;
    let owner = caller(Role::Engineer);
    let ticket = f.tickets.create(&owner, new_ticket("Leave me be")).await.unwrap();

    let same = f
        .tickets
        .update(&owner, ticket.id, UpdateTicket::default())
        .await
        .unwrap();
    assert_eq!(same.title, ticket.title);
    assert_eq!(same.updated_at, ticket.updated_at);

    // The policy still applies to an empty patch.
    let stranger = caller(Role::Engineer);
    let err = f
        .tickets
        .update(&stranger, ticket.id, UpdateTicket::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DevAssistError::Forbidden { .. }));
}

#[tokio::test]
async fn list_filters_are_conjunctive() {
    let f = setup().await;
    let owner = caller(Role::Engineer);

    let mut p0 = new_ticket("Prod down");
    p0.severity = TicketSeverity::P0;
    let wanted = f.tickets.create(&owner, p0.clone()).await.unwrap();
    let resolved = f.tickets.create(&owner, p0).await.unwrap();
    f.tickets
        .update(
            &owner,
            resolved.id,
            UpdateTicket {
                status: Some(TicketStatus::Resolved),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    f.tickets.create(&owner, new_ticket("Minor thing")).await.unwrap();

    let page = f
        .tickets
        .list(TicketFilter {
            status: Some(TicketStatus::Open),
            severity: Some(TicketSeverity::P0),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, wanted.id);
}

#[tokio::test]
async fn get_includes_comments_and_missing_is_not_found() {
    let f = setup().await;
    let owner = caller(Role::Engineer);
    let ticket = f.tickets.create(&owner, new_ticket("With comments")).await.unwrap();

    f.comments
        .add(&owner, ticket.id, "first note".into())
        .await
        .unwrap();

    let detail = f.tickets.get(ticket.id).await.unwrap();
    assert_eq!(detail.ticket.id, ticket.id);
    assert_eq!(detail.comments.len(), 1);
    assert_eq!(detail.comments[0].author_id, owner.id);

    let err = f.tickets.get(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, DevAssistError::NotFound { .. }));
}

#[tokio::test]
async fn comment_policy_follows_ownership_and_role() {
    let f = setup().await;
    let owner = caller(Role::Engineer);
    let stranger = caller(Role::Engineer);
    let support = caller(Role::Support);
    let ticket = f.tickets.create(&owner, new_ticket("Discuss this")).await.unwrap();

    let err = f
        .comments
        .add(&stranger, ticket.id, "drive-by".into())
        .await
        .unwrap_err();
    match err {
        DevAssistError::Forbidden { reason } => assert_eq!(reason, "Not authorized to comment"),
        other => panic!("unexpected: {other:?}"),
    }

    f.comments
        .add(&support, ticket.id, "looking into it".into())
        .await
        .unwrap();
    assert_eq!(f.comments.list(ticket.id).await.unwrap().len(), 1);

    let err = f
        .comments
        .add(&support, Uuid::new_v4(), "nowhere".into())
        .await
        .unwrap_err();
    assert!(matches!(err, DevAssistError::NotFound { .. }));
    assert!(matches!(
        f.comments.list(Uuid::new_v4()).await,
        Err(DevAssistError::NotFound { .. })
    ));
}

#[tokio::test]
async fn kb_delete_returns_id_then_not_found() {
    let f = setup().await;
    let kb = KbService::new(SurrealKbArticleRepository::new(f.db.clone()));

    let article = kb
        .create(CreateKbArticle {
            title: "Tags".into(),
            body: "Tags keep their order".into(),
            tags: vec!["a".into(), "b".into()],
        })
        .await
        .unwrap();
    assert_eq!(kb.get(article.id).await.unwrap().tags, vec!["a", "b"]);

    assert_eq!(kb.delete(article.id).await.unwrap(), article.id);
    for _ in 0..2 {
        assert!(matches!(
            kb.delete(article.id).await,
            Err(DevAssistError::NotFound { .. })
        ));
    }
}

#[tokio::test]
async fn suggestions_follow_feature_flag() {
    let f = setup().await;
    let owner = caller(Role::Engineer);
    let ticket = f.tickets.create(&owner, new_ticket("Suggest for me")).await.unwrap();

    let disabled = SuggestionService::new(SurrealTicketRepository::new(f.db.clone()), false);
    let err = disabled.suggest(ticket.id).await.unwrap_err();
    assert!(matches!(err, DevAssistError::Disabled { .. }));
    assert_eq!(err.to_string(), "AI Assist feature is not enabled");

    let enabled = SuggestionService::new(SurrealTicketRepository::new(f.db.clone()), true);
    let set = enabled.suggest(ticket.id).await.unwrap();
    assert_eq!(set.suggestions.len(), 3);
    assert_eq!(set.model, "stub-v1");
    assert!(
        set.suggestions
            .windows(2)
            .all(|w| w[0].relevance() >= w[1].relevance())
    );

    assert!(matches!(
        enabled.suggest(Uuid::new_v4()).await,
        Err(DevAssistError::NotFound { .. })
    ));
}
