//! Exercises the sqlx-backed stores against a real database.
//!
//! Run with `DATABASE_URL=postgres://... cargo test -- --ignored`.

use chrono::Utc;
use dotenv::dotenv;
use pretty_assertions::assert_eq;
use sqlx::PgPool;

use scoped_tasks::models::{NewUser, TaskFilter, TaskInput, TaskStatus, User};
use scoped_tasks::store::{self, CredentialStore, PgCredentialStore, PgTaskStore, TaskStore};
use scoped_tasks::AppError;

async fn pool() -> PgPool {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    store::postgres::connect(&database_url, 2)
        .await
        .expect("Failed to connect to test DB")
}

fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, Utc::now().timestamp_nanos_opt().unwrap_or_default() % 1_000_000_000)
}

fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        password_hash: "$2b$04$placeholderdigest".to_string(),
        salt: "00".repeat(16),
    }
}

fn input(title: &str, description: &str) -> TaskInput {
    TaskInput {
        title: title.to_string(),
        description: description.to_string(),
        status: None,
    }
}

async fn cleanup(pool: &PgPool, users: &[&User]) {
    for user in users {
        let _ = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user.id)
            .execute(pool)
            .await;
    }
}

#[ignore]
#[actix_rt::test]
async fn test_username_uniqueness_is_enforced_by_constraint() {
    let pool = pool().await;
    let credentials = PgCredentialStore::new(pool.clone());
    let username = unique("pg_dup");

    let user = credentials.create(new_user(&username)).await.unwrap();
    let again = credentials.create(new_user(&username)).await;
    assert!(matches!(again, Err(AppError::DuplicateIdentity(_))));

    let found = credentials.find_by_username(&username).await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(user.id));

    cleanup(&pool, &[&user]).await;
}

#[ignore]
#[actix_rt::test]
async fn test_task_queries_are_owner_scoped() {
    let pool = pool().await;
    let credentials = PgCredentialStore::new(pool.clone());
    let tasks = PgTaskStore::new(pool.clone());

    let alice = credentials.create(new_user(&unique("pg_alice"))).await.unwrap();
    let bob = credentials.create(new_user(&unique("pg_bob"))).await.unwrap();

    let milk = tasks.create(input("Buy MILK", "2%"), &alice).await.unwrap();
    let percent = tasks
        .create(input("Discount", "100% off_today"), &alice)
        .await
        .unwrap();
    tasks.create(input("bob milk", "mine"), &bob).await.unwrap();
    assert_eq!(milk.status, TaskStatus::Open);

    let all = tasks.list(&alice, &TaskFilter::default()).await.unwrap();
    assert_eq!(all.iter().map(|t| t.id).collect::<Vec<_>>(), vec![milk.id, percent.id]);

    let search = |s: &str| TaskFilter {
        status: None,
        search: Some(s.to_string()),
    };
    let found = tasks.list(&alice, &search("milk")).await.unwrap();
    assert_eq!(found.iter().map(|t| t.id).collect::<Vec<_>>(), vec![milk.id]);

    // Wildcards in the search term match literally.
    let found = tasks.list(&alice, &search("0%")).await.unwrap();
    assert_eq!(found.iter().map(|t| t.id).collect::<Vec<_>>(), vec![percent.id]);
    let found = tasks.list(&alice, &search("Disc_unt")).await.unwrap();
    assert!(found.is_empty());

    assert!(matches!(
        tasks.get_by_id(milk.id, &bob).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        tasks.update_status(milk.id, TaskStatus::Done, &bob).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        tasks.delete(milk.id, &bob).await,
        Err(AppError::NotFound(_))
    ));

    let done = tasks
        .update_status(milk.id, TaskStatus::Done, &alice)
        .await
        .unwrap();
    assert_eq!(done.status, TaskStatus::Done);
    let only_done = tasks
        .list(
            &alice,
            &TaskFilter {
                status: Some(TaskStatus::Done),
                search: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(only_done.iter().map(|t| t.id).collect::<Vec<_>>(), vec![milk.id]);

    tasks.delete(milk.id, &alice).await.unwrap();
    assert!(matches!(
        tasks.get_by_id(milk.id, &alice).await,
        Err(AppError::NotFound(_))
    ));

    cleanup(&pool, &[&alice, &bob]).await;
}

#[ignore]
#[actix_rt::test]
async fn test_empty_title_is_a_validation_error() {
    let pool = pool().await;
    let credentials = PgCredentialStore::new(pool.clone());
    let tasks = PgTaskStore::new(pool.clone());

    assert!(matches!(
        credentials.create(new_user("")).await,
        Err(AppError::ValidationError(_))
    ));

    let owner = credentials.create(new_user(&unique("pg_blank"))).await.unwrap();
    assert!(matches!(
        tasks.create(input("", "d"), &owner).await,
        Err(AppError::ValidationError(_))
    ));

    cleanup(&pool, &[&owner]).await;
}
