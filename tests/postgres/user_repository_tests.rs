//! `PostgreSQL` integration tests for user registration and lookup.

use rstest::rstest;
use taskboard::user::{
    domain::{Role, User, Username},
    ports::{UserRepository, UserRepositoryError},
};

use crate::postgres::helpers::{BoxError, Store, store};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_finds_users_by_id_and_username(
    #[future] store: Result<Store, BoxError>,
) -> Result<(), BoxError> {
    let ctx = store.await?;

    let by_id = ctx.users.find_by_id(ctx.alice.id()).await?;
    let by_name = ctx.users.find_by_username(&Username::new("alice")?).await?;
    let missing = ctx.users.find_by_username(&Username::new("nobody_here")?).await?;

    assert_eq!(by_id.as_ref(), Some(&ctx.alice));
    assert_eq!(by_name.as_ref(), Some(&ctx.alice));
    assert_eq!(missing, None);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_rejects_taken_username(
    #[future] store: Result<Store, BoxError>,
) -> Result<(), BoxError> {
    let ctx = store.await?;
    let impostor = User::new(Username::new("alice")?, Role::Admin, &ctx.clock);

    let result = ctx.users.store(&impostor).await;

    assert!(matches!(
        result,
        Err(UserRepositoryError::DuplicateUsername(ref name)) if name.as_str() == "alice"
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_summary_counts_roles_and_activity(
    #[future] store: Result<Store, BoxError>,
) -> Result<(), BoxError> {
    let ctx = store.await?;
    let mut retired = User::new(Username::new("retired")?, Role::Regular, &ctx.clock);
    retired.deactivate();
    ctx.users.store(&retired).await?;

    let summary = ctx.users.summary().await?;
    let listed = ctx.users.list().await?;

    assert_eq!((summary.total, summary.admins, summary.active), (3, 1, 2));
    assert_eq!(listed.len(), 3);
    Ok(())
}
