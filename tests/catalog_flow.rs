use shiori::application::ports::auth_gateway::AuthUser;
use shiori::application::services::NewBookInput;
use shiori::domain::value_objects::UserId;
use shiori::shared::{AppConfig, AppError};
use shiori::state::AppState;
use tempfile::TempDir;

async fn setup_state() -> (AppState, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = AppConfig::with_data_dir(temp_dir.path());
    let state = AppState::new(config).await.unwrap();
    (state, temp_dir)
}

async fn seed_profile(state: &AppState, id: &str, account_type: &str) {
    sqlx::query(
        r#"
        INSERT INTO profiles (id, firstname, lastname, avatar_url, account_type, updated_at)
        VALUES (?1, 'Hana', 'Kobayashi', NULL, ?2, ?3)
        "#,
    )
    .bind(id)
    .bind(account_type)
    .bind(chrono::Utc::now().timestamp_millis())
    .execute(state.pool.get_pool())
    .await
    .unwrap();
}

fn session_user(id: &str) -> AuthUser {
    AuthUser {
        id: UserId::new(id.to_string()).unwrap(),
        email: Some(format!("{id}@example.com")),
    }
}

fn book_input(title: &str) -> NewBookInput {
    NewBookInput {
        title: title.to_string(),
        author: "Banana Yoshimoto".to_string(),
        genre: Some("Fiction".to_string()),
        cover_image: None,
    }
}

#[tokio::test]
async fn favorite_toggle_round_trip_through_real_store() {
    let (state, _temp_dir) = setup_state().await;
    seed_profile(&state, "u1", "Member").await;
    state.auth.sign_in(session_user("u1")).await;

    let book = state.book_service.add_book(book_input("Kitchen")).await.unwrap();

    // 初期状態: レコード無しは false
    let view = state.favorite_service.observe(Some(&book.id)).await;
    assert!(!view.favorited);

    // トグル → 楽観値が残り、一覧にも反映される
    let settled = state.favorite_service.toggle(&book.id).await.unwrap();
    assert!(settled);
    let view = state.favorite_service.observe(Some(&book.id)).await;
    assert!(view.favorited);

    let favorites = state
        .favorites_list_service
        .list_favorited_books()
        .await
        .unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, book.id);

    // もう一度トグルすると外れ、無効化経由で一覧も空になる
    let settled = state.favorite_service.toggle(&book.id).await.unwrap();
    assert!(!settled);
    let favorites = state
        .favorites_list_service
        .list_favorited_books()
        .await
        .unwrap();
    assert!(favorites.is_empty());
}

#[tokio::test]
async fn anonymous_visitors_browse_but_cannot_toggle() {
    let (state, _temp_dir) = setup_state().await;
    seed_profile(&state, "u1", "Member").await;
    state.auth.sign_in(session_user("u1")).await;
    let book = state.book_service.add_book(book_input("Moshi Moshi")).await.unwrap();
    state.auth.sign_out().await;

    // 匿名の観測は常に false、書き込み経路には触れない
    let view = state.favorite_service.observe(Some(&book.id)).await;
    assert!(!view.favorited);

    let result = state.favorite_service.toggle(&book.id).await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));

    let result = state.favorites_list_service.list_favorited_books().await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn detached_toggle_is_optimistic_before_settlement() {
    let (state, _temp_dir) = setup_state().await;
    seed_profile(&state, "u1", "Member").await;
    state.auth.sign_in(session_user("u1")).await;
    let book = state.book_service.add_book(book_input("Amrita")).await.unwrap();

    state.favorite_service.observe(Some(&book.id)).await;
    let handle = state.favorite_service.toggle_detached(&book.id);

    // spawn 直後から楽観値が見える
    let view = state.favorite_service.observe(Some(&book.id)).await;
    assert!(view.favorited);

    assert!(handle.await.unwrap().unwrap());
    let view = state.favorite_service.observe(Some(&book.id)).await;
    assert!(view.favorited);
    assert!(!view.is_updating);
}

#[tokio::test]
async fn book_list_includes_profile_summary() {
    let (state, _temp_dir) = setup_state().await;
    seed_profile(&state, "u1", "Staff").await;
    state.auth.sign_in(session_user("u1")).await;

    state.book_service.add_book(book_input("Goodbye Tsugumi")).await.unwrap();
    let books = state.book_service.list_books().await.unwrap();
    assert_eq!(books.len(), 1);

    let added_by = books[0].added_by.as_ref().unwrap();
    assert_eq!(added_by.firstname.as_deref(), Some("Hana"));
}

#[tokio::test]
async fn staff_updates_member_directory() {
    let (state, _temp_dir) = setup_state().await;
    seed_profile(&state, "staff", "Staff").await;
    seed_profile(&state, "member", "Member").await;
    state.auth.sign_in(session_user("staff")).await;

    let target = UserId::new("member".to_string()).unwrap();
    let update = shiori::application::ports::repositories::ProfileUpdate {
        firstname: Some("Renamed".to_string()),
        ..Default::default()
    };
    state
        .user_directory_service
        .update_profile(&target, update)
        .await
        .unwrap();

    let profiles = state.user_directory_service.list_profiles().await.unwrap();
    let member = profiles.iter().find(|p| p.id.as_str() == "member").unwrap();
    assert_eq!(member.firstname.as_deref(), Some("Renamed"));

    // Member には他人の更新権限が無い
    state.auth.sign_out().await;
    state.auth.sign_in(session_user("member")).await;
    let result = state
        .user_directory_service
        .update_profile(&UserId::new("staff".to_string()).unwrap(), Default::default())
        .await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}
