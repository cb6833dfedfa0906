#![expect(clippy::unwrap_used)]

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json,
    Router,
};
use chrono::{Duration, Utc};
use jokebox_api_client::{
    admin::{AdminPageParams, SetAdminStatusParams},
    comment::{CreateCommentParams, DeleteCommentParams, ListCommentsParams},
    joke::CreateJokeParams,
    session::Session,
    social::{ReactParams, VoteParams},
    user::{LoginParams, RegisterParams},
    ApiClient,
};
use jokebox_common::{
    admin::{ActiveUser, AdminUser, ModerationLog, UserStats, UsersPage},
    comment::Comment,
    joke::{Joke, JokeWithComments},
    newtypes::{CommentId, JokeId, ModerationLogId, UserId},
    pagination::FeedQuery,
    social::VoteType,
    user::TokenClaims,
    CreatedResponse,
    EntityType,
    TokenResponse,
    AUTH_HEADER_SCHEME,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::LevelFilter;
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, Once},
};
use test_context::AsyncTestContext;
use tokio::{net::TcpListener, task::JoinHandle};

const JWT_SECRET: &[u8] = b"jokebox-test-secret";
pub const PASSWORD: &str = "Secr3t!pass";
pub const JOKE_COUNT: i64 = 12;

pub const ALICE: UserId = UserId(1);
pub const BOB: UserId = UserId(2);
pub const CAROL: UserId = UserId(3);

/// Everything the fake backend stored or received.
#[derive(Default)]
pub struct Backend {
    pub users: Vec<AdminUser>,
    pub jokes: Vec<Joke>,
    pub comments: Vec<Comment>,
    pub logs: Vec<ModerationLog>,
    pub feed_queries: Vec<FeedQuery>,
    pub votes: Vec<VoteParams>,
    /// Current vote per user and entity, kept the way the real backend stores them
    pub stored_votes: BTreeMap<(UserId, EntityType, i64), VoteType>,
    pub reactions: Vec<ReactParams>,
    /// Deleted comment ids, and whether the admin endpoint was used
    pub deleted_comments: Vec<(CommentId, bool)>,
    pub fail_feed: bool,
    pub fail_social: bool,
    pub fail_comments: bool,
    next_id: i64,
}

impl Backend {
    fn seeded() -> Self {
        let user = |id: UserId, username: &str, is_admin: bool| AdminUser {
            id,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            is_admin,
            created_at: Utc::now(),
        };
        let users = vec![
            user(ALICE, "alice", true),
            user(BOB, "bob", false),
            user(CAROL, "carol", false),
        ];
        let jokes = (1..=JOKE_COUNT)
            .map(|id| Joke {
                id: JokeId(id),
                title: String::new(),
                body: format!("<p>joke number {id}</p>"),
                author_id: BOB,
                author_username: "bob".to_string(),
                created_at: Utc::now(),
                comment_count: if id == 1 { 2 } else { 0 },
                social: Default::default(),
            })
            .collect();
        let comments = vec![
            comment(1, None, BOB, "bob"),
            comment(2, Some(1), CAROL, "carol"),
            comment(3, None, CAROL, "carol"),
        ];
        let logs = vec![ModerationLog {
            id: ModerationLogId(1),
            action: "delete_comment".to_string(),
            target_id: 99,
            target_type: "comment".to_string(),
            performed_by: ALICE,
            admin_username: "alice".to_string(),
            details: String::new(),
            created_at: Utc::now(),
        }];
        Self {
            users,
            jokes,
            comments,
            logs,
            next_id: 100,
            ..Default::default()
        }
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

fn comment(id: i64, parent: Option<i64>, author_id: UserId, author: &str) -> Comment {
    Comment {
        id: CommentId(id),
        joke_id: JokeId(1),
        parent_id: parent.map(CommentId),
        body: format!("<p>comment {id}</p>"),
        author_id,
        author_username: author.to_string(),
        created_at: Utc::now(),
        is_deleted: false,
        social: Default::default(),
        children: vec![],
    }
}

type Shared = Arc<Mutex<Backend>>;

pub struct TestBackend {
    state: Shared,
    pub client: ApiClient,
    handle: JoinHandle<()>,
}

impl AsyncTestContext for TestBackend {
    async fn setup() -> Self {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            env_logger::builder()
                .filter_level(LevelFilter::Warn)
                .is_test(true)
                .init();
        });

        let state: Shared = Arc::new(Mutex::new(Backend::seeded()));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(state.clone());
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let client = ApiClient::new(&format!("http://{addr}/api"));
        Self {
            state,
            client,
            handle,
        }
    }

    async fn teardown(self) {
        self.handle.abort();
    }
}

impl TestBackend {
    pub fn backend(&self) -> MutexGuard<'_, Backend> {
        self.state.lock().unwrap()
    }

    pub fn token_for(&self, user_id: UserId) -> String {
        let backend = self.backend();
        let user = backend.users.iter().find(|u| u.id == user_id).unwrap();
        mint_token(user)
    }

    pub fn login_as(&self, user_id: UserId) {
        let token = self.token_for(user_id);
        self.client.set_session(Session::restore(&token, Utc::now()));
    }
}

fn mint_token(user: &AdminUser) -> String {
    let claims = TokenClaims {
        user_id: user.id,
        username: user.username.clone(),
        is_admin: user.is_admin,
        exp: Some((Utc::now() + Duration::hours(1)).timestamp()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET),
    )
    .unwrap()
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/jokes", get(list_jokes).post(create_joke))
        .route("/api/jokes/{id}", get(get_joke))
        .route("/api/jokes/vote", post(vote))
        .route("/api/jokes/react", post(react))
        .route("/api/comments", get(list_comments).post(create_comment))
        .route("/api/comments/delete", delete(delete_comment))
        .route("/api/admin/users", get(admin_users))
        .route("/api/admin/users/admin-status", post(admin_status))
        .route("/api/admin/logs", get(admin_logs))
        .route("/api/admin/stats", get(admin_stats))
        .route("/api/admin/comments/{id}", delete(admin_delete_comment))
        .with_state(state)
}

fn claims(headers: &HeaderMap) -> Result<TokenClaims, Response> {
    let unauthorized = || (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    let token = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(AUTH_HEADER_SCHEME))
        .map(str::trim)
        .ok_or_else(unauthorized)?;
    decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(JWT_SECRET),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|_| unauthorized())
}

fn admin_claims(headers: &HeaderMap) -> Result<TokenClaims, Response> {
    let claims = claims(headers)?;
    if !claims.is_admin {
        return Err((StatusCode::FORBIDDEN, "Forbidden").into_response());
    }
    Ok(claims)
}

fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable\n").into_response()
}

async fn register(State(state): State<Shared>, Json(params): Json<RegisterParams>) -> Response {
    let mut backend = state.lock().unwrap();
    let id = UserId(backend.next_id());
    let user = AdminUser {
        id,
        username: params.username,
        email: params.email,
        is_admin: false,
        created_at: Utc::now(),
    };
    let token = mint_token(&user);
    backend.users.push(user);
    (StatusCode::CREATED, Json(TokenResponse { token })).into_response()
}

async fn login(State(state): State<Shared>, Json(params): Json<LoginParams>) -> Response {
    let backend = state.lock().unwrap();
    match backend.users.iter().find(|u| u.email == params.email) {
        Some(user) if params.password == PASSWORD => {
            Json(TokenResponse {
                token: mint_token(user),
            })
            .into_response()
        }
        _ => (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response(),
    }
}

async fn list_jokes(State(state): State<Shared>, Query(query): Query<FeedQuery>) -> Response {
    let mut backend = state.lock().unwrap();
    backend.feed_queries.push(query.clone());
    if backend.fail_feed {
        return server_error();
    }
    let start = ((query.page.max(1) - 1) * query.page_size) as usize;
    if start >= backend.jokes.len() {
        return Json(None::<Vec<Joke>>).into_response();
    }
    let page: Vec<_> = backend
        .jokes
        .iter()
        .skip(start)
        .take(query.page_size as usize)
        .cloned()
        .collect();
    Json(Some(page)).into_response()
}

async fn create_joke(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(params): Json<CreateJokeParams>,
) -> Response {
    let claims = match claims(&headers) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let mut backend = state.lock().unwrap();
    let id = JokeId(backend.next_id());
    backend.jokes.push(Joke {
        id,
        title: String::new(),
        body: params.body,
        author_id: claims.user_id,
        author_username: claims.username,
        created_at: Utc::now(),
        comment_count: 0,
        social: Default::default(),
    });
    (StatusCode::CREATED, Json(CreatedResponse { id })).into_response()
}

async fn get_joke(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let backend = state.lock().unwrap();
    let Some(joke) = backend.jokes.iter().find(|j| j.id.0 == id).cloned() else {
        return (StatusCode::NOT_FOUND, "Joke not found").into_response();
    };
    let comments = backend
        .comments
        .iter()
        .filter(|c| c.joke_id == joke.id)
        .cloned()
        .collect();
    Json(JokeWithComments { joke, comments }).into_response()
}

async fn vote(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(params): Json<VoteParams>,
) -> Response {
    let claims = match claims(&headers) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let mut backend = state.lock().unwrap();
    if backend.fail_social {
        return server_error();
    }
    let key = (claims.user_id, params.entity_type, params.entity_id);
    if params.vote_type == VoteType::None {
        backend.stored_votes.remove(&key);
    } else {
        backend.stored_votes.insert(key, params.vote_type);
    }
    backend.votes.push(params);
    StatusCode::NO_CONTENT.into_response()
}

async fn react(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(params): Json<ReactParams>,
) -> Response {
    if let Err(e) = claims(&headers) {
        return e;
    }
    let mut backend = state.lock().unwrap();
    if backend.fail_social {
        return server_error();
    }
    backend.reactions.push(params);
    StatusCode::NO_CONTENT.into_response()
}

async fn list_comments(
    State(state): State<Shared>,
    Query(params): Query<ListCommentsParams>,
) -> Response {
    let backend = state.lock().unwrap();
    let comments: Vec<_> = backend
        .comments
        .iter()
        .filter(|c| c.joke_id == params.joke_id)
        .cloned()
        .collect();
    if comments.is_empty() {
        Json(None::<Vec<Comment>>).into_response()
    } else {
        Json(comments).into_response()
    }
}

async fn create_comment(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(params): Json<CreateCommentParams>,
) -> Response {
    let claims = match claims(&headers) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let mut backend = state.lock().unwrap();
    if backend.fail_comments {
        return server_error();
    }
    let id = CommentId(backend.next_id());
    backend.comments.push(Comment {
        id,
        joke_id: params.joke_id,
        parent_id: params.parent_comment_id,
        body: params.body,
        author_id: claims.user_id,
        author_username: claims.username,
        created_at: Utc::now(),
        is_deleted: false,
        social: Default::default(),
        children: vec![],
    });
    (StatusCode::CREATED, Json(CreatedResponse { id })).into_response()
}

async fn delete_comment(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<DeleteCommentParams>,
) -> Response {
    let claims = match claims(&headers) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let mut backend = state.lock().unwrap();
    let Some(comment) = backend
        .comments
        .iter_mut()
        .find(|c| c.id == params.comment_id)
    else {
        return (StatusCode::NOT_FOUND, "Comment not found").into_response();
    };
    if comment.author_id != claims.user_id {
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    }
    comment.tombstone();
    backend.deleted_comments.push((params.comment_id, false));
    StatusCode::NO_CONTENT.into_response()
}

async fn admin_users(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<AdminPageParams>,
) -> Response {
    if let Err(e) = admin_claims(&headers) {
        return e;
    }
    let backend = state.lock().unwrap();
    let users = backend
        .users
        .iter()
        .skip(((params.page.max(1) - 1) * params.page_size) as usize)
        .take(params.page_size as usize)
        .cloned()
        .collect();
    let total_pages = (backend.users.len() as u32).div_ceil(params.page_size);
    Json(UsersPage { users, total_pages }).into_response()
}

async fn admin_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(params): Json<SetAdminStatusParams>,
) -> Response {
    if let Err(e) = admin_claims(&headers) {
        return e;
    }
    let mut backend = state.lock().unwrap();
    let Some(user) = backend.users.iter_mut().find(|u| u.id == params.user_id) else {
        return (StatusCode::NOT_FOUND, "User not found").into_response();
    };
    user.is_admin = params.is_admin;
    Json(serde_json::json!({ "status": "success" })).into_response()
}

async fn admin_logs(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<AdminPageParams>,
) -> Response {
    if let Err(e) = admin_claims(&headers) {
        return e;
    }
    let backend = state.lock().unwrap();
    let logs: Vec<_> = backend
        .logs
        .iter()
        .skip(((params.page.max(1) - 1) * params.page_size) as usize)
        .take(params.page_size as usize)
        .cloned()
        .collect();
    if logs.is_empty() {
        Json(None::<Vec<ModerationLog>>).into_response()
    } else {
        Json(logs).into_response()
    }
}

async fn admin_stats(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(e) = admin_claims(&headers) {
        return e;
    }
    let backend = state.lock().unwrap();
    let most_active_users = backend
        .users
        .iter()
        .map(|u| ActiveUser {
            id: u.id,
            username: u.username.clone(),
            jokes_count: backend.jokes.iter().filter(|j| j.author_id == u.id).count() as i64,
            comments_count: backend
                .comments
                .iter()
                .filter(|c| c.author_id == u.id)
                .count() as i64,
        })
        .collect();
    Json(UserStats {
        total_users: backend.users.len() as i64,
        admin_count: backend.users.iter().filter(|u| u.is_admin).count() as i64,
        new_users_today: 0,
        new_users_this_week: 0,
        new_users_this_month: backend.users.len() as i64,
        most_active_users,
    })
    .into_response()
}

async fn admin_delete_comment(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(e) = admin_claims(&headers) {
        return e;
    }
    let mut backend = state.lock().unwrap();
    let id = CommentId(id);
    match backend.comments.iter_mut().find(|c| c.id == id) {
        Some(comment) => comment.tombstone(),
        None => return (StatusCode::NOT_FOUND, "Comment not found").into_response(),
    }
    backend.deleted_comments.push((id, true));
    StatusCode::NO_CONTENT.into_response()
}
