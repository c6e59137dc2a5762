use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{ServerError, admin, user, withdrawals};
use engine::{Engine, EngineError, UserRole};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(auth_header) = auth_header else {
        return Err(ServerError::Unauthorized);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(ServerError::Unauthorized);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Email.eq(auth_header.username()))
        .one(&state.db)
        .await
        .map_err(|_| ServerError::Unauthorized)?;

    let user = match user {
        Some(user) if user.password == auth_header.password() => user,
        _ => return Err(ServerError::Unauthorized),
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn require_role(request: &Request, role: UserRole) -> Result<(), ServerError> {
    match request.extensions().get::<user::Model>() {
        Some(user) if user.role == role.as_str() => Ok(()),
        Some(_) => Err(ServerError::Engine(EngineError::Forbidden(
            "Forbidden".to_string(),
        ))),
        None => Err(ServerError::Unauthorized),
    }
}

async fn require_influencer(request: Request, next: Next) -> Result<Response, ServerError> {
    require_role(&request, UserRole::Influencer)?;
    Ok(next.run(request).await)
}

async fn require_admin(request: Request, next: Next) -> Result<Response, ServerError> {
    require_role(&request, UserRole::Admin)?;
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let influencer = Router::new()
        .route(
            "/influencer/withdrawals",
            post(withdrawals::create).get(withdrawals::history),
        )
        .route("/influencer/balance", get(withdrawals::balance))
        .route_layer(middleware::from_fn(require_influencer));

    let admin = Router::new()
        .route("/admin/transactions", get(admin::list))
        .route("/admin/transactions/{id}", axum::routing::put(admin::decide))
        .route_layer(middleware::from_fn(require_admin));

    influencer
        .merge(admin)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
