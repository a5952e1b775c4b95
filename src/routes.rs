//! The HTTP route table and request/response marshaling
//!
//! Success responses use the `{"success": true, ...}` envelope; failures are
//! rendered by [`crate::error`]. Handlers behind a guard receive the
//! verified claim set and never see the raw token.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRef, Path, State,
    },
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::{
    auth::{Authority, Verified},
    error::ApiError,
    permission_guards,
    store::{Drink, DrinkStore, Ingredient, ShortDrink},
};

permission_guards! {
    /// Grants access to the full drink representation
    pub guard GetDrinksDetail = "get:drinks-detail";
    /// Grants creation of new drinks
    pub guard PostDrinks = "post:drinks";
    /// Grants partial updates to existing drinks
    pub guard PatchDrinks = "patch:drinks";
    /// Grants deletion of drinks
    pub guard DeleteDrinks = "delete:drinks";
}

/// Shared state for the route handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// The token verifier backing the endpoint guards
    pub authority: Authority,
    /// The drink record store
    pub store: DrinkStore,
}

impl FromRef<AppState> for Authority {
    fn from_ref(state: &AppState) -> Self {
        state.authority.clone()
    }
}

impl FromRef<AppState> for DrinkStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

/// Builds the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/drinks", get(list_drinks).post(create_drink))
        .route("/drinks-detail", get(list_drinks_detail))
        .route("/drinks/:id", axum::routing::patch(update_drink).delete(delete_drink))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct DrinksEnvelope<T> {
    success: bool,
    drinks: Vec<T>,
}

impl<T: Serialize> DrinksEnvelope<T> {
    fn of(drinks: Vec<T>) -> Json<Self> {
        Json(Self {
            success: true,
            drinks,
        })
    }
}

#[derive(Debug, Serialize)]
struct DeleteEnvelope {
    success: bool,
    delete: i64,
}

#[derive(Debug, Deserialize)]
struct NewDrink {
    title: String,
    recipe: Vec<Ingredient>,
}

#[derive(Debug, Default, Deserialize)]
struct DrinkPatch {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    recipe: Option<Vec<Ingredient>>,
}

/// `GET /drinks` — public; short representations only
async fn list_drinks(State(store): State<DrinkStore>) -> Json<DrinksEnvelope<ShortDrink>> {
    let drinks = store.list().iter().map(Drink::short).collect();
    DrinksEnvelope::of(drinks)
}

/// `GET /drinks-detail` — requires `get:drinks-detail`
async fn list_drinks_detail(
    guard: Verified<GetDrinksDetail>,
    State(store): State<DrinkStore>,
) -> Json<DrinksEnvelope<Drink>> {
    tracing::debug!(
        permissions = guard.claims().permissions().map_or(0, |p| p.iter().count()),
        "serving full drink details"
    );
    DrinksEnvelope::of(store.list())
}

/// `POST /drinks` — requires `post:drinks`
async fn create_drink(
    _guard: Verified<PostDrinks>,
    State(store): State<DrinkStore>,
    body: Result<Json<NewDrink>, JsonRejection>,
) -> Result<Json<DrinksEnvelope<Drink>>, ApiError> {
    let Json(new_drink) = body.map_err(|_| ApiError::Unprocessable)?;

    let drink = store.create(new_drink.title, new_drink.recipe);
    tracing::info!(drink.id = drink.id, "drink created");

    Ok(DrinksEnvelope::of(vec![drink]))
}

/// `PATCH /drinks/{id}` — requires `patch:drinks`; partial update
async fn update_drink(
    _guard: Verified<PatchDrinks>,
    State(store): State<DrinkStore>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<DrinkPatch>, JsonRejection>,
) -> Result<Json<DrinksEnvelope<Drink>>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;
    let Json(patch) = body.map_err(|_| ApiError::Unprocessable)?;

    let drink = store.update(id, patch.title, patch.recipe)?;

    Ok(DrinksEnvelope::of(vec![drink]))
}

/// `DELETE /drinks/{id}` — requires `delete:drinks`
async fn delete_drink(
    _guard: Verified<DeleteDrinks>,
    State(store): State<DrinkStore>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteEnvelope>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;

    store.delete(id)?;
    tracing::info!(drink.id = id, "drink deleted");

    Ok(Json(DeleteEnvelope {
        success: true,
        delete: id,
    }))
}

async fn not_found() -> Response {
    ApiError::NotFound.into_response()
}
