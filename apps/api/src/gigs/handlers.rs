use axum::{
    extract::{Path, Query},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::gigs::catalog::{find, search, Gig, GigStatus, SAMPLE_GIGS};

#[derive(Debug, Deserialize)]
pub struct GigQuery {
    pub q: Option<String>,
    pub status: Option<GigStatus>,
}

/// GET /api/gigs
pub async fn handle_list_gigs(Query(params): Query<GigQuery>) -> Json<Vec<Gig>> {
    Json(
        search(&SAMPLE_GIGS, params.q.as_deref(), params.status)
            .into_iter()
            .cloned()
            .collect(),
    )
}

/// GET /api/gigs/:id
pub async fn handle_get_gig(Path(id): Path<String>) -> Result<Json<Gig>, AppError> {
    find(&SAMPLE_GIGS, &id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Gig {id} not found")))
}
