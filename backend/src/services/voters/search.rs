use crate::auth::AuthenticatedUser;
use crate::db::{VoterFilter, VoterStore};
use crate::error::ApiResult;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::model::response::{ApiResponse, Pagination};
use common::requests::SearchVotersQuery;

const DEFAULT_LIMIT: u64 = 20;
const MAX_LIMIT: u64 = 100;

/// Reads the leading integer of a query value (`"3abc"` is 3). Anything else is `None`.
fn leading_int(raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim();
    let digits_end = raw
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(raw.len(), |(i, _)| i);
    raw[..digits_end].parse().ok()
}

fn page_and_limit(query: &SearchVotersQuery) -> (u64, u64) {
    let page = leading_int(query.page.as_deref()).unwrap_or(1).max(1);
    let limit = leading_int(query.limit.as_deref())
        .map_or(DEFAULT_LIMIT as i64, |l| l.clamp(1, MAX_LIMIT as i64));
    (page as u64, limit as u64)
}

pub(crate) async fn process(
    state: web::Data<AppState>,
    _caller: AuthenticatedUser,
    query: web::Query<SearchVotersQuery>,
) -> ApiResult<HttpResponse> {
    let (page, limit) = page_and_limit(&query);
    let filter = VoterFilter {
        name_contains: query.search.clone().filter(|s| !s.trim().is_empty()),
        offset: (page - 1).saturating_mul(limit),
        limit,
    };

    let (voters, total) = state
        .blocking(move |store| Ok(store.search_voters(&filter)?))
        .await?;

    Ok(HttpResponse::Ok().json(
        ApiResponse::ok("Voters retrieved successfully", voters)
            .with_pagination(Pagination::new(page, limit, total)),
    ))
}
