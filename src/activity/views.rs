use super::models::{ActivityEntry, ActivityEntryList, Column};
use crate::common::errors::{BusinessError, DbErrorExt};
use crate::common::state::AppState;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Json;
use crudcrate::CRUDResource;
use crudcrate::filter::{apply_filters, parse_pagination};
use crudcrate::models::FilterOptions;
use crudcrate::pagination::calculate_content_range;
use crudcrate::sort::parse_sorting;
use sea_orm::{ConnectionTrait, Order};
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_activity))
        .with_state(state.clone())
}

/// Same query parameters as the generated list endpoints. Without a sort
/// parameter the feed is newest first.
#[utoipa::path(
    get,
    path = "/",
    params(FilterOptions),
    responses(
        (status = 200, description = "Activity feed", body = [ActivityEntryList]),
    ),
    tag = "activity",
    summary = "List activity"
)]
pub async fn list_activity(
    Query(params): Query<FilterOptions>,
    State(state): State<AppState>,
) -> Result<(HeaderMap, Json<Vec<ActivityEntryList>>), BusinessError> {
    let (offset, limit) = parse_pagination(&params);
    let condition = apply_filters::<ActivityEntry>(
        params.filter.clone(),
        &ActivityEntry::filterable_columns(),
        state.db.get_database_backend(),
    );
    let (order_column, order_direction) = if params.sort.is_none() && params.sort_by.is_none() {
        (Column::CreatedAt, Order::Desc)
    } else {
        parse_sorting(
            &params,
            &ActivityEntry::sortable_columns(),
            ActivityEntry::default_index_column(),
        )
    };

    let items = ActivityEntry::get_all(
        &state.db,
        &condition,
        order_column,
        order_direction,
        offset,
        limit,
    )
    .await
    .map_err(|e| e.to_business_error("activity"))?;
    let total = ActivityEntry::total_count(&state.db, &condition).await;
    let headers =
        calculate_content_range(offset, limit, total, ActivityEntry::RESOURCE_NAME_PLURAL);

    Ok((headers, Json(items)))
}
