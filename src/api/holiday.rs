use actix_web::{HttpResponse, web};

use super::message;
use crate::error::AppResult;
use crate::model::holiday::NewHoliday;
use crate::repository::Repository;

#[utoipa::path(
    get,
    path = "/api/holidays",
    responses(
        (status = 200, description = "Holiday calendar in sheet order", body = [crate::model::holiday::Holiday])
    ),
    tag = "Holiday"
)]
pub async fn list_holidays(repo: web::Data<Repository>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(repo.list_holidays().await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/holidays",
    request_body = NewHoliday,
    responses(
        (status = 200, description = "Holiday added", body = Object, example = json!({
            "message": "Holiday added successfully"
        })),
        (status = 400, description = "Date already listed or name missing")
    ),
    tag = "Admin"
)]
pub async fn add_holiday(
    repo: web::Data<Repository>,
    payload: web::Json<NewHoliday>,
) -> AppResult<HttpResponse> {
    repo.add_holiday(&payload).await?;
    Ok(message("Holiday added successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/admin/holidays/{date}",
    params(
        ("date", Path, description = "Holiday date, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Holiday removed", body = Object, example = json!({
            "message": "Holiday deleted successfully"
        })),
        (status = 404, description = "No holiday on this date")
    ),
    tag = "Admin"
)]
pub async fn delete_holiday(
    repo: web::Data<Repository>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    repo.delete_holiday(&path).await?;
    Ok(message("Holiday deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::fixture;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn add_then_delete_by_date() {
        let f = fixture().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(f.repo))
                .route("/holidays", web::get().to(list_holidays))
                .route("/admin/holidays", web::post().to(add_holiday))
                .route("/admin/holidays/{date}", web::delete().to(delete_holiday)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/admin/holidays")
            .set_json(json!({ "date": "2026-08-15", "name": "Independence Day" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/holidays").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!([{ "date": "2026-08-15", "name": "Independence Day" }]));

        let req = test::TestRequest::delete().uri("/admin/holidays/2026-08-15").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::delete().uri("/admin/holidays/2026-08-15").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
