use actix_web::{HttpResponse, web};
use serde_json::json;

use super::{DepartmentQuery, EmailRequest};
use crate::error::AppResult;
use crate::model::timesheet::NewTimesheet;
use crate::repository::Repository;

#[utoipa::path(
    post,
    path = "/api/timesheets",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Entries logged with exactly this email", body = [crate::model::timesheet::TimesheetEntry])
    ),
    tag = "Timesheet"
)]
pub async fn my_timesheets(
    repo: web::Data<Repository>,
    payload: web::Json<EmailRequest>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(repo.list_timesheets(&payload.email).await?))
}

/// Log work for today
///
/// `employeeEmail` lets an admin log on someone's behalf. The entry is always
/// dated with the server's current day.
#[utoipa::path(
    post,
    path = "/api/submit-timesheet",
    request_body = NewTimesheet,
    responses(
        (status = 200, description = "Stored entry", body = crate::model::timesheet::TimesheetEntry),
        (status = 400, description = "Missing project/task or non-positive duration"),
        (status = 404, description = "Unknown employee")
    ),
    tag = "Timesheet"
)]
pub async fn submit_timesheet(
    repo: web::Data<Repository>,
    payload: web::Json<NewTimesheet>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(repo.submit_timesheet(&payload).await?))
}

/// Has this employee logged work today
///
/// Email case is ignored. Entries with zero hours do not count.
#[utoipa::path(
    post,
    path = "/api/timesheets/submitted-today",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Whether today's timesheet is in", body = Object, example = json!({
            "email": "asha@company.com",
            "submitted": true
        }))
    ),
    tag = "Timesheet"
)]
pub async fn submitted_today(
    repo: web::Data<Repository>,
    payload: web::Json<EmailRequest>,
) -> AppResult<HttpResponse> {
    let submitted = repo.has_submitted_today(&payload.email).await?;
    Ok(HttpResponse::Ok().json(json!({
        "email": payload.email.trim(),
        "submitted": submitted,
    })))
}

#[utoipa::path(
    get,
    path = "/api/admin/timesheets",
    params(
        ("department", Query, description = "Only entries of employees currently in this department")
    ),
    responses(
        (status = 200, description = "Timesheet entries", body = [crate::model::timesheet::TimesheetEntry])
    ),
    tag = "Admin"
)]
pub async fn admin_timesheets(
    repo: web::Data<Repository>,
    query: web::Query<DepartmentQuery>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(repo.list_department_timesheets(query.filter()).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::fixture;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn admin_logs_for_an_employee() {
        let f = fixture().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(f.repo))
                .route("/submit-timesheet", web::post().to(submit_timesheet))
                .route("/timesheets", web::post().to(my_timesheets)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/submit-timesheet")
            .set_json(json!({
                "employeeEmail": "asha@company.com",
                "email": "ravi@company.com",
                "project": "Payments",
                "task": "Review",
                "duration": 3.5
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["email"], "asha@company.com");
        assert_eq!(body["date"], "2026-03-05");
        assert_eq!(body["department"], "Engineering");

        let req = test::TestRequest::post()
            .uri("/timesheets")
            .set_json(json!({ "email": "asha@company.com" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));

        let req = test::TestRequest::post()
            .uri("/submit-timesheet")
            .set_json(json!({ "email": "asha@company.com", "project": "P", "task": "T", "duration": 0 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn submitted_today_flips_after_logging() {
        let f = fixture().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(f.repo))
                .route("/submit-timesheet", web::post().to(submit_timesheet))
                .route("/timesheets/submitted-today", web::post().to(submitted_today)),
        )
        .await;

        let check = || {
            test::TestRequest::post()
                .uri("/timesheets/submitted-today")
                .set_json(json!({ "email": "Meera@Company.com" }))
                .to_request()
        };
        let body: Value = test::call_and_read_body_json(&app, check()).await;
        assert_eq!(body["submitted"], false);

        let req = test::TestRequest::post()
            .uri("/submit-timesheet")
            .set_json(json!({ "email": "meera@company.com", "project": "Close", "task": "Ledger", "duration": 2 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let body: Value = test::call_and_read_body_json(&app, check()).await;
        assert_eq!(body["submitted"], true);
        assert_eq!(body["email"], "Meera@Company.com");
    }
}
