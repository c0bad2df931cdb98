use crate::{
    api::{
        document_request, employee, holiday, leave_request, payslip, profile, project, timesheet,
        upload,
    },
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;
use tracing::warn;

type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// One token every `60_000 / n` ms with a burst of `n`, keyed by peer IP.
fn build_limiter(requests_per_min: u32) -> Limiter {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_else(|| {
            warn!(requests_per_min, "Invalid rate limit, using governor defaults");
            GovernorConfig::default()
        });
    Arc::new(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Resources that accept any write use the write budget, uploads their own.
    let read = build_limiter(config.rate_read_per_min);
    let write = build_limiter(config.rate_write_per_min);
    let uploads = build_limiter(config.rate_upload_per_min);

    cfg.app_data(upload::form_config(config.storage.max_upload_bytes));

    cfg.service(
        web::scope(&config.api_prefix)
            // profile
            .service(web::resource("/login").wrap(write.clone()).route(web::post().to(profile::login)))
            .service(web::resource("/profile").wrap(read.clone()).route(web::post().to(profile::profile)))
            .service(web::resource("/departments").wrap(read.clone()).route(web::get().to(profile::departments)))
            // /employees
            .service(
                web::resource("/employees")
                    .wrap(write.clone())
                    .route(web::get().to(employee::list_employees))
                    .route(web::post().to(employee::create_employee)),
            )
            // /employees/{email}
            .service(
                web::resource("/employees/{email}")
                    .wrap(write.clone())
                    .route(web::put().to(employee::update_employee))
                    .route(web::delete().to(employee::delete_employee)),
            )
            // leave
            .service(web::resource("/leaves").wrap(read.clone()).route(web::post().to(leave_request::my_leaves)))
            .service(
                web::resource("/apply-leave")
                    .wrap(write.clone())
                    .route(web::post().to(leave_request::apply_leave)),
            )
            // timesheet
            .service(web::resource("/timesheets").wrap(read.clone()).route(web::post().to(timesheet::my_timesheets)))
            .service(
                web::resource("/timesheets/submitted-today")
                    .wrap(read.clone())
                    .route(web::post().to(timesheet::submitted_today)),
            )
            .service(
                web::resource("/submit-timesheet")
                    .wrap(write.clone())
                    .route(web::post().to(timesheet::submit_timesheet)),
            )
            // holiday
            .service(web::resource("/holidays").wrap(read.clone()).route(web::get().to(holiday::list_holidays)))
            // payslip
            .service(web::resource("/payslips").wrap(read.clone()).route(web::post().to(payslip::my_payslips)))
            // document
            .service(
                web::resource("/document-requests")
                    .wrap(read.clone())
                    .route(web::post().to(document_request::my_document_requests)),
            )
            .service(
                web::resource("/submit-document-request")
                    .wrap(write.clone())
                    .route(web::post().to(document_request::submit_document_request)),
            )
            // project
            .service(
                web::resource("/projects")
                    .wrap(write.clone())
                    .route(web::get().to(project::list_projects))
                    .route(web::post().to(project::allocate_project)),
            )
            .service(
                web::resource("/projects/update-hours")
                    .wrap(write.clone())
                    .route(web::put().to(project::update_hours)),
            )
            .service(
                web::resource("/projects/department/{department}")
                    .wrap(write.clone())
                    .route(web::get().to(project::department_projects)),
            )
            .service(
                web::resource("/project-status")
                    .wrap(write.clone())
                    .route(web::post().to(project::add_project_status)),
            )
            .service(
                web::resource("/project-status/{email}")
                    .wrap(read.clone())
                    .route(web::get().to(project::project_status_of)),
            )
            // uploads
            .service(web::resource("/upload-photo").wrap(uploads.clone()).route(web::post().to(upload::upload_photo)))
            .service(web::resource("/upload-document").wrap(uploads).route(web::post().to(upload::upload_document)))
            .service(
                web::scope("/admin")
                    .service(web::resource("/stats").wrap(read.clone()).route(web::get().to(profile::stats)))
                    .service(
                        web::resource("/leave-requests")
                            .wrap(write.clone())
                            .route(web::get().to(leave_request::admin_leave_requests))
                            .route(web::delete().to(leave_request::delete_leave_request)),
                    )
                    .service(
                        web::resource("/update-leave-status")
                            .wrap(write.clone())
                            .route(web::post().to(leave_request::update_leave_status)),
                    )
                    .service(
                        web::resource("/timesheets")
                            .wrap(read.clone())
                            .route(web::get().to(timesheet::admin_timesheets)),
                    )
                    .service(
                        web::resource("/holidays")
                            .wrap(write.clone())
                            .route(web::post().to(holiday::add_holiday)),
                    )
                    .service(
                        web::resource("/holidays/{date}")
                            .wrap(write.clone())
                            .route(web::delete().to(holiday::delete_holiday)),
                    )
                    .service(
                        web::resource("/payslips")
                            .wrap(write.clone())
                            .route(web::get().to(payslip::admin_payslips))
                            .route(web::post().to(payslip::add_payslip)),
                    )
                    .service(
                        web::resource("/document-requests")
                            .wrap(read.clone())
                            .route(web::get().to(document_request::admin_document_requests)),
                    )
                    .service(
                        web::resource("/update-document-status")
                            .wrap(write.clone())
                            .route(web::post().to(document_request::update_document_status)),
                    )
                    .service(
                        web::resource("/project-status")
                            .wrap(read)
                            .route(web::get().to(project::admin_project_status)),
                    ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::fixture;
    use crate::storage::{BlobStorage, OpendalStorage};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use opendal::{Operator, services};
    use serde_json::{Value, json};

    fn test_config() -> Config {
        Config::from_lookup(|name| match name {
            "STORE_BACKEND" => Some("memory".into()),
            "STORAGE_BACKEND" => Some("memory".into()),
            _ => None,
        })
        .unwrap()
    }

    #[actix_web::test]
    async fn routes_are_mounted_under_the_prefix() {
        let f = fixture().await;
        let operator = Operator::new(services::Memory::default()).unwrap().finish();
        let storage: Arc<dyn BlobStorage> = Arc::new(OpendalStorage::new(operator, "http://files"));
        let config = test_config();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(f.repo))
                .app_data(web::Data::from(storage))
                .configure(|cfg| configure(cfg, config.clone())),
        )
        .await;

        let peer = "127.0.0.1:40000".parse().unwrap();
        let req = test::TestRequest::post()
            .uri("/api/login")
            .peer_addr(peer)
            .set_json(json!({ "email": "RAVI@company.com", "selectedRole": "admin" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["email"], "ravi@company.com");

        let req = test::TestRequest::get()
            .uri("/api/admin/stats?department=Engineering")
            .peer_addr(peer)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["totalEmployees"], 2);

        let req = test::TestRequest::get().uri("/api/admin/stats").peer_addr(peer).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
