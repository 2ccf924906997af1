use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

use crate::storages::Storage;
use crate::structs::AppStartTime;

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    storage_backend: String,
    uptime_seconds: i64,
}

pub struct HealthService {}

impl HealthService {
    pub async fn health_check(
        storage: web::Data<Arc<dyn Storage>>,
        start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let uptime = chrono::Utc::now() - start_time.start_datetime;

        HttpResponse::Ok().json(HealthStatus {
            status: "ok",
            storage_backend: storage.backend_name().await,
            uptime_seconds: uptime.num_seconds(),
        })
    }
}
