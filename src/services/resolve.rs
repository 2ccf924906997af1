//! Short-code resolution endpoints.
//!
//! `GET {collection_prefix}/{code}` and `GET {resource_prefix}/{code}`:
//! load the short link, load the entity behind it, run the access-policy
//! evaluator and answer with either a redirect destination or a denial.
//! The response body is JSON either way; the client performs the navigation.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use tracing::{debug, error, warn};

use crate::errors::LinkmarkError;
use crate::middleware::{identity_from_request, JwtService};
use crate::policy::{self, Decision};
use crate::storages::Storage;
use crate::structs::{ApiData, ApiMessage, EntityKind, RedirectData, ShareableEntity};
use crate::utils::is_valid_short_code;

pub struct ResolveService {}

impl ResolveService {
    pub async fn resolve_collection(
        path: web::Path<String>,
        req: HttpRequest,
        storage: web::Data<Arc<dyn Storage>>,
        jwt: web::Data<JwtService>,
    ) -> impl Responder {
        Self::resolve(EntityKind::Collection, path.into_inner(), req, storage, jwt).await
    }

    pub async fn resolve_resource(
        path: web::Path<String>,
        req: HttpRequest,
        storage: web::Data<Arc<dyn Storage>>,
        jwt: web::Data<JwtService>,
    ) -> impl Responder {
        Self::resolve(EntityKind::Resource, path.into_inner(), req, storage, jwt).await
    }

    async fn resolve(
        kind: EntityKind,
        raw_code: String,
        req: HttpRequest,
        storage: web::Data<Arc<dyn Storage>>,
        jwt: web::Data<JwtService>,
    ) -> HttpResponse {
        let code = raw_code.trim();

        if code.is_empty() {
            let err = LinkmarkError::missing_parameter("short_code is required");
            debug!("{}", err.format_simple());
            return Self::message_response(StatusCode::BAD_REQUEST, err.message());
        }

        if !is_valid_short_code(code) {
            debug!("Invalid short code rejected: {}", code);
            return Self::not_found_response();
        }

        let link = match storage.get_short_link(code).await {
            Ok(Some(link)) => link,
            Ok(None) => {
                debug!("Short code not found: {}", code);
                return Self::not_found_response();
            }
            Err(e) => {
                error!("Short link lookup failed for {}: {}", code, e);
                return Self::error_response();
            }
        };

        // 短码与路由类别不符时按不存在处理
        if link.kind != kind {
            debug!("Short code {} is a {} link, not {}", code, link.kind, kind);
            return Self::not_found_response();
        }

        let entity = match Self::load_entity(&storage, kind, link.entity_id, &link.full_path).await
        {
            Ok(Some(entity)) => entity,
            Ok(None) => {
                // 悬空短码：指向的实体已不存在或元数据不可用
                warn!("Short code {} points at a missing {}", code, kind);
                return Self::not_found_response();
            }
            Err(e) => {
                error!("Entity load failed for {}: {}", code, e);
                return Self::error_response();
            }
        };

        let requester = identity_from_request(&req, &jwt);

        match policy::evaluate(&entity, requester.as_ref()) {
            Decision::Redirect(redirect_url) => {
                if kind == EntityKind::Resource {
                    // 计数失败不拦截跳转
                    if let Err(e) = storage.increment_resource_views(link.entity_id).await {
                        warn!("View count increment failed for {}: {}", code, e);
                    }
                }

                HttpResponse::Ok().json(ApiData {
                    data: RedirectData { redirect_url },
                })
            }
            Decision::RequireAuth => {
                Self::message_response(StatusCode::UNAUTHORIZED, "Authentication required")
            }
            Decision::Denied => Self::message_response(StatusCode::FORBIDDEN, "Access denied"),
        }
    }

    async fn load_entity(
        storage: &web::Data<Arc<dyn Storage>>,
        kind: EntityKind,
        entity_id: i64,
        full_path: &str,
    ) -> crate::errors::Result<Option<ShareableEntity>> {
        match kind {
            EntityKind::Resource => {
                let resource = storage.get_resource(entity_id).await?;
                Ok(resource.map(|mut resource| {
                    // 跳转目标以短链接里存的目的地为准
                    resource.full_path = full_path.to_string();
                    ShareableEntity::Resource(resource)
                }))
            }
            EntityKind::Collection => {
                let collection = storage.get_collection(entity_id).await?;
                Ok(collection.map(ShareableEntity::Collection))
            }
        }
    }

    #[inline]
    fn message_response(status: StatusCode, message: &str) -> HttpResponse {
        HttpResponse::build(status).json(ApiMessage {
            message: message.to_string(),
        })
    }

    #[inline]
    fn not_found_response() -> HttpResponse {
        HttpResponse::build(StatusCode::NOT_FOUND)
            .insert_header(("Cache-Control", "public, max-age=60"))
            .json(ApiMessage {
                message: "Not Found".to_string(),
            })
    }

    #[inline]
    fn error_response() -> HttpResponse {
        HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR).json(ApiMessage {
            message: "Internal Server Error".to_string(),
        })
    }
}
