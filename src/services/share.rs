//! Share-link creation.
//!
//! `POST /api/share` mints the short code for an entity the requester owns.
//! Creation is idempotent: the second request for the same entity returns the
//! code minted by the first one, including when the two race.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::errors::LinkmarkError;
use crate::middleware::{identity_from_request, JwtService};
use crate::policy;
use crate::storages::Storage;
use crate::structs::{
    ApiData, ApiMessage, EntityKind, PostShareRequest, RequesterIdentity, ShareData, ShortLink,
};
use crate::utils::generate_random_code;

pub const SHORT_CODE_LENGTH: usize = 6;

/// Bounded retry on code collision. The code space is large; more than a
/// couple of attempts means something else is wrong.
const MAX_MINT_ATTEMPTS: usize = 5;

pub struct ShareService {}

impl ShareService {
    pub async fn create_share(
        req: HttpRequest,
        payload: web::Json<PostShareRequest>,
        storage: web::Data<Arc<dyn Storage>>,
        jwt: web::Data<JwtService>,
        config: web::Data<Config>,
    ) -> impl Responder {
        let requester = match identity_from_request(&req, &jwt) {
            Some(requester) => requester,
            None => {
                return Self::message_response(StatusCode::UNAUTHORIZED, "Authentication required");
            }
        };

        let payload = payload.into_inner();

        let (owner_id, full_path) =
            match Self::load_share_target(&storage, payload.kind, payload.entity_id).await {
                Ok(Some(target)) => target,
                Ok(None) => return Self::message_response(StatusCode::NOT_FOUND, "Not Found"),
                Err(e) => {
                    error!("Share target load failed: {}", e);
                    return Self::message_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal Server Error",
                    );
                }
            };

        if requester.id != owner_id {
            debug!(
                "Share denied: user {} does not own {} {}",
                requester.id, payload.kind, payload.entity_id
            );
            return Self::message_response(StatusCode::FORBIDDEN, "Access denied");
        }

        Self::mint_or_reuse(&requester, payload, full_path, &storage, &config).await
    }

    async fn load_share_target(
        storage: &web::Data<Arc<dyn Storage>>,
        kind: EntityKind,
        entity_id: i64,
    ) -> crate::errors::Result<Option<(i64, String)>> {
        match kind {
            EntityKind::Resource => Ok(storage
                .get_resource(entity_id)
                .await?
                .map(|resource| (resource.owner_id, resource.full_path))),
            EntityKind::Collection => Ok(storage
                .get_collection(entity_id)
                .await?
                .map(|collection| {
                    (
                        collection.owner_id,
                        policy::collection_shared_view(collection.id),
                    )
                })),
        }
    }

    async fn mint_or_reuse(
        requester: &RequesterIdentity,
        payload: PostShareRequest,
        full_path: String,
        storage: &web::Data<Arc<dyn Storage>>,
        config: &web::Data<Config>,
    ) -> HttpResponse {
        // 幂等：已有短码直接复用
        match storage
            .find_short_link_for(payload.kind, payload.entity_id)
            .await
        {
            Ok(Some(existing)) => return Self::share_response(&existing, config),
            Ok(None) => {}
            Err(e) => {
                error!("Short link lookup failed: {}", e);
                return Self::message_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                );
            }
        }

        for _ in 0..MAX_MINT_ATTEMPTS {
            let link = ShortLink {
                short_code: generate_random_code(SHORT_CODE_LENGTH),
                kind: payload.kind,
                entity_id: payload.entity_id,
                full_path: full_path.clone(),
                created_at: chrono::Utc::now(),
            };

            match storage.create_short_link(link.clone()).await {
                Ok(()) => {
                    info!(
                        "User {} shared {} {} as {}",
                        requester.id, payload.kind, payload.entity_id, link.short_code
                    );
                    return Self::share_response(&link, config);
                }
                Err(LinkmarkError::Conflict(_)) => {
                    // 要么短码撞车，要么并发请求已为该实体建好链接
                    match storage
                        .find_short_link_for(payload.kind, payload.entity_id)
                        .await
                    {
                        Ok(Some(existing)) => return Self::share_response(&existing, config),
                        Ok(None) => continue,
                        Err(e) => {
                            error!("Short link lookup failed: {}", e);
                            return Self::message_response(
                                StatusCode::INTERNAL_SERVER_ERROR,
                                "Internal Server Error",
                            );
                        }
                    }
                }
                Err(e) => {
                    error!("Short link creation failed: {}", e);
                    return Self::message_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal Server Error",
                    );
                }
            }
        }

        error!(
            "Could not mint a unique short code for {} {} after {} attempts",
            payload.kind, payload.entity_id, MAX_MINT_ATTEMPTS
        );
        Self::message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    }

    fn share_response(link: &ShortLink, config: &web::Data<Config>) -> HttpResponse {
        let prefix = match link.kind {
            EntityKind::Resource => &config.resource_route_prefix,
            EntityKind::Collection => &config.collection_route_prefix,
        };

        HttpResponse::Ok().json(ApiData {
            data: ShareData {
                short_code: link.short_code.clone(),
                short_url: format!("{}{}/{}", config.public_base_url, prefix, link.short_code),
            },
        })
    }

    #[inline]
    fn message_response(status: StatusCode, message: &str) -> HttpResponse {
        HttpResponse::build(status).json(ApiMessage {
            message: message.to_string(),
        })
    }
}
