//! Short-link resolution tests.
//!
//! Cover the full decision table: public and restricted collections,
//! restricted resources, owner exemptions, anonymous requesters and the
//! view-count side effect.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{web, App};

use linkmark::middleware::JwtService;
use linkmark::services::ResolveService;
use linkmark::storages::backends::memory::MemoryStorage;
use linkmark::storages::Storage;
use linkmark::structs::{
    Collection, CollectionAccess, EntityKind, Resource, ShareEntry, SharePermission, ShortLink,
};

// =============================================================================
// Test Setup
// =============================================================================

const JWT_SECRET: &str = "resolve-test-secret";

fn jwt() -> JwtService {
    JwtService::new(JWT_SECRET)
}

fn bearer(user_id: i64, email: &str) -> (&'static str, String) {
    let token = jwt().issue(user_id, email, 30).expect("issue token");
    ("Authorization", format!("Bearer {}", token))
}

fn entry(email: &str) -> ShareEntry {
    ShareEntry {
        email: email.to_string(),
        permission: SharePermission::View,
    }
}

async fn seed_collection(storage: &Arc<dyn Storage>, id: i64, owner_id: i64, access: CollectionAccess) {
    storage
        .upsert_collection(Collection {
            id,
            owner_id,
            access,
        })
        .await
        .expect("seed collection");
}

async fn seed_resource(
    storage: &Arc<dyn Storage>,
    id: i64,
    owner_email: &str,
    restricted_to: &[&str],
) {
    storage
        .upsert_resource(Resource {
            id,
            owner_id: 1,
            owner_email: owner_email.to_string(),
            full_path: format!("/resources/{}", id),
            restricted_to: restricted_to.iter().map(|s| s.to_string()).collect(),
            view_count: 0,
        })
        .await
        .expect("seed resource");
}

async fn seed_link(storage: &Arc<dyn Storage>, code: &str, kind: EntityKind, entity_id: i64) {
    let full_path = match kind {
        EntityKind::Resource => format!("/resources/{}", entity_id),
        EntityKind::Collection => format!("/collections/shared/{}", entity_id),
    };

    storage
        .create_short_link(ShortLink {
            short_code: code.to_string(),
            kind,
            entity_id,
            full_path,
            created_at: chrono::Utc::now(),
        })
        .await
        .expect("seed short link");
}

macro_rules! resolve_app {
    ($storage:expr) => {{
        test::init_service(
            App::new()
                .app_data(web::Data::new($storage.clone()))
                .app_data(web::Data::new(jwt()))
                .route(
                    "/c/{short_code}",
                    web::get().to(ResolveService::resolve_collection),
                )
                .route(
                    "/r/{short_code}",
                    web::get().to(ResolveService::resolve_resource),
                ),
        )
        .await
    }};
}

async fn redirect_url(resp: actix_web::dev::ServiceResponse) -> String {
    let body: serde_json::Value = test::read_body_json(resp).await;
    body["data"]["redirect_url"]
        .as_str()
        .expect("redirect_url present")
        .to_string()
}

// =============================================================================
// Collections
// =============================================================================

#[tokio::test]
async fn public_collection_resolves_for_anonymous() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    seed_collection(&storage, 7, 1, CollectionAccess::Public).await;
    seed_link(&storage, "abc123", EntityKind::Collection, 7).await;

    let app = resolve_app!(storage);
    let resp = test::call_service(&app, TestRequest::get().uri("/c/abc123").to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(redirect_url(resp).await, "/collections/shared/7");
}

#[tokio::test]
async fn restricted_collection_requires_auth_for_anonymous() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    seed_collection(
        &storage,
        3,
        1,
        CollectionAccess::Restricted {
            entries: vec![entry("a@x.com")],
        },
    )
    .await;
    seed_link(&storage, "col001", EntityKind::Collection, 3).await;

    let app = resolve_app!(storage);
    let resp = test::call_service(&app, TestRequest::get().uri("/c/col001").to_request()).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Authentication required");
}

#[tokio::test]
async fn restricted_collection_owner_gets_owner_view() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    seed_collection(
        &storage,
        3,
        1,
        CollectionAccess::Restricted {
            entries: vec![entry("a@x.com")],
        },
    )
    .await;
    seed_link(&storage, "col001", EntityKind::Collection, 3).await;

    let app = resolve_app!(storage);
    // 所有者邮箱不在共享名单里，仍应放行
    let req = TestRequest::get()
        .uri("/c/col001")
        .insert_header(bearer(1, "owner@x.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(redirect_url(resp).await, "/collections/3");
}

#[tokio::test]
async fn restricted_collection_member_gets_shared_view() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    seed_collection(
        &storage,
        3,
        1,
        CollectionAccess::Restricted {
            entries: vec![entry("a@x.com")],
        },
    )
    .await;
    seed_link(&storage, "col001", EntityKind::Collection, 3).await;

    let app = resolve_app!(storage);
    let req = TestRequest::get()
        .uri("/c/col001")
        .insert_header(bearer(42, "a@x.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(redirect_url(resp).await, "/collections/shared/3");
}

#[tokio::test]
async fn restricted_collection_denies_outsider() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    seed_collection(
        &storage,
        3,
        1,
        CollectionAccess::Restricted {
            entries: vec![entry("a@x.com")],
        },
    )
    .await;
    seed_link(&storage, "col001", EntityKind::Collection, 3).await;

    let app = resolve_app!(storage);
    let req = TestRequest::get()
        .uri("/c/col001")
        .insert_header(bearer(42, "b@x.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Access denied");
}

#[tokio::test]
async fn empty_share_list_denies_even_the_owner() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    seed_collection(&storage, 9, 1, CollectionAccess::Restricted { entries: vec![] }).await;
    seed_link(&storage, "xyz789", EntityKind::Collection, 9).await;

    let app = resolve_app!(storage);

    let resp = test::call_service(&app, TestRequest::get().uri("/c/xyz789").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = TestRequest::get()
        .uri("/c/xyz789")
        .insert_header(bearer(1, "owner@x.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn garbage_token_is_treated_as_anonymous() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    seed_collection(
        &storage,
        3,
        1,
        CollectionAccess::Restricted {
            entries: vec![entry("a@x.com")],
        },
    )
    .await;
    seed_link(&storage, "col001", EntityKind::Collection, 3).await;

    let app = resolve_app!(storage);
    let req = TestRequest::get()
        .uri("/c/col001")
        .insert_header(("Authorization", "Bearer not-a-real-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Resources
// =============================================================================

#[tokio::test]
async fn unrestricted_resource_redirects_and_counts_views() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    seed_resource(&storage, 5, "owner@x.com", &[]).await;
    seed_link(&storage, "res001", EntityKind::Resource, 5).await;

    let app = resolve_app!(storage);

    for expected_count in 1..=2 {
        let resp =
            test::call_service(&app, TestRequest::get().uri("/r/res001").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(redirect_url(resp).await, "/resources/5");

        let resource = storage.get_resource(5).await.unwrap().unwrap();
        assert_eq!(resource.view_count, expected_count);
    }
}

#[tokio::test]
async fn restricted_resource_full_decision_table() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    seed_resource(&storage, 5, "owner@x.com", &["a@x.com"]).await;
    seed_link(&storage, "res001", EntityKind::Resource, 5).await;

    let app = resolve_app!(storage);

    // 匿名 → 401
    let resp = test::call_service(&app, TestRequest::get().uri("/r/res001").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // 名单内 → 200
    let req = TestRequest::get()
        .uri("/r/res001")
        .insert_header(bearer(9, "a@x.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(redirect_url(resp).await, "/resources/5");

    // 所有者邮箱豁免 → 200
    let req = TestRequest::get()
        .uri("/r/res001")
        .insert_header(bearer(1, "owner@x.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // 名单外 → 403
    let req = TestRequest::get()
        .uri("/r/res001")
        .insert_header(bearer(9, "b@x.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // 两次放行，各计一次浏览；拒绝不计数
    let resource = storage.get_resource(5).await.unwrap().unwrap();
    assert_eq!(resource.view_count, 2);
}

#[tokio::test]
async fn denied_resolution_does_not_count_views() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    seed_resource(&storage, 5, "owner@x.com", &["a@x.com"]).await;
    seed_link(&storage, "res001", EntityKind::Resource, 5).await;

    let app = resolve_app!(storage);
    let req = TestRequest::get()
        .uri("/r/res001")
        .insert_header(bearer(9, "b@x.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resource = storage.get_resource(5).await.unwrap().unwrap();
    assert_eq!(resource.view_count, 0);
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn unknown_code_is_not_found() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let app = resolve_app!(storage);

    let resp = test::call_service(&app, TestRequest::get().uri("/c/missing").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Not Found");
}

#[tokio::test]
async fn kind_mismatch_is_not_found() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    seed_resource(&storage, 5, "owner@x.com", &[]).await;
    seed_link(&storage, "res001", EntityKind::Resource, 5).await;

    let app = resolve_app!(storage);
    // 资源短码走收藏夹路由
    let resp = test::call_service(&app, TestRequest::get().uri("/c/res001").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dangling_link_is_not_found() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    // 短码存在，但指向的收藏夹不存在
    seed_link(&storage, "ghost1", EntityKind::Collection, 404).await;

    let app = resolve_app!(storage);
    let resp = test::call_service(&app, TestRequest::get().uri("/c/ghost1").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_code_is_a_missing_parameter() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let app = resolve_app!(storage);

    let resp = test::call_service(&app, TestRequest::get().uri("/c/%20").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "short_code is required");
}

#[tokio::test]
async fn invalid_code_is_not_found() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let app = resolve_app!(storage);

    let resp =
        test::call_service(&app, TestRequest::get().uri("/r/%3Cscript%3E").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
