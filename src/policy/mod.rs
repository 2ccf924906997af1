//! Access-policy evaluator for shared entities.
//!
//! Pure decision logic: no storage access and no side effects, so every rule
//! is unit-testable in isolation. The resolver loads the entity and requester
//! and maps the returned [`Decision`] onto an HTTP response; the view-count
//! side effect fires only after a resource `Redirect`.

use crate::structs::{Collection, CollectionAccess, RequesterIdentity, Resource, ShareableEntity};

/// Outcome of evaluating a requester against an entity's sharing settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Access granted; the client should navigate to this path.
    Redirect(String),
    /// Entity is restricted and the requester is anonymous.
    RequireAuth,
    /// Requester is authenticated but not entitled.
    Denied,
}

/// Canonical shared-view path for a collection.
pub fn collection_shared_view(id: i64) -> String {
    format!("/collections/shared/{}", id)
}

/// Owner's private management view for a collection.
pub fn collection_owner_view(id: i64) -> String {
    format!("/collections/{}", id)
}

pub fn evaluate(entity: &ShareableEntity, requester: Option<&RequesterIdentity>) -> Decision {
    match entity {
        ShareableEntity::Collection(collection) => evaluate_collection(collection, requester),
        ShareableEntity::Resource(resource) => evaluate_resource(resource, requester),
    }
}

fn evaluate_collection(collection: &Collection, requester: Option<&RequesterIdentity>) -> Decision {
    let entries = match &collection.access {
        CollectionAccess::Public => {
            // 公开收藏夹对任何人放行
            return Decision::Redirect(collection_shared_view(collection.id));
        }
        CollectionAccess::Restricted { entries } => entries,
    };

    // An empty share list denies everyone, the owner included. Observed
    // upstream behavior, kept as-is.
    if entries.is_empty() {
        return Decision::Denied;
    }

    let requester = match requester {
        Some(requester) => requester,
        None => return Decision::RequireAuth,
    };

    // Owner check runs before membership, so owners keep access to their own
    // management view even when absent from the share list.
    if requester.id == collection.owner_id {
        return Decision::Redirect(collection_owner_view(collection.id));
    }

    if entries.iter().any(|entry| entry.email == requester.email) {
        return Decision::Redirect(collection_shared_view(collection.id));
    }

    Decision::Denied
}

fn evaluate_resource(resource: &Resource, requester: Option<&RequesterIdentity>) -> Decision {
    if !resource.restricted_to.is_empty() {
        let requester = match requester {
            Some(requester) => requester,
            None => return Decision::RequireAuth,
        };

        let allowed = resource.restricted_to.iter().any(|e| *e == requester.email)
            || requester.email == resource.owner_email;

        if !allowed {
            return Decision::Denied;
        }
    }

    Decision::Redirect(resource.full_path.clone())
}
