pub use serde::{Deserialize, Serialize};

/// Which side of the bookmarking model a short code points at.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Resource,
    Collection,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resource => write!(f, "resource"),
            Self::Collection => write!(f, "collection"),
        }
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resource" => Ok(Self::Resource),
            "collection" => Ok(Self::Collection),
            _ => Err(format!("Unknown entity kind: {}", s)),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SharePermission {
    View,
    Edit,
}

/// One grant on a restricted collection.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ShareEntry {
    pub email: String,
    pub permission: SharePermission,
}

/// Collection visibility, validated at the storage boundary so the policy
/// evaluator never sees a malformed sharing blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CollectionAccess {
    Public,
    Restricted { entries: Vec<ShareEntry> },
}

#[derive(Clone, Debug)]
pub struct Resource {
    pub id: i64,
    pub owner_id: i64,
    pub owner_email: String,
    pub full_path: String,
    /// Restriction allow-list; empty means anyone with the code may follow it.
    pub restricted_to: Vec<String>,
    pub view_count: i64,
}

#[derive(Clone, Debug)]
pub struct Collection {
    pub id: i64,
    pub owner_id: i64,
    pub access: CollectionAccess,
}

#[derive(Clone, Debug)]
pub enum ShareableEntity {
    Resource(Resource),
    Collection(Collection),
}

impl ShareableEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Resource(_) => EntityKind::Resource,
            Self::Collection(_) => EntityKind::Collection,
        }
    }
}

/// A minted share code. Maps 1:1 to one entity; immutable once created.
#[derive(Clone, Debug)]
pub struct ShortLink {
    pub short_code: String,
    pub kind: EntityKind,
    pub entity_id: i64,
    pub full_path: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Authenticated requester. Absent entirely for anonymous requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequesterIdentity {
    pub id: i64,
    pub email: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiData<T> {
    pub data: T,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiMessage {
    pub message: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RedirectData {
    pub redirect_url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PostShareRequest {
    pub kind: EntityKind,
    pub entity_id: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ShareData {
    pub short_code: String,
    pub short_url: String,
}

#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
