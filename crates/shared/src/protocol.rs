use serde::{Deserialize, Serialize};

use crate::domain::{Client, ClientNote, Payment, Policy, SessionUser};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPasswordRequest {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub token: String,
}

/// Acknowledgement body used by endpoints that only return a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserResponse {
    pub user: SessionUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteRequest {
    #[serde(rename = "contenido")]
    pub content: String,
}

/// Notes endpoint answers either a bare array or `{ "notas": [...] }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NotesResponse {
    Bare(Vec<ClientNote>),
    Wrapped {
        #[serde(alias = "notas", alias = "data")]
        notes: Vec<ClientNote>,
    },
}

impl NotesResponse {
    pub fn into_notes(self) -> Vec<ClientNote> {
        match self {
            Self::Bare(notes) | Self::Wrapped { notes } => notes,
        }
    }
}

/// Unpaginated payment lists: a bare array or `{ "pagos": [...] }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PaymentsResponse {
    Bare(Vec<Payment>),
    Wrapped {
        #[serde(alias = "pagos", alias = "data")]
        payments: Vec<Payment>,
    },
}

impl PaymentsResponse {
    pub fn into_payments(self) -> Vec<Payment> {
        match self {
            Self::Bare(payments) | Self::Wrapped { payments } => payments,
        }
    }
}

/// Single-entity endpoints sometimes wrap the record under a key.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped {
        #[serde(
            alias = "client",
            alias = "cliente",
            alias = "policy",
            alias = "poliza",
            alias = "payment",
            alias = "pago",
            alias = "note",
            alias = "nota"
        )]
        data: T,
    },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

/// Answer of a create/update endpoint: the stored record, wrapped or bare, or
/// only an acknowledgement message.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Saved<T> {
    Record(Envelope<T>),
    Ack(MessageResponse),
}

impl<T> Saved<T> {
    pub fn into_record(self) -> Option<T> {
        match self {
            Self::Record(envelope) => Some(envelope.into_inner()),
            Self::Ack(_) => None,
        }
    }
}

/// One page of records, normalised from the backend's several envelopes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub total_pages: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_items: Option<u64>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            current_page: 1,
            total_pages: 1,
            total_items: None,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// `ceil(total / per_page)`, never below one page.
pub fn total_pages_for(total: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 1;
    }
    let pages = total.div_ceil(u64::from(per_page));
    u32::try_from(pages).unwrap_or(u32::MAX).max(1)
}

fn at_least_one(value: Option<u32>) -> u32 {
    value.unwrap_or(1).max(1)
}

/// Laravel `paginate()` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct LaravelPage<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub last_page: Option<u32>,
}

impl<T> From<LaravelPage<T>> for Page<T> {
    fn from(raw: LaravelPage<T>) -> Self {
        let total_pages = match (raw.total, raw.per_page) {
            (Some(total), Some(per_page)) => total_pages_for(total, per_page),
            _ => at_least_one(raw.last_page),
        };
        Self {
            items: raw.data,
            current_page: at_least_one(raw.current_page),
            total_pages,
            total_items: raw.total,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSearchPage {
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default, alias = "totalPaginas")]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub total_items: Option<u64>,
}

impl From<ClientSearchPage> for Page<Client> {
    fn from(raw: ClientSearchPage) -> Self {
        Self {
            items: raw.clients,
            current_page: at_least_one(raw.current_page),
            total_pages: at_least_one(raw.total_pages),
            total_items: raw.total_items,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySearchPage {
    #[serde(default)]
    pub policies: Vec<Policy>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub total_items: Option<u64>,
}

impl From<PolicySearchPage> for Page<Policy> {
    fn from(raw: PolicySearchPage) -> Self {
        Self {
            items: raw.policies,
            current_page: at_least_one(raw.current_page),
            total_pages: at_least_one(raw.total_pages),
            total_items: raw.total_items,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPoliciesPage {
    #[serde(default, rename = "polizas")]
    pub policies: Vec<Policy>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub current_page: Option<u32>,
}

impl From<ClientPoliciesPage> for Page<Policy> {
    fn from(raw: ClientPoliciesPage) -> Self {
        Self {
            items: raw.policies,
            current_page: at_least_one(raw.current_page),
            total_pages: at_least_one(raw.total_pages),
            total_items: None,
        }
    }
}

/// User-scoped payments: camelCase pagination keys.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPaymentsPage {
    #[serde(rename = "pagos")]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl From<UserPaymentsPage> for Page<Payment> {
    fn from(raw: UserPaymentsPage) -> Self {
        let total_pages = match (raw.total_pages, raw.total, raw.per_page) {
            (Some(pages), _, _) => pages.max(1),
            (None, Some(total), Some(per_page)) => total_pages_for(total, per_page),
            _ => 1,
        };
        Self {
            items: raw.payments,
            current_page: at_least_one(raw.current_page),
            total_pages,
            total_items: raw.total,
        }
    }
}

/// Policy-scoped payments: snake_case pagination keys.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyPaymentsPage {
    #[serde(rename = "pagos")]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl From<PolicyPaymentsPage> for Page<Payment> {
    fn from(raw: PolicyPaymentsPage) -> Self {
        Self {
            items: raw.payments,
            current_page: at_least_one(raw.current_page),
            total_pages: at_least_one(raw.total_pages),
            total_items: raw.total,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeSearchResponse {
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub policies: Vec<Policy>,
    #[serde(default)]
    pub total_clients: Option<u64>,
    #[serde(default)]
    pub total_policies: Option<u64>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub total_pages_clients: Option<u32>,
    #[serde(default)]
    pub total_pages_policies: Option<u32>,
}

/// Combined home search split into one page per entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeSearchResults {
    pub clients: Page<Client>,
    pub policies: Page<Policy>,
}

impl From<HomeSearchResponse> for HomeSearchResults {
    fn from(raw: HomeSearchResponse) -> Self {
        let current_page = at_least_one(raw.current_page);
        Self {
            clients: Page {
                items: raw.clients,
                current_page,
                total_pages: at_least_one(raw.total_pages_clients),
                total_items: raw.total_clients,
            },
            policies: Page {
                items: raw.policies,
                current_page,
                total_pages: at_least_one(raw.total_pages_policies),
                total_items: raw.total_policies,
            },
        }
    }
}

/// `GET /poliza/{id}` answer used by the payments view: the policy with its
/// owning client.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyHolderDetails {
    #[serde(alias = "poliza")]
    pub policy: Policy,
    #[serde(default, alias = "cliente")]
    pub client: Option<Client>,
}
