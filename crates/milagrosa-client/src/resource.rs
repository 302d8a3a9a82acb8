//! Gated access to the REST resource APIs.
//!
//! Every call attaches the session's bearer token. Mutating calls are
//! checked against the capability gate before they are sent; the server
//! still decides. A 401 ends the session the request was sent under; a
//! 403 only reports.

use std::sync::Arc;

use bytes::Bytes;
use chrono::NaiveDate;
use milagrosa_auth::capability::{self, Action};
use milagrosa_auth::error::AuthError;
use milagrosa_auth::role::resolve_role;
use milagrosa_auth::session::SessionStore;
use milagrosa_core::error::{MilagrosaError, MilagrosaResult};
use milagrosa_core::gateway::{AuthApi, TokenStorage};
use milagrosa_core::models::order::{CUSTOMER_ORDER_IVA, Order, OrderKind, OrderRequest};
use milagrosa_core::models::role::Role;
use milagrosa_core::models::session::Session;
use milagrosa_core::models::user::UserAccount;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::connection::ApiConnection;
use crate::error::{ClientError, status_error};

/// Collections exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Categories,
    Products,
    Inventory,
    Providers,
    Users,
    CustomerOrders,
    PurchaseOrders,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Create,
    Update,
    Delete,
}

impl Resource {
    pub const ALL: [Resource; 7] = [
        Resource::Categories,
        Resource::Products,
        Resource::Inventory,
        Resource::Providers,
        Resource::Users,
        Resource::CustomerOrders,
        Resource::PurchaseOrders,
    ];

    /// Accepts singular or plural names, e.g. `product` / `products`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "category" | "categories" => Some(Resource::Categories),
            "product" | "products" => Some(Resource::Products),
            "inventory" | "inventories" => Some(Resource::Inventory),
            "provider" | "providers" => Some(Resource::Providers),
            "user" | "users" => Some(Resource::Users),
            "customer-order" | "customer-orders" => Some(Resource::CustomerOrders),
            "purchase-order" | "purchase-orders" => Some(Resource::PurchaseOrders),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Resource::Categories => "categories",
            Resource::Products => "products",
            Resource::Inventory => "inventory",
            Resource::Providers => "providers",
            Resource::Users => "users",
            Resource::CustomerOrders => "customer-orders",
            Resource::PurchaseOrders => "purchase-orders",
        }
    }

    fn base(&self) -> &'static str {
        match self {
            Resource::Categories => "categories",
            Resource::Products => "products",
            Resource::Inventory => "inventory",
            Resource::Providers => "providers",
            Resource::Users => "users",
            Resource::CustomerOrders => "order/customer",
            Resource::PurchaseOrders => "order/purchase",
        }
    }

    pub fn list_path(&self) -> String {
        match self {
            Resource::Products | Resource::Inventory => format!("{}/findAll", self.base()),
            Resource::CustomerOrders | Resource::PurchaseOrders => {
                format!("{}/findAllOrders", self.base())
            }
            _ => self.base().to_string(),
        }
    }

    pub fn item_path(&self, id: i64) -> String {
        format!("{}/{id}", self.base())
    }

    /// `None` when the backend has no create endpoint (users sign up
    /// through registration). Orders are filed under the creator's e-mail.
    pub fn create_path(&self, identity: &str) -> Option<String> {
        match self {
            Resource::Categories | Resource::Providers => Some(self.base().to_string()),
            Resource::Products => Some("products/register".into()),
            Resource::Inventory => Some("inventory/create".into()),
            Resource::Users => None,
            Resource::CustomerOrders | Resource::PurchaseOrders => {
                Some(format!("{}/register/{identity}", self.base()))
            }
        }
    }

    pub fn update_path(&self, id: i64) -> String {
        match self {
            Resource::Categories | Resource::Providers | Resource::Users => self.item_path(id),
            _ => format!("{}/update/{id}", self.base()),
        }
    }

    /// Gate applied to reads, if any.
    pub fn read_action(&self) -> Option<Action> {
        match self {
            Resource::Users => Some(Action::ManageUsers),
            Resource::Providers => Some(Action::ManageProviders),
            Resource::PurchaseOrders => Some(Action::ManageOrders),
            Resource::Categories
            | Resource::Products
            | Resource::Inventory
            | Resource::CustomerOrders => None,
        }
    }

    /// Gate applied to a write.
    pub fn write_action(&self, op: WriteOp) -> Action {
        match (self, op) {
            (Resource::Categories | Resource::Products | Resource::Inventory, _) => {
                Action::ManageCatalog
            }
            (Resource::Providers, _) => Action::ManageProviders,
            (Resource::Users, _) => Action::ManageUsers,
            (Resource::CustomerOrders, WriteOp::Create) => Action::PlaceOrder,
            (Resource::CustomerOrders | Resource::PurchaseOrders, _) => Action::ManageOrders,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Sales,
    Purchases,
}

impl ReportKind {
    fn path(&self) -> &'static str {
        match self {
            ReportKind::Sales => "reportes/ventas",
            ReportKind::Purchases => "reportes/compras",
        }
    }
}

/// Role of a listed account, for gating actions against it.
pub fn account_role(account: &UserAccount) -> Result<Role, AuthError> {
    resolve_role(&account.roles)
}

/// Client for the resource APIs, bound to one session store.
pub struct ResourceClient<A: AuthApi, S: TokenStorage> {
    conn: ApiConnection,
    session: Arc<SessionStore<A, S>>,
}

impl<A: AuthApi, S: TokenStorage> ResourceClient<A, S> {
    pub fn new(conn: ApiConnection, session: Arc<SessionStore<A, S>>) -> Self {
        Self { conn, session }
    }

    pub fn session(&self) -> &SessionStore<A, S> {
        &self.session
    }

    // -- generic CRUD -------------------------------------------------------

    pub async fn list(&self, resource: Resource) -> MilagrosaResult<Vec<Value>> {
        let resp = self
            .dispatch(Method::GET, &resource.list_path(), None, resource.read_action())
            .await?;
        read_json(resp).await
    }

    pub async fn get(&self, resource: Resource, id: i64) -> MilagrosaResult<Value> {
        let resp = self
            .dispatch(Method::GET, &resource.item_path(id), None, resource.read_action())
            .await?;
        read_json(resp).await
    }

    pub async fn create(&self, resource: Resource, body: Value) -> MilagrosaResult<Value> {
        let session = self.require_session()?;
        let path = resource
            .create_path(&session.identity)
            .ok_or_else(|| MilagrosaError::Validation {
                message: format!("{} cannot be created from the client", resource.name()),
            })?;
        let resp = self
            .dispatch(
                Method::POST,
                &path,
                Some(body),
                Some(resource.write_action(WriteOp::Create)),
            )
            .await?;
        read_json_or_null(resp).await
    }

    pub async fn update(&self, resource: Resource, id: i64, body: Value) -> MilagrosaResult<Value> {
        let resp = self
            .dispatch(
                Method::PUT,
                &resource.update_path(id),
                Some(body),
                Some(resource.write_action(WriteOp::Update)),
            )
            .await?;
        read_json_or_null(resp).await
    }

    pub async fn delete(&self, resource: Resource, id: i64) -> MilagrosaResult<()> {
        if resource == Resource::Users {
            let account: UserAccount = serde_json::from_value(self.get(resource, id).await?)
                .map_err(|e| ClientError::Decode(e.to_string()))?;
            return self.delete_user(&account).await;
        }
        self.dispatch(
            Method::DELETE,
            &resource.item_path(id),
            None,
            Some(resource.write_action(WriteOp::Delete)),
        )
        .await?;
        Ok(())
    }

    // -- users --------------------------------------------------------------

    pub async fn list_users(&self) -> MilagrosaResult<Vec<UserAccount>> {
        let resp = self
            .dispatch(Method::GET, &Resource::Users.list_path(), None, Resource::Users.read_action())
            .await?;
        read_json(resp).await
    }

    pub async fn delete_user(&self, account: &UserAccount) -> MilagrosaResult<()> {
        let session = self.require_session()?;
        let action = Action::DeleteUser {
            target: account_role(account)?,
            is_self: is_self(&session, account),
        };
        self.dispatch(
            Method::DELETE,
            &Resource::Users.item_path(account.id),
            None,
            Some(action),
        )
        .await?;
        Ok(())
    }

    pub async fn make_admin(&self, account: &UserAccount) -> MilagrosaResult<UserAccount> {
        let session = self.require_session()?;
        let action = Action::PromoteToAdmin {
            target: account_role(account)?,
            is_self: is_self(&session, account),
        };
        let path = format!("{}/make-admin", Resource::Users.item_path(account.id));
        let resp = self.dispatch(Method::PUT, &path, None, Some(action)).await?;
        read_json(resp).await
    }

    // -- orders -------------------------------------------------------------

    pub async fn list_orders(&self, kind: OrderKind) -> MilagrosaResult<Vec<Order>> {
        let resource = order_resource(kind);
        let resp = self
            .dispatch(Method::GET, &resource.list_path(), None, resource.read_action())
            .await?;
        read_json(resp).await
    }

    /// File an order under the signed-in e-mail. Customer orders always
    /// carry the fixed VAT rate.
    pub async fn place_order(
        &self,
        kind: OrderKind,
        mut request: OrderRequest,
    ) -> MilagrosaResult<Value> {
        if kind == OrderKind::Customer {
            request.iva = CUSTOMER_ORDER_IVA;
        }
        let body = serde_json::to_value(&request).map_err(|e| ClientError::Decode(e.to_string()))?;
        self.create(order_resource(kind), body).await
    }

    pub async fn approve_order(&self, kind: OrderKind, number: i64) -> MilagrosaResult<Value> {
        let path = format!("order/{}/aproveOrder/{number}", kind.path_segment());
        let resp = self
            .dispatch(Method::POST, &path, Some(Value::Object(Default::default())), Some(Action::ApproveOrders))
            .await?;
        read_json_or_null(resp).await
    }

    // -- reports ------------------------------------------------------------

    /// Download a PDF report. The bytes are returned untouched.
    pub async fn report_pdf(
        &self,
        kind: ReportKind,
        from: NaiveDate,
        to: NaiveDate,
    ) -> MilagrosaResult<Bytes> {
        let path = format!("{}?from={from}&to={to}", kind.path());
        let resp = self
            .dispatch(Method::GET, &path, None, Some(Action::ViewReports))
            .await?;
        Ok(resp.bytes().await.map_err(ClientError::from)?)
    }

    pub async fn report_summary(&self, from: NaiveDate, to: NaiveDate) -> MilagrosaResult<Value> {
        let path = format!("reportes/resumen?from={from}&to={to}");
        let resp = self
            .dispatch(Method::GET, &path, None, Some(Action::ViewReports))
            .await?;
        read_json(resp).await
    }

    // -- plumbing -----------------------------------------------------------

    fn require_session(&self) -> MilagrosaResult<Session> {
        self.session
            .current()
            .ok_or_else(|| MilagrosaError::AuthenticationFailed {
                reason: "not logged in".into(),
            })
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        gate: Option<Action>,
    ) -> MilagrosaResult<Response> {
        let session = self.require_session()?;
        if let Some(action) = gate {
            capability::authorize(session.role, action).inspect_err(|e| {
                debug!(%method, path, error = %e, "request blocked by capability gate");
            })?;
        }
        let token = self.session.bearer_token().ok_or(MilagrosaError::SessionExpired)?;

        let mut request = self.conn.request(method.clone(), path).bearer_auth(&token);
        if let Some(body) = &body {
            request = request.json(body);
        }
        let resp = request.send().await.map_err(ClientError::from)?;

        let status = resp.status();
        if status.is_success() {
            debug!(%method, path, %status, "request ok");
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        let err = status_error(status, text, entity_of(path));
        warn!(%method, path, %status, error = %err, "request rejected");
        if err.ends_session() {
            self.session.expire_token(&token);
        }
        Err(err)
    }
}

fn order_resource(kind: OrderKind) -> Resource {
    match kind {
        OrderKind::Customer => Resource::CustomerOrders,
        OrderKind::Purchase => Resource::PurchaseOrders,
    }
}

fn is_self(session: &Session, account: &UserAccount) -> bool {
    account.email.eq_ignore_ascii_case(&session.identity)
}

/// Path without the query string, used to name the entity in errors.
fn entity_of(path: &str) -> &str {
    path.split('?').next().unwrap_or(path)
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> MilagrosaResult<T> {
    Ok(resp
        .json::<T>()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))?)
}

/// Like [`read_json`], but an empty body reads as `null`.
async fn read_json_or_null(resp: Response) -> MilagrosaResult<Value> {
    let bytes = resp.bytes().await.map_err(ClientError::from)?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(value),
        Err(_) => Ok(Value::String(String::from_utf8_lossy(&bytes).into_owned())),
    }
}
