//! In-memory stand-in for a Moodle site's REST endpoints.
//!
//! # Design
//! Serves `login/token.php` and `webservice/rest/server.php` with the same
//! answer shapes a real site produces: JSON objects, arrays, the literal
//! `null`, and `errorcode` objects with HTTP 200. Only a handful of user
//! functions are emulated; everything else answers as an unknown function.

use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "Passw0rd!";
pub const SITE_NAME: &str = "Mock Moodle";

const REQUIRED_USER_FIELDS: [&str; 5] = ["username", "password", "firstname", "lastname", "email"];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub fullname: String,
    pub email: String,
}

#[derive(Debug)]
pub struct Store {
    users: BTreeMap<i64, User>,
    next_id: i64,
    tokens: HashSet<String>,
}

impl Default for Store {
    fn default() -> Self {
        let admin = User {
            id: 2,
            username: ADMIN_USERNAME.to_string(),
            firstname: "Admin".to_string(),
            lastname: "User".to_string(),
            fullname: "Admin User".to_string(),
            email: "admin@example.com".to_string(),
        };
        Self {
            users: BTreeMap::from([(admin.id, admin)]),
            next_id: 3,
            tokens: HashSet::new(),
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

type Params = Vec<(String, String)>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/login/token.php", get(issue_token))
        .route("/webservice/rest/server.php", get(dispatch))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Moodle answers with `application/json` and status 200 even for errors.
fn reply(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

fn reply_json(value: &Value) -> Response {
    reply(value.to_string())
}

fn param<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

/// Values of `name[0]`, `name[1]`, ... in index order.
fn list<'a>(params: &'a Params, name: &str) -> Vec<&'a str> {
    (0..)
        .map_while(|i| param(params, &format!("{name}[{i}]")))
        .collect()
}

fn rpc_error(errorcode: &str, message: &str, debuginfo: Option<&str>) -> Value {
    let mut error = json!({
        "exception": "moodle_exception",
        "errorcode": errorcode,
        "message": message,
    });
    if let Some(debuginfo) = debuginfo {
        error["debuginfo"] = json!(debuginfo);
    }
    error
}

fn invalid_parameter(debuginfo: &str) -> Value {
    let mut error = rpc_error("invalidparameter", "Invalid parameter value detected", Some(debuginfo));
    error["exception"] = json!("invalid_parameter_exception");
    error
}

async fn issue_token(State(db): State<Db>, Query(params): Query<Params>) -> Response {
    let username = param(&params, "username").unwrap_or_default();
    let password = param(&params, "password").unwrap_or_default();
    if username != ADMIN_USERNAME || password != ADMIN_PASSWORD {
        log::info!("rejected login for {username:?}");
        return reply_json(&json!({
            "error": "Invalid login, please try again",
            "errorcode": "invalidlogin",
        }));
    }
    let token = Uuid::new_v4().simple().to_string();
    db.write().await.tokens.insert(token.clone());
    log::info!("issued token for service {:?}", param(&params, "service"));
    reply_json(&json!({ "token": token, "privatetoken": null }))
}

async fn dispatch(State(db): State<Db>, Query(params): Query<Params>) -> Response {
    let token = param(&params, "wstoken").unwrap_or_default();
    if !db.read().await.tokens.contains(token) {
        return reply_json(&rpc_error("invalidtoken", "Invalid token - token not found", None));
    }
    if param(&params, "moodlewsrestformat") != Some("json") {
        return reply_json(&rpc_error("invalidformat", "Only the json format is emulated", None));
    }
    let function = param(&params, "wsfunction").unwrap_or_default();
    log::debug!("dispatching {function}");
    match function {
        "core_webservice_get_site_info" => site_info(&db).await,
        "core_user_create_users" => create_users(&db, &params).await,
        "core_user_get_users_by_field" => get_users_by_field(&db, &params).await,
        "core_user_get_users" => get_users(&db, &params).await,
        "core_user_delete_users" => delete_users(&db, &params).await,
        _ => reply_json(&rpc_error(
            "invalidrecord",
            "Can't find data record in database table external_functions.",
            None,
        )),
    }
}

async fn site_info(db: &Db) -> Response {
    let store = db.read().await;
    let admin = store.users.get(&2);
    reply_json(&json!({
        "sitename": SITE_NAME,
        "username": admin.map(|u| u.username.as_str()).unwrap_or_default(),
        "firstname": admin.map(|u| u.firstname.as_str()).unwrap_or_default(),
        "lastname": admin.map(|u| u.lastname.as_str()).unwrap_or_default(),
        "fullname": admin.map(|u| u.fullname.as_str()).unwrap_or_default(),
        "lang": "en",
        "userid": 2,
        "siteurl": "http://localhost",
        "userpictureurl": "",
        "functions": [
            { "name": "core_user_create_users", "version": "2024042200" },
            { "name": "core_webservice_get_site_info", "version": "2024042200" },
        ],
        "release": "4.4 (Build: 20240422)",
    }))
}

async fn create_users(db: &Db, params: &Params) -> Response {
    let mut batch = Vec::new();
    for i in 0.. {
        let prefix = format!("users[{i}]");
        if !params.iter().any(|(k, _)| k.starts_with(&prefix)) {
            break;
        }
        let mut fields: [String; 5] = Default::default();
        for (slot, name) in fields.iter_mut().zip(REQUIRED_USER_FIELDS) {
            let key = format!("{prefix}[{name}]");
            match param(params, &key) {
                Some(value) => *slot = value.to_string(),
                None => {
                    return reply_json(&invalid_parameter(&format!("{key}: Missing required key")));
                }
            }
        }
        batch.push(fields);
    }
    if batch.is_empty() {
        return reply_json(&invalid_parameter("users: Only arrays accepted"));
    }

    let mut store = db.write().await;
    if let Some(taken) = batch
        .iter()
        .find(|fields| store.users.values().any(|u| u.username == fields[0]))
    {
        return reply_json(&invalid_parameter(&format!("Username already exists: {}", taken[0])));
    }
    let mut created = Vec::with_capacity(batch.len());
    for fields in batch {
        let id = store.next_id;
        store.next_id += 1;
        let [username, _password, firstname, lastname, email] = fields;
        created.push(json!({ "id": id, "username": username }));
        store.users.insert(
            id,
            User {
                id,
                fullname: format!("{firstname} {lastname}"),
                username,
                firstname,
                lastname,
                email,
            },
        );
    }
    reply_json(&Value::Array(created))
}

fn user_field(user: &User, field: &str) -> Option<String> {
    match field {
        "id" => Some(user.id.to_string()),
        "username" => Some(user.username.clone()),
        "email" => Some(user.email.clone()),
        _ => None,
    }
}

async fn get_users_by_field(db: &Db, params: &Params) -> Response {
    let field = param(params, "field").unwrap_or_default();
    if !matches!(field, "id" | "username" | "email") {
        return reply_json(&invalid_parameter(&format!("field: unsupported value {field:?}")));
    }
    let values = list(params, "values");
    let store = db.read().await;
    let users: Vec<&User> = store
        .users
        .values()
        .filter(|u| user_field(u, field).is_some_and(|v| values.contains(&v.as_str())))
        .collect();
    reply_json(&json!(users))
}

async fn get_users(db: &Db, params: &Params) -> Response {
    let mut criteria = Vec::new();
    for i in 0.. {
        let key = param(params, &format!("criteria[{i}][key]"));
        let value = param(params, &format!("criteria[{i}][value]"));
        match (key, value) {
            (Some(key), Some(value)) => criteria.push((key, value)),
            _ => break,
        }
    }
    let store = db.read().await;
    let users: Vec<&User> = store
        .users
        .values()
        .filter(|u| {
            criteria
                .iter()
                .all(|(key, value)| user_field(u, key).is_some_and(|v| v == *value))
        })
        .collect();
    reply_json(&json!({ "users": users, "warnings": [] }))
}

async fn delete_users(db: &Db, params: &Params) -> Response {
    let mut ids = Vec::new();
    for raw in list(params, "userids") {
        match raw.parse::<i64>() {
            Ok(id) => ids.push(id),
            Err(_) => return reply_json(&invalid_parameter(&format!("userids: Invalid parameter value {raw:?}"))),
        }
    }
    let mut store = db.write().await;
    for id in ids {
        store.users.remove(&id);
    }
    reply("null".to_string())
}
