//! crates/moviereview_core/src/domain.rs
//!
//! Defines the hypermedia document model and the resource types served by the
//! movie review API. These types carry no I/O; the resolver adapter decodes
//! into them at its boundary.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

//=========================================================================================
// Relation Names
//=========================================================================================

/// Relation names published by resources below the root document.
pub mod relations {
    pub const SELF: &str = "self";
    pub const UP: &str = "up";
    pub const COLLECTION: &str = "collection";
    pub const REVIEWS_FOR_MOVIE: &str = "reviews-for-movie";
    pub const REVIEWS_OF_USER: &str = "reviews-of-user";
    pub const ADD_REVIEW: &str = "add-review";
    pub const EDIT: &str = "edit";
    pub const DELETE: &str = "delete";
}

/// The endpoints the client looks for in the root document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Endpoint {
    MoviesAll,
    CategoriesAll,
    UsersAll,
    AddMovie,
    AddCategory,
    AddUser,
    Login,
    CurrentUser,
}

impl Endpoint {
    pub const ALL: [Endpoint; 8] = [
        Endpoint::MoviesAll,
        Endpoint::CategoriesAll,
        Endpoint::UsersAll,
        Endpoint::AddMovie,
        Endpoint::AddCategory,
        Endpoint::AddUser,
        Endpoint::Login,
        Endpoint::CurrentUser,
    ];

    /// The relation name this endpoint is published under.
    pub fn relation(self) -> &'static str {
        match self {
            Endpoint::MoviesAll => "movies-all",
            Endpoint::CategoriesAll => "categories-all",
            Endpoint::UsersAll => "users-all",
            Endpoint::AddMovie => "add-movie",
            Endpoint::AddCategory => "add-category",
            Endpoint::AddUser => "add-user",
            Endpoint::Login => "login",
            Endpoint::CurrentUser => "current-user",
        }
    }

    pub fn from_relation(relation: &str) -> Option<Self> {
        let relation = bare_relation(relation);
        Self::ALL.into_iter().find(|e| e.relation() == relation)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.relation())
    }
}

//=========================================================================================
// Links and Documents
//=========================================================================================

/// A link's request method. Parsed case-insensitively; a verb the client
/// does not speak is kept as `Other` so the rest of the document still loads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Other(String),
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Other(verb) => verb,
        }
    }
}

impl From<String> for HttpMethod {
    fn from(raw: String) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "PATCH" => HttpMethod::Patch,
            "DELETE" => HttpMethod::Delete,
            _ => HttpMethod::Other(raw),
        }
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_str().to_string()
    }
}

/// A named, typed pointer to another endpoint.
///
/// A link that carries a `schema` describes a writable resource; without one
/// it is read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub title: String,
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl Link {
    /// A plain GET link, e.g. for a `Location` returned by a create.
    pub fn get(href: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            href: href.into(),
            method: None,
            schema: None,
            encoding: None,
        }
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// The request method, `GET` when the link does not name one.
    pub fn method(&self) -> HttpMethod {
        self.method.clone().unwrap_or_default()
    }

    pub fn is_writable(&self) -> bool {
        self.schema.is_some()
    }

    /// The form description derived from the write schema, if any.
    pub fn form(&self) -> Option<FormSchema> {
        self.schema.as_ref().map(FormSchema::from_value)
    }
}

/// Relation name to link, as published under a document's controls.
pub type Controls = BTreeMap<String, Link>;

/// Strips a namespace prefix (`moviereviewmeta:movies-all` -> `movies-all`).
pub fn bare_relation(key: &str) -> &str {
    key.rsplit_once(':').map_or(key, |(_, relation)| relation)
}

/// Looks a relation up by exact key first, then by its bare name.
pub fn find_control<'a>(controls: &'a Controls, relation: &str) -> Option<&'a Link> {
    controls.get(relation).or_else(|| {
        controls
            .iter()
            .find(|(key, _)| bare_relation(key) == relation)
            .map(|(_, link)| link)
    })
}

/// Anything carrying a controls mapping.
pub trait Hypermedia {
    fn controls(&self) -> &Controls;

    fn control(&self, relation: &str) -> Option<&Link> {
        find_control(self.controls(), relation)
    }
}

/// The bare envelope of any API response: its controls and nothing else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HypermediaDocument {
    #[serde(default)]
    pub controls: Controls,
}

impl HypermediaDocument {
    pub fn from_controls<I, K>(controls: I) -> Self
    where
        I: IntoIterator<Item = (K, Link)>,
        K: Into<String>,
    {
        Self {
            controls: controls.into_iter().map(|(k, l)| (k.into(), l)).collect(),
        }
    }
}

impl Hypermedia for HypermediaDocument {
    fn controls(&self) -> &Controls {
        &self.controls
    }
}

/// Rewrites a Mason payload into the plain form the typed models expect.
///
/// `@controls` becomes `controls` and namespaced relation names lose their
/// prefix, at every nesting level (collection items carry their own controls).
pub fn normalize_document(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, val) in map {
                if key == "@controls" || key == "controls" {
                    out.insert("controls".to_string(), normalize_controls(val));
                } else {
                    out.insert(key, normalize_document(val));
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_document).collect()),
        other => other,
    }
}

fn normalize_controls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, link)| (bare_relation(&key).to_string(), link))
                .collect(),
        ),
        other => other,
    }
}

/// Extracts the server-provided message from an error payload.
///
/// Accepts both `{"message": ..}` and Mason's `{"@error": {"@message": ..}}`.
pub fn error_message(payload: &Value) -> Option<String> {
    payload
        .get("message")
        .or_else(|| payload.get("@error").and_then(|e| e.get("@message")))
        .and_then(Value::as_str)
        .map(str::to_string)
}

//=========================================================================================
// Write Schemas
//=========================================================================================

/// One input of a create/update form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub required: bool,
}

/// The form a writable link describes, read from its JSON schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSchema {
    pub fields: Vec<FormField>,
}

impl FormSchema {
    pub fn from_value(schema: &Value) -> Self {
        let required: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let text = |prop: &Value, key: &str| prop.get(key).and_then(Value::as_str).map(str::to_string);

        let fields = schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .map(|(name, prop)| FormField {
                        name: name.clone(),
                        title: text(prop, "title"),
                        description: text(prop, "description"),
                        kind: text(prop, "type"),
                        required: required.contains(&name.as_str()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of required fields that the draft leaves out or sets to null.
    pub fn missing_fields(&self, draft: &Value) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .filter(|f| draft.get(&f.name).map_or(true, Value::is_null))
            .map(|f| f.name.as_str())
            .collect()
    }
}

//=========================================================================================
// Resources
//=========================================================================================

/// `{ items: [...], controls: {...} }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub controls: Controls,
}

impl<T> Hypermedia for Collection<T> {
    fn controls(&self) -> &Controls {
        &self.controls
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub director: String,
    /// Running time in seconds.
    pub length: i64,
    pub release_date: String,
    pub category_id: i64,
    #[serde(default)]
    pub controls: Controls,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub controls: Controls,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    /// 1 to 5 stars.
    pub rating: u8,
    pub comment: String,
    pub date: String,
    pub author: String,
    pub movie_id: i64,
    #[serde(default)]
    pub controls: Controls,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    #[serde(rename = "Basic User")]
    BasicUser,
}

/// The authenticated principal's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub email_address: String,
    pub role: UserRole,
    #[serde(default)]
    pub controls: Controls,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Authors may change their own reviews; admins may change any.
    pub fn can_modify(&self, review: &Review) -> bool {
        self.is_admin() || self.username == review.author
    }
}

macro_rules! impl_hypermedia {
    ($($ty:ty),*) => {
        $(impl Hypermedia for $ty {
            fn controls(&self) -> &Controls {
                &self.controls
            }
        })*
    };
}

impl_hypermedia!(Movie, Category, Review, User);

//=========================================================================================
// Request Bodies
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// The body of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDraft {
    pub rating: u8,
    pub comment: String,
    pub date: String,
    pub author: String,
    pub movie_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDraft {
    pub title: String,
    pub director: String,
    pub length: i64,
    pub release_date: String,
    pub category_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    pub username: String,
    pub email_address: String,
    pub password: String,
    pub role: UserRole,
}
