pub mod domain;
pub mod ports;
pub mod state;

pub use domain::{
    relations, Category, CategoryDraft, Collection, Controls, Credentials, Endpoint, FormField,
    FormSchema, HttpMethod, Hypermedia, HypermediaDocument, Link, Movie, MovieDraft, Review,
    ReviewDraft, Token, User, UserDraft, UserRole,
};
pub use ports::{
    LinkResolver, LoginError, PortResult, ResolveError, Resolved, SessionStore, CREDENTIAL_KEY,
};
pub use state::{reduce, Action, AppState};
