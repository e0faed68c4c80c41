//! services/client/src/app/catalog.rs
//!
//! Typed operations over the movie review API. Every URL comes from a control
//! the server published; a control that is not published yields `Ok(None)`
//! (feature unavailable) rather than an error.

use moviereview_core::domain::{
    find_control, relations, Category, CategoryDraft, Collection, Controls, Endpoint, Hypermedia,
    HypermediaDocument, Link, Movie, MovieDraft, Review, ReviewDraft, User, UserDraft,
};
use moviereview_core::ports::{LinkResolver, PortResult, ResolveError, Resolved};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::app::store::Store;
use crate::error::ClientError;

#[derive(Clone)]
pub struct Catalog {
    store: Arc<Store>,
    resolver: Arc<dyn LinkResolver>,
}

impl Catalog {
    pub fn new(store: Arc<Store>, resolver: Arc<dyn LinkResolver>) -> Self {
        Self { store, resolver }
    }

    // --- Root Endpoints ---

    pub async fn movies(&self) -> PortResult<Option<Collection<Movie>>> {
        self.follow_endpoint(Endpoint::MoviesAll).await
    }

    pub async fn categories(&self) -> PortResult<Option<Collection<Category>>> {
        self.follow_endpoint(Endpoint::CategoriesAll).await
    }

    pub async fn users(&self) -> PortResult<Option<Collection<User>>> {
        self.follow_endpoint(Endpoint::UsersAll).await
    }

    pub async fn current_user(&self) -> PortResult<Option<User>> {
        self.follow_endpoint(Endpoint::CurrentUser).await
    }

    pub async fn add_movie(&self, draft: &MovieDraft) -> PortResult<Option<Movie>> {
        self.submit_to_endpoint(Endpoint::AddMovie, draft).await
    }

    pub async fn add_category(&self, draft: &CategoryDraft) -> PortResult<Option<Category>> {
        self.submit_to_endpoint(Endpoint::AddCategory, draft).await
    }

    pub async fn add_user(&self, draft: &UserDraft) -> PortResult<Option<User>> {
        self.submit_to_endpoint(Endpoint::AddUser, draft).await
    }

    // --- Movies ---

    pub async fn movie(&self, link: &Link) -> PortResult<Movie> {
        self.get(link).await
    }

    /// Finds a movie in the list by id and loads its own document.
    pub async fn find_movie(&self, id: i64) -> PortResult<Option<Movie>> {
        let Some(movies) = self.movies().await? else {
            return Ok(None);
        };
        let Some(item) = movies.items.into_iter().find(|m| m.id == id) else {
            return Ok(None);
        };
        match item.control(relations::SELF) {
            Some(link) => self.get(link).await.map(Some),
            None => Ok(Some(item)),
        }
    }

    // --- Reviews ---

    pub async fn reviews_for(&self, movie: &Movie) -> PortResult<Option<Collection<Review>>> {
        self.follow_control(&movie.controls, relations::REVIEWS_FOR_MOVIE).await
    }

    pub async fn reviews_of(&self, user: &User) -> PortResult<Option<Collection<Review>>> {
        self.follow_control(&user.controls, relations::REVIEWS_OF_USER).await
    }

    /// Posts a review through the collection's `add-review` control.
    pub async fn add_review(
        &self,
        reviews: &Collection<Review>,
        draft: &ReviewDraft,
    ) -> PortResult<Option<Review>> {
        let Some(link) = reviews.control(relations::ADD_REVIEW) else {
            return Ok(None);
        };
        let review: Review = self.submit(link, draft).await?;
        info!("Added review {} for movie {}", review.id, review.movie_id);
        Ok(Some(review))
    }

    /// Updates a review through its `edit` control.
    pub async fn edit_review(&self, review: &Review, draft: &ReviewDraft) -> PortResult<Option<Review>> {
        let Some(link) = self.control_via_self(&review.controls, relations::EDIT).await? else {
            return Ok(None);
        };
        let body = to_body(draft)?;
        match self.resolver.fetch_resource(&link, Some(&body)).await? {
            Resolved::Json(value) => Resolved::Json(value).decode().map(Some),
            Resolved::Created { location } => self.get(&Link::get(location)).await.map(Some),
            Resolved::Empty => match review.control(relations::SELF) {
                Some(self_link) => self.get(self_link).await.map(Some),
                None => Err(ResolveError::malformed("edited review has no self link")),
            },
        }
    }

    /// Deletes a review through its `delete` control. Returns whether a
    /// delete control was available.
    pub async fn delete_review(&self, review: &Review) -> PortResult<bool> {
        let Some(link) = self.control_via_self(&review.controls, relations::DELETE).await? else {
            return Ok(false);
        };
        self.resolver.fetch_resource(&link, None).await?;
        info!("Deleted review {}", review.id);
        Ok(true)
    }

    // --- Plumbing ---

    async fn get<T: DeserializeOwned>(&self, link: &Link) -> PortResult<T> {
        self.resolver.fetch_resource(link, None).await?.decode()
    }

    async fn follow_endpoint<T: DeserializeOwned>(&self, endpoint: Endpoint) -> PortResult<Option<T>> {
        match self.store.endpoint(endpoint) {
            Some(link) => self.get(&link).await.map(Some),
            None => {
                debug!("{} is not available", endpoint);
                Ok(None)
            }
        }
    }

    async fn follow_control<T: DeserializeOwned>(
        &self,
        controls: &Controls,
        relation: &str,
    ) -> PortResult<Option<T>> {
        match self.control_via_self(controls, relation).await? {
            Some(link) => self.get(&link).await.map(Some),
            None => Ok(None),
        }
    }

    /// Looks for `relation` on the embedded controls, falling back to the
    /// resource's own `self` document (items in a collection carry fewer
    /// controls than the item itself).
    async fn control_via_self(&self, controls: &Controls, relation: &str) -> PortResult<Option<Link>> {
        if let Some(link) = find_control(controls, relation) {
            return Ok(Some(link.clone()));
        }
        let Some(self_link) = find_control(controls, relations::SELF) else {
            return Ok(None);
        };
        let document: HypermediaDocument = self.get(self_link).await?;
        Ok(document.control(relation).cloned())
    }

    async fn submit_to_endpoint<B, T>(&self, endpoint: Endpoint, draft: &B) -> PortResult<Option<T>>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        match self.store.endpoint(endpoint) {
            Some(link) => self.submit(&link, draft).await.map(Some),
            None => Ok(None),
        }
    }

    /// Sends a draft and returns the resulting resource, following the
    /// `Location` of a 201.
    async fn submit<B, T>(&self, link: &Link, draft: &B) -> PortResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let body = to_body(draft)?;
        match self.resolver.fetch_resource(link, Some(&body)).await? {
            Resolved::Created { location } => self.get(&Link::get(location)).await,
            Resolved::Json(value) => Resolved::Json(value).decode(),
            Resolved::Empty => Err(ResolveError::malformed(format!(
                "{} returned neither a body nor a Location",
                link.href
            ))),
        }
    }
}

fn to_body<B: Serialize>(draft: &B) -> PortResult<Value> {
    serde_json::to_value(draft).map_err(|e| ResolveError::malformed(e.to_string()))
}

/// Refuses a draft that lacks a field the link's write schema requires.
/// Links without a schema accept anything.
pub fn check_draft<B: Serialize>(link: &Link, draft: &B) -> Result<(), ClientError> {
    let Some(form) = link.form() else {
        return Ok(());
    };
    let body = serde_json::to_value(draft)?;
    let missing = form.missing_fields(&body);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ClientError::MissingFields(
            missing.into_iter().map(str::to_string).collect(),
        ))
    }
}
