//! Adapters plugging the HTTP client into the core paginator, feed and event page.

use crate::error::GalleryErrorKind;
use crate::GalleryClient;
use async_trait::async_trait;
use gallery_core::{
    ChildFetcher, Event, EventGalleryBackend, EventUser, Membership, Organization, Page,
    ParentFetcher, Photo, Result, Source,
};

/// Pages of publicly listed organizations.
#[derive(Debug, Clone)]
pub struct OrganizationPages {
    client: GalleryClient,
}

impl OrganizationPages {
    pub fn new(client: GalleryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ParentFetcher<Organization> for OrganizationPages {
    async fn fetch_parents_page(&self, cursor: Option<&str>) -> Result<Page<Organization>> {
        let resp = self
            .client
            .organizations()
            .list(cursor)
            .await
            .map_err(|e| e.into_core("fetch organizations"))?;
        Ok(resp.into())
    }
}

/// Pages of one organization's events, keyed by the organization name.
#[derive(Debug, Clone)]
pub struct EventPages {
    client: GalleryClient,
    include_private: bool,
}

impl EventPages {
    pub fn new(client: GalleryClient) -> Self {
        Self {
            client,
            include_private: false,
        }
    }

    /// Lists all events instead of public ones; the client must carry a member token.
    pub fn including_private(mut self) -> Self {
        self.include_private = true;
        self
    }
}

#[async_trait]
impl ChildFetcher<Organization, Event> for EventPages {
    async fn fetch_children_page(
        &self,
        source: &Organization,
        cursor: Option<&str>,
    ) -> Result<Page<Event>> {
        let api = self.client.events();
        let resp = if self.include_private {
            api.list(source.key(), cursor).await
        } else {
            api.list_public(source.key(), cursor).await
        };
        let resp = resp.map_err(|e| e.into_core(format!("fetch events of {}", source.key())))?;
        Ok(resp.into())
    }
}

/// Event page backend over the REST API.
#[derive(Debug, Clone)]
pub struct HttpEventGallery {
    client: GalleryClient,
}

impl HttpEventGallery {
    pub fn new(client: GalleryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EventGalleryBackend for HttpEventGallery {
    async fn event_details(&self, org: &str, event_id: &str) -> Result<Option<Event>> {
        let resp = self
            .client
            .events()
            .list_public(org, None)
            .await
            .map_err(|e| e.into_core("fetch event details"))?;
        Ok(find_event(resp.data.events, event_id))
    }

    async fn photos(&self, org: &str, event_id: &str) -> Result<Vec<Photo>> {
        let resp = self
            .client
            .photos()
            .list(org, event_id)
            .await
            .map_err(|e| e.into_core("fetch photos"))?;
        Ok(resp.data.photos)
    }

    async fn membership(&self, user_id: &str, org: &str) -> Result<Option<Membership>> {
        match self.client.members().get(org, user_id).await {
            Ok(resp) => Ok(resp.data.membership),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into_core("fetch membership")),
        }
    }

    async fn event_publicity(&self, org: &str, event_id: &str) -> Result<Option<bool>> {
        if !self.client.has_token() {
            return Ok(None);
        }
        match self.client.events().list(org, None).await {
            Ok(resp) => Ok(find_event(resp.data.events, event_id).and_then(|e| e.is_public)),
            Err(e) if matches!(e.kind, GalleryErrorKind::NotFound | GalleryErrorKind::Auth) => {
                Ok(None)
            }
            Err(e) => Err(e.into_core("fetch event publicity")),
        }
    }

    async fn attendees(&self, org: &str, event_id: &str) -> Result<Vec<String>> {
        let resp = self
            .client
            .events()
            .attendees(org, event_id)
            .await
            .map_err(|e| e.into_core("fetch attendees"))?;
        Ok(resp.data.attendees)
    }

    async fn attend(&self, org: &str, event_id: &str) -> Result<Option<EventUser>> {
        let resp = self
            .client
            .events()
            .attend(org, event_id)
            .await
            .map_err(|e| e.into_core("attend event"))?;
        Ok(resp.data.user_event)
    }

    async fn toggle_publicity(&self, org: &str, event_id: &str) -> Result<()> {
        self.client
            .events()
            .toggle_publicity(org, event_id)
            .await
            .map_err(|e| e.into_core("toggle event publicity"))?;
        Ok(())
    }
}

/// Events are looked up in the organization's first listing page.
fn find_event(events: Vec<Event>, event_id: &str) -> Option<Event> {
    let found = events.into_iter().find(|e| e.id == event_id);
    if found.is_none() {
        tracing::warn!(event_id, "event not found in organization listing");
    }
    found
}
