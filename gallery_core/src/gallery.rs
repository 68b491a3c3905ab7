//! Event page session: photos of one event plus the viewer's actions on it.

use crate::models::{Event, EventUser, Membership, Photo, Viewer};
use crate::search::search_filter;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;

pub const MISSING_IDS_MESSAGE: &str = "Org name or EventId is empty.";
pub const PHOTOS_FAILURE_MESSAGE: &str = "Failed to fetch photos.";
pub const ATTEND_FAILURE_MESSAGE: &str = "Could not attend the event.";
pub const PUBLICITY_FAILURE_MESSAGE: &str = "Failed to change event publicity";

/// Remote operations backing an event page.
#[async_trait]
pub trait EventGalleryBackend: Send + Sync {
    /// The event as listed among the organization's public events; `None`
    /// when it is not listed there.
    async fn event_details(&self, org: &str, event_id: &str) -> Result<Option<Event>>;

    async fn photos(&self, org: &str, event_id: &str) -> Result<Vec<Photo>>;

    /// The user's membership in `org`; `None` when not a member.
    async fn membership(&self, user_id: &str, org: &str) -> Result<Option<Membership>>;

    /// Publicity flag from the organization's member-only event listing.
    async fn event_publicity(&self, org: &str, event_id: &str) -> Result<Option<bool>>;

    /// User ids attending the event.
    async fn attendees(&self, org: &str, event_id: &str) -> Result<Vec<String>>;

    async fn attend(&self, org: &str, event_id: &str) -> Result<Option<EventUser>>;

    async fn toggle_publicity(&self, org: &str, event_id: &str) -> Result<()>;
}

/// What the current viewer may do on the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Affordances {
    pub can_upload: bool,
    pub can_attend: bool,
    pub can_toggle_publicity: bool,
    /// Read-only publicity indicator for signed-in viewers who cannot toggle it.
    pub publicity_badge: Option<bool>,
}

pub struct EventGallery {
    backend: Arc<dyn EventGalleryBackend>,
    org: String,
    event_id: String,
    viewer: Option<Viewer>,
    event: Option<Event>,
    photos: Vec<Photo>,
    membership: Option<Membership>,
    attendance: Option<EventUser>,
    publicity: Option<bool>,
    error: Option<String>,
}

impl EventGallery {
    pub fn new(
        backend: Arc<dyn EventGalleryBackend>,
        org: impl Into<String>,
        event_id: impl Into<String>,
        viewer: Option<Viewer>,
    ) -> Self {
        Self {
            backend,
            org: org.into(),
            event_id: event_id.into(),
            viewer,
            event: None,
            photos: Vec::new(),
            membership: None,
            attendance: None,
            publicity: None,
            error: None,
        }
    }

    fn ids_present(&self) -> bool {
        !self.org.trim().is_empty() && !self.event_id.trim().is_empty()
    }

    /// Loads everything the page shows, concurrently.
    ///
    /// Only missing identifiers fail the call; individual fetch failures leave
    /// their part of the page empty.
    #[tracing::instrument(level = "info", skip(self), fields(org = %self.org, event_id = %self.event_id))]
    pub async fn load(&mut self) -> Result<()> {
        if !self.ids_present() {
            self.error = Some(MISSING_IDS_MESSAGE.to_string());
            return Err(Error::InvalidInput(MISSING_IDS_MESSAGE.to_string()));
        }

        let backend = Arc::clone(&self.backend);
        let (org, event_id) = (self.org.as_str(), self.event_id.as_str());
        let viewer = self.viewer.as_ref();

        let (event, photos, membership, publicity, attendees) = tokio::join!(
            backend.event_details(org, event_id),
            backend.photos(org, event_id),
            async {
                match viewer {
                    Some(v) => backend.membership(&v.user_id, org).await,
                    None => Ok(None),
                }
            },
            backend.event_publicity(org, event_id),
            async {
                match viewer {
                    Some(_) => backend.attendees(org, event_id).await,
                    None => Ok(Vec::new()),
                }
            },
        );

        self.event = log_failure("event details", event).flatten();
        self.membership = log_failure("membership", membership).flatten();
        self.publicity = log_failure("event publicity", publicity).flatten();
        self.photos = match photos {
            Ok(photos) => photos,
            Err(err) => {
                tracing::error!(error = %err, "error fetching photos");
                self.error = Some(PHOTOS_FAILURE_MESSAGE.to_string());
                Vec::new()
            }
        };
        self.attendance = match (&self.viewer, log_failure("attendees", attendees)) {
            (Some(v), Some(ids)) if ids.iter().any(|id| id == &v.user_id) => Some(EventUser {
                user_id: Some(v.user_id.clone()),
                event_id: Some(self.event_id.clone()),
            }),
            _ => None,
        };

        tracing::info!(
            photos = self.photos.len(),
            is_admin = self.is_admin(),
            attending = self.attendance.is_some(),
            "event page loaded"
        );
        Ok(())
    }

    pub fn is_admin(&self) -> bool {
        self.viewer.is_some() && self.membership.as_ref().is_some_and(Membership::is_admin)
    }

    pub fn affordances(&self) -> Affordances {
        let signed_in = self.viewer.as_ref().is_some_and(|v| v.signed_in);
        let is_admin = self.is_admin();
        Affordances {
            can_upload: is_admin,
            can_attend: self.attendance.is_none() && self.membership.is_some(),
            can_toggle_publicity: signed_in && is_admin && self.publicity.is_some(),
            publicity_badge: if signed_in && !is_admin {
                self.publicity
            } else {
                None
            },
        }
    }

    /// Registers the viewer as an attendee.
    #[tracing::instrument(level = "info", skip(self), fields(org = %self.org, event_id = %self.event_id))]
    pub async fn attend(&mut self) -> Result<()> {
        if !self.ids_present() || self.viewer.is_none() {
            return Ok(());
        }
        match self.backend.attend(&self.org, &self.event_id).await {
            Ok(Some(record)) => {
                self.attendance = Some(record);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(err) => {
                tracing::error!(error = %err, "failed to attend event");
                self.error = Some(ATTEND_FAILURE_MESSAGE.to_string());
                Err(err)
            }
        }
    }

    /// Flips publicity immediately and reverts it if the server rejects the change.
    #[tracing::instrument(level = "info", skip(self), fields(org = %self.org, event_id = %self.event_id))]
    pub async fn toggle_publicity(&mut self) -> Result<()> {
        if !self.ids_present() {
            return Ok(());
        }
        let previous = self.publicity;
        self.publicity = Some(!previous.unwrap_or(false));
        if let Err(err) = self.backend.toggle_publicity(&self.org, &self.event_id).await {
            tracing::error!(error = %err, "error changing event publicity");
            self.publicity = previous;
            self.error = Some(PUBLICITY_FAILURE_MESSAGE.to_string());
            return Err(err);
        }
        Ok(())
    }

    /// Photos whose metadata title matches `term`.
    pub fn photos(&self, term: &str) -> Vec<Photo> {
        search_filter(term, &self.photos)
    }

    pub fn event(&self) -> Option<&Event> {
        self.event.as_ref()
    }

    pub fn publicity(&self) -> Option<bool> {
        self.publicity
    }

    pub fn attendance(&self) -> Option<&EventUser> {
        self.attendance.as_ref()
    }

    pub fn membership(&self) -> Option<&Membership> {
        self.membership.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Path of the upload page for this event.
    pub fn upload_path(&self) -> String {
        format!(
            "/organizations/{}/events/{}/photos/upload",
            self.org, self.event_id
        )
    }
}

fn log_failure<V>(what: &'static str, result: Result<V>) -> Option<V> {
    match result {
        Ok(v) => Some(v),
        Err(err) => {
            tracing::warn!(what, error = %err, "event page fetch failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberRole;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBackend {
        role: Option<MemberRole>,
        attendees: Vec<String>,
        publicity: Option<bool>,
        fail_photos: bool,
        fail_toggle: bool,
        fail_attend: bool,
        toggles: Mutex<u32>,
    }

    #[async_trait]
    impl EventGalleryBackend for FakeBackend {
        async fn event_details(&self, _org: &str, event_id: &str) -> Result<Option<Event>> {
            Ok(Some(Event::new(event_id, "Spring Fest")))
        }

        async fn photos(&self, _org: &str, _event_id: &str) -> Result<Vec<Photo>> {
            if self.fail_photos {
                return Err(Error::FetchMessage("500".to_string()));
            }
            Ok(vec![
                Photo::titled("p1", "Opening night"),
                Photo::titled("p2", "Closing speech"),
            ])
        }

        async fn membership(&self, user_id: &str, _org: &str) -> Result<Option<Membership>> {
            Ok(self.role.map(|role| Membership {
                user_id: Some(user_id.to_string()),
                organization_name: None,
                role,
            }))
        }

        async fn event_publicity(&self, _org: &str, _event_id: &str) -> Result<Option<bool>> {
            Ok(self.publicity)
        }

        async fn attendees(&self, _org: &str, _event_id: &str) -> Result<Vec<String>> {
            Ok(self.attendees.clone())
        }

        async fn attend(&self, _org: &str, event_id: &str) -> Result<Option<EventUser>> {
            if self.fail_attend {
                return Err(Error::FetchMessage("409".to_string()));
            }
            Ok(Some(EventUser {
                user_id: Some("u1".to_string()),
                event_id: Some(event_id.to_string()),
            }))
        }

        async fn toggle_publicity(&self, _org: &str, _event_id: &str) -> Result<()> {
            *self.toggles.lock().unwrap() += 1;
            if self.fail_toggle {
                return Err(Error::FetchMessage("403".to_string()));
            }
            Ok(())
        }
    }

    fn gallery(backend: FakeBackend, viewer: Option<Viewer>) -> EventGallery {
        EventGallery::new(Arc::new(backend), "acme", "e1", viewer)
    }

    #[tokio::test]
    async fn admin_can_upload_and_toggle() {
        let mut page = gallery(
            FakeBackend {
                role: Some(MemberRole::Admin),
                attendees: vec!["u1".to_string()],
                publicity: Some(false),
                ..Default::default()
            },
            Some(Viewer::signed_in("u1")),
        );
        page.load().await.expect("load");

        let a = page.affordances();
        assert!(a.can_upload);
        assert!(a.can_toggle_publicity);
        assert!(!a.can_attend, "already attending");
        assert_eq!(a.publicity_badge, None);
        assert_eq!(page.event().map(|e| e.title.as_str()), Some("Spring Fest"));
        assert_eq!(page.upload_path(), "/organizations/acme/events/e1/photos/upload");
    }

    #[tokio::test]
    async fn member_not_attending_can_attend() {
        let mut page = gallery(
            FakeBackend {
                role: Some(MemberRole::Member),
                publicity: Some(true),
                ..Default::default()
            },
            Some(Viewer::signed_in("u1")),
        );
        page.load().await.unwrap();

        let a = page.affordances();
        assert!(a.can_attend);
        assert!(!a.can_upload);
        assert!(!a.can_toggle_publicity);
        assert_eq!(a.publicity_badge, Some(true));

        page.attend().await.unwrap();
        assert!(page.attendance().is_some());
        assert!(!page.affordances().can_attend);
    }

    #[tokio::test]
    async fn anonymous_viewer_sees_photos_only() {
        let mut page = gallery(
            FakeBackend {
                role: Some(MemberRole::Admin),
                publicity: Some(true),
                ..Default::default()
            },
            None,
        );
        page.load().await.unwrap();

        assert_eq!(page.affordances(), Affordances::default());
        assert!(page.membership().is_none());
        assert_eq!(page.photos("").len(), 2);
        assert_eq!(page.photos("closing")[0].id, "p2");
    }

    #[tokio::test]
    async fn failed_toggle_reverts_optimistic_flip() {
        let mut page = gallery(
            FakeBackend {
                role: Some(MemberRole::Admin),
                publicity: Some(true),
                fail_toggle: true,
                ..Default::default()
            },
            Some(Viewer::signed_in("u1")),
        );
        page.load().await.unwrap();

        assert!(page.toggle_publicity().await.is_err());
        assert_eq!(page.publicity(), Some(true));
        assert_eq!(page.error(), Some(PUBLICITY_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn successful_toggle_flips_publicity() {
        let mut page = gallery(
            FakeBackend {
                role: Some(MemberRole::Admin),
                publicity: Some(true),
                ..Default::default()
            },
            Some(Viewer::signed_in("u1")),
        );
        page.load().await.unwrap();
        page.toggle_publicity().await.unwrap();
        assert_eq!(page.publicity(), Some(false));
        assert!(page.error().is_none());
    }

    #[tokio::test]
    async fn photo_and_attend_failures_set_messages() {
        let mut page = gallery(
            FakeBackend {
                role: Some(MemberRole::Member),
                fail_photos: true,
                fail_attend: true,
                ..Default::default()
            },
            Some(Viewer::signed_in("u1")),
        );
        page.load().await.unwrap();
        assert_eq!(page.error(), Some(PHOTOS_FAILURE_MESSAGE));
        assert!(page.photos("").is_empty());

        assert!(page.attend().await.is_err());
        assert_eq!(page.error(), Some(ATTEND_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn missing_ids_fail_fast() {
        let mut page = EventGallery::new(Arc::new(FakeBackend::default()), "acme", " ", None);
        assert!(matches!(page.load().await, Err(Error::InvalidInput(_))));
        assert_eq!(page.error(), Some(MISSING_IDS_MESSAGE));
    }
}
