use crate::{
    AttendResponse, AttendeesResponse, EventResponse, EventsResponse, GalleryClient, GalleryError,
};
use reqwest::Method;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    last_evaluated_key: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct EventsApi {
    client: GalleryClient,
}

impl EventsApi {
    pub(crate) fn new(client: GalleryClient) -> Self {
        Self { client }
    }

    /// One page of an organization's public events.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn list_public(
        &self,
        org: &str,
        last_evaluated_key: Option<&str>,
    ) -> Result<EventsResponse, GalleryError> {
        let q = PageQuery { last_evaluated_key };
        self.client
            .request_json(
                Method::GET,
                &["organizations", org, "events", "public"],
                Some(&q),
                None::<&()>,
            )
            .await
    }

    /// One page of all events of an organization, publicity included; requires
    /// a member token.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn list(
        &self,
        org: &str,
        last_evaluated_key: Option<&str>,
    ) -> Result<EventsResponse, GalleryError> {
        let q = PageQuery { last_evaluated_key };
        self.client
            .request_json(
                Method::GET,
                &["organizations", org, "events"],
                Some(&q),
                None::<&()>,
            )
            .await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn attendees(
        &self,
        org: &str,
        event_id: &str,
    ) -> Result<AttendeesResponse, GalleryError> {
        let path = ["organizations", org, "events", event_id, "attendees"];
        self.client
            .request_json(Method::GET, &path, None::<&()>, None::<&()>)
            .await
    }

    #[tracing::instrument(level = "info", skip(self))]
    pub async fn attend(&self, org: &str, event_id: &str) -> Result<AttendResponse, GalleryError> {
        let path = ["organizations", org, "events", event_id, "attendees"];
        self.client
            .request_json(Method::POST, &path, None::<&()>, None::<&()>)
            .await
    }

    #[tracing::instrument(level = "info", skip(self))]
    pub async fn toggle_publicity(
        &self,
        org: &str,
        event_id: &str,
    ) -> Result<EventResponse, GalleryError> {
        let path = ["organizations", org, "events", event_id, "publicity"];
        self.client
            .request_json(Method::PATCH, &path, None::<&()>, None::<&()>)
            .await
    }
}
