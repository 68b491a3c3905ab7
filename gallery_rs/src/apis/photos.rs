use crate::{GalleryClient, GalleryError, PhotosResponse};
use reqwest::Method;

#[derive(Debug, Clone)]
pub struct PhotosApi {
    client: GalleryClient,
}

impl PhotosApi {
    pub(crate) fn new(client: GalleryClient) -> Self {
        Self { client }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn list(&self, org: &str, event_id: &str) -> Result<PhotosResponse, GalleryError> {
        let path = ["organizations", org, "events", event_id, "photos"];
        self.client
            .request_json(Method::GET, &path, None::<&()>, None::<&()>)
            .await
    }
}
