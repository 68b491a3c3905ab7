use crate::{GalleryClient, GalleryError, OrganizationsResponse};
use reqwest::Method;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct OrganizationsApi {
    client: GalleryClient,
}

impl OrganizationsApi {
    pub(crate) fn new(client: GalleryClient) -> Self {
        Self { client }
    }

    /// One page of publicly listed organizations.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn list(
        &self,
        last_evaluated_key: Option<&str>,
    ) -> Result<OrganizationsResponse, GalleryError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Query<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            last_evaluated_key: Option<&'a str>,
        }
        let q = Query { last_evaluated_key };
        self.client
            .request_json(Method::GET, &["organizations"], Some(&q), None::<&()>)
            .await
    }
}
