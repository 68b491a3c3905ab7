use crate::{GalleryClient, GalleryError, MembershipResponse};
use reqwest::Method;

#[derive(Debug, Clone)]
pub struct MembersApi {
    client: GalleryClient,
}

impl MembersApi {
    pub(crate) fn new(client: GalleryClient) -> Self {
        Self { client }
    }

    /// The user's membership in `org`. Non-members get a 404.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get(&self, org: &str, user_id: &str) -> Result<MembershipResponse, GalleryError> {
        let path = ["organizations", org, "members", user_id];
        self.client
            .request_json(Method::GET, &path, None::<&()>, None::<&()>)
            .await
    }
}
