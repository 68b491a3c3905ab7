mod events;
mod members;
mod organizations;
mod photos;

pub use events::EventsApi;
pub use members::MembersApi;
pub use organizations::OrganizationsApi;
pub use photos::PhotosApi;
