use gallery_core::{Event, EventUser, Membership, Organization, Page, Photo};
use serde::{Deserialize, Serialize};

/// `{ data: { ... }, lastEvaluatedKey }` envelope used by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<D> {
    pub data: D,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_evaluated_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationsData {
    #[serde(default)]
    pub organizations: Vec<Organization>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventsData {
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventData {
    #[serde(default)]
    pub event: Option<Event>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhotosData {
    #[serde(default)]
    pub photos: Vec<Photo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendeesData {
    #[serde(default)]
    pub attendees: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendData {
    #[serde(default)]
    pub user_event: Option<EventUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipData {
    #[serde(default)]
    pub membership: Option<Membership>,
}

pub type OrganizationsResponse = Envelope<OrganizationsData>;
pub type EventsResponse = Envelope<EventsData>;
pub type EventResponse = Envelope<EventData>;
pub type PhotosResponse = Envelope<PhotosData>;
pub type AttendeesResponse = Envelope<AttendeesData>;
pub type AttendResponse = Envelope<AttendData>;
pub type MembershipResponse = Envelope<MembershipData>;

impl From<OrganizationsResponse> for Page<Organization> {
    fn from(r: OrganizationsResponse) -> Self {
        Page::new(r.data.organizations, r.last_evaluated_key)
    }
}

impl From<EventsResponse> for Page<Event> {
    fn from(r: EventsResponse) -> Self {
        Page::new(r.data.events, r.last_evaluated_key)
    }
}
