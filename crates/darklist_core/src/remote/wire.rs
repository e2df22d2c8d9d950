//! GraphQL wire format for the three API operations.
//!
//! # Responsibility
//! - Carry the operation documents exactly as the backend schema defines
//!   them.
//! - Encode request envelopes and decode response envelopes.
//!
//! # Invariants
//! - The create mutation sends the client-generated id as the `id` variable;
//!   the server echoes it back in the payload.
//! - Decoded records become `Confirmed` entries; field-invalid records never
//!   leave this module as entries.

use crate::model::entry::{Entry, EntryId, EntryValidationError};
use crate::remote::{RemoteError, RemoteResult};
use serde::{Deserialize, Serialize};

pub const CREATE_APP_MUTATION: &str = "mutation createApp($id: ID!, $name: String!, $link: String!) {
  createApp(input: { id: $id, name: $name, link: $link }) {
    id
    name
    link
  }
}";

pub const LIST_APPS_QUERY: &str = "query listApps {
  listApps {
    items {
      id
      name
      link
    }
  }
}";

pub const ON_CREATE_APP_SUBSCRIPTION: &str = "subscription onCreateApp {
  onCreateApp {
    id
    name
    link
  }
}";

/// POST body: operation document plus optional variables.
#[derive(Debug, Serialize)]
pub struct GraphqlRequest<'a, V: Serialize> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<V>,
}

/// Variables of the create mutation; flat, the document nests them into the
/// `input` argument.
#[derive(Debug, Serialize)]
pub struct CreateAppVariables<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub link: &'a str,
}

/// Response envelope: `data` on success, `errors` on failure, possibly both.
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

impl<T> GraphqlResponse<T> {
    /// Unwraps the envelope; any reported error outranks partial data.
    pub fn into_data(self) -> RemoteResult<T> {
        if let Some(error) = self.errors.into_iter().next() {
            return Err(RemoteError::Graphql(error.message));
        }
        self.data.ok_or_else(|| {
            RemoteError::Wire("response carried neither data nor errors".to_string())
        })
    }
}

/// `{ id name link }` selection shared by all three operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub id: String,
    pub name: String,
    pub link: String,
}

impl EntryRecord {
    /// Decodes the record into a confirmed entry, rejecting empty fields.
    pub fn into_entry(self) -> Result<Entry, EntryValidationError> {
        Entry::with_id(EntryId::confirmed(self.id), self.name, self.link)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateAppData {
    #[serde(rename = "createApp")]
    pub create_app: Option<EntryRecord>,
}

#[derive(Debug, Deserialize)]
pub struct ListAppsData {
    #[serde(rename = "listApps")]
    pub list_apps: Option<EntryPage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EntryPage {
    #[serde(default)]
    pub items: Vec<EntryRecord>,
}

#[derive(Debug, Deserialize)]
pub struct OnCreateAppData {
    #[serde(rename = "onCreateApp")]
    pub on_create_app: EntryRecord,
}
