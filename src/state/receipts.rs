//! Receipt upload state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::types::Transaction;
use crate::api::FetchError;

#[derive(Debug, Clone, PartialEq)]
pub enum ReceiptsEvent {
  UploadRequested,
  UploadSucceeded {
    created: Vec<Transaction>,
    at: DateTime<Utc>,
  },
  UploadFailed {
    error: FetchError,
    at: DateTime<Utc>,
  },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptsState {
  pub is_uploading: bool,
  /// Transactions created by the last successful upload
  pub data: Option<Vec<Transaction>>,
  pub upload_error: Option<FetchError>,
  pub last_upload: Option<DateTime<Utc>>,
}

impl ReceiptsState {
  pub fn apply(&mut self, event: ReceiptsEvent) {
    match event {
      ReceiptsEvent::UploadRequested => {
        self.is_uploading = true;
      }
      ReceiptsEvent::UploadSucceeded { created, at } => {
        self.is_uploading = false;
        self.data = Some(created);
        self.upload_error = None;
        self.last_upload = Some(at);
      }
      ReceiptsEvent::UploadFailed { error, at } => {
        // A failed upload created nothing, so there is nothing to show.
        self.is_uploading = false;
        self.data = None;
        self.upload_error = Some(error);
        self.last_upload = Some(at);
      }
    }
  }
}
