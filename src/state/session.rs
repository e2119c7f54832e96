//! Login session state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::types::UserInfo;
use crate::api::FetchError;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
  /// Login or logout in flight
  Requested,
  LoginSucceeded { user: UserInfo, at: DateTime<Utc> },
  LoginFailed { error: FetchError, at: DateTime<Utc> },
  LogoutSucceeded { at: DateTime<Utc> },
  LogoutFailed { error: FetchError },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
  pub is_fetching: bool,
  pub user_info: Option<UserInfo>,
  pub last_updated: Option<DateTime<Utc>>,
  pub error: Option<FetchError>,
  /// Set once any login or session check has completed
  pub login_attempted: bool,
}

impl SessionState {
  pub fn is_authenticated(&self) -> bool {
    self.user_info.is_some()
  }

  pub fn apply(&mut self, event: SessionEvent) {
    match event {
      SessionEvent::Requested => {
        self.is_fetching = true;
      }
      SessionEvent::LoginSucceeded { user, at } => {
        self.is_fetching = false;
        self.user_info = Some(user);
        self.last_updated = Some(at);
        self.error = None;
        self.login_attempted = true;
      }
      SessionEvent::LoginFailed { error, at } => {
        // Only a rejected session drops the user; other failures keep it.
        if error.is_unauthorized() {
          self.user_info = None;
        }
        self.is_fetching = false;
        self.error = Some(error);
        self.last_updated = Some(at);
        self.login_attempted = true;
      }
      SessionEvent::LogoutSucceeded { at } => {
        self.is_fetching = false;
        self.user_info = None;
        self.last_updated = Some(at);
        self.error = None;
      }
      SessionEvent::LogoutFailed { error } => {
        self.is_fetching = false;
        self.error = Some(error);
      }
    }
  }
}
