//! Push subscription bookkeeping.
//!
//! Obtaining a subscription from the platform is the caller's job; we only
//! track what was registered with the backend.

use serde::Serialize;
use serde_json::Value;

use crate::api::FetchError;

#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
  SubscribeRequested,
  SubscribeSucceeded(Value),
  SubscribeFailed(FetchError),
  UnsubscribeRequested,
  UnsubscribeSucceeded,
  UnsubscribeFailed(FetchError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushState {
  pub subscribing: bool,
  pub subscribe_error: Option<FetchError>,
  pub subscription: Option<Value>,
  pub unsubscribing: bool,
  pub unsubscribe_error: Option<FetchError>,
}

impl PushState {
  pub fn apply(&mut self, event: PushEvent) {
    match event {
      PushEvent::SubscribeRequested => self.subscribing = true,
      PushEvent::SubscribeSucceeded(subscription) => {
        self.subscribing = false;
        self.subscribe_error = None;
        self.subscription = Some(subscription);
      }
      PushEvent::SubscribeFailed(error) => {
        self.subscribing = false;
        self.subscribe_error = Some(error);
      }
      PushEvent::UnsubscribeRequested => self.unsubscribing = true,
      PushEvent::UnsubscribeSucceeded => {
        self.unsubscribing = false;
        self.unsubscribe_error = None;
        self.subscription = None;
      }
      PushEvent::UnsubscribeFailed(error) => {
        self.unsubscribing = false;
        self.unsubscribe_error = Some(error);
      }
    }
  }
}
