//! Login session and push subscription flows.

use color_eyre::Result;
use serde_json::Value;
use tracing::{info, warn};

use super::Client;
use crate::api::types::{LoginData, UserInfo};
use crate::api::{ApiRequest, FetchError, Transport};
use crate::cache::Clock;
use crate::state::{PushEvent, SessionEvent};

impl<T: Transport, C: Clock> Client<T, C> {
  pub async fn login(&self, user_name: &str, password: &str) -> Result<()> {
    self
      .store
      .dispatch(|state| state.session.apply(SessionEvent::Requested))?;

    let body = serde_json::to_value(LoginData {
      user_name,
      password,
    })
    .map_err(|e| FetchError::Decode(e.to_string()));
    let result = match body {
      Ok(body) => self
        .transport
        .send(ApiRequest::post("/api/user/login", body))
        .await
        .and_then(|response| response.json::<UserInfo>()),
      Err(error) => Err(error),
    };

    self.settle_login(result)
  }

  /// Ask the backend whether the session cookie is still valid.
  pub async fn check_login(&self) -> Result<()> {
    let result = self
      .transport
      .send(ApiRequest::get("/api/user"))
      .await
      .and_then(|response| response.json::<UserInfo>());

    self.settle_login(result)
  }

  fn settle_login(&self, result: Result<UserInfo, FetchError>) -> Result<()> {
    let at = self.clock.now();
    let event = match result {
      Ok(user) => {
        info!(user = %user.name, "Logged in");
        SessionEvent::LoginSucceeded { user, at }
      }
      Err(error) => {
        warn!(error = %error, "Login failed");
        SessionEvent::LoginFailed { error, at }
      }
    };
    self.store.dispatch(|state| state.session.apply(event))
  }

  pub async fn logout(&self) -> Result<()> {
    self
      .store
      .dispatch(|state| state.session.apply(SessionEvent::Requested))?;

    let event = match self.send_status(ApiRequest::get("/api/user/logout")).await {
      Ok(()) => {
        info!("Logged out");
        SessionEvent::LogoutSucceeded {
          at: self.clock.now(),
        }
      }
      Err(error) => {
        warn!(error = %error, "Logout failed");
        SessionEvent::LogoutFailed { error }
      }
    };
    self.store.dispatch(|state| state.session.apply(event))
  }

  /// Register a push subscription obtained from the platform with the backend.
  pub async fn subscribe(&self, subscription: Value) -> Result<()> {
    let precondition = self.store.read(|state| match &state.session.user_info {
      None => Some("cannot subscribe to push: not logged in"),
      Some(user) if user.application_server_key.is_empty() => {
        Some("cannot subscribe to push: no server key")
      }
      Some(_) => None,
    })?;

    if let Some(message) = precondition {
      warn!(reason = message, "Push subscription refused");
      return self.store.dispatch(|state| {
        state
          .push
          .apply(PushEvent::SubscribeFailed(FetchError::precondition(message)))
      });
    }

    self
      .store
      .dispatch(|state| state.push.apply(PushEvent::SubscribeRequested))?;

    let event = match self
      .send_status(ApiRequest::post("/api/push/subscribe", subscription.clone()))
      .await
    {
      Ok(()) => PushEvent::SubscribeSucceeded(subscription),
      Err(error) => PushEvent::SubscribeFailed(error),
    };
    self.store.dispatch(|state| state.push.apply(event))
  }

  pub async fn unsubscribe(&self) -> Result<()> {
    let subscription = self.store.read(|state| {
      if !state.is_authenticated() {
        return Err("cannot unsubscribe from push: not logged in");
      }
      state
        .push
        .subscription
        .clone()
        .ok_or("cannot unsubscribe from push: not subscribed")
    })?;

    let subscription = match subscription {
      Ok(subscription) => subscription,
      Err(message) => {
        warn!(reason = message, "Push unsubscription refused");
        return self.store.dispatch(|state| {
          state
            .push
            .apply(PushEvent::UnsubscribeFailed(FetchError::precondition(message)))
        });
      }
    };

    self
      .store
      .dispatch(|state| state.push.apply(PushEvent::UnsubscribeRequested))?;

    let event = match self
      .send_status(ApiRequest::post("/api/push/unsubscribe", subscription))
      .await
    {
      Ok(()) => PushEvent::UnsubscribeSucceeded,
      Err(error) => PushEvent::UnsubscribeFailed(error),
    };
    self.store.dispatch(|state| state.push.apply(event))
  }
}
