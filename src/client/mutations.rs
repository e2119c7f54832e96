//! Create/update/delete flows for accounts and transactions, and receipt upload.

use color_eyre::Result;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::Client;
use crate::api::types::{Account, NewAccount, NewTransaction, ReceiptFile, Transaction};
use crate::api::{ApiRequest, FetchError, Method, Transport};
use crate::cache::{Clock, ModifyEvent};
use crate::invalidation::{invalidated_by, Mutation};
use crate::state::{EntityKind, ReceiptsEvent};

fn to_body(value: &impl Serialize) -> Result<Value, FetchError> {
  serde_json::to_value(value).map_err(|e| FetchError::Decode(e.to_string()))
}

impl<T: Transport, C: Clock> Client<T, C> {
  pub async fn create_account(&self, account: &NewAccount) -> Result<()> {
    let request = to_body(account).map(|body| ApiRequest::post("/api/accounts", body));
    self
      .modify(EntityKind::Account, Mutation::CreateAccount, request)
      .await
  }

  pub async fn update_account(&self, account: &Account) -> Result<()> {
    let request = to_body(account)
      .map(|body| ApiRequest::put(format!("/api/accounts/{}", account.id), body));
    self
      .modify(EntityKind::Account, Mutation::UpdateAccount, request)
      .await
  }

  pub async fn delete_account(&self, id: i32) -> Result<()> {
    let request = Ok(ApiRequest::delete(format!("/api/accounts/{}", id)));
    self
      .modify(EntityKind::Account, Mutation::DeleteAccount, request)
      .await
  }

  pub async fn create_transaction(&self, transaction: &NewTransaction) -> Result<()> {
    let request = to_body(transaction).map(|body| ApiRequest::post("/api/transactions", body));
    self
      .modify(EntityKind::Transaction, Mutation::CreateTransaction, request)
      .await
  }

  pub async fn update_transaction(&self, transaction: &Transaction) -> Result<()> {
    let request = to_body(transaction)
      .map(|body| ApiRequest::put(format!("/api/transactions/{}", transaction.id), body));
    self
      .modify(EntityKind::Transaction, Mutation::UpdateTransaction, request)
      .await
  }

  pub async fn delete_transaction(&self, id: i32) -> Result<()> {
    let request = Ok(ApiRequest::delete(format!("/api/transactions/{}", id)));
    self
      .modify(EntityKind::Transaction, Mutation::DeleteTransaction, request)
      .await
  }

  /// Run one mutation against an entity store and propagate invalidation.
  ///
  /// Creation responses are parsed (and may carry an in-band error); for
  /// updates and deletes only the status matters.
  async fn modify(
    &self,
    entity: EntityKind,
    mutation: Mutation,
    request: Result<ApiRequest, FetchError>,
  ) -> Result<()> {
    info!(mutation = mutation.name(), "Submitting");
    self
      .store
      .dispatch(|state| state.apply_modify(entity, ModifyEvent::Requested))?;

    let outcome = match request {
      Ok(request) if request.method == Method::Post => self
        .transport
        .send(request)
        .await
        .and_then(|response| response.json::<Value>())
        .map(|_| ()),
      Ok(request) => self.send_status(request).await,
      Err(error) => Err(error),
    };

    match outcome {
      Ok(()) => {
        let invalidated = invalidated_by(mutation);
        info!(mutation = mutation.name(), invalidated = ?invalidated, "Mutation succeeded");
        self.store.dispatch(|state| {
          state.apply_modify(entity, ModifyEvent::Succeeded);
          for kind in invalidated {
            state.invalidate(*kind);
          }
        })
      }
      Err(error) => {
        warn!(mutation = mutation.name(), error = %error, "Mutation failed");
        self
          .store
          .dispatch(|state| state.apply_modify(entity, ModifyEvent::Failed(error)))
      }
    }
  }

  /// Upload receipt files; the backend turns them into transactions.
  pub async fn upload_receipts(&self, files: &[ReceiptFile]) -> Result<()> {
    info!(files = files.len(), "Uploading receipts");
    self
      .store
      .dispatch(|state| state.receipts.apply(ReceiptsEvent::UploadRequested))?;

    let encoded: Vec<_> = files.iter().map(ReceiptFile::encode).collect();
    let result = match to_body(&encoded) {
      Ok(body) => self
        .transport
        .send(ApiRequest::post("/api/receipts", body))
        .await
        .and_then(|response| response.json::<Vec<Transaction>>()),
      Err(error) => Err(error),
    };

    let at = self.clock.now();
    match result {
      Ok(created) => {
        info!(created = created.len(), "Receipts imported");
        self.store.dispatch(|state| {
          state
            .receipts
            .apply(ReceiptsEvent::UploadSucceeded { created, at });
          for kind in invalidated_by(Mutation::UploadReceipts) {
            state.invalidate(*kind);
          }
        })
      }
      Err(error) => {
        warn!(error = %error, "Receipt upload failed");
        self
          .store
          .dispatch(|state| state.receipts.apply(ReceiptsEvent::UploadFailed { error, at }))
      }
    }
  }
}
