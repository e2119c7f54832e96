//! Which resources go stale when an entity is mutated.
//!
//! The mutated list itself is invalidated by its own store when the mutation
//! settles; this table only lists the other resources that depend on it.

use crate::resources::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
  CreateAccount,
  UpdateAccount,
  DeleteAccount,
  CreateTransaction,
  UpdateTransaction,
  DeleteTransaction,
  UploadReceipts,
}

impl Mutation {
  pub fn name(&self) -> &'static str {
    match self {
      Mutation::CreateAccount => "create account",
      Mutation::UpdateAccount => "update account",
      Mutation::DeleteAccount => "delete account",
      Mutation::CreateTransaction => "create transaction",
      Mutation::UpdateTransaction => "update transaction",
      Mutation::DeleteTransaction => "delete transaction",
      Mutation::UploadReceipts => "upload receipts",
    }
  }
}

/// Resources invalidated after `mutation` succeeds.
pub const fn invalidated_by(mutation: Mutation) -> &'static [ResourceKind] {
  match mutation {
    Mutation::CreateTransaction | Mutation::UpdateTransaction | Mutation::DeleteTransaction => {
      &[ResourceKind::Performance]
    }
    Mutation::DeleteAccount => &[ResourceKind::Performance, ResourceKind::Transactions],
    Mutation::CreateAccount | Mutation::UpdateAccount => &[],
    Mutation::UploadReceipts => &[ResourceKind::Transactions],
  }
}
