//! Attribute schema, storage, and the change policy.
//!
//! Attributes are named numeric stats with a base value and a current value.
//! The schema is fixed at compile time: no runtime reflection, no string
//! lookups on hot paths. Every write lands through the change policy so the
//! ratio-preserving max rescale and the MoveSpeed clamp apply uniformly no
//! matter which subsystem initiated the write.

mod kind;
mod policy;
mod store;

pub use kind::AttributeKind;
pub use policy::{ChangePolicy, Proposal, Rescale};
pub use store::{Attribute, AttributeStore};
