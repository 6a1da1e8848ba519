// SPDX-License-Identifier: MIT OR Apache-2.0

//! Building blocks shared by access filters and the stores executing them: the storage object id
//! type and a boolean predicate tree which can be lowered into a query language or evaluated in
//! memory.
mod eval;
pub mod id;
mod mongo;
pub mod predicate;
mod serde;

pub use id::{OBJECT_ID_LEN, ObjectId, ObjectIdError};
pub use predicate::{Predicate, Value};
