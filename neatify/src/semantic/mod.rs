//! Usage analysis over a parsed file.
//!
//! - [`UsageIndex`]: name-based reference counts from one traversal.
//! - [`ScopeTree`]: lexical scopes and bindings resolved by identity.
//! - [`DeclarationSummary`]: declared variable and function names.

mod declarations;
mod scope;
mod usage;

pub use declarations::{summarize_declarations, DeclarationSummary};
pub(crate) use scope::import_local_name;
pub use scope::{
    Binding, BindingId, BindingKind, DeclarationSite, OccurrenceForm, Reference, Scope, ScopeId,
    ScopeKind, ScopeTree,
};
pub use usage::{build_usage_index, IdentifierOccurrence, Role, UsageIndex};
