//! Detection engine: tracked-type registry, constructor policy, scope index,
//! selector resolution and the rule driver.

pub mod policy;
pub mod registry;
pub mod rule;
pub mod scope;
pub mod selector;

pub use policy::{ConstructorClassifier, NamePolicy};
pub use registry::TrackedTypes;
pub use rule::StructWrite;
pub use scope::{Enclosing, ScopeIndex};
pub use selector::{SelectorResolver, TrackedMatch};
