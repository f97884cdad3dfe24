//! Classifies field-write targets against the tracked-type registry.

use crate::model::ast::{Expr, ExprKind};
use crate::model::{TypeId, TypeResolver};

use super::registry::TrackedTypes;

/// A tracked type reached by a write or construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedMatch {
    /// Simple type name, used in messages.
    pub simple_name: String,
    /// Fully-qualified name as configured.
    pub qualified_name: String,
}

/// One step of a field-access chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainLink {
    /// Type owning the field (indirection stripped).
    pub owner: TypeId,
    /// Field position within the owner.
    pub index: usize,
    /// Declared type of the field.
    pub field_ty: TypeId,
}

/// Walks a selection's index path from its receiver type.
///
/// Returns `None` if the receiver is untyped, no path was recorded, or a
/// step does not land on a struct field.
#[must_use]
pub fn field_chain(
    receiver: TypeId,
    path: &[usize],
    types: &dyn TypeResolver,
) -> Option<Vec<ChainLink>> {
    let mut chain = Vec::with_capacity(path.len());
    let mut current = receiver;
    for &index in path {
        let owner = types.dereference(current);
        let field = types.field_at(owner, index)?;
        chain.push(ChainLink {
            owner,
            index,
            field_ty: field.ty,
        });
        current = field.ty;
    }
    Some(chain)
}

/// Resolves selector targets and literal types to tracked types.
#[derive(Debug, Clone, Copy)]
pub struct SelectorResolver<'r> {
    registry: &'r TrackedTypes,
}

impl<'r> SelectorResolver<'r> {
    /// Creates a resolver over `registry`.
    #[must_use]
    pub fn new(registry: &'r TrackedTypes) -> Self {
        Self { registry }
    }

    /// Matches a type, after stripping one pointer level, against the registry.
    #[must_use]
    pub fn match_type(&self, ty: TypeId, types: &dyn TypeResolver) -> Option<TrackedMatch> {
        let named = types.underlying(ty)?;
        let qualified_name = named.qualified_name();
        self.registry
            .is_tracked(&qualified_name)
            .then(|| TrackedMatch {
                simple_name: named.name.clone(),
                qualified_name,
            })
    }

    /// Classifies an assignment target.
    ///
    /// Only selector expressions (`x.f`, `a[i].f`, `(*p).f`) can match.
    /// When the selection is promoted through embedded fields, the first
    /// embedded field whose type is tracked wins. Otherwise the receiver's own
    /// type decides.
    #[must_use]
    pub fn resolve_target(&self, target: &Expr, types: &dyn TypeResolver) -> Option<TrackedMatch> {
        let ExprKind::Selector { operand, .. } = &target.unparen().kind else {
            return None;
        };
        let receiver = types.type_of(operand.id)?;

        if let Some(path) = types.selection(target.unparen().id) {
            if let Some(found) = self.match_embedded(receiver, path, types) {
                return Some(found);
            }
        }

        self.match_type(receiver, types)
    }

    fn match_embedded(
        &self,
        receiver: TypeId,
        path: &[usize],
        types: &dyn TypeResolver,
    ) -> Option<TrackedMatch> {
        let (_, embedded) = path.split_last()?;
        if embedded.is_empty() {
            return None;
        }
        let chain = field_chain(receiver, embedded, types)?;
        chain
            .iter()
            .find_map(|link| self.match_type(link.field_ty, types))
    }
}
