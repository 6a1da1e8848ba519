// SPDX-License-Identifier: MIT OR Apache-2.0

/// Read access to the entity schema registry.
///
/// Only reference fields are of interest: a `byReference` key filter rule contributes to a
/// resource type's filter only if that type declares the rule's field as a reference to the
/// rule's scope.
pub trait SchemaRegistry {
    /// Target resource type of a reference field, `None` if the resource type is unknown, the
    /// field is unknown or the field is not a reference.
    fn reference_target(&self, resource_type: &str, field_key: &str) -> Option<&str>;
}

impl<T> SchemaRegistry for &T
where
    T: SchemaRegistry + ?Sized,
{
    fn reference_target(&self, resource_type: &str, field_key: &str) -> Option<&str> {
        (**self).reference_target(resource_type, field_key)
    }
}
