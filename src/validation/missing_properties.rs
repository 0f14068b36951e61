//! Required schema properties missing from resource instances.
//!
//! Component inputs are exempt: they form the component's public API and
//! may be supplied at deploy time.

use super::cross_file::CrossFile;
use super::{ValidationContext, ValidationPass};
use crate::hir::{Diagnostic, DiagnosticData, InstanceKind, OwnerKind, codes, locate};

pub struct MissingPropertiesPass;

impl ValidationPass for MissingPropertiesPass {
    fn name(&self) -> &'static str {
        "missing-properties"
    }

    fn check(&self, cx: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let Some(tree) = cx.document.tree() else {
            return Vec::new();
        };
        let mut diagnostics = Vec::new();
        let mut lookup = CrossFile::new(cx);
        for instance in locate::instances(tree) {
            if instance.kind != InstanceKind::Resource || instance.body.range.is_empty() {
                continue;
            }
            let schema = instance.type_name();
            let Some(properties) = lookup.members(OwnerKind::Schema, schema) else {
                tracing::trace!(schema, "schema not found; skipping instance");
                continue;
            };
            let assigned = instance.body.properties();
            for property in properties {
                if property.has_default || property.is_cloud {
                    continue;
                }
                if assigned.iter().any(|p| p.key.text == property.name) {
                    continue;
                }
                let instance_type = instance.ty.path_text();
                diagnostics.push(
                    Diagnostic::error(
                        instance.name.range,
                        format!(
                            "missing required property '{}' ({}) in resource '{}' of type '{}'",
                            property.name, property.type_name, instance.name.text, instance_type
                        ),
                    )
                    .with_code(codes::MISSING_PROPERTY)
                    .with_data(DiagnosticData::MissingProperty {
                        property_name: property.name.to_string(),
                        property_type: property.type_name.to_string(),
                        instance_type,
                        brace_offset: instance.body.range.start().into(),
                    }),
                );
            }
        }
        diagnostics
    }
}
