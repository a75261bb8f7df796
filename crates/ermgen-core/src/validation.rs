use std::collections::BTreeSet;

use jsonschema::JSONSchema;
use schemars::schema_for;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{Class, EntityModel};

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Error,
    Warning,
}

/// Structured validation issue with location and hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub code: String,
    pub path: String,
    pub message: String,
    pub hint: Option<String>,
}

impl ValidationIssue {
    pub fn new(
        severity: IssueSeverity,
        code: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
        hint: Option<String>,
    ) -> Self {
        Self {
            severity,
            code: code.into(),
            path: path.into(),
            message: message.into(),
            hint,
        }
    }
}

/// Aggregated validation report with errors and warnings.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Returns true when there are no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, issue: ValidationIssue) {
        match issue.severity {
            IssueSeverity::Error => self.errors.push(issue),
            IssueSeverity::Warning => self.warnings.push(issue),
        }
    }

    fn error(&mut self, code: &str, path: String, message: String, hint: Option<&str>) {
        self.push(ValidationIssue::new(
            IssueSeverity::Error,
            code,
            path,
            message,
            hint.map(str::to_string),
        ));
    }

    fn warning(&mut self, code: &str, path: String, message: String, hint: Option<&str>) {
        self.push(ValidationIssue::new(
            IssueSeverity::Warning,
            code,
            path,
            message,
            hint.map(str::to_string),
        ));
    }
}

/// JSON Schema describing the entity model file format.
pub fn model_json_schema() -> Value {
    serde_json::to_value(schema_for!(EntityModel)).unwrap_or(Value::Null)
}

/// Validate a model JSON document against the model JSON Schema.
pub fn validate_model_json(model_json: &Value) -> Result<ValidationReport> {
    let schema = model_json_schema();
    let compiled =
        JSONSchema::compile(&schema).map_err(|err| Error::InvalidModel(err.to_string()))?;

    let mut report = ValidationReport::default();
    if let Err(errors) = compiled.validate(model_json) {
        for error in errors {
            let path = error.instance_path.to_string();
            report.error(
                "schema_violation",
                if path.is_empty() { "/".to_string() } else { path },
                error.to_string(),
                None,
            );
        }
    }

    Ok(report)
}

/// Check a parsed model for problems the generator would reject or that
/// leave the output incomplete.
///
/// This checks:
/// - empty and duplicate class/attribute names
/// - associations to unknown classes or to classes without a key
/// - transient identity attributes
/// - classes without identity attributes (warning)
/// - associations into classes with a composite key (warning)
pub fn validate_model(model: &EntityModel) -> ValidationReport {
    let mut report = ValidationReport::default();
    let index = model.index();
    let mut class_names = BTreeSet::new();

    for (class_idx, class) in model.classes.iter().enumerate() {
        let class_path = format!("/classes/{class_idx}");

        if class.name.trim().is_empty() {
            report.error("empty_class_name", class_path.clone(), "class name is empty".to_string(), None);
        } else if !class_names.insert(class.name.as_str()) {
            report.error(
                "duplicate_class",
                format!("{class_path}/name"),
                format!("duplicate class name: {}", class.name),
                Some("rename one of the classes"),
            );
        }

        validate_attributes(class, &class_path, model, &mut report);

        if index.is_persistent(class) && class.identity_attributes().next().is_none() {
            report.warning(
                "missing_identity",
                class_path.clone(),
                format!("class '{}' has no identity attribute and gets no primary key", class.name),
                Some("flag at least one attribute as identity"),
            );
        }
    }

    report
}

fn validate_attributes(
    class: &Class,
    class_path: &str,
    model: &EntityModel,
    report: &mut ValidationReport,
) {
    let index = model.index();
    let mut attribute_names = BTreeSet::new();

    for (attr_idx, attribute) in class.attributes.iter().enumerate() {
        let path = format!("{class_path}/attributes/{attr_idx}");

        if attribute.name.trim().is_empty() {
            report.error("empty_attribute_name", path.clone(), "attribute name is empty".to_string(), None);
        } else if !attribute_names.insert(attribute.name.as_str()) {
            report.error(
                "duplicate_attribute",
                format!("{path}/name"),
                format!("duplicate attribute name: {}.{}", class.name, attribute.name),
                None,
            );
        }

        if attribute.identity && attribute.transient {
            report.error(
                "transient_identity",
                path.clone(),
                format!("identity attribute {}.{} cannot be transient", class.name, attribute.name),
                None,
            );
        }

        if attribute.transient {
            continue;
        }

        let Some(target) = index.association_target(attribute) else {
            continue;
        };

        match index.class(target) {
            None => report.error(
                "unknown_association_target",
                format!("{path}/association"),
                format!("{}.{} references unknown class '{target}'", class.name, attribute.name),
                Some("add the class to the model or fix the association target"),
            ),
            Some(target_class) if target_class.identity_attributes().next().is_none() => report
                .error(
                    "keyless_association_target",
                    path.clone(),
                    format!(
                        "{}.{} references '{target}', which has no identity attribute",
                        class.name, attribute.name
                    ),
                    Some("flag an identity attribute on the target class"),
                ),
            Some(target_class) if target_class.identity_attributes().nth(1).is_some() => report
                .warning(
                    "composite_key_reference",
                    path.clone(),
                    format!(
                        "{}.{} references '{target}', whose composite key is referenced through its first column only",
                        class.name, attribute.name
                    ),
                    Some("databases that require a unique referenced column will reject this foreign key"),
                ),
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::Attribute;

    #[test]
    fn valid_model_has_no_issues() {
        let model = EntityModel::new(vec![
            Class::new("Order").with_attribute(Attribute::new("id", "int64").identity()),
            Class::new("OrderLine")
                .with_attribute(Attribute::new("id", "int64").identity())
                .with_attribute(Attribute::new("order", "Order")),
        ]);
        let report = validate_model(&model);

        assert!(report.is_ok());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn keyless_class_is_a_warning() {
        let model = EntityModel::new(vec![
            Class::new("Setting").with_attribute(Attribute::new("value", "string")),
        ]);
        let report = validate_model(&model);

        assert!(report.is_ok());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].code, "missing_identity");
        assert_eq!(report.warnings[0].path, "/classes/0");
    }

    #[test]
    fn reference_into_composite_key_is_a_warning() {
        let model = EntityModel::new(vec![
            Class::new("Stock")
                .with_attribute(Attribute::new("warehouse", "short").identity())
                .with_attribute(Attribute::new("sku", "string").identity()),
            Class::new("Reservation")
                .with_attribute(Attribute::new("id", "int32").identity())
                .with_attribute(Attribute::new("stock", "Stock")),
        ]);
        let report = validate_model(&model);

        assert!(report.is_ok());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].code, "composite_key_reference");
        assert_eq!(report.warnings[0].path, "/classes/1/attributes/1");
    }

    #[test]
    fn reports_reference_and_naming_errors() {
        let model = EntityModel::new(vec![
            Class::new("Setting").with_attribute(Attribute::new("value", "string")),
            Class::new("Profile")
                .with_attribute(Attribute::new("id", "int32").identity().transient())
                .with_attribute(Attribute::new("setting", "Setting"))
                .with_attribute(Attribute::new("owner", "int32").references("User"))
                .with_attribute(Attribute::new("setting", "string")),
            Class::new("Profile"),
        ]);
        let report = validate_model(&model);
        let codes: Vec<&str> = report.errors.iter().map(|issue| issue.code.as_str()).collect();

        assert!(codes.contains(&"transient_identity"));
        assert!(codes.contains(&"keyless_association_target"));
        assert!(codes.contains(&"unknown_association_target"));
        assert!(codes.contains(&"duplicate_attribute"));
        assert!(codes.contains(&"duplicate_class"));
    }

    #[test]
    fn json_structure_is_checked() {
        let valid = json!({
            "classes": [{ "name": "Order", "attributes": [{ "name": "id", "type_name": "int64" }] }]
        });
        assert!(validate_model_json(&valid).expect("compile schema").is_ok());

        let invalid = json!({
            "classes": [{ "name": "Order", "attributes": [{ "name": "id" }] }]
        });
        let report = validate_model_json(&invalid).expect("compile schema");
        assert!(!report.is_ok());
        assert_eq!(report.errors[0].code, "schema_violation");
    }
}
