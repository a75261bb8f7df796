use ermgen_core::{EntityModel, model_json_schema, validate_model, validate_model_json};

#[test]
fn json_schema_describes_model_format() {
    let schema = model_json_schema();

    let required = schema["required"].as_array().expect("required list");
    assert!(required.iter().any(|value| value == "classes"));

    let generators = schema["definitions"]["IdGenerator"]["enum"]
        .as_array()
        .expect("generator enum");
    assert!(generators.iter().any(|value| value == "guid.comb"));
    assert!(generators.iter().any(|value| value == "native"));
}

#[test]
fn sample_model_passes_both_validations() {
    let json = serde_json::json!({
        "classes": [
            {
                "name": "Customer",
                "table": "Customers",
                "attributes": [
                    { "name": "Id", "type_name": "guid", "identity": true },
                    { "name": "Email", "type_name": "string", "unique": true, "not_null": true }
                ]
            },
            {
                "name": "Invoice",
                "id_generator": "increment",
                "attributes": [
                    { "name": "Number", "type_name": "int64", "identity": true },
                    { "name": "Customer", "type_name": "Customer", "not_null": true }
                ]
            }
        ]
    });

    let structural = validate_model_json(&json).expect("compile schema");
    assert!(structural.is_ok(), "structural errors: {:?}", structural.errors);

    let model: EntityModel = serde_json::from_value(json).expect("parse model");
    let report = validate_model(&model);
    assert!(report.is_ok(), "model errors: {:?}", report.errors);
    assert!(report.warnings.is_empty());
}
