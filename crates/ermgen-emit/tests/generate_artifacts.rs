use std::fs;
use std::path::PathBuf;

use ermgen_core::{
    Attribute, Class, Dialect, EntityModel, Error, GeneratorConfig, NamingMode, build_table_graph,
};
use ermgen_emit::{GenerateError, MemorySink, emit_ddl, generate, generate_into};

fn load_model() -> EntityModel {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/shop.model.json");
    let contents =
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing model at {}", path.display()));
    serde_json::from_str(&contents).expect("parse model")
}

fn normalized_config(dialect: Dialect) -> GeneratorConfig {
    GeneratorConfig {
        naming: NamingMode::Normalized,
        table_prefix: "app_".to_string(),
        dialect,
        assembly: "Shop".to_string(),
        namespace: "Shop.Domain".to_string(),
        ..GeneratorConfig::default()
    }
}

/// Quoted identifiers following `marker` in `text`, in order of appearance.
fn identifiers_after(text: &str, marker: &str, open: char, close: char) -> Vec<String> {
    text.match_indices(marker)
        .filter_map(|(idx, _)| {
            let rest = &text[idx + marker.len()..];
            let rest = rest.strip_prefix(open)?;
            let end = rest.find(close)?;
            Some(rest[..end].to_string())
        })
        .collect()
}

#[test]
fn generation_is_deterministic() {
    let model = load_model();
    let config = normalized_config(Dialect::PostgreSql);

    let first = generate(&model, &config).expect("first run");
    let second = generate(&model, &config).expect("second run");

    assert_eq!(first.ddl.contents, second.ddl.contents);
    assert_eq!(first.mapping.contents, second.mapping.contents);
}

#[test]
fn table_identifiers_agree_across_artifacts() {
    let model = load_model();

    for naming in [NamingMode::Verbatim, NamingMode::Normalized] {
        let config = GeneratorConfig {
            naming,
            ..normalized_config(Dialect::SqlServer)
        };
        let artifacts = generate(&model, &config).expect("generate");

        let mut ddl_tables = identifiers_after(&artifacts.ddl.contents, "CREATE TABLE ", '[', ']');
        let mut mapping_tables =
            identifiers_after(&artifacts.mapping.contents, "table=\"", '`', '`');
        ddl_tables.sort();
        mapping_tables.sort();

        assert_eq!(ddl_tables.len(), 4, "tables: {ddl_tables:?}");
        assert_eq!(ddl_tables, mapping_tables);
    }
}

#[test]
fn column_identifiers_agree_across_artifacts() {
    let model = load_model();
    let config = normalized_config(Dialect::MySql);
    let graph = build_table_graph(&model, &config).expect("build graph");
    let artifacts = generate(&model, &config).expect("generate");

    for table in graph.tables() {
        for column in &table.columns {
            let ddl_column = format!("`{}` ", column.name);
            let mapping_column = format!("column=\"`{}`\"", column.name);
            assert!(artifacts.ddl.contents.contains(&ddl_column), "ddl lacks {ddl_column}");
            assert!(
                artifacts.mapping.contents.contains(&mapping_column),
                "mapping lacks {mapping_column}"
            );
        }
    }
}

#[test]
fn shop_model_keys_and_types() {
    let model = load_model();
    let config = normalized_config(Dialect::PostgreSql);
    let artifacts = generate(&model, &config).expect("generate");
    let ddl = &artifacts.ddl.contents;
    let mapping = &artifacts.mapping.contents;

    assert!(ddl.contains("\"loyalty_points\" DECIMAL(20,0)"));
    assert!(ddl.contains("\"placed_at\" TIMESTAMP NOT NULL"));
    assert!(ddl.contains("\"line_number\" INTEGER NOT NULL"));
    assert!(ddl.contains("\"order\" BIGINT NOT NULL"));
    assert!(ddl.contains("CONSTRAINT \"PK_app_order_line\" PRIMARY KEY (\"order\", \"line_number\")"));
    assert!(!ddl.contains("app_catalog"));
    assert!(!ddl.contains("notes"));

    assert!(mapping.contains(r#"<id name="Id" column="`id`" type="Guid" generator="guid.comb" />"#));
    assert!(mapping.contains(r#"<key-many-to-one name="Order" column="`order`" class="Order" />"#));
    assert!(mapping.contains(r#"<key-property name="LineNumber" column="`line_number`" type="ushort" />"#));
    assert!(mapping.contains(
        r#"<many-to-one name="Customer" column="`customer`" class="Customer" unique="false" not-null="true" />"#
    ));
    assert!(!mapping.contains("Catalog"));
}

#[test]
fn customer_store_cycle_emits_one_table_each() {
    let model = load_model();
    let config = normalized_config(Dialect::SqlServer);
    let graph = build_table_graph(&model, &config).expect("build graph");

    let customer = graph.table_by_name("app_customer").expect("customer");
    let store = graph.table_by_name("app_store").expect("store");
    assert_eq!(customer.foreign_keys().count(), 1);
    assert_eq!(store.foreign_keys().count(), 1);

    let ddl = emit_ddl(&graph, Dialect::SqlServer);
    assert_eq!(ddl.matches("CREATE TABLE [app_customer]").count(), 1);
    assert_eq!(ddl.matches("CREATE TABLE [app_store]").count(), 1);
    assert!(ddl.contains("ALTER TABLE [app_store] ADD CONSTRAINT [FK_app_store_manager]"));
}

#[test]
fn unmappable_type_delivers_nothing() {
    let mut model = load_model();
    model.classes.push(
        Class::new("Shift")
            .with_attribute(Attribute::new("Id", "int").identity())
            .with_attribute(Attribute::new("Duration-attribute", "Duration")),
    );
    let mut sink = MemorySink::default();

    let err = generate_into(&model, &GeneratorConfig::default(), &mut sink).unwrap_err();

    assert!(matches!(
        err,
        GenerateError::Model(Error::UnmappableType { ref class, ref attribute, ref type_name })
            if class == "Shift" && attribute == "Duration-attribute" && type_name == "Duration"
    ));
    assert!(sink.artifacts.is_empty());
}

#[test]
fn successful_run_delivers_both_artifacts() {
    let model = load_model();
    let mut sink = MemorySink::default();

    let artifacts =
        generate_into(&model, &normalized_config(Dialect::Sqlite), &mut sink).expect("generate");

    assert_eq!(sink.artifacts.len(), 2);
    assert_eq!(sink.artifacts[0], artifacts.ddl);
    assert_eq!(sink.artifacts[1], artifacts.mapping);
    assert_eq!(sink.artifacts[0].file_name, "schema.sql");
    assert_eq!(sink.artifacts[1].file_name, "mapping.hbm.xml");
}

#[test]
fn duplicate_attribute_names_deliver_nothing() {
    let model = EntityModel::new(vec![
        Class::new("Person")
            .with_attribute(Attribute::new("Id", "int").identity())
            .with_attribute(Attribute::new("Name", "string").column("A"))
            .with_attribute(Attribute::new("Name", "string").column("B")),
    ]);
    let mut sink = MemorySink::default();

    let err = generate_into(&model, &GeneratorConfig::default(), &mut sink).unwrap_err();

    assert!(matches!(err, GenerateError::Model(Error::InvalidModel(ref message)) if message.contains("Person.Name")));
    assert!(sink.artifacts.is_empty());
}

#[test]
fn key_association_cycle_agrees_across_artifacts() {
    let model = EntityModel::new(vec![
        Class::new("OrderLine")
            .with_attribute(Attribute::new("Order", "Order").identity())
            .with_attribute(Attribute::new("Line", "int").identity()),
        Class::new("Order")
            .with_attribute(Attribute::new("Id", "long").identity())
            .with_attribute(Attribute::new("LastLine", "OrderLine")),
    ]);

    let artifacts = generate(&model, &GeneratorConfig::default()).expect("generate");

    assert!(artifacts.ddl.contents.contains("REFERENCES [OrderLine] ([Order])"));
    assert!(artifacts.mapping.contents.contains("<key-many-to-one name=\"Order\""));
    assert!(artifacts.mapping.contents.contains("<many-to-one name=\"LastLine\""));
}
