use ermgen_core::{
    Attribute, Class, Column, EntityModel, Error, GENERATOR_VERSION, GeneratorConfig, Result, Table,
    TableGraph,
};

use crate::xml::XmlWriter;

/// Mapping schema namespace written on the root element.
pub const MAPPING_NAMESPACE: &str = "urn:nhibernate-mapping-2.2";

/// Serialize the mapping document for every class that has a table.
///
/// Table and column names are read from the table graph, never re-derived,
/// so they match the DDL character for character.
pub fn emit_mapping(
    model: &EntityModel,
    graph: &TableGraph,
    config: &GeneratorConfig,
) -> Result<String> {
    let mut xml = XmlWriter::new();
    xml.declaration();
    xml.comment(&format!(" This code was generated by {GENERATOR_VERSION} "));
    xml.open(
        "hibernate-mapping",
        &[
            ("xmlns", MAPPING_NAMESPACE.to_string()),
            ("assembly", config.assembly.clone()),
            ("namespace", config.namespace.clone()),
            ("default-lazy", config.lazy.to_string()),
        ],
    );

    for class in &model.classes {
        let Some(table) = graph.table_for_class(&class.name) else {
            continue;
        };
        write_class(&mut xml, class, table, config)?;
    }

    xml.close("hibernate-mapping");
    Ok(xml.finish())
}

fn write_class(
    xml: &mut XmlWriter,
    class: &Class,
    table: &Table,
    config: &GeneratorConfig,
) -> Result<()> {
    let mut attrs = vec![
        ("name", class.name.clone()),
        ("table", config.quote_identifier(&table.name)),
    ];
    if let Some(lazy) = class.lazy {
        attrs.push(("lazy", lazy.to_string()));
    }
    xml.open("class", &attrs);

    write_key(xml, class, table, config)?;

    for attribute in class.value_attributes() {
        let column = mapped_column(class, table, attribute)?;
        let quoted = config.quote_identifier(&column.name);
        match &column.references {
            Some(reference) => xml.empty(
                "many-to-one",
                &[
                    ("name", attribute.name.clone()),
                    ("column", quoted),
                    ("class", reference.class.clone()),
                    ("unique", attribute.unique.to_string()),
                    ("not-null", attribute.not_null.to_string()),
                ],
            ),
            None => xml.empty(
                "property",
                &[
                    ("name", attribute.name.clone()),
                    ("column", quoted),
                    ("type", attribute.type_name.clone()),
                    ("unique", attribute.unique.to_string()),
                    ("not-null", attribute.not_null.to_string()),
                ],
            ),
        }
    }

    xml.close("class");
    Ok(())
}

/// Key block mirroring the builder: single id for one identity attribute,
/// composite id with key properties and key associations for several.
fn write_key(
    xml: &mut XmlWriter,
    class: &Class,
    table: &Table,
    config: &GeneratorConfig,
) -> Result<()> {
    let Some(key) = &table.primary_key else {
        return Ok(());
    };
    let identities: Vec<&Attribute> = class.identity_attributes().collect();

    if !key.is_composite() {
        let Some(attribute) = identities.first() else {
            return Ok(());
        };
        let column = mapped_column(class, table, attribute)?;
        let generator = key.generator.unwrap_or(config.id_generator);
        xml.empty(
            "id",
            &[
                ("name", attribute.name.clone()),
                ("column", config.quote_identifier(&column.name)),
                ("type", attribute.type_name.clone()),
                ("generator", generator.as_str().to_string()),
            ],
        );
        return Ok(());
    }

    xml.open("composite-id", &[]);
    for attribute in identities {
        let column = mapped_column(class, table, attribute)?;
        let quoted = config.quote_identifier(&column.name);
        match &column.references {
            Some(reference) => xml.empty(
                "key-many-to-one",
                &[
                    ("name", attribute.name.clone()),
                    ("column", quoted),
                    ("class", reference.class.clone()),
                ],
            ),
            None => xml.empty(
                "key-property",
                &[
                    ("name", attribute.name.clone()),
                    ("column", quoted),
                    ("type", attribute.type_name.clone()),
                ],
            ),
        }
    }
    xml.close("composite-id");
    Ok(())
}

fn mapped_column<'t>(class: &Class, table: &'t Table, attribute: &Attribute) -> Result<&'t Column> {
    table.column_for_attribute(&attribute.name).ok_or_else(|| {
        Error::InvalidModel(format!(
            "table '{}' has no column for {}.{}",
            table.name, class.name, attribute.name
        ))
    })
}

#[cfg(test)]
mod tests {
    use ermgen_core::{IdGenerator, NamingMode, build_table_graph};
    use pretty_assertions::assert_eq;

    use super::*;

    fn render(model: &EntityModel, config: &GeneratorConfig) -> String {
        let graph = build_table_graph(model, config).expect("build graph");
        emit_mapping(model, &graph, config).expect("emit mapping")
    }

    #[test]
    fn emits_single_id_and_associations() {
        let model = EntityModel::new(vec![
            Class::new("Order").with_attribute(Attribute::new("Id", "long").identity()),
            Class::new("OrderLine")
                .with_attribute(Attribute::new("Id", "long").identity())
                .with_attribute(Attribute::new("Quantity", "int").not_null())
                .with_attribute(Attribute::new("Order", "Order").unique()),
        ]);
        let config = GeneratorConfig {
            naming: NamingMode::Normalized,
            table_prefix: "app_".to_string(),
            assembly: "Shop".to_string(),
            namespace: "Shop.Domain".to_string(),
            ..GeneratorConfig::default()
        };

        let expected = format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<!-- This code was generated by {GENERATOR_VERSION} -->
<hibernate-mapping xmlns="urn:nhibernate-mapping-2.2" assembly="Shop" namespace="Shop.Domain" default-lazy="true">
  <class name="Order" table="`app_order`">
    <id name="Id" column="`id`" type="long" generator="native" />
  </class>
  <class name="OrderLine" table="`app_order_line`">
    <id name="Id" column="`id`" type="long" generator="native" />
    <property name="Quantity" column="`quantity`" type="int" unique="false" not-null="true" />
    <many-to-one name="Order" column="`order`" class="Order" unique="true" not-null="false" />
  </class>
</hibernate-mapping>
"#
        );
        assert_eq!(render(&model, &config), expected);
    }

    #[test]
    fn emits_composite_id_in_declaration_order() {
        let model = EntityModel::new(vec![
            Class::new("Product").with_attribute(Attribute::new("Sku", "string").identity()),
            Class::new("Stock")
                .with_attribute(Attribute::new("Quantity", "int"))
                .with_attribute(Attribute::new("Warehouse", "short").identity())
                .with_attribute(Attribute::new("Product", "Product").identity()),
        ]);
        let mapping = render(&model, &GeneratorConfig::default());

        let expected = r#"    <composite-id>
      <key-property name="Warehouse" column="`Warehouse`" type="short" />
      <key-many-to-one name="Product" column="`Product`" class="Product" />
    </composite-id>
    <property name="Quantity" column="`Quantity`" type="int" unique="false" not-null="false" />"#;
        assert!(mapping.contains(expected), "mapping was:\n{mapping}");
    }

    #[test]
    fn honors_overrides_and_quote_character() {
        let mut customer = Class::new("Customer")
            .with_attribute(Attribute::new("Id", "guid").identity())
            .with_attribute(Attribute::new("Name", "string").column("FullName"))
            .with_attribute(Attribute::new("Cache", "object").transient());
        customer.table = Some("Customers".to_string());
        customer.lazy = Some(false);
        customer.id_generator = Some(IdGenerator::GuidComb);

        let config = GeneratorConfig {
            identifier_quote: None,
            lazy: false,
            ..GeneratorConfig::default()
        };
        let mapping = render(&EntityModel::new(vec![customer]), &config);

        assert!(mapping.contains(r#"default-lazy="false""#));
        assert!(mapping.contains(r#"<class name="Customer" table="Customers" lazy="false">"#));
        assert!(mapping.contains(r#"generator="guid.comb""#));
        assert!(mapping.contains(r#"column="FullName""#));
        assert!(!mapping.contains("Cache"));
    }

    #[test]
    fn skips_classes_without_tables() {
        let model = EntityModel::new(vec![
            Class::new("Order").with_attribute(Attribute::new("Id", "int").identity()),
            Class::new("Helper").with_attribute(Attribute::new("Order", "Order")),
        ]);
        let mapping = render(&model, &GeneratorConfig::default());

        assert!(!mapping.contains("Helper"));
    }

    #[test]
    fn escapes_attribute_values() {
        let model = EntityModel::new(vec![
            Class::new("Box").with_attribute(Attribute::new("Id", "int").identity()),
        ]);
        let config = GeneratorConfig {
            namespace: "A&B<\"C\">".to_string(),
            ..GeneratorConfig::default()
        };
        let mapping = render(&model, &config);

        assert!(mapping.contains(r#"namespace="A&amp;B&lt;&quot;C&quot;&gt;""#));
    }
}
