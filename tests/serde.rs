#[cfg(feature = "serde")]
mod tests {
    use pretty_assertions::assert_eq;
    use xmlkit::{DriverKind, RegistryStore, XmlOptions};

    #[test]
    fn test_projection_to_json() {
        let mut store = RegistryStore::new(XmlOptions::default());
        let doc = store
            .load(
                DriverKind::Generic,
                r#"<channel><item id="1"><title>a</title></item><item><title>b</title></item></channel>"#,
            )
            .unwrap();

        let json = serde_json::to_value(doc.as_array().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "item": [
                    { "xml_attributes": { "id": "1" }, "title": ["a"] },
                    { "title": ["b"] }
                ]
            })
        );
    }

    #[test]
    fn test_options_from_json() {
        let options: XmlOptions =
            serde_json::from_str(r#"{ "base_url": "http://example.com", "indent": 4 }"#).unwrap();
        assert_eq!(
            options,
            XmlOptions::default().base_url("http://example.com").indent(4)
        );
    }
}
