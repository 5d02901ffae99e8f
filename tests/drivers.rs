//! Driver tests: one document per dialect, rendered and inspected

use pretty_assertions::assert_eq;
use xmlkit::core::namespace::ns;
use xmlkit::{
    AtomBuilder, DriverKind, RegistryStore, SitemapBuilder, Value, XmlError, XmlOptions,
    XrdsBuilder,
};

const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

fn store() -> RegistryStore {
    RegistryStore::new(XmlOptions::default())
}

#[test]
fn test_atom_title() {
    let mut store = store();
    let feed = store.create(DriverKind::Atom).unwrap();
    feed.add_node("title", Some("Hello"), &[]).unwrap();

    assert_eq!(
        feed.render(false).unwrap(),
        format!(
            "{}<feed xmlns=\"http://www.w3.org/2005/Atom\"><title type=\"text\">Hello</title></feed>\n",
            DECLARATION
        )
    );
}

#[test]
fn test_atom_filters() {
    let mut store = RegistryStore::new(
        XmlOptions::default()
            .base_url("http://example.com/blog")
            .utc_offset_seconds(3600),
    );
    let feed = store.create(DriverKind::Atom).unwrap();
    feed.add_node("summary", Some("<p>Markup</p>"), &[]).unwrap();
    feed.add_node("updated", Some("1241182983"), &[]).unwrap();
    feed.add_node("startDate", Some("2009-05-01 13:03:03"), &[]).unwrap();
    feed.add_node("link", None, &[("href", "/blog/posts/1")]).unwrap();
    feed.add_node("id", Some("tag:example.com,2009:1"), &[]).unwrap();

    let summary = feed.get_single("summary").unwrap().unwrap();
    assert_eq!(summary.attribute("type"), "html");
    assert_eq!(summary.value().as_deref(), Some("<p>Markup</p>"));

    let updated = feed.get_single("updated").unwrap().unwrap();
    assert_eq!(updated.value().as_deref(), Some("2009-05-01T14:03:03+01:00"));

    let start = feed.get_single("startDate").unwrap().unwrap();
    assert_eq!(start.value().as_deref(), Some("2009-05-01"));

    let link = feed.get_single("link").unwrap().unwrap();
    assert_eq!(link.attribute("href"), "http://example.com/blog/posts/1");

    // Values with a scheme of their own are left alone
    let id = feed.get_single("id").unwrap().unwrap();
    assert_eq!(id.value().as_deref(), Some("tag:example.com,2009:1"));
}

#[test]
fn test_atom_bad_date() {
    let mut store = store();
    let feed = store.create(DriverKind::Atom).unwrap();
    let result = feed.add_node("updated", Some("not a date"), &[]);
    assert!(matches!(result, Err(XmlError::BadValue(_))));
}

#[test]
fn test_atom_add_person() {
    let mut store = store();
    let feed = store.create(DriverKind::Atom).unwrap();
    feed.add_person("author", "Ada", Some("ada@example.com"), None)
        .unwrap()
        .add_person("contributor", "Grace", None, Some("http://grace.example.com/"))
        .unwrap();

    let xml = feed.render(false).unwrap();
    assert!(xml.contains(
        "<author><name>Ada</name><email>ada@example.com</email></author>\
         <contributor><name>Grace</name><uri>http://grace.example.com/</uri></contributor>"
    ));
}

#[test]
fn test_atom_add_content_embeds_document() {
    let mut store = store();
    let feed = store.create(DriverKind::Atom).unwrap();
    let entry = feed.add_node("entry", None, &[]).unwrap();

    let services = store.create(DriverKind::Xrds).unwrap();
    services
        .add_node("XRD", None, &[])
        .unwrap()
        .add_service(&["http://specs.openid.net/auth/2.0/signon"], "http://id.example.com/", None)
        .unwrap();

    entry.add_content(&services).unwrap();

    let content = feed.get_single("content").unwrap().unwrap();
    assert_eq!(content.attribute("type"), "application/xrds+xml");
    let embedded = content.xpath("//content/xrds:XRDS").unwrap();
    assert_eq!(embedded.len(), 1);
    assert_eq!(feed.get("Service").unwrap().len(), 1);
}

#[test]
fn test_rss_root_defaults() {
    let mut store = store();
    let rss = store.create(DriverKind::Rss2).unwrap();
    let channel = rss.add_node("channel", None, &[]).unwrap();
    channel.add_node("title", Some("<b>Site</b> news"), &[]).unwrap();

    let xml = rss.render(false).unwrap();
    assert!(xml.contains("<rss version=\"2.0\"><channel><title>Site news</title></channel></rss>"));
    assert_eq!(rss.content_type(), Some("application/rss+xml"));
}

#[test]
fn test_rss_atom_link_and_dates() {
    let mut store = store();
    let rss = store.create(DriverKind::Rss2).unwrap();
    let channel = rss.add_node("channel", None, &[]).unwrap();
    let link = channel
        .add_node("atom:link", None, &[("href", "http://example.com/rss")])
        .unwrap();
    channel.add_node("pubDate", Some("2009-05-01T13:03:03+00:00"), &[]).unwrap();

    assert_eq!(link.name(), "atom:link");
    assert_eq!(link.attribute("href"), "http://example.com/rss");
    assert_eq!(link.attribute("rel"), "self");
    assert_eq!(link.attribute("type"), "application/rss+xml");
    assert_eq!(link.attributes().len(), 3);

    let xml = rss.render(false).unwrap();
    assert!(xml.contains(&format!("<rss xmlns:atom=\"{}\" version=\"2.0\">", ns::ATOM)));
    for fragment in [
        "<atom:link ",
        " href=\"http://example.com/rss\"",
        " rel=\"self\"",
        " type=\"application/rss+xml\"",
    ] {
        assert!(xml.contains(fragment), "missing {:?} in {}", fragment, xml);
    }
    assert!(xml.contains("<pubDate>Fri, 01 May 2009 13:03:03 +0000</pubDate>"));
}

#[test]
fn test_sitemap_add_url() {
    let mut store = store();
    let sitemap = store.create(DriverKind::Sitemap).unwrap();
    sitemap
        .add_url("http://example.com/", &[("lastmod", "2020-01-02")], &[])
        .unwrap();

    assert_eq!(
        sitemap.render(false).unwrap(),
        format!(
            "{}<urlset xmlns=\"{}\"><url><loc>http://example.com/</loc><lastmod>2020-01-02</lastmod></url></urlset>\n",
            DECLARATION,
            ns::SITEMAP
        )
    );
    assert_eq!(sitemap.content_type(), Some("text/xml"));
}

#[test]
fn test_sitemap_extensions() {
    let mut store = RegistryStore::new(XmlOptions::default().base_url("http://example.com"));
    let sitemap = store.create(DriverKind::Sitemap).unwrap();
    sitemap
        .add_url(
            "http://example.com/watch",
            &[("changefreq", "weekly")],
            &[
                (
                    "video",
                    &[
                        ("video:thumbnail_loc", "/thumbs/1.jpg"),
                        ("video:title", "Clip"),
                    ],
                ),
                ("mobile", &[]),
            ],
        )
        .unwrap();

    let xml = sitemap.render(false).unwrap();
    assert!(xml.contains(&format!("xmlns:video=\"{}\"", ns::SITEMAP_VIDEO)));
    assert!(xml.contains(&format!("xmlns:mobile=\"{}\"", ns::SITEMAP_MOBILE)));
    assert!(xml.contains(
        "<video:video><video:thumbnail_loc>http://example.com/thumbs/1.jpg</video:thumbnail_loc>\
         <video:title>Clip</video:title></video:video>"
    ));
    assert!(xml.contains("<mobile:mobile/>"));
    assert_eq!(xml.matches("xmlns:video").count(), 1);
}

#[test]
fn test_xrds_services() {
    let mut store = store();
    let xrds = store.create(DriverKind::Xrds).unwrap();
    let xrd = xrds.add_node("XRD", None, &[]).unwrap();
    let service = xrd
        .add_service(
            &[
                "http://specs.openid.net/auth/2.0/signon",
                "http://openid.net/signon/1.0",
            ],
            "http://www.myopenid.com/server",
            Some(10),
        )
        .unwrap();
    service
        .add_node("openid:Delegate", Some("http://smoker.myopenid.com/"), &[])
        .unwrap();

    assert_eq!(service.attribute("priority"), "10");
    assert_eq!(xrds.get("Type").unwrap().len(), 2);

    let xml = xrds.render(false).unwrap();
    assert!(xml.contains(&format!(
        "<xrds:XRDS xmlns:xrds=\"{}\" xmlns=\"{}\" xmlns:openid=\"{}\">",
        ns::XRDS,
        ns::XRD,
        ns::OPENID
    )));
    assert!(xml.contains(
        "<Service priority=\"10\"><Type>http://specs.openid.net/auth/2.0/signon</Type>\
         <Type>http://openid.net/signon/1.0</Type><URI>http://www.myopenid.com/server</URI>\
         <openid:Delegate>http://smoker.myopenid.com/</openid:Delegate></Service>"
    ));
    assert_eq!(xrds.content_type(), Some("application/xrds+xml"));
}

#[test]
fn test_import_across_drivers() {
    let mut store = store();
    let feed = store.create(DriverKind::Atom).unwrap();
    let entry = feed.add_node("entry", None, &[("xml:lang", "en")]).unwrap();
    entry.add_node("title", Some("Post"), &[]).unwrap();

    let rss = store.create(DriverKind::Rss2).unwrap();
    let channel = rss.add_node("channel", None, &[]).unwrap();
    channel.import(&feed).unwrap();

    let imported = channel.get_single("feed").unwrap().unwrap();
    assert_eq!(imported.name(), "feed");
    let imported_title = imported.get_single("title").unwrap().unwrap();
    // The Atom filter's type attribute travels with the copy
    assert_eq!(imported_title.attribute("type"), "text");

    let xml = rss.render(false).unwrap();
    assert!(xml.contains(&format!(
        "<channel><feed xmlns=\"{}\"><entry xml:lang=\"en\"><title type=\"text\">Post</title></entry></feed></channel>",
        ns::ATOM
    )));

    // The source document is untouched
    assert_eq!(feed.get("entry").unwrap().len(), 1);
    assert!(feed.get_single("channel").unwrap().is_none());
}

#[test]
fn test_factory_by_name() {
    let mut store = store();
    let sitemap = store.factory(Some("sitemap"), None, None).unwrap();
    assert_eq!(sitemap.driver(), DriverKind::Sitemap);

    let custom = store.factory(Some("atom"), Some("entry"), None).unwrap();
    assert_eq!(custom.name(), "entry");
    assert_eq!(custom.attributes(), Vec::<(String, String)>::new());

    let loaded = store
        .factory(Some("rss"), None, Some("<rss version=\"0.91\"><channel/></rss>"))
        .unwrap();
    assert_eq!(loaded.attribute("version"), "0.91");
    assert_eq!(
        loaded.as_array().unwrap(),
        Value::map([("channel", Value::list([""]))])
    );
}
