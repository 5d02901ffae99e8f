#[cfg(feature = "multi-thread")]
#[cfg(test)]
mod tests {
    use std::thread;
    use xmlkit::{DriverKind, RegistryStore, XmlOptions};

    #[test]
    fn test_concurrent_reads() {
        let mut store = RegistryStore::new(XmlOptions::default());
        let feed = store.create(DriverKind::Atom).unwrap();
        for i in 0..5 {
            feed.add_node("entry", None, &[])
                .unwrap()
                .add_node("title", Some(format!("Entry {}", i).as_str()), &[])
                .unwrap();
        }

        let mut handles = vec![];

        // Spawn threads that query the same document concurrently
        for _ in 0..8 {
            let feed = feed.root().clone();
            handles.push(thread::spawn(move || {
                assert_eq!(feed.get("entry").unwrap().len(), 5);
                assert_eq!(feed.xpath("//entry/title").unwrap().len(), 5);
                feed.as_array().unwrap()
            }));
        }

        let projections: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(projections.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn test_concurrent_writes() {
        let mut store = RegistryStore::new(XmlOptions::default());
        let sitemap = store.create(DriverKind::Sitemap).unwrap();

        let mut handles = vec![];

        // Each thread appends its own url entries to the shared root
        for t in 0..4 {
            let root = sitemap.root().clone();
            handles.push(thread::spawn(move || {
                for i in 0..10 {
                    root.add_node("url", None, &[])
                        .unwrap()
                        .add_node("loc", Some(format!("http://example.com/{}/{}", t, i).as_str()), &[])
                        .unwrap();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(sitemap.get("url").unwrap().len(), 40);
        assert_eq!(sitemap.get("loc").unwrap().len(), 40);
    }

    #[test]
    fn test_document_moves_to_another_thread() {
        let mut store = RegistryStore::new(XmlOptions::default());
        let rss = store.create(DriverKind::Rss2).unwrap();

        let xml = thread::spawn(move || {
            rss.add_node("channel", None, &[])
                .unwrap()
                .add_node("title", Some("Moved"), &[])
                .unwrap();
            rss.render(false).unwrap()
        })
        .join()
        .unwrap();

        assert!(xml.contains("<rss version=\"2.0\"><channel><title>Moved</title></channel></rss>"));
    }
}
