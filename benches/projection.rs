use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use xmlkit::{DriverKind, RegistryStore, XmlOptions};

fn sample_channel() -> String {
    let mut xml = String::from("<rss version=\"2.0\"><channel><title>Bench</title>");
    for i in 0..50 {
        xml.push_str(&format!(
            "<item><title>Item {i}</title><link>http://example.com/{i}</link>\
             <guid isPermaLink=\"true\">http://example.com/{i}</guid></item>"
        ));
    }
    xml.push_str("</channel></rss>");
    xml
}

fn bench_as_array(c: &mut Criterion) {
    let mut store = RegistryStore::new(XmlOptions::default());
    let rss = store.load(DriverKind::Rss2, &sample_channel()).unwrap();

    c.bench_function("as_array_50_items", |b| {
        b.iter(|| black_box(rss.as_array().unwrap()));
    });
}

fn bench_from_array(c: &mut Criterion) {
    let mut store = RegistryStore::new(XmlOptions::default());
    let projected = store
        .load(DriverKind::Rss2, &sample_channel())
        .unwrap()
        .as_array()
        .unwrap();

    c.bench_function("from_array_50_items", |b| {
        b.iter(|| {
            let rss = store.create(DriverKind::Rss2).unwrap();
            rss.from_array(black_box(&projected)).unwrap();
            black_box(rss)
        });
    });
}

fn bench_xpath(c: &mut Criterion) {
    let mut store = RegistryStore::new(XmlOptions::default());
    let rss = store.load(DriverKind::Rss2, &sample_channel()).unwrap();

    c.bench_function("xpath_descendant_titles", |b| {
        b.iter(|| black_box(rss.xpath(black_box("//item/title")).unwrap()));
    });
}

criterion_group!(benches, bench_as_array, bench_from_array, bench_xpath);
criterion_main!(benches);
