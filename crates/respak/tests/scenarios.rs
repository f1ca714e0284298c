//! End-to-end resolution against archives written to disk.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use respak::archive::testing::{ArchiveWriter, RawRecord};
use respak::archive::{Error as ArchiveError, Lookup};
use respak::prelude::*;
use respak::Error;
use tempfile::TempDir;

const INDEX_HTML: &[u8] = b"<!doctype html>\n<html><head><title>App</title></head>\
<body><div id=\"root\"></div><script src=\"app.js\"></script></body></html>\n";

const IO_CONFIG: &[u8] = b"<?xml version=\"1.0\"?>\n<io><port name=\"main\" baud=\"9600\"/></io>\n";

fn write_archive(writer: &ArchiveWriter) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resources.pak");
    writer.write_to(&path).unwrap();
    (dir, path)
}

#[test]
fn secure_compressed_web_page() {
    let mut writer = ArchiveWriter::new();
    writer.add(Recipe::EncryptedCompressed, "www", "index.html", "text/html", INDEX_HTML);
    let (_dir, path) = write_archive(&writer);

    let resolver = ResourceResolver::open(&path).unwrap();
    let resource = resolver.resolve("index.html", "www").unwrap().unwrap();

    assert_eq!(resource.data(), INDEX_HTML);
    assert_eq!(resource.content_type(), "text/html");
    assert_eq!(resource.recipe(), Recipe::EncryptedCompressed);
    assert_eq!(resource.id(), hash::secure_identifier("wwwindex.html"));
    assert_eq!(resource.raw_length(), INDEX_HTML.len() as u64);
}

#[test]
fn plain_config_file_is_returned_unchanged() {
    let mut writer = ArchiveWriter::new();
    writer.add_raw("config/io-config.xml", "application/xml", IO_CONFIG);
    let (_dir, path) = write_archive(&writer);

    let resolver = ResourceResolver::open(&path).unwrap();
    let resource = resolver.retrieve_config_resource("io-config.xml").unwrap();

    assert_eq!(resource.data(), IO_CONFIG);
    assert_eq!(resource.content_type(), "application/xml");
    assert_eq!(resource.recipe(), Recipe::None);
    assert!(!resource.is_secure());
}

#[test]
fn missing_path_is_not_found_without_error() {
    let mut writer = ArchiveWriter::new();
    writer
        .add(Recipe::EncryptedCompressed, "www", "index.html", "text/html", INDEX_HTML)
        .add_raw("config/io-config.xml", "application/xml", IO_CONFIG);
    let (_dir, path) = write_archive(&writer);

    let resolver = ResourceResolver::open(&path).unwrap();
    assert!(resolver.resolve("nope.html", WEB_NAMESPACE).unwrap().is_none());
    assert!(resolver.retrieve_web_resource("io-config.xml").is_none());
    assert!(resolver.retrieve_config_resource("index.html").is_none());
}

#[test]
fn unsupported_secure_recipe_falls_back_to_plain_record() {
    let secure = Lookup::secure("www", "settings.json");
    let mut writer = ArchiveWriter::new();
    writer
        .add_record(RawRecord::new(
            secure.identifier(),
            "BOGUS",
            b"application/json",
            b"{\"secure\":true}",
        ))
        .add_raw("wwwsettings.json", "application/json", b"{\"secure\":false}");
    let (_dir, path) = write_archive(&writer);

    let resolver = ResourceResolver::open(&path).unwrap();
    let resource = resolver.retrieve_web_resource("settings.json").unwrap();
    assert_eq!(resource.data(), b"{\"secure\":false}");
}

#[test]
fn unsupported_secure_recipe_alone_is_not_found() {
    let secure = Lookup::secure("www", "settings.json");
    let mut writer = ArchiveWriter::new();
    writer.add_record(RawRecord::new(secure.identifier(), "BOGUS", b"x", b"y"));
    let (_dir, path) = write_archive(&writer);

    let resolver = ResourceResolver::open(&path).unwrap();
    assert!(resolver.resolve("settings.json", "www").unwrap().is_none());
}

#[test]
fn every_recipe_in_one_archive() {
    let files: [(Recipe, &str, &str, &str, &[u8]); 5] = [
        (Recipe::EncryptedCompressed, "www", "index.html", "text/html", INDEX_HTML),
        (Recipe::Encrypted, "www", "app.js", "text/javascript", b"document.title = 'x';"),
        (Recipe::Compressed, "www", "app.css", "text/css", b"html, body { height: 100% }"),
        (Recipe::None, "config/", "io-config.xml", "application/xml", IO_CONFIG),
        (Recipe::Compressed, "config/", "limits.ini", "text/plain", b"[limits]\nmax=5\n"),
    ];

    let mut writer = ArchiveWriter::new();
    for (recipe, namespace, path, content_type, data) in files {
        writer.add(recipe, namespace, path, content_type, data);
    }
    let (_dir, path) = write_archive(&writer);

    let resolver =
        ResourceResolver::new(ResolverConfig::new(&path).with_length_policy(LengthPolicy::Strict))
            .unwrap();

    for (recipe, namespace, path, content_type, data) in files {
        let resource = resolver.resolve(path, namespace).unwrap().unwrap();
        assert_eq!(resource.recipe(), recipe, "{namespace}{path}");
        assert_eq!(resource.content_type(), content_type);
        assert_eq!(resource.data(), data);
    }
}

#[test]
fn resolution_is_repeatable() {
    let mut writer = ArchiveWriter::new();
    writer.add(Recipe::EncryptedCompressed, "config/", "io-config.xml", "application/xml", IO_CONFIG);
    let (_dir, path) = write_archive(&writer);

    let resolver = ResourceResolver::open(&path).unwrap();
    let first = resolver.retrieve_config_resource("io-config.xml").unwrap();
    let second = resolver.retrieve_config_resource("io-config.xml").unwrap();
    assert_eq!(first, second);
}

#[test]
fn big_endian_archive_with_matching_config() {
    let mut writer = ArchiveWriter::with_byte_order(ByteOrder::Big);
    writer
        .add_raw("config/a.txt", "text/plain", b"first")
        .add(Recipe::EncryptedCompressed, "www", "index.html", "text/html", INDEX_HTML);
    let (_dir, path) = write_archive(&writer);

    let resolver =
        ResourceResolver::new(ResolverConfig::new(&path).with_byte_order(ByteOrder::Big)).unwrap();
    assert_eq!(resolver.retrieve_web_resource("index.html").unwrap().data(), INDEX_HTML);

    // Read as little-endian, the record count is nonsense and the scan fails
    // on the stream rather than returning garbage.
    let misconfigured = ResourceResolver::open(&path).unwrap();
    assert!(misconfigured.retrieve_web_resource("index.html").is_none());
}

#[test]
fn strict_length_policy_rejects_mismatch() {
    let mut writer = ArchiveWriter::new();
    writer.add_record(RawRecord::new("config/a.txt", "", b"text/plain", b"abc").raw_length(99));
    let (_dir, path) = write_archive(&writer);

    let lenient = ResourceResolver::open(&path).unwrap();
    assert_eq!(lenient.retrieve_config_resource("a.txt").unwrap().data(), b"abc");

    let strict =
        ResourceResolver::new(ResolverConfig::new(&path).with_length_policy(LengthPolicy::Strict))
            .unwrap();
    assert!(strict.resolve("a.txt", CONFIG_NAMESPACE).unwrap().is_none());
}

#[test]
fn zero_timeout_surfaces_deadline() {
    let mut writer = ArchiveWriter::new();
    writer.add_raw("config/a.txt", "text/plain", b"abc");
    let (_dir, path) = write_archive(&writer);

    let resolver =
        ResourceResolver::new(ResolverConfig::new(&path).with_scan_timeout(Duration::ZERO))
            .unwrap();
    let err = resolver.resolve("a.txt", CONFIG_NAMESPACE).unwrap_err();
    assert!(matches!(
        err,
        Error::Archive(ArchiveError::DeadlineExceeded { .. })
    ));
}

#[test]
fn concurrent_lookups_share_one_resolver() {
    let mut writer = ArchiveWriter::new();
    for i in 0..16 {
        let body = format!("<p>page {i}</p>");
        writer.add(
            Recipe::EncryptedCompressed,
            "www",
            &format!("page{i}.html"),
            "text/html",
            body.as_bytes(),
        );
    }
    let (_dir, path) = write_archive(&writer);

    let resolver = Arc::new(
        ResourceResolver::new(ResolverConfig::new(&path).with_cache_capacity(4)).unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let resolver = Arc::clone(&resolver);
            thread::spawn(move || {
                for i in (t..16).step_by(3) {
                    let resource = resolver
                        .retrieve_web_resource(&format!("page{i}.html"))
                        .unwrap();
                    assert_eq!(resource.data(), format!("<p>page {i}</p>").as_bytes());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert!(resolver.cache().unwrap().len() <= 4);
}

#[test]
fn declared_length_equal_to_cooked_length_still_resolves() {
    let mut writer = ArchiveWriter::new();
    writer.add_record(
        RawRecord::new("config/io-config.xml", "", b"application/xml", IO_CONFIG)
            .declared_length(IO_CONFIG.len() as i32),
    );
    let (_dir, path) = write_archive(&writer);

    let resolver = ResourceResolver::open(&path).unwrap();
    let resource = resolver.retrieve_config_resource("io-config.xml").unwrap();
    assert_eq!(resource.data(), IO_CONFIG);

    let strict =
        ResourceResolver::new(ResolverConfig::new(&path).with_length_policy(LengthPolicy::Strict))
            .unwrap();
    assert!(strict.retrieve_config_resource("io-config.xml").is_none());
}

#[test]
fn secure_recipe_under_plain_identifier_is_not_decrypted() {
    let mut writer = ArchiveWriter::new();
    writer.add_record(RawRecord::new("wwwapp.js", "MSC", b"text/javascript", b"ciphertext"));
    let (_dir, path) = write_archive(&writer);

    let resolver = ResourceResolver::open(&path).unwrap();
    assert!(resolver.resolve("app.js", WEB_NAMESPACE).unwrap().is_none());
}
