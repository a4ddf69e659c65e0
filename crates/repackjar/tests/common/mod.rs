#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use repackjar::RepackConfig;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const MANIFEST: &str = "META-INF/MANIFEST.MF";

/// A deflated archive with the given file entries, in order.
pub fn deflated(files: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, content) in files {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// A small library jar whose contents depend on `seed`.
pub fn library(seed: u8) -> Vec<u8> {
    deflated(&[
        (MANIFEST, b"Manifest-Version: 1.0\n".to_vec()),
        (
            "org/example/Lib.class",
            (0..2048u32).map(|i| (i as u8).wrapping_mul(seed)).collect(),
        ),
        ("org/example/lib.properties", format!("seed={seed}\n").repeat(64).into_bytes()),
    ])
}

/// An application jar with the given nested jars under `lib_dir`.
pub fn application(lib_dir: Option<&str>, nested: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut files = vec![
        (MANIFEST.to_string(), b"Manifest-Version: 1.0\nMain-Class: app.Main\n".to_vec()),
        ("app/Main.class".to_string(), vec![0xCA, 0xFE, 0xBA, 0xBE, 0, 0, 0, 61]),
        ("app/application.yml".to_string(), b"server:\n  port: 8080\n".repeat(32)),
    ];
    if let Some(lib) = lib_dir {
        for (name, bytes) in nested {
            files.push((format!("{lib}/{name}"), bytes.clone()));
        }
    }
    let borrowed: Vec<(&str, Vec<u8>)> = files
        .iter()
        .map(|(name, bytes)| (name.as_str(), bytes.clone()))
        .collect();
    deflated(&borrowed)
}

/// Five nested jars named `d1.jar` .. `d5.jar`.
pub fn five_libraries() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("d1.jar", library(1)),
        ("d2.jar", library(2)),
        ("d3.jar", library(3)),
        ("d4.jar", library(4)),
        ("d5.jar", library(5)),
    ]
}

pub fn config(output_dir: &Path, artifact_id: &str, jobs: usize) -> RepackConfig {
    RepackConfig {
        output_dir: output_dir.to_path_buf(),
        artifact_id: artifact_id.to_string(),
        jobs: Some(jobs),
        ..Default::default()
    }
}

/// Name and compression of every entry, in archive order.
pub fn listing(bytes: &[u8]) -> Vec<(String, CompressionMethod)> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| {
            let entry = archive.by_index(i).unwrap();
            (entry.name().to_string(), entry.compression())
        })
        .collect()
}

pub fn all_stored(bytes: &[u8]) -> bool {
    listing(bytes)
        .iter()
        .all(|(_, method)| *method == CompressionMethod::Stored)
}

/// File contents keyed by entry name. Nested jars are expanded into
/// `outer!/inner` keys so that two archives compare by logical content.
pub fn snapshot(bytes: &[u8]) -> BTreeMap<String, Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut files = BTreeMap::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        if name.ends_with(".jar") {
            for (inner, inner_content) in snapshot(&content) {
                files.insert(format!("{name}!/{inner}"), inner_content);
            }
        } else {
            files.insert(name, content);
        }
    }
    files
}

/// Contents of one nested jar inside `outer`.
pub fn nested(outer: &[u8], name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(Cursor::new(outer)).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut content = Vec::new();
    entry.read_to_end(&mut content).unwrap();
    content
}
