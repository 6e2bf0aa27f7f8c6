//! Integration tests for the ArchiveClient + SpriteCache flow.
//!
//! A mock server hands out a sprite archive built in the test:
//! - download the archive, verify it is cached and checksummed
//! - pre-render forms, verify a second run is a cache hit
//! - clear rendered art, verify it is rendered again from cached sprites
//! - transient failures are retried, permanent ones are not

use std::io::{Cursor, Write};
use std::time::Duration;

use image::{ImageFormat, Rgba, RgbaImage};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use pokesprite::art::RenderStyle;
use pokesprite::sprites::{
    ensure_archive, generate_all, render_form, ArchiveClient, ArchiveStatus, ArtOptions,
    GenerateOptions, GenerateReport, SpriteArchive, SpriteCache, SpriteError, Variant,
};

const ARCHIVE_PATH: &str = "/msikma/pokesprite/master.zip";

fn sprite_png(color: [u8; 3]) -> Vec<u8> {
    let image = RgbaImage::from_fn(4, 6, |x, _| {
        if x == 0 {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([color[0], color[1], color[2], 255])
        }
    });
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .expect("Failed to encode png");
    bytes.into_inner()
}

/// Test helper: zip laid out like the pokesprite repository archive.
fn build_archive() -> Vec<u8> {
    let database = serde_json::json!({
        "025": {
            "slug": { "eng": "pikachu" },
            "gen-8": { "forms": { "$": {}, "female": { "is_alias_of": "$" } } }
        },
        "181": {
            "slug": { "eng": "ampharos" },
            "gen-8": { "forms": { "$": {}, "mega": {} } }
        }
    });

    let entries = [
        ("data/pokemon.json", database.to_string().into_bytes()),
        ("pokemon-gen8/regular/pikachu.png", sprite_png([250, 210, 40])),
        ("pokemon-gen8/shiny/pikachu.png", sprite_png([240, 160, 30])),
        ("pokemon-gen8/regular/ampharos.png", sprite_png([250, 200, 60])),
        ("pokemon-gen8/shiny/ampharos.png", sprite_png([240, 120, 150])),
        ("pokemon-gen8/regular/ampharos-mega.png", sprite_png([250, 250, 250])),
        ("pokemon-gen8/shiny/ampharos-mega.png", sprite_png([250, 220, 230])),
    ];

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in &entries {
        writer
            .start_file(format!("pokesprite-master/{}", name), SimpleFileOptions::default())
            .expect("Failed to start zip entry");
        writer.write_all(data).expect("Failed to write zip entry");
    }
    writer.finish().expect("Failed to finish zip").into_inner()
}

/// Test helper: mock server serving the archive, expecting `downloads` requests.
async fn setup_archive_server(archive: Vec<u8>, downloads: u64) -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ARCHIVE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(archive)
                .insert_header("content-type", "application/zip"),
        )
        .expect(downloads)
        .mount(&mock_server)
        .await;

    mock_server
}

fn create_test_client(server: &MockServer) -> ArchiveClient {
    ArchiveClient::with_url(format!("{}{}", server.uri(), ARCHIVE_PATH))
        .expect("Failed to create test client")
}

fn create_test_cache(temp_dir: &TempDir) -> SpriteCache {
    SpriteCache::new_initialized(temp_dir.path().join("data")).expect("Failed to create cache")
}

/// Integration test: download, pre-render, cache hit, clear, re-render.
#[tokio::test]
async fn test_generate_flow_integration() {
    let archive_bytes = build_archive();
    // The second ensure_archive must be served from the cache
    let server = setup_archive_server(archive_bytes.clone(), 1).await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let cache = create_test_cache(&temp_dir);
    let client = create_test_client(&server);

    // ===== Step 1: Download the archive =====
    assert_eq!(cache.archive_status().unwrap(), ArchiveStatus::Missing);
    let archive_path = ensure_archive(&cache, &client)
        .await
        .expect("Archive download should succeed");
    assert_eq!(archive_path, cache.archive_path());
    assert_eq!(std::fs::read(&archive_path).unwrap(), archive_bytes);
    assert_eq!(cache.archive_status().unwrap(), ArchiveStatus::Valid);

    // ===== Step 2: Pre-render =====
    let options = GenerateOptions {
        styles: vec![RenderStyle::Small, RenderStyle::Dots],
        art: ArtOptions::default(),
    };
    let mut archive = SpriteArchive::open(&archive_path).expect("Archive should open");
    let report = generate_all(&cache, &mut archive, &options).expect("Pre-render should succeed");
    // 3 forms x 2 variants x 2 styles
    assert_eq!(
        report,
        GenerateReport {
            rendered: 12,
            existing: 0,
            skipped: 0
        }
    );
    assert_eq!(
        cache.forms().unwrap(),
        vec!["pikachu", "ampharos", "ampharos-mega"]
    );

    // ===== Step 3: Second run is a cache hit =====
    ensure_archive(&cache, &client)
        .await
        .expect("Cached archive should be reused");
    let report = generate_all(&cache, &mut archive, &options).unwrap();
    assert_eq!(report.rendered, 0);
    assert_eq!(report.existing, 12);

    let entries = cache.list_entries().unwrap();
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().all(|entry| entry.files == 3));

    // ===== Step 4: Clear art, render again from cached sprites =====
    let cached = cache
        .get_art(RenderStyle::Dots, Variant::Shiny, "ampharos-mega")
        .expect("Art should be cached");
    assert_eq!(cache.clear_art().unwrap(), 12);
    assert!(cache
        .get_art(RenderStyle::Dots, Variant::Shiny, "ampharos-mega")
        .is_none());
    assert_eq!(cache.archive_status().unwrap(), ArchiveStatus::Valid);

    let art = render_form(
        &cache,
        &mut archive,
        RenderStyle::Dots,
        Variant::Shiny,
        "ampharos-mega",
        &ArtOptions::default(),
    )
    .expect("On-demand render should succeed");
    assert_eq!(art, cached);
}

/// Test: a cached archive that no longer matches its checksum is downloaded again.
#[tokio::test]
async fn test_corrupt_archive_is_replaced() {
    let archive_bytes = build_archive();
    let server = setup_archive_server(archive_bytes.clone(), 1).await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let cache = create_test_cache(&temp_dir);
    let client = create_test_client(&server);

    std::fs::write(cache.archive_path(), &archive_bytes[..archive_bytes.len() / 2]).unwrap();
    cache.record_archive_checksum().unwrap();
    std::fs::write(cache.archive_path(), b"truncated").unwrap();
    assert_eq!(cache.archive_status().unwrap(), ArchiveStatus::Corrupt);

    ensure_archive(&cache, &client)
        .await
        .expect("Corrupt archive should be downloaded again");
    assert_eq!(std::fs::read(cache.archive_path()).unwrap(), archive_bytes);
    assert_eq!(cache.archive_status().unwrap(), ArchiveStatus::Valid);
}

/// Test: an archive without a checksum is accepted without a download.
#[tokio::test]
async fn test_unverified_archive_is_adopted() {
    let server = setup_archive_server(build_archive(), 0).await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let cache = create_test_cache(&temp_dir);
    let client = create_test_client(&server);

    std::fs::write(cache.archive_path(), build_archive()).unwrap();
    assert_eq!(cache.archive_status().unwrap(), ArchiveStatus::Unverified);

    ensure_archive(&cache, &client).await.unwrap();
    assert_eq!(cache.archive_status().unwrap(), ArchiveStatus::Valid);
}

/// Test: gateway errors are retried until the attempts run out.
#[tokio::test]
async fn test_download_retries_service_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ARCHIVE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let dest = temp_dir.path().join("sprites.zip");
    let client = create_test_client(&server);

    let result = client
        .download_with_retry_config(&dest, 3, Duration::from_millis(1), Duration::from_millis(5))
        .await;

    match result {
        Err(SpriteError::NetworkError { attempts, message }) => {
            assert_eq!(attempts, 3);
            assert!(message.contains("503"), "message: {}", message);
        }
        other => panic!("Expected NetworkError, got {:?}", other),
    }
    assert!(!dest.exists());
}

/// Test: a missing archive is not retried.
#[tokio::test]
async fn test_download_not_found_fails_immediately() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ARCHIVE_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let dest = temp_dir.path().join("sprites.zip");
    let client = create_test_client(&server);

    let result = client
        .download_with_retry_config(&dest, 3, Duration::from_millis(1), Duration::from_millis(5))
        .await;
    assert!(matches!(
        result,
        Err(SpriteError::Status { status: 404, .. })
    ));
    assert!(!dest.exists());
}

/// Test: a transient failure followed by success downloads the archive.
#[tokio::test]
async fn test_download_recovers_after_gateway_error() {
    let archive_bytes = build_archive();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ARCHIVE_PATH))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ARCHIVE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive_bytes.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let dest = temp_dir.path().join("nested").join("sprites.zip");
    let client = create_test_client(&server);

    let written = client
        .download_with_retry_config(&dest, 3, Duration::from_millis(1), Duration::from_millis(5))
        .await
        .expect("Second attempt should succeed");
    assert_eq!(written, archive_bytes.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), archive_bytes);
}
