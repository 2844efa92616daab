mod support;

use std::fs;
use std::path::Path;
use std::sync::Arc;
use support::{DRIVER_BYTES, RecordingTransport, edge_zip, gecko_tar_gz, is_executable, utf16_le};
use tempfile::tempdir;
use webdriver_cache::{
    BrowserType, CacheKey, DriverErrorKind, DriverManager, DriverVersion, ManagerConfig, Platform,
};

const SPECIFIC_VERSION: &str = "101.0.1210.53";
const PLATFORMS: [&str; 4] = ["win32", "win64", "mac64", "linux64"];

fn edge_url(version: &str, platform: &str) -> String {
    format!("https://msedgedriver.azureedge.net/{version}/edgedriver_{platform}.zip")
}

fn edge_manager(cache_root: &Path, transport: Arc<RecordingTransport>) -> DriverManager {
    let config = ManagerConfig::new(cache_root);
    DriverManager::with_config(BrowserType::Edge, config)
        .unwrap()
        .with_transport(transport)
}

/// Every platform of the specific-version matrix installs an executable.
#[tokio::test]
async fn edge_with_specific_version() {
    for token in PLATFORMS {
        let temp = tempdir().unwrap();
        let platform = Platform::parse(token).unwrap();
        let transport = Arc::new(
            RecordingTransport::new().with_body(edge_url(SPECIFIC_VERSION, token), edge_zip(platform)),
        );

        let path = edge_manager(temp.path(), transport.clone())
            .with_version(SPECIFIC_VERSION)
            .with_platform(platform)
            .install()
            .await
            .unwrap();

        println!("{token}: installed to {}", path.display());
        assert!(path.is_absolute());
        assert!(path.exists());
        assert!(is_executable(&path));
        assert_eq!(fs::read(&path).unwrap(), DRIVER_BYTES);
        assert_eq!(transport.requests(), vec![edge_url(SPECIFIC_VERSION, token)]);
    }
}

/// Installing twice returns the same path and the second call stays offline.
#[tokio::test]
async fn can_get_edge_driver_from_cache() {
    for token in PLATFORMS {
        let temp = tempdir().unwrap();
        let platform = Platform::parse(token).unwrap();
        let transport = Arc::new(
            RecordingTransport::new().with_body(edge_url(SPECIFIC_VERSION, token), edge_zip(platform)),
        );

        let first = edge_manager(temp.path(), transport.clone())
            .with_version(SPECIFIC_VERSION)
            .with_platform(platform)
            .install()
            .await
            .unwrap();
        assert_eq!(transport.request_count(), 1);

        // A fresh manager, as a second process would have.
        let second = edge_manager(temp.path(), transport.clone())
            .with_version(SPECIFIC_VERSION)
            .with_platform(platform)
            .install()
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(transport.request_count(), 1, "second install must not hit the network");
        assert!(second.exists());
    }
}

#[tokio::test]
async fn edge_manager_with_wrong_version() {
    let temp = tempdir().unwrap();
    let transport = Arc::new(RecordingTransport::new());

    let err = edge_manager(temp.path(), transport.clone())
        .with_version("0.2")
        .with_platform(Platform::parse("win64").unwrap())
        .install()
        .await
        .unwrap_err();

    assert_eq!(err.kind(), DriverErrorKind::NoSuchDriver);
    assert_eq!(
        err.to_string(),
        "There is no such driver by url https://msedgedriver.azureedge.net/0.2/edgedriver_win64.zip"
    );
}

#[tokio::test]
async fn server_errors_are_not_reported_as_missing_drivers() {
    let temp = tempdir().unwrap();
    let url = edge_url(SPECIFIC_VERSION, "linux64");
    let transport = Arc::new(RecordingTransport::new().with_status(url, 503));

    let err = edge_manager(temp.path(), transport)
        .with_version(SPECIFIC_VERSION)
        .with_platform(Platform::LINUX64)
        .install()
        .await
        .unwrap_err();

    assert_eq!(err.kind(), DriverErrorKind::Download);
}

#[tokio::test]
async fn latest_version_is_resolved_then_cached() {
    let temp = tempdir().unwrap();
    let transport = Arc::new(
        RecordingTransport::new()
            .with_body(
                "https://msedgedriver.azureedge.net/LATEST_STABLE",
                utf16_le("141.0.3537.57\r\n"),
            )
            .with_body(edge_url("141.0.3537.57", "linux64"), edge_zip(Platform::LINUX64)),
    );
    let manager = edge_manager(temp.path(), transport.clone()).with_platform(Platform::LINUX64);

    let version = manager.resolve_version().await.unwrap();
    assert_eq!(version.normalized().split('.').count(), 3);

    let first = manager.install().await.unwrap();
    let second = manager.install().await.unwrap();

    assert_eq!(first, second);
    assert!(first.ends_with(Path::new("edge/linux64/141.0.3537.57/msedgedriver")));
    // Metadata is read on every call, the archive only once.
    let downloads = transport
        .requests()
        .into_iter()
        .filter(|url| url.ends_with(".zip"))
        .count();
    assert_eq!(downloads, 1);
}

#[tokio::test]
async fn archive_without_the_driver_is_an_extraction_error() {
    let temp = tempdir().unwrap();
    // A linux archive served for a windows request: no msedgedriver.exe inside.
    let transport = Arc::new(
        RecordingTransport::new().with_body(edge_url(SPECIFIC_VERSION, "win64"), edge_zip(Platform::LINUX64)),
    );
    let manager = edge_manager(temp.path(), transport)
        .with_version(SPECIFIC_VERSION)
        .with_platform(Platform::WIN64);

    let err = manager.install().await.unwrap_err();

    assert_eq!(err.kind(), DriverErrorKind::Extraction);
    assert!(manager.cache().entries().is_empty());
}

/// Bytes were fetched but the store never committed: the next lookup is a
/// miss and the next install downloads again.
#[tokio::test]
async fn interrupted_store_is_never_a_hit() {
    let temp = tempdir().unwrap();
    let platform = Platform::LINUX64;
    let transport = Arc::new(
        RecordingTransport::new().with_body(edge_url(SPECIFIC_VERSION, "linux64"), edge_zip(platform)),
    );
    let manager = edge_manager(temp.path(), transport.clone())
        .with_version(SPECIFIC_VERSION)
        .with_platform(platform);

    let key = CacheKey::new(
        BrowserType::Edge,
        platform,
        DriverVersion::parse(SPECIFIC_VERSION).unwrap(),
    );
    let cache = manager.cache();
    let dir = cache.entry_dir(&key);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(".staging-9f2c1a"), &DRIVER_BYTES[..5]).unwrap();
    fs::write(cache.binary_path(&key), &DRIVER_BYTES[..5]).unwrap();

    assert!(cache.lookup(&key).is_none());

    let path = manager.install().await.unwrap();

    assert_eq!(transport.request_count(), 1);
    assert_eq!(fs::read(&path).unwrap(), DRIVER_BYTES);
    assert!(cache.lookup(&key).is_some());
}

#[tokio::test]
async fn concurrent_managers_share_one_entry() {
    let temp = tempdir().unwrap();
    let platform = Platform::WIN64;
    let transport = Arc::new(
        RecordingTransport::new().with_body(edge_url(SPECIFIC_VERSION, "win64"), edge_zip(platform)),
    );
    let build = || {
        edge_manager(temp.path(), transport.clone())
            .with_version(SPECIFIC_VERSION)
            .with_platform(platform)
    };
    let (a, b) = (build(), build());

    let (first, second) = tokio::join!(a.install(), b.install());
    let (first, second) = (first.unwrap(), second.unwrap());

    assert_eq!(first, second);
    assert_eq!(fs::read(&first).unwrap(), DRIVER_BYTES);
    assert_eq!(a.cache().entries().len(), 1);
}

#[tokio::test]
async fn gecko_driver_from_tar_gz() {
    let temp = tempdir().unwrap();
    let url = "https://github.com/mozilla/geckodriver/releases/download/v0.36.0/geckodriver-v0.36.0-linux64.tar.gz";
    let transport = Arc::new(RecordingTransport::new().with_body(url, gecko_tar_gz()));
    let config = ManagerConfig::new(temp.path());

    let path = DriverManager::with_config(BrowserType::Firefox, config)
        .unwrap()
        .with_transport(transport.clone())
        .with_version("0.36.0")
        .with_platform(Platform::LINUX64)
        .install()
        .await
        .unwrap();

    assert!(path.ends_with(Path::new("firefox/linux64/0.36.0/geckodriver")));
    assert!(is_executable(&path));
    assert_eq!(transport.requests(), vec![url.to_string()]);
}
