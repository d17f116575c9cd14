//! Model identification from captured pages.

use std::path::PathBuf;
use surfer::modem::{s33, sb6121, ModemConfig};
use surfer::{CancellationToken, Error, Registry};

fn testdata(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join(name)
}

async fn identify(fixture: &str) -> surfer::Result<Box<dyn surfer::Modem>> {
    let config = ModemConfig {
        fixture: Some(testdata(fixture)),
        ..Default::default()
    };
    Registry::with_builtin_models()
        .identify(&config, &CancellationToken::new())
        .await
}

#[tokio::test]
async fn test_each_fixture_identifies_as_its_model() {
    for (fixture, model) in [
        ("S33-id.html", "S33"),
        ("S33-signal.json", "S33"),
        ("SB6121-signal.html", "SB6121"),
    ] {
        let found = identify(fixture).await.unwrap();
        assert_eq!(found.name(), model, "{}", fixture);
    }
}

#[test]
fn test_probes_are_exclusive() {
    for fixture in ["S33-id.html", "S33-signal.json", "SB6121-signal.html"] {
        let content = std::fs::read(testdata(fixture)).unwrap();
        let matches = [s33::probe(&content), sb6121::probe(&content)]
            .iter()
            .filter(|m| **m)
            .count();
        assert_eq!(matches, 1, "{}", fixture);
    }
}

#[tokio::test]
async fn test_fixture_status_end_to_end() {
    let modem = identify("SB6121-signal.html").await.unwrap();
    let signal = modem.status(&CancellationToken::new()).await.unwrap();

    let json = serde_json::to_value(&signal).unwrap();
    assert_eq!(json["downstream"]["5"]["snr"], 38.0);
    assert_eq!(json["upstream"]["1"]["symbol_rate"], 2_560_000.0);
}

#[tokio::test]
async fn test_unrecognized_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("router.html");
    std::fs::write(&path, "<html><title>Router</title></html>").unwrap();

    let config = ModemConfig {
        fixture: Some(path),
        ..Default::default()
    };
    let result = Registry::with_builtin_models()
        .identify(&config, &CancellationToken::new())
        .await;
    assert!(matches!(result, Err(Error::NoMatch)));
}

#[tokio::test]
async fn test_unreachable_modem_is_no_match() {
    let config = ModemConfig {
        base_url: "http://127.0.0.1:9".into(),
        timeout: std::time::Duration::from_secs(2),
        ..Default::default()
    };
    let result = Registry::with_builtin_models()
        .identify(&config, &CancellationToken::new())
        .await;
    assert!(matches!(result, Err(Error::NoMatch)));
}
