//! Integration tests: loading entity documents onto a page
//!
//! Covers the full fetch → validate → plan → apply path against files and a
//! local HTTP server.

use entity_sheet::fetch::Fetcher;
use entity_sheet::view::{Anchor, Page, PageSurface, ViewNode};
use entity_sheet::{EntityRenderer, LoadOptions, RenderResult, RendererConfig};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const DRAKE: &str = r#"{
    "meta": { "entity": "Drake", "humanName": "Ash Drake", "portrait": "img/drake.png" },
    "lore": "Sleeps under the old mine.",
    "stats": { "maxHealth": 120, "speed": 9, "hidden": 3 },
    "statsOrder": ["maxHealth", "speed", "unknown"],
    "attacks": [
        { "group": "Melee", "items": [
            { "name": "Bite", "desc": "A quick bite", "damage": 12, "energyCost": 3 },
            { "name": "Roar", "desc": "Scares the weak" }
        ] },
        { "group": "Breath", "items": [ { "name": "Flame", "damage": 30 } ] }
    ],
    "abilities": [
        { "name": "Regrow", "desc": "Heals over time", "effects": { "healthPercent": 10 }, "energyCost": 5 },
        { "name": "Focus", "energyCost": 4 }
    ]
}"#;

const IMP: &str = r#"{
    "meta": { "entity": "Imp" },
    "stats": { "speed": 14 },
    "statsOrder": ["speed"],
    "attacks": [ { "group": "Tricks", "items": [ { "name": "Poke" } ] } ]
}"#;

fn fixture_dir(name: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "entity-sheet-it-{}-{}",
        name,
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    for (file, body) in files {
        std::fs::write(dir.join(file), body).unwrap();
    }
    dir
}

fn renderer_in(dir: &PathBuf) -> EntityRenderer {
    EntityRenderer::with_fetcher(RendererConfig::default(), Fetcher::with_base_dir(dir))
}

fn stat_rows(page: &Page) -> Vec<String> {
    page.children(Anchor::StatsList)
        .iter()
        .map(|row| {
            format!(
                "{}: {}",
                row.children[0].text_content(),
                row.children[1].text_content()
            )
        })
        .collect()
}

fn class_texts(nodes: &[ViewNode], class: &str) -> Vec<String> {
    let mut found = Vec::new();
    for node in nodes {
        node.find_by_class(class, &mut found);
    }
    found.iter().map(|n| n.text_content()).collect()
}

/// Serve one canned HTTP response per connection, forever
async fn serve(status_line: &'static str, body: &'static str) -> String {
    serve_recording(status_line, body).await.0
}

/// Like [`serve`], also recording each request head (lowercased)
async fn serve_recording(
    status_line: &'static str,
    body: &'static str,
) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut head = Vec::new();
            let mut buf = [0_u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => head.extend_from_slice(&buf[..n]),
                }
            }
            recorded
                .lock()
                .unwrap()
                .push(String::from_utf8_lossy(&head).to_lowercase());
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    (format!("http://{}/entity.json", addr), requests)
}

#[tokio::test]
async fn test_full_render() {
    let dir = fixture_dir("full", &[("drake.json", DRAKE)]);
    let mut renderer = renderer_in(&dir);
    let mut page = Page::standard(Some("drake.json"));

    let result = renderer
        .load(&mut page, Some("drake.json"), LoadOptions::default())
        .await;
    assert!(result.is_loaded());

    assert_eq!(page.text(Anchor::Title), Some("Drake"));
    assert_eq!(page.text(Anchor::Subtitle), Some("Ash Drake"));
    assert_eq!(page.attribute(Anchor::Portrait, "src"), Some("img/drake.png"));
    assert_eq!(page.document_title, "Drake — Ash Drake");
    assert_eq!(page.text(Anchor::Lore), Some("Sleeps under the old mine."));

    assert_eq!(stat_rows(&page), vec!["Max Health: 120", "Speed: 9"]);

    let columns = page.children(Anchor::AttacksGrid);
    assert_eq!(columns.len(), 2);
    assert_eq!(class_texts(columns, "attack-group-title"), vec!["Melee", "Breath"]);
    assert_eq!(class_texts(columns, "dmg"), vec!["Danno: 12", "Danno: 30"]);
    assert_eq!(class_texts(columns, "cost"), vec!["Energia: 3"]);

    let abilities = page.children(Anchor::AbilitiesWrap);
    assert_eq!(abilities[0].text_content(), "Other Abilities");
    assert_eq!(class_texts(abilities, "dmg"), vec!["Health: +10%"]);
    assert_eq!(class_texts(abilities, "cost"), vec!["Energia: 4"]);
}

#[tokio::test]
async fn test_attack_without_numbers_renders_name_only() {
    let dir = fixture_dir("roar", &[("drake.json", DRAKE)]);
    let mut renderer = renderer_in(&dir);
    let mut page = Page::standard(None);
    renderer
        .load(&mut page, Some("drake.json"), LoadOptions::default())
        .await;

    let melee = &page.children(Anchor::AttacksGrid)[0];
    let roar = &melee.children[2];
    assert_eq!(roar.text_content(), "RoarScares the weak");
    let numbers = &roar.children[1];
    assert!(numbers.has_class("numbers"));
    assert!(numbers.children.is_empty());
}

#[tokio::test]
async fn test_reload_replaces_regions() {
    let dir = fixture_dir("reload", &[("drake.json", DRAKE), ("imp.json", IMP)]);
    let mut renderer = renderer_in(&dir);
    let mut page = Page::standard(None);

    renderer
        .load(&mut page, Some("drake.json"), LoadOptions::default())
        .await;
    renderer
        .load(&mut page, Some("imp.json"), LoadOptions::default())
        .await;

    assert_eq!(stat_rows(&page), vec!["Speed: 14"]);
    assert_eq!(page.children(Anchor::AttacksGrid).len(), 1);
    assert!(page.children(Anchor::AbilitiesWrap).is_empty());
    // meta is overwritten, lore reset
    assert_eq!(page.text(Anchor::Title), Some("Imp"));
    assert_eq!(page.text(Anchor::Subtitle), Some(""));
    assert_eq!(page.text(Anchor::Lore), Some(""));
    assert_eq!(page.document_title, "Imp —");
}

#[tokio::test]
async fn test_missing_anchors_tolerated() {
    let dir = fixture_dir("partial", &[("drake.json", DRAKE)]);
    let mut renderer = renderer_in(&dir);
    let mut page = Page::new().with_anchor(Anchor::StatsList);

    let result = renderer
        .load(&mut page, Some("drake.json"), LoadOptions::default())
        .await;
    assert!(result.is_loaded());
    assert_eq!(stat_rows(&page), vec!["Max Health: 120", "Speed: 9"]);
    assert_eq!(page.text(Anchor::Lore), None);
}

#[tokio::test]
async fn test_http_error_status_is_failure_without_mutation() {
    let url = serve("404 Not Found", "{}").await;
    let mut renderer = EntityRenderer::default();

    let mut page = Page::standard(None);
    page.apply(&entity_sheet::view::ViewPatch::Append {
        anchor: Anchor::StatsList,
        node: ViewNode::div("stat").with_text("stale"),
    });

    let result = renderer
        .load(&mut page, Some(&url), LoadOptions::default())
        .await;
    match &result {
        RenderResult::Failed(err) => {
            assert!(err.is_fetch());
            assert!(err.to_string().contains("404 Not Found"));
        }
        RenderResult::Loaded(_) => panic!("expected failure"),
    }
    assert_eq!(page.children(Anchor::StatsList).len(), 1);
    assert_eq!(page.document_title, "Entity");
}

#[tokio::test]
async fn test_http_success() {
    let url = serve("200 OK", IMP).await;
    let mut renderer = EntityRenderer::default();
    let mut page = Page::standard(None);

    let result = renderer
        .load(&mut page, Some(&url), LoadOptions::default())
        .await;
    assert!(result.is_loaded());
    assert_eq!(stat_rows(&page), vec!["Speed: 14"]);
}

#[tokio::test]
async fn test_invalid_json_is_fetch_error() {
    let url = serve("200 OK", "<html>not json</html>").await;
    let mut renderer = EntityRenderer::default();
    let mut page = Page::standard(None);

    let result = renderer
        .load(&mut page, Some(&url), LoadOptions::default())
        .await;
    assert!(result.error().unwrap().is_fetch());
}

#[tokio::test]
async fn test_cache_bypass_headers_and_reuse() {
    let (url, requests) = serve_recording("200 OK", IMP).await;
    let mut renderer = EntityRenderer::default();
    let mut page = Page::standard(None);
    let bypass = LoadOptions {
        bypass_cache: true,
        ..LoadOptions::default()
    };
    let cached = LoadOptions {
        bypass_cache: false,
        ..LoadOptions::default()
    };

    assert!(renderer.load(&mut page, Some(&url), bypass).await.is_loaded());
    {
        let heads = requests.lock().unwrap();
        assert_eq!(heads.len(), 1);
        assert!(heads[0].contains("cache-control: no-store"));
    }

    assert!(renderer.load(&mut page, Some(&url), cached).await.is_loaded());
    assert!(renderer.load(&mut page, Some(&url), cached).await.is_loaded());

    let heads = requests.lock().unwrap();
    assert_eq!(heads.len(), 2);
    assert!(!heads[1].contains("cache-control"));
    assert_eq!(stat_rows(&page), vec!["Speed: 14"]);
}
