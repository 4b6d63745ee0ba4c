//! Contract test against a real Chromium binary. Ignored by default.

use std::env;

use dom_adapter::{launch_page, BrowserSettings, DomPort};

fn contract_enabled() -> bool {
    env::var("FORMPILOT_CHROME_CONTRACT")
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

#[tokio::test]
#[ignore = "requires Chrome/Chromium; set FORMPILOT_CHROME_CONTRACT=1"]
async fn contract_fill_and_read_back() {
    if !contract_enabled() {
        eprintln!("skipping chromium contract test (FORMPILOT_CHROME_CONTRACT not enabled)");
        return;
    }

    let url = "data:text/html,<input id=q><select id=s><option>Red</option><option>Green</option></select>";
    let session = launch_page(&BrowserSettings::default(), url)
        .await
        .expect("launch chromium");
    let dom = session.dom();

    let input = dom
        .query_selector("#q")
        .await
        .expect("query")
        .expect("input present");
    dom.set_value(input, "hello").await.expect("set value");
    assert_eq!(dom.value(input).await.expect("value").as_deref(), Some("hello"));

    let select = dom
        .query_selector("#s")
        .await
        .expect("query")
        .expect("select present");
    let options = dom.select_options(select).await.expect("options");
    assert_eq!(options.len(), 2);
    dom.select_option(select, 1).await.expect("select");
    assert_eq!(dom.value(select).await.expect("value").as_deref(), Some("Green"));

    session.close().await;
}
