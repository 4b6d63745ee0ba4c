//! Batch runner behaviour over an in-memory form.

use std::sync::Arc;
use std::time::Duration;

use action_flow::{parse_action_list, BatchRunner};
use action_primitives::{ActionOutcome, ExecutorTiming, SkipReason};
use dom_adapter::{Document, DomPort, MemoryDom};
use formpilot_core_types::RunId;
use serde_json::{json, Value};

/// Name field, newsletter checkbox (pre-checked), plan radios, colour select.
fn signup_form() -> MemoryDom {
    let mut doc = Document::new();
    let form = doc.append(doc.body(), "form", &[("id", "signup")]);
    doc.append(form, "input", &[("type", "text"), ("name", "full_name")]);
    doc.append(
        form,
        "input",
        &[("type", "checkbox"), ("id", "newsletter"), ("checked", "")],
    );
    doc.append(form, "input", &[("type", "radio"), ("name", "plan"), ("id", "plan-free")]);
    doc.append(form, "input", &[("type", "radio"), ("name", "plan"), ("id", "plan-pro")]);
    let select = doc.append(form, "select", &[("id", "color")]);
    for color in ["Red", "Green"] {
        let option = doc.append(select, "option", &[("value", color)]);
        doc.set_text(option, color);
    }
    MemoryDom::new(doc)
}

fn mixed_batch() -> Vec<Value> {
    vec![
        json!({ "type": "fillText", "selector": "input[name=full_name]", "value": "Ada" }),
        json!({ "action_type": "select_checkbox", "cssSelector": "#newsletter", "answer": "1" }),
        json!({ "actionType": "selectRadio", "target": "#plan-pro" }),
        json!({ "type": "selectDropdown", "selector": "#color", "value": "Blue" }),
        json!({ "type": "fillText", "field_selector": "#missing", "text": "x" }),
        json!({ "type": "fillText", "selector": "input[name=full_name]" }),
        json!({ "selector": "#color" }),
        json!({ "type": "selectDropdown", "selector": "#color", "value": "Green" }),
    ]
}

fn runner(dom: &MemoryDom) -> BatchRunner {
    BatchRunner::for_dom(Arc::new(dom.clone()), ExecutorTiming::immediate())
}

#[tokio::test]
async fn every_entry_yields_one_result_in_order() {
    let dom = signup_form();
    let batch = mixed_batch();
    let summary = runner(&dom).run(&batch).await;

    assert_eq!(summary.results.len(), batch.len());
    for (index, result) in summary.results.iter().enumerate() {
        assert_eq!(result.index, index);
        assert_eq!(result.action, batch[index]);
    }
    assert_eq!(
        summary.success_count + summary.fail_count + summary.skip_count,
        batch.len()
    );

    let outcomes: Vec<&ActionOutcome> = summary.results.iter().map(|r| &r.outcome).collect();
    assert_eq!(outcomes[0], &ActionOutcome::Success);
    assert_eq!(outcomes[1], &ActionOutcome::Skipped(SkipReason::AlreadyInState));
    assert_eq!(outcomes[2], &ActionOutcome::Success);
    assert_eq!(outcomes[3], &ActionOutcome::Failed("option not found: Blue".into()));
    assert_eq!(outcomes[4], &ActionOutcome::Failed("element not found: #missing".into()));
    assert_eq!(outcomes[5], &ActionOutcome::Skipped(SkipReason::ValueMissing));
    assert!(outcomes[6].is_failed());
    assert_eq!(outcomes[7], &ActionOutcome::Success);

    assert_eq!(
        (summary.success_count, summary.fail_count, summary.skip_count),
        (3, 3, 2)
    );
    assert!(!summary.success());
}

#[tokio::test]
async fn failures_do_not_stop_later_entries() {
    let dom = signup_form();
    let summary = runner(&dom).run(&mixed_batch()).await;
    assert!(summary.results.last().unwrap().outcome.is_success());

    let name = dom.query_selector("input[name=full_name]").await.unwrap().unwrap();
    let color = dom.query_selector("#color").await.unwrap().unwrap();
    let pro = dom.query_selector("#plan-pro").await.unwrap().unwrap();
    assert_eq!(dom.value(name).await.unwrap().as_deref(), Some("Ada"));
    assert_eq!(dom.value(color).await.unwrap().as_deref(), Some("Green"));
    assert_eq!(dom.checked(pro).await.unwrap(), Some(true));
}

#[tokio::test]
async fn skips_alone_keep_the_batch_successful() {
    let dom = signup_form();
    let batch = vec![
        json!({ "type": "selectCheckbox", "selector": "#newsletter", "value": 1 }),
        json!({ "type": "selectDropdown", "selector": "#color" }),
    ];
    let summary = runner(&dom).run(&batch).await;
    assert_eq!(summary.skip_count, 2);
    assert!(summary.success());

    let report = summary.to_report();
    assert!(report.success);
    assert_eq!(report.results[1].message.as_deref(), Some("value missing"));
}

#[tokio::test]
async fn same_batch_on_fresh_dom_is_deterministic() {
    let batch = mixed_batch();
    let first = runner(&signup_form()).run(&batch).await;
    let second = runner(&signup_form()).run(&batch).await;

    assert_eq!(
        (first.success_count, first.fail_count, first.skip_count),
        (second.success_count, second.fail_count, second.skip_count)
    );
    let outcomes = |s: &action_flow::BatchSummary| {
        s.results.iter().map(|r| r.outcome.clone()).collect::<Vec<_>>()
    };
    assert_eq!(outcomes(&first), outcomes(&second));
}

#[tokio::test]
async fn action_ids_follow_the_run() {
    let dom = signup_form();
    let run_id = RunId("batch-7".into());
    let summary = runner(&dom)
        .run_with_id(run_id.clone(), &[json!({ "type": "click", "selector": "#plan-free" })])
        .await;
    assert_eq!(summary.run_id, run_id);
    assert_eq!(summary.success_count, 1);
}

#[tokio::test(start_paused = true)]
async fn entries_are_paced() {
    let dom = signup_form();
    let timing = ExecutorTiming {
        inter_action_delay_ms: 250,
        ..ExecutorTiming::immediate()
    };
    let runner = BatchRunner::for_dom(Arc::new(dom), timing);
    assert_eq!(runner.inter_action_delay(), Duration::from_millis(250));

    let batch = vec![
        json!({ "type": "click", "selector": "#plan-free" }),
        json!({ "type": "click", "selector": "#nope" }),
        json!({ "type": "click", "selector": "#plan-pro" }),
    ];
    let start = tokio::time::Instant::now();
    let summary = runner.run(&batch).await;
    assert_eq!(summary.results.len(), 3);
    assert!(start.elapsed() >= Duration::from_millis(500));
}

#[tokio::test]
async fn backend_response_object_is_accepted() {
    let dom = signup_form();
    let entries = parse_action_list(
        r##"{ "actions": [
            { "type": "FILL_TEXT", "selector": "input[name=full_name]", "value": "Grace" },
            { "type": "selectDropdown", "selector": "#color", "value": "Green" }
        ] }"##,
    )
    .unwrap();
    let summary = runner(&dom).run(&entries).await;
    assert!(summary.success());
    assert_eq!(summary.success_count, 2);
}
