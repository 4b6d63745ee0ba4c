//! Built-in sample form and action list for `formpilot demo`.
//!
//! The form mixes every control family the engine understands, including
//! widgets that only react to clicks or to the space key the way component
//! libraries do.

use dom_adapter::{Document, EditorAttachment, EventKind, MemoryDom};
use serde_json::{json, Value};

pub fn demo_form() -> MemoryDom {
    let mut doc = Document::new();
    let form = doc.append(doc.body(), "form", &[("id", "application")]);

    // Plain fields
    let group = doc.append(form, "div", &[("class", "form-group")]);
    doc.append(group, "input", &[("type", "text"), ("name", "full_name")]);
    doc.append(form, "input", &[("type", "email"), ("name", "email")]);
    doc.append(form, "textarea", &[("name", "motivation")]);
    doc.append(
        form,
        "div",
        &[("id", "bio"), ("contenteditable", "true"), ("role", "textbox")],
    );

    // Code sample in an Ace editor
    let ace = doc.append(form, "div", &[("id", "snippet"), ("class", "ace_editor")]);
    doc.append(ace, "textarea", &[("class", "ace_text-input")]);
    doc.attach_editor(ace, EditorAttachment::EnvEditor);

    // Native toggles
    doc.append(
        form,
        "input",
        &[("type", "checkbox"), ("id", "terms"), ("checked", "")],
    );
    doc.append(
        form,
        "input",
        &[("type", "radio"), ("name", "level"), ("id", "level-junior"), ("value", "junior")],
    );
    doc.append(
        form,
        "input",
        &[("type", "radio"), ("name", "level"), ("id", "level-senior"), ("value", "senior")],
    );

    // ARIA toggles: one reacts to clicks, one only to the space key
    let remote = doc.append(
        form,
        "div",
        &[("role", "checkbox"), ("aria-checked", "false"), ("id", "remote")],
    );
    doc.on(remote, "click", |doc, ev| {
        let next = if doc.attribute(ev.target, "aria-checked").as_deref() == Some("true") {
            "false"
        } else {
            "true"
        };
        doc.set_attribute(ev.target, "aria-checked", next);
    });
    let relocate = doc.append(
        form,
        "div",
        &[("role", "radio"), ("aria-checked", "false"), ("id", "relocate-yes")],
    );
    doc.on(relocate, "keydown", |doc, ev| {
        if ev.kind == EventKind::key_down(" ") {
            doc.set_attribute(ev.target, "aria-checked", "true");
        }
    });

    // Native select
    let country = doc.append(form, "select", &[("name", "country")]);
    for (value, text) in [("", "Choose..."), ("de", "Germany"), ("fr", "France")] {
        let option = doc.append(country, "option", &[("value", value)]);
        doc.set_text(option, text);
    }

    // ARIA listbox rendered into a popup
    let start = doc.append(form, "div", &[("role", "combobox"), ("id", "start-date")]);
    let popup = doc.append(doc.body(), "ul", &[("class", "popup")]);
    for (value, text) in [("now", "Immediately"), ("1m", "In one month")] {
        let option = doc.append(popup, "li", &[("role", "option"), ("data-value", value)]);
        doc.set_text(option, text);
    }
    doc.on(popup, "click", move |doc, ev| {
        let picked = doc.text(ev.target);
        doc.set_attribute(start, "aria-label", &picked);
    });

    doc.append(form, "button", &[("type", "submit")]);

    MemoryDom::new(doc)
}

/// Actions as the analysis backend would send them, synonyms included.
pub fn demo_actions() -> Vec<Value> {
    vec![
        json!({ "type": "fillText", "selector": ".form-group", "value": "Ada Lovelace" }),
        json!({ "action_type": "fill_text", "cssSelector": "input[name=email]", "answer": "ada@example.org" }),
        json!({ "type": "fillText", "selector": "textarea[name=motivation]", "value": "Engines." }),
        json!({ "type": "fillText", "selector": "#bio", "text": "Mathematician" }),
        json!({ "type": "fillText", "selector": "#snippet", "value": "fn main() {}" }),
        json!({ "type": "selectCheckbox", "selector": "#terms", "value": true }),
        json!({ "actionType": "selectRadio", "target": "#level-senior" }),
        json!({ "type": "selectCheckbox", "selector": "#remote", "value": "true" }),
        json!({ "type": "selectRadio", "selector": "#relocate-yes" }),
        json!({ "type": "selectDropdown", "selector": "select[name=country]", "value": "France" }),
        json!({ "type": "selectDropdown", "field_selector": "#start-date", "value": "1m" }),
        json!({ "type": "selectDropdown", "selector": "select[name=country]" }),
        json!({ "type": "click", "selector": "button[type=submit]" }),
    ]
}
