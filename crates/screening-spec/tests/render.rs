use serde_json::{Value, json};

use screening_spec::{
    FormEvent, FormState, QuestionBatch, TemplateEngine, Toggle, build_render_payload,
    render_html, render_json_ui, render_results_html, render_results_text, render_text,
    results_from_raw,
};

fn fixture(name: &str) -> &'static str {
    match name {
        "prelim_batch" => include_str!("../tests/fixtures/prelim_batch.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn prelim_form() -> FormState {
    let value: Value = serde_json::from_str(fixture("prelim_batch")).expect("json");
    let batch = QuestionBatch::from_json(value).expect("batch");
    FormState::from_descriptors(&batch.descriptors().expect("descriptors"))
}

#[test]
fn render_json_ui_exposes_every_group() {
    let form = prelim_form();
    let payload = build_render_payload(&form, Some("Preliminary Questions"));
    let ui = render_json_ui(&payload);

    assert_eq!(ui["total"], 9);
    assert_eq!(ui["visible"], 8);
    let groups = ui["groups"].as_array().expect("groups");
    assert_eq!(groups.len(), 9);
    for (index, group) in groups.iter().enumerate() {
        assert_eq!(group["id"], format!("q-{}", index));
    }
    assert_eq!(groups[0]["label"], "Does the client have any of the following?");
    assert_eq!(groups[0]["bullets"][1], "- a sentence being served out of state");
    assert_eq!(groups[2]["select"]["options"][2]["label"], "Arrest only");
    assert_eq!(groups[2]["select"]["options"][2]["value"], "2");
    assert_eq!(groups[4]["gate"], json!({ "index": 3, "value": "yes" }));
    assert_eq!(groups[4]["visible"], false);
    assert_eq!(groups[7]["field"]["step"], "0.01");
    assert_eq!(groups[5]["list"]["rows"].as_array().map(Vec::len), Some(1));
}

#[test]
fn note_links_pair_by_position() {
    let form = prelim_form();
    let ui = render_json_ui(&build_render_payload(&form, None));
    let note = ui["groups"][1]["note"].as_array().expect("note");
    assert_eq!(note[1], json!({ "text": "OSCN", "href": "https://www.oscn.net" }));
    assert_eq!(note[3], json!({ "text": "ODCR", "href": "#" }));
}

#[test]
fn render_text_skips_hidden_groups_until_gate_opens() {
    let mut form = prelim_form();
    let text = render_text(&build_render_payload(&form, Some("Preliminary Questions")));
    assert!(text.contains("== Preliminary Questions =="));
    assert!(text.contains("   2) Arrest only"));
    assert!(!text.contains("Date of dismissal"));

    form.dispatch(FormEvent::Toggle {
        index: 3,
        choice: Toggle::Yes,
    })
    .expect("toggle");
    let text = render_text(&build_render_payload(&form, None));
    assert!(text.contains("5. Date of dismissal"));
    assert!(text.contains("   = yes"));
}

#[test]
fn render_html_escapes_and_marks_hidden_groups() {
    let engine = TemplateEngine::new().expect("templates");
    let mut form = prelim_form();
    form.dispatch(FormEvent::Toggle {
        index: 0,
        choice: Toggle::No,
    })
    .expect("toggle");
    let html = render_html(&engine, &build_render_payload(&form, None)).expect("html");

    assert!(html.contains(r#"<form id="questions-form">"#));
    assert!(html.contains(r#"data-dep-idx="3""#));
    assert!(html.contains(r#"style="display: none""#));
    assert!(html.contains(r#"class="yesno-btn no-btn selected""#));
    assert!(html.contains(r#"<a href="https://www.oscn.net" target="_blank">OSCN</a>"#));
    assert!(html.contains("+ Add date"));
}

#[test]
fn results_render_verdict_classes() {
    let raw = serde_json::from_value(json!([
        { "type": "cases", "data": {
            "CM-2015-3": "Expungeable under section 18",
            "CF-2019-1": "Not expungeable"
        } },
        { "type": "message", "data": "Review <manually>" }
    ]))
    .expect("results");
    let items = results_from_raw(raw);
    let engine = TemplateEngine::new().expect("templates");
    let html = render_results_html(&engine, &items).expect("html");

    assert!(html.contains(r#"<p class="eligible">Expungeable under section 18</p>"#));
    assert!(html.contains(r#"<p class="ineligible">Not expungeable</p>"#));
    assert!(html.contains("Review &lt;manually&gt;"));

    let text = render_results_text(&items);
    assert!(text.contains("CM-2015-3 [eligible]"));
    assert!(text.contains("CF-2019-1 [ineligible]"));
}

#[test]
fn empty_results_say_so() {
    let engine = TemplateEngine::new().expect("templates");
    assert_eq!(render_results_text(&[]), "No results available.");
    let html = render_results_html(&engine, &[]).expect("html");
    assert!(html.contains("No results available."));
}
