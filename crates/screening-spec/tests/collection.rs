use serde_json::{Value, json};

use screening_spec::{
    CollectError, FormEvent, FormState, QuestionBatch, QuestionDescriptor, Toggle, batch_schema,
    collect_answers, next_page,
};

fn prelim() -> (Vec<QuestionDescriptor>, FormState, Vec<String>) {
    let value: Value =
        serde_json::from_str(include_str!("fixtures/prelim_batch.json")).expect("json");
    let batch = QuestionBatch::from_json(value).expect("batch");
    let descriptors = batch.descriptors().expect("descriptors");
    let form = FormState::from_descriptors(&descriptors);
    (descriptors, form, batch.filenames)
}

fn answer_required(form: &mut FormState) {
    let events = [
        FormEvent::Toggle {
            index: 0,
            choice: Toggle::No,
        },
        FormEvent::Input {
            index: 1,
            value: "2".into(),
        },
        FormEvent::Input {
            index: 2,
            value: "1".into(),
        },
        FormEvent::Toggle {
            index: 3,
            choice: Toggle::Yes,
        },
        FormEvent::Input {
            index: 4,
            value: "2021-11-30".into(),
        },
        FormEvent::RowInput {
            index: 5,
            row: 0,
            value: "2019-06-01".into(),
        },
        FormEvent::Input {
            index: 8,
            value: "Tulsa Police Department".into(),
        },
    ];
    for event in events {
        form.dispatch(event).expect("event");
    }
}

#[test]
fn full_batch_collects_positionally() {
    let (descriptors, mut form, filenames) = prelim();
    answer_required(&mut form);

    let answers = collect_answers(&descriptors, &form).expect("answers");
    assert_eq!(answers.len(), descriptors.len());
    assert_eq!(
        answers,
        vec![
            json!("no"),
            json!("2"),
            json!("1"),
            json!("yes"),
            json!("11-30-2021"),
            json!("06-01-2019"),
            json!([]),
            json!(0),
            json!("Tulsa Police Department"),
        ]
    );
    assert_eq!(next_page(&filenames).map(|page| page.document()), Some("prelim.html"));
}

#[test]
fn closing_a_gate_sends_default_again() {
    let (descriptors, mut form, _) = prelim();
    answer_required(&mut form);
    form.dispatch(FormEvent::Toggle {
        index: 3,
        choice: Toggle::No,
    })
    .expect("toggle");

    let answers = collect_answers(&descriptors, &form).expect("answers");
    assert_eq!(answers[4], json!(""));
}

#[test]
fn unanswered_boolean_blocks_submission() {
    let (descriptors, mut form, _) = prelim();
    form.dispatch(FormEvent::Input {
        index: 1,
        value: "1".into(),
    })
    .expect("input");
    assert_eq!(
        collect_answers(&descriptors, &form),
        Err(CollectError::Incomplete { index: 0 })
    );
}

#[test]
fn schema_describes_wire_batch() {
    let schema = batch_schema();
    let props = schema
        .pointer("/properties")
        .and_then(Value::as_object)
        .expect("properties");
    assert!(props.contains_key("questions"));
    assert!(props.contains_key("filenames"));
}
