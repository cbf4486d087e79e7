use handlebars::Handlebars;
use serde::Serialize;

use crate::error::SpecError;

pub const FORM_TEMPLATE: &str = "form";
pub const RESULTS_TEMPLATE: &str = "results";

const FORM_SOURCE: &str = r#"<form id="questions-form">
{{#each groups}}
<div class="question-group"{{#if gate}} data-dep-idx="{{gate.index}}" data-dep-val="{{gate.value}}"{{/if}}{{#unless visible}} style="display: none"{{/unless}}>
<label for="{{id}}">{{label}}</label>
{{#if bullets}}<ul class="question-bullets">{{#each bullets}}<li>{{this}}</li>{{/each}}</ul>
{{/if}}
{{#if yes_no}}<div class="yesno-group"><button type="button" class="yesno-btn yes-btn{{#if yes_no.yes}} selected{{/if}}">Yes</button><button type="button" class="yesno-btn no-btn{{#if yes_no.no}} selected{{/if}}">No</button><input type="hidden" id="{{id}}" name="{{id}}" value="{{yes_no.value}}"></div>
{{/if}}
{{#if select}}<select id="{{id}}" name="{{id}}">{{#each select.options}}<option value="{{value}}"{{#if selected}} selected{{/if}}>{{label}}</option>{{/each}}</select>
{{/if}}
{{#if field}}<input type="{{field.type}}" id="{{id}}" name="{{id}}"{{#if field.step}} step="{{field.step}}"{{/if}}{{#if field.placeholder}} placeholder="{{field.placeholder}}"{{/if}} value="{{field.value}}">
{{/if}}
{{#if list}}<div class="dynamic-list" id="{{id}}">{{#each list.rows}}<div class="dynamic-list-row"><input type="{{type}}"{{#if placeholder}} placeholder="{{placeholder}}"{{/if}} value="{{value}}"><button type="button" class="remove-btn">&times;</button></div>{{/each}}</div><button type="button" class="add-list-btn">{{list.add_label}}</button>
{{/if}}
{{#if note}}<p class="question-note">{{#each note}}{{#if href}}<a href="{{href}}" target="_blank">{{text}}</a>{{else}}{{text}}{{/if}}{{/each}}</p>
{{/if}}
</div>
{{/each}}
</form>
"#;

const RESULTS_SOURCE: &str = r#"<div id="results-container">
{{#unless items}}<p>No results available.</p>
{{/unless}}
{{#each items}}
{{#if is_cases}}{{#each cases}}<div class="result-item"><h3>{{case_name}}</h3><p class="{{#if eligible}}eligible{{else}}ineligible{{/if}}">{{verdict}}</p></div>
{{/each}}{{else}}<div class="result-message">{{message}}</div>
{{/if}}
{{/each}}
</div>
"#;

/// Handlebars registry holding the HTML views. Output is HTML-escaped.
pub struct TemplateEngine {
    registry: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> Result<Self, SpecError> {
        let mut registry = Handlebars::new();
        registry.register_template_string(FORM_TEMPLATE, FORM_SOURCE)?;
        registry.register_template_string(RESULTS_TEMPLATE, RESULTS_SOURCE)?;
        Ok(Self { registry })
    }

    pub fn render<T: Serialize>(&self, name: &str, view: &T) -> Result<String, SpecError> {
        Ok(self.registry.render(name, view)?)
    }
}
