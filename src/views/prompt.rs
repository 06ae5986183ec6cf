use crate::autocomplete::{
    AutocompleteController, AutocompleteMode, KeyOutcome, LookupRequest, Suggestions,
    byte_to_utf16_offset, highlight_segments, utf16_to_byte_offset,
};
use crate::lookup::Directory;
use crate::types::{Person, SearchResult};
use crate::ui::{ChatServices, key_press};
use dioxus::events::Key as DomKey;
use dioxus::prelude::*;
use std::sync::Arc;

const INPUT_ID: &str = "prompt-input";
const READ_CARET_JS: &str = r#"
const el = document.getElementById("prompt-input");
return el ? el.selectionStart : null;
"#;

#[derive(Clone, Debug, PartialEq)]
enum Popover {
    Search(Vec<SearchResult>),
    People(Vec<Person>),
}

/// Run a lookup and feed the answer back under the query it was issued for.
fn run_lookup(
    autocomplete: Signal<AutocompleteController>,
    directory: Arc<dyn Directory>,
    request: Option<LookupRequest>,
) {
    let Some(request) = request else {
        return;
    };
    let mut autocomplete = autocomplete;
    spawn(async move {
        match request {
            LookupRequest::Search(query) => {
                let q = query.q.clone();
                let results = directory.search(query).await.unwrap_or_else(|err| {
                    tracing::warn!(%err, "search lookup failed");
                    Vec::new()
                });
                autocomplete.write().apply_search_results(&q, results);
            }
            LookupRequest::People(query) => {
                let q = query.q.clone();
                let people = directory.people(query).await.unwrap_or_else(|err| {
                    tracing::warn!(%err, "people lookup failed");
                    Vec::new()
                });
                autocomplete.write().apply_people_results(&q, people);
            }
        }
    });
}

/// Pick up the browser's caret position, which may differ from the end of
/// the text after clicks or arrow keys.
fn sync_caret(autocomplete: Signal<AutocompleteController>, directory: Arc<dyn Directory>) {
    let mut autocomplete = autocomplete;
    spawn(async move {
        let Ok(Some(utf16)) = document::eval(READ_CARET_JS).join::<Option<usize>>().await else {
            return;
        };
        let lookup = {
            let mut controller = autocomplete.write();
            let cursor = utf16_to_byte_offset(controller.text(), utf16);
            if cursor == controller.cursor() {
                None
            } else {
                controller.set_cursor(cursor)
            }
        };
        run_lookup(autocomplete, directory, lookup);
    });
}

/// Move the browser caret to the controller's cursor once the new value has
/// been rendered.
fn place_caret(autocomplete: Signal<AutocompleteController>) {
    let caret = {
        let controller = autocomplete.peek();
        byte_to_utf16_offset(controller.text(), controller.cursor())
    };
    let _ = document::eval(&format!(
        "setTimeout(() => {{ const el = document.getElementById(\"{INPUT_ID}\"); \
         if (el) {{ el.focus(); el.setSelectionRange({caret}, {caret}); }} }}, 0);"
    ));
}

fn highlighted(text: &str, query: &str) -> Element {
    rsx! {
        for (segment, hit) in highlight_segments(text, query) {
            if hit {
                strong { "{segment}" }
            } else {
                span { "{segment}" }
            }
        }
    }
}

#[component]
pub fn PromptInput(disabled: bool, on_send: EventHandler<String>) -> Element {
    let services = use_context::<ChatServices>();
    let mut autocomplete = use_signal(AutocompleteController::new);

    let (text, popover, selected, query) = {
        let controller = autocomplete.read();
        let popover = match controller.suggestions() {
            Suggestions::Hidden => None,
            Suggestions::Search(results) => Some(Popover::Search(results.to_vec())),
            Suggestions::People(people) => Some(Popover::People(people.to_vec())),
        };
        let query = match controller.mode() {
            AutocompleteMode::Idle => String::new(),
            AutocompleteMode::Searching { query } | AutocompleteMode::Mentioning { query, .. } => {
                query.clone()
            }
        };
        (controller.text().to_string(), popover, controller.selected(), query)
    };
    let can_send = !disabled && !text.trim().is_empty();

    let directory = services.directory.clone();
    let on_input = move |ev: FormEvent| {
        let value = ev.value();
        let end = value.len();
        let lookup = autocomplete.write().set_input(value, end);
        run_lookup(autocomplete, directory.clone(), lookup);
        sync_caret(autocomplete, directory.clone());
    };

    let directory = services.directory.clone();
    let on_keydown = move |ev: KeyboardEvent| {
        let press = key_press(&ev);
        let outcome = {
            let mut controller = autocomplete.write();
            controller.set_disabled(disabled);
            controller.handle_key(&press)
        };
        match outcome {
            KeyOutcome::Unhandled => {}
            KeyOutcome::Handled => {
                ev.prevent_default();
                ev.stop_propagation();
            }
            KeyOutcome::Committed { lookup } => {
                ev.prevent_default();
                ev.stop_propagation();
                place_caret(autocomplete);
                run_lookup(autocomplete, directory.clone(), lookup);
            }
            KeyOutcome::Submit(message) => {
                ev.prevent_default();
                ev.stop_propagation();
                on_send.call(message);
            }
        }
    };

    let directory = services.directory.clone();
    let on_keyup = move |ev: KeyboardEvent| {
        if matches!(
            ev.key(),
            DomKey::ArrowLeft | DomKey::ArrowRight | DomKey::Home | DomKey::End
        ) {
            sync_caret(autocomplete, directory.clone());
        }
    };

    let directory = services.directory.clone();
    let on_click = move |_| sync_caret(autocomplete, directory.clone());

    let on_send_click = move |_| {
        let message = {
            let mut controller = autocomplete.write();
            controller.set_disabled(disabled);
            controller.submit()
        };
        if let Some(message) = message {
            on_send.call(message);
        }
    };

    let directory = services.directory.clone();
    let choose = move |index: usize| {
        let committed = autocomplete.write().select(index);
        if let Some(lookup) = committed {
            place_caret(autocomplete);
            run_lookup(autocomplete, directory.clone(), lookup);
        }
    };

    rsx! {
        div { class: "prompt",
            div { class: "prompt-field",
                textarea {
                    id: INPUT_ID,
                    rows: "1",
                    placeholder: "Type a message or @ to mention someone...",
                    value: "{text}",
                    disabled,
                    autofocus: true,
                    oninput: on_input,
                    onkeydown: on_keydown,
                    onkeyup: on_keyup,
                    onclick: on_click,
                }
                button {
                    class: "btn btn-primary send",
                    r#type: "button",
                    disabled: !can_send,
                    onclick: on_send_click,
                    "Send"
                }
            }
            if let Some(popover) = popover {
                SuggestionPopover { popover, selected, query, on_choose: choose }
            }
        }
    }
}

#[component]
fn SuggestionPopover(
    popover: Popover,
    selected: usize,
    query: String,
    on_choose: EventHandler<usize>,
) -> Element {
    let item_class = move |index: usize| {
        if index == selected {
            "suggestion selected"
        } else {
            "suggestion"
        }
    };

    rsx! {
        div { class: "suggestions", role: "listbox",
            match popover {
                Popover::People(people) if people.is_empty() => rsx! {
                    div { class: "suggestion-empty", "No people found" }
                },
                Popover::People(people) => rsx! {
                    for (index, person) in people.into_iter().enumerate() {
                        button {
                            key: "{person.id}",
                            class: item_class(index),
                            r#type: "button",
                            onmousedown: move |ev| ev.prevent_default(),
                            onclick: move |_| on_choose.call(index),
                            span { class: "avatar", "{initials(&person.name)}" }
                            span { class: "suggestion-main",
                                span { class: "suggestion-title",
                                    {highlighted(&person.name, &query)}
                                }
                                if let Some(email) = &person.email {
                                    span { class: "suggestion-sub", "{email}" }
                                }
                            }
                        }
                    }
                },
                Popover::Search(results) => rsx! {
                    for (index, result) in results.into_iter().enumerate() {
                        button {
                            key: "{result.id}",
                            class: item_class(index),
                            r#type: "button",
                            onmousedown: move |ev| ev.prevent_default(),
                            onclick: move |_| on_choose.call(index),
                            span { class: "suggestion-main",
                                span { class: "suggestion-title",
                                    {highlighted(&result.title, &query)}
                                }
                                span { class: "suggestion-sub", "{result.description}" }
                            }
                        }
                    }
                },
            }
        }
    }
}

fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .take(2)
        .collect()
}
