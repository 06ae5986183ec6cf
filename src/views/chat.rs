use crate::chat::{AnswerView, LiveAnswer, TranscriptPlan, plan_transcript};
use crate::content::{ContentBlock, code_preview, markdown_to_html, parse_blocks};
use crate::types::{Message, Role};
use crate::ui::{ChatServices, ChatState, regenerate, send_message, show_toast};
use crate::views::PromptInput;
use dioxus::prelude::*;
use std::collections::HashSet;

const SCROLL_TO_BOTTOM_JS: &str = r#"
const el = document.getElementById("chat-scroll");
if (el) { el.scrollTop = el.scrollHeight; }
"#;

/// Owned form of [`AnswerView`] for component props.
#[derive(Clone, Debug, PartialEq)]
enum GroupAnswer {
    Committed(Message),
    /// Live reply; `None` until the first fragment arrives.
    Live(Option<String>),
    Pending,
}

fn live_text(live: LiveAnswer<'_>) -> Option<String> {
    match live {
        LiveAnswer::Typing(text) => Some(text.to_string()),
        LiveAnswer::Thinking => None,
    }
}

impl From<AnswerView<'_>> for GroupAnswer {
    fn from(view: AnswerView<'_>) -> Self {
        match view {
            AnswerView::Committed(message) => GroupAnswer::Committed(message.clone()),
            AnswerView::Live(live) => GroupAnswer::Live(live_text(live)),
            AnswerView::Pending => GroupAnswer::Pending,
        }
    }
}

#[component]
pub fn ChatView() -> Element {
    let state = use_context::<ChatState>();
    let services = use_context::<ChatServices>();

    use_effect(move || {
        // Re-run on new fragments and committed messages.
        let _ = (state.buffer)().len();
        let _ = state.manager.read().current().map(|s| s.messages.len());
        let _ = document::eval(SCROLL_TO_BOTTOM_JS);
    });

    let streaming = (state.streaming)();
    let regenerating = (state.regenerating)();
    let buffer = (state.buffer)();
    let messages = state
        .manager
        .read()
        .current()
        .map(|session| session.messages.clone())
        .unwrap_or_default();

    let transcript = match plan_transcript(&messages, &buffer, streaming) {
        TranscriptPlan::Empty => rsx! {
            div { class: "chat-empty",
                h2 { "Start a conversation" }
                p { class: "muted", "Type a message to begin chatting with the AI assistant." }
            }
        },
        TranscriptPlan::Conversation {
            groups,
            standalone,
            trailing,
        } => rsx! {
            for group in groups {
                MessageGroupView {
                    key: "{group.question.id}",
                    question: group.question.clone(),
                    answer: GroupAnswer::from(group.answer),
                }
            }
            if let Some(live) = standalone {
                LiveAnswerView { text: live_text(live) }
            }
            if let Some((question, live)) = trailing {
                MessageGroupView {
                    question: question.clone(),
                    answer: GroupAnswer::Live(live_text(live)),
                }
            }
        },
    };

    let on_send = move |text: String| send_message(state, &services, text);

    rsx! {
        div { class: "chat-interface",
            div { id: "chat-scroll", class: "chat-scroll",
                div { class: "chat-column",
                    {transcript}
                    if regenerating {
                        ThinkingIndicator {}
                    }
                }
            }
            div { class: "composer",
                div { class: "composer-inner",
                    PromptInput { disabled: streaming || regenerating, on_send }
                }
            }
        }
    }
}

#[component]
fn MessageGroupView(question: Message, answer: GroupAnswer) -> Element {
    rsx! {
        section { class: "message-group",
            div { class: "sticky-question",
                MessageBubble { message: question }
            }
            {
                match answer {
                    GroupAnswer::Committed(message) => rsx! {
                        MessageBubble { message }
                    },
                    GroupAnswer::Live(text) => rsx! {
                        LiveAnswerView { text }
                    },
                    GroupAnswer::Pending => rsx! {},
                }
            }
        }
    }
}

#[component]
fn MessageBubble(message: Message) -> Element {
    let state = use_context::<ChatState>();
    let services = use_context::<ChatServices>();
    let busy = state.is_busy();

    if message.role == Role::User {
        return rsx! {
            div { class: "message user",
                div { class: "message-text", "{message.content}" }
            }
        };
    }

    let copy_payload = message.content.clone();
    let on_copy = move |_| {
        if copy_to_clipboard(copy_payload.clone()) {
            show_toast(state.toast, "Copied to clipboard", "Message content has been copied.");
        }
    };

    let answer_id = message.id.clone();
    let on_regenerate = move |_| regenerate(state, &services, answer_id.clone());

    rsx! {
        div { class: "message assistant",
            div { class: "message-body",
                Artifact { content: message.content.clone() }
            }
            div { class: "message-actions",
                button {
                    class: "icon-btn",
                    r#type: "button",
                    title: "Copy",
                    onclick: on_copy,
                    "⧉"
                }
                button {
                    class: "icon-btn",
                    r#type: "button",
                    title: "Regenerate",
                    disabled: busy,
                    onclick: on_regenerate,
                    "↻"
                }
            }
        }
    }
}

fn copy_to_clipboard(text: String) -> bool {
    #[cfg(not(target_arch = "wasm32"))]
    {
        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%err, "clipboard unavailable");
                false
            }
        }
    }
    #[cfg(target_arch = "wasm32")]
    {
        let payload = serde_json::to_string(&text).unwrap_or_else(|_| "\"\"".to_string());
        let _ = document::eval(&format!("navigator.clipboard.writeText({payload});"));
        true
    }
}

/// Assistant reply split into markdown prose and collapsible code blocks.
#[component]
fn Artifact(content: String) -> Element {
    let expanded = use_signal(HashSet::<usize>::new);

    let mut code_index = 0usize;
    let blocks: Vec<Element> = parse_blocks(&content)
        .into_iter()
        .enumerate()
        .map(|(i, block)| match block {
            ContentBlock::Prose(text) => rsx! {
                div { key: "prose-{i}", class: "md", dangerous_inner_html: markdown_to_html(&text) }
            },
            ContentBlock::Code { lang, code } => {
                let index = code_index;
                code_index += 1;
                rsx! {
                    CodeBlock { key: "code-{i}", index, lang, code, expanded }
                }
            }
        })
        .collect();

    rsx! {
        div { class: "artifact", {blocks.into_iter()} }
    }
}

#[component]
fn CodeBlock(
    index: usize,
    lang: String,
    code: String,
    expanded: Signal<HashSet<usize>>,
) -> Element {
    let is_expanded = expanded.read().contains(&index);
    let preview = code_preview(&code, is_expanded);
    let toggle = move |_| {
        let mut expanded = expanded;
        let mut set = expanded.write();
        if !set.remove(&index) {
            set.insert(index);
        }
    };

    rsx! {
        div { class: "code-block",
            div { class: "code-header",
                span { class: "code-lang", "{lang}" }
                if preview.collapsible {
                    button { class: "ghost-btn", r#type: "button", onclick: toggle,
                        if is_expanded {
                            "▴ Collapse"
                        } else {
                            "▾ Expand"
                        }
                    }
                }
            }
            pre {
                code { "{preview.text}" }
            }
        }
    }
}

#[component]
fn LiveAnswerView(text: Option<String>) -> Element {
    rsx! {
        div { class: "message assistant live",
            if let Some(text) = text {
                div { class: "message-body streaming",
                    "{text}"
                    span { class: "caret" }
                }
            } else {
                div { class: "wave-loader", aria_label: "Waiting for reply",
                    span {}
                    span {}
                    span {}
                }
            }
        }
    }
}

#[component]
fn ThinkingIndicator() -> Element {
    rsx! {
        div { class: "thinking",
            span { class: "thinking-dot" }
            span { class: "shimmer-text", "Thinking…" }
        }
    }
}
