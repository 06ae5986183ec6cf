use crate::content::format_session_timestamp;
use crate::ui::{ChatServices, ChatState, delete_session, new_chat, switch_session};
use dioxus::prelude::*;

#[component]
pub fn ChatSidebar() -> Element {
    let state = use_context::<ChatState>();
    let services = use_context::<ChatServices>();

    let rows: Vec<(String, String, i64, bool)> = {
        let manager = state.manager.read();
        let current = manager.current_id();
        manager
            .sessions()
            .iter()
            .map(|session| {
                let active = current == Some(session.id.as_str());
                (session.id.clone(), session.title.clone(), session.updated_at, active)
            })
            .collect()
    };

    rsx! {
        aside { class: "sidebar",
            div { class: "sidebar-header",
                button {
                    class: "btn btn-primary new-chat",
                    r#type: "button",
                    onclick: move |_| new_chat(state, &services),
                    "+ New Chat"
                }
            }
            nav { class: "session-list",
                for (id, title, updated_at, active) in rows {
                    SessionRow { key: "{id}", id: id.clone(), title, updated_at, active }
                }
            }
        }
    }
}

#[component]
fn SessionRow(id: String, title: String, updated_at: i64, active: bool) -> Element {
    let state = use_context::<ChatState>();
    let services = use_context::<ChatServices>();
    let stamp = format_session_timestamp(updated_at);
    let class = if active { "session-row active" } else { "session-row" };

    let open_id = id.clone();
    let open_services = services.clone();
    let on_open = move |_| switch_session(state, &open_services, &open_id);
    let on_delete = move |ev: MouseEvent| {
        ev.stop_propagation();
        delete_session(state, &services, &id);
    };

    rsx! {
        div { class, role: "button", onclick: on_open,
            div { class: "session-text",
                span { class: "session-title", "{title}" }
                span { class: "session-time muted", "{stamp}" }
            }
            button {
                class: "icon-btn session-delete",
                r#type: "button",
                title: "Delete chat",
                onclick: on_delete,
                "✕"
            }
        }
    }
}
