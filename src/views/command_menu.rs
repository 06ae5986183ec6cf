use crate::commands::{CommandId, MenuOutcome};
use crate::input::KeyDispatcher;
use crate::ui::ChatState;
use dioxus::prelude::*;
use std::rc::Rc;

/// Ctrl/Cmd+K palette. Listens on the app-wide dispatcher so the shortcut
/// works wherever focus is.
#[component]
pub fn CommandMenuDialog(on_command: EventHandler<CommandId>) -> Element {
    let state = use_context::<ChatState>();
    let dispatcher = use_context::<KeyDispatcher>();
    let mut menu = state.menu;

    use_hook(move || {
        let subscription = dispatcher.subscribe(move |press| {
            let mut menu = menu;
            let outcome = menu.write().handle_key(press);
            match outcome {
                MenuOutcome::Run(command) => {
                    on_command.call(command);
                    true
                }
                MenuOutcome::Handled => true,
                MenuOutcome::Ignored => false,
            }
        });
        Rc::new(subscription)
    });

    let (open, query, selected, commands) = {
        let menu = menu.read();
        (
            menu.is_open(),
            menu.query().to_string(),
            menu.selected(),
            menu.filtered(),
        )
    };
    if !open {
        return rsx! {};
    }
    let item_class = move |index: usize| {
        if index == selected {
            "command-item selected"
        } else {
            "command-item"
        }
    };

    rsx! {
        div { class: "dialog-backdrop", onclick: move |_| menu.write().close() }
        div {
            class: "dialog",
            role: "dialog",
            aria_modal: "true",
            div { class: "dialog-header",
                h2 { class: "dialog-title", "Command Menu" }
                p { class: "dialog-description muted",
                    "Search for actions and navigate with keyboard"
                }
            }
            input {
                class: "dialog-search",
                r#type: "text",
                placeholder: "Search commands...",
                autofocus: true,
                value: "{query}",
                oninput: move |ev| menu.write().set_query(ev.value()),
            }
            div { class: "command-list", role: "listbox",
                if commands.is_empty() {
                    div { class: "empty-state muted", "No commands found" }
                }
                for (index, command) in commands.into_iter().enumerate() {
                    button {
                        key: "{command.slug()}",
                        class: item_class(index),
                        r#type: "button",
                        onclick: move |_| {
                            if let Some(command) = menu.write().choose(index) {
                                on_command.call(command);
                            }
                        },
                        "{command.label()}"
                    }
                }
            }
        }
    }
}
