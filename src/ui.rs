use crate::ai::{ChatError, CompletionGateway};
use crate::chat::{SessionManager, TurnTracker, recent_history, regenerate_request, stream_reply};
use crate::commands::{CommandId, CommandMenu};
use crate::config::ChatConfig;
use crate::input::{DomKeyEvent, KeyDispatcher, KeyPress};
use crate::lookup::{Directory, MockDirectory};
use crate::storage::LocalStore;
use crate::timer;
use crate::types::NewMessage;
use crate::views::{ChatSidebar, ChatView, CommandMenuDialog};
use dioxus::prelude::*;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Duration;

const NEURALCHAT_CSS: Asset = asset!("/assets/neuralchat.css");
const TOAST_DISMISS_DELAY: Duration = Duration::from_secs(4);

/// Forwards key presses that happen outside the app shell, e.g. with focus on
/// `body`. Presses inside the shell reach its own `onkeydown`.
const DOCUMENT_KEYS_JS: &str = r#"
document.addEventListener("keydown", (ev) => {
    if (ev.target instanceof Element && ev.target.closest(".app-shell")) {
        return;
    }
    if ((ev.ctrlKey || ev.metaKey) && ev.key.toLowerCase() === "k") {
        ev.preventDefault();
    }
    dioxus.send({
        key: ev.key,
        shiftKey: ev.shiftKey,
        ctrlKey: ev.ctrlKey,
        metaKey: ev.metaKey,
        altKey: ev.altKey,
    });
});
"#;

static LAUNCH_CONFIG: OnceCell<ChatConfig> = OnceCell::new();

/// Start the UI with `config`. Blocks until the window closes.
pub fn launch(config: ChatConfig) {
    if LAUNCH_CONFIG.set(config).is_err() {
        tracing::warn!("launch called twice; keeping the first configuration");
    }
    dioxus::launch(App);
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub title: String,
    pub description: String,
}

/// Reactive state shared by every view.
#[derive(Clone, Copy)]
pub struct ChatState {
    pub manager: Signal<SessionManager>,
    /// A reply is being streamed into `buffer`.
    pub streaming: Signal<bool>,
    pub buffer: Signal<String>,
    /// A committed answer is being regenerated.
    pub regenerating: Signal<bool>,
    pub menu: Signal<CommandMenu>,
    pub toast: Signal<Option<Toast>>,
}

impl ChatState {
    pub fn is_busy(&self) -> bool {
        (self.streaming)() || (self.regenerating)()
    }
}

/// Non-reactive collaborators shared by every view.
#[derive(Clone)]
pub struct ChatServices {
    pub gateway: Result<CompletionGateway, String>,
    pub directory: Arc<dyn Directory>,
    pub turns: TurnTracker,
    pub history_limit: usize,
}

impl ChatServices {
    fn from_config(config: &ChatConfig) -> Self {
        let gateway = CompletionGateway::from_config(config).map_err(|err| {
            tracing::warn!(%err, "completion gateway unavailable");
            err.to_string()
        });
        Self {
            gateway,
            directory: Arc::new(MockDirectory::new()),
            turns: TurnTracker::new(),
            history_limit: config.history_limit,
        }
    }
}

pub(crate) fn key_press(event: &KeyboardEvent) -> KeyPress {
    let modifiers = event.modifiers();
    KeyPress {
        key: crate::input::Key::from_name(&event.key().to_string()),
        shift: modifiers.shift(),
        ctrl: modifiers.ctrl(),
        meta: modifiers.meta(),
        alt: modifiers.alt(),
    }
}

#[component]
pub fn App() -> Element {
    let config = use_hook(|| LAUNCH_CONFIG.get().cloned().unwrap_or_else(ChatConfig::load));
    let services = use_context_provider(|| ChatServices::from_config(&config));
    let dispatcher = use_context_provider(KeyDispatcher::new);
    let state = use_context_provider(|| ChatState {
        manager: Signal::new(SessionManager::init(Box::new(LocalStore::new()), None)),
        streaming: Signal::new(false),
        buffer: Signal::new(String::new()),
        regenerating: Signal::new(false),
        menu: Signal::new(CommandMenu::new()),
        toast: Signal::new(None),
    });

    let document_dispatcher = dispatcher.clone();
    use_future(move || {
        let dispatcher = document_dispatcher.clone();
        async move {
            let mut listener = document::eval(DOCUMENT_KEYS_JS);
            while let Ok(event) = listener.recv::<DomKeyEvent>().await {
                dispatcher.dispatch(&KeyPress::from(event));
            }
            tracing::debug!("document key listener closed");
        }
    });

    let on_command = {
        let services = services.clone();
        move |command: CommandId| run_command(state, &services, command)
    };

    rsx! {
        document::Link { rel: "stylesheet", href: NEURALCHAT_CSS }
        div {
            class: "app-shell",
            tabindex: "-1",
            onkeydown: move |ev| {
                if dispatcher.dispatch(&key_press(&ev)) {
                    ev.prevent_default();
                }
            },
            div { class: "background-pattern", aria_hidden: "true" }
            AppHeader {}
            div { class: "app-body",
                ChatSidebar {}
                main { class: "app-main",
                    if state.manager.read().current().is_some() {
                        ChatView {}
                    } else {
                        div { class: "empty-state",
                            p { class: "muted", "No active session" }
                        }
                    }
                }
            }
            CommandMenuDialog { on_command }
            ToastView {}
        }
    }
}

#[component]
fn AppHeader() -> Element {
    let state = use_context::<ChatState>();
    rsx! {
        header { class: "app-header",
            div { class: "wordmark",
                span { class: "wordmark-mark", "◆" }
                span { class: "wordmark-text", "NeuralChat" }
            }
            button {
                class: "shortcut-hint",
                r#type: "button",
                title: "Command menu",
                onclick: move |_| {
                    let mut menu = state.menu;
                    menu.write().toggle();
                },
                kbd { "⌘K" }
            }
        }
    }
}

#[component]
fn ToastView() -> Element {
    let state = use_context::<ChatState>();
    let toast = (state.toast)();
    rsx! {
        if let Some(toast) = toast {
            div { class: "toast", role: "status",
                div { class: "toast-title", "{toast.title}" }
                div { class: "toast-description", "{toast.description}" }
            }
        }
    }
}

pub fn show_toast(toast: Signal<Option<Toast>>, title: &str, description: impl Into<String>) {
    let mut toast = toast;
    let id = match &*toast.peek() {
        Some(current) => current.id + 1,
        None => 1,
    };
    toast.set(Some(Toast {
        id,
        title: title.to_string(),
        description: description.into(),
    }));
    spawn(async move {
        timer::sleep(TOAST_DISMISS_DELAY).await;
        let still_showing = matches!(&*toast.peek(), Some(current) if current.id == id);
        if still_showing {
            toast.set(None);
        }
    });
}

/// Drop whatever turn is in flight. Late fragments are discarded by their
/// stale token.
fn abort_turn(state: ChatState, services: &ChatServices) {
    let ChatState {
        mut streaming,
        mut buffer,
        mut regenerating,
        ..
    } = state;
    services.turns.cancel();
    streaming.set(false);
    buffer.set(String::new());
    regenerating.set(false);
}

pub fn new_chat(state: ChatState, services: &ChatServices) {
    abort_turn(state, services);
    let mut manager = state.manager;
    let session = manager.write().create_session();
    tracing::debug!(session = %session.id, "new chat");
}

pub fn switch_session(state: ChatState, services: &ChatServices, id: &str) {
    if state.manager.read().current_id() == Some(id) {
        return;
    }
    abort_turn(state, services);
    let mut manager = state.manager;
    manager.write().switch_session(id);
}

pub fn delete_session(state: ChatState, services: &ChatServices, id: &str) {
    if state.manager.read().current_id() == Some(id) {
        abort_turn(state, services);
    }
    let mut manager = state.manager;
    manager.write().delete_session(id);
}

pub fn clear_history(state: ChatState, services: &ChatServices) {
    abort_turn(state, services);
    let mut manager = state.manager;
    manager.write().clear_history();
    show_toast(state.toast, "History cleared", "All chat sessions have been deleted.");
}

fn run_command(state: ChatState, services: &ChatServices, command: CommandId) {
    tracing::debug!(command = command.slug(), "command menu");
    match command {
        CommandId::NewChat => new_chat(state, services),
        CommandId::ClearHistory => clear_history(state, services),
        CommandId::Settings => {}
    }
}

/// Append the user message, then stream the reply into the buffer and commit
/// it to the session the turn started in.
pub fn send_message(state: ChatState, services: &ChatServices, text: String) {
    if state.is_busy() {
        return;
    }
    let ChatState {
        mut manager,
        mut streaming,
        mut buffer,
        toast,
        ..
    } = state;

    let (session_id, history) = {
        let mut manager = manager.write();
        let session_id = match manager.current_id() {
            Some(id) => id.to_string(),
            None => manager.create_session().id,
        };
        let history = manager
            .session(&session_id)
            .map(|session| recent_history(&session.messages, services.history_limit))
            .unwrap_or_default();
        if manager
            .add_message(NewMessage::user(text.clone()), Some(&session_id))
            .is_none()
        {
            return;
        }
        (session_id, history)
    };

    let token = services.turns.begin();
    buffer.set(String::new());
    streaming.set(true);

    let gateway = services.gateway.clone();
    spawn(async move {
        let outcome = match gateway {
            Ok(gateway) => match gateway.complete(&text, &history).await {
                Ok(fragments) => {
                    stream_reply(fragments, &token, |text| buffer.set(text.to_string())).await
                }
                Err(err) => Err(err),
            },
            Err(message) => Err(ChatError::NotConfigured(message)),
        };

        if !token.is_current() {
            tracing::debug!(session = %session_id, "discarding superseded reply");
            return;
        }

        match outcome {
            Ok(reply) => {
                manager
                    .write()
                    .add_message(NewMessage::assistant(reply), Some(&session_id));
            }
            Err(err) => {
                tracing::error!(%err, session = %session_id, "chat turn failed");
                show_toast(toast, "Error", err.to_string());
            }
        }
        buffer.set(String::new());
        streaming.set(false);
    });
}

/// Ask again for the question before `answer_id` and overwrite the answer.
pub fn regenerate(state: ChatState, services: &ChatServices, answer_id: String) {
    if state.is_busy() {
        return;
    }
    let ChatState {
        mut manager,
        mut regenerating,
        toast,
        ..
    } = state;

    let request = manager.read().current().and_then(|session| {
        regenerate_request(&session.messages, &answer_id, services.history_limit)
    });
    let Some(request) = request else {
        return;
    };

    let token = services.turns.begin();
    regenerating.set(true);

    let gateway = services.gateway.clone();
    spawn(async move {
        let outcome = match gateway {
            Ok(gateway) => match gateway.complete(&request.question, &request.history).await {
                Ok(fragments) => stream_reply(fragments, &token, |_| {}).await,
                Err(err) => Err(err),
            },
            Err(message) => Err(ChatError::NotConfigured(message)),
        };

        if !token.is_current() {
            return;
        }

        match outcome {
            Ok(reply) => {
                manager.write().update_message(&request.answer_id, reply);
            }
            Err(err) => {
                tracing::error!(%err, answer = %request.answer_id, "regenerate failed");
                show_toast(toast, "Error", err.to_string());
            }
        }
        regenerating.set(false);
    });
}
