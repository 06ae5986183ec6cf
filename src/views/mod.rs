pub mod chat;
pub mod command_menu;
pub mod prompt;
pub mod sidebar;

pub use chat::ChatView;
pub use command_menu::CommandMenuDialog;
pub use prompt::PromptInput;
pub use sidebar::ChatSidebar;
