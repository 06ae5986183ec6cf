use neuralchat::config::ChatConfig;

fn main() {
    neuralchat::logging::init();
    let config = ChatConfig::load();
    if config.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; replies will fail until it is");
    }
    neuralchat::ui::launch(config);
}
