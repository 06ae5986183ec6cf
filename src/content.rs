use comrak::plugins::syntect::SyntectAdapter;
use comrak::{ComrakOptions, ComrakPlugins, markdown_to_html_with_plugins};
use once_cell::sync::Lazy;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Lines of a collapsed code block shown before the ellipsis.
pub const PREVIEW_LINES: usize = 3;

static MARKDOWN_OPTIONS: Lazy<ComrakOptions> = Lazy::new(|| {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    options.extension.autolink = true;
    options
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentBlock {
    Prose(String),
    Code { lang: String, code: String },
}

/// Split a reply into prose and fenced code blocks.
///
/// A fence is three backticks, an optional word-character language tag, a
/// newline, then everything up to the next three backticks. Whitespace-only
/// prose between blocks is dropped.
pub fn parse_blocks(text: &str) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    let mut prose_start = 0;
    let mut search_from = 0;

    while let Some(found) = text[search_from..].find("```") {
        let open = search_from + found;
        let Some((lang, code, end)) = fence_at(text, open) else {
            search_from = open + 1;
            continue;
        };
        push_prose(&mut blocks, &text[prose_start..open]);
        blocks.push(ContentBlock::Code {
            lang: lang.unwrap_or("text").to_string(),
            code: code.to_string(),
        });
        prose_start = end;
        search_from = end;
    }
    push_prose(&mut blocks, &text[prose_start..]);

    if blocks.is_empty() {
        blocks.push(ContentBlock::Prose(text.to_string()));
    }
    blocks
}

/// `(lang, code, end)` of a complete fence opening at `open`.
fn fence_at(text: &str, open: usize) -> Option<(Option<&str>, &str, usize)> {
    let after_ticks = open + 3;
    let rest = &text[after_ticks..];
    let tag_len = rest
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    if rest.as_bytes().get(tag_len) != Some(&b'\n') {
        return None;
    }
    let body_start = after_ticks + tag_len + 1;
    let close = body_start + text[body_start..].find("```")?;
    let lang = (tag_len > 0).then(|| &rest[..tag_len]);
    Some((lang, &text[body_start..close], close + 3))
}

fn push_prose(blocks: &mut Vec<ContentBlock>, prose: &str) {
    if !prose.trim().is_empty() {
        blocks.push(ContentBlock::Prose(prose.to_string()));
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodePreview {
    pub text: String,
    /// The block is long enough to offer expand/collapse.
    pub collapsible: bool,
}

pub fn code_preview(code: &str, expanded: bool) -> CodePreview {
    let collapsible = code.split('\n').count() > PREVIEW_LINES;
    let text = if expanded || !collapsible {
        code.to_string()
    } else {
        let head: Vec<&str> = code.split('\n').take(PREVIEW_LINES).collect();
        format!("{}\n...", head.join("\n"))
    };
    CodePreview { text, collapsible }
}

pub fn markdown_to_html(md: &str) -> String {
    let adapter = SyntectAdapter::new(Some("base16-ocean.dark"));
    let mut plugins = ComrakPlugins::default();
    plugins.render.codefence_syntax_highlighter = Some(&adapter);
    markdown_to_html_with_plugins(md, &MARKDOWN_OPTIONS, &plugins)
}

/// `"Jan 5, 3:07 PM"` in the local timezone, falling back to UTC when the
/// offset cannot be determined.
pub fn format_session_timestamp(millis: i64) -> String {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    format_timestamp_at(millis, offset)
}

pub fn format_timestamp_at(millis: i64, offset: UtcOffset) -> String {
    let format = format_description!(
        "[month repr:short] [day padding:none], [hour repr:12 padding:none]:[minute] [period]"
    );
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .ok()
        .and_then(|at| at.to_offset(offset).format(&format).ok())
        .unwrap_or_default()
}
