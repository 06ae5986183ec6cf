//! Suggestion state for the prompt input.
//!
//! Typing `@name` right before the caret suggests people; any other non-blank
//! input suggests search results for the whole text. The controller only
//! decides *which* lookup to run. Callers run it and feed the answer back with
//! the query it was issued for, so late answers for an old query are dropped.

use crate::input::{Key, KeyPress};
use crate::lookup::{PeopleQuery, SearchQuery};
use crate::types::{Person, SearchResult};

/// Search suggestions requested per lookup.
pub const SEARCH_SUGGESTIONS: usize = 5;
/// People suggestions requested per lookup.
pub const PEOPLE_SUGGESTIONS: usize = 10;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AutocompleteMode {
    #[default]
    Idle,
    Searching {
        query: String,
    },
    /// `start` is the byte offset of the `@`.
    Mentioning {
        query: String,
        start: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LookupRequest {
    Search(SearchQuery),
    People(PeopleQuery),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Suggestions<'a> {
    Hidden,
    Search(&'a [SearchResult]),
    People(&'a [Person]),
}

impl Suggestions<'_> {
    pub fn len(&self) -> usize {
        match self {
            Suggestions::Hidden => 0,
            Suggestions::Search(results) => results.len(),
            Suggestions::People(people) => people.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, Suggestions::Hidden)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Consumed; nothing else changed.
    Handled,
    /// A suggestion replaced the text. Push the new text and caret to the
    /// input and run `lookup` if present.
    Committed { lookup: Option<LookupRequest> },
    /// Send this message. The input has already been cleared.
    Submit(String),
    /// Let the input handle the key itself.
    Unhandled,
}

/// Byte offset of the `@` opening an unterminated mention right before
/// `cursor`, with the partial name after it.
pub fn mention_at(text: &str, cursor: usize) -> Option<(usize, &str)> {
    let before = text.get(..cursor)?;
    let token_start = before
        .bytes()
        .rposition(|b| !(b.is_ascii_alphanumeric() || b == b'_'))
        .map_or(0, |i| i + 1);
    let at = token_start.checked_sub(1)?;
    (before.as_bytes()[at] == b'@').then(|| (at, &before[token_start..]))
}

/// Convert a caret position counted in UTF-16 code units, as browsers report
/// it, into a byte offset into `text`.
pub fn utf16_to_byte_offset(text: &str, utf16: usize) -> usize {
    let mut units = 0;
    for (offset, ch) in text.char_indices() {
        if units >= utf16 {
            return offset;
        }
        units += ch.len_utf16();
    }
    text.len()
}

pub fn byte_to_utf16_offset(text: &str, byte: usize) -> usize {
    text.char_indices()
        .take_while(|(offset, _)| *offset < byte)
        .map(|(_, ch)| ch.len_utf16())
        .sum()
}

/// Split `text` into runs, flagging the ones that match `query` ignoring ASCII
/// case. Used to bold the matched part of a suggestion.
pub fn highlight_segments<'a>(text: &'a str, query: &str) -> Vec<(&'a str, bool)> {
    if query.is_empty() {
        return vec![(text, false)];
    }
    let haystack = text.to_ascii_lowercase();
    let needle = query.to_ascii_lowercase();
    let mut segments = Vec::new();
    let mut rest = 0;
    for (start, _) in haystack.match_indices(&needle) {
        if start > rest {
            segments.push((&text[rest..start], false));
        }
        segments.push((&text[start..start + needle.len()], true));
        rest = start + needle.len();
    }
    if rest < text.len() {
        segments.push((&text[rest..], false));
    }
    segments
}

#[derive(Clone, Debug, Default)]
pub struct AutocompleteController {
    text: String,
    cursor: usize,
    mode: AutocompleteMode,
    search_results: Vec<SearchResult>,
    people_results: Vec<Person>,
    selected: usize,
    dismissed: bool,
    disabled: bool,
}

impl AutocompleteController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Caret as a byte offset into [`text`](Self::text).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn mode(&self) -> &AutocompleteMode {
        &self.mode
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn can_submit(&self) -> bool {
        !self.disabled && !self.text.trim().is_empty()
    }

    /// The input changed. Returns the lookup to run for the new text, if any.
    pub fn set_input(&mut self, text: impl Into<String>, cursor: usize) -> Option<LookupRequest> {
        self.text = text.into();
        self.cursor = self.clamp_cursor(cursor);
        self.dismissed = false;
        self.evaluate()
    }

    /// The caret moved without an edit.
    pub fn set_cursor(&mut self, cursor: usize) -> Option<LookupRequest> {
        self.cursor = self.clamp_cursor(cursor);
        self.evaluate()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
        self.dismissed = false;
        self.evaluate();
    }

    pub fn apply_search_results(&mut self, query: &str, results: Vec<SearchResult>) -> bool {
        match &self.mode {
            AutocompleteMode::Searching { query: active } if active == query => {
                self.search_results = results;
                self.selected = 0;
                true
            }
            _ => false,
        }
    }

    pub fn apply_people_results(&mut self, query: &str, results: Vec<Person>) -> bool {
        match &self.mode {
            AutocompleteMode::Mentioning { query: active, .. } if active == query => {
                self.people_results = results;
                self.selected = 0;
                true
            }
            _ => false,
        }
    }

    pub fn suggestions(&self) -> Suggestions<'_> {
        if self.dismissed {
            return Suggestions::Hidden;
        }
        match &self.mode {
            AutocompleteMode::Mentioning { .. } => Suggestions::People(&self.people_results),
            AutocompleteMode::Searching { .. } if !self.search_results.is_empty() => {
                Suggestions::Search(&self.search_results)
            }
            _ => Suggestions::Hidden,
        }
    }

    pub fn handle_key(&mut self, press: &KeyPress) -> KeyOutcome {
        let suggestions = self.suggestions();
        let visible = suggestions.is_visible();
        let count = suggestions.len();

        match press.key {
            Key::ArrowDown if visible => {
                self.selected = (self.selected + 1).min(count.saturating_sub(1));
                KeyOutcome::Handled
            }
            Key::ArrowUp if visible => {
                self.selected = self.selected.saturating_sub(1);
                KeyOutcome::Handled
            }
            Key::Enter if !press.shift => {
                if visible {
                    match self.commit(self.selected) {
                        Some(lookup) => KeyOutcome::Committed { lookup },
                        None => KeyOutcome::Handled,
                    }
                } else if self.text.trim().is_empty() {
                    KeyOutcome::Unhandled
                } else {
                    self.submit()
                        .map_or(KeyOutcome::Handled, KeyOutcome::Submit)
                }
            }
            Key::Escape => {
                self.dismissed = true;
                KeyOutcome::Handled
            }
            _ => KeyOutcome::Unhandled,
        }
    }

    /// Commit a clicked suggestion. `None` if nothing is shown at `index`.
    pub fn select(&mut self, index: usize) -> Option<Option<LookupRequest>> {
        self.commit(index)
    }

    /// Take the trimmed input for sending and reset. `None` when blank or
    /// disabled.
    pub fn submit(&mut self) -> Option<String> {
        if !self.can_submit() {
            return None;
        }
        let message = self.text.trim().to_string();
        self.clear();
        Some(message)
    }

    fn commit(&mut self, index: usize) -> Option<Option<LookupRequest>> {
        match self.suggestions() {
            Suggestions::People(people) => {
                let name = people.get(index)?.name.clone();
                let AutocompleteMode::Mentioning { start, .. } = self.mode else {
                    return None;
                };
                let inserted = format!("@{name} ");
                self.text.replace_range(start..self.cursor, &inserted);
                self.cursor = start + inserted.len();
                Some(self.evaluate())
            }
            Suggestions::Search(results) => {
                let title = results.get(index)?.title.clone();
                self.cursor = title.len();
                self.text = title;
                let lookup = self.evaluate();
                // The chosen title would only suggest itself again.
                self.dismissed = true;
                Some(lookup)
            }
            Suggestions::Hidden => None,
        }
    }

    fn clamp_cursor(&self, cursor: usize) -> usize {
        let mut cursor = cursor.min(self.text.len());
        while !self.text.is_char_boundary(cursor) {
            cursor -= 1;
        }
        cursor
    }

    fn evaluate(&mut self) -> Option<LookupRequest> {
        let next = match mention_at(&self.text, self.cursor) {
            Some((start, query)) => AutocompleteMode::Mentioning {
                query: query.to_string(),
                start,
            },
            None if self.text.trim().is_empty() => AutocompleteMode::Idle,
            None => AutocompleteMode::Searching {
                query: self.text.clone(),
            },
        };

        if next == self.mode {
            return None;
        }
        self.mode = next;
        self.selected = 0;
        self.search_results.clear();
        self.people_results.clear();

        match &self.mode {
            AutocompleteMode::Idle => None,
            AutocompleteMode::Searching { query } => Some(LookupRequest::Search(SearchQuery {
                q: query.clone(),
                limit: SEARCH_SUGGESTIONS,
            })),
            AutocompleteMode::Mentioning { query, .. } if query.is_empty() => None,
            AutocompleteMode::Mentioning { query, .. } => {
                Some(LookupRequest::People(PeopleQuery {
                    q: query.clone(),
                    limit: PEOPLE_SUGGESTIONS,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str) -> Person {
        Person {
            id: name.to_lowercase(),
            name: name.into(),
            email: None,
        }
    }

    fn article(title: &str) -> SearchResult {
        SearchResult {
            id: title.into(),
            title: title.into(),
            description: String::new(),
            matched_text: None,
        }
    }

    fn press(key: Key) -> KeyPress {
        KeyPress::new(key)
    }

    #[test]
    fn test_mention_token_detection() {
        assert_eq!(mention_at("Hello @jo", 9), Some((6, "jo")));
        assert_eq!(mention_at("@", 1), Some((0, "")));
        assert_eq!(mention_at("Hello @jo there", 15), None);
        assert_eq!(mention_at("mail@host", 9), Some((4, "host")));
        assert_eq!(mention_at("@jo-x", 5), None);
        assert_eq!(mention_at("no mention", 10), None);
    }

    #[test]
    fn test_mention_selection_replaces_the_token() {
        let mut ac = AutocompleteController::new();
        let lookup = ac.set_input("Hello @jo", 9);
        assert_eq!(
            ac.mode(),
            &AutocompleteMode::Mentioning {
                query: "jo".into(),
                start: 6
            }
        );
        assert_eq!(
            lookup,
            Some(LookupRequest::People(PeopleQuery {
                q: "jo".into(),
                limit: PEOPLE_SUGGESTIONS
            }))
        );

        assert!(ac.apply_people_results("jo", vec![person("John Smith"), person("Joe Lee")]));
        assert_eq!(ac.select(0).map(|_| ()), Some(()));
        assert_eq!(ac.text(), "Hello @John Smith ");
        assert_eq!(ac.cursor(), 18);
        assert_eq!(ac.mode(), &AutocompleteMode::Searching {
            query: "Hello @John Smith ".into()
        });
    }

    #[test]
    fn test_mention_in_the_middle_keeps_the_tail() {
        let mut ac = AutocompleteController::new();
        ac.set_input("hi @ma and more", 6);
        ac.apply_people_results("ma", vec![person("Mary King")]);
        assert!(matches!(
            ac.handle_key(&press(Key::Enter)),
            KeyOutcome::Committed { .. }
        ));
        assert_eq!(ac.text(), "hi @Mary King  and more");
        assert_eq!(ac.cursor(), "hi @Mary King ".len());
    }

    #[test]
    fn test_plain_text_searches_the_whole_input() {
        let mut ac = AutocompleteController::new();
        assert_eq!(
            ac.set_input("react", 5),
            Some(LookupRequest::Search(SearchQuery {
                q: "react".into(),
                limit: SEARCH_SUGGESTIONS
            }))
        );
        assert_eq!(ac.suggestions(), Suggestions::Hidden);

        ac.apply_search_results("react", vec![article("React Query Best Practices")]);
        assert_eq!(ac.suggestions().len(), 1);

        assert!(matches!(
            ac.handle_key(&press(Key::Enter)),
            KeyOutcome::Committed { .. }
        ));
        assert_eq!(ac.text(), "React Query Best Practices");
        assert_eq!(ac.suggestions(), Suggestions::Hidden);
    }

    #[test]
    fn test_blank_input_is_idle() {
        let mut ac = AutocompleteController::new();
        assert_eq!(ac.set_input("   ", 3), None);
        assert_eq!(ac.mode(), &AutocompleteMode::Idle);
    }

    #[test]
    fn test_empty_mention_shows_an_empty_people_list_without_lookup() {
        let mut ac = AutocompleteController::new();
        assert_eq!(ac.set_input("@", 1), None);
        assert_eq!(ac.suggestions(), Suggestions::People(&[]));
    }

    #[test]
    fn test_stale_results_are_ignored() {
        let mut ac = AutocompleteController::new();
        ac.set_input("rea", 3);
        ac.set_input("react", 5);
        assert!(!ac.apply_search_results("rea", vec![article("old")]));
        assert!(!ac.apply_people_results("react", vec![person("Nobody")]));
        assert_eq!(ac.suggestions(), Suggestions::Hidden);
    }

    #[test]
    fn test_arrows_clamp_without_wrapping() {
        let mut ac = AutocompleteController::new();
        ac.set_input("@a", 2);
        ac.apply_people_results("a", vec![person("A One"), person("A Two")]);

        assert_eq!(ac.handle_key(&press(Key::ArrowUp)), KeyOutcome::Handled);
        assert_eq!(ac.selected(), 0);
        ac.handle_key(&press(Key::ArrowDown));
        ac.handle_key(&press(Key::ArrowDown));
        ac.handle_key(&press(Key::ArrowDown));
        assert_eq!(ac.selected(), 1);

        ac.handle_key(&press(Key::Enter));
        assert_eq!(ac.text(), "@A Two ");
    }

    #[test]
    fn test_new_results_reset_the_selection() {
        let mut ac = AutocompleteController::new();
        ac.set_input("@a", 2);
        ac.apply_people_results("a", vec![person("A One"), person("A Two")]);
        ac.handle_key(&press(Key::ArrowDown));
        ac.apply_people_results("a", vec![person("A Three"), person("A Four")]);
        assert_eq!(ac.selected(), 0);
    }

    #[test]
    fn test_escape_hides_the_list_until_the_next_edit() {
        let mut ac = AutocompleteController::new();
        ac.set_input("@jo", 3);
        ac.apply_people_results("jo", vec![person("John Smith")]);

        assert_eq!(ac.handle_key(&press(Key::Escape)), KeyOutcome::Handled);
        assert_eq!(ac.suggestions(), Suggestions::Hidden);
        assert_eq!(ac.text(), "@jo");

        ac.set_input("@joh", 4);
        assert!(ac.suggestions().is_visible());
    }

    #[test]
    fn test_enter_without_suggestions_submits_trimmed_text() {
        let mut ac = AutocompleteController::new();
        ac.set_input("  hello there  ", 15);
        assert_eq!(
            ac.handle_key(&press(Key::Enter)),
            KeyOutcome::Submit("hello there".into())
        );
        assert_eq!(ac.text(), "");
        assert_eq!(ac.mode(), &AutocompleteMode::Idle);
    }

    #[test]
    fn test_shift_enter_and_blank_input_fall_through() {
        let mut ac = AutocompleteController::new();
        ac.set_input("line", 4);
        assert_eq!(
            ac.handle_key(&press(Key::Enter).with_shift()),
            KeyOutcome::Unhandled
        );
        ac.set_input("", 0);
        assert_eq!(ac.handle_key(&press(Key::Enter)), KeyOutcome::Unhandled);
    }

    #[test]
    fn test_disabled_input_does_not_submit() {
        let mut ac = AutocompleteController::new();
        ac.set_disabled(true);
        ac.set_input("hello", 5);
        assert_eq!(ac.handle_key(&press(Key::Enter)), KeyOutcome::Handled);
        assert_eq!(ac.text(), "hello");
        ac.set_disabled(false);
        assert_eq!(ac.submit(), Some("hello".into()));
    }

    #[test]
    fn test_moving_the_caret_re_evaluates_the_mention() {
        let mut ac = AutocompleteController::new();
        ac.set_input("@jo and", 7);
        assert!(matches!(ac.mode(), AutocompleteMode::Searching { .. }));
        let lookup = ac.set_cursor(3);
        assert!(matches!(lookup, Some(LookupRequest::People(_))));
    }

    #[test]
    fn test_utf16_offsets_convert_to_bytes() {
        let text = "héllo 😀 @jo";
        assert_eq!(utf16_to_byte_offset(text, 0), 0);
        assert_eq!(utf16_to_byte_offset(text, 2), 3);
        assert_eq!(utf16_to_byte_offset(text, 8), 11);
        assert_eq!(utf16_to_byte_offset(text, 100), text.len());
        assert_eq!(byte_to_utf16_offset(text, 11), 8);
        assert_eq!(byte_to_utf16_offset(text, text.len()), 12);
    }

    #[test]
    fn test_highlight_marks_case_insensitive_matches() {
        assert_eq!(
            highlight_segments("React Query", "query"),
            vec![("React ", false), ("Query", true)]
        );
        assert_eq!(highlight_segments("abc", ""), vec![("abc", false)]);
        assert_eq!(
            highlight_segments("aXa", "a"),
            vec![("a", true), ("X", false), ("a", true)]
        );
    }
}
