use std::ops::Range;

use tracing::{debug, info, warn};

use crate::draft::{DraftRecord, DraftStore};
use crate::limits::{LimitStatus, LineThresholds};
use crate::report::ResultsReport;
use crate::segment::{segment, LineCapacity};
use crate::util::{floor_char_boundary, next_char_boundary, prev_char_boundary};

pub const BASE_MINUTES: u64 = 30;
pub const MAX_EXTRA_MINUTES: u32 = 120;

/// Clamp a user-supplied amount of extra time into `0..=MAX_EXTRA_MINUTES`.
pub fn clamp_extra_minutes(extra: i64) -> u32 {
    extra.clamp(0, i64::from(MAX_EXTRA_MINUTES)) as u32
}

/// Everything fixed for the lifetime of one writing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub duration_secs: u64,
    pub capacity: LineCapacity,
    pub thresholds: LineThresholds,
}

impl SessionConfig {
    pub fn new(extra_minutes: i64, capacity: LineCapacity, thresholds: LineThresholds) -> Self {
        let minutes = BASE_MINUTES + u64::from(clamp_extra_minutes(extra_minutes));
        Self {
            duration_secs: minutes * 60,
            capacity,
            thresholds,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(0, LineCapacity::default(), LineThresholds::default())
    }
}

/// Byte offsets into the text buffer, always on char boundaries.
/// `head` is where the cursor sits; the selected text is `range()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn caret(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.anchor.min(self.head)..self.anchor.max(self.head)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Accepted,
    /// The edit would push the text past the hard line limit; nothing changed.
    Rejected,
    /// Nothing to do: the session is locked, or the operation had no input.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    /// This tick ran the clock out and locked the session.
    Expired,
    Ignored,
}

/// One essay attempt: text buffer, countdown, selection, clipboard and the
/// terminal locked state with its results snapshot.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    text: String,
    lines: Vec<String>,
    seconds_remaining: u64,
    selection: Selection,
    clipboard: Option<String>,
    locked: bool,
    report: Option<ResultsReport>,
    draft_store: Option<Box<dyn DraftStore>>,
}

impl Session {
    /// Begin a new session. Any draft left in `draft_store` is discarded.
    pub fn start(config: SessionConfig, draft_store: Option<Box<dyn DraftStore>>) -> Self {
        if let Some(store) = &draft_store {
            if let Err(e) = store.clear() {
                warn!(error = %e, "could not clear previous draft");
            }
        }

        info!(
            duration_secs = config.duration_secs,
            capacity = config.capacity.get(),
            min_lines = config.thresholds.min_lines(),
            max_lines = config.thresholds.max_lines(),
            hard_limit = config.thresholds.hard_limit(),
            "session started"
        );

        Self {
            config,
            text: String::new(),
            lines: Vec::new(),
            seconds_remaining: config.duration_secs,
            selection: Selection::default(),
            clipboard: None,
            locked: false,
            report: None,
            draft_store,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn limit_status(&self) -> LimitStatus {
        self.config.thresholds.classify(self.lines.len())
    }

    pub fn seconds_remaining(&self) -> u64 {
        self.seconds_remaining
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn cursor(&self) -> usize {
        self.selection.head
    }

    pub fn selected_text(&self) -> &str {
        &self.text[self.selection.range()]
    }

    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn report(&self) -> Option<&ResultsReport> {
        self.report.as_ref()
    }

    /// Replace the whole buffer with `candidate`, subject to the line gate.
    /// The selection is clamped onto the new text.
    pub fn apply_edit(&mut self, candidate: impl Into<String>) -> EditOutcome {
        let candidate = candidate.into();
        let anchor = floor_char_boundary(&candidate, self.selection.anchor);
        let head = floor_char_boundary(&candidate, self.selection.head);
        self.commit(candidate, Selection { anchor, head })
    }

    /// Type `s` over the current selection and leave the cursor after it.
    pub fn replace_selection(&mut self, s: &str) -> EditOutcome {
        if self.locked {
            return EditOutcome::Ignored;
        }
        let range = self.selection.range();
        let caret = range.start + s.len();
        let candidate = splice(&self.text, range, s);
        self.commit(candidate, Selection::caret(caret))
    }

    pub fn insert_char(&mut self, c: char) -> EditOutcome {
        let mut buf = [0u8; 4];
        self.replace_selection(c.encode_utf8(&mut buf))
    }

    pub fn insert_newline(&mut self) -> EditOutcome {
        self.replace_selection("\n")
    }

    pub fn backspace(&mut self) -> EditOutcome {
        if self.locked {
            return EditOutcome::Ignored;
        }
        if !self.selection.is_empty() {
            return self.replace_selection("");
        }
        let head = self.selection.head;
        if head == 0 {
            return EditOutcome::Ignored;
        }
        let start = prev_char_boundary(&self.text, head);
        let candidate = splice(&self.text, start..head, "");
        self.commit(candidate, Selection::caret(start))
    }

    pub fn delete_forward(&mut self) -> EditOutcome {
        if self.locked {
            return EditOutcome::Ignored;
        }
        if !self.selection.is_empty() {
            return self.replace_selection("");
        }
        let head = self.selection.head;
        if head == self.text.len() {
            return EditOutcome::Ignored;
        }
        let end = next_char_boundary(&self.text, head);
        let candidate = splice(&self.text, head..end, "");
        self.commit(candidate, Selection::caret(head))
    }

    /// Set the selection, snapping both ends onto char boundaries.
    pub fn set_selection(&mut self, anchor: usize, head: usize) {
        self.selection = Selection {
            anchor: floor_char_boundary(&self.text, anchor),
            head: floor_char_boundary(&self.text, head),
        };
    }

    pub fn select_all(&mut self) {
        self.selection = Selection {
            anchor: 0,
            head: self.text.len(),
        };
    }

    pub fn move_left(&mut self, extend: bool) {
        let head = prev_char_boundary(&self.text, self.selection.head);
        self.move_head(head, extend);
    }

    pub fn move_right(&mut self, extend: bool) {
        let head = next_char_boundary(&self.text, self.selection.head);
        self.move_head(head, extend);
    }

    /// Start of the paragraph the cursor is in.
    pub fn move_home(&mut self, extend: bool) {
        let head = self.text[..self.selection.head]
            .rfind('\n')
            .map_or(0, |i| i + 1);
        self.move_head(head, extend);
    }

    /// End of the paragraph the cursor is in.
    pub fn move_end(&mut self, extend: bool) {
        let from = self.selection.head;
        let head = self.text[from..]
            .find('\n')
            .map_or(self.text.len(), |i| from + i);
        self.move_head(head, extend);
    }

    fn move_head(&mut self, head: usize, extend: bool) {
        self.selection = if extend {
            Selection {
                anchor: self.selection.anchor,
                head,
            }
        } else {
            Selection::caret(head)
        };
    }

    /// Put the selected text into the clipboard, replacing what was there.
    /// Returns false when nothing was copied.
    pub fn copy(&mut self) -> bool {
        if self.locked || self.selection.is_empty() {
            return false;
        }
        self.clipboard = Some(self.selected_text().to_string());
        true
    }

    pub fn paste(&mut self) -> EditOutcome {
        match self.clipboard.clone() {
            Some(clip) if !clip.is_empty() => self.replace_selection(&clip),
            _ => EditOutcome::Ignored,
        }
    }

    /// Wrap the selection in underscores. Goes through the same line gate as
    /// every other edit; on success the selection covers the wrapped text.
    pub fn underline(&mut self) -> EditOutcome {
        if self.locked || self.selection.is_empty() {
            return EditOutcome::Ignored;
        }
        let range = self.selection.range();
        let wrapped = format!("_{}_", &self.text[range.clone()]);
        let selection = Selection {
            anchor: range.start,
            head: range.start + wrapped.len(),
        };
        let candidate = splice(&self.text, range, &wrapped);
        self.commit(candidate, selection)
    }

    /// Advance the countdown by one second.
    pub fn on_tick(&mut self) -> TickOutcome {
        if self.locked {
            return TickOutcome::Ignored;
        }
        if self.seconds_remaining <= 1 {
            self.seconds_remaining = 0;
            self.lock();
            return TickOutcome::Expired;
        }
        self.seconds_remaining -= 1;
        TickOutcome::Running
    }

    /// Lock the session and derive the results snapshot. Repeated calls
    /// return the snapshot taken the first time.
    pub fn lock(&mut self) -> &ResultsReport {
        if !self.locked {
            self.locked = true;
            if let Some(store) = &self.draft_store {
                if let Err(e) = store.clear() {
                    warn!(error = %e, "could not clear draft on lock");
                }
            }
            let report = ResultsReport::from_lines(&self.lines, &self.config.thresholds);
            info!(
                total_lines = report.total_lines,
                total_words = report.total_words,
                seconds_remaining = self.seconds_remaining,
                "session locked"
            );
            self.report = Some(report);
        }
        self.report
            .get_or_insert_with(|| ResultsReport::from_lines(&self.lines, &self.config.thresholds))
    }

    fn commit(&mut self, candidate: String, selection: Selection) -> EditOutcome {
        if self.locked {
            return EditOutcome::Ignored;
        }

        let lines = segment(&candidate, self.config.capacity);
        if !self.config.thresholds.admits(lines.len()) {
            debug!(
                line_count = lines.len(),
                hard_limit = self.config.thresholds.hard_limit(),
                "edit rejected by line gate"
            );
            return EditOutcome::Rejected;
        }

        self.text = candidate;
        self.lines = lines;
        self.selection = selection;
        self.autosave();
        EditOutcome::Accepted
    }

    fn autosave(&self) {
        if let Some(store) = &self.draft_store {
            let draft = DraftRecord::now(&self.text, self.seconds_remaining);
            if let Err(e) = store.save(&draft) {
                warn!(error = %e, "autosave failed");
            }
        }
    }
}

fn splice(text: &str, range: Range<usize>, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len() - range.len() + replacement.len());
    out.push_str(&text[..range.start]);
    out.push_str(replacement);
    out.push_str(&text[range.end..]);
    out
}
