//! Stock action handlers.
//!
//! | Handler             | Does                                           |
//! |---------------------|------------------------------------------------|
//! | `CancelHandler`     | sets the shared cancel token                   |
//! | `AnnounceHandler`   | speaks the event message                       |
//! | `RecordMemoHandler` | prompt, then record a voice memo until cancel  |
//! | `BriefingHandler`   | greeting, then one spoken segment per source   |

use anyhow::Context;
use log::{info, warn};

use crate::cancel::CancelToken;

use super::ports::{ActionHandler, ContentSource, MemoRecorder, Speaker};

/// Asks whatever handler is running to stop.  Attach it to a concurrent
/// event object so it can run while the dispatcher is busy.
#[derive(Debug, Default, Clone, Copy)]
pub struct CancelHandler;

impl ActionHandler for CancelHandler {
    fn handle(&self, cancel: &CancelToken, message: &str) -> anyhow::Result<()> {
        info!("cancel requested ({})", message);
        cancel.cancel();
        Ok(())
    }
}

/// Speaks the event message as-is.
pub struct AnnounceHandler<S> {
    speaker: S,
}

impl<S: Speaker> AnnounceHandler<S> {
    pub fn new(speaker: S) -> Self {
        Self { speaker }
    }
}

impl<S: Speaker> ActionHandler for AnnounceHandler<S> {
    fn handle(&self, cancel: &CancelToken, message: &str) -> anyhow::Result<()> {
        self.speaker.speak(cancel, message)
    }
}

/// Spoken before recording starts.
pub const RECORD_PROMPT: &str = "Please start recording (hover CANCEL to end recording)...";
/// Spoken once the memo is stored.
pub const RECORD_DONE: &str = "Recording completed.";

/// Records a voice memo until the cancel sensor is hovered or the
/// recorder's limit is reached.
///
/// The prompt is spoken on a private token so it always plays in full,
/// and a cancel raised during it is discarded.  The cancel that ends the
/// recording is cleared before the confirmation.
pub struct RecordMemoHandler<M, S> {
    recorder: M,
    speaker: S,
}

impl<M: MemoRecorder, S: Speaker> RecordMemoHandler<M, S> {
    pub fn new(recorder: M, speaker: S) -> Self {
        Self { recorder, speaker }
    }
}

impl<M: MemoRecorder, S: Speaker> ActionHandler for RecordMemoHandler<M, S> {
    fn handle(&self, cancel: &CancelToken, message: &str) -> anyhow::Result<()> {
        info!("memo recording requested ({})", message);
        self.speaker
            .speak(&CancelToken::new(), RECORD_PROMPT)
            .context("speaking record prompt")?;
        cancel.reset();
        self.recorder.record(cancel).context("recording memo")?;
        cancel.reset();
        self.speaker.speak(cancel, RECORD_DONE).context("speaking confirmation")
    }
}

/// Fixed text, for greetings and tests.
#[derive(Debug, Clone)]
pub struct StaticContent(pub String);

impl ContentSource for StaticContent {
    fn fetch(&self) -> anyhow::Result<String> {
        Ok(self.0.clone())
    }
}

enum Segment {
    Content {
        title: String,
        source: Box<dyn ContentSource>,
    },
    Memo {
        title: String,
        recorder: Box<dyn MemoRecorder>,
    },
}

impl Segment {
    fn title(&self) -> &str {
        match self {
            Self::Content { title, .. } | Self::Memo { title, .. } => title,
        }
    }
}

/// A greeting followed by a list of titled segments.
///
/// Cancelling skips the segment being spoken, not the whole briefing: the
/// token is cleared after every segment.  A source that fails to fetch, or
/// a memo that fails to play, is logged and skipped.
pub struct BriefingHandler<S> {
    speaker: S,
    greeting: String,
    segments: Vec<Segment>,
}

impl<S: Speaker> BriefingHandler<S> {
    pub fn new(speaker: S, greeting: impl Into<String>) -> Self {
        Self {
            speaker,
            greeting: greeting.into(),
            segments: Vec::new(),
        }
    }

    pub fn segment(
        mut self,
        title: impl Into<String>,
        source: impl ContentSource + 'static,
    ) -> Self {
        self.segments.push(Segment::Content {
            title: title.into(),
            source: Box::new(source),
        });
        self
    }

    /// Play back the memo held by `recorder`; skipped when none exists.
    pub fn memo(mut self, title: impl Into<String>, recorder: impl MemoRecorder + 'static) -> Self {
        self.segments.push(Segment::Memo {
            title: title.into(),
            recorder: Box::new(recorder),
        });
        self
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    fn speak_title(&self, cancel: &CancelToken, title: &str) -> anyhow::Result<()> {
        self.speaker
            .speak(cancel, title)
            .with_context(|| format!("speaking title '{}'", title))
    }

    fn finish_segment(&self, cancel: &CancelToken, title: &str) {
        if cancel.is_cancelled() {
            info!("briefing: '{}' skipped", title);
        }
        cancel.reset();
    }
}

impl<S: Speaker> ActionHandler for BriefingHandler<S> {
    fn handle(&self, cancel: &CancelToken, message: &str) -> anyhow::Result<()> {
        info!("briefing started ({})", message);
        self.speaker
            .speak(cancel, &self.greeting)
            .context("speaking greeting")?;
        self.finish_segment(cancel, "greeting");

        for segment in &self.segments {
            match segment {
                Segment::Content { title, source } => {
                    let body = match source.fetch() {
                        Ok(body) => body,
                        Err(e) => {
                            warn!("briefing: '{}' unavailable: {:#}", title, e);
                            continue;
                        }
                    };
                    self.speak_title(cancel, title)?;
                    if !cancel.is_cancelled() {
                        self.speaker
                            .speak(cancel, &body)
                            .with_context(|| format!("speaking '{}'", title))?;
                    }
                }
                Segment::Memo { title, recorder } => {
                    self.speak_title(cancel, title)?;
                    if !cancel.is_cancelled() {
                        match recorder.play(cancel) {
                            Ok(true) => {}
                            Ok(false) => info!("briefing: no memo recorded"),
                            Err(e) => warn!("briefing: '{}' failed to play: {:#}", title, e),
                        }
                    }
                }
            }
            self.finish_segment(cancel, segment.title());
        }
        info!("briefing finished");
        Ok(())
    }
}
