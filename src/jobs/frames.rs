//! `FRAMES` selection for jobs that can render frames of the authored animation.

use crate::foundation::core::FrameSpan;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKeyword {
    Start,
    End,
}

/// One `FRAMES` item: `"start"`, `"end"` or a frame number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(untagged)]
pub enum FrameSelector {
    Keyword(FrameKeyword),
    Frame(i32),
}

impl std::fmt::Display for FrameSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keyword(FrameKeyword::Start) => f.write_str("start"),
            Self::Keyword(FrameKeyword::End) => f.write_str("end"),
            Self::Frame(n) => write!(f, "{n}"),
        }
    }
}

/// Frames a job renders, resolved against the authored span.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramePlan {
    frames: Vec<i32>,
    start_requested: bool,
    end_requested: bool,
    has_animation_data: bool,
}

impl FramePlan {
    /// `[]` renders only the first frame and disables authored animation.
    pub fn resolve(request: &[FrameSelector], authored: FrameSpan) -> Self {
        let has_animation_data = !request.is_empty();
        let fallback = [FrameSelector::Keyword(FrameKeyword::Start)];
        let request = if has_animation_data { request } else { &fallback[..] };

        let mut frames: Vec<i32> = request
            .iter()
            .map(|sel| match sel {
                FrameSelector::Keyword(FrameKeyword::Start) => authored.start,
                FrameSelector::Keyword(FrameKeyword::End) => authored.end,
                FrameSelector::Frame(n) => *n,
            })
            .collect();
        frames.sort_unstable();
        frames.dedup();

        Self {
            frames,
            start_requested: has_animation_data
                && request.contains(&FrameSelector::Keyword(FrameKeyword::Start)),
            end_requested: request.contains(&FrameSelector::Keyword(FrameKeyword::End)),
            has_animation_data,
        }
    }

    pub fn frames(&self) -> &[i32] {
        &self.frames
    }

    pub fn has_animation_data(&self) -> bool {
        self.has_animation_data
    }

    /// Scene range covering every planned frame.
    pub fn span(&self) -> FrameSpan {
        let start = self.frames.first().copied().unwrap_or(1);
        let end = self.frames.last().copied().unwrap_or(start);
        FrameSpan { start, end }
    }

    /// File name suffix for `frame`.
    pub fn suffix(&self, frame: i32) -> String {
        if !self.has_animation_data {
            return String::new();
        }
        let span = self.span();
        if frame == span.end && self.end_requested {
            "_end".to_string()
        } else if frame == span.start && self.start_requested {
            "_start".to_string()
        } else {
            format!("_{frame:04}")
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/jobs/frames.rs"]
mod tests;
