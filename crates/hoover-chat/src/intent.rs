//! Small-talk detection.

/// Canned social exchanges answered without searching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmallTalk {
    /// "welcome" in any form.
    Welcome,
    Hello,
    Thanks,
}

impl SmallTalk {
    /// Checked in order; the first keyword found wins.
    const KEYWORDS: [(&'static str, SmallTalk); 3] = [
        ("welcome", SmallTalk::Welcome),
        ("hello", SmallTalk::Hello),
        ("thank", SmallTalk::Thanks),
    ];

    /// Detect small talk by substring match on the lowercased text.
    pub fn detect(text: &str) -> Option<Self> {
        let lowered = text.to_lowercase();
        Self::KEYWORDS
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword))
            .map(|(_, talk)| *talk)
    }

    pub fn response(&self) -> &'static str {
        match self {
            SmallTalk::Welcome => "Thank you, it's my pleasure to be here. What can I do for you?",
            SmallTalk::Hello => "Hello! Good to meet you. What are you interested in today?",
            SmallTalk::Thanks => "You're most welcome. How can I assist you?",
        }
    }
}

/// What a message turn asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnIntent {
    SmallTalk(SmallTalk),
    Search,
}

impl TurnIntent {
    pub fn classify(text: &str) -> Self {
        match SmallTalk::detect(text) {
            Some(talk) => TurnIntent::SmallTalk(talk),
            None => TurnIntent::Search,
        }
    }
}
