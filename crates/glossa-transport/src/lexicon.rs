//! Offline lexicon provider
//!
//! Synthesises payloads locally: known glosses get a linguistic
//! approximation, anything else is fingerspelled.

use std::collections::HashMap;

use glossa_core::{AnimationPayload, LinguisticProps, Location, MovementClass, DEFAULT_FPS};

use crate::{PoseProvider, ProviderFuture};

/// Frames each fingerspelled letter is held for
pub const FRAMES_PER_LETTER: u32 = 20;

/// One lexicon sign
#[derive(Debug, Clone, PartialEq)]
pub struct LexiconEntry {
    pub props: LinguisticProps,
    pub frame_count: u32,
}

impl LexiconEntry {
    pub fn new(movement: MovementClass, location: Location, handshape: &str, frame_count: u32) -> Self {
        let mut props = LinguisticProps::new(movement, location);
        props.handshape = Some(handshape.to_string());
        LexiconEntry { props, frame_count }
    }
}

/// Provider backed by a built-in sign lexicon
#[derive(Debug, Clone)]
pub struct LexiconProvider {
    entries: HashMap<String, LexiconEntry>,
}

impl LexiconProvider {
    /// Lexicon with the built-in signs
    pub fn new() -> Self {
        use Location::*;
        use MovementClass::*;

        let mut provider = Self::empty();
        provider.insert("HELLO", LexiconEntry::new(Wave, Head, "flat_hand", 60));
        provider.insert("THANK-YOU", LexiconEntry::new(Forward, Head, "flat_hand", 45));
        provider.insert("PLEASE", LexiconEntry::new(Circular, Chest, "flat_hand", 60));
        provider.insert("YES", LexiconEntry::new(Static, Chest, "fist", 30));
        provider.insert("NO", LexiconEntry::new(Downward, Side, "index_point", 30));
        provider.insert("YOU", LexiconEntry::new(Forward, Chest, "index_point", 30));
        provider.insert("ME", LexiconEntry::new(Static, Chest, "index_point", 30));
        provider.insert("GOOD", LexiconEntry::new(Downward, Head, "flat_hand", 45));
        provider.insert("BAD", LexiconEntry::new(Downward, Head, "flat_hand", 45));
        provider
    }

    /// Lexicon with no signs; every gloss is fingerspelled
    pub fn empty() -> Self {
        LexiconProvider {
            entries: HashMap::new(),
        }
    }

    /// Add or replace a sign
    pub fn insert(&mut self, gloss: &str, entry: LexiconEntry) {
        self.entries.insert(normalize(gloss), entry);
    }

    pub fn contains(&self, gloss: &str) -> bool {
        self.entries.contains_key(&normalize(gloss))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the payload for a gloss
    pub fn synthesize(&self, gloss: &str) -> AnimationPayload {
        if let Some(entry) = self.entries.get(&normalize(gloss)) {
            return AnimationPayload::LinguisticApprox {
                props: entry.props.clone(),
                frame_count: entry.frame_count,
                fps: DEFAULT_FPS,
            };
        }

        let letters: Vec<char> = gloss
            .chars()
            .filter(|c| c.is_alphabetic())
            .flat_map(char::to_uppercase)
            .collect();
        if letters.is_empty() {
            return AnimationPayload::error(format!("nothing to sign for {gloss:?}"));
        }

        AnimationPayload::Fingerspelling {
            frame_count: letters.len() as u32 * FRAMES_PER_LETTER,
            letters,
            fps: DEFAULT_FPS,
        }
    }
}

impl Default for LexiconProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseProvider for LexiconProvider {
    fn fetch<'a>(&'a self, gloss: &'a str) -> ProviderFuture<'a> {
        Box::pin(std::future::ready(Ok(self.synthesize(gloss))))
    }
}

fn normalize(gloss: &str) -> String {
    gloss.trim().to_uppercase()
}
