//! Flavour text, the transient message board and the commentary director.
//!
//! The board shows one message at a time; a new post replaces the old one
//! and every message hides itself after `message_duration_ms`.
//!
//! The [`CommentaryDirector`] decides whether a cosmetic line may be shown
//! at all: it spaces lines out by priority and makes the enemy and neutral
//! voices take turns. System hints and AI remarks bypass it.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Who is talking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Speaker {
    /// Game hints and rejections.
    System,
    /// Neutral villagers.
    Villagers,
    /// A neutral traveller.
    Traveler,
    /// A neutral merchant.
    Merchant,
    /// The AI commander.
    EnemyCommander,
    /// The AI's scout.
    EnemyScout,
    /// Reports the player's captures.
    Messenger,
    /// Reports the player's losses.
    Sentry,
    /// Reports the enemy's expansion.
    Scout,
}

impl Speaker {
    /// Name shown next to the line.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::System => "",
            Self::Villagers => "Villagers",
            Self::Traveler => "Traveler",
            Self::Merchant => "Merchant",
            Self::EnemyCommander => "Enemy Commander",
            Self::EnemyScout => "Enemy Scout",
            Self::Messenger => "Messenger",
            Self::Sentry => "Sentry",
            Self::Scout => "Scout",
        }
    }
}

/// Kinds of remark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentCategory {
    /// The AI took a building.
    AiConquest,
    /// The AI lost a building.
    AiLoss,
    /// The AI attacked a neutral building.
    AiNeutral,
    /// The AI attacked the player.
    AiTaunt,
    /// The AI changed strategy.
    AiStrategy,
    /// Neutral small talk.
    NeutralIdle,
    /// Neutrals helping each other.
    NeutralSupport,
    /// Neutrals watching troops on the move.
    Battle,
    /// The player took a building.
    PlayerCaptured,
    /// The player lost a building.
    PlayerLost,
    /// The AI took a neutral building.
    EnemySpreads,
}

const AI_CONQUEST: &[&str] = &[
    "Another banner falls. Yours will be next.",
    "That outpost belongs to me now.",
    "Did you really think they could hold?",
    "One more step toward your gates.",
];

const AI_LOSS: &[&str] = &[
    "A minor setback. Nothing more.",
    "Enjoy it while it lasts.",
    "You will pay for that building in blood.",
    "Scout, why was I not warned?",
];

const AI_NEUTRAL: &[&str] = &[
    "Those villages will serve me, willing or not.",
    "Neutrality is a luxury nobody can afford.",
    "More land, more soldiers.",
];

const AI_TAUNT: &[&str] = &[
    "Your days are numbered!",
    "Your defences are as thin as your patience.",
    "Surrender now and I may spare your fields.",
    "My troops outnumber yours three to one.",
    "I will dine in the ruins of your keep.",
];

const AI_STRATEGY: &[&str] = &[
    "Time to change the plan.",
    "The wind has turned. So shall we.",
    "New orders for every garrison.",
];

const NEUTRAL_IDLE: &[&str] = &[
    "Another day, another battle in the distance.",
    "Hopefully they just march past...",
    "The wind carries strange rumours today.",
    "My hens stopped laying with all this marching.",
    "Was that a war cry or just the neighbour?",
    "If this goes on I am moving across the river.",
    "They say the beer is better on the other side.",
];

const NEUTRAL_SUPPORT: &[&str] = &[
    "Hold on, neighbours, help is on the way!",
    "We look after our own.",
    "Send what we can spare to the east village.",
    "Nobody gets left behind out here.",
];

const BATTLE: &[&str] = &[
    "Soldiers on the road again. Bar the doors.",
    "I can hear the drums from here.",
    "Somebody is going to lose a lot of boots today.",
];

const PLAYER_CAPTURED: &[&str] = &[
    "Our troops have taken new ground!",
    "The banner is raised. The building is ours.",
];

const PLAYER_LOST: &[&str] = &[
    "The enemy has taken one of our territories!",
    "We have lost a building to the enemy.",
];

const ENEMY_SPREADS: &[&str] = &[
    "The enemy spreads further, my lord.",
    "Another village flies the enemy colours.",
];

impl CommentCategory {
    /// Every category.
    pub const ALL: [Self; 11] = [
        Self::AiConquest,
        Self::AiLoss,
        Self::AiNeutral,
        Self::AiTaunt,
        Self::AiStrategy,
        Self::NeutralIdle,
        Self::NeutralSupport,
        Self::Battle,
        Self::PlayerCaptured,
        Self::PlayerLost,
        Self::EnemySpreads,
    ];

    /// Lines of this category.
    #[must_use]
    pub const fn lines(self) -> &'static [&'static str] {
        match self {
            Self::AiConquest => AI_CONQUEST,
            Self::AiLoss => AI_LOSS,
            Self::AiNeutral => AI_NEUTRAL,
            Self::AiTaunt => AI_TAUNT,
            Self::AiStrategy => AI_STRATEGY,
            Self::NeutralIdle => NEUTRAL_IDLE,
            Self::NeutralSupport => NEUTRAL_SUPPORT,
            Self::Battle => BATTLE,
            Self::PlayerCaptured => PLAYER_CAPTURED,
            Self::PlayerLost => PLAYER_LOST,
            Self::EnemySpreads => ENEMY_SPREADS,
        }
    }

    /// Speakers who may deliver a line of this category.
    #[must_use]
    pub const fn speakers(self) -> &'static [Speaker] {
        match self {
            Self::AiConquest | Self::AiTaunt => &[Speaker::EnemyCommander],
            Self::AiLoss | Self::AiNeutral | Self::AiStrategy => {
                &[Speaker::EnemyCommander, Speaker::EnemyScout]
            }
            Self::NeutralIdle => &[Speaker::Villagers, Speaker::Traveler, Speaker::Merchant],
            Self::NeutralSupport => &[Speaker::Villagers, Speaker::Merchant],
            Self::Battle => &[Speaker::Villagers, Speaker::Traveler],
            Self::PlayerCaptured => &[Speaker::Messenger],
            Self::PlayerLost => &[Speaker::Sentry],
            Self::EnemySpreads => &[Speaker::Scout],
        }
    }

    /// Pick a random speaker and line.
    pub fn pick<R: Rng + ?Sized>(self, rng: &mut R) -> (Speaker, &'static str) {
        let speaker = self
            .speakers()
            .choose(rng)
            .copied()
            .unwrap_or(Speaker::System);
        let line = self.lines().choose(rng).copied().unwrap_or_default();
        (speaker, line)
    }
}

/// A message on the board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    /// Who said it.
    pub speaker: Speaker,
    /// What was said.
    pub text: String,
    /// When it disappears.
    pub expires_ms: u64,
}

impl Message {
    /// Text prefixed with the speaker's name.
    #[must_use]
    pub fn render(&self) -> String {
        match self.speaker {
            Speaker::System => self.text.clone(),
            speaker => format!("{}: {}", speaker.display_name(), self.text),
        }
    }
}

/// Holds at most one message; last write wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageBoard {
    current: Option<Message>,
}

impl MessageBoard {
    /// Post a message, replacing whatever is shown.
    pub fn post(&mut self, speaker: Speaker, text: impl Into<String>, now_ms: u64, duration_ms: u64) {
        self.current = Some(Message {
            speaker,
            text: text.into(),
            expires_ms: now_ms.saturating_add(duration_ms),
        });
    }

    /// Hide the message once it has expired.
    pub fn expire(&mut self, now_ms: u64) {
        if self.current.as_ref().is_some_and(|m| now_ms >= m.expires_ms) {
            self.current = None;
        }
    }

    /// Message currently shown.
    #[must_use]
    pub fn current(&self) -> Option<&Message> {
        self.current.as_ref()
    }

    /// Remove any message.
    pub fn clear(&mut self) {
        self.current = None;
    }
}

/// Cooldowns the director picks from after each line.
pub const COOLDOWNS_MS: [u64; 4] = [8_000, 10_000, 12_000, 15_000];
/// Spacing required before a high-priority line.
pub const EVENT_COOLDOWN_MS: u64 = 4_000;
/// Delay between the session start and the enemy's opening taunt.
pub const OPENING_TAUNT_DELAY_MS: u64 = 5_000;
/// Lines one voice may deliver in a row before the other must speak.
pub const MAX_CONSECUTIVE_VOICE: u32 = 2;
/// Interval between ambient commentary attempts.
pub const AMBIENT_CHECK_MS: u64 = 8_000;
/// Chance that an ambient attempt produces a line.
const AMBIENT_CHANCE_PERCENT: u32 = 30;
/// Chance that the turn passes to the other voice.
const ALTERNATE_PERCENT: u32 = 70;

/// How urgently a line wants the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Events; ignores turn order.
    High,
    /// Needs half the current cooldown.
    Medium,
    /// Needs the full current cooldown.
    Low,
}

/// Side a cosmetic line speaks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Voice {
    /// The AI's people.
    Enemy,
    /// Villagers, travellers and merchants.
    Neutral,
    /// Capture and loss reports; outside the turn order.
    Event,
}

impl Voice {
    const fn other(self) -> Self {
        match self {
            Self::Enemy => Self::Neutral,
            Self::Neutral | Self::Event => Self::Enemy,
        }
    }
}

/// Spaces out cosmetic lines and alternates enemy and neutral voices.
///
/// Low and medium lines only play on their voice's turn, so neither voice
/// gets more than [`MAX_CONSECUTIVE_VOICE`] of them in a row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentaryDirector {
    last_line_ms: Option<u64>,
    cooldown_ms: u64,
    pub(crate) next_voice: Voice,
    last_voice: Option<Voice>,
    streak: u32,
    started_ms: u64,
    opening_taunt_done: bool,
    last_ambient_ms: u64,
}

impl CommentaryDirector {
    /// Fresh director for a session starting at `now_ms`. The enemy speaks first.
    #[must_use]
    pub const fn new(now_ms: u64) -> Self {
        Self {
            last_line_ms: None,
            cooldown_ms: COOLDOWNS_MS[0],
            next_voice: Voice::Enemy,
            last_voice: None,
            streak: 0,
            started_ms: now_ms,
            opening_taunt_done: false,
            last_ambient_ms: now_ms,
        }
    }

    /// Voice whose turn it is.
    #[must_use]
    pub const fn next_voice(&self) -> Voice {
        self.next_voice
    }

    /// Current low-priority cooldown.
    #[must_use]
    pub const fn cooldown_ms(&self) -> u64 {
        self.cooldown_ms
    }

    /// Spacing a line of `priority` needs since the previous one.
    #[must_use]
    pub const fn required_cooldown(&self, priority: Priority) -> u64 {
        match priority {
            Priority::High => EVENT_COOLDOWN_MS,
            Priority::Medium => self.cooldown_ms / 2,
            Priority::Low => self.cooldown_ms,
        }
    }

    /// Whether enough time has passed for a line of `priority`.
    #[must_use]
    pub fn can_speak(&self, priority: Priority, now_ms: u64) -> bool {
        self.last_line_ms.map_or(true, |last| {
            now_ms.saturating_sub(last) >= self.required_cooldown(priority)
        })
    }

    /// Whether `voice` may speak now, ignoring timing.
    #[must_use]
    pub fn is_turn_of(&self, voice: Voice, priority: Priority) -> bool {
        priority == Priority::High || voice == Voice::Event || voice == self.next_voice
    }

    /// Claim the board for one line. Returns `false` when the line must
    /// not be shown; otherwise records it and hands out the next turn.
    pub fn try_speak<R: Rng + ?Sized>(
        &mut self,
        voice: Voice,
        priority: Priority,
        now_ms: u64,
        rng: &mut R,
    ) -> bool {
        if !self.can_speak(priority, now_ms) || !self.is_turn_of(voice, priority) {
            return false;
        }
        self.last_line_ms = Some(now_ms);
        self.cooldown_ms = COOLDOWNS_MS.choose(rng).copied().unwrap_or(COOLDOWNS_MS[0]);

        if voice != Voice::Event {
            self.streak = if self.last_voice == Some(voice) {
                self.streak + 1
            } else {
                1
            };
            self.last_voice = Some(voice);
            self.next_voice = if self.streak >= MAX_CONSECUTIVE_VOICE
                || rng.random_range(0..100) < ALTERNATE_PERCENT
            {
                voice.other()
            } else {
                voice
            };
        }
        true
    }

    /// Whether the opening taunt is due; marks it done when it is.
    pub fn take_opening_taunt(&mut self, now_ms: u64) -> bool {
        if self.opening_taunt_done
            || now_ms.saturating_sub(self.started_ms) < OPENING_TAUNT_DELAY_MS
        {
            return false;
        }
        self.opening_taunt_done = true;
        true
    }

    /// Voice for an ambient line, if this check produces one.
    ///
    /// Checks run every [`AMBIENT_CHECK_MS`]; each succeeds with a 30% roll.
    pub fn ambient_voice<R: Rng + ?Sized>(&mut self, now_ms: u64, rng: &mut R) -> Option<Voice> {
        if now_ms.saturating_sub(self.last_ambient_ms) < AMBIENT_CHECK_MS {
            return None;
        }
        self.last_ambient_ms = now_ms;
        (rng.random_range(0..100) < AMBIENT_CHANCE_PERCENT).then_some(self.next_voice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_every_category_has_lines_and_speakers() {
        for category in CommentCategory::ALL {
            assert!(!category.lines().is_empty());
            assert!(!category.speakers().is_empty());
        }
    }

    #[test]
    fn test_pick_uses_category_speakers() {
        let mut rng = SmallRng::seed_from_u64(0);
        for _ in 0..20 {
            let (speaker, line) = CommentCategory::NeutralIdle.pick(&mut rng);
            assert!(CommentCategory::NeutralIdle.speakers().contains(&speaker));
            assert!(NEUTRAL_IDLE.contains(&line));
        }
    }

    #[test]
    fn test_board_last_write_wins_and_expires() {
        let mut board = MessageBoard::default();
        board.post(Speaker::System, "first", 0, 3_000);
        board.post(Speaker::Villagers, "second", 1_000, 3_000);
        assert_eq!(board.current().map(|m| m.text.as_str()), Some("second"));

        board.expire(3_999);
        assert!(board.current().is_some());
        board.expire(4_000);
        assert!(board.current().is_none());
    }

    #[test]
    fn test_render_prefixes_speaker() {
        let message = Message {
            speaker: Speaker::Merchant,
            text: "Fine wares!".into(),
            expires_ms: 0,
        };
        assert_eq!(message.render(), "Merchant: Fine wares!");
    }

    #[test]
    fn test_director_spacing_by_priority() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut director = CommentaryDirector::new(0);
        assert!(director.try_speak(Voice::Enemy, Priority::Low, 0, &mut rng));

        assert!(!director.try_speak(Voice::Event, Priority::High, 3_999, &mut rng));
        assert!(director.try_speak(Voice::Event, Priority::High, 4_000, &mut rng));

        let cooldown = director.cooldown_ms();
        assert!(COOLDOWNS_MS.contains(&cooldown));
        assert!(!director.can_speak(Priority::Medium, 4_000 + cooldown / 2 - 1));
        assert!(director.can_speak(Priority::Medium, 4_000 + cooldown / 2));
        assert!(!director.can_speak(Priority::Low, 4_000 + cooldown - 1));
        assert!(director.can_speak(Priority::Low, 4_000 + cooldown));
    }

    #[test]
    fn test_director_enemy_speaks_first() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut director = CommentaryDirector::new(0);
        assert!(!director.try_speak(Voice::Neutral, Priority::Medium, 0, &mut rng));
        assert!(!director.try_speak(Voice::Neutral, Priority::Low, 0, &mut rng));
        assert!(director.try_speak(Voice::Enemy, Priority::Low, 0, &mut rng));
    }

    #[test]
    fn test_event_lines_keep_turn_order() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut director = CommentaryDirector::new(0);
        assert!(director.try_speak(Voice::Event, Priority::High, 0, &mut rng));
        assert_eq!(director.next_voice(), Voice::Enemy);
    }

    #[test]
    fn test_director_alternates_voices() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut director = CommentaryDirector::new(0);
        let mut spoken = Vec::new();
        for step in 0..400u64 {
            let now = step * 20_000;
            for voice in [Voice::Enemy, Voice::Neutral] {
                if director.try_speak(voice, Priority::Low, now, &mut rng) {
                    spoken.push(voice);
                }
            }
        }

        assert_eq!(spoken.len(), 400);
        assert!(spoken.windows(3).all(|w| !(w[0] == w[1] && w[1] == w[2])));
        let neutral = spoken.iter().filter(|v| **v == Voice::Neutral).count();
        assert!((100..300).contains(&neutral), "neutral lines: {neutral}");
        // Some turns repeat a voice, most alternate.
        assert!(spoken.windows(2).any(|w| w[0] == w[1]));
    }

    #[test]
    fn test_opening_taunt_once_after_delay() {
        let mut director = CommentaryDirector::new(1_000);
        assert!(!director.take_opening_taunt(5_999));
        assert!(director.take_opening_taunt(6_000));
        assert!(!director.take_opening_taunt(60_000));
    }

    #[test]
    fn test_ambient_checks_are_spaced() {
        let mut rng = SmallRng::seed_from_u64(6);
        let mut director = CommentaryDirector::new(0);
        assert_eq!(director.ambient_voice(7_999, &mut rng), None);

        let mut hits = 0;
        for check in 1..=200u64 {
            let now = check * AMBIENT_CHECK_MS;
            if let Some(voice) = director.ambient_voice(now, &mut rng) {
                assert_eq!(voice, director.next_voice());
                hits += 1;
            }
            // Immediately after a check nothing is due.
            assert_eq!(director.ambient_voice(now + 1, &mut rng), None);
        }
        assert!((20..120).contains(&hits), "ambient hits: {hits}");
    }
}
