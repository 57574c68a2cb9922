// src/prompt/levels.rs
// Audience levels and their instruction templates

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ExplainerError;

// Every template starts with this so answers open with a standalone definition
const DEFINITION_INSTRUCTION: &str = "IMPORTANT: Start your response with a single, clean one-sentence definition of the topic on its own line. This definition should be clear and standalone. Then add a blank line before continuing with your explanation.

Format:
[One-sentence definition]

[Rest of explanation...]

";

const CHILD_BASIC_PROMPT: &str = "You are explaining to a 5-year-old child. Use:
- Very simple words (1-2 syllables when possible)
- Fun analogies with toys, animals, or everyday objects they know
- Short sentences (5-10 words)
- A playful, enthusiastic tone
- Comparisons to things like cookies, playground, family, cartoons
- Questions to keep them engaged (\"You know how...\")";

const CHILD_INTERMEDIATE_PROMPT: &str = "You are explaining to a 10-year-old child. Use:
- Simple but slightly more advanced vocabulary
- Relatable examples from school, sports, video games, or popular culture
- Clear cause-and-effect explanations
- An encouraging, curious tone
- Some basic numbers and comparisons
- References to things they might learn in elementary school";

const TEEN_PROMPT: &str = "You are explaining to a high school student (ages 14-18). Use:
- Technical terms with clear definitions when first introduced
- Structured explanations with logical flow
- Real-world applications and current events connections
- Some mathematical or scientific concepts where relevant
- A respectful, informative tone
- Connections to subjects they study (biology, physics, history, etc.)";

const UNDERGRADUATE_PROMPT: &str = "You are explaining to a college/university student. Use:
- Academic vocabulary and discipline-specific terminology
- Theoretical foundations and frameworks
- Critical analysis and multiple perspectives
- References to research and scholarly concepts
- Nuanced explanations with appropriate complexity
- Connections to broader academic disciplines";

const GRADUATE_PROMPT: &str = "You are explaining to a graduate student or advanced learner. Use:
- Sophisticated technical language
- Deep theoretical analysis and methodological considerations
- Current research trends and debates in the field
- Interdisciplinary connections and implications
- Critical evaluation of assumptions and limitations
- References to seminal works and contemporary developments";

const EXPERT_PROMPT: &str = "You are explaining to a domain expert or professional. Use:
- Highly specialized terminology without simplification
- Cutting-edge developments and frontier research
- Nuanced technical details and edge cases
- Industry-specific considerations and best practices
- Assumed deep background knowledge
- Focus on novel insights, recent advances, and practical implications";

/// Audience comprehension tier, ordered from simplest to most advanced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    #[default]
    ChildBasic,
    ChildIntermediate,
    Teen,
    Undergraduate,
    Graduate,
    Expert,
}

/// Static description of one level
#[derive(Debug, Clone, Serialize)]
pub struct LevelConfig {
    pub id: &'static str,
    pub label: &'static str,
    pub short_label: &'static str,
    #[serde(skip)]
    pub audience: &'static str,
}

impl LevelConfig {
    /// Full instruction text sent ahead of the topic
    pub fn instruction(&self) -> String {
        format!("{}{}", DEFINITION_INSTRUCTION, self.audience)
    }
}

static LEVEL_CONFIGS: [LevelConfig; 6] = [
    LevelConfig {
        id: "child-basic",
        label: "5 Year Old",
        short_label: "5yo",
        audience: CHILD_BASIC_PROMPT,
    },
    LevelConfig {
        id: "child-intermediate",
        label: "10 Year Old",
        short_label: "10yo",
        audience: CHILD_INTERMEDIATE_PROMPT,
    },
    LevelConfig {
        id: "teen",
        label: "High School",
        short_label: "HS",
        audience: TEEN_PROMPT,
    },
    LevelConfig {
        id: "undergraduate",
        label: "College",
        short_label: "College",
        audience: UNDERGRADUATE_PROMPT,
    },
    LevelConfig {
        id: "graduate",
        label: "Graduate",
        short_label: "Grad",
        audience: GRADUATE_PROMPT,
    },
    LevelConfig {
        id: "expert",
        label: "Expert",
        short_label: "Expert",
        audience: EXPERT_PROMPT,
    },
];

impl Level {
    pub const ALL: [Level; 6] = [
        Level::ChildBasic,
        Level::ChildIntermediate,
        Level::Teen,
        Level::Undergraduate,
        Level::Graduate,
        Level::Expert,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Catalog entry for this level
    pub fn config(self) -> &'static LevelConfig {
        &LEVEL_CONFIGS[self.index()]
    }

    pub fn id(self) -> &'static str {
        self.config().id
    }

    pub fn label(self) -> &'static str {
        self.config().label
    }

    /// Identifier used by earlier clients ("5-year-old", "college", ...)
    pub fn legacy_id(self) -> &'static str {
        match self {
            Level::ChildBasic => "5-year-old",
            Level::ChildIntermediate => "10-year-old",
            Level::Teen => "high-school",
            Level::Undergraduate => "college",
            Level::Graduate => "graduate",
            Level::Expert => "expert",
        }
    }

    /// Next simpler level, `None` at the bottom
    pub fn previous(self) -> Option<Level> {
        self.index().checked_sub(1).map(|i| Level::ALL[i])
    }

    /// Next more advanced level, `None` at the top
    pub fn next(self) -> Option<Level> {
        Level::ALL.get(self.index() + 1).copied()
    }
}

impl FromStr for Level {
    type Err = ExplainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Level::ALL
            .into_iter()
            .find(|level| level.id() == needle || level.legacy_id() == needle)
            .ok_or_else(|| ExplainerError::UnknownLevel(s.to_string()))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// All levels in order
pub fn levels() -> &'static [LevelConfig] {
    &LEVEL_CONFIGS
}

/// Look up the catalog entry for a level identifier
pub fn get_config(level: &str) -> crate::error::Result<&'static LevelConfig> {
    level.parse::<Level>().map(Level::config)
}

/// Instruction text for a level identifier
pub fn get_prompt_for_level(level: &str) -> crate::error::Result<String> {
    get_config(level).map(LevelConfig::instruction)
}
