//! Style prompt construction
//!
//! Deterministic mapping from a style strength to the instruction text and
//! creativity parameter sent with the generation request.

use serde::{Deserialize, Serialize};

/// Creativity parameter for the balanced preset
const BALANCED_TEMPERATURE: f32 = 0.65;

/// Creativity parameter for the strong preset
const STRONG_TEMPERATURE: f32 = 0.75;

/// Stylistic constraints shared by both presets
const BASE_STYLE: &str = "Redraw this photo in the art style of the animated series Rick and Morty: \
     bold clean line art, flat cel-shaded coloring, and the show's signature \
     large round eyes with small pupils and thin squiggly mouths.";

/// How aggressively the style is applied to the subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StyleStrength {
    /// Preserve likeness, pose and expression; apply the style over them
    #[default]
    Balanced,
    /// Full caricature treatment; likeness may suffer
    Strong,
}

impl StyleStrength {
    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "balanced" => Some(Self::Balanced),
            "strong" => Some(Self::Strong),
            _ => None,
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::Strong => "strong",
        }
    }
}

impl std::fmt::Display for StyleStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Instruction payload for a generation request
#[derive(Debug, Clone, PartialEq)]
pub struct StylePrompt {
    /// Natural-language instruction text
    pub text: String,
    /// Creativity/temperature setting for the request
    pub temperature: f32,
}

impl StylePrompt {
    /// Build the prompt for the given strength
    pub fn build(strength: StyleStrength) -> Self {
        match strength {
            StyleStrength::Strong => Self {
                text: format!(
                    "{} Exaggerate the proportions and features into an aggressive \
                     caricature, the way the show draws its side characters. A close \
                     likeness to the subject is not required.",
                    BASE_STYLE
                ),
                temperature: STRONG_TEMPERATURE,
            },
            StyleStrength::Balanced => Self {
                text: format!(
                    "{} Keep the subject's likeness, pose and expression intact, \
                     applying the style over them rather than redesigning the subject.",
                    BASE_STYLE
                ),
                temperature: BALANCED_TEMPERATURE,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_parse() {
        assert_eq!(StyleStrength::parse("balanced"), Some(StyleStrength::Balanced));
        assert_eq!(StyleStrength::parse("Strong"), Some(StyleStrength::Strong));
        assert_eq!(StyleStrength::parse("extreme"), None);
    }

    #[test]
    fn test_strength_display() {
        assert_eq!(StyleStrength::Balanced.to_string(), "balanced");
        assert_eq!(StyleStrength::Strong.to_string(), "strong");
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let first = StylePrompt::build(StyleStrength::Strong);
        let second = StylePrompt::build(StyleStrength::Strong);
        assert_eq!(first, second);
        assert_eq!(first.temperature, 0.75);

        let first = StylePrompt::build(StyleStrength::Balanced);
        let second = StylePrompt::build(StyleStrength::Balanced);
        assert_eq!(first, second);
        assert_eq!(first.temperature, 0.65);
    }

    #[test]
    fn test_prompts_share_base_constraints() {
        let balanced = StylePrompt::build(StyleStrength::Balanced);
        let strong = StylePrompt::build(StyleStrength::Strong);

        for prompt in [&balanced, &strong] {
            assert!(prompt.text.contains("line art"));
            assert!(prompt.text.contains("cel-shaded"));
            assert!(prompt.text.contains("eyes"));
        }

        assert!(strong.text.contains("caricature"));
        assert!(balanced.text.contains("likeness, pose and expression intact"));
    }
}
