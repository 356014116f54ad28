//! The dice-evaluator boundary.
//!
//! The engine never rolls dice itself: it assembles a [`RollRequest`] and
//! hands it to a [`DiceEvaluator`], which owns all randomness and may pause
//! for user confirmation unless the request sets `skip_dialog`. The
//! default [`RngEvaluator`] resolves immediately with no interaction.

use crate::rolls::{FormulaPart, RollRequest};
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for dice parsing and evaluation.
#[derive(Debug, Error)]
pub enum DiceError {
    #[error("Invalid dice notation: {0}")]
    InvalidNotation(String),
    #[error("Invalid die size: {0}")]
    InvalidDieSize(u32),
    #[error("Empty roll formula")]
    NoDice,
}

/// The evaluated value of a single formula part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartOutcome {
    pub part: FormulaPart,
    /// Individual die faces, empty for flat modifiers.
    pub rolls: Vec<u32>,
    pub subtotal: i32,
}

/// Complete result of evaluating a roll request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollOutcome {
    pub total: i32,
    pub parts: Vec<PartOutcome>,
}

/// An external oracle that turns roll requests into totals.
///
/// Implementations may be interactive: unless `skip_dialog` is set on the
/// request they are allowed to prompt before resolving. Faults in formula
/// evaluation surface here, not in the assembling engine.
#[async_trait]
pub trait DiceEvaluator: Send + Sync {
    async fn evaluate(&self, request: &RollRequest) -> Result<RollOutcome, DiceError>;
}

// ============================================================================
// Dice Notation
// ============================================================================

/// A single die component of a dice expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceComponent {
    pub count: u32,
    pub sides: u32,
}

/// A parsed dice expression (e.g. `2d6+1`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiceExpression {
    pub components: Vec<DiceComponent>,
    pub modifier: i32,
    pub original: String,
}

impl DiceExpression {
    /// Parse a dice notation string.
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let notation = notation.trim().to_lowercase();
        if notation.is_empty() {
            return Err(DiceError::NoDice);
        }

        let mut components = Vec::new();
        let mut modifier: i32 = 0;
        let mut current = String::new();
        let mut sign: i32 = 1;

        for ch in notation.chars() {
            match ch {
                '+' | '-' => {
                    if !current.is_empty() {
                        Self::parse_component(&current, sign, &mut components, &mut modifier)?;
                        current.clear();
                    }
                    sign = if ch == '+' { 1 } else { -1 };
                }
                ' ' => continue,
                _ => current.push(ch),
            }
        }

        if !current.is_empty() {
            Self::parse_component(&current, sign, &mut components, &mut modifier)?;
        }

        if components.is_empty() && modifier == 0 {
            return Err(DiceError::NoDice);
        }

        Ok(DiceExpression {
            components,
            modifier,
            original: notation,
        })
    }

    fn parse_component(
        s: &str,
        sign: i32,
        components: &mut Vec<DiceComponent>,
        modifier: &mut i32,
    ) -> Result<(), DiceError> {
        if let Some(d_pos) = s.find('d') {
            let count_str = &s[..d_pos];
            let sides_str = &s[d_pos + 1..];

            let count: u32 = if count_str.is_empty() {
                1
            } else {
                count_str
                    .parse()
                    .map_err(|_| DiceError::InvalidNotation(s.to_string()))?
            };
            let sides: u32 = sides_str
                .parse()
                .map_err(|_| DiceError::InvalidNotation(s.to_string()))?;
            if sides == 0 {
                return Err(DiceError::InvalidDieSize(sides));
            }

            components.push(DiceComponent { count, sides });
        } else {
            let value: i32 = s
                .parse()
                .map_err(|_| DiceError::InvalidNotation(s.to_string()))?;
            *modifier += sign * value;
        }

        Ok(())
    }

    /// Roll with a specific RNG, returning the die faces and the total.
    pub fn roll_with_rng<R: Rng>(&self, rng: &mut R) -> (Vec<u32>, i32) {
        let mut rolls = Vec::new();
        for component in &self.components {
            for _ in 0..component.count {
                rolls.push(rng.gen_range(1..=component.sides));
            }
        }
        let total = rolls.iter().map(|&r| r as i32).sum::<i32>() + self.modifier;
        (rolls, total)
    }
}

// ============================================================================
// Default Evaluator
// ============================================================================

/// Non-interactive evaluator backed by the thread RNG.
#[derive(Debug, Default)]
pub struct RngEvaluator;

impl RngEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate with an injected RNG for deterministic tests.
    pub fn evaluate_with_rng<R: Rng>(
        &self,
        request: &RollRequest,
        rng: &mut R,
    ) -> Result<RollOutcome, DiceError> {
        let mut parts = Vec::with_capacity(request.parts.len());
        let mut total = 0;

        for part in &request.parts {
            let outcome = match part {
                FormulaPart::Dice(notation) => {
                    let expression = DiceExpression::parse(notation)?;
                    let (rolls, subtotal) = expression.roll_with_rng(rng);
                    PartOutcome {
                        part: part.clone(),
                        rolls,
                        subtotal,
                    }
                }
                FormulaPart::Modifier(value) => PartOutcome {
                    part: part.clone(),
                    rolls: Vec::new(),
                    subtotal: *value,
                },
            };
            total += outcome.subtotal;
            parts.push(outcome);
        }

        if parts.is_empty() {
            return Err(DiceError::NoDice);
        }
        Ok(RollOutcome { total, parts })
    }
}

#[async_trait]
impl DiceEvaluator for RngEvaluator {
    async fn evaluate(&self, request: &RollRequest) -> Result<RollOutcome, DiceError> {
        self.evaluate_with_rng(request, &mut rand::thread_rng())
    }
}
