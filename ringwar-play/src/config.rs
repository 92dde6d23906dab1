//! Configuration types for match play
//!
//! Level 4 - Utilities and configuration

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use ringwar_core::{AlphaBetaConfig, AppraiserWeights, BoardLayout, FitnessMode, UnitClass};
use ringwar_mcts::MctsConfig;
use serde::{Deserialize, Serialize};

/// Decision strategy of a computer player
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Uniform over legal moves
    Random,
    /// Random, weighted by move fitness
    WeightedFitness,
    /// Highest move fitness
    BestFitness,
    /// Alpha-Beta pruning search
    #[default]
    AlphaBeta,
    /// Monte Carlo Tree Search
    MonteCarlo,
}

impl Strategy {
    /// Fitness policy behind the cheap strategies
    pub fn fitness_mode(self) -> Option<FitnessMode> {
        match self {
            Strategy::Random => Some(FitnessMode::Random),
            Strategy::WeightedFitness => Some(FitnessMode::Weighted),
            Strategy::BestFitness => Some(FitnessMode::Best),
            Strategy::AlphaBeta | Strategy::MonteCarlo => None,
        }
    }
}

/// AI configuration for one player
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub strategy: Strategy,
    pub alpha_beta: AlphaBetaConfig,
    pub mcts: MctsConfig,
    /// Weights of the fitness heuristic, also used for move ordering
    pub weights: AppraiserWeights,
    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,
}

impl AiConfig {
    /// Create config for alpha-beta at given depth
    pub fn alpha_beta(depth: u32) -> Self {
        Self {
            strategy: Strategy::AlphaBeta,
            alpha_beta: AlphaBetaConfig::default().with_depth(depth),
            ..Default::default()
        }
    }

    /// Create config for MCTS capped at `iterations`
    pub fn mcts(iterations: u32) -> Self {
        Self {
            strategy: Strategy::MonteCarlo,
            mcts: MctsConfig::default().with_iterations(iterations),
            ..Default::default()
        }
    }

    pub fn fitness(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    /// Set the search time budget of both search strategies
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.alpha_beta.timeout = timeout;
        self.mcts.time_budget = timeout;
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Alpha-beta settings, sharing this config's fitness weights
    pub fn alpha_beta_config(&self) -> AlphaBetaConfig {
        AlphaBetaConfig {
            weights: self.weights,
            ..self.alpha_beta.clone()
        }
    }

    /// MCTS settings, seeded from this config when set
    pub fn mcts_config(&self) -> MctsConfig {
        let config = self.mcts.clone();
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

/// Units each player deploys
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmySpec {
    pub warriors: usize,
    pub wizards: usize,
    pub priestesses: usize,
    pub pawns: usize,
    pub matron_mothers: usize,
    pub holy_champions: usize,
}

impl Default for ArmySpec {
    fn default() -> Self {
        let count = |class: UnitClass| class.profile().default_count;
        Self {
            warriors: count(UnitClass::Warrior),
            wizards: count(UnitClass::Wizard),
            priestesses: count(UnitClass::Priestess),
            pawns: count(UnitClass::Pawn),
            matron_mothers: count(UnitClass::MatronMother),
            holy_champions: count(UnitClass::HolyChampion),
        }
    }
}

impl ArmySpec {
    /// Every unit in placement order, essential classes first
    pub fn units(&self) -> Vec<UnitClass> {
        let groups = [
            (UnitClass::MatronMother, self.matron_mothers),
            (UnitClass::HolyChampion, self.holy_champions),
            (UnitClass::Priestess, self.priestesses),
            (UnitClass::Wizard, self.wizards),
            (UnitClass::Warrior, self.warriors),
            (UnitClass::Pawn, self.pawns),
        ];
        groups
            .iter()
            .flat_map(|(class, count)| std::iter::repeat(*class).take(*count))
            .collect()
    }

    pub fn size(&self) -> usize {
        self.warriors
            + self.wizards
            + self.priestesses
            + self.pawns
            + self.matron_mothers
            + self.holy_champions
    }
}

/// One seat at the table
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSetup {
    pub name: String,
    /// Overrides the match-wide AI
    pub ai: Option<AiConfig>,
}

impl PlayerSetup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ai: None,
        }
    }

    pub fn with_ai(mut self, ai: AiConfig) -> Self {
        self.ai = Some(ai);
        self
    }
}

/// Full description of a match
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub layout: BoardLayout,
    pub players: Vec<PlayerSetup>,
    pub army: ArmySpec,
    /// AI of every player without an override
    pub ai: AiConfig,
    /// Total moves before the match is called a draw
    pub max_turns: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            layout: BoardLayout::default(),
            players: vec![PlayerSetup::new("North"), PlayerSetup::new("South")],
            army: ArmySpec::default(),
            ai: AiConfig::default(),
            max_turns: 200,
        }
    }
}

impl MatchConfig {
    /// Load a match config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read match config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse match config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self).context("Failed to serialize match config")?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write match config {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.players.len() < 2 {
            anyhow::bail!("A match needs at least 2 players, got {}", self.players.len());
        }
        if self.players.len() > usize::from(u8::MAX) {
            anyhow::bail!("Too many players: {}", self.players.len());
        }
        if self.army.matron_mothers + self.army.holy_champions == 0 {
            anyhow::bail!("Army has no essential unit");
        }
        self.layout.validate().context("Invalid board layout")?;
        Ok(())
    }

    /// AI of seat `index`
    pub fn ai_for(&self, index: usize) -> AiConfig {
        let ai = self
            .players
            .get(index)
            .and_then(|p| p.ai.clone())
            .unwrap_or_else(|| self.ai.clone());
        match ai.seed {
            Some(_) => ai,
            None => match self.ai.seed {
                Some(seed) => ai.with_seed(seed.wrapping_add(index as u64)),
                None => ai,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.strategy, Strategy::AlphaBeta);
        assert_eq!(config.alpha_beta.max_depth, 3);
        assert_eq!(config.mcts.exploration, 1.5);
    }

    #[test]
    fn test_ai_config_constructors() {
        let ab = AiConfig::alpha_beta(5);
        assert_eq!(ab.strategy, Strategy::AlphaBeta);
        assert_eq!(ab.alpha_beta_config().max_depth, 5);

        let mcts = AiConfig::mcts(500).with_seed(3);
        assert_eq!(mcts.strategy, Strategy::MonteCarlo);
        assert_eq!(mcts.mcts_config().max_iterations, Some(500));
        assert_eq!(mcts.mcts_config().seed, Some(3));
    }

    #[test]
    fn test_default_army() {
        let army = ArmySpec::default();
        assert_eq!(army.size(), 18);
        let units = army.units();
        assert_eq!(units.len(), 18);
        assert_eq!(units[0], UnitClass::MatronMother);
        assert_eq!(units[1], UnitClass::HolyChampion);
    }

    #[test]
    fn test_seat_seeds_derive_from_match_seed() {
        let mut config = MatchConfig::default();
        config.ai = AiConfig::alpha_beta(2).with_seed(10);
        config.players[1] = PlayerSetup::new("South").with_ai(AiConfig::mcts(50));
        assert_eq!(config.ai_for(0).seed, Some(10));
        assert_eq!(config.ai_for(1).seed, Some(11));
        assert_eq!(config.ai_for(1).strategy, Strategy::MonteCarlo);
    }

    #[test]
    fn test_validation() {
        assert!(MatchConfig::default().validate().is_ok());

        let mut lonely = MatchConfig::default();
        lonely.players.truncate(1);
        assert!(lonely.validate().is_err());

        let mut headless = MatchConfig::default();
        headless.army.matron_mothers = 0;
        headless.army.holy_champions = 0;
        assert!(headless.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("ringwar-config-{}.json", std::process::id()));
        let mut config = MatchConfig::default();
        config.max_turns = 42;
        config.ai = AiConfig::fitness(Strategy::BestFitness);
        config.save(&path).unwrap();

        let loaded = MatchConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: MatchConfig =
            serde_json::from_str(r#"{ "max_turns": 10, "ai": { "strategy": "MonteCarlo" } }"#).unwrap();
        assert_eq!(config.max_turns, 10);
        assert_eq!(config.ai.strategy, Strategy::MonteCarlo);
        assert_eq!(config.players.len(), 2);
        assert_eq!(config.ai.alpha_beta.max_depth, 3);
    }
}
