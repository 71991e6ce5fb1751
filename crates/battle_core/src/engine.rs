//! High-level battle engine facade.

use std::time::Instant;

use tracing::debug;

use crate::combatant::Combatant;
use crate::error::{Result, ValidationError};
use crate::outcome::BattleOutcome;
use crate::protocol::{decode_response, encode_request, ResponseShape};
use crate::registry::UnitRegistry;
use crate::runner::{resolve_seed, EngineBackend, EngineRequest, ProcessEngine};

/// Validates, encodes, runs and decodes battle requests for one registry.
///
/// The registry is read-only; one engine can serve any number of calls, and
/// with a `Sync` backend those calls may run concurrently.
#[derive(Debug, Clone)]
pub struct BattleEngine<B = ProcessEngine> {
    registry: UnitRegistry,
    backend: B,
}

impl BattleEngine<ProcessEngine> {
    /// Engine backed by the executable at `path`.
    pub fn with_binary(path: impl Into<std::path::PathBuf>, registry: UnitRegistry) -> Self {
        Self::new(registry, ProcessEngine::new(path))
    }
}

impl<B: EngineBackend> BattleEngine<B> {
    /// Engine using a custom backend.
    pub fn new(registry: UnitRegistry, backend: B) -> Self {
        Self { registry, backend }
    }

    /// Unit registry sent with every request.
    #[must_use]
    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    /// Backend executing requests.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run `num_simulations` independent simulations of one battle.
    ///
    /// A `seed` of `0` means "any": a random positive seed is chosen. Results
    /// are returned in the order the engine produced them, each with one
    /// outcome per attacker and per defender in request order.
    ///
    /// # Errors
    ///
    /// - [`BattleError::Validation`](crate::BattleError::Validation) before
    ///   anything runs, for bad rosters, oversized sides or
    ///   `num_simulations == 0`
    /// - any error of the backend
    /// - [`BattleError::Decode`](crate::BattleError::Decode) when the output
    ///   does not have the shape the request implies
    pub fn simulate(
        &self,
        attackers: &[Combatant],
        defenders: &[Combatant],
        seed: u32,
        num_simulations: u32,
    ) -> Result<Vec<BattleOutcome>> {
        if num_simulations == 0 {
            return Err(ValidationError::NoSimulations.into());
        }

        let stdin = encode_request(&self.registry, attackers, defenders)?;
        let request = EngineRequest {
            seed: resolve_seed(seed),
            num_simulations,
            stdin,
        };
        debug!(
            seed = request.seed,
            num_simulations,
            num_attackers = attackers.len(),
            num_defenders = defenders.len(),
            "Running battle"
        );

        let output = self.backend.run(&request)?;

        let started = Instant::now();
        let shape = ResponseShape::new(self.registry.len(), attackers.len(), defenders.len());
        let outcomes = decode_response(&output, shape, num_simulations as usize)?;
        debug!(
            decode_us = started.elapsed().as_micros() as u64,
            "Decoded engine output"
        );
        Ok(outcomes)
    }

    /// Run a single simulation; same as `simulate(attackers, defenders, seed, 1)`.
    ///
    /// # Errors
    ///
    /// Same as [`simulate`](Self::simulate).
    pub fn battle(
        &self,
        attackers: &[Combatant],
        defenders: &[Combatant],
        seed: u32,
    ) -> Result<BattleOutcome> {
        let mut outcomes = self.simulate(attackers, defenders, seed, 1)?;
        // The decoder yields exactly one outcome per requested simulation.
        Ok(outcomes.swap_remove(0))
    }
}
