//! Population-based search over complete fleet route assignments.
//!
//! A candidate holds one ordered route of delivery indices per agent. Every
//! generation is scored on disposable agent snapshots, the elite survive
//! unchanged, and the rest of the population is bred through tournament
//! selection, an order-preserving recombination and one of three mutations.
//! Canonical agent and delivery state is never touched here; use
//! [`apply_plan`](crate::simulation::apply_plan) to commit the winner.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::agent::Agent;
use crate::delivery::Delivery;
use crate::error::PlannerError;
use crate::simulation::{self, FitnessWeights, SimulationOutcome};
use crate::solver::{AgentRoute, Plan};
use crate::traits::Airspace;

/// One route of delivery indices per agent, in agent order.
type Candidate = Vec<Vec<usize>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub population_size: usize,
    /// Probability that a bred child is mutated, in `[0, 1]`.
    pub mutation_rate: f64,
    pub generations: usize,
    /// Generations without improvement before stopping; 0 disables early stop.
    pub patience: usize,
    /// Share of the population copied unchanged into the next generation.
    pub elite_fraction: f64,
    pub tournament_size: usize,
    /// Share of the initial population built by round-robin distribution;
    /// the rest assigns every delivery to a random agent.
    pub round_robin_fraction: f64,
    /// Fixed seed for reproducible runs.
    pub seed: Option<u64>,
    /// Score candidates on the rayon pool.
    pub parallel: bool,
    pub weights: FitnessWeights,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            mutation_rate: 0.1,
            generations: 100,
            patience: 20,
            elite_fraction: 0.1,
            tournament_size: 5,
            round_robin_fraction: 0.2,
            seed: None,
            parallel: true,
            weights: FitnessWeights::default(),
        }
    }
}

impl OptimizerConfig {
    /// Rejects zero sizes and fractions or rates outside 0..=1.
    pub fn validate(&self) -> Result<(), PlannerError> {
        let invalid = |msg: &str| Err(PlannerError::InvalidConfig(msg.to_string()));
        if self.population_size == 0 {
            return invalid("population_size must be greater than 0");
        }
        if self.generations == 0 {
            return invalid("generations must be greater than 0");
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return invalid("mutation_rate must be within [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.elite_fraction) {
            return invalid("elite_fraction must be within [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.round_robin_fraction) {
            return invalid("round_robin_fraction must be within [0, 1]");
        }
        if self.tournament_size == 0 {
            return invalid("tournament_size must be greater than 0");
        }
        Ok(())
    }

    fn elite_count(&self) -> usize {
        ((self.population_size as f64 * self.elite_fraction).floor() as usize)
            .max(1)
            .min(self.population_size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub plan: Plan,
    pub best_fitness: f64,
    /// Best-so-far fitness after each evaluated generation.
    pub history: Vec<f64>,
    /// Simulation tallies behind `best_fitness`.
    pub outcome: SimulationOutcome,
    pub generations_run: usize,
}

/// Searches for the fittest plan from a random initial population.
pub fn optimize<A>(
    agents: &[Agent],
    deliveries: &[Delivery],
    airspace: &A,
    config: &OptimizerConfig,
) -> Result<OptimizationResult, PlannerError>
where
    A: Airspace + Sync + ?Sized,
{
    optimize_seeded(agents, deliveries, airspace, config, &[])
}

/// Like [`optimize`], with `seeds` (e.g. an assignment-solver plan) replacing
/// the first members of the initial population.
pub fn optimize_seeded<A>(
    agents: &[Agent],
    deliveries: &[Delivery],
    airspace: &A,
    config: &OptimizerConfig,
    seeds: &[Plan],
) -> Result<OptimizationResult, PlannerError>
where
    A: Airspace + Sync + ?Sized,
{
    if agents.is_empty() {
        return Err(PlannerError::NoAgents);
    }
    if deliveries.is_empty() {
        return Err(PlannerError::NoDeliveries);
    }
    config.validate()?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut population = initial_population(agents.len(), deliveries.len(), config, &mut rng);
    for (slot, plan) in population.iter_mut().zip(seeds) {
        *slot = simulation::index_routes(agents, deliveries, plan)?;
    }

    info!(
        event = "optimization_start",
        agents = agents.len(),
        deliveries = deliveries.len(),
        population = config.population_size,
        generations = config.generations,
        seeds = seeds.len().min(config.population_size),
    );

    let mut best: Option<(Candidate, f64)> = None;
    let mut history = Vec::with_capacity(config.generations);
    let mut stagnation = 0usize;

    for generation in 0..config.generations {
        let scores = score_population(&population, agents, deliveries, airspace, config);

        let (leader, leader_fitness) = scores
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |acc, (i, score)| if score > acc.1 { (i, score) } else { acc });

        if best.as_ref().is_none_or(|(_, best_fitness)| leader_fitness > *best_fitness) {
            best = Some((population[leader].clone(), leader_fitness));
            stagnation = 0;
        } else {
            stagnation += 1;
        }
        let best_fitness = best.as_ref().map_or(leader_fitness, |(_, fitness)| *fitness);
        history.push(best_fitness);

        debug!(
            event = "generation_end",
            generation,
            best = best_fitness,
            mean = scores.iter().sum::<f64>() / scores.len() as f64,
            stagnation,
        );

        if config.patience > 0 && stagnation >= config.patience {
            info!(event = "early_stop", generation, patience = config.patience);
            break;
        }
        if generation + 1 < config.generations {
            population = next_generation(&population, &scores, agents.len(), config, &mut rng);
        }
    }

    let (candidate, best_fitness) = best.ok_or_else(|| PlannerError::InvalidConfig("no generation was evaluated".to_string()))?;
    let outcome = simulation::simulate_routes(agents, &candidate, deliveries, airspace);
    let plan = to_plan(agents, deliveries, &candidate);

    info!(
        event = "optimization_end",
        best_fitness,
        completed = outcome.completed,
        violations = outcome.violations,
        no_fly_violations = outcome.no_fly_violations,
        generations_run = history.len(),
    );

    Ok(OptimizationResult {
        plan,
        best_fitness,
        generations_run: history.len(),
        history,
        outcome,
    })
}

fn score_population<A>(
    population: &[Candidate],
    agents: &[Agent],
    deliveries: &[Delivery],
    airspace: &A,
    config: &OptimizerConfig,
) -> Vec<f64>
where
    A: Airspace + Sync + ?Sized,
{
    let score = |candidate: &Candidate| {
        simulation::simulate_routes(agents, candidate, deliveries, airspace).fitness(&config.weights)
    };
    if config.parallel {
        population.par_iter().map(score).collect()
    } else {
        population.iter().map(score).collect()
    }
}

fn to_plan(agents: &[Agent], deliveries: &[Delivery], candidate: &Candidate) -> Plan {
    Plan {
        routes: agents
            .iter()
            .zip(candidate)
            .map(|(agent, route)| AgentRoute {
                agent_id: agent.id,
                delivery_ids: route.iter().map(|&i| deliveries[i].id).collect(),
            })
            .collect(),
    }
}

fn initial_population(agent_count: usize, delivery_count: usize, config: &OptimizerConfig, rng: &mut StdRng) -> Vec<Candidate> {
    let round_robin = ((config.population_size as f64 * config.round_robin_fraction).floor() as usize)
        .max(1)
        .min(config.population_size);

    (0..config.population_size)
        .map(|member| {
            let mut order: Vec<usize> = (0..delivery_count).collect();
            order.shuffle(rng);
            let mut candidate: Candidate = vec![Vec::new(); agent_count];
            if member < round_robin {
                for (position, delivery) in order.into_iter().enumerate() {
                    candidate[position % agent_count].push(delivery);
                }
                for route in &mut candidate {
                    route.shuffle(rng);
                }
            } else {
                for delivery in order {
                    candidate[rng.random_range(0..agent_count)].push(delivery);
                }
            }
            candidate
        })
        .collect()
}

fn next_generation(
    population: &[Candidate],
    scores: &[f64],
    agent_count: usize,
    config: &OptimizerConfig,
    rng: &mut StdRng,
) -> Vec<Candidate> {
    let mut ranked: Vec<usize> = (0..population.len()).collect();
    ranked.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut next: Vec<Candidate> = ranked
        .iter()
        .take(config.elite_count())
        .map(|&i| population[i].clone())
        .collect();

    while next.len() < config.population_size {
        let first = tournament(scores, config.tournament_size, rng);
        let second = tournament(scores, config.tournament_size, rng);
        let (mut left, mut right) = crossover(&population[first], &population[second], agent_count);
        if rng.random_bool(config.mutation_rate) {
            mutate(&mut left, rng);
        }
        if rng.random_bool(config.mutation_rate) {
            mutate(&mut right, rng);
        }
        next.push(left);
        next.push(right);
    }

    next.truncate(config.population_size);
    next
}

/// Samples `size` distinct members and returns the fittest (first on ties).
fn tournament(scores: &[f64], size: usize, rng: &mut StdRng) -> usize {
    let size = size.min(scores.len());
    let mut winner: Option<usize> = None;
    for index in rand::seq::index::sample(rng, scores.len(), size) {
        if winner.is_none_or(|w| scores[index] > scores[w]) {
            winner = Some(index);
        }
    }
    winner.unwrap_or(0)
}

/// Each child keeps the first half of one parent's flattened deliveries by
/// position, followed by the other parent's deliveries in their order,
/// deduplicated and dealt round-robin across agents.
fn crossover(first: &Candidate, second: &Candidate, agent_count: usize) -> (Candidate, Candidate) {
    let flat_first: Vec<usize> = first.iter().flatten().copied().collect();
    let flat_second: Vec<usize> = second.iter().flatten().copied().collect();
    if flat_first.is_empty() || flat_second.is_empty() {
        return (first.clone(), second.clone());
    }

    let combine = |head: &[usize], tail: &[usize]| {
        let mut seen = HashSet::new();
        let mut child: Candidate = vec![Vec::new(); agent_count];
        let merged = head[..head.len() / 2].iter().chain(tail).copied();
        for (position, delivery) in merged.filter(|d| seen.insert(*d)).enumerate() {
            child[position % agent_count].push(delivery);
        }
        child
    };

    (combine(&flat_first, &flat_second), combine(&flat_second, &flat_first))
}

fn mutate(candidate: &mut Candidate, rng: &mut StdRng) {
    match rng.random_range(0..3) {
        0 => swap_between_agents(candidate, rng),
        1 => move_to_other_agent(candidate, rng),
        _ => reverse_segment(candidate, rng),
    }
}

fn swap_between_agents(candidate: &mut Candidate, rng: &mut StdRng) {
    let non_empty: Vec<usize> = (0..candidate.len()).filter(|&i| !candidate[i].is_empty()).collect();
    if non_empty.len() < 2 {
        return;
    }
    let picked = rand::seq::index::sample(rng, non_empty.len(), 2);
    let (a, b) = (non_empty[picked.index(0)], non_empty[picked.index(1)]);
    let i = rng.random_range(0..candidate[a].len());
    let j = rng.random_range(0..candidate[b].len());
    let held = candidate[a][i];
    candidate[a][i] = candidate[b][j];
    candidate[b][j] = held;
}

fn move_to_other_agent(candidate: &mut Candidate, rng: &mut StdRng) {
    let agent_count = candidate.len();
    let non_empty: Vec<usize> = (0..agent_count).filter(|&i| !candidate[i].is_empty()).collect();
    if agent_count < 2 || non_empty.is_empty() {
        return;
    }
    let from = non_empty[rng.random_range(0..non_empty.len())];
    let mut to = rng.random_range(0..agent_count - 1);
    if to >= from {
        to += 1;
    }
    let position = rng.random_range(0..candidate[from].len());
    let delivery = candidate[from].remove(position);
    candidate[to].push(delivery);
}

fn reverse_segment(candidate: &mut Candidate, rng: &mut StdRng) {
    let eligible: Vec<usize> = (0..candidate.len()).filter(|&i| candidate[i].len() > 1).collect();
    if eligible.is_empty() {
        return;
    }
    let route = &mut candidate[eligible[rng.random_range(0..eligible.len())]];
    let start = rng.random_range(0..route.len() - 1);
    let end = rng.random_range(start + 2..=route.len());
    route[start..end].reverse();
}
