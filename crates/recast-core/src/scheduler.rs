//! The orchestration loop: recipes over sources, to a fixed point.
//!
//! [`RecipeRun`] drives every recipe over every source in cycles. A cycle
//! ends when each (source, recipe) pair has run once; the loop stops when a
//! full cycle changes nothing or the cycle cap is reached. Within one
//! recipe execution the deferred-visitor queue is drained to exhaustion, so
//! "no deferred visitors pending" holds at every cycle boundary by
//! construction.
//!
//! Failure of one recipe on one source never aborts the run: the error is
//! captured, the source reverts to its pre-recipe state, and that pair is
//! not retried. Partial success with itemized errors is the normal terminal
//! state of a run over a real repository.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::recipe::Recipe;
use crate::tree::Tree;
use crate::visitor::{Execution, VisitError};

/// Default cycle cap. Most recipe sets converge in one or two cycles;
/// three catches cascades without letting a non-converging recipe spin.
pub const DEFAULT_MAX_CYCLES: usize = 3;

/// A configured set of recipes ready to run over sources.
pub struct RecipeRun<N: Tree> {
    recipes: Vec<Box<dyn Recipe<N>>>,
    max_cycles: usize,
}

/// One changed source in a run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceChange {
    /// Id of the changed source tree.
    pub source_id: String,
    /// Names of the recipes whose passes changed it, in application order.
    pub recipes: Vec<String>,
}

/// One captured per-(source, recipe) failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceError {
    /// Id of the source the recipe failed on.
    pub source_id: String,
    /// Name of the failing recipe.
    pub recipe: String,
    /// Rendered error.
    pub message: String,
}

/// Serializable summary of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Cycles executed (including the final no-change cycle, if any).
    pub cycles: usize,
    /// Sources whose final tree differs from their input tree. A source
    /// whose only difference is added markers appears here too; that is
    /// how marker-only search recipes report "found something".
    pub changed: Vec<SourceChange>,
    /// Failures captured during the run.
    pub errors: Vec<SourceError>,
}

/// The outcome of [`RecipeRun::run`]: final trees plus the report.
pub struct RunResult<N: Tree> {
    /// The sources after all passes, in input order.
    pub sources: Vec<N>,
    /// The serializable summary.
    pub report: RunReport,
}

impl<N: Tree> RecipeRun<N> {
    /// A run over the given recipes with the default cycle cap.
    pub fn new(recipes: Vec<Box<dyn Recipe<N>>>) -> Self {
        Self {
            recipes,
            max_cycles: DEFAULT_MAX_CYCLES,
        }
    }

    /// Override the cycle cap.
    pub fn with_max_cycles(mut self, max_cycles: usize) -> Self {
        self.max_cycles = max_cycles.max(1);
        self
    }

    /// Drive every recipe over every source until a full cycle changes
    /// nothing or the cycle cap is reached.
    pub fn run(&self, sources: Vec<N>) -> RunResult<N> {
        let originals = sources.clone();
        let mut current = sources;
        // recipe names that changed each source, in application order
        let mut changed_by: Vec<Vec<String>> = vec![Vec::new(); current.len()];
        let mut errors: Vec<SourceError> = Vec::new();
        // (source index, recipe index) pairs that already failed
        let mut failed: HashSet<(usize, usize)> = HashSet::new();
        // applicability probe outcomes, computed once per pair
        let mut applicable: HashMap<(usize, usize), bool> = HashMap::new();

        let mut cycles = 0;
        for cycle in 1..=self.max_cycles {
            cycles = cycle;
            debug!(cycle, "recipe cycle start");
            let mut cycle_changed = false;

            for (si, source) in current.iter_mut().enumerate() {
                for (ri, recipe) in self.recipes.iter().enumerate() {
                    if failed.contains(&(si, ri)) {
                        continue;
                    }
                    let applies = match applicable.get(&(si, ri)) {
                        Some(a) => *a,
                        None => match probe(recipe.as_ref(), source, cycle) {
                            Ok(a) => {
                                applicable.insert((si, ri), a);
                                a
                            }
                            Err(err) => {
                                warn!(
                                    source = %source.id(),
                                    recipe = recipe.name(),
                                    error = %err,
                                    "applicability probe failed"
                                );
                                errors.push(SourceError {
                                    source_id: source.id().to_string(),
                                    recipe: recipe.name().to_string(),
                                    message: err.to_string(),
                                });
                                failed.insert((si, ri));
                                continue;
                            }
                        },
                    };
                    if !applies {
                        continue;
                    }

                    let before = source.clone();
                    match execute(recipe.as_ref(), before.clone(), cycle) {
                        Ok(after) => {
                            if after != before {
                                cycle_changed = true;
                                changed_by[si].push(recipe.name().to_string());
                                *source = after;
                            }
                        }
                        Err(err) => {
                            warn!(
                                source = %before.id(),
                                recipe = recipe.name(),
                                error = %err,
                                "recipe failed; source reverted"
                            );
                            errors.push(SourceError {
                                source_id: before.id().to_string(),
                                recipe: recipe.name().to_string(),
                                message: err.to_string(),
                            });
                            failed.insert((si, ri));
                            // the source keeps its pre-recipe state
                        }
                    }
                }
            }

            debug!(cycle, changed = cycle_changed, "recipe cycle end");
            if !cycle_changed {
                break;
            }
        }

        let changed = current
            .iter()
            .zip(&originals)
            .zip(changed_by)
            .filter(|((after, before), _)| after != before)
            .map(|((after, _), recipes)| SourceChange {
                source_id: after.id().to_string(),
                recipes,
            })
            .collect();

        RunResult {
            sources: current,
            report: RunReport {
                cycles,
                changed,
                errors,
            },
        }
    }
}

/// Run a recipe's applicability probe against a tree.
///
/// The probe's tree output is discarded; only "did it differ" survives.
/// Deferred visitors enqueued by a probe are dropped with it.
fn probe<N: Tree>(recipe: &dyn Recipe<N>, source: &N, cycle: usize) -> Result<bool, VisitError> {
    let Some(mut test) = recipe.applicable_test() else {
        return Ok(true);
    };
    let mut exec = Execution::new();
    exec.set_cycle(cycle);
    let out = test.visit_root(source.clone(), &mut exec)?;
    Ok(out != *source)
}

/// One recipe execution over one tree: the main pass, then the deferred
/// queue drained to exhaustion (deferred visitors may enqueue more).
fn execute<N: Tree>(recipe: &dyn Recipe<N>, tree: N, cycle: usize) -> Result<N, VisitError> {
    let mut exec = Execution::new();
    exec.set_cycle(cycle);
    let mut tree = recipe.visitor().visit_root(tree, &mut exec)?;
    while exec.has_after_visits() {
        for mut deferred in exec.take_after_visits() {
            tree = deferred.visit_root(tree, &mut exec)?;
        }
    }
    Ok(tree)
}
