//! Composition engine
//!
//! Installs one unit's artifacts into the shared registry:
//!
//! 1. validate the unit configuration, reporting every problem at once
//! 2. register the unit (duplicate registrations are fatal)
//! 3. filter producers by self-enablement and the configuration predicate
//! 4. invoke producers, in parallel when allowed, against the registry as
//!    it was before this unit
//! 5. prefix, customize and tag each artifact, then insert them one by one
//!
//! Any failure after step 2 removes what this unit inserted and withdraws
//! its registration, leaving the registry as it was.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use serde::Serialize;
use unit_meta::{
    Artifact, ArtifactKey, ProducedArtifact, Registry, UnitDescriptor, UnitKey, UnitRegistration,
};

use super::prefix::apply_prefix;
use super::producer::{Producer, ProducerSet};
use crate::{Error, Result};

/// Options for [`compose_with`].
#[derive(Debug, Clone)]
pub struct ComposeOptions {
    /// Invoke producers on worker threads.
    pub parallel: bool,
    /// Upper bound on concurrently running producers.
    pub max_threads: usize,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            max_threads: thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        }
    }
}

impl ComposeOptions {
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            max_threads: 1,
        }
    }
}

/// Outcome of composing one unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionReport {
    pub unit: UnitKey,
    /// Inserted artifacts, with final (prefixed) names, in insertion order.
    pub inserted: Vec<ArtifactKey>,
    /// Producers filtered out, with unprefixed names.
    pub skipped: Vec<ArtifactKey>,
}

/// Compose `unit` into `registry` with default options.
pub fn compose(
    registry: &mut Registry,
    unit: &UnitDescriptor,
    producers: &ProducerSet,
) -> Result<CompositionReport> {
    compose_with(registry, unit, producers, &ComposeOptions::default())
}

/// Compose `unit` into `registry`.
///
/// # Errors
///
/// - [`Error::Configuration`] with every validation message; the registry
///   is untouched.
/// - [`unit_meta::Error::DuplicateUnit`] if the unit is already registered
///   under the same namespace.
/// - [`unit_meta::Error::Collision`] naming both units when an artifact of
///   the same kind and name exists.
/// - producer and prefix errors.
///
/// On every error after validation the unit's partial work is rolled back.
pub fn compose_with(
    registry: &mut Registry,
    unit: &UnitDescriptor,
    producers: &ProducerSet,
    options: &ComposeOptions,
) -> Result<CompositionReport> {
    let key = unit.key();
    let config = unit.config();

    let mut errors = Vec::new();
    config.validate(registry, &mut errors);
    if !errors.is_empty() {
        tracing::warn!(unit = %key, problems = errors.len(), "Unit configuration rejected");
        return Err(Error::Configuration {
            unit: key.to_string(),
            errors,
        });
    }

    registry.register_unit(UnitRegistration {
        id: unit.id().clone(),
        namespace: unit.namespace().map(str::to_string),
        backend_name: config.default_backend_name().map(str::to_string),
        table_prefix: config.table_name_prefix().map(str::to_string),
    })?;

    let mut inserted = Vec::new();
    match install(registry, unit, producers, options, &mut inserted) {
        Ok(skipped) => {
            tracing::info!(
                unit = %key,
                inserted = inserted.len(),
                skipped = skipped.len(),
                "Composed unit"
            );
            Ok(CompositionReport {
                unit: key,
                inserted,
                skipped,
            })
        }
        Err(e) => {
            rollback(registry, unit, &inserted);
            Err(e)
        }
    }
}

/// Remove `inserted` artifacts and withdraw the unit's registration.
fn rollback(registry: &mut Registry, unit: &UnitDescriptor, inserted: &[ArtifactKey]) {
    let key = unit.key();
    let provenance = unit.provenance();
    for artifact in inserted.iter().rev() {
        registry.withdraw(artifact.kind, &artifact.name, &provenance);
    }
    registry.unregister_unit(&key);
    tracing::warn!(unit = %key, removed = inserted.len(), "Rolled back unit composition");
}

fn install(
    registry: &mut Registry,
    unit: &UnitDescriptor,
    producers: &ProducerSet,
    options: &ComposeOptions,
    inserted: &mut Vec<ArtifactKey>,
) -> Result<Vec<ArtifactKey>> {
    let config = unit.config();

    let mut selected = Vec::new();
    let mut skipped = Vec::new();
    for producer in producers.ordered() {
        if producer.is_enabled() && config.is_artifact_enabled(producer.kind(), producer.name()) {
            selected.push(producer);
        } else {
            tracing::debug!(kind = %producer.kind(), name = producer.name(), "Producer disabled");
            skipped.push(ArtifactKey::new(producer.kind(), producer.name()));
        }
    }

    let own: BTreeSet<ArtifactKey> = selected
        .iter()
        .map(|p| ArtifactKey::new(p.kind(), p.name()))
        .collect();

    let produced = invoke_all(registry, &selected, options)?;

    let provenance = unit.provenance();
    for mut artifact in produced {
        if let Some(prefix) = config.table_name_prefix() {
            artifact = apply_prefix(artifact, prefix, &own)?;
        }
        if let Some(table) = artifact.as_table_mut() {
            config.customize_table(table);
        }

        let key = ArtifactKey::new(artifact.kind(), artifact.name());
        registry.insert(ProducedArtifact::new(artifact, provenance.clone()))?;
        tracing::debug!(kind = %key.kind, name = %key.name, unit = %provenance, "Inserted artifact");
        inserted.push(key);
    }

    Ok(skipped)
}

/// Invoke producers and return their artifacts in producer order.
fn invoke_all(
    registry: &Registry,
    producers: &[&dyn Producer],
    options: &ComposeOptions,
) -> Result<Vec<Artifact>> {
    if !options.parallel || producers.len() < 2 {
        return producers
            .iter()
            .map(|producer| {
                panic::catch_unwind(AssertUnwindSafe(|| invoke(registry, *producer)))
                    .unwrap_or_else(|_| Err(panicked(*producer)))
            })
            .collect();
    }

    let batch = options.max_threads.max(1);
    let mut artifacts = Vec::with_capacity(producers.len());
    for chunk in producers.chunks(batch) {
        let results: Vec<Result<Artifact>> = thread::scope(|s| {
            let tasks: Vec<_> = chunk
                .iter()
                .map(|producer| (*producer, s.spawn(move || invoke(registry, *producer))))
                .collect();

            tasks
                .into_iter()
                .map(|(producer, task)| {
                    task.join().unwrap_or_else(|_| Err(panicked(producer)))
                })
                .collect()
        });
        for result in results {
            artifacts.push(result?);
        }
    }
    Ok(artifacts)
}

fn panicked(producer: &dyn Producer) -> Error {
    Error::ProducerFailed {
        kind: producer.kind(),
        name: producer.name().to_string(),
        message: "producer panicked".to_string(),
    }
}

fn invoke(registry: &Registry, producer: &dyn Producer) -> Result<Artifact> {
    let artifact = producer.produce(registry)?;
    if artifact.kind() != producer.kind() || artifact.name() != producer.name() {
        return Err(Error::ProducerMismatch {
            expected_kind: producer.kind(),
            expected_name: producer.name().to_string(),
            kind: artifact.kind(),
            name: artifact.name().to_string(),
        });
    }
    Ok(artifact)
}
