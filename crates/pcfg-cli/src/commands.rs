//! Command implementations
//!
//! Every command writes its report to the given writer; the caller picks
//! the process exit code from the returned status.

use crate::cli::Command;
use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use pcfg_delta::{validate, Delta, DeltaComputer, FixReport};
use pcfg_model::{
    ChangeContext, ConfigurationObject, ContainerRef, Generation, QualifiedName, Repository,
};
use pcfg_persist::{DocumentStore, ProjectConfig};
use pcfg_template::{Resolution, TemplateResolver};
use pcfg_typedef::{ResolvedType, TypeDefinition, TypeRegistry};
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

const DEFAULT_CONFIG: &str = "pcfg.toml";

/// Loaded project: documents, types and the store they came from
#[derive(Debug)]
pub(crate) struct Project {
    store: DocumentStore,
    types: TypeRegistry,
    repository: Repository,
}

impl Project {
    /// Open the project described by `config`, or by `./pcfg.toml` if it
    /// exists, or by the default configuration
    pub(crate) fn open(config: Option<&Path>) -> Result<Self> {
        let config = match config {
            Some(path) => ProjectConfig::load(path)
                .with_context(|| format!("loading configuration {}", path.display()))?,
            None if Path::new(DEFAULT_CONFIG).exists() => {
                ProjectConfig::load(Path::new(DEFAULT_CONFIG))
                    .with_context(|| format!("loading configuration {DEFAULT_CONFIG}"))?
            }
            None => ProjectConfig::default(),
        };
        Self::from_config(config)
    }

    pub(crate) fn from_config(config: ProjectConfig) -> Result<Self> {
        let store = DocumentStore::new(config);
        let types = store.load_types().context("loading product types")?;
        let repository = store
            .load_repository()
            .context("loading configuration documents")?;
        Ok(Self {
            store,
            types,
            repository,
        })
    }

    pub(crate) fn execute(&mut self, command: &Command, out: &mut dyn Write) -> Result<ExitCode> {
        match command {
            Command::Validate { name } => self.validate(name.as_deref(), out),
            Command::Delta { name } => self.delta(name.as_deref(), out),
            Command::Fix { name, dry_run } => self.fix(name.as_deref(), *dry_run, out),
            Command::Generation { name, on } => self.generation(name, *on, out),
            Command::Resolve { name, property, on } => self.resolve(name, property, *on, out),
        }
    }

    fn validate(&self, name: Option<&str>, out: &mut dyn Write) -> Result<ExitCode> {
        let mut failed = false;
        for object in self.select(name)? {
            let resolved = self.types.resolve(object.type_name()).ok();
            let messages = validate(
                object,
                resolved.as_ref().map(|t| t as &dyn TypeDefinition),
                &self.repository,
            );
            failed |= messages.has_errors();
            if messages.is_empty() {
                writeln!(out, "{}: ok", object.name())?;
                continue;
            }
            writeln!(out, "{}:", object.name())?;
            for message in messages.iter() {
                writeln!(out, "  {message}")?;
            }
        }
        Ok(if failed {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        })
    }

    fn delta(&self, name: Option<&str>, out: &mut dyn Write) -> Result<ExitCode> {
        for object in self.select(name)? {
            let Some(delta) = self.compute_delta(object) else {
                writeln!(out, "{}: type {} not found", object.name(), object.type_name())?;
                continue;
            };
            if delta.is_empty() {
                writeln!(out, "{}: up to date", object.name())?;
                continue;
            }
            writeln!(out, "{}: {} entries", object.name(), delta.len())?;
            for delta_type in delta.counts().into_keys() {
                writeln!(out, "  {delta_type}")?;
                for entry in delta.by_type(delta_type) {
                    writeln!(out, "    {entry}")?;
                }
            }
        }
        Ok(ExitCode::SUCCESS)
    }

    fn fix(&mut self, name: Option<&str>, dry_run: bool, out: &mut dyn Write) -> Result<ExitCode> {
        let allow_destructive = self.store.config().allow_destructive_fixes;
        let deltas: Vec<Delta> = self
            .select(name)?
            .into_iter()
            .filter_map(|object| self.compute_delta(object))
            .filter(|delta| !delta.is_empty())
            .collect();

        let run = |delta: &Delta, object: &mut ConfigurationObject, ctx: &ChangeContext| {
            if allow_destructive {
                delta.fix_all(object, ctx)
            } else {
                delta.fix_non_destructive(object, ctx)
            }
        };

        for delta in &deltas {
            let report = if dry_run {
                let mut copy = self.object(delta.object())?.clone();
                run(delta, &mut copy, &ChangeContext::new())?
            } else {
                let (object, ctx) = self.repository.split_mut(delta.object())?;
                run(delta, object, ctx)?
            };
            write_fix_report(out, delta.object(), &report)?;
        }

        if dry_run {
            writeln!(out, "dry run: no documents written")?;
        } else {
            let saved = self.store.save_dirty(&self.repository)?;
            for path in &saved.written {
                writeln!(out, "wrote {}", path.display())?;
            }
        }
        Ok(ExitCode::SUCCESS)
    }

    fn generation(&self, name: &str, on: NaiveDate, out: &mut dyn Write) -> Result<ExitCode> {
        let object = self.object(&parse_name(name)?)?;
        if !object.is_changing_over_time() {
            writeln!(out, "{}: not changing over time", object.name())?;
            return Ok(ExitCode::SUCCESS);
        }
        let describe = |generation: Option<&Generation>| -> Result<String> {
            let Some(generation) = generation else {
                return Ok("none".to_string());
            };
            let from = generation
                .valid_from()
                .map_or_else(|| "?".to_string(), |d| d.to_string());
            let to = object
                .generation_valid_to(generation.id())?
                .map_or_else(|| "open".to_string(), |d| d.to_string());
            Ok(format!("{} ({from} .. {to})", generation.id()))
        };
        writeln!(
            out,
            "effective: {}",
            describe(object.generation_effective_on(on))?
        )?;
        writeln!(
            out,
            "best matching: {}",
            describe(object.best_matching_generation_effective_on(on))?
        )?;
        Ok(ExitCode::SUCCESS)
    }

    fn resolve(
        &self,
        name: &str,
        property: &str,
        on: Option<NaiveDate>,
        out: &mut dyn Write,
    ) -> Result<ExitCode> {
        let object = self.object(&parse_name(name)?)?;
        let container = match on {
            Some(date) => object
                .container_effective_on(date)
                .ok_or_else(|| anyhow!("{} has no generation effective on {date}", object.name()))?,
            None => object
                .latest_generation()
                .filter(|_| object.is_changing_over_time())
                .map_or(ContainerRef::Object, |g| ContainerRef::Generation(g.id().clone())),
        };

        // static properties live in the object container
        let mut candidates = vec![container.clone()];
        if container.is_generation() {
            candidates.push(ContainerRef::Object);
        }
        let (container, values) = candidates
            .into_iter()
            .find_map(|candidate| {
                let values: Vec<_> = object
                    .container_at(&candidate)?
                    .values()
                    .iter()
                    .filter(|v| v.property() == property)
                    .collect();
                (!values.is_empty()).then_some((candidate, values))
            })
            .ok_or_else(|| anyhow!("{} has no value for '{property}'", object.name()))?;

        let resolver = TemplateResolver::new(&self.repository);
        for value in values {
            writeln!(
                out,
                "{property} [{}] in {container}, {}",
                value.kind(),
                value.status()
            )?;
            match resolver.effective_value(object, &container, value) {
                Resolution::Resolved { value, origin } => {
                    writeln!(out, "  {value} (from {origin})")?;
                }
                Resolution::Fallback { value, reason } => {
                    writeln!(out, "  {value} (fallback: {reason})")?;
                }
                Resolution::NotApplicable => writeln!(out, "  not applicable")?,
            }
        }
        Ok(ExitCode::SUCCESS)
    }

    fn select(&self, name: Option<&str>) -> Result<Vec<&ConfigurationObject>> {
        match name {
            Some(name) => Ok(vec![self.object(&parse_name(name)?)?]),
            None => Ok(self.repository.iter().collect()),
        }
    }

    fn object(&self, name: &QualifiedName) -> Result<&ConfigurationObject> {
        self.repository
            .get(name)
            .ok_or_else(|| anyhow!("object {name} not found"))
    }

    fn resolved_type(&self, object: &ConfigurationObject) -> Option<ResolvedType> {
        match self.types.resolve(object.type_name()) {
            Ok(resolved) => Some(resolved),
            Err(err) => {
                tracing::warn!(object = %object.name(), error = %err, "cannot resolve product type");
                None
            }
        }
    }

    fn compute_delta(&self, object: &ConfigurationObject) -> Option<Delta> {
        let resolved = self.resolved_type(object)?;
        let delta = DeltaComputer::new(&resolved, &self.repository)
            .with_options(self.store.config().delta_options())
            .compute_object(object);
        Some(delta)
    }
}

fn parse_name(name: &str) -> Result<QualifiedName> {
    name.parse()
        .with_context(|| format!("invalid object name '{name}'"))
}

fn write_fix_report(out: &mut dyn Write, object: &QualifiedName, report: &FixReport) -> Result<()> {
    writeln!(
        out,
        "{object}: {} applied, {} already fixed",
        report.applied, report.no_op
    )?;
    for (delta_type, reason) in &report.manual {
        writeln!(out, "  manual action ({delta_type}): {reason}")?;
    }
    for entry in &report.skipped {
        writeln!(
            out,
            "  skipped ({}, destructive fixes disabled): {entry}",
            entry.delta_type()
        )?;
    }
    Ok(())
}
