// Statement Compiler
//
// Drives a statement through bind, optimize and generate. A `Compilation`
// tracks the phase reached; once any phase fails it refuses every later
// phase, so a statement that failed to bind can never reach generation.

use std::sync::Arc;

use log::{debug, info};

use crate::catalog::DataDictionary;
use crate::common::{CompileError, CompileResult, CompilerConfig};
use crate::query::aggregate::AggregateRegistry;
use crate::query::context::{ContextFrame, ContextManager};
use crate::query::generate::{Action, CodeGenerator, ConstantActionFactory};
use crate::query::planner::{Level2CostEstimate, StatisticsProvider};
use crate::query::statement::{
    ActivationKind, BindContext, GenerateContext, OptimizeContext, Statement, StatementNode,
};

/// How far a compilation has progressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Parsed,
    Bound,
    Optimized,
    Generated,
    Failed,
}

/// One statement moving through the compilation phases
#[derive(Debug)]
pub struct Compilation {
    statement: Statement,
    phase: Phase,
}

impl Compilation {
    pub fn new(statement: Statement) -> Self {
        Compilation { statement, phase: Phase::Parsed }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    pub fn into_statement(self) -> Statement {
        self.statement
    }

    fn expect_phase(&self, allowed: &[Phase], step: &str) -> CompileResult<()> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(CompileError::internal(format!(
                "cannot {} {} in phase {:?}",
                step,
                self.statement.statement_name(),
                self.phase
            )))
        }
    }

    fn record<T>(&mut self, result: CompileResult<T>, next: Phase) -> CompileResult<T> {
        match result {
            Ok(value) => {
                self.phase = next;
                Ok(value)
            }
            Err(err) => {
                debug!("{} failed in phase {:?}: {}", self.statement.statement_name(), self.phase, err);
                self.phase = Phase::Failed;
                Err(err)
            }
        }
    }

    pub fn bind(&mut self, ctx: &BindContext<'_>) -> CompileResult<()> {
        self.expect_phase(&[Phase::Parsed], "bind")?;
        let result = self.statement.bind(ctx);
        self.record(result, Phase::Bound)
    }

    pub fn optimize(&mut self, ctx: &OptimizeContext<'_>) -> CompileResult<()> {
        self.expect_phase(&[Phase::Bound], "optimize")?;
        let result = self.statement.optimize(ctx);
        self.record(result, Phase::Optimized)
    }

    pub fn generate(&mut self, ctx: &GenerateContext<'_>) -> CompileResult<Action> {
        self.expect_phase(&[Phase::Bound, Phase::Optimized], "generate")?;
        let result = self.statement.generate(ctx);
        self.record(result, Phase::Generated)
    }
}

/// Output of a successful compilation
#[derive(Debug)]
pub struct CompiledStatement {
    pub statement_name: &'static str,
    pub action: Action,
    pub activation_kind: ActivationKind,
    pub needs_savepoint: bool,
    pub is_atomic: bool,
    pub row_estimate: i64,
    /// Level-2 estimate of the chosen plan, for queries
    pub cost: Option<Level2CostEstimate>,
}

/// Compiler wired to its collaborators
pub struct Compiler {
    config: CompilerConfig,
    dictionary: Arc<dyn DataDictionary>,
    statistics: Arc<dyn StatisticsProvider>,
    aggregates: AggregateRegistry,
    actions: Arc<dyn ConstantActionFactory>,
    generator: Arc<dyn CodeGenerator>,
}

impl Compiler {
    /// Create a compiler with the default configuration and builtin aggregates
    pub fn new(
        dictionary: Arc<dyn DataDictionary>,
        statistics: Arc<dyn StatisticsProvider>,
        actions: Arc<dyn ConstantActionFactory>,
        generator: Arc<dyn CodeGenerator>,
    ) -> Self {
        Compiler {
            config: CompilerConfig::default(),
            dictionary,
            statistics,
            aggregates: AggregateRegistry::builtin(),
            actions,
            generator,
        }
    }

    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_aggregates(mut self, aggregates: AggregateRegistry) -> Self {
        self.aggregates = aggregates;
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn aggregates(&self) -> &AggregateRegistry {
        &self.aggregates
    }

    /// Enter a compilation unit using the configured default schema
    pub fn enter(&self, contexts: &ContextManager) -> ContextFrame {
        contexts.push(&self.config.default_schema)
    }

    /// Compile `statement` under `frame`, which must be the frame the
    /// statement was created under and the innermost live frame.
    pub fn compile(&self, frame: &ContextFrame, statement: Statement) -> CompileResult<CompiledStatement> {
        if statement.context() != frame.id() {
            return Err(CompileError::internal(format!(
                "{} was created under {} but is compiled under {}",
                statement.statement_name(),
                statement.context(),
                frame.id()
            )));
        }
        if !frame.is_current() {
            return Err(CompileError::internal(format!(
                "compilation context {} is not the innermost live frame",
                frame.id()
            )));
        }

        let name = statement.statement_name();
        info!("Compiling {} under {}", name, frame.id());
        let mut compilation = Compilation::new(statement);

        compilation.bind(&BindContext {
            frame,
            dictionary: self.dictionary.as_ref(),
            aggregates: &self.aggregates,
            config: &self.config,
        })?;
        self.trace_tree("bound", &compilation);

        compilation.optimize(&OptimizeContext {
            statistics: self.statistics.as_ref(),
            config: &self.config,
        })?;
        self.trace_tree("optimized", &compilation);

        let action = compilation.generate(&GenerateContext {
            actions: self.actions.as_ref(),
            generator: self.generator.as_ref(),
        })?;

        let statement = compilation.into_statement();
        let cost = match &statement {
            Statement::Cursor(cursor) => cursor.best_cost().cloned(),
            _ => None,
        };
        debug!("Compiled {} into {}", name, action.describe());

        Ok(CompiledStatement {
            statement_name: name,
            action,
            activation_kind: statement.activation_kind(),
            needs_savepoint: statement.needs_savepoint(),
            is_atomic: statement.is_atomic(),
            row_estimate: statement.row_estimate(),
            cost,
        })
    }

    fn trace_tree(&self, label: &str, compilation: &Compilation) {
        if self.config.trace_tree {
            debug!("{} tree:\n{}", label, compilation.statement().tree_print());
        }
    }
}
