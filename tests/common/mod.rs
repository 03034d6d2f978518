#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use sqlforge::catalog::{
    IndexDescriptor, InMemoryDictionary, SchemaDescriptor, SequenceDescriptor, TableDescriptor,
    TypeDescriptor, TypeId,
};
use sqlforge::common::{CompileResult, CompilerConfig};
use sqlforge::query::aggregate::AggregateRegistry;
use sqlforge::query::generate::{
    Action, CodeGenerator, ConstantAction, ConstantActionFactory, CursorPlanRequest, GeneratedPlan,
};
use sqlforge::query::planner::TableStatistics;
use sqlforge::query::statement::{
    ActivationKind, BindContext, DropBehavior, GenerateContext, TransactionKind,
};
use sqlforge::{Compiler, ContextFrame, StatementNode};

// Dictionary with three tables, a view, an index and a sequence in APP
pub fn sample_dictionary() -> Arc<InMemoryDictionary> {
    let dd = InMemoryDictionary::new();
    dd.create_table(
        "APP",
        "customers",
        vec![
            ("id", TypeDescriptor::new(TypeId::Integer, false)),
            ("name", TypeDescriptor::varchar(40, true)),
            ("region", TypeDescriptor::varchar(10, true)),
        ],
    );
    dd.create_table(
        "APP",
        "orders",
        vec![
            ("id", TypeDescriptor::new(TypeId::Integer, false)),
            ("customer_id", TypeDescriptor::new(TypeId::Integer, false)),
            ("amount", TypeDescriptor::decimal(10, 2, true)),
            ("placed", TypeDescriptor::new(TypeId::Date, true)),
        ],
    );
    dd.create_table(
        "APP",
        "regions",
        vec![
            ("code", TypeDescriptor::varchar(10, false)),
            ("label", TypeDescriptor::varchar(40, true)),
        ],
    );
    dd.create_view(
        "APP",
        "big_orders",
        vec![
            ("id", TypeDescriptor::new(TypeId::Integer, false)),
            ("amount", TypeDescriptor::decimal(10, 2, true)),
        ],
    );
    dd.create_index("APP", "orders_customer", "orders", &["customer_id"]);
    dd.create_sequence("APP", "order_seq", TypeDescriptor::new(TypeId::BigInt, false));
    Arc::new(dd)
}

// Row counts for the sample tables
pub fn sample_statistics() -> Arc<TableStatistics> {
    Arc::new(
        TableStatistics::new(100.0)
            .with_table("APP.CUSTOMERS", 1_000.0)
            .with_table("APP.ORDERS", 50_000.0)
            .with_table("APP.REGIONS", 10.0),
    )
}

#[derive(Debug)]
pub struct DescribedAction(pub String);

impl ConstantAction for DescribedAction {
    fn describe(&self) -> String {
        self.0.clone()
    }
}

// Factory recording every action it was asked for
#[derive(Default)]
pub struct RecordingActionFactory {
    calls: Mutex<Vec<String>>,
}

impl RecordingActionFactory {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, description: String) -> CompileResult<Box<dyn ConstantAction>> {
        self.calls.lock().push(description.clone());
        Ok(Box::new(DescribedAction(description)))
    }
}

impl ConstantActionFactory for RecordingActionFactory {
    fn drop_view(
        &self,
        full_name: &str,
        relative_name: &str,
        schema: &SchemaDescriptor,
    ) -> CompileResult<Box<dyn ConstantAction>> {
        self.record(format!("DROP VIEW {} ({}) in {}", full_name, relative_name, schema.name()))
    }

    fn drop_table(
        &self,
        full_name: &str,
        relative_name: &str,
        schema: &SchemaDescriptor,
        table: &TableDescriptor,
        behavior: DropBehavior,
    ) -> CompileResult<Box<dyn ConstantAction>> {
        self.record(format!(
            "DROP TABLE {} ({}) in {} id {} {}",
            full_name,
            relative_name,
            schema.name(),
            table.id(),
            behavior
        ))
    }

    fn drop_index(
        &self,
        full_name: &str,
        relative_name: &str,
        schema: &SchemaDescriptor,
        index: &IndexDescriptor,
    ) -> CompileResult<Box<dyn ConstantAction>> {
        self.record(format!(
            "DROP INDEX {} ({}) in {} on {}",
            full_name,
            relative_name,
            schema.name(),
            index.table_name
        ))
    }

    fn drop_sequence(
        &self,
        full_name: &str,
        relative_name: &str,
        schema: &SchemaDescriptor,
        _sequence: &SequenceDescriptor,
    ) -> CompileResult<Box<dyn ConstantAction>> {
        self.record(format!("DROP SEQUENCE {} ({}) in {}", full_name, relative_name, schema.name()))
    }

    fn transaction(&self, kind: &TransactionKind) -> CompileResult<Box<dyn ConstantAction>> {
        self.record(kind.to_string())
    }
}

#[derive(Debug)]
pub struct FakePlan {
    pub activation: ActivationKind,
    pub description: String,
}

impl GeneratedPlan for FakePlan {
    fn activation_kind(&self) -> ActivationKind {
        self.activation
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

// Generator counting its invocations and supplying a fixed activation kind
pub struct CountingGenerator {
    calls: AtomicUsize,
    supplies: ActivationKind,
}

impl CountingGenerator {
    pub fn new(supplies: ActivationKind) -> Self {
        CountingGenerator { calls: AtomicUsize::new(0), supplies }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CodeGenerator for CountingGenerator {
    fn generate_cursor(&self, request: &CursorPlanRequest<'_>) -> CompileResult<Box<dyn GeneratedPlan>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePlan {
            activation: self.supplies,
            description: format!("cursor plan with join order {:?}", request.join_order),
        }))
    }
}

pub struct Fixture {
    pub dictionary: Arc<InMemoryDictionary>,
    pub statistics: Arc<TableStatistics>,
    pub actions: Arc<RecordingActionFactory>,
    pub generator: Arc<CountingGenerator>,
}

impl Fixture {
    pub fn new() -> Self {
        Fixture {
            dictionary: sample_dictionary(),
            statistics: sample_statistics(),
            actions: Arc::new(RecordingActionFactory::default()),
            generator: Arc::new(CountingGenerator::new(ActivationKind::NeedsFullActivation)),
        }
    }

    pub fn with_generator(mut self, supplies: ActivationKind) -> Self {
        self.generator = Arc::new(CountingGenerator::new(supplies));
        self
    }

    pub fn with_dictionary(mut self, dictionary: InMemoryDictionary) -> Self {
        self.dictionary = Arc::new(dictionary);
        self
    }

    pub fn compiler(&self) -> Compiler {
        Compiler::new(
            self.dictionary.clone(),
            self.statistics.clone(),
            self.actions.clone(),
            self.generator.clone(),
        )
    }

    /// Bind one statement directly, outside a `Compiler`
    pub fn bind(&self, frame: &ContextFrame, statement: &mut impl StatementNode) -> CompileResult<()> {
        let aggregates = AggregateRegistry::builtin();
        let config = CompilerConfig::default();
        statement.bind(&BindContext {
            frame,
            dictionary: self.dictionary.as_ref(),
            aggregates: &aggregates,
            config: &config,
        })
    }

    pub fn generate(&self, statement: &impl StatementNode) -> CompileResult<Action> {
        statement.generate(&GenerateContext {
            actions: self.actions.as_ref(),
            generator: self.generator.as_ref(),
        })
    }
}
