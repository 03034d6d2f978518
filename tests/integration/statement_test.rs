use anyhow::Result;

use sqlforge::query::statement::{
    ActivationKind, DropBehavior, DropStatement, DropTarget, IsolationLevel, NoOpStatement,
    TransactionKind, TransactionStatement,
};
use sqlforge::query::tree::TableName;
use sqlforge::{ContextManager, InMemoryDictionary, SqlState, Statement, StatementNode};

#[path = "../common/mod.rs"]
mod common;

use common::Fixture;

#[test]
fn test_no_op_bind_always_fails() -> Result<()> {
    let fixture = Fixture::new();
    let contexts = ContextManager::new();
    let frame = contexts.push("APP");

    let mut stmt = NoOpStatement::new(&frame, "SET DEBUG ON");
    for _ in 0..3 {
        let err = fixture.bind(&frame, &mut stmt).unwrap_err();
        assert_eq!(err.state(), SqlState::ParseOnly);
        assert_eq!(err.state().code(), "42Z54");
    }
    assert_eq!(stmt.activation_kind(), ActivationKind::NeedsNothing);
    assert_eq!(stmt.tree_print(), "NO-OP: SET DEBUG ON");

    let err = fixture.generate(&stmt).unwrap_err();
    assert_eq!(err.state(), SqlState::UnableToGenerate);
    Ok(())
}

#[test]
fn test_transaction_statements() -> Result<()> {
    let fixture = Fixture::new();
    let contexts = ContextManager::new();
    let frame = contexts.push("APP");

    let mut commit = TransactionStatement::new(&frame, TransactionKind::Commit);
    fixture.bind(&frame, &mut commit)?;
    assert!(!commit.is_atomic());
    assert!(!commit.needs_savepoint());
    assert_eq!(commit.row_estimate(), 0);

    let action = fixture.generate(&commit)?;
    assert!(action.is_constant());
    assert_eq!(action.describe(), "COMMIT");

    let isolation = TransactionStatement::new(
        &frame,
        TransactionKind::SetIsolation(IsolationLevel::RepeatableRead),
    );
    assert_eq!(isolation.statement_name(), "SET ISOLATION");
    fixture.generate(&isolation)?;
    assert_eq!(fixture.actions.calls(), vec!["COMMIT", "SET ISOLATION REPEATABLE READ"]);
    Ok(())
}

#[test]
fn test_drop_constant_action_requires_bind() -> Result<()> {
    let fixture = Fixture::new();
    let contexts = ContextManager::new();
    let frame = contexts.push("APP");

    let mut stmt = DropStatement::new(
        &frame,
        DropTarget::Table(DropBehavior::Cascade),
        TableName::unqualified("orders"),
    );
    assert!(stmt.full_name().is_none());
    assert!(stmt.schema_descriptor().is_none());

    let err = stmt.make_constant_action(fixture.actions.as_ref()).unwrap_err();
    assert_eq!(err.state(), SqlState::InternalError);
    assert!(fixture.actions.calls().is_empty());

    fixture.bind(&frame, &mut stmt)?;
    assert!(stmt.is_bound());
    assert_eq!(stmt.full_name().as_deref(), Some("APP.ORDERS"));
    assert_eq!(stmt.relative_name(), "ORDERS");
    assert_eq!(stmt.schema_descriptor().map(|s| s.name()), Some("APP"));

    let action = stmt.make_constant_action(fixture.actions.as_ref())?;
    assert!(action.describe().starts_with("DROP TABLE APP.ORDERS (ORDERS) in APP id "));
    assert!(action.describe().ends_with("CASCADE"));
    Ok(())
}

#[test]
fn test_failed_rebind_forgets_resolution() -> Result<()> {
    let fixture = Fixture::new();
    let empty = Fixture::new().with_dictionary(InMemoryDictionary::new());
    let contexts = ContextManager::new();
    let frame = contexts.push("APP");

    let mut stmt = DropStatement::new(
        &frame,
        DropTarget::Table(DropBehavior::Restrict),
        TableName::unqualified("orders"),
    );
    fixture.bind(&frame, &mut stmt)?;
    assert!(stmt.is_bound());

    let err = empty.bind(&frame, &mut stmt).unwrap_err();
    assert_eq!(err.state(), SqlState::ObjectDoesNotExist);
    assert!(!stmt.is_bound());
    assert!(stmt.full_name().is_none());

    let err = fixture.generate(&stmt).unwrap_err();
    assert_eq!(err.state(), SqlState::InternalError);
    assert!(fixture.actions.calls().is_empty());
    Ok(())
}

#[test]
fn test_drop_flags() -> Result<()> {
    let contexts = ContextManager::new();
    let frame = contexts.push("APP");
    for target in [
        DropTarget::View,
        DropTarget::Table(DropBehavior::Restrict),
        DropTarget::Index,
        DropTarget::Sequence,
    ] {
        let stmt = DropStatement::new(&frame, target, TableName::unqualified("x"));
        assert!(stmt.is_atomic());
        assert!(stmt.needs_savepoint());
        assert_eq!(stmt.activation_kind(), ActivationKind::NeedsNothing);
        assert!(stmt.statement_name().starts_with("DROP "));
    }
    Ok(())
}

#[test]
fn test_drop_each_object_kind() -> Result<()> {
    let fixture = Fixture::new();
    let contexts = ContextManager::new();
    let frame = contexts.push("APP");

    let cases = [
        (DropTarget::View, "big_orders", "DROP VIEW APP.BIG_ORDERS (BIG_ORDERS) in APP"),
        (DropTarget::Index, "orders_customer", "DROP INDEX APP.ORDERS_CUSTOMER (ORDERS_CUSTOMER) in APP on ORDERS"),
        (DropTarget::Sequence, "order_seq", "DROP SEQUENCE APP.ORDER_SEQ (ORDER_SEQ) in APP"),
    ];
    for (target, name, expected) in cases {
        let mut stmt = DropStatement::new(&frame, target, TableName::new(Some("app"), name));
        fixture.bind(&frame, &mut stmt)?;
        assert_eq!(fixture.generate(&stmt)?.describe(), expected);
    }
    Ok(())
}

#[test]
fn test_drop_view_on_table() -> Result<()> {
    let fixture = Fixture::new();
    let contexts = ContextManager::new();
    let frame = contexts.push("APP");

    let mut stmt = DropStatement::new(&frame, DropTarget::View, TableName::unqualified("customers"));
    let err = fixture.bind(&frame, &mut stmt).unwrap_err();
    assert_eq!(err.state().code(), "X0Y16");
    assert!(!stmt.is_bound());
    Ok(())
}

#[test]
fn test_drop_table_on_view() -> Result<()> {
    let fixture = Fixture::new();
    let contexts = ContextManager::new();
    let frame = contexts.push("APP");

    let mut stmt = DropStatement::new(
        &frame,
        DropTarget::Table(DropBehavior::Restrict),
        TableName::unqualified("big_orders"),
    );
    let err = fixture.bind(&frame, &mut stmt).unwrap_err();
    assert_eq!(err.state().code(), "42Y62");
    Ok(())
}

#[test]
fn test_drop_missing_objects() -> Result<()> {
    let fixture = Fixture::new();
    let contexts = ContextManager::new();
    let frame = contexts.push("APP");

    for target in [DropTarget::View, DropTarget::Index, DropTarget::Sequence] {
        let mut stmt = DropStatement::new(&frame, target, TableName::unqualified("nothing_here"));
        let err = fixture.bind(&frame, &mut stmt).unwrap_err();
        assert_eq!(err.state(), SqlState::ObjectDoesNotExist);
    }

    let mut stmt = DropStatement::new(
        &frame,
        DropTarget::Table(DropBehavior::Restrict),
        TableName::new(Some("nowhere"), "orders"),
    );
    let err = fixture.bind(&frame, &mut stmt).unwrap_err();
    assert_eq!(err.state(), SqlState::SchemaDoesNotExist);
    Ok(())
}

#[test]
fn test_drop_in_system_schema_rejected() -> Result<()> {
    let fixture = Fixture::new();
    let contexts = ContextManager::new();
    let frame = contexts.push("SYS");

    // Unqualified name resolves against the frame's default schema
    let mut stmt = DropStatement::new(
        &frame,
        DropTarget::Table(DropBehavior::Restrict),
        TableName::unqualified("systables"),
    );
    let err = fixture.bind(&frame, &mut stmt).unwrap_err();
    assert_eq!(err.state(), SqlState::NoDdlInSystemSchema);
    Ok(())
}

#[test]
fn test_statement_enum_dispatch() -> Result<()> {
    let contexts = ContextManager::new();
    let frame = contexts.push("APP");

    let statements: Vec<Statement> = vec![
        NoOpStatement::new(&frame, "x").into(),
        TransactionStatement::new(&frame, TransactionKind::Rollback).into(),
        DropStatement::new(&frame, DropTarget::Sequence, TableName::unqualified("s")).into(),
    ];
    let names: Vec<&str> = statements.iter().map(|s| s.statement_name()).collect();
    assert_eq!(names, vec!["NO-OP", "ROLLBACK", "DROP SEQUENCE"]);
    assert!(statements.iter().all(|s| s.context() == frame.id()));
    assert!(statements.iter().all(|s| s.activation_kind() == ActivationKind::NeedsNothing));
    Ok(())
}
