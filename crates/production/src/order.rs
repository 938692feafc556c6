use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kardex_core::{
    ActorId, DomainError, DomainResult, MovementId, ProductId, ProductionOrderId, WarehouseId,
    WorkshopId,
};

/// Production order lifecycle.
///
/// `Planned → InProduction → Completed`; `Cancelled` is reachable from
/// `Planned` only. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionOrderStatus {
    Planned,
    InProduction,
    Completed,
    Cancelled,
}

impl ProductionOrderStatus {
    pub fn label(self) -> &'static str {
        match self {
            ProductionOrderStatus::Planned => "planned",
            ProductionOrderStatus::InProduction => "in_production",
            ProductionOrderStatus::Completed => "completed",
            ProductionOrderStatus::Cancelled => "cancelled",
        }
    }
}

/// Detail line: either an input consumed from the input warehouse when the
/// order starts, or an output produced into the output warehouse when it
/// finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderLine {
    Input { product_id: ProductId, quantity: i64 },
    Output { product_id: ProductId, quantity: i64 },
}

impl OrderLine {
    pub fn input(product_id: ProductId, quantity: i64) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::validation("input quantity must be positive"));
        }
        Ok(Self::Input {
            product_id,
            quantity,
        })
    }

    pub fn output(product_id: ProductId, quantity: i64) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::validation("output quantity must be positive"));
        }
        Ok(Self::Output {
            product_id,
            quantity,
        })
    }

    pub fn product_id(&self) -> ProductId {
        match self {
            OrderLine::Input { product_id, .. } | OrderLine::Output { product_id, .. } => {
                *product_id
            }
        }
    }

    pub fn quantity(&self) -> i64 {
        match self {
            OrderLine::Input { quantity, .. } | OrderLine::Output { quantity, .. } => *quantity,
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self, OrderLine::Input { .. })
    }
}

/// Aggregate root: production order.
///
/// Owns its detail lines and the ledger movements generated when inputs are
/// consumed and outputs are produced. Stock effects happen only on the
/// `start` and `finish` transitions, orchestrated by the engine; this type
/// guards the transitions themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionOrder {
    id: ProductionOrderId,
    /// Unique across all orders; checked by the store on creation.
    code: String,
    workshop_id: WorkshopId,
    input_warehouse_id: WarehouseId,
    output_warehouse_id: WarehouseId,
    actor_id: ActorId,
    status: ProductionOrderStatus,
    lines: Vec<OrderLine>,
    movements: Vec<MovementId>,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
}

impl ProductionOrder {
    #[allow(clippy::too_many_arguments)]
    pub fn plan(
        id: ProductionOrderId,
        code: impl Into<String>,
        workshop_id: WorkshopId,
        input_warehouse_id: WarehouseId,
        output_warehouse_id: WarehouseId,
        actor_id: ActorId,
        lines: Vec<OrderLine>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(DomainError::validation("order code cannot be empty"));
        }
        if !lines.iter().any(|l| l.is_input()) {
            return Err(DomainError::validation(
                "order must have at least one input line",
            ));
        }
        if !lines.iter().any(|l| !l.is_input()) {
            return Err(DomainError::validation(
                "order must have at least one output line",
            ));
        }
        Ok(Self {
            id,
            code,
            workshop_id,
            input_warehouse_id,
            output_warehouse_id,
            actor_id,
            status: ProductionOrderStatus::Planned,
            lines,
            movements: Vec::new(),
            created_at,
            started_at: None,
            finished_at: None,
            cancelled_at: None,
        })
    }

    pub fn id(&self) -> ProductionOrderId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn workshop_id(&self) -> WorkshopId {
        self.workshop_id
    }

    pub fn input_warehouse_id(&self) -> WarehouseId {
        self.input_warehouse_id
    }

    pub fn output_warehouse_id(&self) -> WarehouseId {
        self.output_warehouse_id
    }

    pub fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    pub fn status(&self) -> ProductionOrderStatus {
        self.status
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn movements(&self) -> &[MovementId] {
        &self.movements
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    /// Input lines as (product, quantity) pairs, in detail order.
    pub fn inputs(&self) -> impl Iterator<Item = (ProductId, i64)> + '_ {
        self.lines
            .iter()
            .filter(|l| l.is_input())
            .map(|l| (l.product_id(), l.quantity()))
    }

    /// Output lines as (product, quantity) pairs, in detail order.
    pub fn outputs(&self) -> impl Iterator<Item = (ProductId, i64)> + '_ {
        self.lines
            .iter()
            .filter(|l| !l.is_input())
            .map(|l| (l.product_id(), l.quantity()))
    }

    fn ensure_status(&self, expected: ProductionOrderStatus) -> DomainResult<()> {
        if self.status != expected {
            return Err(DomainError::InvalidState {
                expected: expected.label(),
                found: self.status.label().to_string(),
            });
        }
        Ok(())
    }

    /// `Planned → InProduction`. The engine consumes input stock in the same
    /// transaction; a shortfall aborts before this is committed.
    pub fn start(&mut self, at: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_status(ProductionOrderStatus::Planned)?;
        self.status = ProductionOrderStatus::InProduction;
        self.started_at = Some(at);
        Ok(())
    }

    /// `InProduction → Completed`. The engine produces output stock in the
    /// same transaction.
    pub fn finish(&mut self, at: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_status(ProductionOrderStatus::InProduction)?;
        self.status = ProductionOrderStatus::Completed;
        self.finished_at = Some(at);
        Ok(())
    }

    /// `Planned → Cancelled`. Orders that have consumed inputs cannot be
    /// cancelled; corrections go through manual adjustments so every stock
    /// change stays on the ledger.
    pub fn cancel(&mut self, at: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_status(ProductionOrderStatus::Planned)?;
        self.status = ProductionOrderStatus::Cancelled;
        self.cancelled_at = Some(at);
        Ok(())
    }

    /// Attach ledger movements generated by a start/finish transition.
    pub fn record_movements(&mut self, ids: impl IntoIterator<Item = MovementId>) {
        self.movements.extend(ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_lines() -> Vec<OrderLine> {
        vec![
            OrderLine::input(ProductId::new(), 4).unwrap(),
            OrderLine::output(ProductId::new(), 1).unwrap(),
        ]
    }

    fn test_order() -> ProductionOrder {
        ProductionOrder::plan(
            ProductionOrderId::new(),
            "OP-001",
            WorkshopId::new(),
            WarehouseId::new(),
            WarehouseId::new(),
            ActorId::new(),
            test_lines(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn plan_requires_code_and_both_line_kinds() {
        let err = ProductionOrder::plan(
            ProductionOrderId::new(),
            "  ",
            WorkshopId::new(),
            WarehouseId::new(),
            WarehouseId::new(),
            ActorId::new(),
            test_lines(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let only_inputs = vec![OrderLine::input(ProductId::new(), 2).unwrap()];
        let err = ProductionOrder::plan(
            ProductionOrderId::new(),
            "OP-002",
            WorkshopId::new(),
            WarehouseId::new(),
            WarehouseId::new(),
            ActorId::new(),
            only_inputs,
            Utc::now(),
        )
        .unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("output line") => {}
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn line_quantities_must_be_positive() {
        assert!(OrderLine::input(ProductId::new(), 0).is_err());
        assert!(OrderLine::output(ProductId::new(), -3).is_err());
    }

    #[test]
    fn full_lifecycle_planned_to_completed() {
        let mut order = test_order();
        assert_eq!(order.status(), ProductionOrderStatus::Planned);
        assert!(order.started_at().is_none());

        order.start(Utc::now()).unwrap();
        assert_eq!(order.status(), ProductionOrderStatus::InProduction);
        assert!(order.started_at().is_some());

        order.finish(Utc::now()).unwrap();
        assert_eq!(order.status(), ProductionOrderStatus::Completed);
        assert!(order.finished_at().is_some());
    }

    #[test]
    fn start_twice_fails_invalid_state() {
        let mut order = test_order();
        order.start(Utc::now()).unwrap();
        let err = order.start(Utc::now()).unwrap_err();
        match err {
            DomainError::InvalidState { expected, found } => {
                assert_eq!(expected, "planned");
                assert_eq!(found, "in_production");
            }
            other => panic!("expected InvalidState, got {other:?}"),
        }
    }

    #[test]
    fn finish_requires_in_production() {
        let mut order = test_order();
        let err = order.finish(Utc::now()).unwrap_err();
        match err {
            DomainError::InvalidState { expected, found } => {
                assert_eq!(expected, "in_production");
                assert_eq!(found, "planned");
            }
            other => panic!("expected InvalidState, got {other:?}"),
        }
    }

    #[test]
    fn start_after_finish_fails_invalid_state() {
        let mut order = test_order();
        order.start(Utc::now()).unwrap();
        order.finish(Utc::now()).unwrap();
        let err = order.start(Utc::now()).unwrap_err();
        match err {
            DomainError::InvalidState { found, .. } => assert_eq!(found, "completed"),
            other => panic!("expected InvalidState, got {other:?}"),
        }
    }

    #[test]
    fn cancel_only_from_planned() {
        let mut order = test_order();
        order.cancel(Utc::now()).unwrap();
        assert_eq!(order.status(), ProductionOrderStatus::Cancelled);
        assert!(order.cancelled_at().is_some());

        let mut order = test_order();
        order.start(Utc::now()).unwrap();
        let err = order.cancel(Utc::now()).unwrap_err();
        match err {
            DomainError::InvalidState { found, .. } => assert_eq!(found, "in_production"),
            other => panic!("expected InvalidState, got {other:?}"),
        }
    }

    #[test]
    fn cancelled_is_terminal() {
        let mut order = test_order();
        order.cancel(Utc::now()).unwrap();
        assert!(order.start(Utc::now()).is_err());
        assert!(order.finish(Utc::now()).is_err());
        assert!(order.cancel(Utc::now()).is_err());
    }

    #[test]
    fn inputs_and_outputs_split_lines() {
        let order = test_order();
        assert_eq!(order.inputs().count(), 1);
        assert_eq!(order.outputs().count(), 1);
        assert_eq!(order.inputs().next().unwrap().1, 4);
        assert_eq!(order.outputs().next().unwrap().1, 1);
    }
}
