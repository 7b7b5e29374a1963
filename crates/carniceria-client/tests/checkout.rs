//! Finalize and print workflows against an in-memory backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use carniceria_client::{
    CheckoutError, ClientError, ClientResult, PosSession, PrintOutcome, ReceiptSink,
    TicketAssembler, TicketGateway,
};
use carniceria_core::receipt::ReceiptSettings;
use carniceria_core::ticket::{CreateTicketRequest, Ticket, TicketLine, UpdateTicketRequest};
use carniceria_core::{Cart, Catalog, Cut, Money, PaymentType, Product, Quantity, SaleUnit};
use chrono::Utc;
use tokio::sync::Notify;

// =============================================================================
// Fakes
// =============================================================================

#[derive(Default)]
struct FakeGateway {
    creates: AtomicUsize,
    updates: AtomicUsize,
    next_id: AtomicI64,
    fail_create: AtomicBool,
    fail_update: AtomicBool,
    gate: Option<Arc<Notify>>,
    requests: Mutex<Vec<CreateTicketRequest>>,
    tickets: Mutex<HashMap<i64, Ticket>>,
}

impl FakeGateway {
    fn new() -> Self {
        Self::default()
    }

    /// Create calls block until the gate is notified.
    fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    fn update_calls(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> CreateTicketRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl TicketGateway for FakeGateway {
    async fn create_ticket(&self, request: &CreateTicketRequest) -> ClientResult<Ticket> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(ClientError::ConnectionFailed("connection refused".into()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let ticket = Ticket {
            id,
            total: request.total,
            payment_type: request.payment_type,
            printed: false,
            created_at: Utc::now(),
            updated_at: None,
            user: None,
            items: request
                .items
                .iter()
                .map(|line| TicketLine {
                    id: None,
                    product_id: line.product_id,
                    product_name: format!("Producto {}", line.product_id),
                    cut_id: line.cut_id,
                    cut_name: None,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    subtotal: line.subtotal,
                    unit: line.unit,
                })
                .collect(),
        };
        self.tickets.lock().unwrap().insert(id, ticket.clone());
        Ok(ticket)
    }

    async fn update_ticket(
        &self,
        ticket_id: i64,
        request: &UpdateTicketRequest,
    ) -> ClientResult<Ticket> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(ClientError::Timeout);
        }
        let mut tickets = self.tickets.lock().unwrap();
        let ticket = tickets.get_mut(&ticket_id).ok_or(ClientError::Api {
            status: 404,
            message: "Ticket no encontrado".into(),
        })?;
        ticket.printed = request.printed;
        Ok(ticket.clone())
    }

    async fn get_ticket(&self, ticket_id: i64) -> ClientResult<Ticket> {
        self.tickets
            .lock()
            .unwrap()
            .get(&ticket_id)
            .cloned()
            .ok_or(ClientError::Api {
                status: 404,
                message: "Ticket no encontrado".into(),
            })
    }
}

#[derive(Default)]
struct MemorySink {
    receipts: Vec<String>,
}

impl ReceiptSink for MemorySink {
    fn write_receipt(&mut self, _ticket: &Ticket, text: &str) -> std::io::Result<()> {
        self.receipts.push(text.to_string());
        Ok(())
    }
}

struct JammedPrinter;

impl ReceiptSink for JammedPrinter {
    fn write_receipt(&mut self, _ticket: &Ticket, _text: &str) -> std::io::Result<()> {
        Err(std::io::Error::new(std::io::ErrorKind::Other, "paper jam"))
    }
}

// =============================================================================
// Fixtures
// =============================================================================

fn money(s: &str) -> Money {
    s.parse().unwrap()
}

fn q(s: &str) -> Quantity {
    s.parse().unwrap()
}

fn catalog() -> Catalog {
    Catalog::new(vec![
        Product::new(1, "Bife de Chorizo").with_price_per_kg(money("12.50")),
        Product::new(5, "Vacuno")
            .with_price_per_kg(money("10.00"))
            .with_cut(Cut::new(1, "Milanesa").with_price_per_unit(money("2.75"))),
    ])
}

fn session(gateway: Arc<FakeGateway>) -> PosSession {
    PosSession::new(catalog(), gateway, ReceiptSettings::default())
}

fn bife_cart() -> Cart {
    let catalog = catalog();
    let mut cart = Cart::new();
    cart.add_item(catalog.get(1).unwrap(), None, Some(SaleUnit::Kg), q("1.2"))
        .unwrap();
    cart
}

// =============================================================================
// Assembler
// =============================================================================

#[tokio::test]
async fn empty_cart_sends_nothing() {
    let gateway = Arc::new(FakeGateway::new());
    let assembler = TicketAssembler::new(gateway.clone());

    let err = assembler
        .finalize(&Cart::new(), PaymentType::Cash)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::EmptyCart));
    assert_eq!(gateway.create_calls(), 0);
    assert!(!assembler.is_submitting());
}

#[tokio::test]
async fn second_finalize_while_pending_is_rejected() {
    let gate = Arc::new(Notify::new());
    let gateway = Arc::new(FakeGateway::gated(gate.clone()));
    let assembler = TicketAssembler::new(gateway.clone());
    let cart = bife_cart();

    let mut first = assembler.submit(&cart, PaymentType::Cash).unwrap();
    assert!(assembler.is_submitting());

    let second = assembler.submit(&cart, PaymentType::Cash);
    assert!(matches!(second, Err(CheckoutError::DuplicateSubmission)));

    gate.notify_one();
    let ticket = first.wait().await.unwrap();

    assert_eq!(ticket.total, money("15.00"));
    assert_eq!(gateway.create_calls(), 1);
    assert!(!assembler.is_submitting());
    assert!(first.is_finished());
    assert!(matches!(
        first.wait().await,
        Err(CheckoutError::NothingPending)
    ));
}

#[tokio::test]
async fn request_matches_the_cart() {
    let gateway = Arc::new(FakeGateway::new());
    let assembler = TicketAssembler::new(gateway.clone());
    let cart = bife_cart();

    let ticket = assembler.finalize(&cart, PaymentType::Card).await.unwrap();

    let request = gateway.last_request();
    assert_eq!(request.total, cart.total());
    assert_eq!(request.payment_type, PaymentType::Card);
    assert_eq!(request.items.len(), 1);
    assert_eq!(request.items[0].quantity, "1.2".parse().unwrap());
    assert_eq!(request.items[0].subtotal, money("15.00"));
    assert_eq!(ticket.items.len(), cart.len());
}

#[tokio::test]
async fn guard_is_released_after_failure() {
    let gateway = Arc::new(FakeGateway::new());
    gateway.fail_create.store(true, Ordering::SeqCst);
    let assembler = TicketAssembler::new(gateway.clone());
    let cart = bife_cart();

    let err = assembler.finalize(&cart, PaymentType::Cash).await.unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::TicketSubmissionFailed(ClientError::ConnectionFailed(_))
    ));
    assert!(err.is_retryable());
    assert!(!assembler.is_submitting());

    gateway.fail_create.store(false, Ordering::SeqCst);
    assert!(assembler.finalize(&cart, PaymentType::Cash).await.is_ok());
    assert_eq!(gateway.create_calls(), 2);
}

#[tokio::test]
async fn abandoned_finalize_blocks_a_retry_until_resumed() {
    let gate = Arc::new(Notify::new());
    let gateway = Arc::new(FakeGateway::gated(gate.clone()));
    let assembler = TicketAssembler::new(gateway.clone());
    let cart = bife_cart();

    assert!(matches!(
        assembler.resume().await,
        Err(CheckoutError::NothingPending)
    ));

    let abandoned =
        tokio::time::timeout(Duration::from_millis(20), assembler.finalize(&cart, PaymentType::Cash))
            .await;
    assert!(abandoned.is_err());
    assert!(assembler.is_submitting());

    let retry = assembler.finalize(&cart, PaymentType::Cash).await;
    assert!(matches!(retry, Err(CheckoutError::DuplicateSubmission)));
    assert!(assembler.is_submitting());

    gate.notify_one();
    let ticket = assembler.resume().await.unwrap();
    assert_eq!(ticket.total, money("15.00"));
    assert_eq!(gateway.create_calls(), 1);
    assert!(!assembler.is_submitting());

    // Collected: the next sale goes through normally.
    gate.notify_one();
    assert!(assembler.finalize(&cart, PaymentType::Cash).await.is_ok());
    assert_eq!(gateway.create_calls(), 2);
}

// =============================================================================
// Session
// =============================================================================

#[tokio::test]
async fn checkout_clears_the_cart() {
    let gateway = Arc::new(FakeGateway::new());
    let mut session = session(gateway.clone());

    session.add(1, None, None, q("1.2")).unwrap();
    session.add(5, Some(1), None, q("4")).unwrap();
    assert_eq!(session.view().totals.total, money("26.00"));

    let ticket = session.checkout(PaymentType::Transfer).await.unwrap();
    assert_eq!(ticket.total, money("26.00"));
    assert_eq!(ticket.items.len(), 2);
    assert!(session.cart().is_empty());
    assert_eq!(session.last_ticket().map(|t| t.id), Some(ticket.id));
}

#[tokio::test]
async fn failed_checkout_keeps_the_cart() {
    let gateway = Arc::new(FakeGateway::new());
    gateway.fail_create.store(true, Ordering::SeqCst);
    let mut session = session(gateway.clone());

    session.add(1, None, None, q("1.2")).unwrap();
    let before = session.view();

    let err = session.checkout(PaymentType::Cash).await.unwrap_err();
    assert!(matches!(err, CheckoutError::TicketSubmissionFailed(_)));
    assert_eq!(session.view(), before);
    assert!(session.last_ticket().is_none());
    assert!(!session.is_checkout_pending());
}

#[tokio::test]
async fn empty_session_checkout_sends_nothing() {
    let gateway = Arc::new(FakeGateway::new());
    let mut session = session(gateway.clone());

    let err = session.checkout(PaymentType::Cash).await.unwrap_err();
    assert!(matches!(err, CheckoutError::EmptyCart));
    assert_eq!(gateway.create_calls(), 0);
    assert!(!session.is_checkout_pending());
}

#[tokio::test]
async fn cart_is_locked_while_a_checkout_is_pending() {
    let gate = Arc::new(Notify::new());
    let gateway = Arc::new(FakeGateway::gated(gate.clone()));
    let mut session = session(gateway.clone());
    session.add(1, None, None, q("1.2")).unwrap();

    // The operator stops waiting; the request keeps going.
    let abandoned =
        tokio::time::timeout(Duration::from_millis(20), session.checkout(PaymentType::Cash)).await;
    assert!(abandoned.is_err());
    assert!(session.is_checkout_pending());

    assert!(matches!(
        session.add(1, None, None, q("1")),
        Err(CheckoutError::CheckoutInProgress)
    ));
    assert!(matches!(
        session.clear(),
        Err(CheckoutError::CheckoutInProgress)
    ));
    assert!(matches!(
        session.checkout(PaymentType::Cash).await,
        Err(CheckoutError::DuplicateSubmission)
    ));
    assert_eq!(session.cart().len(), 1);

    gate.notify_one();
    let ticket = session.resume_checkout().await.unwrap();
    assert_eq!(ticket.total, money("15.00"));
    assert_eq!(gateway.create_calls(), 1);
    assert!(session.cart().is_empty());

    session.add(1, None, None, q("1")).unwrap();
}

#[tokio::test]
async fn session_cart_edits() {
    let gateway = Arc::new(FakeGateway::new());
    let mut session = session(gateway);

    let line = session.add(5, None, None, q("2")).unwrap();
    assert_eq!(line.id(), "5-kg");

    let moved = session.change_cut("5-kg", Some(1)).unwrap();
    assert_eq!(moved.id(), "5-1-pz");
    assert_eq!(moved.unit_price(), money("2.75"));
    assert_eq!(moved.subtotal(), money("5.50"));

    assert!(matches!(
        session.change_unit("5-1-pz", SaleUnit::Kg),
        Err(CheckoutError::Cart(_))
    ));
    assert!(matches!(
        session.add(99, None, None, q("1")),
        Err(CheckoutError::ProductNotFound(99))
    ));

    assert!(session.remove("5-1-pz").unwrap());
    assert!(!session.remove("5-1-pz").unwrap());
}

// =============================================================================
// Printing
// =============================================================================

#[tokio::test]
async fn print_marks_the_ticket_printed() {
    let gateway = Arc::new(FakeGateway::new());
    let mut session = session(gateway.clone());
    let mut sink = MemorySink::default();

    assert!(matches!(
        session.print_last(&mut sink).await,
        Err(CheckoutError::NothingToPrint)
    ));

    session.add(1, None, None, q("1.2")).unwrap();
    session.checkout(PaymentType::Cash).await.unwrap();

    match session.print_last(&mut sink).await.unwrap() {
        PrintOutcome::Printed(ticket) => assert!(ticket.printed),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(gateway.update_calls(), 1);
    assert!(session.last_ticket().unwrap().printed);
    assert!(sink.receipts[0].contains("Ticket: #000001"));
    assert!(sink.receipts[0].contains("Efectivo"));
}

#[tokio::test]
async fn mark_printed_failure_is_not_fatal() {
    let gateway = Arc::new(FakeGateway::new());
    gateway.fail_update.store(true, Ordering::SeqCst);
    let mut session = session(gateway.clone());
    let mut sink = MemorySink::default();

    session.add(1, None, None, q("1.2")).unwrap();
    let ticket = session.checkout(PaymentType::Cash).await.unwrap();

    let outcome = session.print_last(&mut sink).await.unwrap();
    assert!(matches!(
        outcome,
        PrintOutcome::PrintedNotRecorded { ticket_id, .. } if ticket_id == ticket.id
    ));
    assert_eq!(sink.receipts.len(), 1);
    assert!(session.cart().is_empty());
}

#[tokio::test]
async fn printer_failure_skips_mark_printed() {
    let gateway = Arc::new(FakeGateway::new());
    let mut session = session(gateway.clone());

    session.add(1, None, None, q("1.2")).unwrap();
    session.checkout(PaymentType::Cash).await.unwrap();

    let err = session.print_last(&mut JammedPrinter).await.unwrap_err();
    assert!(matches!(err, CheckoutError::PrintFailed(_)));
    assert_eq!(gateway.update_calls(), 0);
    assert!(!session.last_ticket().unwrap().printed);
}

#[tokio::test]
async fn reprint_by_id() {
    let gateway = Arc::new(FakeGateway::new());
    let mut session = session(gateway.clone());
    let mut sink = MemorySink::default();

    session.add(1, None, None, q("1.2")).unwrap();
    let ticket = session.checkout(PaymentType::Cash).await.unwrap();

    assert!(matches!(
        session.reprint(ticket.id, &mut sink).await.unwrap(),
        PrintOutcome::Printed(_)
    ));
    assert!(matches!(
        session.reprint(99, &mut sink).await,
        Err(CheckoutError::Backend(ClientError::Api { status: 404, .. }))
    ));
    assert_eq!(sink.receipts.len(), 1);
}
