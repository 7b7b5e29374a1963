//! # Ticket Assembler
//!
//! Turns the cart into a create-ticket request and submits it exactly once.
//!
//! ## Finalize Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         submit(cart, payment)                           │
//! │                                                                         │
//! │  1. CreateTicketRequest::from_cart ── EmptyCart / InvalidPrice          │
//! │         │                             (no request sent)                 │
//! │         ▼                                                               │
//! │  2. in_flight: false → true ───────── already true: DuplicateSubmission │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  3. tokio::spawn(create_ticket) ───── PendingTicket owns the guard      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  4. PendingTicket::wait ───────────── Ticket / TicketSubmissionFailed   │
//! │                                                                         │
//! │  The spawned task logs the created ticket id (or the error) itself.     │
//! │  in_flight returns to false only when the result has been collected     │
//! │  or the PendingTicket is dropped.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `finalize` parks its `PendingTicket` inside the assembler. A caller that
//! stops waiting leaves it parked: further finalize calls are rejected until
//! [`TicketAssembler::resume`] collects the result.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use carniceria_core::ticket::{CreateTicketRequest, Ticket, UpdateTicketRequest};
use carniceria_core::{Cart, Money, PaymentType};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{CheckoutError, CheckoutResult, ClientError, ClientResult};
use crate::gateway::TicketGateway;

/// Clears the in-flight flag when the submission result is released.
#[derive(Debug)]
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Submits finished carts as tickets, one at a time.
#[derive(Clone)]
pub struct TicketAssembler {
    gateway: Arc<dyn TicketGateway>,
    in_flight: Arc<AtomicBool>,
    parked: Arc<Mutex<Option<PendingTicket>>>,
}

impl TicketAssembler {
    pub fn new(gateway: Arc<dyn TicketGateway>) -> Self {
        Self {
            gateway,
            in_flight: Arc::new(AtomicBool::new(false)),
            parked: Arc::new(Mutex::new(None)),
        }
    }

    /// True from the moment a create call is sent until its result is
    /// collected.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validates the cart and starts the create call.
    ///
    /// The cart is only read. Clearing it after success is the caller's job.
    pub fn submit(&self, cart: &Cart, payment_type: PaymentType) -> CheckoutResult<PendingTicket> {
        let request = CreateTicketRequest::from_cart(cart, payment_type)?;

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Finalize requested while a ticket is already being submitted");
            return Err(CheckoutError::DuplicateSubmission);
        }
        let guard = InFlightGuard(Arc::clone(&self.in_flight));

        let submission_id = Uuid::new_v4();
        let expected_total = request.total;
        info!(
            %submission_id,
            total = %expected_total,
            lines = request.line_count(),
            payment = %payment_type,
            "Submitting ticket"
        );

        let gateway = Arc::clone(&self.gateway);
        let handle = tokio::spawn(async move {
            let result = gateway.create_ticket(&request).await;
            match &result {
                Ok(ticket) => {
                    if !ticket.items.is_empty() && ticket.lines_total() != Some(ticket.total) {
                        warn!(
                            %submission_id,
                            ticket_id = ticket.id,
                            total = %ticket.total,
                            "Backend ticket lines do not add up to its total"
                        );
                    }
                    info!(%submission_id, ticket_id = ticket.id, "Ticket created");
                }
                Err(e) => error!(%submission_id, error = %e, "Ticket submission failed"),
            }
            result
        });

        Ok(PendingTicket {
            submission_id,
            expected_total,
            handle: Some(handle),
            guard: Some(guard),
        })
    }

    /// Submits the cart and waits for the ticket.
    ///
    /// If this future is dropped after the request was sent, the submission
    /// stays parked: `is_submitting` keeps answering true, another finalize
    /// is rejected with `DuplicateSubmission`, and [`resume`](Self::resume)
    /// returns the ticket.
    pub async fn finalize(&self, cart: &Cart, payment_type: PaymentType) -> CheckoutResult<Ticket> {
        let mut parked = self
            .parked
            .try_lock()
            .map_err(|_| CheckoutError::DuplicateSubmission)?;
        if parked.is_some() {
            warn!("Finalize requested while an earlier ticket is still unclaimed");
            return Err(CheckoutError::DuplicateSubmission);
        }
        *parked = Some(self.submit(cart, payment_type)?);
        collect(&mut parked).await
    }

    /// Collects a submission whose `finalize` caller stopped waiting.
    ///
    /// `NothingPending` when no submission is parked, `CheckoutInProgress`
    /// while another caller is already waiting on it.
    pub async fn resume(&self) -> CheckoutResult<Ticket> {
        let mut parked = self
            .parked
            .try_lock()
            .map_err(|_| CheckoutError::CheckoutInProgress)?;
        collect(&mut parked).await
    }

    pub async fn fetch_ticket(&self, ticket_id: i64) -> ClientResult<Ticket> {
        self.gateway.get_ticket(ticket_id).await
    }

    /// Flags a ticket as printed.
    pub async fn mark_printed(&self, ticket_id: i64) -> ClientResult<Ticket> {
        self.gateway
            .update_ticket(ticket_id, &UpdateTicketRequest::mark_printed())
            .await
    }
}

async fn collect(parked: &mut Option<PendingTicket>) -> CheckoutResult<Ticket> {
    let pending = parked.as_mut().ok_or(CheckoutError::NothingPending)?;
    let result = pending.wait().await;
    *parked = None;
    result
}

/// A create call that has been sent and may not have resolved yet.
///
/// Holds the assembler's in-flight flag until the result is collected.
/// Dropping it unread releases the flag; the spawned task still logs the
/// outcome.
#[derive(Debug)]
pub struct PendingTicket {
    submission_id: Uuid,
    expected_total: Money,
    handle: Option<JoinHandle<ClientResult<Ticket>>>,
    guard: Option<InFlightGuard>,
}

impl PendingTicket {
    pub fn submission_id(&self) -> Uuid {
        self.submission_id
    }

    pub fn expected_total(&self) -> Money {
        self.expected_total
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Waits for the backend's answer.
    ///
    /// Dropping this future leaves the request running; call `wait` again
    /// to collect the result. Once a result was returned, further calls
    /// answer `NothingPending`.
    pub async fn wait(&mut self) -> CheckoutResult<Ticket> {
        let submission_id = self.submission_id;
        let Some(handle) = self.handle.as_mut() else {
            return Err(CheckoutError::NothingPending);
        };
        let joined = handle.await;
        self.handle = None;
        self.guard = None;

        let outcome = match joined {
            Ok(result) => result,
            Err(join_error) => Err(ClientError::Internal(join_error.to_string())),
        };

        match outcome {
            Ok(ticket) => {
                if ticket.total != self.expected_total {
                    warn!(
                        %submission_id,
                        ticket_id = ticket.id,
                        sent = %self.expected_total,
                        recorded = %ticket.total,
                        "Backend recorded a different total"
                    );
                }
                Ok(ticket)
            }
            Err(e) => Err(CheckoutError::TicketSubmissionFailed(e)),
        }
    }
}
