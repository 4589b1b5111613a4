// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admission gate for exclusive resource access
//!
//! A single-holder gate that admits requests strictly in the order they join
//! the queue. Joining is synchronous ([`AdmissionGate::enqueue`]); only waiting
//! for the grant suspends. On release the gate is handed directly to the next
//! queued waiter, so a late arrival can never overtake it.
//!
//! The gate feeds the waiting count and wait samples of a
//! [`TelemetryRegister`]: a request is counted as waiting from the moment it
//! joins until the moment it is granted.

use crate::clock::{Clock, SystemClock};
use crate::telemetry::TelemetryRegister;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use thiserror::Error;
use tokio::sync::oneshot;

/// Errors from waiting on the gate
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    #[error("admission gate closed while waiting")]
    Closed,
}

/// Position in the admission order, assigned when a request joins
pub type TicketNumber = u64;

struct Waiter {
    ticket: TicketNumber,
    enqueued_at: Instant,
    grant: oneshot::Sender<()>,
}

#[derive(Default)]
struct GateState {
    /// Ticket currently inside the critical section
    holder: Option<TicketNumber>,
    waiters: VecDeque<Waiter>,
    next_ticket: TicketNumber,
    closed: bool,
}

/// Fair (FIFO) mutual-exclusion gate
pub struct AdmissionGate<C: Clock = SystemClock> {
    state: Mutex<GateState>,
    telemetry: Arc<TelemetryRegister>,
    clock: C,
}

impl AdmissionGate<SystemClock> {
    pub fn new(telemetry: Arc<TelemetryRegister>) -> Self {
        Self::with_clock(telemetry, SystemClock)
    }
}

impl<C: Clock> AdmissionGate<C> {
    pub fn with_clock(telemetry: Arc<TelemetryRegister>, clock: C) -> Self {
        Self {
            state: Mutex::new(GateState::default()),
            telemetry,
            clock,
        }
    }

    pub fn telemetry(&self) -> &Arc<TelemetryRegister> {
        &self.telemetry
    }

    /// Join the admission queue
    ///
    /// The position is fixed by the time this returns; awaiting
    /// [`Ticket::granted`] later does not change it.
    pub fn enqueue(self: &Arc<Self>) -> Ticket<C> {
        let mut state = self.lock_state();
        let ticket = state.next_ticket;
        state.next_ticket += 1;

        if state.closed {
            return Ticket::new(Arc::clone(self), ticket, Admission::Refused);
        }

        self.telemetry.record_arrival();

        if state.holder.is_none() && state.waiters.is_empty() {
            state.holder = Some(ticket);
            self.telemetry.record_grant(std::time::Duration::ZERO);
            tracing::trace!(ticket, "granted immediately");
            return Ticket::new(Arc::clone(self), ticket, Admission::Granted);
        }

        let (tx, rx) = oneshot::channel();
        state.waiters.push_back(Waiter {
            ticket,
            enqueued_at: self.clock.now(),
            grant: tx,
        });
        tracing::debug!(ticket, queued = state.waiters.len(), "waiting for gate");
        Ticket::new(Arc::clone(self), ticket, Admission::Queued(rx))
    }

    /// Join the queue and wait for the grant
    pub async fn acquire(self: &Arc<Self>) -> Result<Grant<C>, GateError> {
        self.enqueue().granted().await
    }

    /// Ticket currently holding the gate, if any
    pub fn holder(&self) -> Option<TicketNumber> {
        self.lock_state().holder
    }

    /// Number of requests queued behind the holder
    pub fn queue_len(&self) -> usize {
        self.lock_state().waiters.len()
    }

    pub fn is_closed(&self) -> bool {
        self.lock_state().closed
    }

    /// Abandon every queued waiter and refuse new arrivals
    ///
    /// A request already holding the gate keeps it until it releases.
    pub fn close(&self) {
        let mut state = self.lock_state();
        state.closed = true;
        let abandoned = state.waiters.len();
        for _ in state.waiters.drain(..) {
            self.telemetry.record_abandoned();
        }
        if abandoned > 0 {
            tracing::warn!(abandoned, "gate closed with requests still queued");
        }
    }

    // Releasing without holding means exclusivity is already broken
    #[allow(clippy::panic)]
    fn release(&self, ticket: TicketNumber) {
        let mut state = self.lock_state();
        match state.holder {
            Some(holder) if holder == ticket => self.hand_off(&mut state),
            holder => panic!(
                "admission gate released by ticket {} while held by {:?}",
                ticket, holder
            ),
        }
    }

    /// Pass the gate to the oldest live waiter, or mark it free
    fn hand_off(&self, state: &mut GateState) {
        state.holder = None;
        while let Some(waiter) = state.waiters.pop_front() {
            if waiter.grant.send(()).is_ok() {
                let wait = self
                    .clock
                    .now()
                    .saturating_duration_since(waiter.enqueued_at);
                state.holder = Some(waiter.ticket);
                self.telemetry.record_grant(wait);
                tracing::trace!(
                    ticket = waiter.ticket,
                    wait_ms = wait.as_millis() as u64,
                    "granted"
                );
                return;
            }
            // Receiver dropped without withdrawing (runtime teardown)
            self.telemetry.record_abandoned();
        }
    }

    /// Drop a ticket that was never claimed through [`Ticket::granted`]
    fn withdraw(&self, ticket: TicketNumber) {
        let mut state = self.lock_state();
        if let Some(pos) = state.waiters.iter().position(|w| w.ticket == ticket) {
            state.waiters.remove(pos);
            self.telemetry.record_abandoned();
            tracing::debug!(ticket, "left queue before grant");
        } else if state.holder == Some(ticket) {
            // Granted but never claimed: pass it on
            self.hand_off(&mut state);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

enum Admission {
    Granted,
    Queued(oneshot::Receiver<()>),
    Refused,
}

/// A place in the admission queue
///
/// Dropping a ticket before its grant is claimed withdraws it; if the grant
/// had already been issued, the gate moves on to the next waiter.
#[must_use = "dropping a ticket withdraws it from the queue"]
pub struct Ticket<C: Clock = SystemClock> {
    gate: Arc<AdmissionGate<C>>,
    ticket: TicketNumber,
    admission: Option<Admission>,
}

impl<C: Clock> Ticket<C> {
    fn new(gate: Arc<AdmissionGate<C>>, ticket: TicketNumber, admission: Admission) -> Self {
        Self {
            gate,
            ticket,
            admission: Some(admission),
        }
    }

    pub fn number(&self) -> TicketNumber {
        self.ticket
    }

    /// Wait until this ticket holds the gate
    pub async fn granted(mut self) -> Result<Grant<C>, GateError> {
        match self.admission.as_mut() {
            Some(Admission::Granted) => {}
            Some(Admission::Queued(rx)) => {
                // Err only when close() dropped our sender
                if rx.await.is_err() {
                    self.admission = None;
                    return Err(GateError::Closed);
                }
            }
            Some(Admission::Refused) | None => {
                self.admission = None;
                return Err(GateError::Closed);
            }
        }
        self.admission = None;
        Ok(Grant {
            gate: Arc::clone(&self.gate),
            ticket: self.ticket,
            released: false,
        })
    }
}

impl<C: Clock> Drop for Ticket<C> {
    fn drop(&mut self) {
        if matches!(
            self.admission,
            Some(Admission::Granted) | Some(Admission::Queued(_))
        ) {
            self.gate.withdraw(self.ticket);
        }
    }
}

/// Exclusive possession of the gate
///
/// Released exactly once: explicitly through [`Grant::release`] or on drop.
#[must_use = "dropping a grant releases the gate"]
pub struct Grant<C: Clock = SystemClock> {
    gate: Arc<AdmissionGate<C>>,
    ticket: TicketNumber,
    released: bool,
}

impl<C: Clock> Grant<C> {
    pub fn ticket(&self) -> TicketNumber {
        self.ticket
    }

    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.gate.release(self.ticket);
        }
    }
}

impl<C: Clock> Drop for Grant<C> {
    fn drop(&mut self) {
        self.release_once();
    }
}

impl<C: Clock> std::fmt::Debug for Grant<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grant").field("ticket", &self.ticket).finish()
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
