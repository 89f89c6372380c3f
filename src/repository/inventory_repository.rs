use super::{Error, Event, Invoice, InvoiceWithTickets, Seat, Ticket};
use axum::async_trait;
use rust_decimal::Decimal;
use time::OffsetDateTime;

///
/// Inventory store. Owns all persistent state: events, seats,
/// invoices and tickets.
///
/// Mutations of seat/invoice/ticket state go through a transaction
/// obtained from [Self::begin]; its effects are invisible to other
/// readers until commit.
///
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn InventoryTransaction>, Error>;

    async fn find_event(&self, event_id: i64) -> Result<Option<Event>, Error>;

    ///
    /// Seats of the event ordered by seat number ascending.
    /// Empty until seats are materialized by the first hold
    ///
    async fn find_seats_by_event(&self, event_id: i64) -> Result<Vec<Seat>, Error>;

    ///
    /// Atomically flips every HOLD seat with hold_until < now back to
    /// AVAILABLE, clearing hold_until and bumping version.
    ///
    /// ### Returns
    /// number of seats released
    ///
    async fn release_expired_holds(&self, now: OffsetDateTime) -> Result<u64, Error>;

    ///
    /// Invoices of the buyer with their tickets,
    /// ordered by created_at descending
    ///
    async fn find_invoices_by_buyer_id(
        &self,
        national_id: &str,
    ) -> Result<Vec<InvoiceWithTickets>, Error>;

    ///
    /// Range bounds are inclusive-start / exclusive-end UTC instants.
    /// None counts everything
    ///
    async fn count_tickets_in_range(
        &self,
        range: Option<(OffsetDateTime, OffsetDateTime)>,
    ) -> Result<u64, Error>;

    async fn count_invoices_in_range(
        &self,
        range: Option<(OffsetDateTime, OffsetDateTime)>,
    ) -> Result<u64, Error>;

    async fn sum_invoice_totals_in_range(
        &self,
        range: Option<(OffsetDateTime, OffsetDateTime)>,
    ) -> Result<Decimal, Error>;
}

///
/// Transactional primitives of the inventory store.
/// Dropping the transaction without calling [Self::commit]
/// leaves the store untouched
///
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryTransaction: Send {
    async fn find_event(&mut self, event_id: i64) -> Result<Option<Event>, Error>;

    async fn upsert_event(&mut self, event_id: i64, capacity: i32) -> Result<(), Error>;

    ///
    /// ### Returns
    /// whether the event existed
    ///
    async fn delete_event(&mut self, event_id: i64) -> Result<bool, Error>;

    async fn delete_seats_by_event(&mut self, event_id: i64) -> Result<u64, Error>;

    async fn count_seats(&mut self, event_id: i64) -> Result<u64, Error>;

    ///
    /// ### Errors
    /// - [Error::InsertUniqueViolation] when another writer
    /// materialized a seat with the same (event_id, number) first
    ///
    async fn insert_seats(&mut self, seats: &[Seat]) -> Result<(), Error>;

    async fn find_seat(&mut self, event_id: i64, number: i32) -> Result<Option<Seat>, Error>;

    ///
    /// Persists seat status and hold_until, guarded by the optimistic
    /// version the seat was loaded with.
    ///
    /// ### Returns
    /// the seat with its version bumped
    ///
    /// ### Errors
    /// - [Error::StaleVersion] when the stored version differs
    ///
    async fn update_seat(&mut self, seat: &Seat) -> Result<Seat, Error>;

    async fn insert_invoice(&mut self, invoice: &Invoice) -> Result<(), Error>;

    ///
    /// ### Errors
    /// - [Error::InsertUniqueViolation] when a ticket
    /// for one of the seats already exists
    ///
    async fn insert_tickets(&mut self, tickets: &[Ticket]) -> Result<(), Error>;

    async fn commit(self: Box<Self>) -> Result<(), Error>;

    async fn rollback(self: Box<Self>) -> Result<(), Error>;
}
