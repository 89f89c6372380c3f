use super::{
    entity::{EventEntity, InvoiceEntity, SeatEntity, TicketEntity},
    Error, Event, Invoice, InventoryRepository, InventoryTransaction, InvoiceWithTickets, Seat,
    Ticket,
};
use axum::async_trait;
use bson::{doc, DateTime, Document};
use futures_util::TryStreamExt;
use mongodb::{options::IndexOptions, Client, ClientSession, Database, IndexModel};
use rust_decimal::Decimal;
use time::OffsetDateTime;

const EVENTS: &str = "events";
const SEATS: &str = "seats";
const INVOICES: &str = "invoices";
const TICKETS: &str = "tickets";

const INDEX_NAME_UNIQUE_SEAT: &str = "unique_event_seat";
const INDEX_NAME_UNIQUE_TICKET_SEAT: &str = "unique_ticket_seat";
const INDEX_NAME_INVOICE_BUYER: &str = "invoice_buyer";

pub struct InventoryRepositoryImpl {
    client: Client,
    database: Database,
}

impl InventoryRepositoryImpl {
    pub async fn new(client: Client, database: Database) -> Result<Self, mongodb::error::Error> {
        let existing_collections = database.list_collection_names().await?;
        for collection in [EVENTS, SEATS, INVOICES, TICKETS] {
            if !existing_collections.contains(&collection.to_string()) {
                tracing::debug!(collection, "creating collection");
                database.create_collection(collection).await?;
            }
        }

        let seats = database.collection::<Document>(SEATS);
        let index_names = seats.list_index_names().await?;
        if !index_names.contains(&INDEX_NAME_UNIQUE_SEAT.to_string()) {
            seats
                .create_index(
                    IndexModel::builder()
                        .keys(doc! {
                            "event_id": 1,
                            "number": 1,
                        })
                        .options(
                            IndexOptions::builder()
                                .name(INDEX_NAME_UNIQUE_SEAT.to_string())
                                .unique(true)
                                .build(),
                        )
                        .build(),
                )
                .await?;
            tracing::debug!(
                collection = SEATS,
                index = INDEX_NAME_UNIQUE_SEAT,
                "created index"
            );
        }

        let tickets = database.collection::<Document>(TICKETS);
        let index_names = tickets.list_index_names().await?;
        if !index_names.contains(&INDEX_NAME_UNIQUE_TICKET_SEAT.to_string()) {
            tickets
                .create_index(
                    IndexModel::builder()
                        .keys(doc! {
                            "seat_id": 1,
                        })
                        .options(
                            IndexOptions::builder()
                                .name(INDEX_NAME_UNIQUE_TICKET_SEAT.to_string())
                                .unique(true)
                                .build(),
                        )
                        .build(),
                )
                .await?;
            tracing::debug!(
                collection = TICKETS,
                index = INDEX_NAME_UNIQUE_TICKET_SEAT,
                "created index"
            );
        }

        let invoices = database.collection::<Document>(INVOICES);
        let index_names = invoices.list_index_names().await?;
        if !index_names.contains(&INDEX_NAME_INVOICE_BUYER.to_string()) {
            invoices
                .create_index(
                    IndexModel::builder()
                        .keys(doc! {
                            "national_id": 1,
                        })
                        .options(
                            IndexOptions::builder()
                                .name(INDEX_NAME_INVOICE_BUYER.to_string())
                                .build(),
                        )
                        .build(),
                )
                .await?;
            tracing::debug!(
                collection = INVOICES,
                index = INDEX_NAME_INVOICE_BUYER,
                "created index"
            );
        }

        Ok(Self { client, database })
    }

    fn created_at_filter(range: Option<(OffsetDateTime, OffsetDateTime)>) -> Document {
        match range {
            Some((start, end)) => doc! {
                "created_at": {
                    "$gte": DateTime::from(start),
                    "$lt": DateTime::from(end),
                },
            },
            None => doc! {},
        }
    }
}

#[async_trait]
impl InventoryRepository for InventoryRepositoryImpl {
    async fn begin(&self) -> Result<Box<dyn InventoryTransaction>, Error> {
        let mut session = self.client.start_session().await?;
        session.start_transaction().await?;

        Ok(Box::new(MongoInventoryTransaction {
            database: self.database.clone(),
            session,
        }))
    }

    async fn find_event(&self, event_id: i64) -> Result<Option<Event>, Error> {
        let entity = self
            .database
            .collection::<EventEntity>(EVENTS)
            .find_one(doc! { "_id": event_id })
            .await?;

        Ok(entity.map(Event::from))
    }

    async fn find_seats_by_event(&self, event_id: i64) -> Result<Vec<Seat>, Error> {
        let entities = self
            .database
            .collection::<SeatEntity>(SEATS)
            .find(doc! { "event_id": event_id })
            .sort(doc! { "number": 1 })
            .await?
            .try_collect::<Vec<_>>()
            .await?;

        Ok(entities.into_iter().map(Seat::from).collect())
    }

    async fn release_expired_holds(&self, now: OffsetDateTime) -> Result<u64, Error> {
        let update_result = self
            .database
            .collection::<Document>(SEATS)
            .update_many(
                doc! {
                    "status": "HOLD",
                    "hold_until": { "$lt": DateTime::from(now) },
                },
                doc! {
                    "$set": {
                        "status": "AVAILABLE",
                        "hold_until": None as Option<DateTime>,
                    },
                    "$inc": { "version": 1 },
                },
            )
            .await?;

        Ok(update_result.modified_count)
    }

    async fn find_invoices_by_buyer_id(
        &self,
        national_id: &str,
    ) -> Result<Vec<InvoiceWithTickets>, Error> {
        let invoice_entities = self
            .database
            .collection::<InvoiceEntity>(INVOICES)
            .find(doc! { "national_id": national_id })
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect::<Vec<_>>()
            .await?;

        let mut invoices = Vec::with_capacity(invoice_entities.len());
        for entity in invoice_entities {
            let ticket_entities = self
                .database
                .collection::<TicketEntity>(TICKETS)
                .find(doc! { "invoice_id": entity.id })
                .sort(doc! { "seat_number": 1 })
                .await?
                .try_collect::<Vec<_>>()
                .await?;

            let mut tickets = Vec::with_capacity(ticket_entities.len());
            for ticket_entity in ticket_entities {
                tickets.push(Ticket::try_from(ticket_entity)?);
            }

            invoices.push(InvoiceWithTickets {
                invoice: Invoice::try_from(entity)?,
                tickets,
            });
        }

        Ok(invoices)
    }

    async fn count_tickets_in_range(
        &self,
        range: Option<(OffsetDateTime, OffsetDateTime)>,
    ) -> Result<u64, Error> {
        let filter = match range {
            Some((start, end)) => doc! {
                "purchased_at": {
                    "$gte": DateTime::from(start),
                    "$lt": DateTime::from(end),
                },
            },
            None => doc! {},
        };

        let count = self
            .database
            .collection::<Document>(TICKETS)
            .count_documents(filter)
            .await?;

        Ok(count)
    }

    async fn count_invoices_in_range(
        &self,
        range: Option<(OffsetDateTime, OffsetDateTime)>,
    ) -> Result<u64, Error> {
        let count = self
            .database
            .collection::<Document>(INVOICES)
            .count_documents(Self::created_at_filter(range))
            .await?;

        Ok(count)
    }

    async fn sum_invoice_totals_in_range(
        &self,
        range: Option<(OffsetDateTime, OffsetDateTime)>,
    ) -> Result<Decimal, Error> {
        let entities = self
            .database
            .collection::<InvoiceEntity>(INVOICES)
            .find(Self::created_at_filter(range))
            .await?
            .try_collect::<Vec<_>>()
            .await?;

        let mut sum = Decimal::ZERO;
        for entity in entities {
            sum += Invoice::try_from(entity)?.total;
        }

        Ok(sum)
    }
}

struct MongoInventoryTransaction {
    database: Database,
    session: ClientSession,
}

#[async_trait]
impl InventoryTransaction for MongoInventoryTransaction {
    async fn find_event(&mut self, event_id: i64) -> Result<Option<Event>, Error> {
        let entity = self
            .database
            .collection::<EventEntity>(EVENTS)
            .find_one(doc! { "_id": event_id })
            .session(&mut self.session)
            .await?;

        Ok(entity.map(Event::from))
    }

    async fn upsert_event(&mut self, event_id: i64, capacity: i32) -> Result<(), Error> {
        self.database
            .collection::<Document>(EVENTS)
            .update_one(
                doc! { "_id": event_id },
                doc! { "$set": { "capacity": capacity } },
            )
            .upsert(true)
            .session(&mut self.session)
            .await?;

        Ok(())
    }

    async fn delete_event(&mut self, event_id: i64) -> Result<bool, Error> {
        let delete_result = self
            .database
            .collection::<Document>(EVENTS)
            .delete_one(doc! { "_id": event_id })
            .session(&mut self.session)
            .await?;

        Ok(delete_result.deleted_count == 1)
    }

    async fn delete_seats_by_event(&mut self, event_id: i64) -> Result<u64, Error> {
        let delete_result = self
            .database
            .collection::<Document>(SEATS)
            .delete_many(doc! { "event_id": event_id })
            .session(&mut self.session)
            .await?;

        Ok(delete_result.deleted_count)
    }

    async fn count_seats(&mut self, event_id: i64) -> Result<u64, Error> {
        let count = self
            .database
            .collection::<Document>(SEATS)
            .count_documents(doc! { "event_id": event_id })
            .session(&mut self.session)
            .await?;

        Ok(count)
    }

    async fn insert_seats(&mut self, seats: &[Seat]) -> Result<(), Error> {
        let entities = seats.iter().map(SeatEntity::from).collect::<Vec<_>>();

        self.database
            .collection::<SeatEntity>(SEATS)
            .insert_many(entities)
            .session(&mut self.session)
            .await?;

        Ok(())
    }

    async fn find_seat(&mut self, event_id: i64, number: i32) -> Result<Option<Seat>, Error> {
        let entity = self
            .database
            .collection::<SeatEntity>(SEATS)
            .find_one(doc! {
                "event_id": event_id,
                "number": number,
            })
            .session(&mut self.session)
            .await?;

        Ok(entity.map(Seat::from))
    }

    async fn update_seat(&mut self, seat: &Seat) -> Result<Seat, Error> {
        let update_result = self
            .database
            .collection::<Document>(SEATS)
            .update_one(
                doc! {
                    "_id": seat.id,
                    "version": seat.version,
                },
                doc! {
                    "$set": {
                        "status": seat.status.to_string(),
                        "hold_until": seat.hold_until.map(DateTime::from),
                    },
                    "$inc": { "version": 1 },
                },
            )
            .session(&mut self.session)
            .await?;

        match update_result.matched_count == 1 {
            true => Ok(Seat {
                version: seat.version + 1,
                ..seat.clone()
            }),
            false => Err(Error::StaleVersion),
        }
    }

    async fn insert_invoice(&mut self, invoice: &Invoice) -> Result<(), Error> {
        self.database
            .collection::<InvoiceEntity>(INVOICES)
            .insert_one(InvoiceEntity::from(invoice))
            .session(&mut self.session)
            .await?;

        Ok(())
    }

    async fn insert_tickets(&mut self, tickets: &[Ticket]) -> Result<(), Error> {
        let entities = tickets.iter().map(TicketEntity::from).collect::<Vec<_>>();

        self.database
            .collection::<TicketEntity>(TICKETS)
            .insert_many(entities)
            .session(&mut self.session)
            .await?;

        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<(), Error> {
        self.session.commit_transaction().await?;

        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> Result<(), Error> {
        self.session.abort_transaction().await?;

        Ok(())
    }
}
