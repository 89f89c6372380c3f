use super::{
    pricing,
    seat_state_machine::{self, Outcome},
    TicketsService, TicketsServiceConfig,
};
use crate::{
    dto::{input, output},
    error::Error,
    repository::{self, InventoryRepository, InventoryTransaction, Invoice, Seat, Ticket},
    service::{
        notifications_producer_service::NotificationsProducerService,
        seat_updates_service::SeatUpdatesService,
    },
};
use axum::async_trait;
use bson::oid::ObjectId;
use rand::Rng;
use rust_decimal::Decimal;
use std::{collections::HashSet, sync::Arc, time::Duration};
use time::{Date, Month, OffsetDateTime};

pub struct TicketsServiceImpl {
    config: TicketsServiceConfig,
    repository: Arc<dyn InventoryRepository>,
    seat_updates: Arc<dyn SeatUpdatesService>,
    notifications: Arc<dyn NotificationsProducerService>,
}

impl TicketsServiceImpl {
    pub fn new(
        config: TicketsServiceConfig,
        repository: Arc<dyn InventoryRepository>,
        seat_updates: Arc<dyn SeatUpdatesService>,
        notifications: Arc<dyn NotificationsProducerService>,
    ) -> Self {
        Self {
            config,
            repository,
            seat_updates,
            notifications,
        }
    }

    async fn try_hold_seats(
        &self,
        request: &input::HoldSeats,
    ) -> Result<Vec<output::SeatView>, Error> {
        let now = OffsetDateTime::now_utc();
        let mut txn = self.repository.begin().await?;

        let Some(event) = txn.find_event(request.id_evento).await? else {
            txn.rollback().await?;
            return Err(Error::EventNotFound);
        };

        if txn.count_seats(event.event_id).await? == 0 {
            tracing::info!(
                event_id = event.event_id,
                capacity = event.capacity,
                "materializing seats"
            );
            let seats = (1..=event.capacity)
                .map(|number| Seat::available(event.event_id, number))
                .collect::<Vec<_>>();
            txn.insert_seats(&seats).await?;
        }

        let mut held = Vec::with_capacity(request.asientos.len());
        for &number in &request.asientos {
            let Some(seat) = txn.find_seat(event.event_id, number).await? else {
                txn.rollback().await?;
                return Err(Error::SeatMissing(number));
            };

            // lapsed hold is released in storage before taking the seat
            let seat = match seat_state_machine::expire_if_past(&seat, now) {
                Some(expired) => update_seat(txn.as_mut(), &expired, number).await?,
                None => seat,
            };

            match seat_state_machine::hold(seat, now, self.config.hold_window) {
                Outcome::Ok(seat) => {
                    let seat = update_seat(txn.as_mut(), &seat, number).await?;
                    held.push(seat);
                }
                _ => {
                    txn.rollback().await?;
                    return Err(Error::SeatNotAvailable(number));
                }
            }
        }

        txn.commit().await?;

        for seat in &held {
            self.seat_updates.publish(output::SeatUpdate::from(seat)).await;
        }

        Ok(held.into_iter().map(output::SeatView::from).collect())
    }

    async fn try_purchase(&self, request: &input::Purchase) -> Result<output::Invoice, Error> {
        let now = OffsetDateTime::now_utc();
        let mut txn = self.repository.begin().await?;

        let Some(event) = txn.find_event(request.id_evento).await? else {
            txn.rollback().await?;
            return Err(Error::EventNotFound);
        };

        let mut purchased = Vec::with_capacity(request.asientos.len());
        for &number in &request.asientos {
            let Some(seat) = txn.find_seat(event.event_id, number).await? else {
                txn.rollback().await?;
                return Err(Error::SeatMissing(number));
            };

            match seat_state_machine::confirm(seat, now) {
                Outcome::Ok(seat) => {
                    let seat = update_seat(txn.as_mut(), &seat, number).await?;
                    purchased.push(seat);
                }
                _ => {
                    txn.rollback().await?;
                    return Err(Error::NotHeldOrExpired(number));
                }
            }
        }

        let totals = pricing::compute_totals(
            request.precio_unitario,
            purchased.len() as u32,
            self.config.tax_rate,
        );

        let invoice = Invoice {
            id: ObjectId::new(),
            first_name: request.nombre.clone(),
            last_name: request.apellido.clone(),
            national_id: request.cedula.clone(),
            event_id: event.event_id,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            created_at: now,
        };
        txn.insert_invoice(&invoice).await?;

        let tickets = purchased
            .iter()
            .map(|seat| Ticket {
                id: ObjectId::new(),
                event_id: event.event_id,
                seat_id: seat.id,
                seat_number: seat.number,
                invoice_id: invoice.id,
                purchased_at: now,
                unit_price: totals.unit_price,
            })
            .collect::<Vec<_>>();
        txn.insert_tickets(&tickets).await?;

        txn.commit().await?;

        for seat in &purchased {
            self.seat_updates.publish(output::SeatUpdate::from(seat)).await;
        }
        self.notifications
            .send_purchase(&request.nombre, &request.apellido, event.event_id)
            .await;

        Ok(output::Invoice {
            factura_id: invoice.id.to_hex(),
            id_evento: event.event_id,
            asientos: purchased.iter().map(|seat| seat.number).collect(),
            precio_unitario: totals.unit_price,
            subtotal: totals.subtotal,
            iva: totals.tax,
            total: totals.total,
            created_at: now,
        })
    }
}

#[async_trait]
impl TicketsService for TicketsServiceImpl {
    async fn list_seats(&self, event_id: i64) -> Result<Vec<output::SeatView>, Error> {
        let now = OffsetDateTime::now_utc();

        if self.repository.find_event(event_id).await?.is_none() {
            return Err(Error::EventNotFound);
        }

        let seats = self.repository.find_seats_by_event(event_id).await?;

        Ok(seats
            .into_iter()
            .map(|seat| {
                let seat = seat_state_machine::expire_if_past(&seat, now).unwrap_or(seat);
                output::SeatView::from(seat)
            })
            .collect())
    }

    async fn hold_seats(&self, request: input::HoldSeats) -> Result<Vec<output::SeatView>, Error> {
        validate_seat_numbers(&request.asientos)?;

        let mut attempt = 0;
        loop {
            match self.try_hold_seats(&request).await {
                Err(Error::Conflict { seat }) if attempt < self.config.conflict_retries => {
                    attempt += 1;
                    tracing::info!(attempt, ?seat, "hold lost version race, retrying");
                    tokio::time::sleep(conflict_backoff()).await;
                }
                result => return result,
            }
        }
    }

    async fn purchase(&self, request: input::Purchase) -> Result<output::Invoice, Error> {
        validate_seat_numbers(&request.asientos)?;
        validate_buyer(&request)?;

        let mut attempt = 0;
        loop {
            match self.try_purchase(&request).await {
                Err(Error::Conflict { seat }) if attempt < self.config.conflict_retries => {
                    attempt += 1;
                    tracing::info!(attempt, ?seat, "purchase lost version race, retrying");
                    tokio::time::sleep(conflict_backoff()).await;
                }
                result => return result,
            }
        }
    }

    async fn find_purchases(&self, national_id: &str) -> Result<Vec<output::Purchase>, Error> {
        if national_id.trim().is_empty() {
            return Err(Error::Validation {
                field: "cedula",
                message: "must not be blank",
            });
        }

        let invoices = self.repository.find_invoices_by_buyer_id(national_id).await?;

        Ok(invoices.into_iter().map(output::Purchase::from).collect())
    }

    async fn metrics(&self, period: input::MetricsPeriod) -> Result<output::Metrics, Error> {
        let today = OffsetDateTime::now_utc().date();
        let (range, periodo) = metrics_bounds(period, today)?;

        let total_tickets = self.repository.count_tickets_in_range(range).await?;
        let total_facturas = self.repository.count_invoices_in_range(range).await?;
        let total_ingresos = self.repository.sum_invoice_totals_in_range(range).await?;

        Ok(output::Metrics {
            total_tickets,
            total_facturas,
            total_ingresos,
            periodo,
        })
    }

    async fn release_expired_holds(&self) -> Result<u64, Error> {
        let released = self
            .repository
            .release_expired_holds(OffsetDateTime::now_utc())
            .await?;

        Ok(released)
    }
}

///
/// [repository::Error::StaleVersion] carries no context,
/// so the losing seat number is attached here
///
async fn update_seat(
    txn: &mut dyn InventoryTransaction,
    seat: &Seat,
    number: i32,
) -> Result<Seat, Error> {
    txn.update_seat(seat).await.map_err(|err| match err {
        repository::Error::StaleVersion => Error::Conflict { seat: Some(number) },
        err => err.into(),
    })
}

fn conflict_backoff() -> Duration {
    Duration::from_millis(rand::thread_rng().gen_range(10..50))
}

// seat numbers outside 1..=capacity are not a validation concern,
// their lookup misses and the request fails with SeatMissing
fn validate_seat_numbers(asientos: &[i32]) -> Result<(), Error> {
    if asientos.is_empty() {
        return Err(Error::Validation {
            field: "asientos",
            message: "at least one seat required",
        });
    }

    let mut seen = HashSet::with_capacity(asientos.len());
    if !asientos.iter().all(|number| seen.insert(number)) {
        return Err(Error::Validation {
            field: "asientos",
            message: "duplicate seat numbers",
        });
    }

    Ok(())
}

fn validate_buyer(request: &input::Purchase) -> Result<(), Error> {
    if request.nombre.trim().is_empty() {
        return Err(Error::Validation {
            field: "nombre",
            message: "must not be blank",
        });
    }
    if request.apellido.trim().is_empty() {
        return Err(Error::Validation {
            field: "apellido",
            message: "must not be blank",
        });
    }
    if request.cedula.trim().is_empty() {
        return Err(Error::Validation {
            field: "cedula",
            message: "must not be blank",
        });
    }
    if request.precio_unitario <= Decimal::ZERO {
        return Err(Error::Validation {
            field: "precioUnitario",
            message: "price must be positive",
        });
    }

    Ok(())
}

fn metrics_bounds(
    period: input::MetricsPeriod,
    today: Date,
) -> Result<(Option<(OffsetDateTime, OffsetDateTime)>, String), Error> {
    match period {
        input::MetricsPeriod::AllTime => Ok((None, "Todos los tiempos".to_string())),
        input::MetricsPeriod::CurrentMonth => {
            let start = Date::from_calendar_date(today.year(), today.month(), 1)
                .map_err(|_| Error::Internal("failed to build month range"))?;
            let end = match today.month() {
                Month::December => Date::from_calendar_date(today.year() + 1, Month::January, 1),
                month => Date::from_calendar_date(today.year(), month.next(), 1),
            }
            .map_err(|_| Error::Internal("failed to build month range"))?;

            let periodo = format!(
                "Mes actual ({} {})",
                today.month().to_string().to_uppercase(),
                today.year()
            );

            Ok((
                Some((start.midnight().assume_utc(), end.midnight().assume_utc())),
                periodo,
            ))
        }
        input::MetricsPeriod::Range { start, end } => {
            // inclusive end date becomes an exclusive midnight bound
            let end_exclusive = end
                .next_day()
                .ok_or(Error::Internal("range end out of supported dates"))?;

            let periodo = format!("Del {start} al {end}");

            Ok((
                Some((
                    start.midnight().assume_utc(),
                    end_exclusive.midnight().assume_utc(),
                )),
                periodo,
            ))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        repository::{
            Event, InvoiceWithTickets, MockInventoryRepository, MockInventoryTransaction,
            SeatStatus,
        },
        service::{
            notifications_producer_service::MockNotificationsProducerService,
            seat_updates_service::MockSeatUpdatesService,
        },
    };
    use rust_decimal_macros::dec;
    use time::macros::date;

    const HOLD_WINDOW: Duration = Duration::from_secs(60);
    const CONFLICT_RETRIES: u32 = 3;

    fn service(
        repository: MockInventoryRepository,
        seat_updates: MockSeatUpdatesService,
        notifications: MockNotificationsProducerService,
    ) -> TicketsServiceImpl {
        TicketsServiceImpl::new(
            TicketsServiceConfig {
                hold_window: HOLD_WINDOW,
                tax_rate: dec!(0.12),
                conflict_retries: CONFLICT_RETRIES,
            },
            Arc::new(repository),
            Arc::new(seat_updates),
            Arc::new(notifications),
        )
    }

    fn available_seat(event_id: i64, number: i32) -> Seat {
        Seat::available(event_id, number)
    }

    fn held_seat(event_id: i64, number: i32, hold_until: OffsetDateTime) -> Seat {
        Seat {
            status: SeatStatus::Hold,
            hold_until: Some(hold_until),
            ..Seat::available(event_id, number)
        }
    }

    #[tokio::test]
    async fn hold_seats_ok() {
        let mut repository = MockInventoryRepository::new();
        repository.expect_begin().return_once(|| {
            let mut txn = MockInventoryTransaction::new();
            txn.expect_find_event()
                .returning(|_| Ok(Some(Event { event_id: 1, capacity: 10 })));
            txn.expect_count_seats().returning(|_| Ok(10));
            txn.expect_find_seat()
                .returning(|event_id, number| Ok(Some(available_seat(event_id, number))));
            txn.expect_update_seat().returning(|seat| {
                Ok(Seat {
                    version: seat.version + 1,
                    ..seat.clone()
                })
            });
            txn.expect_commit().return_once(|| Ok(()));
            Ok(Box::new(txn))
        });
        let mut seat_updates = MockSeatUpdatesService::new();
        seat_updates.expect_publish().times(2).returning(|_| ());
        let notifications = MockNotificationsProducerService::new();
        let service = service(repository, seat_updates, notifications);

        let held = service
            .hold_seats(input::HoldSeats {
                id_evento: 1,
                asientos: vec![4, 5],
            })
            .await
            .unwrap();

        assert_eq!(held.len(), 2);
        assert!(held.iter().all(|seat| seat.estado == SeatStatus::Hold));
        assert!(held.iter().all(|seat| seat.hold_until.is_some()));
    }

    #[tokio::test]
    async fn hold_seats_materializes_seats_on_first_hold() {
        let mut repository = MockInventoryRepository::new();
        repository.expect_begin().return_once(|| {
            let mut txn = MockInventoryTransaction::new();
            txn.expect_find_event()
                .returning(|_| Ok(Some(Event { event_id: 1, capacity: 10 })));
            txn.expect_count_seats().returning(|_| Ok(0));
            txn.expect_insert_seats()
                .withf(|seats| {
                    seats.len() == 10
                        && seats
                            .iter()
                            .zip(1..)
                            .all(|(seat, number)| {
                                seat.number == number && seat.status == SeatStatus::Available
                            })
                })
                .return_once(|_| Ok(()));
            txn.expect_find_seat()
                .returning(|event_id, number| Ok(Some(available_seat(event_id, number))));
            txn.expect_update_seat().returning(|seat| Ok(seat.clone()));
            txn.expect_commit().return_once(|| Ok(()));
            Ok(Box::new(txn))
        });
        let mut seat_updates = MockSeatUpdatesService::new();
        seat_updates.expect_publish().returning(|_| ());
        let notifications = MockNotificationsProducerService::new();
        let service = service(repository, seat_updates, notifications);

        let held = service
            .hold_seats(input::HoldSeats {
                id_evento: 1,
                asientos: vec![1],
            })
            .await
            .unwrap();

        assert_eq!(held.len(), 1);
    }

    #[tokio::test]
    async fn hold_seats_event_not_found() {
        let mut repository = MockInventoryRepository::new();
        repository.expect_begin().return_once(|| {
            let mut txn = MockInventoryTransaction::new();
            txn.expect_find_event().returning(|_| Ok(None));
            txn.expect_rollback().return_once(|| Ok(()));
            Ok(Box::new(txn))
        });
        let seat_updates = MockSeatUpdatesService::new();
        let notifications = MockNotificationsProducerService::new();
        let service = service(repository, seat_updates, notifications);

        let hold_result = service
            .hold_seats(input::HoldSeats {
                id_evento: 404,
                asientos: vec![1],
            })
            .await;

        assert!(matches!(hold_result, Err(Error::EventNotFound)));
    }

    #[tokio::test]
    async fn hold_seats_seat_missing() {
        let mut repository = MockInventoryRepository::new();
        repository.expect_begin().return_once(|| {
            let mut txn = MockInventoryTransaction::new();
            txn.expect_find_event()
                .returning(|_| Ok(Some(Event { event_id: 1, capacity: 10 })));
            txn.expect_count_seats().returning(|_| Ok(10));
            txn.expect_find_seat().returning(|_, _| Ok(None));
            txn.expect_rollback().return_once(|| Ok(()));
            Ok(Box::new(txn))
        });
        let seat_updates = MockSeatUpdatesService::new();
        let notifications = MockNotificationsProducerService::new();
        let service = service(repository, seat_updates, notifications);

        let hold_result = service
            .hold_seats(input::HoldSeats {
                id_evento: 1,
                asientos: vec![11],
            })
            .await;

        assert!(matches!(hold_result, Err(Error::SeatMissing(11))));
    }

    #[tokio::test]
    async fn hold_seats_seat_number_zero_reported_missing() {
        let mut repository = MockInventoryRepository::new();
        repository.expect_begin().return_once(|| {
            let mut txn = MockInventoryTransaction::new();
            txn.expect_find_event()
                .returning(|_| Ok(Some(Event { event_id: 1, capacity: 10 })));
            txn.expect_count_seats().returning(|_| Ok(10));
            txn.expect_find_seat()
                .withf(|_, number| *number == 0)
                .returning(|_, _| Ok(None));
            txn.expect_rollback().return_once(|| Ok(()));
            Ok(Box::new(txn))
        });
        let seat_updates = MockSeatUpdatesService::new();
        let notifications = MockNotificationsProducerService::new();
        let service = service(repository, seat_updates, notifications);

        let hold_result = service
            .hold_seats(input::HoldSeats {
                id_evento: 1,
                asientos: vec![0],
            })
            .await;

        assert!(matches!(hold_result, Err(Error::SeatMissing(0))));
    }

    #[tokio::test]
    async fn hold_seats_seat_already_held() {
        let mut repository = MockInventoryRepository::new();
        repository.expect_begin().return_once(|| {
            let mut txn = MockInventoryTransaction::new();
            txn.expect_find_event()
                .returning(|_| Ok(Some(Event { event_id: 1, capacity: 10 })));
            txn.expect_count_seats().returning(|_| Ok(10));
            txn.expect_find_seat().returning(|event_id, number| {
                Ok(Some(held_seat(
                    event_id,
                    number,
                    OffsetDateTime::now_utc() + HOLD_WINDOW,
                )))
            });
            txn.expect_rollback().return_once(|| Ok(()));
            Ok(Box::new(txn))
        });
        let seat_updates = MockSeatUpdatesService::new();
        let notifications = MockNotificationsProducerService::new();
        let service = service(repository, seat_updates, notifications);

        let hold_result = service
            .hold_seats(input::HoldSeats {
                id_evento: 1,
                asientos: vec![2],
            })
            .await;

        assert!(matches!(hold_result, Err(Error::SeatNotAvailable(2))));
    }

    #[tokio::test]
    async fn hold_seats_releases_lapsed_hold_before_holding() {
        let mut repository = MockInventoryRepository::new();
        repository.expect_begin().return_once(|| {
            let mut txn = MockInventoryTransaction::new();
            txn.expect_find_event()
                .returning(|_| Ok(Some(Event { event_id: 1, capacity: 10 })));
            txn.expect_count_seats().returning(|_| Ok(10));
            txn.expect_find_seat().returning(|event_id, number| {
                Ok(Some(held_seat(
                    event_id,
                    number,
                    OffsetDateTime::now_utc() - Duration::from_secs(1),
                )))
            });
            // once for the release, once for the new hold
            txn.expect_update_seat()
                .times(2)
                .returning(|seat| Ok(seat.clone()));
            txn.expect_commit().return_once(|| Ok(()));
            Ok(Box::new(txn))
        });
        let mut seat_updates = MockSeatUpdatesService::new();
        seat_updates.expect_publish().times(1).returning(|_| ());
        let notifications = MockNotificationsProducerService::new();
        let service = service(repository, seat_updates, notifications);

        let held = service
            .hold_seats(input::HoldSeats {
                id_evento: 1,
                asientos: vec![3],
            })
            .await
            .unwrap();

        assert_eq!(held.len(), 1);
        assert_eq!(held[0].estado, SeatStatus::Hold);
    }

    #[tokio::test(start_paused = true)]
    async fn hold_seats_version_race_retried_then_conflict() {
        let mut repository = MockInventoryRepository::new();
        repository
            .expect_begin()
            .times(1 + CONFLICT_RETRIES as usize)
            .returning(|| {
                let mut txn = MockInventoryTransaction::new();
                txn.expect_find_event()
                    .returning(|_| Ok(Some(Event { event_id: 1, capacity: 10 })));
                txn.expect_count_seats().returning(|_| Ok(10));
                txn.expect_find_seat()
                    .returning(|event_id, number| Ok(Some(available_seat(event_id, number))));
                txn.expect_update_seat()
                    .returning(|_| Err(repository::Error::StaleVersion));
                txn.expect_rollback().returning(|| Ok(()));
                Ok(Box::new(txn))
            });
        let seat_updates = MockSeatUpdatesService::new();
        let notifications = MockNotificationsProducerService::new();
        let service = service(repository, seat_updates, notifications);

        let hold_result = service
            .hold_seats(input::HoldSeats {
                id_evento: 1,
                asientos: vec![1],
            })
            .await;

        assert!(matches!(
            hold_result,
            Err(Error::Conflict { seat: Some(1) })
        ));
    }

    #[tokio::test]
    async fn hold_seats_validation_rejects_bad_requests() {
        let mut repository = MockInventoryRepository::new();
        repository.expect_begin().never();
        let seat_updates = MockSeatUpdatesService::new();
        let notifications = MockNotificationsProducerService::new();
        let service = service(repository, seat_updates, notifications);

        for asientos in [vec![], vec![2, 2]] {
            let hold_result = service
                .hold_seats(input::HoldSeats {
                    id_evento: 1,
                    asientos,
                })
                .await;

            assert!(matches!(
                hold_result,
                Err(Error::Validation { field: "asientos", .. })
            ));
        }
    }

    fn purchase_request() -> input::Purchase {
        input::Purchase {
            id_evento: 1,
            asientos: vec![4, 5],
            nombre: "Ana".to_string(),
            apellido: "Pérez".to_string(),
            cedula: "0102030405".to_string(),
            precio_unitario: dec!(10.00),
        }
    }

    #[tokio::test]
    async fn purchase_ok() {
        let mut repository = MockInventoryRepository::new();
        repository.expect_begin().return_once(|| {
            let mut txn = MockInventoryTransaction::new();
            txn.expect_find_event()
                .returning(|_| Ok(Some(Event { event_id: 1, capacity: 10 })));
            txn.expect_find_seat().returning(|event_id, number| {
                Ok(Some(held_seat(
                    event_id,
                    number,
                    OffsetDateTime::now_utc() + HOLD_WINDOW,
                )))
            });
            txn.expect_update_seat().returning(|seat| Ok(seat.clone()));
            txn.expect_insert_invoice()
                .withf(|invoice| {
                    invoice.subtotal == dec!(20.00)
                        && invoice.tax == dec!(2.40)
                        && invoice.total == dec!(22.40)
                })
                .return_once(|_| Ok(()));
            txn.expect_insert_tickets()
                .withf(|tickets| {
                    tickets.len() == 2
                        && tickets.iter().all(|ticket| ticket.unit_price == dec!(10.00))
                })
                .return_once(|_| Ok(()));
            txn.expect_commit().return_once(|| Ok(()));
            Ok(Box::new(txn))
        });
        let mut seat_updates = MockSeatUpdatesService::new();
        seat_updates.expect_publish().times(2).returning(|_| ());
        let mut notifications = MockNotificationsProducerService::new();
        notifications
            .expect_send_purchase()
            .withf(|first_name, last_name, event_id| {
                first_name == "Ana" && last_name == "Pérez" && *event_id == 1
            })
            .times(1)
            .returning(|_, _, _| ());
        let service = service(repository, seat_updates, notifications);

        let invoice = service.purchase(purchase_request()).await.unwrap();

        assert_eq!(invoice.id_evento, 1);
        assert_eq!(invoice.asientos, vec![4, 5]);
        assert_eq!(invoice.precio_unitario, dec!(10.00));
        assert_eq!(invoice.subtotal, dec!(20.00));
        assert_eq!(invoice.iva, dec!(2.40));
        assert_eq!(invoice.total, dec!(22.40));
    }

    #[tokio::test]
    async fn purchase_hold_expired() {
        let mut repository = MockInventoryRepository::new();
        repository.expect_begin().return_once(|| {
            let mut txn = MockInventoryTransaction::new();
            txn.expect_find_event()
                .returning(|_| Ok(Some(Event { event_id: 1, capacity: 10 })));
            txn.expect_find_seat().returning(|event_id, number| {
                Ok(Some(held_seat(
                    event_id,
                    number,
                    OffsetDateTime::now_utc() - Duration::from_secs(1),
                )))
            });
            txn.expect_rollback().return_once(|| Ok(()));
            Ok(Box::new(txn))
        });
        let seat_updates = MockSeatUpdatesService::new();
        let mut notifications = MockNotificationsProducerService::new();
        notifications.expect_send_purchase().never();
        let service = service(repository, seat_updates, notifications);

        let purchase_result = service.purchase(purchase_request()).await;

        assert!(matches!(purchase_result, Err(Error::NotHeldOrExpired(4))));
    }

    #[tokio::test]
    async fn purchase_seat_not_held() {
        let mut repository = MockInventoryRepository::new();
        repository.expect_begin().return_once(|| {
            let mut txn = MockInventoryTransaction::new();
            txn.expect_find_event()
                .returning(|_| Ok(Some(Event { event_id: 1, capacity: 10 })));
            txn.expect_find_seat()
                .returning(|event_id, number| Ok(Some(available_seat(event_id, number))));
            txn.expect_rollback().return_once(|| Ok(()));
            Ok(Box::new(txn))
        });
        let seat_updates = MockSeatUpdatesService::new();
        let notifications = MockNotificationsProducerService::new();
        let service = service(repository, seat_updates, notifications);

        let purchase_result = service.purchase(purchase_request()).await;

        assert!(matches!(purchase_result, Err(Error::NotHeldOrExpired(4))));
    }

    #[tokio::test]
    async fn purchase_seat_missing() {
        let mut repository = MockInventoryRepository::new();
        repository.expect_begin().return_once(|| {
            let mut txn = MockInventoryTransaction::new();
            txn.expect_find_event()
                .returning(|_| Ok(Some(Event { event_id: 1, capacity: 10 })));
            txn.expect_find_seat().returning(|_, _| Ok(None));
            txn.expect_rollback().return_once(|| Ok(()));
            Ok(Box::new(txn))
        });
        let seat_updates = MockSeatUpdatesService::new();
        let notifications = MockNotificationsProducerService::new();
        let service = service(repository, seat_updates, notifications);

        let purchase_result = service.purchase(purchase_request()).await;

        assert!(matches!(purchase_result, Err(Error::SeatMissing(4))));
    }

    #[tokio::test]
    async fn purchase_validation_rejects_bad_requests() {
        let mut repository = MockInventoryRepository::new();
        repository.expect_begin().never();
        let seat_updates = MockSeatUpdatesService::new();
        let notifications = MockNotificationsProducerService::new();
        let service = service(repository, seat_updates, notifications);

        let blank_name = input::Purchase {
            nombre: "  ".to_string(),
            ..purchase_request()
        };
        let free_tickets = input::Purchase {
            precio_unitario: dec!(0),
            ..purchase_request()
        };

        assert!(matches!(
            service.purchase(blank_name).await,
            Err(Error::Validation { field: "nombre", .. })
        ));
        assert!(matches!(
            service.purchase(free_tickets).await,
            Err(Error::Validation {
                field: "precioUnitario",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn list_seats_event_not_found() {
        let mut repository = MockInventoryRepository::new();
        repository.expect_find_event().returning(|_| Ok(None));
        let seat_updates = MockSeatUpdatesService::new();
        let notifications = MockNotificationsProducerService::new();
        let service = service(repository, seat_updates, notifications);

        let list_result = service.list_seats(404).await;

        assert!(matches!(list_result, Err(Error::EventNotFound)));
    }

    #[tokio::test]
    async fn list_seats_reports_lapsed_hold_as_available() {
        let mut repository = MockInventoryRepository::new();
        repository
            .expect_find_event()
            .returning(|_| Ok(Some(Event { event_id: 1, capacity: 2 })));
        repository.expect_find_seats_by_event().returning(|event_id| {
            Ok(vec![
                held_seat(event_id, 1, OffsetDateTime::now_utc() - Duration::from_secs(1)),
                held_seat(event_id, 2, OffsetDateTime::now_utc() + HOLD_WINDOW),
            ])
        });
        let seat_updates = MockSeatUpdatesService::new();
        let notifications = MockNotificationsProducerService::new();
        let service = service(repository, seat_updates, notifications);

        let seats = service.list_seats(1).await.unwrap();

        assert_eq!(seats[0].estado, SeatStatus::Available);
        assert_eq!(seats[0].hold_until, None);
        assert_eq!(seats[1].estado, SeatStatus::Hold);
    }

    #[tokio::test]
    async fn find_purchases_blank_cedula() {
        let mut repository = MockInventoryRepository::new();
        repository.expect_find_invoices_by_buyer_id().never();
        let seat_updates = MockSeatUpdatesService::new();
        let notifications = MockNotificationsProducerService::new();
        let service = service(repository, seat_updates, notifications);

        let find_result = service.find_purchases("  ").await;

        assert!(matches!(
            find_result,
            Err(Error::Validation { field: "cedula", .. })
        ));
    }

    #[tokio::test]
    async fn find_purchases_maps_invoices() {
        let invoice = Invoice {
            id: ObjectId::new(),
            first_name: "Ana".to_string(),
            last_name: "Pérez".to_string(),
            national_id: "0102030405".to_string(),
            event_id: 1,
            subtotal: dec!(20.00),
            tax: dec!(2.40),
            total: dec!(22.40),
            created_at: OffsetDateTime::now_utc(),
        };
        let invoice_clone = invoice.clone();
        let mut repository = MockInventoryRepository::new();
        repository
            .expect_find_invoices_by_buyer_id()
            .return_once(move |_| {
                Ok(vec![InvoiceWithTickets {
                    invoice: invoice_clone,
                    tickets: vec![],
                }])
            });
        let seat_updates = MockSeatUpdatesService::new();
        let notifications = MockNotificationsProducerService::new();
        let service = service(repository, seat_updates, notifications);

        let purchases = service.find_purchases("0102030405").await.unwrap();

        assert_eq!(purchases.len(), 1);
        assert_eq!(purchases[0].factura_id, invoice.id.to_hex());
        assert_eq!(purchases[0].total, dec!(22.40));
    }

    #[tokio::test]
    async fn metrics_all_time() {
        let mut repository = MockInventoryRepository::new();
        repository
            .expect_count_tickets_in_range()
            .withf(|range| range.is_none())
            .returning(|_| Ok(12));
        repository
            .expect_count_invoices_in_range()
            .withf(|range| range.is_none())
            .returning(|_| Ok(5));
        repository
            .expect_sum_invoice_totals_in_range()
            .withf(|range| range.is_none())
            .returning(|_| Ok(dec!(134.40)));
        let seat_updates = MockSeatUpdatesService::new();
        let notifications = MockNotificationsProducerService::new();
        let service = service(repository, seat_updates, notifications);

        let metrics = service.metrics(input::MetricsPeriod::AllTime).await.unwrap();

        assert_eq!(metrics.total_tickets, 12);
        assert_eq!(metrics.total_facturas, 5);
        assert_eq!(metrics.total_ingresos, dec!(134.40));
        assert_eq!(metrics.periodo, "Todos los tiempos");
    }

    #[tokio::test]
    async fn release_expired_holds_passes_count_through() {
        let mut repository = MockInventoryRepository::new();
        repository.expect_release_expired_holds().returning(|_| Ok(7));
        let seat_updates = MockSeatUpdatesService::new();
        let notifications = MockNotificationsProducerService::new();
        let service = service(repository, seat_updates, notifications);

        let released = service.release_expired_holds().await.unwrap();

        assert_eq!(released, 7);
    }

    #[test]
    fn metrics_bounds_current_month() {
        let (range, periodo) =
            metrics_bounds(input::MetricsPeriod::CurrentMonth, date!(2026 - 08 - 29)).unwrap();

        let (start, end) = range.unwrap();
        assert_eq!(start, date!(2026 - 08 - 01).midnight().assume_utc());
        assert_eq!(end, date!(2026 - 09 - 01).midnight().assume_utc());
        assert_eq!(periodo, "Mes actual (AUGUST 2026)");
    }

    #[test]
    fn metrics_bounds_current_month_december_rolls_over_year() {
        let (range, _) =
            metrics_bounds(input::MetricsPeriod::CurrentMonth, date!(2026 - 12 - 15)).unwrap();

        let (_, end) = range.unwrap();
        assert_eq!(end, date!(2027 - 01 - 01).midnight().assume_utc());
    }

    #[test]
    fn metrics_bounds_range_is_inclusive_on_both_ends() {
        let (range, periodo) = metrics_bounds(
            input::MetricsPeriod::Range {
                start: date!(2026 - 08 - 01),
                end: date!(2026 - 08 - 29),
            },
            date!(2026 - 08 - 29),
        )
        .unwrap();

        let (start, end) = range.unwrap();
        assert_eq!(start, date!(2026 - 08 - 01).midnight().assume_utc());
        assert_eq!(end, date!(2026 - 08 - 30).midnight().assume_utc());
        assert_eq!(periodo, "Del 2026-08-01 al 2026-08-29");
    }
}
