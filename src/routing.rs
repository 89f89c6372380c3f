use crate::{
    application::ApplicationState,
    dto::{input, output},
    error::Error,
    service::{seat_updates_service::SeatUpdatesService, tickets_service::TicketsService},
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, Query, State, WebSocketUpgrade,
    },
    response::Response,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tokio::sync::broadcast;

pub fn routing() -> Router<ApplicationState> {
    Router::new()
        .route("/api/eventos/:id_evento/asientos", get(get_seats))
        .route("/api/holds", post(post_hold))
        .route("/api/purchases", post(post_purchase))
        .route("/api/compras/:cedula", get(get_purchases))
        .route("/api/metricas", get(get_metrics))
        .route("/api/metricas/mes", get(get_metrics_current_month))
        .route("/api/metricas/rango", get(get_metrics_range))
        .route("/ws/eventos/:id_evento/asientos", get(seat_updates_websocket))
}

async fn get_seats(
    Path(id_evento): Path<i64>,
    State(tickets_service): State<Arc<dyn TicketsService>>,
) -> Result<Json<Vec<output::SeatView>>, Error> {
    let seats = tickets_service.list_seats(id_evento).await?;

    Ok(Json(seats))
}

async fn post_hold(
    State(tickets_service): State<Arc<dyn TicketsService>>,
    Json(request): Json<input::HoldSeats>,
) -> Result<Json<Vec<output::SeatView>>, Error> {
    let held = tickets_service.hold_seats(request).await?;

    Ok(Json(held))
}

async fn post_purchase(
    State(tickets_service): State<Arc<dyn TicketsService>>,
    Json(request): Json<input::Purchase>,
) -> Result<Json<output::Invoice>, Error> {
    let invoice = tickets_service.purchase(request).await?;

    Ok(Json(invoice))
}

async fn get_purchases(
    Path(cedula): Path<String>,
    State(tickets_service): State<Arc<dyn TicketsService>>,
) -> Result<Json<Vec<output::Purchase>>, Error> {
    let purchases = tickets_service.find_purchases(&cedula).await?;

    Ok(Json(purchases))
}

async fn get_metrics(
    State(tickets_service): State<Arc<dyn TicketsService>>,
) -> Result<Json<output::Metrics>, Error> {
    let metrics = tickets_service.metrics(input::MetricsPeriod::AllTime).await?;

    Ok(Json(metrics))
}

async fn get_metrics_current_month(
    State(tickets_service): State<Arc<dyn TicketsService>>,
) -> Result<Json<output::Metrics>, Error> {
    let metrics = tickets_service
        .metrics(input::MetricsPeriod::CurrentMonth)
        .await?;

    Ok(Json(metrics))
}

async fn get_metrics_range(
    Query(range): Query<input::MetricsRange>,
    State(tickets_service): State<Arc<dyn TicketsService>>,
) -> Result<Json<output::Metrics>, Error> {
    let (start, end) = range.parse()?;
    let metrics = tickets_service
        .metrics(input::MetricsPeriod::Range { start, end })
        .await?;

    Ok(Json(metrics))
}

///
/// Subscribers receive the full seat snapshot on connect,
/// then one message per committed seat change
///
async fn seat_updates_websocket(
    Path(id_evento): Path<i64>,
    ws: WebSocketUpgrade,
    State(tickets_service): State<Arc<dyn TicketsService>>,
    State(seat_updates_service): State<Arc<dyn SeatUpdatesService>>,
) -> Result<Response, Error> {
    // subscribe first so an update committed while snapshotting is not missed;
    // list_seats resolves to 404 before the upgrade when the event is unknown
    let updates_rx = seat_updates_service.subscribe(id_evento).await;
    let snapshot = tickets_service.list_seats(id_evento).await?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, id_evento, snapshot, updates_rx)))
}

#[tracing::instrument(name = "Seat Updates WebSocket", skip_all, fields(event_id))]
async fn handle_socket(
    mut socket: WebSocket,
    event_id: i64,
    snapshot: Vec<output::SeatView>,
    mut updates_rx: broadcast::Receiver<output::SeatUpdate>,
) {
    tracing::Span::current().record("event_id", event_id);
    tracing::debug!("subscriber connected");

    match serde_json::to_string(&snapshot) {
        Ok(snapshot) => {
            if socket.send(Message::Text(snapshot)).await.is_err() {
                return;
            }
        }
        Err(err) => {
            tracing::error!(%err, "failed to serialize seat snapshot");
            return;
        }
    }

    loop {
        tokio::select! {
            result = updates_rx.recv() => match result {
                Ok(update) => {
                    let Ok(text) = serde_json::to_string(&update) else {
                        continue;
                    };
                    if socket.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber lagged, updates dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },

            message = socket.recv() => match message {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    tracing::debug!(%err, "websocket receive failed");
                    break;
                }
            },
        }
    }

    tracing::debug!("subscriber disconnected");
}
