// src/api/handlers/ws.rs
use actix::{Actor, StreamHandler, Handler, Message, Addr, AsyncContext};
use actix_web::{web, HttpRequest, HttpResponse, Error};
use actix_web_actors::ws;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use crate::workbench::WorkbenchEvent;

/// One probe transition as pushed to browsers.
#[derive(Message, Clone, Serialize)]
#[rtype(result = "()")]
pub struct ProbeMessage(pub WorkbenchEvent);

#[derive(Clone)]
pub struct WsBroker {
    clients: Arc<RwLock<Vec<Addr<WsConnection>>>>,
}

impl Default for WsBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl WsBroker {
    pub fn new() -> Self {
        Self {
            clients: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn register(&self, addr: Addr<WsConnection>) {
        let mut clients = self.clients.write().await;
        clients.push(addr);
    }

    pub async fn unregister(&self, addr: &Addr<WsConnection>) {
        let mut clients = self.clients.write().await;
        clients.retain(|c| c != addr);
    }

    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    pub async fn broadcast(&self, msg: WorkbenchEvent) {
        let clients = self.clients.read().await;
        for client in clients.iter() {
            client.do_send(ProbeMessage(msg.clone()));
        }
    }

    /// Push every workbench event to connected clients until the workbench goes away.
    pub fn forward(&self, mut events: broadcast::Receiver<WorkbenchEvent>) {
        let broker = self.clone();
        actix::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => broker.broadcast(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("WebSocket broker fell behind, skipped {} probe updates", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }
}

pub struct WsConnection {
    broker: WsBroker,
}

impl WsConnection {
    pub fn new(broker: WsBroker) -> Self {
        Self { broker }
    }
}

impl Actor for WsConnection {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let addr = ctx.address();
        let broker = self.broker.clone();
        actix::spawn(async move {
            broker.register(addr).await;
        });
    }

    fn stopped(&mut self, ctx: &mut Self::Context) {
        let addr = ctx.address();
        let broker = self.broker.clone();
        actix::spawn(async move {
            broker.unregister(&addr).await;
        });
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsConnection {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Close(reason)) => ctx.close(reason),
            _ => (),
        }
    }
}

impl Handler<ProbeMessage> for WsConnection {
    type Result = ();

    fn handle(&mut self, msg: ProbeMessage, ctx: &mut Self::Context) {
        if let Ok(json) = serde_json::to_string(&msg.0) {
            ctx.text(json);
        }
    }
}

pub async fn ws_handler(
    req: HttpRequest,
    stream: web::Payload,
    broker: web::Data<WsBroker>,
) -> Result<HttpResponse, Error> {
    let conn = WsConnection::new(broker.get_ref().clone());
    ws::start(conn, &req, stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{Probe, ProbeStatus, ProbeUpdate};
    use crate::workbench::View;

    #[test]
    fn test_event_wire_format() {
        let event = WorkbenchEvent {
            view: View::VersionCompare,
            update: ProbeUpdate {
                batch_id: "b-1".to_string(),
                index: 1,
                probe: Probe {
                    index: 1,
                    label: "v2".to_string(),
                    config_ref: "cfg-1".to_string(),
                    status: ProbeStatus::Running,
                    result_text: None,
                    error_message: None,
                    execution_time_ms: None,
                    tokens_used: None,
                    started_at: Some("2024-05-01T10:00:00+00:00".to_string()),
                    finished_at: None,
                },
            },
        };

        let value = serde_json::to_value(ProbeMessage(event).0).unwrap();
        assert_eq!(value["view"], "version-compare");
        assert_eq!(value["batch_id"], "b-1");
        assert_eq!(value["index"], 1);
        assert_eq!(value["probe"]["status"], "running");
        assert_eq!(value["probe"]["label"], "v2");
    }

    #[actix_rt::test]
    async fn test_broadcast_without_clients_is_a_no_op() {
        let broker = WsBroker::new();
        assert_eq!(broker.client_count().await, 0);
        let (tx, rx) = broadcast::channel(4);
        broker.forward(rx);
        drop(tx);
    }
}
