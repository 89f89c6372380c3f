use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Notification {
    pub mensaje: String,
    pub tipo: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn notification_json_serialize() {
        let notification = Notification {
            mensaje: "El usuario Ana Pérez compró boletos del evento 42".to_string(),
            tipo: "Compra Boletos".to_string(),
        };

        let json = serde_json::to_value(&notification).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "mensaje": "El usuario Ana Pérez compró boletos del evento 42",
                "tipo": "Compra Boletos",
            })
        );
    }
}
