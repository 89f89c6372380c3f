use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct HoldSeats {
    #[serde(rename = "idEvento")]
    pub id_evento: i64,
    pub asientos: Vec<i32>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hold_seats_json_deserialize_ok() {
        let json = r#"{ "idEvento": 42, "asientos": [1, 2, 3] }"#;

        let request = serde_json::from_str::<HoldSeats>(json).unwrap();

        assert_eq!(request.id_evento, 42);
        assert_eq!(request.asientos, vec![1, 2, 3]);
    }
}
