use crate::error::Error;
use serde::Deserialize;
use time::{macros::format_description, Date};

///
/// Query parameters of GET /api/metricas/rango.
/// Dates are ISO YYYY-MM-DD; the range is inclusive on both ends
///
#[derive(Debug, Deserialize)]
pub struct MetricsRange {
    #[serde(rename = "fechaInicio")]
    pub fecha_inicio: String,
    #[serde(rename = "fechaFin")]
    pub fecha_fin: String,
}

impl MetricsRange {
    pub fn parse(&self) -> Result<(Date, Date), Error> {
        let format = format_description!("[year]-[month]-[day]");

        let start = Date::parse(&self.fecha_inicio, &format).map_err(|_| Error::Validation {
            field: "fechaInicio",
            message: "expected ISO date YYYY-MM-DD",
        })?;
        let end = Date::parse(&self.fecha_fin, &format).map_err(|_| Error::Validation {
            field: "fechaFin",
            message: "expected ISO date YYYY-MM-DD",
        })?;

        if end < start {
            return Err(Error::Validation {
                field: "fechaFin",
                message: "range end before range start",
            });
        }

        Ok((start, end))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsPeriod {
    AllTime,
    CurrentMonth,
    Range { start: Date, end: Date },
}

#[cfg(test)]
mod test {
    use super::*;
    use time::macros::date;

    #[test]
    fn metrics_range_parse_ok() {
        let range = MetricsRange {
            fecha_inicio: "2026-08-01".to_string(),
            fecha_fin: "2026-08-29".to_string(),
        };

        let (start, end) = range.parse().unwrap();

        assert_eq!(start, date!(2026 - 08 - 01));
        assert_eq!(end, date!(2026 - 08 - 29));
    }

    #[test]
    fn metrics_range_parse_invalid_date() {
        let range = MetricsRange {
            fecha_inicio: "29/08/2026".to_string(),
            fecha_fin: "2026-08-29".to_string(),
        };

        let err = range.parse().unwrap_err();

        assert!(matches!(
            err,
            Error::Validation {
                field: "fechaInicio",
                ..
            }
        ));
    }

    #[test]
    fn metrics_range_parse_end_before_start() {
        let range = MetricsRange {
            fecha_inicio: "2026-08-29".to_string(),
            fecha_fin: "2026-08-01".to_string(),
        };

        let err = range.parse().unwrap_err();

        assert!(matches!(
            err,
            Error::Validation {
                field: "fechaFin",
                ..
            }
        ));
    }
}
